//! Availability slot management.

use serde_json::json;
use uuid::Uuid;

use medibook_core::{PrincipalId, SlotId};

use crate::models::{AvailabilitySlot, parse_client_timestamp};
use crate::store::{Document, DocumentStore, Fields, Subscription};

use super::{ServiceError, collections};

/// Create, list, watch, and delete a doctor's availability slots.
///
/// Slots live under the owning doctor's schedule subcollection, so every
/// operation here is owner-scoped by construction. Slots are never updated
/// in place; a changed window is a new slot with a fresh id.
pub struct AvailabilityService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> AvailabilityService<'a> {
    /// Create a service over `store`.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Create a new slot and return its id.
    ///
    /// Ids are random (uuid v4), so two slots created in the same instant
    /// cannot collide. Validation happens before any write.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` when a timestamp is missing or
    /// unparseable, or when `start_time >= end_time`.
    pub async fn add_slot(
        &self,
        doctor: &PrincipalId,
        start_time: &str,
        end_time: &str,
        available: bool,
    ) -> Result<SlotId, ServiceError> {
        let start = parse_client_timestamp(start_time)
            .ok_or_else(|| ServiceError::Validation("startTime is not a valid timestamp".to_string()))?;
        let end = parse_client_timestamp(end_time)
            .ok_or_else(|| ServiceError::Validation("endTime is not a valid timestamp".to_string()))?;
        if start >= end {
            return Err(ServiceError::Validation(
                "startTime must be before endTime".to_string(),
            ));
        }

        let id = SlotId::new(Uuid::new_v4().to_string());
        let fields = object_fields(json!({
            "startTime": start.to_rfc3339(),
            "endTime": end.to_rfc3339(),
            "available": available,
        }));
        // Always a fresh document; an existing slot is never overwritten.
        self.store
            .set(&collections::schedule(doctor), id.as_str(), fields, false)
            .await?;
        Ok(id)
    }

    /// List the doctor's slots. Ordering is store-defined.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the query fails.
    pub async fn list_slots(
        &self,
        doctor: &PrincipalId,
    ) -> Result<Vec<AvailabilitySlot>, ServiceError> {
        let docs = self.store.query(&collections::schedule(doctor), &[]).await?;
        Ok(decode_slots(&docs))
    }

    /// Subscribe to the live slot set for `doctor`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the subscription cannot be set up.
    pub async fn watch_slots(&self, doctor: &PrincipalId) -> Result<Subscription, ServiceError> {
        Ok(self.store.watch(&collections::schedule(doctor), &[]).await?)
    }

    /// Delete one of the doctor's slots. Deleting an absent slot is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the delete fails.
    pub async fn delete_slot(
        &self,
        doctor: &PrincipalId,
        slot: &SlotId,
    ) -> Result<(), ServiceError> {
        self.store
            .delete(&collections::schedule(doctor), slot.as_str())
            .await?;
        Ok(())
    }
}

/// Decode a slot snapshot, skipping (and logging) corrupt documents.
pub fn decode_slots(docs: &[Document]) -> Vec<AvailabilitySlot> {
    docs.iter()
        .filter_map(|doc| match AvailabilitySlot::from_document(doc) {
            Ok(slot) => Some(slot),
            Err(err) => {
                tracing::warn!(error = %err, "skipping corrupt slot document");
                None
            }
        })
        .collect()
}

fn object_fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Fields::new(),
    }
}
