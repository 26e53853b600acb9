//! Appointment booking and bookkeeping.
//!
//! Booking is deliberately decoupled from availability: creating an
//! appointment does not consult the doctor's slots, does not mark any slot
//! consumed, and does not detect overlapping bookings. Slots are advisory
//! information for patients; tying the two together is a known product gap,
//! tracked outside this service.

use serde_json::json;

use medibook_core::{AppointmentId, PrincipalId, Role};

use crate::models::{Appointment, parse_client_timestamp};
use crate::store::{Document, DocumentStore, Fields, Filter, Subscription};

use super::{ServiceError, collections};

/// The document field an appointment references a participant through.
const fn participant_field(role: Role) -> &'static str {
    match role {
        Role::Doctor => "doctorId",
        Role::Patient => "patientId",
    }
}

/// Book, list, watch, and delete appointments.
pub struct AppointmentService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> AppointmentService<'a> {
    /// Create a service over `store`.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Book an appointment for `patient` with `doctor_id`.
    ///
    /// Neither participant reference is validated against the profile
    /// collections, and no availability check happens (see module docs).
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` when no doctor is selected or the
    /// timestamp does not parse; nothing is written in that case.
    pub async fn book(
        &self,
        doctor_id: &str,
        patient: &PrincipalId,
        date_time: &str,
        notes: &str,
    ) -> Result<AppointmentId, ServiceError> {
        if doctor_id.trim().is_empty() {
            return Err(ServiceError::Validation("a doctor must be selected".to_string()));
        }
        let date_time = parse_client_timestamp(date_time)
            .ok_or_else(|| ServiceError::Validation("dateTime is not a valid timestamp".to_string()))?;

        let fields = object_fields(json!({
            "doctorId": doctor_id,
            "patientId": patient.as_str(),
            "dateTime": date_time.to_rfc3339(),
            "notes": notes,
        }));
        let id = self.store.add(collections::APPOINTMENTS, fields).await?;
        Ok(AppointmentId::new(id))
    }

    /// List the appointments `principal` participates in as `role`.
    ///
    /// The equality filter is pushed to the store rather than applied
    /// client-side; the observable result is the same either way.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the query fails.
    pub async fn list(
        &self,
        principal: &PrincipalId,
        role: Role,
    ) -> Result<Vec<Appointment>, ServiceError> {
        let filter = Filter::equals(participant_field(role), principal.as_str());
        let docs = self
            .store
            .query(collections::APPOINTMENTS, &[filter])
            .await?;
        Ok(decode_appointments(&docs))
    }

    /// Subscribe to the live appointment set for `principal` as `role`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the subscription cannot be set up.
    pub async fn watch(
        &self,
        principal: &PrincipalId,
        role: Role,
    ) -> Result<Subscription, ServiceError> {
        let filter = Filter::equals(participant_field(role), principal.as_str());
        Ok(self
            .store
            .watch(collections::APPOINTMENTS, &[filter])
            .await?)
    }

    /// Delete an appointment on behalf of `caller`.
    ///
    /// Only the appointment's doctor or patient may delete it; anyone else
    /// gets `Forbidden`. Deleting an id that is already gone succeeds (the
    /// store's deletes are idempotent and the end state is identical).
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` when `caller` is neither
    /// participant.
    pub async fn delete(
        &self,
        id: &AppointmentId,
        caller: &PrincipalId,
    ) -> Result<(), ServiceError> {
        let Some(doc) = self.store.get(collections::APPOINTMENTS, id.as_str()).await? else {
            return Ok(());
        };

        let caller = caller.as_str();
        if doc.str_field("doctorId") != caller && doc.str_field("patientId") != caller {
            return Err(ServiceError::Forbidden(
                "only the appointment's doctor or patient may delete it".to_string(),
            ));
        }

        self.store.delete(collections::APPOINTMENTS, id.as_str()).await?;
        Ok(())
    }
}

/// Decode an appointment snapshot, skipping (and logging) corrupt documents.
pub fn decode_appointments(docs: &[Document]) -> Vec<Appointment> {
    docs.iter()
        .filter_map(|doc| match Appointment::from_document(doc) {
            Ok(appointment) => Some(appointment),
            Err(err) => {
                tracing::warn!(error = %err, "skipping corrupt appointment document");
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_booking_visible_to_both_participants() {
        let store = MemoryStore::new();
        let service = AppointmentService::new(&store);
        let patient = PrincipalId::new("p1");

        let id = service
            .book("d1", &patient, "2025-03-01T10:00", "follow-up")
            .await
            .unwrap();

        let as_doctor = service
            .list(&PrincipalId::new("d1"), Role::Doctor)
            .await
            .unwrap();
        assert_eq!(as_doctor.len(), 1);
        assert_eq!(as_doctor.first().unwrap().id, id);
        assert_eq!(as_doctor.first().unwrap().notes, "follow-up");

        let as_patient = service.list(&patient, Role::Patient).await.unwrap();
        assert_eq!(as_patient.len(), 1);
        assert_eq!(as_patient.first().unwrap().id, id);
    }

    #[tokio::test]
    async fn test_lists_are_filtered_per_participant() {
        let store = MemoryStore::new();
        let service = AppointmentService::new(&store);

        service
            .book("d1", &PrincipalId::new("p1"), "2025-03-01T10:00", "")
            .await
            .unwrap();
        service
            .book("d2", &PrincipalId::new("p2"), "2025-03-01T11:00", "")
            .await
            .unwrap();

        let d1 = service.list(&PrincipalId::new("d1"), Role::Doctor).await.unwrap();
        assert_eq!(d1.len(), 1);
        assert_eq!(d1.first().unwrap().patient_id.as_str(), "p1");

        let p2 = service.list(&PrincipalId::new("p2"), Role::Patient).await.unwrap();
        assert_eq!(p2.len(), 1);
        assert_eq!(p2.first().unwrap().doctor_id.as_str(), "d2");
    }

    #[tokio::test]
    async fn test_book_requires_doctor_and_parseable_timestamp() {
        let store = MemoryStore::new();
        let service = AppointmentService::new(&store);
        let patient = PrincipalId::new("p1");

        let err = service.book("", &patient, "2025-03-01T10:00", "").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = service.book("d1", &patient, "sometime soon", "").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        assert!(service.list(&patient, Role::Patient).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_booking_ignores_availability() {
        // No slot exists for d1 at all; booking still succeeds.
        let store = MemoryStore::new();
        let service = AppointmentService::new(&store);

        service
            .book("d1", &PrincipalId::new("p1"), "2025-03-01T10:00", "")
            .await
            .unwrap();
        service
            .book("d1", &PrincipalId::new("p2"), "2025-03-01T10:00", "")
            .await
            .unwrap();

        // Overlapping bookings for the same doctor coexist
        let both = service.list(&PrincipalId::new("d1"), Role::Doctor).await.unwrap();
        assert_eq!(both.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_by_participant_removes_from_both_lists() {
        let store = MemoryStore::new();
        let service = AppointmentService::new(&store);
        let patient = PrincipalId::new("p1");

        let id = service
            .book("d1", &patient, "2025-03-01T10:00", "")
            .await
            .unwrap();
        service.delete(&id, &patient).await.unwrap();

        assert!(service.list(&patient, Role::Patient).await.unwrap().is_empty());
        assert!(
            service
                .list(&PrincipalId::new("d1"), Role::Doctor)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_delete_by_doctor_participant() {
        let store = MemoryStore::new();
        let service = AppointmentService::new(&store);
        let doctor = PrincipalId::new("d1");

        let id = service
            .book("d1", &PrincipalId::new("p1"), "2025-03-01T10:00", "")
            .await
            .unwrap();
        service.delete(&id, &doctor).await.unwrap();
        assert!(service.list(&doctor, Role::Doctor).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_stranger_is_forbidden() {
        let store = MemoryStore::new();
        let service = AppointmentService::new(&store);

        let id = service
            .book("d1", &PrincipalId::new("p1"), "2025-03-01T10:00", "")
            .await
            .unwrap();

        let err = service.delete(&id, &PrincipalId::new("p2")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        // Still there
        assert_eq!(
            service
                .list(&PrincipalId::new("d1"), Role::Doctor)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_delete_of_absent_id_is_noop() {
        let store = MemoryStore::new();
        let service = AppointmentService::new(&store);
        service
            .delete(&AppointmentId::new("ghost"), &PrincipalId::new("p1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_watch_sees_new_booking() {
        let store = MemoryStore::new();
        let service = AppointmentService::new(&store);
        let doctor = PrincipalId::new("d1");

        let mut sub = service.watch(&doctor, Role::Doctor).await.unwrap();
        assert!(sub.snapshot().is_empty());

        service
            .book("d1", &PrincipalId::new("p1"), "2025-03-01T10:00", "")
            .await
            .unwrap();

        assert!(
            tokio::time::timeout(std::time::Duration::from_secs(1), sub.changed())
                .await
                .unwrap()
        );
        assert_eq!(decode_appointments(&sub.snapshot()).len(), 1);
    }
}
