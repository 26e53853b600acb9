//! Availability slot and appointment types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use medibook_core::{AppointmentId, PrincipalId, SlotId};

use crate::store::Document;

use super::CorruptDocument;

/// A doctor-declared open/closed time window
/// (`doctors/{principal}/schedule/{slot}`).
///
/// Slots are never mutated in place: a changed window is a new slot with a
/// fresh id. They are also entirely independent of appointments (see
/// [`crate::services::appointments`]).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub id: SlotId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub available: bool,
}

impl AvailabilitySlot {
    /// Map a stored document onto the domain type.
    ///
    /// # Errors
    ///
    /// Returns [`CorruptDocument`] when a timestamp is missing or
    /// unparseable. The start<end ordering is not re-checked: it is a
    /// write-time rule that out-of-band writes can bypass, and reads
    /// faithfully surface whatever was stored.
    pub fn from_document(doc: &Document) -> Result<Self, CorruptDocument> {
        Ok(Self {
            id: SlotId::new(doc.id.clone()),
            start_time: timestamp_field(doc, "startTime")?,
            end_time: timestamp_field(doc, "endTime")?,
            available: doc
                .fields
                .get("available")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }
}

/// A patient-initiated booking (`appointments/{id}`).
///
/// References both participants by principal; neither reference is
/// validated against the profile collections (orphaned references are an
/// accepted inconsistency of this design).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    pub doctor_id: PrincipalId,
    pub patient_id: PrincipalId,
    pub date_time: DateTime<Utc>,
    pub notes: String,
}

impl Appointment {
    /// Map a stored document onto the domain type.
    ///
    /// # Errors
    ///
    /// Returns [`CorruptDocument`] when a participant reference is missing
    /// or the timestamp does not parse.
    pub fn from_document(doc: &Document) -> Result<Self, CorruptDocument> {
        let doctor_id = doc.str_field("doctorId");
        if doctor_id.is_empty() {
            return Err(CorruptDocument {
                id: doc.id.clone(),
                reason: "missing doctorId".to_string(),
            });
        }
        let patient_id = doc.str_field("patientId");
        if patient_id.is_empty() {
            return Err(CorruptDocument {
                id: doc.id.clone(),
                reason: "missing patientId".to_string(),
            });
        }

        Ok(Self {
            id: AppointmentId::new(doc.id.clone()),
            doctor_id: PrincipalId::new(doctor_id),
            patient_id: PrincipalId::new(patient_id),
            date_time: timestamp_field(doc, "dateTime")?,
            notes: doc.str_field("notes").to_owned(),
        })
    }
}

/// Read a required RFC 3339 timestamp field.
fn timestamp_field(doc: &Document, name: &str) -> Result<DateTime<Utc>, CorruptDocument> {
    let raw = doc.str_field(name);
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CorruptDocument {
            id: doc.id.clone(),
            reason: format!("unparseable {name}: {raw:?}"),
        })
}
