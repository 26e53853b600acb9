//! Domain types.
//!
//! These types represent the documents of the external store as validated
//! domain objects. Reads are lenient where the stored data is loosely typed
//! (profile strings), strict where corruption would poison the domain
//! (timestamps, participant references).

pub mod booking;
pub mod profile;
pub mod session;

pub use booking::{Appointment, AvailabilitySlot};
pub use profile::{DoctorProfile, DoctorProfileInput, PatientProfile, PatientProfileInput, Profile};
pub use session::CurrentUser;
pub use session::keys as session_keys;

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

/// A stored document that cannot be mapped onto its domain type.
///
/// The store is schemaless and writable out-of-band, so list and stream
/// paths skip (and log) corrupt documents instead of failing wholesale.
#[derive(Debug, Error)]
#[error("document {id}: {reason}")]
pub struct CorruptDocument {
    /// Id of the offending document.
    pub id: String,
    /// What failed to decode.
    pub reason: String,
}

/// Parse a timestamp as clients send it.
///
/// Accepts RFC 3339 as well as the `YYYY-MM-DDTHH:MM[:SS]` shape that
/// `datetime-local` form controls produce; the latter is taken as UTC.
#[must_use]
pub fn parse_client_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    None
}
