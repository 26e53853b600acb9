//! Domain services.
//!
//! Thin orchestration over the [`DocumentStore`](crate::store::DocumentStore)
//! seam: role resolution, profiles, availability, appointments. Services are
//! constructed per request and borrow the store, mirroring how request
//! handlers use them.

pub mod appointments;
pub mod availability;
pub mod profiles;
pub mod roles;

pub use appointments::AppointmentService;
pub use availability::AvailabilityService;
pub use profiles::ProfileService;
pub use roles::RoleResolver;

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the domain services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or malformed required input, detected before any write.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An expected document is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller is not allowed to touch the target document.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The document store failed; the operation's outcome is unknown.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Store layout: which collections the domain lives in.
pub mod collections {
    use medibook_core::{PrincipalId, Role};

    /// Doctor profiles, keyed by principal.
    pub const DOCTORS: &str = "doctors";
    /// Patient profiles, keyed by principal.
    pub const PATIENTS: &str = "patients";
    /// Appointments, store-issued ids.
    pub const APPOINTMENTS: &str = "appointments";

    /// The profile collection for a role.
    #[must_use]
    pub const fn profiles(role: Role) -> &'static str {
        match role {
            Role::Doctor => DOCTORS,
            Role::Patient => PATIENTS,
        }
    }

    /// A doctor's schedule subcollection.
    #[must_use]
    pub fn schedule(doctor: &PrincipalId) -> String {
        format!("{DOCTORS}/{doctor}/schedule")
    }
}
