//! Profile management.

use serde_json::json;

use medibook_core::{Email, PrincipalId, Role};

use crate::models::{DoctorProfile, DoctorProfileInput, PatientProfile, PatientProfileInput, Profile};
use crate::store::{DocumentStore, Fields};

use super::{ServiceError, collections};

/// Create, read, update, and delete profile documents.
pub struct ProfileService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ProfileService<'a> {
    /// Create a service over `store`.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Seed the profile document written at registration:
    /// `{name, email, userType}` in the role's collection.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the write fails.
    pub async fn register_profile(
        &self,
        principal: &PrincipalId,
        role: Role,
        name: &str,
        email: &Email,
    ) -> Result<(), ServiceError> {
        let fields = object_fields(json!({
            "name": name,
            "email": email.as_str(),
            "userType": role.as_str(),
        }));
        self.store
            .set(collections::profiles(role), principal.as_str(), fields, false)
            .await?;
        Ok(())
    }

    /// Fetch the principal's profile for `role`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` when no profile document exists.
    pub async fn get(&self, principal: &PrincipalId, role: Role) -> Result<Profile, ServiceError> {
        let doc = self
            .store
            .get(collections::profiles(role), principal.as_str())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("no {role} profile for {principal}")))?;

        Ok(match role {
            Role::Doctor => Profile::Doctor(DoctorProfile::from_document(&doc)),
            Role::Patient => Profile::Patient(PatientProfile::from_document(&doc)),
        })
    }

    /// Merge-upsert a doctor's profile.
    ///
    /// All fields are required non-empty; validation happens before any
    /// write, so a rejected save changes nothing. Merge semantics preserve
    /// stored fields the input does not mention (email, userType).
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` naming the first empty field.
    pub async fn save_doctor(
        &self,
        principal: &PrincipalId,
        input: DoctorProfileInput,
    ) -> Result<(), ServiceError> {
        if let Some(field) = input.missing_field() {
            return Err(ServiceError::Validation(format!("{field} must not be empty")));
        }
        self.store
            .set(collections::DOCTORS, principal.as_str(), input.into_fields(), true)
            .await?;
        Ok(())
    }

    /// Merge-upsert a patient's profile. Same contract as [`Self::save_doctor`].
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` naming the first empty field.
    pub async fn save_patient(
        &self,
        principal: &PrincipalId,
        input: PatientProfileInput,
    ) -> Result<(), ServiceError> {
        if let Some(field) = input.missing_field() {
            return Err(ServiceError::Validation(format!("{field} must not be empty")));
        }
        self.store
            .set(collections::PATIENTS, principal.as_str(), input.into_fields(), true)
            .await?;
        Ok(())
    }

    /// Remove the profile document unconditionally.
    ///
    /// Dependent slots and appointments are NOT cleaned up; orphaned
    /// references are an accepted inconsistency of this design.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the delete fails.
    pub async fn delete(&self, principal: &PrincipalId, role: Role) -> Result<(), ServiceError> {
        self.store
            .delete(collections::profiles(role), principal.as_str())
            .await?;
        Ok(())
    }

    /// The doctor directory shown to patients when booking.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the query fails.
    pub async fn list_doctors(&self) -> Result<Vec<DoctorProfile>, ServiceError> {
        let docs = self.store.query(collections::DOCTORS, &[]).await?;
        Ok(docs.iter().map(DoctorProfile::from_document).collect())
    }
}

fn object_fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Fields::new(),
    }
}
