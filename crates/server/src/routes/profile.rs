//! Profile route handlers.
//!
//! All four endpoints operate on the caller's own profile; which collection
//! that lives in follows from the role resolved for this request.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use serde_json::Value;

use medibook_core::Role;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{DoctorProfile, DoctorProfileInput, PatientProfileInput, Profile};
use crate::services::ProfileService;
use crate::state::AppState;

use super::require_role;

/// A profile together with the role it was resolved under.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub role: Role,
    pub profile: Profile,
}

/// Fetch the caller's profile.
pub async fn get_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ProfileResponse>> {
    let role = require_role(&state, &user).await?;
    let profile = ProfileService::new(state.store())
        .get(&user.principal, role)
        .await?;
    Ok(Json(ProfileResponse { role, profile }))
}

/// Merge-upsert the caller's profile.
///
/// The body's accepted shape depends on the caller's role, so it arrives as
/// raw JSON and is deserialized after resolution.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<Value>,
) -> Result<StatusCode> {
    let role = require_role(&state, &user).await?;
    let service = ProfileService::new(state.store());

    match role {
        Role::Doctor => {
            let input: DoctorProfileInput = serde_json::from_value(body)
                .map_err(|err| AppError::Validation(format!("invalid profile body: {err}")))?;
            service.save_doctor(&user.principal, input).await?;
        }
        Role::Patient => {
            let input: PatientProfileInput = serde_json::from_value(body)
                .map_err(|err| AppError::Validation(format!("invalid profile body: {err}")))?;
            service.save_patient(&user.principal, input).await?;
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Delete the caller's profile document.
///
/// The account itself survives; a later `GET /auth/me` reports `role: null`.
pub async fn delete_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<StatusCode> {
    let role = require_role(&state, &user).await?;
    ProfileService::new(state.store())
        .delete(&user.principal, role)
        .await?;

    tracing::info!(principal = %user.principal, role = %role, "profile deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// The doctor directory, visible to any signed-in user.
pub async fn list_doctors(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<Json<Vec<DoctorProfile>>> {
    let doctors = ProfileService::new(state.store()).list_doctors().await?;
    Ok(Json(doctors))
}
