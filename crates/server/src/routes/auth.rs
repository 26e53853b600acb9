//! Authentication route handlers.
//!
//! Registration creates the account with the identity provider and seeds
//! the role's profile document in one request. Login verifies credentials
//! and stores the principal in the session; the role rides along in the
//! response but is never cached server-side.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use medibook_core::{Email, PrincipalId, Role};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::{ProfileService, RoleResolver};
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Who the caller is, as auth endpoints report it.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub principal: PrincipalId,
    /// `None` when the principal has no profile document (anymore).
    pub role: Option<Role>,
}

/// Handle registration.
///
/// The profile seed write happens after account creation; if it fails, the
/// account exists without a profile and the error propagates as-is.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    let email = Email::parse(&req.email).map_err(crate::identity::AuthError::InvalidEmail)?;

    let principal = state.identity().sign_up(&email, &req.password).await?;
    ProfileService::new(state.store())
        .register_profile(&principal, req.role, &req.name, &email)
        .await?;

    tracing::info!(principal = %principal, role = %req.role, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            principal,
            role: Some(req.role),
        }),
    ))
}

/// Handle login.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    let email = Email::parse(&req.email).map_err(crate::identity::AuthError::InvalidEmail)?;

    let principal = state.identity().sign_in(&email, &req.password).await?;
    let role = RoleResolver::new(state.store()).resolve(&principal).await?;

    set_current_user(
        &session,
        &CurrentUser {
            principal: principal.clone(),
            email,
        },
    )
    .await?;

    tracing::info!(principal = %principal, "logged in");

    Ok(Json(SessionResponse { principal, role }))
}

/// Handle logout. Logging out while logged out is fine.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Report the caller's principal and freshly-resolved role.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<SessionResponse>> {
    let role = RoleResolver::new(state.store()).resolve(&user.principal).await?;
    Ok(Json(SessionResponse {
        principal: user.principal,
        role,
    }))
}
