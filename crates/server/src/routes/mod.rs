//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                 - Health check
//!
//! # Auth
//! POST   /auth/register          - Create account + seed profile
//! POST   /auth/login             - Verify credentials, start session
//! POST   /auth/logout            - End session
//! GET    /auth/me                - Who am I (principal + role)
//!
//! # Profiles (requires auth)
//! GET    /profile                - Own profile for the resolved role
//! PUT    /profile                - Merge-upsert own profile
//! DELETE /profile                - Delete own profile document
//! GET    /doctors                - Doctor directory (any role)
//!
//! # Availability slots (doctor role)
//! POST   /slots                  - Create a slot
//! GET    /slots                  - List own slots
//! GET    /slots/live             - Live slot set (SSE)
//! DELETE /slots/{id}             - Delete a slot
//!
//! # Appointments
//! POST   /appointments           - Book (patient role)
//! GET    /appointments           - Own appointments (either role)
//! GET    /appointments/live      - Live appointment set (SSE)
//! DELETE /appointments/{id}      - Cancel (participants only)
//! ```

pub mod appointments;
pub mod auth;
pub mod profile;
pub mod slots;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(profile::get_profile)
                .put(profile::update_profile)
                .delete(profile::delete_profile),
        )
        .route("/doctors", get(profile::list_doctors))
}

/// Create the availability slot routes router.
pub fn slot_routes() -> Router<AppState> {
    Router::new()
        .route("/slots", post(slots::create_slot).get(slots::list_slots))
        .route("/slots/live", get(slots::stream_slots))
        .route("/slots/{id}", delete(slots::delete_slot))
}

/// Create the appointment routes router.
pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/appointments",
            post(appointments::book).get(appointments::list),
        )
        .route("/appointments/live", get(appointments::stream))
        .route("/appointments/{id}", delete(appointments::cancel))
}

/// Build the complete application router, middleware included.
///
/// Shared between the binary and the integration test harness.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes())
        .merge(profile_routes())
        .merge(slot_routes())
        .merge(appointment_routes())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Resolve the caller's role, rejecting principals that have no profile.
///
/// Resolution is per request on purpose: deleting the profile revokes the
/// role on the very next call, even within a live session.
pub(crate) async fn require_role(
    state: &AppState,
    user: &crate::models::CurrentUser,
) -> crate::error::Result<medibook_core::Role> {
    crate::services::RoleResolver::new(state.store())
        .resolve(&user.principal)
        .await?
        .ok_or_else(|| {
            crate::error::AppError::Forbidden("no profile registered for this account".to_string())
        })
}
