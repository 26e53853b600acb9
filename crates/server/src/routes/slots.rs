//! Availability slot route handlers (doctor role).
//!
//! The live endpoint streams whole snapshots over SSE: every change to the
//! doctor's schedule emits the full current slot set as one event. Clients
//! replace, not patch.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    response::sse::{Event, KeepAlive, Sse},
};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::StreamExt;

use medibook_core::{Role, SlotId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{AvailabilitySlot, CurrentUser};
use crate::services::{AvailabilityService, availability::decode_slots};
use crate::state::AppState;

use super::require_role;

/// Slot creation request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSlotRequest {
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

const fn default_available() -> bool {
    true
}

async fn require_doctor(state: &AppState, user: &CurrentUser) -> Result<()> {
    match require_role(state, user).await? {
        Role::Doctor => Ok(()),
        Role::Patient => Err(AppError::Forbidden(
            "doctor role required".to_string(),
        )),
    }
}

/// Create a slot in the caller's schedule.
pub async fn create_slot(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<NewSlotRequest>,
) -> Result<impl IntoResponse> {
    require_doctor(&state, &user).await?;
    let id = AvailabilityService::new(state.store())
        .add_slot(&user.principal, &req.start_time, &req.end_time, req.available)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// List the caller's slots.
pub async fn list_slots(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<AvailabilitySlot>>> {
    require_doctor(&state, &user).await?;
    let slots = AvailabilityService::new(state.store())
        .list_slots(&user.principal)
        .await?;
    Ok(Json(slots))
}

/// Stream the caller's live slot set as SSE snapshot events.
pub async fn stream_slots(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    require_doctor(&state, &user).await?;
    let subscription = AvailabilityService::new(state.store())
        .watch_slots(&user.principal)
        .await?;

    let stream = subscription
        .into_stream()
        .map(|docs| Event::default().json_data(decode_slots(&docs)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Delete one of the caller's slots. Absent ids succeed.
pub async fn delete_slot(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    require_doctor(&state, &user).await?;
    AvailabilityService::new(state.store())
        .delete_slot(&user.principal, &SlotId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
