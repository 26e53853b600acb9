//! Appointment route handlers.
//!
//! Booking is patient-only; listing, streaming, and cancelling work for
//! either role, always scoped to the appointments the caller participates
//! in. Like the slot stream, the live endpoint emits whole snapshots.

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

use medibook_core::{AppointmentId, Role};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Appointment;
use crate::services::{AppointmentService, appointments::decode_appointments};
use crate::state::AppState;

use super::require_role;

/// Booking request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub doctor_id: String,
    pub date_time: String,
    #[serde(default)]
    pub notes: String,
}

/// Book an appointment with a doctor (patient role).
pub async fn book(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<BookRequest>,
) -> Result<impl IntoResponse> {
    match require_role(&state, &user).await? {
        Role::Patient => {}
        Role::Doctor => {
            return Err(AppError::Forbidden("patient role required".to_string()));
        }
    }

    let id = AppointmentService::new(state.store())
        .book(&req.doctor_id, &user.principal, &req.date_time, &req.notes)
        .await?;

    tracing::info!(appointment = %id, patient = %user.principal, "appointment booked");
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// List the caller's appointments.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Appointment>>> {
    let role = require_role(&state, &user).await?;
    let appointments = AppointmentService::new(state.store())
        .list(&user.principal, role)
        .await?;
    Ok(Json(appointments))
}

/// Stream the caller's live appointment set as SSE snapshot events.
pub async fn stream(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let role = require_role(&state, &user).await?;
    let subscription = AppointmentService::new(state.store())
        .watch(&user.principal, role)
        .await?;

    let stream = subscription
        .into_stream()
        .map(|docs| Event::default().json_data(decode_appointments(&docs)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Cancel an appointment the caller participates in.
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    // Participation, not role, is the guard here; the service checks it
    // against the stored document.
    require_role(&state, &user).await?;
    AppointmentService::new(state.store())
        .delete(&AppointmentId::new(id), &user.principal)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
