//! Unified error handling.
//!
//! Provides a unified `AppError` type that maps every failure onto a single
//! JSON response. All route handlers return `Result<T, AppError>`. Per the
//! error policy, a failure is surfaced once to the caller: no retries, no
//! durable audit trail, no escalation beyond the request.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::identity::AuthError;
use crate::services::ServiceError;
use crate::store::StoreError;

/// Application-level error type for the booking service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Identity provider rejected the operation.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Document store failed; the operation's outcome is unknown.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Missing or malformed required input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but not allowed to do this.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(message) => Self::Validation(message),
            ServiceError::NotFound(message) => Self::NotFound(message),
            ServiceError::Forbidden(message) => Self::Forbidden(message),
            ServiceError::Store(err) => Self::Store(err),
        }
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session error: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Store(_) | Self::Internal(_)) {
            tracing::error!(error = %self, "request error");
        }

        let status = match &self {
            Self::Store(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::UserNotFound | AuthError::WrongPassword => StatusCode::UNAUTHORIZED,
                AuthError::EmailAlreadyInUse => StatusCode::CONFLICT,
                AuthError::Unavailable(_) => StatusCode::BAD_GATEWAY,
                AuthError::Hash => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(_) => "external service error".to_string(),
            Self::Internal(_) => "internal server error".to_string(),
            Self::Auth(err) => match err {
                // No account enumeration through login responses
                AuthError::UserNotFound | AuthError::WrongPassword => {
                    "invalid credentials".to_string()
                }
                AuthError::Unavailable(_) => "external service error".to_string(),
                AuthError::Hash => "internal server error".to_string(),
                other => other.to_string(),
            },
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
