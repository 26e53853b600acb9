//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use medibook_core::{Email, PrincipalId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in principal.
/// The role is deliberately not cached here: it is resolved against the
/// store whenever a role-gated operation needs it, so a deleted profile is
/// observed immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Identity-provider-issued principal.
    pub principal: PrincipalId,
    /// The email the principal signed in with.
    pub email: Email,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
