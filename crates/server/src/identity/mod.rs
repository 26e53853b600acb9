//! Identity Provider Adapter.
//!
//! Credentials live with an external identity provider; this module defines
//! the seam the server consumes it through. The provider issues an opaque
//! [`PrincipalId`] at sign-up that every profile, slot, and appointment
//! references from then on.
//!
//! The provider-side `signOut` and auth-change notification surface maps
//! onto the HTTP session lifecycle here: login stores the principal in the
//! session, logout flushes it, and extractors observe the current state on
//! every request.

pub mod memory;

pub use memory::MemoryIdentity;

use async_trait::async_trait;
use thiserror::Error;

use medibook_core::{Email, EmailError, PrincipalId};

/// Errors surfaced by the identity provider, subtyped by the provider's own
/// reason codes.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed email address.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No account exists for the email.
    #[error("user not found")]
    UserNotFound,

    /// The password does not match the account.
    #[error("wrong password")]
    WrongPassword,

    /// Sign-up with an email that already has an account.
    #[error("email already in use")]
    EmailAlreadyInUse,

    /// Password rejected by the provider's strength policy.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The provider could not be reached.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    /// Local credential hashing failed.
    #[error("password hashing error")]
    Hash,
}

/// The narrow interface to the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and return its principal.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailAlreadyInUse` if the email has an account,
    /// `AuthError::WeakPassword` if the password fails the strength policy.
    async fn sign_up(&self, email: &Email, password: &str) -> Result<PrincipalId, AuthError>;

    /// Verify credentials and return the account's principal.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` or `AuthError::WrongPassword` when
    /// the credentials do not check out.
    async fn sign_in(&self, email: &Email, password: &str) -> Result<PrincipalId, AuthError>;
}
