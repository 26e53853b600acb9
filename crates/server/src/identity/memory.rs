//! In-process identity provider.
//!
//! Argon2-hashed credentials in memory. Stands in for the hosted provider
//! during local development and tests; principals are uuid-v4 strings, the
//! same opaque shape the hosted provider issues.

use std::collections::HashMap;
use std::sync::RwLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use uuid::Uuid;

use medibook_core::{Email, PrincipalId};

use super::{AuthError, IdentityProvider};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug)]
struct Account {
    principal: PrincipalId,
    password_hash: String,
}

/// An in-memory [`IdentityProvider`].
#[derive(Debug, Default)]
pub struct MemoryIdentity {
    accounts: RwLock<HashMap<Email, Account>>,
}

impl MemoryIdentity {
    /// Create a provider with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_up(&self, email: &Email, password: &str) -> Result<PrincipalId, AuthError> {
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        if accounts.contains_key(email) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let principal = PrincipalId::new(Uuid::new_v4().to_string());
        accounts.insert(
            email.clone(),
            Account {
                principal: principal.clone(),
                password_hash,
            },
        );
        Ok(principal)
    }

    async fn sign_in(&self, email: &Email, password: &str) -> Result<PrincipalId, AuthError> {
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        let account = accounts.get(email).ok_or(AuthError::UserNotFound)?;
        verify_password(password, &account.password_hash)?;
        Ok(account.principal.clone())
    }
}

/// Validate a password against the strength policy.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with Argon2.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::Hash)
}

/// Verify a password against a stored Argon2 hash.
fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::Hash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::WrongPassword)
}
