//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions. Session ids live in a
//! signed cookie so a tampered cookie is rejected before it reaches any
//! handler.

use secrecy::ExposeSecret;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "mb_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store.
///
/// Sessions do not survive a restart; clients simply log in again. The
/// signing key is derived from `session_secret`, which the configuration
/// layer guarantees is at least 32 bytes.
#[must_use]
pub fn create_session_layer(config: &Config) -> SessionManagerLayer<MemoryStore, SignedCookie> {
    let store = MemoryStore::default();

    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");

    let key = tower_sessions::cookie::Key::derive_from(
        config.session_secret.expose_secret().as_bytes(),
    );

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}
