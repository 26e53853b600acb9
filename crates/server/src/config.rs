//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MEDIBOOK_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `MEDIBOOK_HOST` - Bind address (default: 127.0.0.1)
//! - `MEDIBOOK_PORT` - Listen port (default: 3000)
//! - `MEDIBOOK_BASE_URL` - Public URL (default: `http://localhost:3000`)
//! - `MEDIBOOK_STORE` - Document store backend: `memory` or `http` (default: memory)
//!
//! ## Required when `MEDIBOOK_STORE=http`
//! - `MEDIBOOK_STORE_URL` - Base URL of the hosted document database
//! - `MEDIBOOK_STORE_API_KEY` - Bearer token for the document database
//!
//! ## Optional when `MEDIBOOK_STORE=http`
//! - `MEDIBOOK_STORE_POLL_SECS` - Watch poll interval in seconds (default: 2)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Which document store backend the server talks to.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// In-process store. For local development and tests.
    Memory,
    /// Hosted document database reached over HTTP.
    Http(HttpStoreConfig),
}

/// Connection settings for the hosted document database.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct HttpStoreConfig {
    /// Base URL of the document database, without a trailing slash.
    pub base_url: String,
    /// Bearer token presented on every request.
    pub api_key: SecretString,
    /// How often `watch` subscriptions poll the backend.
    pub poll_interval: Duration,
}

impl std::fmt::Debug for HttpStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStoreConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

/// Medibook server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the service
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Document store backend selection
    pub store: StoreBackend,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the session secret fails validation (placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("MEDIBOOK_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("MEDIBOOK_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("MEDIBOOK_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("MEDIBOOK_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("MEDIBOOK_BASE_URL", "http://localhost:3000");

        let session_secret = get_validated_secret("MEDIBOOK_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "MEDIBOOK_SESSION_SECRET")?;

        let store = store_backend_from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            store,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn store_backend_from_env() -> Result<StoreBackend, ConfigError> {
    match get_env_or_default("MEDIBOOK_STORE", "memory").as_str() {
        "memory" => Ok(StoreBackend::Memory),
        "http" => {
            let base_url = get_required_env("MEDIBOOK_STORE_URL")?
                .trim_end_matches('/')
                .to_string();
            let api_key = get_validated_secret("MEDIBOOK_STORE_API_KEY")?;
            let poll_secs = get_env_or_default("MEDIBOOK_STORE_POLL_SECS", "2")
                .parse::<u64>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar("MEDIBOOK_STORE_POLL_SECS".to_string(), e.to_string())
                })?;
            Ok(StoreBackend::Http(HttpStoreConfig {
                base_url,
                api_key,
                poll_interval: Duration::from_secs(poll_secs),
            }))
        }
        other => Err(ConfigError::InvalidEnvVar(
            "MEDIBOOK_STORE".to_string(),
            format!("expected \"memory\" or \"http\", got {other:?}"),
        )),
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_session_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(64)),
            store: StoreBackend::Memory,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_http_store_config_debug_redacts_api_key() {
        let config = HttpStoreConfig {
            base_url: "https://docs.example.net".to_string(),
            api_key: SecretString::from("kY7#pL2$wQ9@vB4!"),
            poll_interval: Duration::from_secs(2),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("docs.example.net"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("kY7#pL2"));
    }
}
