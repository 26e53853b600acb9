//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{Config, StoreBackend};
use crate::identity::{IdentityProvider, MemoryIdentity};
use crate::store::{DocumentStore, HttpStore, MemoryStore};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration and the two
/// external-service adapters.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Create application state with explicit adapters.
    ///
    /// Test harnesses use this to inject in-memory adapters they also hold
    /// a handle to.
    #[must_use]
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                identity,
            }),
        }
    }

    /// Create application state with the adapters the configuration selects.
    ///
    /// Credentials always live in the in-process provider; the hosted
    /// identity service has no self-servable API surface beyond what the
    /// session layer already covers.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        let store: Arc<dyn DocumentStore> = match &config.store {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Http(http) => Arc::new(HttpStore::new(http.clone())),
        };
        let identity: Arc<dyn IdentityProvider> = Arc::new(MemoryIdentity::new());
        Self::new(config, store, identity)
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get a reference to the document store adapter.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the identity provider adapter.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }
}
