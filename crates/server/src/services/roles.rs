//! Role resolution.

use medibook_core::{PrincipalId, Role};

use crate::store::{DocumentStore, StoreError};

use super::collections;

/// Resolves which role a principal registered under.
///
/// Probes the doctor collection, then the patient collection; the first hit
/// wins, so a principal that (against convention) holds both profiles
/// resolves as a doctor. Deliberately uncached: resolution happens on every
/// authenticated transition that needs it, so profile deletions are
/// observed immediately.
pub struct RoleResolver<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> RoleResolver<'a> {
    /// Create a resolver over `store`.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Resolve the role of `principal`, or `None` when neither profile
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when the store cannot answer. Callers must
    /// treat that as "role unknown", never as "no role".
    pub async fn resolve(&self, principal: &PrincipalId) -> Result<Option<Role>, StoreError> {
        if self
            .store
            .get(collections::DOCTORS, principal.as_str())
            .await?
            .is_some()
        {
            return Ok(Some(Role::Doctor));
        }
        if self
            .store
            .get(collections::PATIENTS, principal.as_str())
            .await?
            .is_some()
        {
            return Ok(Some(Role::Patient));
        }
        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{Document, Fields, Filter, MemoryStore, Subscription};
    use async_trait::async_trait;
    use serde_json::json;

    async fn seed(store: &MemoryStore, collection: &str, id: &str) {
        let fields = match json!({"name": "x"}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        store.set(collection, id, fields, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_resolves_doctor_only() {
        let store = MemoryStore::new();
        seed(&store, collections::DOCTORS, "u1").await;

        let role = RoleResolver::new(&store)
            .resolve(&PrincipalId::new("u1"))
            .await
            .unwrap();
        assert_eq!(role, Some(Role::Doctor));
    }

    #[tokio::test]
    async fn test_resolves_patient_only() {
        let store = MemoryStore::new();
        seed(&store, collections::PATIENTS, "u1").await;

        let role = RoleResolver::new(&store)
            .resolve(&PrincipalId::new("u1"))
            .await
            .unwrap();
        assert_eq!(role, Some(Role::Patient));
    }

    #[tokio::test]
    async fn test_resolves_none_for_unregistered() {
        let store = MemoryStore::new();
        let role = RoleResolver::new(&store)
            .resolve(&PrincipalId::new("ghost"))
            .await
            .unwrap();
        assert_eq!(role, None);
    }

    #[tokio::test]
    async fn test_doctor_wins_when_both_profiles_exist() {
        let store = MemoryStore::new();
        seed(&store, collections::DOCTORS, "u1").await;
        seed(&store, collections::PATIENTS, "u1").await;

        let role = RoleResolver::new(&store)
            .resolve(&PrincipalId::new("u1"))
            .await
            .unwrap();
        assert_eq!(role, Some(Role::Doctor));
    }

    /// A store that is always down.
    struct DownStore;

    #[async_trait]
    impl DocumentStore for DownStore {
        async fn get(&self, _: &str, _: &str) -> Result<Option<Document>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn set(&self, _: &str, _: &str, _: Fields, _: bool) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn delete(&self, _: &str, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn add(&self, _: &str, _: Fields) -> Result<String, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn query(&self, _: &str, _: &[Filter]) -> Result<Vec<Document>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
        async fn watch(&self, _: &str, _: &[Filter]) -> Result<Subscription, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_not_no_role() {
        // "role unknown" must surface as an error, never as None
        let result = RoleResolver::new(&DownStore)
            .resolve(&PrincipalId::new("u1"))
            .await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
