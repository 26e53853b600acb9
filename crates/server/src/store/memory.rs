//! In-process document store.
//!
//! Backs local development and the test suites. Matches the hosted
//! backend's observable behavior: schemaless fields, merge-or-replace
//! writes, idempotent deletes, equality-filtered queries, and push-based
//! watch subscriptions.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use super::{Document, DocumentStore, Fields, Filter, StoreError, Subscription, matches_filters};

/// Capacity of the change-notification channel. A lagged watcher recomputes
/// its snapshot from scratch, so overflow only costs a redundant query.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// An in-memory [`DocumentStore`].
///
/// Cheaply cloneable; clones share the same data and change feed.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    collections: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
    changes: broadcast::Sender<String>,
}

impl Inner {
    /// Run an equality query under the read lock.
    fn query_sync(&self, collection: &str, filters: &[Filter]) -> Vec<Document> {
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        collections.get(collection).map_or_else(Vec::new, |docs| {
            docs.iter()
                .filter(|(_, fields)| matches_filters(fields, filters))
                .map(|(id, fields)| Document {
                    id: id.clone(),
                    fields: fields.clone(),
                })
                .collect()
        })
    }

    /// Announce that a collection's contents changed.
    fn notify(&self, collection: &str) {
        // No receivers is fine; watchers subscribe lazily.
        let _ = self.changes.send(collection.to_string());
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                collections: RwLock::new(HashMap::new()),
                changes,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self
            .inner
            .collections
            .read()
            .unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        merge: bool,
    ) -> Result<(), StoreError> {
        {
            let mut collections = self
                .inner
                .collections
                .write()
                .unwrap_or_else(|e| e.into_inner());
            let docs = collections.entry(collection.to_string()).or_default();
            if merge {
                let existing = docs.entry(id.to_string()).or_default();
                for (key, value) in fields {
                    existing.insert(key, value);
                }
            } else {
                docs.insert(id.to_string(), fields);
            }
        }
        self.inner.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let removed = {
            let mut collections = self
                .inner
                .collections
                .write()
                .unwrap_or_else(|e| e.into_inner());
            collections
                .get_mut(collection)
                .is_some_and(|docs| docs.remove(id).is_some())
        };
        if removed {
            self.inner.notify(collection);
        }
        Ok(())
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.set(collection, &id, fields, false).await?;
        Ok(id)
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self.inner.query_sync(collection, filters))
    }

    async fn watch(
        &self,
        collection: &str,
        filters: &[Filter],
    ) -> Result<Subscription, StoreError> {
        // Subscribe before taking the initial snapshot so no change between
        // the two is lost.
        let mut changes = self.inner.changes.subscribe();
        let initial = self.inner.query_sync(collection, filters);
        let (tx, rx) = watch::channel(initial);

        let inner = Arc::clone(&self.inner);
        let collection = collection.to_string();
        let filters = filters.to_vec();
        let task = tokio::spawn(async move {
            loop {
                let recompute = match changes.recv().await {
                    Ok(changed) => changed == collection,
                    // Missed notifications; resync unconditionally.
                    Err(broadcast::error::RecvError::Lagged(_)) => true,
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if recompute {
                    let docs = inner.query_sync(&collection, &filters);
                    tx.send_if_modified(|current| {
                        if *current == docs {
                            false
                        } else {
                            *current = docs;
                            true
                        }
                    });
                }
            }
        });

        Ok(Subscription::new(rx, task))
    }
}
