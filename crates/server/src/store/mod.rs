//! Document Store Adapter.
//!
//! # Architecture
//!
//! The hosted document database is an external collaborator: schemaless
//! collections of JSON documents with per-document read/write/delete,
//! equality-filtered queries, and live-update subscriptions. This module
//! defines the narrow seam the rest of the server consumes it through, plus
//! two implementations:
//!
//! - [`MemoryStore`] - in-process, push-based subscriptions; used by tests
//!   and local development
//! - [`HttpStore`] - reqwest client for the hosted backend; subscriptions
//!   poll because the remote API has no push channel
//!
//! Subcollections are addressed with slash-joined paths, e.g.
//! `doctors/{id}/schedule`.

pub mod http;
pub mod memory;

pub use http::HttpStore;
pub use memory::MemoryStore;

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::{Stream, wrappers::WatchStream};

/// The field set of a schemaless document.
pub type Fields = Map<String, Value>;

/// A document read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-issued document id (unique within its collection).
    pub id: String,
    /// The document's fields. No schema is enforced by the store.
    pub fields: Fields,
}

impl Document {
    /// Read a string field, treating absent and non-string values as empty.
    ///
    /// Mirrors how the store's own clients read loosely-typed documents:
    /// a missing field is indistinguishable from an empty one.
    #[must_use]
    pub fn str_field(&self, name: &str) -> &str {
        self.fields.get(name).and_then(Value::as_str).unwrap_or("")
    }
}

/// An equality filter on one field.
///
/// The store supports conjunctions of equality filters only; anything
/// richer is the caller's problem.
#[derive(Debug, Clone)]
pub struct Filter {
    /// Field name to compare.
    pub field: String,
    /// Value the field must equal.
    pub equals: Value,
}

impl Filter {
    /// Build an equality filter.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            equals: value.into(),
        }
    }
}

/// Errors surfaced by the document store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached at the transport level. Callers must
    /// treat this as "state unknown", never as "document absent".
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the operation.
    #[error("document store rejected the operation: {0}")]
    Rejected(String),

    /// The store answered with a payload this adapter cannot decode.
    #[error("malformed document store payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Returns true when every filter matches the document's fields.
#[must_use]
pub fn matches_filters(fields: &Fields, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|f| fields.get(&f.field) == Some(&f.equals))
}

/// The narrow interface to the external document database.
///
/// All operations are single round-trips; there are no transactions and no
/// cross-document invariants. `set` with `merge` preserves existing fields
/// that the write does not mention.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document by id. `Ok(None)` means the document is absent.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create or overwrite a document. With `merge`, fields absent from
    /// `fields` keep their stored values.
    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        merge: bool,
    ) -> Result<(), StoreError>;

    /// Delete a document. Deleting an absent document is a no-op.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Create a document with a store-issued id.
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Fetch every document matching all `filters`. Ordering is
    /// store-defined; callers must not rely on it.
    async fn query(&self, collection: &str, filters: &[Filter])
    -> Result<Vec<Document>, StoreError>;

    /// Subscribe to the live result set of a query. The returned handle
    /// carries the current snapshot and updates as documents change;
    /// dropping it releases the channel.
    async fn watch(&self, collection: &str, filters: &[Filter])
    -> Result<Subscription, StoreError>;
}

/// Aborts a background task when dropped.
#[derive(Debug)]
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A live query subscription.
///
/// Holds the channel receiver and the task that feeds it. Tearing down the
/// consuming view is expressed by dropping this handle; in-flight writes are
/// not cancelled, only future pushes stop (there is nothing to cancel on the
/// read side).
#[derive(Debug)]
pub struct Subscription {
    rx: watch::Receiver<Vec<Document>>,
    guard: AbortOnDrop,
}

impl Subscription {
    pub(crate) fn new(rx: watch::Receiver<Vec<Document>>, task: JoinHandle<()>) -> Self {
        Self {
            rx,
            guard: AbortOnDrop(task),
        }
    }

    /// The most recently pushed result set.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Document> {
        self.rx.borrow().clone()
    }

    /// Wait for the next push. Returns `false` if the feeding side is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Convert into a stream of result-set snapshots.
    ///
    /// The first item is the current snapshot; each subsequent item is a
    /// fresh snapshot after a change. The feeding task stays alive as long
    /// as the stream does.
    #[must_use]
    pub fn into_stream(self) -> SubscriptionStream {
        SubscriptionStream {
            inner: WatchStream::new(self.rx),
            _guard: self.guard,
        }
    }
}

/// Stream adapter over a [`Subscription`].
#[derive(Debug)]
pub struct SubscriptionStream {
    inner: WatchStream<Vec<Document>>,
    _guard: AbortOnDrop,
}

impl Stream for SubscriptionStream {
    type Item = Vec<Document>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_matches_filters_empty_matches_all() {
        let doc = fields(json!({"doctorId": "d1"}));
        assert!(matches_filters(&doc, &[]));
    }

    #[test]
    fn test_matches_filters_equality() {
        let doc = fields(json!({"doctorId": "d1", "patientId": "p1"}));
        assert!(matches_filters(&doc, &[Filter::equals("doctorId", "d1")]));
        assert!(!matches_filters(&doc, &[Filter::equals("doctorId", "d2")]));
        assert!(matches_filters(
            &doc,
            &[
                Filter::equals("doctorId", "d1"),
                Filter::equals("patientId", "p1"),
            ]
        ));
    }

    #[test]
    fn test_matches_filters_absent_field_never_matches() {
        let doc = fields(json!({"doctorId": "d1"}));
        assert!(!matches_filters(&doc, &[Filter::equals("patientId", "p1")]));
    }

    #[test]
    fn test_document_str_field_lenient() {
        let doc = Document {
            id: "x".to_string(),
            fields: fields(json!({"name": "Dr. Osei", "age": 52})),
        };
        assert_eq!(doc.str_field("name"), "Dr. Osei");
        // Non-string and absent fields read as empty
        assert_eq!(doc.str_field("age"), "");
        assert_eq!(doc.str_field("missing"), "");
    }
}
