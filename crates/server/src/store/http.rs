//! HTTP client for the hosted document database.
//!
//! # Wire protocol
//!
//! Plain JSON over HTTP, bearer-token authenticated:
//!
//! ```text
//! GET    /v1/{collection}/{id}        -> 200 {"id", "fields"} | 404
//! PUT    /v1/{collection}/{id}        -> replace document
//! PATCH  /v1/{collection}/{id}        -> merge fields into document
//! DELETE /v1/{collection}/{id}        -> idempotent delete
//! POST   /v1/{collection}             -> 201 {"id"} (store-issued)
//! POST   /v1/{collection}:query       -> 200 {"documents": [...]}
//! ```
//!
//! The backend offers no push channel, so `watch` polls the query endpoint
//! at the configured interval and pushes snapshots only when the result set
//! actually changed.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config::HttpStoreConfig;

use super::{Document, DocumentStore, Fields, Filter, StoreError, Subscription};

/// A [`DocumentStore`] backed by the hosted document database.
#[derive(Debug, Clone)]
pub struct HttpStore {
    inner: Arc<HttpInner>,
}

#[derive(Debug)]
struct HttpInner {
    client: reqwest::Client,
    config: HttpStoreConfig,
}

/// A document on the wire.
#[derive(Debug, Serialize, Deserialize)]
struct DocumentPayload {
    id: String,
    fields: Fields,
}

impl From<DocumentPayload> for Document {
    fn from(payload: DocumentPayload) -> Self {
        Self {
            id: payload.id,
            fields: payload.fields,
        }
    }
}

/// An equality filter on the wire.
#[derive(Debug, Serialize)]
struct FilterPayload<'a> {
    field: &'a str,
    equals: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    filters: Vec<FilterPayload<'a>>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    documents: Vec<DocumentPayload>,
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    id: String,
}

impl HttpStore {
    /// Create a client for the backend described by `config`.
    #[must_use]
    pub fn new(config: HttpStoreConfig) -> Self {
        Self {
            inner: Arc::new(HttpInner {
                client: reqwest::Client::new(),
                config,
            }),
        }
    }
}

impl HttpInner {
    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/v1/{collection}/{id}", self.config.base_url)
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/v1/{collection}", self.config.base_url)
    }

    fn query_url(&self, collection: &str) -> String {
        format!("{}/v1/{collection}:query", self.config.base_url)
    }

    fn bearer(&self) -> &str {
        self.config.api_key.expose_secret()
    }

    async fn run_query(
        &self,
        collection: &str,
        filters: &[Filter],
    ) -> Result<Vec<Document>, StoreError> {
        let request = QueryRequest {
            filters: filters
                .iter()
                .map(|f| FilterPayload {
                    field: &f.field,
                    equals: &f.equals,
                })
                .collect(),
        };

        let response = self
            .client
            .post(self.query_url(collection))
            .bearer_auth(self.bearer())
            .json(&request)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(body.documents.into_iter().map(Document::from).collect())
    }
}

/// Map non-success statuses onto the adapter's error taxonomy.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response.text().await.unwrap_or_default();
    let detail = detail.trim();
    let message = if detail.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {detail}")
    };

    if status.is_server_error() {
        Err(StoreError::Unavailable(message))
    } else {
        Err(StoreError::Rejected(message))
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let response = self
            .inner
            .client
            .get(self.inner.document_url(collection, id))
            .bearer_auth(self.inner.bearer())
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response).await?;

        let payload: DocumentPayload = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(Some(payload.into()))
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        merge: bool,
    ) -> Result<(), StoreError> {
        let url = self.inner.document_url(collection, id);
        let request = if merge {
            self.inner.client.patch(url)
        } else {
            self.inner.client.put(url)
        };

        let response = request
            .bearer_auth(self.inner.bearer())
            .json(&fields)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let response = self
            .inner
            .client
            .delete(self.inner.document_url(collection, id))
            .bearer_auth(self.inner.bearer())
            .send()
            .await?;

        // Deleting an absent document is a no-op, same as the memory store.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check_status(response).await?;
        Ok(())
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let response = self
            .inner
            .client
            .post(self.inner.collection_url(collection))
            .bearer_auth(self.inner.bearer())
            .json(&fields)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body: AddResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(body.id)
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.run_query(collection, filters).await
    }

    async fn watch(
        &self,
        collection: &str,
        filters: &[Filter],
    ) -> Result<Subscription, StoreError> {
        let initial = self.inner.run_query(collection, filters).await?;
        let (tx, rx) = watch::channel(initial);

        let inner = Arc::clone(&self.inner);
        let collection = collection.to_string();
        let filters = filters.to_vec();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(inner.config.poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick fires immediately; the initial snapshot covers it.
            interval.tick().await;
            loop {
                interval.tick().await;
                match inner.run_query(&collection, &filters).await {
                    Ok(docs) => {
                        tx.send_if_modified(|current| {
                            if *current == docs {
                                false
                            } else {
                                *current = docs;
                                true
                            }
                        });
                    }
                    // Transient poll failures keep the last good snapshot.
                    Err(err) => {
                        tracing::warn!(collection = %collection, error = %err, "watch poll failed");
                    }
                }
            }
        });

        Ok(Subscription::new(rx, task))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::time::Duration;

    fn inner() -> HttpInner {
        HttpInner {
            client: reqwest::Client::new(),
            config: HttpStoreConfig {
                base_url: "https://docs.example.net".to_string(),
                api_key: SecretString::from("k"),
                poll_interval: Duration::from_secs(2),
            },
        }
    }

    #[test]
    fn test_url_shapes() {
        let inner = inner();
        assert_eq!(
            inner.document_url("doctors", "d1"),
            "https://docs.example.net/v1/doctors/d1"
        );
        // Subcollection paths pass through slash-joined
        assert_eq!(
            inner.collection_url("doctors/d1/schedule"),
            "https://docs.example.net/v1/doctors/d1/schedule"
        );
        assert_eq!(
            inner.query_url("appointments"),
            "https://docs.example.net/v1/appointments:query"
        );
    }

    #[test]
    fn test_query_request_wire_shape() {
        let value = serde_json::json!("d1");
        let request = QueryRequest {
            filters: vec![FilterPayload {
                field: "doctorId",
                equals: &value,
            }],
        };
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({"filters": [{"field": "doctorId", "equals": "d1"}]})
        );
    }
}
