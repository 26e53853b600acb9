//! Integration test harness for Medibook.
//!
//! Spawns the full application (router, session layer, in-memory adapters)
//! on an ephemeral port and exercises it over real HTTP with a
//! cookie-holding client. No external services are involved, so the tests
//! run anywhere `cargo test` does.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use reqwest::Client;
use secrecy::SecretString;
use serde_json::{Value, json};

use medibook_server::config::{Config, StoreBackend};
use medibook_server::routes;
use medibook_server::state::AppState;

/// A running server plus a client that keeps its session cookies.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Spawn a fresh server on an ephemeral port.
    ///
    /// Every context gets its own store and identity provider, so tests
    /// never observe each other's data.
    pub async fn new() -> Self {
        let config = Config {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost".to_string(),
            // High-entropy literal; only signs cookies inside this test
            session_secret: SecretString::from(
                "mKv8#tQz2$wXn5@rLp9!cHd3^gBf7&jYqA1%uE6*oI4(sN0)dZt8~WxVbRmCkGhJ",
            ),
            store: StoreBackend::Memory,
        };

        let state = AppState::from_config(config);
        let app = routes::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: format!("http://{addr}"),
        }
    }

    /// A second client against the same server, with its own cookie jar.
    #[must_use]
    pub fn fresh_client(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Full URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Register an account and log the context's client in as it.
    ///
    /// Returns the principal id.
    pub async fn register_and_login(&self, name: &str, email: &str, role: &str) -> String {
        self.register_and_login_with(&self.client, name, email, role)
            .await
    }

    /// Same as [`Self::register_and_login`] but for an explicit client.
    pub async fn register_and_login_with(
        &self,
        client: &Client,
        name: &str,
        email: &str,
        role: &str,
    ) -> String {
        let resp = client
            .post(self.url("/auth/register"))
            .json(&json!({
                "name": name,
                "email": email,
                "password": "correct-horse-battery",
                "role": role,
            }))
            .send()
            .await
            .expect("register request failed");
        assert_eq!(resp.status(), 201, "register should succeed");

        let resp = client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": "correct-horse-battery" }))
            .send()
            .await
            .expect("login request failed");
        assert_eq!(resp.status(), 200, "login should succeed");

        let body: Value = resp.json().await.expect("login body should be JSON");
        body["principal"]
            .as_str()
            .expect("login body should carry the principal")
            .to_string()
    }
}
