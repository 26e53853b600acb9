//! Medibook server - appointment booking HTTP API.
//!
//! This binary serves the JSON API on the configured address.
//!
//! # Architecture
//!
//! - Axum web framework, JSON request/response bodies
//! - Cookie sessions (tower-sessions, signed, in-memory store)
//! - Profiles, schedules, and appointments in an external document store
//!   (in-memory or HTTP backend, selected by `MEDIBOOK_STORE`)
//! - Credentials held by the identity provider adapter

#![cfg_attr(not(test), forbid(unsafe_code))]

use medibook_server::config::Config;
use medibook_server::routes;
use medibook_server::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "medibook_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");

    // Build application state (store + identity adapters) and router
    let state = AppState::from_config(config.clone());
    let app = routes::app(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("medibook listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
