// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin HTTP server built on axum.

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use tidings_core::TidingsError;
use tidings_scheduler::ScraperRegistry;
use tidings_storage::Database;

use crate::handlers;

/// Shared state for admin request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub db: Database,
    pub registry: Arc<ScraperRegistry>,
}

/// Admin server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Build the admin router.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::get_healthz))
        .route("/sources/initialize", post(handlers::post_initialize))
        .route("/sources/{id}/status", get(handlers::get_status))
        .route("/sources/{id}/trigger", post(handlers::post_trigger))
        .route("/sources/{id}", delete(handlers::delete_scraper))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve the admin surface until the process exits.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), TidingsError> {
    let app = router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TidingsError::Internal(format!("failed to bind admin surface to {addr}: {e}")))?;

    info!("admin surface listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| TidingsError::Internal(format!("admin server error: {e}")))?;

    Ok(())
}
