// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handlers for the admin surface.
//!
//! These are thin passthroughs to the scraper registry; the heavy lifting
//! lives in `tidings-scheduler`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use tidings_core::ScraperStatus;
use tidings_storage::queries::sources;

use crate::server::GatewayState;

/// Body of `POST /sources/initialize`.
#[derive(Debug, Deserialize)]
pub struct InitializeRequest {
    pub id: i64,
    pub url: String,
    pub scrape_frequency: i64,
}

/// Response of `POST /sources/initialize`.
#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    pub initialized: bool,
    pub scraper_id: Option<String>,
}

/// Liveness probe.
pub async fn get_healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Initialize (or re-initialize) the scraper for a source.
///
/// The source row must already exist; a request for a deleted source is
/// acknowledged without effect, mirroring the registry's race-safety.
pub async fn post_initialize(
    State(state): State<GatewayState>,
    Json(request): Json<InitializeRequest>,
) -> Result<Json<InitializeResponse>, StatusCode> {
    let source = sources::get(&state.db, request.id)
        .await
        .map_err(internal)?;
    let Some(mut source) = source else {
        return Ok(Json(InitializeResponse {
            initialized: false,
            scraper_id: None,
        }));
    };

    // The caller may initialize with a newer frequency than the stored row.
    source.scrape_frequency = request.scrape_frequency;
    if source.url != request.url {
        warn!(
            source_id = source.id,
            stored = %source.url,
            requested = %request.url,
            "initialize URL differs from stored source, using stored"
        );
    }

    let scraper_id = state.registry.initialize(&source).await.map_err(internal)?;
    Ok(Json(InitializeResponse {
        initialized: scraper_id.is_some(),
        scraper_id,
    }))
}

/// `GET /sources/{id}/status`.
pub async fn get_status(
    State(state): State<GatewayState>,
    Path(source_id): Path<i64>,
) -> Result<Json<ScraperStatus>, StatusCode> {
    match state.registry.status(source_id).await.map_err(internal)? {
        Some(status) => Ok(Json(status)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// `POST /sources/{id}/trigger`: arm an immediate tick.
pub async fn post_trigger(
    State(state): State<GatewayState>,
    Path(source_id): Path<i64>,
) -> StatusCode {
    if state.registry.trigger(source_id) {
        StatusCode::ACCEPTED
    } else {
        StatusCode::NOT_FOUND
    }
}

/// `DELETE /sources/{id}`: destroy the scraper instance.
pub async fn delete_scraper(
    State(state): State<GatewayState>,
    Path(source_id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    if state.registry.destroy(source_id).await.map_err(internal)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

fn internal(e: tidings_core::TidingsError) -> StatusCode {
    warn!(error = %e, "admin request failed");
    StatusCode::INTERNAL_SERVER_ERROR
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::tempdir;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use tidings_core::{ScraperState, TokioSleeper};
    use tidings_scheduler::ScraperRegistry;
    use tidings_storage::Database;

    async fn setup() -> (GatewayState, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let registry = Arc::new(ScraperRegistry::new(
            db.clone(),
            Arc::new(TokioSleeper::new()),
            CancellationToken::new(),
        ));
        (GatewayState { db, registry }, dir)
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let response = get_healthz().await;
        assert_eq!(response.0["status"], "ok");
    }

    #[tokio::test]
    async fn initialize_then_status_then_destroy() {
        let (state, _dir) = setup().await;
        let source = sources::create(
            &state.db,
            "https://example.com/rss",
            "Example",
            None,
            false,
            2,
        )
        .await
        .unwrap();

        let response = post_initialize(
            State(state.clone()),
            Json(InitializeRequest {
                id: source.id,
                url: source.url.clone(),
                scrape_frequency: 2,
            }),
        )
        .await
        .unwrap();
        assert!(response.0.initialized);
        assert!(response.0.scraper_id.is_some());

        let status = get_status(State(state.clone()), Path(source.id))
            .await
            .unwrap();
        assert_eq!(status.0.state, ScraperState::Scheduled);

        assert_eq!(
            post_trigger(State(state.clone()), Path(source.id)).await,
            StatusCode::ACCEPTED
        );

        let deleted = delete_scraper(State(state.clone()), Path(source.id))
            .await
            .unwrap();
        assert_eq!(deleted, StatusCode::NO_CONTENT);

        assert!(matches!(
            get_status(State(state.clone()), Path(source.id)).await,
            Err(StatusCode::NOT_FOUND)
        ));

        state.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn initialize_for_missing_source_is_acknowledged() {
        let (state, _dir) = setup().await;
        let response = post_initialize(
            State(state.clone()),
            Json(InitializeRequest {
                id: 404,
                url: "https://example.com/rss".into(),
                scrape_frequency: 1,
            }),
        )
        .await
        .unwrap();
        assert!(!response.0.initialized);

        state.db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_source_routes_return_not_found() {
        let (state, _dir) = setup().await;
        assert!(matches!(
            get_status(State(state.clone()), Path(99)).await,
            Err(StatusCode::NOT_FOUND)
        ));
        assert_eq!(
            post_trigger(State(state.clone()), Path(99)).await,
            StatusCode::NOT_FOUND
        );
        state.db.close().await.unwrap();
    }
}
