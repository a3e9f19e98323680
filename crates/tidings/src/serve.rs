// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `serve` command: wire every component and run until shutdown.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use tidings_blob::FsBlobStore;
use tidings_config::TidingsConfig;
use tidings_core::{TidingsError, TokioSleeper};
use tidings_embed::EmbeddingsService;
use tidings_fetch::{PlainFetcher, RenderClient};
use tidings_gateway::{GatewayState, ServerConfig};
use tidings_llm::AnalysisClient;
use tidings_scheduler::ScraperRegistry;
use tidings_storage::Database;
use tidings_worker::{Dispatcher, DispatcherConfig, EnrichmentWorker};

use crate::shutdown::install_signal_handler;

/// Run the full pipeline: schedulers, dispatcher, and admin surface.
pub async fn serve(config: TidingsConfig) -> Result<(), TidingsError> {
    let db = Database::open(&config.storage.database_path).await?;
    info!(path = %config.storage.database_path, "database open");

    let cancel = install_signal_handler();
    let sleeper = Arc::new(TokioSleeper::with_cancellation(cancel.clone()));

    // Outbound clients; credentialed ones insist on their config up front.
    let plain = Arc::new(PlainFetcher::new()?);
    let renderer = Arc::new(RenderClient::new(
        config.renderer.base_url.clone(),
        require(config.renderer.account_id.clone(), "renderer.account_id")?,
        require(config.renderer.api_token.clone(), "renderer.api_token")?,
    )?);
    let analyzer = Arc::new(AnalysisClient::new(
        config.llm.base_url.clone(),
        require(config.llm.api_key.clone(), "llm.api_key")?,
        config.llm.model.clone(),
    )?);
    let embedder = Arc::new(EmbeddingsService::new(
        require(config.embeddings.base_url.clone(), "embeddings.base_url")?,
        require(config.embeddings.api_token.clone(), "embeddings.api_token")?,
        config.embeddings.dimension,
    )?);
    let blobs = Arc::new(FsBlobStore::new(config.storage.blob_root.clone()));

    // Scheduler side: one state machine per initialized source.
    let registry = Arc::new(ScraperRegistry::new(
        db.clone(),
        sleeper.clone(),
        cancel.clone(),
    ));
    registry.rehydrate().await?;

    // Worker side: queue dispatcher driving the enrichment pipeline.
    let worker = Arc::new(EnrichmentWorker::new(
        db.clone(),
        plain,
        renderer,
        analyzer,
        embedder,
        blobs,
        sleeper.clone(),
        config.worker.tricky_domains.clone(),
    ));
    let dispatcher = Dispatcher::new(
        db.clone(),
        worker,
        DispatcherConfig {
            poll_interval: Duration::from_secs(config.worker.poll_interval_secs),
            batch_size: config.worker.dispatch_batch_size,
            nack_delay_secs: config.worker.nack_delay_secs,
        },
        cancel.clone(),
    );
    let dispatcher_task = tokio::spawn(async move { dispatcher.run().await });

    // Admin surface.
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    let gateway_state = GatewayState {
        db: db.clone(),
        registry: registry.clone(),
    };
    let gateway_cancel = cancel.clone();
    let gateway_task = tokio::spawn(async move {
        tokio::select! {
            result = tidings_gateway::start_server(&server_config, gateway_state) => {
                if let Err(e) = result {
                    warn!(error = %e, "admin surface exited");
                }
            }
            _ = gateway_cancel.cancelled() => {}
        }
    });

    info!("tidings pipeline running");
    cancel.cancelled().await;

    // Drain: the dispatcher finishes its in-flight batch before exiting.
    info!("shutting down");
    if let Err(e) = dispatcher_task.await {
        warn!(error = %e, "dispatcher task ended abnormally");
    }
    gateway_task.abort();
    db.close().await?;
    info!("shutdown complete");
    Ok(())
}

fn require(value: Option<String>, key: &str) -> Result<String, TidingsError> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| {
        TidingsError::Config(format!(
            "{key} is required to serve (set it in tidings.toml or TIDINGS_{})",
            key.replace('.', "_").to_uppercase()
        ))
    })
}
