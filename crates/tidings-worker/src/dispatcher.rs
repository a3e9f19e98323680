// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bridge between the message bus and the enrichment worker.
//!
//! Polls the queue, flattens the article ids of a batch of messages into
//! one enrichment job, and acks or nacks the whole batch on the job
//! outcome. The queue's attempt budget turns repeatedly-nacked messages
//! into dead letters.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tidings_core::{QueueMessage, TidingsError, ARTICLE_QUEUE};
use tidings_storage::queries::queue;
use tidings_storage::{Database, QueueEntry};

use crate::pipeline::EnrichmentWorker;

/// Dispatcher tuning.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Sleep between polls when the queue is empty.
    pub poll_interval: Duration,
    /// Maximum messages combined into one job.
    pub batch_size: usize,
    /// Redelivery delay after a failed job, in seconds.
    pub nack_delay_secs: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            batch_size: 10,
            nack_delay_secs: 30,
        }
    }
}

/// Queue consumer driving the enrichment worker.
pub struct Dispatcher {
    db: Database,
    worker: Arc<EnrichmentWorker>,
    config: DispatcherConfig,
    cancel: CancellationToken,
}

impl Dispatcher {
    pub fn new(
        db: Database,
        worker: Arc<EnrichmentWorker>,
        config: DispatcherConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            db,
            worker,
            config,
            cancel,
        }
    }

    /// Run until cancelled. The in-flight batch always completes before
    /// the loop exits.
    pub async fn run(&self) {
        info!("dispatcher started");
        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            match self.poll_once().await {
                Ok(true) => {} // processed a batch, poll again immediately
                Ok(false) => {
                    tokio::select! {
                        _ = self.cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                    }
                }
                Err(e) => {
                    warn!(error = %e, "dispatcher poll failed");
                    tokio::select! {
                        _ = self.cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                    }
                }
            }
        }
        info!("dispatcher stopped");
    }

    /// One poll: reclaim stale locks, dequeue a batch, dispatch it.
    /// Returns `Ok(true)` when a batch was handled.
    pub async fn poll_once(&self) -> Result<bool, TidingsError> {
        let reclaimed = queue::release_expired(&self.db, ARTICLE_QUEUE).await?;
        if reclaimed > 0 {
            warn!(reclaimed, "reclaimed expired queue locks");
        }

        let entries = queue::dequeue_batch(&self.db, ARTICLE_QUEUE, self.config.batch_size).await?;
        if entries.is_empty() {
            return Ok(false);
        }
        self.dispatch(entries).await?;
        Ok(true)
    }

    async fn dispatch(&self, entries: Vec<QueueEntry>) -> Result<(), TidingsError> {
        // Flatten every message's ids; unparseable payloads are nacked so
        // they age into dead letters instead of poisoning the batch.
        let mut ids: Vec<i64> = Vec::new();
        let mut batch: Vec<&QueueEntry> = Vec::new();
        for entry in &entries {
            match serde_json::from_str::<QueueMessage>(&entry.payload) {
                Ok(message) => {
                    ids.extend(message.articles_id);
                    batch.push(entry);
                }
                Err(e) => {
                    warn!(entry_id = entry.id, error = %e, "malformed queue payload");
                    queue::nack(&self.db, entry.id, self.config.nack_delay_secs).await?;
                }
            }
        }

        if ids.is_empty() {
            // Nothing to do; the messages are still consumed.
            for entry in &batch {
                queue::ack(&self.db, entry.id).await?;
            }
            debug!(messages = batch.len(), "acked empty batch");
            return Ok(());
        }

        match self.worker.run(ids).await {
            Ok(report) => {
                for entry in &batch {
                    queue::ack(&self.db, entry.id).await?;
                }
                debug!(
                    messages = batch.len(),
                    processed = report.processed,
                    failed = report.failed,
                    "batch dispatched"
                );
            }
            Err(e) => {
                // Job never ran to completion: redeliver the whole batch
                // after the nack delay. Articles the job already drove to
                // a terminal status fall out of the retry via Step 0.
                warn!(error = %e, "enrichment job failed, nacking batch");
                for entry in &batch {
                    queue::nack(&self.db, entry.id, self.config.nack_delay_secs).await?;
                }
            }
        }
        Ok(())
    }
}
