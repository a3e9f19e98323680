// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of live scraper instances.
//!
//! Owns one [`SourceScraper`] per initialized source plus the timer task
//! that fires its ticks. Instances are keyed by the deterministic scraper
//! id, so initializing the same URL twice converges on one entry. On
//! startup the registry rehydrates from the sources table; on shutdown the
//! cancellation token stops every timer loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tidings_core::{ScraperStatus, Sleeper, Source, TidingsError};
use tidings_storage::queries::{source_state, sources};
use tidings_storage::Database;

use crate::identity::scraper_id_for_url;
use crate::scraper::SourceScraper;

/// Poll fallback when an instance has no pending alarm.
const IDLE_RECHECK: Duration = Duration::from_secs(60);

struct ScraperHandle {
    scraper: Arc<SourceScraper>,
    source_id: i64,
    trigger: Arc<Notify>,
    task: JoinHandle<()>,
}

/// Shared registry of per-source scrapers.
pub struct ScraperRegistry {
    db: Database,
    sleeper: Arc<dyn Sleeper>,
    cancel: CancellationToken,
    instances: DashMap<String, ScraperHandle>,
}

impl ScraperRegistry {
    pub fn new(db: Database, sleeper: Arc<dyn Sleeper>, cancel: CancellationToken) -> Self {
        Self {
            db,
            sleeper,
            cancel,
            instances: DashMap::new(),
        }
    }

    /// Initialize (or re-initialize) the scraper for `source` and start
    /// its timer loop. Repeated calls converge on the same instance.
    pub async fn initialize(&self, source: &Source) -> Result<Option<String>, TidingsError> {
        let scraper_id = scraper_id_for_url(&source.url);

        let existing = self
            .instances
            .get(&scraper_id)
            .map(|handle| handle.scraper.clone());
        if let Some(scraper) = existing {
            // Existing instance: refresh its control block (frequency may
            // have changed) and leave the running loop alone.
            let initialized = scraper.initialize(source).await?;
            return Ok(initialized.then_some(scraper_id));
        }

        let scraper = Arc::new(SourceScraper::new(
            &source.url,
            self.db.clone(),
            self.sleeper.clone(),
        )?);
        if !scraper.initialize(source).await? {
            return Ok(None);
        }

        let trigger = Arc::new(Notify::new());
        let task = spawn_timer_loop(
            scraper.clone(),
            trigger.clone(),
            self.db.clone(),
            self.cancel.clone(),
        );
        self.instances.insert(
            scraper_id.clone(),
            ScraperHandle {
                scraper,
                source_id: source.id,
                trigger,
                task,
            },
        );
        Ok(Some(scraper_id))
    }

    /// Recreate instances for every source marked initialized.
    ///
    /// Run once at startup; persisted alarms resume where they left off,
    /// and alarms that expired while the process was down fire on the
    /// first loop pass.
    pub async fn rehydrate(&self) -> Result<usize, TidingsError> {
        let initialized = sources::list_initialized(&self.db).await?;
        let mut count = 0;
        for source in &initialized {
            match self.initialize(source).await {
                Ok(Some(_)) => count += 1,
                Ok(None) => {}
                Err(e) => {
                    warn!(source_id = source.id, error = %e, "failed to rehydrate scraper")
                }
            }
        }
        info!(count, "scrapers rehydrated");
        Ok(count)
    }

    /// Arm an immediate tick for the source's scraper.
    pub fn trigger(&self, source_id: i64) -> bool {
        match self.find_by_source(source_id) {
            Some(scraper_id) => {
                if let Some(handle) = self.instances.get(&scraper_id) {
                    handle.trigger.notify_one();
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }

    /// Status snapshot for the source's scraper.
    pub async fn status(&self, source_id: i64) -> Result<Option<ScraperStatus>, TidingsError> {
        match self.find_by_source(source_id) {
            Some(scraper_id) => {
                let scraper = self
                    .instances
                    .get(&scraper_id)
                    .map(|handle| handle.scraper.clone());
                match scraper {
                    Some(scraper) => Ok(Some(scraper.status().await?)),
                    None => Ok(None),
                }
            }
            None => Ok(None),
        }
    }

    /// Destroy the source's scraper: persisted state removed, timer loop
    /// stopped, instance dropped from the registry.
    pub async fn destroy(&self, source_id: i64) -> Result<bool, TidingsError> {
        let Some(scraper_id) = self.find_by_source(source_id) else {
            return Ok(false);
        };
        let Some((_, handle)) = self.instances.remove(&scraper_id) else {
            return Ok(false);
        };
        handle.scraper.destroy(source_id).await?;
        handle.task.abort();
        Ok(true)
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    fn find_by_source(&self, source_id: i64) -> Option<String> {
        self.instances
            .iter()
            .find(|entry| entry.source_id == source_id)
            .map(|entry| entry.key().clone())
    }
}

/// Timer loop for one scraper: wait for the persisted alarm or an explicit
/// trigger, tick, repeat. The tick itself re-arms the alarm.
fn spawn_timer_loop(
    scraper: Arc<SourceScraper>,
    trigger: Arc<Notify>,
    db: Database,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = match source_state::get(&db, scraper.scraper_id()).await {
                Ok(Some(stored)) => match stored.next_tick_at {
                    Some(at) => (at - Utc::now())
                        .to_std()
                        .unwrap_or(Duration::ZERO),
                    None => IDLE_RECHECK,
                },
                Ok(None) => IDLE_RECHECK,
                Err(e) => {
                    warn!(scraper_id = %scraper.scraper_id(), error = %e, "failed to read alarm");
                    IDLE_RECHECK
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(scraper_id = %scraper.scraper_id(), "timer loop stopping");
                    break;
                }
                _ = trigger.notified() => {
                    if let Err(e) = scraper.tick().await {
                        warn!(scraper_id = %scraper.scraper_id(), error = %e, "triggered tick failed");
                    }
                }
                _ = tokio::time::sleep(wait) => {
                    if let Err(e) = scraper.tick().await {
                        warn!(scraper_id = %scraper.scraper_id(), error = %e, "scheduled tick failed");
                    }
                }
            }
        }
    })
}
