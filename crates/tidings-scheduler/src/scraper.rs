// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-source scraper state machine.
//!
//! One instance exists per source URL, identified by a stable hash. Its
//! persisted control block (`SourceState` plus one pending alarm) survives
//! restarts; the in-memory object is just a driver around it.
//!
//! The tick algorithm is ordered for fail-safety: the next regular tick is
//! armed *before* any network work, so a failing feed can never stall the
//! schedule, and `last_checked` is advanced only after every step has
//! succeeded, so a partial tick re-runs in full. The article insert is
//! idempotent on URL, which makes the re-run safe.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use tidings_core::{
    retry_with_backoff, NewArticle, QueueMessage, RetryPolicy, ScraperState, ScraperStatus,
    Sleeper, Source, SourceState, TidingsError, ARTICLE_QUEUE, BUS_BATCH_CAP,
};
use tidings_feed::parse_feed;
use tidings_storage::queries::{articles, queue, source_state, sources};
use tidings_storage::Database;

use crate::identity::scraper_id_for_url;
use crate::interval::{tick_interval, CORRUPT_STATE_BACKOFF, FIRST_TICK_DELAY};

/// Retry budget for each fallible tick step (fetch, parse, insert).
const STEP_RETRY: RetryPolicy = RetryPolicy::new(3, Duration::from_millis(500));

/// Feed-fetch User-Agent.
const FEED_USER_AGENT: &str = "tidings/0.1 (+https://github.com/tidings-project/tidings)";

/// Driver for one source's scrape schedule.
pub struct SourceScraper {
    scraper_id: String,
    db: Database,
    sleeper: Arc<dyn Sleeper>,
    http: reqwest::Client,
    state: std::sync::Mutex<ScraperState>,
    /// Ticks for one source are serial; concurrent trigger + timer ticks
    /// queue up here.
    tick_lock: tokio::sync::Mutex<()>,
}

impl SourceScraper {
    pub fn new(url: &str, db: Database, sleeper: Arc<dyn Sleeper>) -> Result<Self, TidingsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(FEED_USER_AGENT)
            .build()
            .map_err(|e| TidingsError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            scraper_id: scraper_id_for_url(url),
            db,
            sleeper,
            http,
            state: std::sync::Mutex::new(ScraperState::Uninitialized),
            tick_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn scraper_id(&self) -> &str {
        &self.scraper_id
    }

    fn set_state(&self, state: ScraperState) {
        *self.state.lock().expect("state lock poisoned") = state;
    }

    fn current_state(&self) -> ScraperState {
        *self.state.lock().expect("state lock poisoned")
    }

    /// Initialize the scraper for `source`.
    ///
    /// Race-safe against concurrent source deletion: when the source row is
    /// already gone this returns `Ok(false)` without side effects. The
    /// source's `do_initialized_at` is committed only after the control
    /// block is persisted and the first tick armed, so a partially
    /// initialized instance is always re-initializable.
    pub async fn initialize(&self, source: &Source) -> Result<bool, TidingsError> {
        match sources::get(&self.db, source.id).await? {
            Some(_) => {}
            None => {
                debug!(source_id = source.id, "source vanished before initialize");
                return Ok(false);
            }
        }

        let state = SourceState {
            scraper_id: self.scraper_id.clone(),
            source_id: source.id,
            url: source.url.clone(),
            scrape_frequency: source.scrape_frequency,
            last_checked: None,
        };
        let first_tick = Utc::now()
            + chrono::Duration::from_std(FIRST_TICK_DELAY)
                .expect("first tick delay fits in chrono range");
        source_state::upsert(&self.db, &state, Some(first_tick)).await?;
        sources::set_do_initialized_at(&self.db, source.id, Some(Utc::now())).await?;

        self.set_state(ScraperState::Scheduled);
        info!(scraper_id = %self.scraper_id, source_id = source.id, "scraper initialized");
        Ok(true)
    }

    /// Run one tick: feed → diff → enqueue.
    ///
    /// Most failures are absorbed here (logged, `last_checked` left alone)
    /// because step 2 has already armed the retry; only unexpected storage
    /// failures propagate.
    pub async fn tick(&self) -> Result<(), TidingsError> {
        let _serial = self.tick_lock.lock().await;
        if self.current_state() == ScraperState::Destroyed {
            return Ok(());
        }
        self.set_state(ScraperState::Running);
        let outcome = self.run_tick().await;
        if self.current_state() != ScraperState::Destroyed {
            self.set_state(ScraperState::Scheduled);
        }
        outcome
    }

    async fn run_tick(&self) -> Result<(), TidingsError> {
        // Step 1: load and validate persisted state.
        let stored = match source_state::get(&self.db, &self.scraper_id).await? {
            Some(stored) => stored,
            None => {
                debug!(scraper_id = %self.scraper_id, "no persisted state, skipping tick");
                return Ok(());
            }
        };
        let state = stored.state;
        if let Err(e) = state.validate() {
            warn!(scraper_id = %self.scraper_id, error = %e, "corrupt scraper state, backing off");
            let far_out = Utc::now()
                + chrono::Duration::from_std(CORRUPT_STATE_BACKOFF)
                    .expect("backoff fits in chrono range");
            source_state::set_next_tick(&self.db, &self.scraper_id, far_out).await?;
            return Ok(());
        }

        // Step 2: arm the next regular tick before anything can fail.
        let interval = tick_interval(state.scrape_frequency);
        let next_tick = Utc::now()
            + chrono::Duration::from_std(interval).expect("interval fits in chrono range");
        source_state::set_next_tick(&self.db, &self.scraper_id, next_tick).await?;

        // Step 3: fetch the feed.
        let url = state.url.clone();
        let bytes = match retry_with_backoff(STEP_RETRY, self.sleeper.as_ref(), "feed-fetch", || {
            self.fetch_feed(&url)
        })
        .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(scraper_id = %self.scraper_id, url = %state.url, error = %e, "feed fetch failed, will retry next tick");
                return Ok(());
            }
        };

        // Step 4: parse it.
        let entries = match retry_with_backoff(STEP_RETRY, self.sleeper.as_ref(), "feed-parse", || {
            let bytes = bytes.clone();
            async move { parse_feed(&bytes) }
        })
        .await
        {
            Ok(entries) => entries,
            Err(e) => {
                warn!(scraper_id = %self.scraper_id, url = %state.url, error = %e, "feed parse failed, will retry next tick");
                return Ok(());
            }
        };

        // Step 5: build insert rows.
        let rows: Vec<NewArticle> = entries
            .into_iter()
            .map(|entry| NewArticle {
                source_id: state.source_id,
                url: entry.link,
                title: entry.title,
                publish_date: entry.pub_date,
            })
            .collect();

        // Step 6: idempotent insert; only truly-new ids come back.
        let db = self.db.clone();
        let inserted = match retry_with_backoff(
            STEP_RETRY,
            self.sleeper.as_ref(),
            "article-insert",
            || articles::insert_new(&db, rows.clone()),
        )
        .await
        {
            Ok(ids) => ids,
            Err(e) => {
                warn!(scraper_id = %self.scraper_id, error = %e, "article insert failed, will retry next tick");
                return Ok(());
            }
        };

        // Step 7: announce the new ids in sub-batches.
        if !inserted.is_empty() {
            for chunk in inserted.chunks(BUS_BATCH_CAP) {
                let message = QueueMessage {
                    articles_id: chunk.to_vec(),
                };
                let payload = serde_json::to_string(&message)
                    .expect("queue message serializes to JSON");
                if let Err(e) = queue::enqueue(&self.db, ARTICLE_QUEUE, &payload).await {
                    // The bus consumer is idempotent and `last_checked` is
                    // not advanced, so the next tick re-discovers this
                    // chunk via ON CONFLICT DO NOTHING.
                    warn!(scraper_id = %self.scraper_id, error = %e, "bus enqueue failed, deferring to next tick");
                    return Ok(());
                }
            }
        }

        // Step 8: every prior step succeeded; advance last_checked.
        let now = Utc::now();
        source_state::set_last_checked(&self.db, &self.scraper_id, now).await?;
        sources::set_last_checked(&self.db, state.source_id, now).await?;

        info!(
            scraper_id = %self.scraper_id,
            source_id = state.source_id,
            new_articles = inserted.len(),
            "tick complete"
        );
        Ok(())
    }

    async fn fetch_feed(&self, url: &str) -> Result<Vec<u8>, TidingsError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TidingsError::Http {
                message: format!("feed request to {url} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            // Non-2xx counts as transient: feeds flap behind CDNs.
            return Err(TidingsError::Http {
                message: format!("feed fetch of {url} returned HTTP {status}"),
                source: None,
            });
        }

        let bytes = response.bytes().await.map_err(|e| TidingsError::Http {
            message: format!("failed to read feed body of {url}: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(bytes.to_vec())
    }

    /// Observable snapshot: in-memory lifecycle plus the persisted alarm.
    pub async fn status(&self) -> Result<ScraperStatus, TidingsError> {
        let next_tick_at = source_state::get(&self.db, &self.scraper_id)
            .await?
            .and_then(|stored| stored.next_tick_at);
        Ok(ScraperStatus {
            state: self.current_state(),
            next_tick_at,
        })
    }

    /// Tear down the instance: remove persisted state and clear the
    /// source's initialized marker.
    pub async fn destroy(&self, source_id: i64) -> Result<(), TidingsError> {
        source_state::delete(&self.db, &self.scraper_id).await?;
        sources::set_do_initialized_at(&self.db, source_id, None).await?;
        self.set_state(ScraperState::Destroyed);
        info!(scraper_id = %self.scraper_id, source_id, "scraper destroyed");
        Ok(())
    }
}
