// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-domain rate limiting for batch scraping.
//!
//! [`DomainRateLimiter`] enforces a per-host cooldown and a global
//! concurrency cap while driving a batch of work items. All waits route
//! through the injected [`Sleeper`] so the limiter behaves identically
//! under a real clock and under a durable orchestrator that persists
//! sleeps.
//!
//! The host map is owned by the `&mut self` receiver: one limiter drives
//! one batch at a time, which is what makes the map race-free. The
//! cooldown window is measured from selection time, not work completion,
//! so work that outlasts `domain_cooldown` over-serializes its host.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;
use tracing::{debug, trace};
use url::Url;

use tidings_core::{Sleeper, TidingsError};

/// Floor for the wait when no host is ready yet.
const MIN_IDLE_WAIT: Duration = Duration::from_millis(500);

/// Limiter tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiterConfig {
    /// Upper bound on concurrently running `work` invocations.
    pub max_concurrent: usize,
    /// Sleep between non-final batch iterations.
    pub global_cooldown: Duration,
    /// Minimum spacing between selections of the same host.
    pub domain_cooldown: Duration,
}

/// One work item: an opaque payload plus the URL it targets.
#[derive(Debug, Clone)]
pub struct RateItem<T> {
    pub payload: T,
    pub url: String,
}

/// Scheduling primitive enforcing per-host cooldown and global concurrency.
pub struct DomainRateLimiter {
    config: RateLimiterConfig,
    last_access: HashMap<String, Instant>,
}

impl DomainRateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            last_access: HashMap::new(),
        }
    }

    /// Drive `work` over `items`, returning fulfilled results in
    /// completion order.
    ///
    /// Items with unparseable URLs are dropped silently. Each iteration
    /// selects up to `max_concurrent` items whose host cooldown has
    /// elapsed, marks those hosts, and runs the selection in parallel;
    /// rejected results are discarded with a log line. When nothing is
    /// ready the limiter sleeps for the minimum remaining cooldown
    /// (floored at 500 ms) and retries.
    pub async fn process_batch<T, R, F, Fut>(
        &mut self,
        items: Vec<RateItem<T>>,
        sleeper: &dyn Sleeper,
        work: F,
    ) -> Vec<R>
    where
        F: Fn(T, String) -> Fut,
        Fut: Future<Output = Result<R, TidingsError>>,
    {
        let mut remaining: Vec<(T, String)> = items
            .into_iter()
            .filter_map(|item| match host_of(&item.url) {
                Some(host) => Some((item.payload, host)),
                None => {
                    debug!(url = %item.url, "dropping item with invalid URL");
                    None
                }
            })
            .collect();

        let mut results = Vec::new();

        while !remaining.is_empty() {
            let now = Instant::now();
            let mut selected: Vec<(T, String)> = Vec::new();
            let mut deferred: Vec<(T, String)> = Vec::new();

            for (payload, host) in remaining {
                if selected.len() < self.config.max_concurrent && self.host_ready(&host, now) {
                    self.last_access.insert(host.clone(), now);
                    selected.push((payload, host));
                } else {
                    deferred.push((payload, host));
                }
            }
            remaining = deferred;

            if selected.is_empty() {
                let wait = self.min_remaining_cooldown(&remaining, now);
                let wait = wait.max(MIN_IDLE_WAIT);
                trace!(?wait, pending = remaining.len(), "no host ready, waiting");
                sleeper.sleep("domain-cooldown", wait).await;
                continue;
            }

            let mut in_flight: FuturesUnordered<_> = selected
                .into_iter()
                .map(|(payload, host)| work(payload, host))
                .collect();
            while let Some(outcome) = in_flight.next().await {
                match outcome {
                    Ok(result) => results.push(result),
                    Err(e) => debug!(error = %e, "dropping rejected batch item"),
                }
            }

            if !remaining.is_empty() {
                sleeper
                    .sleep("global-cooldown", self.config.global_cooldown)
                    .await;
            }
        }

        results
    }

    fn host_ready(&self, host: &str, now: Instant) -> bool {
        match self.last_access.get(host) {
            Some(last) => now.duration_since(*last) >= self.config.domain_cooldown,
            None => true,
        }
    }

    /// Smallest positive cooldown remainder across the pending hosts.
    fn min_remaining_cooldown<T>(&self, pending: &[(T, String)], now: Instant) -> Duration {
        pending
            .iter()
            .filter_map(|(_, host)| {
                let last = self.last_access.get(host)?;
                self.config
                    .domain_cooldown
                    .checked_sub(now.duration_since(*last))
            })
            .filter(|d| !d.is_zero())
            .min()
            .unwrap_or(Duration::ZERO)
    }
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Advances tokio's paused clock instead of waiting, recording every
    /// requested sleep.
    struct AdvancingSleeper {
        slept: Mutex<Vec<(String, Duration)>>,
    }

    impl AdvancingSleeper {
        fn new() -> Self {
            Self {
                slept: Mutex::new(Vec::new()),
            }
        }

        fn reasons(&self) -> Vec<String> {
            self.slept.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
        }
    }

    #[async_trait]
    impl Sleeper for AdvancingSleeper {
        async fn sleep(&self, reason: &str, duration: Duration) {
            self.slept
                .lock()
                .unwrap()
                .push((reason.to_string(), duration));
            tokio::time::advance(duration).await;
        }
    }

    fn item(id: i64, url: &str) -> RateItem<i64> {
        RateItem {
            payload: id,
            url: url.to_string(),
        }
    }

    fn limiter(max: usize, global_ms: u64, domain_ms: u64) -> DomainRateLimiter {
        DomainRateLimiter::new(RateLimiterConfig {
            max_concurrent: max,
            global_cooldown: Duration::from_millis(global_ms),
            domain_cooldown: Duration::from_millis(domain_ms),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn same_host_items_are_spaced_by_domain_cooldown() {
        let sleeper = AdvancingSleeper::new();
        let mut limiter = limiter(2, 50, 200);
        let start = Instant::now();
        let run_at: Arc<Mutex<Vec<(i64, Duration)>>> = Arc::new(Mutex::new(Vec::new()));

        let items = vec![
            item(1, "https://example.com/a"),
            item(2, "https://example.com/b"),
            item(3, "https://example.com/c"),
        ];

        let run_at_clone = run_at.clone();
        let results = limiter
            .process_batch(items, &sleeper, |id, _host| {
                let run_at = run_at_clone.clone();
                async move {
                    run_at.lock().unwrap().push((id, start.elapsed()));
                    Ok::<i64, TidingsError>(id)
                }
            })
            .await;

        assert_eq!(results.len(), 3);

        let timings = run_at.lock().unwrap().clone();
        let at = |id: i64| timings.iter().find(|(i, _)| *i == id).unwrap().1;
        assert_eq!(at(1), Duration::ZERO);
        assert!(at(2) >= Duration::from_millis(200), "item 2 ran at {:?}", at(2));
        assert!(at(3) >= Duration::from_millis(400), "item 3 ran at {:?}", at(3));

        // The between-iteration global cooldown was honored.
        assert!(sleeper.reasons().iter().any(|r| r == "global-cooldown"));
    }

    #[tokio::test(start_paused = true)]
    async fn different_hosts_run_in_the_same_iteration() {
        let sleeper = AdvancingSleeper::new();
        let mut limiter = limiter(8, 50, 200);
        let start = Instant::now();

        let items = vec![
            item(1, "https://a.example.com/x"),
            item(2, "https://b.example.com/x"),
            item(3, "https://c.example.com/x"),
        ];

        let results = limiter
            .process_batch(items, &sleeper, |id, _host| async move {
                Ok::<(i64, Duration), TidingsError>((id, start.elapsed()))
            })
            .await;

        assert_eq!(results.len(), 3);
        for (_, elapsed) in results {
            assert_eq!(elapsed, Duration::ZERO);
        }
        // One iteration: no global cooldown needed.
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrency_never_exceeds_max() {
        let sleeper = AdvancingSleeper::new();
        let mut limiter = limiter(2, 10, 10);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let items: Vec<_> = (0..6)
            .map(|i| item(i, &format!("https://host{i}.example.com/x")))
            .collect();

        let active_c = active.clone();
        let peak_c = peak.clone();
        let results = limiter
            .process_batch(items, &sleeper, |id, _host| {
                let active = active_c.clone();
                let peak = peak_c.clone();
                async move {
                    let now_active = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now_active, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok::<i64, TidingsError>(id)
                }
            })
            .await;

        assert_eq!(results.len(), 6);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_work_is_discarded() {
        let sleeper = AdvancingSleeper::new();
        let mut limiter = limiter(4, 10, 10);

        let items = vec![
            item(1, "https://a.example.com/x"),
            item(2, "https://b.example.com/x"),
        ];

        let results = limiter
            .process_batch(items, &sleeper, |id, _host| async move {
                if id == 1 {
                    Err(TidingsError::Fetch("boom".into()))
                } else {
                    Ok(id)
                }
            })
            .await;

        assert_eq!(results, vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_urls_complete_with_empty_result() {
        let sleeper = AdvancingSleeper::new();
        let mut limiter = limiter(4, 10, 10);

        let items = vec![item(1, "not a url"), item(2, "also::bad")];
        let results = limiter
            .process_batch(items, &sleeper, |id, _host| async move {
                Ok::<i64, TidingsError>(id)
            })
            .await;

        assert!(results.is_empty());
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_wait_is_floored_at_500ms() {
        let sleeper = AdvancingSleeper::new();
        // Domain cooldown far below the floor.
        let mut limiter = limiter(1, 10, 100);

        let items = vec![
            item(1, "https://example.com/a"),
            item(2, "https://example.com/b"),
        ];
        let results = limiter
            .process_batch(items, &sleeper, |id, _host| async move {
                Ok::<i64, TidingsError>(id)
            })
            .await;
        assert_eq!(results.len(), 2);

        let slept = sleeper.slept.lock().unwrap();
        let idle_waits: Vec<_> = slept
            .iter()
            .filter(|(reason, _)| reason == "domain-cooldown")
            .collect();
        assert!(!idle_waits.is_empty());
        for (_, duration) in idle_waits {
            assert!(*duration >= Duration::from_millis(500));
        }
    }
}
