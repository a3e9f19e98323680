// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded retry with exponential backoff.
//!
//! Delays route through the injected [`Sleeper`] so retries compose with
//! the durable orchestrator and with paused-time tests.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::TidingsError;
use crate::traits::Sleeper;

/// Attempt budget and backoff curve for one retryable step.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles per attempt after that.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Backoff before attempt `attempt` (1-based; attempt 1 has no delay).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            Duration::ZERO
        } else {
            self.base_delay * 2u32.saturating_pow(attempt - 2)
        }
    }
}

/// Run `op` until it succeeds, fails permanently, or the attempt budget is
/// exhausted. Only errors reporting `is_transient()` are retried.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
    reason: &str,
    mut op: F,
) -> Result<T, TidingsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TidingsError>>,
{
    let mut last_err = None;
    for attempt in 1..=policy.max_attempts {
        let delay = policy.delay_before(attempt);
        if !delay.is_zero() {
            sleeper.sleep(reason, delay).await;
        }
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                warn!(reason, attempt, max = policy.max_attempts, error = %err, "transient failure, will retry");
                last_err = Some(err);
            }
            Err(err) => return Err(err),
        }
    }
    Err(last_err.unwrap_or_else(|| TidingsError::Internal(format!("retry budget empty: {reason}"))))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Records requested sleeps without waiting.
    struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        fn new() -> Self {
            Self {
                slept: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, _reason: &str, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_millis(500));
        assert_eq!(policy.delay_before(1), Duration::ZERO);
        assert_eq!(policy.delay_before(2), Duration::from_millis(500));
        assert_eq!(policy.delay_before(3), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let sleeper = RecordingSleeper::new();
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(500));

        let result = retry_with_backoff(policy, &sleeper, "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(TidingsError::Fetch("503".into()))
                } else {
                    Ok(42u32)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *sleeper.slept.lock().unwrap(),
            vec![Duration::from_millis(500), Duration::from_millis(1000)]
        );
    }

    #[tokio::test]
    async fn permanent_error_short_circuits() {
        let sleeper = RecordingSleeper::new();
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(500));

        let result: Result<(), _> = retry_with_backoff(policy, &sleeper, "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TidingsError::NoArticleFound) }
        })
        .await;

        assert!(matches!(result, Err(TidingsError::NoArticleFound)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn exhausted_budget_returns_last_error() {
        let sleeper = RecordingSleeper::new();
        let policy = RetryPolicy::new(3, Duration::from_millis(500));

        let result: Result<(), _> = retry_with_backoff(policy, &sleeper, "test", || async {
            Err(TidingsError::Fetch("always down".into()))
        })
        .await;

        match result {
            Err(TidingsError::Fetch(msg)) => assert_eq!(msg, "always down"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
