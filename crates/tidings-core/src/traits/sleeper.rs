// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Injected sleep capability.
//!
//! Every long wait in the pipeline (rate-limit cooldowns, retry backoff,
//! fetch jitter) goes through a [`Sleeper`] rather than the global clock so
//! that a durable orchestrator can checkpoint sleeps, and so tests can run
//! against a recording fake instead of real time.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A suspendable wait primitive.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Sleep for `duration`. `reason` labels the wait for observability.
    ///
    /// Implementations must return early when their runtime is cancelled.
    async fn sleep(&self, reason: &str, duration: Duration);
}

/// Plain-runtime sleeper backed by `tokio::time::sleep`.
///
/// Honors an optional [`CancellationToken`]: a cancelled token ends the
/// wait immediately so shutdown is not held up by in-flight cooldowns.
#[derive(Debug, Clone, Default)]
pub struct TokioSleeper {
    cancel: Option<CancellationToken>,
}

impl TokioSleeper {
    pub fn new() -> Self {
        Self { cancel: None }
    }

    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancel: Some(token),
        }
    }
}

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, reason: &str, duration: Duration) {
        tracing::trace!(reason, ?duration, "sleeping");
        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    _ = tokio::time::sleep(duration) => {}
                    _ = token.cancelled() => {
                        tracing::debug!(reason, "sleep interrupted by shutdown");
                    }
                }
            }
            None => tokio::time::sleep(duration).await,
        }
    }
}
