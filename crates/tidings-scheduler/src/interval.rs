// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frequency tier to tick interval mapping.

use std::time::Duration;

use tracing::warn;

/// Delay before a freshly-initialized scraper's first tick.
pub const FIRST_TICK_DELAY: Duration = Duration::from_secs(5);

/// Back-off applied when persisted state fails validation.
pub const CORRUPT_STATE_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

/// Map a frequency tier to its tick interval.
///
/// Tiers: 1 → 1 h, 2 → 4 h, 3 → 6 h, 4 → 24 h. Any other value is coerced
/// to tier 2 with a warning.
pub fn tick_interval(tier: i64) -> Duration {
    match tier {
        1 => Duration::from_secs(60 * 60),
        2 => Duration::from_secs(4 * 60 * 60),
        3 => Duration::from_secs(6 * 60 * 60),
        4 => Duration::from_secs(24 * 60 * 60),
        other => {
            warn!(tier = other, "unknown frequency tier, coercing to tier 2");
            Duration::from_secs(4 * 60 * 60)
        }
    }
}
