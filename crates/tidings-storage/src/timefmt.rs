// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamp formatting at the database boundary.
//!
//! Timestamps are stored as RFC 3339 UTC strings with millisecond
//! precision (`2026-08-02T12:34:56.789Z`), matching the format SQLite's
//! `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')` defaults produce. Keeping the
//! two aligned makes lexicographic comparison in SQL equivalent to
//! chronological comparison.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a timestamp for storage.
pub fn to_db(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp. Returns `None` for unparseable values so
/// callers can treat legacy or corrupt cells as absent.
pub fn from_db(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse an optional stored timestamp column.
pub fn from_db_opt(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.as_deref().and_then(from_db)
}
