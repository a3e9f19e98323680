// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blob key construction.

use chrono::{DateTime, Datelike, Utc};

/// Build the date-sharded key for an article's text blob:
/// `YYYY/M/D/{article_id}.txt`, month and day unpadded, using the
/// article's publish date (UTC) or the current instant when unknown.
pub fn content_key(article_id: i64, publish_date: Option<DateTime<Utc>>) -> String {
    let date = publish_date.unwrap_or_else(Utc::now);
    format!(
        "{}/{}/{}/{}.txt",
        date.year(),
        date.month(),
        date.day(),
        article_id
    )
}
