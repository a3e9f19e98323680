// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feed document decoding.
//!
//! Built on `feed-rs`, which tolerates RSS 2.0, Atom, and RDF/RSS 1.0
//! containers and promotes a lone `<item>` to a one-element entry list.
//! On top of that this module applies the field fallback chain, URL
//! canonicalization, and per-entry validation. Malformed entries are
//! dropped, never raised; output order matches feed order.

use chrono::{DateTime, Utc};
use feed_rs::parser;
use tracing::debug;

use tidings_core::TidingsError;

use crate::clean::{clean_string, clean_url};

/// Title/link placeholder for fields the feed did not carry.
const UNKNOWN: &str = "UNKNOWN";

/// One decoded, validated feed entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    /// Upstream guid when it differs from the link.
    pub guid: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
}

/// Decode a feed document into an ordered list of validated entries.
///
/// Failure kinds: [`Parse`](TidingsError::Parse) when the document is not
/// a feed at all, [`Validation`](TidingsError::Validation) when no entries
/// survived validation.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>, TidingsError> {
    let feed = parser::parse(bytes)
        .map_err(|e| TidingsError::Parse(format!("feed document is not parseable: {e}")))?;

    let total = feed.entries.len();
    let entries: Vec<FeedEntry> = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let title = entry
                .title
                .as_ref()
                .map(|t| clean_string(&t.content))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string());

            // Link falls back to the guid when the entry carries no href.
            let raw_link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .filter(|href| !href.trim().is_empty())
                .unwrap_or_else(|| {
                    if entry.id.trim().is_empty() {
                        UNKNOWN.to_string()
                    } else {
                        entry.id.clone()
                    }
                });
            let link = clean_url(&clean_string(&raw_link));

            let pub_date = entry.published.or(entry.updated);

            let candidate = FeedEntry {
                title,
                link,
                guid: Some(entry.id).filter(|id| !id.trim().is_empty()),
                pub_date,
            };

            match validate_entry(&candidate) {
                Ok(()) => Some(candidate),
                Err(reason) => {
                    debug!(link = %candidate.link, %reason, "dropping malformed feed entry");
                    None
                }
            }
        })
        .collect();

    if entries.is_empty() {
        return Err(TidingsError::Validation(format!(
            "no entries survived validation ({total} in document)"
        )));
    }
    Ok(entries)
}

/// Entry-level validation: non-empty title and an absolute http(s) URL.
/// A missing publish date is acceptable.
fn validate_entry(entry: &FeedEntry) -> Result<(), String> {
    if entry.title.is_empty() {
        return Err("empty title".into());
    }
    match url::Url::parse(&entry.link) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => Ok(()),
        Ok(parsed) => Err(format!("unsupported scheme {:?}", parsed.scheme())),
        Err(e) => Err(format!("link is not a URL: {e}")),
    }
}
