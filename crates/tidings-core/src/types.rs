// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Tidings workspace.
//!
//! Row-shaped structs use `chrono` UTC timestamps; the storage crate
//! converts to and from RFC 3339 strings at the database boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::TidingsError;

/// Fixed width of the embedding vector column.
pub const EMBEDDING_DIM: usize = 384;

/// Maximum number of article ids per bus message.
pub const BUS_BATCH_CAP: usize = 100;

/// Name of the queue carrying newly-discovered article id batches.
pub const ARTICLE_QUEUE: &str = "articles";

/// Lifecycle status of an article row.
///
/// An article is created in `PendingFetch`, advanced by the enrichment
/// worker, and terminal in any status other than the first two.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArticleStatus {
    PendingFetch,
    ContentFetched,
    Processed,
    SkippedPdf,
    FetchFailed,
    RenderFailed,
    AiAnalysisFailed,
    EmbeddingFailed,
    BlobUploadFailed,
}

impl ArticleStatus {
    /// Terminal statuses are never reprocessed.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            ArticleStatus::PendingFetch | ArticleStatus::ContentFetched
        )
    }
}

/// How much of the article body the analysis judged recoverable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Completeness {
    Complete,
    PartialUseful,
    PartialUseless,
}

/// Editorial quality judgement from the analysis step.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentQuality {
    Ok,
    LowQuality,
    Junk,
}

/// Structured output of the LLM analysis step.
///
/// `language` is ISO 639-1; `primary_location` is ISO 3166-1 alpha-3 or a
/// generic marker (`GLOBAL`, `N/A`). When quality is `JUNK` or completeness
/// is `PARTIAL_USELESS` the list fields may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleAnalysis {
    pub language: String,
    pub primary_location: String,
    pub completeness: Completeness,
    pub content_quality: ContentQuality,
    #[serde(default)]
    pub event_summary_points: Vec<String>,
    #[serde(default)]
    pub thematic_keywords: Vec<String>,
    #[serde(default)]
    pub topic_tags: Vec<String>,
    #[serde(default)]
    pub key_entities: Vec<String>,
    #[serde(default)]
    pub content_focus: Vec<String>,
}

/// A named publisher feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    /// Canonical feed URL, unique across sources.
    pub url: String,
    pub name: String,
    pub category: Option<String>,
    pub paywall: bool,
    /// Frequency tier, 1 through 4. Other values are coerced to tier 2.
    pub scrape_frequency: i64,
    pub last_checked: Option<DateTime<Utc>>,
    /// Set once a scheduler instance has been initialized for this source.
    pub do_initialized_at: Option<DateTime<Utc>>,
}

/// One story discovered from a source, keyed by canonical URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub publish_date: Option<DateTime<Utc>>,
    pub source_id: i64,
    pub status: ArticleStatus,
    pub used_browser: bool,
    pub language: Option<String>,
    pub primary_location: Option<String>,
    pub completeness: Option<Completeness>,
    pub content_quality: Option<ContentQuality>,
    pub event_summary_points: Option<Vec<String>>,
    pub thematic_keywords: Option<Vec<String>>,
    pub topic_tags: Option<Vec<String>>,
    pub key_entities: Option<Vec<String>>,
    pub content_focus: Option<Vec<String>>,
    /// Non-null iff status is `Processed`.
    pub embedding: Option<Vec<f32>>,
    /// Blob key of the stored article text; non-null iff `Processed`.
    pub content_file_key: Option<String>,
    pub fail_reason: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insert row for a newly-observed article.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub source_id: i64,
    pub url: String,
    pub title: String,
    pub publish_date: Option<DateTime<Utc>>,
}

/// Persisted control block for one scraper instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceState {
    /// Deterministic scraper identity, hex sha256 of the source URL.
    pub scraper_id: String,
    pub source_id: i64,
    pub url: String,
    pub scrape_frequency: i64,
    pub last_checked: Option<DateTime<Utc>>,
}

impl SourceState {
    /// Shape-validate a state blob read back from storage.
    ///
    /// An invalid state means the scraper must refuse to act and re-arm
    /// far in the future rather than loop on corrupt data.
    pub fn validate(&self) -> Result<(), TidingsError> {
        if self.scraper_id.len() != 64 || !self.scraper_id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TidingsError::CorruptState(format!(
                "scraper_id is not a sha256 hex digest: {:?}",
                self.scraper_id
            )));
        }
        if self.source_id <= 0 {
            return Err(TidingsError::CorruptState(format!(
                "source_id must be positive, got {}",
                self.source_id
            )));
        }
        if url::Url::parse(&self.url).is_err() {
            return Err(TidingsError::CorruptState(format!(
                "url is not parseable: {:?}",
                self.url
            )));
        }
        Ok(())
    }
}

/// The bus message carrying newly-inserted article ids to the worker.
///
/// Delivery is at-least-once; consumers must be idempotent against the
/// articles table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub articles_id: Vec<i64>,
}

/// Observable lifecycle of a scraper instance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScraperState {
    Uninitialized,
    Scheduled,
    Running,
    Destroyed,
}

/// Snapshot returned by a scraper's `status` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperStatus {
    pub state: ScraperState,
    pub next_tick_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_string_round_trip() {
        use std::str::FromStr;
        for status in [
            ArticleStatus::PendingFetch,
            ArticleStatus::ContentFetched,
            ArticleStatus::Processed,
            ArticleStatus::SkippedPdf,
            ArticleStatus::FetchFailed,
            ArticleStatus::RenderFailed,
            ArticleStatus::AiAnalysisFailed,
            ArticleStatus::EmbeddingFailed,
            ArticleStatus::BlobUploadFailed,
        ] {
            let s = status.to_string();
            assert_eq!(ArticleStatus::from_str(&s).unwrap(), status);
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(!ArticleStatus::PendingFetch.is_terminal());
        assert!(!ArticleStatus::ContentFetched.is_terminal());
        assert!(ArticleStatus::Processed.is_terminal());
        assert!(ArticleStatus::SkippedPdf.is_terminal());
        assert!(ArticleStatus::FetchFailed.is_terminal());
    }

    #[test]
    fn content_quality_wire_names() {
        assert_eq!(ContentQuality::Ok.to_string(), "OK");
        assert_eq!(ContentQuality::LowQuality.to_string(), "LOW_QUALITY");
        assert_eq!(
            serde_json::to_string(&ContentQuality::Junk).unwrap(),
            "\"JUNK\""
        );
    }

    #[test]
    fn analysis_deserializes_with_missing_lists() {
        // JUNK articles may omit every list field.
        let json = r#"{
            "language": "en",
            "primary_location": "N/A",
            "completeness": "PARTIAL_USELESS",
            "content_quality": "JUNK"
        }"#;
        let analysis: ArticleAnalysis = serde_json::from_str(json).unwrap();
        assert!(analysis.event_summary_points.is_empty());
        assert_eq!(analysis.content_quality, ContentQuality::Junk);
    }

    #[test]
    fn queue_message_wire_shape() {
        let msg = QueueMessage {
            articles_id: vec![1, 2, 3],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"articles_id":[1,2,3]}"#);
    }

    #[test]
    fn source_state_validation() {
        let good = SourceState {
            scraper_id: "a".repeat(64),
            source_id: 1,
            url: "https://example.com/rss".into(),
            scrape_frequency: 2,
            last_checked: None,
        };
        assert!(good.validate().is_ok());

        let bad_id = SourceState {
            scraper_id: "not-a-digest".into(),
            ..good.clone()
        };
        assert!(matches!(
            bad_id.validate(),
            Err(TidingsError::CorruptState(_))
        ));

        let bad_url = SourceState {
            url: "not a url".into(),
            ..good.clone()
        };
        assert!(bad_url.validate().is_err());

        let bad_source = SourceState {
            source_id: 0,
            ..good
        };
        assert!(bad_source.validate().is_err());
    }
}
