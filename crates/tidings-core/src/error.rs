// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tidings ingestion pipeline.

use thiserror::Error;

/// The primary error type used across all Tidings crates.
///
/// Variants map the domain error kinds: transient I/O, malformed upstream
/// documents, permanent skips, corrupt local state, and downstream bus
/// failures. Only the scheduler and worker drivers translate these into
/// article-row status transitions; everything below them propagates.
#[derive(Debug, Error)]
pub enum TidingsError {
    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transient network I/O failure (DNS, connect, 5xx, broken body).
    #[error("http error: {message}")]
    Http {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Upstream document could not be decoded at all (not XML, not HTML).
    #[error("parse error: {0}")]
    Parse(String),

    /// Document decoded but no usable content survived validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Readability extraction failed on a well-formed document.
    #[error("readability error: {0}")]
    Readability(String),

    /// Extraction produced an empty title or body.
    #[error("no article found in document")]
    NoArticleFound,

    /// Plain HTTP article fetch failed.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Headless-browser render fetch failed.
    #[error("render error: {0}")]
    Render(String),

    /// LLM analysis call failed or returned a schema-violating object.
    #[error("llm error: {0}")]
    Llm(String),

    /// Embeddings service call failed or returned a wrong-dimension vector.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Blob store read/write failure.
    #[error("blob store error: {message}")]
    Blob {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Persisted scraper state failed shape validation.
    #[error("corrupt scraper state: {0}")]
    CorruptState(String),

    /// Message bus enqueue/dequeue failure.
    #[error("queue error: {0}")]
    Queue(String),

    /// Operation exceeded its configured timeout.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TidingsError {
    /// Whether a step-level retry is worth attempting.
    ///
    /// Transient I/O, timeouts, and malformed upstream responses are
    /// retried with backoff; permanent skips and corrupt state are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TidingsError::Http { .. }
                | TidingsError::Fetch(_)
                | TidingsError::Render(_)
                | TidingsError::Llm(_)
                | TidingsError::Embedding(_)
                | TidingsError::Parse(_)
                | TidingsError::Validation(_)
                | TidingsError::Timeout { .. }
                | TidingsError::Storage { .. }
                | TidingsError::Queue(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_kinds_are_retryable() {
        assert!(TidingsError::Fetch("503".into()).is_transient());
        assert!(TidingsError::Timeout {
            duration: std::time::Duration::from_secs(1)
        }
        .is_transient());
        assert!(TidingsError::Parse("not xml".into()).is_transient());
    }

    #[test]
    fn permanent_kinds_are_not_retryable() {
        assert!(!TidingsError::NoArticleFound.is_transient());
        assert!(!TidingsError::CorruptState("bad shape".into()).is_transient());
        assert!(!TidingsError::Config("missing key".into()).is_transient());
    }

    #[test]
    fn display_includes_detail() {
        let err = TidingsError::Render("waitForSelector timed out".into());
        assert!(err.to_string().contains("render"));
        assert!(err.to_string().contains("waitForSelector"));
    }
}
