// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tidings news-ingestion pipeline.
//!
//! This crate provides the error type, domain types, capability traits,
//! and the retry helper used throughout the workspace. Pipeline crates
//! implement and consume the traits defined here.

pub mod error;
pub mod retry;
pub mod traits;
pub mod types;

pub use error::TidingsError;
pub use retry::{retry_with_backoff, RetryPolicy};
pub use traits::{ArticleAnalyzer, BlobStore, EmbeddingClient, PageFetcher, Sleeper, TokioSleeper};
pub use types::{
    Article, ArticleAnalysis, ArticleStatus, Completeness, ContentQuality, NewArticle,
    QueueMessage, ScraperState, ScraperStatus, Source, SourceState, ARTICLE_QUEUE, BUS_BATCH_CAP,
    EMBEDDING_DIM,
};
