// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM analysis capability.

use async_trait::async_trait;

use crate::error::TidingsError;
use crate::types::ArticleAnalysis;

/// Structured article analysis via a large language model.
#[async_trait]
pub trait ArticleAnalyzer: Send + Sync {
    /// Analyze an article body and return the structured analysis object.
    ///
    /// Schema violations in the model output are an
    /// [`Llm`](TidingsError::Llm) error so the caller can retry.
    async fn analyze(&self, title: &str, body: &str) -> Result<ArticleAnalysis, TidingsError>;
}
