// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding client capability.

use async_trait::async_trait;

use crate::error::TidingsError;

/// Client for the external embeddings service.
///
/// Implementations must return one vector per input text, each of width
/// [`EMBEDDING_DIM`](crate::types::EMBEDDING_DIM), or an
/// [`Embedding`](TidingsError::Embedding) error.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, TidingsError>;
}
