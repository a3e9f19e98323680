// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the external embeddings microservice.
//!
//! The service exposes `POST {base}/embeddings` with an `X-API-Token`
//! header and returns one vector per input text. The client enforces the
//! configured dimension on every response; a wrong-width vector must never
//! reach the database.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tidings_core::{EmbeddingClient, TidingsError};

/// Client for the embeddings service.
#[derive(Debug, Clone)]
pub struct EmbeddingsService {
    client: reqwest::Client,
    base_url: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    texts: &'a [String],
}

/// Response envelope; extra fields such as `model_name` are tolerated.
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embeddings: Vec<Vec<f32>>,
}

impl EmbeddingsService {
    /// Create an embeddings client expecting vectors of `dimension`.
    pub fn new(
        base_url: String,
        api_token: String,
        dimension: usize,
    ) -> Result<Self, TidingsError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let token = reqwest::header::HeaderValue::from_str(&api_token)
            .map_err(|e| TidingsError::Config(format!("invalid embeddings API token: {e}")))?;
        headers.insert("X-API-Token", token);
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| TidingsError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            dimension,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl EmbeddingClient for EmbeddingsService {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, TidingsError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(self.endpoint())
            .json(&EmbeddingRequest { texts })
            .send()
            .await
            .map_err(|e| TidingsError::Embedding(format!("embeddings request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TidingsError::Embedding(format!(
                "embeddings service returned HTTP {status}"
            )));
        }

        let envelope: EmbeddingResponse = response.json().await.map_err(|e| {
            TidingsError::Embedding(format!("malformed embeddings response: {e}"))
        })?;

        if envelope.embeddings.len() != texts.len() {
            return Err(TidingsError::Embedding(format!(
                "requested {} embeddings, received {}",
                texts.len(),
                envelope.embeddings.len()
            )));
        }
        for (i, vector) in envelope.embeddings.iter().enumerate() {
            if vector.len() != self.dimension {
                return Err(TidingsError::Embedding(format!(
                    "embedding {i} has dimension {}, expected {}",
                    vector.len(),
                    self.dimension
                )));
            }
        }

        debug!(count = envelope.embeddings.len(), "embeddings received");
        Ok(envelope.embeddings)
    }
}
