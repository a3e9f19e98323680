// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the article analysis LLM.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint with
//! temperature 0 and JSON response format. The client itself makes one
//! attempt per call; the enrichment worker owns the retry budget so the
//! attempt count stays observable in one place.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use tidings_core::{ArticleAnalysis, ArticleAnalyzer, TidingsError};

use crate::prompt::{build_user_prompt, ANALYSIS_SYSTEM_PROMPT};
use crate::types::{ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse, ResponseFormat};

/// Client for the analysis LLM.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl AnalysisClient {
    /// Create an analysis client.
    pub fn new(base_url: String, api_key: String, model: String) -> Result<Self, TidingsError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let bearer = reqwest::header::HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| TidingsError::Config(format!("invalid LLM API key: {e}")))?;
        headers.insert(reqwest::header::AUTHORIZATION, bearer);
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| TidingsError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ArticleAnalyzer for AnalysisClient {
    async fn analyze(&self, title: &str, body: &str) -> Result<ArticleAnalysis, TidingsError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: ANALYSIS_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_user_prompt(title, body),
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat::json_object(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| TidingsError::Llm(format!("analysis request failed: {e}")))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| TidingsError::Llm(format!("failed to read analysis response: {e}")))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiErrorResponse>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(TidingsError::Llm(format!(
                "analysis endpoint returned HTTP {status}: {detail}"
            )));
        }

        let chat: ChatResponse = serde_json::from_str(&raw)
            .map_err(|e| TidingsError::Llm(format!("malformed chat response: {e}")))?;
        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| TidingsError::Llm("chat response carried no choices".to_string()))?;

        debug!(model = %self.model, bytes = content.len(), "analysis response received");
        parse_analysis(content)
    }
}

/// Decode and validate the model's JSON output.
///
/// Tolerates markdown code fences around the object; anything else that
/// violates the schema is an [`Llm`](TidingsError::Llm) error so the step
/// retry can take another attempt.
pub fn parse_analysis(content: &str) -> Result<ArticleAnalysis, TidingsError> {
    let json = strip_code_fences(content);
    let analysis: ArticleAnalysis = serde_json::from_str(json)
        .map_err(|e| TidingsError::Llm(format!("analysis output violates schema: {e}")))?;

    if analysis.language.trim().is_empty() {
        return Err(TidingsError::Llm("analysis language is empty".to_string()));
    }
    if analysis.primary_location.trim().is_empty() {
        return Err(TidingsError::Llm(
            "analysis primary_location is empty".to_string(),
        ));
    }
    Ok(analysis)
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
