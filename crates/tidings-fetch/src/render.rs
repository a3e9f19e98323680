// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendered fetch strategy via the external headless-browser service.
//!
//! Posts the article URL plus the cleanup script sequence to the rendering
//! API and returns the rendered HTML. The service waits for an article
//! container selector before snapshotting the DOM.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tidings_core::{PageFetcher, TidingsError};

use crate::scripts::{CLEANUP_SCRIPTS, WAIT_SELECTOR, WAIT_TIMEOUT_MS};
use crate::ua::random_user_agent;

/// Client for the browser-rendering REST endpoint.
pub struct RenderClient {
    client: reqwest::Client,
    base_url: String,
    account_id: String,
}

/// Request body for a render call.
#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    url: &'a str,
    #[serde(rename = "userAgent")]
    user_agent: &'a str,
    #[serde(rename = "addScriptTag")]
    add_script_tag: Vec<ScriptTag<'a>>,
    #[serde(rename = "waitForSelector")]
    wait_for_selector: WaitForSelector<'a>,
}

#[derive(Debug, Serialize)]
struct ScriptTag<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct WaitForSelector<'a> {
    selector: &'a str,
    timeout: u64,
}

/// Response envelope from the rendering service.
#[derive(Debug, Deserialize)]
struct RenderResponse {
    status: bool,
    #[serde(default)]
    errors: Vec<RenderError>,
    #[serde(default)]
    result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RenderError {
    #[serde(default)]
    code: i64,
    message: String,
}

impl RenderClient {
    /// Create a render client for the given account.
    pub fn new(
        base_url: String,
        account_id: String,
        api_token: String,
    ) -> Result<Self, TidingsError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let bearer = reqwest::header::HeaderValue::from_str(&format!("Bearer {api_token}"))
            .map_err(|e| TidingsError::Config(format!("invalid renderer API token: {e}")))?;
        headers.insert(reqwest::header::AUTHORIZATION, bearer);
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
            account_id,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/accounts/{}/browser-rendering/content",
            self.base_url.trim_end_matches('/'),
            self.account_id
        )
    }
}

#[async_trait]
impl PageFetcher for RenderClient {
    async fn fetch_page(&self, url: &str) -> Result<String, TidingsError> {
        let request = RenderRequest {
            url,
            user_agent: random_user_agent(),
            add_script_tag: CLEANUP_SCRIPTS
                .iter()
                .map(|content| ScriptTag { content })
                .collect(),
            wait_for_selector: WaitForSelector {
                selector: WAIT_SELECTOR,
                timeout: WAIT_TIMEOUT_MS,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| TidingsError::Render(format!("render request for {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TidingsError::Render(format!(
                "render of {url} returned HTTP {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TidingsError::Render(format!("failed to read render response: {e}")))?;
        let envelope: RenderResponse = serde_json::from_str(&body).map_err(|e| {
            TidingsError::Validation(format!("malformed render service response: {e}"))
        })?;

        if !envelope.status {
            let detail = envelope
                .errors
                .first()
                .map(|e| format!("{} (code {})", e.message, e.code))
                .unwrap_or_else(|| "no error detail".to_string());
            return Err(TidingsError::Render(format!(
                "render of {url} reported failure: {detail}"
            )));
        }

        match envelope.result {
            Some(html) if !html.is_empty() => {
                debug!(url, bytes = html.len(), "rendered fetch succeeded");
                Ok(html)
            }
            _ => Err(TidingsError::Validation(format!(
                "render service returned success without HTML for {url}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn test_client(base_url: &str) -> RenderClient {
        RenderClient::new(base_url.to_string(), "acct-1".into(), "token-1".into()).unwrap()
    }

    #[tokio::test]
    async fn returns_rendered_html() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts/acct-1/browser-rendering/content"))
            .and(header("authorization", "Bearer token-1"))
            .and(body_partial_json(serde_json::json!({
                "url": "https://example.com/a"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": true,
                "result": "<html>rendered</html>"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let html = client.fetch_page("https://example.com/a").await.unwrap();
        assert_eq!(html, "<html>rendered</html>");
    }

    #[tokio::test]
    async fn request_carries_all_cleanup_scripts_and_wait_selector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts/acct-1/browser-rendering/content"))
            .respond_with(move |req: &Request| {
                let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
                assert_eq!(body["addScriptTag"].as_array().unwrap().len(), 7);
                assert_eq!(body["waitForSelector"]["selector"], WAIT_SELECTOR);
                assert_eq!(body["waitForSelector"]["timeout"], 5000);
                assert!(body["userAgent"].as_str().unwrap().contains("Mobile"));
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "status": true,
                    "result": "<html>ok</html>"
                }))
            })
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        client.fetch_page("https://example.com/a").await.unwrap();
    }

    #[tokio::test]
    async fn service_reported_failure_is_a_render_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": false,
                "errors": [{"code": 2001, "message": "waitForSelector timed out"}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.fetch_page("https://example.com/a").await;
        match result {
            Err(TidingsError::Render(msg)) => {
                assert!(msg.contains("waitForSelector timed out"));
                assert!(msg.contains("2001"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_envelope_is_a_validation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.fetch_page("https://example.com/a").await;
        assert!(matches!(result, Err(TidingsError::Validation(_))));
    }

    #[tokio::test]
    async fn http_error_from_service_is_a_render_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.fetch_page("https://example.com/a").await;
        match result {
            Err(TidingsError::Render(msg)) => assert!(msg.contains("503")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
