// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain HTTP fetch strategy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use tracing::debug;

use tidings_core::{PageFetcher, TidingsError};

use crate::ua::{random_user_agent, GOOGLE_REFERER};

/// Direct GET fetcher with a randomized mobile User-Agent and a Google
/// referer. Non-2xx responses are errors; redirects are followed.
pub struct PlainFetcher {
    client: reqwest::Client,
}

impl PlainFetcher {
    pub fn new() -> Result<Self, TidingsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TidingsError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for PlainFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, TidingsError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(random_user_agent()));
        headers.insert(REFERER, HeaderValue::from_static(GOOGLE_REFERER));

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| TidingsError::Fetch(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TidingsError::Fetch(format!(
                "fetch of {url} returned HTTP {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TidingsError::Fetch(format!("failed to read body of {url}: {e}")))?;

        debug!(url, bytes = body.len(), "plain fetch succeeded");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>story</html>"))
            .mount(&server)
            .await;

        let fetcher = PlainFetcher::new().unwrap();
        let body = fetcher
            .fetch_page(&format!("{}/article", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<html>story</html>");
    }

    #[tokio::test]
    async fn sends_mobile_user_agent_and_google_referer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .and(header_exists("user-agent"))
            .and(header("referer", GOOGLE_REFERER))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = PlainFetcher::new().unwrap();
        fetcher
            .fetch_page(&format!("{}/article", server.uri()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_2xx_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = PlainFetcher::new().unwrap();
        let result = fetcher.fetch_page(&format!("{}/gone", server.uri())).await;
        match result {
            Err(TidingsError::Fetch(msg)) => assert!(msg.contains("404")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_a_fetch_error() {
        let fetcher = PlainFetcher::new().unwrap();
        let result = fetcher.fetch_page("http://127.0.0.1:1/unreachable").await;
        assert!(matches!(result, Err(TidingsError::Fetch(_))));
    }
}
