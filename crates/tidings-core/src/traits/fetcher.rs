// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Page fetch capability shared by the plain and rendered strategies.

use async_trait::async_trait;

use crate::error::TidingsError;

/// Fetch the HTML of one article page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Return the raw (or rendered) HTML document for `url`.
    async fn fetch_page(&self, url: &str) -> Result<String, TidingsError>;
}
