// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blob store capability for raw article text.

use async_trait::async_trait;

use crate::error::TidingsError;

/// Write-once object storage keyed by date-sharded string keys
/// (`YYYY/M/D/{article_id}.txt`).
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`, overwriting any existing object.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), TidingsError>;

    /// Fetch the object stored under `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, TidingsError>;
}
