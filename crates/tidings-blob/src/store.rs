// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem-backed blob store.
//!
//! Keys map directly to paths under a root directory. Writes create
//! intermediate date directories on demand and are idempotent: re-running
//! an upload after a crash overwrites the same object.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use tidings_core::{BlobStore, TidingsError};

/// Blob store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key to a path, rejecting traversal outside the root.
    fn resolve(&self, key: &str) -> Result<PathBuf, TidingsError> {
        let relative = Path::new(key);
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                std::path::Component::ParentDir | std::path::Component::RootDir
            )
        });
        if escapes || key.is_empty() {
            return Err(TidingsError::Blob {
                message: format!("invalid blob key {key:?}"),
                source: None,
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), TidingsError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TidingsError::Blob {
                    message: format!("failed to create directories for {key}"),
                    source: Some(Box::new(e)),
                })?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| TidingsError::Blob {
                message: format!("failed to write blob {key}"),
                source: Some(Box::new(e)),
            })?;
        debug!(key, bytes = bytes.len(), "blob stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, TidingsError> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path).await.map_err(|e| TidingsError::Blob {
            message: format!("failed to read blob {key}"),
            source: Some(Box::new(e)),
        })
    }
}
