// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic scraper identity.
//!
//! Each source URL maps to exactly one scraper instance; repeated
//! `initialize` calls for the same URL must converge to the same
//! identity, so the id is a stable hash of the URL rather than anything
//! assigned at creation time.

use sha2::{Digest, Sha256};

/// Derive the scraper id for a source URL: hex-encoded sha256.
pub fn scraper_id_for_url(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
