// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Readability-style main-content extraction for the Tidings pipeline.

pub mod normalize;
pub mod readability;

pub use normalize::normalize_whitespace;
pub use readability::{extract_article, ExtractedArticle};
