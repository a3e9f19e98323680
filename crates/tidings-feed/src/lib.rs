// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tolerant RSS/Atom/RDF feed decoding for the Tidings pipeline.

pub mod clean;
pub mod parser;

pub use clean::{clean_string, clean_url};
pub use parser::{parse_feed, FeedEntry};
