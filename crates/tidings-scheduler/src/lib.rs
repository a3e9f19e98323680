// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-source feed scheduling for the Tidings pipeline.
//!
//! One durable state machine per source URL: each scraper owns a
//! persisted control block and a single pending alarm, fires on its
//! frequency tier, diffs the feed against the articles table, and
//! announces newly-observed ids on the bus.

pub mod identity;
pub mod interval;
pub mod registry;
pub mod scraper;

pub use identity::scraper_id_for_url;
pub use interval::tick_interval;
pub use registry::ScraperRegistry;
pub use scraper::SourceScraper;
