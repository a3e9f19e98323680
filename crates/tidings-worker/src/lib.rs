// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The article enrichment worker and its queue dispatcher.

pub mod dispatcher;
pub mod pipeline;
pub mod search_text;

pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use pipeline::{EnrichmentReport, EnrichmentWorker};
pub use search_text::build_search_text;
