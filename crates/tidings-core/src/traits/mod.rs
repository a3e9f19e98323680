// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits at the seams of the pipeline.
//!
//! Each long-lived external dependency (clock, blob store, embeddings
//! service, LLM, page fetch) is injected through one of these traits so the
//! scheduler and worker can be driven by fakes in tests.

pub mod analyzer;
pub mod blob;
pub mod embedding;
pub mod fetcher;
pub mod sleeper;

pub use analyzer::ArticleAnalyzer;
pub use blob::BlobStore;
pub use embedding::EmbeddingClient;
pub use fetcher::PageFetcher;
pub use sleeper::{Sleeper, TokioSleeper};
