// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Article fetch strategies for the Tidings pipeline.
//!
//! Two strategies share the [`PageFetcher`](tidings_core::PageFetcher)
//! seam: a plain HTTP GET and a headless-browser render via an external
//! service. The enrichment worker decides which to use per host.

pub mod plain;
pub mod render;
pub mod scripts;
pub mod ua;

pub use plain::PlainFetcher;
pub use render::RenderClient;
pub use scripts::{CLEANUP_SCRIPTS, WAIT_SELECTOR, WAIT_TIMEOUT_MS};
