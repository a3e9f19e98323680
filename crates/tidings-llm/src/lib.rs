// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured-output LLM client for article analysis.

pub mod client;
pub mod prompt;
pub mod types;

pub use client::{parse_analysis, AnalysisClient};
