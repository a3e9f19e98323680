// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error diagnostics with actionable messages.

use thiserror::Error;

/// Errors surfaced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML/env extraction failed (syntax error, type mismatch, unknown key).
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// A semantic constraint was violated after deserialization.
    #[error("invalid configuration: {message}")]
    Validation { message: String },
}
