// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered TOML configuration for the Tidings pipeline.
//!
//! Configuration merges compiled defaults, system and user TOML files, a
//! local `tidings.toml`, and `TIDINGS_`-prefixed environment variables, then
//! runs a semantic validation pass that reports every violation at once.

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::ConfigError;
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::TidingsConfig;
pub use validation::validate_config;
