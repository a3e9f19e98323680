// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tidings.toml` > `~/.config/tidings/tidings.toml`
//! > `/etc/tidings/tidings.toml` with environment variable overrides via the
//! `TIDINGS_` prefix.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::diagnostic::ConfigError;
use crate::model::TidingsConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tidings/tidings.toml` (system-wide)
/// 3. `~/.config/tidings/tidings.toml` (user XDG config)
/// 4. `./tidings.toml` (local directory)
/// 5. `TIDINGS_*` environment variables
pub fn load_config() -> Result<TidingsConfig, ConfigError> {
    let config = Figment::new()
        .merge(Serialized::defaults(TidingsConfig::default()))
        .merge(Toml::file("/etc/tidings/tidings.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("tidings/tidings.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("tidings.toml"))
        .merge(env_provider())
        .extract()
        .map_err(Box::new)?;
    Ok(config)
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<TidingsConfig, ConfigError> {
    let config = Figment::new()
        .merge(Serialized::defaults(TidingsConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
        .map_err(Box::new)?;
    Ok(config)
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TidingsConfig, ConfigError> {
    let config = Figment::new()
        .merge(Serialized::defaults(TidingsConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
        .map_err(Box::new)?;
    Ok(config)
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `TIDINGS_EMBEDDINGS_API_TOKEN` must map
/// to `embeddings.api_token`, not `embeddings.api.token`.
fn env_provider() -> Env {
    Env::prefixed("TIDINGS_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("pipeline_", "pipeline.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("worker_", "worker.", 1)
            .replacen("llm_", "llm.", 1)
            .replacen("embeddings_", "embeddings.", 1)
            .replacen("renderer_", "renderer.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
