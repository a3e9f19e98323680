// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Tidings pipeline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Tidings configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; keys holding credentials default to `None` and are validated at
/// startup for the components that need them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TidingsConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// SQLite database and blob store locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Enrichment worker and dispatcher settings.
    #[serde(default)]
    pub worker: WorkerConfig,

    /// LLM analysis endpoint settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Embeddings microservice settings.
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    /// Headless-browser rendering service settings.
    #[serde(default)]
    pub renderer: RendererConfig,

    /// Admin HTTP surface settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// SQLite database and blob store locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Root directory of the filesystem blob store.
    #[serde(default = "default_blob_root")]
    pub blob_root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            blob_root: default_blob_root(),
        }
    }
}

fn default_database_path() -> String {
    "tidings.db".to_string()
}

fn default_blob_root() -> String {
    "blobs".to_string()
}

/// Enrichment worker and dispatcher settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Hosts known to require browser rendering (suffix match).
    #[serde(default = "default_tricky_domains")]
    pub tricky_domains: Vec<String>,

    /// Dispatcher poll interval when the queue is empty, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Maximum bus messages combined into one enrichment job.
    #[serde(default = "default_dispatch_batch_size")]
    pub dispatch_batch_size: usize,

    /// Delay before a nacked batch becomes deliverable again, in seconds.
    #[serde(default = "default_nack_delay_secs")]
    pub nack_delay_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            tricky_domains: default_tricky_domains(),
            poll_interval_secs: default_poll_interval_secs(),
            dispatch_batch_size: default_dispatch_batch_size(),
            nack_delay_secs: default_nack_delay_secs(),
        }
    }
}

fn default_tricky_domains() -> Vec<String> {
    [
        "reuters.com",
        "nytimes.com",
        "politico.com",
        "wsj.com",
        "bloomberg.com",
        "ft.com",
        "economist.com",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_dispatch_batch_size() -> usize {
    10
}

fn default_nack_delay_secs() -> u64 {
    30
}

/// LLM analysis endpoint settings (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// API key. `None` requires the environment variable override.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the chat-completions endpoint.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model identifier used for article analysis.
    #[serde(default = "default_llm_model")]
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

fn default_llm_model() -> String {
    "gemini-2.0-flash".to_string()
}

/// Embeddings microservice settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingsConfig {
    /// Base URL of the embeddings service. Required to run the worker.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Token sent as `X-API-Token`.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Expected vector width; must match the schema constant.
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_token: None,
            dimension: default_embedding_dimension(),
        }
    }
}

fn default_embedding_dimension() -> usize {
    384
}

/// Headless-browser rendering service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RendererConfig {
    /// Base URL of the rendering API.
    #[serde(default = "default_renderer_base_url")]
    pub base_url: String,

    /// Account under which rendering requests run.
    #[serde(default)]
    pub account_id: Option<String>,

    /// Bearer token for the rendering API.
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            base_url: default_renderer_base_url(),
            account_id: None,
            api_token: None,
        }
    }
}

fn default_renderer_base_url() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

/// Admin HTTP surface settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8787
}
