// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, collecting every violation instead of failing fast.

use crate::diagnostic::ConfigError;
use crate::model::TidingsConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors.
pub fn validate_config(config: &TidingsConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.blob_root.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.blob_root must not be empty".to_string(),
        });
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let addr = config.gateway.host.trim();
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{addr}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.embeddings.dimension == 0 {
        errors.push(ConfigError::Validation {
            message: "embeddings.dimension must be positive".to_string(),
        });
    }

    if config.worker.dispatch_batch_size == 0 {
        errors.push(ConfigError::Validation {
            message: "worker.dispatch_batch_size must be at least 1".to_string(),
        });
    }

    for (i, domain) in config.worker.tricky_domains.iter().enumerate() {
        if domain.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("worker.tricky_domains[{i}] must not be empty"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
