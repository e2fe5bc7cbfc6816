// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{PricingMode, TallyConfig};

/// Log levels accepted by `logging.level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem instead of failing on the first one.
pub fn validate_config(config: &TallyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    for path in &config.catalog.paths {
        if !path.exists() {
            errors.push(ConfigError::Validation {
                message: format!("catalog.paths entry `{}` does not exist", path.display()),
            });
        }
    }

    if !config.catalog.builtin
        && config.catalog.paths.is_empty()
        && config.pricing.mode == PricingMode::Catalog
    {
        tracing::warn!("catalog.builtin is off and no catalog.paths are set; the catalog is empty");
    }

    let mut seen_ids = HashSet::new();
    for (i, entry) in config.pricing.custom.iter().enumerate() {
        if entry.model_id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("pricing.custom[{i}].model_id must not be empty"),
            });
        } else if !seen_ids.insert(entry.model_id.to_ascii_lowercase()) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "duplicate model_id `{}` in [[pricing.custom]] array",
                    entry.model_id
                ),
            });
        }

        if entry.input_price_per_million.is_sign_negative() {
            errors.push(ConfigError::Validation {
                message: format!(
                    "pricing.custom[{i}].input_price_per_million must be non-negative, got {}",
                    entry.input_price_per_million
                ),
            });
        }

        if entry.output_price_per_million.is_sign_negative() {
            errors.push(ConfigError::Validation {
                message: format!(
                    "pricing.custom[{i}].output_price_per_million must be non-negative, got {}",
                    entry.output_price_per_million
                ),
            });
        }

        if entry.context_window == Some(0) {
            errors.push(ConfigError::Validation {
                message: format!("pricing.custom[{i}].context_window must be positive"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
