// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for tokentally.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at load time instead of being silently ignored.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Top-level tokentally configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TallyConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Pricing catalog sources.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Cost calculator settings and custom pricing overrides.
    #[serde(default)]
    pub pricing: PricingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where provider pricing definitions are loaded from.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Load the provider files compiled into the binary.
    #[serde(default = "default_true")]
    pub builtin: bool,

    /// Extra provider files or directories of `*.json` files, loaded after
    /// the built-in providers in the order listed.
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// Treat a prefix alias that shadows a later-declared entry as a load error
    /// instead of a warning.
    #[serde(default)]
    pub strict_alias_order: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            paths: Vec::new(),
            strict_alias_order: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Which cost calculator variant to build.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PricingMode {
    /// Custom overrides first, then the catalog.
    #[default]
    Catalog,
    /// Custom overrides only; the catalog is never consulted.
    CustomOnly,
}

/// Cost calculator configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PricingConfig {
    #[serde(default)]
    pub mode: PricingMode,

    /// Custom pricing registered on the calculator at construction.
    #[serde(default)]
    pub custom: Vec<CustomPricingConfig>,
}

/// A custom pricing entry (`[[pricing.custom]]`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CustomPricingConfig {
    pub model_id: String,

    /// Price per million input tokens.
    pub input_price_per_million: Decimal,

    /// Price per million output tokens.
    pub output_price_per_million: Decimal,

    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub context_window: Option<u32>,
}
