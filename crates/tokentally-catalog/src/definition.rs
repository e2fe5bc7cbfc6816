// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk JSON shape of a provider pricing file.
//!
//! ```json
//! {
//!   "provider": "openai",
//!   "lastUpdated": "2025-06-01",
//!   "models": [
//!     { "modelId": "gpt-4o", "inputPricePerMillion": 2.50, "outputPricePerMillion": 10.00,
//!       "aliases": [{ "pattern": "gpt-4o", "type": "prefix" }] }
//!   ]
//! }
//! ```

use std::num::NonZeroU32;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tokentally_core::TallyError;

/// One provider file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDefinition {
    pub provider: String,
    #[serde(default)]
    pub last_updated: Option<NaiveDate>,
    pub models: Vec<ModelDefinition>,
}

/// One model entry. Order inside `models` is significant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDefinition {
    pub model_id: String,
    pub input_price_per_million: Decimal,
    pub output_price_per_million: Decimal,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub context_window: Option<NonZeroU32>,
    #[serde(default)]
    pub aliases: Vec<AliasDefinition>,
}

/// One alias entry; `type` is `exact`, `prefix` or `contains`.
#[derive(Debug, Clone, Deserialize)]
pub struct AliasDefinition {
    pub pattern: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Parse a provider file.
///
/// Empty content and a bare JSON `null` produce no provider (`Ok(None)`).
/// Anything else that fails to parse is a catalog error naming `origin`.
pub fn parse_provider(origin: &str, content: &str) -> Result<Option<ProviderDefinition>, TallyError> {
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Option<ProviderDefinition>>(content)
        .map_err(|e| TallyError::catalog(origin, e.to_string()))
}
