// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing record for a single billable model.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::Serialize;
use tokentally_core::TallyError;

/// Per-model pricing in currency units per million tokens.
///
/// Fields are private: prices are validated non-negative at construction and
/// the model id never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingRecord {
    model_id: String,
    input_price_per_million: Decimal,
    output_price_per_million: Decimal,
    provider: Option<String>,
    display_name: Option<String>,
    context_window: Option<NonZeroU32>,
}

impl PricingRecord {
    /// Create a record, rejecting an empty model id or a negative price.
    pub fn new(
        model_id: impl Into<String>,
        input_price_per_million: Decimal,
        output_price_per_million: Decimal,
    ) -> Result<Self, TallyError> {
        let model_id = model_id.into();
        if model_id.trim().is_empty() {
            return Err(TallyError::InvalidInput(
                "pricing record model id must not be empty".to_string(),
            ));
        }
        for (side, price) in [
            ("input", input_price_per_million),
            ("output", output_price_per_million),
        ] {
            if price.is_sign_negative() && !price.is_zero() {
                return Err(TallyError::InvalidInput(format!(
                    "{side} price for `{model_id}` must be non-negative, got {price}"
                )));
            }
        }

        Ok(Self {
            model_id,
            input_price_per_million,
            output_price_per_million,
            provider: None,
            display_name: None,
            context_window: None,
        })
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_context_window(mut self, tokens: NonZeroU32) -> Self {
        self.context_window = Some(tokens);
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn input_price_per_million(&self) -> Decimal {
        self.input_price_per_million
    }

    pub fn output_price_per_million(&self) -> Decimal {
        self.output_price_per_million
    }

    /// Owning provider. Always set for catalog entries.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Context window in tokens, if known.
    pub fn context_window(&self) -> Option<NonZeroU32> {
        self.context_window
    }
}
