// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-provider model set built from a provider definition.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokentally_core::TallyError;

use crate::alias::{AliasRule, MatchKind};
use crate::definition::ProviderDefinition;
use crate::record::PricingRecord;

/// The models and alias rules of one provider, in declaration order.
#[derive(Debug, Clone)]
pub struct ProviderCatalog {
    name: String,
    last_updated: Option<NaiveDate>,
    models: Vec<Arc<PricingRecord>>,
    by_id: HashMap<String, usize>,
    alias_rules: Vec<AliasRule>,
}

impl ProviderCatalog {
    /// Build the provider's model map and alias rules.
    ///
    /// `origin` names the source in errors. Any invalid model fails the whole
    /// provider; nothing partial is returned.
    pub fn from_definition(definition: ProviderDefinition, origin: &str) -> Result<Self, TallyError> {
        let name = definition.provider.trim().to_string();
        if name.is_empty() {
            return Err(TallyError::catalog(origin, "provider name must not be empty"));
        }

        let mut catalog = Self {
            name,
            last_updated: definition.last_updated,
            models: Vec::with_capacity(definition.models.len()),
            by_id: HashMap::with_capacity(definition.models.len()),
            alias_rules: Vec::new(),
        };

        for model in definition.models {
            let mut record = PricingRecord::new(
                model.model_id.trim(),
                model.input_price_per_million,
                model.output_price_per_million,
            )
            .map_err(|e| TallyError::catalog(origin, e.to_string()))?
            .with_provider(catalog.name.clone());
            if let Some(display_name) = model.display_name {
                record = record.with_display_name(display_name);
            }
            if let Some(window) = model.context_window {
                record = record.with_context_window(window);
            }

            let key = record.model_id().to_ascii_lowercase();
            if catalog.by_id.contains_key(&key) {
                return Err(TallyError::catalog(
                    origin,
                    format!(
                        "duplicate model id `{}` in provider `{}`",
                        record.model_id(),
                        catalog.name
                    ),
                ));
            }

            let record = Arc::new(record);
            for alias in model.aliases {
                let pattern = alias.pattern.trim();
                if pattern.is_empty() {
                    return Err(TallyError::catalog(
                        origin,
                        format!("empty alias pattern on model `{}`", record.model_id()),
                    ));
                }
                catalog.alias_rules.push(AliasRule::new(
                    pattern,
                    MatchKind::classify(alias.kind.as_deref()),
                    Arc::clone(&record),
                ));
            }

            catalog.by_id.insert(key, catalog.models.len());
            catalog.models.push(record);
        }

        tracing::debug!(
            provider = %catalog.name,
            models = catalog.models.len(),
            aliases = catalog.alias_rules.len(),
            origin,
            "provider catalog parsed"
        );
        Ok(catalog)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Date the provider's prices were last revised, if the file records it.
    pub fn last_updated(&self) -> Option<NaiveDate> {
        self.last_updated
    }

    /// Models in declaration order.
    pub fn models(&self) -> &[Arc<PricingRecord>] {
        &self.models
    }

    /// Case-insensitive lookup by model id.
    pub fn get(&self, model_id: &str) -> Option<&Arc<PricingRecord>> {
        self.by_id
            .get(&model_id.to_ascii_lowercase())
            .map(|&i| &self.models[i])
    }

    /// Alias rules in declaration order.
    pub fn alias_rules(&self) -> &[AliasRule] {
        &self.alias_rules
    }
}
