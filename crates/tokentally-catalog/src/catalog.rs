// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The merged pricing catalog and model resolution.
//!
//! Resolution order for a raw identifier:
//! 1. Exact, case-insensitive model id across all providers. Always wins.
//! 2. Exact alias rules, in index order.
//! 3. Prefix alias rules, in index order.
//! 4. Contains alias rules, in index order.
//!
//! The alias passes are separate scans: an early `Contains` rule must never
//! beat a later `Exact` one. Case folding is ASCII only; other characters
//! compare byte for byte.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokentally_core::TallyError;

use crate::alias::{AliasIndex, MatchKind};
use crate::provider::ProviderCatalog;
use crate::record::PricingRecord;
use crate::shadowing::{find_shadowed_aliases, ShadowedAlias};

/// Read-only pricing catalog for every loaded provider.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    providers: Vec<ProviderCatalog>,
    provider_index: HashMap<String, usize>,
    models: HashMap<String, Arc<PricingRecord>>,
    aliases: AliasIndex,
    shadowed: Vec<ShadowedAlias>,
}

impl Catalog {
    /// Merge providers, keeping their order.
    ///
    /// Provider names must be unique (case-insensitive). When two providers
    /// declare the same model id, the earlier provider owns the exact match.
    pub fn from_providers(providers: Vec<ProviderCatalog>) -> Result<Self, TallyError> {
        let mut provider_index = HashMap::with_capacity(providers.len());
        let mut models = HashMap::new();
        let mut rules = Vec::new();

        for (i, provider) in providers.iter().enumerate() {
            if provider_index
                .insert(provider.name().to_ascii_lowercase(), i)
                .is_some()
            {
                return Err(TallyError::catalog(
                    provider.name(),
                    format!("provider `{}` is defined more than once", provider.name()),
                ));
            }

            for record in provider.models() {
                match models.entry(record.model_id().to_ascii_lowercase()) {
                    Entry::Vacant(slot) => {
                        slot.insert(Arc::clone(record));
                    }
                    Entry::Occupied(existing) => {
                        tracing::debug!(
                            model_id = record.model_id(),
                            provider = provider.name(),
                            owner = existing.get().provider().unwrap_or_default(),
                            "model id already defined by an earlier provider"
                        );
                    }
                }
            }
            rules.extend(provider.alias_rules().iter().cloned());
        }

        let aliases = AliasIndex::new(rules);
        let shadowed = find_shadowed_aliases(&providers, &aliases);

        Ok(Self {
            providers,
            provider_index,
            models,
            aliases,
            shadowed,
        })
    }

    /// Resolve a raw model identifier to its pricing record.
    ///
    /// Blank identifiers resolve to nothing.
    pub fn resolve(&self, raw: &str) -> Option<Arc<PricingRecord>> {
        if raw.trim().is_empty() {
            return None;
        }

        let normalized = raw.to_ascii_lowercase();
        if let Some(record) = self.models.get(&normalized) {
            return Some(Arc::clone(record));
        }

        [MatchKind::Exact, MatchKind::Prefix, MatchKind::Contains]
            .into_iter()
            .find_map(|kind| {
                self.aliases
                    .iter()
                    .find(|rule| rule.match_kind() == kind && rule.matches(&normalized))
            })
            .map(|rule| Arc::clone(rule.target()))
    }

    /// Providers in load order.
    pub fn providers(&self) -> &[ProviderCatalog] {
        &self.providers
    }

    /// Case-insensitive provider lookup.
    pub fn provider(&self, name: &str) -> Option<&ProviderCatalog> {
        self.provider_index
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.providers[i])
    }

    /// Models of one provider in declaration order; `None` for an unknown provider.
    pub fn models(&self, provider: &str) -> Option<&[Arc<PricingRecord>]> {
        self.provider(provider).map(ProviderCatalog::models)
    }

    /// Every distinct model id, in provider and declaration order.
    pub fn model_ids(&self) -> impl Iterator<Item = &str> {
        self.providers
            .iter()
            .flat_map(|p| p.models())
            .filter(|record| {
                self.models
                    .get(&record.model_id().to_ascii_lowercase())
                    .is_some_and(|owner| Arc::ptr_eq(owner, record))
            })
            .map(|record| record.model_id())
    }

    /// Number of distinct model ids.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Most recent `lastUpdated` marker across providers.
    pub fn last_updated(&self) -> Option<NaiveDate> {
        self.providers.iter().filter_map(|p| p.last_updated()).max()
    }

    pub fn alias_index(&self) -> &AliasIndex {
        &self.aliases
    }

    /// Prefix aliases that hide a later-declared entry. See [`ShadowedAlias`].
    pub fn shadowed_aliases(&self) -> &[ShadowedAlias] {
        &self.shadowed
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::parse_provider;

    fn provider(json: &str) -> ProviderCatalog {
        let def = parse_provider("test.json", json).unwrap().unwrap();
        ProviderCatalog::from_definition(def, "test.json").unwrap()
    }

    fn openai() -> ProviderCatalog {
        provider(
            r#"{ "provider": "openai", "lastUpdated": "2025-05-01", "models": [
                { "modelId": "gpt-4o-mini", "inputPricePerMillion": 0.15, "outputPricePerMillion": 0.6,
                  "aliases": [{ "pattern": "gpt-4o-mini", "type": "prefix" }] },
                { "modelId": "gpt-4o", "inputPricePerMillion": 2.5, "outputPricePerMillion": 10,
                  "aliases": [{ "pattern": "gpt-4o", "type": "prefix" },
                              { "pattern": "4o", "type": "contains" }] }
            ] }"#,
        )
    }

    fn anthropic() -> ProviderCatalog {
        provider(
            r#"{ "provider": "anthropic", "lastUpdated": "2025-06-20", "models": [
                { "modelId": "claude-3-7-sonnet-20250219", "inputPricePerMillion": 3, "outputPricePerMillion": 15,
                  "aliases": [{ "pattern": "claude-3-7-sonnet-latest", "type": "exact" },
                              { "pattern": "claude-3.7-sonnet", "type": "contains" }] }
            ] }"#,
        )
    }

    fn catalog() -> Catalog {
        Catalog::from_providers(vec![openai(), anthropic()]).unwrap()
    }

    fn resolved_id(catalog: &Catalog, raw: &str) -> Option<String> {
        catalog.resolve(raw).map(|r| r.model_id().to_string())
    }

    #[test]
    fn exact_model_id_ignores_case() {
        let catalog = catalog();
        assert_eq!(resolved_id(&catalog, "GPT-4O").as_deref(), Some("gpt-4o"));
        assert_eq!(
            resolved_id(&catalog, "Claude-3-7-Sonnet-20250219").as_deref(),
            Some("claude-3-7-sonnet-20250219")
        );
    }

    #[test]
    fn exact_alias_beats_earlier_contains() {
        let catalog = Catalog::from_providers(vec![provider(
            r#"{ "provider": "acme", "models": [
                { "modelId": "acme-broad", "inputPricePerMillion": 1, "outputPricePerMillion": 1,
                  "aliases": [{ "pattern": "sonnet", "type": "contains" }] },
                { "modelId": "acme-sonnet-20250219", "inputPricePerMillion": 3, "outputPricePerMillion": 15,
                  "aliases": [{ "pattern": "acme-sonnet-latest", "type": "exact" }] }
            ] }"#,
        )])
        .unwrap();
        assert_eq!(
            resolved_id(&catalog, "ACME-SONNET-LATEST").as_deref(),
            Some("acme-sonnet-20250219")
        );
        assert_eq!(
            resolved_id(&catalog, "acme-sonnet-preview").as_deref(),
            Some("acme-broad")
        );
    }

    #[test]
    fn exact_model_id_beats_contains_alias_of_other_record() {
        let catalog = Catalog::from_providers(vec![provider(
            r#"{ "provider": "openai", "models": [
                { "modelId": "other", "inputPricePerMillion": 1, "outputPricePerMillion": 1,
                  "aliases": [{ "pattern": "4o", "type": "contains" }] },
                { "modelId": "gpt-4o", "inputPricePerMillion": 2.5, "outputPricePerMillion": 10 }
            ] }"#,
        )])
        .unwrap();
        assert_eq!(resolved_id(&catalog, "GPT-4O").as_deref(), Some("gpt-4o"));
        assert_eq!(resolved_id(&catalog, "gpt-4o-x").as_deref(), Some("other"));
    }

    #[test]
    fn case_folding_is_ascii_only() {
        let catalog = Catalog::from_providers(vec![provider(
            r#"{ "provider": "acme", "models": [
                { "modelId": "modèle-x", "inputPricePerMillion": 1, "outputPricePerMillion": 1,
                  "aliases": [{ "pattern": "ÉTÉ", "type": "prefix" }] }
            ] }"#,
        )])
        .unwrap();
        assert_eq!(resolved_id(&catalog, "MODèLE-X").as_deref(), Some("modèle-x"));
        assert!(catalog.resolve("MODÈLE-X").is_none());
        assert_eq!(resolved_id(&catalog, "ÉtÉ-2025").as_deref(), Some("modèle-x"));
        assert!(catalog.resolve("été-2025").is_none());
    }

    #[test]
    fn contains_pass_folds_case() {
        let catalog = catalog();
        assert_eq!(
            resolved_id(&catalog, "CLAUDE-3.7-SONNET").as_deref(),
            Some("claude-3-7-sonnet-20250219")
        );
    }

    #[test]
    fn narrower_prefix_declared_first_wins() {
        let catalog = catalog();
        assert_eq!(
            resolved_id(&catalog, "gpt-4o-mini-2024-07-18").as_deref(),
            Some("gpt-4o-mini")
        );
        assert_eq!(
            resolved_id(&catalog, "gpt-4o-2024-08-06").as_deref(),
            Some("gpt-4o")
        );
    }

    #[test]
    fn unknown_and_blank_identifiers_resolve_to_nothing() {
        let catalog = catalog();
        assert!(catalog.resolve("llama-3-70b").is_none());
        assert!(catalog.resolve("").is_none());
        assert!(catalog.resolve("   \t").is_none());
    }

    #[test]
    fn duplicate_provider_names_are_rejected() {
        let err = Catalog::from_providers(vec![openai(), openai()]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn earlier_provider_owns_shared_model_id() {
        let reseller = provider(
            r#"{ "provider": "reseller", "models": [
                { "modelId": "GPT-4o", "inputPricePerMillion": 5, "outputPricePerMillion": 20 }
            ] }"#,
        );
        let catalog = Catalog::from_providers(vec![openai(), reseller]).unwrap();
        let record = catalog.resolve("gpt-4o").unwrap();
        assert_eq!(record.provider(), Some("openai"));
        assert_eq!(catalog.model_count(), 2);
        assert_eq!(catalog.model_ids().collect::<Vec<_>>(), ["gpt-4o-mini", "gpt-4o"]);
        assert_eq!(catalog.models("reseller").map(<[_]>::len), Some(1));
    }

    #[test]
    fn introspection_follows_load_order() {
        let catalog = catalog();
        let names: Vec<&str> = catalog.providers().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["openai", "anthropic"]);
        assert!(catalog.provider("OpenAI").is_some());
        assert!(catalog.models("mistral").is_none());
        assert_eq!(catalog.last_updated(), NaiveDate::from_ymd_opt(2025, 6, 20));
        assert_eq!(catalog.alias_index().len(), 5);
    }

    #[test]
    fn empty_catalog_resolves_nothing() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.resolve("gpt-4o").is_none());
        assert!(catalog.last_updated().is_none());
    }
}
