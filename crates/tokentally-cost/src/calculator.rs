// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing lookup and cost calculation.
//!
//! Two calculators share one trait. [`CatalogCostCalculator`] consults its
//! override table and then the catalog; [`CustomOnlyCostCalculator`] never
//! looks past its override table. [`CostCalculator::calculate_cost`] always
//! goes through the implementor's own `get_pricing`, so callers holding an
//! `Arc<dyn CostCalculator>` see the variant's lookup rules.

use std::collections::{BTreeSet, HashMap};
use std::num::NonZeroU32;
use std::sync::{Arc, PoisonError, RwLock};

use rust_decimal::Decimal;
use tokentally_catalog::{Catalog, PricingRecord};
use tokentally_config::{CustomPricingConfig, PricingConfig, PricingMode};
use tokentally_core::TallyError;
use tracing::{debug, info};

/// Cost of a request priced with `pricing`.
///
/// `input_tokens / 1e6 * input_price + output_tokens / 1e6 * output_price`,
/// exact in decimal arithmetic.
pub fn cost_for(pricing: &PricingRecord, input_tokens: u64, output_tokens: u64) -> Decimal {
    per_million(input_tokens, pricing.input_price_per_million())
        .saturating_add(per_million(output_tokens, pricing.output_price_per_million()))
}

/// `tokens * price / 1e6`, saturating at `Decimal::MAX` for absurd prices.
fn per_million(tokens: u64, price: Decimal) -> Decimal {
    let million = Decimal::from(1_000_000u32);
    let tokens = Decimal::from(tokens);
    match tokens.checked_mul(price) {
        Some(product) => product / million,
        None => (tokens / million).saturating_mul(price),
    }
}

/// Pricing lookup with a per-instance override table.
pub trait CostCalculator: Send + Sync {
    /// Pricing for `model_id`, or `None` when the model is unknown.
    fn get_pricing(&self, model_id: &str) -> Option<Arc<PricingRecord>>;

    /// Insert or replace an override, keyed case-insensitively by model id.
    fn register_pricing(&self, record: PricingRecord);

    /// Every model id this calculator can price, de-duplicated ignoring case.
    fn registered_models(&self) -> BTreeSet<String>;

    /// Cost of a request, or `None` when the model has no pricing.
    fn calculate_cost(
        &self,
        model_id: &str,
        input_tokens: u64,
        output_tokens: u64,
    ) -> Option<Decimal> {
        self.get_pricing(model_id)
            .map(|pricing| cost_for(&pricing, input_tokens, output_tokens))
    }
}

/// Case-insensitive override table. Last registration for a key wins.
#[derive(Debug, Default)]
pub struct PricingOverrides {
    table: RwLock<HashMap<String, Arc<PricingRecord>>>,
}

impl PricingOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record`, returning the override it replaced.
    pub fn insert(&self, record: PricingRecord) -> Option<Arc<PricingRecord>> {
        let key = record.model_id().to_ascii_lowercase();
        let record = Arc::new(record);
        let previous = self
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&record));
        debug!(
            model_id = record.model_id(),
            replaced = previous.is_some(),
            "pricing override registered"
        );
        previous
    }

    pub fn get(&self, model_id: &str) -> Option<Arc<PricingRecord>> {
        if model_id.trim().is_empty() {
            return None;
        }
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&model_id.to_ascii_lowercase())
            .cloned()
    }

    /// Model ids as registered, in no particular order.
    pub fn model_ids(&self) -> Vec<String> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|record| record.model_id().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Overrides first, then the pricing catalog.
#[derive(Debug)]
pub struct CatalogCostCalculator {
    overrides: PricingOverrides,
    catalog: Arc<Catalog>,
}

impl CatalogCostCalculator {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            overrides: PricingOverrides::new(),
            catalog,
        }
    }

    /// Calculator over the process-wide catalog.
    pub fn from_global() -> Result<Self, TallyError> {
        Ok(Self::new(tokentally_catalog::global()?))
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn overrides(&self) -> &PricingOverrides {
        &self.overrides
    }
}

impl CostCalculator for CatalogCostCalculator {
    fn get_pricing(&self, model_id: &str) -> Option<Arc<PricingRecord>> {
        self.overrides
            .get(model_id)
            .or_else(|| self.catalog.resolve(model_id))
    }

    fn register_pricing(&self, record: PricingRecord) {
        self.overrides.insert(record);
    }

    fn registered_models(&self) -> BTreeSet<String> {
        dedup_ignoring_case(
            self.overrides
                .model_ids()
                .into_iter()
                .chain(self.catalog.model_ids().map(str::to_string)),
        )
    }
}

/// Overrides only. The catalog is never consulted.
#[derive(Debug, Default)]
pub struct CustomOnlyCostCalculator {
    overrides: PricingOverrides,
}

impl CustomOnlyCostCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overrides(&self) -> &PricingOverrides {
        &self.overrides
    }
}

impl CostCalculator for CustomOnlyCostCalculator {
    fn get_pricing(&self, model_id: &str) -> Option<Arc<PricingRecord>> {
        self.overrides.get(model_id)
    }

    fn register_pricing(&self, record: PricingRecord) {
        self.overrides.insert(record);
    }

    fn registered_models(&self) -> BTreeSet<String> {
        dedup_ignoring_case(self.overrides.model_ids())
    }
}

/// Keep the first spelling seen for each case-insensitive id.
fn dedup_ignoring_case(ids: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    let mut seen: HashMap<String, String> = HashMap::new();
    for id in ids {
        seen.entry(id.to_ascii_lowercase()).or_insert(id);
    }
    seen.into_values().collect()
}

/// Build the pricing record for one `[[pricing.custom]]` entry.
pub fn custom_record(entry: &CustomPricingConfig) -> Result<PricingRecord, TallyError> {
    let mut record = PricingRecord::new(
        entry.model_id.trim(),
        entry.input_price_per_million,
        entry.output_price_per_million,
    )?;
    if let Some(provider) = &entry.provider {
        record = record.with_provider(provider.clone());
    }
    if let Some(display_name) = &entry.display_name {
        record = record.with_display_name(display_name.clone());
    }
    if let Some(window) = entry.context_window.and_then(NonZeroU32::new) {
        record = record.with_context_window(window);
    }
    Ok(record)
}

/// Build the calculator selected by `pricing.mode`, with every
/// `pricing.custom` entry registered as an override.
pub fn calculator_from_config(
    config: &PricingConfig,
    catalog: Arc<Catalog>,
) -> Result<Arc<dyn CostCalculator>, TallyError> {
    let calculator: Arc<dyn CostCalculator> = match config.mode {
        PricingMode::Catalog => Arc::new(CatalogCostCalculator::new(catalog)),
        PricingMode::CustomOnly => Arc::new(CustomOnlyCostCalculator::new()),
    };
    for entry in &config.custom {
        calculator.register_pricing(custom_record(entry)?);
    }

    info!(
        mode = %config.mode,
        custom = config.custom.len(),
        "cost calculator ready"
    );
    Ok(calculator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tokentally_catalog::CatalogSource;

    fn catalog() -> Arc<Catalog> {
        let json = r#"{ "provider": "openai", "models": [
            { "modelId": "gpt-4o-mini", "inputPricePerMillion": 0.15, "outputPricePerMillion": 0.60,
              "aliases": [{ "pattern": "gpt-4o-mini", "type": "prefix" }] },
            { "modelId": "gpt-4o", "inputPricePerMillion": 2.50, "outputPricePerMillion": 10.00,
              "aliases": [{ "pattern": "gpt-4o", "type": "prefix" }] }
        ] }"#;
        Arc::new(Catalog::from_sources(vec![CatalogSource::new("openai.json", json)], false).unwrap())
    }

    fn record(id: &str, input: Decimal, output: Decimal) -> PricingRecord {
        PricingRecord::new(id, input, output).unwrap()
    }

    #[test]
    fn cost_is_exact_at_sub_cent_precision() {
        let pricing = record("gpt-4o", dec!(2.50), dec!(10.00));
        assert_eq!(cost_for(&pricing, 1, 0), dec!(0.0000025));
        assert_eq!(cost_for(&pricing, 1_000, 500), dec!(0.0075));
        assert_eq!(cost_for(&pricing, 0, 0), Decimal::ZERO);
    }

    #[test]
    fn large_token_counts_do_not_overflow() {
        let pricing = record("gpt-4", dec!(30), dec!(60));
        assert_eq!(cost_for(&pricing, 100_000_000, 100_000_000), dec!(9000));
        assert!(cost_for(&pricing, u64::MAX, u64::MAX) > Decimal::ZERO);
    }

    #[test]
    fn extreme_prices_saturate() {
        let pricing = record("absurd", Decimal::MAX, Decimal::MAX);
        assert_eq!(cost_for(&pricing, u64::MAX, u64::MAX), Decimal::MAX);
        assert_eq!(cost_for(&pricing, 0, 0), Decimal::ZERO);
    }

    #[test]
    fn catalog_calculator_falls_back_to_catalog() {
        let calc = CatalogCostCalculator::new(catalog());
        let pricing = calc.get_pricing("gpt-4o-2024-08-06").unwrap();
        assert_eq!(pricing.model_id(), "gpt-4o");
        assert_eq!(calc.calculate_cost("gpt-4o", 1_000_000, 0), Some(dec!(2.50)));
        assert!(calc.get_pricing("unknown-xyz").is_none());
        assert!(calc.calculate_cost("unknown-xyz", 10, 10).is_none());
    }

    #[test]
    fn override_beats_catalog_and_last_registration_wins() {
        let calc = CatalogCostCalculator::new(catalog());
        calc.register_pricing(record("GPT-4o", dec!(1), dec!(1)));
        calc.register_pricing(record("gpt-4o", dec!(2), dec!(2)));
        assert_eq!(
            calc.get_pricing("gpt-4O").unwrap().input_price_per_million(),
            dec!(2)
        );
        assert_eq!(calc.overrides().len(), 1);
    }

    #[test]
    fn custom_only_never_consults_catalog() {
        let calc = CustomOnlyCostCalculator::new();
        calc.register_pricing(record("my-finetune", dec!(1.25), dec!(5)));
        assert!(calc.get_pricing("gpt-4o").is_none());
        assert!(calc.calculate_cost("gpt-4o", 100, 100).is_none());
        assert_eq!(
            calc.calculate_cost("MY-FINETUNE", 1_000_000, 1_000_000),
            Some(dec!(6.25))
        );
    }

    #[test]
    fn calculate_cost_dispatches_through_trait_object() {
        let calcs: Vec<Arc<dyn CostCalculator>> = vec![
            Arc::new(CatalogCostCalculator::new(catalog())),
            Arc::new(CustomOnlyCostCalculator::new()),
        ];
        let costs: Vec<Option<Decimal>> = calcs
            .iter()
            .map(|c| c.calculate_cost("gpt-4o-mini", 1_000_000, 0))
            .collect();
        assert_eq!(costs, [Some(dec!(0.15)), None]);
    }

    #[test]
    fn registered_models_are_deduplicated_ignoring_case() {
        let calc = CatalogCostCalculator::new(catalog());
        calc.register_pricing(record("GPT-4O", dec!(1), dec!(1)));
        calc.register_pricing(record("custom-a", dec!(1), dec!(1)));
        let models = calc.registered_models();
        assert_eq!(models.len(), 3);
        assert!(models.contains("custom-a"));
        assert!(models.contains("gpt-4o-mini"));

        let custom = CustomOnlyCostCalculator::new();
        assert!(custom.registered_models().is_empty());
        custom.register_pricing(record("custom-a", dec!(1), dec!(1)));
        assert_eq!(custom.registered_models().into_iter().collect::<Vec<_>>(), ["custom-a"]);
    }

    #[test]
    fn config_selects_variant_and_registers_custom_entries() {
        let entry = CustomPricingConfig {
            model_id: "my-finetune".into(),
            input_price_per_million: dec!(1.25),
            output_price_per_million: dec!(5.00),
            provider: Some("internal".into()),
            display_name: None,
            context_window: Some(32_000),
        };
        let config = PricingConfig {
            mode: PricingMode::CustomOnly,
            custom: vec![entry.clone()],
        };
        let calc = calculator_from_config(&config, catalog()).unwrap();
        assert!(calc.get_pricing("gpt-4o").is_none());
        let pricing = calc.get_pricing("my-finetune").unwrap();
        assert_eq!(pricing.provider(), Some("internal"));
        assert_eq!(pricing.context_window().map(NonZeroU32::get), Some(32_000));

        let config = PricingConfig {
            mode: PricingMode::Catalog,
            custom: vec![entry],
        };
        let calc = calculator_from_config(&config, catalog()).unwrap();
        assert!(calc.get_pricing("gpt-4o").is_some());
        assert!(calc.get_pricing("my-finetune").is_some());
    }

    #[test]
    fn invalid_custom_entry_is_rejected() {
        let config = PricingConfig {
            mode: PricingMode::Catalog,
            custom: vec![CustomPricingConfig {
                model_id: "bad".into(),
                input_price_per_million: dec!(-1),
                output_price_per_million: dec!(1),
                provider: None,
                display_name: None,
                context_window: None,
            }],
        };
        assert!(matches!(
            calculator_from_config(&config, catalog()),
            Err(TallyError::InvalidInput(_))
        ));
    }
}
