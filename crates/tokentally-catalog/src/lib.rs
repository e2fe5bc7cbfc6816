// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing catalog for tokentally.
//!
//! Loads provider pricing files (embedded OpenAI, Anthropic and Google data
//! plus any configured paths), builds the ordered alias index, and resolves
//! raw model identifiers to their [`PricingRecord`].
//!
//! ```
//! use tokentally_catalog::Catalog;
//! use tokentally_config::CatalogConfig;
//!
//! let catalog = Catalog::load(&CatalogConfig::default()).unwrap();
//! let record = catalog.resolve("gpt-4o-2024-08-06").unwrap();
//! assert_eq!(record.model_id(), "gpt-4o");
//! ```

pub mod alias;
pub mod catalog;
pub mod definition;
pub mod global;
pub mod loader;
pub mod provider;
pub mod record;
pub mod shadowing;

pub use alias::{AliasIndex, AliasRule, MatchKind};
pub use catalog::Catalog;
pub use definition::{parse_provider, AliasDefinition, ModelDefinition, ProviderDefinition};
pub use global::{global, init, try_global};
pub use loader::{builtin_sources, sources_from_paths, CatalogSource};
pub use provider::ProviderCatalog;
pub use record::PricingRecord;
pub use shadowing::{ShadowedAlias, ShadowedEntry};
