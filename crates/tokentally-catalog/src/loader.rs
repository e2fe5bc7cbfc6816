// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog loading from embedded and on-disk provider files.

use std::path::{Path, PathBuf};

use tokentally_config::CatalogConfig;
use tokentally_core::TallyError;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::definition::parse_provider;
use crate::provider::ProviderCatalog;

/// Provider files compiled into the crate, in load order.
const BUILTIN_PROVIDERS: &[(&str, &str)] = &[
    ("builtin:openai", include_str!("../data/openai.json")),
    ("builtin:anthropic", include_str!("../data/anthropic.json")),
    ("builtin:google", include_str!("../data/google.json")),
];

/// Raw content of one provider file and where it came from.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    pub origin: String,
    pub content: String,
}

impl CatalogSource {
    pub fn new(origin: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            content: content.into(),
        }
    }

    /// Read a provider file from disk.
    pub fn from_file(path: &Path) -> Result<Self, TallyError> {
        let content = std::fs::read_to_string(path).map_err(|source| TallyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path.display().to_string(), content))
    }
}

/// The embedded provider files.
pub fn builtin_sources() -> Vec<CatalogSource> {
    BUILTIN_PROVIDERS
        .iter()
        .map(|(origin, content)| CatalogSource::new(*origin, *content))
        .collect()
}

/// Read provider files from the given paths, in order.
///
/// A directory contributes its `*.json` files sorted by file name.
pub fn sources_from_paths(paths: &[PathBuf]) -> Result<Vec<CatalogSource>, TallyError> {
    let mut sources = Vec::new();
    for path in paths {
        if path.is_dir() {
            let entries = std::fs::read_dir(path).map_err(|source| TallyError::Io {
                path: path.clone(),
                source,
            })?;
            let mut files = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|source| TallyError::Io {
                    path: path.clone(),
                    source,
                })?;
                let file = entry.path();
                if file.is_file() && file.extension().is_some_and(|ext| ext == "json") {
                    files.push(file);
                }
            }
            files.sort();
            debug!(dir = %path.display(), files = files.len(), "catalog directory scanned");
            for file in files {
                sources.push(CatalogSource::from_file(&file)?);
            }
        } else {
            sources.push(CatalogSource::from_file(path)?);
        }
    }
    Ok(sources)
}

impl Catalog {
    /// Build a catalog from the sources named by `config`.
    pub fn load(config: &CatalogConfig) -> Result<Self, TallyError> {
        let mut sources = if config.builtin {
            builtin_sources()
        } else {
            Vec::new()
        };
        sources.extend(sources_from_paths(&config.paths)?);
        Self::from_sources(sources, config.strict_alias_order)
    }

    /// Parse every source and merge them in order.
    ///
    /// A malformed source fails the whole catalog. Sources that contain no
    /// provider object are skipped. With `strict_alias_order`, a shadowing
    /// prefix alias is an error rather than a warning.
    pub fn from_sources(
        sources: impl IntoIterator<Item = CatalogSource>,
        strict_alias_order: bool,
    ) -> Result<Self, TallyError> {
        let mut providers = Vec::new();
        for source in sources {
            let Some(definition) = parse_provider(&source.origin, &source.content)? else {
                warn!(origin = %source.origin, "catalog source contains no provider, skipping");
                continue;
            };
            providers.push(ProviderCatalog::from_definition(definition, &source.origin)?);
        }

        let catalog = Self::from_providers(providers)?;

        for shadowed in catalog.shadowed_aliases() {
            if strict_alias_order {
                return Err(TallyError::catalog("alias index", shadowed.to_string()));
            }
            warn!(
                pattern = %shadowed.pattern,
                owner = %shadowed.owner,
                shadowed = %shadowed.shadowed,
                "{shadowed}"
            );
        }

        info!(
            providers = catalog.providers().len(),
            models = catalog.model_count(),
            aliases = catalog.alias_index().len(),
            "pricing catalog loaded"
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    const BROAD_FIRST: &str = r#"{ "provider": "acme", "models": [
        { "modelId": "acme", "inputPricePerMillion": 1, "outputPricePerMillion": 1,
          "aliases": [{ "pattern": "acme", "type": "prefix" }] },
        { "modelId": "acme-mini", "inputPricePerMillion": 0.1, "outputPricePerMillion": 0.1 }
    ] }"#;

    #[test]
    fn builtin_catalog_loads_cleanly() {
        let catalog = Catalog::load(&CatalogConfig::default()).unwrap();
        let names: Vec<&str> = catalog.providers().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["openai", "anthropic", "google"]);
        assert!(catalog.shadowed_aliases().is_empty(), "{:?}", catalog.shadowed_aliases());
        assert!(catalog.last_updated().is_some());
    }

    #[test]
    fn builtin_can_be_disabled() {
        let config = CatalogConfig {
            builtin: false,
            ..CatalogConfig::default()
        };
        let catalog = Catalog::load(&config).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    #[traced_test]
    fn empty_sources_are_skipped_with_warning() {
        let sources = vec![
            CatalogSource::new("empty.json", ""),
            CatalogSource::new("null.json", "null"),
        ];
        let catalog = Catalog::from_sources(sources, false).unwrap();
        assert!(catalog.is_empty());
        assert!(logs_contain("catalog source contains no provider"));
    }

    #[test]
    fn malformed_source_fails_the_catalog() {
        let sources = vec![
            CatalogSource::new("good.json", r#"{ "provider": "a", "models": [] }"#),
            CatalogSource::new("bad.json", r#"{ "provider": "b", "models": [{ "modelId": "x" }] }"#),
        ];
        let err = Catalog::from_sources(sources, false).unwrap_err();
        assert!(matches!(err, TallyError::Catalog { origin, .. } if origin == "bad.json"));
    }

    #[test]
    #[traced_test]
    fn shadowing_alias_warns_by_default() {
        let catalog =
            Catalog::from_sources(vec![CatalogSource::new("acme.json", BROAD_FIRST)], false).unwrap();
        assert_eq!(catalog.shadowed_aliases().len(), 1);
        assert!(logs_contain("will capture its variants"));
    }

    #[test]
    fn shadowing_alias_fails_in_strict_mode() {
        let err = Catalog::from_sources(vec![CatalogSource::new("acme.json", BROAD_FIRST)], true)
            .unwrap_err();
        assert!(err.to_string().contains("prefix alias `acme`"));
    }

    #[test]
    fn missing_path_is_an_io_error() {
        let err = sources_from_paths(&[PathBuf::from("/no/such/catalog.json")]).unwrap_err();
        assert!(matches!(err, TallyError::Io { .. }));
    }
}
