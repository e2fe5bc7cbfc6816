// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./tokentally.toml` > `~/.config/tokentally/tokentally.toml`
//! > `/etc/tokentally/tokentally.toml`, with `TOKENTALLY_` environment
//! variables overriding every file.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TallyConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/tokentally/tokentally.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "tokentally.toml";

/// The user config file under the XDG config directory, if one can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tokentally").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tokentally/tokentally.toml`
/// 3. `~/.config/tokentally/tokentally.toml`
/// 4. `./tokentally.toml`
/// 5. `TOKENTALLY_*` environment variables
pub fn load_config() -> Result<TallyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<TallyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TallyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, still honouring env overrides.
pub fn load_config_from_path(path: &Path) -> Result<TallyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TallyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TallyConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// `Env::split("_")` would turn `TOKENTALLY_CATALOG_STRICT_ALIAS_ORDER` into
/// `catalog.strict.alias.order`; only the first segment names a section.
/// Keys reach the mapping in their original (upper) case.
fn env_provider() -> Env {
    Env::prefixed("TOKENTALLY_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = key_str
            .replacen("logging_", "logging.", 1)
            .replacen("catalog_", "catalog.", 1)
            .replacen("pricing_", "pricing.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PricingMode;
    use figment::Jail;

    #[test]
    fn env_vars_map_onto_every_section() {
        Jail::expect_with(|jail| {
            jail.set_env("TOKENTALLY_LOGGING_LEVEL", "debug");
            jail.set_env("TOKENTALLY_CATALOG_BUILTIN", "false");
            jail.set_env("TOKENTALLY_PRICING_MODE", "custom_only");

            let config: TallyConfig = build_figment().extract()?;
            assert_eq!(config.logging.level, "debug");
            assert!(!config.catalog.builtin);
            assert_eq!(config.pricing.mode, PricingMode::CustomOnly);
            Ok(())
        });
    }

    #[test]
    fn unknown_env_var_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("TOKENTALLY_CATALOG_BULTIN", "false");
            assert!(build_figment().extract::<TallyConfig>().is_err());
            Ok(())
        });
    }
}
