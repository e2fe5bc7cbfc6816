// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Detection of prefix aliases declared in the wrong order.
//!
//! A prefix alias `gpt-4o` declared before a model `gpt-4o-mini` (or before
//! another prefix alias `gpt-4o-mini`) captures every dated variant of the
//! later entry, because the first prefix rule wins.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use strum::Display;

use crate::alias::{AliasIndex, MatchKind};
use crate::provider::ProviderCatalog;
use crate::record::PricingRecord;

/// What kind of later entry is hidden by a prefix alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ShadowedEntry {
    /// A later prefix alias pattern.
    Alias,
    /// A later model id.
    ModelId,
}

/// A prefix alias that matches identifiers intended for a later entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowedAlias {
    /// The broad prefix pattern.
    pub pattern: String,
    /// Model the broad prefix resolves to.
    pub owner: String,
    pub entry: ShadowedEntry,
    /// The hidden pattern or model id.
    pub shadowed: String,
    /// Model the hidden entry belongs to.
    pub shadowed_owner: String,
}

impl fmt::Display for ShadowedAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "prefix alias `{}` ({}) is declared before {} `{}` ({}) and will capture its variants",
            self.pattern, self.owner, self.entry, self.shadowed, self.shadowed_owner
        )
    }
}

/// Scan the alias index for prefix rules that shadow later entries.
pub fn find_shadowed_aliases(
    providers: &[ProviderCatalog],
    aliases: &AliasIndex,
) -> Vec<ShadowedAlias> {
    let ordered: Vec<&Arc<PricingRecord>> = providers.iter().flat_map(|p| p.models()).collect();
    let ordinal: HashMap<*const PricingRecord, usize> = ordered
        .iter()
        .enumerate()
        .map(|(i, record)| (Arc::as_ptr(record), i))
        .collect();

    let mut found = Vec::new();
    for (i, rule) in aliases.iter().enumerate() {
        if rule.match_kind() != MatchKind::Prefix {
            continue;
        }
        let owner = rule.target();

        for later in aliases.iter().skip(i + 1) {
            if later.match_kind() == MatchKind::Prefix
                && !Arc::ptr_eq(later.target(), owner)
                && later.pattern().starts_with(rule.pattern())
            {
                found.push(ShadowedAlias {
                    pattern: rule.pattern().to_string(),
                    owner: owner.model_id().to_string(),
                    entry: ShadowedEntry::Alias,
                    shadowed: later.pattern().to_string(),
                    shadowed_owner: later.target().model_id().to_string(),
                });
            }
        }

        let Some(&position) = ordinal.get(&Arc::as_ptr(owner)) else {
            continue;
        };
        for record in &ordered[position + 1..] {
            if !Arc::ptr_eq(record, owner)
                && record.model_id().to_ascii_lowercase().starts_with(rule.pattern())
            {
                found.push(ShadowedAlias {
                    pattern: rule.pattern().to_string(),
                    owner: owner.model_id().to_string(),
                    entry: ShadowedEntry::ModelId,
                    shadowed: record.model_id().to_string(),
                    shadowed_owner: record.model_id().to_string(),
                });
            }
        }
    }

    found
}
