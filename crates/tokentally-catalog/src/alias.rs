// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alias rules and the ordered alias index.
//!
//! Rules keep the order they were declared in: provider load order first,
//! then declaration order inside each provider file. Within one match kind
//! the first rule wins, so a catalog must list `gpt-4o-mini` before `gpt-4o`
//! when `gpt-4o` carries a prefix alias.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::record::PricingRecord;

/// How an alias pattern is compared with a lower-cased model identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Pattern equals the identifier.
    #[default]
    Exact,
    /// Pattern is a prefix of the identifier.
    Prefix,
    /// Pattern occurs anywhere in the identifier.
    Contains,
}

impl MatchKind {
    /// Classify a catalog `type` string. Missing or unrecognized types are `Exact`.
    pub fn classify(kind: Option<&str>) -> Self {
        kind.and_then(|k| k.trim().parse().ok()).unwrap_or_default()
    }
}

/// A pattern bound to the pricing record it resolves to.
#[derive(Debug, Clone)]
pub struct AliasRule {
    pattern: String,
    match_kind: MatchKind,
    target: Arc<PricingRecord>,
}

impl AliasRule {
    /// Build a rule; the pattern is ASCII lower-cased.
    pub fn new(pattern: &str, match_kind: MatchKind, target: Arc<PricingRecord>) -> Self {
        Self {
            pattern: pattern.to_ascii_lowercase(),
            match_kind,
            target,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn match_kind(&self) -> MatchKind {
        self.match_kind
    }

    pub fn target(&self) -> &Arc<PricingRecord> {
        &self.target
    }

    /// Whether this rule matches an already lower-cased identifier.
    pub fn matches(&self, normalized: &str) -> bool {
        match self.match_kind {
            MatchKind::Exact => normalized == self.pattern,
            MatchKind::Prefix => normalized.starts_with(&self.pattern),
            MatchKind::Contains => normalized.contains(&self.pattern),
        }
    }
}

/// Every alias rule of the catalog, concatenated in provider load order.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    rules: Vec<AliasRule>,
}

impl AliasIndex {
    pub fn new(rules: Vec<AliasRule>) -> Self {
        Self { rules }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AliasRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a AliasIndex {
    type Item = &'a AliasRule;
    type IntoIter = std::slice::Iter<'a, AliasRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
