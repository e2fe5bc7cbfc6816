// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token counting collaborator.
//!
//! Tokenization itself is delegated to `tiktoken-rs`; this module only
//! exposes it behind a small trait so the usage accountant can treat it as
//! an opaque, deterministic oracle.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tiktoken_rs::CoreBPE;

use crate::error::TallyError;

/// Counts the tokens in a piece of text.
pub trait TokenCounter: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn count_tokens(&self, text: &str) -> usize {
        self(text)
    }
}

/// BPE encodings available through tiktoken.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
pub enum Encoding {
    /// GPT-4 / GPT-3.5 family.
    #[default]
    #[strum(serialize = "cl100k_base")]
    #[serde(rename = "cl100k_base")]
    Cl100kBase,
    /// GPT-4o family.
    #[strum(serialize = "o200k_base")]
    #[serde(rename = "o200k_base")]
    O200kBase,
}

/// `TokenCounter` backed by a tiktoken BPE.
pub struct TiktokenCounter {
    encoding: Encoding,
    bpe: CoreBPE,
}

impl TiktokenCounter {
    /// Load the BPE ranks for the given encoding.
    pub fn new(encoding: Encoding) -> Result<Self, TallyError> {
        let bpe = match encoding {
            Encoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            Encoding::O200kBase => tiktoken_rs::o200k_base(),
        }
        .map_err(|e| TallyError::Internal(format!("failed to load {encoding} encoding: {e}")))?;

        tracing::debug!(%encoding, "tiktoken encoding loaded");
        Ok(Self { encoding, bpe })
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_with_special_tokens(text).len()
    }
}

impl std::fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokenCounter")
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}
