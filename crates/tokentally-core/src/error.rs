// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the tokentally workspace.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for catalog loading, pricing, and usage accounting.
///
/// Unknown models are not errors: lookups return `Option` instead.
#[derive(Debug, Error)]
pub enum TallyError {
    /// Configuration errors detected outside figment extraction.
    #[error("configuration error: {0}")]
    Config(String),

    /// A provider catalog source is malformed. Fatal for the catalog being built.
    #[error("catalog error in {origin}: {message}")]
    Catalog { origin: String, message: String },

    /// A precondition on caller-supplied input was violated.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Reading a catalog file from disk failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TallyError {
    /// Build a catalog error for the named source.
    pub fn catalog(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Catalog {
            origin: origin.into(),
            message: message.into(),
        }
    }
}
