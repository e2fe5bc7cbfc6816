// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for tokentally.
//!
//! Provides the error type, identifier newtypes, and the token counting
//! seam used throughout the workspace.

pub mod error;
pub mod tokens;
pub mod types;

pub use error::TallyError;
pub use tokens::{Encoding, TiktokenCounter, TokenCounter};
pub use types::{EventId, SessionId};
