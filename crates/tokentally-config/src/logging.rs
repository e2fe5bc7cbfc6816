// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing subscriber setup for host applications.

use tracing_subscriber::EnvFilter;

use crate::model::LoggingConfig;

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(config: &LoggingConfig) -> String {
    format!(
        "tokentally={level},warn",
        level = config.level.trim().to_ascii_lowercase()
    )
}

/// Install a `fmt` subscriber filtered by `RUST_LOG` or the configured level.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init()
        .is_ok()
}
