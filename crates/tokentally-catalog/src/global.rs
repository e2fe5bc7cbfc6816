// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide catalog, built once and read-only afterwards.
//!
//! Call [`init`] during startup with the configured sources. [`global`]
//! falls back to the built-in catalog if nothing was initialised.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tokentally_config::CatalogConfig;
use tokentally_core::TallyError;

use crate::catalog::Catalog;

static CATALOG: OnceLock<Arc<Catalog>> = OnceLock::new();
static INIT: Mutex<()> = Mutex::new(());

/// Build the process-wide catalog from `config` unless it already exists.
///
/// Only the first successful call builds anything; later calls return the
/// existing catalog and ignore `config`. A failed build leaves the catalog
/// uninitialised so a corrected configuration can be retried.
pub fn init(config: &CatalogConfig) -> Result<Arc<Catalog>, TallyError> {
    if let Some(catalog) = CATALOG.get() {
        return Ok(Arc::clone(catalog));
    }

    let _guard = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(catalog) = CATALOG.get() {
        tracing::debug!("pricing catalog already initialised");
        return Ok(Arc::clone(catalog));
    }

    let catalog = Arc::new(Catalog::load(config)?);
    Ok(Arc::clone(CATALOG.get_or_init(|| catalog)))
}

/// The process-wide catalog, initialised from built-in data on first use.
pub fn global() -> Result<Arc<Catalog>, TallyError> {
    init(&CatalogConfig::default())
}

/// The process-wide catalog if [`init`] or [`global`] has already run.
pub fn try_global() -> Option<Arc<Catalog>> {
    CATALOG.get().cloned()
}
