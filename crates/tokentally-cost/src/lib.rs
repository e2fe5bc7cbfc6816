// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost calculation and usage accounting for tokentally.
//!
//! This crate provides:
//! - **Cost calculators**: catalog-backed and custom-only pricing lookup behind
//!   one [`CostCalculator`] trait, with exact decimal arithmetic
//! - **Usage accountant**: a thread-safe in-memory event log with session,
//!   time-window and per-day statistics

pub mod accountant;
pub mod calculator;
pub mod event;
pub mod statistics;

pub use accountant::UsageAccountant;
pub use calculator::{
    calculator_from_config, cost_for, CatalogCostCalculator, CostCalculator,
    CustomOnlyCostCalculator, PricingOverrides,
};
pub use event::UsageEvent;
pub use statistics::UsageStatistics;
