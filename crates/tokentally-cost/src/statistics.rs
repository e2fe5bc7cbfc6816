// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregated usage over a period.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::event::UsageEvent;

/// Snapshot of usage over `[period_start, period_end]`.
///
/// `total_cost` only sums events that carried a cost; unpriced events still
/// count toward requests and tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageStatistics {
    pub request_count: u64,
    /// Requests that carried a cost.
    pub priced_request_count: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cost: Decimal,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    /// Request count per model id. Events without a model are not listed.
    pub by_model: BTreeMap<String, u64>,
}

impl UsageStatistics {
    /// All-zero statistics for the given period.
    pub fn empty(period_start: DateTime<Utc>, period_end: DateTime<Utc>) -> Self {
        Self {
            request_count: 0,
            priced_request_count: 0,
            total_input_tokens: 0,
            total_output_tokens: 0,
            total_cost: Decimal::ZERO,
            period_start,
            period_end,
            by_model: BTreeMap::new(),
        }
    }

    /// Fold `events` into statistics for the given period.
    ///
    /// Events are not filtered here; callers select them.
    pub fn aggregate<'a>(
        events: impl IntoIterator<Item = &'a UsageEvent>,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Self {
        let mut stats = Self::empty(period_start, period_end);
        for event in events {
            stats.add_event(event);
        }
        stats
    }

    pub fn add_event(&mut self, event: &UsageEvent) {
        self.request_count += 1;
        self.total_input_tokens = self.total_input_tokens.saturating_add(event.input_tokens);
        self.total_output_tokens = self.total_output_tokens.saturating_add(event.output_tokens);

        if let Some(cost) = event.cost {
            self.priced_request_count += 1;
            self.total_cost = self.total_cost.saturating_add(cost);
        }
        if let Some(model_id) = &event.model_id {
            *self.by_model.entry(model_id.clone()).or_insert(0) += 1;
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens.saturating_add(self.total_output_tokens)
    }

    pub fn average_input_tokens(&self) -> f64 {
        if self.request_count == 0 {
            return 0.0;
        }
        self.total_input_tokens as f64 / self.request_count as f64
    }

    pub fn average_output_tokens(&self) -> f64 {
        if self.request_count == 0 {
            return 0.0;
        }
        self.total_output_tokens as f64 / self.request_count as f64
    }

    /// Mean cost over all requests, priced or not.
    pub fn average_cost(&self) -> Decimal {
        if self.request_count == 0 {
            return Decimal::ZERO;
        }
        self.total_cost / Decimal::from(self.request_count)
    }
}
