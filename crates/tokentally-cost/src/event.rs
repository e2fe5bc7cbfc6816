// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A single metered request.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokentally_core::{EventId, SessionId};

/// One request's token usage and cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    /// Unique event identifier (UUID v4).
    pub id: EventId,
    /// Model the request was sent to, if known.
    pub model_id: Option<String>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Cost at record time. `None` when the model had no pricing.
    pub cost: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
    pub session_id: SessionId,
    /// Free-form labels, in insertion order.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl UsageEvent {
    /// New event with a fresh id, stamped now, with no model and no cost.
    pub fn new(session_id: SessionId, input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            id: EventId::generate(),
            model_id: None,
            input_tokens,
            output_tokens,
            cost: None,
            timestamp: Utc::now(),
            session_id,
            tags: Vec::new(),
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn builder_sets_fields() {
        let at = DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let event = UsageEvent::new(SessionId::from("s1"), 100, 50)
            .with_model("gpt-4o")
            .with_cost(dec!(0.00075))
            .with_timestamp(at)
            .with_tag("chat")
            .with_tag("batch");

        assert_eq!(event.model_id.as_deref(), Some("gpt-4o"));
        assert_eq!(event.cost, Some(dec!(0.00075)));
        assert_eq!(event.timestamp, at);
        assert_eq!(event.session_id.as_str(), "s1");
        assert_eq!(event.tags, ["chat", "batch"]);
        assert_eq!(event.total_tokens(), 150);
    }

    #[test]
    fn events_get_distinct_ids() {
        let a = UsageEvent::new(SessionId::from("s"), 0, 0);
        let b = UsageEvent::new(SessionId::from("s"), 0, 0);
        assert_ne!(a.id, b.id);
        assert!(a.model_id.is_none());
        assert!(a.cost.is_none());
    }

    #[test]
    fn serializes_to_json() {
        let event = UsageEvent::new(SessionId::from("s1"), 10, 5).with_model("gpt-4o");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["model_id"], "gpt-4o");
        assert_eq!(json["input_tokens"], 10);
        assert!(json["cost"].is_null());
        let back: UsageEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
