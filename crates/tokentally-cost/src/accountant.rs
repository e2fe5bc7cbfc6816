// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory usage accountant.
//!
//! The accountant keeps an append-only event log and the current session id
//! behind one mutex. Every append and every traversal of the log holds that
//! lock, so a reader never sees half an append. History is not persisted.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use tokentally_core::{SessionId, TallyError, TokenCounter};
use tracing::{debug, info};

use crate::calculator::CostCalculator;
use crate::event::UsageEvent;
use crate::statistics::UsageStatistics;

struct AccountantState {
    events: Vec<UsageEvent>,
    session_id: SessionId,
    session_start: DateTime<Utc>,
}

impl AccountantState {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            session_id: SessionId::generate(),
            session_start: Utc::now(),
        }
    }
}

/// Thread-safe usage log with session and time-window statistics.
pub struct UsageAccountant {
    state: Mutex<AccountantState>,
    calculator: Option<Arc<dyn CostCalculator>>,
}

impl UsageAccountant {
    /// Accountant without pricing. Recorded events carry no cost.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AccountantState::new()),
            calculator: None,
        }
    }

    /// Accountant that prices events through `calculator`.
    pub fn with_calculator(calculator: Arc<dyn CostCalculator>) -> Self {
        Self {
            state: Mutex::new(AccountantState::new()),
            calculator: Some(calculator),
        }
    }

    pub fn calculator(&self) -> Option<&Arc<dyn CostCalculator>> {
        self.calculator.as_ref()
    }

    fn lock(&self) -> MutexGuard<'_, AccountantState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a fully formed event as-is.
    ///
    /// Rejects an event with an empty session id or a negative cost.
    pub fn record_event(&self, event: UsageEvent) -> Result<(), TallyError> {
        if event.session_id.as_str().trim().is_empty() {
            return Err(TallyError::InvalidInput(format!(
                "usage event {} has an empty session id",
                event.id
            )));
        }
        if let Some(cost) = event.cost.filter(|c| c.is_sign_negative() && !c.is_zero()) {
            return Err(TallyError::InvalidInput(format!(
                "usage event {} has negative cost {cost}",
                event.id
            )));
        }

        debug!(event_id = %event.id, session_id = %event.session_id, "usage event recorded");
        self.lock().events.push(event);
        Ok(())
    }

    /// Record a request and return the stored event.
    ///
    /// Cost is computed when both a calculator and a model id are present and
    /// the model has pricing. `session` defaults to the current session, as
    /// does a blank session id.
    pub fn record(
        &self,
        model_id: Option<&str>,
        input_tokens: u64,
        output_tokens: u64,
        session: Option<SessionId>,
    ) -> UsageEvent {
        let cost = match (&self.calculator, model_id) {
            (Some(calculator), Some(model_id)) => {
                calculator.calculate_cost(model_id, input_tokens, output_tokens)
            }
            _ => None,
        };

        let mut state = self.lock();
        let session_id = session
            .filter(|id| !id.as_str().trim().is_empty())
            .unwrap_or_else(|| state.session_id.clone());
        let mut event = UsageEvent::new(session_id, input_tokens, output_tokens);
        event.model_id = model_id.map(str::to_string);
        event.cost = cost;
        state.events.push(event.clone());
        drop(state);

        debug!(
            event_id = %event.id,
            model_id = event.model_id.as_deref().unwrap_or_default(),
            input_tokens,
            output_tokens,
            priced = event.cost.is_some(),
            "usage recorded"
        );
        event
    }

    /// Count tokens in the prompt and completion with `counter`, then record.
    pub fn record_text(
        &self,
        counter: &dyn TokenCounter,
        model_id: Option<&str>,
        input_text: &str,
        output_text: &str,
        session: Option<SessionId>,
    ) -> UsageEvent {
        let input_tokens = counter.count_tokens(input_text) as u64;
        let output_tokens = counter.count_tokens(output_text) as u64;
        self.record(model_id, input_tokens, output_tokens, session)
    }

    /// Statistics for events of the current session, over
    /// `[session_start, now)`.
    pub fn session_statistics(&self) -> UsageStatistics {
        let state = self.lock();
        let events = state
            .events
            .iter()
            .filter(|event| event.session_id == state.session_id);
        UsageStatistics::aggregate(events, state.session_start, Utc::now())
    }

    /// Statistics for events with `start <= timestamp <= end`.
    pub fn statistics(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> UsageStatistics {
        let state = self.lock();
        let events = state
            .events
            .iter()
            .filter(|event| event.timestamp >= start && event.timestamp <= end);
        UsageStatistics::aggregate(events, start, end)
    }

    /// Statistics for the current UTC calendar day.
    pub fn today_statistics(&self) -> UsageStatistics {
        let start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        let end = start + TimeDelta::days(1) - TimeDelta::nanoseconds(1);
        self.statistics(start, end)
    }

    /// Snapshot of every event, in record order.
    pub fn records(&self) -> Vec<UsageEvent> {
        self.lock().events.clone()
    }

    /// Snapshot of the events belonging to `session_id`.
    pub fn records_for_session(&self, session_id: &SessionId) -> Vec<UsageEvent> {
        self.lock()
            .events
            .iter()
            .filter(|event| &event.session_id == session_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every event. The current session is kept.
    pub fn clear(&self) {
        let mut state = self.lock();
        let dropped = state.events.len();
        state.events.clear();
        info!(dropped, session_id = %state.session_id, "usage log cleared");
    }

    /// Start a new session and return its id.
    ///
    /// Later `record` calls default to the new session. Existing events keep
    /// the session they were recorded under.
    pub fn start_new_session(&self) -> SessionId {
        let mut state = self.lock();
        let previous = std::mem::replace(&mut state.session_id, SessionId::generate());
        state.session_start = Utc::now();
        info!(session_id = %state.session_id, previous = %previous, "usage session started");
        state.session_id.clone()
    }

    pub fn current_session(&self) -> SessionId {
        self.lock().session_id.clone()
    }
}

impl Default for UsageAccountant {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UsageAccountant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("UsageAccountant")
            .field("events", &state.events.len())
            .field("session_id", &state.session_id)
            .field("session_start", &state.session_start)
            .field("priced", &self.calculator.is_some())
            .finish()
    }
}
