//! Same-day follow-up (promise-to-pay) gate.
//!
//! The day status is recomputed from the log on every call; nothing here is cached or stored.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{CoreError, StorageError};
use crate::models::{timestamp_format, Action, Event, EventId, StaffId};
use crate::storage::EventLog;

/// A visit whose follow-up falls due on the evaluated day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FollowupEntry {
    pub event_id: EventId,
    pub customer_name: String,
    pub product: String,
    pub collection_amount: f64,
    pub due_date: NaiveDate,
    #[serde(with = "timestamp_format")]
    pub visited_at: NaiveDateTime,
    pub feedback: String,
    pub feedback_recorded: bool,
    pub next_followup_date: Option<NaiveDate>,
}

impl FollowupEntry {
    fn from_event(event: &Event, due_date: NaiveDate) -> Self {
        Self {
            event_id: event.id,
            customer_name: event.customer_name.clone(),
            product: event.product.clone(),
            collection_amount: event.collection_amount,
            due_date,
            visited_at: event.timestamp,
            feedback: event.followup_feedback.clone(),
            feedback_recorded: event.has_feedback(),
            next_followup_date: event.next_followup_date,
        }
    }
}

/// Classification of one staff member's day.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DayStatus {
    /// No visit has a follow-up due on the day.
    NoObligation,
    /// At least one due follow-up has no feedback. Blocks new visits.
    Pending { due_today: Vec<FollowupEntry> },
    /// Follow-ups were due and all have feedback.
    Cleared { due_today: Vec<FollowupEntry> },
}

impl DayStatus {
    pub fn due_today(&self) -> &[FollowupEntry] {
        match self {
            DayStatus::NoObligation => &[],
            DayStatus::Pending { due_today } | DayStatus::Cleared { due_today } => due_today,
        }
    }

    pub fn pending(&self) -> Vec<FollowupEntry> {
        self.due_today().iter().filter(|e| !e.feedback_recorded).cloned().collect()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, DayStatus::Pending { .. })
    }

    /// Only a new visit is gated; shift start and end always go through.
    pub fn permits(&self, action: Action) -> bool {
        action != Action::StartVisit || !self.is_pending()
    }
}

/// Classifies `today` from one staff member's history.
pub fn evaluate(history: &[Event], today: NaiveDate) -> DayStatus {
    let due_today: Vec<FollowupEntry> = history
        .iter()
        .filter(|e| e.action == Action::StartVisit && e.followup_due_date == Some(today))
        .map(|e| FollowupEntry::from_event(e, today))
        .collect();

    if due_today.is_empty() {
        DayStatus::NoObligation
    } else if due_today.iter().any(|e| !e.feedback_recorded) {
        DayStatus::Pending { due_today }
    } else {
        DayStatus::Cleared { due_today }
    }
}

pub fn evaluate_for(
    store: &dyn EventLog,
    staff_id: &StaffId,
    today: NaiveDate,
) -> Result<DayStatus, StorageError> {
    Ok(evaluate(&store.history_for(staff_id)?, today))
}

/// Vetoes `action` when the day status does not permit it.
pub fn check(action: Action, status: &DayStatus) -> Result<(), CoreError> {
    if status.permits(action) {
        return Ok(());
    }
    Err(CoreError::Blocked(status.pending()))
}
