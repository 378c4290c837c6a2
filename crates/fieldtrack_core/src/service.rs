//! Staff action workflow: history → follow-up gate → travel distance → append.
//!
//! Stateless between calls apart from the store; wrap it per request or per connection.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::followup::{self, DayStatus};
use crate::models::{Action, Coordinates, Event, EventId, NewEvent, StaffId, VisitDetails};
use crate::storage::EventLog;
use crate::summary::{self, DateWindow, StaffSummary};
use crate::travel::{self, TrackPoint};

#[derive(Clone)]
pub struct FieldService {
    store: Arc<dyn EventLog>,
    clock: Arc<dyn Clock>,
}

impl FieldService {
    pub fn new(store: Arc<dyn EventLog>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &dyn EventLog {
        self.store.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn start_shift(&self, staff_id: &StaffId, fix: Option<Coordinates>) -> Result<Event> {
        self.record(staff_id, Action::StartShift, fix, VisitDetails::default())
    }

    /// Fails with `Blocked` while any follow-up due today has no feedback.
    pub fn start_visit(&self, staff_id: &StaffId, fix: Option<Coordinates>, details: VisitDetails) -> Result<Event> {
        self.record(staff_id, Action::StartVisit, fix, details)
    }

    pub fn end_shift(&self, staff_id: &StaffId, fix: Option<Coordinates>) -> Result<Event> {
        self.record(staff_id, Action::EndShift, fix, VisitDetails::default())
    }

    /// Records `action`; the generic entry point behind the three actions above.
    /// Visit details are validated before anything is read or written.
    pub fn record(
        &self,
        staff_id: &StaffId,
        action: Action,
        fix: Option<Coordinates>,
        details: VisitDetails,
    ) -> Result<Event> {
        if action == Action::StartVisit {
            details.validate()?;
        }
        let history = self.store.history_for(staff_id)?;
        let today = self.clock.today();

        let status = followup::evaluate(&history, today);
        if let Err(err) = followup::check(action, &status) {
            log::info!(
                "start visit blocked for staff_id={}: {} follow-up(s) pending",
                staff_id,
                status.pending().len()
            );
            return Err(err);
        }

        let distance_km = travel::distance_from_last_fix(self.store(), staff_id, fix)?;

        // Appends happen in real time; a clock that stepped back must not reorder history.
        let mut timestamp = self.clock.now();
        if let Some(last) = history.last() {
            if last.timestamp > timestamp {
                log::warn!(
                    "clock behind last event for staff_id={} ({} < {}); reusing last timestamp",
                    staff_id,
                    timestamp,
                    last.timestamp
                );
                timestamp = last.timestamp;
            }
        }

        let is_visit = action == Action::StartVisit;
        let new_event = NewEvent {
            staff_id: staff_id.clone(),
            action,
            coordinates: fix,
            timestamp,
            distance_km,
            collection_amount: if is_visit { details.collection_amount } else { 0.0 },
            customer_name: if is_visit { details.customer_name } else { String::new() },
            product: if is_visit { details.product } else { String::new() },
            followup_due_date: if is_visit { details.followup_due_date } else { None },
        };
        let id = self.store.append(new_event.clone())?;
        log::info!("recorded {} for staff_id={} id={} km={:.2}", action, staff_id, id, distance_km);
        Ok(new_event.into_event(id))
    }

    /// Records follow-up feedback on one of the caller's own visits.
    ///
    /// `next_followup_date` is kept in its own field; the visit's `followup_due_date` is
    /// never moved. The gate only looks at `followup_due_date`, so on the next date the day
    /// reads `NoObligation` rather than `Cleared`. Schedule a fresh visit to gate on it.
    pub fn amend_followup(
        &self,
        staff_id: &StaffId,
        id: EventId,
        feedback: &str,
        next_followup_date: Option<NaiveDate>,
    ) -> Result<Event> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(CoreError::InvalidInput("follow-up feedback must not be empty".to_string()));
        }
        // Records owned by someone else are reported as missing.
        match self.store.get(id)? {
            Some(event) if &event.staff_id == staff_id => {}
            _ => return Err(CoreError::NotFound(id)),
        }
        let amended = self.store.amend_followup(id, feedback, next_followup_date)?;
        log::info!("follow-up feedback recorded for staff_id={} id={}", staff_id, id);
        Ok(amended)
    }

    pub fn history(&self, staff_id: &StaffId) -> Result<Vec<Event>> {
        Ok(self.store.history_for(staff_id)?)
    }

    pub fn all_events(&self, staff_filter: Option<&StaffId>) -> Result<Vec<Event>> {
        match staff_filter {
            Some(staff_id) => self.history(staff_id),
            None => Ok(self.store.all_events()?),
        }
    }

    pub fn followup_status(&self, staff_id: &StaffId) -> Result<DayStatus> {
        Ok(followup::evaluate_for(self.store(), staff_id, self.clock.today())?)
    }

    pub fn track_for(&self, staff_id: &StaffId) -> Result<Vec<TrackPoint>> {
        Ok(travel::track(&self.store.history_for(staff_id)?))
    }

    pub fn summary_for(&self, staff_id: &StaffId, window: DateWindow) -> Result<StaffSummary> {
        Ok(summary::summary_for(self.store(), staff_id, window)?)
    }

    pub fn fleet_summary(&self, window: DateWindow) -> Result<BTreeMap<StaffId, StaffSummary>> {
        Ok(summary::fleet_summary(self.store(), window)?)
    }

    pub fn pending_staff_today(&self) -> Result<BTreeSet<StaffId>> {
        Ok(summary::pending_staff_today(self.store(), self.clock.today())?)
    }
}
