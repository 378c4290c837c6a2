//! Per-staff and fleet-wide rollups. Pure reads over the event log.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::StorageError;
use crate::followup;
use crate::models::{Action, Event, StaffId};
use crate::storage::EventLog;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StaffSummary {
    pub total_km: f64,
    pub total_amount: f64,
    /// Number of recorded events of any action.
    pub visit_count: usize,
    /// Number of StartVisit events only.
    pub customer_visits: usize,
}

impl StaffSummary {
    fn add(&mut self, event: &Event) {
        self.total_km += event.distance_km;
        self.total_amount += event.collection_amount;
        self.visit_count += 1;
        if event.action == Action::StartVisit {
            self.customer_visits += 1;
        }
    }

    fn merge(&mut self, other: &StaffSummary) {
        self.total_km += other.total_km;
        self.total_amount += other.total_amount;
        self.visit_count += other.visit_count;
        self.customer_visits += other.customer_visits;
    }
}

/// Inclusive calendar-date window. Both ends open means the full history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateWindow {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        let date = ts.date();
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

pub fn summarize<'a>(events: impl IntoIterator<Item = &'a Event>, window: DateWindow) -> StaffSummary {
    let mut summary = StaffSummary::default();
    for event in events.into_iter().filter(|e| window.contains(e.timestamp)) {
        summary.add(event);
    }
    summary
}

pub fn group_by_staff(events: Vec<Event>) -> BTreeMap<StaffId, Vec<Event>> {
    let mut grouped: BTreeMap<StaffId, Vec<Event>> = BTreeMap::new();
    for event in events {
        grouped.entry(event.staff_id.clone()).or_default().push(event);
    }
    grouped
}

pub fn summary_for(
    store: &dyn EventLog,
    staff_id: &StaffId,
    window: DateWindow,
) -> Result<StaffSummary, StorageError> {
    Ok(summarize(&store.history_for(staff_id)?, window))
}

/// One summary per distinct staff id in the store.
pub fn fleet_summary(
    store: &dyn EventLog,
    window: DateWindow,
) -> Result<BTreeMap<StaffId, StaffSummary>, StorageError> {
    Ok(group_by_staff(store.all_events()?)
        .into_iter()
        .map(|(staff_id, events)| (staff_id, summarize(&events, window)))
        .collect())
}

/// Sum of a fleet summary across all staff.
pub fn fleet_totals(fleet: &BTreeMap<StaffId, StaffSummary>) -> StaffSummary {
    let mut totals = StaffSummary::default();
    for summary in fleet.values() {
        totals.merge(summary);
    }
    totals
}

/// Staff with at least one follow-up due `today` and no feedback.
pub fn pending_staff_today(store: &dyn EventLog, today: NaiveDate) -> Result<BTreeSet<StaffId>, StorageError> {
    Ok(group_by_staff(store.all_events()?)
        .into_iter()
        .filter(|(_, events)| followup::evaluate(events, today).is_pending())
        .map(|(staff_id, _)| staff_id)
        .collect())
}
