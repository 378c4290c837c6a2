//! Travel distance attributed to a new event.
//!
//! Measured from the staff member's most recent fix, whatever action produced it, so the
//! cumulative path runs across shift starts, visits and shift ends alike.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::StorageError;
use crate::geo;
use crate::models::{timestamp_format, Action, Coordinates, Event, EventId, StaffId};
use crate::storage::EventLog;

/// Kilometers between the last recorded fix and `new_fix`; zero when either is missing.
pub fn distance_from_last_fix(
    store: &dyn EventLog,
    staff_id: &StaffId,
    new_fix: Option<Coordinates>,
) -> Result<f64, StorageError> {
    let Some(new_fix) = new_fix else {
        return Ok(0.0);
    };
    let last = store.last_fix_for(staff_id)?;
    Ok(leg_distance(last.as_ref(), new_fix))
}

/// Same rule applied to an event that is already loaded.
pub fn leg_distance(last_fix: Option<&Event>, new_fix: Coordinates) -> f64 {
    match last_fix.and_then(|e| e.coordinates) {
        Some(previous) => geo::distance(previous, new_fix),
        None => 0.0,
    }
}

/// A point on a staff member's travel track.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrackPoint {
    pub event_id: EventId,
    pub action: Action,
    pub coordinates: Coordinates,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub distance_km: f64,
    pub customer_name: String,
    pub collection_amount: f64,
}

/// Fixes in temporal order, skipping events recorded without a location.
pub fn track(history: &[Event]) -> Vec<TrackPoint> {
    history
        .iter()
        .filter_map(|e| {
            e.coordinates.map(|coordinates| TrackPoint {
                event_id: e.id,
                action: e.action,
                coordinates,
                timestamp: e.timestamp,
                distance_km: e.distance_km,
                customer_name: e.customer_name.clone(),
                collection_amount: e.collection_amount,
            })
        })
        .collect()
}
