//! Tabular text format (`staff_locations.csv`): one row per event.
//!
//! Columns missing from older files load as empty values. The legacy `username` column is
//! read as `staff_id`; `role` and any other unknown columns are ignored.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{CoreError, StorageError};
use crate::models::{Action, Coordinates, Event, NewEvent, StaffId, DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::storage::EventLog;

#[derive(Debug, Deserialize, Serialize)]
struct CsvRow {
    #[serde(alias = "username")]
    staff_id: String,
    action: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    timestamp: String,
    #[serde(default)]
    km_travelled: Option<f64>,
    #[serde(default)]
    collection_amount: Option<f64>,
    #[serde(default)]
    pt_date: String,
    #[serde(default)]
    customer_name: String,
    #[serde(default)]
    product: String,
    #[serde(default)]
    ptp_feedback: String,
    #[serde(default)]
    next_pt_date: String,
}

impl CsvRow {
    fn from_event(event: &Event) -> Self {
        Self {
            staff_id: event.staff_id.to_string(),
            action: event.action.as_str().to_string(),
            lat: event.coordinates.map(|c| c.lat()),
            lon: event.coordinates.map(|c| c.lon()),
            timestamp: event.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            km_travelled: Some(event.distance_km),
            collection_amount: Some(event.collection_amount),
            pt_date: format_date(event.followup_due_date),
            customer_name: event.customer_name.clone(),
            product: event.product.clone(),
            ptp_feedback: event.followup_feedback.clone(),
            next_pt_date: format_date(event.next_followup_date),
        }
    }

    fn into_event(self, row: usize) -> Result<Event, StorageError> {
        let corrupt = |reason: String| StorageError::Corrupt { record: format!("csv row {row}"), reason };
        let invalid = |e: CoreError| corrupt(e.to_string());

        let km = self.km_travelled.unwrap_or(0.0);
        let amount = self.collection_amount.unwrap_or(0.0);
        if !km.is_finite() || km < 0.0 {
            return Err(corrupt(format!("km_travelled must be non-negative, got {km}")));
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(corrupt(format!("collection_amount must be non-negative, got {amount}")));
        }

        let new_event = NewEvent {
            staff_id: StaffId::parse(&self.staff_id).map_err(invalid)?,
            action: Action::parse(&self.action).map_err(invalid)?,
            coordinates: Coordinates::from_parts(self.lat, self.lon).map_err(invalid)?,
            timestamp: parse_timestamp(&self.timestamp).map_err(corrupt)?,
            distance_km: km,
            collection_amount: amount,
            customer_name: self.customer_name,
            product: self.product,
            followup_due_date: parse_date(&self.pt_date).map_err(corrupt)?,
        };
        let mut event = new_event.into_event(row as i64);
        event.followup_feedback = self.ptp_feedback;
        event.next_followup_date = parse_date(&self.next_pt_date).map_err(corrupt)?;
        Ok(event)
    }
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| format!("timestamp {raw:?}: {e}"))
}

fn parse_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|e| format!("date {raw:?}: {e}"))
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default()
}

/// Parses every row. Ids are 1-based row positions.
pub fn read_events<R: Read>(reader: R) -> Result<Vec<Event>, StorageError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let mut events = Vec::new();
    for (index, row) in csv_reader.deserialize::<CsvRow>().enumerate() {
        events.push(row?.into_event(index + 1)?);
    }
    Ok(events)
}

pub fn write_events<W: Write>(writer: W, events: &[Event]) -> Result<(), StorageError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for event in events {
        csv_writer.serialize(CsvRow::from_event(event))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<Event>, StorageError> {
    read_events(std::fs::File::open(path)?)
}

pub fn write_file(path: impl AsRef<Path>, events: &[Event]) -> Result<(), StorageError> {
    write_events(std::fs::File::create(path)?, events)
}

/// Appends every row to `store` in file order, keeping recorded distances and feedback.
///
/// The batch is stored as one unit: a failure leaves the store as it was. Rows are
/// always appended, so importing the same file twice stores its events twice.
/// Returns the number of events imported.
pub fn import_into(store: &dyn EventLog, mut events: Vec<Event>) -> Result<usize, StorageError> {
    for event in events.iter_mut().filter(|e| e.action != Action::StartVisit) {
        event.followup_feedback.clear();
        event.next_followup_date = None;
    }
    let count = store.append_imported(events)?.len();
    log::info!("csv import: {count} events appended");
    Ok(count)
}
