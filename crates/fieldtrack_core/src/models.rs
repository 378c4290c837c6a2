//! Data models for staff events, fixes and visit details.
//! Storage and wire formats use the legacy action names (`punch_in`, `clock_in`, `clock_out`).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Stable identifier assigned by the event store on append (log position).
pub type EventId = i64;

/// Verified staff identifier. Never empty.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StaffId(String);

impl StaffId {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidInput("staff id must not be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StaffId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StaffId> for String {
    fn from(id: StaffId) -> Self {
        id.0
    }
}

impl std::fmt::Display for StaffId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a staff member recorded. Closed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "punch_in")]
    StartShift,
    #[serde(rename = "clock_in")]
    StartVisit,
    #[serde(rename = "clock_out")]
    EndShift,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::StartShift => "punch_in",
            Action::StartVisit => "clock_in",
            Action::EndShift => "clock_out",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_lowercase().as_str() {
            "punch_in" | "start_shift" => Ok(Action::StartShift),
            "clock_in" | "start_visit" => Ok(Action::StartVisit),
            "clock_out" | "end_shift" => Ok(Action::EndShift),
            other => Err(CoreError::InvalidInput(format!("unknown action: {other:?}"))),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated (latitude, longitude) pair in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = CoreError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lon)
    }
}

impl Coordinates {
    /// Rejects NaN and values outside [-90, 90] / [-180, 180].
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoreError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoreError::InvalidInput(format!("latitude out of range: {lat}")));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(CoreError::InvalidInput(format!("longitude out of range: {lon}")));
        }
        Ok(Self { lat, lon })
    }

    /// Both halves present, or neither. A lone latitude or longitude is malformed.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Result<Option<Self>, CoreError> {
        match (lat, lon) {
            (Some(lat), Some(lon)) => Self::new(lat, lon).map(Some),
            (None, None) => Ok(None),
            _ => Err(CoreError::InvalidInput(
                "latitude and longitude must be supplied together".to_string(),
            )),
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

/// One recorded staff event.
///
/// `followup_feedback` and `next_followup_date` are the only fields that change
/// after append, and only on `StartVisit` records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub staff_id: StaffId,
    pub action: Action,
    pub coordinates: Option<Coordinates>,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub distance_km: f64,
    pub collection_amount: f64,
    pub customer_name: String,
    pub product: String,
    pub followup_due_date: Option<NaiveDate>,
    pub followup_feedback: String,
    pub next_followup_date: Option<NaiveDate>,
}

impl Event {
    pub fn has_feedback(&self) -> bool {
        !self.followup_feedback.trim().is_empty()
    }
}

/// An event ready to be appended; the store assigns the id.
#[derive(Clone, Debug, PartialEq)]
pub struct NewEvent {
    pub staff_id: StaffId,
    pub action: Action,
    pub coordinates: Option<Coordinates>,
    pub timestamp: NaiveDateTime,
    pub distance_km: f64,
    pub collection_amount: f64,
    pub customer_name: String,
    pub product: String,
    pub followup_due_date: Option<NaiveDate>,
}

impl NewEvent {
    pub fn into_event(self, id: EventId) -> Event {
        Event {
            id,
            staff_id: self.staff_id,
            action: self.action,
            coordinates: self.coordinates,
            timestamp: self.timestamp,
            distance_km: self.distance_km,
            collection_amount: self.collection_amount,
            customer_name: self.customer_name,
            product: self.product,
            followup_due_date: self.followup_due_date,
            followup_feedback: String::new(),
            next_followup_date: None,
        }
    }
}

impl From<Event> for NewEvent {
    fn from(event: Event) -> Self {
        Self {
            staff_id: event.staff_id,
            action: event.action,
            coordinates: event.coordinates,
            timestamp: event.timestamp,
            distance_km: event.distance_km,
            collection_amount: event.collection_amount,
            customer_name: event.customer_name,
            product: event.product,
            followup_due_date: event.followup_due_date,
        }
    }
}

/// Customer details captured when a visit starts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VisitDetails {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub collection_amount: f64,
    #[serde(default)]
    pub followup_due_date: Option<NaiveDate>,
}

impl VisitDetails {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.collection_amount.is_finite() || self.collection_amount < 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "collection amount must be a non-negative number, got {}",
                self.collection_amount
            )));
        }
        Ok(())
    }
}

/// Serde helpers for second-precision timestamps ("YYYY-MM-DD HH:MM:SS").
pub mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
