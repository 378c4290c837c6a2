//! SQLite-backed event store.
//! One connection behind a mutex: writes are serialized across all staff, reads see whole rows.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{check_amendable, EventLog};
use crate::error::{CoreError, StorageError};
use crate::models::{
    Action, Coordinates, Event, EventId, NewEvent, StaffId, DATE_FORMAT, TIMESTAMP_FORMAT,
};

const SELECT_COLUMNS: &str = "id, staff_id, action, lat, lon, timestamp, km_travelled, \
     collection_amount, customer_name, product, pt_date, ptp_feedback, next_pt_date";

/// Columns added after the first release. Older databases get them with empty defaults.
const FOLLOWUP_COLUMNS: [&str; 3] = ["pt_date", "ptp_feedback", "next_pt_date"];

#[derive(Clone)]
pub struct SqliteEventStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEventStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        log::info!("event store: opening {}", path.display());
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        create_tables(&conn)?;
        ensure_followup_columns(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    fn query_events<P: rusqlite::Params>(
        conn: &Connection,
        sql: &str,
        params: P,
    ) -> Result<Vec<Event>, StorageError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, RawRow::from_row)?;
        rows.map(|row| row.map_err(StorageError::from).and_then(RawRow::into_event))
            .collect()
    }

    fn get_locked(conn: &Connection, id: EventId) -> Result<Option<Event>, StorageError> {
        let raw = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM staff_events WHERE id = ?1"),
                params![id],
                RawRow::from_row,
            )
            .optional()?;
        raw.map(RawRow::into_event).transpose()
    }
}

fn create_tables(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS staff_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            staff_id TEXT NOT NULL,
            action TEXT NOT NULL,
            lat REAL,
            lon REAL,
            timestamp TEXT NOT NULL,
            km_travelled REAL NOT NULL DEFAULT 0,
            collection_amount REAL NOT NULL DEFAULT 0,
            customer_name TEXT NOT NULL DEFAULT '',
            product TEXT NOT NULL DEFAULT ''
        );
        CREATE INDEX IF NOT EXISTS idx_staff_events_staff ON staff_events(staff_id, timestamp);
        "#,
    )?;
    Ok(())
}

fn ensure_followup_columns(conn: &Connection) -> Result<(), StorageError> {
    let mut existing = Vec::new();
    {
        let mut stmt = conn.prepare("PRAGMA table_info('staff_events')")?;
        let columns = stmt.query_map([], |row| row.get::<_, String>(1))?;
        for column in columns {
            existing.push(column?);
        }
    }
    for column in FOLLOWUP_COLUMNS {
        if !existing.iter().any(|c| c == column) {
            log::info!("event store: adding column {column} to staff_events");
            conn.execute(
                &format!("ALTER TABLE staff_events ADD COLUMN {column} TEXT NOT NULL DEFAULT ''"),
                [],
            )?;
        }
    }
    Ok(())
}

/// Row as stored: strings and optional reals, validated on the way out.
struct RawRow {
    id: EventId,
    staff_id: String,
    action: String,
    lat: Option<f64>,
    lon: Option<f64>,
    timestamp: String,
    km_travelled: f64,
    collection_amount: f64,
    customer_name: String,
    product: String,
    pt_date: String,
    ptp_feedback: String,
    next_pt_date: String,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            staff_id: row.get(1)?,
            action: row.get(2)?,
            lat: row.get(3)?,
            lon: row.get(4)?,
            timestamp: row.get(5)?,
            km_travelled: row.get(6)?,
            collection_amount: row.get(7)?,
            customer_name: row.get(8)?,
            product: row.get(9)?,
            pt_date: row.get(10)?,
            ptp_feedback: row.get(11)?,
            next_pt_date: row.get(12)?,
        })
    }

    fn into_event(self) -> Result<Event, StorageError> {
        let id = self.id;
        let corrupt = |reason: String| StorageError::Corrupt { record: format!("staff_events#{id}"), reason };
        Ok(Event {
            id,
            staff_id: StaffId::parse(&self.staff_id).map_err(|e| corrupt(e.to_string()))?,
            action: Action::parse(&self.action).map_err(|e| corrupt(e.to_string()))?,
            coordinates: Coordinates::from_parts(self.lat, self.lon).map_err(|e| corrupt(e.to_string()))?,
            timestamp: NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT)
                .map_err(|e| corrupt(format!("timestamp {:?}: {e}", self.timestamp)))?,
            distance_km: self.km_travelled,
            collection_amount: self.collection_amount,
            customer_name: self.customer_name,
            product: self.product,
            followup_due_date: parse_optional_date(&self.pt_date).map_err(corrupt)?,
            followup_feedback: self.ptp_feedback,
            next_followup_date: parse_optional_date(&self.next_pt_date).map_err(corrupt)?,
        })
    }
}

fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|e| format!("date {raw:?}: {e}"))
}

fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default()
}

fn insert_event(
    conn: &Connection,
    event: &NewEvent,
    feedback: &str,
    next_followup_date: Option<NaiveDate>,
) -> Result<EventId, StorageError> {
    conn.execute(
        r#"
        INSERT INTO staff_events
            (staff_id, action, lat, lon, timestamp, km_travelled, collection_amount,
             customer_name, product, pt_date, ptp_feedback, next_pt_date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
        params![
            event.staff_id.as_str(),
            event.action.as_str(),
            event.coordinates.map(|c| c.lat()),
            event.coordinates.map(|c| c.lon()),
            event.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            event.distance_km,
            event.collection_amount,
            event.customer_name,
            event.product,
            format_optional_date(event.followup_due_date),
            feedback,
            format_optional_date(next_followup_date),
        ],
    )?;
    let id = conn.last_insert_rowid();
    log::debug!(
        "event store: appended id={} staff_id={} action={} km={:.3}",
        id,
        event.staff_id,
        event.action,
        event.distance_km
    );
    Ok(id)
}

impl EventLog for SqliteEventStore {
    fn append(&self, event: NewEvent) -> Result<EventId, StorageError> {
        let conn = self.lock()?;
        insert_event(&conn, &event, "", None)
    }

    fn append_imported(&self, events: Vec<Event>) -> Result<Vec<EventId>, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(events.len());
        for event in events {
            let feedback = event.followup_feedback.clone();
            let next_followup_date = event.next_followup_date;
            ids.push(insert_event(&tx, &NewEvent::from(event), &feedback, next_followup_date)?);
        }
        tx.commit()?;
        Ok(ids)
    }

    fn history_for(&self, staff_id: &StaffId) -> Result<Vec<Event>, StorageError> {
        let conn = self.lock()?;
        Self::query_events(
            &conn,
            &format!(
                "SELECT {SELECT_COLUMNS} FROM staff_events WHERE staff_id = ?1 ORDER BY timestamp ASC, id ASC"
            ),
            params![staff_id.as_str()],
        )
    }

    fn all_events(&self) -> Result<Vec<Event>, StorageError> {
        let conn = self.lock()?;
        Self::query_events(
            &conn,
            &format!("SELECT {SELECT_COLUMNS} FROM staff_events ORDER BY timestamp ASC, id ASC"),
            [],
        )
    }

    fn get(&self, id: EventId) -> Result<Option<Event>, StorageError> {
        let conn = self.lock()?;
        Self::get_locked(&conn, id)
    }

    fn amend_followup(
        &self,
        id: EventId,
        feedback: &str,
        next_followup_date: Option<NaiveDate>,
    ) -> Result<Event, CoreError> {
        let conn = self.lock()?;
        let current = Self::get_locked(&conn, id)?;
        check_amendable(id, current.as_ref())?;
        conn.execute(
            "UPDATE staff_events SET ptp_feedback = ?1, next_pt_date = ?2 WHERE id = ?3",
            params![feedback, format_optional_date(next_followup_date), id],
        )
        .map_err(StorageError::from)?;
        log::debug!("event store: amended follow-up on id={id}");
        Self::get_locked(&conn, id)?.ok_or(CoreError::NotFound(id))
    }

    fn last_fix_for(&self, staff_id: &StaffId) -> Result<Option<Event>, StorageError> {
        let conn = self.lock()?;
        let mut events = Self::query_events(
            &conn,
            &format!(
                "SELECT {SELECT_COLUMNS} FROM staff_events \
                 WHERE staff_id = ?1 AND lat IS NOT NULL AND lon IS NOT NULL \
                 ORDER BY timestamp DESC, id DESC LIMIT 1"
            ),
            params![staff_id.as_str()],
        )?;
        Ok(events.pop())
    }
}
