//! Field staff activity core: event log, travel accounting, follow-up gating and rollups.
//!
//! A staff action flows through [`FieldService`]: read history, check the same-day follow-up
//! gate, derive travel distance from the last fix, append. Reports are pure projections
//! over the same log.

pub mod clock;
pub mod csv_io;
pub mod error;
pub mod followup;
pub mod geo;
pub mod models;
pub mod service;
pub mod storage;
pub mod summary;
pub mod travel;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, StorageError};
pub use followup::{DayStatus, FollowupEntry};
pub use models::{Action, Coordinates, Event, EventId, NewEvent, StaffId, VisitDetails};
pub use service::FieldService;
pub use storage::{EventLog, MemoryEventStore, SqliteEventStore};
pub use summary::{DateWindow, StaffSummary};
pub use travel::TrackPoint;
