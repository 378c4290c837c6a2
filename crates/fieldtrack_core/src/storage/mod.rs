//! Event store: append-only log of staff events with two amendable follow-up fields.

mod memory;
mod sqlite;

pub use memory::MemoryEventStore;
pub use sqlite::SqliteEventStore;

use chrono::NaiveDate;

use crate::error::{CoreError, StorageError};
use crate::models::{Event, EventId, NewEvent, StaffId};

/// Contract shared by every persistence backend.
///
/// Implementations serialize `append` and `amend_followup` across all staff and
/// never expose a partially written event to readers.
pub trait EventLog: Send + Sync {
    /// Stores the event and returns its stable id.
    fn append(&self, event: NewEvent) -> Result<EventId, StorageError>;

    /// Appends already-recorded events, follow-up fields included, in order.
    /// Either every event is stored or none is.
    fn append_imported(&self, events: Vec<Event>) -> Result<Vec<EventId>, StorageError>;

    /// All events for one staff member, oldest first.
    fn history_for(&self, staff_id: &StaffId) -> Result<Vec<Event>, StorageError>;

    /// Every event in the log, oldest first.
    fn all_events(&self) -> Result<Vec<Event>, StorageError>;

    fn get(&self, id: EventId) -> Result<Option<Event>, StorageError>;

    /// Sets feedback (and optionally the next follow-up date) on a visit record.
    ///
    /// Fails with `NotFound` for unknown ids and `InvalidAction` for non-visit records.
    fn amend_followup(
        &self,
        id: EventId,
        feedback: &str,
        next_followup_date: Option<NaiveDate>,
    ) -> Result<Event, CoreError>;

    /// Most recent event for the staff member that carries coordinates.
    fn last_fix_for(&self, staff_id: &StaffId) -> Result<Option<Event>, StorageError> {
        Ok(self
            .history_for(staff_id)?
            .into_iter()
            .rev()
            .find(|e| e.coordinates.is_some()))
    }
}

/// Shared amend rule: the record must exist and must be a visit.
pub(crate) fn check_amendable(id: EventId, event: Option<&Event>) -> Result<(), CoreError> {
    let event = event.ok_or(CoreError::NotFound(id))?;
    if event.action != crate::models::Action::StartVisit {
        return Err(CoreError::InvalidAction { id, action: event.action });
    }
    Ok(())
}
