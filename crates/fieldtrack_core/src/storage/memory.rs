//! In-memory event store. Same contract as the SQLite store; the log lives for the process.

use chrono::NaiveDate;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{check_amendable, EventLog};
use crate::error::{CoreError, StorageError};
use crate::models::{Event, EventId, NewEvent, StaffId};

#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<Event>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Event>>, StorageError> {
        self.events.read().map_err(|_| StorageError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Event>>, StorageError> {
        self.events.write().map_err(|_| StorageError::Poisoned)
    }
}

fn sorted(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
    events
}

impl EventLog for MemoryEventStore {
    fn append(&self, event: NewEvent) -> Result<EventId, StorageError> {
        let mut events = self.write()?;
        let id = events.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        log::debug!("memory store: appended id={} staff_id={} action={}", id, event.staff_id, event.action);
        events.push(event.into_event(id));
        Ok(id)
    }

    fn append_imported(&self, imported: Vec<Event>) -> Result<Vec<EventId>, StorageError> {
        let mut events = self.write()?;
        let mut next_id = events.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let mut ids = Vec::with_capacity(imported.len());
        for mut event in imported {
            event.id = next_id;
            next_id += 1;
            ids.push(event.id);
            events.push(event);
        }
        Ok(ids)
    }

    fn history_for(&self, staff_id: &StaffId) -> Result<Vec<Event>, StorageError> {
        let events = self.read()?;
        Ok(sorted(events.iter().filter(|e| &e.staff_id == staff_id).cloned().collect()))
    }

    fn all_events(&self) -> Result<Vec<Event>, StorageError> {
        Ok(sorted(self.read()?.clone()))
    }

    fn get(&self, id: EventId) -> Result<Option<Event>, StorageError> {
        Ok(self.read()?.iter().find(|e| e.id == id).cloned())
    }

    fn amend_followup(
        &self,
        id: EventId,
        feedback: &str,
        next_followup_date: Option<NaiveDate>,
    ) -> Result<Event, CoreError> {
        let mut events = self.write()?;
        let target = events.iter_mut().find(|e| e.id == id);
        check_amendable(id, target.as_deref())?;
        let target = target.ok_or(CoreError::NotFound(id))?;
        target.followup_feedback = feedback.to_string();
        target.next_followup_date = next_followup_date;
        Ok(target.clone())
    }
}
