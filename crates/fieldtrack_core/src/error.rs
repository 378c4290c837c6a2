//! Error taxonomy for the core: invalid input, business veto, missing records, storage.

use thiserror::Error;

use crate::followup::FollowupEntry;
use crate::models::{Action, EventId};

#[derive(Debug, Error)]
pub enum CoreError {
    /// Rejected before any mutation (malformed coordinates, negative amount, unknown action).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// StartVisit vetoed while follow-ups due today have no feedback.
    #[error("start visit blocked: {} follow-up(s) due today without feedback", .0.len())]
    Blocked(Vec<FollowupEntry>),

    #[error("event {0} not found")]
    NotFound(EventId),

    /// Follow-up amendment aimed at a record that is not a visit.
    #[error("event {id} is a {action} record; only visits carry follow-ups")]
    InvalidAction { id: EventId, action: Action },

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl CoreError {
    pub fn is_blocked(&self) -> bool {
        matches!(self, CoreError::Blocked(_))
    }
}

/// Failures of the persistence collaborator. Surfaced unmodified, never retried.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("corrupt record {record}: {reason}")]
    Corrupt { record: String, reason: String },

    #[error("event store lock poisoned")]
    Poisoned,
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
