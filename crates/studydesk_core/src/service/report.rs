//! Store errors and post-commit effect reports.
//!
//! # Invariants
//! - Only validation failures are returned as `Err`; persistence and reminder
//!   failures are reported inside `MutationReport` and never roll back state.

use crate::model::session::SessionValidationError;
use crate::model::task::TaskValidationError;
use crate::reminder::{ReminderError, ReminderTicket};
use crate::repo::collection::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-level error taxonomy.
#[derive(Debug)]
pub enum StoreError {
    InvalidTask(TaskValidationError),
    InvalidSession(SessionValidationError),
    /// Persisted collection could not be decoded.
    CorruptState { key: &'static str, message: String },
    /// Durable read or write failed.
    Persistence(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTask(err) => write!(f, "{err}"),
            Self::InvalidSession(err) => write!(f, "{err}"),
            Self::CorruptState { key, message } => {
                write!(f, "stored data under `{key}` is corrupt: {message}")
            }
            Self::Persistence(err) => write!(f, "persistence failed: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask(err) => Some(err),
            Self::InvalidSession(err) => Some(err),
            Self::CorruptState { .. } => None,
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

impl From<SessionValidationError> for StoreError {
    fn from(value: SessionValidationError) -> Self {
        Self::InvalidSession(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Corrupt { key, message } => Self::CorruptState { key, message },
            other => Self::Persistence(other),
        }
    }
}

/// Result of reconciling a store with the durable backing on startup.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded { count: usize },
    /// Nothing stored yet; the store starts empty.
    Missing,
    /// Load failed; the store continues with an empty collection.
    Recovered(StoreError),
}

impl LoadOutcome {
    /// Number of records now held in memory.
    pub fn count(&self) -> usize {
        match self {
            Self::Loaded { count } => *count,
            Self::Missing | Self::Recovered(_) => 0,
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered(_))
    }
}

/// Durable write effect of one mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Written,
    /// Nothing changed, so nothing was written.
    Unchanged,
    /// Write failed; in-memory state stands and the store is marked dirty.
    Failed(String),
}

impl PersistOutcome {
    pub fn is_durable(&self) -> bool {
        matches!(self, Self::Written | Self::Unchanged)
    }
}

/// Reminder effect of a task creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderOutcome {
    Scheduled(ReminderTicket),
    Skipped(ReminderError),
}

/// Committed mutation plus the one-shot effects dispatched after commit.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationReport<T> {
    pub value: T,
    pub persist: PersistOutcome,
    /// Set only by operations that dispatch reminders.
    pub reminder: Option<ReminderOutcome>,
}

impl<T> MutationReport<T> {
    pub(crate) fn new(value: T, persist: PersistOutcome) -> Self {
        Self {
            value,
            persist,
            reminder: None,
        }
    }
}
