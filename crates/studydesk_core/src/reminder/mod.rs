//! Deadline reminder dispatch boundary.
//!
//! # Responsibility
//! - Build the one-shot reminder request for a newly created task.
//! - Define the dispatcher contract implemented by the native shell.
//!
//! # Invariants
//! - Dispatch failures never fail task creation.
//! - Stores never call `cancel`: deleting or completing a task leaves its
//!   reminder scheduled.

use crate::model::task::{Task, TaskId};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod queue;

pub use queue::{NoopReminderDispatcher, QueuedReminderDispatcher};

/// Notification title shared by all deadline reminders.
pub const REMINDER_TITLE: &str = "Task Deadline Reminder";
/// Local hour of day at which reminders fire on the deadline date.
pub const REMINDER_HOUR: u32 = 9;

/// Reminder scheduling failures. All are recoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderError {
    PermissionDenied,
    InvalidDeadline(String),
    Platform(String),
}

impl Display for ReminderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "notification permission not granted"),
            Self::InvalidDeadline(value) => {
                write!(f, "cannot schedule reminder for deadline `{value}`")
            }
            Self::Platform(message) => write!(f, "notification scheduler failed: {message}"),
        }
    }
}

impl Error for ReminderError {}

/// One-shot local notification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub task_id: TaskId,
    pub title: String,
    pub body: String,
    /// Local wall-clock time on the deadline date.
    pub fire_at: NaiveDateTime,
}

impl ReminderRequest {
    /// Builds the reminder for `task`: 09:00 local time on its deadline.
    pub fn for_task(task: &Task) -> Result<Self, ReminderError> {
        let fire_at = task
            .deadline
            .and_hms_opt(REMINDER_HOUR, 0, 0)
            .ok_or_else(|| ReminderError::InvalidDeadline(task.deadline_iso()))?;

        Ok(Self {
            task_id: task.id.clone(),
            title: REMINDER_TITLE.to_string(),
            body: format!("{} for {} is due today!", task.title, task.course),
            fire_at,
        })
    }

    /// Resolves `fire_at` in the device time zone.
    ///
    /// Returns `None` when the wall-clock time does not exist locally (DST gap).
    pub fn fire_at_local(&self) -> Option<DateTime<Local>> {
        Local.from_local_datetime(&self.fire_at).earliest()
    }

    /// Epoch milliseconds of the local fire time, for platform schedulers.
    pub fn fire_at_epoch_ms(&self) -> Option<i64> {
        self.fire_at_local().map(|at| at.timestamp_millis())
    }
}

/// Receipt returned by a dispatcher that accepted a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTicket {
    pub task_id: TaskId,
    pub fire_at: NaiveDateTime,
}

/// Fire-and-forget notification scheduler.
pub trait ReminderDispatcher {
    fn schedule(&self, request: &ReminderRequest) -> Result<ReminderTicket, ReminderError>;

    /// Cancels a pending reminder. Not called by the stores yet.
    fn cancel(&self, _task_id: &str) -> Result<(), ReminderError> {
        Ok(())
    }
}

impl<D: ReminderDispatcher + ?Sized> ReminderDispatcher for Arc<D> {
    fn schedule(&self, request: &ReminderRequest) -> Result<ReminderTicket, ReminderError> {
        (**self).schedule(request)
    }

    fn cancel(&self, task_id: &str) -> Result<(), ReminderError> {
        (**self).cancel(task_id)
    }
}
