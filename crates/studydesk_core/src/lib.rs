//! Core domain logic for StudyDesk.
//! This crate is the single source of truth for task and study-time invariants.

pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod reminder;
pub mod repo;
pub mod service;

pub use kv::{KeyValueBacking, SqliteKvBacking, STUDY_SESSIONS_KEY, TASKS_KEY};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::course::{course_color, ANALYTICS_COURSES, TASK_COURSES, UNKNOWN_COURSE};
pub use model::session::{SessionValidationError, StudySession};
pub use model::task::{NewTask, Priority, ProgressBand, Task, TaskId, TaskValidationError};
pub use reminder::{
    NoopReminderDispatcher, QueuedReminderDispatcher, ReminderDispatcher, ReminderError,
    ReminderRequest, ReminderTicket,
};
pub use repo::collection::{JsonCollection, RepoError};
pub use service::analytics::CourseShare;
pub use service::report::{
    LoadOutcome, MutationReport, PersistOutcome, ReminderOutcome, StoreError,
};
pub use service::session_store::SessionStore;
pub use service::study_timer::{StudyTimer, TimerStop};
pub use service::task_store::TaskStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
