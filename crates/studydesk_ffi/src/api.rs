//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the process-wide task and session stores.
//! - Hand queued deadline reminders to the platform notification layer.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures are returned as envelope messages, never as errors.

use log::info;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;
use studydesk_core::{
    core_version as core_version_inner, default_log_level as default_log_level_inner,
    init_logging as init_logging_inner, ping as ping_inner, CourseShare, MutationReport,
    NewTask, PersistOutcome, Priority, QueuedReminderDispatcher, ReminderOutcome,
    ReminderRequest, SessionStore, SqliteKvBacking, Task, TaskStore, ANALYTICS_COURSES,
    TASK_COURSES,
};

const DB_FILE_NAME: &str = "studydesk.sqlite3";
const DB_PATH_ENV: &str = "STUDYDESK_DB_PATH";

static DB_PATH: OnceCell<PathBuf> = OnceCell::new();
static APP: OnceCell<AppState> = OnceCell::new();

type SharedBacking = Arc<SqliteKvBacking>;

struct AppState {
    tasks: TaskStore<SharedBacking, Arc<QueuedReminderDispatcher>>,
    sessions: SessionStore<SharedBacking>,
    reminders: Arc<QueuedReminderDispatcher>,
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Default log level for the current build mode (`debug` or `info`).
#[flutter_rust_bridge::frb(sync)]
pub fn default_log_level() -> String {
    default_log_level_inner().as_str().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
/// - Idempotent for the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Task projection for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub course: String,
    /// `YYYY-MM-DD`.
    pub deadline: String,
    /// `Low|Medium|High|Normal`.
    pub priority: String,
    pub progress: u32,
    /// Progress bar colour as `#RRGGBB`.
    pub progress_color: String,
    pub complete: bool,
}

/// Task list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    pub items: Vec<TaskItem>,
    pub message: String,
}

/// Envelope for task and session mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the mutation was accepted.
    pub ok: bool,
    /// Whether an existing record matched (always true for creations).
    pub matched: bool,
    /// Whether the change reached durable storage.
    pub persisted: bool,
    /// Created task, when the action creates one.
    pub task: Option<TaskItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            matched: false,
            persisted: false,
            task: None,
            message: message.into(),
        }
    }

    fn from_match(report: MutationReport<bool>, done: &str, missing: &str) -> Self {
        let message = if report.value { done } else { missing };
        Self {
            ok: true,
            matched: report.value,
            persisted: report.persist.is_durable(),
            task: None,
            message: with_persist_note(message, &report.persist),
        }
    }
}

/// One pie-chart slice.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseSlice {
    pub course: String,
    pub hours: f64,
    pub percentage: f64,
    pub color: String,
}

/// Study statistics envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyStatsResponse {
    pub ok: bool,
    pub session_count: u32,
    pub total_seconds: u64,
    pub total_hours: f64,
    pub average_seconds: f64,
    pub slices: Vec<CourseSlice>,
    pub message: String,
}

/// Reminder ready to hand to the OS notification scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub task_id: String,
    pub title: String,
    pub body: String,
    /// Local wall-clock fire time, `YYYY-MM-DDTHH:MM:SS`.
    pub fire_at_local: String,
    /// `None` when the local time does not exist (DST gap).
    pub fire_at_epoch_ms: Option<i64>,
}

/// Course labels offered by the task entry form.
#[flutter_rust_bridge::frb(sync)]
pub fn course_options() -> Vec<String> {
    TASK_COURSES.iter().map(|course| course.to_string()).collect()
}

/// Creates a task and queues its deadline reminder.
///
/// # FFI contract
/// - `priority`: `Low|Medium|High|Normal` (case-insensitive), default `Normal`.
/// - `progress`: 0..=100, default 0.
/// - Validation failures return `ok=false` with a user-facing message.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(
    title: String,
    course: String,
    deadline: String,
    priority: Option<String>,
    progress: Option<i64>,
) -> ActionResponse {
    let priority = match priority.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match Priority::parse(raw) {
            Some(priority) => Some(priority),
            None => return ActionResponse::failure(format!("unsupported priority `{raw}`")),
        },
    };
    let draft = NewTask {
        id: None,
        title,
        course,
        deadline,
        priority,
        progress,
    };

    let app = match app() {
        Ok(app) => app,
        Err(err) => return ActionResponse::failure(err),
    };
    match app.tasks.add(draft) {
        Ok(report) => {
            let note = match &report.reminder {
                Some(ReminderOutcome::Skipped(err)) => format!(" Reminder skipped: {err}."),
                _ => String::new(),
            };
            ActionResponse {
                ok: true,
                matched: true,
                persisted: report.persist.is_durable(),
                task: Some(to_task_item(&report.value)),
                message: with_persist_note(&format!("Task created.{note}"), &report.persist),
            }
        }
        Err(err) => ActionResponse::failure(err.to_string()),
    }
}

/// Lists tasks in insertion order.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list() -> TaskListResponse {
    match app() {
        Ok(app) => {
            let items = app.tasks.list().iter().map(to_task_item).collect::<Vec<_>>();
            TaskListResponse {
                ok: true,
                message: format!("{} task(s).", items.len()),
                items,
            }
        }
        Err(err) => TaskListResponse {
            ok: false,
            items: Vec::new(),
            message: err,
        },
    }
}

/// Sets task progress; values outside 0..=100 are clamped.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update_progress(task_id: String, progress: i64) -> ActionResponse {
    with_app(|app| {
        ActionResponse::from_match(
            app.tasks.update_progress(task_id.trim(), progress),
            "Progress updated.",
            "Task not found.",
        )
    })
}

/// Marks a task complete (progress 100).
#[flutter_rust_bridge::frb(sync)]
pub fn task_mark_done(task_id: String) -> ActionResponse {
    with_app(|app| {
        ActionResponse::from_match(
            app.tasks.mark_done(task_id.trim()),
            "Task completed.",
            "Task not found.",
        )
    })
}

/// Deletes a task. Its reminder, if already handed to the OS, stays scheduled.
#[flutter_rust_bridge::frb(sync)]
pub fn task_remove(task_id: String) -> ActionResponse {
    with_app(|app| {
        ActionResponse::from_match(
            app.tasks.remove(task_id.trim()),
            "Task deleted.",
            "Task not found.",
        )
    })
}

/// Records a finished study interval.
#[flutter_rust_bridge::frb(sync)]
pub fn session_append(duration_secs: i64, course: Option<String>) -> ActionResponse {
    with_app(|app| match app.sessions.append(duration_secs, course.as_deref()) {
        Ok(report) => ActionResponse {
            ok: true,
            matched: true,
            persisted: report.persist.is_durable(),
            task: None,
            message: with_persist_note("Session recorded.", &report.persist),
        },
        Err(err) => ActionResponse::failure(err.to_string()),
    })
}

/// Aggregates recorded study time over the analytics course set.
#[flutter_rust_bridge::frb(sync)]
pub fn study_stats() -> StudyStatsResponse {
    match app() {
        Ok(app) => {
            let sessions = &app.sessions;
            StudyStatsResponse {
                ok: true,
                session_count: u32::try_from(sessions.len()).unwrap_or(u32::MAX),
                total_seconds: sessions.total_duration(),
                total_hours: sessions.total_hours(),
                average_seconds: sessions.average_duration_per_session(),
                slices: sessions
                    .distribution_by_course(ANALYTICS_COURSES)
                    .into_iter()
                    .map(to_course_slice)
                    .collect(),
                message: String::new(),
            }
        }
        Err(err) => StudyStatsResponse {
            ok: false,
            session_count: 0,
            total_seconds: 0,
            total_hours: 0.0,
            average_seconds: 0.0,
            slices: Vec::new(),
            message: err,
        },
    }
}

/// Mirrors the OS notification permission into core.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_set_permission(granted: bool) -> String {
    match app() {
        Ok(app) => {
            app.reminders.set_permission(granted);
            info!("event=reminder_permission module=ffi status=ok granted={granted}");
            String::new()
        }
        Err(err) => err,
    }
}

/// Takes all reminders queued since the last call.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_drain() -> Vec<ReminderItem> {
    match app() {
        Ok(app) => app.reminders.drain().iter().map(to_reminder_item).collect(),
        Err(_) => Vec::new(),
    }
}

/// Retries any failed writes; call before the app is suspended.
///
/// Returns empty string when both collections are durable.
#[flutter_rust_bridge::frb(sync)]
pub fn app_flush() -> String {
    let app = match app() {
        Ok(app) => app,
        Err(err) => return err,
    };
    let failures = [("tasks", app.tasks.flush()), ("sessions", app.sessions.flush())]
        .into_iter()
        .filter_map(|(name, outcome)| match outcome {
            PersistOutcome::Failed(err) => Some(format!("{name}: {err}")),
            PersistOutcome::Written | PersistOutcome::Unchanged => None,
        })
        .collect::<Vec<_>>();
    failures.join("; ")
}

fn app() -> Result<&'static AppState, String> {
    APP.get_or_try_init(|| {
        let path = resolve_db_path();
        let backing = Arc::new(
            SqliteKvBacking::open(&path).map_err(|err| format!("database open failed: {err}"))?,
        );
        let reminders = Arc::new(QueuedReminderDispatcher::new(false));
        let (tasks, task_load) = TaskStore::open(Arc::clone(&backing), Arc::clone(&reminders));
        let (sessions, session_load) = SessionStore::open(backing);
        info!(
            "event=app_open module=ffi status=ok tasks={} sessions={} recovered={}",
            task_load.count(),
            session_load.count(),
            task_load.is_recovered() || session_load.is_recovered()
        );
        Ok(AppState {
            tasks,
            sessions,
            reminders,
        })
    })
}

fn with_app(f: impl FnOnce(&AppState) -> ActionResponse) -> ActionResponse {
    match app() {
        Ok(app) => f(app),
        Err(err) => ActionResponse::failure(err),
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_persist_note(message: &str, persist: &PersistOutcome) -> String {
    match persist {
        PersistOutcome::Failed(_) => format!("{message} Not saved to storage yet."),
        PersistOutcome::Written | PersistOutcome::Unchanged => message.to_string(),
    }
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.clone(),
        title: task.title.clone(),
        course: task.course.clone(),
        deadline: task.deadline_iso(),
        priority: task.priority.as_str().to_string(),
        progress: u32::from(task.progress),
        progress_color: task.progress_band().color().to_string(),
        complete: task.is_complete(),
    }
}

fn to_course_slice(share: CourseShare) -> CourseSlice {
    CourseSlice {
        course: share.course,
        hours: share.hours,
        percentage: share.percentage,
        color: share.color.to_string(),
    }
}

fn to_reminder_item(request: &ReminderRequest) -> ReminderItem {
    ReminderItem {
        task_id: request.task_id.clone(),
        title: request.title.clone(),
        body: request.body.clone(),
        fire_at_local: request.fire_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        fire_at_epoch_ms: request.fire_at_epoch_ms(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, reminder_drain, reminder_set_permission, session_append,
        study_stats, task_add, task_list, task_mark_done, task_remove, task_update_progress,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn task_add_then_list_update_and_remove() {
        let title = unique_token("essay");
        let created = task_add(
            title.clone(),
            "English".to_string(),
            "2025-06-01".to_string(),
            Some("high".to_string()),
            None,
        );
        assert!(created.ok, "{}", created.message);
        let task = created.task.expect("created task should be returned");
        assert_eq!(task.priority, "High");
        assert_eq!(task.progress, 0);

        let listed = task_list();
        assert!(listed.items.iter().any(|item| item.id == task.id));

        let updated = task_update_progress(task.id.clone(), 150);
        assert!(updated.matched);
        let listed = task_list();
        let item = listed
            .items
            .iter()
            .find(|item| item.id == task.id)
            .expect("task should still be listed");
        assert_eq!(item.progress, 100);
        assert!(item.complete);

        assert!(task_mark_done(task.id.clone()).matched);
        assert!(task_remove(task.id.clone()).matched);
        assert!(!task_remove(task.id.clone()).matched);
        assert!(task_list().items.iter().all(|item| item.id != task.id));
    }

    #[test]
    fn task_add_rejects_blank_title_and_unknown_priority() {
        let blank = task_add(
            " ".to_string(),
            "English".to_string(),
            "2025-06-01".to_string(),
            None,
            None,
        );
        assert!(!blank.ok);
        assert!(blank.message.contains("title"));

        let bad_priority = task_add(
            "Essay".to_string(),
            "English".to_string(),
            "2025-06-01".to_string(),
            Some("urgent".to_string()),
            None,
        );
        assert!(!bad_priority.ok);
        assert!(bad_priority.message.contains("priority"));
    }

    #[test]
    fn granted_permission_queues_reminder_for_new_task() {
        assert!(reminder_set_permission(true).is_empty());
        let created = task_add(
            unique_token("reminder"),
            "Science".to_string(),
            "2030-01-15".to_string(),
            None,
            Some(10),
        );
        assert!(created.ok, "{}", created.message);
        let task_id = created.task.expect("task").id;

        let reminders = reminder_drain();
        let reminder = reminders
            .iter()
            .find(|item| item.task_id == task_id)
            .expect("reminder should be queued");
        assert_eq!(reminder.title, "Task Deadline Reminder");
        assert_eq!(reminder.fire_at_local, "2030-01-15T09:00:00");
    }

    #[test]
    fn session_append_updates_stats() {
        let before = study_stats();
        assert!(before.ok, "{}", before.message);

        let appended = session_append(1800, Some("Geography".to_string()));
        assert!(appended.ok, "{}", appended.message);
        assert!(!session_append(-1, None).ok);

        let after = study_stats();
        assert!(after.total_seconds >= before.total_seconds + 1800);
        assert!(after.slices.iter().any(|slice| slice.course == "Geography"));
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
