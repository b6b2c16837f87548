//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its creation draft.
//! - Validate titles, courses, deadlines and progress bounds.
//!
//! # Invariants
//! - `id` is non-empty and immutable after creation.
//! - `progress` is always within `0..=100`.
//! - A task with `progress == 100` is complete but stays in the collection.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound for task progress, in percent.
pub const MAX_PROGRESS: u8 = 100;

static DEADLINE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid deadline regex"));

/// Task identifier. Opaque string so ids written by older clients load as-is.
pub type TaskId = String;

/// Task urgency label shown next to the task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    #[default]
    Normal,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Normal => "Normal",
        }
    }

    /// Parses a label case-insensitively. Unknown labels return `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "normal" => Some(Self::Normal),
            _ => None,
        }
    }
}

/// Coarse completion bucket used to colour progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    /// Below 50%.
    Behind,
    /// 50% or more but not done.
    OnTrack,
    Complete,
}

impl ProgressBand {
    pub fn from_progress(progress: u8) -> Self {
        if progress >= MAX_PROGRESS {
            Self::Complete
        } else if progress >= 50 {
            Self::OnTrack
        } else {
            Self::Behind
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Behind => "#F44336",
            Self::OnTrack => "#FFC107",
            Self::Complete => "#4CAF50",
        }
    }
}

/// Validation errors for task records and drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyId,
    EmptyTitle,
    EmptyCourse,
    InvalidDeadline(String),
    ProgressOutOfRange(i64),
    DuplicateId(TaskId),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "task id must not be empty"),
            Self::EmptyTitle => write!(f, "please enter a task title"),
            Self::EmptyCourse => write!(f, "please select a course"),
            Self::InvalidDeadline(value) => {
                write!(f, "deadline `{value}` is not a valid YYYY-MM-DD date")
            }
            Self::ProgressOutOfRange(value) => {
                write!(f, "progress ({value}) must be within 0..={MAX_PROGRESS}")
            }
            Self::DuplicateId(id) => write!(f, "task id already exists: {id}"),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record, persisted verbatim inside the `@tasks` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub course: String,
    /// Serialized as `YYYY-MM-DD`.
    pub deadline: NaiveDate,
    pub priority: Priority,
    pub progress: u8,
}

impl Task {
    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.course.trim().is_empty() {
            return Err(TaskValidationError::EmptyCourse);
        }
        if self.progress > MAX_PROGRESS {
            return Err(TaskValidationError::ProgressOutOfRange(i64::from(
                self.progress,
            )));
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= MAX_PROGRESS
    }

    pub fn progress_band(&self) -> ProgressBand {
        ProgressBand::from_progress(self.progress)
    }

    /// Deadline in the persisted `YYYY-MM-DD` form.
    pub fn deadline_iso(&self) -> String {
        self.deadline.format("%Y-%m-%d").to_string()
    }
}

/// Raw persisted shape; converted into `Task` only after validation.
#[derive(Deserialize)]
struct TaskRecord {
    id: TaskId,
    title: String,
    course: String,
    deadline: NaiveDate,
    #[serde(default)]
    priority: Priority,
    progress: u8,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let task = Self {
            id: record.id,
            title: record.title,
            course: record.course,
            deadline: record.deadline,
            priority: record.priority,
            progress: record.progress,
        };
        task.validate()?;
        Ok(task)
    }
}

/// Creation draft collected from the UI.
///
/// `id` and `progress` are optional: the store assigns a fresh id and
/// progress defaults to 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub id: Option<TaskId>,
    pub title: String,
    pub course: String,
    /// Raw `YYYY-MM-DD` input.
    pub deadline: String,
    pub priority: Option<Priority>,
    pub progress: Option<i64>,
}

impl NewTask {
    pub fn new(
        title: impl Into<String>,
        course: impl Into<String>,
        deadline: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            course: course.into(),
            deadline: deadline.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_progress(mut self, progress: i64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Validates the draft and builds the record with the given fallback id.
    ///
    /// Title and course are stored as entered; only emptiness is rejected.
    pub fn into_task(
        self,
        fallback_id: impl FnOnce() -> TaskId,
    ) -> Result<Task, TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.course.trim().is_empty() {
            return Err(TaskValidationError::EmptyCourse);
        }
        let deadline = parse_deadline(&self.deadline)?;
        let progress = match self.progress {
            None => 0,
            Some(value) => u8::try_from(value)
                .ok()
                .filter(|progress| *progress <= MAX_PROGRESS)
                .ok_or(TaskValidationError::ProgressOutOfRange(value))?,
        };
        let id = match self.id {
            Some(id) if id.trim().is_empty() => return Err(TaskValidationError::EmptyId),
            Some(id) => id,
            None => fallback_id(),
        };

        let task = Task {
            id,
            title: self.title,
            course: self.course,
            deadline,
            priority: self.priority.unwrap_or_default(),
            progress,
        };
        task.validate()?;
        Ok(task)
    }
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_deadline(value: &str) -> Result<NaiveDate, TaskValidationError> {
    let trimmed = value.trim();
    if !DEADLINE_SHAPE_RE.is_match(trimmed) {
        return Err(TaskValidationError::InvalidDeadline(trimmed.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| TaskValidationError::InvalidDeadline(trimmed.to_string()))
}

/// Clamps an arbitrary progress value into `0..=100`.
pub fn clamp_progress(value: i64) -> u8 {
    // Lossless: the clamped value always fits in u8.
    value.clamp(0, i64::from(MAX_PROGRESS)) as u8
}

#[cfg(test)]
mod tests {
    use super::{
        clamp_progress, parse_deadline, NewTask, Priority, ProgressBand, TaskValidationError,
    };

    #[test]
    fn parse_deadline_requires_strict_shape_and_real_date() {
        assert!(parse_deadline("2025-06-01").is_ok());
        assert!(parse_deadline(" 2025-06-01 ").is_ok());
        assert!(matches!(
            parse_deadline("2025-6-1"),
            Err(TaskValidationError::InvalidDeadline(_))
        ));
        assert!(matches!(
            parse_deadline("2025-02-30"),
            Err(TaskValidationError::InvalidDeadline(_))
        ));
    }

    #[test]
    fn clamp_progress_bounds_values() {
        assert_eq!(clamp_progress(150), 100);
        assert_eq!(clamp_progress(-5), 0);
        assert_eq!(clamp_progress(55), 55);
    }

    #[test]
    fn priority_parse_is_case_insensitive() {
        assert_eq!(Priority::parse(" HIGH "), Some(Priority::High));
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn progress_band_thresholds() {
        assert_eq!(ProgressBand::from_progress(49), ProgressBand::Behind);
        assert_eq!(ProgressBand::from_progress(50), ProgressBand::OnTrack);
        assert_eq!(ProgressBand::from_progress(100), ProgressBand::Complete);
        assert_eq!(ProgressBand::Complete.color(), "#4CAF50");
    }

    #[test]
    fn draft_rejects_out_of_range_progress() {
        let err = NewTask::new("Essay", "English", "2025-06-01")
            .with_progress(101)
            .into_task(|| "1".to_string())
            .unwrap_err();
        assert_eq!(err, TaskValidationError::ProgressOutOfRange(101));
    }

    #[test]
    fn draft_rejects_blank_supplied_id() {
        let err = NewTask::new("Essay", "English", "2025-06-01")
            .with_id("  ")
            .into_task(|| "1".to_string())
            .unwrap_err();
        assert_eq!(err, TaskValidationError::EmptyId);
    }
}
