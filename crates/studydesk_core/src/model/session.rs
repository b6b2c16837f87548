//! Study session domain model.
//!
//! # Invariants
//! - Sessions are immutable once created.
//! - `course` is never blank; missing or blank input reads as `"Unknown"`.

use crate::model::course::UNKNOWN_COURSE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation errors for study session input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionValidationError {
    NegativeDuration(i64),
}

impl Display for SessionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeDuration(value) => {
                write!(f, "session duration ({value}s) must not be negative")
            }
        }
    }
}

impl Error for SessionValidationError {}

/// One completed study interval, persisted inside the `@study_sessions` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SessionRecord")]
pub struct StudySession {
    /// When the session was recorded (end of the interval), RFC 3339.
    pub date: DateTime<Utc>,
    /// Length in seconds.
    pub duration: u64,
    pub course: String,
}

impl StudySession {
    /// Builds a session recorded at `date`.
    ///
    /// # Errors
    /// - Returns `NegativeDuration` when `duration_secs < 0`.
    pub fn new(
        date: DateTime<Utc>,
        duration_secs: i64,
        course: Option<&str>,
    ) -> Result<Self, SessionValidationError> {
        let duration = u64::try_from(duration_secs)
            .map_err(|_| SessionValidationError::NegativeDuration(duration_secs))?;
        Ok(Self {
            date,
            duration,
            course: normalize_course(course),
        })
    }

    pub fn hours(&self) -> f64 {
        self.duration as f64 / 3600.0
    }
}

#[derive(Deserialize)]
struct SessionRecord {
    date: DateTime<Utc>,
    duration: u64,
    #[serde(default)]
    course: Option<String>,
}

impl From<SessionRecord> for StudySession {
    fn from(record: SessionRecord) -> Self {
        Self {
            date: record.date,
            duration: record.duration,
            course: normalize_course(record.course.as_deref()),
        }
    }
}

fn normalize_course(course: Option<&str>) -> String {
    match course {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ => UNKNOWN_COURSE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionValidationError, StudySession};
    use chrono::{TimeZone, Utc};

    #[test]
    fn blank_course_falls_back_to_unknown() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let session = StudySession::new(at, 60, Some("   ")).unwrap();
        assert_eq!(session.course, "Unknown");

        let session = StudySession::new(at, 60, None).unwrap();
        assert_eq!(session.course, "Unknown");
    }

    #[test]
    fn negative_duration_is_rejected() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let err = StudySession::new(at, -1, Some("Science")).unwrap_err();
        assert_eq!(err, SessionValidationError::NegativeDuration(-1));
    }

    #[test]
    fn decodes_records_written_by_older_clients() {
        let value = serde_json::json!({
            "date": "2025-06-01T10:00:00.000Z",
            "duration": 1800,
            "course": ""
        });
        let session: StudySession = serde_json::from_value(value).unwrap();
        assert_eq!(session.duration, 1800);
        assert_eq!(session.course, "Unknown");
        assert!((session.hours() - 0.5).abs() < f64::EPSILON);
    }
}
