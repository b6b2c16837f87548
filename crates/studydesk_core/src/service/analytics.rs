//! Study time aggregates for the statistics card and pie chart.

use crate::model::course::course_color;
use crate::model::session::StudySession;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// One slice of the per-course study distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseShare {
    pub course: String,
    pub hours: f64,
    /// Share of the filtered total, rounded to one decimal place.
    pub percentage: f64,
    pub color: &'static str,
}

/// Sum of all session durations in seconds.
pub fn total_duration<'a>(sessions: impl IntoIterator<Item = &'a StudySession>) -> u64 {
    sessions
        .into_iter()
        .fold(0_u64, |total, session| total.saturating_add(session.duration))
}

/// Groups sessions by course, keeping only courses in `allowed_courses`.
///
/// Percentages are relative to the filtered total. Slices keep the order in
/// which each course first appears among the filtered sessions.
pub fn distribution_by_course<'a, S: AsRef<str>>(
    sessions: impl IntoIterator<Item = &'a StudySession>,
    allowed_courses: &[S],
) -> Vec<CourseShare> {
    let mut groups: Vec<(&'a str, u64)> = Vec::new();
    for session in sessions {
        let course = session.course.as_str();
        if !allowed_courses.iter().any(|allowed| allowed.as_ref() == course) {
            continue;
        }
        match groups.iter_mut().find(|(name, _)| *name == course) {
            Some((_, seconds)) => *seconds = seconds.saturating_add(session.duration),
            None => groups.push((course, session.duration)),
        }
    }

    let total_hours: f64 = groups
        .iter()
        .map(|(_, seconds)| *seconds as f64 / SECONDS_PER_HOUR)
        .sum();

    groups
        .into_iter()
        .map(|(course, seconds)| {
            let hours = seconds as f64 / SECONDS_PER_HOUR;
            let percentage = if total_hours > 0.0 {
                round_one_decimal(hours / total_hours * 100.0)
            } else {
                0.0
            };
            CourseShare {
                course: course.to_string(),
                hours,
                percentage,
                color: course_color(course),
            }
        })
        .collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::{distribution_by_course, total_duration};
    use crate::model::course::ANALYTICS_COURSES;
    use crate::model::session::StudySession;
    use chrono::{TimeZone, Utc};

    fn session(duration: i64, course: &str) -> StudySession {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        StudySession::new(at, duration, Some(course)).unwrap()
    }

    #[test]
    fn empty_input_yields_no_slices() {
        let sessions: Vec<StudySession> = Vec::new();
        assert!(distribution_by_course(&sessions, ANALYTICS_COURSES).is_empty());
        assert_eq!(total_duration(&sessions), 0);
    }

    #[test]
    fn percentages_use_filtered_total_and_first_seen_order() {
        let sessions = vec![
            session(1800, "History"),
            session(3600, "Art"),
            session(5400, "Science"),
            session(1800, "History"),
        ];
        let slices = distribution_by_course(&sessions, &["Science", "History"]);

        let courses: Vec<&str> = slices.iter().map(|s| s.course.as_str()).collect();
        assert_eq!(courses, vec!["History", "Science"]);
        assert_eq!(slices[0].percentage, 40.0);
        assert_eq!(slices[1].percentage, 60.0);
        assert_eq!(slices[1].hours, 1.5);
        assert_eq!(slices[0].color, "#FFCE56");
    }

    #[test]
    fn zero_length_sessions_give_zero_percentages() {
        let sessions = vec![session(0, "Science")];
        let slices = distribution_by_course(&sessions, &["Science"]);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].percentage, 0.0);
    }

    #[test]
    fn thirds_sum_to_one_hundred_within_rounding() {
        let sessions = vec![
            session(1200, "Mathematics"),
            session(1200, "English"),
            session(1200, "Geography"),
        ];
        let sum: f64 = distribution_by_course(&sessions, ANALYTICS_COURSES)
            .iter()
            .map(|slice| slice.percentage)
            .sum();
        assert!((sum - 100.0).abs() <= 0.1 + 1e-9, "sum was {sum}");
    }
}
