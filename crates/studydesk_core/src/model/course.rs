//! Course catalog and chart colours.

/// Course label used when a session has no course.
pub const UNKNOWN_COURSE: &str = "Unknown";

/// Colour for courses missing from the palette.
pub const DEFAULT_COURSE_COLOR: &str = "#000000";

/// Courses offered by the task entry form.
pub const TASK_COURSES: &[&str] = &["Mathematics", "Science", "History", "English", "Geography"];

/// Courses included in the study distribution chart.
pub const ANALYTICS_COURSES: &[&str] = &[
    "Mathematics",
    "Science",
    UNKNOWN_COURSE,
    "History",
    "English",
    "Geography",
];

const COURSE_COLORS: &[(&str, &str)] = &[
    ("Mathematics", "#E6E6FA"),
    ("Science", "#1E3A8A"),
    ("History", "#FFCE56"),
    ("English", "#36A2EB"),
    ("Geography", "#9966FF"),
    (UNKNOWN_COURSE, "#C9CBCF"),
];

/// Returns the chart colour for a course, or `DEFAULT_COURSE_COLOR`.
pub fn course_color(course: &str) -> &'static str {
    COURSE_COLORS
        .iter()
        .find(|(name, _)| *name == course)
        .map_or(DEFAULT_COURSE_COLOR, |&(_, color)| color)
}
