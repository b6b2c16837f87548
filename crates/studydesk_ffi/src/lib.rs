//! Flutter-facing FFI surface for StudyDesk core.

pub mod api;
