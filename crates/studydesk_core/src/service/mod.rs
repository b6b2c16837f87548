//! Stores and use-case services.
//!
//! # Responsibility
//! - Own the canonical in-memory collections and keep them durable.
//! - Dispatch post-commit effects (persistence, reminders) explicitly.
//! - Keep UI/FFI layers decoupled from storage details.
//!
//! # Invariants
//! - Every mutation rewrites the whole collection before it returns.
//! - Mutations on one store never interleave.

pub mod analytics;
pub mod report;
pub mod session_store;
pub mod study_timer;
pub mod task_store;
