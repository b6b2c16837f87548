//! Domain model for tasks and study sessions.
//!
//! # Responsibility
//! - Define the plain value records owned by the stores.
//! - Keep the persisted JSON field names stable.
//!
//! # Invariants
//! - Tasks and study sessions never reference each other.
//! - A record that violates its invariants cannot be deserialized.

pub mod course;
pub mod session;
pub mod task;
