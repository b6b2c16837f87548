//! Durable key-value backing.
//!
//! # Responsibility
//! - Define the string-keyed, string-valued storage contract used by stores.
//! - Provide the SQLite implementation used on device.
//!
//! # Invariants
//! - `set` replaces the whole value stored under a key.
//! - `get` on a key that was never written returns `Ok(None)`, not an error.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod sqlite;

pub use sqlite::SqliteKvBacking;

/// Storage key holding the serialized task collection.
pub const TASKS_KEY: &str = "@tasks";
/// Storage key holding the serialized study session collection.
pub const STUDY_SESSIONS_KEY: &str = "@study_sessions";

pub type BackingResult<T> = Result<T, BackingError>;

/// Transport-level failure of the durable backing.
#[derive(Debug)]
pub enum BackingError {
    Db(DbError),
    /// Backing is temporarily unable to serve requests (custom backings).
    Unavailable(String),
}

impl Display for BackingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for BackingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for BackingError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for BackingError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Opaque get/set-by-key string storage.
pub trait KeyValueBacking {
    fn get(&self, key: &str) -> BackingResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> BackingResult<()>;
}

impl<B: KeyValueBacking + ?Sized> KeyValueBacking for Arc<B> {
    fn get(&self, key: &str) -> BackingResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> BackingResult<()> {
        (**self).set(key, value)
    }
}

impl<B: KeyValueBacking + ?Sized> KeyValueBacking for &B {
    fn get(&self, key: &str) -> BackingResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> BackingResult<()> {
        (**self).set(key, value)
    }
}
