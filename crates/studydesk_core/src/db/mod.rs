//! SQLite file behind the durable key-value backing.
//!
//! One `kv_entries` table holds every persisted collection as a JSON blob.
//! Schema changes go through `migrations` and are versioned with
//! `PRAGMA user_version`; a file written by a newer build is refused rather
//! than downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the StudyDesk database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// A migration step failed; the whole batch was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// File schema is ahead of what this build knows how to read.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::Migration { version, source } => {
                write!(f, "kv_entries migration {version} failed: {source}")
            }
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "database schema {found} comes from a newer StudyDesk (this build reads up to {supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
