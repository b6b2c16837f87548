//! SQLite implementation of the key-value backing.

use super::{BackingResult, KeyValueBacking};
use crate::db::{open_db, open_db_in_memory, DbResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Key-value backing stored in the `kv_entries` table.
///
/// The connection sits behind a mutex so one backing can be shared by the
/// task and session stores across threads.
pub struct SqliteKvBacking {
    conn: Mutex<Connection>,
}

impl SqliteKvBacking {
    /// Wraps an already-migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens (or creates) a database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        open_db(path).map(Self::new)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        open_db_in_memory().map(Self::new)
    }

    /// Returns all stored keys in ascending order.
    pub fn keys(&self) -> BackingResult<Vec<String>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the guard cannot leave a half-written row:
        // every statement below is a single atomic SQL call.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueBacking for SqliteKvBacking {
    fn get(&self, key: &str) -> BackingResult<Option<String>> {
        let conn = self.lock();
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> BackingResult<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}
