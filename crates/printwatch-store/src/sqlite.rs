// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Durable key-value store backed by SQLite.
//
// Holds the small amount of state that must survive restarts: the last
// device selection per report.  Values are opaque strings (JSON in
// practice); the store never interprets them.

use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument};

use printwatch_bridge::KeyValueStore;
use printwatch_core::error::{PrintwatchError, Result};

/// SQLite schema for the key-value table.
const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS kv_store (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
"#;

/// Convert a `rusqlite::Error` into a `PrintwatchError::Database`.
fn db_err(context: &str, e: rusqlite::Error) -> PrintwatchError {
    PrintwatchError::Database(format!("{context}: {e}"))
}

/// Key-value store backed by a single SQLite table.
///
/// `rusqlite::Connection` is `Send` but not `Sync`, so it sits behind a
/// mutex to satisfy the `KeyValueStore` bounds.  Every operation is a single
/// indexed statement.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(|e| db_err("open", e))?;

        // Survives unclean shutdowns more gracefully than the rollback journal.
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| db_err("WAL pragma", e))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| db_err("create table", e))?;

        info!("key-value store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| db_err("open in-memory", e))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| db_err("create table", e))?;

        debug!("in-memory key-value store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PrintwatchError::Database("connection lock poisoned".into()))
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT key FROM kv_store ORDER BY key ASC")
            .map_err(|e| db_err("prepare keys", e))?;

        let keys = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| db_err("query keys", e))?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(|e| db_err("collect keys", e))?;

        Ok(keys)
    }
}

impl KeyValueStore for SqliteStore {
    #[instrument(skip(self))]
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()?
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| db_err("get", e))?;

        Ok(value)
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn()?
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(|e| db_err("set", e))?;

        debug!(key, "value stored");
        Ok(())
    }

    /// Idempotent: removing a missing key succeeds.
    #[instrument(skip(self))]
    fn remove(&self, key: &str) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .map_err(|e| db_err("remove", e))?;

        debug!(key, "value removed");
        Ok(())
    }
}
