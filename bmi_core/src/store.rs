//! SQLite store holding the measurement table.
//!
//! One `Store` is opened per process and handed to the measurement log.
//! Opening creates the `usuarios` table if it is missing and leaves an
//! existing one untouched, so prior data survives restarts.
//!
//! Access is assumed to be single-writer; no locking is done here.

use crate::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Name of the measurement table. Column names match existing data files.
pub const TABLE: &str = "usuarios";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS usuarios (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nome TEXT,
    peso REAL,
    altura REAL,
    imc REAL,
    data TEXT
)";

/// Handle to the durable store
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (or create) the store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&path)?;
        let store = Self {
            conn,
            path: Some(path),
        };
        store.ensure_schema()?;

        tracing::debug!("Opened measurement store at {:?}", store.path);
        Ok(store)
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Create the measurement table if absent
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Location of the database file (`None` for in-memory stores)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Number of schema objects named `name` (used to check idempotent setup)
    pub fn schema_object_count(&self, name: &str) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
