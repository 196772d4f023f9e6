//! SQLite connection management

use std::path::{Path, PathBuf};
use rusqlite::Connection;
use crate::Result;
use super::schema;

/// Default store file, relative to the working directory
pub const DEFAULT_DATABASE: &str = "healthdash.db";

/// Location of the store file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE)
    }
}

/// Handle to the single-file store.
///
/// Holds no open connection: every logical operation opens its own through
/// [`Database::with_connection`] and closes it before returning.
#[derive(Debug, Clone)]
pub struct Database {
    config: StoreConfig,
}

impl Database {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Path of the store file
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Open a connection (creates the file and its parent directory if missing)
    pub fn open_connection(&self) -> Result<Connection> {
        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&self.config.path)?;
        Ok(conn)
    }

    /// Run `op` on a fresh connection and close it on every exit path.
    ///
    /// On success the connection is closed explicitly so a failing close is
    /// reported; on error it is dropped, which also closes it.
    pub fn with_connection<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.open_connection()?;
        let value = op(&mut conn)?;
        conn.close().map_err(|(_, e)| e)?;
        Ok(value)
    }

    /// Create the appointment table if it does not exist yet
    pub fn ensure_schema(&self) -> Result<()> {
        self.with_connection(|conn| {
            for stmt in schema::all_schema_statements() {
                conn.execute(stmt, [])?;
            }
            tracing::debug!("Schema ready at {}", self.config.path.display());
            Ok(())
        })
    }

    /// Count all appointment rows
    pub fn count(&self) -> Result<usize> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row(schema::COUNT_APPOINTMENTS, [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_count(db: &Database) -> i64 {
        db.with_connection(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [schema::APPOINTMENTS_TABLE],
                |row| row.get(0),
            )?;
            Ok(n)
        })
        .unwrap()
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(StoreConfig::new(dir.path().join("store.db")));

        db.ensure_schema().unwrap();
        db.ensure_schema().unwrap();

        assert_eq!(table_count(&db), 1);
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn test_ensure_schema_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(StoreConfig::new(dir.path().join("store.db")));
        db.ensure_schema().unwrap();

        db.with_connection(|conn| {
            conn.execute("INSERT INTO consultas (estado, cidade) VALUES ('SP', 'Santos')", [])?;
            Ok(())
        })
        .unwrap();

        db.ensure_schema().unwrap();
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("store.db");
        let db = Database::new(StoreConfig::new(&path));

        db.ensure_schema().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_failed_operation_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(StoreConfig::new(dir.path().join("store.db")));

        // No schema yet, so the count statement fails.
        assert!(matches!(db.count(), Err(crate::Error::Storage(_))));

        // The store stays usable after the failure.
        db.ensure_schema().unwrap();
        assert_eq!(db.count().unwrap(), 0);
    }
}
