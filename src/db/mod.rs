//! Database module for SQLite operations
//!
//! This module handles all database interactions including:
//! - Schema creation
//! - User, report and KPI queries
//! - Recommendation storage and status updates
//! - Demo data seeding

pub mod queries;
pub mod schema;
pub mod seed;

use std::path::PathBuf;
use std::sync::Mutex;

use rusqlite::Connection;
use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Lock poisoned")]
    LockPoisoned,
}

/// Database connection wrapper
pub struct Database {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl Database {
    /// Create a new database connection
    pub fn new(path: PathBuf) -> Result<Self, DbError> {
        let conn = Connection::open(&path)?;

        // Enable foreign keys
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Create a private in-memory database
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: PathBuf::from(":memory:"),
        })
    }

    /// Initialize the database schema
    pub fn initialize(&self) -> Result<(), DbError> {
        let conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        schema::create_tables(&conn)?;
        Ok(())
    }

    /// Get the database file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Execute a query with the database connection
    pub fn with_connection<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&conn)
    }
}

/// Get the default database path
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("repcoach").join("coaching.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_database_initializes() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        // Schema creation is idempotent
        db.initialize().unwrap();

        let tables: i64 = db
            .with_connection(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .unwrap();

        assert_eq!(tables, 4);
    }

    #[test]
    fn test_default_db_path() {
        let path = default_db_path();
        assert!(path.ends_with("repcoach/coaching.db"));
    }

    #[test]
    fn test_file_database_roundtrip() {
        let path = std::env::temp_dir().join(format!("repcoach_test_{}.db", std::process::id()));
        std::fs::remove_file(&path).ok();

        {
            let db = Database::new(path.clone()).unwrap();
            db.initialize().unwrap();
            db.with_connection(seed::seed_demo_data).unwrap();
        }

        let db = Database::new(path.clone()).unwrap();
        let report = db
            .with_connection(|conn| queries::get_report(conn, "RPT-1001"))
            .unwrap();
        assert!(report.is_some());
        assert_eq!(db.path(), &path);

        drop(db);
        std::fs::remove_file(&path).ok();
    }
}
