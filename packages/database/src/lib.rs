#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Persistent report storage backed by `SQLite`.
//!
//! Stores community issue reports in `data/civic_lens.db`. Uses
//! `switchy_database` for all database operations with raw parameterized
//! SQL. The schema is bootstrapped on open — safe and idempotent — so the
//! assistant can run against a fresh database file.
//!
//! The assistant core is read-mostly against this store: it lists and
//! fetches reports. Writes (create, status update) belong to the HTTP CRUD
//! surface.

pub mod queries;

use std::path::Path;

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;
use thiserror::Error;

/// Default path for the reports database.
pub const DEFAULT_DB_PATH: &str = "data/civic_lens.db";

/// Errors from report storage operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// A database query or command failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Opens (or creates) the reports `SQLite` database and ensures the schema
/// exists.
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be opened or schema creation
/// fails.
pub async fn open_db(path: &Path) -> Result<Box<dyn Database>, DbError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Database(e.to_string()))?;

    ensure_schema(db.as_ref()).await?;

    log::debug!("Opened reports database at {}", path.display());

    Ok(db)
}

/// Opens an in-memory database with the schema applied. Used by tests and
/// ephemeral tooling.
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be opened or schema creation
/// fails.
pub async fn open_in_memory() -> Result<Box<dyn Database>, DbError> {
    let db = init_sqlite_rusqlite(None).map_err(|e| DbError::Database(e.to_string()))?;
    ensure_schema(db.as_ref()).await?;
    Ok(db)
}

/// Creates the reports table and indexes if they don't already exist.
async fn ensure_schema(db: &dyn Database) -> Result<(), DbError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS reports (
            id               TEXT PRIMARY KEY,
            report_id        TEXT NOT NULL UNIQUE,
            type             TEXT NOT NULL,
            title            TEXT NOT NULL,
            description      TEXT NOT NULL,
            specific_type    TEXT NOT NULL,
            location         TEXT,
            latitude         REAL,
            longitude        REAL,
            status           TEXT NOT NULL DEFAULT 'PENDING',
            is_anonymous     INTEGER NOT NULL DEFAULT 1,
            reporter_name    TEXT,
            reporter_email   TEXT,
            reporter_phone   TEXT,
            reporter_user_id INTEGER,
            department_id    INTEGER,
            department_name  TEXT,
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        )",
    )
    .await
    .map_err(|e| DbError::Database(e.to_string()))?;

    db.exec_raw("CREATE INDEX IF NOT EXISTS idx_reports_status ON reports (status)")
        .await
        .map_err(|e| DbError::Database(e.to_string()))?;

    db.exec_raw("CREATE INDEX IF NOT EXISTS idx_reports_report_id ON reports (report_id)")
        .await
        .map_err(|e| DbError::Database(e.to_string()))?;

    db.exec_raw("CREATE INDEX IF NOT EXISTS idx_reports_created_at ON reports (created_at)")
        .await
        .map_err(|e| DbError::Database(e.to_string()))?;

    Ok(())
}
