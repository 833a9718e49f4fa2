//! Database schema definitions and creation
//!
//! This module defines the bookkeeping tables that live next to the imported
//! log tables and provides functions to open and configure the database.

use crate::error::{DbError, DbResult};
use rusqlite::Connection;
use std::fs;
use std::path::Path;

/// Current schema version for migrations
pub const SCHEMA_VERSION: u32 = 1;

/// Name of the table tracking imported files
pub const PROCESSED_FILES_TABLE: &str = "_processed_files";

/// Name of the run metadata table
pub const INGEST_INFO_TABLE: &str = "_ingest_info";

/// SQL to create the processed files table
/// Column names match databases written by earlier versions of the importer.
const CREATE_PROCESSED_FILES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS _processed_files (
    filepath TEXT PRIMARY KEY,
    file_hash TEXT,
    processed_at TIMESTAMP,
    rows_imported INTEGER
)
"#;

/// SQL to create run metadata table
const CREATE_INGEST_INFO_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS _ingest_info (
    key TEXT PRIMARY KEY,
    value TEXT
)
"#;

/// SQLite pragmas for the import session
const WRITE_PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA cache_size = -64000;      -- 64MB cache
PRAGMA temp_store = MEMORY;
"#;

/// Open (creating if needed) the destination database
///
/// Creates missing parent directories, then applies pragmas and bookkeeping
/// tables. Any failure here is fatal to the run.
pub fn open_database(path: &Path) -> DbResult<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tracing::info!("Creating database directory: {}", parent.display());
            fs::create_dir_all(parent).map_err(|e| DbError::CreateFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
    }

    let conn = Connection::open(path).map_err(|e| DbError::CreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    create_database(&conn)?;

    Ok(conn)
}

/// Configure a connection and create the bookkeeping tables
pub fn create_database(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(WRITE_PRAGMAS)?;

    conn.execute(CREATE_PROCESSED_FILES_TABLE, [])?;
    conn.execute(CREATE_INGEST_INFO_TABLE, [])?;

    Ok(())
}

/// Let SQLite refresh planner statistics after a run
pub fn optimize_for_reads(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA optimize;")?;
    Ok(())
}

/// Store run metadata
pub fn set_ingest_info(conn: &Connection, key: &str, value: &str) -> DbResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO _ingest_info (key, value) VALUES (?1, ?2)",
        [key, value],
    )?;
    Ok(())
}

/// Get run metadata
pub fn get_ingest_info(conn: &Connection, key: &str) -> DbResult<Option<String>> {
    let result = conn.query_row(
        "SELECT value FROM _ingest_info WHERE key = ?1",
        [key],
        |row| row.get(0),
    );

    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// True if `name` would address one of the bookkeeping tables
///
/// SQLite compares table names case-insensitively.
pub fn is_reserved_table(name: &str) -> bool {
    [PROCESSED_FILES_TABLE, INGEST_INFO_TABLE]
        .iter()
        .any(|t| t.eq_ignore_ascii_case(name))
}

/// Quote an identifier for use in SQL text
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Metadata keys used by the importer
pub mod keys {
    /// Schema version
    pub const SCHEMA_VERSION: &str = "schema_version";

    /// Importer version that last wrote the database
    pub const INGEST_VERSION: &str = "ingest_version";

    /// Timestamp when the last run started (RFC 3339)
    pub const LAST_RUN_START: &str = "last_run_start";

    /// Timestamp when the last run finished (RFC 3339)
    pub const LAST_RUN_END: &str = "last_run_end";

    /// Last run status: "running" or "completed"
    pub const LAST_RUN_STATUS: &str = "last_run_status";

    /// Files imported by the last run
    pub const LAST_RUN_FILES: &str = "last_run_files";

    /// Rows imported by the last run
    pub const LAST_RUN_ROWS: &str = "last_run_rows";
}
