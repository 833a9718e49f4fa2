//! Error types for zeek-ingest
//!
//! This module defines the error hierarchy for:
//! - SQLite store errors (fatal when the store cannot be opened)
//! - Configuration and directory discovery errors (fatal to the run)
//! - Log parsing errors (recoverable, scoped to one file)
//!
//! Per-file processing never propagates an error to the batch. Instead it
//! returns a [`FileResult`], and the orchestrator aggregates outcomes.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the zeek-ingest application
#[derive(Error, Debug)]
pub enum IngestError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Input directory resolution errors
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),
}

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to create database file
    #[error("Failed to create database at '{path}': {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    /// Table would be created without columns
    #[error("Refusing to create table '{table}' with no columns")]
    NoColumns { table: String },

    /// Schema error
    #[error("Database schema error: {0}")]
    Schema(String),
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid batch size
    #[error("Invalid batch size {size}: must be between {min} and {max}")]
    InvalidBatchSize { size: usize, min: usize, max: usize },

    /// Invalid day window
    #[error("Invalid --days value {days}: must be at least 1")]
    InvalidDays { days: usize },

    /// No input paths given
    #[error("At least one logs directory is required")]
    NoInputs,

    /// Output path error
    #[error("Invalid database path '{path}': {reason}")]
    InvalidDatabasePath { path: PathBuf, reason: String },

    /// Log file could not be opened
    #[error("Cannot open log file '{path}': {reason}")]
    InvalidLogFile { path: PathBuf, reason: String },
}

/// Input directory resolution errors
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Base logs directory does not exist
    #[error("Logs base directory does not exist: '{0}'")]
    BaseNotFound(PathBuf),

    /// Failed to list a directory
    #[error("Failed to read directory '{path}': {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Nothing to process
    #[error("No date directories found in: {}", display_paths(.0))]
    NoDirectories(Vec<PathBuf>),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while reading a single log file
#[derive(Error, Debug)]
pub enum ParseError {
    /// File could not be opened
    #[error("Failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Read or decompression failure while streaming
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for IngestError
pub type Result<T> = std::result::Result<T, IngestError>;

/// Result type alias for DbError
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Result type alias for ParseError
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// A file that was imported successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowsImported {
    /// Destination table
    pub table: String,
    /// Rows appended to the table (zero for a header-only file)
    pub rows: u64,
}

/// Why a file was not imported
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Same path and fingerprint already recorded
    #[error("already imported with the same fingerprint")]
    AlreadyImported,

    /// No `#fields` declaration in the file
    #[error("no #fields header found")]
    NoHeader,

    /// File could not be opened or fingerprinted
    #[error("unreadable: {0}")]
    Unreadable(String),

    /// I/O or decompression error while streaming rows
    #[error("read failed: {0}")]
    Read(String),

    /// File declares columns the existing table lacks
    #[error("table '{}' has no column(s): {}", .table, .missing.join(", "))]
    SchemaMismatch { table: String, missing: Vec<String> },

    /// File name maps onto one of the bookkeeping tables
    #[error("table name '{0}' is reserved")]
    ReservedTable(String),

    /// Store rejected a write for this file
    #[error("database error: {0}")]
    Database(String),
}

impl SkipReason {
    /// Returns true if the skip was caused by an error rather than by design
    pub fn is_failure(&self) -> bool {
        !matches!(self, SkipReason::AlreadyImported | SkipReason::NoHeader)
    }
}

impl From<ParseError> for SkipReason {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Open { .. } => SkipReason::Unreadable(err.to_string()),
            ParseError::Read { .. } => SkipReason::Read(err.to_string()),
        }
    }
}

impl From<DbError> for SkipReason {
    fn from(err: DbError) -> Self {
        SkipReason::Database(err.to_string())
    }
}

impl From<rusqlite::Error> for SkipReason {
    fn from(err: rusqlite::Error) -> Self {
        SkipReason::Database(err.to_string())
    }
}

/// Outcome of processing one file
pub type FileResult = std::result::Result<RowsImported, SkipReason>;

impl fmt::Display for RowsImported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows -> {}", self.rows, self.table)
    }
}
