//! zeek-ingest - Incremental Zeek Log Importer
//!
//! Imports the tab-separated logs written by Zeek into a single SQLite
//! database so they can be queried (e.g. from Grafana) without re-parsing the
//! raw files on every read. Designed to run repeatedly from cron against a
//! growing log tree.
//!
//! # Features
//!
//! - **Exactly-once import**: every file is fingerprinted; unchanged files are
//!   skipped and changed files are imported again.
//!
//! - **Header-driven schemas**: table columns come from each log's `#fields`
//!   line, one TEXT-typed table per log stream.
//!
//! - **Tolerant parsing**: short rows are padded, long rows truncated, and
//!   gzip-compressed rotations are read transparently.
//!
//! - **Failure isolation**: a broken file is logged and skipped without
//!   affecting the rest of the run.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │           /opt/zeek/logs/YYYY-MM-DD/*.log[.gz]            │
//! └─────────────────────────────┬────────────────────────────┘
//!                               │ discovery
//!                               ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Ingestor                          │
//! │  ┌─────────────┐   ┌─────────────┐   ┌────────────────┐  │
//! │  │ checksum    │   │ parser      │   │ db::tables     │  │
//! │  │ fingerprint │   │ #fields +   │   │ CREATE TABLE + │  │
//! │  │             │   │ rows        │   │ batched INSERT │  │
//! │  └──────┬──────┘   └─────────────┘   └────────────────┘  │
//! │         ▼                                                │
//! │  ┌─────────────┐                                         │
//! │  │ db::tracker │  _processed_files (path -> fingerprint) │
//! │  └─────────────┘                                         │
//! └─────────────────────────────┬────────────────────────────┘
//!                               ▼
//!                    ┌──────────────────┐
//!                    │    SQLite DB     │
//!                    │ (zeek_logs.db)   │
//!                    └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Import everything under the default log tree
//! zeek-ingest --logs-dir /opt/zeek/logs -o zeek_logs.db
//!
//! # Only the last 3 days, with progress
//! zeek-ingest --logs-dir /opt/zeek/logs -o zeek_logs.db --days 3 -p
//!
//! # Query results
//! sqlite3 zeek_logs.db "SELECT id_resp_h, COUNT(*) FROM conn GROUP BY 1 ORDER BY 2 DESC"
//! ```

pub mod config;
pub mod content;
pub mod db;
pub mod discovery;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod parser;
pub mod progress;

pub use config::{CliArgs, IngestConfig};
pub use error::{FileResult, IngestError, Result, RowsImported, SkipReason};
pub use ingest::{import, IngestStats, Ingestor};
pub use logging::{LogConfig, LogLevel};
