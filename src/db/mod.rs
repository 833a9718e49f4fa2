//! SQLite storage for imported logs
//!
//! One database file holds every destination table plus the bookkeeping
//! tables used to make repeated runs idempotent.
//!
//! # Layout
//!
//! ```text
//! zeek_logs.db
//! ├── conn, dns, http, ssl, ...   one TEXT-typed table per log stream
//! ├── _processed_files            path -> fingerprint, time, rows
//! └── _ingest_info                run metadata (key/value)
//! ```
//!
//! All writes for one file happen inside a single transaction, so a file is
//! either fully imported and recorded or not touched at all.

pub mod schema;
pub mod tables;
pub mod tracker;

pub use schema::{
    create_database, is_reserved_table, keys, open_database, optimize_for_reads, quote_ident,
};
pub use tables::{bulk_insert, ensure_table, missing_columns, table_columns, table_exists};
pub use tracker::{is_already_imported, record_import, ProcessedFileRecord};
