//! Log parser for Zeek TSV files
//!
//! Opens plain or gzip logs, locates the `#fields` declaration and exposes
//! the remaining data lines as a lazy sequence of normalized rows.
//!
//! ```text
//! conn.log.gz ──► open_log (MultiGzDecoder) ──► LogFile::from_reader
//!                                                  │ scan to #fields
//!                                                  ▼
//!                                            TableSchema + LogRows
//! ```

pub mod reader;
pub mod zeek;

pub use reader::{open_log, LogReader};
pub use zeek::{normalize_row, LogFile, LogRecord, LogRows, TableSchema};
