//! Per-file identity and naming
//!
//! This module provides functions for:
//! - Computing content fingerprints for change detection across runs
//! - Recognizing log files and deriving their destination table names

pub mod checksum;
pub mod filetype;

pub use checksum::{fingerprint, Fingerprint};
pub use filetype::{is_log_file_name, table_name_for, table_name_for_path, Compression};
