//! Ingestion orchestration
//!
//! Composes fingerprinting, parsing and table management for each file,
//! walks directories in a deterministic order and aggregates the counts
//! reported at the end of a run.

pub mod orchestrator;
pub mod stats;

pub use orchestrator::{import, list_log_files, Ingestor};
pub use stats::IngestStats;
