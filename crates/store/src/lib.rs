//! Result persistence for the bandar analytics pipeline.
//!
//! This crate provides:
//! - The `ResultWriter` seam the pipeline's callers append rows through
//! - A SQLite-backed `stock_queries` table

pub mod sqlite;

pub use sqlite::{SqliteStore, StoredAnalysis};

use bandar_core::{AnalysisRow, Result};

/// Appends analysis rows to durable storage.
pub trait ResultWriter {
    /// Append one row and return its id.
    fn append(&mut self, row: &AnalysisRow) -> Result<i64>;
}
