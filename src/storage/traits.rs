//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::scanner::ScanReport;
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Persists scan runs and their reports so the latest report can be
/// restored, exported, or pruned after bookmarks are deleted.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new scan run in the `Running` state
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Updates the status of a run
    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Marks a run finished with the given terminal status
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Counts stored runs
    fn count_runs(&self) -> StorageResult<u64>;

    // ===== Reports =====

    /// Stores every result of a report under a run, replacing earlier ones
    fn save_report(&mut self, run_id: i64, report: &ScanReport) -> StorageResult<()>;

    /// Restores a report in completion order
    fn load_report(&self, run_id: i64) -> StorageResult<ScanReport>;

    /// Drops results for deleted bookmarks from a stored run
    ///
    /// # Returns
    ///
    /// Number of result rows removed
    fn remove_results(&mut self, run_id: i64, bookmark_ids: &[String]) -> StorageResult<usize>;
}
