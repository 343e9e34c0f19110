//! Output module for generating audit reports
//!
//! This module handles:
//! - Exporting broken bookmarks as CSV
//! - Generating markdown summaries of a stored run
//! - Computing and printing scan statistics

pub mod csv;
mod markdown;
pub mod stats;

pub use csv::{format_broken_csv, write_broken_csv};
pub use markdown::{format_markdown_summary, generate_markdown_summary, status_label};
pub use stats::{load_statistics, print_statistics, ScanStatistics};

use crate::scanner::ScanReport;
use crate::storage::{RunRecord, Storage};
use crate::AuditError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything the summary report needs about one run
#[derive(Debug, Clone)]
pub struct AuditSummary {
    // Run metadata
    pub run_id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,
    pub status: String,
    pub config_hash: String,

    pub statistics: ScanStatistics,
    pub report: ScanReport,
}

impl AuditSummary {
    /// Builds a summary from a run record and its report
    pub fn new(run: RunRecord, report: ScanReport) -> Self {
        let duration_seconds = match (
            run.started_at.parse::<chrono::DateTime<chrono::Utc>>(),
            run.finished_at.as_deref(),
        ) {
            (Ok(started), Some(finished)) => finished
                .parse::<chrono::DateTime<chrono::Utc>>()
                .ok()
                .map(|finished| (finished - started).num_seconds().max(0) as u64),
            _ => None,
        };

        Self {
            run_id: run.id,
            started_at: run.started_at,
            finished_at: run.finished_at,
            duration_seconds,
            status: run.status.to_db_string().to_string(),
            config_hash: run.config_hash,
            statistics: ScanStatistics::from_report(&report),
            report,
        }
    }
}

/// Loads the most recent run and its report
///
/// # Errors
///
/// * `AuditError::NoRuns` - the database holds no runs yet
pub fn load_latest_report(storage: &dyn Storage) -> Result<(RunRecord, ScanReport), AuditError> {
    let run = storage.get_latest_run()?.ok_or(AuditError::NoRuns)?;
    let report = storage.load_report(run.id)?;
    Ok((run, report))
}

/// Generates an audit summary for the latest run in storage
///
/// # Arguments
///
/// * `storage` - The storage backend containing scan data
///
/// # Returns
///
/// * `Ok(AuditSummary)` - Successfully generated summary
/// * `Err(AuditError)` - No runs stored, or the query failed
pub fn generate_summary(storage: &dyn Storage) -> Result<AuditSummary, AuditError> {
    let (run, report) = load_latest_report(storage)?;
    Ok(AuditSummary::new(run, report))
}
