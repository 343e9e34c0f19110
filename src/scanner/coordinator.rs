//! Audit coordinator - one stored scan from bookmark file to report
//!
//! This module ties the engine to the rest of the crate:
//! - Opening storage and recording the run
//! - Loading targets from the configured bookmark file
//! - Running the worker pool with progress logging and cancellation
//! - Persisting the report and the run's terminal status

use crate::bookmarks::open_source;
use crate::config::Config;
use crate::scanner::progress::{LogProgress, ProgressSink};
use crate::scanner::prober::{HttpProber, Prober};
use crate::scanner::scheduler::WorkerPool;
use crate::scanner::ScanReport;
use crate::storage::{RunStatus, SqliteStorage, Storage};
use crate::AuditError;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Result of a finished audit run
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub run_id: i64,
    pub report: ScanReport,
}

impl AuditOutcome {
    /// Status the run was stored with
    pub fn status(&self) -> RunStatus {
        if self.report.cancelled {
            RunStatus::Interrupted
        } else {
            RunStatus::Completed
        }
    }
}

/// Main audit coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    storage: SqliteStorage,
    prober: Arc<dyn Prober>,
    progress: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
    run_id: i64,
}

impl Coordinator {
    /// Creates a new coordinator and records a new run
    ///
    /// # Arguments
    ///
    /// * `config` - The audit configuration
    /// * `config_hash` - Hash of the configuration file, stored with the run
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(AuditError)` - Failed to open storage or build the HTTP client
    pub fn new(config: Config, config_hash: &str) -> Result<Self, AuditError> {
        let mut storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
        let prober = HttpProber::from_config(&config.user_agent)?;

        let run_id = storage.create_run(config_hash)?;
        tracing::info!("Starting audit run {}", run_id);

        Ok(Self {
            config: Arc::new(config),
            storage,
            prober: Arc::new(prober),
            progress: Arc::new(LogProgress::default()),
            cancel: CancellationToken::new(),
            run_id,
        })
    }

    /// Replaces the HTTP prober
    pub fn with_prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = prober;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Runs the audit
    ///
    /// The run ends as `Completed`, as `Interrupted` when the token was
    /// cancelled mid-scan, or as `Failed` when anything returns an error.
    pub async fn run(&mut self) -> Result<AuditOutcome, AuditError> {
        match self.scan_and_save().await {
            Ok(report) => {
                let outcome = AuditOutcome {
                    run_id: self.run_id,
                    report,
                };
                self.storage.finish_run(self.run_id, outcome.status())?;
                tracing::info!(
                    "Audit run {} {}: {} checked, {} broken",
                    self.run_id,
                    outcome.status().to_db_string(),
                    outcome.report.total,
                    outcome.report.broken.len()
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!("Audit run {} failed: {}", self.run_id, e);
                if let Err(status_err) = self.storage.finish_run(self.run_id, RunStatus::Failed) {
                    tracing::warn!("Could not mark run {} failed: {}", self.run_id, status_err);
                }
                Err(e)
            }
        }
    }

    async fn scan_and_save(&mut self) -> Result<ScanReport, AuditError> {
        let targets = open_source(&self.config.bookmarks).load()?;
        tracing::info!(
            "Loaded {} bookmarks from {}",
            targets.len(),
            self.config.bookmarks.path
        );

        let pool = WorkerPool::from_config(&self.config.scanner, self.prober.clone())
            .with_progress(self.progress.clone())
            .with_cancellation(self.cancel.clone());

        let report = pool.scan(targets).await?;
        self.storage.save_report(self.run_id, &report)?;

        Ok(report)
    }
}

/// Convenience function to run a full audit
///
/// # Example
///
/// ```no_run
/// use bookmark_audit::config::load_config_with_hash;
/// use bookmark_audit::scanner::run_audit;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("bookmark-audit.toml"))?;
/// let outcome = run_audit(config, &hash, CancellationToken::new()).await?;
/// println!("{} broken bookmarks", outcome.report.broken.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_audit(
    config: Config,
    config_hash: &str,
    cancel: CancellationToken,
) -> Result<AuditOutcome, AuditError> {
    let mut coordinator = Coordinator::new(config, config_hash)?.with_cancellation(cancel);
    coordinator.run().await
}
