//! Scanner module: the bookmark probing engine
//!
//! This module contains the core probing logic, including:
//! - Single HTTP attempts with hard timeouts (`prober`)
//! - The HEAD→GET fallback and retry policy (`fallback`)
//! - The bounded worker pool draining the target queue (`scheduler`)
//! - Progress signalling (`progress`) and result classification (`aggregator`)
//! - End-to-end orchestration of a stored audit run (`coordinator`)

mod aggregator;
mod coordinator;
mod fallback;
mod progress;
mod prober;
mod scheduler;

#[cfg(test)]
mod testing;

pub use aggregator::{is_broken, partition, ResultAggregator};
pub use coordinator::{run_audit, AuditOutcome, Coordinator};
pub use fallback::{FallbackPolicy, DEFAULT_RETRIES};
pub use progress::{LogProgress, NoopProgress, ProgressSink, ScanProgress, WatchProgress};
pub use prober::{
    build_http_client, is_success_status, HttpProber, ProbeAttempt, ProbeMethod, ProbeOutcome,
    Prober, CANCELLED, DEFAULT_TIMEOUT, TIMEOUT_OR_NETWORK_ERROR,
};
pub use scheduler::{WorkQueue, WorkerPool, DEFAULT_CONCURRENCY};

/// One bookmark queued for probing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Stable bookmark identifier from the source
    pub id: String,

    pub title: String,

    pub url: String,

    /// Folder path from the root, joined with " / "
    pub folder: String,
}

impl Target {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            folder: folder.into(),
        }
    }
}

/// Final verdict for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub id: String,
    pub title: String,
    pub url: String,
    pub folder: String,
    pub status: u16,
    pub ok: bool,
    pub final_url: String,
    pub error: Option<String>,
}

impl ScanResult {
    /// Combines a target with the outcome of its probe attempts
    pub fn from_outcome(target: Target, outcome: ProbeOutcome) -> Self {
        Self {
            id: target.id,
            title: target.title,
            url: target.url,
            folder: target.folder,
            status: outcome.status,
            ok: outcome.ok,
            final_url: outcome.final_url,
            error: outcome.error,
        }
    }

    /// Result recorded for a target that was abandoned through cancellation
    pub fn cancelled(target: Target) -> Self {
        let outcome = ProbeOutcome {
            ok: false,
            status: 0,
            final_url: target.url.clone(),
            error: Some(CANCELLED.to_string()),
        };
        Self::from_outcome(target, outcome)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == 0 && self.error.as_deref() == Some(CANCELLED)
    }

    pub fn is_broken(&self) -> bool {
        is_broken(self)
    }
}

/// Aggregate output of one scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Every accepted target's result, in completion order
    pub results: Vec<ScanResult>,

    /// Results matching the broken predicate, in the same order
    pub broken: Vec<ScanResult>,

    /// Number of accepted targets; always `results.len()`
    pub total: usize,

    /// True if an external cancellation cut the scan short
    pub cancelled: bool,
}

impl ScanReport {
    pub fn healthy_count(&self) -> usize {
        self.total - self.broken.len()
    }
}
