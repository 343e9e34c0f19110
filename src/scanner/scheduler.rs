//! Worker pool draining the scan queue
//!
//! This module handles:
//! - Filtering targets down to probeable (http/https) URLs
//! - A shared FIFO queue populated up front
//! - A fixed number of concurrent worker tasks
//! - Progress signalling and cancellation of in-flight attempts

use crate::config::ScannerConfig;
use crate::scanner::aggregator::ResultAggregator;
use crate::scanner::fallback::FallbackPolicy;
use crate::scanner::progress::{NoopProgress, ProgressForwarder, ProgressSink, ScanProgress};
use crate::scanner::prober::Prober;
use crate::scanner::{ScanReport, ScanResult, Target};
use crate::url::{is_probeable, scheme_of};
use crate::AuditError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Default number of concurrent workers
pub const DEFAULT_CONCURRENCY: usize = 10;

/// FIFO queue of targets shared by all workers
///
/// Each pop removes the target under the lock, so no two workers ever
/// observe the same element.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<Target>>,
}

impl WorkQueue {
    pub fn new(targets: Vec<Target>) -> Self {
        Self {
            items: Mutex::new(targets.into()),
        }
    }

    /// Removes and returns the next target, or None once drained
    pub fn pop(&self) -> Option<Target> {
        self.lock().pop_front()
    }

    /// Removes every remaining target
    pub fn drain(&self) -> Vec<Target> {
        self.lock().drain(..).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Target>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fixed-size pool of probe workers
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use bookmark_audit::config::UserAgentConfig;
/// use bookmark_audit::scanner::{HttpProber, Target, WorkerPool};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prober = HttpProber::from_config(&UserAgentConfig::default())?;
/// let pool = WorkerPool::new(Arc::new(prober)).with_concurrency(4);
///
/// let report = pool
///     .scan(vec![Target::new("1", "Rust", "https://www.rust-lang.org/", "Bookmarks bar")])
///     .await?;
/// println!("{} of {} broken", report.broken.len(), report.total);
/// # Ok(())
/// # }
/// ```
pub struct WorkerPool {
    prober: Arc<dyn Prober>,
    policy: FallbackPolicy,
    concurrency: usize,
    progress: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
}

impl WorkerPool {
    /// Creates a pool with default concurrency, timeout and retries
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self {
            prober,
            policy: FallbackPolicy::default(),
            concurrency: DEFAULT_CONCURRENCY,
            progress: Arc::new(NoopProgress),
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a pool tuned by the `[scanner]` configuration section
    pub fn from_config(config: &ScannerConfig, prober: Arc<dyn Prober>) -> Self {
        Self::new(prober)
            .with_concurrency(config.concurrency)
            .with_policy(FallbackPolicy::new(config.retries, config.timeout()))
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Attaches a token that abandons every pending attempt when cancelled
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Probes every http(s) target and returns the aggregate report
    ///
    /// Targets with other schemes are skipped and do not count towards
    /// `total`. Returns only after every worker has exited and every progress
    /// value has been delivered.
    ///
    /// # Errors
    ///
    /// * `AuditError::InvalidConcurrency` - the pool was configured with zero workers
    /// * `AuditError::WorkerPanicked` - a worker task panicked (a prober bug)
    pub async fn scan(&self, targets: Vec<Target>) -> Result<ScanReport, AuditError> {
        if self.concurrency == 0 {
            return Err(AuditError::InvalidConcurrency(self.concurrency));
        }

        let accepted: Vec<Target> = targets
            .into_iter()
            .filter(|target| {
                let keep = is_probeable(&target.url);
                if !keep {
                    tracing::trace!(
                        "Skipping {} bookmark {}: {}",
                        scheme_of(&target.url).as_deref().unwrap_or("unknown"),
                        target.id,
                        target.url
                    );
                }
                keep
            })
            .collect();

        let total = accepted.len();
        if total == 0 {
            tracing::info!("No http(s) bookmarks to check");
            return Ok(ScanReport::default());
        }

        let workers = self.concurrency.min(total);
        tracing::info!("Checking {} bookmarks with {} workers", total, workers);

        let queue = Arc::new(WorkQueue::new(accepted));
        let aggregator = Arc::new(ResultAggregator::with_capacity(total));
        let forwarder = ProgressForwarder::spawn(self.progress.clone());

        let mut tasks = JoinSet::new();
        for worker_id in 0..workers {
            let worker = Worker {
                id: worker_id,
                total,
                prober: self.prober.clone(),
                policy: self.policy,
                queue: queue.clone(),
                aggregator: aggregator.clone(),
                progress: forwarder.sender(),
                cancel: self.cancel.clone(),
            };
            tasks.spawn(worker.run());
        }

        let mut panicked = None;
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Scan worker failed: {}", e);
                panicked.get_or_insert_with(|| e.to_string());
            }
        }

        if let Some(message) = panicked {
            return Err(AuditError::WorkerPanicked(message));
        }

        // Workers stop popping once cancelled; whatever is left was never started
        let abandoned = queue.drain();
        if !abandoned.is_empty() {
            tracing::warn!(
                "Scan cancelled with {} bookmarks not yet checked",
                abandoned.len()
            );
        }
        for target in abandoned {
            aggregator.record(ScanResult::cancelled(target));
        }

        let report = aggregator.take_report();
        forwarder
            .finish(ScanProgress::new(report.total, total))
            .await;

        tracing::info!(
            "Scan finished: {} checked, {} broken{}",
            report.total,
            report.broken.len(),
            if report.cancelled { " (cancelled)" } else { "" }
        );

        Ok(report)
    }
}

/// State owned by one worker task
struct Worker {
    id: usize,
    total: usize,
    prober: Arc<dyn Prober>,
    policy: FallbackPolicy,
    queue: Arc<WorkQueue>,
    aggregator: Arc<ResultAggregator>,
    progress: mpsc::UnboundedSender<ScanProgress>,
    cancel: CancellationToken,
}

impl Worker {
    async fn run(self) {
        let mut processed = 0usize;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            let Some(target) = self.queue.pop() else {
                break;
            };

            let outcome = self
                .policy
                .resolve(self.prober.as_ref(), &target.url, &self.cancel)
                .await;
            let result = ScanResult::from_outcome(target, outcome);

            // The final done == total signal is sent by the pool after join
            self.aggregator.record_then(result, |done| {
                if done < self.total {
                    // Only fails once the forwarder is gone
                    let _ = self.progress.send(ScanProgress::new(done, self.total));
                }
            });
            processed += 1;
        }

        tracing::debug!("Worker {} exiting after {} bookmarks", self.id, processed);
    }
}
