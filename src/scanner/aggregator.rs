//! Result collection and broken-link classification

use crate::scanner::{ScanReport, ScanResult};
use std::sync::{Mutex, PoisonError};

/// Broken predicate: no 2xx response, or a status of 400 and above
pub fn is_broken(result: &ScanResult) -> bool {
    !result.ok || result.status >= 400
}

/// Shared, append-only collection of completed results
///
/// Appends from concurrent workers are serialized; the completion count is
/// taken under the same lock, so each append observes a distinct `done` and
/// callbacks run in increasing `done` order.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: Mutex<Vec<ScanResult>>,
}

impl ResultAggregator {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Appends a result and returns how many results have been recorded
    pub fn record(&self, result: ScanResult) -> usize {
        self.record_then(result, |_| {})
    }

    /// Appends a result and runs `then` with the new count before releasing
    /// the lock. `then` must not block.
    pub fn record_then(&self, result: ScanResult, then: impl FnOnce(usize)) -> usize {
        let mut results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        results.push(result);
        let done = results.len();
        then(done);
        done
    }

    /// Takes every recorded result out and partitions them into a report
    pub fn take_report(&self) -> ScanReport {
        let results = std::mem::take(
            &mut *self.results.lock().unwrap_or_else(PoisonError::into_inner),
        );
        partition(results)
    }
}

/// Builds a report from completed results, keeping completion order
///
/// The report counts as cancelled when any result was abandoned.
pub fn partition(results: Vec<ScanResult>) -> ScanReport {
    let broken = results.iter().filter(|r| is_broken(r)).cloned().collect();
    let cancelled = results.iter().any(ScanResult::is_cancelled);
    ScanReport {
        total: results.len(),
        results,
        broken,
        cancelled,
    }
}
