//! Progress reporting for running scans
//!
//! Workers report `(done, total)` after each completed target by pushing it
//! onto a channel; a `ProgressForwarder` hands the values to the sink from a
//! blocking thread. A slow sink only skips intermediate counts, and a sink
//! that panics is logged and ignored. The pool delivers the final
//! `done == total` value itself once every worker has exited.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Completed-target counter for a running scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanProgress {
    /// Targets fully resolved so far
    pub done: usize,

    /// Targets accepted for this scan (fixed for its whole duration)
    pub total: usize,
}

impl ScanProgress {
    pub fn new(done: usize, total: usize) -> Self {
        Self { done, total }
    }

    pub fn is_complete(&self) -> bool {
        self.done == self.total
    }

    /// Completion percentage, rounded to the nearest integer
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.done as f64 / self.total as f64) * 100.0).round() as u8
    }
}

/// Receiver of progress signals
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: ScanProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(ScanProgress) + Send + Sync,
{
    fn report(&self, progress: ScanProgress) {
        self(progress)
    }
}

/// Calls the sink, swallowing a panic
pub(crate) fn deliver(sink: &dyn ProgressSink, progress: ScanProgress) {
    if panic::catch_unwind(AssertUnwindSafe(|| sink.report(progress))).is_err() {
        tracing::warn!(
            "Progress sink panicked at {} / {}",
            progress.done,
            progress.total
        );
    }
}

/// Moves progress values from workers to a sink on a blocking thread
///
/// Sending never blocks, so workers are never held up by the sink. When the
/// sink falls behind, values queued in the meantime collapse into the latest.
pub(crate) struct ProgressForwarder {
    tx: mpsc::UnboundedSender<ScanProgress>,
    task: JoinHandle<()>,
    sink: Arc<dyn ProgressSink>,
}

impl ProgressForwarder {
    /// Starts forwarding to `sink`; must be called within a tokio runtime
    pub fn spawn(sink: Arc<dyn ProgressSink>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<ScanProgress>();
        let forwarded = sink.clone();
        let task = tokio::task::spawn_blocking(move || {
            while let Some(mut latest) = rx.blocking_recv() {
                while let Ok(next) = rx.try_recv() {
                    latest = next;
                }
                deliver(forwarded.as_ref(), latest);
            }
        });

        Self { tx, task, sink }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<ScanProgress> {
        self.tx.clone()
    }

    /// Waits until every queued value went out, then delivers `last`
    ///
    /// Senders handed out by `sender` must be dropped first, otherwise this
    /// waits for them.
    pub async fn finish(self, last: ScanProgress) {
        let Self { tx, task, sink } = self;
        drop(tx);
        if let Err(e) = task.await {
            tracing::warn!("Progress forwarder failed: {}", e);
        }
        deliver(sink.as_ref(), last);
    }
}

/// Discards every signal
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _progress: ScanProgress) {}
}

/// Publishes progress on a `watch` channel
///
/// Consumers only ever see the latest value, so a slow consumer skips
/// intermediate counts instead of slowing the scan down.
#[derive(Debug)]
pub struct WatchProgress {
    tx: watch::Sender<ScanProgress>,
}

impl WatchProgress {
    /// Creates the sink together with a receiver for the consumer
    pub fn channel() -> (Self, watch::Receiver<ScanProgress>) {
        let (tx, rx) = watch::channel(ScanProgress::default());
        (Self { tx }, rx)
    }
}

impl ProgressSink for WatchProgress {
    fn report(&self, progress: ScanProgress) {
        // No receivers left is fine
        let _ = self.tx.send(progress);
    }
}

/// Logs progress through `tracing` every `every` completions and at the end
#[derive(Debug, Clone, Copy)]
pub struct LogProgress {
    every: usize,
}

impl LogProgress {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ProgressSink for LogProgress {
    fn report(&self, progress: ScanProgress) {
        if progress.is_complete() {
            tracing::info!("Progress: {} / {} checked, done", progress.done, progress.total);
        } else if progress.done % self.every == 0 {
            tracing::info!(
                "Progress: {} / {} checked ({}%)",
                progress.done,
                progress.total,
                progress.percent()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[test]
    fn test_percent() {
        assert_eq!(ScanProgress::new(0, 0).percent(), 0);
        assert_eq!(ScanProgress::new(1, 3).percent(), 33);
        assert_eq!(ScanProgress::new(2, 3).percent(), 67);
        assert_eq!(ScanProgress::new(3, 3).percent(), 100);
    }

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = seen.clone();
            move |p: ScanProgress| seen.lock().unwrap().push(p.done)
        };

        sink.report(ScanProgress::new(1, 2));
        sink.report(ScanProgress::new(2, 2));

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_watch_sink_keeps_latest_value() {
        let (sink, rx) = WatchProgress::channel();

        sink.report(ScanProgress::new(1, 3));
        sink.report(ScanProgress::new(2, 3));
        sink.report(ScanProgress::new(3, 3));

        assert_eq!(*rx.borrow(), ScanProgress::new(3, 3));
    }

    #[test]
    fn test_watch_sink_without_receiver_does_not_panic() {
        let (sink, rx) = WatchProgress::channel();
        drop(rx);
        sink.report(ScanProgress::new(1, 1));
    }

    #[tokio::test]
    async fn test_forwarder_collapses_backlog_and_delivers_last() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = seen.clone();
            move |p: ScanProgress| {
                seen.lock().unwrap().push(p.done);
                std::thread::sleep(Duration::from_millis(30));
            }
        };
        let forwarder = ProgressForwarder::spawn(Arc::new(sink));

        let tx = forwarder.sender();
        for done in 1..10 {
            tx.send(ScanProgress::new(done, 10)).unwrap();
        }
        drop(tx);
        forwarder.finish(ScanProgress::new(10, 10)).await;

        let seen = seen.lock().unwrap();
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert!(seen.len() < 10);
        assert_eq!(seen.last().copied(), Some(10));
    }

    #[tokio::test]
    async fn test_forwarder_survives_panicking_sink() {
        let calls = Arc::new(Mutex::new(0usize));
        let sink = {
            let calls = calls.clone();
            move |_: ScanProgress| {
                *calls.lock().unwrap() += 1;
                panic!("sink failure");
            }
        };
        let forwarder = ProgressForwarder::spawn(Arc::new(sink));

        forwarder.sender().send(ScanProgress::new(1, 2)).unwrap();
        forwarder.finish(ScanProgress::new(2, 2)).await;

        assert_eq!(*calls.lock().unwrap(), 2);
    }
}
