//! Scripted prober for driving the engine without a network

use crate::scanner::prober::{
    ProbeAttempt, ProbeMethod, Prober, CANCELLED, TIMEOUT_OR_NETWORK_ERROR,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One scripted response
#[derive(Debug, Clone)]
pub enum Reply {
    /// A response with this status code
    Status(u16),
    /// No response before the timeout
    Timeout,
    /// Blocks until the cancel token fires
    Hang,
}

/// Prober that replays scripted replies per URL and records every call
///
/// Replies for a URL are consumed in order; once exhausted the last one
/// repeats. Unscripted URLs answer with the default reply (200).
pub struct ScriptedProber {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    last: Mutex<HashMap<String, Reply>>,
    default_reply: Reply,
    latency: Duration,
    calls: Mutex<Vec<(String, ProbeMethod)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for ScriptedProber {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedProber {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            last: Mutex::new(HashMap::new()),
            default_reply: Reply::Status(200),
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn script(self, url: &str, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), replies.into());
        self
    }

    pub fn with_default(mut self, reply: Reply) -> Self {
        self.default_reply = reply;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_with(&self, method: ProbeMethod) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, m)| *m == method)
            .count()
    }

    pub fn methods_for(&self, url: &str) -> Vec<ProbeMethod> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| u == url)
            .map(|(_, m)| *m)
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, url: &str) -> Reply {
        let mut scripts = self.scripts.lock().unwrap();
        let mut last = self.last.lock().unwrap();

        match scripts.get_mut(url).and_then(|queue| queue.pop_front()) {
            Some(reply) => {
                last.insert(url.to_string(), reply.clone());
                reply
            }
            None => last
                .get(url)
                .cloned()
                .unwrap_or_else(|| self.default_reply.clone()),
        }
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn attempt(
        &self,
        url: &str,
        method: ProbeMethod,
        _timeout: Duration,
        cancel: &CancellationToken,
    ) -> ProbeAttempt {
        self.calls.lock().unwrap().push((url.to_string(), method));
        let reply = self.next_reply(url);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let attempt = match reply {
            Reply::Status(status) => ProbeAttempt::response(method, status, url),
            Reply::Timeout => ProbeAttempt::failure(method, url, TIMEOUT_OR_NETWORK_ERROR),
            Reply::Hang => {
                cancel.cancelled().await;
                ProbeAttempt::failure(method, url, CANCELLED)
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        attempt
    }
}
