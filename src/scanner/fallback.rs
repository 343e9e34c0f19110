//! HEAD→GET fallback policy
//!
//! Every URL is first probed with HEAD. Some servers reject HEAD outright
//! (405, 501) or drop it on the floor (no response), so those outcomes
//! escalate to a bounded number of GET attempts. Any other failure status is
//! method-independent and is final as-is.
//!
//! | HEAD result          | Action                                  |
//! |----------------------|-----------------------------------------|
//! | 2xx                  | Final, no GET                           |
//! | 0 / 405 / 501        | Up to `retries + 1` GETs, stop on 2xx    |
//! | anything else        | Final, no GET                           |

use crate::scanner::prober::{ProbeAttempt, ProbeMethod, ProbeOutcome, Prober, DEFAULT_TIMEOUT};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default number of extra GET attempts after the first one
pub const DEFAULT_RETRIES: u32 = 1;

/// Status codes after which a failed HEAD is retried with GET
const ESCALATION_STATUSES: [u16; 3] = [0, 405, 501];

/// Decides how many attempts a URL gets and which one is authoritative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPolicy {
    /// Extra GET attempts after the first fallback GET
    pub retries: u32,

    /// Timeout applied to every individual attempt
    pub timeout: Duration,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl FallbackPolicy {
    pub fn new(retries: u32, timeout: Duration) -> Self {
        Self { retries, timeout }
    }

    /// Returns true if a failed HEAD attempt should be retried with GET
    pub fn should_escalate(attempt: &ProbeAttempt) -> bool {
        !attempt.succeeded && ESCALATION_STATUSES.contains(&attempt.status_code)
    }

    /// Maximum number of GET attempts made after an escalating HEAD
    pub fn max_get_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Resolves a URL to its final outcome
    ///
    /// The outcome is always derived from the last attempt made. Once
    /// `cancel` fires no new attempt is started.
    pub async fn resolve(
        &self,
        prober: &dyn Prober,
        url: &str,
        cancel: &CancellationToken,
    ) -> ProbeOutcome {
        let mut last = prober
            .attempt(url, ProbeMethod::Head, self.timeout, cancel)
            .await;

        if !Self::should_escalate(&last) {
            return last.into();
        }

        tracing::debug!(
            "HEAD {} returned {}, falling back to GET",
            url,
            last.status_code
        );

        for attempt in 1..=self.max_get_attempts() {
            if cancel.is_cancelled() {
                break;
            }

            last = prober
                .attempt(url, ProbeMethod::Get, self.timeout, cancel)
                .await;

            if last.succeeded {
                break;
            }

            tracing::trace!(
                "GET attempt {}/{} for {} failed with {}",
                attempt,
                self.max_get_attempts(),
                url,
                last.status_code
            );
        }

        last.into()
    }
}
