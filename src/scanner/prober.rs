//! HTTP prober implementation
//!
//! This module issues the individual network requests of a scan:
//! - Building the shared HTTP client with the configured user agent
//! - One HEAD or GET request per attempt, redirects followed transparently
//! - A hard timeout on receiving response headers
//! - Collapsing every failure mode into a normalized `ProbeAttempt`

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::{redirect::Policy, Client, Method};
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Error message recorded when no response headers arrive in time
pub const TIMEOUT_OR_NETWORK_ERROR: &str = "timeout-or-network-error";

/// Error message recorded when an attempt is abandoned through cancellation
pub const CANCELLED: &str = "cancelled";

/// Default per-attempt timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(8000);

/// Maximum redirect hops followed within a single attempt
const MAX_REDIRECTS: usize = 10;

/// HTTP method used for a probe attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeMethod {
    Head,
    Get,
}

impl ProbeMethod {
    fn as_reqwest(self) -> Method {
        match self {
            Self::Head => Method::HEAD,
            Self::Get => Method::GET,
        }
    }
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => f.write_str("HEAD"),
            Self::Get => f.write_str("GET"),
        }
    }
}

/// Result of a single network attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAttempt {
    /// Method used for this attempt
    pub method: ProbeMethod,

    /// True iff a response arrived with a 2xx status
    pub succeeded: bool,

    /// HTTP status code, 0 if no response was received
    pub status_code: u16,

    /// URL after following redirects (the requested URL if none)
    pub final_url: String,

    /// Diagnostic text for attempts that got no response
    pub error_message: Option<String>,
}

impl ProbeAttempt {
    /// Builds an attempt from a received response status
    pub fn response(method: ProbeMethod, status_code: u16, final_url: impl Into<String>) -> Self {
        Self {
            method,
            succeeded: is_success_status(status_code),
            status_code,
            final_url: final_url.into(),
            error_message: None,
        }
    }

    /// Builds an attempt that received no response at all
    pub fn failure(method: ProbeMethod, url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            method,
            succeeded: false,
            status_code: 0,
            final_url: url.into(),
            error_message: Some(error.into()),
        }
    }
}

/// Final, authoritative result for one URL after all attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub ok: bool,
    pub status: u16,
    pub final_url: String,
    pub error: Option<String>,
}

impl From<ProbeAttempt> for ProbeOutcome {
    fn from(attempt: ProbeAttempt) -> Self {
        Self {
            ok: is_success_status(attempt.status_code),
            status: attempt.status_code,
            final_url: attempt.final_url,
            error: attempt.error_message,
        }
    }
}

/// Returns true for statuses in [200, 299]
pub fn is_success_status(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// A component able to perform one probe attempt
///
/// Implementations must never fail: every error is folded into the returned
/// `ProbeAttempt`. They must also return promptly once `cancel` fires.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn attempt(
        &self,
        url: &str,
        method: ProbeMethod,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ProbeAttempt;
}

/// Builds an HTTP client suitable for probing
///
/// Redirects are followed (up to 10 hops) and every request carries
/// `Cache-Control: no-cache` so probes always reflect the live server.
///
/// # Example
///
/// ```no_run
/// use bookmark_audit::config::UserAgentConfig;
/// use bookmark_audit::scanner::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

    Client::builder()
        .user_agent(config.header_value())
        .default_headers(headers)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Prober backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a prober with a fresh client for the given user agent
    pub fn from_config(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn attempt(
        &self,
        url: &str,
        method: ProbeMethod,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ProbeAttempt {
        // `send` resolves once headers arrive; the body is never read
        let request = self.client.request(method.as_reqwest(), url).send();

        let attempt = tokio::select! {
            biased;
            _ = cancel.cancelled() => ProbeAttempt::failure(method, url, CANCELLED),
            result = tokio::time::timeout(timeout, request) => match result {
                Ok(Ok(response)) => ProbeAttempt::response(
                    method,
                    response.status().as_u16(),
                    response.url().as_str(),
                ),
                Ok(Err(e)) => ProbeAttempt::failure(method, url, describe_error(&e)),
                Err(_elapsed) => ProbeAttempt::failure(method, url, TIMEOUT_OR_NETWORK_ERROR),
            },
        };

        tracing::debug!(
            "{} {} -> {} {}",
            method,
            url,
            attempt.status_code,
            attempt.error_message.as_deref().unwrap_or("")
        );

        attempt
    }
}

/// Produces diagnostic text for a request that got no response
fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        TIMEOUT_OR_NETWORK_ERROR.to_string()
    } else if error.is_redirect() {
        format!("Too many redirects: {}", error)
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else if error.is_builder() {
        format!("Invalid request: {}", error)
    } else {
        error.to_string()
    }
}
