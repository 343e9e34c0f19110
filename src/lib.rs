//! Bookmark-Audit: a reachability checker for browser bookmarks
//!
//! This crate probes every http(s) bookmark under a bounded-concurrency
//! HEAD→GET fallback policy, classifies each one as healthy or broken, and
//! keeps the last scan around so broken entries can be exported or deleted.

pub mod bookmarks;
pub mod config;
pub mod output;
pub mod scanner;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Bookmark-Audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Bookmark error: {0}")]
    Bookmarks(#[from] bookmarks::BookmarkError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    #[error("A scan worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("No scan runs found in database")]
    NoRuns,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Bookmark-Audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use scanner::{
    is_broken, ProbeAttempt, ProbeMethod, ProbeOutcome, ScanProgress, ScanReport, ScanResult,
    Target, WorkerPool,
};
pub use url::is_probeable;
