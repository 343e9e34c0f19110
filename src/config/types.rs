use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Bookmark-Audit
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub bookmarks: BookmarksConfig,
    pub output: OutputConfig,
}

/// Probing behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Number of concurrent probe workers
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-attempt timeout waiting for response headers (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Additional GET attempts after the first fallback GET
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl ScannerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
        }
    }
}

fn default_concurrency() -> usize {
    10
}

fn default_timeout_ms() -> u64 {
    8000
}

fn default_retries() -> u32 {
    1
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the client
    pub name: String,

    /// Version of the client
    pub version: String,

    /// URL with information about the client
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!("{}/{} (+{})", self.name, self.version, contact),
            None => format!("{}/{}", self.name, self.version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// On-disk bookmark format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkFormat {
    /// Chromium `Bookmarks` JSON file
    #[default]
    Chrome,
    /// Netscape `bookmarks.html` export
    Netscape,
}

/// Bookmark source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BookmarksConfig {
    /// Path to the bookmark file
    pub path: String,

    /// Format of the bookmark file
    #[serde(default)]
    pub format: BookmarkFormat,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the CSV export of broken bookmarks
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}
