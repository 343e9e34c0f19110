//! Statistics for a scan report
//!
//! This module provides functionality for summarising a report by outcome
//! class and displaying the numbers on stdout.

use crate::output::load_latest_report;
use crate::scanner::ScanReport;
use crate::storage::Storage;
use crate::AuditError;

/// Scan statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStatistics {
    /// Number of probed bookmarks
    pub total: usize,

    pub healthy: usize,

    pub broken: usize,

    /// Broken with no HTTP status (timeout, DNS, TLS, refused)
    pub network_failures: usize,

    /// Broken with a 4xx status
    pub client_errors: usize,

    /// Broken with a 5xx status
    pub server_errors: usize,

    /// Broken with any other status
    pub other_failures: usize,

    /// Abandoned before they were probed
    pub cancelled: usize,
}

impl ScanStatistics {
    pub fn from_report(report: &ScanReport) -> Self {
        let mut stats = Self {
            total: report.total,
            healthy: report.healthy_count(),
            broken: report.broken.len(),
            ..Self::default()
        };

        for result in &report.broken {
            match result.status {
                _ if result.is_cancelled() => stats.cancelled += 1,
                0 => stats.network_failures += 1,
                400..=499 => stats.client_errors += 1,
                500..=599 => stats.server_errors += 1,
                _ => stats.other_failures += 1,
            }
        }

        stats
    }

    /// Percentage of probed bookmarks that are healthy
    pub fn healthy_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.healthy as f64 / self.total as f64) * 100.0
        }
    }
}

/// Loads statistics for the latest stored run
///
/// # Returns
///
/// * `Ok(ScanStatistics)` - Successfully loaded statistics
/// * `Err(AuditError)` - No runs stored, or the query failed
pub fn load_statistics(storage: &dyn Storage) -> Result<ScanStatistics, AuditError> {
    let (_, report) = load_latest_report(storage)?;
    Ok(ScanStatistics::from_report(&report))
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &ScanStatistics) {
    println!("=== Bookmark Statistics ===\n");

    println!("Overview:");
    println!("  Bookmarks checked: {}", stats.total);
    println!("  Healthy: {}", stats.healthy);
    println!("  Broken: {}", stats.broken);
    println!();

    if stats.broken > 0 {
        println!("Broken by Cause:");
        for (label, count) in [
            ("Connection failed / timeout", stats.network_failures),
            ("Client errors (4xx)", stats.client_errors),
            ("Server errors (5xx)", stats.server_errors),
            ("Other status", stats.other_failures),
            ("Not checked (cancelled)", stats.cancelled),
        ] {
            if count > 0 {
                println!("  {}: {}", label, count);
            }
        }
        println!();
    }

    println!(
        "Healthy Rate: {:.1}% ({} / {} bookmarks reachable)",
        stats.healthy_rate(),
        stats.healthy,
        stats.total
    );
}
