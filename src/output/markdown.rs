//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a stored run:
//! run metadata, totals, and a table of every broken bookmark.

use crate::output::{AuditSummary, OutputResult};
use crate::scanner::ScanResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary file
///
/// # Arguments
///
/// * `summary` - The audit summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &AuditSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Human-readable status of one result
///
/// `OK <status>` for healthy results, `NG <status>` for broken ones with an
/// HTTP status, and `connection failed / timeout` when no response arrived.
pub fn status_label(result: &ScanResult) -> String {
    if result.ok {
        format!("OK {}", result.status)
    } else if result.status != 0 {
        format!("NG {}", result.status)
    } else {
        "connection failed / timeout".to_string()
    }
}

/// Formats an audit summary as markdown
pub fn format_markdown_summary(summary: &AuditSummary) -> String {
    let stats = &summary.statistics;
    let mut md = String::new();

    md.push_str("# Bookmark Audit Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Run ID**: {}\n", summary.run_id));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!("- **Duration**: {} seconds\n", duration));
    }
    md.push_str(&format!("- **Status**: {}\n", summary.status));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    // Totals
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Bookmarks Checked**: {}\n", stats.total));
    md.push_str(&format!("- **Healthy**: {}\n", stats.healthy));
    md.push_str(&format!("- **Broken**: {}\n", stats.broken));
    md.push_str(&format!("- **Healthy Rate**: {:.2}%\n\n", stats.healthy_rate()));

    md.push_str("| Cause | Count |\n");
    md.push_str("|-------|-------|\n");
    md.push_str(&format!(
        "| Connection failed / timeout | {} |\n",
        stats.network_failures
    ));
    md.push_str(&format!("| Client error (4xx) | {} |\n", stats.client_errors));
    md.push_str(&format!("| Server error (5xx) | {} |\n", stats.server_errors));
    md.push_str(&format!("| Other status | {} |\n", stats.other_failures));
    if stats.cancelled > 0 {
        md.push_str(&format!("| Not checked (cancelled) | {} |\n", stats.cancelled));
    }
    md.push('\n');

    // Broken bookmarks
    md.push_str("## Broken Bookmarks\n\n");
    if summary.report.broken.is_empty() {
        md.push_str("No broken bookmarks found.\n");
    } else {
        md.push_str("| Status | Title | Folder | Error |\n");
        md.push_str("|--------|-------|--------|-------|\n");
        for result in &summary.report.broken {
            let link = if result.final_url.is_empty() {
                &result.url
            } else {
                &result.final_url
            };
            let title = if result.title.is_empty() {
                link.as_str()
            } else {
                result.title.as_str()
            };
            md.push_str(&format!(
                "| {} | [{}]({}) | {} | {} |\n",
                status_label(result),
                escape_cell(title),
                link,
                escape_cell(&result.folder),
                escape_cell(result.error.as_deref().unwrap_or("")),
            ));
        }
    }

    md.push_str("\n---\n\n");
    md.push_str("*Generated by bookmark-audit*\n");

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
