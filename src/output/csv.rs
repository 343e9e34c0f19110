//! CSV export of broken bookmarks
//!
//! Columns are `id,title,url,finalUrl,status,ok,folder,error`. Every cell is
//! double-quoted with embedded quotes doubled, a status of 0 is written as an
//! empty cell, and rows are joined by `\n` without a trailing newline.

use crate::output::OutputResult;
use crate::scanner::ScanResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Header row of the export
pub const CSV_HEADER: [&str; 8] = [
    "id", "title", "url", "finalUrl", "status", "ok", "folder", "error",
];

/// Formats results as CSV, header first
pub fn format_broken_csv(results: &[ScanResult]) -> String {
    let mut rows = Vec::with_capacity(results.len() + 1);
    rows.push(format_row(CSV_HEADER.iter().copied()));

    for result in results {
        let status = if result.status == 0 {
            String::new()
        } else {
            result.status.to_string()
        };
        let ok = result.ok.to_string();

        rows.push(format_row(
            [
                result.id.as_str(),
                result.title.as_str(),
                result.url.as_str(),
                result.final_url.as_str(),
                status.as_str(),
                ok.as_str(),
                result.folder.as_str(),
                result.error.as_deref().unwrap_or(""),
            ]
            .into_iter(),
        ));
    }

    rows.join("\n")
}

/// Writes the broken subset of results to a CSV file
///
/// # Arguments
///
/// * `broken` - Broken results, in report order
/// * `output_path` - Path where the CSV file should be written
pub fn write_broken_csv(broken: &[ScanResult], output_path: &Path) -> OutputResult<()> {
    let csv = format_broken_csv(broken);

    let mut file = File::create(output_path)?;
    file.write_all(csv.as_bytes())?;

    tracing::debug!(
        "Wrote {} broken bookmarks to {}",
        broken.len(),
        output_path.display()
    );
    Ok(())
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    cells
        .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn broken(id: &str, status: u16, error: Option<&str>) -> ScanResult {
        ScanResult {
            id: id.to_string(),
            title: "Say \"hi\", world".to_string(),
            url: "https://a.example/".to_string(),
            folder: "Bookmarks bar / Work".to_string(),
            status,
            ok: false,
            final_url: "https://a.example/final".to_string(),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_header_only_for_empty_input() {
        assert_eq!(
            format_broken_csv(&[]),
            r#""id","title","url","finalUrl","status","ok","folder","error""#
        );
    }

    #[test]
    fn test_rows_are_quoted_and_escaped() {
        let csv = format_broken_csv(&[broken("7", 404, None)]);
        let lines: Vec<_> = csv.split('\n').collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            r#""7","Say ""hi"", world","https://a.example/","https://a.example/final","404","false","Bookmarks bar / Work","""#
        );
    }

    #[test]
    fn test_zero_status_is_empty_cell() {
        let csv = format_broken_csv(&[broken("8", 0, Some("timeout-or-network-error"))]);
        assert!(csv.ends_with(r#""","false","Bookmarks bar / Work","timeout-or-network-error""#));
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_write_to_file() {
        let file = NamedTempFile::new().unwrap();
        write_broken_csv(&[broken("1", 500, None)], file.path()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
