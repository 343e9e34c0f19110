//! End-to-end audit tests
//!
//! A Chromium bookmark file pointing at a mock server is scanned, stored,
//! exported and finally pruned of its broken entries.

use bookmark_audit::bookmarks::{delete_bookmarks, BookmarkSource, ChromeBookmarks};
use bookmark_audit::config::parse_config;
use bookmark_audit::output::{
    format_broken_csv, generate_markdown_summary, generate_summary, load_latest_report,
};
use bookmark_audit::scanner::run_audit;
use bookmark_audit::storage::{RunStatus, SqliteStorage, Storage};
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_bookmarks(dir: &TempDir, base: &str) -> std::path::PathBuf {
    let document = serde_json::json!({
        "checksum": "d41d8cd98f00b204e9800998ecf8427e",
        "roots": {
            "bookmark_bar": {
                "id": "1",
                "name": "Bookmarks bar",
                "type": "folder",
                "children": [
                    { "id": "10", "name": "Home", "type": "url", "url": format!("{}/home", base) },
                    {
                        "id": "20",
                        "name": "Work",
                        "type": "folder",
                        "children": [
                            { "id": "21", "name": "Old wiki", "type": "url", "url": format!("{}/wiki", base) },
                            { "id": "22", "name": "Flags", "type": "url", "url": "chrome://flags" }
                        ]
                    }
                ]
            },
            "other": {
                "id": "2",
                "name": "Other bookmarks",
                "type": "folder",
                "children": [
                    { "id": "30", "name": "Legacy", "type": "url", "url": format!("{}/legacy", base) }
                ]
            },
            "synced": { "id": "3", "name": "Mobile bookmarks", "type": "folder", "children": [] }
        },
        "version": 1
    });

    let file = dir.path().join("Bookmarks");
    std::fs::write(&file, serde_json::to_string_pretty(&document).unwrap()).unwrap();
    file
}

fn write_config(dir: &TempDir, bookmarks: &Path) -> String {
    format!(
        r#"
[scanner]
concurrency = 2
timeout-ms = 2000
retries = 1

[user-agent]
name = "bookmark-audit-test"
version = "0.0.1"

[bookmarks]
path = '{}'
format = "chrome"

[output]
database-path = '{}'
csv-path = '{}'
summary-path = '{}'
"#,
        bookmarks.display(),
        dir.path().join("audit.db").display(),
        dir.path().join("broken.csv").display(),
        dir.path().join("summary.md").display(),
    )
}

#[tokio::test]
async fn test_full_audit_cycle() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("HEAD"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/wiki"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/legacy"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/legacy"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let bookmarks_path = write_bookmarks(&dir, &base);
    let config = parse_config(&write_config(&dir, &bookmarks_path)).expect("Invalid config");
    let db_path = config.output.database_path.clone();
    let summary_path = config.output.summary_path.clone();
    let bookmarks_config = config.bookmarks.clone();

    // Scan
    let outcome = run_audit(config, "test-hash", CancellationToken::new())
        .await
        .expect("Audit failed");

    assert_eq!(outcome.report.total, 3);
    assert!(!outcome.report.cancelled);

    let mut broken: Vec<_> = outcome
        .report
        .broken
        .iter()
        .map(|r| (r.id.clone(), r.status, r.folder.clone()))
        .collect();
    broken.sort();
    assert_eq!(
        broken,
        vec![
            ("21".to_string(), 404, "Bookmarks bar / Work".to_string()),
            ("30".to_string(), 500, "Other bookmarks".to_string()),
        ]
    );

    // Stored run
    let mut storage = SqliteStorage::new(Path::new(&db_path)).unwrap();
    let run = storage.get_run(outcome.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");
    assert_eq!(run.total, 3);

    // Exports
    let (_, stored) = load_latest_report(&storage).unwrap();
    assert_eq!(stored, outcome.report);
    assert_eq!(format_broken_csv(&stored.broken).lines().count(), 3);

    let summary = generate_summary(&storage).unwrap();
    generate_markdown_summary(&summary, Path::new(&summary_path)).unwrap();
    let markdown = std::fs::read_to_string(&summary_path).unwrap();
    assert!(markdown.contains("NG 404"));
    assert!(markdown.contains("NG 500"));

    // Delete the broken bookmarks and prune the stored run
    let ids: Vec<String> = stored.broken.iter().map(|r| r.id.clone()).collect();
    let mut store = ChromeBookmarks::new(&bookmarks_config.path);
    let deletions = delete_bookmarks(&mut store, &ids);
    assert!(deletions.iter().all(|d| d.succeeded));

    let remaining: Vec<_> = store.load().unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(remaining, vec!["10", "22"]);

    let removed = storage.remove_results(outcome.run_id, &ids).unwrap();
    assert_eq!(removed, 2);
    let (_, pruned) = load_latest_report(&storage).unwrap();
    assert_eq!(pruned.total, 1);
    assert!(pruned.broken.is_empty());
}

#[tokio::test]
async fn test_cancelled_audit_is_stored_as_interrupted() {
    let mock_server = MockServer::start().await;

    let dir = TempDir::new().unwrap();
    let bookmarks_path = write_bookmarks(&dir, &mock_server.uri());
    let config = parse_config(&write_config(&dir, &bookmarks_path)).expect("Invalid config");
    let db_path = config.output.database_path.clone();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = run_audit(config, "test-hash", cancel)
        .await
        .expect("Audit failed");

    assert!(outcome.report.cancelled);
    assert_eq!(outcome.report.total, 3);
    assert_eq!(outcome.report.broken.len(), 3);

    let storage = SqliteStorage::new(Path::new(&db_path)).unwrap();
    let run = storage.get_latest_run().unwrap().expect("No run stored");
    assert_eq!(run.status, RunStatus::Interrupted);
    assert!(storage.load_report(run.id).unwrap().cancelled);
}
