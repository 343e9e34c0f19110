//! Probe tests for the HEAD→GET fallback over real HTTP
//!
//! Each test mounts the responses a server would give and checks the
//! verdict the worker pool reaches with the reqwest-backed prober.

use bookmark_audit::config::UserAgentConfig;
use bookmark_audit::scanner::{FallbackPolicy, HttpProber, Target, WorkerPool};
use bookmark_audit::{ScanReport, ScanResult};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pool(timeout: Duration) -> WorkerPool {
    let prober = HttpProber::from_config(&UserAgentConfig::default())
        .expect("Failed to build HTTP client");
    WorkerPool::new(Arc::new(prober))
        .with_concurrency(4)
        .with_policy(FallbackPolicy::new(1, timeout))
}

async fn scan_one(url: String) -> ScanResult {
    let report: ScanReport = pool(Duration::from_secs(5))
        .scan(vec![Target::new("1", "Test", url, "Bookmarks bar")])
        .await
        .expect("Scan failed");
    assert_eq!(report.total, 1);
    report.results.into_iter().next().expect("Missing result")
}

#[tokio::test]
async fn test_head_success_needs_no_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/page"))
        .and(header("cache-control", "no-cache"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = scan_one(format!("{}/page", mock_server.uri())).await;

    assert!(result.ok);
    assert_eq!(result.status, 200);
    assert!(!result.is_broken());
    assert_eq!(result.error, None);
}

#[tokio::test]
async fn test_head_not_allowed_falls_back_to_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = scan_one(format!("{}/page", mock_server.uri())).await;

    assert!(result.ok);
    assert_eq!(result.status, 200);
    assert!(!result.is_broken());
}

#[tokio::test]
async fn test_definitive_head_failure_is_final() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = scan_one(format!("{}/gone", mock_server.uri())).await;

    assert!(!result.ok);
    assert_eq!(result.status, 410);
    assert!(result.is_broken());
}

#[tokio::test]
async fn test_get_retries_are_bounded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/stubborn"))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stubborn"))
        .respond_with(ResponseTemplate::new(405))
        .expect(2)
        .mount(&mock_server)
        .await;

    let result = scan_one(format!("{}/stubborn", mock_server.uri())).await;

    assert!(!result.ok);
    assert_eq!(result.status, 405);
    assert!(result.is_broken());
}

#[tokio::test]
async fn test_redirects_report_final_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let url = format!("{}/old", mock_server.uri());
    let result = scan_one(url.clone()).await;

    assert!(result.ok);
    assert_eq!(result.status, 200);
    assert_eq!(result.url, url);
    assert_eq!(result.final_url, format!("{}/new", mock_server.uri()));
}

#[tokio::test]
async fn test_slow_server_times_out_as_network_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let url = format!("{}/slow", mock_server.uri());
    let report = pool(Duration::from_millis(200))
        .scan(vec![Target::new("1", "Slow", url.clone(), "")])
        .await
        .expect("Scan failed");

    let result = &report.results[0];
    assert!(!result.ok);
    assert_eq!(result.status, 0);
    assert_eq!(
        result.error.as_deref(),
        Some(bookmark_audit::scanner::TIMEOUT_OR_NETWORK_ERROR)
    );
    assert_eq!(result.final_url, url);
    assert_eq!(report.broken.len(), 1);
}

#[tokio::test]
async fn test_connection_refused_is_broken() {
    // Reserve a port, then free it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);

    let result = scan_one(format!("http://127.0.0.1:{}/", port)).await;

    assert!(!result.ok);
    assert_eq!(result.status, 0);
    assert!(result.error.is_some());
    assert!(result.is_broken());
}

#[tokio::test]
async fn test_mixed_bookmarks_in_one_scan() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(501))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let report = pool(Duration::from_secs(5))
        .scan(vec![
            Target::new("a", "Ok", format!("{}/ok", base), ""),
            Target::new("b", "Missing", format!("{}/missing", base), ""),
            Target::new("c", "Error", format!("{}/error", base), ""),
            Target::new("d", "Settings", "chrome://settings", ""),
            Target::new("e", "Script", "javascript:void(0)", ""),
        ])
        .await
        .expect("Scan failed");

    assert_eq!(report.total, 3);
    assert!(!report.cancelled);

    let mut broken: Vec<_> = report
        .broken
        .iter()
        .map(|r| (r.id.as_str(), r.status))
        .collect();
    broken.sort();
    assert_eq!(broken, vec![("b", 404), ("c", 503)]);
}
