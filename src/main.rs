//! Bookmark-Audit main entry point
//!
//! This is the command-line interface for the bookmark reachability checker.

use anyhow::Context;
use bookmark_audit::bookmarks::{delete_bookmarks, open_source, open_store};
use bookmark_audit::config::{load_config_with_hash, Config};
use bookmark_audit::is_probeable;
use bookmark_audit::output::{
    generate_markdown_summary, generate_summary, load_latest_report, load_statistics,
    print_statistics, write_broken_csv, ScanStatistics,
};
use bookmark_audit::scanner::run_audit;
use bookmark_audit::storage::{SqliteStorage, Storage};
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Bookmark-Audit: find dead browser bookmarks
///
/// Bookmark-Audit probes every http(s) bookmark with HEAD, falling back to
/// GET where servers refuse HEAD, and reports the ones that no longer
/// resolve to a healthy page.
#[derive(Parser, Debug)]
#[command(name = "bookmark-audit")]
#[command(version)]
#[command(about = "Finds broken browser bookmarks", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be checked without probing anything
    #[arg(long, conflicts_with_all = ["stats", "export_csv", "export_summary", "delete"])]
    dry_run: bool,

    /// Show statistics for the latest stored run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_csv", "export_summary", "delete"])]
    stats: bool,

    /// Write the broken bookmarks of the latest run as CSV and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "export_summary", "delete"])]
    export_csv: bool,

    /// Generate markdown summary of the latest run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "export_csv", "delete"])]
    export_summary: bool,

    /// Delete bookmarks by id (chrome format only)
    #[arg(long, value_name = "ID", num_args = 1..)]
    delete: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).context("invalid configuration");
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_csv {
        handle_export_csv(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else if !cli.delete.is_empty() {
        handle_delete(&config, &cli.delete)?;
    } else {
        handle_scan(config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bookmark_audit=info,warn"),
            1 => EnvFilter::new("bookmark_audit=debug,info"),
            2 => EnvFilter::new("bookmark_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_database(config: &Config) -> anyhow::Result<SqliteStorage> {
    SqliteStorage::new(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open database {}", config.output.database_path))
}

/// Handles the --dry-run mode: validates config and counts probeable bookmarks
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Bookmark-Audit Dry Run ===\n");

    println!("Scanner Configuration:");
    println!("  Concurrency: {}", config.scanner.concurrency);
    println!("  Timeout: {}ms", config.scanner.timeout_ms);
    println!("  GET retries: {}", config.scanner.retries);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nBookmarks:");
    println!("  File: {}", config.bookmarks.path);
    println!("  Format: {:?}", config.bookmarks.format);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  CSV: {}", config.output.csv_path);
    println!("  Summary: {}", config.output.summary_path);

    let targets = open_source(&config.bookmarks)
        .load()
        .with_context(|| format!("failed to read bookmarks from {}", config.bookmarks.path))?;
    let probeable = targets.iter().filter(|t| is_probeable(&t.url)).count();

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would check {} of {} bookmarks ({} skipped: not http/https)",
        probeable,
        targets.len(),
        targets.len() - probeable
    );

    Ok(())
}

/// Handles the --stats mode: shows statistics for the latest run
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_database(config)?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-csv mode: writes broken bookmarks of the latest run
fn handle_export_csv(config: &Config) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    let (run, report) = load_latest_report(&storage)?;

    write_broken_csv(&report.broken, Path::new(&config.output.csv_path))?;

    println!(
        "✓ {} broken bookmarks from run {} exported to: {}",
        report.broken.len(),
        run.id,
        config.output.csv_path
    );
    Ok(())
}

/// Handles the --export-summary mode: generates markdown summary
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    println!("=== Exporting Audit Summary ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let storage = open_database(config)?;

    tracing::info!("Loading audit data from database...");
    let summary = generate_summary(&storage)?;

    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summary, Path::new(&config.output.summary_path))?;

    println!("✓ Summary exported to: {}", config.output.summary_path);
    Ok(())
}

/// Handles the --delete mode: removes bookmarks and prunes the stored report
fn handle_delete(config: &Config, ids: &[String]) -> anyhow::Result<()> {
    let mut store = open_store(&config.bookmarks)?;
    let results = delete_bookmarks(store.as_mut(), ids);

    let deleted: Vec<String> = results
        .iter()
        .filter(|r| r.succeeded)
        .map(|r| r.id.clone())
        .collect();

    for result in &results {
        match &result.error {
            None => println!("✓ Deleted {}", result.id),
            Some(error) => println!("✗ {}: {}", result.id, error),
        }
    }
    println!("\n{} of {} bookmarks deleted", deleted.len(), ids.len());

    if deleted.is_empty() {
        return Ok(());
    }

    let mut storage = open_database(config)?;
    if let Some(run) = storage.get_latest_run()? {
        let removed = storage.remove_results(run.id, &deleted)?;
        tracing::info!("Pruned {} results from run {}", removed, run.id);
    }

    Ok(())
}

/// Handles the main scan operation
async fn handle_scan(config: Config, config_hash: &str) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, cancelling scan");
                cancel.cancel();
            }
        });
    }

    let csv_path = PathBuf::from(&config.output.csv_path);
    let summary_path = PathBuf::from(&config.output.summary_path);
    let database_path = config.output.database_path.clone();

    let outcome = match run_audit(config, config_hash, cancel).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Scan failed: {}", e);
            return Err(e.into());
        }
    };

    print_statistics(&ScanStatistics::from_report(&outcome.report));
    if outcome.report.cancelled {
        println!("\nScan was interrupted; unchecked bookmarks are listed as cancelled.");
    }

    write_broken_csv(&outcome.report.broken, &csv_path)?;
    println!("\n✓ Broken bookmarks written to: {}", csv_path.display());

    let storage = SqliteStorage::new(Path::new(&database_path))?;
    let summary = generate_summary(&storage)?;
    generate_markdown_summary(&summary, &summary_path)?;
    println!("✓ Summary written to: {}", summary_path.display());

    Ok(())
}
