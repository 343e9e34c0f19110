//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Bookmark-Audit database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track scan runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    total INTEGER NOT NULL DEFAULT 0
);

-- One row per probed bookmark, in completion order
CREATE TABLE IF NOT EXISTS results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    bookmark_id TEXT NOT NULL,
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    folder TEXT NOT NULL,
    status INTEGER NOT NULL,
    ok INTEGER NOT NULL,
    final_url TEXT NOT NULL,
    error TEXT,
    broken INTEGER NOT NULL,
    UNIQUE(run_id, position)
);

CREATE INDEX IF NOT EXISTS idx_results_run ON results(run_id);
CREATE INDEX IF NOT EXISTS idx_results_bookmark ON results(bookmark_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
