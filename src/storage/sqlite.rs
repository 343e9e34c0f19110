//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::scanner::{partition, ScanReport, ScanResult};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, total";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Failed),
        total: row.get(5)?,
    })
}

fn result_from_row(row: &Row<'_>) -> rusqlite::Result<ScanResult> {
    Ok(ScanResult {
        id: row.get(0)?,
        title: row.get(1)?,
        url: row.get(2)?,
        folder: row.get(3)?,
        status: row.get(4)?,
        ok: row.get(5)?,
        final_url: row.get(6)?,
        error: row.get(7)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1 WHERE id = ?2",
            params![status.to_db_string(), run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn count_runs(&self) -> StorageResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count)
    }

    // ===== Reports =====

    fn save_report(&mut self, run_id: i64, report: &ScanReport) -> StorageResult<()> {
        // Make sure the run exists before touching its results
        self.get_run(run_id)?;

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM results WHERE run_id = ?1", params![run_id])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO results (run_id, position, bookmark_id, title, url, folder,
                 status, ok, final_url, error, broken)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for (position, result) in report.results.iter().enumerate() {
                stmt.execute(params![
                    run_id,
                    position as i64,
                    result.id,
                    result.title,
                    result.url,
                    result.folder,
                    result.status,
                    result.ok,
                    result.final_url,
                    result.error,
                    result.is_broken(),
                ])?;
            }
        }
        tx.execute(
            "UPDATE runs SET total = ?1 WHERE id = ?2",
            params![report.total as i64, run_id],
        )?;
        tx.commit()?;

        tracing::debug!("Saved {} results for run {}", report.total, run_id);
        Ok(())
    }

    fn load_report(&self, run_id: i64) -> StorageResult<ScanReport> {
        self.get_run(run_id)?;

        let mut stmt = self.conn.prepare(
            "SELECT bookmark_id, title, url, folder, status, ok, final_url, error
             FROM results WHERE run_id = ?1 ORDER BY position",
        )?;
        let results = stmt
            .query_map(params![run_id], result_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(partition(results))
    }

    fn remove_results(&mut self, run_id: i64, bookmark_ids: &[String]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut removed = 0;
        {
            let mut stmt =
                tx.prepare("DELETE FROM results WHERE run_id = ?1 AND bookmark_id = ?2")?;
            for id in bookmark_ids {
                removed += stmt.execute(params![run_id, id])?;
            }
        }
        tx.execute(
            "UPDATE runs SET total = (SELECT COUNT(*) FROM results WHERE run_id = ?1) WHERE id = ?1",
            params![run_id],
        )?;
        tx.commit()?;
        Ok(removed)
    }
}
