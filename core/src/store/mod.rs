//! SQLite output sink.
//!
//! RULE: Only the store talks to the database.
//! Stages never touch it; the engine hands it finished tables.

use crate::{error::GenResult, event::EventLogEntry};
use rusqlite::{params, Connection};

mod entities;
mod giving;

/// Output tables, in the order they are written.
pub const OUTPUT_TABLES: [&str; 11] = [
    "fund",
    "constituent",
    "donor_segment",
    "household_member",
    "campaign",
    "campaign_fund",
    "appeal",
    "gift_transaction",
    "pledge",
    "pledge_payment",
    "donor_metrics",
];

pub struct DatasetStore {
    conn: Connection,
}

impl DatasetStore {
    /// Open (or create) the output database at `path`.
    pub fn open(path: &str) -> GenResult<Self> {
        let conn = Connection::open(path)?;
        // WAL only matters for real files.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GenResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GenResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_dataset.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    /// `started_at` is a Unix timestamp in seconds.
    pub fn insert_run(
        &self,
        run_id: &str,
        seed: u64,
        version: &str,
        started_at: i64,
    ) -> GenResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, seed as i64, version, started_at],
        )?;
        Ok(())
    }

    pub fn run_started_at(&self, run_id: &str) -> GenResult<i64> {
        let started_at = self.conn.query_row(
            "SELECT started_at FROM run WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(started_at)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> GenResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, seq, stage, event_type, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.run_id,
                entry.seq as i64,
                entry.stage,
                entry.event_type,
                entry.payload,
            ],
        )?;
        Ok(())
    }

    pub fn events_for_run(&self, run_id: &str) -> GenResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, seq, stage, event_type, payload
             FROM event_log WHERE run_id = ?1
             ORDER BY seq ASC, id ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    run_id: row.get(1)?,
                    seq: row.get::<_, i64>(2)? as u64,
                    stage: row.get(3)?,
                    event_type: row.get(4)?,
                    payload: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // ── Verification ───────────────────────────────────────────

    /// Rows written for `run_id` into one of `OUTPUT_TABLES`.
    /// Any other name is rejected rather than interpolated into SQL.
    pub fn table_row_count(&self, run_id: &str, table: &str) -> GenResult<usize> {
        let Some(table) = OUTPUT_TABLES.iter().find(|t| **t == table) else {
            return Err(anyhow::anyhow!("unknown output table '{table}'").into());
        };
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE run_id = ?1"),
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// (table, rows) for every output table of a run.
    pub fn row_counts(&self, run_id: &str) -> GenResult<Vec<(&'static str, usize)>> {
        OUTPUT_TABLES
            .iter()
            .map(|t| Ok((*t, self.table_row_count(run_id, t)?)))
            .collect()
    }
}
