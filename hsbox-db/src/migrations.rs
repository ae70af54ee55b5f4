//! Versioned schema migrations.
//!
//! A static chain of steps carries any historical database forward to
//! [`SCHEMA_VERSION`]. Each step commits its own version bump, so an
//! interrupted upgrade resumes from the last completed step on the next
//! startup.

use rusqlite::{Connection, Transaction};

use hsbox_core::demo;

use crate::error::DbError;
use crate::meta;

/// Schema version this build writes and expects.
pub const SCHEMA_VERSION: i64 = 3;

/// A single step in the migration chain.
#[derive(Debug)]
pub struct Migration {
    pub from: i64,
    pub to: i64,
    /// Structural phase run outside the step transaction (DDL that cannot
    /// run inside it). Must be safe to re-attempt if the step's commit
    /// never happened.
    prep: Option<fn(&Connection) -> Result<(), DbError>>,
    /// Data phase run inside the step transaction, committed together
    /// with the version bump.
    run: fn(&Transaction) -> Result<(), DbError>,
}

/// Every supported version transition, oldest first.
pub static MIGRATIONS: &[Migration] = &[
    Migration {
        from: 1,
        to: 2,
        prep: Some(prep_v1_to_v2),
        run: run_v1_to_v2,
    },
    Migration {
        from: 2,
        to: 3,
        prep: None,
        run: run_v2_to_v3,
    },
];

/// Compute the ordered list of steps taking `current` to `target`.
///
/// Empty iff the versions already match. A gap in the chain is a build
/// defect, not a user error, and aborts startup.
pub fn compute_plan(current: i64, target: i64) -> Result<Vec<&'static Migration>, DbError> {
    if current > target {
        return Err(DbError::SchemaTooNew {
            found: current,
            supported: target,
        });
    }
    let mut plan = Vec::new();
    let mut version = current;
    while version < target {
        let step = MIGRATIONS
            .iter()
            .find(|m| m.from == version)
            .ok_or(DbError::NoMigrationPath { from: version })?;
        plan.push(step);
        version = step.to;
    }
    Ok(plan)
}

/// Bring the database up to [`SCHEMA_VERSION`].
pub fn upgrade(conn: &mut Connection) -> Result<(), DbError> {
    let current: i64 = meta::get(conn, "schema_version")?;
    let plan = compute_plan(current, SCHEMA_VERSION)?;
    apply_plan(conn, &plan)
}

/// Apply migration steps in order.
///
/// A failed step rolls back entirely and leaves the recorded version at
/// the last committed value; earlier steps stay applied.
pub fn apply_plan(conn: &mut Connection, plan: &[&Migration]) -> Result<(), DbError> {
    for step in plan {
        log::info!("Migrating schema v{} -> v{}", step.from, step.to);
        if let Some(prep) = step.prep {
            prep(conn)?;
        }
        let tx = conn.transaction()?;
        (step.run)(&tx)?;
        meta::put(&tx, "schema_version", &step.to)?;
        tx.commit()?;
    }
    Ok(())
}

// ── v1 -> v2 ────────────────────────────────────────────────────────────────

/// Structural phase: the demo notes column and the steamid cache table.
fn prep_v1_to_v2(conn: &Connection) -> Result<(), DbError> {
    if !has_column(conn, "demos", "notes")? {
        conn.execute_batch("ALTER TABLE demos ADD COLUMN notes TEXT;")?;
    }
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS steamids (
            steamid INTEGER NOT NULL,
            timestamp INTEGER NOT NULL,
            data TEXT NOT NULL
        );",
    )?;
    Ok(())
}

/// Data phase: zero the mtime of half-parsed demos so the scanner treats
/// them as stale and reprocesses them. Re-parsing is the scanner's job,
/// never the migration's.
fn run_v1_to_v2(tx: &Transaction) -> Result<(), DbError> {
    let mut stmt = tx.prepare("SELECT demoid, data_version, data FROM demos")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut flagged = 0usize;
    for row in rows {
        let (demoid, data_version, raw) = row?;
        let data = demo::decode_demo_data(data_version, &raw)?;
        if demo::half_parsed(&data) {
            tx.execute("UPDATE demos SET mtime = 0 WHERE demoid = ?1", [&demoid])?;
            flagged += 1;
        }
    }
    if flagged > 0 {
        log::info!("Flagged {flagged} half-parsed demos for rescan");
    }
    Ok(())
}

// ── v2 -> v3 ────────────────────────────────────────────────────────────────

/// Older writers stored `mtime` as TEXT; rewrite every value as an
/// integer. Unreadable values become 0, which forces a rescan.
fn run_v2_to_v3(tx: &Transaction) -> Result<(), DbError> {
    let mut stmt = tx.prepare("SELECT demoid, mtime FROM demos")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, rusqlite::types::Value>(1)?,
        ))
    })?;

    for row in rows {
        let (demoid, mtime) = row?;
        let normalized: i64 = match mtime {
            rusqlite::types::Value::Integer(n) => n,
            rusqlite::types::Value::Real(f) => f as i64,
            rusqlite::types::Value::Text(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        };
        tx.execute(
            "UPDATE demos SET mtime = ?1 WHERE demoid = ?2",
            rusqlite::params![normalized, demoid],
        )?;
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, DbError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
