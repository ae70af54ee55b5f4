//! CRUD operations for demo records.
//!
//! The scanner drives these: it asks [`is_fresh`] before re-parsing a
//! file, hands parsed payloads to [`upsert`], and prunes records for
//! files that disappeared with [`keep_only`].

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use hsbox_core::demo::{self, DemoData, DATA_VERSION};

use crate::error::DbError;

/// A stored demo record with its payload decoded.
#[derive(Debug, Clone)]
pub struct Demo {
    pub demoid: String,
    pub timestamp: i64,
    pub mtime: i64,
    pub map: String,
    pub data_version: i64,
    pub data: DemoData,
    pub notes: Option<String>,
}

/// Return every demo record, newest first, with payloads decoded and
/// player maps keyed by integer steam id.
pub fn get_all(conn: &Connection) -> Result<Vec<Demo>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT demoid, timestamp, mtime, map, data_version, data, notes
         FROM demos ORDER BY timestamp DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, Option<String>>(6)?,
        ))
    })?;

    let mut demos = Vec::new();
    for row in rows {
        let (demoid, timestamp, mtime, map, data_version, raw, notes) = row?;
        let data = demo::decode_demo_data(data_version, &raw)?;
        demos.push(Demo {
            demoid,
            timestamp,
            mtime,
            map,
            data_version,
            data,
            notes,
        });
    }
    Ok(demos)
}

/// Stored payload format version for a demo, if present.
pub fn get_data_version(conn: &Connection, demoid: &str) -> Result<Option<i64>, DbError> {
    conn.query_row(
        "SELECT data_version FROM demos WHERE demoid = ?1",
        params![demoid],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

/// Source-file mtime recorded at the last successful parse, if present.
pub fn get_mtime(conn: &Connection, demoid: &str) -> Result<Option<i64>, DbError> {
    conn.query_row(
        "SELECT mtime FROM demos WHERE demoid = ?1",
        params![demoid],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

/// Freshness oracle used by the scanner: a record is fresh iff its
/// payload is at the current format version and the source file has not
/// been modified since the last parse. A missing record is never fresh.
pub fn is_fresh(conn: &Connection, demoid: &str, observed_mtime: i64) -> Result<bool, DbError> {
    let row = conn
        .query_row(
            "SELECT data_version, mtime FROM demos WHERE demoid = ?1",
            params![demoid],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )
        .optional()?;
    Ok(match row {
        Some((data_version, mtime)) => data_version == DATA_VERSION && observed_mtime <= mtime,
        None => false,
    })
}

/// Insert a newly parsed demo, or overwrite a stale record.
///
/// Fresh records are never clobbered. Returns whether a write happened.
pub fn upsert(
    conn: &mut Connection,
    demoid: &str,
    timestamp: i64,
    mtime: i64,
    map: &str,
    data: &DemoData,
) -> Result<bool, DbError> {
    let raw = serde_json::to_string(data)?;
    let tx = conn.transaction()?;
    let existing = tx
        .query_row(
            "SELECT data_version, mtime FROM demos WHERE demoid = ?1",
            params![demoid],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )
        .optional()?;

    let written = match existing {
        None => {
            tx.execute(
                "INSERT INTO demos (demoid, timestamp, mtime, map, data_version, data)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![demoid, timestamp, mtime, map, DATA_VERSION, raw],
            )?;
            true
        }
        Some((stored_version, stored_mtime))
            if stored_version != DATA_VERSION || mtime > stored_mtime =>
        {
            tx.execute(
                "UPDATE demos SET timestamp = ?2, mtime = ?3, map = ?4,
                     data_version = ?5, data = ?6
                 WHERE demoid = ?1",
                params![demoid, timestamp, mtime, map, DATA_VERSION, raw],
            )?;
            true
        }
        Some(_) => false,
    };
    tx.commit()?;
    Ok(written)
}

/// Delete a demo record.
pub fn delete(conn: &Connection, demoid: &str) -> Result<(), DbError> {
    conn.execute("DELETE FROM demos WHERE demoid = ?1", params![demoid])?;
    Ok(())
}

/// Prune every record whose id is not in `keep`. An empty set deletes
/// nothing — a scan that found no files must not wipe the library.
pub fn keep_only(conn: &Connection, keep: &[&str]) -> Result<usize, DbError> {
    if keep.is_empty() {
        return Ok(0);
    }
    let placeholders = vec!["?"; keep.len()].join(", ");
    let sql = format!("DELETE FROM demos WHERE demoid NOT IN ({placeholders})");
    let deleted = conn.execute(&sql, params_from_iter(keep.iter().copied()))?;
    if deleted > 0 {
        log::debug!("Pruned {deleted} demos no longer on disk");
    }
    Ok(deleted)
}

/// Free-text notes for a demo, if any.
pub fn get_notes(conn: &Connection, demoid: &str) -> Result<Option<String>, DbError> {
    let notes = conn
        .query_row(
            "SELECT notes FROM demos WHERE demoid = ?1",
            params![demoid],
            |row| row.get::<_, Option<String>>(0),
        )
        .optional()?;
    Ok(notes.flatten())
}

/// Set the free-text notes for a demo.
pub fn set_notes(conn: &Connection, demoid: &str, notes: &str) -> Result<(), DbError> {
    let changed = conn.execute(
        "UPDATE demos SET notes = ?2 WHERE demoid = ?1",
        params![demoid, notes],
    )?;
    if changed == 0 {
        return Err(DbError::DemoNotFound {
            demoid: demoid.to_string(),
        });
    }
    Ok(())
}
