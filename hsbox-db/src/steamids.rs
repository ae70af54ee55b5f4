//! Overwrite-by-key cache of steam profile blobs.
//!
//! Profiles come from the Steam Web API (fetched by a calling layer) and
//! are cached here with a refresh timestamp so the UI can decide when to
//! re-fetch.

use std::collections::BTreeMap;

use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection};
use serde_json::Value;

use crate::error::DbError;

/// A cached profile row.
#[derive(Debug, Clone)]
pub struct SteamIdEntry {
    pub steamid: u64,
    pub timestamp: i64,
    pub data: Value,
}

/// Batched lookup of cached profiles. Ids with no cache entry are simply
/// absent from the result.
pub fn get(conn: &Connection, steamids: &[u64]) -> Result<Vec<SteamIdEntry>, DbError> {
    if steamids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; steamids.len()].join(", ");
    let sql =
        format!("SELECT steamid, timestamp, data FROM steamids WHERE steamid IN ({placeholders})");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params_from_iter(steamids.iter().map(|id| *id as i64)),
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        },
    )?;

    let mut entries = Vec::new();
    for row in rows {
        let (steamid, timestamp, raw) = row?;
        entries.push(SteamIdEntry {
            steamid: steamid as u64,
            timestamp,
            data: serde_json::from_str(&raw)?,
        });
    }
    Ok(entries)
}

/// Replace the cached profiles for exactly the given ids, stamping each
/// entry with the current time. Entries outside the batch are untouched;
/// delete and insert commit as one transaction. Returns the input map
/// back for caller convenience.
pub fn refresh(
    conn: &mut Connection,
    profiles: BTreeMap<u64, Value>,
) -> Result<BTreeMap<u64, Value>, DbError> {
    if profiles.is_empty() {
        return Ok(profiles);
    }
    let now = Utc::now().timestamp();
    let tx = conn.transaction()?;
    {
        let placeholders = vec!["?"; profiles.len()].join(", ");
        let sql = format!("DELETE FROM steamids WHERE steamid IN ({placeholders})");
        tx.execute(&sql, params_from_iter(profiles.keys().map(|id| *id as i64)))?;

        let mut insert =
            tx.prepare("INSERT INTO steamids (steamid, timestamp, data) VALUES (?1, ?2, ?3)")?;
        for (steamid, data) in &profiles {
            insert.execute(params![*steamid as i64, now, serde_json::to_string(data)?])?;
        }
    }
    tx.commit()?;
    Ok(profiles)
}
