//! Small JSON-encoded key/value entries in the `meta` table.
//!
//! Holds the recorded schema version and the user config object. Keys
//! are well-known; asking for a key that was never written is a caller
//! error, not a defined state.

use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use hsbox_core::Config;

use crate::error::DbError;

/// Read and decode a meta value.
pub fn get<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<T, DbError> {
    let result = conn.query_row(
        "SELECT value FROM meta WHERE key = ?1",
        params![key],
        |row| row.get::<_, String>(0),
    );
    match result {
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DbError::MissingMetaKey {
            key: key.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Encode and write a meta value, replacing any previous one.
pub fn put<T: Serialize>(conn: &Connection, key: &str, value: &T) -> Result<(), DbError> {
    let raw = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO meta (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, raw],
    )?;
    Ok(())
}

/// Load the user config object.
pub fn get_config(conn: &Connection) -> Result<Config, DbError> {
    get(conn, "config")
}

/// Replace the user config object.
pub fn set_config(conn: &Connection, config: &Config) -> Result<(), DbError> {
    put(conn, "config", config)
}

/// Shallow-merge a partial object into the stored config: keys present
/// in `partial` overwrite, everything else is preserved. Read and write
/// happen in one transaction.
pub fn merge_update_config(
    conn: &mut Connection,
    partial: &serde_json::Map<String, Value>,
) -> Result<Config, DbError> {
    let tx = conn.transaction()?;
    let mut merged: serde_json::Map<String, Value> = get(&tx, "config")?;
    for (key, value) in partial {
        merged.insert(key.clone(), value.clone());
    }
    put(&tx, "config", &merged)?;
    tx.commit()?;
    Ok(serde_json::from_value(Value::Object(merged))?)
}
