//! SQLite schema creation and the database open path.

use std::path::Path;

use rusqlite::Connection;

use hsbox_core::Config;

use crate::error::DbError;
use crate::meta;
use crate::migrations::{self, SCHEMA_VERSION};

/// Create the full current schema and seed the meta entries.
///
/// Fresh databases start at the latest schema version; only pre-existing
/// files go through the migration ladder.
pub fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA_SQL)?;
    meta::put(conn, "schema_version", &SCHEMA_VERSION)?;
    meta::put(conn, "config", &Config::default())?;
    Ok(())
}

/// Open or create the demo database at the given path.
///
/// Creates parent directories on first use, bootstraps the schema when
/// the file does not exist yet, and always runs pending migrations.
pub fn open_database(path: &Path) -> Result<Connection, DbError> {
    let fresh = !path.exists();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    if fresh {
        log::info!("Creating demo database at {}", path.display());
        create_schema(&conn)?;
    }
    migrations::upgrade(&mut conn)?;

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, DbError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

const SCHEMA_SQL: &str = r#"
-- Small JSON-encoded values keyed by name (schema_version, config)
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- One row per parsed demo file
CREATE TABLE IF NOT EXISTS demos (
    demoid TEXT PRIMARY KEY,
    timestamp INTEGER NOT NULL,
    mtime INTEGER NOT NULL,
    map TEXT NOT NULL,
    data_version INTEGER NOT NULL,
    data TEXT NOT NULL,
    notes TEXT
);
CREATE INDEX IF NOT EXISTS idx_demos_timestamp ON demos(timestamp);

-- Cached steam profile blobs
CREATE TABLE IF NOT EXISTS steamids (
    steamid INTEGER NOT NULL,
    timestamp INTEGER NOT NULL,
    data TEXT NOT NULL
);
"#;
