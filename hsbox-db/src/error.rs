//! Crate-wide error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Meta key not found: '{key}'")]
    MissingMetaKey { key: String },
    #[error("No migration path from schema version {from}")]
    NoMigrationPath { from: i64 },
    #[error("Database schema version {found} is newer than supported version {supported}")]
    SchemaTooNew { found: i64, supported: i64 },
    #[error("Demo not found: '{demoid}'")]
    DemoNotFound { demoid: String },
}
