//! SQLite persistence layer for the demo library.
//!
//! Provides schema bootstrap, versioned migrations, and CRUD operations
//! for demo records, cached steam identities, and small config values,
//! backed by SQLite (via rusqlite with bundled feature).

pub mod demos;
pub mod error;
pub mod meta;
pub mod migrations;
pub mod schema;
pub mod steamids;

pub use demos::{get_all, get_data_version, get_mtime, is_fresh, keep_only, upsert, Demo};
pub use error::DbError;
pub use meta::{get_config, merge_update_config, set_config};
pub use migrations::{compute_plan, upgrade, SCHEMA_VERSION};
pub use schema::{open_database, open_memory};
pub use steamids::SteamIdEntry;
