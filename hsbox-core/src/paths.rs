//! Config-directory and database-path resolution.
//!
//! The database lives at `<config dir>/hsbox/headshotbox.sqlite`. The
//! `HSBOX_CONFIG_DIR` environment variable overrides the base directory
//! so portable installs and tests can point elsewhere.

use std::path::PathBuf;

/// Environment variable overriding the resolved config directory.
pub const CONFIG_DIR_ENV: &str = "HSBOX_CONFIG_DIR";

/// Resolve the application config directory.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("hsbox")
}

/// Canonical path to the demo database.
pub fn db_path() -> PathBuf {
    config_dir().join("headshotbox.sqlite")
}
