//! Core data model for the hsbox demo library.
//!
//! Demo payload types, the versioned payload decoder, the user config
//! object, and config-directory resolution. No database dependency;
//! persistence lives in `hsbox-db`.

pub mod config;
pub mod demo;
pub mod paths;

pub use config::Config;
pub use demo::{decode_demo_data, half_parsed, DemoData, Round, DATA_VERSION};
pub use paths::{config_dir, db_path};
