//! User configuration stored under the `config` meta key.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// User-facing configuration, persisted as a JSON object in the database.
///
/// Unknown fields are preserved round-trip so older and newer builds can
/// share one database file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steam_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_directory: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
