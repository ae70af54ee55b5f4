//! Demo payload types and the versioned payload decoder.
//!
//! A demo row stores its JSON payload next to a `data_version` column;
//! the payload shape has changed over time, so reads go through
//! [`decode_demo_data`], which upgrades older shapes before typing them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current version of the JSON payload shape. Independent of the SQL
/// schema version; a stored record with an older value is stale and gets
/// re-parsed by the scanner on its next pass.
pub const DATA_VERSION: i64 = 2;

/// Score a team must reach for a map to count as played out.
pub const END_OF_MAP_SCORE: i64 = 15;

/// Parsed demo payload as stored in the `data` column.
///
/// `players` is keyed by 64-bit steam id. JSON objects can only carry
/// string keys, so serde stringifies the ids on write and parses them
/// back on read; callers always see integer keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemoData {
    #[serde(default)]
    pub players: BTreeMap<u64, Value>,
    #[serde(default)]
    pub scores: Vec<i64>,
    #[serde(default)]
    pub surrendered: bool,
    #[serde(default)]
    pub rounds: Vec<Round>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A single round within a demo payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Round {
    #[serde(default)]
    pub tick_end: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Decode a stored payload, upgrading older shapes to the current one.
pub fn decode_demo_data(data_version: i64, raw: &str) -> Result<DemoData, serde_json::Error> {
    let mut value: Value = serde_json::from_str(raw)?;
    let mut version = data_version;
    while version < DATA_VERSION {
        upgrade(&mut value, version);
        version += 1;
    }
    serde_json::from_value(value)
}

/// One shape upgrade per version transition.
fn upgrade(value: &mut Value, from: i64) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };
    match from {
        // v1 kept the team scores under a singular "score" key
        1 => {
            if let Some(scores) = obj.remove("score") {
                obj.entry("scores").or_insert(scores);
            }
        }
        _ => {}
    }
}

/// Heuristic for payloads that were only partially extracted from their
/// source file: no players, a scoreboard without exactly two entries, a
/// round with no recorded end tick, or a match that neither reached the
/// end-of-map score nor ended in surrender.
pub fn half_parsed(data: &DemoData) -> bool {
    if data.players.is_empty() || data.scores.len() != 2 {
        return true;
    }
    if data.rounds.iter().any(|r| r.tick_end.is_none()) {
        return true;
    }
    let max_score = data.scores.iter().copied().max().unwrap_or(0);
    max_score < END_OF_MAP_SCORE && !data.surrendered
}
