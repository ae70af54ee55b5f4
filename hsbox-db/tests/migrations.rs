use hsbox_db::migrations::{apply_plan, compute_plan, upgrade, SCHEMA_VERSION};
use hsbox_db::{meta, DbError};
use rusqlite::Connection;
use serde_json::json;

/// A database as version 1 of the application created it: no notes
/// column, no steamids table, loosely typed mtime.
fn v1_database() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE meta (key TEXT PRIMARY KEY, value TEXT NOT NULL);
         CREATE TABLE demos (
             demoid TEXT PRIMARY KEY,
             timestamp INTEGER NOT NULL,
             mtime,
             map TEXT NOT NULL,
             data_version INTEGER NOT NULL,
             data TEXT NOT NULL
         );
         INSERT INTO meta (key, value) VALUES ('schema_version', '1');
         INSERT INTO meta (key, value) VALUES ('config', '{}');",
    )
    .unwrap();
    conn
}

fn insert_demo(conn: &Connection, demoid: &str, mtime: i64, data: &serde_json::Value) {
    conn.execute(
        "INSERT INTO demos (demoid, timestamp, mtime, map, data_version, data)
         VALUES (?1, 1400000000, ?2, 'de_dust2', 1, ?3)",
        rusqlite::params![demoid, mtime, serde_json::to_string(data).unwrap()],
    )
    .unwrap();
}

fn complete_payload() -> serde_json::Value {
    json!({
        "players": {"76561198000000001": {"kills": 20}},
        "score": [16, 7],
        "surrendered": false,
        "rounds": [{"tick_end": 9000}]
    })
}

fn half_parsed_payload() -> serde_json::Value {
    json!({
        "players": {},
        "score": [3, 1],
        "rounds": []
    })
}

#[test]
fn plan_is_empty_when_versions_match() {
    let plan = compute_plan(SCHEMA_VERSION, SCHEMA_VERSION).unwrap();
    assert!(plan.is_empty());
}

#[test]
fn plan_reaches_target_from_every_supported_version() {
    for current in [1, 2, 3] {
        let plan = compute_plan(current, SCHEMA_VERSION).unwrap();
        let end = plan.last().map(|m| m.to).unwrap_or(current);
        assert_eq!(end, SCHEMA_VERSION, "from version {current}");
        // Chain is contiguous
        let mut version = current;
        for step in &plan {
            assert_eq!(step.from, version);
            version = step.to;
        }
    }
}

#[test]
fn missing_step_is_fatal() {
    let err = compute_plan(0, SCHEMA_VERSION).unwrap_err();
    assert!(matches!(err, DbError::NoMigrationPath { from: 0 }));
}

#[test]
fn newer_database_is_rejected() {
    let err = compute_plan(SCHEMA_VERSION + 1, SCHEMA_VERSION).unwrap_err();
    assert!(matches!(err, DbError::SchemaTooNew { .. }));
}

#[test]
fn full_upgrade_from_v1() {
    let mut conn = v1_database();
    insert_demo(&conn, "good.dem", 1400000100, &complete_payload());
    insert_demo(&conn, "broken.dem", 1400000200, &half_parsed_payload());

    upgrade(&mut conn).unwrap();

    let version: i64 = meta::get(&conn, "schema_version").unwrap();
    assert_eq!(version, SCHEMA_VERSION);

    // Structural additions from v2
    let steamids_exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='steamids')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(steamids_exists);
    hsbox_db::demos::set_notes(&conn, "good.dem", "nice ace in round 7").unwrap();

    // Half-parsed demo flagged for rescan; intact demo untouched
    let broken_mtime: i64 = conn
        .query_row(
            "SELECT mtime FROM demos WHERE demoid = 'broken.dem'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(broken_mtime, 0);
    let good_mtime: i64 = conn
        .query_row(
            "SELECT mtime FROM demos WHERE demoid = 'good.dem'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(good_mtime, 1400000100);
}

#[test]
fn upgrade_normalizes_text_mtime() {
    let mut conn = v1_database();
    insert_demo(&conn, "good.dem", 0, &complete_payload());
    // Older writers stored mtime as text
    conn.execute(
        "UPDATE demos SET mtime = ?1 WHERE demoid = 'good.dem'",
        ["1425000000"],
    )
    .unwrap();
    let stored_type: String = conn
        .query_row("SELECT typeof(mtime) FROM demos", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored_type, "text");

    upgrade(&mut conn).unwrap();

    let (stored_type, mtime): (String, i64) = conn
        .query_row("SELECT typeof(mtime), mtime FROM demos", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(stored_type, "integer");
    assert_eq!(mtime, 1425000000);
}

#[test]
fn interrupted_upgrade_resumes_from_checkpoint() {
    let mut conn = v1_database();
    insert_demo(&conn, "good.dem", 1400000100, &complete_payload());

    // Apply only the first step, as if the process died afterwards
    let plan = compute_plan(1, SCHEMA_VERSION).unwrap();
    apply_plan(&mut conn, &plan[..1]).unwrap();
    let version: i64 = meta::get(&conn, "schema_version").unwrap();
    assert_eq!(version, 2);

    // Next startup picks up from the recorded checkpoint
    upgrade(&mut conn).unwrap();
    let version: i64 = meta::get(&conn, "schema_version").unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[test]
fn failed_step_leaves_version_untouched() {
    let mut conn = v1_database();
    conn.execute(
        "INSERT INTO demos (demoid, timestamp, mtime, map, data_version, data)
         VALUES ('corrupt.dem', 1400000000, 10, 'de_nuke', 1, '{not json')",
        [],
    )
    .unwrap();

    assert!(upgrade(&mut conn).is_err());
    let version: i64 = meta::get(&conn, "schema_version").unwrap();
    assert_eq!(version, 1);
}
