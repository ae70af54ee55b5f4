use std::collections::BTreeMap;

use hsbox_db::{open_memory, steamids};
use serde_json::{json, Value};

fn profiles(entries: &[(u64, &str)]) -> BTreeMap<u64, Value> {
    entries
        .iter()
        .map(|(id, name)| (*id, json!({"personaname": name})))
        .collect()
}

#[test]
fn refresh_then_get() {
    let mut conn = open_memory().unwrap();
    let input = profiles(&[(1001, "alice"), (1002, "bob")]);
    let returned = steamids::refresh(&mut conn, input.clone()).unwrap();
    assert_eq!(returned, input);

    let entries = steamids::get(&conn, &[1001, 1002, 1003]).unwrap();
    assert_eq!(entries.len(), 2);
    let alice = entries.iter().find(|e| e.steamid == 1001).unwrap();
    assert_eq!(alice.data, json!({"personaname": "alice"}));
    assert!(alice.timestamp > 0);
}

#[test]
fn get_with_no_ids_is_empty() {
    let conn = open_memory().unwrap();
    assert!(steamids::get(&conn, &[]).unwrap().is_empty());
}

#[test]
fn refresh_touches_exactly_its_batch() {
    let mut conn = open_memory().unwrap();
    steamids::refresh(&mut conn, profiles(&[(1001, "alice"), (1002, "bob")])).unwrap();

    // Refresh a different batch overlapping on 1002
    steamids::refresh(&mut conn, profiles(&[(1002, "bobby"), (1003, "carol")])).unwrap();

    let entries = steamids::get(&conn, &[1001, 1002, 1003]).unwrap();
    assert_eq!(entries.len(), 3);
    let by_id: BTreeMap<u64, &Value> = entries.iter().map(|e| (e.steamid, &e.data)).collect();
    assert_eq!(by_id[&1001], &json!({"personaname": "alice"}));
    assert_eq!(by_id[&1002], &json!({"personaname": "bobby"}));
    assert_eq!(by_id[&1003], &json!({"personaname": "carol"}));
}

#[test]
fn refresh_replaces_rather_than_duplicates() {
    let mut conn = open_memory().unwrap();
    steamids::refresh(&mut conn, profiles(&[(1001, "alice")])).unwrap();
    steamids::refresh(&mut conn, profiles(&[(1001, "alicia")])).unwrap();

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM steamids WHERE steamid = 1001", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn empty_refresh_is_a_noop() {
    let mut conn = open_memory().unwrap();
    steamids::refresh(&mut conn, BTreeMap::new()).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM steamids", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 0);
}
