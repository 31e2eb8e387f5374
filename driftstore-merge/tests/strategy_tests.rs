use std::collections::BTreeMap;

use driftstore_merge::{
    strategy_named, LatestAttribute, LatestObject, Max, MergeError, MergeStrategy,
};
use driftstore_types::{Key, NanoTime, RawState, Version, VersionHash};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn version(committed: i64, attrs: &[(&str, Value, Option<i64>)]) -> Version {
    let mut attributes = BTreeMap::new();
    for (name, value, updated) in attrs {
        attributes.insert(
            name.to_string(),
            RawState {
                value: value.clone(),
                updated: updated.map(NanoTime::from_nanos),
            },
        );
    }
    Version::new(
        Key::new("/Person/X"),
        "Person",
        VersionHash::digest(committed.to_string().as_bytes()),
        VersionHash::BLANK,
        NanoTime::from_nanos(committed),
        NanoTime::from_nanos(committed),
        attributes,
    )
    .unwrap()
}

// ── LatestObject ─────────────────────────────────────────────────

#[test]
fn latest_object_newer_remote_wins() {
    let local = version(100, &[("first", json!("a"), None)]);
    let remote = version(200, &[("first", json!("b"), None)]);
    let picked = LatestObject.merge("first", &local, &remote).unwrap();
    assert_eq!(picked.value, json!("b"));
}

#[test]
fn latest_object_older_remote_loses() {
    let local = version(200, &[("first", json!("a"), None)]);
    let remote = version(100, &[("first", json!("b"), None)]);
    assert!(LatestObject.merge("first", &local, &remote).is_none());
}

#[test]
fn latest_object_tie_keeps_local() {
    let local = version(100, &[("first", json!("a"), None)]);
    let remote = version(100, &[("first", json!("b"), None)]);
    assert!(LatestObject.merge("first", &local, &remote).is_none());
}

#[test]
fn latest_object_missing_remote_attribute_keeps_local() {
    let local = version(100, &[("first", json!("a"), None)]);
    let remote = version(200, &[]);
    assert!(LatestObject.merge("first", &local, &remote).is_none());
}

#[test]
fn latest_object_stores_no_state() {
    assert!(!LatestObject.requires_state());
    let mut raw = RawState::new(json!("x"));
    LatestObject.on_set(&mut raw, false);
    assert!(raw.updated.is_none());
}

// ── LatestAttribute ──────────────────────────────────────────────

#[test]
fn latest_attribute_stamps_on_set() {
    assert!(LatestAttribute.requires_state());
    let mut raw = RawState::new(json!("x"));
    LatestAttribute.on_set(&mut raw, false);
    assert!(raw.updated.unwrap() > NanoTime::ZERO);
}

#[test]
fn latest_attribute_default_init_stamps_zero() {
    let mut raw = RawState::new(json!("x"));
    LatestAttribute.on_set(&mut raw, true);
    assert_eq!(raw.updated, Some(NanoTime::ZERO));
}

#[test]
fn latest_attribute_no_stamps_keeps_local() {
    let local = version(100, &[("age", json!(1), None)]);
    let remote = version(200, &[("age", json!(2), None)]);
    assert!(LatestAttribute.merge("age", &local, &remote).is_none());
}

#[test]
fn latest_attribute_remote_only_stamp_adopts_remote() {
    let local = version(100, &[("age", json!(1), None)]);
    let remote = version(200, &[("age", json!(2), Some(50))]);
    let picked = LatestAttribute.merge("age", &local, &remote).unwrap();
    assert_eq!(picked.value, json!(2));
    assert_eq!(picked.updated, Some(NanoTime::from_nanos(50)));
}

#[test]
fn latest_attribute_higher_stamp_wins() {
    let local = version(100, &[("age", json!(1), Some(60))]);
    let remote = version(200, &[("age", json!(2), Some(70))]);
    let picked = LatestAttribute.merge("age", &local, &remote).unwrap();
    assert_eq!(picked.value, json!(2));
}

#[test]
fn latest_attribute_lower_or_equal_stamp_keeps_local() {
    let local = version(100, &[("age", json!(1), Some(70))]);
    let older = version(200, &[("age", json!(2), Some(60))]);
    let tied = version(200, &[("age", json!(2), Some(70))]);
    assert!(LatestAttribute.merge("age", &local, &older).is_none());
    assert!(LatestAttribute.merge("age", &local, &tied).is_none());
}

#[test]
fn latest_attribute_missing_remote_stamp_keeps_local() {
    // remote carries the attribute but no stamp
    let local = version(100, &[("age", json!(1), Some(70))]);
    let remote = version(200, &[("age", json!(2), None)]);
    assert!(LatestAttribute.merge("age", &local, &remote).is_none());
}

// ── Max ──────────────────────────────────────────────────────────

#[test]
fn max_greater_remote_wins() {
    let local = version(200, &[("age", json!(10), None)]);
    let remote = version(100, &[("age", json!(20), None)]);
    let picked = Max.merge("age", &local, &remote).unwrap();
    assert_eq!(picked.value, json!(20));
}

#[test]
fn max_lesser_remote_loses() {
    let local = version(100, &[("age", json!(20), None)]);
    let remote = version(200, &[("age", json!(10), None)]);
    assert!(Max.merge("age", &local, &remote).is_none());
}

#[test]
fn max_tie_keeps_local() {
    let local = version(100, &[("age", json!(10), None)]);
    let remote = version(200, &[("age", json!(10), None)]);
    assert!(Max.merge("age", &local, &remote).is_none());
}

#[test]
fn max_compares_strings_too() {
    let local = version(100, &[("name", json!("alpha"), None)]);
    let remote = version(200, &[("name", json!("beta"), None)]);
    let picked = Max.merge("name", &local, &remote).unwrap();
    assert_eq!(picked.value, json!("beta"));
}

#[test]
fn max_incomparable_values_keep_local() {
    let local = version(100, &[("age", json!(10), None)]);
    let remote = version(200, &[("age", json!("ten"), None)]);
    assert!(Max.merge("age", &local, &remote).is_none());
}

// ── Registry ─────────────────────────────────────────────────────

#[test]
fn builtin_strategies_resolve_by_name() {
    assert_eq!(strategy_named("latest-object").unwrap().name(), "latest-object");
    assert_eq!(
        strategy_named("latest-attribute").unwrap().name(),
        "latest-attribute"
    );
    assert_eq!(strategy_named("max").unwrap().name(), "max");
}

#[test]
fn unknown_strategy_name_is_invalid() {
    let err = strategy_named("does-not-exist").err().unwrap();
    assert!(matches!(err, MergeError::InvalidStrategyType(_)));
}
