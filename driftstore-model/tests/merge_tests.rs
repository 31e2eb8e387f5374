use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use driftstore_model::{AttributeDescriptor, Entity, ModelError, ModelSchema};
use driftstore_types::{Key, Version};
use pretty_assertions::assert_eq;
use serde_json::json;

fn person_schema() -> Arc<ModelSchema> {
    ModelSchema::builder("Person")
        .attribute("first", AttributeDescriptor::string().with_default(""))
        .attribute("last", AttributeDescriptor::string().with_default(""))
        .attribute(
            "age",
            AttributeDescriptor::integer()
                .with_default(0)
                .with_strategy_named("max")
                .unwrap(),
        )
        .build()
        .unwrap()
}

// Wall clocks can tie at nanosecond resolution; spread commits out so
// commit-time ordering in these scenarios is strict.
fn tick() {
    sleep(Duration::from_millis(2));
}

// ── Preconditions ────────────────────────────────────────────────

#[test]
fn merge_rejects_dirty_entity() {
    let mut a = Entity::new(person_schema(), "Tesla").unwrap();
    let mut b = Entity::new(person_schema(), "Tesla").unwrap();
    a.commit().unwrap();
    b.commit().unwrap();

    a.set("first", "Nikola").unwrap();
    let err = a.merge(b.version()).unwrap_err();
    assert!(matches!(err, ModelError::DirtyMerge));
}

#[test]
fn merge_rejects_uncommitted_entity() {
    // a rehydrated blank version is the one way to hold a clean entity
    // that was never committed
    let untyped = ModelSchema::builder("").build().unwrap();
    let blank = Version::blank(Key::new("/x"));
    let mut e = Entity::from_version(untyped, blank.clone()).unwrap();
    assert!(!e.is_dirty());
    assert!(!e.is_committed());

    let err = e.merge(&blank).unwrap_err();
    assert!(matches!(err, ModelError::UncommittedMerge));
}

#[test]
fn merge_rejects_type_mismatch() {
    let robot = ModelSchema::builder("Robot")
        .attribute("first", AttributeDescriptor::string().with_default(""))
        .build()
        .unwrap();
    let mut r = Entity::new(robot, "R2").unwrap();
    r.commit().unwrap();

    let mut p = Entity::new(person_schema(), "Tesla").unwrap();
    p.commit().unwrap();

    let err = p.merge(r.version()).unwrap_err();
    assert!(matches!(err, ModelError::TypeMismatch { .. }));
}

#[test]
fn merge_entity_rejects_dirty_other() {
    let mut a = Entity::new(person_schema(), "Tesla").unwrap();
    let mut b = Entity::new(person_schema(), "Tesla").unwrap();
    a.commit().unwrap();
    b.commit().unwrap();
    b.set("first", "Nikola").unwrap();

    let err = a.merge_entity(&b).unwrap_err();
    assert!(matches!(err, ModelError::DirtyMerge));
}

// ── Single merges ────────────────────────────────────────────────

#[test]
fn newer_remote_object_wins() {
    let mut a = Entity::new(person_schema(), "Tesla").unwrap();
    a.set("first", "Nikola").unwrap();
    a.commit().unwrap();

    let mut b = Entity::from_version(person_schema(), a.version().clone()).unwrap();
    tick();
    b.set("first", "Nikolai").unwrap();
    b.commit().unwrap();

    a.merge(b.version()).unwrap();
    assert_eq!(a.get_str("first").unwrap().as_deref(), Some("Nikolai"));
    assert!(!a.is_dirty());
    assert_eq!(a.version().hash(), a.computed_hash());
}

#[test]
fn older_remote_object_loses() {
    let mut a = Entity::new(person_schema(), "Tesla").unwrap();
    a.set("first", "Nikola").unwrap();
    a.commit().unwrap();
    let stale = a.version().clone();

    tick();
    a.set("first", "Nikolai").unwrap();
    a.commit().unwrap();
    let hash = a.version().hash();

    a.merge(&stale).unwrap();
    assert_eq!(a.get_str("first").unwrap().as_deref(), Some("Nikolai"));
    assert_eq!(a.version().hash(), hash);
}

#[test]
fn empty_change_set_leaves_version_untouched() {
    let mut a = Entity::new(person_schema(), "Tesla").unwrap();
    a.commit().unwrap();
    let version = a.version().clone();

    a.merge(&version).unwrap();
    assert_eq!(a.version(), &version);
    assert_eq!(a.version().committed(), version.committed());
}

#[test]
fn max_attribute_resists_newer_but_smaller_value() {
    let mut a = Entity::new(person_schema(), "Tesla").unwrap();
    a.set("age", 52).unwrap();
    a.commit().unwrap();

    let mut b = Entity::from_version(person_schema(), a.version().clone()).unwrap();
    tick();
    b.set("age", 40).unwrap();
    b.commit().unwrap();

    // b committed later, but the max strategy keeps the larger value
    a.merge(b.version()).unwrap();
    assert_eq!(a.get_i64("age").unwrap(), Some(52));
}

// ── Convergence ──────────────────────────────────────────────────

#[test]
fn diverged_replicas_converge_to_equal_hashes() {
    let mut a = Entity::new(person_schema(), "Tesla").unwrap();
    a.set("first", "Nikola").unwrap();
    a.set("age", 52).unwrap();
    a.commit().unwrap();

    // b forks from a's committed state, then both diverge
    let mut b = Entity::from_version(person_schema(), a.version().clone()).unwrap();
    tick();
    b.set("last", "Tesla").unwrap();
    b.set("age", 50).unwrap();
    b.commit().unwrap();

    a.merge(b.version()).unwrap();
    b.merge(a.version()).unwrap();

    assert_eq!(a.get_str("first").unwrap().as_deref(), Some("Nikola"));
    assert_eq!(a.get_str("last").unwrap().as_deref(), Some("Tesla"));
    assert_eq!(a.get_i64("age").unwrap(), Some(52));
    assert_eq!(a.version().hash(), b.version().hash());
    assert_eq!(a, b);
}

#[test]
fn merge_is_idempotent_once_converged() {
    let mut a = Entity::new(person_schema(), "Tesla").unwrap();
    a.set("first", "Nikola").unwrap();
    a.commit().unwrap();

    let mut b = Entity::from_version(person_schema(), a.version().clone()).unwrap();
    tick();
    b.set("last", "Tesla").unwrap();
    b.commit().unwrap();

    a.merge(b.version()).unwrap();
    b.merge(a.version()).unwrap();
    let hash = a.version().hash();

    // further exchanges change nothing
    a.merge(b.version()).unwrap();
    b.merge(a.version()).unwrap();
    assert_eq!(a.version().hash(), hash);
    assert_eq!(b.version().hash(), hash);
}

#[test]
fn independent_writers_converge_without_shared_history() {
    // same key, no common ancestor version
    let mut a = Entity::new(person_schema(), "Tesla").unwrap();
    a.set("age", 10).unwrap();
    a.commit().unwrap();

    tick();
    let mut b = Entity::new(person_schema(), "Tesla").unwrap();
    b.set("age", 20).unwrap();
    b.commit().unwrap();

    a.merge(b.version()).unwrap();
    b.merge(a.version()).unwrap();
    assert_eq!(a.get_i64("age").unwrap(), Some(20));
    assert_eq!(a.version().hash(), b.version().hash());
}

// ── Per-attribute stamps ─────────────────────────────────────────

#[test]
fn latest_attribute_merges_field_by_field() {
    let schema = ModelSchema::builder("Profile")
        .attribute(
            "email",
            AttributeDescriptor::string()
                .with_default("")
                .with_strategy_named("latest-attribute")
                .unwrap(),
        )
        .attribute(
            "phone",
            AttributeDescriptor::string()
                .with_default("")
                .with_strategy_named("latest-attribute")
                .unwrap(),
        )
        .build()
        .unwrap();

    let mut a = Entity::new(schema.clone(), "X").unwrap();
    a.commit().unwrap();
    let mut b = Entity::from_version(schema, a.version().clone()).unwrap();

    // a edits email first, b edits phone later; each keeps its newer field
    a.set("email", "a@example.com").unwrap();
    tick();
    b.set("phone", "555").unwrap();
    a.commit().unwrap();
    tick();
    b.commit().unwrap();

    a.merge(b.version()).unwrap();
    b.merge(a.version()).unwrap();

    assert_eq!(a.get_str("email").unwrap().as_deref(), Some("a@example.com"));
    assert_eq!(a.get_str("phone").unwrap().as_deref(), Some("555"));
    assert_eq!(a.version().hash(), b.version().hash());
}

#[test]
fn default_initialized_stamp_never_outranks_an_edit() {
    let schema = ModelSchema::builder("Profile")
        .attribute(
            "email",
            AttributeDescriptor::string()
                .with_default("")
                .with_strategy_named("latest-attribute")
                .unwrap(),
        )
        .build()
        .unwrap();

    let mut a = Entity::new(schema.clone(), "X").unwrap();
    a.set("email", "a@example.com").unwrap();
    a.commit().unwrap();

    // b never touched email; its default carries a zero stamp
    tick();
    let mut b = Entity::new(schema, "X").unwrap();
    b.commit().unwrap();

    a.merge(b.version()).unwrap();
    assert_eq!(a.get_str("email").unwrap().as_deref(), Some("a@example.com"));

    b.merge(a.version()).unwrap();
    assert_eq!(b.get_str("email").unwrap().as_deref(), Some("a@example.com"));
    assert_eq!(a.version().hash(), b.version().hash());
}

// ── Unvalidated remote state ─────────────────────────────────────

#[test]
fn merge_applies_remote_state_without_revalidation() {
    // remote values were validated when their replica committed them; a
    // surviving remote state is applied wholesale
    let mut a = Entity::new(person_schema(), "Tesla").unwrap();
    a.set("first", "Nikola").unwrap();
    a.commit().unwrap();

    let mut b = Entity::from_version(person_schema(), a.version().clone()).unwrap();
    tick();
    b.set("first", "Thomas").unwrap();
    b.commit().unwrap();

    a.merge(b.version()).unwrap();
    assert_eq!(
        a.version().attribute_value("first").unwrap(),
        &json!("Thomas")
    );
}
