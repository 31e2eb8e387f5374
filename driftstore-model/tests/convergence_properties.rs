//! Property-based convergence checks.
//!
//! The value-comparison strategy (`max`) is deterministic regardless of
//! clocks, so it is the one exercised under arbitrary inputs here; the
//! clock-driven strategies are covered by scenario tests.

use std::sync::Arc;

use driftstore_model::{AttributeDescriptor, Entity, ModelSchema};
use proptest::prelude::*;

fn counter_schema() -> Arc<ModelSchema> {
    ModelSchema::builder("Counter")
        .attribute(
            "value",
            AttributeDescriptor::integer()
                .with_default(0)
                .with_strategy_named("max")
                .unwrap(),
        )
        .build()
        .unwrap()
}

fn committed_counter(value: i64) -> Entity {
    let mut e = Entity::new(counter_schema(), "C").unwrap();
    e.set("value", value).unwrap();
    e.commit().unwrap();
    e
}

proptest! {
    #[test]
    fn mutual_merge_converges_on_the_maximum(a_val in any::<i64>(), b_val in any::<i64>()) {
        let mut a = committed_counter(a_val);
        let mut b = committed_counter(b_val);

        a.merge(b.version()).unwrap();
        b.merge(a.version()).unwrap();

        let expected = a_val.max(b_val);
        prop_assert_eq!(a.get_i64("value").unwrap(), Some(expected));
        prop_assert_eq!(b.get_i64("value").unwrap(), Some(expected));
        prop_assert_eq!(a.version().hash(), b.version().hash());
    }

    #[test]
    fn merge_order_does_not_matter(vals in prop::collection::vec(any::<i64>(), 1..8)) {
        let versions: Vec<_> = vals
            .iter()
            .map(|&v| committed_counter(v).version().clone())
            .collect();

        let mut forward = committed_counter(vals[0]);
        for v in &versions {
            forward.merge(v).unwrap();
        }

        let mut backward = committed_counter(vals[0]);
        for v in versions.iter().rev() {
            backward.merge(v).unwrap();
        }

        prop_assert_eq!(forward.version().hash(), backward.version().hash());
        prop_assert_eq!(
            forward.get_i64("value").unwrap(),
            backward.get_i64("value").unwrap()
        );
    }

    #[test]
    fn merge_is_idempotent(a_val in any::<i64>(), b_val in any::<i64>()) {
        let mut a = committed_counter(a_val);
        let b = committed_counter(b_val);

        a.merge(b.version()).unwrap();
        let hash = a.version().hash();
        let committed = a.version().committed();

        a.merge(b.version()).unwrap();
        prop_assert_eq!(a.version().hash(), hash);
        prop_assert_eq!(a.version().committed(), committed);
    }

    #[test]
    fn self_merge_is_a_noop(val in any::<i64>()) {
        let mut a = committed_counter(val);
        let version = a.version().clone();
        a.merge(&version).unwrap();
        prop_assert_eq!(a.version(), &version);
    }

    #[test]
    fn content_hash_is_deterministic(val in any::<i64>()) {
        let a = committed_counter(val);
        let b = committed_counter(val);
        prop_assert_eq!(a.computed_hash(), b.computed_hash());
        prop_assert_eq!(a.version().hash(), b.version().hash());
    }

    #[test]
    fn content_hash_separates_values(a_val in any::<i64>(), b_val in any::<i64>()) {
        prop_assume!(a_val != b_val);
        let a = committed_counter(a_val);
        let b = committed_counter(b_val);
        prop_assert_ne!(a.computed_hash(), b.computed_hash());
    }
}
