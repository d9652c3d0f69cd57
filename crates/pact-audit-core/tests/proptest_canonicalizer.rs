// crates/pact-audit-core/tests/proptest_canonicalizer.rs
// ============================================================================
// Module: Canonicalizer Property-Based Tests
// Description: Property tests for canonical-JSON determinism and idempotence.
// Purpose: Pin spec-quantified invariants #1 (determinism) and #5
//          (canonicalization idempotence) across arbitrary JSON shapes.
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions are permitted."
)]

use pact_audit_core::core::hashing::canonical_json_bytes;
use pact_audit_core::core::hashing::hash_bytes;
use pact_audit_core::core::hashing::DEFAULT_HASH_ALGORITHM;
use proptest::prelude::*;
use serde_json::Value;

fn json_value_strategy(max_depth: u32) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|v| Value::Number(v.into())),
        ".*".prop_map(Value::String),
    ];

    leaf.prop_recursive(max_depth, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(|map| {
                let mut object = serde_json::Map::new();
                for (key, value) in map {
                    object.insert(key, value);
                }
                Value::Object(object)
            }),
        ]
    })
}

proptest! {
    #[test]
    fn canonical_bytes_are_deterministic(value in json_value_strategy(4)) {
        let first = canonical_json_bytes(&value).unwrap();
        let second = canonical_json_bytes(&value).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn canonicalization_is_idempotent_through_a_reparse(value in json_value_strategy(4)) {
        let once = canonical_json_bytes(&value).unwrap();
        let reparsed: Value = serde_json::from_slice(&once).unwrap();
        let twice = canonical_json_bytes(&reparsed).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn hashing_canonical_bytes_is_deterministic(value in json_value_strategy(3)) {
        let bytes = canonical_json_bytes(&value).unwrap();
        let first = hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes);
        let second = hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn object_key_order_never_affects_canonical_bytes(
        a in any::<i64>(),
        b in any::<i64>(),
    ) {
        let forward = serde_json::json!({"a": a, "b": b});
        let backward = serde_json::json!({"b": b, "a": a});
        let forward_bytes = canonical_json_bytes(&forward).unwrap();
        let backward_bytes = canonical_json_bytes(&backward).unwrap();
        prop_assert_eq!(forward_bytes, backward_bytes);
    }
}
