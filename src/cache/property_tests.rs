//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check cache semantics against the in-memory row store.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_test::block_on;

use crate::cache::{CacheStore, CacheValue, DEFAULT_KEY_ATTRIBUTE};
use crate::rowstore::MemoryRowStore;

// == Test Configuration ==
const TEST_TABLE: &str = "cache";
const TEST_TTL: i64 = 300;

fn new_client() -> Arc<MemoryRowStore> {
    let client = Arc::new(MemoryRowStore::new());
    block_on(client.create_table(TEST_TABLE, DEFAULT_KEY_ATTRIBUTE));
    client
}

fn new_store() -> CacheStore {
    CacheStore::new(new_client(), TEST_TABLE)
}

// == Strategies ==
/// Generates valid cache keys
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:-]{1,64}"
}

fn prefix_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

/// Values whose JSON text round-trips exactly (no floats nested in composites)
fn nested_value_strategy() -> impl Strategy<Value = CacheValue> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[ -~]{0,32}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::hash_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|map| json!(map)),
        ]
    })
}

/// Any storable value, including top-level floats
fn cache_value_strategy() -> impl Strategy<Value = CacheValue> {
    prop_oneof![
        nested_value_strategy(),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(|f| json!(f)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Storing a value and reading it back before expiry returns the same
    // value with the same type.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in cache_value_strategy()) {
        let store = new_store();

        block_on(store.put(&key, &value, TEST_TTL)).unwrap();
        let retrieved = block_on(store.get(&key)).unwrap();

        prop_assert_eq!(retrieved, Some(value), "Round-trip value mismatch");
    }

    // A non-positive TTL is stale on the very next read.
    #[test]
    fn prop_non_positive_ttl_is_expired(
        key in valid_key_strategy(),
        value in cache_value_strategy(),
        ttl in i64::MIN..=0
    ) {
        let store = new_store();

        block_on(store.put(&key, &value, ttl)).unwrap();

        prop_assert_eq!(block_on(store.get(&key)).unwrap(), None);
    }

    // Only the first add on a live key wins; the stored value is the winner's.
    #[test]
    fn prop_add_first_writer_wins(
        key in valid_key_strategy(),
        first in cache_value_strategy(),
        second in cache_value_strategy()
    ) {
        let store = new_store();

        prop_assert!(block_on(store.add(&key, &first, TEST_TTL)).unwrap());
        prop_assert!(!block_on(store.add(&key, &second, TEST_TTL)).unwrap());
        prop_assert_eq!(block_on(store.get(&key)).unwrap(), Some(first));
    }

    // Sequential counter updates land exactly on the running total.
    #[test]
    fn prop_counter_matches_running_total(
        key in valid_key_strategy(),
        start in -1_000_000i64..1_000_000,
        deltas in prop::collection::vec(-1_000i64..1_000, 1..20)
    ) {
        let store = new_store();
        block_on(store.put(&key, &json!(start), TEST_TTL)).unwrap();

        let mut expected = start;
        for delta in deltas {
            let next = if delta >= 0 {
                block_on(store.increment(&key, delta)).unwrap()
            } else {
                block_on(store.decrement(&key, -delta)).unwrap()
            };
            expected += delta;
            prop_assert_eq!(next, Some(expected));
        }

        prop_assert_eq!(block_on(store.get(&key)).unwrap(), Some(json!(expected)));
    }

    // many returns every requested key, with values only for written ones.
    #[test]
    fn prop_many_preserves_every_key(
        written in prop::collection::hash_set(valid_key_strategy(), 0..10),
        unwritten in prop::collection::hash_set(valid_key_strategy(), 1..10)
    ) {
        let store = new_store();
        for key in &written {
            block_on(store.put(key, &json!(key), TEST_TTL)).unwrap();
        }

        let requested: Vec<&String> = written.iter().chain(unwritten.iter()).collect();
        let result = block_on(store.many(&requested)).unwrap();

        let unique: HashSet<&String> = requested.iter().copied().collect();
        prop_assert_eq!(result.len(), unique.len());
        for key in unique {
            let expected = written.contains(key).then(|| json!(key));
            prop_assert_eq!(&result[key.as_str()], &expected, "key {}", key);
        }
    }

    // Stores with different prefixes never see each other's keys.
    #[test]
    fn prop_prefix_isolation(
        prefix_a in prefix_strategy(),
        prefix_b in prefix_strategy(),
        key in valid_key_strategy(),
        value in nested_value_strategy()
    ) {
        prop_assume!(prefix_a != prefix_b);
        let client = new_client();
        let a = CacheStore::new(client.clone(), TEST_TABLE).with_prefix(&prefix_a);
        let b = CacheStore::new(client, TEST_TABLE).with_prefix(&prefix_b);

        block_on(a.put(&key, &value, TEST_TTL)).unwrap();

        prop_assert_eq!(block_on(b.get(&key)).unwrap(), None);
        prop_assert_eq!(block_on(b.many(&[key.as_str()])).unwrap()[key.as_str()].clone(), None);
        prop_assert_eq!(block_on(a.get(&key)).unwrap(), Some(value));
    }

    // Only one of several lock handles can hold a live lock at a time.
    #[test]
    fn prop_single_lock_holder(name in valid_key_strategy(), contenders in 2usize..6) {
        let store = new_store();
        let locks: Vec<_> = (0..contenders).map(|_| store.lock(name.clone(), 60, None)).collect();

        let acquired = locks
            .iter()
            .filter(|lock| block_on(lock.acquire()).unwrap())
            .count();
        prop_assert_eq!(acquired, 1);

        let released = locks
            .iter()
            .filter(|lock| block_on(lock.release()).unwrap())
            .count();
        prop_assert_eq!(released, 1);
    }
}
