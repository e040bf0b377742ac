//! Integration tests for `ImmutableHashMap` and `ImmutableHashSet`.

use arbor_collections::CollectionError;
use arbor_collections::comparer::{DefaultEquality, DefaultHashComparer, FnEquality, FnHashComparer};
use arbor_collections::immutable::{ImmutableHashMap, ImmutableHashSet, ImmutableSortedSet};
use arbor_collections::traits::{CollectionBuilder, ImmutableSet, ToBuilder};
use rstest::rstest;

type ConstantHash = FnHashComparer<fn(&u64) -> u64, fn(&u64, &u64) -> bool>;

/// Every key lands in the same bucket.
fn constant_hash() -> ConstantHash {
    let hash: fn(&u64) -> u64 = |_| 7;
    let equals: fn(&u64, &u64) -> bool = |left, right| left == right;
    FnHashComparer::new(hash, equals)
}

fn sorted_entries(map: &ImmutableHashMap<u64, u64, ConstantHash>) -> Vec<(u64, u64)> {
    let mut entries: Vec<_> = map.iter().map(|(key, value)| (*key, *value)).collect();
    entries.sort_unstable();
    entries
}

// =============================================================================
// ImmutableHashMap
// =============================================================================

#[rstest]
fn test_hash_map_add_then_set_item() {
    let map = ImmutableHashMap::new()
        .add("a".to_string(), 1)
        .unwrap()
        .add("b".to_string(), 2)
        .unwrap()
        .set_item("a".to_string(), 9);
    assert_eq!(map.get(&"a".to_string()), Some(&9));
    assert_eq!(map.len(), 2);
}

#[rstest]
fn test_hash_map_duplicate_key_policy() {
    let map = ImmutableHashMap::new().set_item(1, 'x');
    assert_eq!(map.add(1, 'x').unwrap(), map);
    assert_eq!(map.add(1, 'y').unwrap_err(), CollectionError::DuplicateKey);
}

#[rstest]
fn test_hash_map_collisions_behave_like_distinct_keys() {
    let map = (0..20_u64).fold(
        ImmutableHashMap::<u64, u64, _, _>::with_comparers(constant_hash(), DefaultEquality),
        |map, key| map.set_item(key, key * 2),
    );
    assert_eq!(map.len(), 20);
    assert_eq!(map.get(&13), Some(&26));

    let trimmed = map.remove(&0).remove(&13).remove(&99);
    assert_eq!(trimmed.len(), 18);
    assert_eq!(trimmed.get(&13), None);
    assert_eq!(trimmed.get(&1), Some(&2));
    assert_eq!(sorted_entries(&map).len(), 20);
}

#[rstest]
fn test_hash_map_value_comparer_controls_no_op_updates() {
    let close: fn(&f64, &f64) -> bool = |left, right| (left - right).abs() < 0.5;
    let map = ImmutableHashMap::with_comparers(<DefaultHashComparer>::default(), FnEquality::new(close))
        .set_item(1_u8, 1.0);
    let nudged = map.set_item(1, 1.2);
    assert_eq!(nudged.get(&1), Some(&1.0));
    assert!(map.add(1, 1.4).is_ok());
    assert_eq!(map.add(1, 2.0).unwrap_err(), CollectionError::DuplicateKey);
}

#[rstest]
fn test_hash_map_keys_values_and_lookups() {
    let map: ImmutableHashMap<&str, u32> = [("one", 1), ("two", 2), ("three", 3)].into_iter().collect();
    let mut keys: Vec<_> = map.keys().copied().collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["one", "three", "two"]);
    assert_eq!(map.values().sum::<u32>(), 6);
    assert_eq!(map.get_key_value(&"two"), Some((&"two", &2)));
    assert!(map.contains_value(&3));
    assert_eq!(map.remove_range(&["one", "two"]).len(), 1);
}

#[rstest]
fn test_hash_map_builder_round_trip() {
    let map: ImmutableHashMap<u16, u16> = (0..100).map(|key| (key, key)).collect();
    let mut builder = map.to_builder();
    assert_eq!(builder.to_immutable(), map);
    builder.set_item(500, 5);
    assert!(builder.remove(&0));
    builder.add(1, 1).unwrap();
    assert_eq!(builder.add(1, 2), Err(CollectionError::DuplicateKey));
    let edited = builder.to_immutable();
    assert_eq!(edited.len(), 100);
    assert_eq!(map.len(), 100);
    assert_eq!(CollectionBuilder::len(&builder), 100);
}

// =============================================================================
// ImmutableHashSet
// =============================================================================

#[rstest]
fn test_hash_set_is_unordered_set() {
    let set: ImmutableHashSet<i32> = [5, 3, 8, 3].into_iter().collect();
    assert_eq!(set.len(), 3);
    assert!(set.contains(&8));
    assert!(!set.contains(&4));
}

#[rstest]
fn test_hash_set_with_colliding_hashes() {
    let set = (0..10_u64).fold(ImmutableHashSet::<u64, _>::with_comparer(constant_hash()), |set, value| {
        set.add(value)
    });
    assert_eq!(set.len(), 10);
    let evens = set.except((0..10).filter(|value| value % 2 == 1));
    assert_eq!(evens.len(), 5);
    assert!(evens.contains(&4));
    assert!(!evens.contains(&5));
    assert_eq!(evens.symmetric_except([4, 11]).len(), 5);
}

#[rstest]
fn test_hash_set_matches_sorted_set_algebra() {
    let left = [1, 2, 3, 4, 5];
    let right = [4, 5, 6];
    let hashed: ImmutableHashSet<i32> = left.into_iter().collect();
    let sorted: ImmutableSortedSet<i32> = left.into_iter().collect();

    assert!(hashed.union(right).set_equals(&sorted.union(right)));
    assert!(hashed.intersect(right).set_equals(&sorted.intersect(right)));
    assert!(hashed.except(right).set_equals(&sorted.except(right)));
    assert!(hashed.symmetric_except(right).set_equals(&sorted.symmetric_except(right)));
}

#[rstest]
fn test_hash_set_builder_through_traits() {
    fn grow<S>(set: &S) -> S
    where
        S: ToBuilder,
        S::Builder: Extend<i32>,
    {
        let mut builder = set.to_builder();
        builder.extend([100, 200]);
        builder.to_immutable()
    }

    let set: ImmutableHashSet<i32> = (0..3).collect();
    let grown = grow(&set);
    assert_eq!(grown.len(), 5);
    assert!(set.is_proper_subset_of(&grown));
}
