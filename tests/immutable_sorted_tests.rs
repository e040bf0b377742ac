//! Integration tests for `ImmutableSortedSet` and `ImmutableSortedMap`.

use arbor_collections::CollectionError;
use arbor_collections::comparer::{FnComparer, NaturalOrder, ReverseOrder};
use arbor_collections::immutable::{ImmutableSortedMap, ImmutableSortedSet};
use arbor_collections::traits::{ImmutableMap, ImmutableSet};
use rstest::rstest;

// =============================================================================
// ImmutableSortedSet
// =============================================================================

#[rstest]
fn test_sorted_set_orders_and_deduplicates() {
    let set = ImmutableSortedSet::new().add(5).add(3).add(8).add(3);
    assert_eq!(set.len(), 3);
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![3, 5, 8]);
    assert_eq!(set.iter_rev().copied().collect::<Vec<_>>(), vec![8, 5, 3]);
    assert_eq!((set.min(), set.max()), (Some(&3), Some(&8)));
}

#[rstest]
fn test_sorted_set_duplicate_add_returns_identical_set() {
    let set: ImmutableSortedSet<i32> = (0..16).collect();
    assert_eq!(set.add(7), set);
    assert_eq!(set.remove(&99), set);
}

#[rstest]
fn test_sorted_set_positional_queries() {
    let set: ImmutableSortedSet<i32> = [10, 20, 30, 40].into_iter().collect();
    assert_eq!(set.get(2), Some(&30));
    assert_eq!(set.index_of(&30), Ok(2));
    assert_eq!(set.index_of(&25), Err(2));
    assert_eq!(set.range(&15, &35).copied().collect::<Vec<_>>(), vec![20, 30]);
}

#[rstest]
fn test_sorted_set_custom_comparer() {
    let set = ImmutableSortedSet::with_comparer(ReverseOrder(NaturalOrder))
        .union([1, 4, 2, 3]);
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![4, 3, 2, 1]);

    let by_parity = set
        .change_comparer(FnComparer::new(|left: &i32, right: &i32| (left % 2).cmp(&(right % 2))));
    assert_eq!(by_parity.len(), 2);
}

#[rstest]
#[case(vec![1, 2, 3], vec![3, 4], vec![1, 2, 3, 4], vec![3], vec![1, 2], vec![1, 2, 4])]
#[case(vec![], vec![1], vec![1], vec![], vec![], vec![1])]
#[case(vec![5, 6], vec![], vec![5, 6], vec![], vec![5, 6], vec![5, 6])]
fn test_sorted_set_algebra(
    #[case] left: Vec<i32>,
    #[case] right: Vec<i32>,
    #[case] union: Vec<i32>,
    #[case] intersection: Vec<i32>,
    #[case] difference: Vec<i32>,
    #[case] symmetric: Vec<i32>,
) {
    let set: ImmutableSortedSet<i32> = left.into_iter().collect();
    let collect = |set: ImmutableSortedSet<i32>| set.iter().copied().collect::<Vec<_>>();
    assert_eq!(collect(set.union(right.clone())), union);
    assert_eq!(collect(set.intersect(right.clone())), intersection);
    assert_eq!(collect(set.except(right.clone())), difference);
    assert_eq!(collect(set.symmetric_except(right)), symmetric);
}

#[rstest]
fn test_sorted_set_predicates() {
    let small: ImmutableSortedSet<i32> = [2, 3].into_iter().collect();
    let large: ImmutableSortedSet<i32> = (1..=5).collect();
    assert!(small.is_subset_of(&large));
    assert!(small.is_proper_subset_of(&large));
    assert!(large.is_superset_of(&small));
    assert!(small.overlaps(&large));
    assert!(!small.set_equals(&large));
    assert!(large.set_equals(&large.clone()));
}

#[rstest]
fn test_sorted_set_builder() {
    let set: ImmutableSortedSet<i32> = (0..10).collect();
    let mut builder = set.to_builder();
    assert!(builder.add(42));
    assert!(!builder.add(3));
    assert!(builder.remove(&0));
    builder.except_with(5..10);
    let edited = builder.to_immutable();
    assert_eq!(edited.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 42]);
    assert_eq!(set.len(), 10);
}

// =============================================================================
// ImmutableSortedMap
// =============================================================================

#[rstest]
fn test_sorted_map_add_and_set_item() {
    let map = ImmutableSortedMap::new()
        .add("b", 2)
        .unwrap()
        .add("a", 1)
        .unwrap()
        .set_item("a", 9);
    assert_eq!(map.get(&"a"), Some(&9));
    assert_eq!(map.len(), 2);
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[rstest]
fn test_sorted_map_add_collision_policy() {
    let map = ImmutableSortedMap::new().set_item(1, "one");
    assert_eq!(map.add(1, "one").unwrap(), map);
    assert_eq!(map.add(1, "uno").unwrap_err(), CollectionError::DuplicateKey);
    assert_eq!(
        map.add_range([(2, "two"), (1, "eins")]).unwrap_err(),
        CollectionError::DuplicateKey
    );
}

#[rstest]
fn test_sorted_map_lookups() {
    let map: ImmutableSortedMap<i32, &str> = [(3, "c"), (1, "a"), (2, "b")].into_iter().collect();
    assert_eq!(map.get_key_value(&2), Some((&2, &"b")));
    assert_eq!(map.try_get_key(&3), Some(&3));
    assert!(map.contains_key(&1));
    assert!(map.contains_value(&"c"));
    assert!(!map.contains_value(&"z"));
    assert_eq!(map.min(), Some((&1, &"a")));
    assert_eq!(map.max(), Some((&3, &"c")));
    assert_eq!(map.values().copied().collect::<String>(), "abc");
}

#[rstest]
fn test_sorted_map_remove_range_and_set_items() {
    let map: ImmutableSortedMap<i32, i32> = (0..6).map(|key| (key, key * key)).collect();
    let trimmed = map.remove_range(&[0, 2, 4, 100]);
    assert_eq!(trimmed.keys().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
    let replaced = trimmed.set_items([(1, -1), (7, 49)]);
    assert_eq!(
        replaced.iter().map(|(key, value)| (*key, *value)).collect::<Vec<_>>(),
        vec![(1, -1), (3, 9), (5, 25), (7, 49)]
    );
    assert_eq!(map.len(), 6);
}

#[rstest]
fn test_sorted_map_change_comparers_rejects_conflicting_merge() {
    let map: ImmutableSortedMap<i32, i32> = [(1, 10), (-1, 20)].into_iter().collect();
    let by_magnitude = FnComparer::new(|left: &i32, right: &i32| left.abs().cmp(&right.abs()));
    assert_eq!(
        map.change_comparers(by_magnitude, arbor_collections::comparer::DefaultEquality)
            .unwrap_err(),
        CollectionError::DuplicateKey
    );
}

#[rstest]
fn test_sorted_map_builder() {
    let map: ImmutableSortedMap<&str, i32> = [("x", 1)].into_iter().collect();
    let mut builder = map.to_builder();
    builder.set_item("y", 2);
    builder.add("z", 3).unwrap();
    assert_eq!(builder.add("x", 5), Err(CollectionError::DuplicateKey));
    assert!(builder.remove(&"x"));
    let edited = builder.to_immutable();
    assert_eq!(edited.keys().copied().collect::<Vec<_>>(), vec!["y", "z"]);
    assert_eq!(map.len(), 1);
}

#[rstest]
fn test_map_trait_is_generic_over_sorted_map() {
    fn bump<M: ImmutableMap<&'static str, i32>>(map: &M, key: &'static str) -> M {
        let next = map.get(&key).map_or(1, |count| count + 1);
        map.set_item(key, next)
    }

    let map = ImmutableSortedMap::new();
    let map = bump(&bump(&map, "hits"), "hits");
    assert_eq!(map.get(&"hits"), Some(&2));
}
