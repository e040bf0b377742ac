//! Property-based tests for the immutable collections.
//!
//! Each collection is checked against a standard-library model: a `Vec` for
//! the list, `BTreeSet`/`BTreeMap` for the sorted collections and
//! `HashMap`/`HashSet` for the hashed ones.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use arbor_collections::immutable::{
    ImmutableHashMap, ImmutableHashSet, ImmutableList, ImmutableQueue, ImmutableSortedMap,
    ImmutableSortedSet, ImmutableStack,
};
use arbor_collections::traits::ImmutableSet;
use proptest::prelude::*;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

#[derive(Debug, Clone)]
enum ListEdit {
    Add(i16),
    Insert(usize, i16),
    SetItem(usize, i16),
    RemoveAt(usize),
    Reverse,
}

fn list_edit() -> impl Strategy<Value = ListEdit> {
    prop_oneof![
        any::<i16>().prop_map(ListEdit::Add),
        (any::<usize>(), any::<i16>()).prop_map(|(index, value)| ListEdit::Insert(index, value)),
        (any::<usize>(), any::<i16>()).prop_map(|(index, value)| ListEdit::SetItem(index, value)),
        any::<usize>().prop_map(ListEdit::RemoveAt),
        Just(ListEdit::Reverse),
    ]
}

fn small_keys() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0..64_u8, 0..80)
}

// =============================================================================
// ImmutableList Laws
// =============================================================================

proptest! {
    /// Law: a list tracks a `Vec` under any sequence of positional edits,
    /// and every earlier version keeps its contents.
    #[test]
    fn prop_list_matches_vec_model(edits in prop::collection::vec(list_edit(), 0..120)) {
        let mut list = ImmutableList::new();
        let mut model: Vec<i16> = Vec::new();
        let mut history = Vec::new();

        for edit in edits {
            history.push((list.clone(), model.clone()));
            match edit {
                ListEdit::Add(value) => {
                    list = list.add(value);
                    model.push(value);
                }
                ListEdit::Insert(index, value) => {
                    let index = index % (model.len() + 1);
                    list = list.insert(index, value).unwrap();
                    model.insert(index, value);
                }
                ListEdit::SetItem(index, value) if !model.is_empty() => {
                    let index = index % model.len();
                    list = list.set_item(index, value).unwrap();
                    model[index] = value;
                }
                ListEdit::RemoveAt(index) if !model.is_empty() => {
                    let index = index % model.len();
                    list = list.remove_at(index).unwrap();
                    model.remove(index);
                }
                ListEdit::Reverse => {
                    list = list.reverse();
                    model.reverse();
                }
                _ => {}
            }
            prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), model.clone());
        }

        for (snapshot, expected) in history {
            prop_assert_eq!(snapshot.iter().copied().collect::<Vec<_>>(), expected);
        }
    }

    /// Law: the builder round trip preserves contents.
    #[test]
    fn prop_list_builder_round_trip(values in prop::collection::vec(any::<i32>(), 0..200)) {
        let list: ImmutableList<i32> = values.iter().copied().collect();
        let round_tripped = list.to_builder().to_immutable();
        prop_assert_eq!(round_tripped, list);
    }

    /// Law: sorting matches `slice::sort`.
    #[test]
    fn prop_list_sort_matches_slice_sort(values in prop::collection::vec(any::<i32>(), 0..200)) {
        let list: ImmutableList<i32> = values.iter().copied().collect();
        let mut expected = values;
        expected.sort_unstable();
        prop_assert_eq!(list.sort().iter().copied().collect::<Vec<_>>(), expected);
    }
}

// =============================================================================
// Sorted Collection Laws
// =============================================================================

proptest! {
    /// Law: a sorted set enumerates strictly increasing and agrees with `BTreeSet`.
    #[test]
    fn prop_sorted_set_matches_btree_set(adds in small_keys(), removes in small_keys()) {
        let mut set = ImmutableSortedSet::new();
        let mut model = BTreeSet::new();
        for value in adds {
            let before = set.len();
            let inserted = model.insert(value);
            set = set.add(value);
            prop_assert_eq!(set.len(), before + usize::from(inserted));
        }
        for value in removes {
            let before = set.len();
            let removed = model.remove(&value);
            set = set.remove(&value);
            prop_assert_eq!(set.len(), before - usize::from(removed));
        }
        let elements: Vec<u8> = set.iter().copied().collect();
        prop_assert!(elements.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert_eq!(elements, model.into_iter().collect::<Vec<_>>());
    }

    /// Law: positional lookups agree with enumeration order.
    #[test]
    fn prop_sorted_set_index_of_inverts_get(values in small_keys()) {
        let set: ImmutableSortedSet<u8> = values.into_iter().collect();
        for (index, value) in set.iter().enumerate() {
            prop_assert_eq!(set.get(index), Some(value));
            prop_assert_eq!(set.index_of(value), Ok(index));
        }
    }

    /// Law: sorted-set algebra agrees with `BTreeSet` algebra.
    #[test]
    fn prop_sorted_set_algebra(left in small_keys(), right in small_keys()) {
        let set: ImmutableSortedSet<u8> = left.iter().copied().collect();
        let left_model: BTreeSet<u8> = left.into_iter().collect();
        let right_model: BTreeSet<u8> = right.iter().copied().collect();

        let union: Vec<u8> = set.union(right.iter().copied()).iter().copied().collect();
        prop_assert_eq!(union, left_model.union(&right_model).copied().collect::<Vec<_>>());
        let intersection: Vec<u8> = set.intersect(right.iter().copied()).iter().copied().collect();
        prop_assert_eq!(intersection, left_model.intersection(&right_model).copied().collect::<Vec<_>>());
        let difference: Vec<u8> = set.except(right.iter().copied()).iter().copied().collect();
        prop_assert_eq!(difference, left_model.difference(&right_model).copied().collect::<Vec<_>>());
        let symmetric: Vec<u8> = set.symmetric_except(right.iter().copied()).iter().copied().collect();
        prop_assert_eq!(
            symmetric,
            left_model.symmetric_difference(&right_model).copied().collect::<Vec<_>>()
        );
    }

    /// Law: a sorted map agrees with `BTreeMap` under `set_item` and `remove`.
    #[test]
    fn prop_sorted_map_matches_btree_map(
        entries in prop::collection::vec((0..64_u8, any::<i32>()), 0..80),
        removes in small_keys()
    ) {
        let mut map = ImmutableSortedMap::new();
        let mut model = BTreeMap::new();
        for (key, value) in entries {
            map = map.set_item(key, value);
            model.insert(key, value);
        }
        for key in removes {
            map = map.remove(&key);
            model.remove(&key);
        }
        prop_assert_eq!(
            map.iter().map(|(key, value)| (*key, *value)).collect::<Vec<_>>(),
            model.into_iter().collect::<Vec<_>>()
        );
    }

    /// Law: a no-op edit returns a map equal to the input.
    #[test]
    fn prop_sorted_map_no_op_edits(entries in prop::collection::vec((0..64_u8, any::<i32>()), 1..40)) {
        let map: ImmutableSortedMap<u8, i32> = entries.iter().copied().collect();
        let (key, value) = map.iter().map(|(key, value)| (*key, *value)).next().unwrap();
        prop_assert_eq!(&map.set_item(key, value), &map);
        prop_assert_eq!(&map.add(key, value).unwrap(), &map);
        prop_assert_eq!(&map.remove(&200), &map);
    }
}

// =============================================================================
// Hash Collection Laws
// =============================================================================

proptest! {
    /// Law: a hash map agrees with `HashMap` under `set_item` and `remove`.
    #[test]
    fn prop_hash_map_matches_std_hash_map(
        entries in prop::collection::vec((0..64_u8, any::<i32>()), 0..80),
        removes in small_keys()
    ) {
        let mut map = ImmutableHashMap::new();
        let mut model = HashMap::new();
        for (key, value) in entries {
            map = map.set_item(key, value);
            model.insert(key, value);
        }
        for key in removes {
            map = map.remove(&key);
            model.remove(&key);
        }
        prop_assert_eq!(map.len(), model.len());
        for (key, value) in &model {
            prop_assert_eq!(map.get(key), Some(value));
        }
        prop_assert_eq!(map.iter().count(), model.len());
    }

    /// Law: hash-set algebra agrees with `HashSet` algebra.
    #[test]
    fn prop_hash_set_algebra(left in small_keys(), right in small_keys()) {
        let set: ImmutableHashSet<u8> = left.iter().copied().collect();
        let left_model: HashSet<u8> = left.into_iter().collect();
        let right_model: HashSet<u8> = right.iter().copied().collect();

        let as_model = |set: ImmutableHashSet<u8>| set.iter().copied().collect::<HashSet<_>>();
        prop_assert_eq!(as_model(set.union(right.iter().copied())), &left_model | &right_model);
        prop_assert_eq!(as_model(set.intersect(right.iter().copied())), &left_model & &right_model);
        prop_assert_eq!(as_model(set.except(right.iter().copied())), &left_model - &right_model);
        prop_assert_eq!(as_model(set.symmetric_except(right.iter().copied())), &left_model ^ &right_model);
    }

    /// Law: subset and equality predicates agree across set kinds.
    #[test]
    fn prop_set_predicates_agree(left in small_keys(), right in small_keys()) {
        let hashed: ImmutableHashSet<u8> = left.iter().copied().collect();
        let sorted: ImmutableSortedSet<u8> = right.iter().copied().collect();
        let left_model: BTreeSet<u8> = left.into_iter().collect();
        let right_model: BTreeSet<u8> = right.into_iter().collect();

        prop_assert_eq!(hashed.is_subset_of(&sorted), left_model.is_subset(&right_model));
        prop_assert_eq!(hashed.is_superset_of(&sorted), left_model.is_superset(&right_model));
        prop_assert_eq!(hashed.overlaps(&sorted), !left_model.is_disjoint(&right_model));
        prop_assert_eq!(hashed.set_equals(&sorted), left_model == right_model);
    }
}

// =============================================================================
// Stack and Queue Laws
// =============================================================================

proptest! {
    /// Law: popping a stack yields its pushes in reverse.
    #[test]
    fn prop_stack_is_lifo(values in prop::collection::vec(any::<i32>(), 0..100)) {
        let mut stack: ImmutableStack<i32> = values.iter().copied().collect();
        let mut popped = Vec::new();
        while let Ok((rest, top)) = stack.pop_value() {
            popped.push(top);
            stack = rest;
        }
        popped.reverse();
        prop_assert_eq!(popped, values);
    }

    /// Law: a queue agrees with `VecDeque` under interleaved enqueues and dequeues.
    #[test]
    fn prop_queue_is_fifo(operations in prop::collection::vec(prop::option::of(any::<i32>()), 0..150)) {
        let mut queue = ImmutableQueue::new();
        let mut model = std::collections::VecDeque::new();
        for operation in operations {
            match operation {
                Some(value) => {
                    queue = queue.enqueue(value);
                    model.push_back(value);
                }
                None => match queue.dequeue_value() {
                    Ok((rest, head)) => {
                        queue = rest;
                        prop_assert_eq!(Some(head), model.pop_front());
                    }
                    Err(_) => {
                        prop_assert!(model.is_empty());
                    }
                },
            }
            prop_assert_eq!(queue.len(), model.len());
        }
        prop_assert_eq!(queue.iter().copied().collect::<Vec<_>>(), model.into_iter().collect::<Vec<_>>());
    }
}
