//! End-to-end scenarios across the collection family.

use arc_swap::ArcSwap;
use arbor_collections::prelude::*;
use rstest::rstest;

#[rstest]
fn test_sorted_set_scenario() {
    let set = ImmutableSortedSet::new().add(5).add(3).add(8).add(3);
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![3, 5, 8]);
}

#[rstest]
fn test_hash_map_scenario() {
    let map = ImmutableHashMap::new()
        .add("a", 1)
        .and_then(|map| map.add("b", 2))
        .map(|map| map.set_item("a", 9))
        .unwrap();
    assert_eq!(map.get(&"a"), Some(&9));
    assert_eq!(map.len(), 2);
}

#[rstest]
fn test_list_scenario() {
    let list: ImmutableList<i32> = (1..=5).collect();
    let removed = list.remove_at(2).unwrap();
    assert_eq!(removed.iter().copied().collect::<Vec<_>>(), vec![1, 2, 4, 5]);
    assert_eq!(list.len(), 5);
}

#[rstest]
fn test_stack_scenario() {
    let stack = ImmutableStack::new().push(1).push(2).pop().unwrap();
    assert_eq!(stack.peek(), Ok(&1));
}

#[rstest]
fn test_shared_map_scenario() {
    let cell = ArcSwap::from_pointee(ImmutableHashMap::<String, usize>::new());
    std::thread::scope(|scope| {
        for index in 0..100 {
            let cell = &cell;
            scope.spawn(move || {
                interlocked::get_or_add(cell, format!("k{}", index % 10), index);
            });
        }
    });
    let map = cell.load();
    assert_eq!(map.len(), 10);
    for key in 0..10 {
        let value = map.get(&format!("k{key}")).copied().unwrap();
        assert_eq!(value % 10, key);
    }
}

// =============================================================================
// Cross-cutting Properties
// =============================================================================

#[rstest]
fn test_every_edit_leaves_its_input_unchanged() {
    let list: ImmutableList<i32> = (0..8).collect();
    let set: ImmutableSortedSet<i32> = (0..8).collect();
    let map: ImmutableHashMap<i32, i32> = (0..8).map(|key| (key, key)).collect();
    let queue: ImmutableQueue<i32> = (0..8).collect();

    let _ = (list.clear(), list.add(9), list.reverse(), list.remove_at(0));
    let _ = (set.add(9), set.remove(&0), set.except(0..4));
    let _ = (map.set_item(0, 100), map.remove(&1), map.clear());
    let _ = (queue.enqueue(9), queue.dequeue());

    assert_eq!(list.iter().copied().collect::<Vec<_>>(), (0..8).collect::<Vec<_>>());
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), (0..8).collect::<Vec<_>>());
    assert_eq!(map.get(&0), Some(&0));
    assert_eq!(map.len(), 8);
    assert_eq!(queue.iter().copied().collect::<Vec<_>>(), (0..8).collect::<Vec<_>>());
}

#[rstest]
fn test_large_sequential_build_stays_navigable() {
    let mut builder = ImmutableList::<u32>::new().to_builder();
    for value in 0..100_000 {
        builder.add(value);
    }
    let list = builder.to_immutable();
    assert_eq!(list.len(), 100_000);
    assert_eq!(list.get(0), Some(&0));
    assert_eq!(list.get(54_321), Some(&54_321));
    assert_eq!(list.get(99_999), Some(&99_999));
    assert_eq!(list.binary_search(&77_777), Ok(77_777));
}

#[rstest]
fn test_counts_track_real_changes_only() {
    let set: ImmutableSortedSet<u8> = (0..10).collect();
    assert_eq!(set.add(3).len(), 10);
    assert_eq!(set.add(30).len(), 11);
    assert_eq!(set.remove(&30).len(), 10);
    assert_eq!(set.remove(&3).len(), 9);

    let map: ImmutableHashMap<u8, u8> = (0..10).map(|key| (key, key)).collect();
    assert_eq!(map.set_item(3, 33).len(), 10);
    assert_eq!(map.set_item(30, 30).len(), 11);
    assert_eq!(map.remove(&30).len(), 10);
}

#[rstest]
fn test_queue_and_stack_empty_faults() {
    let stack = ImmutableStack::<i32>::new();
    assert_eq!(stack.peek(), Err(CollectionError::EmptyCollection));
    assert_eq!(stack.pop().err(), Some(CollectionError::EmptyCollection));

    let queue = ImmutableQueue::<i32>::new();
    assert_eq!(queue.peek(), Err(CollectionError::EmptyCollection));
    assert_eq!(queue.dequeue().err(), Some(CollectionError::EmptyCollection));
    assert_eq!(queue.enqueue(1).dequeue().map(|queue| queue.is_empty()), Ok(true));
}
