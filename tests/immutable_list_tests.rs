//! Integration tests for `ImmutableList` and `ListBuilder`.

use arbor_collections::CollectionError;
use arbor_collections::immutable::ImmutableList;
use arbor_collections::traits::{CollectionBuilder, ImmutableIndexed, ToBuilder};
use rstest::rstest;

fn contents<T: Clone>(list: &ImmutableList<T>) -> Vec<T> {
    list.iter().cloned().collect()
}

// =============================================================================
// Positional Edits
// =============================================================================

#[rstest]
fn test_add_range_then_remove_at() {
    let list = ImmutableList::new().add_range([1, 2, 3, 4, 5]);
    let removed = list.remove_at(2).unwrap();
    assert_eq!(contents(&removed), vec![1, 2, 4, 5]);
    assert_eq!(contents(&list), vec![1, 2, 3, 4, 5]);
}

#[rstest]
#[case(0, vec![9, 1, 2, 3])]
#[case(1, vec![1, 9, 2, 3])]
#[case(3, vec![1, 2, 3, 9])]
fn test_insert_at_each_position(#[case] index: usize, #[case] expected: Vec<i32>) {
    let list: ImmutableList<i32> = [1, 2, 3].into_iter().collect();
    assert_eq!(contents(&list.insert(index, 9).unwrap()), expected);
}

#[rstest]
fn test_out_of_range_edits_fail() {
    let list: ImmutableList<i32> = (0..3).collect();
    assert_eq!(
        list.insert(4, 0).unwrap_err(),
        CollectionError::IndexOutOfRange { index: 4, length: 3 }
    );
    assert_eq!(
        list.set_item(3, 0).unwrap_err(),
        CollectionError::IndexOutOfRange { index: 3, length: 3 }
    );
    assert_eq!(
        list.remove_range(2, 2).unwrap_err(),
        CollectionError::InvalidRange { start: 2, count: 2, length: 3 }
    );
    assert_eq!(list.item(7), Err(CollectionError::IndexOutOfRange { index: 7, length: 3 }));
}

#[rstest]
fn test_insert_range_and_get_range() {
    let list: ImmutableList<i32> = [1, 5].into_iter().collect();
    let filled = list.insert_range(1, [2, 3, 4]).unwrap();
    assert_eq!(contents(&filled), vec![1, 2, 3, 4, 5]);
    assert_eq!(contents(&filled.get_range(1, 3).unwrap()), vec![2, 3, 4]);
}

#[rstest]
fn test_replace_and_remove_by_value() {
    let list: ImmutableList<&str> = ["a", "b", "a"].into_iter().collect();
    let replaced = list.replace(&"a", "z").unwrap();
    assert_eq!(contents(&replaced), vec!["z", "b", "a"]);
    assert!(list.replace(&"q", "z").is_none());
    assert_eq!(contents(&list.remove(&"b")), vec!["a", "a"]);
}

// =============================================================================
// Searches
// =============================================================================

#[rstest]
fn test_searches() {
    let list: ImmutableList<i32> = [4, 8, 15, 16, 23, 42].into_iter().collect();
    assert_eq!(list.find(|value| value % 2 == 1), Some(&15));
    assert_eq!(list.find_last(|value| value % 2 == 0), Some(&42));
    assert_eq!(list.find_index(|value| *value > 10), Some(2));
    assert_eq!(list.find_last_index(|value| *value < 20), Some(3));
    assert!(list.exists(|value| *value == 23));
    assert!(list.true_for_all(|value| *value > 0));
    assert_eq!(list.binary_search(&16), Ok(3));
    assert_eq!(list.binary_search(&17), Err(4));
    assert_eq!(contents(&list.find_all(|value| value % 4 == 0)), vec![4, 8, 16]);
}

#[rstest]
fn test_index_of_and_last_index_of() {
    let list: ImmutableList<char> = "abcabc".chars().collect();
    assert_eq!(list.index_of(&'c'), Some(2));
    assert_eq!(list.last_index_of(&'a'), Some(3));
    assert_eq!(list.index_of(&'z'), None);
}

// =============================================================================
// Reordering
// =============================================================================

#[rstest]
fn test_sort_reverse_and_convert() {
    let list: ImmutableList<i32> = [3, 1, 2].into_iter().collect();
    assert_eq!(contents(&list.sort()), vec![1, 2, 3]);
    assert_eq!(contents(&list.sort_by(|left, right| right.cmp(left))), vec![3, 2, 1]);
    assert_eq!(contents(&list.reverse()), vec![2, 1, 3]);
    assert_eq!(contents(&list.convert_all(|value| value * 10)), vec![30, 10, 20]);
    assert_eq!(
        contents(&list.sort_range(1, 2, |left, right| left.cmp(right)).unwrap()),
        vec![3, 1, 2]
    );
}

#[rstest]
fn test_reverse_range() {
    let list: ImmutableList<i32> = (1..=6).collect();
    assert_eq!(contents(&list.reverse_range(1, 4).unwrap()), vec![1, 5, 4, 3, 2, 6]);
}

// =============================================================================
// Builders
// =============================================================================

#[rstest]
fn test_builder_round_trip_is_identity() {
    let list: ImmutableList<i32> = (0..50).collect();
    let mut builder = list.to_builder();
    let round_tripped = builder.to_immutable();
    assert_eq!(round_tripped, list);
    assert_eq!(CollectionBuilder::len(&builder), 50);
}

#[rstest]
fn test_builder_batch_edit_leaves_source_untouched() {
    let list: ImmutableList<i32> = (0..10).collect();
    let mut builder = list.to_builder();
    builder.add(10);
    builder.insert(0, -1).unwrap();
    assert_eq!(builder.set_item(1, 100).unwrap(), 0);
    assert_eq!(builder.remove_at(2).unwrap(), 1);
    assert!(builder.remove(&5));
    assert_eq!(builder.remove_all(|value| value % 2 == 0), 6);
    let edited = builder.to_immutable();

    assert_eq!(contents(&edited), vec![-1, 3, 7, 9]);
    assert_eq!(contents(&list), (0..10).collect::<Vec<_>>());
}

#[rstest]
fn test_generic_builder_round_trip() {
    fn round_trip<C>(collection: &C) -> C
    where
        C: ToBuilder,
    {
        collection.to_builder().to_immutable()
    }

    let list: ImmutableList<String> = ["x", "y"].into_iter().map(String::from).collect();
    assert_eq!(round_trip(&list), list);
}

#[rstest]
fn test_indexed_trait_access() {
    fn second<L: ImmutableIndexed<i32>>(list: &L) -> Option<i32> {
        list.get(1).copied()
    }

    let list: ImmutableList<i32> = [7, 8, 9].into_iter().collect();
    assert_eq!(second(&list), Some(8));
}

#[rstest]
fn test_display_and_debug() {
    let list: ImmutableList<i32> = (1..=3).collect();
    assert_eq!(format!("{list}"), "[1, 2, 3]");
    assert_eq!(format!("{list:?}"), "[1, 2, 3]");
}
