//! Hash buckets and the hash-code tree behind the hash collections.
//!
//! A hash collection is a keyed AVL tree ordered by 64-bit hash code. Each
//! tree element is a [`HashSlot`] holding every entry with that hash code in a
//! [`HashBucket`]: the first entry inline and any colliding entries in an
//! overflow list. Entries are told apart inside a bucket with the
//! collection's equality comparer.
//!
//! Bucket operations never mutate; they return a new bucket together with an
//! [`OperationResult`] so that callers can skip rewriting the tree when
//! nothing changed and adjust the cached element count when the size did.

use std::iter::FusedIterator;

use super::iter::Iter;
use super::node::Tree;
use crate::error::CollectionError;

// =============================================================================
// Collision Policy
// =============================================================================

/// What to do when an added key is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCollisionBehavior {
    /// Replace the stored value (no change if the values are equal).
    SetValue,
    /// Keep the stored entry.
    Skip,
    /// Keep the stored entry if the values are equal, otherwise fail.
    ThrowIfValueDifferent,
    /// Always fail.
    ThrowAlways,
}

impl KeyCollisionBehavior {
    /// Decides the outcome of a collision.
    ///
    /// Returns `Ok(true)` if the stored entry should be replaced and
    /// `Ok(false)` if it should be kept.
    pub(crate) const fn resolve(self, same_value: bool) -> Result<bool, CollectionError> {
        match self {
            Self::SetValue => Ok(!same_value),
            Self::Skip => Ok(false),
            Self::ThrowIfValueDifferent if same_value => Ok(false),
            Self::ThrowIfValueDifferent | Self::ThrowAlways => Err(CollectionError::DuplicateKey),
        }
    }
}

/// The effect of a bucket operation on its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationResult {
    /// An entry was replaced; the element count is unchanged.
    AppliedWithoutSizeChange,
    /// An entry was added or removed.
    SizeChanged,
    /// The collection already had the requested state.
    NoChangeRequired,
}

// =============================================================================
// HashBucket
// =============================================================================

/// All entries sharing one hash code.
#[derive(Clone)]
pub(crate) struct HashBucket<T> {
    first: Option<T>,
    additional: Tree<T>,
}

impl<T> HashBucket<T> {
    const fn empty() -> Self {
        Self {
            first: None,
            additional: Tree::Empty,
        }
    }

    pub(crate) const fn single(element: T) -> Self {
        Self {
            first: Some(element),
            additional: Tree::Empty,
        }
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    pub(crate) fn len(&self) -> usize {
        usize::from(self.first.is_some()) + self.additional.count()
    }

    /// Returns the entry at `index`: the inline entry first, then the
    /// overflow entries in insertion order.
    pub(crate) fn entry(&self, index: usize) -> Option<&T> {
        match index {
            0 => self.first.as_ref(),
            _ => self.additional.get(index - 1),
        }
    }

    /// Returns the entry matched by `matches`.
    pub(crate) fn find<M: Fn(&T) -> bool>(&self, matches: M) -> Option<&T> {
        let first = self.first.as_ref()?;
        if matches(first) {
            return Some(first);
        }
        self.additional.iter().find(|element| matches(element))
    }
}

impl<T: Clone> HashBucket<T> {
    /// Adds `element`. `same_key(existing, new)` finds the entry with the
    /// same key and `same_value(existing, new)` compares its value with the
    /// new one.
    ///
    /// # Errors
    ///
    /// [`CollectionError::DuplicateKey`] as dictated by `behavior`.
    pub(crate) fn add<M, S>(
        &self,
        element: T,
        same_key: M,
        same_value: S,
        behavior: KeyCollisionBehavior,
    ) -> Result<(Self, OperationResult), CollectionError>
    where
        M: Fn(&T, &T) -> bool,
        S: Fn(&T, &T) -> bool,
    {
        let Some(first) = &self.first else {
            return Ok((Self::single(element), OperationResult::SizeChanged));
        };
        if same_key(first, &element) {
            if !behavior.resolve(same_value(first, &element))? {
                return Ok((self.clone(), OperationResult::NoChangeRequired));
            }
            let bucket = Self {
                first: Some(element),
                additional: self.additional.clone(),
            };
            return Ok((bucket, OperationResult::AppliedWithoutSizeChange));
        }

        let mut additional = self.additional.clone();
        let result = match self.additional.iter().position(|existing| same_key(existing, &element)) {
            Some(index) => {
                let Some(existing) = self.additional.get(index) else {
                    return Ok((self.clone(), OperationResult::NoChangeRequired));
                };
                if !behavior.resolve(same_value(existing, &element))? {
                    return Ok((self.clone(), OperationResult::NoChangeRequired));
                }
                additional.replace_at(index, element);
                OperationResult::AppliedWithoutSizeChange
            }
            None => {
                let length = additional.count();
                additional.insert_at(length, element);
                OperationResult::SizeChanged
            }
        };
        additional.freeze();
        let bucket = Self {
            first: Some(first.clone()),
            additional,
        };
        Ok((bucket, result))
    }

    /// Removes the entry matched by `matches`.
    ///
    /// Removing the inline entry promotes the first overflow entry in its
    /// place. The returned bucket is empty if the last entry was removed.
    pub(crate) fn remove<M: Fn(&T) -> bool>(&self, matches: M) -> (Self, OperationResult) {
        let Some(first) = &self.first else {
            return (self.clone(), OperationResult::NoChangeRequired);
        };
        if matches(first) {
            let mut additional = self.additional.clone();
            let Some(promoted) = additional.remove_at(0) else {
                return (Self::empty(), OperationResult::SizeChanged);
            };
            additional.freeze();
            let bucket = Self {
                first: Some(promoted),
                additional,
            };
            return (bucket, OperationResult::SizeChanged);
        }
        let Some(index) = self.additional.iter().position(|existing| matches(existing)) else {
            return (self.clone(), OperationResult::NoChangeRequired);
        };
        let mut additional = self.additional.clone();
        additional.remove_at(index);
        additional.freeze();
        let bucket = Self {
            first: Some(first.clone()),
            additional,
        };
        (bucket, OperationResult::SizeChanged)
    }
}

// =============================================================================
// Hash-code Tree
// =============================================================================

/// One element of the hash-code tree.
#[derive(Clone)]
pub(crate) struct HashSlot<T> {
    hash_code: u64,
    bucket: HashBucket<T>,
}

impl<T> HashSlot<T> {
    #[inline]
    pub(crate) const fn bucket(&self) -> &HashBucket<T> {
        &self.bucket
    }
}

/// Returns the bucket for `hash_code`.
pub(crate) fn find_bucket<T>(tree: &Tree<HashSlot<T>>, hash_code: u64) -> Option<&HashBucket<T>> {
    tree.find(|slot| hash_code.cmp(&slot.hash_code))
        .map(HashSlot::bucket)
}

fn store_bucket<T: Clone>(tree: &mut Tree<HashSlot<T>>, hash_code: u64, bucket: HashBucket<T>) {
    if bucket.is_empty() {
        tree.remove_by(&|slot: &HashSlot<T>| hash_code.cmp(&slot.hash_code));
    } else {
        tree.insert_by(
            HashSlot { hash_code, bucket },
            &|new: &HashSlot<T>, existing: &HashSlot<T>| new.hash_code.cmp(&existing.hash_code),
        );
    }
}

/// Adds `element` under `hash_code`. The tree is only written when the
/// result is not [`OperationResult::NoChangeRequired`].
///
/// # Errors
///
/// [`CollectionError::DuplicateKey`] as dictated by `behavior`.
pub(crate) fn add_element<T, M, S>(
    tree: &mut Tree<HashSlot<T>>,
    hash_code: u64,
    element: T,
    same_key: M,
    same_value: S,
    behavior: KeyCollisionBehavior,
) -> Result<OperationResult, CollectionError>
where
    T: Clone,
    M: Fn(&T, &T) -> bool,
    S: Fn(&T, &T) -> bool,
{
    let (bucket, result) = match find_bucket(tree, hash_code) {
        Some(bucket) => {
            let (bucket, result) = bucket.add(element, same_key, same_value, behavior)?;
            if result == OperationResult::SizeChanged {
                tracing::trace!(hash_code, entries = bucket.len(), "hash collision");
            }
            (bucket, result)
        }
        None => (HashBucket::single(element), OperationResult::SizeChanged),
    };
    if result != OperationResult::NoChangeRequired {
        store_bucket(tree, hash_code, bucket);
    }
    Ok(result)
}

/// Removes the entry matched by `matches` under `hash_code`.
pub(crate) fn remove_element<T, M>(
    tree: &mut Tree<HashSlot<T>>,
    hash_code: u64,
    matches: M,
) -> OperationResult
where
    T: Clone,
    M: Fn(&T) -> bool,
{
    let Some(bucket) = find_bucket(tree, hash_code) else {
        return OperationResult::NoChangeRequired;
    };
    let (bucket, result) = bucket.remove(matches);
    if result != OperationResult::NoChangeRequired {
        store_bucket(tree, hash_code, bucket);
    }
    result
}

/// Adjusts a cached element count after an operation.
pub(crate) const fn adjust_count(count: usize, result: OperationResult, added: bool) -> usize {
    match result {
        OperationResult::SizeChanged if added => count + 1,
        OperationResult::SizeChanged => count - 1,
        _ => count,
    }
}

// =============================================================================
// Flattening Iterator
// =============================================================================

/// Iterator over every entry of a hash-code tree, bucket by bucket.
///
/// The order follows hash codes and is otherwise unspecified.
pub struct HashIter<'a, T> {
    slots: Iter<'a, HashSlot<T>>,
    first: Option<&'a T>,
    additional: Option<Iter<'a, T>>,
    remaining: usize,
}

impl<'a, T> HashIter<'a, T> {
    /// Creates an iterator over `tree`, which holds `count` entries in total.
    pub(crate) fn new(tree: &'a Tree<HashSlot<T>>, count: usize) -> Self {
        Self {
            slots: tree.iter(),
            first: None,
            additional: None,
            remaining: count,
        }
    }
}

impl<'a, T> Iterator for HashIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(first) = self.first.take() {
                self.remaining = self.remaining.saturating_sub(1);
                return Some(first);
            }
            if let Some(element) = self.additional.as_mut().and_then(Iterator::next) {
                self.remaining = self.remaining.saturating_sub(1);
                return Some(element);
            }
            let slot = self.slots.next()?;
            self.first = slot.bucket.first.as_ref();
            self.additional = Some(slot.bucket.additional.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for HashIter<'_, T> {}

impl<T> FusedIterator for HashIter<'_, T> {}

impl<T> Clone for HashIter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            first: self.first,
            additional: self.additional.clone(),
            remaining: self.remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn same_key(key: i32) -> impl Fn(&(i32, char)) -> bool {
        move |(existing, _)| *existing == key
    }

    fn same_entry_key(left: &(i32, char), right: &(i32, char)) -> bool {
        left.0 == right.0
    }

    fn same_value(left: &(i32, char), right: &(i32, char)) -> bool {
        left.1 == right.1
    }

    fn bucket_of(entries: &[(i32, char)]) -> HashBucket<(i32, char)> {
        let mut bucket = HashBucket::empty();
        for entry in entries {
            bucket = bucket
                .add(*entry, same_entry_key, same_value, KeyCollisionBehavior::ThrowAlways)
                .unwrap()
                .0;
        }
        bucket
    }

    #[rstest]
    #[case(KeyCollisionBehavior::SetValue, true, Ok(false))]
    #[case(KeyCollisionBehavior::SetValue, false, Ok(true))]
    #[case(KeyCollisionBehavior::Skip, false, Ok(false))]
    #[case(KeyCollisionBehavior::ThrowIfValueDifferent, true, Ok(false))]
    #[case(KeyCollisionBehavior::ThrowIfValueDifferent, false, Err(CollectionError::DuplicateKey))]
    #[case(KeyCollisionBehavior::ThrowAlways, true, Err(CollectionError::DuplicateKey))]
    fn test_collision_resolution(
        #[case] behavior: KeyCollisionBehavior,
        #[case] same: bool,
        #[case] expected: Result<bool, CollectionError>,
    ) {
        assert_eq!(behavior.resolve(same), expected);
    }

    #[rstest]
    fn test_add_to_empty_bucket() {
        let (bucket, result) = HashBucket::empty()
            .add((1, 'a'), same_entry_key, same_value, KeyCollisionBehavior::SetValue)
            .unwrap();
        assert_eq!(result, OperationResult::SizeChanged);
        assert_eq!(bucket.len(), 1);
    }

    #[rstest]
    fn test_colliding_entries_go_to_overflow() {
        let bucket = bucket_of(&[(1, 'a'), (2, 'b'), (3, 'c')]);
        assert_eq!(bucket.len(), 3);
        assert_eq!(bucket.find(same_key(3)), Some(&(3, 'c')));
        assert_eq!(bucket.find(same_key(4)), None);
    }

    #[rstest]
    fn test_set_value_in_overflow() {
        let bucket = bucket_of(&[(1, 'a'), (2, 'b')]);
        let (updated, result) = bucket
            .add((2, 'z'), same_entry_key, same_value, KeyCollisionBehavior::SetValue)
            .unwrap();
        assert_eq!(result, OperationResult::AppliedWithoutSizeChange);
        assert_eq!(updated.find(same_key(2)), Some(&(2, 'z')));
        assert_eq!(bucket.find(same_key(2)), Some(&(2, 'b')));
    }

    #[rstest]
    fn test_equal_value_requires_no_change() {
        let bucket = bucket_of(&[(1, 'a'), (2, 'b')]);
        for key in [1, 2] {
            let value = if key == 1 { 'a' } else { 'b' };
            let (_, result) = bucket
                .add((key, value), same_entry_key, same_value, KeyCollisionBehavior::ThrowIfValueDifferent)
                .unwrap();
            assert_eq!(result, OperationResult::NoChangeRequired);
        }
    }

    #[rstest]
    fn test_remove_first_promotes_overflow() {
        let bucket = bucket_of(&[(1, 'a'), (2, 'b'), (3, 'c')]);
        let (bucket, result) = bucket.remove(same_key(1));
        assert_eq!(result, OperationResult::SizeChanged);
        assert_eq!(bucket.first, Some((2, 'b')));
        assert_eq!(bucket.len(), 2);
    }

    #[rstest]
    fn test_remove_last_entry_empties_bucket() {
        let (bucket, result) = bucket_of(&[(1, 'a')]).remove(same_key(1));
        assert_eq!(result, OperationResult::SizeChanged);
        assert!(bucket.is_empty());
    }

    #[rstest]
    fn test_remove_missing_entry() {
        let (_, result) = bucket_of(&[(1, 'a'), (2, 'b')]).remove(same_key(9));
        assert_eq!(result, OperationResult::NoChangeRequired);
    }

    #[rstest]
    fn test_tree_operations_share_one_slot_per_hash() {
        let mut tree = Tree::Empty;
        for (hash_code, key) in [(7, 1), (7, 2), (3, 3)] {
            let result = add_element(
                &mut tree,
                hash_code,
                (key, 'x'),
                same_entry_key,
                same_value,
                KeyCollisionBehavior::ThrowIfValueDifferent,
            )
            .unwrap();
            assert_eq!(result, OperationResult::SizeChanged);
        }
        assert_eq!(tree.count(), 2);
        assert_eq!(HashIter::new(&tree, 3).count(), 3);

        assert_eq!(remove_element(&mut tree, 7, same_key(1)), OperationResult::SizeChanged);
        assert_eq!(remove_element(&mut tree, 7, same_key(2)), OperationResult::SizeChanged);
        assert_eq!(tree.count(), 1);
        assert!(find_bucket(&tree, 7).is_none());
        assert_eq!(remove_element(&mut tree, 5, same_key(1)), OperationResult::NoChangeRequired);
    }

    #[rstest]
    fn test_no_change_leaves_tree_identical() {
        let mut tree = Tree::Empty;
        add_element(&mut tree, 1, (1, 'a'), same_entry_key, same_value, KeyCollisionBehavior::SetValue).unwrap();
        tree.freeze();
        let before = tree.clone();
        let result =
            add_element(&mut tree, 1, (1, 'a'), same_entry_key, same_value, KeyCollisionBehavior::SetValue).unwrap();
        assert_eq!(result, OperationResult::NoChangeRequired);
        assert!(tree.ptr_eq(&before));
    }

    #[rstest]
    #[case(3, OperationResult::SizeChanged, true, 4)]
    #[case(3, OperationResult::SizeChanged, false, 2)]
    #[case(3, OperationResult::AppliedWithoutSizeChange, true, 3)]
    #[case(3, OperationResult::NoChangeRequired, false, 3)]
    fn test_adjust_count(
        #[case] count: usize,
        #[case] result: OperationResult,
        #[case] added: bool,
        #[case] expected: usize,
    ) {
        assert_eq!(adjust_count(count, result, added), expected);
    }
}
