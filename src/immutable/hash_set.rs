//! Immutable hash set.
//!
//! [`ImmutableHashSet`] shares the hash-code tree of
//! [`ImmutableHashMap`](super::ImmutableHashMap), storing bare elements in
//! its buckets instead of entries.
//!
//! # Examples
//!
//! ```rust
//! use arbor_collections::immutable::ImmutableHashSet;
//!
//! let set: ImmutableHashSet<&str> = ["red", "green"].into_iter().collect();
//! let more = set.add("blue");
//!
//! assert!(more.contains(&"blue"));
//! assert!(!set.contains(&"blue"));
//! ```

use std::fmt;
use std::hash::Hash;
use std::iter::FromIterator;

use super::enumerator::{HashEnumerator, VersionStamp};
use super::hash_bucket::{
    HashIter, HashSlot, KeyCollisionBehavior, OperationResult, add_element, adjust_count,
    find_bucket, remove_element,
};
use super::node::Tree;
use crate::comparer::{DefaultHashComparer, HashComparer};
use crate::traits::{CollectionBuilder, ImmutableCollection, ImmutableSet, ToBuilder};

type SlotTree<T> = Tree<HashSlot<T>>;

// =============================================================================
// Shared Tree Algorithms
// =============================================================================

fn lookup<'a, T, H: HashComparer<T>>(tree: &'a SlotTree<T>, value: &T, comparer: &H) -> Option<&'a T> {
    find_bucket(tree, comparer.hash_code(value))?.find(|existing| comparer.equals(existing, value))
}

fn insert<T: Clone, H: HashComparer<T>>(
    tree: &mut SlotTree<T>,
    count: &mut usize,
    value: T,
    comparer: &H,
) -> bool {
    let hash_code = comparer.hash_code(&value);
    let result = add_element(
        tree,
        hash_code,
        value,
        |existing: &T, new: &T| comparer.equals(existing, new),
        |_: &T, _: &T| true,
        KeyCollisionBehavior::Skip,
    )
    .unwrap_or(OperationResult::NoChangeRequired);
    *count = adjust_count(*count, result, true);
    result == OperationResult::SizeChanged
}

fn delete<T: Clone, H: HashComparer<T>>(
    tree: &mut SlotTree<T>,
    count: &mut usize,
    value: &T,
    comparer: &H,
) -> bool {
    let result = remove_element(tree, comparer.hash_code(value), |existing: &T| {
        comparer.equals(existing, value)
    });
    *count = adjust_count(*count, result, false);
    result == OperationResult::SizeChanged
}

/// The working state of a set operation: a tree and its element count.
struct Contents<'c, T, H> {
    root: SlotTree<T>,
    count: usize,
    comparer: &'c H,
}

impl<'c, T: Clone, H: HashComparer<T>> Contents<'c, T, H> {
    const fn new(root: SlotTree<T>, count: usize, comparer: &'c H) -> Self {
        Self { root, count, comparer }
    }

    fn add(&mut self, value: T) -> bool {
        insert(&mut self.root, &mut self.count, value, self.comparer)
    }

    fn remove(&mut self, value: &T) -> bool {
        delete(&mut self.root, &mut self.count, value, self.comparer)
    }

    fn union<I: IntoIterator<Item = T>>(&mut self, other: I) {
        for value in other {
            self.add(value);
        }
    }

    fn intersect<I: IntoIterator<Item = T>>(&mut self, other: I) {
        let mut result = Contents::new(Tree::Empty, 0, self.comparer);
        for value in other {
            if let Some(existing) = lookup(&self.root, &value, self.comparer) {
                result.add(existing.clone());
            }
        }
        if result.count != self.count {
            *self = result;
        }
    }

    fn except<I: IntoIterator<Item = T>>(&mut self, other: I) {
        for value in other {
            if self.count == 0 {
                return;
            }
            self.remove(&value);
        }
    }

    fn symmetric_except<I: IntoIterator<Item = T>>(&mut self, other: I) {
        let mut distinct = Contents::new(Tree::Empty, 0, self.comparer);
        distinct.union(other);
        for value in HashIter::new(&distinct.root, distinct.count) {
            if !self.remove(value) {
                self.add(value.clone());
            }
        }
    }
}

// =============================================================================
// ImmutableHashSet Definition
// =============================================================================

/// An immutable hash set.
///
/// Elements are compared with a [`HashComparer`]; adding an element equal to
/// one already present keeps the stored element and returns an identical
/// set.
///
/// # Examples
///
/// ```rust
/// use arbor_collections::immutable::ImmutableHashSet;
/// use arbor_collections::traits::ImmutableSet;
///
/// let evens: ImmutableHashSet<u32> = (0..10).step_by(2).collect();
/// let small: ImmutableHashSet<u32> = (0..5).collect();
///
/// let both = evens.intersect(small.iter().copied());
/// assert_eq!(both.len(), 3);
/// assert!(both.is_subset_of(&evens));
/// ```
pub struct ImmutableHashSet<T, H = DefaultHashComparer> {
    root: SlotTree<T>,
    count: usize,
    comparer: H,
}

impl<T, H: Clone> Clone for ImmutableHashSet<T, H> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            count: self.count,
            comparer: self.comparer.clone(),
        }
    }
}

impl<T: Hash + Eq> ImmutableHashSet<T> {
    /// Creates an empty set with the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparer(DefaultHashComparer::default())
    }
}

impl<T, H> ImmutableHashSet<T, H> {
    /// Creates an empty set that compares elements with `comparer`.
    #[must_use]
    pub const fn with_comparer(comparer: H) -> Self {
        Self {
            root: Tree::Empty,
            count: 0,
            comparer,
        }
    }

    /// Returns the element comparer.
    pub const fn comparer(&self) -> &H {
        &self.comparer
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the set has no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterates over the elements in unspecified order.
    pub fn iter(&self) -> HashIter<'_, T> {
        HashIter::new(&self.root, self.count)
    }

    /// Returns a detached enumerator over the elements.
    pub fn enumerator(&self) -> HashEnumerator<T>
    where
        T: Send + Sync + 'static,
    {
        HashEnumerator::new(self.root.clone(), None)
    }
}

impl<T: Clone, H: HashComparer<T>> ImmutableHashSet<T, H> {
    fn contents(&self) -> Contents<'_, T, H> {
        Contents::new(self.root.clone(), self.count, &self.comparer)
    }

    fn publish(&self, contents: Contents<'_, T, H>) -> Self {
        let Contents { root, count, .. } = contents;
        if root.ptr_eq(&self.root) {
            return self.clone();
        }
        root.freeze();
        Self {
            root,
            count,
            comparer: self.comparer.clone(),
        }
    }

    /// Returns `true` if the set contains `value`.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        lookup(&self.root, value, &self.comparer).is_some()
    }

    /// Returns the stored element equal to `value`.
    #[must_use]
    pub fn try_get_value(&self, value: &T) -> Option<&T> {
        lookup(&self.root, value, &self.comparer)
    }

    /// Returns a set that also contains `value`.
    #[must_use]
    pub fn add(&self, value: T) -> Self {
        let mut contents = self.contents();
        contents.add(value);
        self.publish(contents)
    }

    /// Returns a set without `value`.
    #[must_use]
    pub fn remove(&self, value: &T) -> Self {
        let mut contents = self.contents();
        contents.remove(value);
        self.publish(contents)
    }

    /// Returns the union of this set and `other`.
    #[must_use]
    pub fn union<I: IntoIterator<Item = T>>(&self, other: I) -> Self {
        let mut contents = self.contents();
        contents.union(other);
        self.publish(contents)
    }

    /// Returns the elements of this set that also occur in `other`.
    #[must_use]
    pub fn intersect<I: IntoIterator<Item = T>>(&self, other: I) -> Self {
        let mut contents = self.contents();
        contents.intersect(other);
        self.publish(contents)
    }

    /// Returns the elements of this set that do not occur in `other`.
    #[must_use]
    pub fn except<I: IntoIterator<Item = T>>(&self, other: I) -> Self {
        let mut contents = self.contents();
        contents.except(other);
        self.publish(contents)
    }

    /// Returns the elements in exactly one of this set and `other`.
    #[must_use]
    pub fn symmetric_except<I: IntoIterator<Item = T>>(&self, other: I) -> Self {
        let mut contents = self.contents();
        contents.symmetric_except(other);
        self.publish(contents)
    }

    /// Returns an empty set with the same comparer.
    #[must_use]
    pub fn clear(&self) -> Self {
        Self::with_comparer(self.comparer.clone())
    }

    /// Returns the same elements under `comparer`.
    ///
    /// Elements the new comparer considers equal collapse into one.
    #[must_use]
    pub fn change_comparer<H2: HashComparer<T>>(&self, comparer: H2) -> ImmutableHashSet<T, H2> {
        ImmutableHashSet::with_comparer(comparer).union(self.iter().cloned())
    }

    /// Creates a builder seeded with this set.
    #[must_use]
    pub fn to_builder(&self) -> HashSetBuilder<T, H> {
        HashSetBuilder {
            root: self.root.clone(),
            count: self.count,
            comparer: self.comparer.clone(),
            immutable: Some(self.clone()),
            version: VersionStamp::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_valid(&self) {
        self.root.assert_valid();
        assert!(self.root.is_deep_frozen(), "published set has unfrozen nodes");
        assert_eq!(self.iter().count(), self.count, "stale element count");
    }
}

// =============================================================================
// HashSetBuilder
// =============================================================================

/// A mutable front end for batch edits to an [`ImmutableHashSet`].
pub struct HashSetBuilder<T, H = DefaultHashComparer> {
    root: SlotTree<T>,
    count: usize,
    comparer: H,
    immutable: Option<ImmutableHashSet<T, H>>,
    version: VersionStamp,
}

impl<T: Hash + Eq> HashSetBuilder<T> {
    /// Creates an empty builder with the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparer(DefaultHashComparer::default())
    }
}

impl<T: Hash + Eq> Default for HashSetBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, H> HashSetBuilder<T, H> {
    /// Creates an empty builder that compares elements with `comparer`.
    #[must_use]
    pub fn with_comparer(comparer: H) -> Self {
        Self {
            root: Tree::Empty,
            count: 0,
            comparer,
            immutable: None,
            version: VersionStamp::new(),
        }
    }

    /// Returns the number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the builder holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterates over the elements in unspecified order.
    pub fn iter(&self) -> HashIter<'_, T> {
        HashIter::new(&self.root, self.count)
    }

    /// Returns a detached enumerator that fails once this builder changes.
    pub fn enumerator(&self) -> HashEnumerator<T>
    where
        T: Send + Sync + 'static,
    {
        HashEnumerator::new(self.root.clone(), Some(self.version.clone()))
    }

    fn touch(&mut self) {
        self.version.bump();
        self.immutable = None;
    }
}

impl<T: Clone, H: HashComparer<T>> HashSetBuilder<T, H> {
    /// Runs a set operation on the builder's contents, dropping the cached
    /// snapshot if the root changed.
    fn apply<F: FnOnce(&mut Contents<'_, T, H>)>(&mut self, operation: F) {
        let root = std::mem::take(&mut self.root);
        let previous = root.clone();
        let mut contents = Contents::new(root, self.count, &self.comparer);
        operation(&mut contents);
        let Contents { root, count, .. } = contents;
        if !root.ptr_eq(&previous) {
            self.touch();
        }
        self.root = root;
        self.count = count;
    }

    /// Returns `true` if the builder contains `value`.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        lookup(&self.root, value, &self.comparer).is_some()
    }

    /// Returns the stored element equal to `value`.
    #[must_use]
    pub fn try_get_value(&self, value: &T) -> Option<&T> {
        lookup(&self.root, value, &self.comparer)
    }

    /// Adds `value`. Returns `false` if an equal element was present.
    pub fn add(&mut self, value: T) -> bool {
        let added = insert(&mut self.root, &mut self.count, value, &self.comparer);
        if added {
            self.touch();
        }
        added
    }

    /// Removes `value`. Returns `false` if it was absent.
    pub fn remove(&mut self, value: &T) -> bool {
        let removed = delete(&mut self.root, &mut self.count, value, &self.comparer);
        if removed {
            self.touch();
        }
        removed
    }

    /// Adds every element of `other`.
    pub fn union_with<I: IntoIterator<Item = T>>(&mut self, other: I) {
        self.apply(|contents| contents.union(other));
    }

    /// Keeps only the elements that also occur in `other`.
    pub fn intersect_with<I: IntoIterator<Item = T>>(&mut self, other: I) {
        self.apply(|contents| contents.intersect(other));
    }

    /// Removes every element that occurs in `other`.
    pub fn except_with<I: IntoIterator<Item = T>>(&mut self, other: I) {
        self.apply(|contents| contents.except(other));
    }

    /// Keeps the elements in exactly one of this builder and `other`.
    pub fn symmetric_except_with<I: IntoIterator<Item = T>>(&mut self, other: I) {
        self.apply(|contents| contents.symmetric_except(other));
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        if self.count > 0 {
            self.root = Tree::Empty;
            self.count = 0;
            self.touch();
        }
    }

    /// Publishes the current contents as an [`ImmutableHashSet`].
    pub fn to_immutable(&mut self) -> ImmutableHashSet<T, H> {
        if let Some(immutable) = &self.immutable {
            return immutable.clone();
        }
        tracing::trace!(length = self.count, "publishing hash set builder snapshot");
        self.root.freeze();
        let immutable = ImmutableHashSet {
            root: self.root.clone(),
            count: self.count,
            comparer: self.comparer.clone(),
        };
        self.immutable = Some(immutable.clone());
        immutable
    }
}

impl<T: Clone, H: HashComparer<T>> Extend<T> for HashSetBuilder<T, H> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.union_with(iter);
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T: Hash + Eq> Default for ImmutableHashSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq + Clone> FromIterator<T> for ImmutableHashSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut builder = HashSetBuilder::new();
        builder.union_with(iter);
        builder.to_immutable()
    }
}

impl<'a, T, H> IntoIterator for &'a ImmutableHashSet<T, H> {
    type Item = &'a T;
    type IntoIter = HashIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone, H: HashComparer<T>> PartialEq for ImmutableHashSet<T, H> {
    fn eq(&self, other: &Self) -> bool {
        self.root.ptr_eq(&other.root) || self.set_equals(other)
    }
}

impl<T: Clone, H: HashComparer<T>> Eq for ImmutableHashSet<T, H> {}

impl<T: fmt::Debug, H> fmt::Debug for ImmutableHashSet<T, H> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Debug, H> fmt::Debug for HashSetBuilder<T, H> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Clone, H: HashComparer<T>> ImmutableCollection for ImmutableHashSet<T, H> {
    fn len(&self) -> usize {
        self.count
    }

    fn clear(&self) -> Self {
        Self::clear(self)
    }
}

impl<T: Clone, H: HashComparer<T>> ImmutableSet<T> for ImmutableHashSet<T, H> {
    fn add(&self, value: T) -> Self {
        Self::add(self, value)
    }

    fn remove(&self, value: &T) -> Self {
        Self::remove(self, value)
    }

    fn contains(&self, value: &T) -> bool {
        Self::contains(self, value)
    }

    fn elements<'a>(&'a self) -> impl Iterator<Item = &'a T>
    where
        T: 'a,
    {
        self.iter()
    }

    fn union<I: IntoIterator<Item = T>>(&self, other: I) -> Self {
        Self::union(self, other)
    }

    fn intersect<I: IntoIterator<Item = T>>(&self, other: I) -> Self {
        Self::intersect(self, other)
    }

    fn except<I: IntoIterator<Item = T>>(&self, other: I) -> Self {
        Self::except(self, other)
    }

    fn symmetric_except<I: IntoIterator<Item = T>>(&self, other: I) -> Self {
        Self::symmetric_except(self, other)
    }
}

impl<T: Clone, H: HashComparer<T>> ToBuilder for ImmutableHashSet<T, H> {
    type Builder = HashSetBuilder<T, H>;

    fn to_builder(&self) -> Self::Builder {
        Self::to_builder(self)
    }
}

impl<T: Clone, H: HashComparer<T>> CollectionBuilder for HashSetBuilder<T, H> {
    type Immutable = ImmutableHashSet<T, H>;

    fn len(&self) -> usize {
        self.count
    }

    fn to_immutable(&mut self) -> Self::Immutable {
        Self::to_immutable(self)
    }
}

// =============================================================================
// Tests
// =============================================================================
