//! Immutable sorted set backed by a keyed AVL tree.
//!
//! [`ImmutableSortedSet`] keeps its elements ordered by a [`Comparer`]. The
//! same tree nodes also carry subtree counts, so the set supports positional
//! reads (`get(index)`, `index_of`) in `O(log N)` alongside keyed lookups.
//!
//! # Examples
//!
//! ```rust
//! use arbor_collections::immutable::ImmutableSortedSet;
//!
//! let set: ImmutableSortedSet<i32> = [5, 1, 4, 1, 3].into_iter().collect();
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3, 4, 5]);
//! assert_eq!(set.get(0), Some(&1));
//! assert_eq!(set.index_of(&4), Ok(2));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;

use super::enumerator::{Enumerator, VersionStamp};
use super::iter::Iter;
use super::node::Tree;
use crate::comparer::{Comparer, NaturalOrder};
use crate::traits::{
    CollectionBuilder, ImmutableCollection, ImmutableIndexed, ImmutableSet, ToBuilder,
};

// =============================================================================
// Shared Tree Algorithms
// =============================================================================

fn find<'a, T, C: Comparer<T>>(tree: &'a Tree<T>, value: &T, comparer: &C) -> Option<&'a T> {
    tree.find(|existing| comparer.compare(value, existing))
}

/// Adds `value` unless an equal element is present. Returns `true` if added.
fn add_to<T: Clone, C: Comparer<T>>(tree: &mut Tree<T>, value: T, comparer: &C) -> bool {
    if find(tree, &value, comparer).is_some() {
        return false;
    }
    tree.insert_by(value, &|new: &T, existing: &T| comparer.compare(new, existing));
    true
}

/// Removes the element equal to `value`. Returns `true` if one was present.
fn remove_from<T: Clone, C: Comparer<T>>(tree: &mut Tree<T>, value: &T, comparer: &C) -> bool {
    tree.remove_by(&|existing: &T| comparer.compare(value, existing))
        .is_some()
}

/// Sorts `elements` with `comparer`, keeps the first of each run of equal
/// elements and builds a balanced tree.
fn build_sorted<T, C: Comparer<T>>(mut elements: Vec<T>, comparer: &C) -> Tree<T> {
    elements.sort_by(|left, right| comparer.compare(left, right));
    elements.dedup_by(|later, earlier| comparer.compare(later, earlier) == Ordering::Equal);
    let count = elements.len();
    Tree::from_ordered(elements.into_iter(), count)
}

fn union_into<T: Clone, C: Comparer<T>, I: IntoIterator<Item = T>>(
    tree: &mut Tree<T>,
    other: I,
    comparer: &C,
) {
    if tree.is_empty() {
        *tree = build_sorted(other.into_iter().collect(), comparer);
        return;
    }
    for value in other {
        add_to(tree, value, comparer);
    }
}

/// Replaces `tree` with the elements also yielded by `other`.
///
/// Elements are kept as stored in `tree`, not as yielded by `other`.
fn intersect_into<T: Clone, C: Comparer<T>, I: IntoIterator<Item = T>>(
    tree: &mut Tree<T>,
    other: I,
    comparer: &C,
) {
    let mut result = Tree::Empty;
    for value in other {
        if let Some(existing) = find(tree, &value, comparer) {
            add_to(&mut result, existing.clone(), comparer);
        }
    }
    if result.count() != tree.count() {
        *tree = result;
    }
}

fn except_into<T: Clone, C: Comparer<T>, I: IntoIterator<Item = T>>(
    tree: &mut Tree<T>,
    other: I,
    comparer: &C,
) {
    for value in other {
        if tree.is_empty() {
            return;
        }
        remove_from(tree, &value, comparer);
    }
}

fn symmetric_except_into<T: Clone, C: Comparer<T>, I: IntoIterator<Item = T>>(
    tree: &mut Tree<T>,
    other: I,
    comparer: &C,
) {
    let other = build_sorted(other.into_iter().collect(), comparer);
    if other.is_empty() {
        return;
    }
    let mut elements: Vec<T> = tree
        .iter()
        .filter(|value| find(&other, value, comparer).is_none())
        .cloned()
        .collect();
    elements.extend(
        other
            .iter()
            .filter(|value| find(tree, value, comparer).is_none())
            .cloned(),
    );
    *tree = build_sorted(elements, comparer);
}

/// Returns the index window of elements between `lower` and `upper`, inclusive.
fn window<T, C: Comparer<T>>(tree: &Tree<T>, lower: &T, upper: &T, comparer: &C) -> (usize, usize) {
    if comparer.compare(lower, upper) == Ordering::Greater {
        return (0, 0);
    }
    let start = tree
        .position(|existing| comparer.compare(lower, existing))
        .unwrap_or_else(|insertion| insertion);
    let end = match tree.position(|existing| comparer.compare(upper, existing)) {
        Ok(found) => found + 1,
        Err(insertion) => insertion,
    };
    (start, end.saturating_sub(start))
}

// =============================================================================
// ImmutableSortedSet Definition
// =============================================================================

/// An immutable set whose elements are kept in comparer order.
///
/// Equality of elements is decided by the comparer alone: two values are the
/// same element when `compare` returns [`Ordering::Equal`]. Adding a value
/// equal to a present element leaves the set unchanged and keeps the
/// element already stored.
///
/// # Type Parameters
///
/// - `T`: element type
/// - `C`: the [`Comparer`] defining the order, [`NaturalOrder`] by default
///
/// # Time Complexity
///
/// | Operation  | Complexity |
/// |------------|------------|
/// | `contains` | O(log N)   |
/// | `add`      | O(log N)   |
/// | `remove`   | O(log N)   |
/// | `get`      | O(log N)   |
/// | `index_of` | O(log N)   |
/// | `min`/`max`| O(log N)   |
///
/// # Examples
///
/// ```rust
/// use arbor_collections::comparer::{NaturalOrder, ReverseOrder};
/// use arbor_collections::immutable::ImmutableSortedSet;
///
/// let descending = ImmutableSortedSet::with_comparer(ReverseOrder(NaturalOrder))
///     .add(1)
///     .add(3)
///     .add(2);
/// assert_eq!(descending.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
/// ```
pub struct ImmutableSortedSet<T, C = NaturalOrder> {
    root: Tree<T>,
    comparer: C,
}

impl<T, C: Clone> Clone for ImmutableSortedSet<T, C> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            comparer: self.comparer.clone(),
        }
    }
}

impl<T: Ord> ImmutableSortedSet<T> {
    /// Creates an empty set in natural order.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparer(NaturalOrder)
    }
}

impl<T, C> ImmutableSortedSet<T, C> {
    /// Creates an empty set ordered by `comparer`.
    #[inline]
    #[must_use]
    pub const fn with_comparer(comparer: C) -> Self {
        Self {
            root: Tree::Empty,
            comparer,
        }
    }

    /// Returns the comparer that orders this set.
    #[inline]
    pub const fn comparer(&self) -> &C {
        &self.comparer
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Returns `true` if the set has no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Returns the element at `index` in sorted order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.root.get(index)
    }

    /// Returns the smallest element.
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        self.root.first()
    }

    /// Returns the largest element.
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        self.root.last()
    }

    /// Iterates over the elements in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.root.iter()
    }

    /// Iterates over the elements in descending order.
    pub fn iter_rev(&self) -> Iter<'_, T> {
        self.root.iter_window(0, self.len(), true)
    }

    /// Returns a detached enumerator over the set in ascending order.
    pub fn enumerator(&self) -> Enumerator<T>
    where
        T: Send + Sync + 'static,
    {
        Enumerator::new(self.root.clone(), 0, self.len(), false, None)
    }

    /// Returns a detached enumerator over the set in descending order.
    pub fn enumerator_rev(&self) -> Enumerator<T>
    where
        T: Send + Sync + 'static,
    {
        Enumerator::new(self.root.clone(), 0, self.len(), true, None)
    }
}

impl<T, C: Comparer<T>> ImmutableSortedSet<T, C> {
    fn wrap(&self, root: Tree<T>) -> Self {
        if root.ptr_eq(&self.root) {
            return self.clone();
        }
        root.freeze();
        Self {
            root,
            comparer: self.comparer.clone(),
        }
    }

    /// Returns `true` if the set contains an element equal to `value`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        find(&self.root, value, &self.comparer).is_some()
    }

    /// Returns the stored element equal to `value`.
    ///
    /// Useful when the comparer treats distinct values as equal and the
    /// canonical stored instance is wanted.
    #[must_use]
    pub fn try_get_value(&self, value: &T) -> Option<&T> {
        find(&self.root, value, &self.comparer)
    }

    /// Returns `Ok(index)` of the element equal to `value`, or `Err(index)`
    /// of the position where it would be inserted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbor_collections::immutable::ImmutableSortedSet;
    ///
    /// let set: ImmutableSortedSet<i32> = [10, 20, 30].into_iter().collect();
    /// assert_eq!(set.index_of(&20), Ok(1));
    /// assert_eq!(set.index_of(&25), Err(2));
    /// ```
    pub fn index_of(&self, value: &T) -> Result<usize, usize> {
        self.root
            .position(|existing| self.comparer.compare(value, existing))
    }

    /// Iterates over the elements between `lower` and `upper`, inclusive.
    ///
    /// Yields nothing when `lower` orders after `upper`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbor_collections::immutable::ImmutableSortedSet;
    ///
    /// let set: ImmutableSortedSet<i32> = (0..10).collect();
    /// assert_eq!(set.range(&3, &6).copied().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
    /// ```
    pub fn range(&self, lower: &T, upper: &T) -> Iter<'_, T> {
        let (start, count) = window(&self.root, lower, upper, &self.comparer);
        self.root.iter_window(start, count, false)
    }
}

impl<T: Clone, C: Comparer<T>> ImmutableSortedSet<T, C> {
    fn edited<F: FnOnce(&mut Tree<T>, &C)>(&self, edit: F) -> Self {
        let mut root = self.root.clone();
        edit(&mut root, &self.comparer);
        self.wrap(root)
    }

    /// Returns a set that also contains `value`.
    ///
    /// Returns an identical set if an equal element is already present.
    ///
    /// # Complexity
    ///
    /// O(log N)
    #[must_use]
    pub fn add(&self, value: T) -> Self {
        self.edited(|root, comparer| {
            add_to(root, value, comparer);
        })
    }

    /// Returns a set without the element equal to `value`.
    ///
    /// Returns an identical set if no such element is present.
    #[must_use]
    pub fn remove(&self, value: &T) -> Self {
        self.edited(|root, comparer| {
            remove_from(root, value, comparer);
        })
    }

    /// Returns the union of this set and `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbor_collections::immutable::ImmutableSortedSet;
    ///
    /// let set: ImmutableSortedSet<i32> = [1, 2].into_iter().collect();
    /// let union = set.union([2, 3]);
    /// assert_eq!(union.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    /// ```
    #[must_use]
    pub fn union<I: IntoIterator<Item = T>>(&self, other: I) -> Self {
        self.edited(|root, comparer| union_into(root, other, comparer))
    }

    /// Returns the elements of this set that also occur in `other`.
    #[must_use]
    pub fn intersect<I: IntoIterator<Item = T>>(&self, other: I) -> Self {
        self.edited(|root, comparer| intersect_into(root, other, comparer))
    }

    /// Returns the elements of this set that do not occur in `other`.
    #[must_use]
    pub fn except<I: IntoIterator<Item = T>>(&self, other: I) -> Self {
        self.edited(|root, comparer| except_into(root, other, comparer))
    }

    /// Returns the elements in exactly one of this set and `other`.
    #[must_use]
    pub fn symmetric_except<I: IntoIterator<Item = T>>(&self, other: I) -> Self {
        self.edited(|root, comparer| symmetric_except_into(root, other, comparer))
    }

    /// Returns an empty set with the same comparer.
    #[must_use]
    pub fn clear(&self) -> Self {
        Self::with_comparer(self.comparer.clone())
    }

    /// Returns the same elements ordered by `comparer`.
    ///
    /// Elements the new comparer considers equal collapse into the first one
    /// in the current order.
    #[must_use]
    pub fn change_comparer<D: Comparer<T>>(&self, comparer: D) -> ImmutableSortedSet<T, D> {
        let root = build_sorted(self.root.to_vec(), &comparer);
        root.freeze();
        ImmutableSortedSet { root, comparer }
    }

    /// Creates a builder seeded with this set.
    #[must_use]
    pub fn to_builder(&self) -> SortedSetBuilder<T, C> {
        SortedSetBuilder {
            root: self.root.clone(),
            comparer: self.comparer.clone(),
            version: VersionStamp::new(),
            immutable: Some(self.clone()),
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_valid(&self) {
        self.root.assert_valid();
        assert!(self.root.is_deep_frozen(), "published set has unfrozen nodes");
        let elements: Vec<&T> = self.iter().collect();
        for pair in elements.windows(2) {
            assert_eq!(
                self.comparer.compare(pair[0], pair[1]),
                Ordering::Less,
                "elements out of order"
            );
        }
    }
}

// =============================================================================
// SortedSetBuilder
// =============================================================================

/// A mutable front end for batch edits to an [`ImmutableSortedSet`].
///
/// # Examples
///
/// ```rust
/// use arbor_collections::immutable::ImmutableSortedSet;
///
/// let mut builder = ImmutableSortedSet::<i32>::new().to_builder();
/// for value in [9, 4, 7, 4] {
///     builder.add(value);
/// }
/// builder.except_with([7]);
/// let set = builder.to_immutable();
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![4, 9]);
/// ```
pub struct SortedSetBuilder<T, C = NaturalOrder> {
    root: Tree<T>,
    comparer: C,
    version: VersionStamp,
    immutable: Option<ImmutableSortedSet<T, C>>,
}

impl<T, C> SortedSetBuilder<T, C> {
    /// Creates an empty builder ordered by `comparer`.
    #[must_use]
    pub fn with_comparer(comparer: C) -> Self {
        Self {
            root: Tree::Empty,
            comparer,
            version: VersionStamp::new(),
            immutable: None,
        }
    }

    fn touch(&mut self) {
        self.version.bump();
        self.immutable = None;
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Returns `true` if the builder holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Returns the element at `index` in sorted order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.root.get(index)
    }

    /// Returns the smallest element.
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        self.root.first()
    }

    /// Returns the largest element.
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        self.root.last()
    }

    /// Iterates over the elements in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.root.iter()
    }

    /// Returns a detached enumerator that fails once this builder changes.
    pub fn enumerator(&self) -> Enumerator<T>
    where
        T: Send + Sync + 'static,
    {
        Enumerator::new(
            self.root.clone(),
            0,
            self.len(),
            false,
            Some(self.version.clone()),
        )
    }
}

impl<T: Ord> SortedSetBuilder<T> {
    /// Creates an empty builder in natural order.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparer(NaturalOrder)
    }
}

impl<T: Ord> Default for SortedSetBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, C: Comparer<T>> SortedSetBuilder<T, C> {
    /// Records the outcome of an edit, bumping the version only if the root changed.
    fn commit(&mut self, previous: &Tree<T>) -> bool {
        let changed = !self.root.ptr_eq(previous);
        if changed {
            self.touch();
        }
        changed
    }

    /// Returns `true` if the builder contains an element equal to `value`.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        find(&self.root, value, &self.comparer).is_some()
    }

    /// Returns the stored element equal to `value`.
    #[must_use]
    pub fn try_get_value(&self, value: &T) -> Option<&T> {
        find(&self.root, value, &self.comparer)
    }

    /// Returns `Ok(index)` of `value`, or `Err(index)` of its insertion point.
    pub fn index_of(&self, value: &T) -> Result<usize, usize> {
        self.root
            .position(|existing| self.comparer.compare(value, existing))
    }

    /// Adds `value`. Returns `false` if an equal element was already present.
    pub fn add(&mut self, value: T) -> bool {
        let added = add_to(&mut self.root, value, &self.comparer);
        if added {
            self.touch();
        }
        added
    }

    /// Removes the element equal to `value`. Returns `false` if absent.
    pub fn remove(&mut self, value: &T) -> bool {
        let removed = remove_from(&mut self.root, value, &self.comparer);
        if removed {
            self.touch();
        }
        removed
    }

    /// Adds every element of `other`.
    pub fn union_with<I: IntoIterator<Item = T>>(&mut self, other: I) {
        let previous = self.root.clone();
        union_into(&mut self.root, other, &self.comparer);
        self.commit(&previous);
    }

    /// Keeps only the elements that also occur in `other`.
    pub fn intersect_with<I: IntoIterator<Item = T>>(&mut self, other: I) {
        let previous = self.root.clone();
        intersect_into(&mut self.root, other, &self.comparer);
        self.commit(&previous);
    }

    /// Removes every element that occurs in `other`.
    pub fn except_with<I: IntoIterator<Item = T>>(&mut self, other: I) {
        let previous = self.root.clone();
        except_into(&mut self.root, other, &self.comparer);
        self.commit(&previous);
    }

    /// Keeps the elements in exactly one of this builder and `other`.
    pub fn symmetric_except_with<I: IntoIterator<Item = T>>(&mut self, other: I) {
        let previous = self.root.clone();
        symmetric_except_into(&mut self.root, other, &self.comparer);
        self.commit(&previous);
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        if !self.root.is_empty() {
            self.root = Tree::Empty;
            self.touch();
        }
    }

    /// Publishes the current contents as an [`ImmutableSortedSet`].
    pub fn to_immutable(&mut self) -> ImmutableSortedSet<T, C> {
        if let Some(immutable) = &self.immutable {
            return immutable.clone();
        }
        tracing::trace!(length = self.len(), "publishing sorted set builder snapshot");
        self.root.freeze();
        let immutable = ImmutableSortedSet {
            root: self.root.clone(),
            comparer: self.comparer.clone(),
        };
        self.immutable = Some(immutable.clone());
        immutable
    }
}

impl<T: Clone, C: Comparer<T>> Extend<T> for SortedSetBuilder<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.union_with(iter);
    }
}

impl<T: fmt::Debug, C> fmt::Debug for SortedSetBuilder<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T: Ord> Default for ImmutableSortedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> FromIterator<T> for ImmutableSortedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let root = build_sorted(iter.into_iter().collect(), &NaturalOrder);
        root.freeze();
        Self {
            root,
            comparer: NaturalOrder,
        }
    }
}

impl<'a, T, C> IntoIterator for &'a ImmutableSortedSet<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq, C> PartialEq for ImmutableSortedSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.root.ptr_eq(&other.root) || (self.len() == other.len() && self.iter().eq(other.iter()))
    }
}

impl<T: Eq, C> Eq for ImmutableSortedSet<T, C> {}

impl<T: fmt::Debug, C> fmt::Debug for ImmutableSortedSet<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Clone, C: Comparer<T>> ImmutableCollection for ImmutableSortedSet<T, C> {
    fn len(&self) -> usize {
        Self::len(self)
    }

    fn clear(&self) -> Self {
        Self::clear(self)
    }
}

impl<T: Clone, C: Comparer<T>> ImmutableIndexed<T> for ImmutableSortedSet<T, C> {
    fn get(&self, index: usize) -> Option<&T> {
        Self::get(self, index)
    }
}

impl<T: Clone, C: Comparer<T>> ImmutableSet<T> for ImmutableSortedSet<T, C> {
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

impl<T: Clone, C: Comparer<T>> ToBuilder for ImmutableSortedSet<T, C> {
    type Builder = SortedSetBuilder<T, C>;

    fn to_builder(&self) -> Self::Builder {
        Self::to_builder(self)
    }
}

impl<T: Clone, C: Comparer<T>> CollectionBuilder for SortedSetBuilder<T, C> {
    type Immutable = ImmutableSortedSet<T, C>;

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn to_immutable(&mut self) -> Self::Immutable {
        Self::to_immutable(self)
    }
}

// =============================================================================
// Tests
// =============================================================================
