//! Immutable list backed by a positional AVL tree.
//!
//! This module provides [`ImmutableList`] and its batch-editing front end
//! [`ListBuilder`].
//!
//! # Overview
//!
//! Elements are addressed by index. Each tree node stores the size of its
//! subtree, so reaching index `i` means steering left or right by the left
//! subtree's count rather than comparing keys.
//!
//! - O(log N) `get`, `set_item`, `insert`, `remove_at`
//! - O(N) bulk construction, `sort`, `remove_all`
//! - O(1) `len` and `is_empty`
//!
//! Every operation returns a new list and leaves the receiver untouched.
//!
//! # Examples
//!
//! ```rust
//! use arbor_collections::immutable::ImmutableList;
//!
//! let list = ImmutableList::new().add_range([1, 2, 3, 4, 5]);
//! let removed = list.remove_at(2).unwrap();
//!
//! assert_eq!(removed.iter().copied().collect::<Vec<_>>(), vec![1, 2, 4, 5]);
//! assert_eq!(list.len(), 5); // original unchanged
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use super::enumerator::{Enumerator, VersionStamp};
use super::iter::Iter;
use super::node::Tree;
use crate::comparer::EqualityComparer;
use crate::error::{CollectionError, check_index, check_insertion_index, check_range};
use crate::traits::{CollectionBuilder, ImmutableCollection, ImmutableIndexed, ToBuilder};

// =============================================================================
// Shared Tree Algorithms
// =============================================================================

/// Inserts `items` starting at `index`, returning how many were inserted.
fn insert_all<T: Clone, I: IntoIterator<Item = T>>(tree: &mut Tree<T>, index: usize, items: I) -> usize {
    if tree.is_empty() {
        let elements: Vec<T> = items.into_iter().collect();
        let count = elements.len();
        *tree = Tree::from_ordered(elements.into_iter(), count);
        return count;
    }
    let mut position = index;
    for item in items {
        tree.insert_at(position, item);
        position += 1;
    }
    position - index
}

fn remove_window<T: Clone>(tree: &mut Tree<T>, start: usize, count: usize) {
    if count == tree.count() {
        *tree = Tree::Empty;
        return;
    }
    for _ in 0..count {
        tree.remove_at(start);
    }
}

/// Reverses the window by swapping elements pairwise from both ends.
fn reverse_window<T: Clone>(tree: &mut Tree<T>, start: usize, count: usize) {
    if count < 2 {
        return;
    }
    let mut low = start;
    let mut high = start + count - 1;
    while low < high {
        if let Some(high_value) = tree.get(high).cloned()
            && let Some(low_value) = tree.replace_at(low, high_value)
        {
            tree.replace_at(high, low_value);
        }
        low += 1;
        high -= 1;
    }
}

/// Sorts the window and rebuilds a balanced tree from the result.
fn sort_window<T, F>(tree: &mut Tree<T>, start: usize, count: usize, compare: F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    if count < 2 {
        return;
    }
    let mut elements = tree.to_vec();
    elements[start..start + count].sort_by(compare);
    let length = elements.len();
    *tree = Tree::from_ordered(elements.into_iter(), length);
}

fn retain_matching<T: Clone, P: FnMut(&T) -> bool>(tree: &mut Tree<T>, mut keep: P) -> usize {
    let kept: Vec<T> = tree.iter().filter(|element| keep(element)).cloned().collect();
    let removed = tree.count() - kept.len();
    if removed > 0 {
        let count = kept.len();
        *tree = Tree::from_ordered(kept.into_iter(), count);
    }
    removed
}

fn position_of<T, E: EqualityComparer<T>>(tree: &Tree<T>, value: &T, comparer: &E) -> Option<usize> {
    tree.iter().position(|element| comparer.equals(element, value))
}

// =============================================================================
// ImmutableList Definition
// =============================================================================

/// An immutable, indexable list.
///
/// `ImmutableList` shares structure between versions: inserting or removing
/// an element copies only the `O(log N)` nodes on the path to it.
///
/// # Time Complexity
///
/// | Operation     | Complexity |
/// |---------------|------------|
/// | `get`         | O(log N)   |
/// | `add`         | O(log N)   |
/// | `insert`      | O(log N)   |
/// | `remove_at`   | O(log N)   |
/// | `set_item`    | O(log N)   |
/// | `index_of`    | O(N)       |
/// | `sort`        | O(N log N) |
/// | `len`         | O(1)       |
///
/// # Examples
///
/// ```rust
/// use arbor_collections::immutable::ImmutableList;
///
/// let list: ImmutableList<&str> = ["a", "b", "c"].into_iter().collect();
/// let updated = list.set_item(1, "B").unwrap();
///
/// assert_eq!(list.get(1), Some(&"b"));
/// assert_eq!(updated.get(1), Some(&"B"));
/// ```
pub struct ImmutableList<T> {
    root: Tree<T>,
}

impl<T> Clone for ImmutableList<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
        }
    }
}

impl<T> ImmutableList<T> {
    /// Creates an empty list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbor_collections::immutable::ImmutableList;
    ///
    /// let list: ImmutableList<i32> = ImmutableList::new();
    /// assert!(list.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { root: Tree::Empty }
    }

    /// Publishes `root` as a list, freezing any nodes not yet shared.
    fn wrap(root: Tree<T>) -> Self {
        root.freeze();
        Self { root }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Returns `true` if the list has no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Returns the element at `index`, or `None` if out of range.
    ///
    /// # Complexity
    ///
    /// O(log N)
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.root.get(index)
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::IndexOutOfRange`] if `index >= len()`.
    pub fn item(&self, index: usize) -> Result<&T, CollectionError> {
        check_index(index, self.len())?;
        self.root.get(index).ok_or(CollectionError::IndexOutOfRange {
            index,
            length: self.len(),
        })
    }

    /// Returns the first element.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.root.first()
    }

    /// Returns the last element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.root.last()
    }

    /// Iterates over the elements in order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.root.iter()
    }

    /// Iterates over the elements from last to first.
    pub fn iter_rev(&self) -> Iter<'_, T> {
        self.root.iter_window(0, self.len(), true)
    }

    /// Iterates over `count` elements starting at `start`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if the window exceeds the list.
    pub fn iter_range(&self, start: usize, count: usize) -> Result<Iter<'_, T>, CollectionError> {
        check_range(start, count, self.len())?;
        Ok(self.root.iter_window(start, count, false))
    }

    /// Returns the first element matching `predicate`.
    pub fn find<P: FnMut(&T) -> bool>(&self, mut predicate: P) -> Option<&T> {
        self.iter().find(|element| predicate(element))
    }

    /// Returns the last element matching `predicate`.
    pub fn find_last<P: FnMut(&T) -> bool>(&self, mut predicate: P) -> Option<&T> {
        self.iter_rev().find(|element| predicate(element))
    }

    /// Returns the index of the first element matching `predicate`.
    pub fn find_index<P: FnMut(&T) -> bool>(&self, predicate: P) -> Option<usize> {
        self.iter().position(predicate)
    }

    /// Returns the index of the last element matching `predicate`.
    pub fn find_last_index<P: FnMut(&T) -> bool>(&self, predicate: P) -> Option<usize> {
        self.iter_rev()
            .position(predicate)
            .map(|offset| self.len() - 1 - offset)
    }

    /// Returns `true` if any element matches `predicate`.
    pub fn exists<P: FnMut(&T) -> bool>(&self, predicate: P) -> bool {
        self.find_index(predicate).is_some()
    }

    /// Returns `true` if every element matches `predicate` (or the list is empty).
    pub fn true_for_all<P: FnMut(&T) -> bool>(&self, mut predicate: P) -> bool {
        self.iter().all(|element| predicate(element))
    }

    /// Returns the index of the first element equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|element| element == value)
    }

    /// Returns the index of the first element equal to `value` under `comparer`.
    pub fn index_of_with<E: EqualityComparer<T>>(&self, value: &T, comparer: &E) -> Option<usize> {
        position_of(&self.root, value, comparer)
    }

    /// Returns the index of the last element equal to `value`.
    pub fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.find_last_index(|element| element == value)
    }

    /// Returns `true` if the list contains `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value).is_some()
    }

    /// Searches a sorted list for `value`.
    ///
    /// Returns `Ok(index)` if found, or `Err(index)` where `value` would be
    /// inserted to keep the list sorted. The result is unspecified if the list
    /// is not sorted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbor_collections::immutable::ImmutableList;
    ///
    /// let list = ImmutableList::new().add_range([10, 20, 30]);
    /// assert_eq!(list.binary_search(&20), Ok(1));
    /// assert_eq!(list.binary_search(&25), Err(2));
    /// ```
    pub fn binary_search(&self, value: &T) -> Result<usize, usize>
    where
        T: Ord,
    {
        self.root.position(|element| value.cmp(element))
    }

    /// Searches a sorted list with a comparison function.
    ///
    /// `compare` returns the ordering of the visited element relative to the
    /// target, as with [`slice::binary_search_by`].
    pub fn binary_search_by<F>(&self, compare: F) -> Result<usize, usize>
    where
        F: Fn(&T) -> Ordering,
    {
        self.root.position(|element| compare(element).reverse())
    }

    /// Returns a detached enumerator over the whole list.
    pub fn enumerator(&self) -> Enumerator<T>
    where
        T: Send + Sync + 'static,
    {
        Enumerator::new(self.root.clone(), 0, self.len(), false, None)
    }

    /// Returns a detached enumerator over a window, optionally reversed.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if the window exceeds the list.
    pub fn enumerator_range(
        &self,
        start: usize,
        count: usize,
        reversed: bool,
    ) -> Result<Enumerator<T>, CollectionError>
    where
        T: Send + Sync + 'static,
    {
        check_range(start, count, self.len())?;
        Ok(Enumerator::new(self.root.clone(), start, count, reversed, None))
    }
}

impl<T: Clone> ImmutableList<T> {
    /// Applies `edit` to a copy of the root and publishes the result.
    fn edited<F: FnOnce(&mut Tree<T>)>(&self, edit: F) -> Self {
        let mut root = self.root.clone();
        edit(&mut root);
        Self::wrap(root)
    }

    /// Returns a list with `value` appended.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbor_collections::immutable::ImmutableList;
    ///
    /// let list = ImmutableList::new().add(1).add(2);
    /// assert_eq!(list.last(), Some(&2));
    /// ```
    #[must_use]
    pub fn add(&self, value: T) -> Self {
        let length = self.len();
        self.edited(|root| root.insert_at(length, value))
    }

    /// Returns a list with `items` appended.
    ///
    /// Appending to an empty list builds a balanced tree directly in O(N).
    #[must_use]
    pub fn add_range<I: IntoIterator<Item = T>>(&self, items: I) -> Self {
        let length = self.len();
        let mut root = self.root.clone();
        if insert_all(&mut root, length, items) == 0 {
            return self.clone();
        }
        Self::wrap(root)
    }

    /// Returns a list with `value` inserted at `index`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::IndexOutOfRange`] if `index > len()`.
    pub fn insert(&self, index: usize, value: T) -> Result<Self, CollectionError> {
        check_insertion_index(index, self.len())?;
        Ok(self.edited(|root| root.insert_at(index, value)))
    }

    /// Returns a list with `items` inserted starting at `index`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::IndexOutOfRange`] if `index > len()`.
    pub fn insert_range<I: IntoIterator<Item = T>>(
        &self,
        index: usize,
        items: I,
    ) -> Result<Self, CollectionError> {
        check_insertion_index(index, self.len())?;
        let mut root = self.root.clone();
        if insert_all(&mut root, index, items) == 0 {
            return Ok(self.clone());
        }
        Ok(Self::wrap(root))
    }

    /// Returns a list with the element at `index` replaced.
    ///
    /// # Errors
    ///
    /// [`CollectionError::IndexOutOfRange`] if `index >= len()`.
    pub fn set_item(&self, index: usize, value: T) -> Result<Self, CollectionError> {
        check_index(index, self.len())?;
        Ok(self.edited(|root| {
            root.replace_at(index, value);
        }))
    }

    /// Returns a list where the first element equal to `old` is replaced by
    /// `new`, or `None` if no element equals `old`.
    #[must_use]
    pub fn replace(&self, old: &T, new: T) -> Option<Self>
    where
        T: PartialEq,
    {
        let index = self.index_of(old)?;
        Some(self.edited(|root| {
            root.replace_at(index, new);
        }))
    }

    /// Returns a list without the element at `index`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::IndexOutOfRange`] if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbor_collections::immutable::ImmutableList;
    ///
    /// let list = ImmutableList::new().add_range(["a", "b", "c"]);
    /// let list = list.remove_at(0).unwrap();
    /// assert_eq!(list.get(0), Some(&"b"));
    /// assert!(list.remove_at(5).is_err());
    /// ```
    pub fn remove_at(&self, index: usize) -> Result<Self, CollectionError> {
        check_index(index, self.len())?;
        Ok(self.edited(|root| {
            root.remove_at(index);
        }))
    }

    /// Returns a list without the first element equal to `value`.
    ///
    /// Returns an identical list if no element matches.
    #[must_use]
    pub fn remove(&self, value: &T) -> Self
    where
        T: PartialEq,
    {
        self.index_of(value).map_or_else(
            || self.clone(),
            |index| {
                self.edited(|root| {
                    root.remove_at(index);
                })
            },
        )
    }

    /// Returns a list without the window `start..start + count`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if the window exceeds the list.
    pub fn remove_range(&self, start: usize, count: usize) -> Result<Self, CollectionError> {
        check_range(start, count, self.len())?;
        if count == 0 {
            return Ok(self.clone());
        }
        Ok(self.edited(|root| remove_window(root, start, count)))
    }

    /// Returns a list without the elements matching `predicate`.
    #[must_use]
    pub fn remove_all<P: FnMut(&T) -> bool>(&self, mut predicate: P) -> Self {
        let mut root = self.root.clone();
        if retain_matching(&mut root, |element| !predicate(element)) == 0 {
            return self.clone();
        }
        Self::wrap(root)
    }

    /// Returns the elements matching `predicate`, in order.
    #[must_use]
    pub fn find_all<P: FnMut(&T) -> bool>(&self, predicate: P) -> Self {
        let mut root = self.root.clone();
        retain_matching(&mut root, predicate);
        Self::wrap(root)
    }

    /// Returns a copy of the window `start..start + count`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if the window exceeds the list.
    pub fn get_range(&self, start: usize, count: usize) -> Result<Self, CollectionError> {
        check_range(start, count, self.len())?;
        if count == self.len() {
            return Ok(self.clone());
        }
        let window = self.root.iter_window(start, count, false).cloned();
        Ok(Self::wrap(Tree::from_ordered(window, count)))
    }

    /// Maps every element through `converter`.
    #[must_use]
    pub fn convert_all<U, F: FnMut(&T) -> U>(&self, converter: F) -> ImmutableList<U> {
        let converted = self.iter().map(converter);
        ImmutableList::wrap(Tree::from_ordered(converted, self.len()))
    }

    /// Returns the list in reverse order.
    #[must_use]
    pub fn reverse(&self) -> Self {
        let length = self.len();
        if length < 2 {
            return self.clone();
        }
        self.edited(|root| reverse_window(root, 0, length))
    }

    /// Returns the list with the window `start..start + count` reversed.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if the window exceeds the list.
    pub fn reverse_range(&self, start: usize, count: usize) -> Result<Self, CollectionError> {
        check_range(start, count, self.len())?;
        if count < 2 {
            return Ok(self.clone());
        }
        Ok(self.edited(|root| reverse_window(root, start, count)))
    }

    /// Returns the list sorted in ascending order (stable).
    #[must_use]
    pub fn sort(&self) -> Self
    where
        T: Ord,
    {
        self.sort_by(T::cmp)
    }

    /// Returns the list sorted with `compare` (stable).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbor_collections::immutable::ImmutableList;
    ///
    /// let list = ImmutableList::new().add_range([3, 1, 2]);
    /// let descending = list.sort_by(|left, right| right.cmp(left));
    /// assert_eq!(descending.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
    /// ```
    #[must_use]
    pub fn sort_by<F: FnMut(&T, &T) -> Ordering>(&self, compare: F) -> Self {
        let length = self.len();
        if length < 2 {
            return self.clone();
        }
        self.edited(|root| sort_window(root, 0, length, compare))
    }

    /// Returns the list with the window `start..start + count` sorted.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if the window exceeds the list.
    pub fn sort_range<F: FnMut(&T, &T) -> Ordering>(
        &self,
        start: usize,
        count: usize,
        compare: F,
    ) -> Result<Self, CollectionError> {
        check_range(start, count, self.len())?;
        if count < 2 {
            return Ok(self.clone());
        }
        Ok(self.edited(|root| sort_window(root, start, count, compare)))
    }

    /// Returns an empty list.
    #[must_use]
    pub const fn clear(&self) -> Self {
        Self::new()
    }

    /// Creates a builder seeded with this list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbor_collections::immutable::ImmutableList;
    ///
    /// let list = ImmutableList::new().add_range([1, 2, 3]);
    /// let mut builder = list.to_builder();
    /// builder.add(4);
    /// builder.remove_at(0).unwrap();
    /// let updated = builder.to_immutable();
    ///
    /// assert_eq!(updated.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    /// assert_eq!(list.len(), 3);
    /// ```
    #[must_use]
    pub fn to_builder(&self) -> ListBuilder<T> {
        ListBuilder {
            root: self.root.clone(),
            version: VersionStamp::new(),
            immutable: Some(self.clone()),
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_valid(&self) {
        self.root.assert_valid();
        assert!(self.root.is_deep_frozen(), "published list has unfrozen nodes");
    }
}

// =============================================================================
// ListBuilder
// =============================================================================

/// A mutable front end for batch edits to an [`ImmutableList`].
///
/// The builder owns a private tree. Nodes it creates are edited in place
/// until [`to_immutable`](Self::to_immutable) publishes them; after that they
/// are frozen and further edits copy them again. A builder is not meant to
/// be shared between threads; `&mut self` on every edit enforces a single
/// writer.
///
/// # Examples
///
/// ```rust
/// use arbor_collections::immutable::ListBuilder;
///
/// let mut builder = ListBuilder::new();
/// builder.add_range(0..100);
/// builder.reverse();
/// let list = builder.to_immutable();
/// assert_eq!(list.get(0), Some(&99));
/// ```
pub struct ListBuilder<T> {
    root: Tree<T>,
    version: VersionStamp,
    immutable: Option<ImmutableList<T>>,
}

impl<T> ListBuilder<T> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Tree::Empty,
            version: VersionStamp::new(),
            immutable: None,
        }
    }

    /// Records a root write: bumps the version and drops the cached snapshot.
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

    /// Returns the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.root.get(index)
    }

    /// Iterates over the elements in order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.root.iter()
    }

    /// Returns the index of the first element equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|element| element == value)
    }

    /// Returns `true` if the builder contains `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value).is_some()
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

impl<T: Clone> ListBuilder<T> {
    /// Appends `value`.
    pub fn add(&mut self, value: T) {
        let length = self.len();
        self.root.insert_at(length, value);
        self.touch();
    }

    /// Appends every item.
    pub fn add_range<I: IntoIterator<Item = T>>(&mut self, items: I) {
        let length = self.len();
        if insert_all(&mut self.root, length, items) > 0 {
            self.touch();
        }
    }

    /// Inserts `value` at `index`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::IndexOutOfRange`] if `index > len()`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), CollectionError> {
        check_insertion_index(index, self.len())?;
        self.root.insert_at(index, value);
        self.touch();
        Ok(())
    }

    /// Inserts `items` starting at `index`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::IndexOutOfRange`] if `index > len()`.
    pub fn insert_range<I: IntoIterator<Item = T>>(
        &mut self,
        index: usize,
        items: I,
    ) -> Result<(), CollectionError> {
        check_insertion_index(index, self.len())?;
        if insert_all(&mut self.root, index, items) > 0 {
            self.touch();
        }
        Ok(())
    }

    /// Replaces the element at `index`, returning the previous one.
    ///
    /// # Errors
    ///
    /// [`CollectionError::IndexOutOfRange`] if `index >= len()`.
    pub fn set_item(&mut self, index: usize, value: T) -> Result<T, CollectionError> {
        check_index(index, self.len())?;
        let previous = self
            .root
            .replace_at(index, value)
            .ok_or(CollectionError::IndexOutOfRange {
                index,
                length: self.len(),
            })?;
        self.touch();
        Ok(previous)
    }

    /// Removes and returns the element at `index`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::IndexOutOfRange`] if `index >= len()`.
    pub fn remove_at(&mut self, index: usize) -> Result<T, CollectionError> {
        let length = self.len();
        check_index(index, length)?;
        let removed = self
            .root
            .remove_at(index)
            .ok_or(CollectionError::IndexOutOfRange { index, length })?;
        self.touch();
        Ok(removed)
    }

    /// Removes the first element equal to `value`. Returns `true` if one was found.
    pub fn remove(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        let Some(index) = self.index_of(value) else {
            return false;
        };
        self.root.remove_at(index);
        self.touch();
        true
    }

    /// Removes the window `start..start + count`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if the window exceeds the builder.
    pub fn remove_range(&mut self, start: usize, count: usize) -> Result<(), CollectionError> {
        check_range(start, count, self.len())?;
        if count > 0 {
            remove_window(&mut self.root, start, count);
            self.touch();
        }
        Ok(())
    }

    /// Removes every element matching `predicate`, returning how many were removed.
    pub fn remove_all<P: FnMut(&T) -> bool>(&mut self, mut predicate: P) -> usize {
        let removed = retain_matching(&mut self.root, |element| !predicate(element));
        if removed > 0 {
            self.touch();
        }
        removed
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        if !self.root.is_empty() {
            self.root = Tree::Empty;
            self.touch();
        }
    }

    /// Reverses the elements in place.
    pub fn reverse(&mut self) {
        let length = self.len();
        if length > 1 {
            reverse_window(&mut self.root, 0, length);
            self.touch();
        }
    }

    /// Reverses the window `start..start + count`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidRange`] if the window exceeds the builder.
    pub fn reverse_range(&mut self, start: usize, count: usize) -> Result<(), CollectionError> {
        check_range(start, count, self.len())?;
        if count > 1 {
            reverse_window(&mut self.root, start, count);
            self.touch();
        }
        Ok(())
    }

    /// Sorts the elements in ascending order (stable).
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(T::cmp);
    }

    /// Sorts the elements with `compare` (stable).
    pub fn sort_by<F: FnMut(&T, &T) -> Ordering>(&mut self, compare: F) {
        let length = self.len();
        if length > 1 {
            sort_window(&mut self.root, 0, length, compare);
            self.touch();
        }
    }

    /// Publishes the current contents as an [`ImmutableList`].
    ///
    /// The snapshot is cached: calling this again without edits returns the
    /// same list.
    pub fn to_immutable(&mut self) -> ImmutableList<T> {
        if let Some(immutable) = &self.immutable {
            return immutable.clone();
        }
        tracing::trace!(length = self.len(), "publishing list builder snapshot");
        let immutable = ImmutableList::wrap(self.root.clone());
        self.immutable = Some(immutable.clone());
        immutable
    }
}

impl<T> Default for ListBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Extend<T> for ListBuilder<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_range(iter);
    }
}

impl<T: fmt::Debug> fmt::Debug for ListBuilder<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T> Default for ImmutableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for ImmutableList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let elements: Vec<T> = iter.into_iter().collect();
        let count = elements.len();
        Self::wrap(Tree::from_ordered(elements.into_iter(), count))
    }
}

impl<'a, T> IntoIterator for &'a ImmutableList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone> IntoIterator for ImmutableList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.root.to_vec().into_iter()
    }
}

impl<T: PartialEq> PartialEq for ImmutableList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.root.ptr_eq(&other.root) || (self.len() == other.len() && self.iter().eq(other.iter()))
    }
}

impl<T: Eq> Eq for ImmutableList<T> {}

impl<T: Hash> Hash for ImmutableList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ImmutableList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for ImmutableList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

impl<T: Clone> ImmutableCollection for ImmutableList<T> {
    fn len(&self) -> usize {
        Self::len(self)
    }

    fn clear(&self) -> Self {
        Self::new()
    }
}

impl<T: Clone> ImmutableIndexed<T> for ImmutableList<T> {
    fn get(&self, index: usize) -> Option<&T> {
        Self::get(self, index)
    }
}

impl<T: Clone> ToBuilder for ImmutableList<T> {
    type Builder = ListBuilder<T>;

    fn to_builder(&self) -> Self::Builder {
        Self::to_builder(self)
    }
}

impl<T: Clone> CollectionBuilder for ListBuilder<T> {
    type Immutable = ImmutableList<T>;

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::FnEquality;
    use rstest::rstest;

    fn to_vec<T: Clone>(list: &ImmutableList<T>) -> Vec<T> {
        list.iter().cloned().collect()
    }

    #[rstest]
    fn test_display() {
        let list = ImmutableList::new().add_range([1, 2, 3]);
        assert_eq!(format!("{list}"), "[1, 2, 3]");
        assert_eq!(format!("{}", ImmutableList::<i32>::new()), "[]");
    }

    #[rstest]
    fn test_add_range_then_remove_at() {
        let list = ImmutableList::new().add_range([1, 2, 3, 4, 5]);
        let removed = list.remove_at(2).unwrap();
        assert_eq!(to_vec(&removed), vec![1, 2, 4, 5]);
        assert_eq!(to_vec(&list), vec![1, 2, 3, 4, 5]);
        removed.assert_valid();
    }

    #[rstest]
    fn test_add_range_to_non_empty_list() {
        let list = ImmutableList::new().add(0).add_range(1..50);
        assert_eq!(to_vec(&list), (0..50).collect::<Vec<_>>());
        list.assert_valid();
    }

    #[rstest]
    fn test_add_range_of_nothing_returns_same_root() {
        let list = ImmutableList::new().add(1);
        let same = list.add_range(std::iter::empty());
        assert!(same.root.ptr_eq(&list.root));
    }

    #[rstest]
    fn test_insert_at_bounds() {
        let list = ImmutableList::new().add_range(['b', 'c']);
        assert_eq!(to_vec(&list.insert(0, 'a').unwrap()), vec!['a', 'b', 'c']);
        assert_eq!(to_vec(&list.insert(2, 'd').unwrap()), vec!['b', 'c', 'd']);
        assert_eq!(
            list.insert(3, 'x'),
            Err(CollectionError::IndexOutOfRange {
                index: 3,
                length: 2
            })
        );
    }

    #[rstest]
    fn test_insert_range_in_middle() {
        let list = ImmutableList::new().add_range([1, 5]);
        let list = list.insert_range(1, [2, 3, 4]).unwrap();
        assert_eq!(to_vec(&list), vec![1, 2, 3, 4, 5]);
        list.assert_valid();
    }

    #[rstest]
    fn test_set_item_and_replace() {
        let list = ImmutableList::new().add_range(["a", "b", "c"]);
        assert_eq!(to_vec(&list.set_item(1, "x").unwrap()), vec!["a", "x", "c"]);
        assert_eq!(to_vec(&list.replace(&"c", "z").unwrap()), vec!["a", "b", "z"]);
        assert!(list.replace(&"q", "z").is_none());
        assert!(list.set_item(3, "x").is_err());
    }

    #[rstest]
    fn test_remove_missing_returns_same_root() {
        let list = ImmutableList::new().add_range([1, 2, 3]);
        let same = list.remove(&9);
        assert!(same.root.ptr_eq(&list.root));
        assert_eq!(to_vec(&list.remove(&2)), vec![1, 3]);
    }

    #[rstest]
    #[case(0, 0, vec![0, 1, 2, 3, 4, 5])]
    #[case(0, 6, vec![])]
    #[case(1, 3, vec![0, 4, 5])]
    #[case(5, 1, vec![0, 1, 2, 3, 4])]
    fn test_remove_range(#[case] start: usize, #[case] count: usize, #[case] expected: Vec<i32>) {
        let list: ImmutableList<i32> = (0..6).collect();
        let result = list.remove_range(start, count).unwrap();
        assert_eq!(to_vec(&result), expected);
        result.assert_valid();
    }

    #[rstest]
    fn test_remove_range_out_of_bounds() {
        let list: ImmutableList<i32> = (0..6).collect();
        assert_eq!(
            list.remove_range(4, 3),
            Err(CollectionError::InvalidRange {
                start: 4,
                count: 3,
                length: 6
            })
        );
    }

    #[rstest]
    fn test_remove_all_and_find_all() {
        let list: ImmutableList<i32> = (1..=10).collect();
        assert_eq!(to_vec(&list.remove_all(|value| value % 2 == 0)), vec![1, 3, 5, 7, 9]);
        assert_eq!(to_vec(&list.find_all(|value| value % 3 == 0)), vec![3, 6, 9]);
        let untouched = list.remove_all(|value| *value > 100);
        assert!(untouched.root.ptr_eq(&list.root));
    }

    #[rstest]
    fn test_searches() {
        let list = ImmutableList::new().add_range([4, 8, 15, 16, 23, 42, 8]);
        assert_eq!(list.index_of(&8), Some(1));
        assert_eq!(list.last_index_of(&8), Some(6));
        assert_eq!(list.index_of(&99), None);
        assert_eq!(list.find(|value| *value > 10), Some(&15));
        assert_eq!(list.find_last(|value| *value > 10), Some(&42));
        assert_eq!(list.find_index(|value| *value > 10), Some(2));
        assert_eq!(list.find_last_index(|value| *value < 10), Some(6));
        assert!(list.exists(|value| *value == 23));
        assert!(list.true_for_all(|value| *value > 0));
        assert!(list.contains(&42));
    }

    #[rstest]
    fn test_index_of_with_custom_equality() {
        let list = ImmutableList::new().add_range(["Alpha", "Beta"]);
        let case_insensitive = FnEquality::new(|left: &&str, right: &&str| left.eq_ignore_ascii_case(right));
        assert_eq!(list.index_of_with(&"beta", &case_insensitive), Some(1));
    }

    #[rstest]
    fn test_binary_search_by_matches_slice_semantics() {
        let list: ImmutableList<i32> = (0..20).map(|value| value * 2).collect();
        let slice: Vec<i32> = to_vec(&list);
        for target in -1..42 {
            assert_eq!(
                list.binary_search_by(|element| element.cmp(&target)),
                slice.binary_search(&target)
            );
        }
    }

    #[rstest]
    fn test_get_range_and_convert_all() {
        let list: ImmutableList<i32> = (0..10).collect();
        assert_eq!(to_vec(&list.get_range(3, 4).unwrap()), vec![3, 4, 5, 6]);
        let strings = list.convert_all(ToString::to_string);
        assert_eq!(strings.get(9), Some(&"9".to_string()));
    }

    #[rstest]
    fn test_reverse_and_reverse_range() {
        let list: ImmutableList<i32> = (0..7).collect();
        assert_eq!(to_vec(&list.reverse()), vec![6, 5, 4, 3, 2, 1, 0]);
        assert_eq!(to_vec(&list.reverse_range(1, 3).unwrap()), vec![0, 3, 2, 1, 4, 5, 6]);
        assert_eq!(to_vec(&list), (0..7).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_sort_and_sort_range() {
        let list = ImmutableList::new().add_range([5, 3, 9, 1, 7]);
        let sorted = list.sort();
        assert_eq!(to_vec(&sorted), vec![1, 3, 5, 7, 9]);
        sorted.assert_valid();
        let partial = list.sort_range(1, 3, i32::cmp).unwrap();
        assert_eq!(to_vec(&partial), vec![5, 1, 3, 9, 7]);
    }

    #[rstest]
    fn test_iter_rev_and_range() {
        let list: ImmutableList<i32> = (0..5).collect();
        assert_eq!(list.iter_rev().copied().collect::<Vec<_>>(), vec![4, 3, 2, 1, 0]);
        assert_eq!(list.iter_range(1, 2).unwrap().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert!(list.iter_range(4, 2).is_err());
    }

    #[rstest]
    fn test_builder_round_trip_returns_same_root() {
        let list: ImmutableList<i32> = (0..10).collect();
        let mut builder = list.to_builder();
        let round_trip = builder.to_immutable();
        assert!(round_trip.root.ptr_eq(&list.root));
    }

    #[rstest]
    fn test_builder_snapshot_is_cached_until_edit() {
        let mut builder = ListBuilder::new();
        builder.add_range([1, 2, 3]);
        let first = builder.to_immutable();
        let second = builder.to_immutable();
        assert!(first.root.ptr_eq(&second.root));
        builder.add(4);
        let third = builder.to_immutable();
        assert!(!third.root.ptr_eq(&first.root));
        assert_eq!(to_vec(&first), vec![1, 2, 3]);
        assert_eq!(to_vec(&third), vec![1, 2, 3, 4]);
        third.assert_valid();
    }

    #[rstest]
    fn test_builder_edits_after_publication_do_not_leak() {
        let mut builder = ListBuilder::new();
        builder.add_range(0..32);
        let published = builder.to_immutable();
        for index in 0..32 {
            builder.set_item(index, -1).unwrap();
        }
        builder.remove_at(0).unwrap();
        assert_eq!(to_vec(&published), (0..32).collect::<Vec<_>>());
        assert_eq!(builder.len(), 31);
    }

    #[rstest]
    fn test_builder_operations() {
        let mut builder: ListBuilder<i32> = ListBuilder::default();
        builder.extend([3, 1, 2]);
        builder.insert(0, 10).unwrap();
        assert_eq!(builder.set_item(0, 0), Ok(10));
        builder.sort();
        assert!(builder.remove(&2));
        assert!(!builder.remove(&42));
        builder.insert_range(1, [7, 8]).unwrap();
        builder.reverse_range(0, 3).unwrap();
        assert_eq!(builder.iter().copied().collect::<Vec<_>>(), vec![8, 7, 0, 1, 3]);
        assert_eq!(builder.remove_all(|value| *value > 5), 2);
        builder.remove_range(0, 1).unwrap();
        assert_eq!(builder.to_immutable().iter().copied().collect::<Vec<_>>(), vec![1, 3]);
        builder.clear();
        assert!(builder.is_empty());
    }

    #[rstest]
    fn test_builder_unchanged_operations_keep_version() {
        let mut builder: ListBuilder<i32> = (0..3).collect::<ImmutableList<_>>().to_builder();
        let mut enumerator = builder.enumerator();
        builder.remove(&99);
        builder.remove_all(|_| false);
        builder.add_range(std::iter::empty());
        assert_eq!(enumerator.move_next(), Ok(true));
    }

    #[rstest]
    fn test_builder_enumerator_faults_after_mutation() {
        let mut builder: ListBuilder<i32> = (0..3).collect::<ImmutableList<_>>().to_builder();
        let mut enumerator = builder.enumerator();
        assert_eq!(enumerator.move_next(), Ok(true));
        builder.add(3);
        assert_eq!(enumerator.move_next(), Err(CollectionError::CollectionModified));
    }

    #[rstest]
    fn test_enumerator_range() {
        let list: ImmutableList<i32> = (0..10).collect();
        let values: Result<Vec<i32>, _> = list.enumerator_range(2, 3, true).unwrap().collect();
        assert_eq!(values, Ok(vec![4, 3, 2]));
        assert!(list.enumerator_range(8, 3, false).is_err());
    }

    #[rstest]
    fn test_equality_and_hash_follow_contents() {
        use std::collections::hash_map::DefaultHasher;

        let first: ImmutableList<i32> = (0..5).collect();
        let second = ImmutableList::new().add_range(0..5);
        assert_eq!(first, second);

        let hash = |list: &ImmutableList<i32>| {
            let mut hasher = DefaultHasher::new();
            list.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(&first), hash(&second));
    }
}
