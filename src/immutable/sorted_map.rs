//! Immutable sorted map backed by a keyed AVL tree.
//!
//! [`ImmutableSortedMap`] stores `(key, value)` entries ordered by a key
//! [`Comparer`]. A separate [`EqualityComparer`] over values decides whether
//! re-adding a key is a no-op or a conflict.
//!
//! # Examples
//!
//! ```rust
//! use arbor_collections::immutable::ImmutableSortedMap;
//!
//! let map = ImmutableSortedMap::new()
//!     .set_item("b", 2)
//!     .set_item("a", 1);
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["a", "b"]);
//! assert_eq!(map.get(&"b"), Some(&2));
//! ```

use std::fmt;
use std::iter::{FromIterator, FusedIterator};

use super::enumerator::{Enumerator, VersionStamp};
use super::hash_bucket::KeyCollisionBehavior;
use super::iter::Iter;
use super::node::Tree;
use crate::comparer::{Comparer, DefaultEquality, EqualityComparer, NaturalOrder};
use crate::error::CollectionError;
use crate::traits::{CollectionBuilder, ImmutableCollection, ImmutableMap, ToBuilder};

type Entry<K, V> = (K, V);

// =============================================================================
// Shared Tree Algorithms
// =============================================================================

fn find_entry<'a, K, V, C: Comparer<K>>(
    tree: &'a Tree<Entry<K, V>>,
    key: &K,
    key_comparer: &C,
) -> Option<&'a Entry<K, V>> {
    tree.find(|(existing, _)| key_comparer.compare(key, existing))
}

/// Writes an entry according to `behavior`. Returns `true` if the tree changed.
fn put<K, V, C, E>(
    tree: &mut Tree<Entry<K, V>>,
    key: K,
    value: V,
    key_comparer: &C,
    value_comparer: &E,
    behavior: KeyCollisionBehavior,
) -> Result<bool, CollectionError>
where
    K: Clone,
    V: Clone,
    C: Comparer<K>,
    E: EqualityComparer<V>,
{
    if let Some((_, existing)) = find_entry(tree, &key, key_comparer)
        && !behavior.resolve(value_comparer.equals(existing, &value))?
    {
        return Ok(false);
    }
    tree.insert_by((key, value), &|new: &Entry<K, V>, existing: &Entry<K, V>| {
        key_comparer.compare(&new.0, &existing.0)
    });
    Ok(true)
}

fn remove_entry<K: Clone, V: Clone, C: Comparer<K>>(
    tree: &mut Tree<Entry<K, V>>,
    key: &K,
    key_comparer: &C,
) -> bool {
    tree.remove_by(&|(existing, _): &Entry<K, V>| key_comparer.compare(key, existing))
        .is_some()
}

/// Writes every pair, stopping at the first conflict.
fn put_all<K, V, C, E, I>(
    tree: &mut Tree<Entry<K, V>>,
    pairs: I,
    key_comparer: &C,
    value_comparer: &E,
    behavior: KeyCollisionBehavior,
) -> Result<bool, CollectionError>
where
    K: Clone,
    V: Clone,
    C: Comparer<K>,
    E: EqualityComparer<V>,
    I: IntoIterator<Item = (K, V)>,
{
    let mut changed = false;
    for (key, value) in pairs {
        changed |= put(tree, key, value, key_comparer, value_comparer, behavior)?;
    }
    Ok(changed)
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over the entries of a sorted map, in key order.
#[derive(Clone)]
pub struct SortedMapIter<'a, K, V> {
    inner: Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for SortedMapIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for SortedMapIter<'_, K, V> {}

impl<K, V> FusedIterator for SortedMapIter<'_, K, V> {}

/// Iterator over the keys of a sorted map, in order.
#[derive(Clone)]
pub struct SortedMapKeys<'a, K, V> {
    inner: Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for SortedMapKeys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for SortedMapKeys<'_, K, V> {}

/// Iterator over the values of a sorted map, in key order.
#[derive(Clone)]
pub struct SortedMapValues<'a, K, V> {
    inner: Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for SortedMapValues<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for SortedMapValues<'_, K, V> {}

// =============================================================================
// ImmutableSortedMap Definition
// =============================================================================

/// An immutable map whose entries are kept in key order.
///
/// # Type Parameters
///
/// - `K`, `V`: key and value types
/// - `C`: key [`Comparer`], [`NaturalOrder`] by default
/// - `E`: value [`EqualityComparer`], [`DefaultEquality`] by default
///
/// # Time Complexity
///
/// | Operation        | Complexity |
/// |------------------|------------|
/// | `get`            | O(log N)   |
/// | `add`/`set_item` | O(log N)   |
/// | `remove`         | O(log N)   |
/// | `contains_value` | O(N)       |
/// | `len`            | O(1)       |
///
/// # Examples
///
/// ```rust
/// use arbor_collections::CollectionError;
/// use arbor_collections::immutable::ImmutableSortedMap;
///
/// let map = ImmutableSortedMap::new().add(1, "one").unwrap();
///
/// // Re-adding the same entry is a no-op, a different value is a conflict.
/// assert!(map.add(1, "one").is_ok());
/// assert_eq!(map.add(1, "uno"), Err(CollectionError::DuplicateKey));
/// ```
pub struct ImmutableSortedMap<K, V, C = NaturalOrder, E = DefaultEquality> {
    root: Tree<Entry<K, V>>,
    key_comparer: C,
    value_comparer: E,
}

impl<K, V, C: Clone, E: Clone> Clone for ImmutableSortedMap<K, V, C, E> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            key_comparer: self.key_comparer.clone(),
            value_comparer: self.value_comparer.clone(),
        }
    }
}

impl<K: Ord, V: PartialEq> ImmutableSortedMap<K, V> {
    /// Creates an empty map ordered by `K: Ord`.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparers(NaturalOrder, DefaultEquality)
    }
}

impl<K, V, C, E> ImmutableSortedMap<K, V, C, E> {
    /// Creates an empty map with the given key and value comparers.
    #[inline]
    #[must_use]
    pub const fn with_comparers(key_comparer: C, value_comparer: E) -> Self {
        Self {
            root: Tree::Empty,
            key_comparer,
            value_comparer,
        }
    }

    /// Returns the key comparer.
    pub const fn key_comparer(&self) -> &C {
        &self.key_comparer
    }

    /// Returns the value comparer.
    pub const fn value_comparer(&self) -> &E {
        &self.value_comparer
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Returns `true` if the map has no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Iterates over the entries in key order.
    pub fn iter(&self) -> SortedMapIter<'_, K, V> {
        SortedMapIter {
            inner: self.root.iter(),
        }
    }

    /// Iterates over the entries in descending key order.
    pub fn iter_rev(&self) -> SortedMapIter<'_, K, V> {
        SortedMapIter {
            inner: self.root.iter_window(0, self.len(), true),
        }
    }

    /// Iterates over the keys in order.
    pub fn keys(&self) -> SortedMapKeys<'_, K, V> {
        SortedMapKeys {
            inner: self.root.iter(),
        }
    }

    /// Iterates over the values in key order.
    pub fn values(&self) -> SortedMapValues<'_, K, V> {
        SortedMapValues {
            inner: self.root.iter(),
        }
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn min(&self) -> Option<(&K, &V)> {
        self.root.first().map(|(key, value)| (key, value))
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn max(&self) -> Option<(&K, &V)> {
        self.root.last().map(|(key, value)| (key, value))
    }

    /// Returns a detached enumerator over the entries in key order.
    pub fn enumerator(&self) -> Enumerator<Entry<K, V>>
    where
        K: Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        Enumerator::new(self.root.clone(), 0, self.len(), false, None)
    }
}

impl<K, V, C: Comparer<K>, E: EqualityComparer<V>> ImmutableSortedMap<K, V, C, E> {
    /// Returns the value for `key`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        find_entry(&self.root, key, &self.key_comparer).map(|(_, value)| value)
    }

    /// Returns the stored key and value for `key`.
    #[must_use]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        find_entry(&self.root, key, &self.key_comparer).map(|(key, value)| (key, value))
    }

    /// Returns the stored key equal to `key`.
    #[must_use]
    pub fn try_get_key(&self, key: &K) -> Option<&K> {
        find_entry(&self.root, key, &self.key_comparer).map(|(key, _)| key)
    }

    /// Returns `true` if the map has an entry for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        find_entry(&self.root, key, &self.key_comparer).is_some()
    }

    /// Returns `true` if any entry's value equals `value` under the value comparer.
    ///
    /// # Complexity
    ///
    /// O(N)
    #[must_use]
    pub fn contains_value(&self, value: &V) -> bool {
        self.values()
            .any(|existing| self.value_comparer.equals(existing, value))
    }
}

impl<K, V, C, E> ImmutableSortedMap<K, V, C, E>
where
    K: Clone,
    V: Clone,
    C: Comparer<K>,
    E: EqualityComparer<V>,
{
    fn wrap(&self, root: Tree<Entry<K, V>>) -> Self {
        if root.ptr_eq(&self.root) {
            return self.clone();
        }
        root.freeze();
        Self {
            root,
            key_comparer: self.key_comparer.clone(),
            value_comparer: self.value_comparer.clone(),
        }
    }

    fn try_edited<F>(&self, edit: F) -> Result<Self, CollectionError>
    where
        F: FnOnce(&mut Tree<Entry<K, V>>, &C, &E) -> Result<bool, CollectionError>,
    {
        let mut root = self.root.clone();
        edit(&mut root, &self.key_comparer, &self.value_comparer)?;
        Ok(self.wrap(root))
    }

    /// Returns a map with the entry added.
    ///
    /// # Errors
    ///
    /// [`CollectionError::DuplicateKey`] if `key` is present with a value
    /// the value comparer considers different.
    pub fn add(&self, key: K, value: V) -> Result<Self, CollectionError> {
        self.try_edited(|root, keys, values| {
            put(root, key, value, keys, values, KeyCollisionBehavior::ThrowIfValueDifferent)
        })
    }

    /// Returns a map with every pair added.
    ///
    /// # Errors
    ///
    /// [`CollectionError::DuplicateKey`] on the first conflicting pair. The
    /// receiver is unaffected.
    pub fn add_range<I: IntoIterator<Item = (K, V)>>(&self, pairs: I) -> Result<Self, CollectionError> {
        self.try_edited(|root, keys, values| {
            put_all(root, pairs, keys, values, KeyCollisionBehavior::ThrowIfValueDifferent)
        })
    }

    /// Returns a map where `key` maps to `value`.
    ///
    /// Returns an identical map if `key` already maps to an equal value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbor_collections::immutable::ImmutableSortedMap;
    ///
    /// let map = ImmutableSortedMap::new().set_item(1, "one");
    /// let updated = map.set_item(1, "uno");
    /// assert_eq!(map.get(&1), Some(&"one"));
    /// assert_eq!(updated.get(&1), Some(&"uno"));
    /// ```
    #[must_use]
    pub fn set_item(&self, key: K, value: V) -> Self {
        let mut root = self.root.clone();
        put(
            &mut root,
            key,
            value,
            &self.key_comparer,
            &self.value_comparer,
            KeyCollisionBehavior::SetValue,
        )
        .unwrap_or(false);
        self.wrap(root)
    }

    /// Returns a map with every pair written, later pairs winning.
    #[must_use]
    pub fn set_items<I: IntoIterator<Item = (K, V)>>(&self, pairs: I) -> Self {
        let mut root = self.root.clone();
        put_all(
            &mut root,
            pairs,
            &self.key_comparer,
            &self.value_comparer,
            KeyCollisionBehavior::SetValue,
        )
        .unwrap_or(false);
        self.wrap(root)
    }

    /// Returns a map without an entry for `key`.
    #[must_use]
    pub fn remove(&self, key: &K) -> Self {
        let mut root = self.root.clone();
        remove_entry(&mut root, key, &self.key_comparer);
        self.wrap(root)
    }

    /// Returns a map without entries for any of `keys`.
    #[must_use]
    pub fn remove_range<'k, I>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = &'k K>,
        K: 'k,
    {
        let mut root = self.root.clone();
        for key in keys {
            remove_entry(&mut root, key, &self.key_comparer);
        }
        self.wrap(root)
    }

    /// Returns an empty map with the same comparers.
    #[must_use]
    pub fn clear(&self) -> Self {
        Self::with_comparers(self.key_comparer.clone(), self.value_comparer.clone())
    }

    /// Returns the same entries under new comparers.
    ///
    /// Keys that collapse under the new key comparer must carry values equal
    /// under the new value comparer.
    ///
    /// # Errors
    ///
    /// [`CollectionError::DuplicateKey`] if two collapsing keys have different values.
    pub fn change_comparers<C2, E2>(
        &self,
        key_comparer: C2,
        value_comparer: E2,
    ) -> Result<ImmutableSortedMap<K, V, C2, E2>, CollectionError>
    where
        C2: Comparer<K>,
        E2: EqualityComparer<V>,
    {
        let mut root = Tree::Empty;
        put_all(
            &mut root,
            self.iter().map(|(key, value)| (key.clone(), value.clone())),
            &key_comparer,
            &value_comparer,
            KeyCollisionBehavior::ThrowIfValueDifferent,
        )?;
        root.freeze();
        Ok(ImmutableSortedMap {
            root,
            key_comparer,
            value_comparer,
        })
    }

    /// Creates a builder seeded with this map.
    #[must_use]
    pub fn to_builder(&self) -> SortedMapBuilder<K, V, C, E> {
        SortedMapBuilder {
            root: self.root.clone(),
            key_comparer: self.key_comparer.clone(),
            value_comparer: self.value_comparer.clone(),
            version: VersionStamp::new(),
            immutable: Some(self.clone()),
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_valid(&self) {
        self.root.assert_valid();
        assert!(self.root.is_deep_frozen(), "published map has unfrozen nodes");
        let keys: Vec<&K> = self.keys().collect();
        for pair in keys.windows(2) {
            assert_eq!(
                self.key_comparer.compare(pair[0], pair[1]),
                std::cmp::Ordering::Less,
                "keys out of order"
            );
        }
    }
}

// =============================================================================
// SortedMapBuilder
// =============================================================================

/// A mutable front end for batch edits to an [`ImmutableSortedMap`].
///
/// # Examples
///
/// ```rust
/// use arbor_collections::immutable::ImmutableSortedMap;
///
/// let mut builder = ImmutableSortedMap::<u32, &str>::new().to_builder();
/// builder.set_item(2, "two");
/// builder.set_item(1, "one");
/// builder.remove(&2);
/// let map = builder.to_immutable();
/// assert_eq!(map.len(), 1);
/// ```
pub struct SortedMapBuilder<K, V, C = NaturalOrder, E = DefaultEquality> {
    root: Tree<Entry<K, V>>,
    key_comparer: C,
    value_comparer: E,
    version: VersionStamp,
    immutable: Option<ImmutableSortedMap<K, V, C, E>>,
}

impl<K, V, C, E> SortedMapBuilder<K, V, C, E> {
    /// Creates an empty builder with the given comparers.
    #[must_use]
    pub fn with_comparers(key_comparer: C, value_comparer: E) -> Self {
        Self {
            root: Tree::Empty,
            key_comparer,
            value_comparer,
            version: VersionStamp::new(),
            immutable: None,
        }
    }

    fn touch(&mut self) {
        self.version.bump();
        self.immutable = None;
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Returns `true` if the builder holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Iterates over the entries in key order.
    pub fn iter(&self) -> SortedMapIter<'_, K, V> {
        SortedMapIter {
            inner: self.root.iter(),
        }
    }

    /// Iterates over the keys in order.
    pub fn keys(&self) -> SortedMapKeys<'_, K, V> {
        SortedMapKeys {
            inner: self.root.iter(),
        }
    }

    /// Iterates over the values in key order.
    pub fn values(&self) -> SortedMapValues<'_, K, V> {
        SortedMapValues {
            inner: self.root.iter(),
        }
    }

    /// Returns a detached enumerator that fails once this builder changes.
    pub fn enumerator(&self) -> Enumerator<Entry<K, V>>
    where
        K: Send + Sync + 'static,
        V: Send + Sync + 'static,
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

impl<K: Ord, V: PartialEq> SortedMapBuilder<K, V> {
    /// Creates an empty builder ordered by `K: Ord`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparers(NaturalOrder, DefaultEquality)
    }
}

impl<K: Ord, V: PartialEq> Default for SortedMapBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C, E> SortedMapBuilder<K, V, C, E>
where
    K: Clone,
    V: Clone,
    C: Comparer<K>,
    E: EqualityComparer<V>,
{
    fn record(&mut self, changed: bool) -> bool {
        if changed {
            self.touch();
        }
        changed
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        find_entry(&self.root, key, &self.key_comparer).map(|(_, value)| value)
    }

    /// Returns `true` if the builder has an entry for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        find_entry(&self.root, key, &self.key_comparer).is_some()
    }

    /// Returns `true` if any value equals `value` under the value comparer.
    #[must_use]
    pub fn contains_value(&self, value: &V) -> bool {
        self.values()
            .any(|existing| self.value_comparer.equals(existing, value))
    }

    /// Adds an entry.
    ///
    /// # Errors
    ///
    /// [`CollectionError::DuplicateKey`] if `key` is present with a different value.
    pub fn add(&mut self, key: K, value: V) -> Result<(), CollectionError> {
        let changed = put(
            &mut self.root,
            key,
            value,
            &self.key_comparer,
            &self.value_comparer,
            KeyCollisionBehavior::ThrowIfValueDifferent,
        )?;
        self.record(changed);
        Ok(())
    }

    /// Adds every pair.
    ///
    /// # Errors
    ///
    /// [`CollectionError::DuplicateKey`] on the first conflict; pairs before
    /// it remain added.
    pub fn add_range<I: IntoIterator<Item = (K, V)>>(&mut self, pairs: I) -> Result<(), CollectionError> {
        for (key, value) in pairs {
            self.add(key, value)?;
        }
        Ok(())
    }

    /// Maps `key` to `value`, replacing any previous value.
    pub fn set_item(&mut self, key: K, value: V) {
        let changed = put(
            &mut self.root,
            key,
            value,
            &self.key_comparer,
            &self.value_comparer,
            KeyCollisionBehavior::SetValue,
        )
        .unwrap_or(false);
        self.record(changed);
    }

    /// Writes every pair, later pairs winning.
    pub fn set_items<I: IntoIterator<Item = (K, V)>>(&mut self, pairs: I) {
        for (key, value) in pairs {
            self.set_item(key, value);
        }
    }

    /// Removes the entry for `key`. Returns `false` if absent.
    pub fn remove(&mut self, key: &K) -> bool {
        let removed = remove_entry(&mut self.root, key, &self.key_comparer);
        self.record(removed)
    }

    /// Removes the entries for every key in `keys`.
    pub fn remove_range<'k, I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'k K>,
        K: 'k,
    {
        for key in keys {
            self.remove(key);
        }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        if !self.root.is_empty() {
            self.root = Tree::Empty;
            self.touch();
        }
    }

    /// Publishes the current contents as an [`ImmutableSortedMap`].
    pub fn to_immutable(&mut self) -> ImmutableSortedMap<K, V, C, E> {
        if let Some(immutable) = &self.immutable {
            return immutable.clone();
        }
        tracing::trace!(length = self.len(), "publishing sorted map builder snapshot");
        self.root.freeze();
        let immutable = ImmutableSortedMap {
            root: self.root.clone(),
            key_comparer: self.key_comparer.clone(),
            value_comparer: self.value_comparer.clone(),
        };
        self.immutable = Some(immutable.clone());
        immutable
    }
}

impl<K, V, C, E> Extend<(K, V)> for SortedMapBuilder<K, V, C, E>
where
    K: Clone,
    V: Clone,
    C: Comparer<K>,
    E: EqualityComparer<V>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.set_items(iter);
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<K: Ord, V: PartialEq> Default for ImmutableSortedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: PartialEq + Clone> FromIterator<(K, V)> for ImmutableSortedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut builder = SortedMapBuilder::new();
        builder.set_items(iter);
        builder.to_immutable()
    }
}

impl<'a, K, V, C, E> IntoIterator for &'a ImmutableSortedMap<K, V, C, E> {
    type Item = (&'a K, &'a V);
    type IntoIter = SortedMapIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq, C, E> PartialEq for ImmutableSortedMap<K, V, C, E> {
    fn eq(&self, other: &Self) -> bool {
        self.root.ptr_eq(&other.root) || (self.len() == other.len() && self.iter().eq(other.iter()))
    }
}

impl<K: Eq, V: Eq, C, E> Eq for ImmutableSortedMap<K, V, C, E> {}

impl<K: fmt::Debug, V: fmt::Debug, C, E> fmt::Debug for ImmutableSortedMap<K, V, C, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C, E> fmt::Debug for SortedMapBuilder<K, V, C, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C, E> ImmutableCollection for ImmutableSortedMap<K, V, C, E>
where
    K: Clone,
    V: Clone,
    C: Comparer<K>,
    E: EqualityComparer<V>,
{
    fn len(&self) -> usize {
        Self::len(self)
    }

    fn clear(&self) -> Self {
        Self::clear(self)
    }
}

impl<K, V, C, E> ImmutableMap<K, V> for ImmutableSortedMap<K, V, C, E>
where
    K: Clone,
    V: Clone,
    C: Comparer<K>,
    E: EqualityComparer<V>,
{
    fn get(&self, key: &K) -> Option<&V> {
        Self::get(self, key)
    }

    fn add(&self, key: K, value: V) -> Result<Self, CollectionError> {
        Self::add(self, key, value)
    }

    fn set_item(&self, key: K, value: V) -> Self {
        Self::set_item(self, key, value)
    }

    fn remove(&self, key: &K) -> Self {
        Self::remove(self, key)
    }
}

impl<K, V, C, E> ToBuilder for ImmutableSortedMap<K, V, C, E>
where
    K: Clone,
    V: Clone,
    C: Comparer<K>,
    E: EqualityComparer<V>,
{
    type Builder = SortedMapBuilder<K, V, C, E>;

    fn to_builder(&self) -> Self::Builder {
        Self::to_builder(self)
    }
}

impl<K, V, C, E> CollectionBuilder for SortedMapBuilder<K, V, C, E>
where
    K: Clone,
    V: Clone,
    C: Comparer<K>,
    E: EqualityComparer<V>,
{
    type Immutable = ImmutableSortedMap<K, V, C, E>;

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
