//! Immutable hash map.
//!
//! [`ImmutableHashMap`] keeps its entries in a hash-code tree of
//! [`HashBucket`](super::hash_bucket)s. Lookups hash the key once, descend
//! the tree in `O(log N)`, then scan the (normally one-entry) bucket.
//!
//! Iteration order follows hash codes and is otherwise unspecified.
//!
//! # Examples
//!
//! ```rust
//! use arbor_collections::immutable::ImmutableHashMap;
//!
//! let map = ImmutableHashMap::new()
//!     .set_item("one", 1)
//!     .set_item("two", 2);
//! let without_one = map.remove(&"one");
//!
//! assert_eq!(map.get(&"one"), Some(&1));
//! assert_eq!(without_one.get(&"one"), None);
//! assert_eq!(without_one.len(), 1);
//! ```

use std::fmt;
use std::hash::Hash;
use std::iter::{FromIterator, FusedIterator};

use super::enumerator::{HashEnumerator, VersionStamp};
use super::hash_bucket::{
    HashIter, HashSlot, KeyCollisionBehavior, OperationResult, add_element, adjust_count,
    find_bucket, remove_element,
};
use super::node::Tree;
use crate::comparer::{DefaultEquality, DefaultHashComparer, EqualityComparer, HashComparer};
use crate::error::CollectionError;
use crate::traits::{CollectionBuilder, ImmutableCollection, ImmutableMap, ToBuilder};

type Entry<K, V> = (K, V);
type SlotTree<K, V> = Tree<HashSlot<Entry<K, V>>>;

// =============================================================================
// Shared Tree Algorithms
// =============================================================================

fn lookup<'a, K, V, H: HashComparer<K>>(
    tree: &'a SlotTree<K, V>,
    key: &K,
    key_comparer: &H,
) -> Option<&'a Entry<K, V>> {
    find_bucket(tree, key_comparer.hash_code(key))?
        .find(|(existing, _)| key_comparer.equals(existing, key))
}

fn put<K, V, H, E>(
    tree: &mut SlotTree<K, V>,
    count: &mut usize,
    key: K,
    value: V,
    key_comparer: &H,
    value_comparer: &E,
    behavior: KeyCollisionBehavior,
) -> Result<OperationResult, CollectionError>
where
    K: Clone,
    V: Clone,
    H: HashComparer<K>,
    E: EqualityComparer<V>,
{
    let hash_code = key_comparer.hash_code(&key);
    let result = add_element(
        tree,
        hash_code,
        (key, value),
        |existing: &Entry<K, V>, new: &Entry<K, V>| key_comparer.equals(&existing.0, &new.0),
        |existing: &Entry<K, V>, new: &Entry<K, V>| value_comparer.equals(&existing.1, &new.1),
        behavior,
    )?;
    *count = adjust_count(*count, result, true);
    Ok(result)
}

fn delete<K, V, H>(tree: &mut SlotTree<K, V>, count: &mut usize, key: &K, key_comparer: &H) -> OperationResult
where
    K: Clone,
    V: Clone,
    H: HashComparer<K>,
{
    let result = remove_element(tree, key_comparer.hash_code(key), |(existing, _): &Entry<K, V>| {
        key_comparer.equals(existing, key)
    });
    *count = adjust_count(*count, result, false);
    result
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over the entries of a hash map.
#[derive(Clone)]
pub struct HashMapIter<'a, K, V> {
    inner: HashIter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for HashMapIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for HashMapIter<'_, K, V> {}

impl<K, V> FusedIterator for HashMapIter<'_, K, V> {}

/// Iterator over the keys of a hash map.
#[derive(Clone)]
pub struct HashMapKeys<'a, K, V> {
    inner: HashIter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for HashMapKeys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for HashMapKeys<'_, K, V> {}

/// Iterator over the values of a hash map.
#[derive(Clone)]
pub struct HashMapValues<'a, K, V> {
    inner: HashIter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for HashMapValues<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for HashMapValues<'_, K, V> {}

// =============================================================================
// ImmutableHashMap Definition
// =============================================================================

/// An immutable hash map.
///
/// # Type Parameters
///
/// - `K`, `V`: key and value types
/// - `H`: key [`HashComparer`], [`DefaultHashComparer`] by default
/// - `E`: value [`EqualityComparer`], [`DefaultEquality`] by default
///
/// # Time Complexity
///
/// | Operation        | Complexity              |
/// |------------------|-------------------------|
/// | `get`            | O(log N) + bucket scan  |
/// | `set_item`       | O(log N) + bucket scan  |
/// | `remove`         | O(log N) + bucket scan  |
/// | `len`            | O(1)                    |
///
/// Entries whose keys share a hash code live in one bucket, so a hash
/// function that maps every key to the same code degrades lookups to a
/// linear scan of that bucket while staying correct.
///
/// # Examples
///
/// ```rust
/// use arbor_collections::CollectionError;
/// use arbor_collections::immutable::ImmutableHashMap;
///
/// let map = ImmutableHashMap::new().add("key", 1).unwrap();
/// assert!(map.add("key", 1).is_ok());
/// assert_eq!(map.add("key", 2).err(), Some(CollectionError::DuplicateKey));
/// ```
pub struct ImmutableHashMap<K, V, H = DefaultHashComparer, E = DefaultEquality> {
    root: SlotTree<K, V>,
    count: usize,
    key_comparer: H,
    value_comparer: E,
}

impl<K, V, H: Clone, E: Clone> Clone for ImmutableHashMap<K, V, H, E> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            count: self.count,
            key_comparer: self.key_comparer.clone(),
            value_comparer: self.value_comparer.clone(),
        }
    }
}

impl<K: Hash + Eq, V: PartialEq> ImmutableHashMap<K, V> {
    /// Creates an empty map with the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparers(DefaultHashComparer::default(), DefaultEquality)
    }
}

impl<K, V, H, E> ImmutableHashMap<K, V, H, E> {
    /// Creates an empty map with the given key and value comparers.
    #[must_use]
    pub const fn with_comparers(key_comparer: H, value_comparer: E) -> Self {
        Self {
            root: Tree::Empty,
            count: 0,
            key_comparer,
            value_comparer,
        }
    }

    /// Returns the key comparer.
    pub const fn key_comparer(&self) -> &H {
        &self.key_comparer
    }

    /// Returns the value comparer.
    pub const fn value_comparer(&self) -> &E {
        &self.value_comparer
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the map has no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> HashMapIter<'_, K, V> {
        HashMapIter {
            inner: HashIter::new(&self.root, self.count),
        }
    }

    /// Iterates over the keys.
    pub fn keys(&self) -> HashMapKeys<'_, K, V> {
        HashMapKeys {
            inner: HashIter::new(&self.root, self.count),
        }
    }

    /// Iterates over the values.
    pub fn values(&self) -> HashMapValues<'_, K, V> {
        HashMapValues {
            inner: HashIter::new(&self.root, self.count),
        }
    }

    /// Returns a detached enumerator over the entries.
    pub fn enumerator(&self) -> HashEnumerator<(K, V)>
    where
        K: Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        HashEnumerator::new(self.root.clone(), None)
    }
}

impl<K, V, H: HashComparer<K>, E: EqualityComparer<V>> ImmutableHashMap<K, V, H, E> {
    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        lookup(&self.root, key, &self.key_comparer).map(|(_, value)| value)
    }

    /// Returns the stored key and value for `key`.
    #[must_use]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        lookup(&self.root, key, &self.key_comparer).map(|(key, value)| (key, value))
    }

    /// Returns the stored key equal to `key`.
    #[must_use]
    pub fn try_get_key(&self, key: &K) -> Option<&K> {
        lookup(&self.root, key, &self.key_comparer).map(|(key, _)| key)
    }

    /// Returns `true` if the map has an entry for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        lookup(&self.root, key, &self.key_comparer).is_some()
    }

    /// Returns `true` if any value equals `value` under the value comparer.
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

impl<K, V, H, E> ImmutableHashMap<K, V, H, E>
where
    K: Clone,
    V: Clone,
    H: HashComparer<K>,
    E: EqualityComparer<V>,
{
    fn wrap(&self, root: SlotTree<K, V>, count: usize) -> Self {
        if root.ptr_eq(&self.root) {
            return self.clone();
        }
        root.freeze();
        Self {
            root,
            count,
            key_comparer: self.key_comparer.clone(),
            value_comparer: self.value_comparer.clone(),
        }
    }

    fn write_all<I>(&self, pairs: I, behavior: KeyCollisionBehavior) -> Result<Self, CollectionError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut root = self.root.clone();
        let mut count = self.count;
        for (key, value) in pairs {
            put(
                &mut root,
                &mut count,
                key,
                value,
                &self.key_comparer,
                &self.value_comparer,
                behavior,
            )?;
        }
        Ok(self.wrap(root, count))
    }

    /// Returns a map with the entry added.
    ///
    /// # Errors
    ///
    /// [`CollectionError::DuplicateKey`] if `key` is present with a different value.
    pub fn add(&self, key: K, value: V) -> Result<Self, CollectionError> {
        self.write_all([(key, value)], KeyCollisionBehavior::ThrowIfValueDifferent)
    }

    /// Returns a map with every pair added.
    ///
    /// # Errors
    ///
    /// [`CollectionError::DuplicateKey`] on the first conflicting pair. The
    /// receiver is unaffected.
    pub fn add_range<I: IntoIterator<Item = (K, V)>>(&self, pairs: I) -> Result<Self, CollectionError> {
        self.write_all(pairs, KeyCollisionBehavior::ThrowIfValueDifferent)
    }

    /// Returns a map where `key` maps to `value`.
    ///
    /// Returns an identical map if `key` already maps to an equal value.
    #[must_use]
    pub fn set_item(&self, key: K, value: V) -> Self {
        self.set_items([(key, value)])
    }

    /// Returns a map with every pair written, later pairs winning.
    #[must_use]
    pub fn set_items<I: IntoIterator<Item = (K, V)>>(&self, pairs: I) -> Self {
        self.write_all(pairs, KeyCollisionBehavior::SetValue)
            .unwrap_or_else(|_| self.clone())
    }

    /// Returns a map without an entry for `key`.
    #[must_use]
    pub fn remove(&self, key: &K) -> Self {
        let mut root = self.root.clone();
        let mut count = self.count;
        delete(&mut root, &mut count, key, &self.key_comparer);
        self.wrap(root, count)
    }

    /// Returns a map without entries for any of `keys`.
    #[must_use]
    pub fn remove_range<'k, I>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = &'k K>,
        K: 'k,
    {
        let mut root = self.root.clone();
        let mut count = self.count;
        for key in keys {
            if count == 0 {
                break;
            }
            delete(&mut root, &mut count, key, &self.key_comparer);
        }
        self.wrap(root, count)
    }

    /// Returns an empty map with the same comparers.
    #[must_use]
    pub fn clear(&self) -> Self {
        Self::with_comparers(self.key_comparer.clone(), self.value_comparer.clone())
    }

    /// Returns the same entries under new comparers.
    ///
    /// # Errors
    ///
    /// [`CollectionError::DuplicateKey`] if keys that collapse under the new
    /// key comparer carry values the new value comparer considers different.
    pub fn change_comparers<H2, E2>(
        &self,
        key_comparer: H2,
        value_comparer: E2,
    ) -> Result<ImmutableHashMap<K, V, H2, E2>, CollectionError>
    where
        H2: HashComparer<K>,
        E2: EqualityComparer<V>,
    {
        ImmutableHashMap::with_comparers(key_comparer, value_comparer)
            .add_range(self.iter().map(|(key, value)| (key.clone(), value.clone())))
    }

    /// Creates a builder seeded with this map.
    #[must_use]
    pub fn to_builder(&self) -> HashMapBuilder<K, V, H, E> {
        HashMapBuilder {
            root: self.root.clone(),
            count: self.count,
            key_comparer: self.key_comparer.clone(),
            value_comparer: self.value_comparer.clone(),
            immutable: Some(self.clone()),
            version: VersionStamp::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_valid(&self) {
        self.root.assert_valid();
        assert!(self.root.is_deep_frozen(), "published map has unfrozen nodes");
        assert_eq!(self.iter().count(), self.count, "stale entry count");
    }
}

// =============================================================================
// HashMapBuilder
// =============================================================================

/// A mutable front end for batch edits to an [`ImmutableHashMap`].
///
/// # Examples
///
/// ```rust
/// use arbor_collections::immutable::HashMapBuilder;
///
/// let mut builder = HashMapBuilder::new();
/// for word in ["a", "b", "a"] {
///     let seen = builder.get(&word).copied().unwrap_or(0);
///     builder.set_item(word, seen + 1);
/// }
/// let counts = builder.to_immutable();
/// assert_eq!(counts.get(&"a"), Some(&2));
/// ```
pub struct HashMapBuilder<K, V, H = DefaultHashComparer, E = DefaultEquality> {
    root: SlotTree<K, V>,
    count: usize,
    key_comparer: H,
    value_comparer: E,
    immutable: Option<ImmutableHashMap<K, V, H, E>>,
    version: VersionStamp,
}

impl<K: Hash + Eq, V: PartialEq> HashMapBuilder<K, V> {
    /// Creates an empty builder with the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparers(DefaultHashComparer::default(), DefaultEquality)
    }
}

impl<K: Hash + Eq, V: PartialEq> Default for HashMapBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H, E> HashMapBuilder<K, V, H, E> {
    /// Creates an empty builder with the given comparers.
    #[must_use]
    pub fn with_comparers(key_comparer: H, value_comparer: E) -> Self {
        Self {
            root: Tree::Empty,
            count: 0,
            key_comparer,
            value_comparer,
            immutable: None,
            version: VersionStamp::new(),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the builder holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> HashMapIter<'_, K, V> {
        HashMapIter {
            inner: HashIter::new(&self.root, self.count),
        }
    }

    /// Iterates over the keys.
    pub fn keys(&self) -> HashMapKeys<'_, K, V> {
        HashMapKeys {
            inner: HashIter::new(&self.root, self.count),
        }
    }

    /// Iterates over the values.
    pub fn values(&self) -> HashMapValues<'_, K, V> {
        HashMapValues {
            inner: HashIter::new(&self.root, self.count),
        }
    }

    /// Returns a detached enumerator that fails once this builder changes.
    pub fn enumerator(&self) -> HashEnumerator<(K, V)>
    where
        K: Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        HashEnumerator::new(self.root.clone(), Some(self.version.clone()))
    }

    fn touch(&mut self) {
        self.version.bump();
        self.immutable = None;
    }
}

impl<K, V, H, E> HashMapBuilder<K, V, H, E>
where
    K: Clone,
    V: Clone,
    H: HashComparer<K>,
    E: EqualityComparer<V>,
{
    fn record(&mut self, result: OperationResult) -> bool {
        let changed = result != OperationResult::NoChangeRequired;
        if changed {
            self.touch();
        }
        changed
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        lookup(&self.root, key, &self.key_comparer).map(|(_, value)| value)
    }

    /// Returns `true` if the builder has an entry for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        lookup(&self.root, key, &self.key_comparer).is_some()
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
        let result = put(
            &mut self.root,
            &mut self.count,
            key,
            value,
            &self.key_comparer,
            &self.value_comparer,
            KeyCollisionBehavior::ThrowIfValueDifferent,
        )?;
        self.record(result);
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
        let result = put(
            &mut self.root,
            &mut self.count,
            key,
            value,
            &self.key_comparer,
            &self.value_comparer,
            KeyCollisionBehavior::SetValue,
        )
        .unwrap_or(OperationResult::NoChangeRequired);
        self.record(result);
    }

    /// Writes every pair, later pairs winning.
    pub fn set_items<I: IntoIterator<Item = (K, V)>>(&mut self, pairs: I) {
        for (key, value) in pairs {
            self.set_item(key, value);
        }
    }

    /// Removes the entry for `key`. Returns `false` if absent.
    pub fn remove(&mut self, key: &K) -> bool {
        let result = delete(&mut self.root, &mut self.count, key, &self.key_comparer);
        self.record(result)
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
        if self.count > 0 {
            self.root = Tree::Empty;
            self.count = 0;
            self.touch();
        }
    }

    /// Publishes the current contents as an [`ImmutableHashMap`].
    pub fn to_immutable(&mut self) -> ImmutableHashMap<K, V, H, E> {
        if let Some(immutable) = &self.immutable {
            return immutable.clone();
        }
        tracing::trace!(length = self.count, "publishing hash map builder snapshot");
        self.root.freeze();
        let immutable = ImmutableHashMap {
            root: self.root.clone(),
            count: self.count,
            key_comparer: self.key_comparer.clone(),
            value_comparer: self.value_comparer.clone(),
        };
        self.immutable = Some(immutable.clone());
        immutable
    }
}

impl<K, V, H, E> Extend<(K, V)> for HashMapBuilder<K, V, H, E>
where
    K: Clone,
    V: Clone,
    H: HashComparer<K>,
    E: EqualityComparer<V>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.set_items(iter);
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<K: Hash + Eq, V: PartialEq> Default for ImmutableHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone, V: PartialEq + Clone> FromIterator<(K, V)> for ImmutableHashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut builder = HashMapBuilder::new();
        builder.set_items(iter);
        builder.to_immutable()
    }
}

impl<'a, K, V, H, E> IntoIterator for &'a ImmutableHashMap<K, V, H, E> {
    type Item = (&'a K, &'a V);
    type IntoIter = HashMapIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, H, E> PartialEq for ImmutableHashMap<K, V, H, E>
where
    V: PartialEq,
    H: HashComparer<K>,
    E: EqualityComparer<V>,
{
    fn eq(&self, other: &Self) -> bool {
        self.root.ptr_eq(&other.root)
            || (self.len() == other.len()
                && self
                    .iter()
                    .all(|(key, value)| other.get(key) == Some(value)))
    }
}

impl<K, V, H, E> Eq for ImmutableHashMap<K, V, H, E>
where
    V: Eq,
    H: HashComparer<K>,
    E: EqualityComparer<V>,
{
}

impl<K: fmt::Debug, V: fmt::Debug, H, E> fmt::Debug for ImmutableHashMap<K, V, H, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, H, E> fmt::Debug for HashMapBuilder<K, V, H, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, H, E> ImmutableCollection for ImmutableHashMap<K, V, H, E>
where
    K: Clone,
    V: Clone,
    H: HashComparer<K>,
    E: EqualityComparer<V>,
{
    fn len(&self) -> usize {
        self.count
    }

    fn clear(&self) -> Self {
        Self::clear(self)
    }
}

impl<K, V, H, E> ImmutableMap<K, V> for ImmutableHashMap<K, V, H, E>
where
    K: Clone,
    V: Clone,
    H: HashComparer<K>,
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

impl<K, V, H, E> ToBuilder for ImmutableHashMap<K, V, H, E>
where
    K: Clone,
    V: Clone,
    H: HashComparer<K>,
    E: EqualityComparer<V>,
{
    type Builder = HashMapBuilder<K, V, H, E>;

    fn to_builder(&self) -> Self::Builder {
        Self::to_builder(self)
    }
}

impl<K, V, H, E> CollectionBuilder for HashMapBuilder<K, V, H, E>
where
    K: Clone,
    V: Clone,
    H: HashComparer<K>,
    E: EqualityComparer<V>,
{
    type Immutable = ImmutableHashMap<K, V, H, E>;

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
