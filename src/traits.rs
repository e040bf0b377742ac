//! Capability traits shared by the immutable collections.
//!
//! Each trait covers one concern and is implemented only by the collections
//! that have it:
//!
//! | Trait                  | Implemented by                                   |
//! |------------------------|--------------------------------------------------|
//! | [`ImmutableCollection`]| every collection                                 |
//! | [`ImmutableIndexed`]   | list, sorted set                                 |
//! | [`ImmutableSet`]       | sorted set, hash set                             |
//! | [`ImmutableMap`]       | sorted map, hash map                             |
//! | [`ToBuilder`]          | list, sorted set/map, hash set/map               |
//!
//! The set predicates are provided once here, written only in terms of
//! [`ImmutableSet::contains`] and iteration, so both set kinds answer them
//! with the same collision and comparer semantics.

use crate::error::{CollectionError, check_index};

/// Operations every immutable collection supports.
pub trait ImmutableCollection: Sized {
    /// Returns the number of elements.
    fn len(&self) -> usize;

    /// Returns `true` if the collection has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an empty collection with the same comparers.
    #[must_use]
    fn clear(&self) -> Self;
}

/// Collections whose elements are addressable by position.
pub trait ImmutableIndexed<T>: ImmutableCollection {
    /// Returns the element at `index`, or `None` if out of range.
    fn get(&self, index: usize) -> Option<&T>;

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// [`CollectionError::IndexOutOfRange`] if `index >= len()`.
    fn item(&self, index: usize) -> Result<&T, CollectionError> {
        check_index(index, self.len())?;
        self.get(index)
            .ok_or(CollectionError::IndexOutOfRange {
                index,
                length: self.len(),
            })
    }
}

/// Immutable sets.
pub trait ImmutableSet<T>: ImmutableCollection {
    /// Returns a set that also contains `value`.
    #[must_use]
    fn add(&self, value: T) -> Self;

    /// Returns a set without `value`.
    #[must_use]
    fn remove(&self, value: &T) -> Self;

    /// Returns `true` if the set contains `value`.
    fn contains(&self, value: &T) -> bool;

    /// Iterates over the elements.
    fn elements<'a>(&'a self) -> impl Iterator<Item = &'a T>
    where
        T: 'a;

    /// Returns the union of this set and `other`.
    #[must_use]
    fn union<I: IntoIterator<Item = T>>(&self, other: I) -> Self;

    /// Returns the elements of this set that are also in `other`.
    #[must_use]
    fn intersect<I: IntoIterator<Item = T>>(&self, other: I) -> Self;

    /// Returns the elements of this set that are not in `other`.
    #[must_use]
    fn except<I: IntoIterator<Item = T>>(&self, other: I) -> Self;

    /// Returns the elements in exactly one of this set and `other`.
    #[must_use]
    fn symmetric_except<I: IntoIterator<Item = T>>(&self, other: I) -> Self;

    /// Returns `true` if every element of this set is in `other`.
    fn is_subset_of<S: ImmutableSet<T>>(&self, other: &S) -> bool {
        self.elements().all(|element| other.contains(element))
    }

    /// Returns `true` if every element of `other` is in this set.
    fn is_superset_of<S: ImmutableSet<T>>(&self, other: &S) -> bool {
        other.elements().all(|element| self.contains(element))
    }

    /// Returns `true` if this set is a subset of `other` and `other` has an
    /// element this set lacks.
    fn is_proper_subset_of<S: ImmutableSet<T>>(&self, other: &S) -> bool {
        self.is_subset_of(other) && other.elements().any(|element| !self.contains(element))
    }

    /// Returns `true` if this set is a superset of `other` and has an element
    /// `other` lacks.
    fn is_proper_superset_of<S: ImmutableSet<T>>(&self, other: &S) -> bool {
        self.is_superset_of(other) && self.elements().any(|element| !other.contains(element))
    }

    /// Returns `true` if the two sets share at least one element.
    fn overlaps<S: ImmutableSet<T>>(&self, other: &S) -> bool {
        self.elements().any(|element| other.contains(element))
    }

    /// Returns `true` if both sets contain exactly the same elements.
    fn set_equals<S: ImmutableSet<T>>(&self, other: &S) -> bool {
        self.is_subset_of(other) && self.is_superset_of(other)
    }
}

/// Immutable key-value maps.
pub trait ImmutableMap<K, V>: ImmutableCollection {
    /// Returns the value stored for `key`.
    fn get(&self, key: &K) -> Option<&V>;

    /// Returns `true` if the map has an entry for `key`.
    fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns a map with the entry added.
    ///
    /// Adding a key that already maps to an equal value returns an identical
    /// map.
    ///
    /// # Errors
    ///
    /// [`CollectionError::DuplicateKey`] if `key` maps to a different value.
    fn add(&self, key: K, value: V) -> Result<Self, CollectionError>;

    /// Returns a map where `key` maps to `value`, replacing any prior entry.
    #[must_use]
    fn set_item(&self, key: K, value: V) -> Self;

    /// Returns a map without an entry for `key`.
    #[must_use]
    fn remove(&self, key: &K) -> Self;
}

/// Immutable collections with a mutable batch-editing front end.
pub trait ToBuilder: Sized {
    /// The builder type.
    type Builder: CollectionBuilder<Immutable = Self>;

    /// Creates a builder seeded with this collection's contents.
    fn to_builder(&self) -> Self::Builder;
}

/// A mutable builder that can publish immutable snapshots.
pub trait CollectionBuilder {
    /// The immutable collection this builder produces.
    type Immutable;

    /// Returns the number of elements currently in the builder.
    fn len(&self) -> usize;

    /// Returns `true` if the builder holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Publishes the current contents. Repeated calls without intervening
    /// edits return the same snapshot.
    fn to_immutable(&mut self) -> Self::Immutable;
}
