//! Pluggable comparers for ordered and hashed collections.
//!
//! Every keyed collection carries its comparers by value, so two instances of
//! the same collection type can order or hash their keys differently. The
//! defaults defer to the standard traits:
//!
//! | Comparer                  | Used by                    | Defers to          |
//! |---------------------------|----------------------------|--------------------|
//! | [`NaturalOrder`]          | sorted set / sorted map    | `Ord`              |
//! | [`DefaultEquality`]       | map values, list searches  | `PartialEq`        |
//! | [`DefaultHashComparer`]   | hash set / hash map keys   | `Hash` + `Eq`      |
//!
//! Closures can be adapted with [`FnComparer`], [`FnEquality`] and
//! [`FnHashComparer`].
//!
//! # Hash builders
//!
//! The hash-code provider itself is consumed, never implemented here.
//! [`DefaultHashBuilder`] is selected by feature flag:
//!
//! - `ahash`: `ahash::RandomState` (randomized, DoS resistant)
//! - `fxhash`: `rustc_hash::FxBuildHasher` (fast, deterministic)
//! - neither: the standard library's SipHash with fixed keys
//!
//! # Examples
//!
//! ```rust
//! use arbor_collections::comparer::{Comparer, FnComparer, NaturalOrder};
//! use std::cmp::Ordering;
//!
//! assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
//!
//! let descending = FnComparer::new(|left: &i32, right: &i32| right.cmp(left));
//! assert_eq!(descending.compare(&1, &2), Ordering::Greater);
//! ```

use std::cmp::Ordering;
use std::hash::{BuildHasher, Hash};

// =============================================================================
// Hash Builder Selection
// =============================================================================

/// Hash builder used by [`DefaultHashComparer`] when none is given.
#[cfg(feature = "ahash")]
pub type DefaultHashBuilder = ahash::RandomState;

/// Hash builder used by [`DefaultHashComparer`] when none is given.
#[cfg(all(feature = "fxhash", not(feature = "ahash")))]
pub type DefaultHashBuilder = rustc_hash::FxBuildHasher;

/// Hash builder used by [`DefaultHashComparer`] when none is given.
#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
pub type DefaultHashBuilder = std::hash::BuildHasherDefault<std::hash::DefaultHasher>;

// =============================================================================
// Comparer Traits
// =============================================================================

/// A total order over `T`.
///
/// Implementations must be consistent: `compare(a, b)` is the reverse of
/// `compare(b, a)`, and the order is transitive. Sorted collections rely on
/// this to keep their trees searchable.
pub trait Comparer<T: ?Sized>: Clone {
    /// Compares two values.
    fn compare(&self, left: &T, right: &T) -> Ordering;
}

/// An equivalence relation over `T`.
pub trait EqualityComparer<T: ?Sized>: Clone {
    /// Returns `true` if the two values are equal under this comparer.
    fn equals(&self, left: &T, right: &T) -> bool;
}

/// An equivalence relation with a compatible hash function.
///
/// Values that are equal under [`EqualityComparer::equals`] must produce the
/// same [`hash_code`](Self::hash_code).
pub trait HashComparer<T: ?Sized>: EqualityComparer<T> {
    /// Returns the hash code of `value`.
    fn hash_code(&self, value: &T) -> u64;
}

// =============================================================================
// Default Comparers
// =============================================================================

/// Orders values by their `Ord` implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparer<T> for NaturalOrder {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        left.cmp(right)
    }
}

/// Reverses another comparer.
///
/// # Examples
///
/// ```rust
/// use arbor_collections::comparer::{Comparer, NaturalOrder, ReverseOrder};
/// use std::cmp::Ordering;
///
/// let reversed = ReverseOrder(NaturalOrder);
/// assert_eq!(reversed.compare(&"a", &"b"), Ordering::Greater);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReverseOrder<C = NaturalOrder>(pub C);

impl<T: ?Sized, C: Comparer<T>> Comparer<T> for ReverseOrder<C> {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        self.0.compare(right, left)
    }
}

/// Compares values with their `PartialEq` implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DefaultEquality;

impl<T: PartialEq + ?Sized> EqualityComparer<T> for DefaultEquality {
    #[inline]
    fn equals(&self, left: &T, right: &T) -> bool {
        left == right
    }
}

/// Hashes keys with a [`BuildHasher`] and compares them with `Eq`.
///
/// # Examples
///
/// ```rust
/// use arbor_collections::comparer::{DefaultHashComparer, EqualityComparer, HashComparer};
///
/// let comparer: DefaultHashComparer = DefaultHashComparer::default();
/// assert!(comparer.equals(&"key", &"key"));
/// assert_eq!(comparer.hash_code(&"key"), comparer.hash_code(&"key"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefaultHashComparer<S = DefaultHashBuilder> {
    build_hasher: S,
}

impl<S> DefaultHashComparer<S> {
    /// Creates a comparer that hashes with `build_hasher`.
    pub const fn with_hasher(build_hasher: S) -> Self {
        Self { build_hasher }
    }

    /// Returns the underlying hash builder.
    pub const fn hasher(&self) -> &S {
        &self.build_hasher
    }
}

impl<T: Eq + ?Sized, S: Clone> EqualityComparer<T> for DefaultHashComparer<S> {
    #[inline]
    fn equals(&self, left: &T, right: &T) -> bool {
        left == right
    }
}

impl<T: Hash + Eq + ?Sized, S: BuildHasher + Clone> HashComparer<T> for DefaultHashComparer<S> {
    #[inline]
    fn hash_code(&self, value: &T) -> u64 {
        self.build_hasher.hash_one(value)
    }
}

// =============================================================================
// Closure Adapters
// =============================================================================

/// Adapts a comparison closure into a [`Comparer`].
#[derive(Clone, Copy)]
pub struct FnComparer<F>(F);

impl<F> FnComparer<F> {
    /// Wraps `compare`.
    pub const fn new(compare: F) -> Self {
        Self(compare)
    }
}

impl<T: ?Sized, F> Comparer<T> for FnComparer<F>
where
    F: Fn(&T, &T) -> Ordering + Clone,
{
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        (self.0)(left, right)
    }
}

/// Adapts an equality closure into an [`EqualityComparer`].
#[derive(Clone, Copy)]
pub struct FnEquality<F>(F);

impl<F> FnEquality<F> {
    /// Wraps `equals`.
    pub const fn new(equals: F) -> Self {
        Self(equals)
    }
}

impl<T: ?Sized, F> EqualityComparer<T> for FnEquality<F>
where
    F: Fn(&T, &T) -> bool + Clone,
{
    #[inline]
    fn equals(&self, left: &T, right: &T) -> bool {
        (self.0)(left, right)
    }
}

/// Adapts a hash closure and an equality closure into a [`HashComparer`].
///
/// # Examples
///
/// ```rust
/// use arbor_collections::comparer::{EqualityComparer, FnHashComparer, HashComparer};
///
/// // Case-insensitive ASCII keys
/// let comparer = FnHashComparer::new(
///     |value: &String| value.to_ascii_lowercase().len() as u64,
///     |left: &String, right: &String| left.eq_ignore_ascii_case(right),
/// );
/// assert!(comparer.equals(&"Key".to_string(), &"kEY".to_string()));
/// ```
#[derive(Clone, Copy)]
pub struct FnHashComparer<H, E> {
    hash: H,
    equals: E,
}

impl<H, E> FnHashComparer<H, E> {
    /// Wraps a hash function and a compatible equality function.
    pub const fn new(hash: H, equals: E) -> Self {
        Self { hash, equals }
    }
}

impl<T: ?Sized, H, E> EqualityComparer<T> for FnHashComparer<H, E>
where
    H: Clone,
    E: Fn(&T, &T) -> bool + Clone,
{
    #[inline]
    fn equals(&self, left: &T, right: &T) -> bool {
        (self.equals)(left, right)
    }
}

impl<T: ?Sized, H, E> HashComparer<T> for FnHashComparer<H, E>
where
    H: Fn(&T) -> u64 + Clone,
    E: Fn(&T, &T) -> bool + Clone,
{
    #[inline]
    fn hash_code(&self, value: &T) -> u64 {
        (self.hash)(value)
    }
}
