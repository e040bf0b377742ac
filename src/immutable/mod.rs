//! Immutable collections.
//!
//! Every collection here is a cheap handle over shared, structurally
//! persistent storage. Operations that "modify" a collection return a new
//! handle and leave the original untouched:
//!
//! - [`ImmutableList`]: positional sequence over an AVL tree
//! - [`ImmutableSortedSet`]: ordered set over an AVL tree
//! - [`ImmutableSortedMap`]: ordered map over an AVL tree
//! - [`ImmutableHashMap`]: hash map over a tree of hash buckets
//! - [`ImmutableHashSet`]: hash set over a tree of hash buckets
//! - [`ImmutableStack`] and [`ImmutableQueue`]: linked LIFO and FIFO
//!
//! The tree-backed collections and the hash collections each have a builder
//! for batch edits. A builder owns its unpublished nodes and edits them in
//! place; [`to_immutable`](crate::traits::CollectionBuilder::to_immutable)
//! freezes them, after which every edit copies the path it touches.
//!
//! The [`interlocked`] module updates collections held in a shared
//! [`arc_swap::ArcSwap`] cell without locks.
//!
//! # Examples
//!
//! ```rust
//! use arbor_collections::immutable::ImmutableSortedMap;
//!
//! let map = ImmutableSortedMap::new()
//!     .set_item(3, "three")
//!     .set_item(1, "one")
//!     .set_item(2, "two");
//!
//! let keys: Vec<&i32> = map.keys().collect();
//! assert_eq!(keys, vec![&1, &2, &3]);
//!
//! let updated = map.set_item(1, "ONE");
//! assert_eq!(map.get(&1), Some(&"one"));
//! assert_eq!(updated.get(&1), Some(&"ONE"));
//! ```
//!
//! ```rust
//! use arbor_collections::immutable::ImmutableList;
//!
//! let list: ImmutableList<i32> = (0..100).collect();
//! let mut builder = list.to_builder();
//! builder.reverse();
//! builder.remove_at(0).unwrap();
//!
//! let reversed = builder.to_immutable();
//! assert_eq!(reversed.first(), Some(&98));
//! assert_eq!(list.first(), Some(&0));
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// Always `std::sync::Arc`: published roots cross threads through the
/// [`interlocked`] combinators.
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

mod enumerator;
mod hash_bucket;
mod hash_map;
mod hash_set;
mod iter;
mod list;
mod node;
mod pool;
mod queue;
mod sorted_map;
mod sorted_set;
mod stack;

pub mod interlocked;

pub use enumerator::Enumerator;
pub use enumerator::HashEnumerator;
pub use hash_bucket::HashIter;
pub use hash_bucket::KeyCollisionBehavior;
pub use hash_bucket::OperationResult;
pub use hash_map::HashMapBuilder;
pub use hash_map::HashMapIter;
pub use hash_map::HashMapKeys;
pub use hash_map::HashMapValues;
pub use hash_map::ImmutableHashMap;
pub use hash_set::HashSetBuilder;
pub use hash_set::ImmutableHashSet;
pub use iter::Iter;
pub use list::ImmutableList;
pub use list::ListBuilder;
pub use queue::ImmutableQueue;
pub use queue::QueueIter;
pub use sorted_map::ImmutableSortedMap;
pub use sorted_map::SortedMapBuilder;
pub use sorted_map::SortedMapIter;
pub use sorted_map::SortedMapKeys;
pub use sorted_map::SortedMapValues;
pub use sorted_set::ImmutableSortedSet;
pub use sorted_set::SortedSetBuilder;
pub use stack::ImmutableStack;
pub use stack::StackIter;

// =============================================================================
// Tests
// =============================================================================
