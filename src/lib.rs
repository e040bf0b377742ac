//! # arbor-collections
//!
//! Persistent (immutable) collections for Rust.
//!
//! ## Overview
//!
//! Every collection is a handle to shared, structurally persistent storage.
//! "Modifying" a collection returns a new handle; the original stays valid
//! and unchanged, and both share every node the edit did not touch.
//!
//! - **Tree-backed**: [`ImmutableList`](immutable::ImmutableList),
//!   [`ImmutableSortedSet`](immutable::ImmutableSortedSet) and
//!   [`ImmutableSortedMap`](immutable::ImmutableSortedMap) over one
//!   copy-on-write AVL engine
//! - **Hash-backed**: [`ImmutableHashMap`](immutable::ImmutableHashMap) and
//!   [`ImmutableHashSet`](immutable::ImmutableHashSet) over a tree of hash
//!   buckets
//! - **Linked**: [`ImmutableStack`](immutable::ImmutableStack) and
//!   [`ImmutableQueue`](immutable::ImmutableQueue)
//! - **Builders** for batch edits without intermediate snapshots
//! - **Enumerators** that detect writes to the builder they came from
//! - **Lock-free combinators** in [`immutable::interlocked`]
//!
//! ## Feature Flags
//!
//! - `fxhash`: use `rustc_hash::FxBuildHasher` as the default hash builder
//! - `ahash`: use `ahash::RandomState` as the default hash builder
//!
//! ## Example
//!
//! ```rust
//! use arbor_collections::prelude::*;
//!
//! let names: ImmutableSortedSet<&str> = ["carol", "alice", "bob"].into_iter().collect();
//! let more = names.add("dave");
//!
//! assert_eq!(names.len(), 3);
//! assert_eq!(more.iter().copied().collect::<Vec<_>>(), vec!["alice", "bob", "carol", "dave"]);
//! assert!(names.is_proper_subset_of(&more));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports the collections, comparers and capability traits.
///
/// # Usage
///
/// ```rust
/// use arbor_collections::prelude::*;
/// ```
pub mod prelude {
    pub use crate::comparer::*;
    pub use crate::error::CollectionError;
    pub use crate::immutable::*;
    pub use crate::traits::*;
}

pub mod comparer;
pub mod error;
pub mod immutable;
pub mod traits;

pub use error::CollectionError;

// =============================================================================
// Thread Safety
// =============================================================================

mod thread_safety {
    use crate::immutable::{
        ImmutableHashMap, ImmutableHashSet, ImmutableList, ImmutableQueue, ImmutableSortedMap,
        ImmutableSortedSet, ImmutableStack,
    };

    static_assertions::assert_impl_all!(ImmutableList<i32>: Send, Sync);
    static_assertions::assert_impl_all!(ImmutableSortedSet<String>: Send, Sync);
    static_assertions::assert_impl_all!(ImmutableSortedMap<String, i32>: Send, Sync);
    static_assertions::assert_impl_all!(ImmutableHashMap<String, i32>: Send, Sync);
    static_assertions::assert_impl_all!(ImmutableHashSet<String>: Send, Sync);
    static_assertions::assert_impl_all!(ImmutableStack<i32>: Send, Sync);
    static_assertions::assert_impl_all!(ImmutableQueue<i32>: Send, Sync);
}
