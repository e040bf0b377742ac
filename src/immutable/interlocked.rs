//! Lock-free update combinators over shared collection cells.
//!
//! A cell is an [`ArcSwap`] holding an immutable collection. Every combinator
//! runs the same optimistic loop: load the current snapshot, compute the
//! successor with a pure collection operation, then `compare_and_swap` it in.
//! If another writer published first, the loop reloads and recomputes.
//! Nothing blocks and retries are unbounded.
//!
//! Caller-supplied closures may run more than once under contention. A
//! closure that panics unwinds out of the combinator and leaves the cell as
//! it was.
//!
//! # Examples
//!
//! ```rust
//! use arc_swap::ArcSwap;
//! use arbor_collections::immutable::{ImmutableHashMap, interlocked};
//!
//! let cell = ArcSwap::from_pointee(ImmutableHashMap::<&str, u32>::new());
//!
//! std::thread::scope(|scope| {
//!     for worker in 0..4 {
//!         let cell = &cell;
//!         scope.spawn(move || {
//!             interlocked::add_or_update(cell, "hits", 1, |_, hits| hits + 1);
//!             interlocked::get_or_add(cell, "first", worker);
//!         });
//!     }
//! });
//!
//! let snapshot = cell.load();
//! assert_eq!(snapshot.get(&"hits"), Some(&4));
//! assert_eq!(snapshot.len(), 2);
//! ```

use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};

use super::queue::ImmutableQueue;
use super::stack::ImmutableStack;
use crate::traits::ImmutableMap;

/// Runs the load / compute / compare-and-swap loop.
///
/// `step` returns the successor (or `None` to leave the cell alone) and the
/// outcome reported to the caller once the successor is published.
fn swap_loop<C, R, F>(location: &ArcSwap<C>, mut step: F) -> R
where
    F: FnMut(&C) -> (Option<C>, R),
{
    let mut attempts = 0_u32;
    loop {
        let current = location.load_full();
        let (next, outcome) = step(&*current);
        let Some(next) = next else {
            return outcome;
        };
        let previous = location.compare_and_swap(&current, Arc::new(next));
        if Arc::ptr_eq(&previous, &current) {
            return outcome;
        }
        attempts += 1;
        tracing::trace!(attempts, "collection cell changed concurrently, retrying");
    }
}

// =============================================================================
// Cell Operations
// =============================================================================

/// Replaces the cell's value with `transformer(current)`.
///
/// Returning `None` from the transformer leaves the cell untouched. Returns
/// `true` if a new value was published.
///
/// # Examples
///
/// ```rust
/// use arc_swap::ArcSwap;
/// use arbor_collections::immutable::{ImmutableList, interlocked};
///
/// let cell = ArcSwap::from_pointee(ImmutableList::from_iter([1, 2]));
/// assert!(interlocked::update(&cell, |list| Some(list.add(3))));
/// assert!(!interlocked::update(&cell, |_| None));
/// assert_eq!(cell.load().len(), 3);
/// ```
pub fn update<C, F>(location: &ArcSwap<C>, mut transformer: F) -> bool
where
    F: FnMut(&C) -> Option<C>,
{
    swap_loop(location, |current| {
        let next = transformer(current);
        let changed = next.is_some();
        (next, changed)
    })
}

/// Like [`update`], passing `argument` to each transformer call.
pub fn update_with<C, A, F>(location: &ArcSwap<C>, argument: &A, mut transformer: F) -> bool
where
    F: FnMut(&C, &A) -> Option<C>,
{
    update(location, |current| transformer(current, argument))
}

/// Stores `value` and returns the previous value.
pub fn exchange<C>(location: &ArcSwap<C>, value: C) -> Arc<C> {
    location.swap(Arc::new(value))
}

/// Stores `value` if the cell still holds `comparand`.
///
/// Returns the value held before the call; the exchange happened iff it is
/// the same allocation as `comparand`.
pub fn compare_exchange<C>(location: &ArcSwap<C>, value: C, comparand: &Arc<C>) -> Arc<C> {
    let previous = location.compare_and_swap(comparand, Arc::new(value));
    Arc::clone(&previous)
}

/// Stores `value` in an empty optional cell. Returns `false` if the cell
/// was already populated.
pub fn initialize<C>(location: &ArcSwapOption<C>, value: C) -> bool {
    let empty: Option<Arc<C>> = None;
    let previous = location.compare_and_swap(&empty, Some(Arc::new(value)));
    previous.is_none()
}

// =============================================================================
// Map Operations
// =============================================================================

/// Returns the value stored under `key`, adding `value` first if the key is
/// absent.
pub fn get_or_add<M, K, V>(location: &ArcSwap<M>, key: K, value: V) -> V
where
    M: ImmutableMap<K, V>,
    K: Clone,
    V: Clone,
{
    swap_loop(location, |current| match current.get(&key) {
        Some(existing) => (None, existing.clone()),
        None => (Some(current.set_item(key.clone(), value.clone())), value.clone()),
    })
}

/// Returns the value stored under `key`, adding `factory(&key)` first if the
/// key is absent. The factory runs at most once.
pub fn get_or_add_with<M, K, V, F>(location: &ArcSwap<M>, key: K, factory: F) -> V
where
    M: ImmutableMap<K, V>,
    K: Clone,
    V: Clone,
    F: FnOnce(&K) -> V,
{
    if let Some(existing) = location.load().get(&key) {
        return existing.clone();
    }
    let value = factory(&key);
    get_or_add(location, key, value)
}

/// Stores `add_value` under an absent `key`, or `update(&key, existing)`
/// under a present one. Returns the value stored.
pub fn add_or_update<M, K, V, U>(location: &ArcSwap<M>, key: K, add_value: V, update: U) -> V
where
    M: ImmutableMap<K, V>,
    K: Clone,
    V: Clone,
    U: FnMut(&K, &V) -> V,
{
    add_or_update_with(location, key, |_| add_value.clone(), update)
}

/// Like [`add_or_update`], computing the added value with `add_factory`.
/// Either closure may run once per attempt.
pub fn add_or_update_with<M, K, V, A, U>(location: &ArcSwap<M>, key: K, mut add_factory: A, mut update: U) -> V
where
    M: ImmutableMap<K, V>,
    K: Clone,
    V: Clone,
    A: FnMut(&K) -> V,
    U: FnMut(&K, &V) -> V,
{
    swap_loop(location, |current| {
        let value = match current.get(&key) {
            Some(existing) => update(&key, existing),
            None => add_factory(&key),
        };
        (Some(current.set_item(key.clone(), value.clone())), value)
    })
}

/// Adds `value` under `key` if the key is absent. Returns `true` if added.
pub fn try_add<M, K, V>(location: &ArcSwap<M>, key: K, value: V) -> bool
where
    M: ImmutableMap<K, V>,
    K: Clone,
    V: Clone,
{
    swap_loop(location, |current| {
        if current.contains_key(&key) {
            (None, false)
        } else {
            (Some(current.set_item(key.clone(), value.clone())), true)
        }
    })
}

/// Replaces the value under `key` with `new_value` if it currently equals
/// `comparison_value`. Returns `true` if replaced.
pub fn try_update<M, K, V>(location: &ArcSwap<M>, key: K, new_value: V, comparison_value: &V) -> bool
where
    M: ImmutableMap<K, V>,
    K: Clone,
    V: Clone + PartialEq,
{
    swap_loop(location, |current| match current.get(&key) {
        Some(existing) if existing == comparison_value => {
            (Some(current.set_item(key.clone(), new_value.clone())), true)
        }
        _ => (None, false),
    })
}

/// Removes `key`, returning the value it held.
pub fn try_remove<M, K, V>(location: &ArcSwap<M>, key: &K) -> Option<V>
where
    M: ImmutableMap<K, V>,
    V: Clone,
{
    swap_loop(location, |current| match current.get(key) {
        Some(existing) => (Some(current.remove(key)), Some(existing.clone())),
        None => (None, None),
    })
}

// =============================================================================
// Stack and Queue Operations
// =============================================================================

/// Pushes `value` onto a shared stack.
pub fn push<T: Clone>(location: &ArcSwap<ImmutableStack<T>>, value: T) {
    swap_loop(location, |current| (Some(current.push(value.clone())), ()));
}

/// Pops the top of a shared stack, or returns `None` if it is empty.
pub fn try_pop<T: Clone>(location: &ArcSwap<ImmutableStack<T>>) -> Option<T> {
    swap_loop(location, |current| match current.pop_value() {
        Ok((rest, top)) => (Some(rest), Some(top)),
        Err(_) => (None, None),
    })
}

/// Appends `value` to a shared queue.
pub fn enqueue<T: Clone>(location: &ArcSwap<ImmutableQueue<T>>, value: T) {
    swap_loop(location, |current| (Some(current.enqueue(value.clone())), ()));
}

/// Removes the head of a shared queue, or returns `None` if it is empty.
pub fn try_dequeue<T: Clone>(location: &ArcSwap<ImmutableQueue<T>>) -> Option<T> {
    swap_loop(location, |current| match current.dequeue_value() {
        Ok((rest, head)) => (Some(rest), Some(head)),
        Err(_) => (None, None),
    })
}
