//! Pooled, version-checked tree enumerators.
//!
//! [`Enumerator`] is the detached counterpart of the borrowing iterators: it
//! owns a reference to the tree it walks, so it can outlive a borrow of the
//! collection or builder that produced it. Its ancestor stack is checked out
//! of a per-node-type pool and returned on [`Enumerator::dispose`] (or drop).
//!
//! An enumerator created from a builder captures the builder's version. Every
//! step compares it with the live version and fails with
//! [`CollectionError::CollectionModified`] if the builder has been written
//! since. [`Enumerator::reset`] captures the version again.

use std::sync::atomic::{AtomicU64, Ordering};

use super::ReferenceCounter;
use super::hash_bucket::HashSlot;
use super::node::{Node, Tree};
use super::pool::{OwnerToken, SecureObjectPool, SecurePooledObject, shared_pool};
use crate::error::CollectionError;

// =============================================================================
// Version Stamps
// =============================================================================

/// A builder's mutation counter, shared with the enumerators it hands out.
#[derive(Debug, Clone, Default)]
pub(crate) struct VersionStamp(ReferenceCounter<AtomicU64>);

impl VersionStamp {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Records a write to the owning builder.
    #[inline]
    pub(crate) fn bump(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }
}

// =============================================================================
// Enumerator
// =============================================================================

type Stack<T> = Vec<ReferenceCounter<Node<T>>>;

/// A detached, pooled traversal over a tree-backed collection.
///
/// Obtain one from `enumerator()` on a list, sorted set or sorted map (or
/// their builders). The protocol is explicit: call [`move_next`](Self::move_next)
/// and read [`current`](Self::current) while it returns `Ok(true)`. The
/// enumerator also implements [`Iterator`] over `Result<T, CollectionError>`,
/// yielding a single error and then stopping if the traversal faults.
///
/// # Examples
///
/// ```rust
/// use arbor_collections::immutable::ImmutableList;
/// use arbor_collections::CollectionError;
///
/// let mut builder = ImmutableList::from_iter([1, 2, 3]).to_builder();
/// let mut enumerator = builder.enumerator();
///
/// assert_eq!(enumerator.move_next(), Ok(true));
/// assert_eq!(enumerator.current(), Ok(&1));
///
/// builder.add(4);
/// assert_eq!(enumerator.move_next(), Err(CollectionError::CollectionModified));
/// ```
pub struct Enumerator<T>
where
    T: Send + Sync + 'static,
{
    root: Tree<T>,
    pool: ReferenceCounter<SecureObjectPool<Stack<T>>>,
    token: OwnerToken,
    stack: Option<SecurePooledObject<Stack<T>>>,
    current: Option<ReferenceCounter<Node<T>>>,
    builder_version: Option<(VersionStamp, u64)>,
    start: usize,
    count: usize,
    remaining: usize,
    reversed: bool,
    faulted: bool,
}

impl<T> Enumerator<T>
where
    T: Send + Sync + 'static,
{
    /// Creates an enumerator over `count` elements of `root` starting at `start`.
    ///
    /// The window must lie inside the tree; callers validate it.
    pub(crate) fn new(
        root: Tree<T>,
        start: usize,
        count: usize,
        reversed: bool,
        builder_version: Option<VersionStamp>,
    ) -> Self {
        let pool = shared_pool::<Stack<T>>();
        let token = OwnerToken::fresh();
        let stack = pool.take(token);
        let mut enumerator = Self {
            root,
            pool,
            token,
            stack: Some(stack),
            current: None,
            builder_version: builder_version.map(|stamp| {
                let version = stamp.current();
                (stamp, version)
            }),
            start,
            count,
            remaining: count,
            reversed,
            faulted: false,
        };
        enumerator.restart();
        enumerator
    }

    /// Advances to the next element. Returns `Ok(false)` at the end.
    ///
    /// # Errors
    ///
    /// [`CollectionError::Disposed`] after [`dispose`](Self::dispose), and
    /// [`CollectionError::CollectionModified`] if the source builder changed.
    pub fn move_next(&mut self) -> Result<bool, CollectionError> {
        self.check_version()?;
        let stack = self
            .stack
            .as_mut()
            .ok_or(CollectionError::Disposed)?
            .use_as(self.token)?;
        if self.remaining == 0 {
            self.current = None;
            return Ok(false);
        }
        let Some(node) = stack.pop() else {
            self.current = None;
            return Ok(false);
        };
        if self.reversed {
            Self::push_backward(stack, node.left(), 0);
        } else {
            Self::push_forward(stack, node.right(), 0);
        }
        self.remaining -= 1;
        self.current = Some(node);
        Ok(true)
    }

    /// Returns the element the enumerator is positioned on.
    ///
    /// # Errors
    ///
    /// [`CollectionError::NoCurrentElement`] before the first successful
    /// `move_next` or after the end, plus the faults of `move_next`.
    pub fn current(&self) -> Result<&T, CollectionError> {
        if self.stack.is_none() {
            return Err(CollectionError::Disposed);
        }
        self.check_version()?;
        self.current
            .as_deref()
            .map(Node::element)
            .ok_or(CollectionError::NoCurrentElement)
    }

    /// Rewinds to before the first element of the window and captures the
    /// builder's current version.
    ///
    /// The walk restarts over the tree captured at construction; edits made
    /// to the builder since then are not visible to it.
    ///
    /// # Errors
    ///
    /// [`CollectionError::Disposed`] after [`dispose`](Self::dispose).
    pub fn reset(&mut self) -> Result<(), CollectionError> {
        if self.stack.is_none() {
            return Err(CollectionError::Disposed);
        }
        if let Some((stamp, captured)) = &mut self.builder_version {
            *captured = stamp.current();
        }
        self.faulted = false;
        self.restart();
        Ok(())
    }

    /// Returns the traversal stack to its pool. Further use fails with
    /// [`CollectionError::Disposed`]. Calling it twice is harmless.
    pub fn dispose(&mut self) {
        self.current = None;
        if let Some(stack) = self.stack.take()
            && self.pool.give_back(stack, self.token).is_err()
        {
            tracing::debug!("traversal stack was not returned to its pool");
        }
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    pub const fn is_disposed(&self) -> bool {
        self.stack.is_none()
    }

    /// Fails if the enumerator was disposed or its builder has changed.
    pub(crate) fn check(&self) -> Result<(), CollectionError> {
        if self.stack.is_none() {
            return Err(CollectionError::Disposed);
        }
        self.check_version()
    }

    fn check_version(&self) -> Result<(), CollectionError> {
        match &self.builder_version {
            Some((stamp, captured)) if stamp.current() != *captured => {
                Err(CollectionError::CollectionModified)
            }
            _ => Ok(()),
        }
    }

    fn restart(&mut self) {
        self.current = None;
        self.remaining = self.count;
        let Some(object) = self.stack.as_mut() else {
            return;
        };
        let Ok(stack) = object.use_as(self.token) else {
            return;
        };
        stack.clear();
        if self.count == 0 {
            return;
        }
        if self.reversed {
            let skip_from_end = self.root.count() - (self.start + self.count);
            Self::push_backward(stack, &self.root, skip_from_end);
        } else {
            Self::push_forward(stack, &self.root, self.start);
        }
    }

    fn push_forward(stack: &mut Stack<T>, tree: &Tree<T>, skip: usize) {
        let mut next = tree.clone();
        let mut skip = skip;
        while let Tree::Node(node) = next {
            let left_count = node.left().count();
            if skip < left_count {
                next = node.left().clone();
                stack.push(node);
            } else if skip == left_count {
                stack.push(node);
                return;
            } else {
                skip -= left_count + 1;
                next = node.right().clone();
            }
        }
    }

    fn push_backward(stack: &mut Stack<T>, tree: &Tree<T>, skip: usize) {
        let mut next = tree.clone();
        let mut skip = skip;
        while let Tree::Node(node) = next {
            let right_count = node.right().count();
            if skip < right_count {
                next = node.right().clone();
                stack.push(node);
            } else if skip == right_count {
                stack.push(node);
                return;
            } else {
                skip -= right_count + 1;
                next = node.left().clone();
            }
        }
    }
}

impl<T> Drop for Enumerator<T>
where
    T: Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<T> Iterator for Enumerator<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = Result<T, CollectionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.faulted {
            return None;
        }
        match self.move_next() {
            Ok(true) => Some(self.current().cloned()),
            Ok(false) => None,
            Err(error) => {
                self.faulted = true;
                Some(Err(error))
            }
        }
    }
}

// =============================================================================
// HashEnumerator
// =============================================================================

/// A detached, pooled traversal over a hash map or hash set.
///
/// Walks the hash-code tree with a pooled [`Enumerator`] and steps through
/// the entries of each bucket. The order follows hash codes. Obtain one from
/// `enumerator()` on a hash collection or its builder; the protocol and the
/// faults match [`Enumerator`].
///
/// # Examples
///
/// ```rust
/// use arbor_collections::immutable::HashSetBuilder;
/// use arbor_collections::CollectionError;
///
/// let mut builder = HashSetBuilder::new();
/// builder.add(1);
/// let mut enumerator = builder.enumerator();
///
/// builder.add(2);
/// assert_eq!(enumerator.move_next(), Err(CollectionError::CollectionModified));
/// ```
pub struct HashEnumerator<T>
where
    T: Send + Sync + 'static,
{
    slots: Enumerator<HashSlot<T>>,
    offset: usize,
    positioned: bool,
    faulted: bool,
}

impl<T> HashEnumerator<T>
where
    T: Send + Sync + 'static,
{
    pub(crate) fn new(root: Tree<HashSlot<T>>, builder_version: Option<VersionStamp>) -> Self {
        let count = root.count();
        Self {
            slots: Enumerator::new(root, 0, count, false, builder_version),
            offset: 0,
            positioned: false,
            faulted: false,
        }
    }

    /// Advances to the next entry. Returns `Ok(false)` at the end.
    ///
    /// # Errors
    ///
    /// [`CollectionError::Disposed`] after [`dispose`](Self::dispose), and
    /// [`CollectionError::CollectionModified`] if the source builder changed.
    pub fn move_next(&mut self) -> Result<bool, CollectionError> {
        self.slots.check()?;
        if self.positioned {
            let entries = self.slots.current()?.bucket().len();
            if self.offset + 1 < entries {
                self.offset += 1;
                return Ok(true);
            }
        }
        self.offset = 0;
        self.positioned = self.slots.move_next()?;
        Ok(self.positioned)
    }

    /// Returns the entry the enumerator is positioned on.
    ///
    /// # Errors
    ///
    /// [`CollectionError::NoCurrentElement`] before the first successful
    /// `move_next` or after the end, plus the faults of `move_next`.
    pub fn current(&self) -> Result<&T, CollectionError> {
        self.slots
            .current()?
            .bucket()
            .entry(self.offset)
            .ok_or(CollectionError::NoCurrentElement)
    }

    /// Rewinds to before the first entry and captures the builder's current
    /// version.
    ///
    /// # Errors
    ///
    /// [`CollectionError::Disposed`] after [`dispose`](Self::dispose).
    pub fn reset(&mut self) -> Result<(), CollectionError> {
        self.slots.reset()?;
        self.offset = 0;
        self.positioned = false;
        self.faulted = false;
        Ok(())
    }

    /// Returns the traversal stack to its pool.
    pub fn dispose(&mut self) {
        self.slots.dispose();
        self.positioned = false;
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    pub const fn is_disposed(&self) -> bool {
        self.slots.is_disposed()
    }
}

impl<T> Iterator for HashEnumerator<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = Result<T, CollectionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.faulted {
            return None;
        }
        match self.move_next() {
            Ok(true) => Some(self.current().cloned()),
            Ok(false) => None,
            Err(error) => {
                self.faulted = true;
                Some(Err(error))
            }
        }
    }
}
