//! Copy-on-write AVL tree shared by every tree-backed collection.
//!
//! A [`Tree`] is either [`Tree::Empty`] or a reference-counted [`Node`]. The
//! same node type serves two addressing modes:
//!
//! - **positional**: the list addresses elements by index, steering with the
//!   subtree `count` stored in every node;
//! - **keyed**: sorted sets and maps (and the hash-code tree behind the hash
//!   collections) steer with a comparison closure.
//!
//! # Freezing
//!
//! Every node carries a `frozen` flag. A node that is not frozen is reachable
//! from exactly one owner (a builder, or an immutable operation still in the
//! middle of producing its result) and may be edited in place. Once a tree is
//! published, [`Tree::freeze`] marks every unfrozen node on it, and from then on
//! any edit clones the node first. Freezing stops at the first frozen node, so
//! publishing after `k` edits costs `O(k log n)`, not `O(n)`.
//!
//! Edits go through `Node::edit`, which thaws frozen nodes by copying them
//! and then relies on [`Arc::make_mut`](std::sync::Arc::make_mut) so that a
//! node shared by two owners is never written through either of them.
//!
//! # Balance
//!
//! After every structural change each node on the edited path satisfies
//! `height(right) - height(left) ∈ {-1, 0, 1}`. Heights and counts are
//! recomputed exactly from the children whenever a child changes.

use std::cmp::Ordering;
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use super::ReferenceCounter;
use super::iter::Iter;

// =============================================================================
// Node Definition
// =============================================================================

/// A single AVL node.
pub(crate) struct Node<T> {
    element: T,
    left: Tree<T>,
    right: Tree<T>,
    height: u8,
    count: usize,
    frozen: AtomicBool,
}

/// An AVL subtree: either empty or a shared reference to a node.
pub(crate) enum Tree<T> {
    /// The empty tree.
    Empty,
    /// A non-empty tree rooted at the referenced node.
    Node(ReferenceCounter<Node<T>>),
}

impl<T> Node<T> {
    fn new(element: T, left: Tree<T>, right: Tree<T>) -> Self {
        let mut node = Self {
            element,
            left,
            right,
            height: 0,
            count: 0,
            frozen: AtomicBool::new(false),
        };
        node.refresh();
        node
    }

    #[inline]
    pub(crate) const fn element(&self) -> &T {
        &self.element
    }

    #[inline]
    pub(crate) const fn left(&self) -> &Tree<T> {
        &self.left
    }

    #[inline]
    pub(crate) const fn right(&self) -> &Tree<T> {
        &self.right
    }

    #[inline]
    pub(crate) fn is_frozen(&self) -> bool {
        self.frozen.load(AtomicOrdering::Acquire)
    }

    /// Recomputes height and count from the children.
    fn refresh(&mut self) {
        self.height = 1 + self.left.height().max(self.right.height());
        self.count = 1 + self.left.count() + self.right.count();
    }

    fn balance(&self) -> i16 {
        i16::from(self.right.height()) - i16::from(self.left.height())
    }
}

impl<T: Clone> Node<T> {
    /// Returns a node that may be written: frozen nodes are replaced by a
    /// thawed copy, shared nodes are cloned by `make_mut`.
    fn edit(node: &mut ReferenceCounter<Self>) -> &mut Self {
        if node.is_frozen() {
            *node = ReferenceCounter::new((**node).clone());
        }
        ReferenceCounter::make_mut(node)
    }

    /// Takes the node apart, moving fields out when it is uniquely owned.
    fn into_parts(node: ReferenceCounter<Self>) -> (T, Tree<T>, Tree<T>) {
        match ReferenceCounter::try_unwrap(node) {
            Ok(node) => (node.element, node.left, node.right),
            Err(shared) => (
                shared.element.clone(),
                shared.left.clone(),
                shared.right.clone(),
            ),
        }
    }
}

/// Cloning a node produces an unfrozen copy that shares both children.
impl<T: Clone> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self {
            element: self.element.clone(),
            left: self.left.clone(),
            right: self.right.clone(),
            height: self.height,
            count: self.count,
            frozen: AtomicBool::new(false),
        }
    }
}

// =============================================================================
// Tree: Structure
// =============================================================================

impl<T> Clone for Tree<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Node(node) => Self::Node(ReferenceCounter::clone(node)),
        }
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T> Tree<T> {
    /// Creates a single-node tree whose children are both empty.
    pub(crate) fn leaf(element: T) -> Self {
        Self::Node(ReferenceCounter::new(Node::new(element, Self::Empty, Self::Empty)))
    }

    fn from_parts(element: T, left: Self, right: Self) -> Self {
        Self::Node(ReferenceCounter::new(Node::new(element, left, right)))
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[inline]
    pub(crate) fn node(&self) -> Option<&Node<T>> {
        match self {
            Self::Empty => None,
            Self::Node(node) => Some(node),
        }
    }

    #[inline]
    pub(crate) fn height(&self) -> u8 {
        self.node().map_or(0, |node| node.height)
    }

    /// Number of elements in this subtree.
    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.node().map_or(0, |node| node.count)
    }

    /// Returns `true` if both trees are the same node (or both empty).
    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Node(left), Self::Node(right)) => ReferenceCounter::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Marks this tree as shared. Idempotent; stops at already frozen nodes.
    pub(crate) fn freeze(&self) {
        if let Self::Node(node) = self
            && !node.frozen.swap(true, AtomicOrdering::AcqRel)
        {
            node.left.freeze();
            node.right.freeze();
        }
    }

    /// Builds a perfectly balanced tree from elements already in tree order.
    ///
    /// `count` must equal the number of items the iterator yields.
    pub(crate) fn from_ordered<I: Iterator<Item = T>>(items: I, count: usize) -> Self {
        let mut items = items;
        Self::build_balanced(&mut items, count)
    }

    fn build_balanced<I: Iterator<Item = T>>(items: &mut I, count: usize) -> Self {
        if count == 0 {
            return Self::Empty;
        }
        let left_count = (count - 1) / 2;
        let left = Self::build_balanced(items, left_count);
        let Some(element) = items.next() else {
            return left;
        };
        let right = Self::build_balanced(items, count - 1 - left_count);
        Self::from_parts(element, left, right)
    }

    // =========================================================================
    // Read-only Queries
    // =========================================================================

    /// Returns the element at `index` in tree order.
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        let mut tree = self;
        let mut index = index;
        loop {
            let node = tree.node()?;
            let left_count = node.left.count();
            match index.cmp(&left_count) {
                Ordering::Less => tree = &node.left,
                Ordering::Equal => return Some(&node.element),
                Ordering::Greater => {
                    index -= left_count + 1;
                    tree = &node.right;
                }
            }
        }
    }

    /// Finds the element for which `compare` returns `Equal`.
    ///
    /// `compare` orders the sought key relative to the visited element.
    pub(crate) fn find<F>(&self, compare: F) -> Option<&T>
    where
        F: Fn(&T) -> Ordering,
    {
        let mut tree = self;
        while let Some(node) = tree.node() {
            match compare(&node.element) {
                Ordering::Less => tree = &node.left,
                Ordering::Equal => return Some(&node.element),
                Ordering::Greater => tree = &node.right,
            }
        }
        None
    }

    /// Returns `Ok(index)` of the matching element, or `Err(index)` of the
    /// position where it would be inserted.
    pub(crate) fn position<F>(&self, compare: F) -> Result<usize, usize>
    where
        F: Fn(&T) -> Ordering,
    {
        let mut tree = self;
        let mut offset = 0;
        while let Some(node) = tree.node() {
            match compare(&node.element) {
                Ordering::Less => tree = &node.left,
                Ordering::Equal => return Ok(offset + node.left.count()),
                Ordering::Greater => {
                    offset += node.left.count() + 1;
                    tree = &node.right;
                }
            }
        }
        Err(offset)
    }

    /// Returns the leftmost element.
    pub(crate) fn first(&self) -> Option<&T> {
        let mut node = self.node()?;
        while let Some(left) = node.left.node() {
            node = left;
        }
        Some(&node.element)
    }

    /// Returns the rightmost element.
    pub(crate) fn last(&self) -> Option<&T> {
        let mut node = self.node()?;
        while let Some(right) = node.right.node() {
            node = right;
        }
        Some(&node.element)
    }

    /// Iterates over all elements in tree order.
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter::new(self, 0, self.count(), false)
    }

    /// Iterates over `count` elements starting at `start`, optionally in
    /// reverse. The window must lie inside the tree.
    pub(crate) fn iter_window(&self, start: usize, count: usize, reversed: bool) -> Iter<'_, T> {
        Iter::new(self, start, count, reversed)
    }
}

// =============================================================================
// Tree: Copy-on-write Edits
// =============================================================================

impl<T: Clone> Tree<T> {
    fn node_mut(&mut self) -> Option<&mut Node<T>> {
        match self {
            Self::Empty => None,
            Self::Node(node) => Some(Node::edit(node)),
        }
    }

    /// Clones every element into a vector, in tree order.
    pub(crate) fn to_vec(&self) -> Vec<T> {
        let mut elements = Vec::with_capacity(self.count());
        elements.extend(self.iter().cloned());
        elements
    }

    // =========================================================================
    // Balancing
    // =========================================================================

    fn balance(&self) -> i16 {
        self.node().map_or(0, Node::balance)
    }

    fn rotate_left(&mut self) {
        let mut pivot = match self.node_mut() {
            Some(node) if !node.right.is_empty() => mem::take(&mut node.right),
            _ => return,
        };
        if let Some(pivot_node) = pivot.node_mut() {
            let inner = mem::take(&mut pivot_node.left);
            if let Some(node) = self.node_mut() {
                node.right = inner;
                node.refresh();
            }
            pivot_node.left = mem::take(self);
            pivot_node.refresh();
        }
        *self = pivot;
    }

    fn rotate_right(&mut self) {
        let mut pivot = match self.node_mut() {
            Some(node) if !node.left.is_empty() => mem::take(&mut node.left),
            _ => return,
        };
        if let Some(pivot_node) = pivot.node_mut() {
            let inner = mem::take(&mut pivot_node.right);
            if let Some(node) = self.node_mut() {
                node.left = inner;
                node.refresh();
            }
            pivot_node.right = mem::take(self);
            pivot_node.refresh();
        }
        *self = pivot;
    }

    /// Restores the AVL property at this node, assuming both children are
    /// balanced and differ in height by at most two.
    fn make_balanced(&mut self) {
        let balance = self.balance();
        if balance >= 2 {
            if let Some(node) = self.node_mut()
                && node.right.balance() < 0
            {
                node.right.rotate_right();
                node.refresh();
            }
            self.rotate_left();
        } else if balance <= -2 {
            if let Some(node) = self.node_mut()
                && node.left.balance() > 0
            {
                node.left.rotate_left();
                node.refresh();
            }
            self.rotate_right();
        }
    }

    // =========================================================================
    // Positional Operations
    // =========================================================================

    /// Inserts `element` so that it ends up at `index`. Requires `index <= count`.
    pub(crate) fn insert_at(&mut self, index: usize, element: T) {
        let Some(node) = self.node_mut() else {
            *self = Self::leaf(element);
            return;
        };
        let left_count = node.left.count();
        if index <= left_count {
            node.left.insert_at(index, element);
        } else {
            node.right.insert_at(index - left_count - 1, element);
        }
        node.refresh();
        self.make_balanced();
    }

    /// Replaces the element at `index`, returning the previous one.
    pub(crate) fn replace_at(&mut self, index: usize, element: T) -> Option<T> {
        let node = self.node_mut()?;
        let left_count = node.left.count();
        match index.cmp(&left_count) {
            Ordering::Less => node.left.replace_at(index, element),
            Ordering::Equal => Some(mem::replace(&mut node.element, element)),
            Ordering::Greater => node.right.replace_at(index - left_count - 1, element),
        }
    }

    /// Removes and returns the element at `index`.
    pub(crate) fn remove_at(&mut self, index: usize) -> Option<T> {
        let left_count = self.node()?.left.count();
        let removed = match index.cmp(&left_count) {
            Ordering::Equal => return self.remove_root(),
            Ordering::Less => {
                let node = self.node_mut()?;
                let removed = node.left.remove_at(index);
                node.refresh();
                removed
            }
            Ordering::Greater => {
                let node = self.node_mut()?;
                let removed = node.right.remove_at(index - left_count - 1);
                node.refresh();
                removed
            }
        };
        self.make_balanced();
        removed
    }

    /// Removes the root element of this subtree.
    ///
    /// A node missing either child is replaced by its other child; a node
    /// with two children takes its in-order successor's element, and the
    /// successor is removed from the right subtree.
    fn remove_root(&mut self) -> Option<T> {
        let node = self.node()?;
        if node.left.is_empty() || node.right.is_empty() {
            let Self::Node(node) = mem::take(self) else {
                return None;
            };
            let (element, left, right) = Node::into_parts(node);
            *self = if right.is_empty() { left } else { right };
            return Some(element);
        }
        let node = self.node_mut()?;
        let successor = node.right.remove_first()?;
        let element = mem::replace(&mut node.element, successor);
        node.refresh();
        self.make_balanced();
        Some(element)
    }

    fn remove_first(&mut self) -> Option<T> {
        if self.node()?.left.is_empty() {
            return self.remove_root();
        }
        let node = self.node_mut()?;
        let removed = node.left.remove_first();
        node.refresh();
        self.make_balanced();
        removed
    }

    // =========================================================================
    // Keyed Operations
    // =========================================================================

    /// Inserts `element` in key order, or replaces the element with an equal
    /// key. Returns the replaced element, if any.
    ///
    /// `compare(new, existing)` orders the new element against tree elements.
    pub(crate) fn insert_by<F>(&mut self, element: T, compare: &F) -> Option<T>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let Some(node) = self.node_mut() else {
            *self = Self::leaf(element);
            return None;
        };
        let replaced = match compare(&element, &node.element) {
            Ordering::Equal => return Some(mem::replace(&mut node.element, element)),
            Ordering::Less => node.left.insert_by(element, compare),
            Ordering::Greater => node.right.insert_by(element, compare),
        };
        if replaced.is_none() {
            node.refresh();
            self.make_balanced();
        }
        replaced
    }

    /// Removes the element matching `compare`, if present.
    ///
    /// Nothing is copied when no element matches.
    pub(crate) fn remove_by<F>(&mut self, compare: &F) -> Option<T>
    where
        F: Fn(&T) -> Ordering,
    {
        self.find(compare)?;
        self.remove_existing(compare)
    }

    fn remove_existing<F>(&mut self, compare: &F) -> Option<T>
    where
        F: Fn(&T) -> Ordering,
    {
        let ordering = compare(&self.node()?.element);
        let removed = match ordering {
            Ordering::Equal => return self.remove_root(),
            Ordering::Less => {
                let node = self.node_mut()?;
                let removed = node.left.remove_existing(compare);
                node.refresh();
                removed
            }
            Ordering::Greater => {
                let node = self.node_mut()?;
                let removed = node.right.remove_existing(compare);
                node.refresh();
                removed
            }
        };
        self.make_balanced();
        removed
    }
}

// =============================================================================
// Invariant Checking (tests only)
// =============================================================================

#[cfg(test)]
impl<T> Tree<T> {
    /// Panics if any AVL, height or count invariant is violated.
    pub(crate) fn assert_valid(&self) {
        if let Some(node) = self.node() {
            node.left.assert_valid();
            node.right.assert_valid();
            assert!(
                (-1..=1).contains(&node.balance()),
                "unbalanced node: balance {}",
                node.balance()
            );
            assert_eq!(
                node.height,
                1 + node.left.height().max(node.right.height()),
                "stale height"
            );
            assert_eq!(
                node.count,
                1 + node.left.count() + node.right.count(),
                "stale count"
            );
            if node.is_frozen() {
                for child in [&node.left, &node.right] {
                    if let Some(child) = child.node() {
                        assert!(child.is_frozen(), "frozen node with unfrozen child");
                    }
                }
            }
        }
    }

    /// Returns `true` if every node is frozen.
    pub(crate) fn is_deep_frozen(&self) -> bool {
        self.node().is_none_or(|node| {
            node.is_frozen() && node.left.is_deep_frozen() && node.right.is_deep_frozen()
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
