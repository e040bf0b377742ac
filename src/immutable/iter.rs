//! Borrowing in-order traversal of a [`Tree`].
//!
//! The traversal keeps an explicit ancestor stack instead of recursing. It
//! supports an index window so that list range queries start in
//! `O(log n)` rather than skipping elements one by one, and it can walk the
//! window backwards.

use smallvec::SmallVec;

use super::node::{Node, Tree};

/// Inline capacity of the ancestor stack. AVL trees with fewer than
/// `2^32` elements are never taller than this.
const INLINE_DEPTH: usize = 48;

/// Iterator over references to the elements of a list or sorted set.
///
/// Created by `iter`, `iter_rev` and the range methods of the tree-backed
/// collections.
pub struct Iter<'a, T> {
    stack: SmallVec<[&'a Node<T>; INLINE_DEPTH]>,
    remaining: usize,
    reversed: bool,
}

impl<'a, T> Iter<'a, T> {
    /// Starts a traversal of `count` elements beginning at `start` (or ending
    /// at `start + count - 1` when `reversed`).
    pub(crate) fn new(tree: &'a Tree<T>, start: usize, count: usize, reversed: bool) -> Self {
        let mut iterator = Self {
            stack: SmallVec::new(),
            remaining: count,
            reversed,
        };
        if count > 0 {
            if reversed {
                let skip_from_end = tree.count() - (start + count);
                iterator.push_backward(tree, skip_from_end);
            } else {
                iterator.push_forward(tree, start);
            }
        }
        iterator
    }

    /// Pushes the path to the element `skip` positions from the left of `tree`.
    fn push_forward(&mut self, tree: &'a Tree<T>, skip: usize) {
        let mut tree = tree;
        let mut skip = skip;
        while let Some(node) = tree.node() {
            let left_count = node.left().count();
            if skip < left_count {
                self.stack.push(node);
                tree = node.left();
            } else if skip == left_count {
                self.stack.push(node);
                return;
            } else {
                skip -= left_count + 1;
                tree = node.right();
            }
        }
    }

    /// Pushes the path to the element `skip` positions from the right of `tree`.
    fn push_backward(&mut self, tree: &'a Tree<T>, skip: usize) {
        let mut tree = tree;
        let mut skip = skip;
        while let Some(node) = tree.node() {
            let right_count = node.right().count();
            if skip < right_count {
                self.stack.push(node);
                tree = node.right();
            } else if skip == right_count {
                self.stack.push(node);
                return;
            } else {
                skip -= right_count + 1;
                tree = node.left();
            }
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.stack.pop()?;
        if self.reversed {
            self.push_backward(node.left(), 0);
        } else {
            self.push_forward(node.right(), 0);
        }
        self.remaining -= 1;
        Some(node.element())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> std::iter::FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
            reversed: self.reversed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample(count: usize) -> Tree<usize> {
        Tree::from_ordered(0..count, count)
    }

    #[rstest]
    fn test_full_forward_traversal() {
        let tree = sample(20);
        let values: Vec<usize> = tree.iter().copied().collect();
        assert_eq!(values, (0..20).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_full_reverse_traversal() {
        let tree = sample(20);
        let values: Vec<usize> = Iter::new(&tree, 0, 20, true).copied().collect();
        assert_eq!(values, (0..20).rev().collect::<Vec<_>>());
    }

    #[rstest]
    #[case(0, 0)]
    #[case(0, 5)]
    #[case(3, 7)]
    #[case(19, 1)]
    #[case(10, 10)]
    fn test_windowed_traversal(#[case] start: usize, #[case] count: usize) {
        let tree = sample(20);
        let forward: Vec<usize> = tree.iter_window(start, count, false).copied().collect();
        assert_eq!(forward, (start..start + count).collect::<Vec<_>>());
        let backward: Vec<usize> = tree.iter_window(start, count, true).copied().collect();
        assert_eq!(backward, (start..start + count).rev().collect::<Vec<_>>());
    }

    #[rstest]
    fn test_exact_size() {
        let tree = sample(9);
        let mut iterator = tree.iter();
        assert_eq!(iterator.len(), 9);
        iterator.next();
        assert_eq!(iterator.len(), 8);
    }

    #[rstest]
    fn test_empty_tree_yields_nothing() {
        let tree: Tree<usize> = Tree::Empty;
        assert_eq!(tree.iter().next(), None);
    }
}
