//! Immutable LIFO stack.
//!
//! [`ImmutableStack`] is a singly-linked list of shared nodes. Pushing
//! allocates one node that points at the previous top; popping returns the
//! stack rooted at the next node. Every version shares its tail with the
//! stacks it was derived from.
//!
//! ```text
//! base:            2 -> 1 -> nil
//! base.push(3):    3 -> [2 -> 1 -> nil]   // shares [2, 1] with base
//! ```
//!
//! # Examples
//!
//! ```rust
//! use arbor_collections::immutable::ImmutableStack;
//!
//! let stack = ImmutableStack::new().push(1).push(2);
//! assert_eq!(stack.peek(), Ok(&2));
//!
//! let popped = stack.pop().unwrap();
//! assert_eq!(popped.peek(), Ok(&1));
//! assert_eq!(stack.len(), 2);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::{FromIterator, FusedIterator};

use super::ReferenceCounter;
use crate::error::CollectionError;
use crate::traits::ImmutableCollection;

struct Node<T> {
    element: T,
    next: Option<ReferenceCounter<Self>>,
}

/// An immutable last-in first-out stack.
///
/// # Time Complexity
///
/// | Operation | Complexity |
/// |-----------|------------|
/// | `push`    | O(1)       |
/// | `pop`     | O(1)       |
/// | `peek`    | O(1)       |
/// | `len`     | O(1)       |
/// | `reverse` | O(n)       |
pub struct ImmutableStack<T> {
    head: Option<ReferenceCounter<Node<T>>>,
    length: usize,
}

impl<T> Clone for ImmutableStack<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            length: self.length,
        }
    }
}

impl<T> ImmutableStack<T> {
    /// Creates an empty stack.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            head: None,
            length: 0,
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the stack has no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the top element.
    ///
    /// # Errors
    ///
    /// [`CollectionError::EmptyCollection`] if the stack is empty.
    pub fn peek(&self) -> Result<&T, CollectionError> {
        self.head
            .as_deref()
            .map(|node| &node.element)
            .ok_or(CollectionError::EmptyCollection)
    }

    /// Returns a stack with `element` on top.
    #[must_use]
    pub fn push(&self, element: T) -> Self {
        Self {
            head: Some(ReferenceCounter::new(Node {
                element,
                next: self.head.clone(),
            })),
            length: self.length + 1,
        }
    }

    /// Returns the stack without its top element.
    ///
    /// # Errors
    ///
    /// [`CollectionError::EmptyCollection`] if the stack is empty.
    pub fn pop(&self) -> Result<Self, CollectionError> {
        let node = self.head.as_deref().ok_or(CollectionError::EmptyCollection)?;
        Ok(Self {
            head: node.next.clone(),
            length: self.length - 1,
        })
    }

    /// Returns an empty stack.
    #[inline]
    #[must_use]
    pub const fn clear(&self) -> Self {
        Self::new()
    }

    /// Iterates from the top of the stack to the bottom.
    #[must_use]
    pub fn iter(&self) -> StackIter<'_, T> {
        StackIter {
            current: self.head.as_deref(),
            remaining: self.length,
        }
    }

    /// Returns `true` if both stacks share their top node.
    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.head, &other.head) {
            (Some(left), Some(right)) => ReferenceCounter::ptr_eq(left, right),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Clone> ImmutableStack<T> {
    /// Returns the stack without its top element, along with that element.
    ///
    /// # Errors
    ///
    /// [`CollectionError::EmptyCollection`] if the stack is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbor_collections::immutable::ImmutableStack;
    ///
    /// let (rest, top) = ImmutableStack::new().push('a').push('b').pop_value().unwrap();
    /// assert_eq!(top, 'b');
    /// assert_eq!(rest.len(), 1);
    /// ```
    pub fn pop_value(&self) -> Result<(Self, T), CollectionError> {
        let top = self.peek()?.clone();
        Ok((self.pop()?, top))
    }

    /// Returns the stack with its order reversed.
    #[must_use]
    pub fn reverse(&self) -> Self {
        self.iter().cloned().fold(Self::new(), |stack, element| stack.push(element))
    }
}

impl<T> Drop for ImmutableStack<T> {
    fn drop(&mut self) {
        // Unlink uniquely owned nodes one at a time so long stacks do not
        // recurse through nested drops.
        let mut current = self.head.take();
        while let Some(node) = current {
            current = match ReferenceCounter::try_unwrap(node) {
                Ok(mut node) => node.next.take(),
                Err(_) => None,
            };
        }
    }
}

// =============================================================================
// Iterator
// =============================================================================

/// Iterator over a stack from top to bottom.
pub struct StackIter<'a, T> {
    current: Option<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for StackIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.current = node.next.as_deref();
        self.remaining -= 1;
        Some(&node.element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for StackIter<'_, T> {}

impl<T> FusedIterator for StackIter<'_, T> {}

impl<T> Clone for StackIter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            current: self.current,
            remaining: self.remaining,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T> Default for ImmutableStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pushes each element in turn, so the last element ends up on top.
impl<T> FromIterator<T> for ImmutableStack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |stack, element| stack.push(element))
    }
}

impl<'a, T> IntoIterator for &'a ImmutableStack<T> {
    type Item = &'a T;
    type IntoIter = StackIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for ImmutableStack<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && (self.ptr_eq(other) || self.iter().eq(other.iter()))
    }
}

impl<T: Eq> Eq for ImmutableStack<T> {}

impl<T: Hash> Hash for ImmutableStack<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ImmutableStack<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T> ImmutableCollection for ImmutableStack<T> {
    fn len(&self) -> usize {
        self.length
    }

    fn clear(&self) -> Self {
        Self::new()
    }
}
