//! Immutable FIFO queue.
//!
//! [`ImmutableQueue`] is built from two [`ImmutableStack`]s: `forwards`
//! holds the head of the queue in dequeue order and `backwards` holds newer
//! elements in reverse. When `forwards` runs dry the backwards stack is
//! reversed into its place, so every element is moved at most once.
//!
//! The queue keeps `forwards` non-empty whenever it has elements, which
//! makes [`peek`](ImmutableQueue::peek) constant time.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::{FromIterator, FusedIterator};

use super::stack::{ImmutableStack, StackIter};
use crate::error::CollectionError;
use crate::traits::ImmutableCollection;

/// An immutable first-in first-out queue.
///
/// # Time Complexity
///
/// | Operation | Complexity          |
/// |-----------|---------------------|
/// | `enqueue` | O(1)                |
/// | `dequeue` | O(1) amortized      |
/// | `peek`    | O(1)                |
/// | `len`     | O(1)                |
///
/// # Examples
///
/// ```rust
/// use arbor_collections::immutable::ImmutableQueue;
///
/// let queue = ImmutableQueue::new().enqueue(1).enqueue(2).enqueue(3);
/// let (rest, first) = queue.dequeue_value().unwrap();
///
/// assert_eq!(first, 1);
/// assert_eq!(rest.peek(), Ok(&2));
/// assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
/// ```
pub struct ImmutableQueue<T> {
    forwards: ImmutableStack<T>,
    backwards: ImmutableStack<T>,
}

impl<T> Clone for ImmutableQueue<T> {
    fn clone(&self) -> Self {
        Self {
            forwards: self.forwards.clone(),
            backwards: self.backwards.clone(),
        }
    }
}

impl<T> ImmutableQueue<T> {
    /// Creates an empty queue.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            forwards: ImmutableStack::new(),
            backwards: ImmutableStack::new(),
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.forwards.len() + self.backwards.len()
    }

    /// Returns `true` if the queue has no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.forwards.is_empty()
    }

    /// Returns the element at the head of the queue.
    ///
    /// # Errors
    ///
    /// [`CollectionError::EmptyCollection`] if the queue is empty.
    pub fn peek(&self) -> Result<&T, CollectionError> {
        self.forwards.peek()
    }

    /// Returns an empty queue.
    #[inline]
    #[must_use]
    pub const fn clear(&self) -> Self {
        Self::new()
    }

    /// Iterates from the head of the queue to the tail.
    #[must_use]
    pub fn iter(&self) -> QueueIter<'_, T> {
        QueueIter {
            forwards: self.forwards.iter(),
            backwards: None,
            source: &self.backwards,
        }
    }
}

impl<T: Clone> ImmutableQueue<T> {
    /// Returns a queue with `element` at the tail.
    #[must_use]
    pub fn enqueue(&self, element: T) -> Self {
        if self.is_empty() {
            Self {
                forwards: ImmutableStack::new().push(element),
                backwards: ImmutableStack::new(),
            }
        } else {
            Self {
                forwards: self.forwards.clone(),
                backwards: self.backwards.push(element),
            }
        }
    }

    /// Returns the queue without its head element.
    ///
    /// # Errors
    ///
    /// [`CollectionError::EmptyCollection`] if the queue is empty.
    pub fn dequeue(&self) -> Result<Self, CollectionError> {
        let forwards = self.forwards.pop()?;
        if !forwards.is_empty() {
            return Ok(Self {
                forwards,
                backwards: self.backwards.clone(),
            });
        }
        if self.backwards.is_empty() {
            return Ok(Self::new());
        }
        tracing::trace!(length = self.backwards.len(), "reversing queue backwards stack");
        Ok(Self {
            forwards: self.backwards.reverse(),
            backwards: ImmutableStack::new(),
        })
    }

    /// Returns the queue without its head element, along with that element.
    ///
    /// # Errors
    ///
    /// [`CollectionError::EmptyCollection`] if the queue is empty.
    pub fn dequeue_value(&self) -> Result<(Self, T), CollectionError> {
        let head = self.peek()?.clone();
        Ok((self.dequeue()?, head))
    }
}

// =============================================================================
// Iterator
// =============================================================================

/// Iterator over a queue from head to tail.
///
/// The backwards half is materialized the first time the iterator reaches
/// it.
pub struct QueueIter<'a, T> {
    forwards: StackIter<'a, T>,
    backwards: Option<std::iter::Rev<std::vec::IntoIter<&'a T>>>,
    source: &'a ImmutableStack<T>,
}

impl<'a, T> Iterator for QueueIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(element) = self.forwards.next() {
            return Some(element);
        }
        let source = self.source;
        self.backwards
            .get_or_insert_with(|| source.iter().collect::<Vec<_>>().into_iter().rev())
            .next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.forwards.len()
            + self
                .backwards
                .as_ref()
                .map_or(self.source.len(), ExactSizeIterator::len);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for QueueIter<'_, T> {}

impl<T> FusedIterator for QueueIter<'_, T> {}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T> Default for ImmutableQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FromIterator<T> for ImmutableQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |queue, element| queue.enqueue(element))
    }
}

impl<'a, T> IntoIterator for &'a ImmutableQueue<T> {
    type Item = &'a T;
    type IntoIter = QueueIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for ImmutableQueue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for ImmutableQueue<T> {}

impl<T: Hash> Hash for ImmutableQueue<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ImmutableQueue<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T> ImmutableCollection for ImmutableQueue<T> {
    fn len(&self) -> usize {
        Self::len(self)
    }

    fn clear(&self) -> Self {
        Self::new()
    }
}
