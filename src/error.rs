//! Error type shared by every collection in this crate.
//!
//! Operations that can violate a caller contract (an index past the end, a
//! duplicate key under a throwing collision policy, popping an empty stack)
//! return [`CollectionError`] instead of panicking. None of these conditions
//! are retried internally; they surface at the call that caused them.

use std::error::Error;
use std::fmt;

/// Errors raised by immutable collections, their builders and enumerators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionError {
    /// An index was outside `0..length` (or `0..=length` for insertion).
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The collection length at the time of the call.
        length: usize,
    },

    /// A `(start, count)` window did not fit inside the collection.
    InvalidRange {
        /// First index of the window.
        start: usize,
        /// Number of elements in the window.
        count: usize,
        /// The collection length at the time of the call.
        length: usize,
    },

    /// A key was added that already maps to a value, under a collision
    /// policy that rejects it.
    DuplicateKey,

    /// `peek`, `pop` or `dequeue` was called on an empty stack or queue.
    EmptyCollection,

    /// The builder an enumerator walks was modified after the enumerator
    /// captured its version.
    CollectionModified,

    /// An enumerator (or its pooled traversal stack) was used after it was
    /// disposed, or by a holder that does not own it.
    Disposed,

    /// `current` was read before the first `move_next` or after the end.
    NoCurrentElement,
}

impl fmt::Display for CollectionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, length } => {
                write!(
                    formatter,
                    "index {index} is out of range for a collection of length {length}"
                )
            }
            Self::InvalidRange {
                start,
                count,
                length,
            } => {
                write!(
                    formatter,
                    "range starting at {start} with {count} elements does not fit a collection of length {length}"
                )
            }
            Self::DuplicateKey => {
                write!(
                    formatter,
                    "an element with the same key but a different value already exists"
                )
            }
            Self::EmptyCollection => write!(formatter, "the collection is empty"),
            Self::CollectionModified => {
                write!(
                    formatter,
                    "collection was modified; enumeration operation may not execute"
                )
            }
            Self::Disposed => write!(formatter, "the enumerator has been disposed"),
            Self::NoCurrentElement => {
                write!(formatter, "enumeration has not started or has already finished")
            }
        }
    }
}

impl Error for CollectionError {}

/// Checks that `index` addresses an existing element of a collection of `length`.
pub(crate) const fn check_index(index: usize, length: usize) -> Result<(), CollectionError> {
    if index < length {
        Ok(())
    } else {
        Err(CollectionError::IndexOutOfRange { index, length })
    }
}

/// Checks that `index` is a valid insertion point (`0..=length`).
pub(crate) const fn check_insertion_index(
    index: usize,
    length: usize,
) -> Result<(), CollectionError> {
    if index <= length {
        Ok(())
    } else {
        Err(CollectionError::IndexOutOfRange { index, length })
    }
}

/// Checks that the window `start..start + count` lies within `0..length`.
pub(crate) const fn check_range(
    start: usize,
    count: usize,
    length: usize,
) -> Result<(), CollectionError> {
    if start <= length && count <= length - start {
        Ok(())
    } else {
        Err(CollectionError::InvalidRange {
            start,
            count,
            length,
        })
    }
}
