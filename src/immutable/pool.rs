//! Ownership-tagged object pool for traversal stacks.
//!
//! Enumerators borrow their ancestor stack from a pool so that walking a
//! tree does not allocate. Each checked-out object records the
//! [`OwnerToken`] of its borrower; every access presents the token again and
//! is refused with [`CollectionError::Disposed`] if it does not match. An
//! object returned to the pool is cleared and loses its owner, so a stale
//! holder can never observe another enumerator's state.
//!
//! One pool exists per pooled type ([`shared_pool`]). Each pool is guarded by a
//! single `parking_lot` mutex held only for the push or pop itself.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::ReferenceCounter;
use crate::error::CollectionError;

/// Maximum number of idle objects a pool keeps.
const POOL_CAPACITY: usize = 32;

// =============================================================================
// Owner Tokens
// =============================================================================

/// Identifies the borrower of a pooled object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct OwnerToken(NonZeroU64);

impl OwnerToken {
    /// Returns a token no other borrower has been given.
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        let raw = NEXT.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }
}

// =============================================================================
// Reusable Objects
// =============================================================================

/// An object that can be cleared for reuse.
pub(crate) trait Reusable: Default {
    /// Drops all state so the object looks freshly created.
    fn reset(&mut self);
}

impl<T> Reusable for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }
}

/// An object checked out of a [`SecureObjectPool`].
pub(crate) struct SecurePooledObject<T> {
    value: T,
    owner: Option<OwnerToken>,
}

impl<T> SecurePooledObject<T> {
    /// Returns `true` if `token` is the current owner.
    pub(crate) fn is_owned_by(&self, token: OwnerToken) -> bool {
        self.owner == Some(token)
    }

    /// Grants access to the value if `token` is the current owner.
    pub(crate) fn use_as(&mut self, token: OwnerToken) -> Result<&mut T, CollectionError> {
        if self.is_owned_by(token) {
            Ok(&mut self.value)
        } else {
            tracing::debug!("pooled object accessed by a holder that does not own it");
            Err(CollectionError::Disposed)
        }
    }
}

// =============================================================================
// Pool
// =============================================================================

/// A pool of reusable objects with exclusive, token-checked checkout.
pub(crate) struct SecureObjectPool<T> {
    available: Mutex<Vec<SecurePooledObject<T>>>,
}

impl<T: Reusable> SecureObjectPool<T> {
    pub(crate) const fn new() -> Self {
        Self {
            available: Mutex::new(Vec::new()),
        }
    }

    /// Checks out an object for `token`, creating one if the pool is empty.
    pub(crate) fn take(&self, token: OwnerToken) -> SecurePooledObject<T> {
        let recycled = self.available.lock().pop();
        let mut object = recycled.unwrap_or_else(|| SecurePooledObject {
            value: T::default(),
            owner: None,
        });
        object.owner = Some(token);
        object
    }

    /// Returns an object to the pool. Only its owner may return it.
    pub(crate) fn give_back(
        &self,
        object: SecurePooledObject<T>,
        token: OwnerToken,
    ) -> Result<(), CollectionError> {
        if !object.is_owned_by(token) {
            tracing::debug!("pooled object returned by a holder that does not own it");
            return Err(CollectionError::Disposed);
        }
        let mut object = object;
        object.value.reset();
        object.owner = None;
        let mut available = self.available.lock();
        if available.len() < POOL_CAPACITY {
            available.push(object);
        }
        Ok(())
    }

    #[cfg(test)]
    fn idle_count(&self) -> usize {
        self.available.lock().len()
    }
}

type PoolRegistry = HashMap<TypeId, ReferenceCounter<dyn Any + Send + Sync>>;

static POOLS: LazyLock<Mutex<PoolRegistry>> = LazyLock::new(|| Mutex::new(HashMap::new()));

/// Returns the process-wide pool for objects of type `T`.
pub(crate) fn shared_pool<T>() -> ReferenceCounter<SecureObjectPool<T>>
where
    T: Reusable + Send + 'static,
{
    let erased = {
        let mut pools = POOLS.lock();
        ReferenceCounter::clone(pools.entry(TypeId::of::<T>()).or_insert_with(|| {
            let pool: ReferenceCounter<dyn Any + Send + Sync> =
                ReferenceCounter::new(SecureObjectPool::<T>::new());
            pool
        }))
    };
    erased
        .downcast::<SecureObjectPool<T>>()
        .unwrap_or_else(|_| ReferenceCounter::new(SecureObjectPool::new()))
}
