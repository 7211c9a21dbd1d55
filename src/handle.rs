//! [`Handle`], the per-object ticket returned by [`crate::Recycler::get`].

use crate::stack::StackShared;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Weak;

/// Owns a pooled `T` and knows how to return it to the stack it came from.
///
/// Dereferences to `T` so it can be used in place of the value itself. Call
/// [`Handle::recycle`] when done with it; dropping the handle without
/// calling `recycle` simply discards the value (no destructor-driven
/// auto-return — see the crate-level docs for why).
pub struct Handle<T> {
    value: T,
    pub(crate) home_stack: Weak<StackShared<T>>,
    /// Set by whichever stack/queue currently admits this handle; read only
    /// by that same thread, so a plain field is sufficient.
    pub(crate) recycle_id: u64,
    /// CAS arbitration point: 0 means unclaimed, non-zero is the id of the
    /// stack or weak-order queue that currently owns this handle's slot.
    pub(crate) last_recycled_id: AtomicU64,
}

impl<T> Handle<T> {
    pub(crate) fn new(value: T, home_stack: Weak<StackShared<T>>) -> Self {
        Self {
            value,
            home_stack,
            recycle_id: 0,
            last_recycled_id: AtomicU64::new(0),
        }
    }

    /// Attempts to atomically claim this handle for `claimant_id`.
    ///
    /// Succeeds only if no one else holds a live claim; the loser of a race
    /// should drop the handle rather than retry.
    pub(crate) fn try_claim(&self, claimant_id: u64) -> bool {
        self.last_recycled_id
            .compare_exchange(0, claimant_id, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn clear_claim(&self) {
        self.last_recycled_id.store(0, Ordering::Release);
    }

    /// Consumes the handle, returning the bare value and its bookkeeping.
    pub(crate) fn into_parts(self) -> (T, Weak<StackShared<T>>, u64, AtomicU64) {
        (self.value, self.home_stack, self.recycle_id, self.last_recycled_id)
    }

    #[cfg(test)]
    pub(crate) fn for_test(value: T) -> Self {
        Self::new(value, Weak::new())
    }

    #[cfg(test)]
    pub(crate) fn peek(&self) -> &T {
        &self.value
    }
}

impl<T> Deref for Handle<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Handle<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_claim_is_single_admission() {
        let handle = Handle::for_test(42u32);
        assert!(handle.try_claim(7));
        assert!(!handle.try_claim(8), "second claim on the same handle must lose the race");
        handle.clear_claim();
        assert!(handle.try_claim(9));
    }

    #[test]
    fn deref_reaches_the_value() {
        let mut handle = Handle::for_test(String::from("hi"));
        assert_eq!(&*handle, "hi");
        handle.push_str(" there");
        assert_eq!(&*handle, "hi there");
    }
}
