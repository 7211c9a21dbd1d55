//! Process-wide monotonic identifier generator.
//!
//! One counter issues both a `Stack`'s `own_thread_id` and a
//! `WeakOrderQueue`'s `id`. Both live in the same non-zero `u64` space so a
//! `Handle`'s `last_recycled_id` can be compared against either without a
//! discriminant: `0` is reserved for "unclaimed".

use std::sync::atomic::{AtomicI64, Ordering};

// Start deep in negative i64 space so the counter can run for the lifetime
// of the process without wrapping back to 0.
static NEXT_ID: AtomicI64 = AtomicI64::new(i64::MIN + 1);

/// Returns the next process-wide unique, non-zero identifier.
pub(crate) fn next_id() -> u64 {
    loop {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        if id != 0 {
            return id as u64;
        }
        // id == 0 would only occur after ~2^63 allocations; skip it so the
        // "0 means unclaimed" invariant never breaks.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_non_zero() {
        let a = next_id();
        let b = next_id();
        assert_ne!(a, b);
        assert_ne!(a, 0);
        assert_ne!(b, 0);
    }
}
