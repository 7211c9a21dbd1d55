//! Substitute for `Weak<Thread>`, which the standard library does not offer.
//!
//! A `WeakOrderQueue` needs to tell whether the thread that created it is
//! still alive, without keeping that thread pinned. Each thread publishes an
//! `Arc<AtomicBool>` the first time it touches this module; everyone else
//! holds only a `Weak` pointer to it. The flag is flipped to `false` from a
//! `thread_local!` destructor, so the liveness check is accurate even if the
//! `Arc`'s last strong reference also happens to live on that thread.

use std::sync::{Arc, Weak};

struct Registration {
    alive: Arc<std::sync::atomic::AtomicBool>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.alive.store(false, std::sync::atomic::Ordering::Release);
    }
}

thread_local! {
    static CURRENT: Registration = Registration {
        alive: Arc::new(std::sync::atomic::AtomicBool::new(true)),
    };
}

/// A weak handle to "is the thread that created this token still running".
pub(crate) type ThreadToken = Weak<std::sync::atomic::AtomicBool>;

/// Returns a weak token for the calling thread, registering it on first use.
pub(crate) fn current_thread_token() -> ThreadToken {
    CURRENT.with(|r| Arc::downgrade(&r.alive))
}

/// Returns whether the thread that produced `token` is still alive.
///
/// A token whose `Arc` has already been dropped (the owning thread exited
/// and its `thread_local!` destructors ran) is treated as dead, same as one
/// whose flag was explicitly cleared.
pub(crate) fn is_alive(token: &ThreadToken) -> bool {
    match token.upgrade() {
        Some(flag) => flag.load(std::sync::atomic::Ordering::Acquire),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_for_current_thread_starts_alive() {
        let token = current_thread_token();
        assert!(is_alive(&token));
    }

    #[test]
    fn token_dies_with_its_thread() {
        let token = std::thread::spawn(current_thread_token)
            .join()
            .expect("spawned thread panicked");
        assert!(!is_alive(&token));
    }
}
