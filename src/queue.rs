//! [`WeakOrderQueue`]: a single-producer/single-consumer relay a foreign
//! thread uses to hand recycled handles back to their home stack.

use crate::handle::Handle;
use crate::link::Link;
use crate::stack::StackShared;
use crate::stats::StatisticsCollector;
use crate::thread_token::{self, ThreadToken};

#[cfg(not(feature = "parking_lot"))]
use std::sync::Mutex;

#[cfg(feature = "parking_lot")]
use parking_lot::Mutex;

use std::cell::Cell;
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::{Arc, Weak};

#[cfg(feature = "tracing")]
use tracing::debug;

/// Per-producer-thread delivery queue linked into a stack's `head` chain.
///
/// One exists for every foreign thread that has recycled at least one
/// handle belonging to a given stack. It never holds a strong reference to
/// the target stack — the stack calls [`WeakOrderQueue::transfer`] on
/// itself, so the queue never needs to know where it is going.
pub(crate) struct WeakOrderQueue<T> {
    pub(crate) id: u64,
    producer_alive: ThreadToken,
    link_head: Mutex<Arc<Link<T>>>,
    link_tail: Mutex<Arc<Link<T>>>,
    link_capacity: usize,
    available_shared_capacity: Arc<AtomicIsize>,
    delayed_queue_ratio: u32,
    handle_recycle_count: Cell<u32>,
    pub(crate) next: Mutex<Option<Arc<WeakOrderQueue<T>>>>,
    stats: Option<Arc<StatisticsCollector>>,
}

// SAFETY: `handle_recycle_count` is only ever touched by the single producer
// thread that owns this queue (via `add`); everything else is behind an
// atomic or a mutex.
unsafe impl<T: Send> Sync for WeakOrderQueue<T> {}

impl<T> WeakOrderQueue<T> {
    pub(crate) fn new(
        id: u64,
        link_capacity: usize,
        available_shared_capacity: Arc<AtomicIsize>,
        delayed_queue_ratio: u32,
        stats: Option<Arc<StatisticsCollector>>,
    ) -> Self {
        let link = Arc::new(Link::new(link_capacity));
        Self {
            id,
            producer_alive: thread_token::current_thread_token(),
            link_head: Mutex::new(link.clone()),
            link_tail: Mutex::new(link),
            link_capacity,
            available_shared_capacity,
            delayed_queue_ratio,
            handle_recycle_count: Cell::new(0),
            next: Mutex::new(None),
            stats,
        }
    }

    #[inline]
    pub(crate) fn producer_is_alive(&self) -> bool {
        thread_token::is_alive(&self.producer_alive)
    }

    /// Admits `handle` into this queue's link chain, subject to the ratio
    /// filter and the stack's shared capacity budget. Called only by the
    /// producer thread.
    ///
    /// Returns `true` if the handle was queued, `false` if it was dropped
    /// (ratio filter, capacity exhausted, or lost the claim race).
    pub(crate) fn add(&self, mut handle: Box<Handle<T>>) -> bool {
        let count = self.handle_recycle_count.get().wrapping_add(1);
        self.handle_recycle_count.set(count);
        if count % self.delayed_queue_ratio.max(1) != 0 {
            return false;
        }

        if !Self::reserve_shared_capacity(&self.available_shared_capacity) {
            return false;
        }

        if !handle.try_claim(self.id) {
            #[cfg(feature = "tracing")]
            debug!(queue_id = self.id, "lost claim race admitting handle into weak-order queue");
            self.available_shared_capacity.fetch_add(1, Ordering::Relaxed);
            if let Some(stats) = &self.stats {
                stats.record_race_loss();
            }
            return false;
        }

        // Null while resident in a foreign queue; restored by `transfer`.
        handle.home_stack = Weak::new();

        let mut tail = self.link_tail.lock_handle();
        if tail.is_full() {
            let fresh = Arc::new(Link::new(self.link_capacity));
            tail.set_next(fresh.clone());
            *tail = fresh;
        }
        tail.push(handle);
        true
    }

    fn reserve_shared_capacity(budget: &AtomicIsize) -> bool {
        let mut current = budget.load(Ordering::Relaxed);
        loop {
            if current <= 0 {
                return false;
            }
            match budget.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    /// Drains up to `max_handles` available handles, restoring each one's
    /// `home_stack` to `stack` and returning its reserved shared capacity.
    /// Called only by the consumer (the stack's owning thread).
    ///
    /// `max_handles` is the destination's remaining room (spec.md §4.3 step
    /// 4's "clamp the source range so the batch fits"); once that many have
    /// been pulled out of the link chain, draining stops and whatever is
    /// left stays queued for a later scavenge rather than being pulled out
    /// only to have nowhere to go. The destination's own admission check
    /// (ratio filter) is applied by the caller per drained handle, not here
    /// — `transfer` only moves handles out of the queue, it doesn't decide
    /// whether the destination keeps them.
    pub(crate) fn transfer(&self, stack: &Weak<StackShared<T>>, max_handles: usize) -> Vec<Box<Handle<T>>> {
        let mut drained = Vec::new();
        if max_handles == 0 {
            return drained;
        }
        loop {
            let mut head = self.link_head.lock_handle();
            loop {
                if drained.len() >= max_handles {
                    break;
                }
                match head.take_next() {
                    Some(mut handle) => {
                        handle.home_stack = stack.clone();
                        handle.clear_claim();
                        self.available_shared_capacity.fetch_add(1, Ordering::Relaxed);
                        drained.push(handle);
                    }
                    None => break,
                }
            }
            if drained.len() >= max_handles {
                break;
            }
            if head.is_drained() {
                if let Some(next) = head.next() {
                    *head = next;
                    continue;
                }
            }
            break;
        }
        drained
    }

    /// Whether this queue still has handles a future `transfer` would pick
    /// up (including handles buffered in not-yet-visited links).
    pub(crate) fn has_final_data(&self) -> bool {
        let mut link = self.link_head.lock_handle().clone();
        loop {
            if link.available() > 0 {
                return true;
            }
            match link.next() {
                Some(next) => link = next,
                None => return false,
            }
        }
    }
}

#[cfg(not(feature = "parking_lot"))]
trait LockExt<T> {
    fn lock_handle(&self) -> std::sync::MutexGuard<'_, T>;
}

#[cfg(not(feature = "parking_lot"))]
impl<T> LockExt<T> for std::sync::Mutex<T> {
    fn lock_handle(&self) -> std::sync::MutexGuard<'_, T> {
        self.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(feature = "parking_lot")]
trait LockExt<T> {
    fn lock_handle(&self) -> parking_lot::MutexGuard<'_, T>;
}

#[cfg(feature = "parking_lot")]
impl<T> LockExt<T> for parking_lot::Mutex<T> {
    fn lock_handle(&self) -> parking_lot::MutexGuard<'_, T> {
        self.lock()
    }
}
