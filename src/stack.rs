//! [`StackShared`]: a single thread's LIFO store of idle handles for one
//! [`crate::Recycler`], plus the registry foreign threads use to find their
//! way back to it.

use crate::config::RecyclerConfig;
use crate::handle::Handle;
use crate::ids;
use crate::queue::WeakOrderQueue;
use crate::stats::StatisticsCollector;

#[cfg(not(feature = "parking_lot"))]
use std::sync::Mutex;

#[cfg(feature = "parking_lot")]
use parking_lot::Mutex;

use std::any::Any;
use std::cell::RefCell;
use std::sync::atomic::AtomicIsize;
use std::sync::{Arc, Weak};

#[cfg(feature = "tracing")]
use tracing::debug;

/// The LIFO storage and cross-thread bookkeeping behind one thread's view
/// of a [`crate::Recycler`].
///
/// Lives behind an `Arc` so that a [`Handle`]'s `home_stack` can hold a
/// `Weak` reference to it without pinning the owning thread's TLS alive —
/// when that thread exits, its `Arc<StackShared<T>>` entry is dropped, the
/// allocation is freed, and every outstanding `Weak` simply fails to
/// upgrade from then on.
pub(crate) struct StackShared<T> {
    own_thread_id: u64,
    max_capacity_per_thread: usize,
    ratio: u32,
    max_delayed_queues: usize,
    link_capacity: usize,
    delayed_queue_ratio: u32,
    available_shared_capacity: Arc<AtomicIsize>,
    elements: RefCell<Vec<Box<Handle<T>>>>,
    head: Mutex<Option<Arc<WeakOrderQueue<T>>>>,
    handle_recycle_count: RefCell<u32>,
    stats: Option<Arc<StatisticsCollector>>,
}

// SAFETY: `elements` and `handle_recycle_count` are only ever touched from
// the single thread that owns this stack's slot in the recycler's
// thread-local map (`pop`, `push_now`, `scavenge`). Cross-thread callers
// only ever reach `head` (mutex-guarded) and the atomic shared-capacity
// budget.
unsafe impl<T: Send> Send for StackShared<T> {}
unsafe impl<T: Send> Sync for StackShared<T> {}

impl<T> StackShared<T> {
    pub(crate) fn new(config: &RecyclerConfig<T>, stats: Option<Arc<StatisticsCollector>>) -> Arc<Self> {
        let shared_capacity = (config.max_capacity_per_thread() / config.max_shared_capacity_factor())
            .max(config.link_capacity());
        Arc::new(Self {
            own_thread_id: ids::next_id(),
            max_capacity_per_thread: config.max_capacity_per_thread(),
            ratio: config.ratio(),
            max_delayed_queues: config.max_delayed_queues_per_thread(),
            link_capacity: config.link_capacity(),
            delayed_queue_ratio: config.delayed_queue_ratio(),
            available_shared_capacity: Arc::new(AtomicIsize::new(shared_capacity as isize)),
            elements: RefCell::new(Vec::new()),
            head: Mutex::new(None),
            handle_recycle_count: RefCell::new(0),
            stats,
        })
    }

    #[inline]
    pub(crate) fn max_capacity_per_thread(&self) -> usize {
        self.max_capacity_per_thread
    }

    /// Pops a ready-to-use handle from this thread's own storage, scavenging
    /// from foreign-thread queues if the local store is empty.
    pub(crate) fn pop(self_arc: &Arc<Self>) -> Option<Box<Handle<T>>> {
        if let Some(handle) = self_arc.elements.borrow_mut().pop() {
            return Some(handle);
        }
        if self_arc.scavenge() {
            return self_arc.elements.borrow_mut().pop();
        }
        None
    }

    /// Admits `handle` on the thread that already owns this stack. Returns
    /// `true` if it was kept.
    pub(crate) fn push_now(&self, handle: Box<Handle<T>>) -> bool {
        debug_assert_eq!(
            handle.recycle_id, self.own_thread_id,
            "a handle admitted onto a stack must be stamped with that stack's own_thread_id"
        );
        let kept = self.try_admit(handle);
        if kept {
            self.record_recycle();
        }
        kept
    }

    /// The ratio-filter + capacity check shared by the same-thread push path
    /// (`push_now`) and handles arriving from a scavenged weak-order queue
    /// (spec.md §4.3 step 5's `dst.drop_handle(element)`). Returns `true` if
    /// `handle` was pushed onto `elements`.
    fn try_admit(&self, handle: Box<Handle<T>>) -> bool {
        let mut count = self.handle_recycle_count.borrow_mut();
        *count = count.wrapping_add(1);
        if *count % self.ratio.max(1) != 0 {
            self.record_drop(DropKind::Ratio);
            return false;
        }
        drop(count);

        let mut elements = self.elements.borrow_mut();
        if elements.len() >= self.max_capacity_per_thread {
            self.record_drop(DropKind::Capacity);
            return false;
        }
        elements.push(handle);
        true
    }

    /// Walks the chain of foreign-thread queues looking for data, unlinking
    /// any queue whose producer has died and which has nothing left to
    /// give. Returns whether anything was pulled into `elements`.
    ///
    /// Per spec.md §4.3 step 4, the destination's remaining room clamps how
    /// much a single `transfer` call drains from one queue, and per step 5
    /// every drained handle still passes through the destination's own
    /// `drop_handle` (ratio filter via [`Self::try_admit`]) rather than being
    /// admitted unconditionally — a handle that loses the ratio filter here
    /// is dropped for good, exactly as a same-thread `push_now` drop is.
    fn scavenge(self: &Arc<Self>) -> bool {
        let mut prev: Option<Arc<WeakOrderQueue<T>>> = None;
        let mut current = self.head.lock_handle().clone();

        while let Some(queue) = current {
            let room = self.max_capacity_per_thread.saturating_sub(self.elements.borrow().len());
            let weak_self: Weak<Self> = Arc::downgrade(self);
            let drained = queue.transfer(&weak_self, room);
            let mut admitted_any = false;
            for handle in drained {
                if self.try_admit(handle) {
                    admitted_any = true;
                }
            }
            if admitted_any {
                self.record_scavenge();
                return true;
            }

            if !queue.producer_is_alive() && !queue.has_final_data() {
                #[cfg(feature = "tracing")]
                debug!(queue_id = queue.id, "unlinking dead, drained weak-order queue");
                let next = queue.next.lock_handle().clone();
                match &prev {
                    Some(p) => *p.next.lock_handle() = next.clone(),
                    None => *self.head.lock_handle() = next.clone(),
                }
                if let Some(stats) = &self.stats {
                    stats.queue_unlinked();
                }
                current = next;
                continue;
            }

            current = queue.next.lock_handle().clone();
            prev = Some(queue);
        }
        false
    }

    /// Registers (creating if necessary) the calling thread's outgoing
    /// queue to this stack, and hands `handle` to it. Drops the handle if
    /// this thread has already exhausted its `max_delayed_queues` quota of
    /// distinct foreign stacks.
    fn recycle_from_foreign_thread(self_arc: &Arc<Self>, handle: Box<Handle<T>>) -> bool {
        let queue = DELAYED_QUEUES.with(|registry| {
            registry
                .borrow_mut()
                .queue_for(self_arc, self_arc.max_delayed_queues, || {
                    let q = Arc::new(WeakOrderQueue::new(
                        ids::next_id(),
                        self_arc.link_capacity,
                        self_arc.available_shared_capacity.clone(),
                        self_arc.delayed_queue_ratio,
                        self_arc.stats.clone(),
                    ));
                    let mut head = self_arc.head.lock_handle();
                    *q.next.lock_handle() = head.clone();
                    *head = Some(q.clone());
                    if let Some(stats) = &self_arc.stats {
                        stats.queue_linked();
                    }
                    q
                })
        });
        match queue {
            Some(q) => q.add(handle),
            None => {
                self_arc.record_drop(DropKind::DelayedQueueQuota);
                false
            }
        }
    }

    fn record_recycle(&self) {
        if let Some(stats) = &self.stats {
            stats.record_recycle();
        }
    }

    fn record_drop(&self, kind: DropKind) {
        if let Some(stats) = &self.stats {
            match kind {
                DropKind::Ratio => stats.record_ratio_drop(),
                DropKind::Capacity => stats.record_capacity_drop(),
                DropKind::DelayedQueueQuota => stats.record_delayed_queue_quota_drop(),
            }
        }
    }

    fn record_scavenge(&self) {
        if let Some(stats) = &self.stats {
            stats.record_scavenge();
        }
    }

    pub(crate) fn record_get(&self) {
        if let Some(stats) = &self.stats {
            stats.record_get();
        }
    }
}

enum DropKind {
    Ratio,
    Capacity,
    DelayedQueueQuota,
}

/// Routes a handle back to its home stack, choosing the same-thread or
/// cross-thread path based on where it actually is.
pub(crate) fn recycle_handle<T>(home_stack: Weak<StackShared<T>>, mut handle: Box<Handle<T>>) -> bool {
    let Some(stack) = home_stack.upgrade() else {
        return false;
    };
    handle.recycle_id = stack.own_thread_id;
    if is_current_thread_owner(&stack) {
        stack.push_now(handle)
    } else {
        StackShared::recycle_from_foreign_thread(&stack, handle)
    }
}

/// Identifies a stack by its globally-unique `own_thread_id` rather than its
/// `Arc` address: a dropped `StackShared` can have its allocation reused by
/// an unrelated stack at the same address, and pointer identity would then
/// misattribute ownership or collapse two distinct foreign targets into one.
fn stack_key<T>(stack: &Arc<StackShared<T>>) -> u64 {
    stack.own_thread_id
}

thread_local! {
    static OWNED_STACKS: RefCell<std::collections::HashSet<u64>> = RefCell::new(std::collections::HashSet::new());
}

/// A thread owns a stack if it is the one that created it — recorded here
/// the first time `Recycler::thread_stack` builds one, since there is no
/// portable way to recover a stable numeric id from `std::thread::current`.
fn is_current_thread_owner<T>(stack: &Arc<StackShared<T>>) -> bool {
    OWNED_STACKS.with(|owned| owned.borrow().contains(&stack_key(stack)))
}

/// Marks `stack` as owned by the calling thread. Called once, right after a
/// thread creates its own stack for a recycler.
pub(crate) fn mark_owned<T>(stack: &Arc<StackShared<T>>) {
    OWNED_STACKS.with(|owned| owned.borrow_mut().insert(stack_key(stack)));
}

// --- Per-thread registry of outgoing weak-order queues -------------------
//
// Keyed by the target `StackShared<T>`'s `own_thread_id`, erased through
// `Any` since a single `thread_local!` cannot be generic over `T` directly.
// Entries are pruned lazily: a target whose `Weak` no longer upgrades is
// dropped the next time this thread looks anything up.

thread_local! {
    static DELAYED_QUEUES: RefCell<DelayedQueueRegistry> = RefCell::new(DelayedQueueRegistry::new());
}

struct DelayedEntry {
    stack_key: u64,
    stack_alive: Box<dyn Fn() -> bool>,
    // `None` marks a DUMMY slot: this thread has already hit its quota of
    // distinct foreign stacks for this target, so everything routed at it
    // is dropped without ever allocating a queue.
    queue: Box<dyn Any>,
}

struct DelayedQueueRegistry {
    entries: Vec<DelayedEntry>,
}

impl DelayedQueueRegistry {
    fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Looks up (or lazily creates) this thread's outgoing queue toward
    /// `stack`. Returns `None` if this thread has already registered
    /// `max_delayed_queues` distinct targets and `stack` is not one of
    /// them — the caller must drop the handle rather than queue it.
    fn queue_for<T: 'static>(
        &mut self,
        stack: &Arc<StackShared<T>>,
        max_delayed_queues: usize,
        create: impl FnOnce() -> Arc<WeakOrderQueue<T>>,
    ) -> Option<Arc<WeakOrderQueue<T>>> {
        self.entries.retain(|e| (e.stack_alive)());

        let key = stack_key(stack);
        if let Some(entry) = self.entries.iter().find(|e| e.stack_key == key) {
            return entry
                .queue
                .downcast_ref::<Option<Arc<WeakOrderQueue<T>>>>()
                .and_then(|q| q.clone());
        }

        let weak = Arc::downgrade(stack);
        if self.entries.len() >= max_delayed_queues {
            self.entries.push(DelayedEntry {
                stack_key: key,
                stack_alive: Box::new(move || weak.upgrade().is_some()),
                queue: Box::new(None::<Arc<WeakOrderQueue<T>>>),
            });
            return None;
        }

        let queue = create();
        self.entries.push(DelayedEntry {
            stack_key: key,
            stack_alive: Box::new(move || weak.upgrade().is_some()),
            queue: Box::new(Some(queue.clone())),
        });
        Some(queue)
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
