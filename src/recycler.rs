//! [`Recycler`]: the public entry point callers interact with.

use crate::config::RecyclerConfig;
use crate::handle::Handle;
use crate::ids;
use crate::stack::{self, StackShared};
use crate::traits::Recyclable;

#[cfg(feature = "stats")]
use crate::stats::{PoolStatistics, StatisticsCollector};

use std::any::Any;
use std::cell::RefCell;
use std::sync::Arc;

/// A thread-local object pool with lock-free cross-thread return.
///
/// Each thread that calls [`Recycler::get`] gets its own private LIFO stack
/// of idle objects, populated either by that same thread's own
/// [`Handle::recycle`] calls or, when another thread recycles one of this
/// thread's objects, via a weak-order queue drained the next time this
/// thread scavenges (see the crate-level docs for the full protocol).
///
/// `Recycler<T>` is cheap to clone-share (it's just configuration plus an
/// identity used to find the calling thread's own stack) and is `Send +
/// Sync`, so it is commonly stored in a `static` or behind an `Arc` and used
/// from many threads at once.
///
/// # Examples
///
/// ```rust
/// use thread_recycler::{Recycler, RecyclerConfig, Recyclable};
///
/// struct Buffer(Vec<u8>);
///
/// impl Recyclable for Buffer {
///     fn new_object(_recycler: &Recycler<Self>) -> Self {
///         Buffer(Vec::with_capacity(4096))
///     }
///
///     fn on_acquire(&mut self) {
///         self.0.clear();
///     }
/// }
///
/// let recycler: Recycler<Buffer> = Recycler::new(RecyclerConfig::default());
/// let mut handle = recycler.get();
/// handle.0.extend_from_slice(b"hello");
/// handle.recycle();
/// ```
pub struct Recycler<T: Recyclable> {
    id: u64,
    config: RecyclerConfig<T>,
    #[cfg(feature = "stats")]
    stats: Arc<StatisticsCollector>,
}

impl<T: Recyclable + 'static> Recycler<T> {
    /// Creates a new recycler with the given configuration.
    pub fn new(config: RecyclerConfig<T>) -> Self {
        Self {
            id: ids::next_id(),
            config,
            #[cfg(feature = "stats")]
            stats: Arc::new(StatisticsCollector::new()),
        }
    }

    /// Returns a handle to a recycled or freshly constructed `T`.
    ///
    /// On a pool miss, falls through to [`Recyclable::new_object`]. Either
    /// way, [`Recyclable::on_acquire`] runs before the handle is returned.
    pub fn get(&self) -> Handle<T> {
        if self.config.max_capacity_per_thread() == 0 {
            let mut value = T::new_object(self);
            value.on_acquire();
            return Handle::new(value, std::sync::Weak::new());
        }

        let stack = self.thread_stack();
        #[cfg(feature = "stats")]
        stack.record_get();
        #[cfg(not(feature = "stats"))]
        let _ = &stack;

        match StackShared::pop(&stack) {
            Some(boxed) => {
                let (mut value, home_stack, recycle_id, last_recycled_id) = (*boxed).into_parts();
                value.on_acquire();
                let mut handle = Handle::new(value, home_stack);
                handle.recycle_id = recycle_id;
                handle.last_recycled_id = last_recycled_id;
                handle
            }
            None => {
                let mut value = T::new_object(self);
                value.on_acquire();
                Handle::new(value, Arc::downgrade(&stack))
            }
        }
    }

    /// Statistics accumulated across every thread that has used this
    /// recycler.
    #[cfg(feature = "stats")]
    #[cfg_attr(docsrs, doc(cfg(feature = "stats")))]
    pub fn statistics(&self) -> PoolStatistics {
        self.stats.snapshot()
    }

    fn thread_stack(&self) -> Arc<StackShared<T>> {
        RECYCLER_STACKS.with(|registry| {
            registry.borrow_mut().stack_for(self.id, || {
                #[cfg(feature = "stats")]
                let stats = Some(self.stats.clone());
                #[cfg(not(feature = "stats"))]
                let stats = None;
                let stack = StackShared::new(&self.config, stats);
                stack::mark_owned(&stack);
                stack
            })
        })
    }
}

// A recycled handle's claim to a particular claim id must be cleared before
// it is reused; `Handle::recycle` walks that protocol via `stack::recycle_handle`
// regardless of which `Recycler` is asking, since the destination is fully
// determined by the handle's own `home_stack`.
impl<T: Recyclable> Handle<T> {
    /// Returns this handle's object to the stack it came from.
    ///
    /// Returns `true` if the pool kept it, `false` if it was dropped — by
    /// the admission-ratio filter, because the owning thread's capacity (or
    /// its shared cross-thread budget) was exhausted, or because the
    /// owning thread has already exited. None of these are errors: the
    /// caller's object is simply gone, same as if it had never been
    /// pooled.
    pub fn recycle(mut self) -> bool {
        self.on_release();
        let (value, home_stack, recycle_id, last_recycled_id) = self.into_parts();
        let mut boxed = Box::new(Handle::new(value, home_stack));
        boxed.recycle_id = recycle_id;
        boxed.last_recycled_id = last_recycled_id;
        stack::recycle_handle(boxed.home_stack.clone(), boxed)
    }
}

thread_local! {
    static RECYCLER_STACKS: RefCell<StackRegistry> = RefCell::new(StackRegistry::new());
}

struct StackRegistry {
    entries: Vec<(u64, Box<dyn Any>)>,
}

impl StackRegistry {
    fn new() -> Self {
        Self { entries: Vec::new() }
    }

    fn stack_for<T: 'static>(
        &mut self,
        recycler_id: u64,
        create: impl FnOnce() -> Arc<StackShared<T>>,
    ) -> Arc<StackShared<T>> {
        if let Some((_, any)) = self.entries.iter().find(|(id, _)| *id == recycler_id) {
            if let Some(stack) = any.downcast_ref::<Arc<StackShared<T>>>() {
                return stack.clone();
            }
        }
        let stack = create();
        self.entries.push((recycler_id, Box::new(stack.clone())));
        stack
    }
}
