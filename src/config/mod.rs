//! Configuration for a [`crate::Recycler`].

mod builder;

pub use builder::RecyclerConfigBuilder;

use core::marker::PhantomData;

/// Tuning knobs for a [`crate::Recycler`].
///
/// Use [`RecyclerConfig::builder`] to construct one with validation, or
/// `RecyclerConfig::default()` for the stock Netty-derived defaults.
///
/// # Examples
///
/// ```rust
/// use thread_recycler::RecyclerConfig;
///
/// let config: RecyclerConfig<i32> = RecyclerConfig::builder()
///     .max_capacity_per_thread(8192)
///     .ratio(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct RecyclerConfig<T> {
    pub(crate) max_capacity_per_thread: usize,
    pub(crate) max_shared_capacity_factor: usize,
    pub(crate) max_delayed_queues_per_thread: usize,
    pub(crate) link_capacity: usize,
    pub(crate) ratio: u32,
    pub(crate) delayed_queue_ratio: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RecyclerConfig<T> {
    /// Creates a new builder for constructing a recycler configuration.
    pub fn builder() -> RecyclerConfigBuilder<T> {
        RecyclerConfigBuilder::new()
    }

    /// Maximum number of handles a single thread's own stack will hold.
    #[inline]
    pub fn max_capacity_per_thread(&self) -> usize {
        self.max_capacity_per_thread
    }

    /// `max_capacity_per_thread` is divided by this factor to get the shared
    /// capacity budget that foreign threads draw from when recycling back.
    #[inline]
    pub fn max_shared_capacity_factor(&self) -> usize {
        self.max_shared_capacity_factor
    }

    /// Maximum number of distinct foreign producer threads a single stack
    /// will track weak-order queues for.
    #[inline]
    pub fn max_delayed_queues_per_thread(&self) -> usize {
        self.max_delayed_queues_per_thread
    }

    /// Number of handle slots per link in a weak-order queue's link chain.
    #[inline]
    pub fn link_capacity(&self) -> usize {
        self.link_capacity
    }

    /// One in every `ratio` recycle attempts on the owning thread is admitted;
    /// the rest are dropped to cap allocation bursts.
    #[inline]
    pub fn ratio(&self) -> u32 {
        self.ratio
    }

    /// Same as `ratio`, but applied to recycles arriving through a foreign
    /// thread's weak-order queue.
    #[inline]
    pub fn delayed_queue_ratio(&self) -> u32 {
        self.delayed_queue_ratio
    }
}

impl<T> Default for RecyclerConfig<T> {
    fn default() -> Self {
        Self {
            max_capacity_per_thread: 4096,
            max_shared_capacity_factor: 2,
            max_delayed_queues_per_thread: 2 * num_cpus::get().max(1),
            link_capacity: 16,
            ratio: 8,
            delayed_queue_ratio: 8,
            _marker: PhantomData,
        }
    }
}
