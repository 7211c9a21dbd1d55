//! Builder for [`RecyclerConfig`].

use super::RecyclerConfig;
use crate::error::{Error, Result};
use crate::utils::round_up_to_power_of_two;
use core::marker::PhantomData;

/// Builder for constructing a [`RecyclerConfig`] with validation.
///
/// # Examples
///
/// ```rust
/// use thread_recycler::RecyclerConfig;
///
/// let config = RecyclerConfig::<i32>::builder()
///     .max_capacity_per_thread(8192)
///     .max_shared_capacity_factor(4)
///     .link_capacity(32)
///     .ratio(16)
///     .build()
///     .unwrap();
/// ```
pub struct RecyclerConfigBuilder<T> {
    max_capacity_per_thread: usize,
    max_shared_capacity_factor: usize,
    max_delayed_queues_per_thread: Option<usize>,
    link_capacity: usize,
    ratio: u32,
    delayed_queue_ratio: Option<u32>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RecyclerConfigBuilder<T> {
    /// Creates a new builder seeded with the stock defaults.
    pub fn new() -> Self {
        let defaults = RecyclerConfig::<T>::default();
        Self {
            max_capacity_per_thread: defaults.max_capacity_per_thread,
            max_shared_capacity_factor: defaults.max_shared_capacity_factor,
            max_delayed_queues_per_thread: None,
            link_capacity: defaults.link_capacity,
            ratio: defaults.ratio,
            delayed_queue_ratio: None,
            _marker: PhantomData,
        }
    }

    /// Sets the maximum number of handles a thread's own stack will hold.
    ///
    /// `0` disables pooling entirely: `Recycler::get` always allocates fresh
    /// and `recycle` always drops.
    pub fn max_capacity_per_thread(mut self, capacity: usize) -> Self {
        self.max_capacity_per_thread = capacity;
        self
    }

    /// Sets the divisor used to derive the shared capacity budget from
    /// `max_capacity_per_thread`. Clamped to a minimum of 2 in `build`.
    pub fn max_shared_capacity_factor(mut self, factor: usize) -> Self {
        self.max_shared_capacity_factor = factor;
        self
    }

    /// Sets how many distinct foreign producer threads a stack will track.
    /// Defaults to twice the available parallelism.
    pub fn max_delayed_queues_per_thread(mut self, max: usize) -> Self {
        self.max_delayed_queues_per_thread = Some(max);
        self
    }

    /// Sets the number of handle slots per link. Rounded up to a power of
    /// two with a floor of 16 in `build`.
    pub fn link_capacity(mut self, capacity: usize) -> Self {
        self.link_capacity = capacity;
        self
    }

    /// Sets the admission ratio for same-thread recycling: one in every
    /// `ratio` attempts is kept.
    pub fn ratio(mut self, ratio: u32) -> Self {
        self.ratio = ratio;
        self
    }

    /// Sets the admission ratio applied on the weak-order queue side.
    /// Defaults to the same value as `ratio` unless set explicitly.
    pub fn delayed_queue_ratio(mut self, ratio: u32) -> Self {
        self.delayed_queue_ratio = Some(ratio);
        self
    }

    /// Builds the configuration, validating and normalizing all parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if `ratio` or `delayed_queue_ratio` is 0 — a zero
    /// ratio would divide by zero in the admission filter.
    pub fn build(self) -> Result<RecyclerConfig<T>> {
        if self.ratio == 0 {
            return Err(Error::invalid_config("ratio must be at least 1"));
        }
        let delayed_queue_ratio = self.delayed_queue_ratio.unwrap_or(self.ratio);
        if delayed_queue_ratio == 0 {
            return Err(Error::invalid_config(
                "delayed_queue_ratio must be at least 1",
            ));
        }

        let max_shared_capacity_factor = self.max_shared_capacity_factor.max(2);
        let link_capacity = round_up_to_power_of_two(self.link_capacity, 16);
        let max_delayed_queues_per_thread = self
            .max_delayed_queues_per_thread
            .unwrap_or_else(|| 2 * num_cpus::get().max(1));

        Ok(RecyclerConfig {
            max_capacity_per_thread: self.max_capacity_per_thread,
            max_shared_capacity_factor,
            max_delayed_queues_per_thread,
            link_capacity,
            ratio: self.ratio,
            delayed_queue_ratio,
            _marker: PhantomData,
        })
    }
}

impl<T> Default for RecyclerConfigBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
