//! Statistics collection and reporting for a [`crate::Recycler`].

mod collector;
mod reporter;

pub use collector::StatisticsCollector;
pub use reporter::StatisticsReporter;

use std::fmt;

/// A point-in-time snapshot of a recycler's counters.
///
/// # Examples
///
/// ```rust
/// use thread_recycler::{Recycler, RecyclerConfig, Recyclable};
///
/// struct Item;
/// impl Recyclable for Item {
///     fn new_object(_r: &Recycler<Self>) -> Self { Item }
/// }
///
/// // ratio 1 admits every recycle, so the counts below are exact.
/// let config = RecyclerConfig::builder().ratio(1).build().unwrap();
/// let recycler: Recycler<Item> = Recycler::new(config);
/// let h = recycler.get();
/// h.recycle();
///
/// let stats = recycler.statistics();
/// assert_eq!(stats.total_gets, 1);
/// assert_eq!(stats.total_recycles, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolStatistics {
    /// Total calls to `Recycler::get` on this thread's stack, hit or miss.
    pub total_gets: usize,

    /// Total calls to `Handle::recycle` that were admitted (not dropped by
    /// the ratio filter, capacity, or a lost race).
    pub total_recycles: usize,

    /// Recycle attempts dropped by the ratio/interval admission filter.
    pub recycled_ratio_dropped: usize,

    /// Recycle attempts dropped because the owning stack's capacity (own or
    /// shared) was exhausted.
    pub recycled_capacity_dropped: usize,

    /// Cross-thread recycle attempts that lost the CAS race on
    /// `last_recycled_id` and were silently dropped.
    pub recycled_race_lost: usize,

    /// Cross-thread recycle attempts dropped because the producer thread
    /// had already registered its quota of `max_delayed_queues_per_thread`
    /// distinct foreign stacks and this one wasn't among them.
    pub recycled_delayed_queue_quota_dropped: usize,

    /// Number of times this stack has scavenged a weak-order queue into its
    /// own LIFO storage.
    pub scavenges: usize,

    /// Number of foreign-thread weak-order queues currently linked into this
    /// stack.
    pub live_delayed_queues: usize,
}

impl PoolStatistics {
    /// Returns the fraction of `get` calls that were satisfied from the pool
    /// rather than falling through to `Recyclable::new_object`.
    ///
    /// Returns `1.0` when there have been no gets at all, matching the
    /// convention used elsewhere for rates over empty samples.
    #[inline]
    pub fn hit_rate(&self) -> f64 {
        if self.total_gets == 0 {
            1.0
        } else {
            self.total_recycles.min(self.total_gets) as f64 / self.total_gets as f64
        }
    }

    /// Returns the fraction of recycle attempts dropped for any reason
    /// (ratio filter, capacity, or a lost race).
    #[inline]
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.recycled_ratio_dropped
            + self.recycled_capacity_dropped
            + self.recycled_race_lost
            + self.recycled_delayed_queue_quota_dropped;
        let attempts = self.total_recycles + dropped;
        if attempts == 0 {
            0.0
        } else {
            dropped as f64 / attempts as f64
        }
    }
}

impl fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Recycler Statistics:")?;
        writeln!(f, "  Total gets:            {}", self.total_gets)?;
        writeln!(f, "  Total recycles:        {}", self.total_recycles)?;
        writeln!(f, "  Dropped (ratio):       {}", self.recycled_ratio_dropped)?;
        writeln!(f, "  Dropped (capacity):    {}", self.recycled_capacity_dropped)?;
        writeln!(f, "  Dropped (race lost):   {}", self.recycled_race_lost)?;
        writeln!(
            f,
            "  Dropped (queue quota): {}",
            self.recycled_delayed_queue_quota_dropped
        )?;
        writeln!(f, "  Scavenges:             {}", self.scavenges)?;
        writeln!(f, "  Live delayed queues:   {}", self.live_delayed_queues)?;
        writeln!(f, "  Hit rate:              {:.2}%", self.hit_rate() * 100.0)?;
        Ok(())
    }
}
