//! Lock-free statistics collector shared across the threads touching one
//! `Recycler`.

use super::PoolStatistics;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Accumulates recycler counters with relaxed atomics.
///
/// One instance is shared (behind an `Arc`) by every per-thread `Stack` a
/// `Recycler` creates, so a snapshot reflects activity across all threads,
/// not just the caller's own.
#[derive(Default)]
pub struct StatisticsCollector {
    total_gets: AtomicUsize,
    total_recycles: AtomicUsize,
    recycled_ratio_dropped: AtomicUsize,
    recycled_capacity_dropped: AtomicUsize,
    recycled_race_lost: AtomicUsize,
    recycled_delayed_queue_quota_dropped: AtomicUsize,
    scavenges: AtomicUsize,
    live_delayed_queues: AtomicUsize,
}

impl StatisticsCollector {
    /// Creates a collector with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_get(&self) {
        self.total_gets.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_recycle(&self) {
        self.total_recycles.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_ratio_drop(&self) {
        self.recycled_ratio_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_capacity_drop(&self) {
        self.recycled_capacity_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_race_loss(&self) {
        self.recycled_race_lost.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_delayed_queue_quota_drop(&self) {
        self.recycled_delayed_queue_quota_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_scavenge(&self) {
        self.scavenges.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn queue_linked(&self) {
        self.live_delayed_queues.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn queue_unlinked(&self) {
        self.live_delayed_queues.fetch_sub(1, Ordering::Relaxed);
    }

    /// Returns a consistent-enough snapshot of the current counters.
    ///
    /// Each field is loaded independently, so under concurrent activity the
    /// snapshot may not correspond to a single instant — acceptable for
    /// monitoring, not for correctness-sensitive decisions.
    pub fn snapshot(&self) -> PoolStatistics {
        PoolStatistics {
            total_gets: self.total_gets.load(Ordering::Relaxed),
            total_recycles: self.total_recycles.load(Ordering::Relaxed),
            recycled_ratio_dropped: self.recycled_ratio_dropped.load(Ordering::Relaxed),
            recycled_capacity_dropped: self.recycled_capacity_dropped.load(Ordering::Relaxed),
            recycled_race_lost: self.recycled_race_lost.load(Ordering::Relaxed),
            recycled_delayed_queue_quota_dropped: self
                .recycled_delayed_queue_quota_dropped
                .load(Ordering::Relaxed),
            scavenges: self.scavenges.load(Ordering::Relaxed),
            live_delayed_queues: self.live_delayed_queues.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_tracks_gets_and_recycles() {
        let collector = StatisticsCollector::new();

        collector.record_get();
        collector.record_get();
        collector.record_recycle();

        let stats = collector.snapshot();
        assert_eq!(stats.total_gets, 2);
        assert_eq!(stats.total_recycles, 1);
    }

    #[test]
    fn collector_tracks_drops() {
        let collector = StatisticsCollector::new();

        collector.record_ratio_drop();
        collector.record_capacity_drop();
        collector.record_capacity_drop();
        collector.record_race_loss();

        let stats = collector.snapshot();
        assert_eq!(stats.recycled_ratio_dropped, 1);
        assert_eq!(stats.recycled_capacity_dropped, 2);
        assert_eq!(stats.recycled_race_lost, 1);
    }

    #[test]
    fn collector_tracks_delayed_queue_quota_drops() {
        let collector = StatisticsCollector::new();

        collector.record_delayed_queue_quota_drop();
        collector.record_delayed_queue_quota_drop();

        assert_eq!(collector.snapshot().recycled_delayed_queue_quota_dropped, 2);
    }

    #[test]
    fn collector_tracks_delayed_queue_lifecycle() {
        let collector = StatisticsCollector::new();

        collector.queue_linked();
        collector.queue_linked();
        collector.queue_unlinked();
        collector.record_scavenge();

        let stats = collector.snapshot();
        assert_eq!(stats.live_delayed_queues, 1);
        assert_eq!(stats.scavenges, 1);
    }
}
