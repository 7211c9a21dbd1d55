//! Statistics reporting utilities.

use super::PoolStatistics;

/// Formats recycler statistics in various ways for logging or dashboards.
///
/// # Examples
///
/// ```rust
/// use thread_recycler::stats::{PoolStatistics, StatisticsReporter};
///
/// let stats = PoolStatistics::default();
/// let reporter = StatisticsReporter::new(stats);
/// assert!(reporter.summary().contains("Total gets:"));
/// ```
pub struct StatisticsReporter {
    stats: PoolStatistics,
}

impl StatisticsReporter {
    /// Creates a new reporter for the given statistics snapshot.
    pub fn new(stats: PoolStatistics) -> Self {
        Self { stats }
    }

    /// Returns a human-readable, multi-line summary of the statistics.
    pub fn summary(&self) -> String {
        format!("{}", self.stats)
    }

    /// Returns a compact one-line summary suitable for a log line.
    pub fn compact_summary(&self) -> String {
        format!(
            "gets={} recycles={} dropped(ratio={},cap={},race={},quota={}) scavenges={} delayed_queues={}",
            self.stats.total_gets,
            self.stats.total_recycles,
            self.stats.recycled_ratio_dropped,
            self.stats.recycled_capacity_dropped,
            self.stats.recycled_race_lost,
            self.stats.recycled_delayed_queue_quota_dropped,
            self.stats.scavenges,
            self.stats.live_delayed_queues,
        )
    }

    /// Returns statistics as key-value pairs, handy for metrics exporters.
    pub fn as_key_value_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("total_gets", self.stats.total_gets.to_string()),
            ("total_recycles", self.stats.total_recycles.to_string()),
            (
                "recycled_ratio_dropped",
                self.stats.recycled_ratio_dropped.to_string(),
            ),
            (
                "recycled_capacity_dropped",
                self.stats.recycled_capacity_dropped.to_string(),
            ),
            (
                "recycled_race_lost",
                self.stats.recycled_race_lost.to_string(),
            ),
            (
                "recycled_delayed_queue_quota_dropped",
                self.stats.recycled_delayed_queue_quota_dropped.to_string(),
            ),
            ("scavenges", self.stats.scavenges.to_string()),
            (
                "live_delayed_queues",
                self.stats.live_delayed_queues.to_string(),
            ),
            ("hit_rate", format!("{:.4}", self.stats.hit_rate())),
        ]
    }

    /// Returns statistics serialized as JSON.
    #[cfg(feature = "serde")]
    pub fn as_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.stats)
    }

    /// Emits the statistics as a single structured `tracing` event.
    #[cfg(feature = "tracing")]
    pub fn log(&self) {
        tracing::info!(
            total_gets = self.stats.total_gets,
            total_recycles = self.stats.total_recycles,
            recycled_ratio_dropped = self.stats.recycled_ratio_dropped,
            recycled_capacity_dropped = self.stats.recycled_capacity_dropped,
            recycled_race_lost = self.stats.recycled_race_lost,
            recycled_delayed_queue_quota_dropped = self.stats.recycled_delayed_queue_quota_dropped,
            scavenges = self.stats.scavenges,
            live_delayed_queues = self.stats.live_delayed_queues,
            hit_rate = %format!("{:.2}%", self.stats.hit_rate() * 100.0),
            "recycler statistics"
        );
    }
}
