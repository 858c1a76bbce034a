//! Queue throughput and backpressure counters.
//!
//! Enabled with the `statistics` feature. Counters are updated under the
//! queue lock and read as a snapshot:
//!
//! ```ignore
//! let stats = queue.statistics();
//! println!("{}", stats.summary());
//! ```

/// Counters accumulated since the queue was created or last reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStatistics {
    /// Events accepted by `enqueue`, including coalesced ones.
    pub enqueued: u64,
    /// Motion events that overwrote the previous motion event in place.
    pub coalesced: u64,
    /// Events dropped on overflow, over the whole lifetime.
    pub dropped: u64,
    /// Events whose timestamp was clamped forward.
    pub clamped: u64,
    /// Successful growth operations.
    pub grown: u64,
    /// Events dispatched by `drain`.
    pub dispatched: u64,
    /// Copies delivered to a master device.
    pub duplicated: u64,
    /// Largest number of events queued at once.
    pub peak_len: usize,
}

impl QueueStatistics {
    /// Fraction of accepted events that were coalesced away.
    pub fn coalesce_ratio(&self) -> f64 {
        if self.enqueued == 0 {
            return 0.0;
        }
        self.coalesced as f64 / self.enqueued as f64
    }

    /// Generate a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "=== Event Queue Statistics ===\n\
             Enqueued: {}\n\
             - Coalesced: {} ({:.1}%)\n\
             - Clamped: {}\n\
             Dropped: {}\n\
             Grown: {} times\n\
             Peak length: {}\n\
             Dispatched: {}\n\
             - To masters: {}\n",
            self.enqueued,
            self.coalesced,
            self.coalesce_ratio() * 100.0,
            self.clamped,
            self.dropped,
            self.grown,
            self.peak_len,
            self.dispatched,
            self.duplicated
        )
    }
}
