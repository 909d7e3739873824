//! Delivery metrics
//!
//! Counters for monitoring one logger's delivery path: how many lines were
//! accepted, how many reached the sink, how many the sink rejected, and how
//! often callers had to wait on a full queue.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for one logger's delivery queue
///
/// # Example
///
/// ```
/// use echo_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_accepted();
/// metrics.record_delivered();
///
/// assert_eq!(metrics.accepted_count(), 1);
/// assert_eq!(metrics.delivered_count(), 1);
/// assert_eq!(metrics.pending_count(), 0);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Lines that passed the gate and were handed to the queue
    accepted: AtomicU64,

    /// Lines the sink accepted
    delivered: AtomicU64,

    /// Lines the sink rejected with an error or a panic
    failed: AtomicU64,

    /// Times a caller waited because the async queue was full
    block_events: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            accepted: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            block_events: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn accepted_count(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn block_events(&self) -> u64 {
        self.block_events.load(Ordering::Relaxed)
    }

    /// Accepted lines that have not reached the sink yet
    pub fn pending_count(&self) -> u64 {
        self.accepted_count()
            .saturating_sub(self.delivered_count() + self.failed_count())
    }

    #[inline]
    pub fn record_accepted(&self) -> u64 {
        self.accepted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_block(&self) -> u64 {
        self.block_events.fetch_add(1, Ordering::Relaxed)
    }

    /// Sink failure rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been delivered or rejected yet.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.failed_count() as f64;
        let total = self.delivered_count() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.accepted.store(0, Ordering::Relaxed);
        self.delivered.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.block_events.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Snapshot of the current values
    fn clone(&self) -> Self {
        Self {
            accepted: AtomicU64::new(self.accepted_count()),
            delivered: AtomicU64::new(self.delivered_count()),
            failed: AtomicU64::new(self.failed_count()),
            block_events: AtomicU64::new(self.block_events()),
        }
    }
}
