//! Page I/O statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics tracked by a backend.
///
/// Counters are atomics, so they can be read or reset through the shared
/// reference [`Backend::stats`](crate::Backend::stats) hands out.
/// [`SharedBTree::stats`](crate::SharedBTree::stats) snapshots them under
/// the tree lock.
///
/// All accesses are `Ordering::Relaxed`; counters are independent.
///
/// # Example
/// ```
/// use pagedex::IoStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = IoStats::new();
/// stats.pages_read.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().pages_read, 1);
/// ```
#[derive(Debug, Default)]
pub struct IoStats {
    /// Number of pages read from the store.
    pub pages_read: AtomicU64,

    /// Number of pages written to the store.
    pub pages_written: AtomicU64,

    /// Number of addresses handed out by `new_node`.
    pub pages_allocated: AtomicU64,

    /// Of those, how many came from the free list.
    pub pages_reused: AtomicU64,

    /// Number of pages zero-filled by `remove_node`.
    pub pages_reclaimed: AtomicU64,
}

impl IoStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Fraction of allocations served from the free list (0.0 to 1.0).
    pub fn reuse_rate(&self) -> f64 {
        self.snapshot().reuse_rate()
    }

    /// Get a snapshot of current statistics.
    ///
    /// This returns a non-atomic copy for display/logging.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_read: self.pages_read.load(Ordering::Relaxed),
            pages_written: self.pages_written.load(Ordering::Relaxed),
            pages_allocated: self.pages_allocated.load(Ordering::Relaxed),
            pages_reused: self.pages_reused.load(Ordering::Relaxed),
            pages_reclaimed: self.pages_reclaimed.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.pages_read.store(0, Ordering::Relaxed);
        self.pages_written.store(0, Ordering::Relaxed);
        self.pages_allocated.store(0, Ordering::Relaxed);
        self.pages_reused.store(0, Ordering::Relaxed);
        self.pages_reclaimed.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of backend statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub pages_read: u64,
    pub pages_written: u64,
    pub pages_allocated: u64,
    pub pages_reused: u64,
    pub pages_reclaimed: u64,
}

impl StatsSnapshot {
    /// Fraction of allocations served from the free list (0.0 to 1.0).
    pub fn reuse_rate(&self) -> f64 {
        if self.pages_allocated == 0 {
            0.0
        } else {
            self.pages_reused as f64 / self.pages_allocated as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ reads: {}, writes: {}, allocated: {}, reclaimed: {}, reuse_rate: {:.2}% }}",
            self.pages_read,
            self.pages_written,
            self.pages_allocated,
            self.pages_reclaimed,
            self.reuse_rate() * 100.0
        )
    }
}
