//! Cache Statistics Module
//!
//! Tracks per-tier hit/miss counters for the coordinator and derives the
//! overall hit rate.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of the coordinator's counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads answered by the in-process tier
    pub l1_hits: u64,
    /// Reads that found nothing usable in the in-process tier
    pub l1_misses: u64,
    /// Reads answered by the distributed tier
    pub l2_hits: u64,
    /// Reads the distributed tier could not answer (absent or failed)
    pub l2_misses: u64,
    /// Percentage with two decimal digits, see [`hit_rate`]
    pub hit_rate: f64,
    /// When the counters were last reset
    pub since: DateTime<Utc>,
}

// == Hit Rate ==
/// Calculates the hit rate as a percentage rounded to two decimals.
///
/// The denominator is `l1_hits + l2_hits + l1_misses`; `l2_misses` is not
/// part of it. Consumers depend on this exact definition. Returns 0.0 when
/// nothing has been recorded.
pub fn hit_rate(l1_hits: u64, l1_misses: u64, l2_hits: u64) -> f64 {
    let hits = l1_hits + l2_hits;
    let total = hits + l1_misses;
    if total == 0 {
        return 0.0;
    }
    ((hits as f64 / total as f64) * 10_000.0).round() / 100.0
}

// == Stats Registry ==
/// Monotonic, thread-safe counters owned by one coordinator.
#[derive(Debug)]
pub struct StatsRegistry {
    l1_hits: AtomicU64,
    l1_misses: AtomicU64,
    l2_hits: AtomicU64,
    l2_misses: AtomicU64,
    since: Mutex<DateTime<Utc>>,
}

impl StatsRegistry {
    // == Constructor ==
    /// Creates a registry with all counters at zero.
    pub fn new() -> Self {
        Self {
            l1_hits: AtomicU64::new(0),
            l1_misses: AtomicU64::new(0),
            l2_hits: AtomicU64::new(0),
            l2_misses: AtomicU64::new(0),
            since: Mutex::new(Utc::now()),
        }
    }

    // == Recording ==
    /// Records a read answered by the in-process tier.
    pub fn record_l1_hit(&self) {
        self.l1_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a read the in-process tier could not answer.
    pub fn record_l1_miss(&self) {
        self.l1_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a read answered by the distributed tier.
    pub fn record_l2_hit(&self) {
        self.l2_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a distributed read that found nothing or failed.
    ///
    /// Counted for reporting only; it never enters [`hit_rate`].
    pub fn record_l2_miss(&self) {
        self.l2_misses.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Reads every counter and computes the derived hit rate.
    pub fn snapshot(&self) -> CacheStats {
        let l1_hits = self.l1_hits.load(Ordering::Relaxed);
        let l1_misses = self.l1_misses.load(Ordering::Relaxed);
        let l2_hits = self.l2_hits.load(Ordering::Relaxed);
        let l2_misses = self.l2_misses.load(Ordering::Relaxed);

        CacheStats {
            l1_hits,
            l1_misses,
            l2_hits,
            l2_misses,
            hit_rate: hit_rate(l1_hits, l1_misses, l2_hits),
            since: *self.since.lock(),
        }
    }

    // == Reset ==
    /// Zeroes every counter and restarts the `since` timestamp.
    pub fn reset(&self) {
        let mut since = self.since.lock();
        self.l1_hits.store(0, Ordering::Relaxed);
        self.l1_misses.store(0, Ordering::Relaxed);
        self.l2_hits.store(0, Ordering::Relaxed);
        self.l2_misses.store(0, Ordering::Relaxed);
        *since = Utc::now();
    }
}

impl Default for StatsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
