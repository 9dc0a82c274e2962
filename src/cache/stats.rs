//! Cache Statistics Module
//!
//! Tracks cache performance metrics across the lookup pipeline.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Lock-free counters for a single group's lookup traffic.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Total lookups
    gets: AtomicU64,
    /// Lookups served from the local cache
    hits: AtomicU64,
    /// Values resolved by the local loader
    local_loads: AtomicU64,
    /// Values fetched from a peer node
    peer_loads: AtomicU64,
    /// Failed peer fetches (recovered locally)
    peer_errors: AtomicU64,
    /// Entries evicted under byte-budget pressure
    evictions: AtomicU64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates stats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_get(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_local_load(&self) {
        self.local_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_load(&self) {
        self.peer_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_error(&self) {
        self.peer_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Returns a point-in-time copy of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            gets: self.gets.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            local_loads: self.local_loads.load(Ordering::Relaxed),
            peer_loads: self.peer_loads.load(Ordering::Relaxed),
            peer_errors: self.peer_errors.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a group's counters.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub gets: u64,
    pub hits: u64,
    pub local_loads: u64,
    pub peer_loads: u64,
    pub peer_errors: u64,
    pub evictions: u64,
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Returns hits / gets, or 0.0 before any traffic.
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            self.hits as f64 / self.gets as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_counters_accumulate() {
        let stats = CacheStats::new();
        stats.record_get();
        stats.record_get();
        stats.record_hit();
        stats.record_local_load();
        stats.record_peer_error();
        stats.record_eviction();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.gets, 2);
        assert_eq!(snapshot.hits, 1);
        assert_eq!(snapshot.local_loads, 1);
        assert_eq!(snapshot.peer_loads, 0);
        assert_eq!(snapshot.peer_errors, 1);
        assert_eq!(snapshot.evictions, 1);
    }

    #[test]
    fn test_hit_rate_no_traffic() {
        assert_eq!(StatsSnapshot::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = CacheStats::new();
        stats.record_get();
        stats.record_get();
        stats.record_hit();
        assert!((stats.snapshot().hit_rate() - 0.5).abs() < f64::EPSILON);
    }
}
