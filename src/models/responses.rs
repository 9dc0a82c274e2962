//! Response DTOs for the user-facing API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::StatsSnapshot;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Group whose counters these are
    pub group: String,
    /// Total lookups
    pub gets: u64,
    /// Lookups served from the local cache
    pub hits: u64,
    /// Values resolved by the local loader
    pub local_loads: u64,
    /// Values fetched from peer nodes
    pub peer_loads: u64,
    /// Failed peer fetches
    pub peer_errors: u64,
    /// Entries evicted under budget pressure
    pub evictions: u64,
    /// Hit rate (hits / gets)
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a response from a group's counter snapshot.
    pub fn new(group: impl Into<String>, snapshot: StatsSnapshot) -> Self {
        Self {
            group: group.into(),
            gets: snapshot.gets,
            hits: snapshot.hits,
            local_loads: snapshot.local_loads,
            peer_loads: snapshot.peer_loads,
            peer_errors: snapshot.peer_errors,
            evictions: snapshot.evictions,
            hit_rate: snapshot.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
