//! Response DTOs for the demo API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::StatsSnapshot;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Reads answered from the store
    pub hits: u64,
    /// Reads that fell through to the loader
    pub misses: u64,
    /// Loaded values written back
    pub stores: u64,
    /// Loader invocations that failed
    pub loader_failures: u64,
    /// Completed flush-all operations
    pub flushes: u64,
    /// Shared store connections opened so far
    pub connects: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(stats: StatsSnapshot, connects: u64) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            stores: stats.stores,
            loader_failures: stats.loader_failures,
            flushes: stats.flushes,
            connects,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the flush endpoint (POST /admin/flush)
#[derive(Debug, Clone, Serialize)]
pub struct FlushResponse {
    pub message: String,
    /// Completion time in ISO 8601 format
    pub timestamp: String,
}

impl FlushResponse {
    pub fn completed() -> Self {
        Self {
            message: "All endpoints flushed".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Whether the shared store connection is currently up
    pub store_connected: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// The process is serving; the store connection is opened lazily, so a
    /// disconnected store does not make the service unhealthy.
    pub fn healthy(store_connected: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            store_connected,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for non-cache error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = StatsSnapshot {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        let resp = StatsResponse::new(stats, 1);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.connects, 1);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::new(StatsSnapshot::default(), 0);
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy(false)).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("\"store_connected\":false"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_flush_response_serialize() {
        let json = serde_json::to_string(&FlushResponse::completed()).unwrap();
        assert!(json.contains("flushed"));
    }

    #[test]
    fn test_error_response_serialize() {
        let json = serde_json::to_string(&ErrorResponse::new("Employee 9 not found")).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Employee 9 not found"));
    }
}
