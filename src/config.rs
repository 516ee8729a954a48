//! Configuration Module
//!
//! Loads the store connection string and cache settings from environment variables.

use std::env;

/// Which store backend the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Remote Redis topology named by `redis_configuration`
    Redis,
    /// In-process store, for local runs without Redis
    Memory,
}

impl Backend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "redis" => Some(Backend::Redis),
            "memory" => Some(Backend::Memory),
            _ => None,
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store connection string: comma-separated endpoints
    pub redis_configuration: String,
    /// Selected store backend
    pub backend: Backend,
    /// TTL in minutes applied when a caller does not pass one
    pub default_ttl_minutes: f64,
    /// Number of nodes in the in-process topology
    pub memory_nodes: usize,
    /// Per-node capacity of the in-process store
    pub max_entries: usize,
    /// Interval in seconds between expiry sweeps of the in-process store
    pub sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_CONFIGURATION` - Store endpoints (default: redis://127.0.0.1:6379)
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `DEFAULT_TTL_MINUTES` - Default TTL in minutes (default: 5)
    /// - `MEMORY_NODES` - In-process node count (default: 1)
    /// - `MAX_ENTRIES` - In-process per-node capacity (default: 10000)
    /// - `SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_configuration: env::var("REDIS_CONFIGURATION")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.redis_configuration),
            backend: env::var("CACHE_BACKEND")
                .ok()
                .and_then(|v| Backend::parse(&v))
                .unwrap_or(defaults.backend),
            default_ttl_minutes: env::var("DEFAULT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|m| m.is_finite() && *m > 0.0)
                .unwrap_or(defaults.default_ttl_minutes),
            memory_nodes: env::var("MEMORY_NODES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.memory_nodes),
            max_entries: env::var("MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_entries),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_configuration: "redis://127.0.0.1:6379".to_string(),
            backend: Backend::Redis,
            default_ttl_minutes: 5.0,
            memory_nodes: 1,
            max_entries: 10_000,
            sweep_interval: 1,
            server_port: 3000,
        }
    }
}
