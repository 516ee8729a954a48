//! Cache Module
//!
//! Cache-aside reads over a key-value store: key validation, JSON
//! transport encoding, and the get-or-load / flush service.

mod key;
pub mod serializer;
mod service;
mod stats;


// Re-export public types
pub use key::CacheKey;
pub use service::{ttl_from_minutes, CacheService, DEFAULT_TTL};
pub use stats::{CacheStats, StatsSnapshot};
