//! Store Module
//!
//! The seam between the cache service and a key-value store. A [`Connector`]
//! opens [`Connection`]s; the [`ConnectionManager`] keeps one shared,
//! health-checked connection alive for normal traffic.
//!
//! # Backends
//! - [`RedisConnector`] - remote Redis endpoints over multiplexed tokio connections
//! - [`MemoryConnector`] - in-process multi-node store with TTL and LRU eviction

mod manager;
pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub use manager::ConnectionManager;
pub use memory::MemoryConnector;
pub use self::redis::RedisConnector;

// == Connect Options ==
/// Options applied when opening a connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Allow server-wide administrative commands such as FLUSHALL
    pub allow_admin: bool,
}

impl ConnectOptions {
    /// Options for an admin-privileged connection.
    pub fn admin() -> Self {
        Self { allow_admin: true }
    }
}

// == Connection ==
/// A live connection to every endpoint of a store topology.
///
/// Implementations must be safe to share across tasks; the shared handle
/// serves many concurrent get-or-load calls at once.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Health check. `false` means the owner should open a new connection.
    ///
    /// May round-trip to the store, so a socket the server has dropped is
    /// caught here instead of by the next command.
    async fn is_connected(&self) -> bool;

    /// Whether this connection was opened with admin privileges.
    fn allows_admin(&self) -> bool;

    /// GET: raw text stored under `key`, `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// SET: stores `value` under `key`, clearing any previous expiration.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// PEXPIRE: returns `false` if the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// PTTL: remaining lifetime, `None` if absent or without expiration.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>>;

    /// Every endpoint of the topology, reachable or not.
    fn endpoints(&self) -> Vec<String>;

    /// FLUSHALL on a single endpoint. Requires an admin connection.
    async fn flush_all(&self, endpoint: &str) -> Result<()>;

    /// Releases the connection. Later health checks report not-connected.
    async fn close(&self) -> Result<()>;
}

// == Connector ==
/// Opens connections to a configured store topology.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establishes a new connection, failing with `CacheError::Connection`
    /// when the address is malformed or unreachable.
    async fn connect(&self, options: ConnectOptions) -> Result<Box<dyn Connection>>;
}
