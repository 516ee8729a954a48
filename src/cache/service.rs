//! Cache Service
//!
//! Get-or-load over the shared store connection, and the admin flush-all.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{serializer, CacheKey, CacheStats, StatsSnapshot};
use crate::error::{CacheError, Result};
use crate::store::{ConnectionManager, Connector};

/// TTL applied when the caller does not pass one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Converts a TTL in minutes, rejecting zero, negative and non-finite values.
pub fn ttl_from_minutes(minutes: f64) -> Result<Duration> {
    if !(minutes.is_finite() && minutes > 0.0) {
        return Err(CacheError::InvalidTtl(format!(
            "{} minutes is not a positive duration",
            minutes
        )));
    }
    Duration::try_from_secs_f64(minutes * 60.0)
        .map_err(|e| CacheError::InvalidTtl(format!("{} minutes: {}", minutes, e)))
}

// == Cache Service ==
/// Cache-aside access to the store.
///
/// Construct once at startup and share by `Arc`. Concurrent misses on the
/// same key are not coalesced: each call runs its own loader and the last
/// write wins.
pub struct CacheService {
    connections: ConnectionManager,
    default_ttl: Duration,
    stats: CacheStats,
}

impl CacheService {
    /// Creates a service with the 5 minute default TTL. No I/O happens here.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self::with_default_ttl(connector, DEFAULT_TTL)
    }

    pub fn with_default_ttl(connector: Arc<dyn Connector>, default_ttl: Duration) -> Self {
        Self {
            connections: ConnectionManager::new(connector),
            default_ttl,
            stats: CacheStats::new(),
        }
    }

    // == Get Or Load ==
    /// Returns the cached value for `key`, or runs `loader` and caches its
    /// result for the default TTL.
    ///
    /// A loader returning `Ok(None)` writes nothing and yields `None`.
    pub async fn get_or_load<T, F, Fut>(&self, key: &str, loader: F) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Option<T>>>,
    {
        let key = CacheKey::parse(key)?;
        self.load_through(&key, loader, self.default_ttl).await
    }

    /// [`get_or_load`](Self::get_or_load) with a TTL in minutes.
    pub async fn get_or_load_minutes<T, F, Fut>(
        &self,
        key: &str,
        loader: F,
        ttl_minutes: f64,
    ) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Option<T>>>,
    {
        let key = CacheKey::parse(key)?;
        let ttl = ttl_from_minutes(ttl_minutes)?;
        self.load_through(&key, loader, ttl).await
    }

    /// [`get_or_load`](Self::get_or_load) with an explicit TTL.
    pub async fn get_or_load_with_ttl<T, F, Fut>(
        &self,
        key: &str,
        loader: F,
        ttl: Duration,
    ) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Option<T>>>,
    {
        let key = CacheKey::parse(key)?;
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl("TTL must be non-zero".to_string()));
        }
        self.load_through(&key, loader, ttl).await
    }

    async fn load_through<T, F, Fut>(&self, key: &CacheKey, loader: F, ttl: Duration) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Option<T>>>,
    {
        let conn = self.connections.handle().await?;

        // A hit does not touch the key's expiration
        let raw = conn.get(key.as_str()).await?;
        if let Some(value) = serializer::deserialize::<T>(raw.as_deref().unwrap_or(""))? {
            self.stats.record_hit();
            debug!("Cache hit for key '{}'", key);
            return Ok(Some(value));
        }

        self.stats.record_miss();
        debug!("Cache miss for key '{}', invoking loader", key);

        let loaded = match loader().await {
            Ok(loaded) => loaded,
            Err(err) => {
                self.stats.record_loader_failure();
                return Err(CacheError::Loader(err));
            }
        };
        let Some(value) = loaded else {
            debug!("Loader returned nothing for key '{}', not caching", key);
            return Ok(None);
        };

        let text = serializer::serialize(Some(&value))?;
        if text.trim().is_empty() {
            // Blank text would read back as a miss anyway
            return Ok(Some(value));
        }

        // The loader may have outlived the connection; fetch it again
        let conn = self.connections.handle().await?;
        conn.set(key.as_str(), &text).await?;
        // Not atomic with the write: a failure here leaves the key without TTL
        if !conn.expire(key.as_str(), ttl).await? {
            debug!("Key '{}' vanished before its TTL could be set", key);
        }
        self.stats.record_store();

        Ok(Some(value))
    }

    // == Time To Live ==
    /// Remaining lifetime of `key`; `None` if absent or without expiration.
    pub async fn time_to_live(&self, key: &str) -> Result<Option<Duration>> {
        let key = CacheKey::parse(key)?;
        let conn = self.connections.handle().await?;
        conn.ttl(key.as_str()).await
    }

    // == Flush All ==
    /// Flushes every database on every endpoint through a separate admin
    /// connection.
    ///
    /// A failing endpoint is logged and skipped; the remaining endpoints are
    /// still flushed. The admin connection is closed once all endpoints have
    /// been visited.
    pub async fn flush_all(&self) -> Result<()> {
        let admin = self.connections.connect_admin().await?;

        for endpoint in admin.endpoints() {
            match admin.flush_all(&endpoint).await {
                Ok(()) => info!("Flushed all databases on {}", endpoint),
                Err(err) => warn!("Flush failed on {}: {}", endpoint, err),
            }
        }

        if let Err(err) = admin.close().await {
            warn!("Closing admin connection failed: {}", err);
        }
        self.stats.record_flush();

        Ok(())
    }

    // == Accessors ==
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }
}
