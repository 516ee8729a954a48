//! Redis Backend
//!
//! Talks to the endpoints named in the connection string over multiplexed
//! tokio connections. The first endpoint is the primary: it serves reads and
//! writes and is the one health-checked with PING. Secondaries are only
//! dialed by admin connections, as FLUSHALL targets.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ::redis::aio::MultiplexedConnection;
use ::redis::{AsyncCommands, RedisResult};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{CacheError, Result};
use crate::store::{ConnectOptions, Connection, Connector};

// == Endpoint Parsing ==
/// Splits a connection string into endpoint URLs.
///
/// Endpoints are comma-separated; a bare `host:port` gets the `redis://`
/// scheme. Blank segments are skipped.
pub fn parse_endpoints(configuration: &str) -> Result<Vec<String>> {
    let endpoints: Vec<String> = configuration
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.contains("://") {
                s.to_string()
            } else {
                format!("redis://{}", s)
            }
        })
        .collect();

    if endpoints.is_empty() {
        return Err(CacheError::Connection(
            "connection string names no endpoints".to_string(),
        ));
    }
    Ok(endpoints)
}

// == Redis Connector ==
/// Opens connections to the Redis topology named by a connection string.
///
/// Normal connections need the primary and ignore the rest. Admin
/// connections keep whichever endpoints answer and fail only when none do.
#[derive(Debug, Clone)]
pub struct RedisConnector {
    configuration: String,
}

impl RedisConnector {
    pub fn new(configuration: impl Into<String>) -> Self {
        Self {
            configuration: configuration.into(),
        }
    }
}

#[async_trait]
impl Connector for RedisConnector {
    async fn connect(&self, options: ConnectOptions) -> Result<Box<dyn Connection>> {
        let mut clients = Vec::new();
        for url in parse_endpoints(&self.configuration)? {
            let client = ::redis::Client::open(url.as_str()).map_err(|e| {
                CacheError::Connection(format!("malformed endpoint {}: {}", url, e))
            })?;
            let name = client.get_connection_info().addr.to_string();
            clients.push((name, client));
        }

        let mut endpoints = Vec::with_capacity(clients.len());
        let mut last_error = None;

        for (index, (name, client)) in clients.into_iter().enumerate() {
            if index > 0 && !options.allow_admin {
                endpoints.push(RedisEndpoint { name, conn: None });
                continue;
            }

            match client.get_multiplexed_async_connection().await {
                Ok(conn) => {
                    debug!("Connected to Redis endpoint {}", name);
                    endpoints.push(RedisEndpoint {
                        name,
                        conn: Some(conn),
                    });
                }
                Err(e) if !options.allow_admin => {
                    return Err(CacheError::Connection(format!("{}: {}", name, e)));
                }
                Err(e) => {
                    warn!("Redis endpoint {} unreachable: {}", name, e);
                    last_error = Some(format!("{}: {}", name, e));
                    endpoints.push(RedisEndpoint { name, conn: None });
                }
            }
        }

        if endpoints.iter().all(|e| e.conn.is_none()) {
            return Err(CacheError::Connection(last_error.unwrap_or_else(|| {
                "no Redis endpoint reachable".to_string()
            })));
        }

        Ok(Box::new(RedisConnection {
            endpoints,
            allow_admin: options.allow_admin,
            healthy: AtomicBool::new(true),
        }))
    }
}

// == Redis Connection ==
struct RedisEndpoint {
    /// `host:port` of the endpoint, without credentials
    name: String,
    /// `None` when the endpoint was not dialed or did not answer
    conn: Option<MultiplexedConnection>,
}

impl RedisEndpoint {
    fn connection(&self) -> Result<MultiplexedConnection> {
        self.conn
            .clone()
            .ok_or_else(|| CacheError::Connection(format!("{}: not connected", self.name)))
    }
}

struct RedisConnection {
    /// Never empty; index 0 is the primary
    endpoints: Vec<RedisEndpoint>,
    allow_admin: bool,
    /// Cleared on close or on the first connection-level failure
    healthy: AtomicBool,
}

impl RedisConnection {
    fn primary(&self) -> Result<MultiplexedConnection> {
        self.endpoints[0].connection()
    }

    /// Converts a command result, marking the connection unhealthy when the
    /// failure is at the connection level.
    fn track<T>(&self, result: RedisResult<T>) -> Result<T> {
        result.map_err(|err| {
            let err = CacheError::from(err);
            if matches!(err, CacheError::Connection(_)) {
                self.healthy.store(false, Ordering::SeqCst);
            }
            err
        })
    }
}

#[async_trait]
impl Connection for RedisConnection {
    async fn is_connected(&self) -> bool {
        if !self.healthy.load(Ordering::SeqCst) {
            return false;
        }
        let Ok(mut conn) = self.primary() else {
            return false;
        };

        let pong: RedisResult<String> = ::redis::cmd("PING").query_async(&mut conn).await;
        match pong {
            Ok(_) => true,
            Err(err) => {
                debug!("PING to {} failed: {}", self.endpoints[0].name, err);
                self.healthy.store(false, Ordering::SeqCst);
                false
            }
        }
    }

    fn allows_admin(&self) -> bool {
        self.allow_admin
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.primary()?;
        let result: RedisResult<Option<String>> = conn.get(key).await;
        self.track(result)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.primary()?;
        let result: RedisResult<()> = conn.set(key, value).await;
        self.track(result)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX).max(1);
        let mut conn = self.primary()?;
        let result: RedisResult<bool> = ::redis::cmd("PEXPIRE")
            .arg(key)
            .arg(millis)
            .query_async(&mut conn)
            .await;
        self.track(result)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let mut conn = self.primary()?;
        let result: RedisResult<i64> = ::redis::cmd("PTTL").arg(key).query_async(&mut conn).await;
        // -2 = missing key, -1 = no expiration
        let millis = self.track(result)?;
        Ok(u64::try_from(millis).ok().map(Duration::from_millis))
    }

    fn endpoints(&self) -> Vec<String> {
        self.endpoints.iter().map(|e| e.name.clone()).collect()
    }

    async fn flush_all(&self, endpoint: &str) -> Result<()> {
        if !self.allow_admin {
            return Err(CacheError::AdminRequired("FLUSHALL"));
        }

        let mut conn = self
            .endpoints
            .iter()
            .find(|e| e.name == endpoint)
            .ok_or_else(|| CacheError::Store(format!("unknown endpoint {}", endpoint)))?
            .connection()?;

        let result: RedisResult<()> = ::redis::cmd("FLUSHALL").query_async(&mut conn).await;
        // Health tracks the primary only; flush failures leave it alone
        result.map_err(CacheError::from)
    }

    async fn close(&self) -> Result<()> {
        // Sockets close once the last clone of each connection is dropped
        self.healthy.store(false, Ordering::SeqCst);
        Ok(())
    }
}
