//! Connection Manager
//!
//! Owns the shared, lazily created connection and replaces it whenever its
//! health check fails.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::Result;
use crate::store::{ConnectOptions, Connection, Connector};

// == Connection Manager ==
/// Hands out a ready-to-use connection on demand.
///
/// Starts disconnected. Every call to [`handle`](Self::handle) re-checks the
/// current connection, so callers must fetch a handle per operation instead of
/// holding one across calls.
pub struct ConnectionManager {
    /// Opens new connections to the configured topology
    connector: Arc<dyn Connector>,
    /// Current shared connection, `None` until first use
    current: RwLock<Option<Arc<dyn Connection>>>,
    /// Number of connections opened for normal traffic
    connects: AtomicU64,
}

impl ConnectionManager {
    // == Constructor ==
    /// Creates a manager in the disconnected state. No I/O happens here.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            current: RwLock::new(None),
            connects: AtomicU64::new(0),
        }
    }

    // == Handle ==
    /// Returns the shared connection, connecting or reconnecting first if
    /// there is none or it reports not-connected.
    ///
    /// Connection failures are returned as-is; there is no internal retry.
    pub async fn handle(&self) -> Result<Arc<dyn Connection>> {
        {
            let current = self.current.read().await;
            if let Some(conn) = current.as_ref() {
                if conn.is_connected().await {
                    return Ok(Arc::clone(conn));
                }
            }
        }

        let mut current = self.current.write().await;

        // Another task may have reconnected while we waited for the write lock
        if let Some(conn) = current.as_ref() {
            if conn.is_connected().await {
                return Ok(Arc::clone(conn));
            }
            warn!("Store connection lost, reconnecting");
        }

        let conn: Arc<dyn Connection> = Arc::from(
            self.connector
                .connect(ConnectOptions::default())
                .await?,
        );
        let count = self.connects.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            "Store connection established ({} endpoint(s), connect #{})",
            conn.endpoints().len(),
            count
        );

        *current = Some(Arc::clone(&conn));
        Ok(conn)
    }

    // == Admin Connection ==
    /// Opens a separate admin-privileged connection.
    ///
    /// The connection is never shared with normal traffic; the caller owns it
    /// and must close it when done.
    pub async fn connect_admin(&self) -> Result<Box<dyn Connection>> {
        let conn = self.connector.connect(ConnectOptions::admin()).await?;
        info!("Admin connection established");
        Ok(conn)
    }

    // == Introspection ==
    /// True if a shared connection exists and passes its health check.
    pub async fn is_connected(&self) -> bool {
        match self.current.read().await.as_ref() {
            Some(conn) => conn.is_connected().await,
            None => false,
        }
    }

    /// Number of shared connections opened so far (initial connect included).
    pub fn connect_count(&self) -> u64 {
        self.connects.load(Ordering::Relaxed)
    }
}
