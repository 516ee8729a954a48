//! In-Process Store
//!
//! A multi-node key-value store living in this process. Keys are spread
//! across nodes by hash, every node is a separate flushable endpoint, and the
//! connector can simulate dropped connections and an unreachable topology.

mod entry;
mod lru;
mod node;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{CacheError, Result};
use crate::store::{ConnectOptions, Connection, Connector};

use node::NodeStore;

// == Memory Node ==
struct MemoryNode {
    name: String,
    store: RwLock<NodeStore>,
    /// When set, FLUSHALL on this node fails
    failing: AtomicBool,
}

struct Topology {
    nodes: Vec<MemoryNode>,
    /// Bumped to drop every open connection at once
    generation: AtomicU64,
    reachable: AtomicBool,
}

impl Topology {
    fn node_for(&self, key: &str) -> &MemoryNode {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() % self.nodes.len() as u64) as usize;
        &self.nodes[index]
    }

    fn node_named(&self, name: &str) -> Option<&MemoryNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

// == Memory Connector ==
/// Connector for the in-process topology. Clones share the same nodes.
#[derive(Clone)]
pub struct MemoryConnector {
    topology: Arc<Topology>,
}

impl MemoryConnector {
    /// Creates a topology of `nodes` endpoints (minimum 1), each holding at
    /// most `max_entries` keys.
    pub fn new(nodes: usize, max_entries: usize) -> Self {
        let nodes = (0..nodes.max(1))
            .map(|i| MemoryNode {
                name: format!("memory://node-{}", i),
                store: RwLock::new(NodeStore::new(max_entries)),
                failing: AtomicBool::new(false),
            })
            .collect();

        Self {
            topology: Arc::new(Topology {
                nodes,
                generation: AtomicU64::new(0),
                reachable: AtomicBool::new(true),
            }),
        }
    }

    /// Drops every open connection; their health checks now fail.
    pub fn sever_connections(&self) {
        self.topology.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Makes new connects succeed or fail. Unreachable also fails health checks.
    pub fn set_reachable(&self, reachable: bool) {
        self.topology.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Makes FLUSHALL on the node at `index` fail or succeed.
    pub fn set_node_failing(&self, index: usize, failing: bool) {
        if let Some(node) = self.topology.nodes.get(index) {
            node.failing.store(failing, Ordering::SeqCst);
        }
    }

    /// Total live and not-yet-swept entries across nodes.
    pub async fn len(&self) -> usize {
        let mut total = 0;
        for node in &self.topology.nodes {
            total += node.store.read().await.len();
        }
        total
    }

    /// Entries stored on the node at `index`.
    pub async fn node_len(&self, index: usize) -> usize {
        match self.topology.nodes.get(index) {
            Some(node) => node.store.read().await.len(),
            None => 0,
        }
    }

    /// Capacity evictions across nodes.
    pub async fn evictions(&self) -> u64 {
        let mut total = 0;
        for node in &self.topology.nodes {
            total += node.store.read().await.evictions();
        }
        total
    }

    /// Removes expired entries from every node. Returns how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut removed = 0;
        for node in &self.topology.nodes {
            removed += node.store.write().await.cleanup_expired();
        }
        removed
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, options: ConnectOptions) -> Result<Box<dyn Connection>> {
        if !self.topology.reachable.load(Ordering::SeqCst) {
            return Err(CacheError::Connection(
                "in-process store is unreachable".to_string(),
            ));
        }

        Ok(Box::new(MemoryConnection {
            topology: Arc::clone(&self.topology),
            generation: self.topology.generation.load(Ordering::SeqCst),
            allow_admin: options.allow_admin,
            closed: AtomicBool::new(false),
        }))
    }
}

// == Memory Connection ==
struct MemoryConnection {
    topology: Arc<Topology>,
    /// Topology generation at connect time
    generation: u64,
    allow_admin: bool,
    closed: AtomicBool,
}

impl MemoryConnection {
    fn alive(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
            && self.topology.reachable.load(Ordering::SeqCst)
            && self.topology.generation.load(Ordering::SeqCst) == self.generation
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.alive() {
            Ok(())
        } else {
            Err(CacheError::Connection(
                "in-process connection is closed".to_string(),
            ))
        }
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn is_connected(&self) -> bool {
        self.alive()
    }

    fn allows_admin(&self) -> bool {
        self.allow_admin
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.ensure_connected()?;
        Ok(self.topology.node_for(key).store.write().await.get(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_connected()?;
        self.topology
            .node_for(key)
            .store
            .write()
            .await
            .set(key, value.to_string());
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        self.ensure_connected()?;
        Ok(self.topology.node_for(key).store.write().await.expire(key, ttl))
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        self.ensure_connected()?;
        Ok(self.topology.node_for(key).store.write().await.ttl(key))
    }

    fn endpoints(&self) -> Vec<String> {
        self.topology.nodes.iter().map(|n| n.name.clone()).collect()
    }

    async fn flush_all(&self, endpoint: &str) -> Result<()> {
        if !self.allow_admin {
            return Err(CacheError::AdminRequired("FLUSHALL"));
        }
        self.ensure_connected()?;

        let node = self
            .topology
            .node_named(endpoint)
            .ok_or_else(|| CacheError::Store(format!("unknown endpoint {}", endpoint)))?;
        if node.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Store(format!("FLUSHALL failed on {}", endpoint)));
        }

        node.store.write().await.flush();
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
