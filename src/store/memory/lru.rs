//! LRU Tracker
//!
//! Orders keys by last write or read so a full node can evict the coldest one.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Access-order index: each touch stamps the key with a fresh tick.
///
/// The smallest tick is the least recently used key.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Monotonic access counter
    tick: u64,
    /// tick -> key, oldest first
    by_tick: BTreeMap<u64, String>,
    /// key -> its current tick
    ticks: HashMap<String, u64>,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a key as most recently used, tracking it if new.
    pub fn touch(&mut self, key: &str) {
        self.tick += 1;
        if let Some(old) = self.ticks.insert(key.to_string(), self.tick) {
            self.by_tick.remove(&old);
        }
        self.by_tick.insert(self.tick, key.to_string());
    }

    /// Stops tracking a key. Unknown keys are ignored.
    pub fn remove(&mut self, key: &str) {
        if let Some(old) = self.ticks.remove(key) {
            self.by_tick.remove(&old);
        }
    }

    /// Removes and returns the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.by_tick.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    pub fn clear(&mut self) {
        self.by_tick.clear();
        self.ticks.clear();
    }
}

#[cfg(test)]
impl LruTracker {
    fn len(&self) -> usize {
        self.ticks.len()
    }

    fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
