//! Node Store
//!
//! Storage for one in-process endpoint: string values with per-key
//! expiration and a capacity bound enforced by LRU eviction.

use std::collections::HashMap;
use std::time::Duration;

use super::entry::StoredEntry;
use super::lru::LruTracker;

// == Node Store ==
/// Key-value storage of a single node.
#[derive(Debug)]
pub struct NodeStore {
    /// Key-value storage
    entries: HashMap<String, StoredEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Maximum number of entries before eviction kicks in
    max_entries: usize,
    /// Entries evicted for capacity since creation
    evictions: u64,
}

impl NodeStore {
    /// Creates an empty node holding at most `max_entries` keys (minimum 1).
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            max_entries: max_entries.max(1),
            evictions: 0,
        }
    }

    // == Get ==
    /// Returns the value if present and unexpired. Expired entries are dropped.
    ///
    /// Reading never changes the entry's deadline.
    pub fn get(&mut self, key: &str) -> Option<String> {
        if self.drop_if_expired(key) {
            return None;
        }
        let value = self.entries.get(key)?.value.clone();
        self.lru.touch(key);
        Some(value)
    }

    // == Set ==
    /// Stores a value without expiration, replacing any previous entry and
    /// its deadline. Evicts the least recently used key when full.
    pub fn set(&mut self, key: &str, value: String) {
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.evictions += 1;
            }
        }

        self.entries.insert(key.to_string(), StoredEntry::new(value));
        self.lru.touch(key);
    }

    // == Expire ==
    /// Sets the key's deadline. Returns `false` if the key is absent.
    pub fn expire(&mut self, key: &str, ttl: Duration) -> bool {
        if self.drop_if_expired(key) {
            return false;
        }
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.expire_in(ttl);
                true
            }
            None => false,
        }
    }

    // == TTL ==
    /// Remaining lifetime of a live key with a deadline.
    pub fn ttl(&mut self, key: &str) -> Option<Duration> {
        if self.drop_if_expired(key) {
            return None;
        }
        self.entries.get(key)?.ttl_remaining()
    }

    // == Flush ==
    /// Removes every entry. Returns how many were removed.
    pub fn flush(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        count
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.lru.remove(key);
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    fn drop_if_expired(&mut self, key: &str) -> bool {
        let expired = self.entries.get(key).is_some_and(StoredEntry::is_expired);
        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
        }
        expired
    }
}

#[cfg(test)]
impl NodeStore {
    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
