//! Stored Entry
//!
//! A value held by an in-process node, with an optional expiration deadline.

use std::time::{Duration, Instant};

// == Stored Entry ==
/// Serialized value plus the deadline after which it reads as absent.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// Raw text as written by SET
    pub value: String,
    /// Deadline, `None` = persists until overwritten or flushed
    pub expires_at: Option<Instant>,
}

impl StoredEntry {
    /// Creates an entry without expiration, matching SET semantics.
    pub fn new(value: String) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Sets the deadline to `ttl` from now.
    pub fn expire_in(&mut self, ttl: Duration) {
        self.expires_at = Instant::now().checked_add(ttl);
    }

    /// An entry is expired once the current time reaches its deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if now >= deadline)
    }

    /// Remaining lifetime, `Some(ZERO)` once expired, `None` without deadline.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_new_entry_has_no_deadline() {
        let entry = StoredEntry::new("\"v\"".to_string());

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining().is_none());
    }

    #[test]
    fn test_expire_in_sets_remaining() {
        let mut entry = StoredEntry::new("v".to_string());
        entry.expire_in(Duration::from_secs(10));

        let remaining = entry.ttl_remaining().unwrap();
        assert!(remaining <= Duration::from_secs(10));
        assert!(remaining >= Duration::from_secs(9));
    }

    #[test]
    fn test_entry_expiration() {
        let mut entry = StoredEntry::new("v".to_string());
        entry.expire_in(Duration::from_millis(20));
        assert!(!entry.is_expired());

        sleep(Duration::from_millis(40));

        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let entry = StoredEntry {
            value: "v".to_string(),
            expires_at: Some(now),
        };

        assert!(entry.is_expired_at(now), "Entry should be expired at its deadline");
    }
}
