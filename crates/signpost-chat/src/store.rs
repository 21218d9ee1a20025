//! Session storage.
//!
//! Stores hold sessions as opaque JSON blobs keyed by user id and must
//! return the most recent value or nothing. Expiry is the store's policy.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use signpost_core::types::UserId;

use crate::error::SessionStoreError;

pub trait SessionStore: Send + Sync {
    fn get(&self, user_id: UserId) -> Result<Option<String>, SessionStoreError>;

    fn put(&self, user_id: UserId, blob: String) -> Result<(), SessionStoreError>;
}

/// In-process store with a sliding time-to-live.
#[derive(Debug)]
pub struct MemorySessionStore {
    ttl: Duration,
    entries: Mutex<HashMap<UserId, (String, DateTime<Utc>)>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_ttl_minutes(minutes: u32) -> Self {
        Self::new(Duration::minutes(i64::from(minutes)))
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize, SessionStoreError> {
        let now = Utc::now();
        let mut entries = self.entries.lock().map_err(|_| SessionStoreError::Poisoned)?;
        let before = entries.len();
        entries.retain(|_, (_, stored_at)| !self.is_expired(*stored_at, now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Purged expired sessions");
        }
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now >= stored_at + self.ttl
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, user_id: UserId) -> Result<Option<String>, SessionStoreError> {
        let now = Utc::now();
        let mut entries = self.entries.lock().map_err(|_| SessionStoreError::Poisoned)?;
        match entries.get(&user_id) {
            Some((_, stored_at)) if self.is_expired(*stored_at, now) => {
                entries.remove(&user_id);
                debug!(user_id, "Session expired");
                Ok(None)
            }
            Some((blob, _)) => Ok(Some(blob.clone())),
            None => Ok(None),
        }
    }

    fn put(&self, user_id: UserId, blob: String) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.lock().map_err(|_| SessionStoreError::Poisoned)?;
        entries.insert(user_id, (blob, Utc::now()));
        Ok(())
    }
}

/// Store that remembers nothing; every event starts a fresh session.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSessionStore;

impl SessionStore for NullSessionStore {
    fn get(&self, _user_id: UserId) -> Result<Option<String>, SessionStoreError> {
        Ok(None)
    }

    fn put(&self, _user_id: UserId, _blob: String) -> Result<(), SessionStoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let store = MemorySessionStore::with_ttl_minutes(30);
        assert_eq!(store.get(1).unwrap(), None);
        store.put(1, "{\"a\":1}".to_string()).unwrap();
        assert_eq!(store.get(1).unwrap().as_deref(), Some("{\"a\":1}"));
        assert_eq!(store.get(2).unwrap(), None);
    }

    #[test]
    fn test_latest_value_wins() {
        let store = MemorySessionStore::with_ttl_minutes(30);
        store.put(1, "old".to_string()).unwrap();
        store.put(1, "new".to_string()).unwrap();
        assert_eq!(store.get(1).unwrap().as_deref(), Some("new"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_expired_entries_are_forgotten() {
        let store = MemorySessionStore::new(Duration::zero());
        store.put(1, "blob".to_string()).unwrap();
        assert_eq!(store.get(1).unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let store = MemorySessionStore::new(Duration::zero());
        store.put(1, "a".to_string()).unwrap();
        store.put(2, "b".to_string()).unwrap();
        assert_eq!(store.purge_expired().unwrap(), 2);
        assert!(store.is_empty());

        let store = MemorySessionStore::with_ttl_minutes(30);
        store.put(1, "a".to_string()).unwrap();
        assert_eq!(store.purge_expired().unwrap(), 0);
    }

    #[test]
    fn test_null_store_forgets() {
        let store = NullSessionStore;
        store.put(1, "blob".to_string()).unwrap();
        assert_eq!(store.get(1).unwrap(), None);
    }
}
