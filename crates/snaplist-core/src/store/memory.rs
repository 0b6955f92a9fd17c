//! In-memory store
//!
//! Holds values in a map behind a lock. Supports taking the store "offline"
//! so callers can exercise their store-failure paths without a real server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::{KeyValueStore, StoreError, StoreResult};

/// Process-local key-value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty, online store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following operation fail (or succeed again)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Read a value without going through the async interface
    pub fn peek(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Injected("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_online()?;
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check_online()?;
        self.values
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn ping(&self) -> StoreResult<String> {
        self.check_online()?;
        Ok("PONG".to_string())
    }

    fn is_connected(&self) -> bool {
        !self.offline.load(Ordering::SeqCst)
    }

    async fn close(&self) {}

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(!store.exists("k").await.unwrap());

        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert!(store.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_is_idempotent() {
        let store = MemoryStore::new();
        store.set("k", "v").await.unwrap();
        store.set("k", "v").await.unwrap();
        assert_eq!(store.peek("k"), Some("v".to_string()));
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_offline_fails_and_keeps_value() {
        let store = MemoryStore::new();
        store.set("k", "before").await.unwrap();

        store.set_offline(true);
        assert!(!store.is_connected());
        assert!(store.get("k").await.is_err());
        assert!(store.set("k", "after").await.is_err());
        assert!(store.ping().await.is_err());

        store.set_offline(false);
        assert_eq!(store.get("k").await.unwrap(), Some("before".to_string()));
        assert_eq!(store.ping().await.unwrap(), "PONG");
    }
}
