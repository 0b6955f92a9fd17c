//! Persistence store
//!
//! The server keeps exactly one value: the JSON snapshot under a fixed key.
//! `KeyValueStore` is the narrow interface every backend implements, and
//! `SnapshotStore` layers the snapshot semantics on top of it.
//!
//! ## Backends
//!
//! - **Redis** (`redis://`, `redis+unix://`): production backend, reconnects
//!   with bounded backoff
//! - **SQLite** (`sqlite://<path>`): single file, no external service
//! - **Memory** (`memory://`): process-local, with failure injection

mod error;
mod memory;
mod reconnect;
mod redis_store;
mod snapshot_store;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use reconnect::ReconnectPolicy;
pub use redis_store::RedisStore;
pub use snapshot_store::SnapshotStore;
pub use sqlite::SqliteStore;

/// Minimal key-value interface over the backing store
///
/// All operations are idempotent: repeating a `set` with the same value has
/// no further effect and `get` never has side effects.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Check whether a key is present
    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Liveness probe; returns the backend's reply (e.g. "PONG")
    async fn ping(&self) -> StoreResult<String>;

    /// Whether a live connection is currently held
    fn is_connected(&self) -> bool;

    /// Release the connection
    async fn close(&self);

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

/// Open a store from its URL
///
/// The scheme picks the backend. Network backends connect eagerly so that
/// startup fails fast when the store is unreachable.
pub async fn open_store(
    url: &str,
    policy: ReconnectPolicy,
) -> StoreResult<Arc<dyn KeyValueStore>> {
    let is_redis = url.starts_with("redis://") || url.starts_with("redis+unix://");

    let store: Arc<dyn KeyValueStore> = if is_redis {
        let store = RedisStore::new(url, policy)?;
        store.connect().await?;
        Arc::new(store)
    } else if let Some(path) = url.strip_prefix("sqlite://") {
        Arc::new(SqliteStore::open(path)?)
    } else if url == "memory://" || url == "memory" {
        Arc::new(MemoryStore::new())
    } else {
        return Err(StoreError::InvalidUrl {
            url: url.to_string(),
            details: "unsupported scheme".to_string(),
        });
    };

    info!("Opened {} store", store.backend());
    Ok(store)
}
