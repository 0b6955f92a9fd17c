//! Snapshot persistence over a key-value store
//!
//! Every write replaces the whole snapshot. There is no version token, so
//! concurrent writers race and the last completed write wins.

use std::sync::Arc;

use tracing::{debug, info};

use super::{KeyValueStore, StoreResult};
use crate::snapshot::{decode_snapshot, encode_snapshot, EMPTY_SNAPSHOT, SNAPSHOT_KEY};

/// The todo snapshot stored under its fixed key
#[derive(Clone)]
pub struct SnapshotStore {
    kv: Arc<dyn KeyValueStore>,
    key: &'static str,
}

impl SnapshotStore {
    /// Wrap a key-value store
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            key: SNAPSHOT_KEY,
        }
    }

    /// Write the empty snapshot if none exists yet
    ///
    /// Returns true when the key was created.
    pub async fn initialize(&self) -> StoreResult<bool> {
        if self.kv.exists(self.key).await? {
            debug!("Snapshot key '{}' already present", self.key);
            return Ok(false);
        }

        self.kv.set(self.key, EMPTY_SNAPSHOT).await?;
        info!("Initialized empty snapshot under '{}'", self.key);
        Ok(true)
    }

    /// Read the snapshot; absent or unparsable values read as empty
    pub async fn load(&self) -> StoreResult<Vec<String>> {
        let raw = self.kv.get(self.key).await?;
        Ok(decode_snapshot(raw.as_deref()))
    }

    /// Replace the snapshot
    pub async fn save(&self, items: &[String]) -> StoreResult<()> {
        self.kv.set(self.key, &encode_snapshot(items)).await?;
        debug!("Saved snapshot with {} item(s)", items.len());
        Ok(())
    }

    /// Replace the snapshot with the empty list
    pub async fn clear(&self) -> StoreResult<()> {
        self.kv.set(self.key, EMPTY_SNAPSHOT).await?;
        debug!("Cleared snapshot");
        Ok(())
    }

    /// Liveness probe of the underlying store
    pub async fn ping(&self) -> StoreResult<String> {
        self.kv.ping().await
    }

    /// Whether the underlying store holds a live connection
    pub fn is_connected(&self) -> bool {
        self.kv.is_connected()
    }

    /// Backend name for logs
    pub fn backend(&self) -> &'static str {
        self.kv.backend()
    }

    /// Release the underlying connection
    pub async fn close(&self) {
        self.kv.close().await;
    }
}
