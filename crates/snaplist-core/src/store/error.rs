//! Store error handling
//!
//! Provides typed errors for key-value operations with descriptive messages
//! and recovery suggestions. The suggestion doubles as the `solution` field
//! of the HTTP error bodies.

use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store URL could not be understood
    #[error("Invalid store URL '{url}': {details}")]
    InvalidUrl { url: String, details: String },

    /// Connection could not be (re)established within the reconnect budget
    #[error("Store unavailable after {attempts} connection attempt(s): {details}")]
    Unavailable { attempts: u32, details: String },

    /// Redis command failed
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// SQLite database error
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failure injected by the in-memory store
    #[error("Injected store failure: {0}")]
    Injected(String),

    /// Snapshot could not be encoded
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    /// Blocking store task panicked or was cancelled
    #[error("Store task failed: {0}")]
    TaskFailed(String),
}

impl StoreError {
    /// Whether the failure means the connection itself is gone
    pub fn is_connection_error(&self) -> bool {
        match self {
            StoreError::Unavailable { .. } | StoreError::Injected(_) => true,
            StoreError::Redis(e) => is_redis_connection_error(e),
            _ => false,
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            StoreError::InvalidUrl { .. } => {
                "Use a store URL like redis://127.0.0.1:6379, sqlite:///path/to/store.db or memory://"
            }
            StoreError::Unavailable { .. } | StoreError::Injected(_) => {
                "Check that the store is running and reachable (Redis listens on port 6379 by default)"
            }
            StoreError::Redis(e) if is_redis_connection_error(e) => {
                "Check that the store is running and reachable (Redis listens on port 6379 by default)"
            }
            StoreError::Sqlite(_) => {
                "Check that the SQLite file exists, is writable and is not locked by another process"
            }
            _ => "Check the server logs for details",
        }
    }
}

/// Whether a Redis error is a lost or refused connection
pub(crate) fn is_redis_connection_error(e: &redis::RedisError) -> bool {
    e.is_connection_dropped() || e.is_connection_refusal() || e.is_io_error() || e.is_timeout()
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
