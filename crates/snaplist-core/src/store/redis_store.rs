//! Redis backend
//!
//! Keeps one multiplexed connection that is shared by all requests. When the
//! connection drops, the next operation reconnects with the bounded backoff
//! from [`ReconnectPolicy`] and retries its command once over the new
//! connection. Concurrent callers wait on the same reconnect instead of each
//! starting their own.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{Cmd, FromRedisValue, RedisResult};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::error::is_redis_connection_error;
use super::{KeyValueStore, ReconnectPolicy, StoreError, StoreResult};

/// Key-value store backed by a Redis server
pub struct RedisStore {
    client: redis::Client,
    connection: Mutex<Option<MultiplexedConnection>>,
    connected: AtomicBool,
    policy: ReconnectPolicy,
}

impl RedisStore {
    /// Create a store for the given URL without connecting yet
    pub fn new(url: &str, policy: ReconnectPolicy) -> StoreResult<Self> {
        let client = redis::Client::open(url).map_err(|e| StoreError::InvalidUrl {
            url: url.to_string(),
            details: e.to_string(),
        })?;

        Ok(Self {
            client,
            connection: Mutex::new(None),
            connected: AtomicBool::new(false),
            policy,
        })
    }

    /// Get the live connection, (re)connecting with backoff if needed
    pub async fn connect(&self) -> StoreResult<MultiplexedConnection> {
        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.client.get_multiplexed_async_connection().await {
                Ok(conn) => {
                    if attempts > 1 {
                        info!("Redis connection re-established after {} attempts", attempts);
                    } else {
                        debug!("Redis connection established");
                    }
                    self.connected.store(true, Ordering::SeqCst);
                    *slot = Some(conn.clone());
                    return Ok(conn);
                }
                Err(e) => {
                    self.connected.store(false, Ordering::SeqCst);
                    if !self.policy.should_retry(attempts) {
                        warn!("Giving up on Redis after {} attempts: {}", attempts, e);
                        return Err(StoreError::Unavailable {
                            attempts,
                            details: e.to_string(),
                        });
                    }

                    let delay = self.policy.delay_for(attempts);
                    warn!(
                        "Redis connection attempt {} failed: {}; retrying in {:?}",
                        attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Drop the cached connection so the next call reconnects
    async fn invalidate(&self) {
        *self.connection.lock().await = None;
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Run a command, reconnecting once if the connection was lost
    async fn query<T>(&self, cmd: &Cmd) -> StoreResult<T>
    where
        T: FromRedisValue + Send,
    {
        let mut conn = self.connect().await?;
        let first: RedisResult<T> = cmd.query_async(&mut conn).await;

        match first {
            Ok(value) => Ok(value),
            Err(e) if is_redis_connection_error(&e) => {
                warn!("Redis connection lost ({}), reconnecting", e);
                self.invalidate().await;

                let mut conn = self.connect().await?;
                let retried: RedisResult<T> = cmd.query_async(&mut conn).await;
                if let Err(ref e) = retried {
                    if is_redis_connection_error(e) {
                        self.invalidate().await;
                    }
                }
                retried.map_err(StoreError::from)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.query(&cmd).await
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        self.query(&cmd).await
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let mut cmd = redis::cmd("EXISTS");
        cmd.arg(key);
        self.query(&cmd).await
    }

    async fn ping(&self) -> StoreResult<String> {
        self.query(&redis::cmd("PING")).await
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn close(&self) {
        self.invalidate().await;
        debug!("Redis connection closed");
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_invalid_url_rejected() {
        let err = RedisStore::new("not a url", ReconnectPolicy::no_retry())
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_uses_attempt_budget() {
        let policy = ReconnectPolicy {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(20),
            max_attempts: 3,
        };
        let store = RedisStore::new("redis://127.0.0.1:1", policy).unwrap();

        let started = Instant::now();
        let err = store.get("todos").await.unwrap_err();

        assert!(matches!(err, StoreError::Unavailable { attempts: 3, .. }));
        assert!(!store.is_connected());
        // Two waits between three attempts: 10ms + 20ms
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
