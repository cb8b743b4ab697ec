//! Redis cache backend

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::error::CacheError;
use crate::store::CacheStore;

/// Cache backed by a Redis server over a multiplexed connection
#[derive(Clone)]
pub struct RedisCacheStore {
    connection: MultiplexedConnection,
}

impl RedisCacheStore {
    /// Connects to the Redis server at `url`
    ///
    /// # Arguments
    ///
    /// * `url` - Connection string such as `redis://localhost:6379`
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the URL is invalid or the
    /// server cannot be reached.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::ConnectionFailed(e.to_string()))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::ConnectionFailed(e.to_string()))?;

        tracing::info!("Connected to Redis cache");
        Ok(Self { connection })
    }
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheStore").finish_non_exhaustive()
    }
}

fn map_redis_error(error: redis::RedisError) -> CacheError {
    if error.is_connection_refusal() || error.is_connection_dropped() || error.is_io_error() {
        CacheError::ConnectionFailed(error.to_string())
    } else {
        CacheError::Backend(error.to_string())
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut connection = self.connection.clone();
        // GET on an absent key replies nil, which decodes to None
        connection
            .get::<_, Option<String>>(key)
            .await
            .map_err(map_redis_error)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        if ttl.is_zero() {
            connection
                .set::<_, _, ()>(key, value)
                .await
                .map_err(map_redis_error)
        } else {
            // EX has whole-second resolution; round up so entries never expire early
            let seconds = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
            connection
                .set_ex::<_, _, ()>(key, value, seconds)
                .await
                .map_err(map_redis_error)
        }
    }
}
