//! Redis counter backend.
//!
//! Every identifier type is one field of a single hash, incremented with
//! `HINCRBY`. Redis applies the increment atomically, which is what makes
//! batches reserved by different processes disjoint.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::{self, RedisError};
use deadpool_redis::{Config, Pool, PoolConfig, Runtime, Timeouts};

use crate::config::RedisCounterConfig;
use crate::counter::traits::CounterClient;
use crate::error::{CounterError, CounterResult};

/// Redis-backed counter implementation.
pub struct RedisCounter {
    pool: Pool,
    hash_key: String,
}

impl RedisCounter {
    /// Build the connection pool. No connection is opened until first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the pool cannot be built.
    pub fn new(config: &RedisCounterConfig) -> CounterResult<Self> {
        let timeout = Duration::from_secs(config.connect_timeout);

        let mut timeouts = Timeouts::default();
        timeouts.wait = Some(timeout);
        timeouts.create = Some(timeout);
        timeouts.recycle = Some(timeout);

        let mut pool_config = PoolConfig::new(config.pool_size);
        pool_config.timeouts = timeouts;

        let mut redis_config = Config::from_url(config.url.clone());
        redis_config.pool = Some(pool_config);

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CounterError::Transient(format!("Failed to create Redis pool: {e}")))?;

        Ok(Self {
            pool,
            hash_key: config.hash_key.clone(),
        })
    }

    async fn connection(&self) -> CounterResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| CounterError::Transient(format!("Redis connection failed: {e}")))
    }
}

#[async_trait]
impl CounterClient for RedisCounter {
    async fn reserve(&self, counter: &str, amount: u64) -> CounterResult<u64> {
        let mut conn = self.connection().await?;

        let value: u64 = redis::cmd("HINCRBY")
            .arg(&self.hash_key)
            .arg(counter)
            .arg(amount)
            .query_async(&mut conn)
            .await
            .map_err(classify)?;

        Ok(value)
    }

    async fn health_check(&self) -> CounterResult<()> {
        let mut conn = self.connection().await?;

        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(classify)?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// Map a Redis error onto the counter error taxonomy.
///
/// Anything that is not a transport failure means the server answered but
/// the answer could not be used as a counter value.
fn classify(err: RedisError) -> CounterError {
    if err.is_io_error()
        || err.is_timeout()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
    {
        CounterError::Transient(err.to_string())
    } else {
        CounterError::Protocol(err.to_string())
    }
}
