//! Allocation cache.
//!
//! Keeps a pool of reserved but not yet issued identifiers per type. When a
//! pool runs dry, one counter round-trip reserves a whole batch, which is
//! expanded into concrete identifiers and committed in one step. Draws then
//! take one identifier at a time out of the pool.
//!
//! The pool lock is held across the counter call. Concurrent callers for the
//! same type therefore wait for an in-flight refill instead of reserving a
//! second batch, and a failed refill leaves the pool exactly as empty as it
//! was.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::{CacheConfig, LockScope};
use crate::counter::CounterClient;
use crate::domain::{DrawPolicy, IdType, TypeConfig};
use crate::error::{AppError, Result};
use crate::service::random::{RandSource, SeededRandom, ThreadRandom};
use crate::service::range;
use crate::service::registry::TypeRegistry;

/// Reserved, unissued identifiers of one type.
type Pool = VecDeque<u64>;

/// Batched identifier allocator.
pub struct AllocationCache {
    /// Registered types (read-only from here on).
    registry: TypeRegistry,
    /// Counter service used for refills.
    counter: Arc<dyn CounterClient>,
    /// Index source for the `Random` draw policy.
    rand: Box<dyn RandSource>,
    /// One pool per registered type.
    pools: HashMap<IdType, Mutex<Pool>>,
    /// Serializes every acquire when the lock scope is global.
    gate: Option<Mutex<()>>,
}

impl AllocationCache {
    /// Create a cache with per-type locking and the thread-local RNG.
    #[must_use]
    pub fn new(registry: TypeRegistry, counter: Arc<dyn CounterClient>) -> Self {
        Self::with_options(
            registry,
            counter,
            LockScope::PerType,
            Box::new(ThreadRandom),
        )
    }

    /// Create a cache from the `[cache]` configuration section.
    #[must_use]
    pub fn from_config(
        registry: TypeRegistry,
        counter: Arc<dyn CounterClient>,
        config: &CacheConfig,
    ) -> Self {
        let rand: Box<dyn RandSource> = match config.random_seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(ThreadRandom),
        };
        Self::with_options(registry, counter, config.lock_scope, rand)
    }

    /// Create a cache with an explicit lock scope and random source.
    #[must_use]
    pub fn with_options(
        registry: TypeRegistry,
        counter: Arc<dyn CounterClient>,
        lock_scope: LockScope,
        rand: Box<dyn RandSource>,
    ) -> Self {
        let pools = registry
            .iter()
            .map(|(id_type, _)| (id_type, Mutex::new(Pool::new())))
            .collect();

        let gate = match lock_scope {
            LockScope::Global => Some(Mutex::new(())),
            LockScope::PerType => None,
        };

        Self {
            registry,
            counter,
            rand,
            pools,
            gate,
        }
    }

    /// Hand out one identifier of the given type.
    ///
    /// Refills the type's pool from the counter service first if it is
    /// empty. The returned identifier is never 0.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` for an unregistered type, or the counter error
    /// that aborted the refill. In both cases no identifier was issued and
    /// the pool is unchanged.
    pub async fn acquire(&self, id_type: IdType) -> Result<u64> {
        let (config, pool) = self.entry(id_type)?;

        let _gate = match &self.gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };
        let mut pool = pool.lock().await;

        if pool.is_empty() {
            *pool = self.refill(id_type, config).await?;
        }

        let drawn = match config.draw {
            DrawPolicy::Sequential => pool.pop_front(),
            DrawPolicy::Random => {
                let index = self.rand.index(pool.len());
                pool.swap_remove_back(index)
            }
        };

        let id = drawn.ok_or_else(|| {
            AppError::Internal(format!("pool for type {id_type} empty after refill"))
        })?;

        metrics::counter!("idpool_acquire_total", "type" => id_type.to_string()).increment(1);
        Ok(id)
    }

    /// Number of identifiers currently pooled for a type.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` for an unregistered type.
    pub async fn pending(&self, id_type: IdType) -> Result<usize> {
        let (_, pool) = self.entry(id_type)?;
        Ok(pool.lock().await.len())
    }

    /// Drop every pooled identifier.
    ///
    /// Dropped identifiers are never handed out; the next acquire of each
    /// type reserves a fresh batch.
    pub async fn clear(&self) {
        for pool in self.pools.values() {
            pool.lock().await.clear();
        }
    }

    /// Registered types.
    #[must_use]
    pub const fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    fn entry(&self, id_type: IdType) -> Result<(&TypeConfig, &Mutex<Pool>)> {
        self.registry
            .lookup(id_type)
            .zip(self.pools.get(&id_type))
            .ok_or(AppError::NotConfigured(id_type))
    }

    /// Reserve one batch on the counter service and expand it.
    async fn refill(&self, id_type: IdType, config: &TypeConfig) -> Result<Pool> {
        let counter_name = id_type.counter_name();
        let amount = u64::from(config.batch_size);

        let value = match self.counter.reserve(&counter_name, amount).await {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    id_type = %id_type,
                    backend = self.counter.backend_name(),
                    error = %e,
                    "Refill failed"
                );
                metrics::counter!("idpool_refill_failures_total", "type" => id_type.to_string())
                    .increment(1);
                return Err(e.into());
            }
        };

        let ids = range::expand(value, config);

        debug!(
            id_type = %id_type,
            counter = value,
            batch_size = config.batch_size,
            "Refilled pool"
        );
        metrics::counter!("idpool_refill_total", "type" => id_type.to_string()).increment(1);

        Ok(ids.into())
    }
}
