//! Allocation cache tests through the public API.
//!
//! A scripted counter stands in for the counter service so that replies,
//! failures, and latency can be controlled per test.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use idpool_worker::config::LockScope;
use idpool_worker::counter::{CounterClient, MemoryCounter};
use idpool_worker::domain::{DrawPolicy, IdType, TypeConfig};
use idpool_worker::error::{AppError, CounterError, CounterResult};
use idpool_worker::service::{AllocationCache, SeededRandom, ThreadRandom, TypeRegistry};

// ============================================================================
// Test Harness
// ============================================================================

/// Counter that replays scripted replies, then falls back to real counting.
#[derive(Default)]
struct ScriptedCounter {
    replies: Mutex<VecDeque<CounterResult<u64>>>,
    fallback: MemoryCounter,
    calls: AtomicUsize,
    slow_counter: Option<String>,
    delay: Duration,
}

impl ScriptedCounter {
    fn with_replies(replies: Vec<CounterResult<u64>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    fn slow(mut self, counter: &str, delay: Duration) -> Self {
        self.slow_counter = Some(counter.to_string());
        self.delay = delay;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CounterClient for ScriptedCounter {
    async fn reserve(&self, counter: &str, amount: u64) -> CounterResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.slow_counter.as_deref() == Some(counter) {
            tokio::time::sleep(self.delay).await;
        }

        let scripted = self.replies.lock().pop_front();
        match scripted {
            Some(reply) => reply,
            None => self.fallback.reserve(counter, amount).await,
        }
    }

    async fn health_check(&self) -> CounterResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}

const T: IdType = IdType::new(1);

fn registry(draw: DrawPolicy) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .register(T, TypeConfig::new(10_000, 10_099, 5, draw))
        .unwrap();
    registry
}

fn cache(counter: Arc<ScriptedCounter>, draw: DrawPolicy, scope: LockScope) -> AllocationCache {
    AllocationCache::with_options(registry(draw), counter, scope, Box::new(ThreadRandom))
}

// ============================================================================
// Batch Expansion
// ============================================================================

#[tokio::test]
async fn test_first_batch_is_contiguous_run_ending_at_counter() {
    let counter = Arc::new(ScriptedCounter::with_replies(vec![Ok(5)]));
    let cache = cache(Arc::clone(&counter), DrawPolicy::Sequential, LockScope::PerType);

    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(cache.acquire(T).await.unwrap());
    }

    assert_eq!(ids, vec![10_000, 10_001, 10_002, 10_003, 10_004]);
    assert_eq!(counter.calls(), 1);
}

#[tokio::test]
async fn test_wraparound_stays_in_range() {
    let counter = Arc::new(ScriptedCounter::with_replies(vec![Ok(3)]));
    let cache = cache(Arc::clone(&counter), DrawPolicy::Sequential, LockScope::PerType);

    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(cache.acquire(T).await.unwrap());
    }

    assert_eq!(ids, vec![10_098, 10_099, 10_000, 10_001, 10_002]);
    assert!(ids.iter().all(|id| (10_000..=10_099).contains(id)));
}

#[tokio::test]
async fn test_draws_are_distinct_across_refills() {
    let counter = Arc::new(ScriptedCounter::default());
    let cache = cache(Arc::clone(&counter), DrawPolicy::Random, LockScope::PerType);

    let mut seen = HashSet::new();
    for _ in 0..100 {
        let id = cache.acquire(T).await.unwrap();
        assert!(id != 0);
        assert!(seen.insert(id), "duplicate id {id}");
    }

    assert_eq!(counter.calls(), 20);
}

// ============================================================================
// Draw Policies
// ============================================================================

#[tokio::test]
async fn test_seeded_random_draws_are_reproducible() {
    async fn draws(seed: u64) -> Vec<u64> {
        let cache = AllocationCache::with_options(
            registry(DrawPolicy::Random),
            Arc::new(MemoryCounter::new()),
            LockScope::PerType,
            Box::new(SeededRandom::new(seed)),
        );
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(cache.acquire(T).await.unwrap());
        }
        ids
    }

    let first = draws(11).await;
    assert_eq!(first, draws(11).await);

    let mut sorted = first.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![10_000, 10_001, 10_002, 10_003, 10_004]);
}

#[tokio::test]
async fn test_random_first_draw_covers_whole_pool() {
    let rng = Arc::new(SeededRandom::new(5));
    let mut first_draws = HashSet::new();

    for _ in 0..200 {
        let cache = AllocationCache::with_options(
            registry(DrawPolicy::Random),
            Arc::new(ScriptedCounter::with_replies(vec![Ok(5)])),
            LockScope::PerType,
            Box::new(SharedRandom(Arc::clone(&rng))),
        );
        first_draws.insert(cache.acquire(T).await.unwrap());
    }

    assert_eq!(first_draws.len(), 5);
}

struct SharedRandom(Arc<SeededRandom>);

impl idpool_worker::service::RandSource for SharedRandom {
    fn index(&self, len: usize) -> usize {
        self.0.index(len)
    }
}

// ============================================================================
// Failure Handling
// ============================================================================

#[tokio::test]
async fn test_failed_refill_leaves_pool_empty_and_recovers() {
    let counter = Arc::new(ScriptedCounter::with_replies(vec![
        Err(CounterError::Transient("connection refused".to_string())),
        Ok(5),
    ]));
    let cache = cache(Arc::clone(&counter), DrawPolicy::Sequential, LockScope::PerType);

    let err = cache.acquire(T).await.unwrap_err();
    assert!(err.is_transient());
    assert!(matches!(err, AppError::Counter(CounterError::Transient(_))));
    assert_eq!(cache.pending(T).await.unwrap(), 0);

    assert_eq!(cache.acquire(T).await.unwrap(), 10_000);
    assert_eq!(cache.pending(T).await.unwrap(), 4);
    assert_eq!(counter.calls(), 2);
}

#[tokio::test]
async fn test_protocol_error_is_surfaced() {
    let counter = Arc::new(ScriptedCounter::with_replies(vec![Err(
        CounterError::Protocol("WRONGTYPE".to_string()),
    )]));
    let cache = cache(counter, DrawPolicy::Random, LockScope::Global);

    let err = cache.acquire(T).await.unwrap_err();
    assert!(!err.is_transient());
    assert!(matches!(err, AppError::Counter(CounterError::Protocol(_))));
    assert_eq!(cache.pending(T).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unregistered_type_never_reserves() {
    let counter = Arc::new(ScriptedCounter::default());
    let cache = cache(Arc::clone(&counter), DrawPolicy::Sequential, LockScope::PerType);

    let result = cache.acquire(IdType::new(2)).await;
    assert!(matches!(result, Err(AppError::NotConfigured(_))));
    assert_eq!(counter.calls(), 0);
}

// ============================================================================
// Concurrency
// ============================================================================

async fn concurrent_empty_pool_reserves_once(scope: LockScope) {
    let counter = Arc::new(
        ScriptedCounter::with_replies(vec![Ok(5)]).slow("1", Duration::from_millis(50)),
    );
    let cache = Arc::new(cache(Arc::clone(&counter), DrawPolicy::Sequential, scope));

    let a = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.acquire(T).await }
    });
    let b = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.acquire(T).await }
    });

    let a = a.await.unwrap().unwrap();
    let b = b.await.unwrap().unwrap();

    assert_ne!(a, b);
    assert_eq!(counter.calls(), 1);
    assert_eq!(cache.pending(T).await.unwrap(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_acquire_reserves_once_per_type_lock() {
    concurrent_empty_pool_reserves_once(LockScope::PerType).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_acquire_reserves_once_global_lock() {
    concurrent_empty_pool_reserves_once(LockScope::Global).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_callers_get_distinct_ids() {
    let mut registry = TypeRegistry::new();
    registry
        .register(T, TypeConfig::new(1, 100_000, 50, DrawPolicy::Random))
        .unwrap();
    let counter = Arc::new(ScriptedCounter::default());
    let cache = Arc::new(AllocationCache::new(registry, Arc::clone(&counter) as _));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let cache = Arc::clone(&cache);
        tasks.push(tokio::spawn(async move {
            let mut ids = Vec::new();
            for _ in 0..250 {
                ids.push(cache.acquire(T).await.unwrap());
            }
            ids
        }));
    }

    let mut seen = HashSet::new();
    for task in tasks {
        for id in task.await.unwrap() {
            assert!(seen.insert(id), "duplicate id {id}");
        }
    }

    assert_eq!(seen.len(), 2000);
    assert_eq!(counter.calls(), 40);
}

async fn other_type_during_slow_refill(scope: LockScope) -> bool {
    let mut registry = registry(DrawPolicy::Sequential);
    registry
        .register(
            IdType::new(2),
            TypeConfig::new(1, 1000, 10, DrawPolicy::Sequential),
        )
        .unwrap();

    let counter = Arc::new(ScriptedCounter::default().slow("1", Duration::from_millis(500)));
    let cache = Arc::new(AllocationCache::with_options(
        registry,
        counter,
        scope,
        Box::new(ThreadRandom),
    ));

    let slow = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.acquire(T).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let fast = tokio::time::timeout(
        Duration::from_millis(200),
        cache.acquire(IdType::new(2)),
    )
    .await;

    slow.await.unwrap().unwrap();
    fast.is_ok()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_per_type_lock_does_not_block_other_types() {
    assert!(other_type_during_slow_refill(LockScope::PerType).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_global_lock_blocks_other_types_during_refill() {
    assert!(!other_type_during_slow_refill(LockScope::Global).await);
}
