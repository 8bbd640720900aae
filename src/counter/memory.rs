//! In-process counter backend.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::counter::traits::CounterClient;
use crate::error::{CounterError, CounterResult};

/// Counters held in process memory.
///
/// Values are lost on restart, so identifiers are only unique for the
/// lifetime of this instance.
#[derive(Default)]
pub struct MemoryCounter {
    counters: Mutex<HashMap<String, u64>>,
}

impl MemoryCounter {
    /// Create an empty counter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a counter's current value.
    pub fn set(&self, counter: &str, value: u64) {
        self.counters.lock().insert(counter.to_string(), value);
    }

    /// Current value of a counter (0 if never incremented).
    #[must_use]
    pub fn current(&self, counter: &str) -> u64 {
        self.counters.lock().get(counter).copied().unwrap_or(0)
    }
}

#[async_trait]
impl CounterClient for MemoryCounter {
    async fn reserve(&self, counter: &str, amount: u64) -> CounterResult<u64> {
        let mut counters = self.counters.lock();
        let value = counters.entry(counter.to_string()).or_insert(0);
        *value = value
            .checked_add(amount)
            .ok_or_else(|| CounterError::Protocol(format!("counter '{counter}' overflowed")))?;
        Ok(*value)
    }

    async fn health_check(&self) -> CounterResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
