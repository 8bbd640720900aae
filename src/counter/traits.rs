//! Counter client trait definition.

use async_trait::async_trait;

use crate::error::CounterResult;

/// Atomic increment-and-fetch on named persistent counters.
///
/// Implementations must make `reserve` atomic with respect to every caller
/// sharing the backend, including other processes. Callers never retry; a
/// failure is reported once and the decision to try again belongs to them.
#[async_trait]
pub trait CounterClient: Send + Sync {
    /// Add `amount` to `counter` and return the value after the increment.
    ///
    /// A counter that does not exist yet starts at 0.
    ///
    /// # Errors
    ///
    /// `CounterError::Transient` on connectivity, timeout, or I/O failure;
    /// `CounterError::Protocol` when the reply is not an unsigned integer.
    async fn reserve(&self, counter: &str, amount: u64) -> CounterResult<u64>;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> CounterResult<()>;

    /// Get the backend name.
    fn backend_name(&self) -> &'static str;
}
