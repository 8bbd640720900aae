//! Persisted counter state.

use serde::{Deserialize, Serialize};

/// Persistent state of a named counter, as kept by the file backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterState {
    /// Counter name.
    pub name: String,

    /// Value after the most recent increment.
    pub value: u64,

    /// Number of increments applied.
    pub version: u64,

    /// Last update timestamp (milliseconds since epoch).
    pub updated_at: i64,
}

impl CounterState {
    /// Create a counter that has never been incremented.
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            name,
            value: 0,
            version: 0,
            updated_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Add `amount` and return the post-increment value.
    ///
    /// Returns `None` if the counter would overflow.
    pub fn increment(&mut self, amount: u64) -> Option<u64> {
        self.value = self.value.checked_add(amount)?;
        self.version += 1;
        self.updated_at = chrono::Utc::now().timestamp_millis();
        Some(self.value)
    }
}
