//! Counter backend factory.
//!
//! Creates the appropriate counter backend based on configuration.

use std::sync::Arc;

use crate::config::{CounterBackend, CounterConfig};
use crate::counter::traits::CounterClient;
use crate::counter::{FileCounter, MemoryCounter, RedisCounter};
use crate::error::AppError;

/// Create a counter backend based on configuration.
///
/// The Redis backend is not probed here: a counter service that is down at
/// startup only fails the refills that need it, and `/ready` reports it.
///
/// # Errors
///
/// Returns an error if the backend cannot be initialized.
pub async fn create_counter(config: &CounterConfig) -> Result<Arc<dyn CounterClient>, AppError> {
    match config.backend {
        CounterBackend::Memory => Ok(Arc::new(MemoryCounter::new())),
        CounterBackend::File => {
            let counter = FileCounter::new(&config.file)?;

            // Verify the directory is usable
            counter.health_check().await?;

            Ok(Arc::new(counter))
        }
        CounterBackend::Redis => Ok(Arc::new(RedisCounter::new(&config.redis)?)),
    }
}
