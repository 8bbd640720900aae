//! Application state for Axum handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::AppConfig;
use crate::counter::CounterClient;
use crate::error::Result;
use crate::service::{AllocationCache, TypeRegistry};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Counter backend.
    pub counter: Arc<dyn CounterClient>,
    /// Allocation cache.
    pub cache: Arc<AllocationCache>,
    /// Prometheus handle, when the recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state, registering every configured type.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured type is invalid or duplicated.
    pub fn new(config: &AppConfig, counter: Arc<dyn CounterClient>) -> Result<Self> {
        let registry = TypeRegistry::from_entries(&config.types)?;
        let cache = Arc::new(AllocationCache::from_config(
            registry,
            Arc::clone(&counter),
            &config.cache,
        ));

        Ok(Self {
            counter,
            cache,
            metrics: None,
        })
    }

    /// Attach a Prometheus handle for the `/metrics` endpoint.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
