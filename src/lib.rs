//! # IDPool Worker
//!
//! Issues unique numeric identifiers per identifier type, backed by a shared
//! counter service. Each counter round-trip reserves a whole batch, which is
//! served one identifier at a time from an in-process pool.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                            Worker Service                            │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐  ┌──────────────────┐  ┌───────────────────────────┐ │
//! │  │  API Layer │  │ Allocation Cache │  │ Counter (redis/file/mem)  │ │
//! │  │  (Axum)    │→ │ Registry + Range │→ │ atomic increment-and-get  │ │
//! │  └────────────┘  └──────────────────┘  └───────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Library use
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use idpool_worker::counter::MemoryCounter;
//! use idpool_worker::domain::{DrawPolicy, IdType, TypeConfig};
//! use idpool_worker::service::{AllocationCache, TypeRegistry};
//!
//! # async fn demo() -> idpool_worker::error::Result<()> {
//! let mut registry = TypeRegistry::new();
//! registry.register(
//!     IdType::new(1),
//!     TypeConfig::new(10_000, 0x7fff_ffff, 100, DrawPolicy::Random),
//! )?;
//!
//! let cache = AllocationCache::new(registry, Arc::new(MemoryCounter::new()));
//! let id = cache.acquire(IdType::new(1)).await?;
//! assert!(id >= 10_000);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod counter;
pub mod domain;
pub mod error;
pub mod service;

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::api::create_router;
use crate::api::state::AppState;
use crate::config::AppConfig;
use crate::counter::create_counter;

/// Run the IDPool worker service.
///
/// This function:
/// 1. Loads configuration from files and environment
/// 2. Initializes the counter backend
/// 3. Registers identifier types and builds the allocation cache
/// 4. Starts the HTTP server
/// 5. Handles graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded or a type configuration is invalid
/// - The counter backend fails to initialize
/// - HTTP server fails to bind
pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting IDPool Worker"
    );

    let counter = create_counter(&config.counter).await?;
    info!(backend = %config.counter.backend, "Counter backend initialized");

    let mut state = AppState::new(&config, counter)?;
    for (id_type, type_config) in state.cache.registry().iter() {
        info!(
            id_type = %id_type,
            name = %type_config.name,
            range_start = type_config.range_start,
            range_end = type_config.range_end,
            batch_size = type_config.batch_size,
            draw = %type_config.draw,
            "Identifier type registered"
        );
    }

    if config.observability.metrics_enabled {
        let handle = PrometheusBuilder::new().install_recorder()?;
        state = state.with_metrics(handle);
    }

    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize logging based on configuration.
fn init_logging(config: &AppConfig) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.observability.log_format == "json" {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
