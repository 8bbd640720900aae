//! Configuration management module.
//!
//! Supports loading configuration from:
//! - a `.env` file in the working directory
//! - TOML files (config/default.toml, config/{profile}.toml)
//! - Environment variables with `IDPOOL__<SECTION>__<KEY>` pattern

mod counter;
mod server;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::{DrawPolicy, IdType, TypeConfig};
use crate::service::TypeRegistry;

pub use counter::{CounterBackend, CounterConfig, FileCounterConfig, RedisCounterConfig};
pub use server::ServerConfig;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Counter backend configuration.
    #[serde(default)]
    pub counter: CounterConfig,

    /// Allocation cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Registered identifier types.
    #[serde(default = "default_types")]
    pub types: Vec<TypeEntry>,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. `config/default.toml`
    /// 2. `config/{IDPOOL_PROFILE}.toml` (if `IDPOOL_PROFILE` is set)
    /// 3. Environment variables with `IDPOOL__` prefix
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is not an error
        dotenvy::dotenv().ok();

        let profile = std::env::var("IDPOOL_PROFILE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{profile}")).required(false))
            // IDPOOL__SERVER__PORT=8080 -> server.port = 8080
            .add_source(
                Environment::with_prefix("IDPOOL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("server.port cannot be 0".to_string()));
        }

        self.counter.validate()?;

        if self.types.is_empty() {
            return Err(ConfigError::Message(
                "at least one identifier type must be configured".to_string(),
            ));
        }
        TypeRegistry::from_entries(&self.types)
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            counter: CounterConfig::default(),
            cache: CacheConfig::default(),
            types: default_types(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Scope of the lock held while drawing and refilling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockScope {
    /// One lock for all types; a refill blocks every caller.
    Global,
    /// One lock per type; a refill blocks only callers of that type.
    #[default]
    PerType,
}

/// Allocation cache configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
    /// Lock granularity.
    #[serde(default)]
    pub lock_scope: LockScope,

    /// Seed for the random draw policy. Unset uses the thread-local RNG.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

/// One `[[types]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeEntry {
    /// Numeric type tag; also the counter name on the counter service.
    pub id: u32,

    /// Label.
    #[serde(default)]
    pub name: String,

    /// First identifier of the range (inclusive, at least 1).
    pub range_start: u64,

    /// Last identifier of the range (inclusive).
    pub range_end: u64,

    /// Identifiers reserved per counter round-trip.
    pub batch_size: u32,

    /// Draw policy.
    #[serde(default)]
    pub draw: DrawPolicy,
}

impl TypeEntry {
    /// Identifier type of this entry.
    #[must_use]
    pub const fn id_type(&self) -> IdType {
        IdType::new(self.id)
    }

    /// Type configuration of this entry.
    #[must_use]
    pub fn type_config(&self) -> TypeConfig {
        TypeConfig::new(self.range_start, self.range_end, self.batch_size, self.draw)
            .with_name(self.name.clone())
    }
}

fn default_types() -> Vec<TypeEntry> {
    vec![TypeEntry {
        id: 1,
        name: "circle".to_string(),
        range_start: 10_000,
        range_end: 0x7fff_ffff,
        batch_size: 100,
        draw: DrawPolicy::Random,
    }]
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "text" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Install the Prometheus recorder and serve it at `/metrics`.
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

const fn default_metrics_enabled() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}
