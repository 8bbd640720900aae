//! Counter backend configuration.

use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;

/// Counter backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterBackend {
    /// Process-local counters (tests and throwaway runs).
    Memory,
    /// JSON files guarded by file locks (development/single-node).
    #[default]
    File,
    /// Redis hash counters (shared across processes and hosts).
    Redis,
}

impl std::fmt::Display for CounterBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::File => write!(f, "file"),
            Self::Redis => write!(f, "redis"),
        }
    }
}

/// Counter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CounterConfig {
    /// Counter backend type.
    #[serde(default)]
    pub backend: CounterBackend,

    /// File backend configuration.
    #[serde(default)]
    pub file: FileCounterConfig,

    /// Redis backend configuration.
    #[serde(default)]
    pub redis: RedisCounterConfig,
}

impl CounterConfig {
    /// Validate the counter configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing for the selected backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            CounterBackend::Memory | CounterBackend::File => Ok(()),
            CounterBackend::Redis => {
                if self.redis.url.is_empty() {
                    return Err(ConfigError::Message(
                        "counter.redis.url cannot be empty".to_string(),
                    ));
                }
                if self.redis.hash_key.is_empty() {
                    return Err(ConfigError::Message(
                        "counter.redis.hash_key cannot be empty".to_string(),
                    ));
                }
                if self.redis.pool_size == 0 {
                    return Err(ConfigError::Message(
                        "counter.redis.pool_size cannot be 0".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// File backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FileCounterConfig {
    /// Directory holding one state file per counter.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data/counters")
}

impl Default for FileCounterConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Redis backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisCounterConfig {
    /// Redis URL.
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Hash holding one field per identifier type.
    #[serde(default = "default_hash_key")]
    pub hash_key: String,

    /// Connection pool size.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Connection and checkout timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_hash_key() -> String {
    "universal_unique_id".to_string()
}

const fn default_pool_size() -> usize {
    3
}

const fn default_connect_timeout() -> u64 {
    5
}

impl Default for RedisCounterConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            hash_key: default_hash_key(),
            pool_size: default_pool_size(),
            connect_timeout: default_connect_timeout(),
        }
    }
}
