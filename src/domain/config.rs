//! Identifier type configuration.
//!
//! A [`TypeConfig`] describes the bounded numeric range an identifier type
//! draws from, how many identifiers one counter reservation covers, and how
//! the next identifier is picked out of the pending pool.

use serde::{Deserialize, Serialize};

/// Identifier namespace.
///
/// Each type owns an independent counter on the counter service, so
/// unrelated entities never share numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdType(u32);

impl IdType {
    /// Create an identifier type from its numeric tag.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric tag of this type.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Name of the counter backing this type on the counter service.
    #[must_use]
    pub fn counter_name(self) -> String {
        self.0.to_string()
    }
}

impl std::fmt::Display for IdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for IdType {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Rule for choosing which pooled identifier is handed out next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawPolicy {
    /// Always take the front of the pool.
    #[default]
    Sequential,
    /// Take a uniformly random element of the pool.
    Random,
}

impl std::fmt::Display for DrawPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Random => write!(f, "random"),
        }
    }
}

/// Configuration for one identifier type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeConfig {
    /// Human-readable label, used only for logging and listings.
    #[serde(default)]
    pub name: String,

    /// First identifier of the range (inclusive, never 0).
    pub range_start: u64,

    /// Last identifier of the range (inclusive).
    pub range_end: u64,

    /// Number of identifiers reserved per counter round-trip.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// How identifiers are drawn from the pool.
    #[serde(default)]
    pub draw: DrawPolicy,
}

const fn default_batch_size() -> u32 {
    100
}

impl TypeConfig {
    /// Create a configuration without a label.
    #[must_use]
    pub const fn new(range_start: u64, range_end: u64, batch_size: u32, draw: DrawPolicy) -> Self {
        Self {
            name: String::new(),
            range_start,
            range_end,
            batch_size,
            draw,
        }
    }

    /// Attach a label.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of distinct identifiers in the range.
    ///
    /// Only meaningful once [`validate`](Self::validate) has passed.
    #[must_use]
    pub const fn span(&self) -> u64 {
        self.range_end - self.range_start + 1
    }

    /// Validate the configuration.
    ///
    /// `0` is reserved so that it can never be mistaken for an allocated
    /// identifier, and a batch larger than the span would repeat values
    /// within a single reservation.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.range_start == 0 {
            return Err("range_start must be at least 1".to_string());
        }
        if self.range_end < self.range_start {
            return Err("range_end cannot be less than range_start".to_string());
        }
        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }
        if u64::from(self.batch_size) > self.span() {
            return Err(format!(
                "batch_size {} exceeds range span {}",
                self.batch_size,
                self.span()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = TypeConfig::new(10_000, 10_099, 5, DrawPolicy::Sequential);
        assert!(config.validate().is_ok());
        assert_eq!(config.span(), 100);
    }

    #[test]
    fn test_single_value_range() {
        let config = TypeConfig::new(7, 7, 1, DrawPolicy::Random);
        assert!(config.validate().is_ok());
        assert_eq!(config.span(), 1);
    }

    #[test]
    fn test_rejects_zero_start() {
        let config = TypeConfig::new(0, 100, 10, DrawPolicy::Sequential);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_range() {
        let config = TypeConfig::new(200, 100, 10, DrawPolicy::Sequential);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_batch() {
        let config = TypeConfig::new(1, 100, 0, DrawPolicy::Sequential);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_batch_larger_than_span() {
        let config = TypeConfig::new(1, 10, 11, DrawPolicy::Sequential);
        let err = config.validate().unwrap_err();
        assert!(err.contains("exceeds range span"));

        let config = TypeConfig::new(1, 10, 10, DrawPolicy::Sequential);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_u64_range() {
        let config = TypeConfig::new(1, u64::MAX, 1000, DrawPolicy::Sequential);
        assert!(config.validate().is_ok());
        assert_eq!(config.span(), u64::MAX);
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: TypeConfig =
            serde_json::from_str(r#"{"range_start": 5, "range_end": 500}"#).unwrap();
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.draw, DrawPolicy::Sequential);
        assert!(config.name.is_empty());

        let config: TypeConfig = serde_json::from_str(
            r#"{"name": "circle", "range_start": 5, "range_end": 500, "draw": "random"}"#,
        )
        .unwrap();
        assert_eq!(config.draw, DrawPolicy::Random);
        assert_eq!(config.name, "circle");
    }

    #[test]
    fn test_id_type_counter_name() {
        assert_eq!(IdType::new(1).counter_name(), "1");
        assert_eq!(IdType::from(42).to_string(), "42");
        assert_eq!(DrawPolicy::Random.to_string(), "random");
    }
}
