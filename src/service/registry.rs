//! Identifier type registry.
//!
//! Registration happens once, at startup, through `&mut self`. After the
//! registry is handed to the allocation cache it is only ever read, so
//! lookups need no locking.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::TypeEntry;
use crate::domain::{IdType, TypeConfig};
use crate::error::{AppError, Result};

/// Per-type configuration table.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<IdType, TypeConfig>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the `[[types]]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns the first registration failure.
    pub fn from_entries(entries: &[TypeEntry]) -> Result<Self> {
        let mut registry = Self::new();
        for entry in entries {
            registry.register(entry.id_type(), entry.type_config())?;
        }
        Ok(registry)
    }

    /// Register a type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration is malformed, or
    /// `ConfigExists` if the type is already registered.
    pub fn register(&mut self, id_type: IdType, config: TypeConfig) -> Result<()> {
        config
            .validate()
            .map_err(|e| AppError::InvalidConfig(format!("type {id_type}: {e}")))?;

        if self.types.contains_key(&id_type) {
            return Err(AppError::ConfigExists(id_type));
        }

        debug!(
            id_type = %id_type,
            name = %config.name,
            range_start = config.range_start,
            range_end = config.range_end,
            batch_size = config.batch_size,
            draw = %config.draw,
            "Registered identifier type"
        );

        self.types.insert(id_type, config);
        Ok(())
    }

    /// Look up a type's configuration.
    #[must_use]
    pub fn lookup(&self, id_type: IdType) -> Option<&TypeConfig> {
        self.types.get(&id_type)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate registered types in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (IdType, &TypeConfig)> {
        self.types.iter().map(|(id_type, config)| (*id_type, config))
    }
}
