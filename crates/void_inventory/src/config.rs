//! Inventory configuration

use crate::error::SerializationError;
use serde::{Deserialize, Serialize};

/// Serializable inventory layout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Number of containers (1 = single container)
    pub containers: u32,
    /// Stacks per container (0 = unbounded)
    pub container_size: usize,
    /// Redistribute into matching stacks when no position is given
    pub optimal_put: bool,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            containers: 1,
            container_size: 0,
            optimal_put: true,
        }
    }
}

impl InventoryConfig {
    /// Create a single unbounded container config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of containers
    pub fn with_containers(mut self, containers: u32) -> Self {
        self.containers = containers;
        self
    }

    /// Set container size
    pub fn with_container_size(mut self, size: usize) -> Self {
        self.container_size = size;
        self
    }

    /// Set optimal put default
    pub fn with_optimal_put(mut self, optimal: bool) -> Self {
        self.optimal_put = optimal;
        self
    }

    /// Load from JSON
    pub fn from_json(json: &str) -> Result<Self, SerializationError> {
        serde_json::from_str(json).map_err(|e| SerializationError::Deserialization(e.to_string()))
    }

    /// Save as JSON
    pub fn to_json(&self) -> Result<String, SerializationError> {
        serde_json::to_string_pretty(self).map_err(|e| SerializationError::Serialization(e.to_string()))
    }
}
