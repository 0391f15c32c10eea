//! Serialized inventory form
//!
//! The Import/Export boundary: container position -> stack position ->
//! `(registry key, item key, quantity, usage state)`. Items are referenced by
//! key, never by live reference.

use crate::error::SerializationError;
use crate::positioning::ContainerPosition;
use crate::quantity::Quantity;
use crate::spatial::StackPosition;
use crate::usage::UsageState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Encoding of a serialized inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerializedFormat {
    /// JSON (human readable)
    Json,
    /// Binary (compact)
    Binary,
}

impl Default for SerializedFormat {
    fn default() -> Self {
        Self::Binary
    }
}

/// One exported stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedStack {
    /// Registry the item belongs to
    pub registry: String,
    /// Item key inside the registry
    pub item: u32,
    pub quantity: Quantity,
    /// Main usage strategy export
    pub usage_state: UsageState,
}

impl SerializedStack {
    /// Create a serialized stack
    pub fn new(registry: impl Into<String>, item: u32, quantity: Quantity, usage_state: UsageState) -> Self {
        Self {
            registry: registry.into(),
            item,
            quantity,
            usage_state,
        }
    }
}

/// Stacks of one container, by position
pub type SerializedContainer = BTreeMap<StackPosition, SerializedStack>;

/// Exported inventory
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializedInventory {
    containers: BTreeMap<ContainerPosition, SerializedContainer>,
}

impl SerializedInventory {
    /// Create an empty serialized inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a container entry exists, even if empty
    pub fn container_mut(&mut self, container: ContainerPosition) -> &mut SerializedContainer {
        self.containers.entry(container).or_default()
    }

    /// Add a stack entry
    pub fn insert(&mut self, container: ContainerPosition, position: StackPosition, stack: SerializedStack) {
        self.container_mut(container).insert(position, stack);
    }

    /// Get a stack entry
    pub fn get(&self, container: ContainerPosition, position: StackPosition) -> Option<&SerializedStack> {
        self.containers.get(&container)?.get(&position)
    }

    /// Get a container's entries
    pub fn container(&self, container: ContainerPosition) -> Option<&SerializedContainer> {
        self.containers.get(&container)
    }

    /// Containers in position order
    pub fn containers(&self) -> impl Iterator<Item = (ContainerPosition, &SerializedContainer)> {
        self.containers.iter().map(|(position, stacks)| (*position, stacks))
    }

    /// Total number of stack entries
    pub fn len(&self) -> usize {
        self.containers.values().map(BTreeMap::len).sum()
    }

    /// Check if there is no stack entry
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode
    pub fn to_bytes(&self, format: SerializedFormat) -> Result<Vec<u8>, SerializationError> {
        match format {
            SerializedFormat::Json => serde_json::to_vec_pretty(self)
                .map_err(|e| SerializationError::Serialization(e.to_string())),
            SerializedFormat::Binary => {
                bincode::serialize(self).map_err(|e| SerializationError::Serialization(e.to_string()))
            }
        }
    }

    /// Decode
    pub fn from_bytes(data: &[u8], format: SerializedFormat) -> Result<Self, SerializationError> {
        match format {
            SerializedFormat::Json => serde_json::from_slice(data)
                .map_err(|e| SerializationError::Deserialization(e.to_string())),
            SerializedFormat::Binary => bincode::deserialize(data)
                .map_err(|e| SerializationError::Deserialization(e.to_string())),
        }
    }
}
