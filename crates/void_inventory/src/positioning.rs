//! Positioning strategies
//!
//! A positioning strategy decides which container positions an inventory
//! exposes: a single container, or a fixed range of addressable ones.

use crate::error::{InventoryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a container inside an inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerPosition(pub u32);

impl ContainerPosition {
    /// The only position of a single-container inventory
    pub const SINGLE: Self = Self(0);
}

impl fmt::Display for ContainerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Enumerates and validates container positions
pub trait PositioningStrategy: fmt::Debug + Send + Sync {
    /// Whether the position is legal
    fn is_valid(&self, position: ContainerPosition) -> bool;

    /// Every legal position, in order
    fn positions(&self) -> Vec<ContainerPosition>;

    /// Fail with `InvalidContainerPosition` unless the position is legal
    fn check(&self, position: ContainerPosition) -> Result<()> {
        if self.is_valid(position) {
            Ok(())
        } else {
            Err(InventoryError::InvalidContainerPosition(position))
        }
    }
}

/// Exactly one container
#[derive(Debug, Clone, Copy, Default)]
pub struct SinglePositioning;

impl PositioningStrategy for SinglePositioning {
    fn is_valid(&self, position: ContainerPosition) -> bool {
        position == ContainerPosition::SINGLE
    }

    fn positions(&self) -> Vec<ContainerPosition> {
        vec![ContainerPosition::SINGLE]
    }
}

/// Containers `0..count`
#[derive(Debug, Clone, Copy)]
pub struct IndexedPositioning {
    count: u32,
}

impl IndexedPositioning {
    /// Create with `count` containers (at least one)
    pub fn new(count: u32) -> Self {
        Self {
            count: count.max(1),
        }
    }

    /// Number of containers
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl PositioningStrategy for IndexedPositioning {
    fn is_valid(&self, position: ContainerPosition) -> bool {
        position.0 < self.count
    }

    fn positions(&self) -> Vec<ContainerPosition> {
        (0..self.count).map(ContainerPosition).collect()
    }
}
