//! Error types for the inventory engine

use crate::positioning::ContainerPosition;
use crate::spatial::{PositionValidity, StackPosition};
use crate::strategy::{StrategyCategory, StrategyKind};
use thiserror::Error;

/// Errors raised while validating item and inventory definitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// Strategies of one category depend on each other in a loop
    #[error("cyclic {category} strategy dependency involving {kinds:?}")]
    CyclicStrategyDependency {
        category: StrategyCategory,
        kinds: Vec<StrategyKind>,
    },
    /// Two strategies of the same kind were declared in one category
    #[error("duplicate {category} strategy `{kind}`")]
    DuplicateStrategyType {
        category: StrategyCategory,
        kind: StrategyKind,
    },
    /// The same spatial capability was declared twice
    #[error("duplicate spatial capability `{0}`")]
    DuplicateSpatialCapability(StrategyKind),
    /// A strategy requires another strategy that is not declared
    #[error("{dependent} requires {category} strategy `{required}` which is not declared")]
    MissingDependency {
        dependent: StrategyKind,
        category: StrategyCategory,
        required: StrategyKind,
    },
    /// The main strategy is not part of its category's list
    #[error("main {category} strategy `{kind}` is not declared")]
    InvalidMainStrategy {
        category: StrategyCategory,
        kind: StrategyKind,
    },
}

/// Quantity algebra errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// A quantity of the wrong representation was handed to a quantity kind
    #[error("invalid quantity kind: expected {expected}, found {found}")]
    InvalidQuantityKind {
        expected: &'static str,
        found: &'static str,
    },
}

/// Failures reported by usage strategies
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// The strategy refused to act on the stack
    #[error("usage rejected: {0}")]
    Rejected(String),
    /// The interaction started but could not finish
    #[error("usage failed: {0}")]
    Failed(String),
}

/// Serialized form encoding errors
#[derive(Debug, Error)]
pub enum SerializationError {
    /// Encoding failed
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Decoding failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Inventory operation errors
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Quantity representation does not match the item's quantity kind
    #[error(transparent)]
    InvalidQuantityKind(#[from] QuantityError),
    /// The positioning strategy does not know this container position
    #[error("invalid container position {0}")]
    InvalidContainerPosition(ContainerPosition),
    /// The spatial container refused an explicit stack position
    #[error("invalid stack position {position}: {validity:?}")]
    InvalidStackPosition {
        position: StackPosition,
        validity: PositionValidity,
    },
    /// The stack's quantity is not allowed or is empty
    #[error("stack rejected: invalid quantity")]
    InvalidQuantity,
    /// The inventory's main usage strategy does not accept the stack
    #[error("stack rejected: incompatible usage strategy")]
    IncompatibleUsageStrategy,
    /// The item has no capability for this inventory's spatial strategy
    #[error("item `{item}` lacks the `{expected}` spatial capability")]
    MissingSpatialCapability {
        item: String,
        expected: StrategyKind,
    },
    /// Another use is still in flight on this inventory
    #[error("a usage is already in progress")]
    UsageInProgress,
    /// The stack is not resident in this inventory
    #[error("stack is not managed by this inventory")]
    StackNotManagedHere,
    /// A usage strategy failed
    #[error(transparent)]
    Usage(#[from] UsageError),
    /// Invalid item or inventory definition
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Result type for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_error_converts() {
        let err: InventoryError = QuantityError::InvalidQuantityKind {
            expected: "integral",
            found: "unstacked",
        }
        .into();
        assert!(matches!(err, InventoryError::InvalidQuantityKind(_)));
        assert_eq!(
            err.to_string(),
            "invalid quantity kind: expected integral, found unstacked"
        );
    }

    #[test]
    fn test_definition_error_display() {
        let err = DefinitionError::InvalidMainStrategy {
            category: StrategyCategory::Usage,
            kind: StrategyKind::new("durability"),
        };
        assert_eq!(
            err.to_string(),
            "main usage strategy `durability` is not declared"
        );
    }
}
