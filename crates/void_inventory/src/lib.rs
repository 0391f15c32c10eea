//! Void Inventory - Strategy-Composed Inventory Engine
//!
//! This crate provides containers that hold quantity-bearing stacks of typed
//! items, composed from pluggable strategies.
//!
//! # Features
//!
//! - Unstacked, integral and fractional quantity algebras with overflow
//! - Items declaring ordered usage and rendering strategies with a main one
//! - Single or indexed container positioning
//! - Indexed spatial containers, bounded or unbounded
//! - Optimal put across matching stacks, split with refund, partial merge
//! - Async usage dispatch with a re-entrancy guard
//! - Rendering notifications and listener broadcasting
//! - JSON and binary import/export keyed by item registry
//!
//! # Example
//!
//! ```ignore
//! use void_inventory::prelude::*;
//!
//! // Define an item
//! let potion = Item::builder("consumables", 1)
//!     .with_name("Potion")
//!     .with_quantity(QuantityKind::integral(10))
//!     .build()?;
//!
//! // Create an inventory with 20 slots
//! let mut inventory = StandardInventory::new(20)?;
//! inventory.put(None, Item::create(&potion, Quantity::Integral(8), None)?)?;
//! inventory.put(None, Item::create(&potion, Quantity::Integral(5), None)?)?;
//! ```

pub mod config;
pub mod dependency;
pub mod dispatch;
pub mod error;
pub mod inventory;
pub mod item;
pub mod positioning;
pub mod presentation;
pub mod quantity;
pub mod registry;
pub mod rendering;
pub mod serialized;
pub mod spatial;
pub mod stack;
pub mod standard;
pub mod strategy;
pub mod usage;

pub mod prelude {
    pub use crate::config::InventoryConfig;
    pub use crate::dependency::Declared;
    pub use crate::dispatch::{
        ConsumingUsage, InventoryUsageStrategy, NullInventoryUsage, PendingUsage, UsageCompletion,
        UsageEffect, UsageRequest,
    };
    pub use crate::error::{
        DefinitionError, InventoryError, QuantityError, Result, SerializationError, UsageError,
    };
    pub use crate::inventory::{Inventory, InventoryBuilder, InventoryId, PutOutcome, SplitOutcome};
    pub use crate::item::{Item, ItemBuilder};
    pub use crate::positioning::{
        ContainerPosition, IndexedPositioning, PositioningStrategy, SinglePositioning,
    };
    pub use crate::presentation::{
        ListenerId, NullRendering, RenderingBroadcaster, RenderingListener, RenderingStrategy,
        SnapshotListener,
    };
    pub use crate::quantity::{Overflow, Quantity, QuantityKind};
    pub use crate::registry::{ItemLookup, ItemRegistry};
    pub use crate::rendering::{
        DurabilityBarRendering, IconTextRendering, ItemRenderingStrategy, RenderingData,
        StackRenderingStrategy, StaticRendering,
    };
    pub use crate::serialized::{
        SerializedContainer, SerializedFormat, SerializedInventory, SerializedStack,
    };
    pub use crate::spatial::{
        ContainerRef, IndexedLayout, IndexedSpatialStrategy, Placement, PositionValidity,
        QualifiedPosition, SpatialContainer, SpatialLayout, SpatialManager, SpatialStrategy,
        StackPosition,
    };
    pub use crate::stack::{MergeResult, Stack, StackId};
    pub use crate::standard::StandardInventory;
    pub use crate::strategy::{Requirement, StrategyCategory, StrategyKind};
    pub use crate::usage::{
        DurabilityUsage, Interpolation, ItemUsageStrategy, NullUsage, StackDurability,
        StackUsageStrategy, UsageArgument, UsageState,
    };
}

pub use prelude::*;
