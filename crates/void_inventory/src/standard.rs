//! Standard inventory
//!
//! A single indexed container whose changes are broadcast to any number of
//! rendering listeners. Newly attached listeners get a full start: they are
//! cleared and then fed every resident stack.

use crate::config::InventoryConfig;
use crate::error::Result;
use crate::inventory::{Inventory, InventoryBuilder, PutOutcome, SplitOutcome};
use crate::positioning::{ContainerPosition, SinglePositioning};
use crate::presentation::{ListenerId, RenderingBroadcaster, RenderingListener};
use crate::quantity::Quantity;
use crate::registry::ItemLookup;
use crate::serialized::SerializedInventory;
use crate::spatial::{IndexedSpatialStrategy, StackPosition};
use crate::stack::Stack;
use crate::usage::UsageArgument;
use parking_lot::Mutex;
use std::sync::Arc;

const SINGLE: ContainerPosition = ContainerPosition::SINGLE;

/// Single-container inventory with rendering listeners
#[derive(Debug)]
pub struct StandardInventory {
    inventory: Inventory,
    broadcaster: Arc<Mutex<RenderingBroadcaster>>,
}

impl StandardInventory {
    /// Create with `size` slots (0 = unbounded)
    pub fn new(size: usize) -> Result<Self> {
        Self::with_builder(
            InventoryBuilder::new().with_spatial(IndexedSpatialStrategy::with_size(size)),
        )
    }

    /// Create from a config; only the first container is used
    pub fn from_config(config: &InventoryConfig) -> Result<Self> {
        Self::with_builder(
            InventoryBuilder::new()
                .with_spatial(IndexedSpatialStrategy::with_size(config.container_size))
                .with_optimal_put(config.optimal_put),
        )
    }

    /// Create from a builder; positioning and rendering are replaced
    pub fn with_builder(builder: InventoryBuilder) -> Result<Self> {
        let broadcaster = Arc::new(Mutex::new(RenderingBroadcaster::new()));
        let inventory = builder
            .with_positioning(SinglePositioning)
            .with_rendering(Arc::clone(&broadcaster))
            .build()?;
        Ok(Self {
            inventory,
            broadcaster,
        })
    }

    /// Underlying inventory
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Underlying inventory (mutable)
    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Attach a listener and bring it up to date
    pub fn add_listener(&mut self, listener: impl RenderingListener + 'static) -> ListenerId {
        let mut broadcaster = self.broadcaster.lock();
        let id = broadcaster.add_listener(listener);
        let stacks = self.inventory.spatial().container(SINGLE).stack_pairs(false);
        broadcaster.replay(id, stacks);
        id
    }

    /// Detach a listener
    pub fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn RenderingListener>> {
        self.broadcaster.lock().remove_listener(id)
    }

    /// Number of attached listeners
    pub fn listener_count(&self) -> usize {
        self.broadcaster.lock().len()
    }

    /// Stack at a slot
    pub fn get(&self, position: StackPosition) -> Option<&Stack> {
        self.inventory.spatial().find(SINGLE, position)
    }

    /// Resident `(slot, stack)` pairs
    pub fn stacks(&self) -> impl Iterator<Item = (StackPosition, &Stack)> + '_ {
        self.inventory.spatial().container(SINGLE).stack_pairs(false)
    }

    /// Number of stacks
    pub fn len(&self) -> usize {
        self.inventory.spatial().container(SINGLE).len()
    }

    /// Check if there is no stack
    pub fn is_empty(&self) -> bool {
        self.inventory.is_empty()
    }

    /// Put a stack, optimally when no slot is given
    pub fn put(&mut self, position: Option<StackPosition>, stack: Stack) -> Result<PutOutcome> {
        self.inventory.put(SINGLE, position, stack, None)
    }

    /// Take part of a stack
    pub fn take(&mut self, position: StackPosition, quantity: Option<Quantity>) -> Result<Option<Stack>> {
        self.inventory.take(SINGLE, position, quantity, false)
    }

    /// Detach a stack
    pub fn remove(&mut self, position: StackPosition) -> Result<Option<Stack>> {
        self.inventory.remove(SINGLE, position)
    }

    /// Move a stack to another slot
    pub fn move_stack(&mut self, from: StackPosition, to: StackPosition) -> Result<Option<StackPosition>> {
        self.inventory.move_stack(SINGLE, from, to)
    }

    /// Split part of a stack into another slot
    pub fn split(
        &mut self,
        position: StackPosition,
        quantity: Quantity,
        destination: Option<StackPosition>,
    ) -> Result<SplitOutcome> {
        self.inventory.split(SINGLE, position, quantity, SINGLE, destination)
    }

    /// Merge the stack at `source` into the stack at `target`
    pub fn merge(&mut self, target: StackPosition, source: StackPosition) -> Result<bool> {
        self.inventory.merge(SINGLE, target, SINGLE, source)
    }

    /// Use the stack at a slot
    pub async fn use_stack(&mut self, position: StackPosition, argument: Option<UsageArgument>) -> Result<bool> {
        self.inventory.use_stack(SINGLE, position, argument).await
    }

    /// Remove every stack
    pub fn clear(&mut self) {
        self.inventory.clear();
    }

    /// Re-emit every slot to the listeners
    pub fn blink(&mut self) {
        self.inventory.blink();
    }

    /// Replace the contents with a serialized inventory
    pub fn import(&mut self, serialized: &SerializedInventory, items: &dyn ItemLookup) -> Result<usize> {
        self.inventory.import(serialized, items)
    }

    /// Export the contents
    pub fn export(&self) -> SerializedInventory {
        self.inventory.export()
    }
}

impl Drop for StandardInventory {
    fn drop(&mut self) {
        self.broadcaster.lock().disconnect_all();
    }
}
