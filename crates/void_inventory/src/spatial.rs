//! Spatial management
//!
//! A [`SpatialContainer`] stores the stacks of one container position. How
//! positions are validated, allocated and canonicalized is delegated to a
//! [`SpatialLayout`]; the [`SpatialManager`] owns one container per
//! container position, creating them on first write and discarding them when
//! they become empty.

use crate::error::{InventoryError, Result};
use crate::inventory::InventoryId;
use crate::positioning::ContainerPosition;
use crate::stack::Stack;
use crate::strategy::StrategyKind;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Position of a stack inside a container
pub type StackPosition = usize;

/// Result of validating a stack position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionValidity {
    Valid,
    /// Not a position this layout understands
    InvalidValue,
    /// Outside the layout's bounds
    OutOfBounds,
}

/// A container inside a particular inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerRef {
    pub inventory: InventoryId,
    pub position: ContainerPosition,
}

/// Where a stack is stored
///
/// Only containers set this, on occupy and release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedPosition {
    /// Canonical stack position
    pub position: StackPosition,
    /// Spatial capability used for the placement
    pub capability: StrategyKind,
    /// Owning container
    pub container: ContainerRef,
}

/// Layout hooks of a spatial container
pub trait SpatialLayout: fmt::Debug + Send + Sync {
    /// Validate a position for a stack
    fn validate(&self, position: StackPosition, stack: &Stack) -> PositionValidity;

    /// Whether a valid position can take the stack
    fn is_available(&self, position: StackPosition, stack: &Stack) -> bool;

    /// First free position for the stack
    fn first_free(&self, stack: &Stack) -> Option<StackPosition>;

    /// Mark the stack's footprint as occupied
    fn occupy(&mut self, position: StackPosition, stack: &Stack);

    /// Free the stack's footprint
    fn release(&mut self, position: StackPosition, stack: &Stack);

    /// Canonical position covering `position`, if occupied
    fn search(&self, position: StackPosition) -> Option<StackPosition>;

    /// Every occupied canonical position
    fn positions(&self, reverse: bool) -> Vec<StackPosition>;
}

/// Linear index layout
///
/// Occupancy is a sparse set of indices, so any index is storable without
/// allocating the gap below it.
#[derive(Debug, Clone, Default)]
pub struct IndexedLayout {
    occupied: BTreeSet<StackPosition>,
    size: Option<usize>,
}

impl IndexedLayout {
    /// Layout without an upper bound
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Layout holding indices `0..size` (at least one)
    pub fn bounded(size: usize) -> Self {
        Self {
            occupied: BTreeSet::new(),
            size: Some(size.max(1)),
        }
    }

    /// Upper bound, if any
    pub fn size(&self) -> Option<usize> {
        self.size
    }

    /// Highest occupied index
    pub fn highest(&self) -> Option<StackPosition> {
        self.occupied.last().copied()
    }
}

impl SpatialLayout for IndexedLayout {
    fn validate(&self, position: StackPosition, _stack: &Stack) -> PositionValidity {
        match self.size {
            Some(size) if position >= size => PositionValidity::OutOfBounds,
            _ => PositionValidity::Valid,
        }
    }

    fn is_available(&self, position: StackPosition, _stack: &Stack) -> bool {
        !self.occupied.contains(&position)
    }

    fn first_free(&self, _stack: &Stack) -> Option<StackPosition> {
        // First index where the sorted occupancy stops counting up from 0
        let mut next = 0usize;
        for &position in &self.occupied {
            if position != next {
                break;
            }
            next = next.checked_add(1)?;
        }
        match self.size {
            Some(size) if next >= size => None,
            _ => Some(next),
        }
    }

    fn occupy(&mut self, position: StackPosition, _stack: &Stack) {
        self.occupied.insert(position);
    }

    fn release(&mut self, position: StackPosition, _stack: &Stack) {
        self.occupied.remove(&position);
    }

    fn search(&self, position: StackPosition) -> Option<StackPosition> {
        self.occupied.get(&position).copied()
    }

    fn positions(&self, reverse: bool) -> Vec<StackPosition> {
        if reverse {
            self.occupied.iter().rev().copied().collect()
        } else {
            self.occupied.iter().copied().collect()
        }
    }
}

/// Layout with no positions at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLayout;

impl SpatialLayout for NullLayout {
    fn validate(&self, _position: StackPosition, _stack: &Stack) -> PositionValidity {
        PositionValidity::OutOfBounds
    }

    fn is_available(&self, _position: StackPosition, _stack: &Stack) -> bool {
        false
    }

    fn first_free(&self, _stack: &Stack) -> Option<StackPosition> {
        None
    }

    fn occupy(&mut self, _position: StackPosition, _stack: &Stack) {}

    fn release(&mut self, _position: StackPosition, _stack: &Stack) {}

    fn search(&self, _position: StackPosition) -> Option<StackPosition> {
        None
    }

    fn positions(&self, _reverse: bool) -> Vec<StackPosition> {
        Vec::new()
    }
}

/// Outcome of placing a stack
#[derive(Debug)]
pub enum Placement {
    /// Stored at this canonical position
    Placed(StackPosition),
    /// No room; the stack is handed back
    Rejected(Stack),
}

/// Stacks of one container position
#[derive(Debug)]
pub struct SpatialContainer {
    owner: ContainerRef,
    capability: StrategyKind,
    layout: Box<dyn SpatialLayout>,
    stacks: HashMap<StackPosition, Stack>,
}

impl SpatialContainer {
    /// Create an empty container
    pub fn new(owner: ContainerRef, capability: StrategyKind, layout: Box<dyn SpatialLayout>) -> Self {
        Self {
            owner,
            capability,
            layout,
            stacks: HashMap::new(),
        }
    }

    /// Container identity
    pub fn owner(&self) -> ContainerRef {
        self.owner
    }

    /// Number of resident stacks
    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    /// Check if no stack is resident
    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// First free position for `stack`
    pub fn first_free(&self, stack: &Stack) -> Option<StackPosition> {
        self.layout.first_free(stack)
    }

    /// Canonical position covering `position`
    pub fn search(&self, position: StackPosition) -> Option<StackPosition> {
        self.layout.search(position)
    }

    /// Stack covering `position`
    pub fn get(&self, position: StackPosition) -> Option<&Stack> {
        self.stacks.get(&self.search(position)?)
    }

    /// Stack covering `position` (mutable)
    pub fn get_mut(&mut self, position: StackPosition) -> Option<&mut Stack> {
        let canonical = self.search(position)?;
        self.stacks.get_mut(&canonical)
    }

    /// Resident `(position, stack)` pairs in layout order
    pub fn stack_pairs(&self, reverse: bool) -> impl Iterator<Item = (StackPosition, &Stack)> + '_ {
        self.layout
            .positions(reverse)
            .into_iter()
            .filter_map(move |position| self.stacks.get(&position).map(|stack| (position, stack)))
    }

    /// Place a detached stack at `position`, or at the first free one
    pub fn put(&mut self, position: Option<StackPosition>, mut stack: Stack) -> Result<Placement> {
        let position = match position {
            Some(position) => {
                let validity = self.layout.validate(position, &stack);
                if validity != PositionValidity::Valid {
                    return Err(InventoryError::InvalidStackPosition { position, validity });
                }
                position
            }
            None => match self.layout.first_free(&stack) {
                Some(position) => position,
                None => return Ok(Placement::Rejected(stack)),
            },
        };

        if !self.layout.is_available(position, &stack) {
            return Ok(Placement::Rejected(stack));
        }

        self.layout.occupy(position, &stack);
        stack.set_position(Some(self.qualify(position)));
        self.stacks.insert(position, stack);
        Ok(Placement::Placed(position))
    }

    /// Move a resident stack to another position
    ///
    /// Returns the new canonical position, or `None` when the stack is not
    /// found or the target is unavailable.
    pub fn relocate(&mut self, from: StackPosition, to: StackPosition) -> Result<Option<StackPosition>> {
        let Some(from) = self.search(from) else {
            return Ok(None);
        };
        let Some(stack) = self.stacks.get(&from) else {
            return Ok(None);
        };

        let validity = self.layout.validate(to, stack);
        if validity != PositionValidity::Valid {
            return Err(InventoryError::InvalidStackPosition {
                position: to,
                validity,
            });
        }
        if !self.layout.is_available(to, stack) {
            return Ok(None);
        }

        let Some(mut stack) = self.stacks.remove(&from) else {
            return Ok(None);
        };
        self.layout.release(from, &stack);
        self.layout.occupy(to, &stack);
        stack.set_position(Some(self.qualify(to)));
        self.stacks.insert(to, stack);
        Ok(Some(to))
    }

    /// Detach the stack covering `position`
    pub fn remove(&mut self, position: StackPosition) -> Option<(StackPosition, Stack)> {
        let canonical = self.search(position)?;
        let mut stack = self.stacks.remove(&canonical)?;
        self.layout.release(canonical, &stack);
        stack.set_position(None);
        Some((canonical, stack))
    }

    fn qualify(&self, position: StackPosition) -> QualifiedPosition {
        QualifiedPosition {
            position,
            capability: self.capability,
            container: self.owner,
        }
    }
}

/// Creates the layout for each container of an inventory
pub trait SpatialStrategy: fmt::Debug + Send + Sync {
    /// Spatial capability items need to be placed by this strategy
    fn counterpart(&self) -> StrategyKind;

    /// Layout for a freshly created container
    fn create_layout(&self, container: ContainerPosition) -> Box<dyn SpatialLayout>;
}

/// Index containers, bounded or not
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexedSpatialStrategy {
    size: usize,
}

impl IndexedSpatialStrategy {
    /// Containers without an upper bound
    pub fn unbounded() -> Self {
        Self { size: 0 }
    }

    /// Containers holding `size` stacks (at least one)
    pub fn bounded(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    /// Create from a size where 0 means unbounded
    pub fn with_size(size: usize) -> Self {
        Self { size }
    }

    /// Container size, 0 when unbounded
    pub fn size(&self) -> usize {
        self.size
    }
}

impl SpatialStrategy for IndexedSpatialStrategy {
    fn counterpart(&self) -> StrategyKind {
        StrategyKind::INDEXED
    }

    fn create_layout(&self, _container: ContainerPosition) -> Box<dyn SpatialLayout> {
        if self.size == 0 {
            Box::new(IndexedLayout::unbounded())
        } else {
            Box::new(IndexedLayout::bounded(self.size))
        }
    }
}

/// Owns the containers of one inventory
#[derive(Debug)]
pub struct SpatialManager {
    inventory: InventoryId,
    strategy: Box<dyn SpatialStrategy>,
    containers: BTreeMap<ContainerPosition, SpatialContainer>,
    null: SpatialContainer,
}

impl SpatialManager {
    /// Create a manager for `inventory`
    pub fn new(inventory: InventoryId, strategy: Box<dyn SpatialStrategy>) -> Self {
        let null = SpatialContainer::new(
            ContainerRef {
                inventory,
                position: ContainerPosition::SINGLE,
            },
            strategy.counterpart(),
            Box::new(NullLayout),
        );
        Self {
            inventory,
            strategy,
            containers: BTreeMap::new(),
            null,
        }
    }

    /// The spatial strategy
    pub fn strategy(&self) -> &dyn SpatialStrategy {
        self.strategy.as_ref()
    }

    /// Container at `position`, or an empty stand-in
    pub fn container(&self, position: ContainerPosition) -> &SpatialContainer {
        self.containers.get(&position).unwrap_or(&self.null)
    }

    /// Container positions that currently hold stacks
    pub fn occupied_containers(&self) -> impl Iterator<Item = ContainerPosition> + '_ {
        self.containers.keys().copied()
    }

    /// Stack at `(container, position)`
    pub fn find(&self, container: ContainerPosition, position: StackPosition) -> Option<&Stack> {
        self.container(container).get(position)
    }

    /// Stack at `(container, position)` (mutable)
    pub fn find_mut(
        &mut self,
        container: ContainerPosition,
        position: StackPosition,
    ) -> Option<&mut Stack> {
        self.containers.get_mut(&container)?.get_mut(position)
    }

    /// Place a stack, creating the container on demand
    pub fn put(
        &mut self,
        container: ContainerPosition,
        position: Option<StackPosition>,
        stack: Stack,
    ) -> Result<Placement> {
        let capability = self.strategy.counterpart();
        if !stack.item().has_spatial_capability(capability) {
            return Err(InventoryError::MissingSpatialCapability {
                item: stack.item().name().to_string(),
                expected: capability,
            });
        }

        let inventory = self.inventory;
        let strategy = &self.strategy;
        let target = self.containers.entry(container).or_insert_with(|| {
            SpatialContainer::new(
                ContainerRef {
                    inventory,
                    position: container,
                },
                capability,
                strategy.create_layout(container),
            )
        });
        let result = target.put(position, stack);
        self.discard_if_empty(container);
        result
    }

    /// Move a resident stack inside its container
    pub fn relocate(
        &mut self,
        container: ContainerPosition,
        from: StackPosition,
        to: StackPosition,
    ) -> Result<Option<StackPosition>> {
        match self.containers.get_mut(&container) {
            Some(target) => target.relocate(from, to),
            None => Ok(None),
        }
    }

    /// Detach a stack, discarding the container once it is empty
    pub fn remove(
        &mut self,
        container: ContainerPosition,
        position: StackPosition,
    ) -> Option<(StackPosition, Stack)> {
        let removed = self.containers.get_mut(&container)?.remove(position);
        self.discard_if_empty(container);
        removed
    }

    /// Drop every container
    pub fn clear(&mut self) {
        self.containers.clear();
    }

    fn discard_if_empty(&mut self, container: ContainerPosition) {
        if self
            .containers
            .get(&container)
            .map(SpatialContainer::is_empty)
            .unwrap_or(false)
        {
            self.containers.remove(&container);
        }
    }
}
