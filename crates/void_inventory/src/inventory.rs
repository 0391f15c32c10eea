//! Inventory orchestration
//!
//! [`Inventory`] composes a positioning strategy, a spatial strategy, usage
//! strategies and a rendering collaborator into the public operation set:
//! put, remove, take, split, merge, use, clear, blink, import and export.
//! Every operation validates the container position first and reports the
//! resulting state to the rendering collaborator.

use crate::config::InventoryConfig;
use crate::dependency::{self, Available, Declared};
use crate::dispatch::{
    InventoryUsageStrategy, NullInventoryUsage, PendingUsage, UsageCompletion, UsageEffect,
    UsageGate, UsageRequest,
};
use crate::error::{InventoryError, Result};
use crate::item::Item;
use crate::positioning::{
    ContainerPosition, IndexedPositioning, PositioningStrategy, SinglePositioning,
};
use crate::presentation::{NullRendering, RenderingStrategy};
use crate::quantity::Quantity;
use crate::registry::ItemLookup;
use crate::serialized::{SerializedInventory, SerializedStack};
use crate::spatial::{
    IndexedSpatialStrategy, Placement, SpatialManager, SpatialStrategy, StackPosition,
};
use crate::stack::{MergeResult, Stack};
use crate::strategy::{Requirement, StrategyCategory, StrategyKind};
use crate::usage::UsageArgument;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_INVENTORY_ID: AtomicU64 = AtomicU64::new(1);

/// Unique inventory identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InventoryId(u64);

impl InventoryId {
    pub(crate) fn next() -> Self {
        Self(NEXT_INVENTORY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Outcome of a put
#[derive(Debug)]
pub enum PutOutcome {
    /// Stored at this position
    Placed(StackPosition),
    /// Fully absorbed by matching stacks, no new position
    Absorbed,
    /// No room; the stack is handed back untouched
    Rejected(Stack),
}

impl PutOutcome {
    /// Placed or absorbed
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    /// Position of a placed stack
    pub fn position(&self) -> Option<StackPosition> {
        match self {
            Self::Placed(position) => Some(*position),
            _ => None,
        }
    }
}

/// Outcome of a split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitOutcome {
    /// The split-off part was stored at this position
    Placed(StackPosition),
    /// The split-off part was absorbed by matching stacks
    Absorbed,
    /// Nothing changed
    Failed,
}

/// Builder for [`Inventory`]
#[derive(Debug)]
pub struct InventoryBuilder {
    positioning: Box<dyn PositioningStrategy>,
    spatial: Box<dyn SpatialStrategy>,
    usage: Vec<Declared<Arc<dyn InventoryUsageStrategy>>>,
    main_usage: Option<StrategyKind>,
    rendering: Box<dyn RenderingStrategy>,
    optimal_put: bool,
}

impl Default for InventoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryBuilder {
    /// Single unbounded container, no usage, no rendering
    pub fn new() -> Self {
        Self {
            positioning: Box::new(SinglePositioning),
            spatial: Box::new(IndexedSpatialStrategy::unbounded()),
            usage: Vec::new(),
            main_usage: None,
            rendering: Box::new(NullRendering),
            optimal_put: true,
        }
    }

    /// Builder preset from a config
    pub fn from_config(config: &InventoryConfig) -> Self {
        let builder = if config.containers > 1 {
            Self::new().with_positioning(IndexedPositioning::new(config.containers))
        } else {
            Self::new()
        };
        builder
            .with_spatial(IndexedSpatialStrategy::with_size(config.container_size))
            .with_optimal_put(config.optimal_put)
    }

    /// Set positioning strategy
    pub fn with_positioning(mut self, positioning: impl PositioningStrategy + 'static) -> Self {
        self.positioning = Box::new(positioning);
        self
    }

    /// Set spatial strategy
    pub fn with_spatial(mut self, spatial: impl SpatialStrategy + 'static) -> Self {
        self.spatial = Box::new(spatial);
        self
    }

    /// Declare a usage strategy and its prerequisites
    pub fn with_usage(
        mut self,
        strategy: impl InventoryUsageStrategy + 'static,
        requires: impl IntoIterator<Item = Requirement>,
    ) -> Self {
        let strategy: Arc<dyn InventoryUsageStrategy> = Arc::new(strategy);
        self.usage.push(Declared::new(strategy, requires));
        self
    }

    /// Select the main usage strategy (defaults to the first declared)
    pub fn with_main_usage(mut self, kind: StrategyKind) -> Self {
        self.main_usage = Some(kind);
        self
    }

    /// Set rendering collaborator
    pub fn with_rendering(mut self, rendering: impl RenderingStrategy + 'static) -> Self {
        self.rendering = Box::new(rendering);
        self
    }

    /// Set the optimal put default
    pub fn with_optimal_put(mut self, optimal: bool) -> Self {
        self.optimal_put = optimal;
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<Inventory> {
        let mut usage = self.usage;
        if usage.is_empty() {
            let null: Arc<dyn InventoryUsageStrategy> = Arc::new(NullInventoryUsage);
            usage.push(Declared::new(null, []));
        }
        let main_usage = self.main_usage.unwrap_or_else(|| usage[0].strategy.kind());

        let usage = dependency::flatten(StrategyCategory::Usage, usage, |s| s.kind())?;
        let kinds: Vec<_> = usage.iter().map(|d| d.strategy.kind()).collect();
        let mut available = Available::new();
        available.insert(StrategyCategory::Usage, kinds.iter().copied().collect::<HashSet<_>>());
        available.insert(
            StrategyCategory::Spatial,
            HashSet::from([self.spatial.counterpart()]),
        );
        dependency::check_requirements(StrategyCategory::Usage, &usage, |s| s.kind(), &available)?;
        let main_usage = dependency::main_index(StrategyCategory::Usage, &kinds, main_usage)?;

        let id = InventoryId::next();
        log::debug!("Created inventory {:?}", id);
        Ok(Inventory {
            id,
            positioning: self.positioning,
            spatial: SpatialManager::new(id, self.spatial),
            usage: usage.into_iter().map(|d| d.strategy).collect(),
            main_usage,
            rendering: self.rendering,
            optimal_put: self.optimal_put,
            gate: UsageGate::default(),
        })
    }
}

/// Strategy-composed inventory
#[derive(Debug)]
pub struct Inventory {
    id: InventoryId,
    positioning: Box<dyn PositioningStrategy>,
    spatial: SpatialManager,
    usage: Vec<Arc<dyn InventoryUsageStrategy>>,
    main_usage: usize,
    rendering: Box<dyn RenderingStrategy>,
    optimal_put: bool,
    gate: UsageGate,
}

impl Inventory {
    /// Start building an inventory
    pub fn builder() -> InventoryBuilder {
        InventoryBuilder::new()
    }

    /// Inventory ID
    pub fn id(&self) -> InventoryId {
        self.id
    }

    /// Positioning strategy
    pub fn positioning(&self) -> &dyn PositioningStrategy {
        self.positioning.as_ref()
    }

    /// Spatial manager (read only)
    pub fn spatial(&self) -> &SpatialManager {
        &self.spatial
    }

    /// Main usage strategy
    pub fn main_usage(&self) -> &dyn InventoryUsageStrategy {
        self.usage[self.main_usage].as_ref()
    }

    /// Find a usage strategy by kind
    pub fn usage_strategy(&self, kind: StrategyKind) -> Option<&dyn InventoryUsageStrategy> {
        self.usage
            .iter()
            .find(|s| s.kind() == kind)
            .map(|s| s.as_ref())
    }

    /// Optimal put default
    pub fn optimal_put(&self) -> bool {
        self.optimal_put
    }

    /// Change the optimal put default
    pub fn set_optimal_put(&mut self, optimal: bool) {
        self.optimal_put = optimal;
    }

    /// Whether a usage is in flight
    pub fn is_using(&self) -> bool {
        self.gate.is_busy()
    }

    // ---- Queries ----

    /// Resident `(position, stack)` pairs of a container
    pub fn stack_pairs(
        &self,
        container: ContainerPosition,
        reverse: bool,
    ) -> Result<impl Iterator<Item = (StackPosition, &Stack)> + '_> {
        self.positioning.check(container)?;
        Ok(self.spatial.container(container).stack_pairs(reverse))
    }

    /// Stack covering a position
    pub fn find(&self, container: ContainerPosition, position: StackPosition) -> Result<Option<&Stack>> {
        self.positioning.check(container)?;
        Ok(self.spatial.find(container, position))
    }

    /// Stacks matching a predicate
    pub fn find_all(
        &self,
        container: ContainerPosition,
        predicate: impl Fn(&Stack) -> bool,
    ) -> Result<Vec<(StackPosition, &Stack)>> {
        Ok(self
            .stack_pairs(container, false)?
            .filter(|(_, stack)| predicate(stack))
            .collect())
    }

    /// Stacks of an item
    pub fn find_item(
        &self,
        container: ContainerPosition,
        item: &Arc<Item>,
    ) -> Result<Vec<(StackPosition, &Stack)>> {
        self.find_all(container, |stack| Arc::ptr_eq(stack.item(), item))
    }

    /// First stack matching a predicate
    pub fn find_one(
        &self,
        container: ContainerPosition,
        predicate: impl Fn(&Stack) -> bool,
    ) -> Result<Option<(StackPosition, &Stack)>> {
        Ok(self
            .stack_pairs(container, false)?
            .find(|(_, stack)| predicate(stack)))
    }

    /// First stack in layout order
    pub fn first(&self, container: ContainerPosition) -> Result<Option<(StackPosition, &Stack)>> {
        Ok(self.stack_pairs(container, false)?.next())
    }

    /// Last stack in layout order
    pub fn last(&self, container: ContainerPosition) -> Result<Option<(StackPosition, &Stack)>> {
        Ok(self.stack_pairs(container, true)?.next())
    }

    /// Number of stacks in a container
    pub fn len(&self, container: ContainerPosition) -> Result<usize> {
        self.positioning.check(container)?;
        Ok(self.spatial.container(container).len())
    }

    /// Check if no container holds a stack
    pub fn is_empty(&self) -> bool {
        self.spatial.occupied_containers().next().is_none()
    }

    // ---- Placement ----

    /// Put a detached stack into a container
    ///
    /// Without a position and with optimal put enabled (`optimal`, else the
    /// inventory default) the stack is first redistributed into matching
    /// stacks.
    pub fn put(
        &mut self,
        container: ContainerPosition,
        position: Option<StackPosition>,
        stack: Stack,
        optimal: Option<bool>,
    ) -> Result<PutOutcome> {
        if !stack.has_placeable_quantity()? {
            return Err(InventoryError::InvalidQuantity);
        }
        if !self.main_usage().accepts(stack.main_usage()) {
            return Err(InventoryError::IncompatibleUsageStrategy);
        }
        self.positioning.check(container)?;

        if position.is_none() && optimal.unwrap_or(self.optimal_put) {
            return self.optimal_put_into(container, stack);
        }

        match self.spatial.put(container, position, stack)? {
            Placement::Placed(position) => {
                log::debug!("Placed stack at {}:{}", container, position);
                self.notify_updated(container, position);
                Ok(PutOutcome::Placed(position))
            }
            Placement::Rejected(stack) => Ok(PutOutcome::Rejected(stack)),
        }
    }

    fn optimal_put_into(&mut self, container: ContainerPosition, stack: Stack) -> Result<PutOutcome> {
        let mut remaining = stack.quantity();
        let mut saturating = Vec::new();
        let mut sink = None;

        for (position, candidate) in self.spatial.container(container).stack_pairs(false) {
            if !candidate.matches(&stack) || candidate.is_empty()? {
                continue;
            }
            let overflow = candidate.will_overflow(remaining)?;
            if overflow.overflowed {
                remaining = overflow.left;
                saturating.push(position);
            } else {
                sink = Some(position);
                break;
            }
        }

        if let Some(sink) = sink {
            self.saturate_all(container, &saturating);
            if let Some(target) = self.spatial.find_mut(container, sink) {
                target.change_quantity_by(remaining, false, false)?;
            }
            self.notify_updated(container, sink);
            log::debug!(
                "Absorbed stack into {}:{} ({} stacks saturated)",
                container,
                sink,
                saturating.len()
            );
            return Ok(PutOutcome::Absorbed);
        }

        let remainder = stack.clone_with(remaining)?;
        match self.spatial.put(container, None, remainder)? {
            Placement::Placed(position) => {
                self.saturate_all(container, &saturating);
                self.notify_updated(container, position);
                log::debug!(
                    "Placed remainder {} at {}:{} ({} stacks saturated)",
                    remaining,
                    container,
                    position,
                    saturating.len()
                );
                Ok(PutOutcome::Placed(position))
            }
            Placement::Rejected(_) => Ok(PutOutcome::Rejected(stack)),
        }
    }

    fn saturate_all(&mut self, container: ContainerPosition, positions: &[StackPosition]) {
        for &position in positions {
            if let Some(stack) = self.spatial.find_mut(container, position) {
                stack.saturate();
            }
            self.notify_updated(container, position);
        }
    }

    /// Move a resident stack to another position of its container
    pub fn move_stack(
        &mut self,
        container: ContainerPosition,
        from: StackPosition,
        to: StackPosition,
    ) -> Result<Option<StackPosition>> {
        self.positioning.check(container)?;
        let Some(from) = self.spatial.container(container).search(from) else {
            return Ok(None);
        };
        let moved = self.spatial.relocate(container, from, to)?;
        if let Some(to) = moved {
            log::debug!("Moved stack {}:{} -> {}", container, from, to);
            self.rendering.stack_was_removed(container, from);
            self.notify_updated(container, to);
        }
        Ok(moved)
    }

    /// Detach the stack covering a position
    pub fn remove(&mut self, container: ContainerPosition, position: StackPosition) -> Result<Option<Stack>> {
        self.positioning.check(container)?;
        Ok(self.remove_resident(container, position))
    }

    fn remove_resident(&mut self, container: ContainerPosition, position: StackPosition) -> Option<Stack> {
        let (position, stack) = self.spatial.remove(container, position)?;
        log::debug!("Removed stack at {}:{}", container, position);
        self.rendering.stack_was_removed(container, position);
        Some(stack)
    }

    /// Take part of a stack (all of it when `quantity` is `None`)
    pub fn take(
        &mut self,
        container: ContainerPosition,
        position: StackPosition,
        quantity: Option<Quantity>,
        disallow_empty: bool,
    ) -> Result<Option<Stack>> {
        self.positioning.check(container)?;
        let Some(position) = self.spatial.container(container).search(position) else {
            return Ok(None);
        };
        let Some(source) = self.spatial.find_mut(container, position) else {
            return Ok(None);
        };
        let Some(taken) = source.take(quantity, disallow_empty)? else {
            return Ok(None);
        };
        log::debug!("Took {} from {}:{}", taken.quantity(), container, position);
        self.settle(container, position)?;
        Ok(Some(taken))
    }

    /// Move part of a stack to another position
    ///
    /// When the part cannot be placed it is refunded to the source.
    pub fn split(
        &mut self,
        container: ContainerPosition,
        position: StackPosition,
        quantity: Quantity,
        destination: ContainerPosition,
        destination_position: Option<StackPosition>,
    ) -> Result<SplitOutcome> {
        self.positioning.check(container)?;
        let Some(position) = self.spatial.container(container).search(position) else {
            return Ok(SplitOutcome::Failed);
        };
        let Some(source) = self.spatial.find_mut(container, position) else {
            return Ok(SplitOutcome::Failed);
        };
        let Some(part) = source.take(Some(quantity), false)? else {
            return Ok(SplitOutcome::Failed);
        };

        let outcome = match self.put(destination, destination_position, part, None) {
            Ok(PutOutcome::Placed(placed)) => SplitOutcome::Placed(placed),
            Ok(PutOutcome::Absorbed) => SplitOutcome::Absorbed,
            Ok(PutOutcome::Rejected(part)) => {
                self.refund(container, position, part.quantity())?;
                return Ok(SplitOutcome::Failed);
            }
            Err(err) => {
                self.refund(container, position, quantity)?;
                return Err(err);
            }
        };

        log::debug!("Split {} off {}:{}", quantity, container, position);
        self.settle(container, position)?;
        Ok(outcome)
    }

    fn refund(&mut self, container: ContainerPosition, position: StackPosition, quantity: Quantity) -> Result<()> {
        if let Some(source) = self.spatial.find_mut(container, position) {
            source.change_quantity_by(quantity, false, false)?;
        }
        log::debug!("Refunded {} to {}:{}", quantity, container, position);
        Ok(())
    }

    /// Report a changed stack, removing it if it was emptied
    fn settle(&mut self, container: ContainerPosition, position: StackPosition) -> Result<()> {
        let emptied = match self.spatial.find(container, position) {
            Some(stack) => stack.is_empty()?,
            None => return Ok(()),
        };
        if emptied {
            self.remove_resident(container, position);
        } else {
            self.notify_updated(container, position);
        }
        Ok(())
    }

    /// Merge the stack at `source` into the stack at `target`
    pub fn merge(
        &mut self,
        target: ContainerPosition,
        target_position: StackPosition,
        source: ContainerPosition,
        source_position: StackPosition,
    ) -> Result<bool> {
        self.positioning.check(target)?;
        self.positioning.check(source)?;
        let (Some(target_position), Some(source_position)) = (
            self.spatial.container(target).search(target_position),
            self.spatial.container(source).search(source_position),
        ) else {
            return Ok(false);
        };
        if target == source && target_position == source_position {
            return Ok(false);
        }

        let snapshot = match self.spatial.find(source, source_position) {
            Some(stack) => stack.clone_with(stack.quantity())?,
            None => return Ok(false),
        };
        let Some(destination) = self.spatial.find_mut(target, target_position) else {
            return Ok(false);
        };
        let result = destination.merge(&snapshot)?;
        if result == MergeResult::Denied {
            return Ok(false);
        }

        self.notify_updated(target, target_position);
        self.settle_merge_source(source, source_position, result)?;
        log::debug!(
            "Merged {}:{} into {}:{} ({:?})",
            source,
            source_position,
            target,
            target_position,
            result
        );
        Ok(true)
    }

    /// Merge a stack of `source_inventory` into a stack of `target_inventory`
    pub fn merge_between(
        target_inventory: &mut Inventory,
        target: ContainerPosition,
        target_position: StackPosition,
        source_inventory: &mut Inventory,
        source: ContainerPosition,
        source_position: StackPosition,
    ) -> Result<bool> {
        target_inventory.positioning.check(target)?;
        source_inventory.positioning.check(source)?;
        let (Some(target_position), Some(source_position)) = (
            target_inventory.spatial.container(target).search(target_position),
            source_inventory.spatial.container(source).search(source_position),
        ) else {
            return Ok(false);
        };

        let (Some(destination), Some(source_stack)) = (
            target_inventory.spatial.find_mut(target, target_position),
            source_inventory.spatial.find(source, source_position),
        ) else {
            return Ok(false);
        };
        let result = destination.merge(source_stack)?;
        if result == MergeResult::Denied {
            return Ok(false);
        }

        target_inventory.notify_updated(target, target_position);
        source_inventory.settle_merge_source(source, source_position, result)?;
        log::debug!(
            "Merged {:?} {}:{} into {:?} {}:{} ({:?})",
            source_inventory.id,
            source,
            source_position,
            target_inventory.id,
            target,
            target_position,
            result
        );
        Ok(true)
    }

    fn settle_merge_source(
        &mut self,
        container: ContainerPosition,
        position: StackPosition,
        result: MergeResult,
    ) -> Result<()> {
        match result {
            MergeResult::Total => {
                self.remove_resident(container, position);
            }
            MergeResult::Partial { left } => {
                if let Some(source) = self.spatial.find_mut(container, position) {
                    source.change_quantity_to(left, false)?;
                }
                self.notify_updated(container, position);
            }
            MergeResult::Denied => {}
        }
        Ok(())
    }

    // ---- Usage ----

    /// Start using the stack at a position
    ///
    /// Returns `None` when there is no stack there. The returned future holds
    /// the inventory's usage guard; hand its output to
    /// [`Inventory::complete_use`]. Other operations stay available while it
    /// is pending.
    pub fn begin_use(
        &self,
        container: ContainerPosition,
        position: StackPosition,
        argument: Option<UsageArgument>,
    ) -> Result<Option<PendingUsage>> {
        self.positioning.check(container)?;
        if self.gate.is_busy() {
            return Err(InventoryError::UsageInProgress);
        }
        match self.spatial.find(container, position) {
            Some(stack) => self.begin_use_stack(stack, argument).map(Some),
            None => Ok(None),
        }
    }

    /// Start using a stack by reference
    ///
    /// Fails with `StackNotManagedHere` unless the stack currently sits in
    /// one of this inventory's containers.
    pub fn begin_use_stack(&self, stack: &Stack, argument: Option<UsageArgument>) -> Result<PendingUsage> {
        let qualified = match stack.position() {
            Some(qualified) if qualified.container.inventory == self.id => *qualified,
            _ => return Err(InventoryError::StackNotManagedHere),
        };
        let container = qualified.container.position;
        match self.spatial.find(container, qualified.position) {
            Some(resident) if resident.id() == stack.id() => {}
            _ => return Err(InventoryError::StackNotManagedHere),
        }
        let guard = self.gate.acquire().ok_or(InventoryError::UsageInProgress)?;

        let request = UsageRequest {
            container,
            position: qualified.position,
            stack: stack.id(),
            item: Arc::clone(stack.item()),
            quantity: stack.quantity(),
            state: stack.main_usage().export(),
            argument,
        };
        log::debug!("Using stack {:?} at {}:{}", request.stack, container, request.position);

        let (position, stack_id) = (request.position, request.stack);
        let strategy = Arc::clone(&self.usage[self.main_usage]);
        let future = Box::pin(async move { strategy.use_stack(request).await });
        Ok(PendingUsage::new(container, position, stack_id, future, guard))
    }

    /// Apply the effect of a finished usage
    ///
    /// Returns false when the used stack is gone or the effect no longer
    /// applies.
    pub fn complete_use(&mut self, completion: UsageCompletion) -> Result<bool> {
        let UsageCompletion {
            container,
            position,
            stack,
            result,
        } = completion;
        let effect = result?;

        let located = match self.spatial.find(container, position) {
            Some(found) if found.id() == stack => Some(position),
            _ => self
                .spatial
                .container(container)
                .stack_pairs(false)
                .find(|(_, found)| found.id() == stack)
                .map(|(position, _)| position),
        };
        let Some(position) = located else {
            log::warn!("Used stack {:?} left the inventory before completion", stack);
            return Ok(false);
        };
        log::debug!("Finished using {:?} at {}:{}: {:?}", stack, container, position, effect);

        match effect {
            UsageEffect::Nothing => Ok(true),
            UsageEffect::Consume(quantity) => {
                let Some(target) = self.spatial.find_mut(container, position) else {
                    return Ok(false);
                };
                if target.take(Some(quantity), false)?.is_none() {
                    log::warn!("Could not consume {} from {}:{}", quantity, container, position);
                    return Ok(false);
                }
                self.settle(container, position)?;
                Ok(true)
            }
            UsageEffect::UpdateState(state) => {
                if let Some(target) = self.spatial.find_mut(container, position) {
                    target.main_usage_mut().import(&state);
                }
                self.notify_updated(container, position);
                Ok(true)
            }
        }
    }

    /// Use the stack at a position and apply the effect
    ///
    /// Holds the inventory exclusively until the usage finishes.
    pub async fn use_stack(
        &mut self,
        container: ContainerPosition,
        position: StackPosition,
        argument: Option<UsageArgument>,
    ) -> Result<bool> {
        let Some(pending) = self.begin_use(container, position, argument)? else {
            return Ok(false);
        };
        let completion = pending.await;
        self.complete_use(completion)
    }

    // ---- Bulk ----

    /// Discard every container
    pub fn clear(&mut self) {
        self.spatial.clear();
        self.rendering.everything_was_cleared();
        log::info!("Cleared inventory {:?}", self.id);
    }

    /// Re-emit the state of one position
    pub fn blink_stack(&mut self, container: ContainerPosition, position: StackPosition) -> Result<()> {
        self.positioning.check(container)?;
        match self.spatial.container(container).search(position) {
            Some(canonical) => self.notify_updated(container, canonical),
            None => self.rendering.stack_was_removed(container, position),
        }
        Ok(())
    }

    /// Re-emit the state of one container
    pub fn blink_container(&mut self, container: ContainerPosition) -> Result<()> {
        self.positioning.check(container)?;
        for (position, stack) in self.spatial.container(container).stack_pairs(false) {
            self.rendering.stack_was_updated(container, position, stack);
        }
        Ok(())
    }

    /// Re-emit the state of every container
    pub fn blink(&mut self) {
        for container in self.positioning.positions() {
            for (position, stack) in self.spatial.container(container).stack_pairs(false) {
                self.rendering.stack_was_updated(container, position, stack);
            }
        }
    }

    /// Replace the contents with a serialized inventory
    ///
    /// Every container position is checked before anything is cleared.
    /// Entries that no longer fit (unknown item, quantity rejected by the
    /// item, position invalid or taken) are skipped with a warning. Returns
    /// the number of stacks stored.
    pub fn import(&mut self, serialized: &SerializedInventory, items: &dyn ItemLookup) -> Result<usize> {
        for (container, _) in serialized.containers() {
            self.positioning.check(container)?;
        }
        self.clear();
        let mut imported = 0;

        for (container, stacks) in serialized.containers() {
            for (&position, entry) in stacks {
                let Some(item) = items.resolve(&entry.registry, entry.item) else {
                    log::warn!(
                        "Skipping {}:{}: unknown item {}:{}",
                        container,
                        position,
                        entry.registry,
                        entry.item
                    );
                    continue;
                };
                let stack = match Item::create(&item, entry.quantity, Some(&entry.usage_state)) {
                    Ok(stack) => stack,
                    Err(err) => {
                        log::warn!("Skipping {}:{}: {}", container, position, err);
                        continue;
                    }
                };
                match self.put(container, Some(position), stack, Some(false)) {
                    Ok(PutOutcome::Rejected(_)) => {
                        log::warn!("Skipping {}:{}: position unavailable", container, position)
                    }
                    Ok(_) => imported += 1,
                    Err(err) => log::warn!("Skipping {}:{}: {}", container, position, err),
                }
            }
        }

        log::info!("Imported {} stacks into inventory {:?}", imported, self.id);
        Ok(imported)
    }

    /// Export every container, including empty ones
    pub fn export(&self) -> SerializedInventory {
        let mut serialized = SerializedInventory::new();
        for container in self.positioning.positions() {
            let entries = serialized.container_mut(container);
            for (position, stack) in self.spatial.container(container).stack_pairs(false) {
                let (item, quantity, usage_state) = stack.dump();
                entries.insert(
                    position,
                    SerializedStack::new(item.registry_key(), item.key(), quantity, usage_state),
                );
            }
        }
        serialized
    }

    fn notify_updated(&mut self, container: ContainerPosition, position: StackPosition) {
        if let Some(stack) = self.spatial.find(container, position) {
            self.rendering.stack_was_updated(container, position, stack);
        }
    }
}
