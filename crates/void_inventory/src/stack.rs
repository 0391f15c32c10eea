//! Stacks: live, quantity-bearing instances of an item

use crate::error::QuantityError;
use crate::item::Item;
use crate::quantity::{Overflow, Quantity, QuantityKind};
use crate::rendering::{RenderingData, StackRenderingStrategy};
use crate::spatial::QualifiedPosition;
use crate::strategy::StrategyKind;
use crate::usage::{StackUsageStrategy, UsageState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_STACK_ID: AtomicU64 = AtomicU64::new(1);

/// Unique stack identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StackId(u64);

impl StackId {
    fn next() -> Self {
        Self(NEXT_STACK_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Outcome of merging one stack into another
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MergeResult {
    /// The source was fully absorbed
    Total,
    /// The destination saturated; `left` stays on the source
    Partial { left: Quantity },
    /// Nothing changed
    Denied,
}

/// A live instance of an item
#[derive(Debug)]
pub struct Stack {
    id: StackId,
    item: Arc<Item>,
    quantity: Quantity,
    usage: Vec<Box<dyn StackUsageStrategy>>,
    main_usage: usize,
    rendering: Vec<Box<dyn StackRenderingStrategy>>,
    main_rendering: usize,
    position: Option<QualifiedPosition>,
}

impl Stack {
    pub(crate) fn from_parts(
        item: Arc<Item>,
        quantity: Quantity,
        usage: Vec<Box<dyn StackUsageStrategy>>,
        main_usage: usize,
        rendering: Vec<Box<dyn StackRenderingStrategy>>,
        main_rendering: usize,
    ) -> Self {
        Self {
            id: StackId::next(),
            item,
            quantity,
            usage,
            main_usage,
            rendering,
            main_rendering,
            position: None,
        }
    }

    /// Stack ID
    pub fn id(&self) -> StackId {
        self.id
    }

    /// Item this stack is an instance of
    pub fn item(&self) -> &Arc<Item> {
        &self.item
    }

    /// Current quantity
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Where the stack lives, `None` while detached
    pub fn position(&self) -> Option<&QualifiedPosition> {
        self.position.as_ref()
    }

    pub(crate) fn set_position(&mut self, position: Option<QualifiedPosition>) {
        self.position = position;
    }

    fn kind(&self) -> QuantityKind {
        self.item.quantity_kind()
    }

    /// Usage strategies in dependency order
    pub fn usage_strategies(&self) -> impl Iterator<Item = &dyn StackUsageStrategy> {
        self.usage.iter().map(|s| s.as_ref())
    }

    /// Find a usage strategy by kind
    pub fn usage_strategy(&self, kind: StrategyKind) -> Option<&dyn StackUsageStrategy> {
        self.usage
            .iter()
            .find(|s| s.kind() == kind)
            .map(|s| s.as_ref())
    }

    /// Find a usage strategy by kind (mutable)
    pub fn usage_strategy_mut(&mut self, kind: StrategyKind) -> Option<&mut dyn StackUsageStrategy> {
        self.usage
            .iter_mut()
            .find(|s| s.kind() == kind)
            .map(|s| s.as_mut())
    }

    /// Main usage strategy
    pub fn main_usage(&self) -> &dyn StackUsageStrategy {
        self.usage[self.main_usage].as_ref()
    }

    /// Main usage strategy (mutable)
    pub fn main_usage_mut(&mut self) -> &mut dyn StackUsageStrategy {
        self.usage[self.main_usage].as_mut()
    }

    /// Rendering strategies in dependency order
    pub fn rendering_strategies(&self) -> impl Iterator<Item = &dyn StackRenderingStrategy> {
        self.rendering.iter().map(|s| s.as_ref())
    }

    /// Main rendering strategy
    pub fn main_rendering(&self) -> &dyn StackRenderingStrategy {
        self.rendering[self.main_rendering].as_ref()
    }

    /// Collect presentation data from every rendering strategy
    pub fn rendering_data(&self) -> RenderingData {
        let mut data = RenderingData::new();
        for strategy in &self.rendering {
            strategy.dump(self, &mut data);
        }
        data
    }

    /// Check for the empty quantity
    pub fn is_empty(&self) -> Result<bool, QuantityError> {
        self.kind().is_empty(self.quantity)
    }

    /// Check for the saturation point
    pub fn is_full(&self) -> Result<bool, QuantityError> {
        self.kind().is_full(self.quantity)
    }

    /// Quantity is allowed and not empty
    pub fn has_placeable_quantity(&self) -> Result<bool, QuantityError> {
        let kind = self.kind();
        Ok(kind.is_allowed(self.quantity)? && !kind.is_empty(self.quantity)?)
    }

    /// Compute what adding `candidate` would do
    pub fn will_overflow(&self, candidate: Quantity) -> Result<Overflow, QuantityError> {
        self.kind().will_overflow(self.quantity, candidate)
    }

    /// Set quantity to the maximum, false when unbounded
    pub fn saturate(&mut self) -> bool {
        match self.kind().saturation() {
            Some(full) => {
                self.quantity = full;
                true
            }
            None => false,
        }
    }

    /// Set quantity if allowed (and not empty when `disallow_empty`)
    pub fn change_quantity_to(
        &mut self,
        quantity: Quantity,
        disallow_empty: bool,
    ) -> Result<bool, QuantityError> {
        let kind = self.kind();
        if !kind.is_allowed(quantity)? || (disallow_empty && kind.is_empty(quantity)?) {
            return Ok(false);
        }
        self.quantity = quantity;
        Ok(true)
    }

    /// Add or subtract `delta` if the result is allowed
    pub fn change_quantity_by(
        &mut self,
        delta: Quantity,
        subtract: bool,
        disallow_empty: bool,
    ) -> Result<bool, QuantityError> {
        let kind = self.kind();
        let quantity = if subtract {
            kind.sub(self.quantity, delta)?
        } else {
            kind.add(self.quantity, delta)?
        };
        self.change_quantity_to(quantity, disallow_empty)
    }

    /// Same item and interchangeable usage state
    pub fn matches(&self, other: &Stack) -> bool {
        self.same_item(other)
            && self.usage.len() == other.usage.len()
            && self
                .usage
                .iter()
                .zip(&other.usage)
                .all(|(a, b)| a.equals(b.as_ref()))
    }

    /// Same item definition
    pub fn same_item(&self, other: &Stack) -> bool {
        Arc::ptr_eq(&self.item, &other.item)
    }

    /// Deep copy with a new quantity, detached
    pub fn clone_with(&self, quantity: Quantity) -> Result<Stack, QuantityError> {
        self.kind().check(quantity)?;
        Ok(Stack {
            id: StackId::next(),
            item: Arc::clone(&self.item),
            quantity,
            usage: self.usage.iter().map(|s| s.clone_box()).collect(),
            main_usage: self.main_usage,
            rendering: self.rendering.iter().map(|s| s.clone_box()).collect(),
            main_rendering: self.main_rendering,
            position: None,
        })
    }

    /// Split off `quantity` (everything when `None`) into a new stack
    ///
    /// Returns `None` and leaves the stack untouched when the amount is out
    /// of bounds, or when it would empty the stack and `disallow_empty` is set.
    pub fn take(
        &mut self,
        quantity: Option<Quantity>,
        disallow_empty: bool,
    ) -> Result<Option<Stack>, QuantityError> {
        let quantity = match quantity {
            Some(quantity) => quantity,
            None if disallow_empty => return Ok(None),
            None => self.quantity,
        };

        let kind = self.kind();
        kind.check(quantity)?;
        if self.is_empty()? || !kind.is_allowed(quantity)? || kind.is_empty(quantity)? {
            return Ok(None);
        }
        if !self.change_quantity_by(quantity, true, disallow_empty)? {
            return Ok(None);
        }
        self.clone_with(quantity).map(Some)
    }

    /// Merge `source` into this stack
    ///
    /// The source is not modified; callers apply the result to it.
    pub fn merge(&mut self, source: &Stack) -> Result<MergeResult, QuantityError> {
        let kind = self.kind();
        if !self.same_item(source)
            || kind.is_full(self.quantity)?
            || !self.has_placeable_quantity()?
            || !source.has_placeable_quantity()?
        {
            return Ok(MergeResult::Denied);
        }

        let overflow = kind.will_overflow(self.quantity, source.quantity)?;
        let mut interpolations = Vec::with_capacity(self.usage.len());
        for (target, other) in self.usage.iter().zip(&source.usage) {
            match target.interpolate(other.as_ref(), self.quantity, overflow.added) {
                Some(interpolation) => interpolations.push(interpolation),
                None => return Ok(MergeResult::Denied),
            }
        }
        for (interpolation, target) in interpolations.into_iter().zip(self.usage.iter_mut()) {
            interpolation.apply(target.as_mut());
        }
        self.quantity = overflow.final_quantity;

        if overflow.overflowed {
            Ok(MergeResult::Partial {
                left: overflow.left,
            })
        } else {
            Ok(MergeResult::Total)
        }
    }

    /// Item, quantity and main usage state
    pub fn dump(&self) -> (Arc<Item>, Quantity, UsageState) {
        (Arc::clone(&self.item), self.quantity, self.main_usage().export())
    }
}
