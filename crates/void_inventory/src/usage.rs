//! Item and stack usage strategies
//!
//! An item declares [`ItemUsageStrategy`] templates. Every stack created from
//! the item carries its own [`StackUsageStrategy`] instance per template,
//! holding per-stack state (durability, charges, ...).

use crate::quantity::Quantity;
use crate::strategy::StrategyKind;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

/// Opaque usage state exchanged through Import/Export
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum UsageState {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<UsageState>),
    Map(BTreeMap<String, UsageState>),
}

impl UsageState {
    /// Numeric value, if any
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Int(value) => Some(value as f64),
            Self::Float(value) => Some(value),
            _ => None,
        }
    }

    /// Check for the empty state
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Argument passed to a use interaction
pub type UsageArgument = UsageState;

/// Deferred state change produced while merging two stacks
pub struct Interpolation(Box<dyn FnOnce(&mut dyn StackUsageStrategy) + Send>);

impl Interpolation {
    /// Interpolation that changes nothing
    pub fn noop() -> Self {
        Self(Box::new(|_| {}))
    }

    /// Wrap a state change
    pub fn new(apply: impl FnOnce(&mut dyn StackUsageStrategy) + Send + 'static) -> Self {
        Self(Box::new(apply))
    }

    pub(crate) fn apply(self, target: &mut dyn StackUsageStrategy) {
        (self.0)(target)
    }
}

impl fmt::Debug for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Interpolation")
    }
}

/// Per-stack usage state
pub trait StackUsageStrategy: fmt::Debug + Send + Sync + 'static {
    /// Kind shared with the item template
    fn kind(&self) -> StrategyKind;

    /// Deep copy
    fn clone_box(&self) -> Box<dyn StackUsageStrategy>;

    /// Export the state blob
    fn export(&self) -> UsageState {
        UsageState::None
    }

    /// Restore state from a blob
    fn import(&mut self, _state: &UsageState) {}

    /// Whether two stacks are interchangeable for this strategy
    fn equals(&self, other: &dyn StackUsageStrategy) -> bool;

    /// Produce the state change for merging `added` units of `other` into a
    /// stack currently holding `current` units. `None` denies the merge.
    fn interpolate(
        &self,
        other: &dyn StackUsageStrategy,
        _current: Quantity,
        _added: Quantity,
    ) -> Option<Interpolation> {
        if self.equals(other) {
            Some(Interpolation::noop())
        } else {
            None
        }
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn StackUsageStrategy {
    /// Downcast to a concrete strategy
    pub fn downcast_ref<T: StackUsageStrategy>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcast to a concrete strategy (mutable)
    pub fn downcast_mut<T: StackUsageStrategy>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Usage template declared on an item
pub trait ItemUsageStrategy: fmt::Debug + Send + Sync {
    /// Strategy kind
    fn kind(&self) -> StrategyKind;

    /// Create the per-stack counterpart
    fn create_stack_strategy(&self) -> Box<dyn StackUsageStrategy>;
}

/// Usage strategy for items that cannot be used
#[derive(Debug, Clone, Copy, Default)]
pub struct NullUsage;

impl NullUsage {
    pub const KIND: StrategyKind = StrategyKind::new("null-usage");
}

impl ItemUsageStrategy for NullUsage {
    fn kind(&self) -> StrategyKind {
        Self::KIND
    }

    fn create_stack_strategy(&self) -> Box<dyn StackUsageStrategy> {
        Box::new(NullStackUsage)
    }
}

/// Stack side of [`NullUsage`]
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStackUsage;

impl StackUsageStrategy for NullStackUsage {
    fn kind(&self) -> StrategyKind {
        NullUsage::KIND
    }

    fn clone_box(&self) -> Box<dyn StackUsageStrategy> {
        Box::new(*self)
    }

    fn equals(&self, other: &dyn StackUsageStrategy) -> bool {
        other.downcast_ref::<NullStackUsage>().is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Items that wear down with use
#[derive(Debug, Clone, Copy)]
pub struct DurabilityUsage {
    max: f64,
}

impl DurabilityUsage {
    pub const KIND: StrategyKind = StrategyKind::new("durability");

    /// Create with the given maximum durability
    pub fn new(max: f64) -> Self {
        Self { max: max.max(0.0) }
    }

    /// Maximum durability
    pub fn max(&self) -> f64 {
        self.max
    }
}

impl ItemUsageStrategy for DurabilityUsage {
    fn kind(&self) -> StrategyKind {
        Self::KIND
    }

    fn create_stack_strategy(&self) -> Box<dyn StackUsageStrategy> {
        Box::new(StackDurability {
            max: self.max,
            durability: self.max,
        })
    }
}

/// Stack side of [`DurabilityUsage`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackDurability {
    max: f64,
    durability: f64,
}

impl StackDurability {
    /// Current durability
    pub fn durability(&self) -> f64 {
        self.durability
    }

    /// Maximum durability
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Current durability over maximum, 1.0 when the maximum is 0
    pub fn fraction(&self) -> f64 {
        if self.max > 0.0 {
            self.durability / self.max
        } else {
            1.0
        }
    }

    /// Set durability, clamped to [0, max]
    pub fn set_durability(&mut self, durability: f64) {
        self.durability = durability.clamp(0.0, self.max);
    }

    /// Reduce durability, returns true when broken
    pub fn wear(&mut self, amount: f64) -> bool {
        self.set_durability(self.durability - amount);
        self.durability <= 0.0
    }
}

impl StackUsageStrategy for StackDurability {
    fn kind(&self) -> StrategyKind {
        DurabilityUsage::KIND
    }

    fn clone_box(&self) -> Box<dyn StackUsageStrategy> {
        Box::new(*self)
    }

    fn export(&self) -> UsageState {
        UsageState::Float(self.durability)
    }

    fn import(&mut self, state: &UsageState) {
        if let Some(durability) = state.as_f64() {
            self.set_durability(durability);
        }
    }

    fn equals(&self, other: &dyn StackUsageStrategy) -> bool {
        other.downcast_ref::<StackDurability>() == Some(self)
    }

    fn interpolate(
        &self,
        other: &dyn StackUsageStrategy,
        current: Quantity,
        added: Quantity,
    ) -> Option<Interpolation> {
        let other = other.downcast_ref::<StackDurability>()?;
        if other.max != self.max {
            return None;
        }

        let current = current.as_f64();
        let added = added.as_f64();
        let total = current + added;
        let durability = if total > 0.0 {
            (self.durability * current + other.durability * added) / total
        } else {
            self.durability
        };

        Some(Interpolation::new(move |target| {
            if let Some(target) = target.downcast_mut::<StackDurability>() {
                target.set_durability(durability);
            }
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
