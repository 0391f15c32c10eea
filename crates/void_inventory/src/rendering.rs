//! Item and stack rendering strategies
//!
//! Rendering strategies do not draw anything. They collect the data a
//! presentation layer needs to show a stack (icon, caption, wear bar, ...).

use crate::stack::Stack;
use crate::strategy::StrategyKind;
use crate::usage::{DurabilityUsage, StackDurability};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Presentation data gathered from a stack's rendering strategies
pub type RenderingData = BTreeMap<String, Value>;

/// Rendering template declared on an item
pub trait ItemRenderingStrategy: fmt::Debug + Send + Sync {
    /// Strategy kind
    fn kind(&self) -> StrategyKind;

    /// Create the per-stack counterpart
    fn create_stack_strategy(&self) -> Box<dyn StackRenderingStrategy>;
}

/// Per-stack rendering strategy
pub trait StackRenderingStrategy: fmt::Debug + Send + Sync {
    /// Kind shared with the item template
    fn kind(&self) -> StrategyKind;

    /// Deep copy
    fn clone_box(&self) -> Box<dyn StackRenderingStrategy>;

    /// Write this strategy's entries for `stack`
    fn dump(&self, stack: &Stack, data: &mut RenderingData);
}

/// Rendering with no data of its own
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRendering;

impl StaticRendering {
    pub const KIND: StrategyKind = StrategyKind::new("static");
}

impl ItemRenderingStrategy for StaticRendering {
    fn kind(&self) -> StrategyKind {
        Self::KIND
    }

    fn create_stack_strategy(&self) -> Box<dyn StackRenderingStrategy> {
        Box::new(*self)
    }
}

impl StackRenderingStrategy for StaticRendering {
    fn kind(&self) -> StrategyKind {
        Self::KIND
    }

    fn clone_box(&self) -> Box<dyn StackRenderingStrategy> {
        Box::new(*self)
    }

    fn dump(&self, _stack: &Stack, _data: &mut RenderingData) {}
}

/// Icon and caption
#[derive(Debug, Clone, Default)]
pub struct IconTextRendering {
    icon: String,
    caption: String,
}

impl IconTextRendering {
    pub const KIND: StrategyKind = StrategyKind::new("icon-text");

    /// Create with an icon reference and a caption
    pub fn new(icon: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            caption: caption.into(),
        }
    }
}

impl ItemRenderingStrategy for IconTextRendering {
    fn kind(&self) -> StrategyKind {
        Self::KIND
    }

    fn create_stack_strategy(&self) -> Box<dyn StackRenderingStrategy> {
        Box::new(self.clone())
    }
}

impl StackRenderingStrategy for IconTextRendering {
    fn kind(&self) -> StrategyKind {
        Self::KIND
    }

    fn clone_box(&self) -> Box<dyn StackRenderingStrategy> {
        Box::new(self.clone())
    }

    fn dump(&self, stack: &Stack, data: &mut RenderingData) {
        data.insert("icon".into(), Value::from(self.icon.clone()));
        data.insert("caption".into(), Value::from(self.caption.clone()));
        data.insert("quantity".into(), Value::from(stack.quantity().to_string()));
    }
}

/// Wear bar fed by the durability usage strategy
///
/// Must be declared with a usage requirement on [`DurabilityUsage::KIND`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DurabilityBarRendering;

impl DurabilityBarRendering {
    pub const KIND: StrategyKind = StrategyKind::new("durability-bar");
}

impl ItemRenderingStrategy for DurabilityBarRendering {
    fn kind(&self) -> StrategyKind {
        Self::KIND
    }

    fn create_stack_strategy(&self) -> Box<dyn StackRenderingStrategy> {
        Box::new(*self)
    }
}

impl StackRenderingStrategy for DurabilityBarRendering {
    fn kind(&self) -> StrategyKind {
        Self::KIND
    }

    fn clone_box(&self) -> Box<dyn StackRenderingStrategy> {
        Box::new(*self)
    }

    fn dump(&self, stack: &Stack, data: &mut RenderingData) {
        let durability = stack
            .usage_strategy(DurabilityUsage::KIND)
            .and_then(|strategy| strategy.downcast_ref::<StackDurability>());
        if let Some(durability) = durability {
            data.insert("durability".into(), Value::from(durability.fraction()));
        }
    }
}
