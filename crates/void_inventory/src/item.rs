//! Item definitions

use crate::dependency::{self, Available, Declared};
use crate::error::{DefinitionError, QuantityError};
use crate::quantity::{Quantity, QuantityKind};
use crate::rendering::{ItemRenderingStrategy, StaticRendering};
use crate::stack::Stack;
use crate::strategy::{Requirement, StrategyCategory, StrategyKind};
use crate::usage::{ItemUsageStrategy, NullUsage, UsageState};
use std::collections::HashSet;
use std::sync::Arc;

/// Immutable item template shared by every stack created from it
#[derive(Debug)]
pub struct Item {
    registry: String,
    key: u32,
    name: String,
    quantity: QuantityKind,
    spatial: Vec<StrategyKind>,
    usage: Vec<Box<dyn ItemUsageStrategy>>,
    main_usage: usize,
    rendering: Vec<Box<dyn ItemRenderingStrategy>>,
    main_rendering: usize,
}

impl Item {
    /// Start building an item identified by `(registry, key)`
    pub fn builder(registry: impl Into<String>, key: u32) -> ItemBuilder {
        ItemBuilder::new(registry, key)
    }

    /// Registry the item belongs to
    pub fn registry_key(&self) -> &str {
        &self.registry
    }

    /// Key inside the registry
    pub fn key(&self) -> u32 {
        self.key
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quantity kind and bounds
    pub fn quantity_kind(&self) -> QuantityKind {
        self.quantity
    }

    /// Declared spatial capabilities
    pub fn spatial_capabilities(&self) -> &[StrategyKind] {
        &self.spatial
    }

    /// Check for a spatial capability
    pub fn has_spatial_capability(&self, kind: StrategyKind) -> bool {
        self.spatial.contains(&kind)
    }

    /// Usage strategies in dependency order
    pub fn usage_strategies(&self) -> impl Iterator<Item = &dyn ItemUsageStrategy> {
        self.usage.iter().map(|s| s.as_ref())
    }

    /// Main usage strategy
    pub fn main_usage(&self) -> &dyn ItemUsageStrategy {
        self.usage[self.main_usage].as_ref()
    }

    /// Rendering strategies in dependency order
    pub fn rendering_strategies(&self) -> impl Iterator<Item = &dyn ItemRenderingStrategy> {
        self.rendering.iter().map(|s| s.as_ref())
    }

    /// Main rendering strategy
    pub fn main_rendering(&self) -> &dyn ItemRenderingStrategy {
        self.rendering[self.main_rendering].as_ref()
    }

    /// Create a detached stack of this item
    ///
    /// `usage_state`, when given, is imported into the main usage strategy.
    pub fn create(
        item: &Arc<Item>,
        quantity: Quantity,
        usage_state: Option<&UsageState>,
    ) -> Result<Stack, QuantityError> {
        item.quantity.check(quantity)?;

        let usage = item.usage.iter().map(|s| s.create_stack_strategy()).collect();
        let rendering = item
            .rendering
            .iter()
            .map(|s| s.create_stack_strategy())
            .collect();

        let mut stack = Stack::from_parts(
            Arc::clone(item),
            quantity,
            usage,
            item.main_usage,
            rendering,
            item.main_rendering,
        );
        if let Some(state) = usage_state {
            stack.main_usage_mut().import(state);
        }
        Ok(stack)
    }
}

/// Builder for [`Item`]
#[derive(Debug)]
pub struct ItemBuilder {
    registry: String,
    key: u32,
    name: String,
    quantity: QuantityKind,
    spatial: Vec<StrategyKind>,
    usage: Vec<Declared<Box<dyn ItemUsageStrategy>>>,
    main_usage: Option<StrategyKind>,
    rendering: Vec<Declared<Box<dyn ItemRenderingStrategy>>>,
    main_rendering: Option<StrategyKind>,
}

impl ItemBuilder {
    /// Create a new builder
    pub fn new(registry: impl Into<String>, key: u32) -> Self {
        Self {
            registry: registry.into(),
            key,
            name: String::new(),
            quantity: QuantityKind::default(),
            spatial: vec![StrategyKind::INDEXED],
            usage: Vec::new(),
            main_usage: None,
            rendering: Vec::new(),
            main_rendering: None,
        }
    }

    /// Set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set quantity kind
    pub fn with_quantity(mut self, quantity: QuantityKind) -> Self {
        self.quantity = quantity;
        self
    }

    /// Replace the spatial capabilities (defaults to the index capability)
    pub fn with_spatial_capabilities(
        mut self,
        capabilities: impl IntoIterator<Item = StrategyKind>,
    ) -> Self {
        self.spatial = capabilities.into_iter().collect();
        self
    }

    /// Declare a usage strategy and its prerequisites
    pub fn with_usage(
        mut self,
        strategy: impl ItemUsageStrategy + 'static,
        requires: impl IntoIterator<Item = Requirement>,
    ) -> Self {
        let strategy: Box<dyn ItemUsageStrategy> = Box::new(strategy);
        self.usage.push(Declared::new(strategy, requires));
        self
    }

    /// Select the main usage strategy (defaults to the first declared)
    pub fn with_main_usage(mut self, kind: StrategyKind) -> Self {
        self.main_usage = Some(kind);
        self
    }

    /// Declare a rendering strategy and its prerequisites
    pub fn with_rendering(
        mut self,
        strategy: impl ItemRenderingStrategy + 'static,
        requires: impl IntoIterator<Item = Requirement>,
    ) -> Self {
        let strategy: Box<dyn ItemRenderingStrategy> = Box::new(strategy);
        self.rendering.push(Declared::new(strategy, requires));
        self
    }

    /// Select the main rendering strategy (defaults to the first declared)
    pub fn with_main_rendering(mut self, kind: StrategyKind) -> Self {
        self.main_rendering = Some(kind);
        self
    }

    /// Validate and freeze the definition
    pub fn build(self) -> Result<Arc<Item>, DefinitionError> {
        let mut seen = HashSet::new();
        for kind in &self.spatial {
            if !seen.insert(*kind) {
                return Err(DefinitionError::DuplicateSpatialCapability(*kind));
            }
        }

        let mut usage = self.usage;
        if usage.is_empty() {
            let null: Box<dyn ItemUsageStrategy> = Box::new(NullUsage);
            usage.push(Declared::new(null, []));
        }
        let mut rendering = self.rendering;
        if rendering.is_empty() {
            let fallback: Box<dyn ItemRenderingStrategy> = Box::new(StaticRendering);
            rendering.push(Declared::new(fallback, []));
        }
        let main_usage = self.main_usage.unwrap_or_else(|| usage[0].strategy.kind());
        let main_rendering = self
            .main_rendering
            .unwrap_or_else(|| rendering[0].strategy.kind());

        let usage = dependency::flatten(StrategyCategory::Usage, usage, |s| s.kind())?;
        let rendering = dependency::flatten(StrategyCategory::Rendering, rendering, |s| s.kind())?;

        let mut available = Available::new();
        available.insert(
            StrategyCategory::Quantifying,
            HashSet::from([self.quantity.strategy_kind()]),
        );
        available.insert(StrategyCategory::Spatial, seen);
        available.insert(
            StrategyCategory::Usage,
            usage.iter().map(|d| d.strategy.kind()).collect(),
        );
        available.insert(
            StrategyCategory::Rendering,
            rendering.iter().map(|d| d.strategy.kind()).collect(),
        );
        dependency::check_requirements(StrategyCategory::Usage, &usage, |s| s.kind(), &available)?;
        dependency::check_requirements(
            StrategyCategory::Rendering,
            &rendering,
            |s| s.kind(),
            &available,
        )?;

        let usage_kinds: Vec<_> = usage.iter().map(|d| d.strategy.kind()).collect();
        let rendering_kinds: Vec<_> = rendering.iter().map(|d| d.strategy.kind()).collect();
        let main_usage = dependency::main_index(StrategyCategory::Usage, &usage_kinds, main_usage)?;
        let main_rendering =
            dependency::main_index(StrategyCategory::Rendering, &rendering_kinds, main_rendering)?;

        let name = if self.name.is_empty() {
            format!("{}:{}", self.registry, self.key)
        } else {
            self.name
        };

        Ok(Arc::new(Item {
            registry: self.registry,
            key: self.key,
            name,
            quantity: self.quantity,
            spatial: self.spatial,
            usage: usage.into_iter().map(|d| d.strategy).collect(),
            main_usage,
            rendering: rendering.into_iter().map(|d| d.strategy).collect(),
            main_rendering,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::{DurabilityBarRendering, IconTextRendering};
    use crate::usage::{DurabilityUsage, StackDurability};

    #[test]
    fn test_defaults() {
        let item = Item::builder("core", 1).build().unwrap();
        assert_eq!(item.name(), "core:1");
        assert_eq!(item.quantity_kind(), QuantityKind::Unstacked);
        assert_eq!(item.main_usage().kind(), NullUsage::KIND);
        assert_eq!(item.main_rendering().kind(), StaticRendering::KIND);
        assert!(item.has_spatial_capability(StrategyKind::INDEXED));
    }

    #[test]
    fn test_rendering_ordered_after_prerequisites() {
        let item = Item::builder("core", 2)
            .with_quantity(QuantityKind::integral(1))
            .with_usage(DurabilityUsage::new(50.0), [])
            .with_rendering(
                DurabilityBarRendering,
                [
                    Requirement::usage(DurabilityUsage::KIND),
                    Requirement::rendering(IconTextRendering::KIND),
                ],
            )
            .with_rendering(IconTextRendering::new("sword.png", "Sword"), [])
            .with_main_rendering(IconTextRendering::KIND)
            .build()
            .unwrap();

        let kinds: Vec<_> = item.rendering_strategies().map(|s| s.kind()).collect();
        assert_eq!(kinds, vec![IconTextRendering::KIND, DurabilityBarRendering::KIND]);
        assert_eq!(item.main_rendering().kind(), IconTextRendering::KIND);
    }

    #[test]
    fn test_missing_cross_category_dependency() {
        let err = Item::builder("core", 3)
            .with_rendering(
                DurabilityBarRendering,
                [Requirement::usage(DurabilityUsage::KIND)],
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::MissingDependency {
                dependent: DurabilityBarRendering::KIND,
                category: StrategyCategory::Usage,
                required: DurabilityUsage::KIND,
            }
        );
    }

    #[test]
    fn test_quantity_requirement() {
        let result = Item::builder("core", 4)
            .with_quantity(QuantityKind::fractional(2.0))
            .with_usage(
                DurabilityUsage::new(10.0),
                [Requirement::quantifying(StrategyKind::INTEGRAL)],
            )
            .build();
        assert!(matches!(result, Err(DefinitionError::MissingDependency { .. })));
    }

    #[test]
    fn test_invalid_main() {
        let err = Item::builder("core", 5)
            .with_usage(NullUsage, [])
            .with_main_usage(DurabilityUsage::KIND)
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidMainStrategy { .. }));
    }

    #[test]
    fn test_duplicate_spatial_capability() {
        let err = Item::builder("core", 6)
            .with_spatial_capabilities([StrategyKind::INDEXED, StrategyKind::INDEXED])
            .build()
            .unwrap_err();
        assert_eq!(err, DefinitionError::DuplicateSpatialCapability(StrategyKind::INDEXED));
    }

    #[test]
    fn test_create_imports_usage_state() {
        let item = Item::builder("core", 7)
            .with_quantity(QuantityKind::integral(5))
            .with_usage(DurabilityUsage::new(100.0), [])
            .build()
            .unwrap();

        let stack = Item::create(&item, Quantity::Integral(2), Some(&UsageState::Float(30.0))).unwrap();
        let durability = stack
            .main_usage()
            .downcast_ref::<StackDurability>()
            .unwrap()
            .durability();
        assert_eq!(durability, 30.0);
        assert!(stack.position().is_none());

        assert!(Item::create(&item, Quantity::Unstacked(true), None).is_err());
    }
}
