//! Strategy identifiers
//!
//! Every strategy an item or inventory composes is identified by a stable
//! [`StrategyKind`]. Lookups, duplicate checks and dependency edges all work
//! on these identifiers instead of inspecting concrete types at runtime.

use std::fmt;

/// Stable identifier of a strategy type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrategyKind(&'static str);

impl StrategyKind {
    /// Unstacked quantity kind
    pub const UNSTACKED: Self = Self("unstacked");
    /// Integral quantity kind
    pub const INTEGRAL: Self = Self("integral");
    /// Fractional quantity kind
    pub const FRACTIONAL: Self = Self("fractional");
    /// Linear index spatial capability
    pub const INDEXED: Self = Self("indexed");

    /// Create a strategy kind
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Get the identifier text
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Category a strategy belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyCategory {
    /// Quantity algebra
    Quantifying,
    /// Spatial capability markers
    Spatial,
    /// Usage behavior
    Usage,
    /// Presentation data
    Rendering,
}

impl fmt::Display for StrategyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Quantifying => "quantifying",
            Self::Spatial => "spatial",
            Self::Usage => "usage",
            Self::Rendering => "rendering",
        };
        f.write_str(name)
    }
}

/// A prerequisite declared by a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Requirement {
    pub category: StrategyCategory,
    pub kind: StrategyKind,
}

impl Requirement {
    /// Require a quantity kind
    pub const fn quantifying(kind: StrategyKind) -> Self {
        Self {
            category: StrategyCategory::Quantifying,
            kind,
        }
    }

    /// Require a spatial capability
    pub const fn spatial(kind: StrategyKind) -> Self {
        Self {
            category: StrategyCategory::Spatial,
            kind,
        }
    }

    /// Require a usage strategy
    pub const fn usage(kind: StrategyKind) -> Self {
        Self {
            category: StrategyCategory::Usage,
            kind,
        }
    }

    /// Require a rendering strategy
    pub const fn rendering(kind: StrategyKind) -> Self {
        Self {
            category: StrategyCategory::Rendering,
            kind,
        }
    }
}
