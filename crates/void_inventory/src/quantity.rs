//! Quantity algebra
//!
//! Three quantity kinds are supported:
//!
//! - **Unstacked**: boolean presence. Adding is OR, subtracting is AND-NOT,
//!   and only `true + true` overflows.
//! - **Integral**: whole amounts with an optional maximum (0 = unbounded).
//! - **Fractional**: like integral, over floating point amounts.

use crate::error::QuantityError;
use crate::strategy::StrategyKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantity value carried by a stack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Quantity {
    /// Present or absent
    Unstacked(bool),
    /// Whole amount
    Integral(i64),
    /// Fractional amount
    Fractional(f64),
}

impl Quantity {
    /// Name of the representation
    pub fn representation(&self) -> &'static str {
        match self {
            Self::Unstacked(_) => "unstacked",
            Self::Integral(_) => "integral",
            Self::Fractional(_) => "fractional",
        }
    }

    /// Amount as a float, used for weighting
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Unstacked(present) => {
                if present {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Integral(amount) => amount as f64,
            Self::Fractional(amount) => amount,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unstacked(present) => write!(f, "{}", present),
            Self::Integral(amount) => write!(f, "{}", amount),
            Self::Fractional(amount) => write!(f, "{}", amount),
        }
    }
}

/// Result of an overflow check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overflow {
    /// Quantity the stack would end up with
    pub final_quantity: Quantity,
    /// Part of the candidate that fits
    pub added: Quantity,
    /// Part of the candidate that does not fit
    pub left: Quantity,
    /// Whether any of the candidate is left over
    pub overflowed: bool,
}

/// Quantity kind and bounds of an item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum QuantityKind {
    /// One unit, present or not
    Unstacked,
    /// Whole amounts up to `max` (0 = unbounded)
    Integral { max: i64 },
    /// Fractional amounts up to `max` (0 = unbounded)
    Fractional { max: f64 },
}

impl Default for QuantityKind {
    fn default() -> Self {
        Self::Unstacked
    }
}

impl QuantityKind {
    /// Integral kind, negative maxima clamp to unbounded
    pub fn integral(max: i64) -> Self {
        Self::Integral { max: max.max(0) }
    }

    /// Fractional kind, negative or NaN maxima clamp to unbounded
    pub fn fractional(max: f64) -> Self {
        let max = if max.is_nan() || max < 0.0 { 0.0 } else { max };
        Self::Fractional { max }
    }

    /// Strategy kind used by dependency declarations
    pub fn strategy_kind(&self) -> StrategyKind {
        match self {
            Self::Unstacked => StrategyKind::UNSTACKED,
            Self::Integral { .. } => StrategyKind::INTEGRAL,
            Self::Fractional { .. } => StrategyKind::FRACTIONAL,
        }
    }

    /// Empty quantity for this kind
    pub fn zero(&self) -> Quantity {
        match self {
            Self::Unstacked => Quantity::Unstacked(false),
            Self::Integral { .. } => Quantity::Integral(0),
            Self::Fractional { .. } => Quantity::Fractional(0.0),
        }
    }

    /// Saturation point, `None` when unbounded
    pub fn saturation(&self) -> Option<Quantity> {
        match *self {
            Self::Unstacked => Some(Quantity::Unstacked(true)),
            Self::Integral { max } if max != 0 => Some(Quantity::Integral(max)),
            Self::Fractional { max } if max != 0.0 => Some(Quantity::Fractional(max)),
            _ => None,
        }
    }

    /// Fail if the quantity has the wrong representation
    pub fn check(&self, quantity: Quantity) -> Result<(), QuantityError> {
        match (self, quantity) {
            (Self::Unstacked, Quantity::Unstacked(_))
            | (Self::Integral { .. }, Quantity::Integral(_))
            | (Self::Fractional { .. }, Quantity::Fractional(_)) => Ok(()),
            _ => Err(self.mismatch(quantity)),
        }
    }

    /// Whether the quantity lies within the kind's bounds
    pub fn is_allowed(&self, quantity: Quantity) -> Result<bool, QuantityError> {
        match (*self, quantity) {
            (Self::Unstacked, Quantity::Unstacked(_)) => Ok(true),
            (Self::Integral { max }, Quantity::Integral(q)) => Ok(q >= 0 && (max == 0 || q <= max)),
            (Self::Fractional { max }, Quantity::Fractional(q)) => {
                Ok(q >= 0.0 && (max == 0.0 || q <= max))
            }
            _ => Err(self.mismatch(quantity)),
        }
    }

    /// Whether the quantity is empty
    pub fn is_empty(&self, quantity: Quantity) -> Result<bool, QuantityError> {
        match (self, quantity) {
            (Self::Unstacked, Quantity::Unstacked(present)) => Ok(!present),
            (Self::Integral { .. }, Quantity::Integral(q)) => Ok(q == 0),
            (Self::Fractional { .. }, Quantity::Fractional(q)) => Ok(q == 0.0),
            _ => Err(self.mismatch(quantity)),
        }
    }

    /// Whether the quantity sits at the saturation point
    pub fn is_full(&self, quantity: Quantity) -> Result<bool, QuantityError> {
        match (*self, quantity) {
            (Self::Unstacked, Quantity::Unstacked(present)) => Ok(present),
            (Self::Integral { max }, Quantity::Integral(q)) => Ok(max != 0 && q == max),
            (Self::Fractional { max }, Quantity::Fractional(q)) => Ok(max != 0.0 && q == max),
            _ => Err(self.mismatch(quantity)),
        }
    }

    /// Add two quantities
    pub fn add(&self, a: Quantity, b: Quantity) -> Result<Quantity, QuantityError> {
        match (self, a, b) {
            (Self::Unstacked, Quantity::Unstacked(a), Quantity::Unstacked(b)) => {
                Ok(Quantity::Unstacked(a || b))
            }
            (Self::Integral { .. }, Quantity::Integral(a), Quantity::Integral(b)) => {
                Ok(Quantity::Integral(a.saturating_add(b)))
            }
            (Self::Fractional { .. }, Quantity::Fractional(a), Quantity::Fractional(b)) => {
                Ok(Quantity::Fractional(a + b))
            }
            _ => Err(self.pair_mismatch(a, b)),
        }
    }

    /// Subtract `b` from `a`
    pub fn sub(&self, a: Quantity, b: Quantity) -> Result<Quantity, QuantityError> {
        match (self, a, b) {
            (Self::Unstacked, Quantity::Unstacked(a), Quantity::Unstacked(b)) => {
                Ok(Quantity::Unstacked(a && !b))
            }
            (Self::Integral { .. }, Quantity::Integral(a), Quantity::Integral(b)) => {
                Ok(Quantity::Integral(a.saturating_sub(b)))
            }
            (Self::Fractional { .. }, Quantity::Fractional(a), Quantity::Fractional(b)) => {
                Ok(Quantity::Fractional(a - b))
            }
            _ => Err(self.pair_mismatch(a, b)),
        }
    }

    /// Compute what adding `candidate` to `current` would do
    pub fn will_overflow(
        &self,
        current: Quantity,
        candidate: Quantity,
    ) -> Result<Overflow, QuantityError> {
        match (*self, current, candidate) {
            (Self::Unstacked, Quantity::Unstacked(current), Quantity::Unstacked(candidate)) => {
                Ok(unstacked_overflow(current, candidate))
            }
            (Self::Integral { max }, Quantity::Integral(current), Quantity::Integral(candidate)) => {
                if candidate <= 0 {
                    return Ok(Overflow::integral(current, 0, 0, false));
                }
                let potential = current.saturating_add(candidate);
                if max == 0 || potential <= max {
                    Ok(Overflow::integral(potential, candidate, 0, false))
                } else {
                    Ok(Overflow::integral(max, max - current, potential - max, true))
                }
            }
            (
                Self::Fractional { max },
                Quantity::Fractional(current),
                Quantity::Fractional(candidate),
            ) => {
                if candidate <= 0.0 {
                    return Ok(Overflow::fractional(current, 0.0, 0.0, false));
                }
                let potential = current + candidate;
                if max == 0.0 || potential <= max {
                    Ok(Overflow::fractional(potential, candidate, 0.0, false))
                } else {
                    Ok(Overflow::fractional(max, max - current, potential - max, true))
                }
            }
            _ => Err(self.pair_mismatch(current, candidate)),
        }
    }

    fn name(&self) -> &'static str {
        self.strategy_kind().name()
    }

    fn mismatch(&self, quantity: Quantity) -> QuantityError {
        QuantityError::InvalidQuantityKind {
            expected: self.name(),
            found: quantity.representation(),
        }
    }

    fn pair_mismatch(&self, a: Quantity, b: Quantity) -> QuantityError {
        match self.check(a) {
            Err(err) => err,
            Ok(()) => self.mismatch(b),
        }
    }
}

fn unstacked_overflow(current: bool, candidate: bool) -> Overflow {
    let (final_quantity, added, left) = match (current, candidate) {
        (_, false) => (current, false, false),
        (true, true) => (true, false, true),
        (false, true) => (true, true, false),
    };
    Overflow {
        final_quantity: Quantity::Unstacked(final_quantity),
        added: Quantity::Unstacked(added),
        left: Quantity::Unstacked(left),
        overflowed: left,
    }
}

impl Overflow {
    fn integral(final_quantity: i64, added: i64, left: i64, overflowed: bool) -> Self {
        Self {
            final_quantity: Quantity::Integral(final_quantity),
            added: Quantity::Integral(added),
            left: Quantity::Integral(left),
            overflowed,
        }
    }

    fn fractional(final_quantity: f64, added: f64, left: f64, overflowed: bool) -> Self {
        Self {
            final_quantity: Quantity::Fractional(final_quantity),
            added: Quantity::Fractional(added),
            left: Quantity::Fractional(left),
            overflowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_fits() {
        let kind = QuantityKind::integral(10);
        for (a, b) in [(0, 10), (3, 4), (9, 1), (5, 5)] {
            let overflow = kind
                .will_overflow(Quantity::Integral(a), Quantity::Integral(b))
                .unwrap();
            assert!(!overflow.overflowed);
            assert_eq!(overflow.final_quantity, Quantity::Integral(a + b));
            assert_eq!(overflow.added, Quantity::Integral(b));
            assert_eq!(overflow.left, Quantity::Integral(0));
        }
    }

    #[test]
    fn test_integral_overflows() {
        let kind = QuantityKind::integral(10);
        for (a, b) in [(8, 5), (10, 3), (0, 11), (1, 100)] {
            let overflow = kind
                .will_overflow(Quantity::Integral(a), Quantity::Integral(b))
                .unwrap();
            assert!(overflow.overflowed);
            assert_eq!(overflow.final_quantity, Quantity::Integral(10));
            assert_eq!(overflow.added, Quantity::Integral(10 - a));
            assert_eq!(overflow.left, Quantity::Integral(a + b - 10));
        }
    }

    #[test]
    fn test_saturated_overflows_by_whole_candidate() {
        let kind = QuantityKind::integral(10);
        let overflow = kind
            .will_overflow(Quantity::Integral(10), Quantity::Integral(3))
            .unwrap();
        assert!(overflow.overflowed);
        assert_eq!(overflow.added, Quantity::Integral(0));
        assert_eq!(overflow.left, Quantity::Integral(3));
    }

    #[test]
    fn test_non_positive_candidate_is_noop() {
        let kind = QuantityKind::integral(10);
        let overflow = kind
            .will_overflow(Quantity::Integral(4), Quantity::Integral(-2))
            .unwrap();
        assert!(!overflow.overflowed);
        assert_eq!(overflow.final_quantity, Quantity::Integral(4));
        assert_eq!(overflow.added, Quantity::Integral(0));
        assert_eq!(overflow.left, Quantity::Integral(0));
    }

    #[test]
    fn test_unbounded_never_overflows() {
        let kind = QuantityKind::integral(0);
        let overflow = kind
            .will_overflow(Quantity::Integral(1_000), Quantity::Integral(5_000))
            .unwrap();
        assert!(!overflow.overflowed);
        assert_eq!(overflow.final_quantity, Quantity::Integral(6_000));
        assert_eq!(kind.saturation(), None);
    }

    #[test]
    fn test_fractional_overflow() {
        let kind = QuantityKind::fractional(2.5);
        let overflow = kind
            .will_overflow(Quantity::Fractional(2.0), Quantity::Fractional(1.0))
            .unwrap();
        assert!(overflow.overflowed);
        assert_eq!(overflow.final_quantity, Quantity::Fractional(2.5));
        assert_eq!(overflow.added, Quantity::Fractional(0.5));
        assert_eq!(overflow.left, Quantity::Fractional(0.5));
    }

    #[test]
    fn test_unstacked_algebra() {
        let kind = QuantityKind::Unstacked;
        let both = kind
            .will_overflow(Quantity::Unstacked(true), Quantity::Unstacked(true))
            .unwrap();
        assert!(both.overflowed);
        assert_eq!(both.left, Quantity::Unstacked(true));

        let noop = kind
            .will_overflow(Quantity::Unstacked(true), Quantity::Unstacked(false))
            .unwrap();
        assert!(!noop.overflowed);
        assert_eq!(noop.final_quantity, Quantity::Unstacked(true));
        assert_eq!(noop.added, Quantity::Unstacked(false));
        assert_eq!(noop.left, Quantity::Unstacked(false));

        let fill = kind
            .will_overflow(Quantity::Unstacked(false), Quantity::Unstacked(true))
            .unwrap();
        assert_eq!(fill.final_quantity, Quantity::Unstacked(true));

        assert_eq!(
            kind.sub(Quantity::Unstacked(true), Quantity::Unstacked(true)).unwrap(),
            Quantity::Unstacked(false)
        );
        assert!(kind.is_full(Quantity::Unstacked(true)).unwrap());
        assert!(kind.is_empty(Quantity::Unstacked(false)).unwrap());
    }

    #[test]
    fn test_bounds() {
        let kind = QuantityKind::integral(10);
        assert!(kind.is_allowed(Quantity::Integral(10)).unwrap());
        assert!(!kind.is_allowed(Quantity::Integral(11)).unwrap());
        assert!(!kind.is_allowed(Quantity::Integral(-1)).unwrap());
        assert!(kind.is_full(Quantity::Integral(10)).unwrap());
        assert!(!QuantityKind::integral(0).is_full(Quantity::Integral(10)).unwrap());
        assert!(!QuantityKind::fractional(1.0)
            .is_allowed(Quantity::Fractional(f64::NAN))
            .unwrap());
    }

    #[test]
    fn test_negative_max_clamps() {
        assert_eq!(QuantityKind::integral(-4), QuantityKind::Integral { max: 0 });
        assert_eq!(
            QuantityKind::fractional(-1.0),
            QuantityKind::Fractional { max: 0.0 }
        );
    }

    #[test]
    fn test_wrong_representation_fails() {
        let kind = QuantityKind::integral(10);
        let err = kind.is_allowed(Quantity::Fractional(1.0)).unwrap_err();
        assert_eq!(
            err,
            QuantityError::InvalidQuantityKind {
                expected: "integral",
                found: "fractional",
            }
        );
        assert!(kind
            .will_overflow(Quantity::Integral(1), Quantity::Unstacked(true))
            .is_err());
    }
}
