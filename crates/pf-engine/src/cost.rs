//! The cost algebra used to charge modifiers against a power's budget.

use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// What a modifier takes out of a power's budget, in weapon-dice units.
///
/// Costs compose with `+`: fixed amounts add, multipliers multiply. The
/// composition is associative and [`PowerCost::EMPTY`] is its identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerCost {
    /// Budget subtracted after multipliers are applied.
    pub fixed: f64,
    /// Divides the budget before the fixed amount is paid.
    pub multiplier: f64,
    /// Share of the budget one target of the attack receives.
    pub single_target_multiplier: f64,
}

impl PowerCost {
    /// No cost at all.
    pub const EMPTY: PowerCost = PowerCost {
        fixed: 0.0,
        multiplier: 1.0,
        single_target_multiplier: 1.0,
    };

    /// A flat charge.
    pub fn fixed(amount: f64) -> Self {
        Self {
            fixed: amount,
            ..Self::EMPTY
        }
    }

    /// A proportional charge that also scales the per-target share.
    pub fn multiplier(factor: f64) -> Self {
        Self {
            multiplier: factor,
            single_target_multiplier: factor,
            ..Self::EMPTY
        }
    }

    /// Budget left after paying this cost: `budget / multiplier - fixed`.
    pub fn apply(&self, budget: f64) -> f64 {
        budget / self.multiplier - self.fixed
    }
}

impl Default for PowerCost {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Add for PowerCost {
    type Output = PowerCost;

    fn add(self, rhs: PowerCost) -> PowerCost {
        PowerCost {
            fixed: self.fixed + rhs.fixed,
            multiplier: self.multiplier * rhs.multiplier,
            single_target_multiplier: self.single_target_multiplier * rhs.single_target_multiplier,
        }
    }
}

impl Sum for PowerCost {
    fn sum<I: Iterator<Item = PowerCost>>(iter: I) -> Self {
        iter.fold(PowerCost::EMPTY, Add::add)
    }
}
