//! Exact roll distributions.
//!
//! A [`PermutationsResult`] counts, for every possible total of a set of
//! dice, how many of the equally likely face combinations produce it.
//! Counts are arbitrary precision, so `30d6` (`6^30` combinations) is
//! represented exactly; floating point only appears in the final ratios.

pub mod engine;

pub use engine::{PermutationEngine, permutations};

use num_bigint::{BigInt, BigUint};
use num_traits::{ToPrimitive, Zero};

/// A dense histogram of roll totals.
///
/// `permutations[i]` is the number of ways to roll `starting_at + i`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermutationsResult {
    starting_at: i64,
    permutations: Vec<BigUint>,
}

impl PermutationsResult {
    /// The distribution of rolling no dice at all.
    ///
    /// Distinct from a single certain outcome of zero: it has no outcomes,
    /// a total of zero, and every probability query on it is zero.
    pub fn empty() -> Self {
        Self {
            starting_at: 0,
            permutations: Vec::new(),
        }
    }

    /// A distribution with exactly one way to produce `value`.
    pub fn certain(value: i64) -> Self {
        Self {
            starting_at: value,
            permutations: vec![BigUint::from(1u32)],
        }
    }

    /// One die with `sides` faces.
    pub fn single_die(sides: u32) -> Self {
        Self {
            starting_at: 1,
            permutations: vec![BigUint::from(1u32); sides as usize],
        }
    }

    /// Build a histogram from raw parts.
    pub fn from_parts(starting_at: i64, permutations: Vec<BigUint>) -> Self {
        Self {
            starting_at,
            permutations,
        }
    }

    /// The smallest total in the histogram.
    pub fn starting_at(&self) -> i64 {
        self.starting_at
    }

    /// The permutation counts, starting at [`Self::starting_at`].
    pub fn permutations(&self) -> &[BigUint] {
        &self.permutations
    }

    /// Returns true for the zero-dice distribution.
    pub fn is_empty(&self) -> bool {
        self.permutations.is_empty()
    }

    /// Number of distinct totals.
    pub fn len(&self) -> usize {
        self.permutations.len()
    }

    /// The largest total, or `starting_at` when empty.
    pub fn max_value(&self) -> i64 {
        self.starting_at + (self.permutations.len() as i64 - 1).max(0)
    }

    /// Total number of equally likely combinations.
    pub fn total(&self) -> BigUint {
        self.permutations.iter().sum()
    }

    /// Number of combinations producing exactly `value`.
    pub fn count_of(&self, value: i64) -> BigUint {
        self.index_of(value)
            .and_then(|i| self.permutations.get(i).cloned())
            .unwrap_or_else(BigUint::zero)
    }

    /// Every `(total, combinations)` pair in ascending order of total.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &BigUint)> + '_ {
        self.permutations
            .iter()
            .enumerate()
            .map(move |(i, count)| (self.starting_at + i as i64, count))
    }

    /// Shift every total by a constant.
    pub fn shifted(mut self, offset: i64) -> Self {
        self.starting_at += offset;
        self
    }

    /// The distribution of the negated total.
    pub fn mirrored(&self) -> Self {
        if self.is_empty() {
            return self.clone();
        }
        Self {
            starting_at: -self.max_value(),
            permutations: self.permutations.iter().rev().cloned().collect(),
        }
    }

    /// The distribution of the sum of two independent rolls.
    ///
    /// Convolving with the empty distribution yields the other operand.
    pub fn convolve(&self, other: &PermutationsResult) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let mut out = vec![BigUint::zero(); self.permutations.len() + other.permutations.len() - 1];
        for (i, a) in self.permutations.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.permutations.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Self {
            starting_at: self.starting_at + other.starting_at,
            permutations: out,
        }
    }

    /// Expected total.
    pub fn mean(&self) -> f64 {
        let total = self.total();
        if total.is_zero() {
            return 0.0;
        }
        let weighted: BigInt = self
            .iter()
            .map(|(value, count)| BigInt::from(value) * BigInt::from(count.clone()))
            .sum();
        ratio_signed(&weighted, &total)
    }

    /// Probability of rolling `x` or more.
    pub fn odds_at_least(&self, x: i64) -> f64 {
        let total = self.total();
        if total.is_zero() {
            return 0.0;
        }
        if x <= self.starting_at {
            return 1.0;
        }
        if x > self.max_value() {
            return 0.0;
        }
        let skip = (x - self.starting_at) as usize;
        let hits: BigUint = self.permutations.iter().skip(skip).sum();
        ratio(&hits, &total)
    }

    /// Probability of rolling more than `x`.
    pub fn odds_over(&self, x: i64) -> f64 {
        self.odds_at_least(x.saturating_add(1))
    }

    /// Probability of rolling less than `x`.
    pub fn odds_under(&self, x: i64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        1.0 - self.odds_at_least(x)
    }

    /// Probability of rolling `x` or less.
    pub fn odds_at_most(&self, x: i64) -> f64 {
        self.odds_under(x.saturating_add(1))
    }

    fn index_of(&self, value: i64) -> Option<usize> {
        let offset = value.checked_sub(self.starting_at)?;
        usize::try_from(offset).ok()
    }
}

/// `numerator / denominator` as a float without losing large magnitudes.
fn ratio(numerator: &BigUint, denominator: &BigUint) -> f64 {
    match (numerator.to_f64(), denominator.to_f64()) {
        (Some(n), Some(d)) if d > 0.0 => n / d,
        _ => 0.0,
    }
}

fn ratio_signed(numerator: &BigInt, denominator: &BigUint) -> f64 {
    match (numerator.to_f64(), denominator.to_f64()) {
        (Some(n), Some(d)) if d > 0.0 => n / d,
        _ => 0.0,
    }
}
