//! Memoizing distribution builder.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use crate::die_codes::{DieCode, DieCodes};

use super::PermutationsResult;

/// Builds and caches exact roll distributions.
///
/// Entries are keyed by the merged dice signature without the flat
/// modifier, so `2d6`, `d6 + d6` and `2d6 + 3` share one entry. Each
/// single-sided term is cached on its own as well, so `2d6 + d4` reuses the
/// `2d6` histogram computed for an earlier request.
#[derive(Debug, Default)]
pub struct PermutationEngine {
    cache: HashMap<Vec<DieCode>, PermutationsResult>,
}

impl PermutationEngine {
    /// Create an engine with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct dice shapes held in the cache.
    pub fn cached_shapes(&self) -> usize {
        self.cache.len()
    }

    /// The exact distribution of `dice`, including its flat modifier.
    ///
    /// Zero dice produce [`PermutationsResult::empty`] whatever the modifier.
    pub fn permutations(&mut self, dice: &DieCodes) -> PermutationsResult {
        if !dice.has_dice() {
            return PermutationsResult::empty();
        }
        let key = dice.entries().to_vec();
        let shape = match self.cache.get(&key) {
            Some(hit) => hit.clone(),
            None => {
                let mut combined = PermutationsResult::empty();
                for &term in dice.entries() {
                    let term = self.term(term);
                    combined = combined.convolve(&term);
                }
                self.cache.insert(key, combined.clone());
                combined
            }
        };
        shape.shifted(i64::from(dice.modifier()))
    }

    fn term(&mut self, term: DieCode) -> PermutationsResult {
        let key = vec![term];
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }
        let die = PermutationsResult::single_die(term.sides);
        let mut rolled = die.clone();
        for _ in 1..term.count.unsigned_abs() {
            rolled = rolled.convolve(&die);
        }
        if term.count < 0 {
            rolled = rolled.mirrored();
        }
        self.cache.insert(key, rolled.clone());
        rolled
    }
}

static ENGINE: LazyLock<Mutex<PermutationEngine>> =
    LazyLock::new(|| Mutex::new(PermutationEngine::new()));

/// The exact distribution of `dice`, memoized for the life of the process.
pub fn permutations(dice: &DieCodes) -> PermutationsResult {
    ENGINE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .permutations(dice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn shares_entries_across_spellings() {
        let mut engine = PermutationEngine::new();
        let a = engine.permutations(&"2d6".parse().unwrap());
        let shapes = engine.cached_shapes();
        let b = engine.permutations(&"d6 + d6 + 3".parse().unwrap());
        assert_eq!(engine.cached_shapes(), shapes);
        assert_eq!(b.starting_at(), a.starting_at() + 3);
        assert_eq!(a.permutations(), b.permutations());
    }

    #[test]
    fn reuses_single_terms() {
        let mut engine = PermutationEngine::new();
        engine.permutations(&"2d6".parse().unwrap());
        assert_eq!(engine.cached_shapes(), 1);
        engine.permutations(&"2d6 + d4".parse().unwrap());
        // the d4 term and the combined shape
        assert_eq!(engine.cached_shapes(), 3);
    }

    #[test]
    fn flat_modifier_only_is_empty() {
        let mut engine = PermutationEngine::new();
        assert!(engine.permutations(&DieCodes::flat(5)).is_empty());
        assert_eq!(engine.cached_shapes(), 0);
    }

    #[test]
    fn negative_dice() {
        let result = permutations(&"-2d4".parse().unwrap());
        assert_eq!(result.starting_at(), -8);
        assert_eq!(result.max_value(), -2);
        assert!((result.mean() + 5.0).abs() < 1e-12);
    }

    #[test]
    fn mixed_signs() {
        let result = permutations(&"d6 - d6".parse().unwrap());
        // d6 - d6 merges to nothing
        assert!(result.is_empty());
        let result = permutations(&"d8 - d4".parse().unwrap());
        assert_eq!(result.starting_at(), -3);
        assert_eq!(result.max_value(), 7);
        assert_eq!(result.total(), BigUint::from(32u32));
    }

    #[test]
    fn known_values() {
        let d6 = permutations(&"d6".parse().unwrap());
        assert!((d6.odds_at_least(4) - 0.5).abs() < 1e-12);
        assert!(d6.odds_at_least(7).abs() < f64::EPSILON);

        let many = permutations(&"30d6".parse().unwrap());
        assert_eq!(many.total(), BigUint::from(6u32).pow(30));
        assert!((many.odds_under(100) - 0.2791).abs() < 1e-3);
        assert!((many.mean() - 105.0).abs() < 1e-9);
    }
}
