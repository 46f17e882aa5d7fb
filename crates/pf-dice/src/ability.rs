//! The six ability scores and per-ability arrays.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// One of the six character abilities.
///
/// The declaration order is the fixed order used when rendering
/// ability terms in dice expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ability {
    /// Strength (STR).
    Strength,
    /// Constitution (CON).
    Constitution,
    /// Dexterity (DEX).
    Dexterity,
    /// Intelligence (INT).
    Intelligence,
    /// Wisdom (WIS).
    Wisdom,
    /// Charisma (CHA).
    Charisma,
}

impl Ability {
    /// All abilities in rendering order.
    pub const ALL: [Ability; 6] = [
        Self::Strength,
        Self::Constitution,
        Self::Dexterity,
        Self::Intelligence,
        Self::Wisdom,
        Self::Charisma,
    ];

    /// The three-letter abbreviation used in dice notation.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Strength => "STR",
            Self::Constitution => "CON",
            Self::Dexterity => "DEX",
            Self::Intelligence => "INT",
            Self::Wisdom => "WIS",
            Self::Charisma => "CHA",
        }
    }

    /// Parse an abbreviation like "STR" or "wis".
    pub fn from_abbreviation(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "STR" => Some(Self::Strength),
            "CON" => Some(Self::Constitution),
            "DEX" => Some(Self::Dexterity),
            "INT" => Some(Self::Intelligence),
            "WIS" => Some(Self::Wisdom),
            "CHA" => Some(Self::Charisma),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Strength => 0,
            Self::Constitution => 1,
            Self::Dexterity => 2,
            Self::Intelligence => 3,
            Self::Wisdom => 4,
            Self::Charisma => 5,
        }
    }
}

impl std::fmt::Display for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// One integer per ability.
///
/// Used both as the linear coefficients of a dice expression and as a
/// character's ability modifiers when an expression is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AbilityArray(pub [i32; 6]);

impl AbilityArray {
    /// All zeroes.
    pub const ZERO: AbilityArray = AbilityArray([0; 6]);

    /// The reference modifiers used to price ability-linked damage: +4 everywhere.
    pub const REFERENCE: AbilityArray = AbilityArray([4; 6]);

    /// An array with a single non-zero entry.
    pub fn single(ability: Ability, value: i32) -> Self {
        let mut array = Self::ZERO;
        array[ability] = value;
        array
    }

    /// Convert raw ability scores into modifiers: `floor((score - 10) / 2)`.
    pub fn from_scores(scores: [i32; 6]) -> Self {
        Self(scores.map(|score| (score - 10).div_euclid(2)))
    }

    /// Returns true if every entry is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0)
    }

    /// Sum of pairwise products with another array.
    pub fn dot(&self, other: &AbilityArray) -> i32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(0i32, |sum, (a, b)| sum.saturating_add(a.saturating_mul(*b)))
    }

    /// Iterate `(ability, value)` pairs in rendering order.
    pub fn iter(&self) -> impl Iterator<Item = (Ability, i32)> + '_ {
        Ability::ALL.iter().map(move |&a| (a, self[a]))
    }

    /// Apply a function to every entry.
    pub fn map(self, f: impl Fn(i32) -> i32) -> Self {
        Self(self.0.map(f))
    }

    /// Combine two arrays entry by entry.
    pub fn zip_with(self, other: AbilityArray, f: impl Fn(i32, i32) -> i32) -> Self {
        let mut out = Self::ZERO;
        for ability in Ability::ALL {
            out[ability] = f(self[ability], other[ability]);
        }
        out
    }

    /// Combine two arrays entry by entry, failing if any entry does.
    pub fn try_zip_with(
        self,
        other: AbilityArray,
        f: impl Fn(i32, i32) -> Option<i32>,
    ) -> Option<Self> {
        let mut out = Self::ZERO;
        for ability in Ability::ALL {
            out[ability] = f(self[ability], other[ability])?;
        }
        Some(out)
    }
}

impl Index<Ability> for AbilityArray {
    type Output = i32;

    fn index(&self, ability: Ability) -> &i32 {
        &self.0[ability.index()]
    }
}

impl IndexMut<Ability> for AbilityArray {
    fn index_mut(&mut self, ability: Ability) -> &mut i32 {
        &mut self.0[ability.index()]
    }
}
