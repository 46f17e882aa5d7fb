//! Symbolic damage formulas over dice, weapon dice, and ability scores.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ability::{Ability, AbilityArray};
use crate::die_codes::{DieCodes, Term, write_terms};
use crate::error::DiceError;
use crate::parser;

/// Average damage of one weapon die; a `d10` is the reference weapon.
pub const WEAPON_DIE_AVERAGE: f64 = 5.5;

/// Flat damage worth one weapon die.
pub const FLAT_SCALE: f64 = 4.0;

/// Step used when a boost grows along its flat axis.
pub const FLAT_INCREMENT: i32 = 2;

/// Flat value at which a boost may instead start scaling with an ability.
pub const ABILITY_UNLOCK_THRESHOLD: i32 = 2;

/// A linear formula such as `2[W] + d6 + STR + 2`.
///
/// Weapon dice are resolved later against the wielded weapon and ability
/// terms against a character's modifiers. Rendering is canonical: weapon
/// dice, dice by descending sides, abilities in fixed order, then the flat
/// modifier. Serialized as its canonical text.
///
/// The arithmetic operators saturate; the `checked_*` methods report
/// overflow instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct GameDiceExpression {
    die_codes: DieCodes,
    weapon_dice_count: i32,
    abilities: AbilityArray,
}

impl GameDiceExpression {
    /// The empty expression, rendered as `+0`.
    pub const ZERO: GameDiceExpression = GameDiceExpression {
        die_codes: DieCodes::ZERO,
        weapon_dice_count: 0,
        abilities: AbilityArray::ZERO,
    };

    /// Assemble an expression from its parts.
    pub fn new(die_codes: DieCodes, weapon_dice_count: i32, abilities: AbilityArray) -> Self {
        Self {
            die_codes,
            weapon_dice_count,
            abilities,
        }
    }

    /// `n[W]`.
    pub fn weapon(count: i32) -> Self {
        Self {
            weapon_dice_count: count,
            ..Self::ZERO
        }
    }

    /// A flat amount.
    pub fn flat(modifier: i32) -> Self {
        Self {
            die_codes: DieCodes::flat(modifier),
            ..Self::ZERO
        }
    }

    /// One times an ability modifier.
    pub fn ability(ability: Ability) -> Self {
        Self {
            abilities: AbilityArray::single(ability, 1),
            ..Self::ZERO
        }
    }

    /// Literal dice only.
    pub fn from_dice(die_codes: DieCodes) -> Self {
        Self {
            die_codes,
            ..Self::ZERO
        }
    }

    /// Parse dice notation; see the crate documentation for the grammar.
    pub fn parse(text: &str) -> Result<Self, DiceError> {
        parser::parse(text)
    }

    /// The literal dice and flat modifier.
    pub fn die_codes(&self) -> &DieCodes {
        &self.die_codes
    }

    /// Number of weapon dice.
    pub fn weapon_dice_count(&self) -> i32 {
        self.weapon_dice_count
    }

    /// Per-ability coefficients.
    pub fn abilities(&self) -> &AbilityArray {
        &self.abilities
    }

    /// The flat modifier.
    pub fn modifier(&self) -> i32 {
        self.die_codes.modifier()
    }

    /// Returns a copy with a different weapon dice count.
    pub fn with_weapon_dice_count(&self, count: i32) -> Self {
        Self {
            weapon_dice_count: count,
            ..self.clone()
        }
    }

    /// Returns a copy with different literal dice.
    pub fn with_die_codes(&self, die_codes: DieCodes) -> Self {
        Self {
            die_codes,
            ..self.clone()
        }
    }

    /// Returns a copy with the weapon dice removed.
    pub fn without_weapon_dice(&self) -> Self {
        self.with_weapon_dice_count(0)
    }

    /// Returns true if nothing remains in the expression.
    pub fn is_zero(&self) -> bool {
        self.weapon_dice_count == 0 && self.die_codes.is_zero() && self.abilities.is_zero()
    }

    /// Weapon-dice-equivalent size of the expression using the reference abilities.
    pub fn to_weapon_dice(&self) -> f64 {
        self.to_weapon_dice_with(&AbilityArray::REFERENCE)
    }

    /// Weapon-dice-equivalent size of the expression for specific ability modifiers.
    ///
    /// Literal dice count by their average against [`WEAPON_DIE_AVERAGE`];
    /// flat and ability-linked amounts count against [`FLAT_SCALE`].
    pub fn to_weapon_dice_with(&self, modifiers: &AbilityArray) -> f64 {
        let dice = self.die_codes.without_modifier().average() / WEAPON_DIE_AVERAGE;
        let flat = (f64::from(self.die_codes.modifier()) + f64::from(self.abilities.dot(modifiers)))
            / FLAT_SCALE;
        f64::from(self.weapon_dice_count) + dice + flat
    }

    /// Substitute a weapon die and ability modifiers, producing literal dice.
    pub fn resolve(&self, weapon_die: &DieCodes, modifiers: &AbilityArray) -> DieCodes {
        self.die_codes.clone()
            + weapon_die.clone() * self.weapon_dice_count
            + DieCodes::flat(self.abilities.dot(modifiers))
    }

    /// Single-step upgrades of a boost amount.
    ///
    /// The flat modifier grows by [`FLAT_INCREMENT`] while it stays within
    /// `limit`. An expression with no ability terms whose flat modifier sits
    /// exactly at [`ABILITY_UNLOCK_THRESHOLD`] also branches into one
    /// candidate per available ability, each adding that ability once.
    pub fn get_standard_increases(&self, abilities: &[Ability], limit: i32) -> Vec<Self> {
        let mut increases = Vec::new();
        let stepped = self.modifier().saturating_add(FLAT_INCREMENT);
        if stepped <= limit && stepped > self.modifier() {
            increases.push(self.with_die_codes(self.die_codes.with_modifier(stepped)));
        }
        if self.abilities.is_zero() && self.modifier() == ABILITY_UNLOCK_THRESHOLD {
            for &ability in abilities {
                increases.push(self.clone() + Self::ability(ability));
            }
        }
        increases
    }

    /// Sum of two expressions, or `None` on overflow.
    pub fn checked_add(&self, rhs: &GameDiceExpression) -> Option<GameDiceExpression> {
        Some(GameDiceExpression {
            die_codes: self.die_codes.checked_add(&rhs.die_codes)?,
            weapon_dice_count: self.weapon_dice_count.checked_add(rhs.weapon_dice_count)?,
            abilities: self
                .abilities
                .try_zip_with(rhs.abilities, i32::checked_add)?,
        })
    }

    /// Difference of two expressions, or `None` on overflow.
    pub fn checked_sub(&self, rhs: &GameDiceExpression) -> Option<GameDiceExpression> {
        self.checked_add(&rhs.checked_mul(-1)?)
    }

    /// Every coefficient scaled by `rhs`, or `None` on overflow.
    pub fn checked_mul(&self, rhs: i32) -> Option<GameDiceExpression> {
        let mut abilities = AbilityArray::ZERO;
        for (ability, value) in self.abilities.iter() {
            abilities[ability] = value.checked_mul(rhs)?;
        }
        Some(GameDiceExpression {
            die_codes: self.die_codes.checked_mul(rhs)?,
            weapon_dice_count: self.weapon_dice_count.checked_mul(rhs)?,
            abilities,
        })
    }
}

impl fmt::Display for GameDiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut terms = Vec::new();
        if self.weapon_dice_count != 0 {
            terms.push(Term {
                negative: self.weapon_dice_count < 0,
                body: match self.weapon_dice_count.unsigned_abs() {
                    1 => "[W]".to_string(),
                    n => format!("{n}[W]"),
                },
            });
        }
        for entry in self.die_codes.entries() {
            terms.push(Term {
                negative: entry.count < 0,
                body: entry.magnitude_text(),
            });
        }
        for (ability, coefficient) in self.abilities.iter() {
            if coefficient == 0 {
                continue;
            }
            terms.push(Term {
                negative: coefficient < 0,
                body: match coefficient.unsigned_abs() {
                    1 => ability.abbreviation().to_string(),
                    n => format!("{n}{}", ability.abbreviation()),
                },
            });
        }
        write_terms(f, terms, self.die_codes.modifier())
    }
}

impl FromStr for GameDiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}

impl From<GameDiceExpression> for String {
    fn from(expression: GameDiceExpression) -> Self {
        expression.to_string()
    }
}

impl TryFrom<String> for GameDiceExpression {
    type Error = DiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parser::parse(&value)
    }
}

impl From<DieCodes> for GameDiceExpression {
    fn from(die_codes: DieCodes) -> Self {
        Self::from_dice(die_codes)
    }
}

impl Add for GameDiceExpression {
    type Output = GameDiceExpression;

    fn add(self, rhs: GameDiceExpression) -> GameDiceExpression {
        GameDiceExpression {
            die_codes: self.die_codes + rhs.die_codes,
            weapon_dice_count: self.weapon_dice_count.saturating_add(rhs.weapon_dice_count),
            abilities: self.abilities.zip_with(rhs.abilities, i32::saturating_add),
        }
    }
}

impl Neg for GameDiceExpression {
    type Output = GameDiceExpression;

    fn neg(self) -> GameDiceExpression {
        self * -1
    }
}

impl Sub for GameDiceExpression {
    type Output = GameDiceExpression;

    fn sub(self, rhs: GameDiceExpression) -> GameDiceExpression {
        self + -rhs
    }
}

impl Mul<i32> for GameDiceExpression {
    type Output = GameDiceExpression;

    fn mul(self, rhs: i32) -> GameDiceExpression {
        GameDiceExpression {
            die_codes: self.die_codes * rhs,
            weapon_dice_count: self.weapon_dice_count.saturating_mul(rhs),
            abilities: self.abilities.map(|v| v.saturating_mul(rhs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::die_codes::DieCode;

    fn expr(text: &str) -> GameDiceExpression {
        text.parse().unwrap()
    }

    #[test]
    fn canonical_order() {
        insta::assert_snapshot!(expr("STR + 2 + d6 + [W]").to_string(), @"[W] + d6 + STR + 2");
        insta::assert_snapshot!(expr("WIS - 2 + 2d8 + 2[W] + DEX").to_string(), @"2[W] + 2d8 + DEX + WIS - 2");
        insta::assert_snapshot!(expr("-[W] + 2 CHA").to_string(), @"-[W] + 2CHA");
    }

    #[test]
    fn terms_merge() {
        assert_eq!(expr("[W] + [W] + STR + STR + 1 + 1").to_string(), "2[W] + 2STR + 2");
        assert_eq!(expr("STR - STR").to_string(), "+0");
    }

    #[test]
    fn arithmetic() {
        let a = GameDiceExpression::weapon(1) + GameDiceExpression::ability(Ability::Strength);
        let b = GameDiceExpression::flat(2);
        assert_eq!((a.clone() + b.clone()).to_string(), "[W] + STR + 2");
        assert_eq!((a.clone() - b).to_string(), "[W] + STR - 2");
        assert_eq!((a * 2).to_string(), "2[W] + 2STR");
    }

    #[test]
    fn weapon_dice_equivalent() {
        assert!((expr("[W]").to_weapon_dice() - 1.0).abs() < 1e-9);
        assert!((expr("STR").to_weapon_dice() - 1.0).abs() < 1e-9);
        assert!((expr("2").to_weapon_dice() - 0.5).abs() < 1e-9);
        assert!((expr("d10").to_weapon_dice() - 1.0).abs() < 1e-9);
        assert!((expr("2[W] + STR + 2").to_weapon_dice() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn resolve_against_weapon_and_abilities() {
        let modifiers = AbilityArray::from_scores([18, 10, 10, 10, 10, 10]);
        let resolved = expr("2[W] + STR + 1").resolve(&DieCodes::dice(1, 8), &modifiers);
        assert_eq!(resolved, DieCodes::new([DieCode::new(2, 8)], 5));
    }

    #[test]
    fn standard_increases_step_flat() {
        let increases = expr("STR").get_standard_increases(&Ability::ALL, 4);
        assert_eq!(increases, vec![expr("STR + 2")]);
    }

    #[test]
    fn standard_increases_respect_limit() {
        let increases = expr("STR + 4").get_standard_increases(&Ability::ALL, 4);
        assert!(increases.is_empty());
    }

    #[test]
    fn standard_increases_unlock_abilities_at_threshold() {
        let increases =
            expr("2").get_standard_increases(&[Ability::Wisdom, Ability::Charisma], 6);
        let rendered: Vec<String> = increases.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["4", "WIS + 2", "CHA + 2"]);
    }

    #[test]
    fn standard_increases_skip_abilities_off_threshold() {
        let increases = expr("4").get_standard_increases(&[Ability::Wisdom], 6);
        assert_eq!(increases, vec![expr("6")]);
    }

    #[test]
    fn serializes_as_text() {
        let json = serde_json::to_string(&expr("STR + [W]")).unwrap();
        assert_eq!(json, "\"[W] + STR\"");
        let back: GameDiceExpression = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr("[W] + STR"));
        assert!(serde_json::from_str::<GameDiceExpression>("\"2d\"").is_err());
    }

    #[test]
    fn checked_arithmetic_detects_overflow() {
        let weapons = GameDiceExpression::weapon(i32::MAX);
        assert_eq!(weapons.checked_add(&GameDiceExpression::weapon(1)), None);
        let strength = GameDiceExpression::ability(Ability::Strength) * i32::MAX;
        assert_eq!(strength.checked_add(&GameDiceExpression::ability(Ability::Strength)), None);
        assert_eq!(GameDiceExpression::flat(i32::MIN).checked_sub(&expr("1")), None);
        assert_eq!(expr("[W] + 2").checked_sub(&expr("2")), Some(expr("[W]")));
    }

    #[test]
    fn operators_saturate() {
        let weapons = GameDiceExpression::weapon(i32::MAX) + GameDiceExpression::weapon(1);
        assert_eq!(weapons.weapon_dice_count(), i32::MAX);
        let strength = GameDiceExpression::ability(Ability::Strength) * i32::MAX * 2;
        assert_eq!(strength.abilities()[Ability::Strength], i32::MAX);
    }
}
