//! Expected damage of a finished power against a reference defender.

use pf_dice::{AbilityArray, DieCodes, GameDiceExpression, permutations};
use serde::{Deserialize, Serialize};

use crate::built::{AttackProfile, PowerProfile};
use crate::modifier::Defense;

/// Who uses the power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attacker {
    /// Ability modifiers, not raw scores.
    pub ability_modifiers: AbilityArray,
    /// What one `[W]` rolls.
    pub weapon_die: DieCodes,
    /// Level, proficiency and enhancement bonuses to hit.
    pub attack_bonus: i32,
}

impl Attacker {
    /// An attacker with ability modifiers derived from raw scores.
    pub fn from_scores(scores: [i32; 6], weapon_die: DieCodes, attack_bonus: i32) -> Self {
        Self {
            ability_modifiers: AbilityArray::from_scores(scores),
            weapon_die,
            attack_bonus,
        }
    }
}

/// Who the power is used against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defender {
    /// Armor class.
    pub armor_class: i32,
    /// Fortitude defense.
    pub fortitude: i32,
    /// Reflex defense.
    pub reflex: i32,
    /// Will defense.
    pub will: i32,
}

impl Defender {
    /// A defender with every defense equal.
    pub fn uniform(defense: i32) -> Self {
        Self {
            armor_class: defense,
            fortitude: defense,
            reflex: defense,
            will: defense,
        }
    }

    /// The number an attack must reach, `None` meaning armor class.
    pub fn defense(&self, defense: Option<Defense>) -> i32 {
        match defense {
            None => self.armor_class,
            Some(Defense::Fortitude) => self.fortitude,
            Some(Defense::Reflex) => self.reflex,
            Some(Defense::Will) => self.will,
        }
    }
}

/// Mean of an expression once the attacker's dice and modifiers are substituted.
pub fn mean_damage(expression: &GameDiceExpression, attacker: &Attacker) -> f64 {
    let resolved = expression.resolve(&attacker.weapon_die, &attacker.ability_modifiers);
    if resolved.has_dice() {
        permutations(&resolved).mean()
    } else {
        f64::from(resolved.modifier())
    }
}

impl AttackProfile {
    /// Chance that the d20 roll plus every bonus reaches the defense.
    pub fn hit_chance(&self, attacker: &Attacker, defender: &Defender) -> f64 {
        let bonus = attacker.attack_bonus
            + attacker.ability_modifiers[self.ability]
            + self.accuracy();
        let roll = DieCodes::dice(1, 20).with_modifier(bonus);
        permutations(&roll).odds_at_least(i64::from(defender.defense(self.defense())))
    }

    /// Expected damage of this attack against one target.
    pub fn expected_damage(&self, attacker: &Attacker, defender: &Defender) -> f64 {
        let hit = self.hit_chance(attacker, defender);
        let mean: f64 = self.damage().map(|d| mean_damage(d, attacker)).sum();
        let miss = if self.half_damage_on_miss() {
            (1.0 - hit) * mean / 2.0
        } else {
            0.0
        };
        hit * mean + miss
    }
}

impl PowerProfile {
    /// Expected damage of every attack against one target, summed.
    pub fn expected_damage(&self, attacker: &Attacker, defender: &Defender) -> f64 {
        self.attacks
            .iter()
            .map(|attack| attack.expected_damage(attacker, defender))
            .sum()
    }
}
