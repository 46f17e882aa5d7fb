//! The immutable output of a finished search.

use pf_dice::{Ability, GameDiceExpression};
use serde::{Deserialize, Serialize};

use crate::builder::{EffectTarget, EffectType};
use crate::error::EngineResult;
use crate::modifier::{
    AttackModifier, Defense, EffectModifier, ModifierContract, PowerModifier, TargetModifier,
};
use crate::profile::{ToolRange, ToolType, Usage};

/// A finished power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerProfile {
    /// Power level.
    pub level: u32,
    /// Usage frequency.
    pub usage: Usage,
    /// Weapon or implement.
    pub tool_type: ToolType,
    /// Melee or ranged.
    pub tool_range: ToolRange,
    /// Attacks in the order they are made.
    pub attacks: Vec<AttackProfile>,
    /// Effects of the power as a whole.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<TargetEffect>,
    /// Power modifiers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<PowerModifier>,
}

impl PowerProfile {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a power back from JSON.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Every modifier name in the power, outermost first.
    pub fn modifier_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.modifiers.iter().map(|m| m.name()).collect();
        for attack in &self.attacks {
            names.push(attack.target.name());
            names.extend(attack.modifiers.iter().map(|m| m.name()));
            for effect in &attack.effects {
                names.extend(effect.modifiers.iter().map(|m| m.name()));
            }
        }
        for effect in &self.effects {
            names.extend(effect.modifiers.iter().map(|m| m.name()));
        }
        names
    }
}

/// One finished attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackProfile {
    /// Ability the attack rolls with.
    pub ability: Ability,
    /// Who the attack hits.
    pub target: TargetModifier,
    /// Effects applied on a hit.
    pub effects: Vec<TargetEffect>,
    /// Attack modifiers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<AttackModifier>,
}

impl AttackProfile {
    /// Bonus to the attack roll from accuracy modifiers.
    pub fn accuracy(&self) -> i32 {
        self.modifiers
            .iter()
            .map(|m| match m {
                AttackModifier::Accuracy(accuracy) => accuracy.bonus,
                AttackModifier::NonArmorDefense(_) | AttackModifier::MissHalfDamage => 0,
            })
            .sum()
    }

    /// The defense attacked, or `None` for armor class.
    pub fn defense(&self) -> Option<Defense> {
        self.modifiers.iter().find_map(|m| match m {
            AttackModifier::NonArmorDefense(nad) => Some(nad.defense),
            AttackModifier::Accuracy(_) | AttackModifier::MissHalfDamage => None,
        })
    }

    /// Returns true if a miss still deals half damage.
    pub fn half_damage_on_miss(&self) -> bool {
        self.modifiers.contains(&AttackModifier::MissHalfDamage)
    }

    /// Damage expressions dealt to the targets on a hit.
    pub fn damage(&self) -> impl Iterator<Item = &GameDiceExpression> + '_ {
        self.effects
            .iter()
            .filter(|e| e.target == EffectTarget::Enemy && e.effect_type == EffectType::Harmful)
            .flat_map(|e| e.modifiers.iter())
            .filter_map(|m| match m {
                EffectModifier::Damage(damage) => Some(&damage.damage),
                _ => None,
            })
    }
}

/// One finished effect slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetEffect {
    /// Who the effect applies to.
    pub target: EffectTarget,
    /// Harmful or beneficial.
    pub effect_type: EffectType,
    /// Modifiers in application order.
    pub modifiers: Vec<EffectModifier>,
}
