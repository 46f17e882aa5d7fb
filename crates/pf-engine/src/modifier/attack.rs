//! Attack-roll modifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::builder::AttackContext;
use crate::cost::PowerCost;
use crate::modifier::{ModifierContract, UpgradeStage};

/// Largest accuracy bonus an attack may carry.
pub const MAX_ACCURACY: i32 = 4;

/// Modifiers that change how an attack rolls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum AttackModifier {
    /// The attack targets a defense other than armor class.
    #[serde(rename = "Non-Armor Defense")]
    NonArmorDefense(NonArmorDefenseModifier),
    /// A bonus to the attack roll.
    #[serde(rename = "Accuracy")]
    Accuracy(AccuracyModifier),
    /// A miss still deals half damage.
    #[serde(rename = "Miss Half Damage")]
    MissHalfDamage,
}

impl ModifierContract for AttackModifier {
    type Context<'a> = AttackContext<'a>;

    fn name(&self) -> &'static str {
        match self {
            Self::NonArmorDefense(_) => NonArmorDefenseModifier::NAME,
            Self::Accuracy(_) => AccuracyModifier::NAME,
            Self::MissHalfDamage => "Miss Half Damage",
        }
    }

    fn cost(&self, _ctx: &AttackContext<'_>) -> PowerCost {
        match self {
            Self::NonArmorDefense(_) => PowerCost::fixed(0.5),
            Self::Accuracy(m) => PowerCost::fixed(f64::from(m.bonus) / 4.0),
            Self::MissHalfDamage => PowerCost::multiplier(1.25),
        }
    }

    fn complexity(&self, _ctx: &AttackContext<'_>) -> u32 {
        match self {
            Self::NonArmorDefense(_) | Self::Accuracy(_) => 0,
            Self::MissHalfDamage => 1,
        }
    }

    fn upgrades(&self, stage: UpgradeStage, _ctx: &AttackContext<'_>) -> Vec<Self> {
        match self {
            Self::Accuracy(m) if stage == UpgradeStage::Standard && m.bonus < MAX_ACCURACY => {
                vec![Self::Accuracy(AccuracyModifier { bonus: m.bonus + 2 })]
            }
            Self::NonArmorDefense(_) | Self::Accuracy(_) | Self::MissHalfDamage => Vec::new(),
        }
    }
}

impl fmt::Display for AttackModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonArmorDefense(m) => write!(f, "vs. {}", m.defense),
            Self::Accuracy(m) => write!(f, "+{} to hit", m.bonus),
            Self::MissHalfDamage => write!(f, "miss: half damage"),
        }
    }
}

/// A defense other than armor class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Defense {
    /// Resisting poison and force of body.
    Fortitude,
    /// Dodging.
    Reflex,
    /// Resisting the mind.
    Will,
}

impl Defense {
    /// All non-armor defenses.
    pub const ALL: [Defense; 3] = [Self::Fortitude, Self::Reflex, Self::Will];
}

impl fmt::Display for Defense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fortitude => write!(f, "Fortitude"),
            Self::Reflex => write!(f, "Reflex"),
            Self::Will => write!(f, "Will"),
        }
    }
}

/// Target a non-armor defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonArmorDefenseModifier {
    /// The defense attacked.
    pub defense: Defense,
}

impl NonArmorDefenseModifier {
    /// Display name.
    pub const NAME: &'static str = "Non-Armor Defense";
}

/// Bonus to the attack roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyModifier {
    /// Added to the d20.
    pub bonus: i32,
}

impl AccuracyModifier {
    /// Display name.
    pub const NAME: &'static str = "Accuracy";
}
