//! Attack targeting.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::builder::AttackContext;
use crate::cost::PowerCost;
use crate::modifier::{ModifierContract, UpgradeStage};
use crate::profile::ToolRange;

/// Most creatures a multiple-target attack may pick.
pub const MAX_TARGETS: u32 = 3;
/// Largest burst or zone radius.
pub const MAX_BURST: u32 = 2;
/// Smallest and largest blast side.
pub const BLAST_SIZES: (u32, u32) = (3, 5);

/// Who an attack hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum TargetModifier {
    /// One creature.
    Single,
    /// Several creatures, each attacked separately.
    Multiple {
        /// Number of creatures.
        count: u32,
    },
    /// Each creature within `size` squares of the origin.
    Burst {
        /// Radius in squares.
        size: u32,
    },
    /// Each creature in an adjacent square area.
    Blast {
        /// Side length in squares.
        size: u32,
    },
    /// A burst that leaves a lingering zone behind.
    Zone {
        /// Radius in squares.
        size: u32,
    },
}

impl TargetModifier {
    /// Returns true for targets that cover an area.
    pub fn is_area(&self) -> bool {
        matches!(self, Self::Burst { .. } | Self::Blast { .. } | Self::Zone { .. })
    }

    /// How much the budget is divided to cover every target.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Single => 1.0,
            Self::Multiple { count } => 1.0 + 0.5 * f64::from(count.saturating_sub(1)),
            Self::Burst { size } | Self::Zone { size } => 1.0 + 0.5 * f64::from(*size),
            Self::Blast { size } => 1.0 + 0.25 * f64::from(size.saturating_sub(1)),
        }
    }

    fn first_upgrades(range: ToolRange) -> Vec<Self> {
        match range {
            ToolRange::Melee => vec![
                Self::Burst { size: 1 },
                Self::Blast {
                    size: BLAST_SIZES.0,
                },
            ],
            ToolRange::Ranged => vec![Self::Multiple { count: 2 }, Self::Burst { size: 1 }],
        }
    }
}

impl ModifierContract for TargetModifier {
    type Context<'a> = AttackContext<'a>;

    fn name(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Multiple { .. } => "Multiple",
            Self::Burst { .. } => "Burst",
            Self::Blast { .. } => "Blast",
            Self::Zone { .. } => "Zone",
        }
    }

    /// Area and multiple targets divide the budget but leave each target's
    /// share untouched.
    fn cost(&self, _ctx: &AttackContext<'_>) -> PowerCost {
        PowerCost {
            multiplier: self.multiplier(),
            ..PowerCost::EMPTY
        }
    }

    fn complexity(&self, _ctx: &AttackContext<'_>) -> u32 {
        match self {
            Self::Single => 0,
            Self::Multiple { .. } | Self::Burst { .. } | Self::Blast { .. } | Self::Zone { .. } => 1,
        }
    }

    fn upgrades(&self, stage: UpgradeStage, ctx: &AttackContext<'_>) -> Vec<Self> {
        if stage != UpgradeStage::InitializeAttacks {
            return Vec::new();
        }
        match *self {
            Self::Single => Self::first_upgrades(ctx.tool().range),
            Self::Multiple { count } if count < MAX_TARGETS => {
                vec![Self::Multiple { count: count + 1 }]
            }
            Self::Burst { size } if size < MAX_BURST => vec![Self::Burst { size: size + 1 }],
            Self::Blast { size } if size < BLAST_SIZES.1 => vec![Self::Blast { size: size + 1 }],
            Self::Multiple { .. } | Self::Burst { .. } | Self::Blast { .. } | Self::Zone { .. } => {
                Vec::new()
            }
        }
    }
}

impl fmt::Display for TargetModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "one creature"),
            Self::Multiple { count } => write!(f, "{count} creatures"),
            Self::Burst { size } => write!(f, "each creature in burst {size}"),
            Self::Blast { size } => write!(f, "each creature in blast {size}"),
            Self::Zone { size } => write!(f, "each creature in zone {size}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{AttackProfileBuilder, PowerProfileBuilder};
    use crate::profile::{ToolProfile, Usage};
    use pf_dice::Ability;

    fn power(tool: ToolProfile) -> PowerProfileBuilder {
        PowerProfileBuilder::for_level(1, Usage::Encounter, tool)
            .unwrap()
            .with_added_attack(AttackProfileBuilder::new(Ability::Dexterity))
    }

    #[test]
    fn multipliers_stay_in_range() {
        let cases = [
            (TargetModifier::Single, 1.0),
            (TargetModifier::Multiple { count: 2 }, 1.5),
            (TargetModifier::Multiple { count: 3 }, 2.0),
            (TargetModifier::Burst { size: 1 }, 1.5),
            (TargetModifier::Burst { size: 2 }, 2.0),
            (TargetModifier::Blast { size: 3 }, 1.5),
            (TargetModifier::Blast { size: 5 }, 2.0),
            (TargetModifier::Zone { size: 1 }, 1.5),
        ];
        for (target, expected) in cases {
            assert!(
                (target.multiplier() - expected).abs() < 1e-9,
                "{target}: {}",
                target.multiplier()
            );
        }
    }

    #[test]
    fn area_keeps_single_target_share() {
        let power = power(ToolProfile::melee_weapon());
        let ctx = AttackContext::new(&power, 0);
        let cost = TargetModifier::Burst { size: 1 }.cost(&ctx);
        assert!((cost.multiplier - 1.5).abs() < 1e-9);
        assert!((cost.single_target_multiplier - 1.0).abs() < 1e-9);
    }

    #[test]
    fn first_upgrades_depend_on_range() {
        let melee = power(ToolProfile::melee_weapon());
        let ctx = AttackContext::new(&melee, 0);
        assert_eq!(
            TargetModifier::Single.upgrades(UpgradeStage::InitializeAttacks, &ctx),
            vec![TargetModifier::Burst { size: 1 }, TargetModifier::Blast { size: 3 }]
        );

        let ranged = power(ToolProfile::ranged_weapon());
        let ctx = AttackContext::new(&ranged, 0);
        assert_eq!(
            TargetModifier::Single.upgrades(UpgradeStage::InitializeAttacks, &ctx),
            vec![TargetModifier::Multiple { count: 2 }, TargetModifier::Burst { size: 1 }]
        );
        assert!(TargetModifier::Single
            .upgrades(UpgradeStage::Standard, &ctx)
            .is_empty());
    }

    #[test]
    fn growth_is_capped() {
        let melee = power(ToolProfile::melee_weapon());
        let ctx = AttackContext::new(&melee, 0);
        let stage = UpgradeStage::InitializeAttacks;
        assert!(TargetModifier::Burst { size: 2 }.upgrades(stage, &ctx).is_empty());
        assert!(TargetModifier::Blast { size: 5 }.upgrades(stage, &ctx).is_empty());
        assert!(TargetModifier::Multiple { count: 3 }.upgrades(stage, &ctx).is_empty());
        assert!(TargetModifier::Zone { size: 1 }.upgrades(stage, &ctx).is_empty());
        assert_eq!(
            TargetModifier::Blast { size: 3 }.upgrades(stage, &ctx),
            vec![TargetModifier::Blast { size: 4 }]
        );
    }

    #[test]
    fn serializes_with_name_tag() {
        let json = serde_json::to_string(&TargetModifier::Burst { size: 2 }).unwrap();
        assert_eq!(json, r#"{"name":"Burst","size":2}"#);
        let single: TargetModifier = serde_json::from_str(r#"{"name":"Single"}"#).unwrap();
        assert_eq!(single, TargetModifier::Single);
    }
}
