//! Whole-power modifiers and their rewrites.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::allocation::AllocationPolicy;
use crate::builder::{PowerContext, PowerProfileBuilder};
use crate::cost::PowerCost;
use crate::modifier::{Finalization, ModifierContract, TargetModifier, UpgradeStage};

/// Modifiers that restructure a whole power.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum PowerModifier {
    /// The power makes several attacks.
    #[serde(rename = "Multiattack")]
    Multiattack(MultiattackModifier),
    /// Burst attacks leave a zone behind.
    #[serde(rename = "Persistent Zone")]
    Zone(ZoneModifier),
}

impl ModifierContract for PowerModifier {
    type Context<'a> = PowerContext<'a>;

    fn name(&self) -> &'static str {
        match self {
            Self::Multiattack(_) => MultiattackModifier::NAME,
            Self::Zone(_) => ZoneModifier::NAME,
        }
    }

    fn cost(&self, _ctx: &PowerContext<'_>) -> PowerCost {
        match self {
            Self::Multiattack(_) => PowerCost::EMPTY,
            Self::Zone(_) => PowerCost::multiplier(ZoneModifier::MULTIPLIER),
        }
    }

    fn complexity(&self, _ctx: &PowerContext<'_>) -> u32 {
        1
    }

    fn upgrades(&self, _stage: UpgradeStage, _ctx: &PowerContext<'_>) -> Vec<Self> {
        Vec::new()
    }

    fn is_placeholder(&self) -> bool {
        match self {
            Self::Multiattack(m) => !m.applied,
            Self::Zone(m) => !m.applied,
        }
    }

    /// The rewrite itself resolves these placeholders.
    fn must_upgrade(&self) -> bool {
        false
    }

    fn finalize(&self, _ctx: &PowerContext<'_>) -> Finalization<Self> {
        match self {
            Self::Multiattack(m) if !m.applied => {
                let modifier = *m;
                Finalization::Rewrite(Box::new(move |power: &PowerProfileBuilder| {
                    modifier.rewrite(power)
                }))
            }
            Self::Zone(m) if !m.applied => Finalization::Rewrite(Box::new(ZoneModifier::rewrite)),
            Self::Multiattack(_) | Self::Zone(_) => Finalization::Keep,
        }
    }
}

impl fmt::Display for PowerModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Multiattack(m) => write!(f, "{} attacks", m.attacks),
            Self::Zone(_) => write!(f, "the burst creates a zone until the end of your next turn"),
        }
    }
}

/// Split a single attack into several, spreading its damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiattackModifier {
    /// Total number of attacks after the split.
    pub attacks: u32,
    /// How leftover dice favor earlier or later attacks.
    pub policy: AllocationPolicy,
    /// Set once the power has been split.
    #[serde(default)]
    pub applied: bool,
}

impl MultiattackModifier {
    /// Display name.
    pub const NAME: &'static str = "Multiattack";

    /// A split that has not happened yet.
    pub fn new(attacks: u32, policy: AllocationPolicy) -> Self {
        Self {
            attacks,
            policy,
            applied: false,
        }
    }

    /// Copies the only attack into follow-ups without its damage boost.
    fn rewrite(self, power: &PowerProfileBuilder) -> Vec<PowerProfileBuilder> {
        let [primary] = power.attacks() else {
            return Vec::new();
        };
        let follow_up = primary.without_damage_boost();
        let mut attacks = vec![primary.clone()];
        attacks.extend((1..self.attacks).map(|_| follow_up.clone()));
        let applied = Self {
            applied: true,
            ..self
        };
        vec![
            power
                .with_attacks(attacks)
                .apply_modifier(PowerModifier::Multiattack(applied)),
        ]
    }
}

/// Turn every burst into a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneModifier {
    /// Set once the bursts have been converted.
    #[serde(default)]
    pub applied: bool,
}

impl ZoneModifier {
    /// Display name.
    pub const NAME: &'static str = "Persistent Zone";

    /// Budget divisor for the lingering area.
    pub const MULTIPLIER: f64 = 1.25;

    /// Converts every burst at once; powers without a burst have no zone.
    fn rewrite(power: &PowerProfileBuilder) -> Vec<PowerProfileBuilder> {
        if !power
            .attacks()
            .iter()
            .any(|a| matches!(a.target(), TargetModifier::Burst { .. }))
        {
            return Vec::new();
        }
        let attacks = power
            .attacks()
            .iter()
            .map(|attack| match *attack.target() {
                TargetModifier::Burst { size } => attack.with_target(TargetModifier::Zone { size }),
                _ => attack.clone(),
            })
            .collect();
        vec![
            power
                .with_attacks(attacks)
                .apply_modifier(PowerModifier::Zone(Self { applied: true })),
        ]
    }
}
