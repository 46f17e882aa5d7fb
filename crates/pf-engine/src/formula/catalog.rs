//! The reference formulas.

use crate::allocation::AllocationPolicy;
use crate::builder::{AttackContext, EffectContext, EffectTarget, EffectType, PowerContext};
use crate::formula::{Applicability, AttackFormula, EffectFormula, FormulaRegistry, PowerFormula};
use crate::modifier::{
    AccuracyModifier, AttackModifier, Condition, ConditionModifier, Defense, EffectModifier,
    ForcedMovementModifier, Movement, MultiattackModifier, NonArmorDefenseModifier, PowerModifier,
    ShiftModifier, TargetModifier, TemporaryHitPointsModifier, UpgradeStage, ZoneModifier,
};
use crate::profile::Usage;

/// Register every reference formula, in offer order.
pub fn register(registry: FormulaRegistry) -> FormulaRegistry {
    let limited = Applicability::Usage(vec![Usage::Encounter, Usage::Daily]);
    let daily = Applicability::Usage(vec![Usage::Daily]);
    registry
        .with_power_formula(limited, MultiattackFormula)
        .with_power_formula(daily.clone(), ZoneFormula)
        .with_attack_formula(Applicability::Always, NonArmorDefenseFormula)
        .with_attack_formula(Applicability::Always, AccuracyFormula)
        .with_attack_formula(daily, MissHalfDamageFormula)
        .with_effect_formula(Applicability::Always, ConditionFormula)
        .with_effect_formula(Applicability::Always, ForcedMovementFormula)
        .with_effect_formula(Applicability::Always, ShiftFormula)
        .with_effect_formula(Applicability::Always, TemporaryHitPointsFormula)
}

fn harms_enemies(ctx: &EffectContext<'_>) -> bool {
    ctx.effect().slot() == (EffectTarget::Enemy, EffectType::Harmful)
}

/// Split a lone attack into two, or three for dailies.
#[derive(Debug, Clone, Copy)]
pub struct MultiattackFormula;

impl PowerFormula for MultiattackFormula {
    fn name(&self) -> &'static str {
        MultiattackModifier::NAME
    }

    fn base_modifiers(&self, stage: UpgradeStage, ctx: &PowerContext<'_>) -> Vec<PowerModifier> {
        if stage != UpgradeStage::InitializeAttacks || ctx.power().attacks().len() != 1 {
            return Vec::new();
        }
        let counts: &[u32] = match ctx.usage() {
            Usage::AtWill => &[],
            Usage::Encounter => &[2],
            Usage::Daily => &[2, 3],
        };
        counts
            .iter()
            .flat_map(|&attacks| {
                [AllocationPolicy::Decreasing, AllocationPolicy::Increasing]
                    .map(|policy| PowerModifier::Multiattack(MultiattackModifier::new(attacks, policy)))
            })
            .collect()
    }
}

/// Linger a burst as a zone.
#[derive(Debug, Clone, Copy)]
pub struct ZoneFormula;

impl PowerFormula for ZoneFormula {
    fn name(&self) -> &'static str {
        ZoneModifier::NAME
    }

    fn base_modifiers(&self, stage: UpgradeStage, ctx: &PowerContext<'_>) -> Vec<PowerModifier> {
        let has_burst = ctx
            .power()
            .attacks()
            .iter()
            .any(|a| matches!(a.target(), TargetModifier::Burst { .. }));
        if stage == UpgradeStage::Standard && has_burst {
            vec![PowerModifier::Zone(ZoneModifier::default())]
        } else {
            Vec::new()
        }
    }
}

/// Attack Fortitude, Reflex or Will instead of armor class.
#[derive(Debug, Clone, Copy)]
pub struct NonArmorDefenseFormula;

impl AttackFormula for NonArmorDefenseFormula {
    fn name(&self) -> &'static str {
        NonArmorDefenseModifier::NAME
    }

    fn base_modifiers(&self, stage: UpgradeStage, _ctx: &AttackContext<'_>) -> Vec<AttackModifier> {
        if stage != UpgradeStage::InitializeAttacks {
            return Vec::new();
        }
        Defense::ALL
            .into_iter()
            .map(|defense| AttackModifier::NonArmorDefense(NonArmorDefenseModifier { defense }))
            .collect()
    }
}

/// +2 to hit.
#[derive(Debug, Clone, Copy)]
pub struct AccuracyFormula;

impl AttackFormula for AccuracyFormula {
    fn name(&self) -> &'static str {
        AccuracyModifier::NAME
    }

    fn base_modifiers(&self, stage: UpgradeStage, _ctx: &AttackContext<'_>) -> Vec<AttackModifier> {
        if stage == UpgradeStage::Standard {
            vec![AttackModifier::Accuracy(AccuracyModifier { bonus: 2 })]
        } else {
            Vec::new()
        }
    }
}

/// Half damage on a miss.
#[derive(Debug, Clone, Copy)]
pub struct MissHalfDamageFormula;

impl AttackFormula for MissHalfDamageFormula {
    fn name(&self) -> &'static str {
        "Miss Half Damage"
    }

    fn base_modifiers(&self, stage: UpgradeStage, _ctx: &AttackContext<'_>) -> Vec<AttackModifier> {
        if stage == UpgradeStage::Standard {
            vec![AttackModifier::MissHalfDamage]
        } else {
            Vec::new()
        }
    }
}

/// One basic condition with its duration still open.
#[derive(Debug, Clone, Copy)]
pub struct ConditionFormula;

impl EffectFormula for ConditionFormula {
    fn name(&self) -> &'static str {
        ConditionModifier::NAME
    }

    fn base_modifiers(&self, stage: UpgradeStage, ctx: &EffectContext<'_>) -> Vec<EffectModifier> {
        if stage != UpgradeStage::Standard || !harms_enemies(ctx) {
            return Vec::new();
        }
        Condition::BASIC
            .into_iter()
            .map(|condition| EffectModifier::Condition(ConditionModifier::new(condition)))
            .collect()
    }
}

/// Push, pull or slide one square.
#[derive(Debug, Clone, Copy)]
pub struct ForcedMovementFormula;

impl EffectFormula for ForcedMovementFormula {
    fn name(&self) -> &'static str {
        ForcedMovementModifier::NAME
    }

    fn base_modifiers(&self, stage: UpgradeStage, ctx: &EffectContext<'_>) -> Vec<EffectModifier> {
        if stage != UpgradeStage::Standard || !harms_enemies(ctx) {
            return Vec::new();
        }
        [Movement::Push, Movement::Pull, Movement::Slide]
            .into_iter()
            .map(|movement| {
                EffectModifier::ForcedMovement(ForcedMovementModifier {
                    movement,
                    squares: 1,
                })
            })
            .collect()
    }
}

/// The user or an ally shifts one square.
#[derive(Debug, Clone, Copy)]
pub struct ShiftFormula;

impl EffectFormula for ShiftFormula {
    fn name(&self) -> &'static str {
        ShiftModifier::NAME
    }

    fn base_modifiers(&self, stage: UpgradeStage, ctx: &EffectContext<'_>) -> Vec<EffectModifier> {
        if stage == UpgradeStage::Standard && ctx.effect().effect_type() == EffectType::Beneficial {
            vec![EffectModifier::Shift(ShiftModifier { squares: 1 })]
        } else {
            Vec::new()
        }
    }
}

/// An ally gains a few temporary hit points.
#[derive(Debug, Clone, Copy)]
pub struct TemporaryHitPointsFormula;

impl EffectFormula for TemporaryHitPointsFormula {
    fn name(&self) -> &'static str {
        TemporaryHitPointsModifier::NAME
    }

    fn base_modifiers(&self, stage: UpgradeStage, ctx: &EffectContext<'_>) -> Vec<EffectModifier> {
        if stage == UpgradeStage::Standard
            && ctx.effect().slot() == (EffectTarget::Ally, EffectType::Beneficial)
        {
            vec![EffectModifier::TemporaryHitPoints(TemporaryHitPointsModifier::new())]
        } else {
            Vec::new()
        }
    }
}
