//! Effect modifiers: what happens to whoever an effect slot targets.

use std::fmt;

use pf_dice::{GameDiceExpression, expression::FLAT_INCREMENT};
use serde::{Deserialize, Serialize};

use crate::allocation;
use crate::builder::EffectContext;
use crate::cost::PowerCost;
use crate::modifier::{Finalization, ModifierContract, UpgradeStage};
use crate::profile::{DamageType, ToolType, Usage};

/// Tolerance when comparing budget amounts.
const EPSILON: f64 = 1e-9;

/// Most squares a forced movement or shift may cover.
pub const MAX_SQUARES: u32 = 3;

/// Modifiers attached to a target effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum EffectModifier {
    /// Damage dealt to the target.
    #[serde(rename = "Damage")]
    Damage(DamageModifier),
    /// Conditions imposed on the target.
    #[serde(rename = "Condition")]
    Condition(ConditionModifier),
    /// The target is moved against its will.
    #[serde(rename = "Forced Movement")]
    ForcedMovement(ForcedMovementModifier),
    /// The target moves without provoking.
    #[serde(rename = "Shift")]
    Shift(ShiftModifier),
    /// The target gains temporary hit points.
    #[serde(rename = "Temporary Hit Points")]
    TemporaryHitPoints(TemporaryHitPointsModifier),
}

impl ModifierContract for EffectModifier {
    type Context<'a> = EffectContext<'a>;

    fn name(&self) -> &'static str {
        match self {
            Self::Damage(_) => DamageModifier::NAME,
            Self::Condition(_) => ConditionModifier::NAME,
            Self::ForcedMovement(_) => ForcedMovementModifier::NAME,
            Self::Shift(_) => ShiftModifier::NAME,
            Self::TemporaryHitPoints(_) => TemporaryHitPointsModifier::NAME,
        }
    }

    fn cost(&self, _ctx: &EffectContext<'_>) -> PowerCost {
        match self {
            Self::Damage(m) => PowerCost::fixed(m.damage.to_weapon_dice()),
            Self::Condition(m) => PowerCost::fixed(m.cost()),
            Self::ForcedMovement(m) => PowerCost::fixed(m.cost()),
            Self::Shift(m) => PowerCost::fixed(m.cost()),
            Self::TemporaryHitPoints(m) => PowerCost::fixed(m.amount.to_weapon_dice()),
        }
    }

    fn complexity(&self, _ctx: &EffectContext<'_>) -> u32 {
        match self {
            Self::Damage(_) => 0,
            Self::Condition(m) => m.complexity(),
            Self::ForcedMovement(_) | Self::Shift(_) | Self::TemporaryHitPoints(_) => 1,
        }
    }

    fn upgrades(&self, stage: UpgradeStage, ctx: &EffectContext<'_>) -> Vec<Self> {
        match self {
            Self::Damage(m) => m.upgrades(stage, ctx).into_iter().map(Self::Damage).collect(),
            Self::Condition(m) => m
                .upgrades(stage, ctx.usage())
                .into_iter()
                .map(Self::Condition)
                .collect(),
            Self::ForcedMovement(m) if stage == UpgradeStage::Standard => m
                .farther()
                .into_iter()
                .map(Self::ForcedMovement)
                .collect(),
            Self::Shift(m) if stage == UpgradeStage::Standard => {
                m.farther().into_iter().map(Self::Shift).collect()
            }
            Self::TemporaryHitPoints(m) if stage == UpgradeStage::Standard => m
                .upgrades(ctx)
                .into_iter()
                .map(Self::TemporaryHitPoints)
                .collect(),
            Self::ForcedMovement(_) | Self::Shift(_) | Self::TemporaryHitPoints(_) => Vec::new(),
        }
    }

    fn is_placeholder(&self) -> bool {
        match self {
            Self::Condition(m) => m.duration == Duration::Undecided,
            Self::Damage(_)
            | Self::ForcedMovement(_)
            | Self::Shift(_)
            | Self::TemporaryHitPoints(_) => false,
        }
    }

    fn finalize(&self, ctx: &EffectContext<'_>) -> Finalization<Self> {
        match self {
            Self::Condition(m) => match m.finalized() {
                Finalization::Keep => Finalization::Keep,
                Finalization::Replace(m) => Finalization::Replace(Self::Condition(m)),
                Finalization::Remove => Finalization::Remove,
                Finalization::Rewrite(rewrite) => Finalization::Rewrite(rewrite),
            },
            Self::ForcedMovement(m) => {
                let area = ctx.attack().is_some_and(|a| a.target().is_area());
                if m.squares == 0 {
                    Finalization::Remove
                } else if area && m.movement == Movement::Pull {
                    Finalization::Replace(Self::ForcedMovement(ForcedMovementModifier {
                        movement: Movement::Push,
                        squares: m.squares,
                    }))
                } else {
                    Finalization::Keep
                }
            }
            Self::Shift(m) if m.squares == 0 => Finalization::Remove,
            Self::Damage(_) | Self::Shift(_) | Self::TemporaryHitPoints(_) => Finalization::Keep,
        }
    }
}

impl fmt::Display for EffectModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Damage(m) => {
                write!(f, "{} damage", m.damage)?;
                if !m.damage_types.is_empty() && m.damage_types != [DamageType::Normal] {
                    let types: Vec<String> = m.damage_types.iter().map(ToString::to_string).collect();
                    write!(f, " ({})", types.join(", "))?;
                }
                Ok(())
            }
            Self::Condition(m) => write!(f, "{m}"),
            Self::ForcedMovement(m) => write!(f, "{} {} squares", m.movement, m.squares),
            Self::Shift(m) => write!(f, "shift {} squares", m.squares),
            Self::TemporaryHitPoints(m) => write!(f, "{} temporary hit points", m.amount),
        }
    }
}

/// Damage as a boost expression on top of the allocated weapon dice.
///
/// While the power is being built `damage` holds only the boost, e.g.
/// `STR`; the allocated dice are written in when the power is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageModifier {
    /// The damage formula.
    pub damage: GameDiceExpression,
    /// Damage types dealt.
    pub damage_types: Vec<DamageType>,
}

impl DamageModifier {
    /// Display name.
    pub const NAME: &'static str = "Damage";

    /// Damage with a boost and damage types.
    pub fn new(damage: GameDiceExpression, damage_types: Vec<DamageType>) -> Self {
        Self {
            damage,
            damage_types,
        }
    }

    /// The same damage types with no boost.
    pub fn without_boost(&self) -> Self {
        Self {
            damage: GameDiceExpression::ZERO,
            damage_types: self.damage_types.clone(),
        }
    }

    /// Write allocated weapon dice into the expression.
    ///
    /// Weapons count whole `[W]`; implements convert to a best-fit die.
    pub fn with_allocated(&self, weapon_dice: f64, tool_type: ToolType) -> Self {
        let damage = match tool_type {
            ToolType::Weapon => self
                .damage
                .with_weapon_dice_count(self.damage.weapon_dice_count() + weapon_dice.round() as i32),
            ToolType::Implement => {
                self.damage.clone() + GameDiceExpression::from(allocation::implement_dice(weapon_dice))
            }
        };
        Self {
            damage,
            damage_types: self.damage_types.clone(),
        }
    }

    fn upgrades(&self, stage: UpgradeStage, ctx: &EffectContext<'_>) -> Vec<Self> {
        if self.damage.is_zero() {
            return Vec::new();
        }
        let power = ctx.power();
        let increases = self
            .damage
            .get_standard_increases(&power.tool().abilities, boost_limit(power.level()));
        let increases = match stage {
            UpgradeStage::InitializeAttacks => increases,
            UpgradeStage::Finalize if power.tool().is_weapon() => {
                let leftover = allocation::allocate(power).leftover;
                let current = self.damage.to_weapon_dice();
                increases
                    .into_iter()
                    .filter(|i| i.to_weapon_dice() - current <= leftover + EPSILON)
                    .collect()
            }
            UpgradeStage::Standard | UpgradeStage::Finalize => Vec::new(),
        };
        increases
            .into_iter()
            .map(|damage| Self {
                damage,
                damage_types: self.damage_types.clone(),
            })
            .collect()
    }
}

/// Largest flat boost for a level: +4, and +2 more per tier.
fn boost_limit(level: u32) -> i32 {
    let tier = level.saturating_sub(1) / 10;
    4 + FLAT_INCREMENT * tier as i32
}

/// A condition imposed on a creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// Can take only one action per turn.
    Dazed,
    /// Speed drops to 2.
    Slowed,
    /// Attackers gain combat advantage against it.
    GrantsCombatAdvantage,
    /// Deals half damage.
    Weakened,
    /// Cannot move.
    Immobilized,
    /// Cannot see.
    Blinded,
    /// Can take no actions.
    Stunned,
}

impl Condition {
    /// Conditions offered when a condition is first added, in offer order.
    pub const BASIC: [Condition; 5] = [
        Self::Dazed,
        Self::Slowed,
        Self::Weakened,
        Self::Immobilized,
        Self::GrantsCombatAdvantage,
    ];

    /// Cost in weapon dice for a duration of one turn.
    pub fn cost(self) -> f64 {
        match self {
            Self::Dazed | Self::Slowed | Self::GrantsCombatAdvantage => 0.5,
            Self::Weakened | Self::Immobilized | Self::Blinded => 1.0,
            Self::Stunned => 2.0,
        }
    }

    /// Returns true if the condition already grants combat advantage.
    pub fn implies_combat_advantage(self) -> bool {
        matches!(self, Self::Dazed | Self::Stunned | Self::Blinded)
    }

    /// The stronger condition this one can grow into.
    pub fn escalation(self) -> Option<Condition> {
        match self {
            Self::Dazed => Some(Self::Stunned),
            Self::Slowed => Some(Self::Immobilized),
            _ => None,
        }
    }

    /// The weaker condition this one makes redundant.
    fn subsumes(self) -> Option<Condition> {
        match self {
            Self::Stunned => Some(Self::Dazed),
            Self::Immobilized => Some(Self::Slowed),
            _ => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dazed => write!(f, "dazed"),
            Self::Slowed => write!(f, "slowed"),
            Self::GrantsCombatAdvantage => write!(f, "grants combat advantage"),
            Self::Weakened => write!(f, "weakened"),
            Self::Immobilized => write!(f, "immobilized"),
            Self::Blinded => write!(f, "blinded"),
            Self::Stunned => write!(f, "stunned"),
        }
    }
}

/// How long a condition lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Duration {
    /// Not chosen yet.
    Undecided,
    /// Until the end of the user's next turn.
    EndOfUserNextTurn,
    /// Until the target succeeds on a saving throw.
    SaveEnds,
}

impl Duration {
    fn cost_factor(self) -> f64 {
        match self {
            Self::Undecided | Self::EndOfUserNextTurn => 1.0,
            Self::SaveEnds => 2.0,
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undecided => write!(f, "undecided"),
            Self::EndOfUserNextTurn => write!(f, "until the end of your next turn"),
            Self::SaveEnds => write!(f, "save ends"),
        }
    }
}

/// One or more conditions with a shared duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionModifier {
    /// Conditions in the order they were added.
    pub conditions: Vec<Condition>,
    /// Shared duration.
    pub duration: Duration,
    /// Condition that lingers once a save ends the others.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_effect: Option<Condition>,
}

impl ConditionModifier {
    /// Display name.
    pub const NAME: &'static str = "Condition";

    /// A single condition whose duration is still undecided.
    pub fn new(condition: Condition) -> Self {
        Self {
            conditions: vec![condition],
            duration: Duration::Undecided,
            after_effect: None,
        }
    }

    /// Summed condition cost scaled by duration, plus half a die for an after-effect.
    pub fn cost(&self) -> f64 {
        let conditions: f64 = self.conditions.iter().map(|c| c.cost()).sum();
        let after_effect = if self.after_effect.is_some() { 0.5 } else { 0.0 };
        conditions * self.duration.cost_factor() + after_effect
    }

    /// One, plus one for save ends and one for an after-effect.
    pub fn complexity(&self) -> u32 {
        1 + u32::from(self.duration == Duration::SaveEnds) + u32::from(self.after_effect.is_some())
    }

    /// Returns true if the condition is present or already implied.
    fn has(&self, condition: Condition) -> bool {
        self.conditions.iter().any(|&c| {
            c == condition
                || c.subsumes() == Some(condition)
                || (condition == Condition::GrantsCombatAdvantage && c.implies_combat_advantage())
        })
    }

    fn with_conditions(&self, conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            ..self.clone()
        }
    }

    fn upgrades(&self, stage: UpgradeStage, usage: Usage) -> Vec<Self> {
        if self.duration == Duration::Undecided {
            let mut decided = vec![Self {
                duration: Duration::EndOfUserNextTurn,
                ..self.clone()
            }];
            if usage != Usage::AtWill {
                decided.push(Self {
                    duration: Duration::SaveEnds,
                    ..self.clone()
                });
            }
            return decided;
        }
        if stage != UpgradeStage::Standard {
            return Vec::new();
        }

        let mut upgrades = Vec::new();
        for condition in Condition::BASIC {
            if !self.has(condition) {
                let mut conditions = self.conditions.clone();
                conditions.push(condition);
                upgrades.push(self.with_conditions(conditions));
            }
        }
        if usage == Usage::Daily {
            for (index, condition) in self.conditions.iter().enumerate() {
                if let Some(stronger) = condition.escalation() {
                    if !self.has(stronger) {
                        let mut conditions = self.conditions.clone();
                        conditions[index] = stronger;
                        upgrades.push(self.with_conditions(conditions));
                    }
                }
            }
            if self.duration == Duration::SaveEnds && self.after_effect.is_none() {
                for lingering in [Condition::Slowed, Condition::Dazed] {
                    if !self.has(lingering) {
                        upgrades.push(Self {
                            after_effect: Some(lingering),
                            ..self.clone()
                        });
                    }
                }
            }
        }
        upgrades
    }

    fn finalized(&self) -> Finalization<Self> {
        if self.conditions.is_empty() {
            return Finalization::Remove;
        }
        let implied = self.conditions.iter().any(|c| c.implies_combat_advantage());
        if implied && self.conditions.contains(&Condition::GrantsCombatAdvantage) {
            let conditions = self
                .conditions
                .iter()
                .copied()
                .filter(|&c| c != Condition::GrantsCombatAdvantage)
                .collect();
            return Finalization::Replace(self.with_conditions(conditions));
        }
        Finalization::Keep
    }
}

impl fmt::Display for ConditionModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conditions: Vec<String> = self.conditions.iter().map(ToString::to_string).collect();
        write!(f, "{} ({})", conditions.join(" and "), self.duration)?;
        if let Some(after_effect) = self.after_effect {
            write!(f, "; after effect: {after_effect}")?;
        }
        Ok(())
    }
}

/// Direction of a forced movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Movement {
    /// Away from the user.
    Push,
    /// Toward the user.
    Pull,
    /// Any direction.
    Slide,
}

impl Movement {
    /// Cost per square moved.
    pub fn cost_per_square(self) -> f64 {
        match self {
            Self::Push | Self::Pull => 0.5,
            Self::Slide => 0.75,
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::Pull => write!(f, "pull"),
            Self::Slide => write!(f, "slide"),
        }
    }
}

/// Push, pull or slide the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedMovementModifier {
    /// Direction.
    pub movement: Movement,
    /// Distance in squares.
    pub squares: u32,
}

impl ForcedMovementModifier {
    /// Display name.
    pub const NAME: &'static str = "Forced Movement";

    /// Cost of the movement.
    pub fn cost(&self) -> f64 {
        self.movement.cost_per_square() * f64::from(self.squares)
    }

    fn farther(&self) -> Option<Self> {
        (self.squares < MAX_SQUARES).then_some(Self {
            squares: self.squares + 1,
            ..*self
        })
    }
}

/// The target shifts a number of squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftModifier {
    /// Distance in squares.
    pub squares: u32,
}

impl ShiftModifier {
    /// Display name.
    pub const NAME: &'static str = "Shift";

    /// Half a die per square.
    pub fn cost(&self) -> f64 {
        0.5 * f64::from(self.squares)
    }

    fn farther(&self) -> Option<Self> {
        (self.squares < MAX_SQUARES).then_some(Self {
            squares: self.squares + 1,
        })
    }
}

/// The target gains temporary hit points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryHitPointsModifier {
    /// Hit points granted.
    pub amount: GameDiceExpression,
}

impl TemporaryHitPointsModifier {
    /// Display name.
    pub const NAME: &'static str = "Temporary Hit Points";

    /// The starting grant of two hit points.
    pub fn new() -> Self {
        Self {
            amount: GameDiceExpression::flat(2),
        }
    }

    fn upgrades(&self, ctx: &EffectContext<'_>) -> Vec<Self> {
        let power = ctx.power();
        self.amount
            .get_standard_increases(&power.tool().abilities, boost_limit(power.level()))
            .into_iter()
            .map(|amount| Self { amount })
            .collect()
    }
}

impl Default for TemporaryHitPointsModifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{
        AttackProfileBuilder, EffectLocation, EffectTarget, EffectType, PowerProfileBuilder,
        TargetEffectBuilder,
    };
    use crate::modifier::TargetModifier;
    use crate::profile::ToolProfile;
    use pf_dice::Ability;

    fn power(usage: Usage, tool: ToolProfile) -> PowerProfileBuilder {
        let damage = DamageModifier::new(
            GameDiceExpression::ability(Ability::Strength),
            vec![DamageType::Normal],
        );
        let attack = AttackProfileBuilder::new(Ability::Strength).with_added_target_effect(
            TargetEffectBuilder::new(EffectTarget::Enemy, EffectType::Harmful)
                .apply_modifier(EffectModifier::Damage(damage)),
        );
        PowerProfileBuilder::for_level(1, usage, tool)
            .unwrap()
            .with_added_attack(attack)
    }

    const HIT: EffectLocation = EffectLocation::Attack {
        attack: 0,
        effect: 0,
    };

    #[test]
    fn names_serialize_as_tags() {
        let shift = EffectModifier::Shift(ShiftModifier { squares: 2 });
        let json = serde_json::to_string(&shift).unwrap();
        assert_eq!(json, r#"{"name":"Shift","squares":2}"#);
        let movement = EffectModifier::ForcedMovement(ForcedMovementModifier {
            movement: Movement::Slide,
            squares: 1,
        });
        let json = serde_json::to_string(&movement).unwrap();
        let back: EffectModifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, movement);
        assert!(json.contains("\"Forced Movement\""));
    }

    #[test]
    fn damage_costs_its_boost() {
        let power = power(Usage::AtWill, ToolProfile::melee_weapon());
        let ctx = EffectContext::new(&power, HIT);
        let damage = &ctx.effect().modifiers()[0];
        assert!((damage.cost(&ctx).fixed - 1.0).abs() < 1e-9);
        assert_eq!(damage.complexity(&ctx), 0);
    }

    #[test]
    fn damage_grows_only_while_shaping_attacks() {
        let power = power(Usage::Encounter, ToolProfile::melee_weapon());
        let ctx = EffectContext::new(&power, HIT);
        let damage = &ctx.effect().modifiers()[0];
        let grown = damage.upgrades(UpgradeStage::InitializeAttacks, &ctx);
        assert_eq!(grown.len(), 1);
        assert_eq!(grown[0].to_string(), "STR + 2 damage");
        assert!(damage.upgrades(UpgradeStage::Standard, &ctx).is_empty());
    }

    #[test]
    fn weapon_damage_spends_leftover_at_finalize() {
        // 2.0 remaining over a 1.5 burst weight buys one die and leaves 0.5
        let base = power(Usage::Encounter, ToolProfile::melee_weapon());
        let burst = base.attacks()[0].with_target(TargetModifier::Burst { size: 1 });
        let power = base.with_attack(0, burst.clone());
        let ctx = EffectContext::new(&power, HIT);
        let grown = ctx.effect().modifiers()[0].upgrades(UpgradeStage::Finalize, &ctx);
        assert_eq!(grown.len(), 1);

        let implement = PowerProfileBuilder::for_level(1, Usage::Encounter, ToolProfile::implement())
            .unwrap()
            .with_added_attack(burst);
        let ctx = EffectContext::new(&implement, HIT);
        assert!(ctx.effect().modifiers()[0]
            .upgrades(UpgradeStage::Finalize, &ctx)
            .is_empty());
    }

    #[test]
    fn follow_up_damage_never_grows() {
        let damage = DamageModifier::new(GameDiceExpression::ZERO, vec![DamageType::Fire]);
        let power = power(Usage::Daily, ToolProfile::implement());
        let ctx = EffectContext::new(&power, HIT);
        assert!(damage.upgrades(UpgradeStage::InitializeAttacks, &ctx).is_empty());
    }

    #[test]
    fn allocated_dice_are_written() {
        let damage = DamageModifier::new(
            GameDiceExpression::ability(Ability::Intelligence),
            vec![DamageType::Fire],
        );
        assert_eq!(
            damage.with_allocated(2.0, ToolType::Weapon).damage.to_string(),
            "2[W] + INT"
        );
        assert_eq!(
            damage.with_allocated(1.0, ToolType::Implement).damage.to_string(),
            "d10 + INT"
        );
    }

    #[test]
    fn condition_costs() {
        let mut condition = ConditionModifier::new(Condition::Dazed);
        condition.conditions.push(Condition::Weakened);
        assert!((condition.cost() - 1.5).abs() < 1e-9);
        condition.duration = Duration::SaveEnds;
        assert!((condition.cost() - 3.0).abs() < 1e-9);
        condition.after_effect = Some(Condition::Slowed);
        assert!((condition.cost() - 3.5).abs() < 1e-9);
        assert_eq!(condition.complexity(), 3);
    }

    #[test]
    fn undecided_condition_must_be_decided() {
        let condition = EffectModifier::Condition(ConditionModifier::new(Condition::Slowed));
        assert!(condition.is_placeholder());
        assert!(condition.must_upgrade());

        let power = power(Usage::AtWill, ToolProfile::melee_weapon());
        let ctx = EffectContext::new(&power, HIT);
        let decided = condition.upgrades(UpgradeStage::Standard, &ctx);
        assert_eq!(decided.len(), 1);
        assert!(!decided[0].is_placeholder());

        let power = power_daily();
        let ctx = EffectContext::new(&power, HIT);
        assert_eq!(condition.upgrades(UpgradeStage::Standard, &ctx).len(), 2);
    }

    fn power_daily() -> PowerProfileBuilder {
        power(Usage::Daily, ToolProfile::melee_weapon())
    }

    #[test]
    fn daily_conditions_escalate() {
        let condition = ConditionModifier {
            conditions: vec![Condition::Dazed],
            duration: Duration::SaveEnds,
            after_effect: None,
        };
        let upgrades = condition.upgrades(UpgradeStage::Standard, Usage::Daily);
        assert!(upgrades.iter().any(|u| u.conditions == vec![Condition::Stunned]));
        assert!(upgrades
            .iter()
            .any(|u| u.after_effect == Some(Condition::Slowed)));
        assert!(!upgrades
            .iter()
            .any(|u| u.after_effect == Some(Condition::Dazed)));

        let encounter = condition.upgrades(UpgradeStage::Standard, Usage::Encounter);
        assert!(encounter.iter().all(|u| u.after_effect.is_none()));
        assert!(encounter.iter().all(|u| !u.conditions.contains(&Condition::Stunned)));
    }

    #[test]
    fn stronger_conditions_block_weaker_ones() {
        let condition = ConditionModifier {
            conditions: vec![Condition::Immobilized],
            duration: Duration::EndOfUserNextTurn,
            after_effect: None,
        };
        let upgrades = condition.upgrades(UpgradeStage::Standard, Usage::Encounter);
        assert!(upgrades.iter().all(|u| !u.conditions.contains(&Condition::Slowed)));
    }

    #[test]
    fn implied_combat_advantage_is_not_offered() {
        let condition = ConditionModifier {
            conditions: vec![Condition::Dazed],
            duration: Duration::EndOfUserNextTurn,
            after_effect: None,
        };
        let upgrades = condition.upgrades(UpgradeStage::Standard, Usage::Encounter);
        assert_eq!(upgrades.len(), 3);
        assert!(upgrades
            .iter()
            .all(|u| !u.conditions.contains(&Condition::GrantsCombatAdvantage)));
    }

    #[test]
    fn implied_combat_advantage_is_dropped() {
        let condition = ConditionModifier {
            conditions: vec![Condition::GrantsCombatAdvantage, Condition::Dazed],
            duration: Duration::EndOfUserNextTurn,
            after_effect: None,
        };
        match condition.finalized() {
            Finalization::Replace(m) => assert_eq!(m.conditions, vec![Condition::Dazed]),
            _ => panic!("expected a replacement"),
        }
    }

    #[test]
    fn pull_on_area_attack_becomes_push() {
        let base = power(Usage::Encounter, ToolProfile::melee_weapon());
        let pull = EffectModifier::ForcedMovement(ForcedMovementModifier {
            movement: Movement::Pull,
            squares: 2,
        });

        let ctx = EffectContext::new(&base, HIT);
        assert!(matches!(pull.finalize(&ctx), Finalization::Keep));

        let area = base.with_attack(0, base.attacks()[0].with_target(TargetModifier::Blast { size: 3 }));
        let ctx = EffectContext::new(&area, HIT);
        match pull.finalize(&ctx) {
            Finalization::Replace(EffectModifier::ForcedMovement(m)) => {
                assert_eq!(m.movement, Movement::Push);
                assert_eq!(m.squares, 2);
            }
            _ => panic!("expected push"),
        }
    }

    #[test]
    fn display() {
        let condition = ConditionModifier {
            conditions: vec![Condition::Dazed, Condition::Weakened],
            duration: Duration::SaveEnds,
            after_effect: Some(Condition::Slowed),
        };
        insta::assert_snapshot!(
            EffectModifier::Condition(condition).to_string(),
            @"dazed and weakened (save ends); after effect: slowed"
        );
        let damage = EffectModifier::Damage(DamageModifier::new(
            GameDiceExpression::parse("2d6 + INT").unwrap(),
            vec![DamageType::Fire, DamageType::Cold],
        ));
        insta::assert_snapshot!(damage.to_string(), @"2d6 + INT damage (fire, cold)");
    }

    #[test]
    fn movement_caps_at_three_squares() {
        let shift = ShiftModifier { squares: 3 };
        assert!(shift.farther().is_none());
        let push = ForcedMovementModifier {
            movement: Movement::Slide,
            squares: 2,
        };
        assert!((push.cost() - 1.5).abs() < 1e-9);
        assert_eq!(push.farther().map(|m| m.squares), Some(3));
    }

    #[test]
    fn temporary_hit_points_unlock_abilities() {
        let power = power(Usage::Encounter, ToolProfile::implement());
        let ctx = EffectContext::new(&power, HIT);
        let rendered: Vec<String> = TemporaryHitPointsModifier::new()
            .upgrades(&ctx)
            .iter()
            .map(|m| m.amount.to_string())
            .collect();
        assert_eq!(rendered, vec!["4", "INT + 2", "WIS + 2", "CHA + 2"]);
    }
}
