//! The persistent power tree the search works on.
//!
//! Power → attacks → target effects → modifiers. Every node is an
//! immutable value; `with_*` methods return a new node with one field
//! replaced, so candidate branches share their common ancestor freely.

pub mod attack;
pub mod context;
pub mod effect;

pub use attack::AttackProfileBuilder;
pub use context::{AttackContext, EffectContext, EffectLocation, PowerContext};
pub use effect::{EffectTarget, EffectType, TargetEffectBuilder};

use crate::allocation::{self, Allocation, AllocationPolicy};
use crate::built::{AttackProfile, PowerProfile, TargetEffect};
use crate::cost::PowerCost;
use crate::error::EngineResult;
use crate::limits::PowerLimits;
use crate::modifier::{EffectModifier, ModifierContract, PowerModifier};
use crate::profile::{ToolProfile, Usage};

/// A power under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerProfileBuilder {
    limits: PowerLimits,
    tool: ToolProfile,
    usage: Usage,
    level: u32,
    attacks: Vec<AttackProfileBuilder>,
    effects: Vec<TargetEffectBuilder>,
    modifiers: Vec<PowerModifier>,
}

impl PowerProfileBuilder {
    /// An empty power with explicit limits.
    pub fn new(limits: PowerLimits, tool: ToolProfile, usage: Usage, level: u32) -> Self {
        Self {
            limits,
            tool,
            usage,
            level,
            attacks: Vec::new(),
            effects: Vec::new(),
            modifiers: Vec::new(),
        }
    }

    /// An empty power with the limits for its level and usage.
    pub fn for_level(level: u32, usage: Usage, tool: ToolProfile) -> EngineResult<Self> {
        tool.validate()?;
        let limits = PowerLimits::for_level(level, usage)?;
        Ok(Self::new(limits, tool, usage, level))
    }

    /// The budget envelope.
    pub fn limits(&self) -> &PowerLimits {
        &self.limits
    }

    /// The tool the power is built for.
    pub fn tool(&self) -> &ToolProfile {
        &self.tool
    }

    /// Usage frequency.
    pub fn usage(&self) -> Usage {
        self.usage
    }

    /// Power level.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Attacks in declaration order.
    pub fn attacks(&self) -> &[AttackProfileBuilder] {
        &self.attacks
    }

    /// Effects of the power as a whole.
    pub fn effects(&self) -> &[TargetEffectBuilder] {
        &self.effects
    }

    /// Applied power modifiers.
    pub fn modifiers(&self) -> &[PowerModifier] {
        &self.modifiers
    }

    /// Returns true if a power modifier with this name is present.
    pub fn has_modifier(&self, name: &str) -> bool {
        self.modifiers.iter().any(|m| m.name() == name)
    }

    /// Returns a copy with every attack replaced.
    pub fn with_attacks(&self, attacks: Vec<AttackProfileBuilder>) -> Self {
        Self {
            attacks,
            ..self.clone()
        }
    }

    /// Returns a copy with the attack at `index` replaced.
    pub fn with_attack(&self, index: usize, attack: AttackProfileBuilder) -> Self {
        let mut attacks = self.attacks.clone();
        attacks[index] = attack;
        self.with_attacks(attacks)
    }

    /// Returns a copy with one more attack.
    pub fn with_added_attack(&self, attack: AttackProfileBuilder) -> Self {
        let mut attacks = self.attacks.clone();
        attacks.push(attack);
        self.with_attacks(attacks)
    }

    /// Returns a copy with every power-level effect replaced.
    pub fn with_effects(&self, effects: Vec<TargetEffectBuilder>) -> Self {
        Self {
            effects,
            ..self.clone()
        }
    }

    /// Returns a copy with one more power-level effect.
    pub fn with_added_effect(&self, effect: TargetEffectBuilder) -> Self {
        let mut effects = self.effects.clone();
        effects.push(effect);
        self.with_effects(effects)
    }

    /// Returns a copy with every power modifier replaced.
    pub fn with_modifiers(&self, modifiers: Vec<PowerModifier>) -> Self {
        Self {
            modifiers,
            ..self.clone()
        }
    }

    /// Returns a copy with the power modifier at `index` replaced.
    pub fn with_modifier(&self, index: usize, modifier: PowerModifier) -> Self {
        let mut modifiers = self.modifiers.clone();
        modifiers[index] = modifier;
        self.with_modifiers(modifiers)
    }

    /// Returns a copy with the modifier added, or replacing the one with the same name.
    pub fn apply_modifier(&self, modifier: PowerModifier) -> Self {
        match self.modifiers.iter().position(|m| m.name() == modifier.name()) {
            Some(index) => self.with_modifier(index, modifier),
            None => {
                let mut modifiers = self.modifiers.clone();
                modifiers.push(modifier);
                self.with_modifiers(modifiers)
            }
        }
    }

    /// The effect at `location`.
    ///
    /// Locations come from [`Self::effect_locations`] of this same power.
    pub fn effect_at(&self, location: EffectLocation) -> &TargetEffectBuilder {
        match location {
            EffectLocation::Attack { attack, effect } => {
                &self.attacks[attack].target_effects()[effect]
            }
            EffectLocation::Power { effect } => &self.effects[effect],
        }
    }

    /// Returns a copy with the effect at `location` replaced.
    pub fn with_effect_at(&self, location: EffectLocation, effect: TargetEffectBuilder) -> Self {
        match location {
            EffectLocation::Attack {
                attack,
                effect: index,
            } => self.with_attack(
                attack,
                self.attacks[attack].with_target_effect(index, effect),
            ),
            EffectLocation::Power { effect: index } => {
                let mut effects = self.effects.clone();
                effects[index] = effect;
                self.with_effects(effects)
            }
        }
    }

    /// Every effect in the tree, attack effects first.
    pub fn effect_locations(&self) -> Vec<EffectLocation> {
        let attack_effects = self.attacks.iter().enumerate().flat_map(|(attack, a)| {
            (0..a.target_effects().len()).map(move |effect| EffectLocation::Attack { attack, effect })
        });
        let power_effects = (0..self.effects.len()).map(|effect| EffectLocation::Power { effect });
        attack_effects.chain(power_effects).collect()
    }

    /// Combined cost of the power modifiers.
    pub fn power_cost(&self) -> PowerCost {
        let ctx = PowerContext::new(self);
        self.modifiers.iter().map(|m| m.cost(&ctx)).sum()
    }

    /// Combined cost of the modifiers on one effect.
    pub fn effect_cost(&self, location: EffectLocation) -> PowerCost {
        let ctx = EffectContext::new(self, location);
        self.effect_at(location)
            .modifiers()
            .iter()
            .map(|m| m.cost(&ctx))
            .sum()
    }

    /// Combined cost of one attack: targeting, attack modifiers and hit effects.
    pub fn attack_cost(&self, index: usize) -> PowerCost {
        let ctx = AttackContext::new(self, index);
        let attack = &self.attacks[index];
        let own: PowerCost = attack.modifiers().iter().map(|m| m.cost(&ctx)).sum();
        let effects: PowerCost = (0..attack.target_effects().len())
            .map(|effect| {
                self.effect_cost(EffectLocation::Attack {
                    attack: index,
                    effect,
                })
            })
            .sum();
        attack.target().cost(&ctx) + own + effects
    }

    /// Summed complexity of every modifier in the tree.
    pub fn complexity(&self) -> u32 {
        let power_ctx = PowerContext::new(self);
        let power: u32 = self.modifiers.iter().map(|m| m.complexity(&power_ctx)).sum();
        let attacks: u32 = (0..self.attacks.len())
            .map(|index| {
                let ctx = AttackContext::new(self, index);
                let attack = &self.attacks[index];
                attack.target().complexity(&ctx)
                    + attack.modifiers().iter().map(|m| m.complexity(&ctx)).sum::<u32>()
            })
            .sum();
        let effects: u32 = self
            .effect_locations()
            .into_iter()
            .map(|location| {
                let ctx = EffectContext::new(self, location);
                self.effect_at(location)
                    .modifiers()
                    .iter()
                    .map(|m| m.complexity(&ctx))
                    .sum::<u32>()
            })
            .sum();
        power + attacks + effects
    }

    /// Budget left for damage once every fixed cost is paid.
    pub fn remaining_budget(&self) -> f64 {
        let attacks: f64 = (0..self.attacks.len())
            .map(|index| self.attack_cost(index).fixed)
            .sum();
        let effects: f64 = (0..self.effects.len())
            .map(|effect| self.effect_cost(EffectLocation::Power { effect }).fixed)
            .sum();
        self.power_cost().apply(self.limits.initial) - attacks - effects
    }

    /// Sum of every attack's single-target multiplier.
    pub fn single_target_total(&self) -> f64 {
        (0..self.attacks.len())
            .map(|index| self.attack_cost(index).single_target_multiplier)
            .sum()
    }

    /// Returns true if some modifier must be upgraded before anything else.
    pub fn has_pending_upgrade(&self) -> bool {
        self.modifiers.iter().any(ModifierContract::must_upgrade)
            || self
                .attacks
                .iter()
                .any(|a| a.modifiers().iter().any(ModifierContract::must_upgrade))
            || self
                .effect_locations()
                .into_iter()
                .any(|l| self.effect_at(l).modifiers().iter().any(ModifierContract::must_upgrade))
    }

    /// How leftover weapon dice are spread across attacks.
    pub fn allocation_policy(&self) -> AllocationPolicy {
        self.modifiers
            .iter()
            .find_map(|m| match m {
                PowerModifier::Multiattack(multiattack) => Some(multiattack.policy),
                PowerModifier::Zone(_) => None,
            })
            .unwrap_or_default()
    }

    /// Freeze the power: placeholders are stripped, empty effects dropped
    /// and allocated damage dice written into every damage expression.
    pub fn build(&self) -> PowerProfile {
        let allocation = allocation::allocate(self);
        let attacks = self
            .attacks
            .iter()
            .enumerate()
            .map(|(index, attack)| AttackProfile {
                ability: attack.ability(),
                target: attack.target().clone(),
                effects: attack
                    .target_effects()
                    .iter()
                    .enumerate()
                    .filter_map(|(effect, e)| {
                        self.build_effect(e, Some((index, effect)), &allocation)
                    })
                    .collect(),
                modifiers: attack
                    .modifiers()
                    .iter()
                    .filter(|m| !m.is_placeholder())
                    .cloned()
                    .collect(),
            })
            .collect();
        PowerProfile {
            level: self.level,
            usage: self.usage,
            tool_type: self.tool.tool_type,
            tool_range: self.tool.range,
            attacks,
            effects: self
                .effects
                .iter()
                .filter_map(|e| self.build_effect(e, None, &allocation))
                .collect(),
            modifiers: self
                .modifiers
                .iter()
                .filter(|m| !m.is_placeholder())
                .cloned()
                .collect(),
        }
    }

    fn build_effect(
        &self,
        effect: &TargetEffectBuilder,
        position: Option<(usize, usize)>,
        allocation: &Allocation,
    ) -> Option<TargetEffect> {
        let modifiers: Vec<EffectModifier> = effect
            .modifiers()
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_placeholder())
            .map(|(slot, m)| match (m, position) {
                (EffectModifier::Damage(damage), Some((attack, index))) => {
                    match allocation.dice_for(attack, index, slot) {
                        Some(dice) => {
                            EffectModifier::Damage(damage.with_allocated(dice, self.tool.tool_type))
                        }
                        None => m.clone(),
                    }
                }
                _ => m.clone(),
            })
            .collect();
        if modifiers.is_empty() {
            return None;
        }
        Some(TargetEffect {
            target: effect.target(),
            effect_type: effect.effect_type(),
            modifiers,
        })
    }
}
