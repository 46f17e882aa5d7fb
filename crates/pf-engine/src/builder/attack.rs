//! Attack nodes.

use pf_dice::Ability;

use crate::builder::effect::{EffectTarget, EffectType, TargetEffectBuilder};
use crate::modifier::{AttackModifier, ModifierContract, TargetModifier};

/// One attack roll: the ability it uses, who it targets, and what a hit does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackProfileBuilder {
    ability: Ability,
    target: TargetModifier,
    target_effects: Vec<TargetEffectBuilder>,
    modifiers: Vec<AttackModifier>,
}

impl AttackProfileBuilder {
    /// A single-target attack with no effects.
    pub fn new(ability: Ability) -> Self {
        Self {
            ability,
            target: TargetModifier::Single,
            target_effects: Vec::new(),
            modifiers: Vec::new(),
        }
    }

    /// Ability the attack rolls with.
    pub fn ability(&self) -> Ability {
        self.ability
    }

    /// How the attack picks its targets.
    pub fn target(&self) -> &TargetModifier {
        &self.target
    }

    /// Effects applied on a hit.
    pub fn target_effects(&self) -> &[TargetEffectBuilder] {
        &self.target_effects
    }

    /// Applied attack modifiers.
    pub fn modifiers(&self) -> &[AttackModifier] {
        &self.modifiers
    }

    /// Returns true if an attack modifier with this name is present.
    pub fn has_modifier(&self, name: &str) -> bool {
        self.modifiers.iter().any(|m| m.name() == name)
    }

    /// Returns true if an effect occupies the slot.
    pub fn has_slot(&self, target: EffectTarget, effect_type: EffectType) -> bool {
        self.target_effects
            .iter()
            .any(|e| e.slot() == (target, effect_type))
    }

    /// Returns a copy with a different targeting modifier.
    pub fn with_target(&self, target: TargetModifier) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }

    /// Returns a copy with every effect replaced.
    pub fn with_target_effects(&self, target_effects: Vec<TargetEffectBuilder>) -> Self {
        Self {
            target_effects,
            ..self.clone()
        }
    }

    /// Returns a copy with the effect at `index` replaced.
    pub fn with_target_effect(&self, index: usize, effect: TargetEffectBuilder) -> Self {
        let mut target_effects = self.target_effects.clone();
        target_effects[index] = effect;
        self.with_target_effects(target_effects)
    }

    /// Returns a copy with an extra effect slot.
    pub fn with_added_target_effect(&self, effect: TargetEffectBuilder) -> Self {
        let mut target_effects = self.target_effects.clone();
        target_effects.push(effect);
        self.with_target_effects(target_effects)
    }

    /// Returns a copy with every attack modifier replaced.
    pub fn with_modifiers(&self, modifiers: Vec<AttackModifier>) -> Self {
        Self {
            modifiers,
            ..self.clone()
        }
    }

    /// Returns a copy with the attack modifier at `index` replaced.
    pub fn with_modifier(&self, index: usize, modifier: AttackModifier) -> Self {
        let mut modifiers = self.modifiers.clone();
        modifiers[index] = modifier;
        self.with_modifiers(modifiers)
    }

    /// Returns a copy with the modifier added, or replacing the one with the same name.
    pub fn apply_modifier(&self, modifier: AttackModifier) -> Self {
        match self.modifiers.iter().position(|m| m.name() == modifier.name()) {
            Some(index) => self.with_modifier(index, modifier),
            None => {
                let mut modifiers = self.modifiers.clone();
                modifiers.push(modifier);
                self.with_modifiers(modifiers)
            }
        }
    }

    /// A follow-up copy of this attack whose damage carries no boost.
    pub fn without_damage_boost(&self) -> Self {
        self.with_target_effects(
            self.target_effects
                .iter()
                .map(TargetEffectBuilder::without_damage_boost)
                .collect(),
        )
    }
}
