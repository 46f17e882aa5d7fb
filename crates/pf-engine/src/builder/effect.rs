//! Effect slots.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modifier::{EffectModifier, ModifierContract};

/// Who an effect applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectTarget {
    /// The creatures the attack hits.
    Enemy,
    /// The power's user.
    User,
    /// One of the user's allies.
    Ally,
}

impl fmt::Display for EffectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enemy => write!(f, "target"),
            Self::User => write!(f, "you"),
            Self::Ally => write!(f, "one ally"),
        }
    }
}

/// Whether an effect helps or hinders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectType {
    /// Damages or hampers.
    Harmful,
    /// Aids.
    Beneficial,
}

/// One `(target, effect type)` slot and the modifiers it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEffectBuilder {
    target: EffectTarget,
    effect_type: EffectType,
    modifiers: Vec<EffectModifier>,
}

impl TargetEffectBuilder {
    /// An empty slot.
    pub fn new(target: EffectTarget, effect_type: EffectType) -> Self {
        Self {
            target,
            effect_type,
            modifiers: Vec::new(),
        }
    }

    /// Who the effect applies to.
    pub fn target(&self) -> EffectTarget {
        self.target
    }

    /// Harmful or beneficial.
    pub fn effect_type(&self) -> EffectType {
        self.effect_type
    }

    /// The `(target, effect type)` pair identifying this slot.
    pub fn slot(&self) -> (EffectTarget, EffectType) {
        (self.target, self.effect_type)
    }

    /// Applied modifiers in application order.
    pub fn modifiers(&self) -> &[EffectModifier] {
        &self.modifiers
    }

    /// Returns true if no modifier has been applied.
    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Returns true if a modifier with this name is present.
    pub fn has_modifier(&self, name: &str) -> bool {
        self.modifiers.iter().any(|m| m.name() == name)
    }

    /// Returns a copy with every modifier replaced.
    pub fn with_modifiers(&self, modifiers: Vec<EffectModifier>) -> Self {
        Self {
            modifiers,
            ..self.clone()
        }
    }

    /// Returns a copy with the modifier at `index` replaced.
    pub fn with_modifier(&self, index: usize, modifier: EffectModifier) -> Self {
        let mut modifiers = self.modifiers.clone();
        modifiers[index] = modifier;
        self.with_modifiers(modifiers)
    }

    /// Returns a copy with the modifier added, or replacing the one with the same name.
    pub fn apply_modifier(&self, modifier: EffectModifier) -> Self {
        match self.modifiers.iter().position(|m| m.name() == modifier.name()) {
            Some(index) => self.with_modifier(index, modifier),
            None => {
                let mut modifiers = self.modifiers.clone();
                modifiers.push(modifier);
                self.with_modifiers(modifiers)
            }
        }
    }

    /// Returns a copy where every damage modifier has lost its boost.
    pub fn without_damage_boost(&self) -> Self {
        self.with_modifiers(
            self.modifiers
                .iter()
                .map(|m| match m {
                    EffectModifier::Damage(damage) => EffectModifier::Damage(damage.without_boost()),
                    other => other.clone(),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::{ShiftModifier, TemporaryHitPointsModifier};

    #[test]
    fn apply_adds_then_replaces_by_name() {
        let effect = TargetEffectBuilder::new(EffectTarget::Ally, EffectType::Beneficial)
            .apply_modifier(EffectModifier::Shift(ShiftModifier { squares: 1 }))
            .apply_modifier(EffectModifier::TemporaryHitPoints(
                TemporaryHitPointsModifier::new(),
            ))
            .apply_modifier(EffectModifier::Shift(ShiftModifier { squares: 2 }));
        assert_eq!(effect.modifiers().len(), 2);
        assert_eq!(
            effect.modifiers()[0],
            EffectModifier::Shift(ShiftModifier { squares: 2 })
        );
        assert!(effect.has_modifier("Temporary Hit Points"));
    }

    #[test]
    fn updates_leave_the_original_untouched() {
        let empty = TargetEffectBuilder::new(EffectTarget::User, EffectType::Beneficial);
        let shifted = empty.apply_modifier(EffectModifier::Shift(ShiftModifier { squares: 1 }));
        assert!(empty.is_empty());
        assert!(!shifted.is_empty());
        assert_eq!(shifted.slot(), (EffectTarget::User, EffectType::Beneficial));
    }
}
