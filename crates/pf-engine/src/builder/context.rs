//! Read-only views handed to modifiers.

use crate::builder::attack::AttackProfileBuilder;
use crate::builder::effect::TargetEffectBuilder;
use crate::builder::PowerProfileBuilder;
use crate::profile::{ToolProfile, Usage};

/// Read-only view of a whole power, handed to power modifiers.
#[derive(Debug, Clone, Copy)]
pub struct PowerContext<'a> {
    power: &'a PowerProfileBuilder,
}

impl<'a> PowerContext<'a> {
    /// View a power.
    pub fn new(power: &'a PowerProfileBuilder) -> Self {
        Self { power }
    }

    /// The power being built.
    pub fn power(&self) -> &'a PowerProfileBuilder {
        self.power
    }

    /// The tool the power is built for.
    pub fn tool(&self) -> &'a ToolProfile {
        self.power.tool()
    }

    /// Usage frequency of the power.
    pub fn usage(&self) -> Usage {
        self.power.usage()
    }
}

/// Read-only view of one attack within its power.
#[derive(Debug, Clone, Copy)]
pub struct AttackContext<'a> {
    power: &'a PowerProfileBuilder,
    index: usize,
}

impl<'a> AttackContext<'a> {
    /// View the attack at `index`.
    pub fn new(power: &'a PowerProfileBuilder, index: usize) -> Self {
        Self { power, index }
    }

    /// The power the attack belongs to.
    pub fn power(&self) -> &'a PowerProfileBuilder {
        self.power
    }

    /// Position of the attack in the power.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The attack itself.
    pub fn attack(&self) -> &'a AttackProfileBuilder {
        &self.power.attacks()[self.index]
    }

    /// The tool the power is built for.
    pub fn tool(&self) -> &'a ToolProfile {
        self.power.tool()
    }

    /// Usage frequency of the power.
    pub fn usage(&self) -> Usage {
        self.power.usage()
    }
}

/// Where an effect sits in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectLocation {
    /// An effect applied when an attack hits.
    Attack {
        /// Index of the attack.
        attack: usize,
        /// Index of the effect within the attack.
        effect: usize,
    },
    /// An effect of the power as a whole, hit or miss.
    Power {
        /// Index of the effect within the power.
        effect: usize,
    },
}

/// Read-only view of one effect within its power.
#[derive(Debug, Clone, Copy)]
pub struct EffectContext<'a> {
    power: &'a PowerProfileBuilder,
    location: EffectLocation,
}

impl<'a> EffectContext<'a> {
    /// View the effect at `location`.
    pub fn new(power: &'a PowerProfileBuilder, location: EffectLocation) -> Self {
        Self { power, location }
    }

    /// The power the effect belongs to.
    pub fn power(&self) -> &'a PowerProfileBuilder {
        self.power
    }

    /// Where the effect sits.
    pub fn location(&self) -> EffectLocation {
        self.location
    }

    /// The effect itself.
    pub fn effect(&self) -> &'a TargetEffectBuilder {
        self.power.effect_at(self.location)
    }

    /// The attack carrying the effect, if any.
    pub fn attack(&self) -> Option<&'a AttackProfileBuilder> {
        match self.location {
            EffectLocation::Attack { attack, .. } => Some(&self.power.attacks()[attack]),
            EffectLocation::Power { .. } => None,
        }
    }

    /// The tool the power is built for.
    pub fn tool(&self) -> &'a ToolProfile {
        self.power.tool()
    }

    /// Usage frequency of the power.
    pub fn usage(&self) -> Usage {
        self.power.usage()
    }
}
