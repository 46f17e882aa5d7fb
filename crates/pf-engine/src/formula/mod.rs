//! Formulas: stateless factories for the first instance of a modifier.
//!
//! A formula is offered at a node only while no modifier with its name is
//! present there. Each formula is registered with an [`Applicability`]
//! that gates it by tool type or usage frequency.

pub mod catalog;

use std::fmt::Debug;

use crate::builder::{AttackContext, EffectContext, PowerContext};
use crate::modifier::{AttackModifier, EffectModifier, PowerModifier, UpgradeStage};
use crate::profile::{ToolProfile, ToolType, Usage};

/// Offers power modifiers.
pub trait PowerFormula: Debug {
    /// Name of the modifier this formula creates.
    fn name(&self) -> &'static str;

    /// First instances of the modifier, or nothing if it does not fit.
    fn base_modifiers(&self, stage: UpgradeStage, ctx: &PowerContext<'_>) -> Vec<PowerModifier>;
}

/// Offers attack modifiers.
pub trait AttackFormula: Debug {
    /// Name of the modifier this formula creates.
    fn name(&self) -> &'static str;

    /// First instances of the modifier, or nothing if it does not fit.
    fn base_modifiers(&self, stage: UpgradeStage, ctx: &AttackContext<'_>) -> Vec<AttackModifier>;
}

/// Offers effect modifiers.
pub trait EffectFormula: Debug {
    /// Name of the modifier this formula creates.
    fn name(&self) -> &'static str;

    /// First instances of the modifier, or nothing if it does not fit.
    fn base_modifiers(&self, stage: UpgradeStage, ctx: &EffectContext<'_>) -> Vec<EffectModifier>;
}

/// When a registered formula is consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applicability {
    /// For every power.
    Always,
    /// Only for powers built on this kind of tool.
    Tool(ToolType),
    /// Only for these usage frequencies.
    Usage(Vec<Usage>),
}

impl Applicability {
    /// Returns true if the formula applies to a power with this tool and usage.
    pub fn applies(&self, tool: &ToolProfile, usage: Usage) -> bool {
        match self {
            Self::Always => true,
            Self::Tool(tool_type) => tool.tool_type == *tool_type,
            Self::Usage(usages) => usages.contains(&usage),
        }
    }
}

/// Ordered formula lists, one per tree level.
#[derive(Debug, Default)]
pub struct FormulaRegistry {
    power: Vec<(Applicability, Box<dyn PowerFormula>)>,
    attack: Vec<(Applicability, Box<dyn AttackFormula>)>,
    effect: Vec<(Applicability, Box<dyn EffectFormula>)>,
}

impl FormulaRegistry {
    /// A registry with no formulas.
    pub fn new() -> Self {
        Self::default()
    }

    /// The reference catalog.
    pub fn standard() -> Self {
        catalog::register(Self::new())
    }

    /// Register a power formula after the existing ones.
    pub fn with_power_formula(
        mut self,
        applicability: Applicability,
        formula: impl PowerFormula + 'static,
    ) -> Self {
        self.power.push((applicability, Box::new(formula)));
        self
    }

    /// Register an attack formula after the existing ones.
    pub fn with_attack_formula(
        mut self,
        applicability: Applicability,
        formula: impl AttackFormula + 'static,
    ) -> Self {
        self.attack.push((applicability, Box::new(formula)));
        self
    }

    /// Register an effect formula after the existing ones.
    pub fn with_effect_formula(
        mut self,
        applicability: Applicability,
        formula: impl EffectFormula + 'static,
    ) -> Self {
        self.effect.push((applicability, Box::new(formula)));
        self
    }

    /// Power formulas applicable to a tool and usage, in registration order.
    pub fn power_formulas<'a>(
        &'a self,
        tool: &'a ToolProfile,
        usage: Usage,
    ) -> impl Iterator<Item = &'a dyn PowerFormula> + 'a {
        self.power
            .iter()
            .filter(move |(applicability, _)| applicability.applies(tool, usage))
            .map(|(_, formula)| formula.as_ref())
    }

    /// Attack formulas applicable to a tool and usage, in registration order.
    pub fn attack_formulas<'a>(
        &'a self,
        tool: &'a ToolProfile,
        usage: Usage,
    ) -> impl Iterator<Item = &'a dyn AttackFormula> + 'a {
        self.attack
            .iter()
            .filter(move |(applicability, _)| applicability.applies(tool, usage))
            .map(|(_, formula)| formula.as_ref())
    }

    /// Effect formulas applicable to a tool and usage, in registration order.
    pub fn effect_formulas<'a>(
        &'a self,
        tool: &'a ToolProfile,
        usage: Usage,
    ) -> impl Iterator<Item = &'a dyn EffectFormula> + 'a {
        self.effect
            .iter()
            .filter(move |(applicability, _)| applicability.applies(tool, usage))
            .map(|(_, formula)| formula.as_ref())
    }

    /// Number of registered formulas across all levels.
    pub fn len(&self) -> usize {
        self.power.len() + self.attack.len() + self.effect.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
