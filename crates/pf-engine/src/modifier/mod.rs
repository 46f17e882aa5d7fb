//! The modifier contract and the reference modifier catalog.
//!
//! Each level of the builder tree owns its own closed set of modifiers:
//! - **Power** modifiers restructure the whole power ([`PowerModifier`])
//! - **Attack** modifiers change how an attack rolls ([`AttackModifier`])
//! - **Target** modifiers choose who an attack hits ([`TargetModifier`])
//! - **Effect** modifiers are what happens on a hit ([`EffectModifier`])
//!
//! Every variant serializes with its display name as the `name` tag.

pub mod attack;
pub mod effect;
pub mod power;
pub mod target;

pub use attack::{AccuracyModifier, AttackModifier, Defense, NonArmorDefenseModifier};
pub use effect::{
    Condition, ConditionModifier, DamageModifier, Duration, EffectModifier, ForcedMovementModifier,
    Movement, ShiftModifier, TemporaryHitPointsModifier,
};
pub use power::{MultiattackModifier, PowerModifier, ZoneModifier};
pub use target::TargetModifier;

use serde::{Deserialize, Serialize};

use crate::builder::PowerProfileBuilder;
use crate::cost::PowerCost;

/// Phase gate for upgrades, compared by declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeStage {
    /// Shape the attacks: damage, targeting, defenses.
    InitializeAttacks,
    /// Add effects and riders.
    Standard,
    /// Spend what is left of the budget.
    Finalize,
}

impl UpgradeStage {
    /// Every stage in search order.
    pub const ALL: [UpgradeStage; 3] = [Self::InitializeAttacks, Self::Standard, Self::Finalize];
}

/// A transform of an entire power, producing zero or more replacements.
pub type ProfileRewrite = Box<dyn Fn(&PowerProfileBuilder) -> Vec<PowerProfileBuilder>>;

/// What the finalize pass should do with a modifier.
pub enum Finalization<M> {
    /// Leave the modifier as it is.
    Keep,
    /// Swap the modifier for another.
    Replace(M),
    /// Drop the modifier.
    Remove,
    /// Restructure the whole power. The rewrite is responsible for
    /// replacing the requesting modifier with a terminal version.
    Rewrite(ProfileRewrite),
}

/// The behaviour every modifier shares, whatever level it attaches to.
///
/// `Context` is a read-only view of the modifier's position in the tree.
pub trait ModifierContract: Sized {
    /// View of the owning node.
    type Context<'a>;

    /// Display name; at most one modifier per name exists on a node.
    fn name(&self) -> &'static str;

    /// Budget consumed by this modifier.
    fn cost(&self, ctx: &Self::Context<'_>) -> PowerCost;

    /// Rules-text burden of this modifier.
    fn complexity(&self, ctx: &Self::Context<'_>) -> u32;

    /// Alternative next versions of this modifier; empty once it is done.
    fn upgrades(&self, stage: UpgradeStage, ctx: &Self::Context<'_>) -> Vec<Self>;

    /// Returns true for provisional state that must be resolved.
    fn is_placeholder(&self) -> bool {
        false
    }

    /// Returns true if the search may only upgrade this modifier next.
    fn must_upgrade(&self) -> bool {
        self.is_placeholder()
    }

    /// Resolve this modifier during the finalize pass.
    fn finalize(&self, _ctx: &Self::Context<'_>) -> Finalization<Self> {
        Finalization::Keep
    }
}
