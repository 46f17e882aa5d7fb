//! Procedural power generation under a budget.
//!
//! A power is a tree (power → attacks → effects → modifiers) grown from a
//! valid seed by repeatedly applying one upgrade chosen by weighted random
//! selection, as long as the result still fits the budget and complexity
//! limits for its level and usage. Damage dice are allocated from whatever
//! budget the other modifiers leave.

pub mod allocation;
pub mod builder;
pub mod built;
pub mod config;
pub mod cost;
pub mod error;
pub mod estimate;
pub mod formula;
pub mod limits;
pub mod modifier;
pub mod profile;
pub mod random;
pub mod search;
pub mod selection;

pub use allocation::{Allocation, AllocationPolicy};
pub use builder::{AttackProfileBuilder, PowerProfileBuilder, TargetEffectBuilder};
pub use built::{AttackProfile, PowerProfile, TargetEffect};
pub use config::PowerProfileConfig;
pub use cost::PowerCost;
pub use error::{EngineError, EngineResult};
pub use estimate::{Attacker, Defender};
pub use formula::FormulaRegistry;
pub use limits::PowerLimits;
pub use modifier::{ModifierContract, UpgradeStage};
pub use profile::{ClassProfile, ClassRole, DamageType, ToolProfile, ToolRange, ToolType, Usage};
pub use random::{RandomSource, RngSource, always_max};
pub use search::PowerGenerator;
