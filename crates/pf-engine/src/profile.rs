//! Usage frequency, tool and class profiles that steer generation.

use std::fmt;

use pf_dice::Ability;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// How often a power can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Usage {
    /// Usable every turn.
    AtWill,
    /// Usable once per encounter.
    Encounter,
    /// Usable once per day.
    Daily,
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtWill => write!(f, "at-will"),
            Self::Encounter => write!(f, "encounter"),
            Self::Daily => write!(f, "daily"),
        }
    }
}

/// What the power is channelled through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolType {
    /// A weapon; damage is counted in whole weapon dice.
    Weapon,
    /// An implement; damage is converted to a best-fit die.
    Implement,
}

/// Reach of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolRange {
    /// Adjacent targets.
    Melee,
    /// Targets at a distance.
    Ranged,
}

/// Kind of damage an attack deals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    /// Untyped weapon damage.
    Normal,
    /// Acid damage.
    Acid,
    /// Cold damage.
    Cold,
    /// Fire damage.
    Fire,
    /// Force damage.
    Force,
    /// Lightning damage.
    Lightning,
    /// Necrotic damage.
    Necrotic,
    /// Poison damage.
    Poison,
    /// Psychic damage.
    Psychic,
    /// Radiant damage.
    Radiant,
    /// Thunder damage.
    Thunder,
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "normal",
            Self::Acid => "acid",
            Self::Cold => "cold",
            Self::Fire => "fire",
            Self::Force => "force",
            Self::Lightning => "lightning",
            Self::Necrotic => "necrotic",
            Self::Poison => "poison",
            Self::Psychic => "psychic",
            Self::Radiant => "radiant",
            Self::Thunder => "thunder",
        };
        write!(f, "{name}")
    }
}

/// The equipment a power is built for.
///
/// Candidate lists are in preference order: the first ability and damage
/// type are the most likely picks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolProfile {
    /// Weapon or implement.
    pub tool_type: ToolType,
    /// Melee or ranged.
    pub range: ToolRange,
    /// Abilities the tool attacks with.
    pub abilities: Vec<Ability>,
    /// Damage types the tool favours.
    pub preferred_damage_types: Vec<DamageType>,
    /// How many abilities and damage types are considered for non-at-will powers.
    pub preferred_type_count: usize,
    /// Modifier names this tool favours.
    #[serde(default)]
    pub preferred_modifiers: Vec<String>,
}

impl ToolProfile {
    /// A strength-based melee weapon.
    pub fn melee_weapon() -> Self {
        Self {
            tool_type: ToolType::Weapon,
            range: ToolRange::Melee,
            abilities: vec![Ability::Strength, Ability::Dexterity],
            preferred_damage_types: vec![DamageType::Normal],
            preferred_type_count: 1,
            preferred_modifiers: vec!["Damage".to_string(), "Blast".to_string()],
        }
    }

    /// A dexterity-based ranged weapon.
    pub fn ranged_weapon() -> Self {
        Self {
            tool_type: ToolType::Weapon,
            range: ToolRange::Ranged,
            abilities: vec![Ability::Dexterity, Ability::Strength],
            preferred_damage_types: vec![DamageType::Normal],
            preferred_type_count: 1,
            preferred_modifiers: vec!["Accuracy".to_string(), "Multiple".to_string()],
        }
    }

    /// An arcane implement.
    pub fn implement() -> Self {
        Self {
            tool_type: ToolType::Implement,
            range: ToolRange::Ranged,
            abilities: vec![Ability::Intelligence, Ability::Wisdom, Ability::Charisma],
            preferred_damage_types: vec![
                DamageType::Fire,
                DamageType::Cold,
                DamageType::Lightning,
                DamageType::Force,
            ],
            preferred_type_count: 2,
            preferred_modifiers: vec!["Burst".to_string(), "Condition".to_string()],
        }
    }

    /// Read a tool profile from JSON and check it can seed a power.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Check that the profile offers at least one ability and damage type.
    pub fn validate(&self) -> EngineResult<()> {
        if self.abilities.is_empty() {
            return Err(EngineError::InvalidToolProfile(
                "no abilities to attack with".to_string(),
            ));
        }
        if self.preferred_damage_types.is_empty() {
            return Err(EngineError::InvalidToolProfile(
                "no damage types".to_string(),
            ));
        }
        if self.preferred_type_count == 0 {
            return Err(EngineError::InvalidToolProfile(
                "preferred_type_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns true if damage is counted in whole weapon dice.
    pub fn is_weapon(&self) -> bool {
        self.tool_type == ToolType::Weapon
    }

    /// Number of seed candidates considered for a usage.
    pub fn candidate_count(&self, usage: Usage) -> usize {
        match usage {
            Usage::AtWill => 1,
            Usage::Encounter | Usage::Daily => self.preferred_type_count.max(1),
        }
    }
}

/// A class's tactical role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassRole {
    /// Locks down groups of enemies.
    Controller,
    /// Holds enemies in place.
    Defender,
    /// Supports allies.
    Leader,
    /// Deals focused damage.
    Striker,
}

impl ClassRole {
    /// Modifier names this role favours, most favoured first.
    pub fn preferred_modifiers(self) -> &'static [&'static str] {
        match self {
            Self::Controller => &["Condition", "Forced Movement", "Burst", "Persistent Zone"],
            Self::Defender => &["Forced Movement", "Condition", "Accuracy"],
            Self::Leader => &["Temporary Hit Points", "Shift", "Accuracy"],
            Self::Striker => &["Damage", "Multiattack", "Non-Armor Defense"],
        }
    }
}

impl fmt::Display for ClassRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Controller => write!(f, "controller"),
            Self::Defender => write!(f, "defender"),
            Self::Leader => write!(f, "leader"),
            Self::Striker => write!(f, "striker"),
        }
    }
}

/// The class a power is generated for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProfile {
    /// Tactical role.
    pub role: ClassRole,
    /// Tools the class fights with.
    #[serde(default)]
    pub tools: Vec<ToolProfile>,
}

impl ClassProfile {
    /// A class with a role and no tools.
    pub fn new(role: ClassRole) -> Self {
        Self {
            role,
            tools: Vec::new(),
        }
    }

    /// Add a tool.
    pub fn with_tool(mut self, tool: ToolProfile) -> Self {
        self.tools.push(tool);
        self
    }

    /// Read a class profile from JSON, checking every tool.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let profile: Self = serde_json::from_str(json)?;
        for tool in &profile.tools {
            tool.validate()?;
        }
        Ok(profile)
    }
}
