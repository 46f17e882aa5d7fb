use std::path::PathBuf;

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use pf_dice::DieCodes;
use pf_engine::builder::EffectTarget;
use pf_engine::modifier::AttackModifier;
use pf_engine::{
    AttackProfile, Attacker, ClassProfile, ClassRole, Defender, PowerGenerator, PowerProfile,
    PowerProfileConfig, RngSource, TargetEffect, ToolProfile, ToolRange, ToolType, Usage,
    always_max,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Ability score used for every ability in the damage estimate.
const ESTIMATE_SCORE: i32 = 18;
/// Every defense of the estimate's target.
const ESTIMATE_DEFENSE: i32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UsageArg {
    /// Usable every turn
    AtWill,
    /// Once per encounter
    Encounter,
    /// Once per day
    Daily,
}

impl From<UsageArg> for Usage {
    fn from(arg: UsageArg) -> Self {
        match arg {
            UsageArg::AtWill => Usage::AtWill,
            UsageArg::Encounter => Usage::Encounter,
            UsageArg::Daily => Usage::Daily,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToolArg {
    /// Strength-based melee weapon
    MeleeWeapon,
    /// Dexterity-based ranged weapon
    RangedWeapon,
    /// Arcane implement
    Implement,
}

impl ToolArg {
    fn profile(self) -> ToolProfile {
        match self {
            Self::MeleeWeapon => ToolProfile::melee_weapon(),
            Self::RangedWeapon => ToolProfile::ranged_weapon(),
            Self::Implement => ToolProfile::implement(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Controller,
    Defender,
    Leader,
    Striker,
}

impl From<RoleArg> for ClassRole {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Controller => ClassRole::Controller,
            RoleArg::Defender => ClassRole::Defender,
            RoleArg::Leader => ClassRole::Leader,
            RoleArg::Striker => ClassRole::Striker,
        }
    }
}

pub struct GenerateOptions {
    pub level: u32,
    pub usage: UsageArg,
    pub tool: ToolArg,
    pub role: Option<RoleArg>,
    pub tool_file: Option<PathBuf>,
    pub seed: Option<u64>,
    pub deterministic: bool,
    pub prefer: Vec<String>,
    pub exclude: Vec<String>,
    pub json: bool,
}

pub fn run(options: &GenerateOptions) -> Result<(), String> {
    let tool = match &options.tool_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            ToolProfile::from_json(&json)
                .map_err(|e| format!("invalid tool profile {}: {e}", path.display()))?
        }
        None => options.tool.profile(),
    };
    let class = options
        .role
        .map(|role| ClassProfile::new(role.into()).with_tool(tool.clone()));

    let mut config = PowerProfileConfig::default();
    for name in &options.prefer {
        config = config.with_preferred_modifier(name.as_str());
    }
    for name in &options.exclude {
        config = config.with_excluded_modifier(name.as_str());
    }
    let generator = PowerGenerator::new(config);
    let usage = Usage::from(options.usage);

    let (power, seed) = if options.deterministic {
        let power = generator.generate(options.level, usage, &tool, class.as_ref(), &mut always_max);
        (power, None)
    } else {
        let seed = options.seed.unwrap_or_else(rand::random);
        let mut random = RngSource(StdRng::seed_from_u64(seed));
        let power = generator.generate(options.level, usage, &tool, class.as_ref(), &mut random);
        (power, Some(seed))
    };
    let power = power.map_err(|e| e.to_string())?;

    if options.json {
        println!("{}", power.to_json().map_err(|e| e.to_string())?);
        return Ok(());
    }

    print_power(&power);
    if let Some(seed) = seed {
        println!("  {}", format!("seed {seed}").dimmed());
    }
    Ok(())
}

fn print_power(power: &PowerProfile) {
    println!(
        "  {} {}",
        format!("Level {} {} power", power.level, power.usage).bold(),
        format!("({})", tool_label(power.tool_type, power.tool_range)).dimmed()
    );
    for modifier in &power.modifiers {
        println!("  {modifier}");
    }
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Attack", "Targets", "Hit"]);
    for (i, attack) in power.attacks.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            attack_line(attack),
            attack.target.to_string(),
            effect_lines(&attack.effects),
        ]);
    }
    println!("{table}");

    if !power.effects.is_empty() {
        println!("  {} {}", "Effect:".bold(), effect_lines(&power.effects).replace('\n', "; "));
    }

    let attacker = Attacker::from_scores([ESTIMATE_SCORE; 6], DieCodes::dice(1, 8), 0);
    let expected = power.expected_damage(&attacker, &Defender::uniform(ESTIMATE_DEFENSE));
    println!(
        "  {} {:.2} {}",
        "Expected damage".bold(),
        expected,
        format!("(score {ESTIMATE_SCORE}, d8 weapon, defenses {ESTIMATE_DEFENSE})").dimmed()
    );
}

fn tool_label(tool_type: ToolType, range: ToolRange) -> &'static str {
    match (tool_type, range) {
        (ToolType::Weapon, ToolRange::Melee) => "melee weapon",
        (ToolType::Weapon, ToolRange::Ranged) => "ranged weapon",
        (ToolType::Implement, ToolRange::Melee) => "melee implement",
        (ToolType::Implement, ToolRange::Ranged) => "implement",
    }
}

fn attack_line(attack: &AttackProfile) -> String {
    let defense = attack
        .defense()
        .map_or_else(|| "AC".to_string(), |d| d.to_string());
    let mut lines = vec![format!("{} vs. {defense}", attack.ability.abbreviation())];
    lines.extend(
        attack
            .modifiers
            .iter()
            .filter(|m| !matches!(m, AttackModifier::NonArmorDefense(_)))
            .map(ToString::to_string),
    );
    lines.join("\n")
}

fn effect_lines(effects: &[TargetEffect]) -> String {
    effects
        .iter()
        .flat_map(|effect| {
            effect.modifiers.iter().map(move |modifier| match effect.target {
                EffectTarget::Enemy => modifier.to_string(),
                target => format!("{target}: {modifier}"),
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}
