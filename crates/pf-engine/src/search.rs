//! The budget-constrained upgrade search.
//!
//! A power starts from a valid seed and grows one upgrade at a time. Each
//! step enumerates every candidate upgrade, finalizes it, keeps the ones
//! that still fit the budget and picks one with weighted escalating
//! selection. A stage ends when nothing valid remains.

use pf_dice::{Ability, GameDiceExpression};
use tracing::{debug, info, warn};

use crate::allocation;
use crate::builder::{
    AttackContext, AttackProfileBuilder, EffectContext, EffectLocation, EffectTarget, EffectType,
    PowerContext, PowerProfileBuilder, TargetEffectBuilder,
};
use crate::built::PowerProfile;
use crate::config::PowerProfileConfig;
use crate::error::{EngineError, EngineResult};
use crate::formula::FormulaRegistry;
use crate::modifier::{
    DamageModifier, EffectModifier, Finalization, ModifierContract, ProfileRewrite, UpgradeStage,
};
use crate::profile::{ClassProfile, DamageType, ToolProfile, Usage};
use crate::random::RandomSource;
use crate::selection;

/// Tolerance for budget comparisons.
const EPSILON: f64 = 1e-9;

/// How many rewrites may chain while finalizing one candidate.
pub const MAX_REWRITE_DEPTH: usize = 4;

/// Slots the search may open on an attack, besides the seeded enemy slot.
const ATTACK_SLOTS: [(EffectTarget, EffectType); 1] = [(EffectTarget::Ally, EffectType::Beneficial)];

/// Slots the search may open on the power as a whole.
const POWER_SLOTS: [(EffectTarget, EffectType); 1] = [(EffectTarget::User, EffectType::Beneficial)];

/// One upgraded power and the name of the modifier that changed.
#[derive(Debug, Clone)]
struct Candidate {
    name: &'static str,
    power: PowerProfileBuilder,
}

/// Generates powers from a formula registry and per-run preferences.
#[derive(Debug)]
pub struct PowerGenerator {
    registry: FormulaRegistry,
    config: PowerProfileConfig,
}

impl Default for PowerGenerator {
    fn default() -> Self {
        Self::new(PowerProfileConfig::default())
    }
}

impl PowerGenerator {
    /// A generator over the reference catalog.
    pub fn new(config: PowerProfileConfig) -> Self {
        Self {
            registry: FormulaRegistry::standard(),
            config,
        }
    }

    /// Replace the formula registry.
    pub fn with_registry(mut self, registry: FormulaRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The search preferences.
    pub fn config(&self) -> &PowerProfileConfig {
        &self.config
    }

    /// Seed, search and build a power.
    pub fn generate(
        &self,
        level: u32,
        usage: Usage,
        tool: &ToolProfile,
        class: Option<&ClassProfile>,
        random: &mut dyn RandomSource,
    ) -> EngineResult<PowerProfile> {
        let seed = self.seed(level, usage, tool, random)?;
        Ok(self.search(seed, class, random).build())
    }

    /// The starting power: one attack dealing `1 × ability` damage.
    ///
    /// The ability and damage type are drawn from the tool's preference
    /// lists, only the first entry for at-will powers.
    pub fn seed(
        &self,
        level: u32,
        usage: Usage,
        tool: &ToolProfile,
        random: &mut dyn RandomSource,
    ) -> EngineResult<PowerProfileBuilder> {
        let power = PowerProfileBuilder::for_level(level, usage, tool.clone())?;
        let count = tool.candidate_count(usage);
        let abilities: Vec<Ability> = tool.abilities.iter().copied().take(count).collect();
        let ability = selection::select(abilities, random)
            .ok_or_else(|| EngineError::InvalidToolProfile("no abilities".to_string()))?;
        let damage_types: Vec<DamageType> = tool
            .preferred_damage_types
            .iter()
            .copied()
            .take(count)
            .collect();
        let damage_type = selection::select(damage_types, random)
            .ok_or_else(|| EngineError::InvalidToolProfile("no damage types".to_string()))?;

        let damage = DamageModifier::new(GameDiceExpression::ability(ability), vec![damage_type]);
        let attack = AttackProfileBuilder::new(ability).with_added_target_effect(
            TargetEffectBuilder::new(EffectTarget::Enemy, EffectType::Harmful)
                .apply_modifier(EffectModifier::Damage(damage)),
        );
        debug!(%ability, %damage_type, "seeded power");
        Ok(power.with_added_attack(attack))
    }

    /// Apply upgrades stage by stage until none fits.
    pub fn search(
        &self,
        seed: PowerProfileBuilder,
        class: Option<&ClassProfile>,
        random: &mut dyn RandomSource,
    ) -> PowerProfileBuilder {
        let mut power = seed;
        for stage in UpgradeStage::ALL {
            let mut steps = 0;
            loop {
                if steps >= self.config.max_iterations {
                    warn!(?stage, steps, "upgrade cap reached");
                    break;
                }
                let candidates = self.candidates(&power, stage, class);
                let count = candidates.len();
                let Some(next) = selection::select(candidates, random) else {
                    break;
                };
                debug!(
                    ?stage,
                    step = steps,
                    candidates = count,
                    upgraded = next.name,
                    "applied upgrade"
                );
                power = next.power;
                steps += 1;
            }
        }
        info!(
            level = power.level(),
            usage = %power.usage(),
            attacks = power.attacks().len(),
            complexity = power.complexity(),
            remaining = power.remaining_budget(),
            "power complete"
        );
        power
    }

    /// Valid, finalized upgrades of `power`, most preferred first.
    fn candidates(
        &self,
        power: &PowerProfileBuilder,
        stage: UpgradeStage,
        class: Option<&ClassProfile>,
    ) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .enumerate(power, stage)
            .into_iter()
            .filter(|c| !self.config.is_excluded(c.name))
            .flat_map(|c| {
                finalize(&c.power)
                    .into_iter()
                    .map(move |power| Candidate { name: c.name, power })
            })
            .filter(|c| c.power != *power && is_valid(&c.power))
            .collect();
        candidates.sort_by_key(|c| self.rank(c.name, power.tool(), class));
        candidates
    }

    fn rank(&self, name: &str, tool: &ToolProfile, class: Option<&ClassProfile>) -> u8 {
        if self.config.preferred_modifiers.iter().any(|n| n == name) {
            0
        } else if tool.preferred_modifiers.iter().any(|n| n == name) {
            1
        } else if class.is_some_and(|c| c.role.preferred_modifiers().iter().any(|n| *n == name)) {
            2
        } else {
            3
        }
    }

    /// Every single-step change to `power`, before finalizing.
    fn enumerate(&self, power: &PowerProfileBuilder, stage: UpgradeStage) -> Vec<Candidate> {
        let pending = power.has_pending_upgrade();
        let mut candidates = upgrades(power, stage, pending);
        if pending {
            return candidates;
        }
        candidates.extend(self.base_modifiers(power, stage));
        candidates.extend(self.new_slots(power, stage));
        candidates
    }

    /// First instances from formulas whose modifier is absent.
    fn base_modifiers(&self, power: &PowerProfileBuilder, stage: UpgradeStage) -> Vec<Candidate> {
        let tool = power.tool();
        let usage = power.usage();
        let mut candidates = Vec::new();

        let ctx = PowerContext::new(power);
        for formula in self.registry.power_formulas(tool, usage) {
            if power.has_modifier(formula.name()) {
                continue;
            }
            for modifier in formula.base_modifiers(stage, &ctx) {
                candidates.push(Candidate {
                    name: modifier.name(),
                    power: power.apply_modifier(modifier),
                });
            }
        }

        for (index, attack) in power.attacks().iter().enumerate() {
            let ctx = AttackContext::new(power, index);
            for formula in self.registry.attack_formulas(tool, usage) {
                if attack.has_modifier(formula.name()) {
                    continue;
                }
                for modifier in formula.base_modifiers(stage, &ctx) {
                    candidates.push(Candidate {
                        name: modifier.name(),
                        power: power.with_attack(index, attack.apply_modifier(modifier)),
                    });
                }
            }
        }

        for location in power.effect_locations() {
            candidates.extend(self.effect_base_modifiers(power, location, stage));
        }
        candidates
    }

    fn effect_base_modifiers(
        &self,
        power: &PowerProfileBuilder,
        location: EffectLocation,
        stage: UpgradeStage,
    ) -> Vec<Candidate> {
        let ctx = EffectContext::new(power, location);
        let effect = ctx.effect();
        let mut candidates = Vec::new();
        for formula in self.registry.effect_formulas(power.tool(), power.usage()) {
            if effect.has_modifier(formula.name()) {
                continue;
            }
            for modifier in formula.base_modifiers(stage, &ctx) {
                candidates.push(Candidate {
                    name: modifier.name(),
                    power: power.with_effect_at(location, effect.apply_modifier(modifier)),
                });
            }
        }
        candidates
    }

    /// New effect slots, each opened together with its first modifier.
    fn new_slots(&self, power: &PowerProfileBuilder, stage: UpgradeStage) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for (index, attack) in power.attacks().iter().enumerate() {
            for (target, effect_type) in ATTACK_SLOTS {
                if attack.has_slot(target, effect_type) {
                    continue;
                }
                let opened = power.with_attack(
                    index,
                    attack.with_added_target_effect(TargetEffectBuilder::new(target, effect_type)),
                );
                let location = EffectLocation::Attack {
                    attack: index,
                    effect: attack.target_effects().len(),
                };
                candidates.extend(self.effect_base_modifiers(&opened, location, stage));
            }
        }
        for (target, effect_type) in POWER_SLOTS {
            if power.effects().iter().any(|e| e.slot() == (target, effect_type)) {
                continue;
            }
            let opened = power.with_added_effect(TargetEffectBuilder::new(target, effect_type));
            let location = EffectLocation::Power {
                effect: power.effects().len(),
            };
            candidates.extend(self.effect_base_modifiers(&opened, location, stage));
        }
        candidates
    }
}

/// In-place upgrades of every modifier, or only of those that must upgrade.
fn upgrades(power: &PowerProfileBuilder, stage: UpgradeStage, pending_only: bool) -> Vec<Candidate> {
    let eligible = |must_upgrade: bool| !pending_only || must_upgrade;
    let mut candidates = Vec::new();

    let ctx = PowerContext::new(power);
    for (index, modifier) in power.modifiers().iter().enumerate() {
        if !eligible(modifier.must_upgrade()) {
            continue;
        }
        for upgrade in modifier.upgrades(stage, &ctx) {
            candidates.push(Candidate {
                name: upgrade.name(),
                power: power.with_modifier(index, upgrade),
            });
        }
    }

    for (index, attack) in power.attacks().iter().enumerate() {
        let ctx = AttackContext::new(power, index);
        if eligible(attack.target().must_upgrade()) {
            for upgrade in attack.target().upgrades(stage, &ctx) {
                candidates.push(Candidate {
                    name: upgrade.name(),
                    power: power.with_attack(index, attack.with_target(upgrade)),
                });
            }
        }
        for (slot, modifier) in attack.modifiers().iter().enumerate() {
            if !eligible(modifier.must_upgrade()) {
                continue;
            }
            for upgrade in modifier.upgrades(stage, &ctx) {
                candidates.push(Candidate {
                    name: upgrade.name(),
                    power: power.with_attack(index, attack.with_modifier(slot, upgrade)),
                });
            }
        }
    }

    for location in power.effect_locations() {
        let ctx = EffectContext::new(power, location);
        let effect = ctx.effect();
        for (slot, modifier) in effect.modifiers().iter().enumerate() {
            if !eligible(modifier.must_upgrade()) {
                continue;
            }
            for upgrade in modifier.upgrades(stage, &ctx) {
                candidates.push(Candidate {
                    name: upgrade.name(),
                    power: power.with_effect_at(location, effect.with_modifier(slot, upgrade)),
                });
            }
        }
    }
    candidates
}

/// Resolve every modifier's finalization, applying whole-power rewrites.
///
/// A candidate may finalize into several powers or none at all.
pub fn finalize(power: &PowerProfileBuilder) -> Vec<PowerProfileBuilder> {
    finalize_at_depth(power.clone(), 0)
}

fn finalize_at_depth(power: PowerProfileBuilder, depth: usize) -> Vec<PowerProfileBuilder> {
    if depth > MAX_REWRITE_DEPTH {
        warn!(depth, "rewrite chain too deep; candidate dropped");
        return Vec::new();
    }
    let (power, rewrite) = finalize_locally(power);
    match rewrite {
        None => vec![power],
        Some(rewrite) => rewrite(&power)
            .into_iter()
            .flat_map(|rewritten| finalize_at_depth(rewritten, depth + 1))
            .collect(),
    }
}

/// Apply every `Replace` and `Remove`, returning the first rewrite requested.
fn finalize_locally(mut power: PowerProfileBuilder) -> (PowerProfileBuilder, Option<ProfileRewrite>) {
    let mut rewrite = None;

    for location in power.effect_locations() {
        let ctx = EffectContext::new(&power, location);
        let effect = ctx.effect();
        let modifiers = resolve(effect.modifiers(), |m| m.finalize(&ctx), &mut rewrite);
        let effect = effect.with_modifiers(modifiers);
        power = power.with_effect_at(location, effect);
    }

    for index in 0..power.attacks().len() {
        let ctx = AttackContext::new(&power, index);
        let attack = ctx.attack();
        let target = match attack.target().finalize(&ctx) {
            Finalization::Replace(target) => target,
            Finalization::Keep | Finalization::Remove | Finalization::Rewrite(_) => {
                attack.target().clone()
            }
        };
        let modifiers = resolve(attack.modifiers(), |m| m.finalize(&ctx), &mut rewrite);
        let attack = attack.with_target(target).with_modifiers(modifiers);
        power = power.with_attack(index, attack);
    }

    let ctx = PowerContext::new(&power);
    let modifiers = resolve(power.modifiers(), |m| m.finalize(&ctx), &mut rewrite);
    let power = power.with_modifiers(modifiers);
    (power, rewrite)
}

fn resolve<M: Clone>(
    modifiers: &[M],
    finalize: impl Fn(&M) -> Finalization<M>,
    rewrite: &mut Option<ProfileRewrite>,
) -> Vec<M> {
    let mut resolved = Vec::with_capacity(modifiers.len());
    for modifier in modifiers {
        match finalize(modifier) {
            Finalization::Keep => resolved.push(modifier.clone()),
            Finalization::Replace(replacement) => resolved.push(replacement),
            Finalization::Remove => {}
            Finalization::Rewrite(requested) => {
                resolved.push(modifier.clone());
                if rewrite.is_none() {
                    *rewrite = Some(requested);
                }
            }
        }
    }
    resolved
}

/// Returns true if the power fits its complexity and budget limits.
///
/// The budget left after fixed costs must be positive, each target's share
/// must reach the minimum, and every weapon damage slot needs a whole die.
pub fn is_valid(power: &PowerProfileBuilder) -> bool {
    let limits = power.limits();
    if power.complexity() > limits.max_complexity {
        return false;
    }
    let remaining = power.remaining_budget();
    if remaining <= 0.0 {
        return false;
    }
    let share = power.single_target_total();
    if share > 0.0 && remaining / share < limits.minimum - EPSILON {
        return false;
    }
    if power.tool().is_weapon() {
        let allocation = allocation::allocate(power);
        if allocation.min_dice().is_some_and(|dice| dice < 1.0 - EPSILON) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::{
        Condition, ConditionModifier, ForcedMovementModifier, Movement, PowerModifier,
        TargetModifier,
    };
    use crate::profile::ClassRole;
    use crate::random::always_max;

    fn seed(usage: Usage, tool: &ToolProfile) -> PowerProfileBuilder {
        PowerGenerator::default()
            .seed(1, usage, tool, &mut always_max)
            .unwrap()
    }

    #[test]
    fn seed_is_valid() {
        for usage in [Usage::AtWill, Usage::Encounter, Usage::Daily] {
            for tool in [
                ToolProfile::melee_weapon(),
                ToolProfile::ranged_weapon(),
                ToolProfile::implement(),
            ] {
                assert!(is_valid(&seed(usage, &tool)), "{usage} {tool:?}");
            }
        }
    }

    #[test]
    fn at_will_seed_uses_the_first_ability() {
        let power = seed(Usage::AtWill, &ToolProfile::implement());
        assert_eq!(power.attacks()[0].ability(), Ability::Intelligence);
    }

    #[test]
    fn invalid_level_is_an_error() {
        let err = PowerGenerator::default()
            .seed(31, Usage::AtWill, &ToolProfile::melee_weapon(), &mut always_max)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidLevel(31)));
    }

    #[test]
    fn at_will_melee_is_a_plain_weapon_attack() {
        let built = PowerGenerator::default()
            .generate(1, Usage::AtWill, &ToolProfile::melee_weapon(), None, &mut always_max)
            .unwrap();
        assert_eq!(built.attacks.len(), 1);
        let damage: Vec<String> = built.attacks[0].damage().map(ToString::to_string).collect();
        assert_eq!(damage, vec!["[W] + STR"]);
    }

    #[test]
    fn pending_placeholders_restrict_candidates() {
        let power = seed(Usage::Encounter, &ToolProfile::melee_weapon());
        let location = EffectLocation::Attack {
            attack: 0,
            effect: 0,
        };
        let effect = power
            .effect_at(location)
            .apply_modifier(EffectModifier::Condition(ConditionModifier::new(
                Condition::Slowed,
            )));
        let power = power.with_effect_at(location, effect);
        let generator = PowerGenerator::default();
        let candidates = generator.enumerate(&power, UpgradeStage::Standard);
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.name == "Condition"));
    }

    #[test]
    fn new_slots_carry_their_first_modifier() {
        let power = seed(Usage::Encounter, &ToolProfile::melee_weapon());
        let generator = PowerGenerator::default();
        let opened = generator.new_slots(&power, UpgradeStage::Standard);
        // ally: shift and temporary hit points; user: shift
        assert_eq!(opened.len(), 3);
        assert!(opened
            .iter()
            .all(|c| c.power.effect_locations().iter().all(|&l| !c.power.effect_at(l).is_empty())));
    }

    #[test]
    fn excluded_modifiers_are_never_offered() {
        let config = PowerProfileConfig::default().with_excluded_modifier("Multiattack");
        let generator = PowerGenerator::new(config);
        let power = seed(Usage::Daily, &ToolProfile::melee_weapon());
        let candidates = generator.candidates(&power, UpgradeStage::InitializeAttacks, None);
        assert!(!candidates.is_empty());
        assert!(candidates.iter().all(|c| c.name != "Multiattack"));
    }

    #[test]
    fn preferences_order_candidates() {
        let config = PowerProfileConfig::default().with_preferred_modifier("Non-Armor Defense");
        let generator = PowerGenerator::new(config);
        let power = seed(Usage::Encounter, &ToolProfile::melee_weapon());
        let class = ClassProfile::new(ClassRole::Striker);
        let candidates = generator.candidates(&power, UpgradeStage::InitializeAttacks, Some(&class));
        assert_eq!(candidates[0].name, "Non-Armor Defense");
        let ranks: Vec<u8> = candidates
            .iter()
            .map(|c| generator.rank(c.name, power.tool(), Some(&class)))
            .collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn controllers_prefer_the_persistent_zone_not_the_zone_target() {
        let generator = PowerGenerator::default();
        let tool = ToolProfile::implement();
        let class = ClassProfile::new(ClassRole::Controller);
        assert_eq!(generator.rank("Persistent Zone", &tool, Some(&class)), 2);
        assert_eq!(generator.rank("Zone", &tool, Some(&class)), 3);
    }

    #[test]
    fn multiattack_is_finalized_into_attacks() {
        let power = seed(Usage::Encounter, &ToolProfile::melee_weapon());
        let generator = PowerGenerator::default();
        let candidates = generator.candidates(&power, UpgradeStage::InitializeAttacks, None);
        let split: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| c.name == "Multiattack")
            .collect();
        assert_eq!(split.len(), 2);
        for candidate in split {
            assert_eq!(candidate.power.attacks().len(), 2);
            assert!(matches!(
                candidate.power.modifiers(),
                [PowerModifier::Multiattack(m)] if m.applied
            ));
        }
    }

    #[test]
    fn finalize_replaces_pull_on_areas() {
        let power = seed(Usage::Encounter, &ToolProfile::melee_weapon());
        let attack = power.attacks()[0].with_target(TargetModifier::Burst { size: 1 });
        let power = power.with_attack(0, attack);
        let location = EffectLocation::Attack {
            attack: 0,
            effect: 0,
        };
        let pull = EffectModifier::ForcedMovement(ForcedMovementModifier {
            movement: Movement::Pull,
            squares: 1,
        });
        let power = power.with_effect_at(location, power.effect_at(location).apply_modifier(pull));
        let finalized = finalize(&power);
        assert_eq!(finalized.len(), 1);
        assert_eq!(
            finalized[0].effect_at(location).modifiers()[1],
            EffectModifier::ForcedMovement(ForcedMovementModifier {
                movement: Movement::Push,
                squares: 1,
            })
        );
    }

    #[test]
    fn iteration_cap_stops_the_stage() {
        let generator = PowerGenerator::new(PowerProfileConfig::default().with_max_iterations(0));
        let seed = seed(Usage::Daily, &ToolProfile::melee_weapon());
        let searched = generator.search(seed.clone(), None, &mut always_max);
        assert_eq!(searched, seed);
    }
}
