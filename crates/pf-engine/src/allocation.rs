//! Spreading a power's remaining budget over its damage expressions.
//!
//! Every damage modifier on an attack is a slot weighted by that attack's
//! cost multiplier. Weapons receive whole `[W]` dice; implements receive
//! fractional weapon dice that are later converted to a concrete die.

use pf_dice::DieCodes;
use pf_dice::expression::WEAPON_DIE_AVERAGE;
use serde::{Deserialize, Serialize};

use crate::builder::{EffectLocation, PowerProfileBuilder};
use crate::modifier::EffectModifier;

/// Tolerance when flooring or comparing budget amounts.
const EPSILON: f64 = 1e-9;

/// Implement dice considered when converting weapon dice, smallest first.
const IMPLEMENT_DICE: [u32; 4] = [4, 6, 8, 10];

/// Which attacks receive dice the even share cannot cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AllocationPolicy {
    /// Later attacks hit harder.
    Increasing,
    /// Earlier attacks hit harder.
    #[default]
    Decreasing,
}

/// One damage modifier that receives dice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageSlot {
    /// Attack index.
    pub attack: usize,
    /// Effect index within the attack.
    pub effect: usize,
    /// Modifier index within the effect.
    pub modifier: usize,
    /// Budget one die costs in this slot.
    pub weight: f64,
}

/// Result of spreading the budget.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Damage slots in tree order.
    pub slots: Vec<DamageSlot>,
    /// Weapon dice per slot.
    pub weapon_dice: Vec<f64>,
    /// Budget no slot could afford.
    pub leftover: f64,
}

impl Allocation {
    /// Dice allocated to the damage modifier at the given position.
    pub fn dice_for(&self, attack: usize, effect: usize, modifier: usize) -> Option<f64> {
        self.slots
            .iter()
            .position(|s| s.attack == attack && s.effect == effect && s.modifier == modifier)
            .map(|index| self.weapon_dice[index])
    }

    /// Fewest dice any slot received, if there are slots.
    pub fn min_dice(&self) -> Option<f64> {
        self.weapon_dice.iter().copied().reduce(f64::min)
    }
}

/// Every damage modifier on an attack, weighted by its attack's multiplier.
pub fn damage_slots(power: &PowerProfileBuilder) -> Vec<DamageSlot> {
    let mut slots = Vec::new();
    for (attack, builder) in power.attacks().iter().enumerate() {
        let weight = power.attack_cost(attack).multiplier;
        for effect in 0..builder.target_effects().len() {
            let location = EffectLocation::Attack { attack, effect };
            for (modifier, m) in power.effect_at(location).modifiers().iter().enumerate() {
                if matches!(m, EffectModifier::Damage(_)) {
                    slots.push(DamageSlot {
                        attack,
                        effect,
                        modifier,
                        weight,
                    });
                }
            }
        }
    }
    slots
}

/// Spread a power's remaining budget over its damage slots.
pub fn allocate(power: &PowerProfileBuilder) -> Allocation {
    let slots = damage_slots(power);
    let weights: Vec<f64> = slots.iter().map(|s| s.weight).collect();
    let (weapon_dice, leftover) = allocate_budget(
        power.remaining_budget(),
        &weights,
        power.tool().is_weapon(),
        power.allocation_policy(),
    );
    Allocation {
        slots,
        weapon_dice,
        leftover,
    }
}

/// Split `remaining` over slots with the given per-die weights.
///
/// Every slot first gets `remaining / Σ weights` dice, floored when
/// `whole_dice` is set. Whatever is left then buys single dice, visiting
/// slots front to back for [`AllocationPolicy::Decreasing`] and back to
/// front for [`AllocationPolicy::Increasing`], until no slot is affordable.
pub fn allocate_budget(
    remaining: f64,
    weights: &[f64],
    whole_dice: bool,
    policy: AllocationPolicy,
) -> (Vec<f64>, f64) {
    let total: f64 = weights.iter().sum();
    if weights.is_empty() || total <= 0.0 {
        return (Vec::new(), remaining.max(0.0));
    }

    let share = remaining / total;
    if !whole_dice {
        return (vec![share; weights.len()], 0.0);
    }

    let base = (share + EPSILON).floor().max(0.0);
    let mut dice = vec![base; weights.len()];
    let mut leftover = remaining - base * total;
    let order: Vec<usize> = match policy {
        AllocationPolicy::Decreasing => (0..weights.len()).collect(),
        AllocationPolicy::Increasing => (0..weights.len()).rev().collect(),
    };
    loop {
        let mut placed = false;
        for &index in &order {
            if weights[index] <= leftover + EPSILON {
                dice[index] += 1.0;
                leftover -= weights[index];
                placed = true;
            }
        }
        if !placed {
            break;
        }
    }
    (dice, leftover.max(0.0))
}

/// Convert weapon dice into the implement die with the closest fit.
///
/// The target average is `weapon_dice × 5.5`. Among d4, d6, d8 and d10 the
/// die leaving the smallest remainder wins, the larger die on ties. A power
/// too weak for even one die rolls `1d4`.
pub fn implement_dice(weapon_dice: f64) -> DieCodes {
    let average = weapon_dice * WEAPON_DIE_AVERAGE;
    let mut best: Option<(u32, i32, f64)> = None;
    for sides in IMPLEMENT_DICE {
        let die_average = f64::from(sides + 1) / 2.0;
        let count = (average / die_average + EPSILON).floor().max(0.0);
        let remainder = average - count * die_average;
        if best.is_none_or(|(_, _, r)| remainder <= r + EPSILON) {
            best = Some((sides, count as i32, remainder));
        }
    }
    match best {
        Some((sides, count, _)) if count > 0 => DieCodes::dice(count, sides),
        _ => DieCodes::dice(1, 4),
    }
}
