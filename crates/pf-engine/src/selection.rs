//! Weighted escalating random selection.
//!
//! Items arrive in preference order. Walking them from least to most
//! preferred, each one claims a threshold that grows geometrically from 1;
//! a draw in `[1, total)` picks the last threshold at or below it. Earlier
//! items therefore own wider bands without making later ones impossible.

use crate::random::RandomSource;

/// Growth factor between consecutive thresholds.
pub const ESCALATION_FACTOR: f64 = 1.5;

/// Largest gap between two consecutive thresholds.
const MAX_STEP: u64 = 1 << 48;

/// Cumulative thresholds for `count` items, least preferred first.
///
/// The returned vector has `count + 1` entries; the last one is the
/// exclusive upper bound of the draw.
pub fn thresholds(count: usize) -> Vec<u64> {
    let mut table = Vec::with_capacity(count + 1);
    let mut current = 1u64;
    table.push(current);
    for _ in 0..count {
        let step = (current as f64 * (ESCALATION_FACTOR - 1.0)).ceil() as u64;
        current = current.saturating_add(step.clamp(1, MAX_STEP));
        table.push(current);
    }
    table
}

/// Pick one item, favouring those at the front.
///
/// Returns `None` only for an empty list.
pub fn select<T>(items: Vec<T>, random: &mut dyn RandomSource) -> Option<T> {
    let index = select_index(items.len(), random)?;
    items.into_iter().nth(index)
}

/// Pick an index into a preference-ordered list of `count` items.
pub fn select_index(count: usize, random: &mut dyn RandomSource) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let table = thresholds(count);
    let total = table[count];
    let draw = random.next_in_range(1, total).clamp(1, total - 1);
    // table[k] belongs to the item at preference position count - 1 - k
    let band = table[..count].iter().rposition(|&t| t <= draw).unwrap_or(0);
    Some(count - 1 - band)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::always_max;

    #[test]
    fn thresholds_escalate() {
        assert_eq!(thresholds(5), vec![1, 2, 3, 5, 8, 12]);
        assert_eq!(thresholds(0), vec![1]);
    }

    #[test]
    fn thresholds_never_overflow() {
        let table = thresholds(500);
        assert!(table.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn always_max_picks_most_preferred() {
        let mut source = always_max;
        assert_eq!(select(vec!["a", "b", "c"], &mut source), Some("a"));
    }

    #[test]
    fn lowest_draw_picks_least_preferred() {
        let mut source = |min: u64, _max: u64| -> u64 { min };
        assert_eq!(select(vec!["a", "b", "c"], &mut source), Some("c"));
    }

    #[test]
    fn bands_widen_toward_the_front() {
        // thresholds for three items: c=[1,2) b=[2,3) a=[3,5)
        let picks: Vec<usize> = (1..5)
            .map(|draw| {
                let mut source = move |_: u64, _: u64| -> u64 { draw };
                select_index(3, &mut source).unwrap()
            })
            .collect();
        assert_eq!(picks, vec![2, 1, 0, 0]);
    }

    #[test]
    fn out_of_range_draws_are_clamped() {
        let mut source = |_: u64, _: u64| -> u64 { 1_000 };
        assert_eq!(select_index(2, &mut source), Some(0));
        let mut source = |_: u64, _: u64| -> u64 { 0 };
        assert_eq!(select_index(2, &mut source), Some(1));
    }

    #[test]
    fn empty_selects_nothing() {
        let mut source = always_max;
        assert_eq!(select(Vec::<u8>::new(), &mut source), None);
    }
}
