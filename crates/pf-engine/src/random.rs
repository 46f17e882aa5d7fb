//! Pluggable random number sources.

use rand::Rng;

/// Supplies the random draws the search needs.
///
/// Implemented for any `FnMut(u64, u64) -> u64` closure, so a fixed policy
/// such as `|_, max| max - 1` makes a run fully reproducible.
pub trait RandomSource {
    /// A value in `min_inclusive..max_exclusive`.
    fn next_in_range(&mut self, min_inclusive: u64, max_exclusive: u64) -> u64;
}

impl<F> RandomSource for F
where
    F: FnMut(u64, u64) -> u64,
{
    fn next_in_range(&mut self, min_inclusive: u64, max_exclusive: u64) -> u64 {
        self(min_inclusive, max_exclusive)
    }
}

/// Adapts any [`rand::Rng`] into a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_in_range(&mut self, min_inclusive: u64, max_exclusive: u64) -> u64 {
        if max_exclusive <= min_inclusive {
            return min_inclusive;
        }
        self.0.random_range(min_inclusive..max_exclusive)
    }
}

/// A source that always returns the largest legal value.
pub fn always_max(_min_inclusive: u64, max_exclusive: u64) -> u64 {
    max_exclusive.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn closures_are_sources() {
        let mut calls = Vec::new();
        let mut source = |min: u64, max: u64| -> u64 {
            calls.push((min, max));
            min
        };
        assert_eq!(source.next_in_range(3, 9), 3);
        assert_eq!(calls, vec![(3, 9)]);
    }

    #[test]
    fn always_max_picks_last() {
        let mut source = always_max;
        assert_eq!(source.next_in_range(1, 10), 9);
    }

    #[test]
    fn rng_source_stays_in_range() {
        let mut source = RngSource(StdRng::seed_from_u64(42));
        for _ in 0..100 {
            let value = source.next_in_range(1, 6);
            assert!((1..6).contains(&value));
        }
        assert_eq!(source.next_in_range(4, 4), 4);
    }

    #[test]
    fn seeded_sources_repeat() {
        let mut a = RngSource(StdRng::seed_from_u64(7));
        let mut b = RngSource(StdRng::seed_from_u64(7));
        let first: Vec<u64> = (0..10).map(|_| a.next_in_range(0, 1000)).collect();
        let second: Vec<u64> = (0..10).map(|_| b.next_in_range(0, 1000)).collect();
        assert_eq!(first, second);
    }
}
