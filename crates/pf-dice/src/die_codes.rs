//! Literal dice terms and their canonical collection.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Mul, Neg, Range, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DiceError, DiceResult};
use crate::parser;

/// Most dice, counted without sign, that one collection may hold.
pub const MAX_DICE: u32 = 100;

/// Most faces a single die may have.
pub const MAX_SIDES: u32 = 100;

/// A signed number of like-sided dice, e.g. `2d6` or `-d4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DieCode {
    /// How many dice; negative counts are subtracted from the total.
    pub count: i32,
    /// Number of faces on each die.
    pub sides: u32,
}

impl DieCode {
    /// Create a die code.
    pub fn new(count: i32, sides: u32) -> Self {
        Self { count, sides }
    }

    /// Expected value of the term.
    pub fn average(&self) -> f64 {
        f64::from(self.count) * (f64::from(self.sides) + 1.0) / 2.0
    }

    /// Smallest possible total of the term.
    pub fn min_total(&self) -> i64 {
        if self.count >= 0 {
            i64::from(self.count)
        } else {
            i64::from(self.count) * i64::from(self.sides)
        }
    }

    /// Largest possible total of the term.
    pub fn max_total(&self) -> i64 {
        if self.count >= 0 {
            i64::from(self.count) * i64::from(self.sides)
        } else {
            i64::from(self.count)
        }
    }

    /// The term without its sign, e.g. `2d6` or `d4`.
    pub(crate) fn magnitude_text(&self) -> String {
        match self.count.unsigned_abs() {
            1 => format!("d{}", self.sides),
            n => format!("{n}d{}", self.sides),
        }
    }
}

impl fmt::Display for DieCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count < 0 {
            write!(f, "-")?;
        }
        write!(f, "{}", self.magnitude_text())
    }
}

/// A canonical set of dice terms plus a flat modifier, e.g. `2d6 + d4 - 2`.
///
/// At most one entry exists per number of sides and no entry has a zero
/// count. Entries are kept in descending order of sides, which is also the
/// rendering order.
///
/// The arithmetic operators saturate; the `checked_*` methods report
/// overflow instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "RawDieCodes", into = "RawDieCodes")]
pub struct DieCodes {
    entries: Vec<DieCode>,
    modifier: i32,
}

#[derive(Serialize, Deserialize)]
struct RawDieCodes {
    entries: Vec<DieCode>,
    modifier: i32,
}

impl From<RawDieCodes> for DieCodes {
    fn from(raw: RawDieCodes) -> Self {
        DieCodes::new(raw.entries, raw.modifier)
    }
}

impl From<DieCodes> for RawDieCodes {
    fn from(codes: DieCodes) -> Self {
        RawDieCodes {
            entries: codes.entries,
            modifier: codes.modifier,
        }
    }
}

impl DieCodes {
    /// No dice and no modifier.
    pub const ZERO: DieCodes = DieCodes {
        entries: Vec::new(),
        modifier: 0,
    };

    /// Build a canonical collection, merging same-sided entries and dropping zero counts.
    pub fn new(entries: impl IntoIterator<Item = DieCode>, modifier: i32) -> Self {
        let mut merged: BTreeMap<u32, i32> = BTreeMap::new();
        for entry in entries {
            let count = merged.entry(entry.sides).or_insert(0);
            *count = count.saturating_add(entry.count);
        }
        Self::from_merged(merged, modifier)
    }

    fn try_new(entries: impl IntoIterator<Item = DieCode>, modifier: i32) -> Option<Self> {
        let mut merged: BTreeMap<u32, i32> = BTreeMap::new();
        for entry in entries {
            let count = merged.entry(entry.sides).or_insert(0);
            *count = count.checked_add(entry.count)?;
        }
        Some(Self::from_merged(merged, modifier))
    }

    fn from_merged(merged: BTreeMap<u32, i32>, modifier: i32) -> Self {
        let entries = merged
            .into_iter()
            .rev()
            .filter(|&(_, count)| count != 0)
            .map(|(sides, count)| DieCode { count, sides })
            .collect();
        Self { entries, modifier }
    }

    /// A single dice term.
    pub fn dice(count: i32, sides: u32) -> Self {
        Self::new([DieCode::new(count, sides)], 0)
    }

    /// A flat amount with no dice.
    pub fn flat(modifier: i32) -> Self {
        Self {
            entries: Vec::new(),
            modifier,
        }
    }

    /// The dice terms in descending order of sides.
    pub fn entries(&self) -> &[DieCode] {
        &self.entries
    }

    /// The flat modifier.
    pub fn modifier(&self) -> i32 {
        self.modifier
    }

    /// Returns a copy with a different flat modifier.
    pub fn with_modifier(&self, modifier: i32) -> Self {
        Self {
            entries: self.entries.clone(),
            modifier,
        }
    }

    /// Returns a copy without the flat modifier.
    pub fn without_modifier(&self) -> Self {
        self.with_modifier(0)
    }

    /// Returns true if there is at least one dice term.
    pub fn has_dice(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Returns true if there are no dice and the modifier is zero.
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty() && self.modifier == 0
    }

    /// Expected value by linearity of expectation.
    pub fn average(&self) -> f64 {
        self.entries.iter().map(DieCode::average).sum::<f64>() + f64::from(self.modifier)
    }

    /// Smallest possible total.
    pub fn min_total(&self) -> i64 {
        self.entries.iter().map(DieCode::min_total).sum::<i64>() + i64::from(self.modifier)
    }

    /// Largest possible total.
    pub fn max_total(&self) -> i64 {
        self.entries.iter().map(DieCode::max_total).sum::<i64>() + i64::from(self.modifier)
    }

    /// Number of dice rolled, ignoring their signs.
    pub fn dice_count(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| u64::from(entry.count.unsigned_abs()))
            .sum()
    }

    /// Fails if the dice are beyond [`MAX_DICE`] or [`MAX_SIDES`].
    ///
    /// `span` is reported as the location of the oversized dice.
    pub fn check_size(&self, span: Range<usize>) -> DiceResult<()> {
        if let Some(entry) = self.entries.iter().find(|entry| entry.sides > MAX_SIDES) {
            return Err(DiceError::TooLarge {
                what: "die size",
                value: u64::from(entry.sides),
                limit: MAX_SIDES,
                span,
            });
        }
        let count = self.dice_count();
        if count > u64::from(MAX_DICE) {
            return Err(DiceError::TooLarge {
                what: "dice count",
                value: count,
                limit: MAX_DICE,
                span,
            });
        }
        Ok(())
    }

    /// Sum of two collections, or `None` on overflow.
    pub fn checked_add(&self, rhs: &DieCodes) -> Option<DieCodes> {
        let modifier = self.modifier.checked_add(rhs.modifier)?;
        Self::try_new(self.entries.iter().chain(&rhs.entries).copied(), modifier)
    }

    /// Every count and the modifier scaled by `rhs`, or `None` on overflow.
    pub fn checked_mul(&self, rhs: i32) -> Option<DieCodes> {
        let entries = self
            .entries
            .iter()
            .map(|e| e.count.checked_mul(rhs).map(|count| DieCode::new(count, e.sides)))
            .collect::<Option<Vec<_>>>()?;
        Self::try_new(entries, self.modifier.checked_mul(rhs)?)
    }

    /// Parse literal dice notation such as `2d6 + d4 - 2`.
    ///
    /// Weapon dice and ability terms are rejected.
    pub fn parse(text: &str) -> DiceResult<Self> {
        let expression = parser::parse(text)?;
        if expression.weapon_dice_count() != 0 || !expression.abilities().is_zero() {
            return Err(DiceError::SymbolicTerm {
                term: expression.to_string(),
                span: 0..text.len(),
            });
        }
        Ok(expression.die_codes().clone())
    }
}

/// One rendered term: its sign and its unsigned text.
pub(crate) struct Term {
    pub negative: bool,
    pub body: String,
}

/// Render signed terms followed by a flat modifier in canonical form.
///
/// The modifier is omitted when zero unless it is the only term, in which
/// case the empty expression renders as `+0`.
pub(crate) fn write_terms(
    f: &mut fmt::Formatter<'_>,
    mut terms: Vec<Term>,
    modifier: i32,
) -> fmt::Result {
    if terms.is_empty() && modifier == 0 {
        return write!(f, "+0");
    }
    if modifier != 0 {
        terms.push(Term {
            negative: modifier < 0,
            body: modifier.unsigned_abs().to_string(),
        });
    }
    for (i, term) in terms.iter().enumerate() {
        match (i, term.negative) {
            (0, false) => write!(f, "{}", term.body)?,
            (0, true) => write!(f, "-{}", term.body)?,
            (_, false) => write!(f, " + {}", term.body)?,
            (_, true) => write!(f, " - {}", term.body)?,
        }
    }
    Ok(())
}

impl fmt::Display for DieCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms = self
            .entries
            .iter()
            .map(|entry| Term {
                negative: entry.count < 0,
                body: entry.magnitude_text(),
            })
            .collect();
        write_terms(f, terms, self.modifier)
    }
}

impl FromStr for DieCodes {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for DieCodes {
    type Output = DieCodes;

    fn add(self, rhs: DieCodes) -> DieCodes {
        DieCodes::new(
            self.entries.into_iter().chain(rhs.entries),
            self.modifier.saturating_add(rhs.modifier),
        )
    }
}

impl Neg for DieCodes {
    type Output = DieCodes;

    fn neg(self) -> DieCodes {
        self * -1
    }
}

impl Sub for DieCodes {
    type Output = DieCodes;

    fn sub(self, rhs: DieCodes) -> DieCodes {
        self + -rhs
    }
}

impl Mul<i32> for DieCodes {
    type Output = DieCodes;

    fn mul(self, rhs: i32) -> DieCodes {
        DieCodes::new(
            self.entries
                .into_iter()
                .map(|e| DieCode::new(e.count.saturating_mul(rhs), e.sides)),
            self.modifier.saturating_mul(rhs),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_same_sided_entries() {
        let codes = DieCodes::new(
            [DieCode::new(1, 6), DieCode::new(1, 4), DieCode::new(1, 6)],
            0,
        );
        assert_eq!(codes.entries(), &[DieCode::new(2, 6), DieCode::new(1, 4)]);
    }

    #[test]
    fn drops_cancelled_entries() {
        let codes = DieCodes::new([DieCode::new(-1, 12), DieCode::new(1, 12)], 0);
        assert!(codes.is_zero());
        assert_eq!(codes.to_string(), "+0");
    }

    #[test]
    fn canonical_display() {
        let codes = DieCodes::new([DieCode::new(1, 4), DieCode::new(2, 6)], -2);
        insta::assert_snapshot!(codes.to_string(), @"2d6 + d4 - 2");
        insta::assert_snapshot!(DieCodes::dice(-1, 8).to_string(), @"-d8");
        insta::assert_snapshot!(DieCodes::flat(3).to_string(), @"3");
        insta::assert_snapshot!(DieCodes::flat(-3).to_string(), @"-3");
    }

    #[test]
    fn parse_normalizes() {
        let codes: DieCodes = "1d4+2d6".parse().unwrap();
        assert_eq!(codes.to_string(), "2d6 + d4");
        let codes: DieCodes = "-d12 + d12".parse().unwrap();
        assert_eq!(codes.to_string(), "+0");
    }

    #[test]
    fn parse_rejects_symbolic_terms() {
        assert!(matches!(
            DieCodes::parse("[W] + 2"),
            Err(DiceError::SymbolicTerm { .. })
        ));
        assert!(matches!(
            DieCodes::parse("d6 + STR"),
            Err(DiceError::SymbolicTerm { .. })
        ));
    }

    #[test]
    fn arithmetic() {
        let a = DieCodes::new([DieCode::new(2, 6)], 1);
        let b = DieCodes::new([DieCode::new(1, 6), DieCode::new(1, 8)], 2);
        assert_eq!((a.clone() + b.clone()).to_string(), "d8 + 3d6 + 3");
        assert_eq!((a.clone() - b).to_string(), "-d8 + d6 - 1");
        assert_eq!((a.clone() * 3).to_string(), "6d6 + 3");
        assert_eq!((-a).to_string(), "-2d6 - 1");
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let max = DieCodes::flat(i32::MAX);
        assert_eq!(max.checked_add(&DieCodes::flat(1)), None);
        assert_eq!(DieCodes::dice(i32::MAX, 6).checked_add(&DieCodes::dice(1, 6)), None);
        assert_eq!(DieCodes::dice(i32::MIN, 6).checked_mul(-1), None);
        assert_eq!(
            DieCodes::dice(2, 6).checked_add(&DieCodes::dice(1, 6)),
            Some(DieCodes::dice(3, 6))
        );
    }

    #[test]
    fn operators_saturate() {
        let sum = DieCodes::flat(i32::MAX) + DieCodes::flat(1);
        assert_eq!(sum.modifier(), i32::MAX);
        let scaled = DieCodes::dice(i32::MAX, 6) * 2;
        assert_eq!(scaled.entries(), &[DieCode::new(i32::MAX, 6)]);
    }

    #[test]
    fn size_limits() {
        assert!(DieCodes::dice(100, 100).check_size(0..1).is_ok());
        assert!(DieCodes::dice(-60, 6).check_size(0..1).is_ok());
        assert!(matches!(
            DieCodes::dice(1, 2_000_000_000).check_size(0..12),
            Err(DiceError::TooLarge { what: "die size", span, .. }) if span == (0..12)
        ));
        let many = DieCodes::new([DieCode::new(60, 6), DieCode::new(-60, 4)], 0);
        assert!(matches!(
            many.check_size(0..1),
            Err(DiceError::TooLarge { value: 120, .. })
        ));
    }

    #[test]
    fn averages_and_bounds() {
        let codes = DieCodes::new([DieCode::new(2, 6), DieCode::new(-1, 4)], 1);
        assert!((codes.average() - 5.5).abs() < f64::EPSILON);
        assert_eq!(codes.min_total(), -1);
        assert_eq!(codes.max_total(), 12);
    }

    #[test]
    fn serde_normalizes_on_read() {
        let json = r#"{"entries":[{"count":1,"sides":6},{"count":1,"sides":6}],"modifier":0}"#;
        let codes: DieCodes = serde_json::from_str(json).unwrap();
        assert_eq!(codes.to_string(), "2d6");
    }
}
