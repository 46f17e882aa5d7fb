//! Dice notation, symbolic damage expressions, and exact roll distributions.
//!
//! Dice notation is a sum of signed terms:
//!
//! ```text
//! 2d6 + d4 - 2          literal dice and a flat modifier
//! 2[W] + STR + 2        two weapon dice, Strength modifier, plus two
//! -d12 + d12            cancels out, rendered as +0
//! ```
//!
//! [`GameDiceExpression`] holds the symbolic form; [`DieCodes`] holds only
//! literal dice. [`permutations`] turns literal dice into an exact
//! [`PermutationsResult`] histogram for mean and threshold queries.

pub mod ability;
pub mod die_codes;
pub mod error;
pub mod expression;
pub mod lexer;
pub mod parser;
pub mod permutations;

pub use ability::{Ability, AbilityArray};
pub use die_codes::{DieCode, DieCodes, MAX_DICE, MAX_SIDES};
pub use error::{DiceError, DiceResult};
pub use expression::GameDiceExpression;
pub use parser::parse;
pub use permutations::{PermutationEngine, PermutationsResult, permutations};
