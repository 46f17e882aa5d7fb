//! Error types for dice notation.

use std::ops::Range;

/// Errors produced while reading dice notation.
///
/// Every variant carries the byte span of the offending input so callers
/// can point at the exact spot in author-supplied text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    /// A character sequence that is not part of the notation.
    #[error("unrecognized input '{text}'")]
    UnrecognizedInput {
        /// The unrecognized text.
        text: String,
        /// Byte range of the text in the source.
        span: Range<usize>,
    },

    /// A token appeared where the grammar does not allow it.
    #[error("expected {expected}, found '{found}'")]
    UnexpectedToken {
        /// What the parser was looking for.
        expected: &'static str,
        /// The token that was found instead.
        found: String,
        /// Byte range of the token in the source.
        span: Range<usize>,
    },

    /// The input ended in the middle of a term.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd {
        /// What the parser was looking for.
        expected: &'static str,
        /// Empty range at the end of the source.
        span: Range<usize>,
    },

    /// A number too large to be represented.
    #[error("number '{text}' is out of range")]
    NumberOutOfRange {
        /// The number as written.
        text: String,
        /// Byte range of the number in the source.
        span: Range<usize>,
    },

    /// A die with zero sides.
    #[error("a die must have at least one side")]
    ZeroSidedDie {
        /// Byte range of the die in the source.
        span: Range<usize>,
    },

    /// Weapon or ability terms in a context that only allows literal dice.
    #[error("'{term}' is not allowed here; only dice and flat numbers are")]
    SymbolicTerm {
        /// The rendered symbolic term.
        term: String,
        /// Byte range covering the whole expression.
        span: Range<usize>,
    },

    /// Dice too numerous or too large for an exact distribution.
    #[error("{what} {value} exceeds the limit of {limit}")]
    TooLarge {
        /// Which quantity is over its limit.
        what: &'static str,
        /// The quantity as requested.
        value: u64,
        /// The largest accepted value.
        limit: u32,
        /// Byte range of the offending dice in the source.
        span: Range<usize>,
    },
}

impl DiceError {
    /// The byte range in the source this error refers to.
    pub fn span(&self) -> Range<usize> {
        match self {
            Self::UnrecognizedInput { span, .. }
            | Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEnd { span, .. }
            | Self::NumberOutOfRange { span, .. }
            | Self::ZeroSidedDie { span }
            | Self::SymbolicTerm { span, .. }
            | Self::TooLarge { span, .. } => span.clone(),
        }
    }
}

/// Convenience result type for dice operations.
pub type DiceResult<T> = Result<T, DiceError>;
