//! Tokenizer for dice notation.

use std::fmt;
use std::ops::Range;

use logos::Logos;

use crate::ability::Ability;
use crate::error::{DiceError, DiceResult};

/// A token of dice notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `+`.
    Plus,
    /// `-`.
    Minus,
    /// A dice term such as `d6` or `3d8`; the count is absent when omitted.
    Dice {
        /// Explicit number of dice, if written.
        count: Option<u32>,
        /// Number of faces.
        sides: u32,
    },
    /// The weapon die marker `[W]`.
    Weapon,
    /// An ability abbreviation.
    Ability(Ability),
    /// A bare non-negative integer.
    Integer(u32),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Dice {
                count: Some(count),
                sides,
            } => write!(f, "{count}d{sides}"),
            Token::Dice { count: None, sides } => write!(f, "d{sides}"),
            Token::Weapon => write!(f, "[W]"),
            Token::Ability(ability) => write!(f, "{ability}"),
            Token::Integer(n) => write!(f, "{n}"),
        }
    }
}

/// Internal logos token, converted to [`Token`] once its text is validated.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[regex(r"[0-9]*[dD][0-9]+")]
    Dice,

    #[token("[W]")]
    #[token("[w]")]
    Weapon,

    #[regex(r"STR|CON|DEX|INT|WIS|CHA")]
    Ability,

    #[regex(r"[0-9]+")]
    Integer,
}

/// Lex dice notation into `(Token, Span)` pairs.
///
/// Stops at the first unrecognized character or out-of-range number.
pub fn lex(source: &str) -> DiceResult<Vec<(Token, Range<usize>)>> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        let token = match result {
            Ok(RawToken::Plus) => Token::Plus,
            Ok(RawToken::Minus) => Token::Minus,
            Ok(RawToken::Dice) => lex_dice(text, span.clone())?,
            Ok(RawToken::Weapon) => Token::Weapon,
            Ok(RawToken::Ability) => match Ability::from_abbreviation(text) {
                Some(ability) => Token::Ability(ability),
                None => {
                    return Err(DiceError::UnrecognizedInput {
                        text: text.to_string(),
                        span,
                    });
                }
            },
            Ok(RawToken::Integer) => Token::Integer(parse_number(text, span.clone())?),
            Err(()) => {
                return Err(DiceError::UnrecognizedInput {
                    text: text.to_string(),
                    span,
                });
            }
        };
        tokens.push((token, span));
    }

    Ok(tokens)
}

fn lex_dice(text: &str, span: Range<usize>) -> DiceResult<Token> {
    let split = text.find(['d', 'D']).unwrap_or(0);
    let (count_text, sides_text) = (&text[..split], &text[split + 1..]);
    let count = if count_text.is_empty() {
        None
    } else {
        Some(parse_number(count_text, span.clone())?)
    };
    let sides = parse_number(sides_text, span.clone())?;
    if sides == 0 {
        return Err(DiceError::ZeroSidedDie { span });
    }
    Ok(Token::Dice { count, sides })
}

fn parse_number(text: &str, span: Range<usize>) -> DiceResult<u32> {
    text.parse::<u32>()
        .ok()
        .filter(|&n| i32::try_from(n).is_ok())
        .ok_or_else(|| DiceError::NumberOutOfRange {
            text: text.to_string(),
            span,
        })
}
