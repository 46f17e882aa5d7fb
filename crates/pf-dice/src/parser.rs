//! Parser for dice notation.
//!
//! ```text
//! expression := sign? term (sign term)*
//! sign       := '+' | '-'
//! term       := DICE | '[W]' | ABILITY | INTEGER ('[W]' | ABILITY)?
//! ```
//!
//! Terms are summed into a single canonical [`GameDiceExpression`]. A sum
//! that overflows is a [`DiceError::NumberOutOfRange`] and dice beyond
//! [`MAX_DICE`] or [`MAX_SIDES`] are a [`DiceError::TooLarge`].

use std::ops::Range;

use crate::die_codes::{DieCodes, MAX_DICE, MAX_SIDES};
use crate::error::{DiceError, DiceResult};
use crate::expression::GameDiceExpression;
use crate::lexer::{Token, lex};

/// Parse dice notation into a canonical expression.
pub fn parse(source: &str) -> DiceResult<GameDiceExpression> {
    let tokens = lex(source)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        source,
    };
    parser.expression()
}

struct Parser<'a> {
    tokens: &'a [(Token, Range<usize>)],
    pos: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&(Token, Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<(Token, Range<usize>)> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn end(&self) -> usize {
        self.source.len()
    }

    fn expression(&mut self) -> DiceResult<GameDiceExpression> {
        let mut total = GameDiceExpression::ZERO;
        let mut first = true;
        let mut start = None;

        loop {
            let negative = match self.peek() {
                Some((Token::Plus, _)) => {
                    self.pos += 1;
                    false
                }
                Some((Token::Minus, _)) => {
                    self.pos += 1;
                    true
                }
                Some(_) if first => false,
                Some((token, span)) => {
                    return Err(DiceError::UnexpectedToken {
                        expected: "'+' or '-'",
                        found: token.to_string(),
                        span: span.clone(),
                    });
                }
                None if first => {
                    return Err(DiceError::UnexpectedEnd {
                        expected: "a dice term",
                        span: self.end()..self.end(),
                    });
                }
                None => break,
            };

            let (term, span) = self.term()?;
            let start = *start.get_or_insert(span.start);
            let sum = if negative {
                total.checked_sub(&term)
            } else {
                total.checked_add(&term)
            };
            total = sum.ok_or_else(|| DiceError::NumberOutOfRange {
                text: self.source[start..span.end].to_string(),
                span: start..span.end,
            })?;
            first = false;
        }

        let span = start.unwrap_or(0)..self.end();
        total.die_codes().check_size(span)?;
        Ok(total)
    }

    fn term(&mut self) -> DiceResult<(GameDiceExpression, Range<usize>)> {
        match self.next() {
            Some((Token::Dice { count, sides }, span)) => {
                let count = count.unwrap_or(1);
                if sides > MAX_SIDES {
                    return Err(DiceError::TooLarge {
                        what: "die size",
                        value: u64::from(sides),
                        limit: MAX_SIDES,
                        span,
                    });
                }
                if count > MAX_DICE {
                    return Err(DiceError::TooLarge {
                        what: "dice count",
                        value: u64::from(count),
                        limit: MAX_DICE,
                        span,
                    });
                }
                let dice = DieCodes::dice(to_i32(count), sides);
                Ok((GameDiceExpression::from_dice(dice), span))
            }
            Some((Token::Weapon, span)) => Ok((GameDiceExpression::weapon(1), span)),
            Some((Token::Ability(ability), span)) => {
                Ok((GameDiceExpression::ability(ability), span))
            }
            Some((Token::Integer(n), span)) => {
                let n = to_i32(n);
                match self.peek() {
                    Some((Token::Weapon, suffix)) => {
                        let span = span.start..suffix.end;
                        self.pos += 1;
                        Ok((GameDiceExpression::weapon(n), span))
                    }
                    Some((Token::Ability(ability), suffix)) => {
                        let ability = *ability;
                        let span = span.start..suffix.end;
                        self.pos += 1;
                        Ok((GameDiceExpression::ability(ability) * n, span))
                    }
                    _ => Ok((GameDiceExpression::flat(n), span)),
                }
            }
            Some((token, span)) => Err(DiceError::UnexpectedToken {
                expected: "a dice term",
                found: token.to_string(),
                span,
            }),
            None => Err(DiceError::UnexpectedEnd {
                expected: "a dice term",
                span: self.end()..self.end(),
            }),
        }
    }
}

/// The lexer only produces numbers that fit in an `i32`.
fn to_i32(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::Ability;

    #[test]
    fn parse_simple_dice() {
        let expr = parse("1d4+2d6").unwrap();
        assert_eq!(expr.to_string(), "2d6 + d4");
    }

    #[test]
    fn parse_leading_sign() {
        assert_eq!(parse("-2").unwrap().modifier(), -2);
        assert_eq!(parse("+0").unwrap(), GameDiceExpression::ZERO);
        assert_eq!(parse("-d12 + d12").unwrap().to_string(), "+0");
    }

    #[test]
    fn parse_weapon_and_ability() {
        let expr = parse("[W] + STR").unwrap();
        assert_eq!(expr.weapon_dice_count(), 1);
        assert_eq!(expr.abilities()[Ability::Strength], 1);
        assert_eq!(expr.modifier(), 0);
    }

    #[test]
    fn parse_coefficients() {
        let expr = parse("3[W] - 2WIS").unwrap();
        assert_eq!(expr.weapon_dice_count(), 3);
        assert_eq!(expr.abilities()[Ability::Wisdom], -2);
    }

    #[test]
    fn missing_separator() {
        let err = parse("2d6 d4").unwrap_err();
        assert!(matches!(err, DiceError::UnexpectedToken { .. }));
        assert_eq!(err.span(), 4..6);
    }

    #[test]
    fn dangling_sign() {
        let err = parse("2d6 +").unwrap_err();
        assert!(matches!(err, DiceError::UnexpectedEnd { .. }));
        assert_eq!(err.span(), 5..5);
    }

    #[test]
    fn empty_input() {
        assert!(matches!(parse("   "), Err(DiceError::UnexpectedEnd { .. })));
    }

    #[test]
    fn double_sign() {
        assert!(matches!(
            parse("2 + - 3"),
            Err(DiceError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn unknown_term() {
        assert!(parse("2d6 + LUCK").is_err());
    }

    #[test]
    fn overflowing_sums_are_errors() {
        for source in [
            "2147483647 + 1",
            "2147483647[W] + [W]",
            "2147483647STR + STR",
        ] {
            let err = parse(source).unwrap_err();
            assert!(
                matches!(err, DiceError::NumberOutOfRange { .. }),
                "{source}: {err:?}"
            );
            assert_eq!(err.span(), 0..source.len(), "{source}");
        }
    }

    #[test]
    fn overflow_span_stops_at_the_offending_term() {
        let err = parse("2147483647 + 1 + 2").unwrap_err();
        assert_eq!(err.span(), 0..14);
        insta::assert_snapshot!(err.to_string(), @"number '2147483647 + 1' is out of range");
    }

    #[test]
    fn the_largest_sums_still_parse() {
        assert_eq!(parse("2147483646 + 1").unwrap().modifier(), i32::MAX);
        assert_eq!(parse("-2147483647 - 1").unwrap().modifier(), i32::MIN);
        assert_eq!(parse("2147483647[W] - [W]").unwrap().weapon_dice_count(), 2147483646);
    }

    #[test]
    fn oversized_dice_are_rejected() {
        let err = parse("d6 + 1d2000000000").unwrap_err();
        assert!(matches!(err, DiceError::TooLarge { what: "die size", .. }));
        assert_eq!(err.span(), 5..17);

        let err = parse("2147483647d6 + d6").unwrap_err();
        assert!(matches!(err, DiceError::TooLarge { what: "dice count", .. }));
        assert_eq!(err.span(), 0..12);

        let err = parse("60d6 - 60d4").unwrap_err();
        assert!(matches!(err, DiceError::TooLarge { value: 120, .. }));
        assert_eq!(err.span(), 0..11);

        assert_eq!(parse("100d100").unwrap().to_string(), "100d100");
    }
}
