pub mod dice;
pub mod generate;
pub mod odds;

use ariadne::{Color, Label, Report, ReportKind, Source};
use pf_dice::{
    AbilityArray, DiceError, DieCodes, GameDiceExpression, PermutationsResult, permutations,
};

/// Parse an expression and substitute a weapon die and ability modifier.
///
/// Parse errors are rendered to stderr before being returned.
fn resolve_dice(
    expression: &str,
    weapon: &str,
    ability_modifier: i32,
) -> Result<(GameDiceExpression, DieCodes), String> {
    let parsed = parse_or_report(expression, "expression", GameDiceExpression::parse)?;
    let weapon_die = parse_or_report(weapon, "weapon", DieCodes::parse)?;
    let modifiers = AbilityArray([ability_modifier; 6]);
    let resolved = parsed.resolve(&weapon_die, &modifiers);
    resolved
        .check_size(0..expression.len())
        .map_err(|e| report(expression, "expression", &e))?;
    Ok((parsed, resolved))
}

fn parse_or_report<T>(
    source: &str,
    name: &str,
    parse: impl Fn(&str) -> Result<T, DiceError>,
) -> Result<T, String> {
    parse(source).map_err(|e| report(source, name, &e))
}

fn report(source: &str, name: &str, error: &DiceError) -> String {
    eprint!("{}", render_dice_error(source, name, error));
    format!("invalid {name} '{source}'")
}

/// Exact distribution of literal dice; a flat number is a certain result.
fn distribution(dice: &DieCodes) -> PermutationsResult {
    if dice.has_dice() {
        permutations(dice)
    } else {
        PermutationsResult::certain(i64::from(dice.modifier()))
    }
}

/// Render a dice parse error using ariadne for pretty terminal output.
fn render_dice_error(source: &str, filename: &str, error: &DiceError) -> String {
    let mut output = Vec::new();
    let span = error.span();
    let message = error.to_string();

    Report::build(ReportKind::Error, (filename, span.clone()))
        .with_message(&message)
        .with_label(
            Label::new((filename, span))
                .with_message(&message)
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut output)
        .ok();

    String::from_utf8(output).unwrap_or_default()
}

/// Format a probability as a percentage.
fn percent(odds: f64) -> String {
    format!("{:.2}%", odds * 100.0)
}
