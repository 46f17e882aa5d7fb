use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

pub fn run(expression: &str, target: i64, weapon: &str, ability_modifier: i32) -> Result<(), String> {
    let (parsed, resolved) = super::resolve_dice(expression, weapon, ability_modifier)?;
    let distribution = super::distribution(&resolved);

    println!(
        "  {} {} {}",
        "Odds".bold(),
        parsed,
        format!("against {target}").dimmed()
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Roll", "Chance"]);
    for (label, odds) in [
        (format!("at least {target}"), distribution.odds_at_least(target)),
        (format!("over {target}"), distribution.odds_over(target)),
        (format!("under {target}"), distribution.odds_under(target)),
        (format!("at most {target}"), distribution.odds_at_most(target)),
    ] {
        table.add_row(vec![label, super::percent(odds)]);
    }
    println!("{table}");

    Ok(())
}
