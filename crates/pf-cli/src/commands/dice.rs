use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use num_traits::ToPrimitive;
use pf_dice::PermutationsResult;

const BAR_WIDTH: f64 = 30.0;

pub fn run(expression: &str, weapon: &str, ability_modifier: i32) -> Result<(), String> {
    let (parsed, resolved) = super::resolve_dice(expression, weapon, ability_modifier)?;
    let distribution = super::distribution(&resolved);

    println!("  {} {}", "Expression".bold(), parsed);
    if resolved.to_string() != parsed.to_string() {
        println!(
            "  {} {} {}",
            "Resolved".bold(),
            resolved,
            format!("([W] = {weapon}, abilities = {ability_modifier:+})").dimmed()
        );
    }
    println!("  {} {:.2}", "Mean".bold(), distribution.mean());
    println!(
        "  {} {} to {}",
        "Range".bold(),
        resolved.min_total(),
        resolved.max_total()
    );
    println!();
    println!("{}", histogram(&distribution));

    Ok(())
}

fn histogram(distribution: &PermutationsResult) -> Table {
    let total = distribution.total().to_f64().unwrap_or(f64::INFINITY);
    let chances: Vec<(i64, String, f64)> = distribution
        .iter()
        .map(|(value, count)| {
            let chance = count.to_f64().unwrap_or(0.0) / total;
            (value, count.to_string(), chance)
        })
        .collect();
    let peak = chances.iter().map(|(_, _, c)| *c).fold(0.0, f64::max);

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Total", "Ways", "Chance", ""]);
    for (value, ways, chance) in chances {
        table.add_row(vec![
            value.to_string(),
            ways,
            super::percent(chance),
            bar(chance, peak),
        ]);
    }
    table
}

fn bar(chance: f64, peak: f64) -> String {
    if peak <= 0.0 {
        return String::new();
    }
    let width = (chance / peak * BAR_WIDTH).round() as usize;
    "#".repeat(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_dice::DieCodes;

    #[test]
    fn bar_scales_to_peak() {
        assert_eq!(bar(0.5, 0.5).len(), 30);
        assert_eq!(bar(0.25, 0.5).len(), 15);
        assert!(bar(0.0, 0.0).is_empty());
    }

    #[test]
    fn histogram_has_a_row_per_total() {
        let table = histogram(&crate::commands::distribution(&DieCodes::dice(2, 6)));
        assert_eq!(table.row_iter().count(), 11);
    }
}
