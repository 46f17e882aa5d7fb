//! Integration tests for the pf CLI commands.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn pf() -> Command {
    Command::cargo_bin("pf").unwrap()
}

// ---------------------------------------------------------------------------
// dice
// ---------------------------------------------------------------------------

#[test]
fn dice_shows_mean_and_range() {
    pf().args(["dice", "2d6"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("7.00")
                .and(predicate::str::contains("2 to 12"))
                .and(predicate::str::contains("16.67%")),
        );
}

#[test]
fn dice_canonicalizes_input() {
    pf().args(["dice", "1d4+2d6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2d6 + d4"));
}

#[test]
fn dice_resolves_weapon_and_abilities() {
    pf().args(["dice", "2[W] + STR", "--weapon", "d6", "--ability-modifier", "3"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("2d6 + 3")
                .and(predicate::str::contains("10.00"))
                .and(predicate::str::contains("5 to 15")),
        );
}

#[test]
fn dice_flat_number_is_certain() {
    pf().args(["dice", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100.00%"));
}

#[test]
fn dice_reports_parse_errors() {
    pf().args(["dice", "2d6 + ?"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("unrecognized input")
                .and(predicate::str::contains("error: invalid expression")),
        );
}

#[test]
fn dice_rejects_symbolic_weapon() {
    pf().args(["dice", "[W]", "--weapon", "STR"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: invalid weapon"));
}

#[test]
fn dice_rejects_oversized_dice() {
    pf().args(["dice", "1d2000000000"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("die size 2000000000 exceeds the limit of 100")
                .and(predicate::str::contains("error: invalid expression")),
        );
}

#[test]
fn dice_rejects_oversized_weapon_resolution() {
    pf().args(["dice", "60[W]", "--weapon", "2d6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dice count 120 exceeds the limit of 100"));
}

#[test]
fn dice_reports_overflowing_sums() {
    pf().args(["dice", "2147483647 + 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn odds_rejects_oversized_dice() {
    pf().args(["odds", "101d6", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the limit"));
}

// ---------------------------------------------------------------------------
// odds
// ---------------------------------------------------------------------------

#[test]
fn odds_against_target() {
    pf().args(["odds", "d20", "11"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("at least 11")
                .and(predicate::str::contains("50.00%"))
                .and(predicate::str::contains("over 11"))
                .and(predicate::str::contains("45.00%"))
                .and(predicate::str::contains("55.00%")),
        );
}

#[test]
fn odds_out_of_range() {
    pf().args(["odds", "d6", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.00%").and(predicate::str::contains("100.00%")));
}

#[test]
fn odds_requires_target() {
    pf().args(["odds", "d6"]).assert().failure();
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[test]
fn generate_deterministic_power() {
    pf().args(["generate", "--deterministic"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Level 1 at-will power")
                .and(predicate::str::contains("melee weapon"))
                .and(predicate::str::contains("Expected damage")),
        );
}

#[test]
fn generate_json() {
    pf().args([
        "generate",
        "--level",
        "5",
        "--usage",
        "daily",
        "--tool",
        "implement",
        "--deterministic",
        "--json",
    ])
    .assert()
    .success()
    .stdout(
        predicate::str::contains("\"level\": 5")
            .and(predicate::str::contains("\"usage\": \"Daily\""))
            .and(predicate::str::contains("\"tool_type\": \"Implement\"")),
    );
}

#[test]
fn generate_same_seed_same_output() {
    let args = [
        "generate", "--usage", "encounter", "--tool", "ranged-weapon", "--seed", "7", "--json",
    ];
    let first = pf().args(args).output().unwrap();
    let second = pf().args(args).output().unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn generate_prints_seed() {
    pf().args(["generate", "--seed", "42", "--role", "striker"])
        .assert()
        .success()
        .stdout(predicate::str::contains("seed 42"));
}

#[test]
fn generate_rejects_bad_level() {
    pf().args(["generate", "--level", "31"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid level 31"));
}

#[test]
fn generate_help_describes_deterministic_choice() {
    pf().args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Always take the most preferred candidate",
        ));
}

#[test]
fn generate_rejects_unknown_usage() {
    pf().args(["generate", "--usage", "weekly"]).assert().failure();
}

#[test]
fn generate_excluded_modifier_absent() {
    pf().args([
        "generate",
        "--usage",
        "daily",
        "--deterministic",
        "--json",
        "--exclude",
        "Multiattack",
        "--exclude",
        "Persistent Zone",
    ])
    .assert()
    .success()
    .stdout(
        predicate::str::contains("Multiattack")
            .not()
            .and(predicate::str::contains("Persistent Zone").not()),
    );
}

#[test]
fn generate_with_tool_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("staff.json");
    fs::write(
        &path,
        r#"{
    "tool_type": "Implement",
    "range": "Ranged",
    "abilities": ["Wisdom"],
    "preferred_damage_types": ["Radiant"],
    "preferred_type_count": 1
}"#,
    )
    .unwrap();

    pf().args(["generate", "--deterministic", "--json", "--tool-file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ability\": \"Wisdom\""));
}

#[test]
fn generate_rejects_tool_without_abilities() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(
        &path,
        r#"{
    "tool_type": "Weapon",
    "range": "Melee",
    "abilities": [],
    "preferred_damage_types": ["Normal"],
    "preferred_type_count": 1
}"#,
    )
    .unwrap();

    pf().args(["generate", "--tool-file"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no abilities"));
}

#[test]
fn generate_missing_tool_file() {
    pf().args(["generate", "--tool-file", "/nonexistent/tool.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}
