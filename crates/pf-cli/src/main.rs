//! CLI frontend for the Powerforge power generator.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use commands::generate::{GenerateOptions, RoleArg, ToolArg, UsageArg};

#[derive(Parser)]
#[command(
    name = "pf",
    about = "Powerforge: dice odds and procedurally generated powers",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the canonical form and distribution of a dice expression
    Dice {
        /// Dice expression, e.g. "2d6 + 3" or "2[W] + STR"
        expression: String,

        /// What one [W] rolls
        #[arg(short, long, default_value = "d8")]
        weapon: String,

        /// Modifier substituted for every ability term
        #[arg(short = 'm', long, default_value = "4", allow_negative_numbers = true)]
        ability_modifier: i32,
    },

    /// Show the odds of a dice expression against a target number
    Odds {
        /// Dice expression
        expression: String,

        /// Target number
        #[arg(allow_negative_numbers = true)]
        target: i64,

        /// What one [W] rolls
        #[arg(short, long, default_value = "d8")]
        weapon: String,

        /// Modifier substituted for every ability term
        #[arg(short = 'm', long, default_value = "4", allow_negative_numbers = true)]
        ability_modifier: i32,
    },

    /// Generate a power
    Generate {
        /// Power level (1-30)
        #[arg(short, long, default_value = "1")]
        level: u32,

        /// Usage frequency
        #[arg(short, long, value_enum, default_value = "at-will")]
        usage: UsageArg,

        /// Built-in tool profile
        #[arg(short, long, value_enum, default_value = "melee-weapon")]
        tool: ToolArg,

        /// Class role whose favoured modifiers are preferred
        #[arg(short, long, value_enum)]
        role: Option<RoleArg>,

        /// Read the tool profile from a JSON file instead
        #[arg(long)]
        tool_file: Option<PathBuf>,

        /// Seed for the random source (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Always take the most preferred candidate instead of drawing at random
        #[arg(long)]
        deterministic: bool,

        /// Modifier to prefer (repeatable)
        #[arg(long)]
        prefer: Vec<String>,

        /// Modifier to never use (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Print the power as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Dice {
            expression,
            weapon,
            ability_modifier,
        } => commands::dice::run(&expression, &weapon, ability_modifier),
        Commands::Odds {
            expression,
            target,
            weapon,
            ability_modifier,
        } => commands::odds::run(&expression, target, &weapon, ability_modifier),
        Commands::Generate {
            level,
            usage,
            tool,
            role,
            tool_file,
            seed,
            deterministic,
            prefer,
            exclude,
            json,
        } => commands::generate::run(&GenerateOptions {
            level,
            usage,
            tool,
            role,
            tool_file,
            seed,
            deterministic,
            prefer,
            exclude,
            json,
        }),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
