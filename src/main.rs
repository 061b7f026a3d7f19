//! Aventuria Rules - command line entry point
//!
//! Thin wiring of the file stores to the rules engine. Reports are printed
//! as JSON.

use std::fs;
use std::path::PathBuf;

use aventuria_rules::character::CharacterRecord;
use aventuria_rules::core::{set_config, Result, RulesConfig, RulesError};
use aventuria_rules::dice::{roll, RandomDice};
use aventuria_rules::progression;
use aventuria_rules::session::{ScriptedOperator, Session};
use aventuria_rules::store::{TomlCharacterStore, TomlEncounterLog};
use aventuria_rules::tables::{install_tables, RuleTables};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Combat and progression rules for DSA5 sessions
#[derive(Parser, Debug)]
#[command(name = "aventuria")]
#[command(about = "Resolve DSA5 dice, rounds and AP costs")]
struct Args {
    /// Rule constants override (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory with replacement rule tables
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Roll a dice expression such as "2W6+3"
    Roll { expression: String },
    /// AP spent by the character sheet
    Ap { sheet: PathBuf },
    /// Start an encounter with every character in the directory
    Start { characters: PathBuf, log: PathBuf },
    /// Advance the running encounter by one round
    Round { characters: PathBuf, log: PathBuf },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("aventuria_rules=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Some(path) = &args.config {
        let config = RulesConfig::from_toml(&fs::read_to_string(path)?)?;
        if set_config(config).is_err() {
            tracing::warn!("rules config already initialized");
        }
    }
    match &args.tables {
        Some(dir) => {
            install_tables(RuleTables::load(dir)?)?;
            tracing::info!(dir = %dir.display(), "custom rule tables installed");
        }
        None => install_tables(RuleTables::builtin()?)?,
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut dice = RandomDice::seeded(seed);
    tracing::debug!(seed, "dice seeded");

    match args.command {
        Command::Roll { expression } => print_json(&roll(&expression, &mut dice)),
        Command::Ap { sheet } => {
            let text = fs::read_to_string(&sheet)?;
            let mut record: CharacterRecord = toml::from_str(&text)?;
            record.normalize();
            print_json(&progression::calculate(&record))
        }
        Command::Start { characters, log } => {
            let mut session = Session::new(
                TomlCharacterStore::new(characters),
                TomlEncounterLog::new(log),
                dice,
                ScriptedOperator::default(),
            );
            let summary = session
                .start_encounter()?
                .ok_or_else(|| RulesError::InvalidInput("encounter start cancelled".to_string()))?;
            print_json(&summary)
        }
        Command::Round { characters, log } => {
            let mut session = Session::new(
                TomlCharacterStore::new(characters),
                TomlEncounterLog::new(log),
                dice,
                ScriptedOperator::default(),
            );
            let summary = session
                .advance_round()?
                .ok_or_else(|| RulesError::InvalidInput("round advance cancelled".to_string()))?;
            print_json(&summary)
        }
    }
}
