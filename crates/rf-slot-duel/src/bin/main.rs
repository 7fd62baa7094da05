//! slot-duel: spin, simulate and inspect duel slot models
//!
//! Usage:
//!   slot-duel spin --bet 10 --mode bonus4 --seed qa-1
//!   slot-duel simulate --spins 100000 --bet 10
//!   slot-duel info --model models/lair_of_riches.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use rf_slot_duel::{DuelSlotEngine, GameInfo, MathModelConfig, ModelParser, Simulator, SpinMode, SpinRequest};

#[derive(Parser)]
#[command(name = "slot-duel", about = "Duel multiplier slot engine")]
struct Cli {
    /// Model file (.json / .yaml); defaults to the built-in Lair of Riches model
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one spin and print the result as JSON
    Spin {
        #[arg(short, long, default_value_t = 10)]
        bet: u64,
        #[arg(short, long, value_enum, default_value_t = ModeArg::Normal)]
        mode: ModeArg,
        /// Reel set override
        #[arg(long)]
        reel_set: Option<String>,
        /// QA seed (deterministic replay)
        #[arg(short, long)]
        seed: Option<String>,
    },
    /// Run a batch of spins and print aggregate statistics
    Simulate {
        #[arg(short = 'n', long, default_value_t = 100_000)]
        spins: u64,
        #[arg(short, long, default_value_t = 10)]
        bet: u64,
        #[arg(short, long, value_enum, default_value_t = ModeArg::Normal)]
        mode: ModeArg,
        #[arg(short, long)]
        seed: Option<String>,
    },
    /// Print the model summary
    Info,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Normal,
    Boost,
    Bonus3,
    Bonus4,
}

impl From<ModeArg> for SpinMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Normal => SpinMode::Normal,
            ModeArg::Boost => SpinMode::BonusBoost,
            ModeArg::Bonus3 => SpinMode::Bonus3,
            ModeArg::Bonus4 => SpinMode::Bonus4,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let model = load_model(cli.model.as_deref())?;

    match cli.command {
        Commands::Spin {
            bet,
            mode,
            reel_set,
            seed,
        } => {
            let mut request = SpinRequest::new(bet).with_mode(mode.into());
            request.reel_set_id = reel_set;
            request.qa_seed = seed;
            let result = DuelSlotEngine::new(model)
                .spin(&request)
                .context("Spin rejected")?;
            print_json(&result)
        }
        Commands::Simulate {
            spins,
            bet,
            mode,
            seed,
        } => {
            let simulator = Simulator::new(DuelSlotEngine::new(model));
            let stats = simulator
                .run(spins, bet, mode.into(), seed.as_deref())
                .context("Simulation failed")?;
            print_json(&serde_json::json!({
                "stats": stats,
                "rtp": stats.rtp(),
                "hitRate": stats.hit_rate(),
                "featureRate": stats.feature_rate(),
            }))
        }
        Commands::Info => print_json(&GameInfo::from_model(&model)),
    }
}

fn load_model(path: Option<&std::path::Path>) -> Result<MathModelConfig> {
    match path {
        Some(path) => {
            info!("Loading model from {}", path.display());
            ModelParser::new()
                .load_file(path)
                .with_context(|| format!("Failed to load model {}", path.display()))
        }
        None => MathModelConfig::lair_of_riches().context("Built-in model is invalid"),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
