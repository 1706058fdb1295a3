use anyhow::Context;
use clap::Parser;
use league_scheduler::{
    ConfigManager, ConsoleProgressCallback, EvolutionEngine, League, LeagueSnapshot,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the league JSON snapshot
    league: PathBuf,

    /// Run configuration file (TOML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the random seed from the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Write the JSON outcome to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let manager = ConfigManager::new();
    if let Some(config_path) = &args.config {
        manager.load_from_file(config_path).with_context(|| {
            format!("Failed to load configuration from {}", config_path.display())
        })?;
    }
    let mut config = manager.get();
    if let Some(seed) = args.seed {
        config.evolution.seed = Some(seed);
    }

    let snapshot = LeagueSnapshot::from_json_file(&args.league)
        .with_context(|| format!("Failed to read league data from {}", args.league.display()))?;
    let league = League::new(snapshot, config.tournament.format).context("Invalid league data")?;

    let mut engine = EvolutionEngine::new(Arc::new(league), &config)?;
    let outcome = engine.run(ConsoleProgressCallback::new(config.evolution.log_frequency))?;

    let json = outcome.to_json()?;
    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write outcome to {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}
