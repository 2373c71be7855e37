//! FraudLens main entry point

use anyhow::Context;
use clap::Parser;
use fraudlens_api::{start_server, AppState};
use fraudlens_client::{HttpHistoryClient, HttpScoringClient};
use fraudlens_config::{Config, ConfigError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "fraudlens")]
#[command(author = "FraudLens Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Transaction history explorer and fraud risk assessment", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

/// Load the config file, falling back to defaults when it does not exist
fn load_config(path: PathBuf) -> anyhow::Result<(Config, bool)> {
    match Config::load(path.clone()) {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::FileNotFound { .. }) => Ok((Config::default(), false)),
        Err(e) => Err(anyhow::Error::msg(e.to_details()))
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let (config, from_file) = load_config(args.config.clone())?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();

    if from_file {
        log::info!("Config loaded from {}", args.config.display());
    } else {
        log::warn!("Config file not found: {}, using defaults", args.config.display());
    }
    log::info!("History endpoint: {}", config.endpoints.history_url);
    log::info!("Scoring endpoint: {}", config.endpoints.scoring_url);

    let history_client = HttpHistoryClient::from_config(&config).context("Failed to build history client")?;
    let scoring_client = HttpScoringClient::from_config(&config).context("Failed to build scoring client")?;
    let state = AppState::new(config, Arc::new(history_client), Arc::new(scoring_client));

    let rt = Runtime::new()?;
    rt.block_on(start_server(state))?;

    Ok(())
}
