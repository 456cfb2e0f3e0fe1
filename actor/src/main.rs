//! Actor - self-play runner for the ISMCTS engine
//!
//! Plays complete games in which every seat is an MCTS agent:
//! 1. Resolves the configured game by name
//! 2. Searches from the acting player's view of the position each turn
//! 3. Records outcomes, plies and search statistics, logging progress

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

mod actor;
mod config;
mod stats;

use crate::actor::Actor;
use crate::config::Config;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");
    info!(
        env_id = %config.env_id,
        episodes = config.episodes,
        iterations = config.iterations,
        seed = config.seed,
        "Starting self-play"
    );

    let mut actor = Actor::new(config)?;
    match actor.run() {
        Ok(stats) => {
            info!(episodes = stats.episodes(), "Actor completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Actor failed: {:#}", e);
            Err(e)
        }
    }
}
