//! Configuration for the self-play runner
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::Parser;
use engine_config::{load_config, CentralConfig};
use engine_games::GameKind;
use mcts::MctsConfig;
use once_cell::sync::Lazy;
use std::time::Duration;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_env_id() -> String {
    CENTRAL_CONFIG.common.env_id.clone()
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.common.seed
}

fn default_iterations() -> u32 {
    CENTRAL_CONFIG.mcts.iterations
}

fn default_exploration() -> f64 {
    CENTRAL_CONFIG.mcts.exploration
}

fn default_time_budget_ms() -> u64 {
    CENTRAL_CONFIG.mcts.time_budget_ms
}

fn default_max_discarded() -> u32 {
    CENTRAL_CONFIG.mcts.max_discarded_iterations
}

fn default_episodes() -> u32 {
    CENTRAL_CONFIG.actor.episodes
}

fn default_log_interval() -> u32 {
    CENTRAL_CONFIG.actor.log_interval
}

#[derive(Parser, Debug, Clone)]
#[command(name = "actor")]
#[command(about = "ISMCTS self-play runner")]
#[command(
    long_about = "Plays complete games in which every seat is an MCTS agent and reports
outcome and search statistics.

Configuration is loaded from config.toml with ISMCTS_<SECTION>_<KEY> environment
variable overrides. CLI arguments take highest priority."
)]
pub struct Config {
    /// Game to play (tictactoe, connect4, euchre)
    #[arg(long, default_value_t = default_env_id())]
    pub env_id: String,

    /// Number of complete games to play
    #[arg(long, default_value_t = default_episodes())]
    pub episodes: u32,

    /// Completed playouts per search
    #[arg(long, default_value_t = default_iterations())]
    pub iterations: u32,

    /// UCB1 exploration constant
    #[arg(long, default_value_t = default_exploration())]
    pub exploration: f64,

    /// Wall-clock budget per search in milliseconds (0 to disable)
    #[arg(long, default_value_t = default_time_budget_ms())]
    pub time_budget_ms: u64,

    /// Consecutive impossible samples tolerated per search
    #[arg(long, default_value_t = default_max_discarded())]
    pub max_discarded_iterations: u32,

    /// Seed for the random number generator
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Log progress every N episodes (0 to disable)
    #[arg(long, default_value_t = default_log_interval())]
    pub log_interval: u32,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.game_kind()?;

        if self.iterations == 0 && self.time_budget_ms == 0 {
            return Err(anyhow!(
                "iterations must be greater than 0 when no time budget is set"
            ));
        }

        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(anyhow!(
                "exploration must be a non-negative number, got {}",
                self.exploration
            ));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    pub fn game_kind(&self) -> Result<GameKind> {
        Ok(self.env_id.parse::<GameKind>()?)
    }

    pub fn time_budget(&self) -> Option<Duration> {
        (self.time_budget_ms > 0).then(|| Duration::from_millis(self.time_budget_ms))
    }

    /// Search settings for each move.
    pub fn mcts_config(&self) -> MctsConfig {
        let config = MctsConfig::default()
            .with_iterations(self.iterations)
            .with_exploration(self.exploration)
            .with_max_discarded(self.max_discarded_iterations);
        match self.time_budget() {
            Some(budget) => config.with_time_budget(budget),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            env_id: "tictactoe".into(),
            episodes: 1,
            iterations: 100,
            exploration: 1.4,
            time_budget_ms: 0,
            max_discarded_iterations: 50,
            seed: 42,
            log_level: "info".into(),
            log_interval: 10,
        }
    }

    #[test]
    fn validate_accepts_valid_configuration() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_game() {
        let mut cfg = base_config();
        cfg.env_id = "chess".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("chess"));
    }

    #[test]
    fn validate_rejects_empty_search_budget() {
        let mut cfg = base_config();
        cfg.iterations = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("iterations"));

        // A time budget alone is enough
        cfg.time_budget_ms = 10;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_exploration() {
        let mut cfg = base_config();
        cfg.exploration = -0.1;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("exploration"));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut cfg = base_config();
        cfg.log_level = "nope".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }

    #[test]
    fn mcts_config_carries_settings() {
        let mut cfg = base_config();
        let mcts = cfg.mcts_config();
        assert_eq!(mcts.num_iterations, 100);
        assert!((mcts.exploration - 1.4).abs() < f64::EPSILON);
        assert_eq!(mcts.time_budget, None);
        assert_eq!(mcts.max_discarded_iterations, 50);

        cfg.time_budget_ms = 25;
        assert_eq!(
            cfg.mcts_config().time_budget,
            Some(Duration::from_millis(25))
        );
    }

    #[test]
    fn cli_flags_override_defaults() {
        let cfg = Config::parse_from([
            "actor",
            "--env-id",
            "connect4",
            "--episodes",
            "3",
            "--iterations",
            "500",
        ]);
        assert_eq!(cfg.env_id, "connect4");
        assert_eq!(cfg.episodes, 3);
        assert_eq!(cfg.iterations, 500);
        assert_eq!(cfg.game_kind().unwrap(), GameKind::Connect4);
    }
}
