//! Default configuration values loaded from config.defaults.toml.
//!
//! The shared TOML file is embedded at compile time so every binary in the
//! workspace starts from the same values.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    mcts: MctsDefaults,
    actor: ActorDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    env_id: String,
    log_level: String,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    iterations: u32,
    exploration: f64,
    time_budget_ms: u64,
    max_discarded_iterations: u32,
}

#[derive(Debug, Deserialize)]
struct ActorDefaults {
    episodes: u32,
    log_interval: u32,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn env_id() -> &'static str {
    &DEFAULTS.common.env_id
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}
pub fn seed() -> u64 {
    DEFAULTS.common.seed
}

// MCTS
pub fn iterations() -> u32 {
    DEFAULTS.mcts.iterations
}
pub fn exploration() -> f64 {
    DEFAULTS.mcts.exploration
}
pub fn time_budget_ms() -> u64 {
    DEFAULTS.mcts.time_budget_ms
}
pub fn max_discarded_iterations() -> u32 {
    DEFAULTS.mcts.max_discarded_iterations
}

// Actor
pub fn episodes() -> u32 {
    DEFAULTS.actor.episodes
}
pub fn log_interval() -> u32 {
    DEFAULTS.actor.log_interval
}
