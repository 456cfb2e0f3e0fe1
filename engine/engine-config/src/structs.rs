//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;
use std::time::Duration;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// ============================================================================

fn d_env_id() -> String {
    defaults::env_id().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_iterations() -> u32 {
    defaults::iterations()
}
fn d_exploration() -> f64 {
    defaults::exploration()
}
fn d_time_budget_ms() -> u64 {
    defaults::time_budget_ms()
}
fn d_max_discarded() -> u32 {
    defaults::max_discarded_iterations()
}
fn d_episodes() -> u32 {
    defaults::episodes()
}
fn d_log_interval() -> u32 {
    defaults::log_interval()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub mcts: MctsSettings,
    #[serde(default)]
    pub actor: ActorConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    /// Game identifier, e.g. "tictactoe", "connect4" or "euchre"
    #[serde(default = "d_env_id")]
    pub env_id: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
    /// Seed for the runner's ChaCha20 generator
    #[serde(default = "d_seed")]
    pub seed: u64,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            env_id: defaults::env_id().into(),
            log_level: defaults::log_level().into(),
            seed: defaults::seed(),
        }
    }
}

/// Search settings. Named apart from `mcts::MctsConfig`, which the runner
/// builds from these values.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsSettings {
    #[serde(default = "d_iterations")]
    pub iterations: u32,
    #[serde(default = "d_exploration")]
    pub exploration: f64,
    /// Wall-clock budget per search in milliseconds (0 = none)
    #[serde(default = "d_time_budget_ms")]
    pub time_budget_ms: u64,
    #[serde(default = "d_max_discarded")]
    pub max_discarded_iterations: u32,
}

impl MctsSettings {
    /// The time budget as a duration, if one is set.
    pub fn time_budget(&self) -> Option<Duration> {
        (self.time_budget_ms > 0).then(|| Duration::from_millis(self.time_budget_ms))
    }
}

impl Default for MctsSettings {
    fn default() -> Self {
        Self {
            iterations: defaults::iterations(),
            exploration: defaults::exploration(),
            time_budget_ms: defaults::time_budget_ms(),
            max_discarded_iterations: defaults::max_discarded_iterations(),
        }
    }
}

/// Self-play runner configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ActorConfig {
    #[serde(default = "d_episodes")]
    pub episodes: u32,
    #[serde(default = "d_log_interval")]
    pub log_interval: u32,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            episodes: defaults::episodes(),
            log_interval: defaults::log_interval(),
        }
    }
}
