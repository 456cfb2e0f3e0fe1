//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from subdirectory)
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by the ISMCTS_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    if let Ok(path) = std::env::var("ISMCTS_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from ISMCTS_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!(
            "ISMCTS_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
///
/// An unreadable or malformed file falls back to the built-in defaults with a
/// warning; environment overrides apply either way.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, u64, f64, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(raw) = std::env::var($key) {
            match raw.parse() {
                Ok(v) => $config.$section.$field = v,
                Err(_) => warn!("Ignoring {}={:?}: not a valid value", $key, raw),
            }
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: ISMCTS_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.env_id, "ISMCTS_COMMON_ENV_ID");
    env_override!(config, common.log_level, "ISMCTS_COMMON_LOG_LEVEL");
    env_override!(config, common.seed, "ISMCTS_COMMON_SEED", parse);

    // MCTS
    env_override!(config, mcts.iterations, "ISMCTS_MCTS_ITERATIONS", parse);
    env_override!(config, mcts.exploration, "ISMCTS_MCTS_EXPLORATION", parse);
    env_override!(
        config,
        mcts.time_budget_ms,
        "ISMCTS_MCTS_TIME_BUDGET_MS",
        parse
    );
    env_override!(
        config,
        mcts.max_discarded_iterations,
        "ISMCTS_MCTS_MAX_DISCARDED_ITERATIONS",
        parse
    );

    // Actor
    env_override!(config, actor.episodes, "ISMCTS_ACTOR_EPISODES", parse);
    env_override!(
        config,
        actor.log_interval,
        "ISMCTS_ACTOR_LOG_INTERVAL",
        parse
    );

    config
}
