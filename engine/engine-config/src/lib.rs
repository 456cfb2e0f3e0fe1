//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared by the
//! search engine and the self-play runner.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`ISMCTS_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (`config.defaults.toml`)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! ISMCTS_<SECTION>_<KEY>=value
//!
//! Examples:
//!     ISMCTS_COMMON_ENV_ID=connect4
//!     ISMCTS_COMMON_SEED=7
//!     ISMCTS_MCTS_ITERATIONS=5000
//!     ISMCTS_MCTS_TIME_BUDGET_MS=250
//!     ISMCTS_ACTOR_EPISODES=100
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;

#[cfg(test)]
mod tests;
