//! Tests for the configuration module.

use super::*;
use std::time::Duration;

#[test]
fn test_default_config() {
    let config = CentralConfig::default();
    assert_eq!(config.common.env_id, "tictactoe");
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.common.seed, 42);
    assert_eq!(config.actor.episodes, 10);
    assert_eq!(config.actor.log_interval, 1);
}

#[test]
fn test_mcts_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.mcts.iterations, 1000);
    assert!((config.mcts.exploration - std::f64::consts::SQRT_2).abs() < 1e-12);
    assert_eq!(config.mcts.time_budget_ms, 0);
    assert_eq!(config.mcts.time_budget(), None);
    assert_eq!(config.mcts.max_discarded_iterations, 10_000);
}

#[test]
fn test_accessors_match_struct_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.common.env_id, env_id());
    assert_eq!(config.mcts.iterations, iterations());
    assert_eq!(config.actor.episodes, episodes());
}

#[test]
fn test_time_budget() {
    let settings = MctsSettings {
        time_budget_ms: 250,
        ..MctsSettings::default()
    };
    assert_eq!(settings.time_budget(), Some(Duration::from_millis(250)));
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
env_id = "euchre"
seed = 7

[mcts]
iterations = 5000
exploration = 0.7
time_budget_ms = 100

[actor]
episodes = 3
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.env_id, "euchre");
    assert_eq!(config.common.seed, 7);
    assert_eq!(config.mcts.iterations, 5000);
    assert!((config.mcts.exploration - 0.7).abs() < f64::EPSILON);
    assert_eq!(config.mcts.time_budget(), Some(Duration::from_millis(100)));
    assert_eq!(config.actor.episodes, 3);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[common]
env_id = "connect4"
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.env_id, "connect4");
    assert_eq!(config.common.log_level, "info"); // Default
    assert_eq!(config.mcts.iterations, 1000); // Default
    assert_eq!(config.actor.log_interval, 1); // Default
}

#[test]
fn test_load_from_path() {
    let dir = std::env::temp_dir().join(format!("ismcts-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let good = dir.join("good.toml");
    std::fs::write(&good, "[actor]\nlog_interval = 5\n").unwrap();
    assert_eq!(load_from_path(&good).actor.log_interval, 5);

    // Malformed files fall back to defaults
    let bad = dir.join("bad.toml");
    std::fs::write(&bad, "[actor\nlog_interval = ").unwrap();
    assert_eq!(load_from_path(&bad).actor.log_interval, 1);

    // So do missing ones
    assert_eq!(load_from_path(&dir.join("missing.toml")).actor.log_interval, 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

// All env var cases share one test so parallel tests never see each other's
// variables.
#[test]
fn test_ismcts_env_overrides() {
    std::env::set_var("ISMCTS_COMMON_ENV_ID", "connect4");
    std::env::set_var("ISMCTS_MCTS_ITERATIONS", "77");
    std::env::set_var("ISMCTS_MCTS_EXPLORATION", "0.5");
    std::env::set_var("ISMCTS_ACTOR_EPISODES", "not-a-number");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.common.env_id, "connect4");
    assert_eq!(config.mcts.iterations, 77);
    assert!((config.mcts.exploration - 0.5).abs() < f64::EPSILON);
    // Unparseable values are ignored
    assert_eq!(config.actor.episodes, 10);

    std::env::remove_var("ISMCTS_COMMON_ENV_ID");
    std::env::remove_var("ISMCTS_MCTS_ITERATIONS");
    std::env::remove_var("ISMCTS_MCTS_EXPLORATION");
    std::env::remove_var("ISMCTS_ACTOR_EPISODES");
}
