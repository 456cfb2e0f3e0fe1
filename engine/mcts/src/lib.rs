//! Information-set Monte Carlo Tree Search (ISMCTS) over pluggable games.
//!
//! This crate provides a game-agnostic search that works with any game
//! implementing the `engine-core` [`Game`](engine_core::Game) trait,
//! including games with chance events and hidden information.
//!
//! # Overview
//!
//! The search builds a tree by running playouts. Each playout:
//!
//! 1. **Determinizes** the root when the game hides information, sampling a
//!    concrete full-information position from the root's original snapshot
//! 2. **Selects** a path to a terminal position: chance nodes pick uniformly,
//!    decision nodes try every move once and then follow UCB1 for the player
//!    to move. Children are created on demand and, in a determinized tree,
//!    recomputed from the fresh sample as the path is walked
//! 3. **Backpropagates** the outcome, crediting one win (or draw) to every
//!    node on the path
//!
//! After the budget is spent the move of the most visited root child is
//! returned, optionally restricted to the moves legal in the real position.
//!
//! # Usage
//!
//! ```rust
//! use engine_core::game_utils::play_moves;
//! use engine_core::Game;
//! use games_tictactoe::TicTacToe;
//! use mcts::{run_mcts, MctsConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let game = TicTacToe;
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//!
//! // X takes 0 and 1, O takes 3 and 4: X wins at 2
//! let start = game.initial_state(&mut rng);
//! let state = play_moves(&game, &start, &[0, 3, 1, 4]).unwrap();
//!
//! let config = MctsConfig::default().with_iterations(1000);
//! let result = run_mcts(&game, config, &state, None, &mut rng).unwrap();
//! assert_eq!(result.best_move, 2);
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `num_iterations`: Completed playouts per search (default: 1000)
//! - `exploration`: UCB1 exploration constant (default: sqrt(2))
//! - `time_budget`: Search for a wall-clock duration instead of a fixed count
//! - `collect_leaf_nodes`: Keep every terminal state reached
//! - `max_discarded_iterations`: Consecutive impossible samples tolerated

pub mod config;
pub mod node;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::{MctsConfig, DEFAULT_EXPLORATION};
pub use node::{MctsNode, NodeId};
pub use search::{run_mcts, Leaf, MctsSearch, SearchError, SearchResult, SearchStats};
pub use tree::{MctsTree, TreeStats};
