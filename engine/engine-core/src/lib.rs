//! Core traits and types shared by the search engine and the games it plays
//!
//! This crate provides the contract every pluggable game implements:
//! - `Game`: typed trait for move generation, move application and outcomes
//! - `Capabilities`: optional hooks (determinization, misc statistics) a game opts into
//! - `Moves`: the move list for a state, flagged when it models a chance event
//! - `Outcome`: terminal result of a state (win, draw) or `Ongoing`
//! - `GameError`: failures a game reports back to the engine

pub mod game_utils;
pub mod typed;

// Re-export main types for convenience
pub use typed::{Capabilities, Game, GameError, Moves, Outcome};
