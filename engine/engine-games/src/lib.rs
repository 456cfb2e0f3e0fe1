//! Game lookup for the ISMCTS engine
//!
//! The `Game` trait has associated types, so games cannot share a trait
//! object. Callers instead resolve a configured name to a [`GameKind`] and
//! match on it to pick the concrete game type.
//!
//! # Usage
//!
//! ```rust
//! use engine_games::GameKind;
//!
//! let kind: GameKind = "connect4".parse().unwrap();
//! assert_eq!(kind, GameKind::Connect4);
//! assert!(!kind.has_hidden_information());
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use games_connect4::Connect4;
pub use games_euchre::Euchre;
pub use games_tictactoe::TicTacToe;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown game {name:?}; available: {}", list_games().join(", "))]
pub struct UnknownGameError {
    pub name: String,
}

/// The bundled games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    TicTacToe,
    Connect4,
    Euchre,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::TicTacToe, GameKind::Connect4, GameKind::Euchre];

    /// Identifier used in configuration; matches `Game::name`.
    pub fn name(self) -> &'static str {
        match self {
            GameKind::TicTacToe => "tictactoe",
            GameKind::Connect4 => "connect4",
            GameKind::Euchre => "euchre",
        }
    }

    /// Whether searches over this game resample hidden state.
    pub fn has_hidden_information(self) -> bool {
        matches!(self, GameKind::Euchre)
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameKind {
    type Err = UnknownGameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        GameKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| UnknownGameError {
                name: s.to_string(),
            })
    }
}

/// Names of all bundled games.
pub fn list_games() -> Vec<&'static str> {
    GameKind::ALL.iter().map(|kind| kind.name()).collect()
}
