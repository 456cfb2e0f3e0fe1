//! Shared utilities for game implementations
//!
//! This module provides common functionality used across multiple game implementations
//! and by tests and benchmarks that need to drive a game without the search engine.

use rand::Rng;
use rand_chacha::ChaCha20Rng;

use crate::typed::{Game, GameError, Outcome};

/// Winner code used by the two-player board games.
///
/// * `0` - game ongoing
/// * `1` - player 1 won
/// * `2` - player 2 won
/// * `3` - draw
pub mod winner_codes {
    pub const ONGOING: u8 = 0;
    pub const PLAYER_ONE: u8 = 1;
    pub const PLAYER_TWO: u8 = 2;
    pub const DRAW: u8 = 3;
}

/// Convert a two-player winner code into an [`Outcome`].
///
/// # Example
/// ```
/// use engine_core::game_utils::two_player_outcome;
/// use engine_core::Outcome;
///
/// assert_eq!(two_player_outcome(0), Outcome::Ongoing);
/// assert_eq!(two_player_outcome(2), Outcome::Win(2));
/// assert_eq!(two_player_outcome(3), Outcome::Draw);
/// ```
#[inline]
pub fn two_player_outcome(winner: u8) -> Outcome<u8> {
    match winner {
        winner_codes::PLAYER_ONE | winner_codes::PLAYER_TWO => Outcome::Win(winner),
        winner_codes::DRAW => Outcome::Draw,
        _ => Outcome::Ongoing,
    }
}

/// The opponent of `player` in a game between players 1 and 2.
#[inline]
pub fn other_player(player: u8) -> u8 {
    if player == 1 {
        2
    } else {
        1
    }
}

/// Apply a sequence of moves to `state`, failing on the first illegal one.
pub fn play_moves<G: Game>(
    game: &G,
    state: &G::State,
    moves: &[G::Move],
) -> Result<G::State, GameError> {
    let mut current = state.clone();
    for mv in moves {
        current = game.apply_move(&current, mv)?;
    }
    Ok(current)
}

/// Play uniformly random moves from `state` until the game ends.
///
/// Returns the terminal state and the number of plies played. A state with
/// no moves that reports no winner is returned as is.
pub fn random_playout<G: Game>(
    game: &G,
    state: &G::State,
    rng: &mut ChaCha20Rng,
) -> Result<(G::State, u32), GameError> {
    let mut current = state.clone();
    let mut plies = 0;

    while !game.outcome(&current).is_terminal() {
        let moves = game.moves(&current)?;
        if moves.is_empty() {
            break;
        }
        let mv = &moves.moves[rng.gen_range(0..moves.len())];
        current = game.apply_move(&current, mv)?;
        plies += 1;
    }

    Ok((current, plies))
}
