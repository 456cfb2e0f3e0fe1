//! TicTacToe reference game for the ISMCTS engine
//!
//! A fully observable two-player game: the smallest collaborator that
//! exercises decision nodes, wins for either player and draws.
//!
//! # Usage
//!
//! ```rust
//! use engine_core::{Game, Outcome};
//! use games_tictactoe::TicTacToe;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let game = TicTacToe;
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let state = game.initial_state(&mut rng);
//! let state = game.apply_move(&state, &4).unwrap();
//! assert_eq!(game.current_player(&state), 2);
//! assert_eq!(game.outcome(&state), Outcome::Ongoing);
//! ```

use std::fmt;

use engine_core::game_utils::{other_player, two_player_outcome, winner_codes};
use engine_core::{Game, GameError, Moves, Outcome};
use rand_chacha::ChaCha20Rng;

/// Winning positions (rows, columns, diagonals)
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// TicTacToe game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State {
    /// Board representation: 0=empty, 1=X, 2=O
    board: [u8; 9],
    /// Current player: 1=X, 2=O
    current_player: u8,
    /// Winner: 0=none/ongoing, 1=X, 2=O, 3=draw
    winner: u8,
}

impl State {
    /// Create a new initial game state
    pub fn new() -> Self {
        Self {
            board: [0; 9],
            current_player: 1, // X goes first
            winner: winner_codes::ONGOING,
        }
    }

    /// Build a position from a board. The player to move is derived from
    /// the piece count and the winner from the lines on the board.
    pub fn from_board(board: [u8; 9]) -> Result<Self, GameError> {
        if board.iter().any(|&cell| cell > 2) {
            return Err(GameError::InvalidSetup(format!("bad cell in {board:?}")));
        }
        let xs = board.iter().filter(|&&cell| cell == 1).count();
        let os = board.iter().filter(|&&cell| cell == 2).count();
        if xs != os && xs != os + 1 {
            return Err(GameError::InvalidSetup(format!(
                "{xs} X pieces against {os} O pieces"
            )));
        }
        let winner = Self::check_winner(&board);
        let current_player = if matches!(winner, winner_codes::PLAYER_ONE | winner_codes::PLAYER_TWO) {
            // The winner made the last move
            winner
        } else if xs == os {
            1
        } else {
            2
        };
        Ok(Self {
            board,
            current_player,
            winner,
        })
    }

    pub fn board(&self) -> &[u8; 9] {
        &self.board
    }

    /// Check if the game is over
    pub fn is_done(&self) -> bool {
        self.winner != winner_codes::ONGOING
    }

    /// Get legal moves (empty positions)
    pub fn legal_moves(&self) -> Vec<u8> {
        if self.is_done() {
            return Vec::new();
        }

        (0..9u8)
            .filter(|&pos| self.board[pos as usize] == 0)
            .collect()
    }

    /// Place the current player's mark at `position`.
    pub fn make_move(&self, position: u8) -> Result<State, GameError> {
        if self.is_done() || position >= 9 || self.board[position as usize] != 0 {
            return Err(GameError::IllegalMove(format!(
                "position {position} is not available"
            )));
        }

        let mut new_state = *self;
        new_state.board[position as usize] = self.current_player;
        new_state.winner = Self::check_winner(&new_state.board);

        // The winner stays "to move" so the final position names them
        if new_state.winner == winner_codes::ONGOING {
            new_state.current_player = other_player(self.current_player);
        }

        Ok(new_state)
    }

    /// Check for winner on the board
    fn check_winner(board: &[u8; 9]) -> u8 {
        for line in &LINES {
            let [a, b, c] = *line;
            if board[a] != 0 && board[a] == board[b] && board[b] == board[c] {
                return board[a];
            }
        }

        if board.iter().all(|&cell| cell != 0) {
            return winner_codes::DRAW;
        }

        winner_codes::ONGOING
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.board.chunks(3) {
            let cells: Vec<char> = row
                .iter()
                .map(|&cell| match cell {
                    1 => 'X',
                    2 => 'O',
                    _ => '.',
                })
                .collect();
            writeln!(f, "{} {} {}", cells[0], cells[1], cells[2])?;
        }
        Ok(())
    }
}

/// TicTacToe game implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToe;

impl Game for TicTacToe {
    type State = State;
    type Move = u8;
    type Player = u8;
    type Misc = ();

    fn name(&self) -> &'static str {
        "tictactoe"
    }

    fn initial_state(&self, _rng: &mut ChaCha20Rng) -> State {
        State::new()
    }

    fn moves(&self, state: &State) -> Result<Moves<u8>, GameError> {
        Ok(Moves::decision(state.legal_moves()))
    }

    fn apply_move(&self, state: &State, mv: &u8) -> Result<State, GameError> {
        state.make_move(*mv)
    }

    fn outcome(&self, state: &State) -> Outcome<u8> {
        two_player_outcome(state.winner)
    }

    fn current_player(&self, state: &State) -> u8 {
        state.current_player
    }
}
