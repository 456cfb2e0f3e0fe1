//! Connect 4 reference game for the ISMCTS engine
//!
//! Connect 4 is a two-player connection game where players drop discs into
//! a 7-column, 6-row vertically suspended grid. The first to form a
//! horizontal, vertical, or diagonal line of four wins; a full grid without
//! a line is a draw.
//!
//! # Board Layout
//!
//! The board is stored in row-major order, with row 0 at the bottom:
//! ```text
//! Row 5: [35][36][37][38][39][40][41]  <- Top
//! Row 4: [28][29][30][31][32][33][34]
//! Row 3: [21][22][23][24][25][26][27]
//! Row 2: [14][15][16][17][18][19][20]
//! Row 1: [ 7][ 8][ 9][10][11][12][13]
//! Row 0: [ 0][ 1][ 2][ 3][ 4][ 5][ 6]  <- Bottom
//!         Col 0  1  2  3  4  5  6
//! ```

use std::fmt;

use engine_core::game_utils::{other_player, two_player_outcome, winner_codes};
use engine_core::{Game, GameError, Moves, Outcome};
use rand_chacha::ChaCha20Rng;

/// Board dimensions
pub const COLS: usize = 7;
pub const ROWS: usize = 6;
pub const BOARD_SIZE: usize = COLS * ROWS; // 42

/// Connect4 game state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    /// Board representation: 0=empty, 1=Red (player 1), 2=Yellow (player 2)
    /// Stored in row-major order with row 0 at the bottom
    board: [u8; BOARD_SIZE],
    /// Current player: 1=Red, 2=Yellow
    current_player: u8,
    /// Winner: 0=none/ongoing, 1=Red, 2=Yellow, 3=draw
    winner: u8,
    /// Height of each column (0-6 means number of pieces in column)
    column_heights: [u8; COLS],
}

impl State {
    /// Create a new initial game state
    pub fn new() -> Self {
        Self {
            board: [0; BOARD_SIZE],
            current_player: 1, // Red goes first
            winner: winner_codes::ONGOING,
            column_heights: [0; COLS],
        }
    }

    /// Check if the game is over
    pub fn is_done(&self) -> bool {
        self.winner != winner_codes::ONGOING
    }

    /// Get legal moves (columns that are not full)
    pub fn legal_moves(&self) -> Vec<u8> {
        if self.is_done() {
            return Vec::new();
        }

        (0..COLS as u8)
            .filter(|&col| self.column_heights[col as usize] < ROWS as u8)
            .collect()
    }

    /// Piece at (col, row): 0=empty, 1=Red, 2=Yellow
    pub fn cell(&self, col: usize, row: usize) -> u8 {
        self.board[Self::pos(col, row)]
    }

    /// Convert column and row to board index
    #[inline]
    fn pos(col: usize, row: usize) -> usize {
        row * COLS + col
    }

    /// Drop the current player's piece in `column`.
    pub fn drop_piece(&self, column: u8) -> Result<State, GameError> {
        let col = column as usize;

        if self.is_done() || col >= COLS || self.column_heights[col] >= ROWS as u8 {
            return Err(GameError::IllegalMove(format!(
                "column {column} is not playable"
            )));
        }

        let mut new_state = self.clone();
        let row = self.column_heights[col] as usize;
        new_state.board[Self::pos(col, row)] = self.current_player;
        new_state.column_heights[col] += 1;
        new_state.winner = new_state.check_winner_at(col, row);

        // The winner stays "to move" so the final position names them
        if new_state.winner == winner_codes::ONGOING {
            new_state.current_player = other_player(self.current_player);
        }

        Ok(new_state)
    }

    /// Check if the piece at (col, row) creates a winning line
    fn check_winner_at(&self, col: usize, row: usize) -> u8 {
        let player = self.board[Self::pos(col, row)];
        if player == 0 {
            return winner_codes::ONGOING;
        }

        // Direction vectors: horizontal, vertical, diagonal /, diagonal \
        let directions: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

        for (dc, dr) in directions {
            let count = 1
                + self.run_length(col, row, dc, dr, player)
                + self.run_length(col, row, -dc, -dr, player);
            if count >= 4 {
                return player;
            }
        }

        if self.column_heights.iter().all(|&h| h >= ROWS as u8) {
            return winner_codes::DRAW;
        }

        winner_codes::ONGOING
    }

    /// Pieces of `player` in a row starting next to (col, row) in direction (dc, dr)
    fn run_length(&self, col: usize, row: usize, dc: i32, dr: i32, player: u8) -> usize {
        let mut count = 0;
        let (mut c, mut r) = (col as i32 + dc, row as i32 + dr);
        while c >= 0 && c < COLS as i32 && r >= 0 && r < ROWS as i32 {
            if self.board[Self::pos(c as usize, r as usize)] != player {
                break;
            }
            count += 1;
            c += dc;
            r += dr;
        }
        count
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..ROWS).rev() {
            let line: String = (0..COLS)
                .map(|col| match self.cell(col, row) {
                    1 => 'R',
                    2 => 'Y',
                    _ => '.',
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Connect4 game implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct Connect4;

impl Game for Connect4 {
    type State = State;
    type Move = u8;
    type Player = u8;
    type Misc = ();

    fn name(&self) -> &'static str {
        "connect4"
    }

    fn initial_state(&self, _rng: &mut ChaCha20Rng) -> State {
        State::new()
    }

    fn moves(&self, state: &State) -> Result<Moves<u8>, GameError> {
        Ok(Moves::decision(state.legal_moves()))
    }

    fn apply_move(&self, state: &State, mv: &u8) -> Result<State, GameError> {
        state.drop_piece(*mv)
    }

    fn outcome(&self, state: &State) -> Outcome<u8> {
        two_player_outcome(state.winner)
    }

    fn current_player(&self, state: &State) -> u8 {
        state.current_player
    }
}
