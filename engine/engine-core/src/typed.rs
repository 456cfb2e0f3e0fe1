//! Typed Game trait providing the collaborator contract for the search engine
//!
//! The engine never looks inside a game's state. Every question about a
//! position (whose turn it is, which moves exist, who won) is answered by the
//! game through this trait, and the engine only stores and passes states back.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use rand_chacha::ChaCha20Rng;

/// Optional hooks a game supports.
///
/// The search driver reads these once when it is constructed and never
/// probes the game again, so a game must report them consistently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// The state contains hidden information and `Game::determine` resamples it.
    pub determinize: bool,

    /// `Game::update_misc` accumulates per-player statistics during backpropagation.
    pub track_misc: bool,
}

impl Capabilities {
    /// Capabilities of a fully observable game with no auxiliary statistics.
    pub fn perfect_information() -> Self {
        Self::default()
    }

    /// Builder pattern: enable determinization.
    pub fn with_determinization(mut self) -> Self {
        self.determinize = true;
        self
    }

    /// Builder pattern: enable misc statistics tracking.
    pub fn with_misc_tracking(mut self) -> Self {
        self.track_misc = true;
        self
    }
}

/// Moves available from a state.
///
/// When `random` is set the state is a chance node: the next move is picked
/// by an event outside any player's control (dice, a card turned up) and the
/// engine chooses uniformly among the entries. Repeating an entry makes that
/// outcome proportionally more likely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moves<M> {
    pub random: bool,
    pub moves: Vec<M>,
}

impl<M> Moves<M> {
    /// Moves chosen by the player to move.
    pub fn decision(moves: Vec<M>) -> Self {
        Self {
            random: false,
            moves,
        }
    }

    /// Outcomes of a chance event.
    pub fn chance(moves: Vec<M>) -> Self {
        Self {
            random: true,
            moves,
        }
    }

    /// No moves: the state is terminal.
    pub fn none() -> Self {
        Self::decision(Vec::new())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }
}

impl<M: PartialEq> Moves<M> {
    /// Check whether `mv` is among the available moves.
    pub fn contains(&self, mv: &M) -> bool {
        self.moves.contains(mv)
    }
}

/// Result of a game state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Outcome<P> {
    /// The game is still in progress
    Ongoing,
    /// The given player (or team) won
    Win(P),
    /// The game ended without a winner
    Draw,
}

impl<P> Outcome<P> {
    /// True for `Win` and `Draw`.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }

    /// The winning player, if any.
    pub fn winner(&self) -> Option<&P> {
        match self {
            Outcome::Win(player) => Some(player),
            _ => None,
        }
    }
}

/// Errors a game reports to the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// A move was applied that is not legal in the given state.
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    /// A resampled hidden state cannot be consistent with what has been observed.
    /// The engine discards the playout that ran into it and samples again.
    #[error("Impossible determinization: {0}")]
    ImpossibleDeterminization(String),

    /// A starting position could not be built from the given arguments.
    #[error("Invalid setup: {0}")]
    InvalidSetup(String),
}

/// Main trait for game implementations
///
/// Games implement this trait with their own state, move and player types.
/// All methods take `&self`: a game value holds rules and constants only,
/// never the evolving position.
///
/// # Type Parameters
///
/// * `State` - Immutable snapshot of one point in the game, cloned freely
/// * `Move` - Move identifier, compared and hashed to key child nodes
/// * `Player` - Player (or team) identity statistics are kept for
/// * `Misc` - Per-player accumulator filled by `update_misc`; use `()` if unused
///
/// # Example
///
/// ```rust
/// use engine_core::{Game, GameError, Moves, Outcome};
/// use rand_chacha::ChaCha20Rng;
///
/// /// First player to reach 3 wins; each move adds 1 or 2.
/// #[derive(Debug)]
/// struct CountToThree;
///
/// impl Game for CountToThree {
///     type State = (u8, u8); // (total, player to move)
///     type Move = u8;
///     type Player = u8;
///     type Misc = ();
///
///     fn name(&self) -> &'static str {
///         "count-to-three"
///     }
///
///     fn initial_state(&self, _rng: &mut ChaCha20Rng) -> Self::State {
///         (0, 1)
///     }
///
///     fn moves(&self, state: &Self::State) -> Result<Moves<u8>, GameError> {
///         if state.0 >= 3 {
///             return Ok(Moves::none());
///         }
///         Ok(Moves::decision(vec![1, 2]))
///     }
///
///     fn apply_move(&self, state: &Self::State, mv: &u8) -> Result<Self::State, GameError> {
///         if *mv == 0 || *mv > 2 {
///             return Err(GameError::IllegalMove(format!("cannot add {mv}")));
///         }
///         let total = state.0 + mv;
///         let next = if total >= 3 { state.1 } else { 3 - state.1 };
///         Ok((total, next))
///     }
///
///     fn outcome(&self, state: &Self::State) -> Outcome<u8> {
///         if state.0 >= 3 {
///             Outcome::Win(state.1)
///         } else {
///             Outcome::Ongoing
///         }
///     }
///
///     fn current_player(&self, state: &Self::State) -> u8 {
///         state.1
///     }
/// }
///
/// let game = CountToThree;
/// let state = game.apply_move(&(1, 1), &2).unwrap();
/// assert_eq!(game.outcome(&state), Outcome::Win(1));
/// ```
pub trait Game: Debug {
    /// Game state type - cloned whenever the engine caches a position
    type State: Clone + Debug;

    /// Move type - keys a node's children
    type Move: Clone + Eq + Hash + Debug;

    /// Player identity - keys win counts and misc statistics
    type Player: Clone + Eq + Hash + Debug;

    /// Auxiliary per-player statistic accumulated during backpropagation
    type Misc: Default + Debug;

    /// Short identifier used in logs and configuration (e.g. `"connect4"`).
    fn name(&self) -> &'static str;

    /// Optional hooks this game supports. Defaults to none.
    fn capabilities(&self) -> Capabilities {
        Capabilities::perfect_information()
    }

    /// Produce a valid starting position.
    ///
    /// Games with random setup (shuffled decks) draw from `rng`.
    fn initial_state(&self, rng: &mut ChaCha20Rng) -> Self::State;

    /// Moves available in `state`.
    ///
    /// An empty list means the state is terminal and `outcome` must report
    /// a `Win` or `Draw` for it.
    fn moves(&self, state: &Self::State) -> Result<Moves<Self::Move>, GameError>;

    /// Apply `mv` to `state` and return the resulting state.
    ///
    /// Must not modify `state`. Fails with `GameError::IllegalMove` if `mv`
    /// is not among `moves(state)`.
    fn apply_move(&self, state: &Self::State, mv: &Self::Move) -> Result<Self::State, GameError>;

    /// Terminal result of `state`, or `Outcome::Ongoing`.
    fn outcome(&self, state: &Self::State) -> Outcome<Self::Player>;

    /// Player whose turn it is, i.e. whose statistics drive selection here.
    fn current_player(&self, state: &Self::State) -> Self::Player;

    /// Resample the hidden parts of `state`.
    ///
    /// Called with the search root's original snapshot once per playout when
    /// `capabilities().determinize` is set. The visible part of the state must
    /// be kept; hidden parts are refilled at random, consistent with what has
    /// been observed. Return `GameError::ImpossibleDeterminization` when no
    /// consistent sample was produced.
    fn determine(
        &self,
        state: &Self::State,
        _rng: &mut ChaCha20Rng,
    ) -> Result<Self::State, GameError> {
        Ok(state.clone())
    }

    /// Fold the terminal `state` of one playout into an ancestor's statistics.
    ///
    /// Called once per ancestor during backpropagation when
    /// `capabilities().track_misc` is set.
    fn update_misc(
        &self,
        _state: &Self::State,
        _misc_by_player: &mut HashMap<Self::Player, Self::Misc>,
    ) {
    }

    /// The part of `state` the player to move is allowed to see.
    ///
    /// Fully observable games return the state unchanged.
    fn redact(&self, state: &Self::State) -> Self::State {
        state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    // Helper types for testing
    #[derive(Debug)]
    struct Nim;

    impl Game for Nim {
        type State = (u32, u8);
        type Move = u32;
        type Player = u8;
        type Misc = u32;

        fn name(&self) -> &'static str {
            "nim"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::perfect_information().with_misc_tracking()
        }

        fn initial_state(&self, _rng: &mut ChaCha20Rng) -> Self::State {
            (5, 0)
        }

        fn moves(&self, state: &Self::State) -> Result<Moves<u32>, GameError> {
            Ok(Moves::decision((1..=state.0.min(2)).collect()))
        }

        fn apply_move(&self, state: &Self::State, mv: &u32) -> Result<Self::State, GameError> {
            if *mv == 0 || *mv > state.0.min(2) {
                return Err(GameError::IllegalMove(format!("take {mv}")));
            }
            Ok((state.0 - mv, 1 - state.1))
        }

        fn outcome(&self, state: &Self::State) -> Outcome<u8> {
            if state.0 == 0 {
                // The player who took the last stone has just moved
                Outcome::Win(1 - state.1)
            } else {
                Outcome::Ongoing
            }
        }

        fn current_player(&self, state: &Self::State) -> u8 {
            state.1
        }

        fn update_misc(&self, state: &Self::State, misc: &mut HashMap<u8, u32>) {
            *misc.entry(state.1).or_default() += 1;
        }
    }

    #[test]
    fn test_capabilities_builders() {
        let caps = Capabilities::perfect_information();
        assert!(!caps.determinize);
        assert!(!caps.track_misc);

        let caps = caps.with_determinization().with_misc_tracking();
        assert!(caps.determinize);
        assert!(caps.track_misc);
    }

    #[test]
    fn test_moves_constructors() {
        let decision = Moves::decision(vec![1, 2, 3]);
        assert!(!decision.random);
        assert_eq!(decision.len(), 3);
        assert!(decision.contains(&2));
        assert!(!decision.contains(&4));

        let chance = Moves::chance(vec![7, 7, 8]);
        assert!(chance.random);

        let none: Moves<u8> = Moves::none();
        assert!(none.is_empty());
        assert!(!none.random);
    }

    #[test]
    fn test_outcome_helpers() {
        assert!(!Outcome::<u8>::Ongoing.is_terminal());
        assert!(Outcome::<u8>::Draw.is_terminal());
        assert!(Outcome::Win(2u8).is_terminal());
        assert_eq!(Outcome::Win(2u8).winner(), Some(&2));
        assert_eq!(Outcome::<u8>::Draw.winner(), None);
    }

    #[test]
    fn test_default_hooks() {
        let game = Nim;
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let state = game.initial_state(&mut rng);

        assert_eq!(game.determine(&state, &mut rng).unwrap(), state);
        assert_eq!(game.redact(&state), state);
    }

    #[test]
    fn test_game_basic_functionality() {
        let game = Nim;
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let mut state = game.initial_state(&mut rng);

        while !game.outcome(&state).is_terminal() {
            let moves = game.moves(&state).unwrap();
            state = game.apply_move(&state, &moves.moves[0]).unwrap();
        }
        // Taking one stone at a time from five: the first player takes the last one
        assert_eq!(game.outcome(&state), Outcome::Win(0));

        let mut misc = HashMap::new();
        game.update_misc(&state, &mut misc);
        assert_eq!(misc.get(&1), Some(&1));
    }

    #[test]
    fn test_illegal_move_is_reported() {
        let game = Nim;
        let err = game.apply_move(&(1, 0), &2).unwrap_err();
        assert!(matches!(err, GameError::IllegalMove(_)));
        assert!(err.to_string().contains("Illegal move"));
    }
}
