//! MCTS search implementation.
//!
//! Each playout runs four phases over one persistent tree:
//! 1. Determinization: resample the root's hidden information (if the game has any)
//! 2. Selection: walk from the root with `MctsTree::best_child`, creating
//!    children on demand, until a terminal position is reached
//! 3. Backpropagation: credit the terminal outcome to every node on the path
//! 4. Bookkeeping: depth statistics and, optionally, the terminal state
//!
//! A playout that runs into an impossible determinization is discarded
//! before it touches any statistics and the search samples again.

use std::time::{Duration, Instant};

use engine_core::{Capabilities, Game, GameError};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::MctsConfig;
use crate::node::{MctsNode, NodeId};
use crate::tree::MctsTree;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Node {0} has no children to select from")]
    NoChildren(NodeId),

    #[error("No legal move matches the search tree")]
    NoLegalMove,

    #[error("Terminal node {node} at depth {depth} has no winner")]
    NoWinnerAtTerminal { node: NodeId, depth: u32 },

    #[error("Gave up after {0} consecutive impossible determinizations")]
    DeterminizationExhausted(u32),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Terminal position reached by one playout.
///
/// The state is captured when the playout finishes: in a determinized tree
/// the node's own cache is overwritten by later samples.
#[derive(Debug, Clone)]
pub struct Leaf<G: Game> {
    pub node: NodeId,
    pub depth: u32,
    pub state: G::State,
}

/// Counters for one search call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Completed playouts
    pub iterations: u32,
    /// Playouts dropped because of an impossible determinization
    pub discarded: u32,
    pub elapsed: Duration,
}

/// Result of an MCTS search.
#[derive(Debug)]
pub struct SearchResult<G: Game> {
    /// The whole search tree, for inspection
    pub tree: MctsTree<G>,

    /// Move of the most visited root child
    pub best_move: G::Move,

    /// Terminal positions reached, when `collect_leaf_nodes` is set
    pub leaves: Vec<Leaf<G>>,

    /// Deepest terminal node reached
    pub max_depth: u32,

    /// Mean terminal depth over completed playouts (0.0 if none completed)
    pub avg_depth: f64,

    pub stats: SearchStats,
}

impl<G: Game> SearchResult<G> {
    /// Root node of the search tree.
    pub fn root(&self) -> &MctsNode<G> {
        self.tree.get(self.tree.root())
    }

    /// Node of the chosen move.
    pub fn best_child(&self) -> Option<&MctsNode<G>> {
        self.child(&self.best_move)
    }

    /// Root child reached by `mv`, if the search instantiated it.
    pub fn child(&self, mv: &G::Move) -> Option<&MctsNode<G>> {
        self.root().child(mv).map(|id| self.tree.get(id))
    }

    /// Visit distribution over the root's children.
    pub fn policy(&self) -> Vec<(G::Move, f32)> {
        self.root()
            .visit_distribution(self.tree.arena())
            .into_iter()
            .map(|(mv, p)| (mv.clone(), p))
            .collect()
    }
}

/// MCTS search driver.
///
/// Holds its own copy of the starting position; every call to `run` builds
/// a fresh tree from it.
#[derive(Debug)]
pub struct MctsSearch<'a, G: Game> {
    game: &'a G,
    config: MctsConfig,
    initial_state: G::State,
    capabilities: Capabilities,
}

impl<'a, G: Game> MctsSearch<'a, G> {
    /// Create a search from the game's own starting position.
    pub fn new(game: &'a G, config: MctsConfig, rng: &mut ChaCha20Rng) -> Self {
        let initial_state = game.initial_state(rng);
        Self::from_owned_state(game, config, initial_state)
    }

    /// Create a search from a copy of `state`.
    pub fn with_state(game: &'a G, config: MctsConfig, state: &G::State) -> Self {
        Self::from_owned_state(game, config, state.clone())
    }

    fn from_owned_state(game: &'a G, config: MctsConfig, initial_state: G::State) -> Self {
        Self {
            game,
            config,
            initial_state,
            capabilities: game.capabilities(),
        }
    }

    /// The position every search starts from.
    pub fn initial_state(&self) -> &G::State {
        &self.initial_state
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Run the search and pick the most visited root move.
    ///
    /// With `restriction`, only those moves are eligible; pass the legal
    /// moves of the real (not resampled) position when searching a
    /// hidden-information game.
    pub fn run(
        &self,
        restriction: Option<&[G::Move]>,
        rng: &mut ChaCha20Rng,
    ) -> Result<SearchResult<G>, SearchError> {
        let start = Instant::now();
        let mut tree = MctsTree::new(
            self.initial_state.clone(),
            self.capabilities.determinize,
            self.config.exploration,
        );

        let mut stats = SearchStats::default();
        let mut consecutive_discards = 0u32;
        let mut max_depth = 0u32;
        let mut total_depth = 0u64;
        let mut leaves = Vec::new();

        while self.has_budget(&stats, start) {
            let leaf_id = match self.playout(&mut tree, rng) {
                Ok(leaf_id) => leaf_id,
                Err(SearchError::Game(GameError::ImpossibleDeterminization(reason)))
                    if self.capabilities.determinize =>
                {
                    stats.discarded += 1;
                    consecutive_discards += 1;
                    trace!(reason = %reason, consecutive_discards, "Discarded playout");
                    if consecutive_discards > self.config.max_discarded_iterations {
                        return Err(SearchError::DeterminizationExhausted(consecutive_discards));
                    }
                    continue;
                }
                Err(e) => return Err(e),
            };
            consecutive_discards = 0;
            stats.iterations += 1;

            let depth = tree.get(leaf_id).depth;
            max_depth = max_depth.max(depth);
            total_depth += depth as u64;

            if self.config.collect_leaf_nodes {
                let state = tree.state(self.game, leaf_id)?.clone();
                leaves.push(Leaf {
                    node: leaf_id,
                    depth,
                    state,
                });
            }

            trace!(leaf = leaf_id.0, depth, "MCTS playout complete");
        }

        let best_id = tree.most_visited_child(self.game, restriction)?;
        let best_move = tree
            .get(best_id)
            .mv
            .clone()
            .ok_or_else(|| SearchError::InvalidState("root child without a move".to_string()))?;

        stats.elapsed = start.elapsed();
        let avg_depth = if stats.iterations > 0 {
            total_depth as f64 / stats.iterations as f64
        } else {
            0.0
        };

        let tree_stats = tree.stats();
        debug!(
            game = self.game.name(),
            iterations = stats.iterations,
            discarded = stats.discarded,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            nodes = tree_stats.total_nodes,
            root_visits = tree_stats.root_visits,
            root_draws = tree_stats.root_draws,
            tree_depth = tree_stats.max_depth,
            max_depth,
            best_move = ?best_move,
            "MCTS search complete"
        );

        Ok(SearchResult {
            tree,
            best_move,
            leaves,
            max_depth,
            avg_depth,
            stats,
        })
    }

    fn has_budget(&self, stats: &SearchStats, start: Instant) -> bool {
        match self.config.time_budget {
            Some(budget) => start.elapsed() < budget,
            None => stats.iterations < self.config.num_iterations,
        }
    }

    /// Run one playout and return the terminal node it reached.
    fn playout(
        &self,
        tree: &mut MctsTree<G>,
        rng: &mut ChaCha20Rng,
    ) -> Result<NodeId, SearchError> {
        let determinized = self.capabilities.determinize;
        if determinized {
            tree.determinize(self.game, rng)?;
        }

        let mut current = tree.root();
        loop {
            if tree.outcome(self.game, current)?.is_terminal() {
                break;
            }
            let visible = tree.children(self.game, current)?;
            if visible.is_empty() {
                if determinized {
                    // The sample cannot continue the real game from here
                    return Err(GameError::ImpossibleDeterminization(format!(
                        "no moves from unfinished node {current}"
                    ))
                    .into());
                }
                // backpropagate reports the missing winner
                break;
            }
            let next = tree.select_among(self.game, current, &visible, rng)?;
            if determinized {
                tree.reset_state(next);
            }
            current = next;
        }

        tree.backpropagate(self.game, current, self.capabilities.track_misc)?;
        Ok(current)
    }
}

/// Convenience function to run a single MCTS search from `state`.
pub fn run_mcts<G: Game>(
    game: &G,
    config: MctsConfig,
    state: &G::State,
    restriction: Option<&[G::Move]>,
    rng: &mut ChaCha20Rng,
) -> Result<SearchResult<G>, SearchError> {
    MctsSearch::with_state(game, config, state).run(restriction, rng)
}
