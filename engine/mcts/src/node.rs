//! MCTS tree node representation.
//!
//! Each node represents a game position reached by playing a move from the parent.
//! Nodes store per-player outcome statistics used for UCB1 selection and for
//! reporting, plus a cached copy of the position that the tree can drop and
//! recompute when the root is resampled.

use std::collections::HashMap;
use std::fmt;

use engine_core::Game;

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in the MCTS tree.
#[derive(Debug)]
pub struct MctsNode<G: Game> {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Move that led to this node from parent (None for root)
    pub mv: Option<G::Move>,

    /// Cached game state. Computed from the parent on first access and
    /// cleared when the root is resampled.
    pub(crate) state: Option<G::State>,

    /// Children keyed by move, in creation order. Entries are never removed;
    /// moves illegal under the current sample are only hidden.
    pub children: Vec<(G::Move, NodeId)>,

    /// Number of playouts that passed through this node
    pub visits: u32,

    /// Number of those playouts that ended in a draw
    pub draws: u32,

    /// Wins per player over playouts through this node
    pub wins_by_player: HashMap<G::Player, u32>,

    /// Game-defined statistics per player, filled by `Game::update_misc`
    pub misc_by_player: HashMap<G::Player, G::Misc>,

    /// Plies from the root (root is 0)
    pub depth: u32,

    /// Children are chance outcomes picked uniformly rather than by UCB1.
    /// Set when the node is first expanded.
    pub is_random: bool,

    /// The tree resamples hidden state, so this node's cached state is only
    /// valid for the current playout.
    pub determinized: bool,
}

impl<G: Game> MctsNode<G> {
    /// Create a new root node.
    pub fn new_root(state: G::State, determinized: bool) -> Self {
        Self {
            parent: NodeId::NONE,
            mv: None,
            state: Some(state),
            children: Vec::new(),
            visits: 0,
            draws: 0,
            wins_by_player: HashMap::new(),
            misc_by_player: HashMap::new(),
            depth: 0,
            is_random: false,
            determinized,
        }
    }

    /// Create a new child node. Its state is computed lazily.
    pub fn new_child(parent: NodeId, mv: G::Move, depth: u32, determinized: bool) -> Self {
        Self {
            parent,
            mv: Some(mv),
            state: None,
            children: Vec::new(),
            visits: 0,
            draws: 0,
            wins_by_player: HashMap::new(),
            misc_by_player: HashMap::new(),
            depth,
            is_random: false,
            determinized,
        }
    }

    /// Cached state, if computed for the current playout.
    #[inline]
    pub fn cached_state(&self) -> Option<&G::State> {
        self.state.as_ref()
    }

    /// Drop the cached state so it is recomputed from the parent on next access.
    #[inline]
    pub fn reset_state(&mut self) {
        self.state = None;
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Wins credited to `player`.
    #[inline]
    pub fn wins(&self, player: &G::Player) -> u32 {
        self.wins_by_player.get(player).copied().unwrap_or(0)
    }

    /// Fraction of playouts won by `player`, counting draws as half a win.
    /// Returns 0.0 if never visited.
    pub fn win_rate(&self, player: &G::Player) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            (self.wins(player) as f64 + 0.5 * self.draws as f64) / self.visits as f64
        }
    }

    /// Calculate the UCB1 score of this node for `player`.
    ///
    /// UCB1 = (w + 0.5 * draws) / n + c * sqrt(ln(N_parent) / n)
    ///
    /// `parent_visits` is `None` for the root, whose score is 0. An unvisited
    /// node also scores 0; selection visits those before consulting UCB1.
    #[inline]
    pub fn ucb1(&self, player: &G::Player, parent_visits: Option<u32>, c: f64) -> f64 {
        let Some(parent_visits) = parent_visits else {
            return 0.0;
        };
        if self.visits == 0 || parent_visits == 0 {
            return 0.0;
        }
        let n = self.visits as f64;
        let exploit = (self.wins(player) as f64 + 0.5 * self.draws as f64) / n;
        let explore = c * ((parent_visits as f64).ln() / n).sqrt();
        exploit + explore
    }

    /// Check if this node has been expanded (has children).
    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Child reached by `mv`, if it has been instantiated.
    pub fn child(&self, mv: &G::Move) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(child_mv, _)| child_mv == mv)
            .map(|(_, id)| *id)
    }

    /// Get visit count distribution over children.
    /// Returns a vector of (move, visit_fraction) pairs in child order.
    pub fn visit_distribution<'a>(&'a self, arena: &[MctsNode<G>]) -> Vec<(&'a G::Move, f32)> {
        let total_visits: u32 = self
            .children
            .iter()
            .map(|(_, id)| arena[id.index()].visits)
            .sum();

        if total_visits == 0 {
            return Vec::new();
        }

        self.children
            .iter()
            .map(|(mv, id)| (mv, arena[id.index()].visits as f32 / total_visits as f32))
            .collect()
    }
}
