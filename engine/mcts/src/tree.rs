//! MCTS tree structure with arena allocation.
//!
//! The tree uses arena allocation for node storage. Nodes are stored in a
//! contiguous Vec and referenced by NodeId indices, so the parent links and
//! child lists never form ownership cycles.
//!
//! Positions are computed lazily: a child only knows the move that reaches it
//! and asks the game to apply that move to its parent's state the first time
//! the state is needed. In a determinized tree the root state is resampled
//! before every playout and each node on the playout path drops its cached
//! state as it is selected, so nothing computed from an earlier sample leaks
//! into the current one.

use engine_core::{Game, Outcome};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use tracing::warn;

use crate::node::{MctsNode, NodeId};
use crate::search::SearchError;

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree<G: Game> {
    /// Arena storing all nodes
    nodes: Vec<MctsNode<G>>,

    /// Root node index (always 0 after initialization)
    root: NodeId,

    /// State the tree was built from. Determinization always resamples from
    /// this snapshot, never from a previous sample.
    snapshot: G::State,

    /// Exploration constant for UCB1
    exploration: f64,
}

impl<G: Game> MctsTree<G> {
    /// Create a new tree rooted at `root_state`.
    pub fn new(root_state: G::State, determinized: bool, exploration: f64) -> Self {
        let root_node = MctsNode::new_root(root_state.clone(), determinized);
        Self {
            nodes: vec![root_node],
            root: NodeId(0),
            snapshot: root_state,
            exploration,
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode<G> {
        &self.nodes[id.index()]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode<G> {
        &mut self.nodes[id.index()]
    }

    /// Allocate a new node and return its ID.
    pub fn allocate(&mut self, node: MctsNode<G>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (should never be true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the arena slice for read access.
    #[inline]
    pub fn arena(&self) -> &[MctsNode<G>] {
        &self.nodes
    }

    /// The state the tree was built from.
    #[inline]
    pub fn snapshot(&self) -> &G::State {
        &self.snapshot
    }

    /// Whether this tree resamples hidden state before every playout.
    #[inline]
    pub fn is_determinized(&self) -> bool {
        self.get(self.root).determinized
    }

    /// Exploration constant used by `best_child`.
    #[inline]
    pub fn exploration(&self) -> f64 {
        self.exploration
    }

    /// Live state of a node, computing and caching it (and any uncached
    /// ancestors) from the nearest cached ancestor.
    pub fn state(&mut self, game: &G, id: NodeId) -> Result<&G::State, SearchError> {
        let mut pending = Vec::new();
        let mut current = id;
        while self.get(current).state.is_none() {
            pending.push(current);
            current = self.get(current).parent;
            if current.is_none() {
                return Err(SearchError::InvalidState(
                    "root node has no cached state".to_string(),
                ));
            }
        }

        // Walk back down, applying one move per ply
        for &node_id in pending.iter().rev() {
            let node = self.get(node_id);
            let mv = node.mv.as_ref().ok_or_else(|| {
                SearchError::InvalidState(format!("non-root node {} has no move", node_id.0))
            })?;
            let parent_state = self.get(node.parent).state.as_ref().ok_or_else(|| {
                SearchError::InvalidState(format!("parent of node {} has no state", node_id.0))
            })?;
            let next = game.apply_move(parent_state, mv)?;
            self.get_mut(node_id).state = Some(next);
        }

        self.get(id)
            .state
            .as_ref()
            .ok_or_else(|| SearchError::InvalidState(format!("node {} has no state", id.0)))
    }

    /// Drop a node's cached state. The root keeps its state; use
    /// `determinize` to replace it.
    pub fn reset_state(&mut self, id: NodeId) {
        let node = self.get_mut(id);
        if !node.is_root() {
            node.reset_state();
        }
    }

    /// Replace the root state with a fresh sample of the hidden information.
    pub fn determinize(&mut self, game: &G, rng: &mut ChaCha20Rng) -> Result<(), SearchError> {
        let sample = game.determine(&self.snapshot, rng)?;
        let root = self.root;
        self.get_mut(root).state = Some(sample);
        Ok(())
    }

    /// Outcome of a node's live state.
    pub fn outcome(&mut self, game: &G, id: NodeId) -> Result<Outcome<G::Player>, SearchError> {
        let state = self.state(game, id)?;
        Ok(game.outcome(state))
    }

    /// Player to move at a node.
    pub fn current_player(&mut self, game: &G, id: NodeId) -> Result<G::Player, SearchError> {
        let state = self.state(game, id)?;
        Ok(game.current_player(state))
    }

    /// Children legal in the node's live state, in the order the game lists
    /// the moves. Missing children are instantiated; children whose move is
    /// not legal in this state stay in the tree but are left out.
    ///
    /// A chance node may list the same move more than once; the returned
    /// vector repeats the child accordingly so uniform picks keep the weights.
    pub fn children(&mut self, game: &G, id: NodeId) -> Result<Vec<NodeId>, SearchError> {
        let moves = {
            let state = self.state(game, id)?;
            game.moves(state)?
        };

        self.get_mut(id).is_random = moves.random;

        let mut visible = Vec::with_capacity(moves.len());
        for mv in moves.moves {
            let child_id = match self.get(id).child(&mv) {
                Some(child_id) => child_id,
                None => self.add_child(id, mv),
            };
            visible.push(child_id);
        }
        Ok(visible)
    }

    /// Add a child to a parent node.
    /// Returns the new child's NodeId.
    pub fn add_child(&mut self, parent_id: NodeId, mv: G::Move) -> NodeId {
        let parent = self.get(parent_id);
        let child = MctsNode::new_child(parent_id, mv.clone(), parent.depth + 1, parent.determinized);
        let child_id = self.allocate(child);

        // Add to parent's children
        self.get_mut(parent_id).children.push((mv, child_id));

        child_id
    }

    /// Select the child to descend into from `id`.
    ///
    /// Chance nodes pick uniformly. Decision nodes pick uniformly among
    /// children never visited, then by highest UCB1 for the player to move,
    /// ties going to the earliest move.
    pub fn best_child(
        &mut self,
        game: &G,
        id: NodeId,
        rng: &mut ChaCha20Rng,
    ) -> Result<NodeId, SearchError> {
        let visible = self.children(game, id)?;
        self.select_among(game, id, &visible, rng)
    }

    /// Selection policy over an already computed set of visible children.
    pub(crate) fn select_among(
        &mut self,
        game: &G,
        id: NodeId,
        visible: &[NodeId],
        rng: &mut ChaCha20Rng,
    ) -> Result<NodeId, SearchError> {
        if visible.is_empty() {
            return Err(SearchError::NoChildren(id));
        }

        if self.get(id).is_random {
            return Ok(visible[rng.gen_range(0..visible.len())]);
        }

        // Visit unplayed moves first
        let unvisited: Vec<NodeId> = visible
            .iter()
            .copied()
            .filter(|&child_id| self.get(child_id).visits == 0)
            .collect();
        if !unvisited.is_empty() {
            return Ok(unvisited[rng.gen_range(0..unvisited.len())]);
        }

        let player = self.current_player(game, id)?;
        let parent_visits = self.get(id).visits;
        let c = self.exploration;

        let mut best = visible[0];
        let mut best_score = self.get(best).ucb1(&player, Some(parent_visits), c);
        for &child_id in &visible[1..] {
            let score = self.get(child_id).ucb1(&player, Some(parent_visits), c);
            if score > best_score {
                best = child_id;
                best_score = score;
            }
        }
        Ok(best)
    }

    /// UCB1 score of a node for `player`, using its parent's visit count.
    pub fn ucb1(&self, id: NodeId, player: &G::Player) -> f64 {
        let node = self.get(id);
        let parent_visits = if node.parent.is_some() {
            Some(self.get(node.parent).visits)
        } else {
            None
        };
        node.ucb1(player, parent_visits, self.exploration)
    }

    /// Most visited child of the root.
    ///
    /// With a restriction, only children whose move is in it are considered;
    /// restricted moves the tree never instantiated are added first (with
    /// zero visits). Without one, every instantiated root child competes.
    /// Ties go to the earliest candidate.
    pub fn most_visited_child(
        &mut self,
        game: &G,
        restriction: Option<&[G::Move]>,
    ) -> Result<NodeId, SearchError> {
        let root = self.root;

        let candidates: Vec<NodeId> = match restriction {
            None => {
                self.children(game, root)?;
                self.get(root).children.iter().map(|(_, id)| *id).collect()
            }
            Some(moves) => {
                let mut candidates = Vec::with_capacity(moves.len());
                for mv in moves {
                    let child_id = match self.get(root).child(mv) {
                        Some(child_id) => child_id,
                        None => {
                            warn!(?mv, "Restricted move was never expanded by the search");
                            self.add_child(root, mv.clone())
                        }
                    };
                    candidates.push(child_id);
                }
                candidates
            }
        };

        let mut best: Option<NodeId> = None;
        for child_id in candidates {
            let better = match best {
                None => true,
                Some(best_id) => self.get(child_id).visits > self.get(best_id).visits,
            };
            if better {
                best = Some(child_id);
            }
        }
        best.ok_or(SearchError::NoLegalMove)
    }

    /// Backpropagate the outcome of the terminal node `leaf_id` to the root.
    ///
    /// Every node on the path gains one visit and exactly one of: a win for
    /// the winning player, or a draw. With `track_misc`, the game's misc hook
    /// is run against each node's per-player statistics.
    pub fn backpropagate(
        &mut self,
        game: &G,
        leaf_id: NodeId,
        track_misc: bool,
    ) -> Result<Outcome<G::Player>, SearchError> {
        let (outcome, terminal_state) = {
            let state = self.state(game, leaf_id)?;
            let outcome = game.outcome(state);
            let terminal_state = if track_misc { Some(state.clone()) } else { None };
            (outcome, terminal_state)
        };

        if !outcome.is_terminal() {
            return Err(SearchError::NoWinnerAtTerminal {
                node: leaf_id,
                depth: self.get(leaf_id).depth,
            });
        }

        let mut current_id = leaf_id;
        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.visits += 1;
            match &outcome {
                Outcome::Draw => node.draws += 1,
                Outcome::Win(player) => *node.wins_by_player.entry(player.clone()).or_insert(0) += 1,
                Outcome::Ongoing => {}
            }
            if let Some(state) = &terminal_state {
                game.update_misc(state, &mut node.misc_by_player);
            }
            current_id = node.parent;
        }

        Ok(outcome)
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visits,
            root_draws: root.draws,
            max_depth: self.nodes.iter().map(|node| node.depth).max().unwrap_or(0),
        }
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_draws: u32,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{GameError, Moves};
    use rand::SeedableRng;

    /// Counter game: add 1 or 2, first to reach 4 or more wins; 3 exactly is a draw
    /// when reached by adding 2.
    #[derive(Debug)]
    struct Counter;

    impl Game for Counter {
        type State = (u8, u8);
        type Move = u8;
        type Player = u8;
        type Misc = u32;

        fn name(&self) -> &'static str {
            "counter"
        }

        fn initial_state(&self, _rng: &mut ChaCha20Rng) -> Self::State {
            (0, 1)
        }

        fn moves(&self, state: &Self::State) -> Result<Moves<u8>, GameError> {
            if self.outcome(state).is_terminal() {
                return Ok(Moves::none());
            }
            Ok(Moves::decision(vec![1, 2]))
        }

        fn apply_move(&self, state: &Self::State, mv: &u8) -> Result<Self::State, GameError> {
            if *mv == 0 || *mv > 2 {
                return Err(GameError::IllegalMove(mv.to_string()));
            }
            Ok((state.0 + mv, 3 - state.1))
        }

        fn outcome(&self, state: &Self::State) -> Outcome<u8> {
            match state.0 {
                0..=2 => Outcome::Ongoing,
                3 => Outcome::Draw,
                // The player who just moved
                _ => Outcome::Win(3 - state.1),
            }
        }

        fn current_player(&self, state: &Self::State) -> u8 {
            state.1
        }

        fn update_misc(&self, state: &Self::State, misc: &mut std::collections::HashMap<u8, u32>) {
            *misc.entry(1).or_default() += state.0 as u32;
        }
    }

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    #[test]
    fn test_new_tree() {
        let tree = MctsTree::<Counter>::new((0, 1), false, 1.0);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));
        assert!(!tree.is_determinized());

        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert_eq!(root.cached_state(), Some(&(0, 1)));
        assert_eq!(tree.snapshot(), &(0, 1));
    }

    #[test]
    fn test_children_are_lazy_and_unique() {
        let game = Counter;
        let mut tree = MctsTree::new((0, 1), false, 1.0);

        let first = tree.children(&game, tree.root()).unwrap();
        assert_eq!(first, vec![NodeId(1), NodeId(2)]);
        assert_eq!(tree.len(), 3);

        // Expanding again reuses the same nodes
        let second = tree.children(&game, tree.root()).unwrap();
        assert_eq!(first, second);
        assert_eq!(tree.len(), 3);

        let child = tree.get(NodeId(2));
        assert_eq!(child.depth, 1);
        assert_eq!(child.mv, Some(2));
        assert!(child.cached_state().is_none());
    }

    #[test]
    fn test_state_is_computed_through_ancestors() {
        let game = Counter;
        let mut tree = MctsTree::new((0, 1), false, 1.0);

        let child = tree.add_child(tree.root(), 1);
        let grandchild = tree.add_child(child, 2);

        assert_eq!(tree.state(&game, grandchild).unwrap(), &(3, 1));
        // The intermediate node was cached on the way down
        assert_eq!(tree.get(child).cached_state(), Some(&(1, 2)));
        assert_eq!(tree.get(grandchild).depth, 2);
    }

    #[test]
    fn test_reset_state_keeps_root() {
        let game = Counter;
        let mut tree = MctsTree::new((0, 1), false, 1.0);
        let child = tree.add_child(tree.root(), 1);
        tree.state(&game, child).unwrap();

        tree.reset_state(child);
        tree.reset_state(tree.root());

        assert!(tree.get(child).cached_state().is_none());
        assert!(tree.get(tree.root()).cached_state().is_some());
    }

    #[test]
    fn test_illegal_move_propagates() {
        let game = Counter;
        let mut tree = MctsTree::new((0, 1), false, 1.0);
        let bad = tree.add_child(tree.root(), 5);

        let err = tree.state(&game, bad).unwrap_err();
        assert!(matches!(err, SearchError::Game(GameError::IllegalMove(_))));
    }

    #[test]
    fn test_best_child_visits_unplayed_first() {
        let game = Counter;
        let mut tree = MctsTree::new((0, 1), false, 1.0);
        let mut rng = rng();

        let children = tree.children(&game, tree.root()).unwrap();
        tree.get_mut(children[0]).visits = 5;
        tree.get_mut(tree.root()).visits = 5;

        // The only unvisited child must be picked regardless of UCB1
        for _ in 0..10 {
            assert_eq!(tree.best_child(&game, tree.root(), &mut rng).unwrap(), children[1]);
        }
    }

    #[test]
    fn test_best_child_uses_ucb1_once_all_visited() {
        let game = Counter;
        let mut tree = MctsTree::new((0, 1), false, 1.0);
        let mut rng = rng();

        let children = tree.children(&game, tree.root()).unwrap();
        tree.get_mut(tree.root()).visits = 20;
        tree.get_mut(children[0]).visits = 10;
        tree.get_mut(children[0]).wins_by_player.insert(1, 2);
        tree.get_mut(children[1]).visits = 10;
        tree.get_mut(children[1]).wins_by_player.insert(1, 8);

        assert_eq!(tree.best_child(&game, tree.root(), &mut rng).unwrap(), children[1]);

        // Equal scores go to the first move
        tree.get_mut(children[1]).wins_by_player.insert(1, 2);
        assert_eq!(tree.best_child(&game, tree.root(), &mut rng).unwrap(), children[0]);
    }

    #[test]
    fn test_best_child_without_children_fails() {
        let game = Counter;
        let mut tree = MctsTree::new((4, 1), false, 1.0);
        let mut rng = rng();

        let err = tree.best_child(&game, tree.root(), &mut rng).unwrap_err();
        assert!(matches!(err, SearchError::NoChildren(id) if id == NodeId(0)));
    }

    #[test]
    fn test_ucb1_of_root_is_zero() {
        let mut tree = MctsTree::<Counter>::new((0, 1), false, 1.0);
        tree.get_mut(tree.root()).visits = 10;
        assert_eq!(tree.ucb1(tree.root(), &1), 0.0);
    }

    #[test]
    fn test_backpropagate() {
        let game = Counter;
        let mut tree = MctsTree::new((0, 1), false, 1.0);

        // Create a chain: root -> +2 -> +2 (player 2 reaches 4 and wins)
        let child = tree.add_child(tree.root(), 2);
        let grandchild = tree.add_child(child, 2);

        let outcome = tree.backpropagate(&game, grandchild, true).unwrap();
        assert_eq!(outcome, Outcome::Win(2));

        for id in [grandchild, child, tree.root()] {
            let node = tree.get(id);
            assert_eq!(node.visits, 1);
            assert_eq!(node.wins(&2), 1);
            assert_eq!(node.draws, 0);
            assert_eq!(node.misc_by_player.get(&1), Some(&4));
        }
    }

    #[test]
    fn test_backpropagate_draw() {
        let game = Counter;
        let mut tree = MctsTree::new((0, 1), false, 1.0);
        let child = tree.add_child(tree.root(), 1);
        let grandchild = tree.add_child(child, 2);

        tree.backpropagate(&game, grandchild, false).unwrap();

        let root = tree.get(tree.root());
        assert_eq!(root.visits, 1);
        assert_eq!(root.draws, 1);
        assert!(root.wins_by_player.is_empty());
        assert!(root.misc_by_player.is_empty());
    }

    #[test]
    fn test_backpropagate_non_terminal_fails() {
        let game = Counter;
        let mut tree = MctsTree::new((0, 1), false, 1.0);
        let child = tree.add_child(tree.root(), 1);

        let err = tree.backpropagate(&game, child, false).unwrap_err();
        assert!(matches!(err, SearchError::NoWinnerAtTerminal { depth: 1, .. }));
        assert_eq!(tree.get(tree.root()).visits, 0);
    }

    #[test]
    fn test_most_visited_child() {
        let game = Counter;
        let mut tree = MctsTree::new((0, 1), false, 1.0);
        let children = tree.children(&game, tree.root()).unwrap();
        tree.get_mut(children[0]).visits = 3;
        tree.get_mut(children[1]).visits = 7;

        assert_eq!(tree.most_visited_child(&game, None).unwrap(), children[1]);
        assert_eq!(
            tree.most_visited_child(&game, Some(&[1])).unwrap(),
            children[0]
        );
    }

    #[test]
    fn test_most_visited_child_adds_missing_restricted_move() {
        let game = Counter;
        let mut tree = MctsTree::new((0, 1), false, 1.0);

        let id = tree.most_visited_child(&game, Some(&[2])).unwrap();
        assert_eq!(tree.get(id).mv, Some(2));
        assert_eq!(tree.get(id).visits, 0);
        assert_eq!(tree.get(tree.root()).children.len(), 1);
    }

    #[test]
    fn test_most_visited_child_empty_restriction_fails() {
        let game = Counter;
        let mut tree = MctsTree::new((0, 1), false, 1.0);
        let err = tree.most_visited_child(&game, Some(&[])).unwrap_err();
        assert!(matches!(err, SearchError::NoLegalMove));

        let mut terminal = MctsTree::new((4, 1), false, 1.0);
        let err = terminal.most_visited_child(&game, None).unwrap_err();
        assert!(matches!(err, SearchError::NoLegalMove));
    }

    #[test]
    fn test_tree_stats() {
        let game = Counter;
        let mut tree = MctsTree::new((0, 1), false, 1.0);
        let children = tree.children(&game, tree.root()).unwrap();
        tree.children(&game, children[0]).unwrap();

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 5);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.root_visits, 0);
    }
}
