//! MCTS configuration parameters.

use std::time::Duration;

/// Default UCB1 exploration constant, sqrt(2).
pub const DEFAULT_EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Number of completed playouts per search.
    /// Ignored when `time_budget` is set.
    pub num_iterations: u32,

    /// Exploration constant `C` in the UCB1 formula.
    /// Higher values encourage exploration, lower values favor exploitation.
    pub exploration: f64,

    /// Wall-clock budget for one search. When set, playouts continue until
    /// the budget is spent; the check happens between playouts, so a playout
    /// in progress always completes.
    pub time_budget: Option<Duration>,

    /// Keep a record of every terminal state reached.
    pub collect_leaf_nodes: bool,

    /// Consecutive impossible determinizations tolerated before the search
    /// gives up with `SearchError::DeterminizationExhausted`.
    pub max_discarded_iterations: u32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_iterations: 1000,
            exploration: DEFAULT_EXPLORATION,
            time_budget: None,
            collect_leaf_nodes: false,
            max_discarded_iterations: 10_000,
        }
    }
}

impl MctsConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_iterations: 100,
            ..Self::default()
        }
    }

    /// Builder pattern: set number of iterations.
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.num_iterations = n;
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: run until `budget` has elapsed instead of a fixed count.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Builder pattern: collect terminal states reached by each playout.
    pub fn with_leaf_nodes(mut self, collect: bool) -> Self {
        self.collect_leaf_nodes = collect;
        self
    }

    /// Builder pattern: set the consecutive discard limit.
    pub fn with_max_discarded(mut self, n: u32) -> Self {
        self.max_discarded_iterations = n;
        self
    }
}
