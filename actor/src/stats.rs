//! Self-play statistics.
//!
//! Per-episode records are folded into a [`RunStats`] that logs progress and
//! a final summary through `tracing`.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::info;

/// What happened in one complete game.
#[derive(Debug, Clone, Default)]
pub struct EpisodeRecord {
    /// Winning player or team, formatted for display; `None` for a draw
    pub winner: Option<String>,
    /// Moves played, chance events included
    pub plies: u32,
    /// Searches run (one per decision)
    pub searches: u32,
    /// Sum of each search's mean playout depth
    pub depth_sum: f64,
    /// Playouts dropped for impossible determinizations
    pub discarded: u32,
    pub elapsed: Duration,
}

impl EpisodeRecord {
    /// Mean search depth over this episode's searches.
    pub fn mean_depth(&self) -> f64 {
        if self.searches == 0 {
            0.0
        } else {
            self.depth_sum / self.searches as f64
        }
    }
}

/// Aggregated statistics over a run.
#[derive(Debug)]
pub struct RunStats {
    env_id: String,
    episodes: u32,
    wins: BTreeMap<String, u32>,
    draws: u32,
    total_plies: u64,
    searches: u64,
    depth_sum: f64,
    discarded: u64,
    start_time: Instant,
}

impl RunStats {
    pub fn new(env_id: &str) -> Self {
        Self {
            env_id: env_id.to_string(),
            episodes: 0,
            wins: BTreeMap::new(),
            draws: 0,
            total_plies: 0,
            searches: 0,
            depth_sum: 0.0,
            discarded: 0,
            start_time: Instant::now(),
        }
    }

    /// Record a completed episode.
    pub fn record(&mut self, episode: &EpisodeRecord) {
        self.episodes += 1;
        match &episode.winner {
            Some(winner) => *self.wins.entry(winner.clone()).or_insert(0) += 1,
            None => self.draws += 1,
        }
        self.total_plies += episode.plies as u64;
        self.searches += episode.searches as u64;
        self.depth_sum += episode.depth_sum;
        self.discarded += episode.discarded as u64;
    }

    pub fn episodes(&self) -> u32 {
        self.episodes
    }

    /// Games won by `winner` (as formatted in [`EpisodeRecord::winner`]).
    #[allow(dead_code)]
    pub fn wins(&self, winner: &str) -> u32 {
        self.wins.get(winner).copied().unwrap_or(0)
    }

    pub fn draws(&self) -> u32 {
        self.draws
    }

    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    pub fn avg_plies(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.total_plies as f64 / self.episodes as f64
        }
    }

    /// Mean playout depth over every search in the run.
    pub fn avg_search_depth(&self) -> f64 {
        if self.searches == 0 {
            0.0
        } else {
            self.depth_sum / self.searches as f64
        }
    }

    pub fn episodes_per_second(&self) -> f64 {
        let runtime = self.start_time.elapsed().as_secs_f64();
        if runtime > 0.0 {
            self.episodes as f64 / runtime
        } else {
            0.0
        }
    }

    fn wins_summary(&self) -> String {
        self.wins
            .iter()
            .map(|(winner, count)| format!("{winner}={count}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn log_progress(&self) {
        info!(
            env_id = %self.env_id,
            episodes = self.episodes,
            wins = %self.wins_summary(),
            draws = self.draws(),
            avg_plies = %format!("{:.1}", self.avg_plies()),
            "Progress"
        );
    }

    pub fn log_summary(&self) {
        info!(
            env_id = %self.env_id,
            episodes = self.episodes,
            wins = %self.wins_summary(),
            draws = self.draws(),
            avg_plies = %format!("{:.1}", self.avg_plies()),
            avg_search_depth = %format!("{:.2}", self.avg_search_depth()),
            discarded = self.discarded(),
            episodes_per_sec = %format!("{:.2}", self.episodes_per_second()),
            runtime_secs = %format!("{:.1}", self.start_time.elapsed().as_secs_f64()),
            "Run complete"
        );
    }
}
