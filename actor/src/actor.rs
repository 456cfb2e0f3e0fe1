//! Self-play episodes driven by the MCTS engine

use anyhow::{anyhow, Context, Result};
use engine_core::Game;
use engine_games::{Connect4, Euchre, GameKind, TicTacToe};
use mcts::{run_mcts, MctsConfig};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::time::Instant;
use tracing::{debug, info, trace};

use crate::config::Config;
use crate::stats::{EpisodeRecord, RunStats};

pub struct Actor {
    config: Config,
    rng: ChaCha20Rng,
}

impl Actor {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let rng = ChaCha20Rng::seed_from_u64(config.seed);
        Ok(Self { config, rng })
    }

    /// Play the configured number of episodes.
    pub fn run(&mut self) -> Result<RunStats> {
        match self.config.game_kind()? {
            GameKind::TicTacToe => self.run_game(&TicTacToe),
            GameKind::Connect4 => self.run_game(&Connect4),
            GameKind::Euchre => self.run_game(&Euchre),
        }
    }

    fn run_game<G: Game>(&mut self, game: &G) -> Result<RunStats> {
        let mcts_config = self.config.mcts_config();
        let mut stats = RunStats::new(game.name());

        info!(
            game = game.name(),
            determinize = game.capabilities().determinize,
            "Running self-play"
        );

        for episode in 1..=self.config.episodes {
            let record = play_episode(game, &mcts_config, &mut self.rng)
                .with_context(|| format!("episode {episode} of {} failed", game.name()))?;

            debug!(
                episode,
                winner = record.winner.as_deref().unwrap_or("draw"),
                plies = record.plies,
                mean_depth = %format!("{:.2}", record.mean_depth()),
                discarded = record.discarded,
                elapsed_ms = record.elapsed.as_millis() as u64,
                "Episode completed"
            );
            stats.record(&record);

            if self.config.log_interval > 0 && episode % self.config.log_interval == 0 {
                stats.log_progress();
            }
        }

        stats.log_summary();
        Ok(stats)
    }
}

/// Play one game to the end with an MCTS agent in every seat.
///
/// Each decision searches from the acting player's view of the position.
/// When the game resamples hidden state, the moves legal in the real
/// position restrict the search's choice. Chance events are sampled
/// uniformly.
pub fn play_episode<G: Game>(
    game: &G,
    config: &MctsConfig,
    rng: &mut ChaCha20Rng,
) -> Result<EpisodeRecord> {
    let start = Instant::now();
    let determinize = game.capabilities().determinize;
    let mut state = game.initial_state(rng);
    let mut record = EpisodeRecord::default();

    loop {
        let outcome = game.outcome(&state);
        if outcome.is_terminal() {
            record.winner = outcome.winner().map(|player| format!("{player:?}"));
            break;
        }

        let legal = game.moves(&state)?;
        let mv = if legal.random {
            legal
                .moves
                .choose(rng)
                .cloned()
                .ok_or_else(|| anyhow!("{} has an empty chance event", game.name()))?
        } else {
            if legal.is_empty() {
                return Err(anyhow!(
                    "{} has no moves in an unfinished game",
                    game.name()
                ));
            }
            let view = game.redact(&state);
            let restriction = determinize.then_some(legal.moves.as_slice());
            let result = run_mcts(game, config.clone(), &view, restriction, rng)?;

            record.searches += 1;
            record.depth_sum += result.avg_depth;
            record.discarded += result.stats.discarded;
            if !legal.contains(&result.best_move) {
                return Err(anyhow!(
                    "search chose {:?}, which is not legal in the real position",
                    result.best_move
                ));
            }
            trace!(
                ply = record.plies,
                mv = ?result.best_move,
                iterations = result.stats.iterations,
                tree_nodes = result.tree.len(),
                "Move chosen"
            );
            result.best_move
        };

        state = game.apply_move(&state, &mv)?;
        record.plies += 1;
    }

    record.elapsed = start.elapsed();
    Ok(record)
}
