//! MCTS benchmarks for performance profiling.
//!
//! Run with: `cargo bench -p mcts`
//!
//! These benchmarks measure:
//! - Full search with varying iteration counts
//! - Search from different game phases (opening, midgame, near-terminal)
//! - Game comparison (TicTacToe vs Connect4 vs determinized Euchre)
//! - Tree operations (expansion, selection, backpropagation)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use engine_core::game_utils::play_moves;
use engine_core::Game;
use games_connect4::Connect4;
use games_euchre::{parse_cards, Euchre, EuchreState};
use games_tictactoe::TicTacToe;
use mcts::{run_mcts, MctsConfig, MctsTree};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Position after playing `moves` from the start.
fn position<G: Game>(game: &G, moves: &[G::Move]) -> G::State {
    let mut rng = ChaCha20Rng::seed_from_u64(42);
    let start = game.initial_state(&mut rng);
    play_moves(game, &start, moves).unwrap()
}

// =============================================================================
// Full MCTS Search Benchmarks
// =============================================================================

fn bench_mcts_search_iterations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_search_iterations");
    let game = TicTacToe;
    let state = position(&game, &[]);

    for iterations in [50, 100, 200, 400, 800, 1600] {
        group.throughput(Throughput::Elements(iterations as u64));
        group.bench_with_input(
            BenchmarkId::new("tictactoe", iterations),
            &iterations,
            |b, &iterations| {
                let config = MctsConfig::default().with_iterations(iterations);
                b.iter(|| {
                    let mut rng = ChaCha20Rng::seed_from_u64(42);
                    black_box(run_mcts(&game, config.clone(), &state, None, &mut rng).unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_game_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_game_comparison");
    let iterations = 200u32;
    let config = MctsConfig::default().with_iterations(iterations);
    group.throughput(Throughput::Elements(iterations as u64));

    group.bench_function("tictactoe", |b| {
        let game = TicTacToe;
        let state = position(&game, &[]);
        b.iter(|| {
            let mut rng = ChaCha20Rng::seed_from_u64(42);
            black_box(run_mcts(&game, config.clone(), &state, None, &mut rng).unwrap())
        });
    });

    group.bench_function("connect4", |b| {
        let game = Connect4;
        let state = position(&game, &[]);
        b.iter(|| {
            let mut rng = ChaCha20Rng::seed_from_u64(42);
            black_box(run_mcts(&game, config.clone(), &state, None, &mut rng).unwrap())
        });
    });

    // Every playout resamples the three hidden hands
    group.bench_function("euchre_determinized", |b| {
        let game = Euchre;
        let hand = parse_cards("0d 0h as ac ah").unwrap();
        let state = EuchreState::from_visible_hand(&hand, "jd".parse().unwrap()).unwrap();
        b.iter(|| {
            let mut rng = ChaCha20Rng::seed_from_u64(42);
            black_box(
                run_mcts(&game, config.clone(), &state, Some(hand.as_slice()), &mut rng).unwrap(),
            )
        });
    });

    group.finish();
}

fn bench_mcts_game_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_game_phases");
    let game = TicTacToe;
    let config = MctsConfig::default().with_iterations(200);

    // Board: X at 4, O at 0, X at 2, O at 6
    let phases: [(&str, &[u8]); 3] = [
        ("opening", &[]),
        ("midgame", &[4, 0, 2, 6]),
        ("near_terminal", &[0, 3, 1, 4]),
    ];

    for (name, moves) in phases {
        let state = position(&game, moves);
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut rng = ChaCha20Rng::seed_from_u64(42);
                black_box(run_mcts(&game, config.clone(), &state, None, &mut rng).unwrap())
            });
        });
    }

    group.finish();
}

// =============================================================================
// Tree Operation Benchmarks
// =============================================================================

fn bench_tree_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_tree_ops");
    let game = Connect4;
    let start = position(&game, &[]);

    // Expansion computes each child's state lazily, so this is allocation only
    group.bench_function("expand_root", |b| {
        b.iter(|| {
            let mut tree = MctsTree::new(start.clone(), false, mcts::DEFAULT_EXPLORATION);
            black_box(tree.children(&game, tree.root()).unwrap())
        });
    });

    group.bench_function("best_child_ucb1", |b| {
        let mut tree = MctsTree::new(start.clone(), false, mcts::DEFAULT_EXPLORATION);
        let children = tree.children(&game, tree.root()).unwrap();
        for (i, &child_id) in children.iter().enumerate() {
            let child = tree.get_mut(child_id);
            child.visits = (i as u32 + 1) * 10;
            child.wins_by_player.insert(1, i as u32 * 4);
        }
        tree.get_mut(tree.root()).visits = 280;
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        b.iter(|| black_box(tree.best_child(&game, tree.root(), &mut rng).unwrap()));
    });

    group.bench_function("backpropagate_depth_7", |b| {
        b.iter_batched(
            || {
                // Player 1 stacks column 0 while player 2 plays column 1
                let mut tree = MctsTree::new(start.clone(), false, mcts::DEFAULT_EXPLORATION);
                let mut parent = tree.root();
                for mv in [0u8, 1, 0, 1, 0, 1, 0] {
                    parent = tree.add_child(parent, mv);
                }
                (tree, parent)
            },
            |(mut tree, leaf)| {
                tree.backpropagate(&game, leaf, false).unwrap();
                black_box(tree)
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_mcts_search_iterations,
    bench_game_comparison,
    bench_mcts_game_phases,
    bench_tree_operations,
);

criterion_main!(benches);
