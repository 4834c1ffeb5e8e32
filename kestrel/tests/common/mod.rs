//! Shared helpers for the integration tests.

#![allow(dead_code)]

use kestrel::board::fen::BENCH_FENS;
use kestrel::Board;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Plays random legal moves from the start position, collecting every position reached.
pub fn random_walk(seed: u64, plies: usize) -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut board = Board::start_pos();
    let mut boards = Vec::with_capacity(plies);
    for _ in 0..plies {
        let moves = board.generate_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.gen_range(0..moves.len())];
        board.apply_move(mv);
        boards.push(board.clone());
    }
    boards
}

/// A few random games mixed with the benchmark positions.
pub fn sample_boards() -> Vec<Board> {
    let mut boards: Vec<Board> = BENCH_FENS
        .iter()
        .map(|fen| Board::from_fen(fen, false).unwrap())
        .collect();
    for seed in 0..6 {
        boards.extend(random_walk(seed, 80));
    }
    boards
}
