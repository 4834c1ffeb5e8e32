extern crate kestrel;
extern crate kestrel_engine;

use std::sync::Arc;

use kestrel::core::score::{mate_in, DRAW};
use kestrel::{Board, SQ};
use kestrel_engine::consts::to_centipawns;
use kestrel_engine::nnue::Network;
use kestrel_engine::search::{score_to_uci, SearchResult};
use kestrel_engine::threadpool::ThreadPool;
use kestrel_engine::time::uci_timer::PreLimits;

fn pool(threads: usize, hash_mb: usize) -> ThreadPool {
    ThreadPool::new(threads, hash_mb, Arc::new(Network::internal()), false).unwrap()
}

fn search_fen(pool: &mut ThreadPool, fen: &str, depth: u16) -> (Board, SearchResult) {
    let board = Board::from_fen(fen, false).unwrap();
    let result = pool.search(&board, &PreLimits::depth(depth)).unwrap();
    (board, result)
}

#[test]
fn finds_back_rank_mate() {
    let mut pool = pool(1, 16);
    let (_, result) = search_fen(&mut pool, "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", 5);
    assert_eq!(result.best_move.to_string(), "a1a8");
    assert_eq!(result.score, mate_in(1));
    assert_eq!(score_to_uci(result.score), "mate 1");
}

#[test]
fn stalemate_has_no_best_move() {
    let mut pool = pool(1, 16);
    let (board, result) = search_fen(&mut pool, "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 5);
    assert!(board.generate_moves().is_empty());
    assert!(result.best_move.is_null());
    assert_eq!(result.score, DRAW);
    assert_eq!(result.depth, 0);
}

#[test]
fn threefold_repetition_scores_zero() {
    let mut pool = pool(1, 16);
    let mut board = Board::start_pos();
    for mv in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"] {
        assert!(board.apply_uci_move(mv));
    }
    let result = pool.search(&board, &PreLimits::depth(1)).unwrap();
    assert_eq!(result.score, 0);
    assert!(board.generate_moves().contains(result.best_move));
}

#[test]
fn promotes_the_passed_pawn() {
    let mut pool = pool(1, 16);
    let (board, result) = search_fen(&mut pool, "8/8/8/8/8/8/P7/K6k w - - 0 1", 16);
    assert!(board.generate_moves().contains(result.best_move));
    assert_eq!(result.best_move.get_src(), SQ::A2);
    assert!(to_centipawns(result.score) >= 200, "score {}", result.score);
}

#[test]
fn fixed_depth_search_is_repeatable() {
    let mut pool = pool(1, 16);
    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
    pool.clear_all();
    let (_, first) = search_fen(&mut pool, fen, 8);
    pool.clear_all();
    let (_, second) = search_fen(&mut pool, fen, 8);
    assert_eq!(first.best_move, second.best_move);
    assert_eq!(first.score, second.score);
    assert_eq!(first.nodes, second.nodes);
}

#[test]
fn tiny_hash_survives_a_game() {
    let mut pool = pool(1, 1);
    let mut board = Board::start_pos();
    for _ in 0..8 {
        if board.generate_moves().is_empty() {
            break;
        }
        let result = pool.search(&board, &PreLimits::depth(7)).unwrap();
        assert!(board.generate_moves().contains(result.best_move));
        board.apply_move(result.best_move);
    }
    assert!(pool.tt().hashfull() > 0);
}

#[test]
fn node_limit_is_respected() {
    let mut pool = pool(1, 16);
    let mut limits = PreLimits::blank();
    limits.nodes = Some(20_000);
    let board = Board::start_pos();
    let result = pool.search(&board, &limits).unwrap();
    assert!(board.generate_moves().contains(result.best_move));
    // Nodes are checked in batches.
    assert!(result.nodes < 20_000 + 4096, "searched {} nodes", result.nodes);
}

#[test]
fn long_search_fills_a_tiny_table() {
    let mut pool = pool(1, 1);
    let mut limits = PreLimits::blank();
    limits.nodes = Some(2_000_000);
    let board = Board::start_pos();
    let result = pool.search(&board, &limits).unwrap();
    assert!(board.generate_moves().contains(result.best_move));
    assert_eq!(pool.tt().hashfull(), 1000);
}

#[test]
fn startpos_reaches_the_requested_depth() {
    let mut pool = pool(1, 16);
    let board = Board::start_pos();
    let result = pool.search(&board, &PreLimits::depth(10)).unwrap();
    assert_eq!(result.depth, 10);
    assert!(board.generate_moves().contains(result.best_move));
    assert_eq!(result.pv[0], result.best_move);
}
