mod common;

use kestrel::board::fen::BENCH_FENS;
use kestrel::{BitMove, Board};

fn pseudolegal_correctness(board: &Board) {
    let pseudo_moves = board.generate_pseudolegal_moves();
    let legal_moves = board.generate_moves();
    for x in 0..=u16::MAX {
        let bit_move = BitMove::new(x);
        if board.pseudo_legal_move(bit_move) {
            assert!(
                pseudo_moves.contains(bit_move),
                "{:?} accepted as pseudo-legal in {}",
                bit_move,
                board.fen()
            );
            assert_eq!(
                board.legal_move(bit_move),
                legal_moves.contains(bit_move),
                "{:?} in {}",
                bit_move,
                board.fen()
            );
        } else {
            assert!(
                !legal_moves.contains(bit_move),
                "{:?} rejected but legal in {}",
                bit_move,
                board.fen()
            );
        }
    }
}

#[test]
fn pseudolegal_bench_fens() {
    for fen in BENCH_FENS.iter() {
        pseudolegal_correctness(&Board::from_fen(fen, false).unwrap());
    }
}

#[test]
fn pseudolegal_random_games() {
    for board in common::random_walk(3, 40).iter().step_by(4) {
        pseudolegal_correctness(board);
    }
}

#[test]
fn pseudolegal_in_check() {
    let boards = [
        "r1b1kb1r/pp2nppp/2pp4/4p3/7P/2Pn2P1/PPq1NPB1/RNB1K1R1 w Qkq - 4 17",
        "1kr5/pp3ppp/n7/3R4/1P5q/1P6/3Kb3/3r4 w - - 1 30",
    ];
    for fen in boards.iter() {
        let board = Board::from_fen(fen, false).unwrap();
        assert!(board.in_check());
        pseudolegal_correctness(&board);
    }
}
