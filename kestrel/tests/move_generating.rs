mod common;

use kestrel::core::GenTypes;
use kestrel::{BitMove, Board};

fn sorted(moves: &[BitMove]) -> Vec<u16> {
    let mut raw: Vec<u16> = moves.iter().map(|m| m.get_raw()).collect();
    raw.sort_unstable();
    raw
}

#[test]
fn captures_and_quiets_partition_legal_moves() {
    for board in common::sample_boards().iter().filter(|b| !b.in_check()) {
        let captures = board.generate_moves_of_type(GenTypes::Captures);
        let quiets = board.generate_moves_of_type(GenTypes::Quiets);

        for m in captures.iter() {
            assert!(board.is_noisy(*m), "{} in {}", m, board.fen());
        }
        for m in quiets.iter() {
            assert!(m.is_promo() || !board.is_capture(*m), "{} in {}", m, board.fen());
        }

        let mut joined = captures.vec();
        joined.extend(quiets.iter());
        assert_eq!(sorted(&joined), sorted(&board.generate_moves()));
    }
}

#[test]
fn evasions_are_all_legal_moves_in_check() {
    let mut boards = common::sample_boards();
    for fen in [
        "r1b1kb1r/pp2nppp/2pp4/4p3/7P/2Pn2P1/PPq1NPB1/RNB1K1R1 w Qkq - 4 17",
        "1kr5/pp3ppp/n7/3R4/1P5q/1P6/3Kb3/3r4 w - - 1 30",
        "4k3/8/8/8/8/8/3p4/r3K2R w K - 0 1",
    ] {
        boards.push(Board::from_fen(fen, false).unwrap());
    }
    for board in boards.iter().filter(|b| b.in_check()) {
        let evasions = board.generate_moves_of_type(GenTypes::Evasions);
        assert_eq!(sorted(&evasions), sorted(&board.generate_moves()), "{}", board.fen());
        assert!(evasions.iter().all(|m| !m.is_castle()));
    }
}

#[test]
fn pseudo_legal_filtered_is_legal() {
    for board in common::sample_boards() {
        let legal = board.generate_moves();
        let pseudo = board.generate_pseudolegal_moves();
        assert!(pseudo.len() >= legal.len());
        let filtered: Vec<BitMove> = pseudo.iter().copied().filter(|m| board.legal_move(*m)).collect();
        assert_eq!(sorted(&filtered), sorted(&legal), "{}", board.fen());
    }
}

#[test]
fn gives_check_agrees_with_apply() {
    for board in common::sample_boards() {
        let mut pos = board.clone();
        for m in board.generate_moves().iter() {
            let predicted = pos.gives_check(*m);
            let actual = pos.apply_move(*m);
            assert_eq!(predicted, actual, "{} in {}", m, board.fen());
            assert_eq!(actual, pos.in_check());
            pos.undo_move();
        }
        assert_eq!(pos, board);
    }
}

#[test]
fn mate_and_stalemate() {
    let mate = Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3", false).unwrap();
    assert!(mate.checkmate());
    assert!(mate.generate_moves().is_empty());

    let stale = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", false).unwrap();
    assert!(stale.stalemate());
    assert!(!stale.in_check());
}
