use kestrel::board::perft::{perft, perft_all};
use kestrel::Board;

fn check(fen: &str, chess960: bool, counts: &[u64]) {
    let board = Board::from_fen(fen, chess960).unwrap();
    for (i, expected) in counts.iter().enumerate() {
        assert_eq!(perft(&board, i as u16 + 1), *expected, "depth {} of {}", i + 1, fen);
    }
}

#[test]
fn perft_position_3() {
    check("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", false, &[14, 191, 2812, 43238]);
}

#[test]
fn perft_position_4() {
    check(
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        false,
        &[6, 264, 9467],
    );
    // Mirrored, black to move.
    check(
        "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1",
        false,
        &[6, 264, 9467],
    );
}

#[test]
fn perft_position_5() {
    check("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8", false, &[44, 1486, 62379]);
}

#[test]
fn perft_position_6() {
    check(
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        false,
        &[46, 2079, 89890],
    );
}

#[test]
fn perft_chess960() {
    check("bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w HFhf - 2 9", true, &[21, 528, 12189]);
}

#[test]
fn perft_start_position_details() {
    let b = Board::start_pos();
    let nodes = perft_all(&b, 3);
    assert_eq!(nodes.nodes, 8902);
    assert_eq!(nodes.captures, 34);
    assert_eq!(nodes.checks, 12);
    assert_eq!(nodes.checkmates, 0);
}
