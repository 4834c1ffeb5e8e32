use kestrel::core::score::{PAWN, QUEEN};
use kestrel::{BitMove, Board, SQ};

fn board(fen: &str) -> Board {
    Board::from_fen(fen, false).unwrap()
}

#[test]
fn undefended_pawn() {
    let b = board("4k3/8/8/3p4/8/8/8/3QK3 w - - 0 1");
    let qxd5 = BitMove::make(SQ::D1, SQ::D5);
    assert!(b.see_ge(qxd5, PAWN));
    assert!(!b.see_ge(qxd5, PAWN + 1));
}

#[test]
fn queen_lost_to_pawn() {
    let b = board("4k3/8/4p3/3p4/8/8/8/3QK3 w - - 0 1");
    let qxd5 = BitMove::make(SQ::D1, SQ::D5);
    assert!(b.see_ge(qxd5, PAWN - QUEEN));
    assert!(!b.see_ge(qxd5, PAWN - QUEEN + 1));
    assert!(!b.see_ge(qxd5, 0));
}

#[test]
fn pinned_defender_does_not_recapture() {
    let b = board("4k3/8/2p5/3p4/B3P3/8/8/4K3 w - - 0 1");
    let exd5 = BitMove::make(SQ::E4, SQ::D5);
    assert!(b.see_ge(exd5, PAWN));

    // Without the pin the pawn is traded.
    let b = board("4k3/8/2p5/3p4/4P3/8/8/4K3 w - - 0 1");
    assert!(b.see_ge(exd5, 0));
    assert!(!b.see_ge(exd5, 1));
}

#[test]
fn quiet_moves_to_attacked_squares() {
    let b = board("4k3/8/8/4p3/8/8/8/3QK3 w - - 0 1");
    // The queen steps onto a square the pawn attacks.
    let qd4 = BitMove::make(SQ::D1, SQ::D4);
    assert!(!b.see_ge(qd4, 0));
    assert!(b.see_ge(BitMove::make(SQ::D1, SQ::D2), 0));
}
