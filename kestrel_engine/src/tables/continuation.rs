use std::ops::{Index, IndexMut};

use kestrel::core::masks::*;
use kestrel::{Piece, SQ};

use super::{NumStatBoard, StatBoard};

/// PieceToBoards are addressed by a move's [piece][to] information.
pub struct PieceToHistory {
    a: [[i16; SQ_CNT]; PIECE_CNT + 1],
}

impl Index<(Piece, SQ)> for PieceToHistory {
    type Output = i16;

    #[inline(always)]
    fn index(&self, idx: (Piece, SQ)) -> &Self::Output {
        &self.a[idx.0 as usize][(idx.1).0 as usize]
    }
}

impl IndexMut<(Piece, SQ)> for PieceToHistory {
    #[inline(always)]
    fn index_mut(&mut self, idx: (Piece, SQ)) -> &mut Self::Output {
        &mut self.a[idx.0 as usize][(idx.1).0 as usize]
    }
}

impl PieceToHistory {
    #[inline]
    pub fn update(&mut self, piece: Piece, to: SQ, bonus: i32) {
        <Self as NumStatBoard>::update(&mut self[(piece, to)], bonus);
    }
}

impl StatBoard<i16> for PieceToHistory {
    const FILL: i16 = 0;
}

impl NumStatBoard for PieceToHistory {
    const D: i32 = 29952;
}

/// Selects the `PieceToHistory` following a move: whether the side that made it was in check,
/// whether it captured, and its piece and destination. `ContKey::NONE` stands for a null move
/// or a ply before the root.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ContKey {
    pub in_check: bool,
    pub capture: bool,
    pub piece: Piece,
    pub to: SQ,
}

impl ContKey {
    pub const NONE: ContKey = ContKey {
        in_check: false,
        capture: false,
        piece: Piece::None,
        to: SQ(0),
    };

    #[inline(always)]
    pub fn new(in_check: bool, capture: bool, piece: Piece, to: SQ) -> ContKey {
        ContKey {
            in_check,
            capture,
            piece,
            to,
        }
    }
}

/// ContinuationHistory is the history of a given pair of moves, usually the
/// current one given a previous one. History table is based on PieceToBoards
/// instead of ButterflyBoards.
pub struct ContinuationHistory {
    a: [[[[PieceToHistory; SQ_CNT]; PIECE_CNT + 1]; 2]; 2],
}

impl Index<ContKey> for ContinuationHistory {
    type Output = PieceToHistory;

    #[inline(always)]
    fn index(&self, k: ContKey) -> &Self::Output {
        &self.a[k.in_check as usize][k.capture as usize][k.piece as usize][k.to.0 as usize]
    }
}

impl IndexMut<ContKey> for ContinuationHistory {
    #[inline(always)]
    fn index_mut(&mut self, k: ContKey) -> &mut Self::Output {
        &mut self.a[k.in_check as usize][k.capture as usize][k.piece as usize][k.to.0 as usize]
    }
}

impl StatBoard<i16> for ContinuationHistory {
    const FILL: i16 = 0;
}

impl ContinuationHistory {
    /// Fills every entry with a small negative value, the usual starting point for
    /// continuation histories, so untried follow-ups rank below proven ones.
    pub fn reset(&mut self) {
        self.fill(-71);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_select_distinct_tables() {
        let mut ch = ContinuationHistory::new_boxed();
        let k1 = ContKey::new(false, false, Piece::WhiteKnight, SQ::F3);
        let k2 = ContKey::new(true, false, Piece::WhiteKnight, SQ::F3);
        ch[k1].update(Piece::BlackPawn, SQ::E5, 1000);
        assert!(ch[k1][(Piece::BlackPawn, SQ::E5)] > 0);
        assert_eq!(ch[k2][(Piece::BlackPawn, SQ::E5)], 0);
        assert_eq!(ch[ContKey::NONE][(Piece::BlackPawn, SQ::E5)], 0);
        ch.reset();
        assert_eq!(ch[k1][(Piece::BlackPawn, SQ::E5)], -71);
    }
}
