use kestrel::core::masks::*;
use kestrel::{BitMove, Piece, SQ};
use std::ops::{Index, IndexMut};

use super::StatBoard;

/// CounterMoveHistory stores counter moves indexed by [piece][to] of the previous
/// move. `Piece::None` has its own row, used after a null move.
pub struct CounterMoveHistory {
    a: [[BitMove; SQ_CNT]; PIECE_CNT + 1],
}

// [Piece][To SQ]
#[allow(non_camel_case_types)]
type CM_idx = (Piece, SQ);

impl Index<CM_idx> for CounterMoveHistory {
    type Output = BitMove;

    #[inline(always)]
    fn index(&self, idx: CM_idx) -> &Self::Output {
        &self.a[idx.0 as usize][(idx.1).0 as usize]
    }
}

impl IndexMut<CM_idx> for CounterMoveHistory {
    #[inline(always)]
    fn index_mut(&mut self, idx: CM_idx) -> &mut Self::Output {
        &mut self.a[idx.0 as usize][(idx.1).0 as usize]
    }
}

impl StatBoard<BitMove> for CounterMoveHistory {
    const FILL: BitMove = BitMove::null();
}
