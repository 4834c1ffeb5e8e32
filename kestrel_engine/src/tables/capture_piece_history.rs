use std::ops::{Index, IndexMut};

use kestrel::core::masks::*;
use kestrel::{Piece, PieceType, SQ};

use super::{NumStatBoard, StatBoard};

/// CapturePieceToBoards are addressed by a move's
/// [moved piece][to][captured piecetype] information.
pub struct CapturePieceToHistory {
    a: [[[i16; PIECE_TYPE_CNT]; SQ_CNT]; PIECE_CNT],
}

// [moved piece][to square][captured piecetype]
#[allow(non_camel_case_types)]
type CP_idx = (Piece, SQ, PieceType);

impl Index<CP_idx> for CapturePieceToHistory {
    type Output = i16;

    #[inline(always)]
    fn index(&self, idx: CP_idx) -> &Self::Output {
        &self.a[idx.0 as usize][(idx.1).0 as usize][idx.2 as usize]
    }
}

impl IndexMut<CP_idx> for CapturePieceToHistory {
    #[inline(always)]
    fn index_mut(&mut self, idx: CP_idx) -> &mut Self::Output {
        &mut self.a[idx.0 as usize][(idx.1).0 as usize][idx.2 as usize]
    }
}

impl CapturePieceToHistory {
    #[inline]
    pub fn update(&mut self, piece: Piece, to: SQ, captured: PieceType, bonus: i32) {
        <Self as NumStatBoard>::update(&mut self[(piece, to, captured)], bonus);
    }
}

impl StatBoard<i16> for CapturePieceToHistory {
    const FILL: i16 = 0;
}

impl NumStatBoard for CapturePieceToHistory {
    const D: i32 = 10692;
}
