use std::ops::{Index, IndexMut};

use kestrel::core::masks::*;
use kestrel::{BitMove, Player};

use super::{NumStatBoard, StatBoard};

/// ButterflyBoards are 2 tables (one for each color) indexed by the move's from
/// and to squares, see <https://www.chessprogramming.org/Butterfly_Boards>
pub struct ButterflyHistory {
    a: [[i16; SQ_CNT * SQ_CNT]; PLAYER_CNT],
}

// [Us][Move], Or rather [Us][From SQ][To SQ]
#[allow(non_camel_case_types)]
type BF_idx = (Player, BitMove);

impl Index<BF_idx> for ButterflyHistory {
    type Output = i16;

    #[inline(always)]
    fn index(&self, idx: BF_idx) -> &Self::Output {
        let from_to = idx.1.from_to() as usize;
        &self.a[idx.0 as usize][from_to]
    }
}

impl IndexMut<BF_idx> for ButterflyHistory {
    #[inline(always)]
    fn index_mut(&mut self, idx: BF_idx) -> &mut Self::Output {
        let from_to = idx.1.from_to() as usize;
        &mut self.a[idx.0 as usize][from_to]
    }
}

impl ButterflyHistory {
    #[inline]
    pub fn update(&mut self, player: Player, mv: BitMove, bonus: i32) {
        <Self as NumStatBoard>::update(&mut self[(player, mv)], bonus);
    }
}

impl StatBoard<i16> for ButterflyHistory {
    const FILL: i16 = 0;
}

impl NumStatBoard for ButterflyHistory {
    const D: i32 = 7183;
}
