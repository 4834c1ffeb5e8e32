//! Static evaluation correction, learned from the difference between the search result and
//! the raw evaluation of positions sharing the same pawn structure, material or placement
//! of non-pawn pieces.

use kestrel::core::masks::PLAYER_CNT;
use kestrel::{Board, Player};

use super::{NumStatBoard, StatBoard};

pub const CORRECTION_SIZE: usize = 16384;
/// Corrections are weighted in 1/256ths.
pub const CORRECTION_GRAIN: i32 = 256;
/// Largest single update applied to an entry.
pub const CORRECTION_MAX_BONUS: i32 = CorrectionHistory::D / 4;

/// Relative weights of each correction source, in 1/256ths.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CorrectionWeights {
    pub pawn: i32,
    pub material: i32,
    pub non_pawn: i32,
}

pub struct CorrectionHistory {
    pawn: [[i16; CORRECTION_SIZE]; PLAYER_CNT],
    material: [[i16; CORRECTION_SIZE]; PLAYER_CNT],
    // [side to move][piece color]
    non_pawn: [[[i16; CORRECTION_SIZE]; PLAYER_CNT]; PLAYER_CNT],
}

#[inline(always)]
fn slot(key: u64) -> usize {
    (key as usize) & (CORRECTION_SIZE - 1)
}

impl CorrectionHistory {
    /// The correction to add to the raw evaluation of a board.
    pub fn correction(&self, board: &Board, w: &CorrectionWeights) -> i32 {
        let us = board.turn() as usize;
        let pawn = self.pawn[us][slot(board.pawn_key())] as i32;
        let material = self.material[us][slot(board.material_key())] as i32;
        let non_pawn = self.non_pawn[us][Player::White as usize]
            [slot(board.non_pawn_key(Player::White))] as i32
            + self.non_pawn[us][Player::Black as usize][slot(board.non_pawn_key(Player::Black))]
                as i32;
        (pawn * w.pawn + material * w.material + non_pawn * w.non_pawn) / CORRECTION_GRAIN
    }

    /// Moves every entry of the board towards `bonus`, already clamped by the caller.
    pub fn update(&mut self, board: &Board, bonus: i32) {
        let us = board.turn() as usize;
        let bonus = bonus.clamp(-CORRECTION_MAX_BONUS, CORRECTION_MAX_BONUS);
        <Self as NumStatBoard>::update(&mut self.pawn[us][slot(board.pawn_key())], bonus);
        <Self as NumStatBoard>::update(
            &mut self.material[us][slot(board.material_key())],
            bonus,
        );
        for p in [Player::White, Player::Black] {
            <Self as NumStatBoard>::update(
                &mut self.non_pawn[us][p as usize][slot(board.non_pawn_key(p))],
                bonus,
            );
        }
    }
}

impl StatBoard<i16> for CorrectionHistory {
    const FILL: i16 = 0;
}

impl NumStatBoard for CorrectionHistory {
    const D: i32 = 1024;
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEIGHTS: CorrectionWeights = CorrectionWeights {
        pawn: 96,
        material: 64,
        non_pawn: 48,
    };

    #[test]
    fn learns_towards_the_error() {
        let mut ch = CorrectionHistory::new_boxed();
        let board = Board::start_pos();
        assert_eq!(ch.correction(&board, &WEIGHTS), 0);
        for _ in 0..200 {
            ch.update(&board, 100);
        }
        let c = ch.correction(&board, &WEIGHTS);
        assert!(c > 0);
        // Positions with another side to move use their own entries.
        let other = Board::from_fen(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1",
            false,
        )
        .unwrap();
        assert_eq!(ch.correction(&other, &WEIGHTS), 0);
        ch.clear();
        assert_eq!(ch.correction(&board, &WEIGHTS), 0);
    }
}
