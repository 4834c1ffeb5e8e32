//! Non-sliding lookup tables: knight, king and pawn attacks, distances, and the line /
//! between bitboards for every pair of squares.

use super::magic::{bishop_attacks, rook_attacks};
use crate::core::masks::*;

pub struct Boards {
    pub knight: [u64; SQ_CNT],
    pub king: [u64; SQ_CNT],
    pub pawn_attacks: [[u64; SQ_CNT]; PLAYER_CNT],
    pub distance: [[u8; SQ_CNT]; SQ_CNT],
    pub line: Vec<[u64; SQ_CNT]>,
    pub between: Vec<[u64; SQ_CNT]>,
}

lazy_static! {
    pub static ref BOARDS: Boards = Boards::generate();
}

const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_STEPS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

fn step_mask(sq: usize, steps: &[(i8, i8)]) -> u64 {
    let file = (sq % 8) as i8;
    let rank = (sq / 8) as i8;
    steps
        .iter()
        .map(|&(df, dr)| (file + df, rank + dr))
        .filter(|&(f, r)| (0..8).contains(&f) && (0..8).contains(&r))
        .fold(0u64, |acc, (f, r)| acc | 1u64 << (r * 8 + f))
}

impl Boards {
    #[cold]
    fn generate() -> Boards {
        let mut boards = Boards {
            knight: [0; SQ_CNT],
            king: [0; SQ_CNT],
            pawn_attacks: [[0; SQ_CNT]; PLAYER_CNT],
            distance: [[0; SQ_CNT]; SQ_CNT],
            line: vec![[0; SQ_CNT]; SQ_CNT],
            between: vec![[0; SQ_CNT]; SQ_CNT],
        };

        for s in 0..SQ_CNT {
            boards.knight[s] = step_mask(s, &KNIGHT_STEPS);
            boards.king[s] = step_mask(s, &KING_STEPS);
            boards.pawn_attacks[0][s] = step_mask(s, &[(-1, 1), (1, 1)]);
            boards.pawn_attacks[1][s] = step_mask(s, &[(-1, -1), (1, -1)]);
        }

        for i in 0..64u8 {
            for j in 0..64u8 {
                let (iu, ju) = (i as usize, j as usize);
                let fd = (i & 7).abs_diff(j & 7);
                let rd = (i >> 3).abs_diff(j >> 3);
                boards.distance[iu][ju] = fd.max(rd);

                if i == j {
                    continue;
                }
                let i_bb: u64 = 1u64 << i;
                let j_bb: u64 = 1u64 << j;
                if rook_attacks(0, i) & j_bb != 0 {
                    boards.line[iu][ju] = (rook_attacks(0, i) & rook_attacks(0, j)) | i_bb | j_bb;
                    boards.between[iu][ju] = rook_attacks(j_bb, i) & rook_attacks(i_bb, j);
                } else if bishop_attacks(0, i) & j_bb != 0 {
                    boards.line[iu][ju] =
                        (bishop_attacks(0, i) & bishop_attacks(0, j)) | i_bb | j_bb;
                    boards.between[iu][ju] = bishop_attacks(j_bb, i) & bishop_attacks(i_bb, j);
                }
            }
        }
        boards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_and_king_counts() {
        assert_eq!(BOARDS.knight[0].count_ones(), 2);
        assert_eq!(BOARDS.knight[27].count_ones(), 8);
        assert_eq!(BOARDS.king[0].count_ones(), 3);
        assert_eq!(BOARDS.king[27].count_ones(), 8);
    }

    #[test]
    fn between_and_line() {
        // a1 .. h8 diagonal
        assert_eq!(BOARDS.between[0][63].count_ones(), 6);
        assert_eq!(BOARDS.line[0][63].count_ones(), 8);
        // a1, b3 are not aligned
        assert_eq!(BOARDS.line[0][17], 0);
        assert_eq!(BOARDS.between[0][17], 0);
        // adjacent squares have nothing between them
        assert_eq!(BOARDS.between[0][1], 0);
    }

    #[test]
    fn pawn_attacks_edges() {
        assert_eq!(BOARDS.pawn_attacks[0][8], 1u64 << 17);
        assert_eq!(BOARDS.pawn_attacks[1][15], 1u64 << 6);
        assert_eq!(BOARDS.pawn_attacks[0][63], 0);
    }
}
