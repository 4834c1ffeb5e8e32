//! Input feature indexing.

use kestrel::board::Board;
use kestrel::{Piece, Player, SQ};

pub const KING_BUCKETS: usize = 4;
/// 2 colors * 6 piece types * 64 squares.
pub const FEATURES_PER_BUCKET: usize = 768;
pub const INPUTS: usize = KING_BUCKETS * FEATURES_PER_BUCKET;
pub const HIDDEN: usize = 768;
pub const OUTPUT_BUCKETS: usize = 8;

/// King bucket of each square, from the perspective's own side of the board.
#[rustfmt::skip]
const BUCKET_MAP: [u8; 64] = [
    0, 0, 1, 1, 1, 1, 0, 0,
    2, 2, 2, 2, 2, 2, 2, 2,
    3, 3, 3, 3, 3, 3, 3, 3,
    3, 3, 3, 3, 3, 3, 3, 3,
    3, 3, 3, 3, 3, 3, 3, 3,
    3, 3, 3, 3, 3, 3, 3, 3,
    3, 3, 3, 3, 3, 3, 3, 3,
    3, 3, 3, 3, 3, 3, 3, 3,
];

/// The input bucket of a perspective and whether its board is mirrored horizontally, both
/// decided by that perspective's king square.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KingKey {
    pub bucket: usize,
    pub mirror: bool,
}

impl KingKey {
    #[inline(always)]
    pub fn new(perspective: Player, king_sq: SQ) -> KingKey {
        let rel = perspective.relative_square(king_sq);
        KingKey {
            bucket: BUCKET_MAP[rel.0 as usize] as usize,
            mirror: rel.0 & 7 >= 4,
        }
    }

    #[inline(always)]
    pub fn of(board: &Board, perspective: Player) -> KingKey {
        KingKey::new(perspective, board.king_sq(perspective))
    }

    /// Slot of this key inside a per-perspective refresh table.
    #[inline(always)]
    pub fn slot(self) -> usize {
        self.bucket * 2 + self.mirror as usize
    }
}

/// Index of the input feature for `piece` standing on `sq`, seen by `perspective`.
#[inline(always)]
pub fn feature_index(perspective: Player, key: KingKey, piece: Piece, sq: SQ) -> usize {
    debug_assert!(piece != Piece::None);
    let mut oriented = perspective.relative_square(sq).0 as usize;
    if key.mirror {
        oriented ^= 7;
    }
    let relative_color = (piece.player_lossy() != perspective) as usize;
    key.bucket * FEATURES_PER_BUCKET
        + (relative_color * 6 + piece.type_of().idx()) * 64
        + oriented
}

/// Output bucket, chosen by the number of pieces left on the board.
#[inline(always)]
pub fn output_bucket(board: &Board) -> usize {
    ((board.count_all_pieces().saturating_sub(2) / 4) as usize).min(OUTPUT_BUCKETS - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perspectives_are_symmetric() {
        let w = KingKey::new(Player::White, SQ::E1);
        let b = KingKey::new(Player::Black, SQ::E8);
        assert_eq!(w, b);
        assert!(w.mirror);
        assert_eq!(
            feature_index(Player::White, w, Piece::WhitePawn, SQ::D2),
            feature_index(Player::Black, b, Piece::BlackPawn, SQ::D7)
        );
    }

    #[test]
    fn indices_stay_in_range() {
        let key = KingKey::new(Player::Black, SQ::A1);
        assert_eq!(key.bucket, 3);
        let idx = feature_index(Player::Black, key, Piece::WhiteKing, SQ::H8);
        assert!(idx < INPUTS);
    }

    #[test]
    fn output_buckets() {
        assert_eq!(output_bucket(&Board::start_pos()), 7);
        let kk = Board::from_fen("8/8/8/8/8/8/8/K6k w - - 0 1", false).unwrap();
        assert_eq!(output_bucket(&kk), 0);
    }
}
