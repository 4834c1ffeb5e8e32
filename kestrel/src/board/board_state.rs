//! Contains the `BoardState` structure for the `Board`. Helps to preserve the previous state
//! of the board without needing to re-compute information.
//!
//! The [`Board`] keeps a stack of states, one per move played. Applying a move pushes a
//! copy of the current state that is then modified, undoing a move pops it again. The
//! stack doubles as the key history used for repetition detection.
//!
//! [`Board`]: ../struct.Board.html

use super::castle_rights::Castling;

use crate::core::masks::*;
use crate::core::piece_move::BitMove;
use crate::core::score::Value;
use crate::core::sq::{NO_SQ, SQ};
use crate::core::*;
use crate::BitBoard;

/// The pieces that changed squares with the last move, for incremental evaluation.
///
/// A move changes at most three pieces: a castle moves the king and the rook, a capturing
/// promotion removes the captured piece and the pawn, and adds the promoted piece. A
/// `from` of `NO_SQ` marks a piece appearing, a `to` of `NO_SQ` a piece disappearing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DirtyPiece {
    pub len: u8,
    pub piece: [Piece; 3],
    pub from: [SQ; 3],
    pub to: [SQ; 3],
}

impl Default for DirtyPiece {
    fn default() -> Self {
        DirtyPiece {
            len: 0,
            piece: [Piece::None; 3],
            from: [NO_SQ; 3],
            to: [NO_SQ; 3],
        }
    }
}

impl DirtyPiece {
    #[inline(always)]
    pub(crate) fn push(&mut self, piece: Piece, from: SQ, to: SQ) {
        let i = self.len as usize;
        debug_assert!(i < 3);
        self.piece[i] = piece;
        self.from[i] = from;
        self.to[i] = to;
        self.len += 1;
    }

    /// Iterates over the recorded `(piece, from, to)` changes.
    pub fn iter(&self) -> impl Iterator<Item = (Piece, SQ, SQ)> + '_ {
        (0..self.len as usize).map(move |i| (self.piece[i], self.from[i], self.to[i]))
    }

    /// Returns if a king changed squares.
    #[inline]
    pub fn king_moved(&self) -> bool {
        self.iter().any(|(p, _, _)| p.type_of() == PieceType::K)
    }
}

/// Holds useful information concerning the current state of the [`Board`].
///
/// This is information that is computed upon making a move, and requires expensive
/// computation to do so as well.
///
/// [`Board`]: ../struct.Board.html
#[derive(Clone)]
pub struct BoardState {
    // The Following Fields are easily copied from the previous version and possibly modified
    /// The castling rights for the current board.
    pub castling: Castling,
    /// Rule 50 for the current board. Tracks the plies since a capture or pawn move.
    pub rule_50: i16,
    /// Plies since the last null move, bounding the repetition search.
    pub plies_from_null: i16,
    /// If the last move was a double pawn push that can be captured en-passant, the square
    /// behind the pushed pawn. Otherwise `NO_SQ`.
    pub ep_square: SQ,

    // These fields MUST be Recomputed after a move
    /// The Zobrist key of the board.
    pub zobrist: u64,
    /// The Hash key of the current pawn configuration.
    pub pawn_key: u64,
    /// The Hash keys of each player's non-pawn pieces, king included.
    pub non_pawn_key: [u64; PLAYER_CNT],
    /// The Hash key of the current material configuration.
    pub material_key: u64,
    /// The value of each player's non-pawn pieces.
    pub non_pawn_material: [Value; PLAYER_CNT],
    /// The last captured Piece, if any.
    pub captured_piece: Piece,
    /// A `BitBoard` of the current pieces giving check.
    pub checkers: BitBoard,
    /// Per each player, `BitBoard` of pieces blocking an attack on that player's king.
    /// This field can contain opponents pieces.
    pub blockers_king: [BitBoard; PLAYER_CNT],
    /// Per each player, `BitBoard` of that player's sliders pinning a piece to the
    /// opponent's king.
    pub pinners: [BitBoard; PLAYER_CNT],
    /// For each piece type, the squares from which it would give check to the side not to move.
    pub check_sqs: [BitBoard; PIECE_TYPE_CNT],
    /// The move that led to this state. `BitMove::null()` for the root state.
    pub prev_move: BitMove,
    /// Distance to the previous occurrence of the same position, negative if that
    /// occurrence was itself a repetition. Zero if the position has not occurred before.
    pub repetition: i16,
    /// Pieces moved by `prev_move`.
    pub dirty: DirtyPiece,
}

impl Default for BoardState {
    fn default() -> Self {
        BoardState {
            castling: Castling::empty(),
            rule_50: 0,
            plies_from_null: 0,
            ep_square: NO_SQ,
            zobrist: 0,
            pawn_key: 0,
            non_pawn_key: [0; PLAYER_CNT],
            material_key: 0,
            non_pawn_material: [0; PLAYER_CNT],
            captured_piece: Piece::None,
            checkers: BitBoard(0),
            blockers_king: [BitBoard(0); PLAYER_CNT],
            pinners: [BitBoard(0); PLAYER_CNT],
            check_sqs: [BitBoard(0); PIECE_TYPE_CNT],
            prev_move: BitMove::null(),
            repetition: 0,
            dirty: DirtyPiece::default(),
        }
    }
}

impl BoardState {
    /// Copies the fields carried over into the next state, clearing those recomputed by
    /// every move.
    #[inline]
    pub fn partial_clone(&self) -> BoardState {
        BoardState {
            castling: self.castling,
            rule_50: self.rule_50,
            plies_from_null: self.plies_from_null,
            ep_square: self.ep_square,
            zobrist: self.zobrist,
            pawn_key: self.pawn_key,
            non_pawn_key: self.non_pawn_key,
            material_key: self.material_key,
            non_pawn_material: self.non_pawn_material,
            ..BoardState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirty_piece_records() {
        let mut dp = DirtyPiece::default();
        dp.push(Piece::WhiteKing, SQ::E1, SQ::G1);
        dp.push(Piece::WhiteRook, SQ::H1, SQ::F1);
        assert_eq!(dp.len, 2);
        assert!(dp.king_moved());
        let changes: Vec<_> = dp.iter().collect();
        assert_eq!(changes[1], (Piece::WhiteRook, SQ::H1, SQ::F1));
    }

    #[test]
    fn partial_clone_resets_move_fields() {
        let mut st = BoardState::default();
        st.zobrist = 42;
        st.repetition = 4;
        st.checkers = BitBoard(1);
        let next = st.partial_clone();
        assert_eq!(next.zobrist, 42);
        assert_eq!(next.repetition, 0);
        assert!(next.checkers.is_empty());
    }
}
