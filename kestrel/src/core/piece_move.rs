//! Module for the implementation and definition of a move to be played.
//!
//! We define a move as the struct `BitMove`. A move needs 16 bits to be stored, and
//! they are used as such:
//!
//! ```md,ignore
//! bits  0 - 5:  origin square (from 0 to 63)
//! bits  6 - 11: destination square (from 0 to 63)
//! bits 12 - 13: move type: normal (0), castling (1), en passant (2), promotion (3)
//! bits 14 - 15: promotion piece type - 2 (from KNIGHT-0 to QUEEN-3)
//! ```
//!
//! # Special cases
//!
//! The null `BitMove` is all zeroes (a1 to a1). The null move actually played by the search
//! is encoded as b1 to b1. Both have the same origin and destination square, which no real
//! move can have.
//!
//! If the move is a castle, the origin square is the square of the king, while the
//! destination square is the square of the rook to castle with. This works for both standard
//! chess and Chess960, where the rook's initial square is not fixed.
//!
//! # Safety
//!
//! A `BitMove` is only guaranteed to be legal for a specific position. Moves coming from
//! elsewhere (the transposition table, killers) must be checked with
//! `Board::pseudo_legal_move` before they are played.

use std::fmt;

use super::sq::SQ;
use super::*;

const SRC_MASK: u16 = 0b00_00_000000_111111;
const DST_MASK: u16 = 0b00_00_111111_000000;
const FROM_TO_MASK: u16 = 0b00_00_111111_111111;
const TYPE_MASK: u16 = 0b00_11_000000_000000;

/// Represents a singular move.
///
/// A `BitMove` consists of 16 bits, holding the source square, destination square, the
/// move type and the promotion piece. Equality is equality of the bit pattern.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct BitMove {
    data: u16,
}

/// Classification of a move.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum MoveType {
    /// The move is "Normal", So its not a castle, promotion, or en-passant.
    Normal = 0,
    /// The move is castling move.
    Castle = 1,
    /// The move is an en-passant capture.
    EnPassant = 2,
    /// The move is a promotion.
    Promotion = 3,
}

impl fmt::Display for BitMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&self.stringify(false))
    }
}

impl fmt::Debug for BitMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({:?})", self.stringify(true), self.move_type())
    }
}

impl BitMove {
    /// The null move is all zeros.
    pub const NULL: BitMove = BitMove { data: 0 };
    /// A null move played in search (a pass).
    pub const NONE_NULL: BitMove = BitMove { data: 1 | (1 << 6) };

    /// Creates a new BitMove from raw bits.
    #[inline(always)]
    pub const fn new(input: u16) -> BitMove {
        BitMove { data: input }
    }

    /// Creates a normal move.
    #[inline(always)]
    pub fn make(src: SQ, dst: SQ) -> BitMove {
        BitMove {
            data: src.0 as u16 | ((dst.0 as u16) << 6),
        }
    }

    /// Creates a move of the given special type.
    #[inline(always)]
    pub fn make_special(src: SQ, dst: SQ, mtype: MoveType) -> BitMove {
        BitMove {
            data: src.0 as u16 | ((dst.0 as u16) << 6) | ((mtype as u16) << 12),
        }
    }

    /// Creates a promotion to the given piece type, which must be a knight, bishop, rook
    /// or queen.
    #[inline(always)]
    pub fn make_promotion(src: SQ, dst: SQ, prom: PieceType) -> BitMove {
        debug_assert!(prom as u8 >= PieceType::N as u8 && prom as u8 <= PieceType::Q as u8);
        BitMove {
            data: src.0 as u16
                | ((dst.0 as u16) << 6)
                | ((MoveType::Promotion as u16) << 12)
                | (((prom as u16) - 2) << 14),
        }
    }

    /// Returns a null move.
    #[inline(always)]
    pub const fn null() -> Self {
        BitMove::NULL
    }

    /// Returns if a `BitMove` is the null move.
    #[inline(always)]
    pub const fn is_null(self) -> bool {
        self.data == 0
    }

    /// Returns if a `BitMove` is a real move: not the null move and not a search pass.
    #[inline(always)]
    pub fn is_okay(self) -> bool {
        self.get_src_u8() != self.get_dest_u8()
    }

    /// Returns the source square.
    #[inline(always)]
    pub fn get_src(self) -> SQ {
        SQ(self.get_src_u8())
    }

    /// Returns the source square as a u8.
    #[inline(always)]
    pub const fn get_src_u8(self) -> u8 {
        (self.data & SRC_MASK) as u8
    }

    /// Returns the destination square.
    #[inline(always)]
    pub fn get_dest(self) -> SQ {
        SQ(self.get_dest_u8())
    }

    /// Returns the destination square as a u8.
    #[inline(always)]
    pub const fn get_dest_u8(self) -> u8 {
        ((self.data & DST_MASK) >> 6) as u8
    }

    /// Returns the 12 from-to bits, used to index butterfly tables.
    #[inline(always)]
    pub const fn from_to(self) -> u16 {
        self.data & FROM_TO_MASK
    }

    /// Returns the raw bits of the move.
    #[inline(always)]
    pub const fn get_raw(self) -> u16 {
        self.data
    }

    /// Returns the `MoveType` of the move.
    #[inline(always)]
    pub fn move_type(self) -> MoveType {
        match (self.data & TYPE_MASK) >> 12 {
            0 => MoveType::Normal,
            1 => MoveType::Castle,
            2 => MoveType::EnPassant,
            _ => MoveType::Promotion,
        }
    }

    /// Returns if the move is a castle.
    #[inline(always)]
    pub fn is_castle(self) -> bool {
        self.move_type() == MoveType::Castle
    }

    /// Returns if the move is an en-passant capture.
    #[inline(always)]
    pub fn is_en_passant(self) -> bool {
        self.move_type() == MoveType::EnPassant
    }

    /// Returns if the move is a promotion.
    #[inline(always)]
    pub fn is_promo(self) -> bool {
        self.move_type() == MoveType::Promotion
    }

    /// Returns the piece a promotion promotes to. Only meaningful for promotions.
    #[inline(always)]
    pub fn promo_piece(self) -> PieceType {
        match self.data >> 14 {
            0 => PieceType::N,
            1 => PieceType::B,
            2 => PieceType::R,
            _ => PieceType::Q,
        }
    }

    /// Returns the long algebraic notation of the move. Castling is written as the king's
    /// destination in standard chess, and as king-takes-rook in Chess960.
    ///
    /// ```
    /// use kestrel::{BitMove, SQ, PieceType};
    ///
    /// let m = BitMove::make_promotion(SQ::E7, SQ::E8, PieceType::Q);
    /// assert_eq!(m.stringify(false), "e7e8q");
    /// assert_eq!(BitMove::null().stringify(false), "0000");
    /// ```
    pub fn stringify(self, chess960: bool) -> String {
        if !self.is_okay() {
            return "0000".to_owned();
        }
        let src = self.get_src();
        let mut dst = self.get_dest();
        if self.is_castle() && !chess960 {
            let file = if dst.0 > src.0 { File::G } else { File::C };
            dst = SQ::make(file, src.rank());
        }
        let mut s = format!("{}{}", src, dst);
        if self.is_promo() {
            s.push(self.promo_piece().char_lower());
        }
        s
    }
}

/// A move paired with a score, used for move ordering.
#[derive(Copy, Clone, Debug, Default)]
pub struct ScoringMove {
    pub bit_move: BitMove,
    pub score: i32,
}

impl ScoringMove {
    /// Creates a `ScoringMove` with a score of zero.
    #[inline(always)]
    pub fn new(m: BitMove) -> Self {
        ScoringMove {
            bit_move: m,
            score: 0,
        }
    }

    /// Creates a `ScoringMove` with a score.
    #[inline(always)]
    pub fn new_score(m: BitMove, score: i32) -> Self {
        ScoringMove { bit_move: m, score }
    }

    /// Returns the move.
    #[inline(always)]
    pub fn bitmove(self) -> BitMove {
        self.bit_move
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_layout() {
        let m = BitMove::make(SQ::E2, SQ::E4);
        assert_eq!(m.get_raw(), 12 | (28 << 6));
        assert_eq!(m.move_type(), MoveType::Normal);

        let ep = BitMove::make_special(SQ::E5, SQ::D6, MoveType::EnPassant);
        assert_eq!(ep.get_raw() >> 12, 2);
        assert!(ep.is_en_passant());

        for (i, pt) in [PieceType::N, PieceType::B, PieceType::R, PieceType::Q]
            .iter()
            .enumerate()
        {
            let p = BitMove::make_promotion(SQ::A7, SQ::B8, *pt);
            assert_eq!(p.get_raw() >> 14, i as u16);
            assert_eq!(p.promo_piece(), *pt);
            assert_eq!(p.get_src(), SQ::A7);
            assert_eq!(p.get_dest(), SQ::B8);
        }
    }

    #[test]
    fn castle_notation() {
        let ks = BitMove::make_special(SQ::E1, SQ::H1, MoveType::Castle);
        let qs = BitMove::make_special(SQ::E8, SQ::A8, MoveType::Castle);
        assert_eq!(ks.stringify(false), "e1g1");
        assert_eq!(qs.stringify(false), "e8c8");
        assert_eq!(ks.stringify(true), "e1h1");
    }

    #[test]
    fn null_moves() {
        assert!(BitMove::null().is_null());
        assert!(!BitMove::null().is_okay());
        assert!(!BitMove::NONE_NULL.is_okay());
        assert!(!BitMove::NONE_NULL.is_null());
    }
}
