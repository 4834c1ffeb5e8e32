//! Contains the representation of a chessboard's square.
//!
//! Internally, a `SQ` is just a u8. The number of a `SQ` maps to the following
//! squares of a chessboard:
//!
//! ```md,ignore
//! 8 | 56 57 58 59 60 61 62 63
//! 7 | 48 49 50 51 52 53 54 55
//! 6 | 40 41 42 43 44 45 46 47
//! 5 | 32 33 34 35 36 37 38 39
//! 4 | 24 25 26 27 28 29 30 31
//! 3 | 16 17 18 19 20 21 22 23
//! 2 | 8  9  10 11 12 13 14 15
//! 1 | 0  1  2  3  4  5  6  7
//!   -------------------------
//!      a  b  c  d  e  f  g  h
//! ```
//!
//! # Examples
//!
//! ```rust
//! use kestrel::SQ;
//! let h1 = SQ::H1;
//! let h2 = SQ::H2;
//!
//! assert_eq!(h1.distance(h2), 1);
//! assert_eq!(h1.file(), h2.file());
//! assert_eq!(SQ(14).rank(), h2.rank());
//! ```
//!
//! `NO_SQ` signifies the lack of a square, a lazy version of `Option<SQ>` used where
//! the extra branch of an `Option` is unwanted (en-passant squares, dirty-piece records).

use super::bitboard::BitBoard;
use super::masks::*;
use super::{File, Rank, ALL_FILES, ALL_RANKS};

use std::fmt;
use std::ops::*;

/// Represents a singular square of a chessboard.
#[derive(Copy, Clone, Default, Hash, PartialEq, PartialOrd, Eq, Ord, Debug)]
#[repr(transparent)]
pub struct SQ(pub u8);

impl_bit_ops!(SQ, u8);

/// `SQ` representing no square available.
pub const NO_SQ: SQ = SQ(64);

impl SQ {
    /// A square that isn't on the board.
    pub const NONE: SQ = NO_SQ;

    /// Returns if a `SQ` is within the legal bounds of a square,
    /// which is inclusively between 0 - 63.
    ///
    /// ```rust
    /// use kestrel::SQ;
    /// assert!(SQ(5).is_okay());
    /// assert!(!SQ(64).is_okay());
    /// ```
    #[inline(always)]
    pub const fn is_okay(self) -> bool {
        self.0 < 64
    }

    /// Returns the king-move (Chebyshev) distance between two squares.
    #[inline]
    pub fn distance(self, sq_other: SQ) -> u8 {
        let x = self.rank_idx_of_sq().abs_diff(sq_other.rank_idx_of_sq());
        let y = self.file_idx_of_sq().abs_diff(sq_other.file_idx_of_sq());
        x.max(y)
    }

    /// Converts a `SQ` to its single-bit `BitBoard`.
    #[inline(always)]
    pub fn to_bb(self) -> BitBoard {
        debug_assert!(self.is_okay());
        BitBoard(1u64 << self.0)
    }

    /// Returns the `Rank` that a `SQ` lies on.
    #[inline(always)]
    pub fn rank(self) -> Rank {
        ALL_RANKS[(self.0 >> 3) as usize & 7]
    }

    /// Returns the `BitBoard` of the rank a `SQ` lies on.
    #[inline(always)]
    pub fn rank_bb(self) -> BitBoard {
        BitBoard(RANK_BB[self.rank() as usize])
    }

    /// Returns the rank index (number) of a `SQ`.
    #[inline(always)]
    pub const fn rank_idx_of_sq(self) -> u8 {
        self.0 >> 3
    }

    /// Returns the `File` that a `SQ` lies on.
    #[inline(always)]
    pub fn file(self) -> File {
        ALL_FILES[(self.0 & 7) as usize]
    }

    /// Returns the `BitBoard` of the file a `SQ` lies on.
    #[inline(always)]
    pub fn file_bb(self) -> BitBoard {
        BitBoard(FILE_BB[self.file() as usize])
    }

    /// Returns the file index (number) of a `SQ`.
    #[inline(always)]
    pub const fn file_idx_of_sq(self) -> u8 {
        self.0 & 7
    }

    /// Creates a `SQ` from the designated File and Rank.
    ///
    /// ```rust
    /// use kestrel::{SQ, Rank, File};
    /// assert_eq!(SQ::F2, SQ::make(File::F, Rank::R2));
    /// ```
    #[inline(always)]
    pub fn make(file: File, rank: Rank) -> SQ {
        SQ(((rank as u8) << 3) + file as u8)
    }

    /// Flips the square's rank, so `SQ::A1` -> `SQ::A8`.
    #[inline(always)]
    pub fn flip(self) -> SQ {
        SQ(self.0 ^ 0b111_000)
    }

    /// Mirrors the square's file, so `SQ::A1` -> `SQ::H1`.
    #[inline(always)]
    pub fn mirror(self) -> SQ {
        SQ(self.0 ^ 0b000_111)
    }

    /// Offsets the square by a direction. The result is only meaningful when the
    /// destination stays on the board.
    #[inline(always)]
    pub fn offset(self, dir: i8) -> SQ {
        SQ((self.0 as i8).wrapping_add(dir) as u8)
    }

    /// Determines if two squares are on opposite colors.
    #[inline(always)]
    pub fn opposite_colors(self, other: SQ) -> bool {
        let s: u8 = self.0 ^ other.0;
        ((s >> 3) ^ s) & 1 != 0
    }

    /// Parses a square in algebraic notation, e.g. "e4".
    pub fn from_str_algebraic(s: &str) -> Option<SQ> {
        let mut chars = s.chars();
        let f = chars.next()?;
        let r = chars.next()?;
        if chars.next().is_some() || !('a'..='h').contains(&f) || !('1'..='8').contains(&r) {
            return None;
        }
        Some(SQ((r as u8 - b'1') * 8 + (f as u8 - b'a')))
    }
}

// constants
#[allow(missing_docs)]
impl SQ {
    pub const A1: SQ = SQ(0);
    pub const B1: SQ = SQ(1);
    pub const C1: SQ = SQ(2);
    pub const D1: SQ = SQ(3);
    pub const E1: SQ = SQ(4);
    pub const F1: SQ = SQ(5);
    pub const G1: SQ = SQ(6);
    pub const H1: SQ = SQ(7);
    pub const A2: SQ = SQ(8);
    pub const B2: SQ = SQ(9);
    pub const C2: SQ = SQ(10);
    pub const D2: SQ = SQ(11);
    pub const E2: SQ = SQ(12);
    pub const F2: SQ = SQ(13);
    pub const G2: SQ = SQ(14);
    pub const H2: SQ = SQ(15);
    pub const A3: SQ = SQ(16);
    pub const B3: SQ = SQ(17);
    pub const C3: SQ = SQ(18);
    pub const D3: SQ = SQ(19);
    pub const E3: SQ = SQ(20);
    pub const F3: SQ = SQ(21);
    pub const G3: SQ = SQ(22);
    pub const H3: SQ = SQ(23);
    pub const A4: SQ = SQ(24);
    pub const B4: SQ = SQ(25);
    pub const C4: SQ = SQ(26);
    pub const D4: SQ = SQ(27);
    pub const E4: SQ = SQ(28);
    pub const F4: SQ = SQ(29);
    pub const G4: SQ = SQ(30);
    pub const H4: SQ = SQ(31);
    pub const A5: SQ = SQ(32);
    pub const B5: SQ = SQ(33);
    pub const C5: SQ = SQ(34);
    pub const D5: SQ = SQ(35);
    pub const E5: SQ = SQ(36);
    pub const F5: SQ = SQ(37);
    pub const G5: SQ = SQ(38);
    pub const H5: SQ = SQ(39);
    pub const A6: SQ = SQ(40);
    pub const B6: SQ = SQ(41);
    pub const C6: SQ = SQ(42);
    pub const D6: SQ = SQ(43);
    pub const E6: SQ = SQ(44);
    pub const F6: SQ = SQ(45);
    pub const G6: SQ = SQ(46);
    pub const H6: SQ = SQ(47);
    pub const A7: SQ = SQ(48);
    pub const B7: SQ = SQ(49);
    pub const C7: SQ = SQ(50);
    pub const D7: SQ = SQ(51);
    pub const E7: SQ = SQ(52);
    pub const F7: SQ = SQ(53);
    pub const G7: SQ = SQ(54);
    pub const H7: SQ = SQ(55);
    pub const A8: SQ = SQ(56);
    pub const B8: SQ = SQ(57);
    pub const C8: SQ = SQ(58);
    pub const D8: SQ = SQ(59);
    pub const E8: SQ = SQ(60);
    pub const F8: SQ = SQ(61);
    pub const G8: SQ = SQ(62);
    pub const H8: SQ = SQ(63);
}

impl fmt::Display for SQ {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_okay() {
            write!(f, "{}{}", self.file().to_char(), self.rank().to_char())
        } else {
            write!(f, "-")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algebraic_round_trip() {
        for s in 0..64u8 {
            let sq = SQ(s);
            assert_eq!(SQ::from_str_algebraic(&sq.to_string()), Some(sq));
        }
        assert_eq!(SQ::from_str_algebraic("i1"), None);
        assert_eq!(SQ::from_str_algebraic("a9"), None);
    }

    #[test]
    fn flip_and_mirror() {
        assert_eq!(SQ::C2.flip(), SQ::C7);
        assert_eq!(SQ::C2.mirror(), SQ::F2);
        assert_eq!(SQ::A1.distance(SQ::H8), 7);
        assert!(SQ::A1.opposite_colors(SQ::A2));
    }
}
