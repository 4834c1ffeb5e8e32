//! Module containing the `BitBoard` and associated functions / constants.
//!
//! A [`BitBoard`] is a set of bits, where the index of each bit represents a square on the
//! Board. We use this to mark whether or not something is residing at a certain square. For
//! example, if we are using it to map the positions of the white pawns, and there exists a
//! pawn at square B2, the bit at index 9 will be set to '1'. The lack of a piece is marked
//! with a '0' instead.
//!
//! Each bit's index of a [`BitBoard`] maps to the squares described in [`SQ`].
//!
//! [`SQ`]: ../sq/struct.SQ.html

use super::masks::*;
use super::sq::SQ;
use super::Player;

use std::fmt;
use std::ops::*;

/// A `BitBoard` is simply a 64 bit long integer where each
/// bit maps to a specific square. Used for mapping occupancy, where '1' represents
/// a piece being at that index's square, and a '0' represents a lack of a piece.
#[derive(Copy, Clone, Default, Hash, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct BitBoard(pub u64);

impl_bit_ops!(BitBoard, u64);

impl BitBoard {
    /// BitBoard of File A.
    pub const FILE_A: BitBoard = BitBoard(FILE_A);
    /// BitBoard of File B.
    pub const FILE_B: BitBoard = BitBoard(FILE_B);
    /// BitBoard of File G.
    pub const FILE_G: BitBoard = BitBoard(FILE_G);
    /// BitBoard of File H.
    pub const FILE_H: BitBoard = BitBoard(FILE_H);
    /// BitBoard of Rank 1.
    pub const RANK_1: BitBoard = BitBoard(RANK_1);
    /// BitBoard of Rank 2.
    pub const RANK_2: BitBoard = BitBoard(RANK_2);
    /// BitBoard of Rank 3.
    pub const RANK_3: BitBoard = BitBoard(RANK_3);
    /// BitBoard of Rank 6.
    pub const RANK_6: BitBoard = BitBoard(RANK_6);
    /// BitBoard of Rank 7.
    pub const RANK_7: BitBoard = BitBoard(RANK_7);
    /// BitBoard of Rank 8.
    pub const RANK_8: BitBoard = BitBoard(RANK_8);

    /// BitBoard of all dark squares.
    pub const DARK_SQUARES: BitBoard = BitBoard(DARK_SQUARES);
    /// BitBoard of all light squares.
    pub const LIGHT_SQUARES: BitBoard = BitBoard(LIGHT_SQUARES);
    /// BitBoard of all squares.
    pub const ALL: BitBoard = BitBoard(!0);
    /// The empty BitBoard.
    pub const EMPTY: BitBoard = BitBoard(0);

    /// Converts a `BitBoard` with exactly one bit to its square.
    #[inline(always)]
    pub fn to_sq(self) -> SQ {
        debug_assert_eq!(self.count_bits(), 1);
        SQ(self.0.trailing_zeros() as u8)
    }

    /// Returns the number of bits in a `BitBoard`
    #[inline(always)]
    pub fn count_bits(self) -> u8 {
        self.0.count_ones() as u8
    }

    /// Returns the `SQ` of the least significant bit.
    ///
    /// # Panic
    ///
    /// Undefined result if the `BitBoard` is empty.
    #[inline(always)]
    pub fn bit_scan_forward(self) -> SQ {
        debug_assert!(self.is_not_empty());
        SQ(self.0.trailing_zeros() as u8)
    }

    /// Returns the `SQ` of the most significant bit.
    #[inline(always)]
    pub fn bit_scan_reverse(self) -> SQ {
        debug_assert!(self.is_not_empty());
        SQ(63 - self.0.leading_zeros() as u8)
    }

    /// Returns if there are more than 1 bits inside.
    #[inline(always)]
    pub fn more_than_one(self) -> bool {
        self.0 & self.0.wrapping_sub(1) != 0
    }

    /// Determines if the `BitBoard` is empty (contains no bits).
    #[inline(always)]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Determines if the `BitBoard` is not empty (contains one or more bits).
    #[inline(always)]
    pub fn is_not_empty(self) -> bool {
        self.0 != 0
    }

    /// Returns if the square's bit is set.
    #[inline(always)]
    pub fn contains(self, sq: SQ) -> bool {
        (self.0 >> sq.0) & 1 != 0
    }

    /// Returns the least significant bit as a BitBoard.
    #[inline(always)]
    pub fn lsb(self) -> BitBoard {
        BitBoard(self.0 & self.0.wrapping_neg())
    }

    /// Returns the index (as a square) of the least significant bit and removes
    /// that bit from the `BitBoard`.
    ///
    /// # Safety
    ///
    /// The `BitBoard` must not be empty. See [`BitBoard::pop_some_lsb`] for a
    /// checked version of the method.
    #[inline(always)]
    pub fn pop_lsb(&mut self) -> SQ {
        let sq = self.bit_scan_forward();
        self.0 &= self.0 - 1;
        sq
    }

    /// Returns the least significant bit of a `BitBoard`, if it has any. If there is a bit to
    /// return, it removes that bit from itself.
    #[inline(always)]
    pub fn pop_some_lsb(&mut self) -> Option<SQ> {
        if self.is_empty() {
            None
        } else {
            Some(self.pop_lsb())
        }
    }

    /// Returns the front-most square of a player on the current `BitBoard`.
    #[inline]
    pub fn frontmost_sq(self, player: Player) -> SQ {
        match player {
            Player::White => self.bit_scan_reverse(),
            Player::Black => self.bit_scan_forward(),
        }
    }

    /// Shifts every bit one step in a direction, dropping the bits that would wrap around
    /// a board edge.
    #[inline(always)]
    pub fn shift(self, dir: i8) -> BitBoard {
        match dir {
            NORTH => BitBoard(self.0 << 8),
            SOUTH => BitBoard(self.0 >> 8),
            EAST => BitBoard((self.0 & !FILE_H) << 1),
            WEST => BitBoard((self.0 & !FILE_A) >> 1),
            NORTH_EAST => BitBoard((self.0 & !FILE_H) << 9),
            NORTH_WEST => BitBoard((self.0 & !FILE_A) << 7),
            SOUTH_EAST => BitBoard((self.0 & !FILE_H) >> 7),
            SOUTH_WEST => BitBoard((self.0 & !FILE_A) >> 9),
            16 => BitBoard(self.0 << 16),
            -16 => BitBoard(self.0 >> 16),
            _ => BitBoard(0),
        }
    }

    /// Parallel bit extract: gathers the bits of `self` selected by `mask` into the low
    /// bits of the result, in mask order.
    ///
    /// ```
    /// use kestrel::BitBoard;
    /// let bb = BitBoard(0b1010_0000);
    /// assert_eq!(bb.pext(BitBoard(0b1110_0000)), 0b101);
    /// ```
    #[inline(always)]
    pub fn pext(self, mask: BitBoard) -> u64 {
        pext(self.0, mask.0)
    }
}

/// Masked gather of `val` under `mask`. Uses the BMI2 instruction when the `fast-pext`
/// feature is enabled and the target supports it.
#[cfg(all(feature = "fast-pext", target_arch = "x86_64", target_feature = "bmi2"))]
#[inline(always)]
pub fn pext(val: u64, mask: u64) -> u64 {
    // SAFETY: guarded by the bmi2 target feature.
    unsafe { std::arch::x86_64::_pext_u64(val, mask) }
}

/// Masked gather of `val` under `mask`, portable implementation.
#[cfg(not(all(feature = "fast-pext", target_arch = "x86_64", target_feature = "bmi2")))]
#[inline]
pub fn pext(val: u64, mut mask: u64) -> u64 {
    let mut res: u64 = 0;
    let mut bit: u64 = 1;
    while mask != 0 {
        let lowest = mask & mask.wrapping_neg();
        if val & lowest != 0 {
            res |= bit;
        }
        mask ^= lowest;
        bit <<= 1;
    }
    res
}

impl Iterator for BitBoard {
    type Item = SQ;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.pop_some_lsb()
    }
}

impl fmt::Display for BitBoard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut s = String::with_capacity(8 * 17);
        for rank in (0..8).rev() {
            for file in 0..8 {
                let sq = SQ(rank * 8 + file);
                s.push(if self.contains(sq) { 'X' } else { '.' });
                s.push(' ');
            }
            s.push('\n');
        }
        f.pad(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bb_pop_lsb() {
        let mut bb = BitBoard(0x8100_0000_0000_0181);
        let mut seen = Vec::new();
        while bb.is_not_empty() {
            let total_pre = bb.count_bits();
            let lsb_sq = bb.pop_lsb();
            assert!(lsb_sq.is_okay());
            assert!(!bb.contains(lsb_sq));
            assert_eq!(bb.count_bits() + 1, total_pre);
            seen.push(lsb_sq);
        }
        assert_eq!(seen, vec![SQ::A1, SQ::H1, SQ::A2, SQ::A8, SQ::H8]);
    }

    #[test]
    fn shifts_drop_edges() {
        assert_eq!(BitBoard::FILE_H.shift(EAST), BitBoard(0));
        assert_eq!(BitBoard::FILE_A.shift(WEST), BitBoard(0));
        assert_eq!(SQ::A2.to_bb().shift(NORTH_EAST), SQ::B3.to_bb());
        assert_eq!(SQ::H7.to_bb().shift(SOUTH_WEST), SQ::G6.to_bb());
    }

    #[test]
    fn pext_matches_manual_gather() {
        let mask = 0x0000_0000_0000_F0F0u64;
        let val = 0x0000_0000_0000_A050u64;
        // mask bits in order: 4,5,6,7,12,13,14,15 ; val bits set: 4,6,13,15
        assert_eq!(pext(val, mask), 0b1010_0101);
        assert_eq!(pext(u64::MAX, mask), 0xFF);
        assert_eq!(pext(0, mask), 0);
    }
}
