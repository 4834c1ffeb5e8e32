//! Module for the `Castling` structure, which helps provide an easy way for the
//! `Board` to keep track of the various castling rights available for each player.
//!
//! At it's core, a [`Castling`] is a simple u8 which sets bits for each possible castling right.
//! The squares involved in castling are kept in [`CastlingInfo`], which is fixed once a
//! position has been set up. Because castling rooks are looked up rather than assumed to
//! sit on the corners, the same structures serve standard chess and Chess960.
//!
//! [`Castling`]: struct.Castling.html
//! [`CastlingInfo`]: struct.CastlingInfo.html

use crate::core::masks::*;
use crate::core::sq::{NO_SQ, SQ};
use crate::core::*;
use crate::helper::prelude::*;
use crate::BitBoard;

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Keeps track of what sides are possible to castle from for each player.
    ///
    /// Does not guarantee that the player containing a castling bit can castle at that
    /// time. Rather marks that castling is a possibility, e.g. a Castling struct
    /// containing a bit marking WHITE_Q means that neither the White King or Queen-side
    /// rook has moved since the game started.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Castling: u8 {
        const WHITE_K = 0b0001;
        const WHITE_Q = 0b0010;
        const BLACK_K = 0b0100;
        const BLACK_Q = 0b1000;
        const WHITE_ALL = Self::WHITE_K.bits() | Self::WHITE_Q.bits();
        const BLACK_ALL = Self::BLACK_K.bits() | Self::BLACK_Q.bits();
    }
}

impl Castling {
    /// Returns the single right for a player and side.
    #[inline(always)]
    pub fn right(player: Player, side: CastleType) -> Castling {
        Castling::from_bits_truncate(1 << (player as u8 * 2 + side as u8))
    }

    /// Returns both rights of a player.
    #[inline(always)]
    pub fn player_rights(player: Player) -> Castling {
        match player {
            Player::White => Castling::WHITE_ALL,
            Player::Black => Castling::BLACK_ALL,
        }
    }

    /// Returns if a player can castle for a given side.
    #[inline(always)]
    pub fn castle_rights(self, player: Player, side: CastleType) -> bool {
        self.contains(Castling::right(player, side))
    }

    /// Returns if a player has any castling right left.
    #[inline(always)]
    pub fn player_can_castle(self, player: Player) -> bool {
        self.intersects(Castling::player_rights(player))
    }

    /// Writes the rights in the standard `KQkq` form, or `-` if there are none.
    pub fn pretty_string(self) -> String {
        if self.is_empty() {
            return "-".to_owned();
        }
        let mut s = String::with_capacity(4);
        for (flag, c) in [
            (Castling::WHITE_K, 'K'),
            (Castling::WHITE_Q, 'Q'),
            (Castling::BLACK_K, 'k'),
            (Castling::BLACK_Q, 'q'),
        ] {
            if self.contains(flag) {
                s.push(c);
            }
        }
        s
    }
}

impl fmt::Display for Castling {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&self.pretty_string())
    }
}

/// The squares taking part in castling for a position, fixed once the position is set up.
#[derive(Clone, PartialEq, Eq)]
pub struct CastlingInfo {
    /// Initial rook square per player and side, `NO_SQ` if the right was never given.
    rook_sq: [[SQ; CASTLING_SIDES]; PLAYER_CNT],
    /// Squares that must be empty for the castle, per player and side.
    path: [[BitBoard; CASTLING_SIDES]; PLAYER_CNT],
    /// Rights lost when a piece moves from or to a square.
    mask: [Castling; SQ_CNT],
}

impl Default for CastlingInfo {
    fn default() -> Self {
        CastlingInfo {
            rook_sq: [[NO_SQ; CASTLING_SIDES]; PLAYER_CNT],
            path: [[BitBoard(0); CASTLING_SIDES]; PLAYER_CNT],
            mask: [Castling::empty(); SQ_CNT],
        }
    }
}

impl CastlingInfo {
    /// Registers a castling right with the king and rook on the given squares.
    pub fn add_right(&mut self, player: Player, king_sq: SQ, rook_sq: SQ) {
        let side = if rook_sq > king_sq {
            CastleType::KingSide
        } else {
            CastleType::QueenSide
        };
        let right = Castling::right(player, side);
        self.rook_sq[player as usize][side as usize] = rook_sq;
        self.mask[king_sq.0 as usize] |= right;
        self.mask[rook_sq.0 as usize] |= right;

        let (k_to, r_to) = castle_destinations(player, side);
        let path = between_bb(king_sq, k_to)
            | between_bb(rook_sq, r_to)
            | k_to.to_bb()
            | r_to.to_bb();
        self.path[player as usize][side as usize] = path & !(king_sq.to_bb() | rook_sq.to_bb());
    }

    /// The rook square for a player's castle.
    #[inline(always)]
    pub fn rook_square(&self, player: Player, side: CastleType) -> SQ {
        self.rook_sq[player as usize][side as usize]
    }

    /// Squares that must be empty for a player's castle.
    #[inline(always)]
    pub fn path(&self, player: Player, side: CastleType) -> BitBoard {
        self.path[player as usize][side as usize]
    }

    /// Rights that are lost once a piece leaves or lands on `sq`.
    #[inline(always)]
    pub fn mask(&self, sq: SQ) -> Castling {
        self.mask[sq.0 as usize]
    }
}

/// Returns the destination squares of the king and the rook for a castle.
#[inline(always)]
pub fn castle_destinations(player: Player, side: CastleType) -> (SQ, SQ) {
    match side {
        CastleType::KingSide => (
            player.relative_square(SQ::G1),
            player.relative_square(SQ::F1),
        ),
        CastleType::QueenSide => (
            player.relative_square(SQ::C1),
            player.relative_square(SQ::D1),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rights_and_strings() {
        let all = Castling::all();
        assert_eq!(all.pretty_string(), "KQkq");
        assert!(all.castle_rights(Player::Black, CastleType::QueenSide));
        let white_only = all - Castling::BLACK_ALL;
        assert!(!white_only.player_can_castle(Player::Black));
        assert_eq!(white_only.pretty_string(), "KQ");
        assert_eq!(Castling::empty().pretty_string(), "-");
        assert_eq!(Castling::right(Player::Black, CastleType::KingSide), Castling::BLACK_K);
    }

    #[test]
    fn standard_paths() {
        let mut info = CastlingInfo::default();
        info.add_right(Player::White, SQ::E1, SQ::H1);
        info.add_right(Player::White, SQ::E1, SQ::A1);
        assert_eq!(
            info.path(Player::White, CastleType::KingSide),
            SQ::F1.to_bb() | SQ::G1.to_bb()
        );
        assert_eq!(
            info.path(Player::White, CastleType::QueenSide),
            SQ::B1.to_bb() | SQ::C1.to_bb() | SQ::D1.to_bb()
        );
        assert_eq!(info.mask(SQ::E1), Castling::WHITE_ALL);
        assert_eq!(info.mask(SQ::H1), Castling::WHITE_K);
        assert_eq!(info.rook_square(Player::Black, CastleType::KingSide), NO_SQ);
    }

    #[test]
    fn chess960_path_excludes_king_and_rook() {
        // king b1, rook a1: king goes to c1, rook to d1
        let mut info = CastlingInfo::default();
        info.add_right(Player::White, SQ::B1, SQ::A1);
        assert_eq!(
            info.path(Player::White, CastleType::QueenSide),
            SQ::C1.to_bb() | SQ::D1.to_bb()
        );
    }
}
