//! Traits and Dummy Types defined for various Enum types. Shouldn't be used in place
//! of their enum representations.
//!
//! This modules only use is to allow for compile-time mono-morphization of the move
//! generator, where each generated function is specialized for one player and one kind
//! of generation.

use super::bitboard::BitBoard;
use super::masks::*;
use super::{GenTypes, Player};

/// Defines a Player Trait, allowing for specific functions in relation
/// to a certain player.
pub trait PlayerTrait {
    /// Return the current `Player`.
    fn player() -> Player;

    /// Return the opposing `Player`.
    fn opp_player() -> Player;

    /// Direction of a pawn push.
    fn up() -> i8;

    /// Direction of a pawn capture towards the H file.
    fn up_right() -> i8;

    /// Direction of a pawn capture towards the A file.
    fn up_left() -> i8;

    /// The seventh rank, relative to the player.
    fn rank_7() -> BitBoard;

    /// The third rank, relative to the player.
    fn rank_3() -> BitBoard;
}

/// Dummy type to represent a `Player::White` which implements `PlayerTrait`.
pub struct WhiteType {}

/// Dummy type to represent a `Player::Black` which implements `PlayerTrait`.
pub struct BlackType {}

impl PlayerTrait for WhiteType {
    #[inline(always)]
    fn player() -> Player {
        Player::White
    }

    #[inline(always)]
    fn opp_player() -> Player {
        Player::Black
    }

    #[inline(always)]
    fn up() -> i8 {
        NORTH
    }

    #[inline(always)]
    fn up_right() -> i8 {
        NORTH_EAST
    }

    #[inline(always)]
    fn up_left() -> i8 {
        NORTH_WEST
    }

    #[inline(always)]
    fn rank_7() -> BitBoard {
        BitBoard::RANK_7
    }

    #[inline(always)]
    fn rank_3() -> BitBoard {
        BitBoard::RANK_3
    }
}

impl PlayerTrait for BlackType {
    #[inline(always)]
    fn player() -> Player {
        Player::Black
    }

    #[inline(always)]
    fn opp_player() -> Player {
        Player::White
    }

    #[inline(always)]
    fn up() -> i8 {
        SOUTH
    }

    #[inline(always)]
    fn up_right() -> i8 {
        SOUTH_EAST
    }

    #[inline(always)]
    fn up_left() -> i8 {
        SOUTH_WEST
    }

    #[inline(always)]
    fn rank_7() -> BitBoard {
        BitBoard::RANK_2
    }

    #[inline(always)]
    fn rank_3() -> BitBoard {
        BitBoard::RANK_6
    }
}

/// A `GenTypeTrait` allows for specific functions in relation
/// to a certain type of move generation.
///
/// Alike `PlayerTrait`, `GenTypeTrait` is only used for compile-time
/// optimization through mono-morphism.
pub trait GenTypeTrait {
    /// Returns the `GenType`.
    fn gen_type() -> GenTypes;
}

/// Dummy type to represent a `GenTypes::Captures` which implements `GenTypeTrait`.
pub struct CapturesGenType {}
/// Dummy type to represent a `GenTypes::Quiets` which implements `GenTypeTrait`.
pub struct QuietsGenType {}
/// Dummy type to represent a `GenTypes::Evasions` which implements `GenTypeTrait`.
pub struct EvasionsGenType {}
/// Dummy type to represent a `GenTypes::NonEvasions` which implements `GenTypeTrait`.
pub struct NonEvasionsGenType {}

impl GenTypeTrait for CapturesGenType {
    #[inline(always)]
    fn gen_type() -> GenTypes {
        GenTypes::Captures
    }
}

impl GenTypeTrait for QuietsGenType {
    #[inline(always)]
    fn gen_type() -> GenTypes {
        GenTypes::Quiets
    }
}

impl GenTypeTrait for EvasionsGenType {
    #[inline(always)]
    fn gen_type() -> GenTypes {
        GenTypes::Evasions
    }
}

impl GenTypeTrait for NonEvasionsGenType {
    #[inline(always)]
    fn gen_type() -> GenTypes {
        GenTypes::NonEvasions
    }
}
