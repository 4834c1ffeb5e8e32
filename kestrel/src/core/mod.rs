//! Contains various components and structures supporting the creation of a chessboard. This
//! includes `SQ`, `BitBoard`, `Player`, `Piece`, `GenTypes`, `Rank`, and `File`.

#[macro_use]
mod macros;

pub mod bitboard;
pub mod masks;
pub mod mono_traits;
pub mod move_list;
pub mod piece_move;
pub mod score;
pub mod sq;

use self::masks::*;
use self::sq::SQ;

use std::fmt;
use std::ops::Not;

/// Array of all real piece types, indexed by their enum value minus one.
pub const ALL_PIECE_TYPES: [PieceType; 6] = [
    PieceType::P,
    PieceType::N,
    PieceType::B,
    PieceType::R,
    PieceType::Q,
    PieceType::K,
];

/// Array of both players, indexed by their enum value.
pub const ALL_PLAYERS: [Player; 2] = [Player::White, Player::Black];

/// Array of all twelve real pieces, indexed by their enum value.
pub const ALL_PIECES: [Piece; PIECE_CNT] = [
    Piece::WhitePawn,
    Piece::WhiteKnight,
    Piece::WhiteBishop,
    Piece::WhiteRook,
    Piece::WhiteQueen,
    Piece::WhiteKing,
    Piece::BlackPawn,
    Piece::BlackKnight,
    Piece::BlackBishop,
    Piece::BlackRook,
    Piece::BlackQueen,
    Piece::BlackKing,
];

/// Array of all `File`s, indexed by their enum value.
pub static ALL_FILES: [File; FILE_CNT] = [
    File::A,
    File::B,
    File::C,
    File::D,
    File::E,
    File::F,
    File::G,
    File::H,
];

/// Array of all `Rank`s, indexed by their enum value.
pub static ALL_RANKS: [Rank; RANK_CNT] = [
    Rank::R1,
    Rank::R2,
    Rank::R3,
    Rank::R4,
    Rank::R5,
    Rank::R6,
    Rank::R7,
    Rank::R8,
];

/// Enum to represent the Players White & Black.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Player {
    White = 0,
    Black = 1,
}

impl Player {
    /// Returns the other player.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kestrel::core::Player;
    ///
    /// let b = Player::Black;
    /// assert_eq!(b.other_player(), Player::White);
    /// ```
    #[inline(always)]
    pub fn other_player(self) -> Player {
        !self
    }

    /// Returns the square as seen from this player's side of the board.
    #[inline(always)]
    pub fn relative_square(self, sq: SQ) -> SQ {
        debug_assert!(sq.is_okay());
        SQ(sq.0 ^ (self as u8 * 56))
    }

    /// Gets the direction of a pawn push for a given player.
    #[inline(always)]
    pub fn pawn_push(self) -> i8 {
        match self {
            Player::White => NORTH,
            Player::Black => SOUTH,
        }
    }

    /// Returns the relative rank of a square in relation to a player.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kestrel::core::{Player, Rank};
    /// use kestrel::SQ;
    ///
    /// assert_eq!(Player::White.relative_rank_of_sq(SQ::A1), Rank::R1);
    /// assert_eq!(Player::Black.relative_rank_of_sq(SQ::H8), Rank::R1);
    /// assert_eq!(Player::Black.relative_rank_of_sq(SQ::A1), Rank::R8);
    /// ```
    #[inline(always)]
    pub fn relative_rank_of_sq(self, sq: SQ) -> Rank {
        self.relative_rank(sq.rank())
    }

    /// Returns the relative rank of a rank in relation to a player.
    #[inline(always)]
    pub fn relative_rank(self, rank: Rank) -> Rank {
        ALL_RANKS[((rank as u8) ^ (self as u8 * 7)) as usize]
    }
}

impl Not for Player {
    type Output = Player;

    #[inline(always)]
    fn not(self) -> Self::Output {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match *self {
            Player::White => "White",
            Player::Black => "Black",
        })
    }
}

/// Types of move generating options.
///
/// `GenTypes::All` -> All available moves.
///
/// `GenTypes::Captures` -> All captures and queen promotions (the "noisy" moves).
///
/// `GenTypes::Quiets` -> All non captures and under-promotions.
///
/// `GenTypes::Evasions` -> Generates evasions for a board in check.
///
/// `GenTypes::NonEvasions` -> Generates all moves for a board not in check.
///
/// # Safety
///
/// `GenTypes::Captures`, `GenTypes::Quiets` and `GenTypes::NonEvasions` can only be used
/// if the board is not in check, while `GenTypes::Evasions` can only be used if the
/// board is in check. `GenTypes::All` can be used whenever.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GenTypes {
    All,
    Captures,
    Quiets,
    Evasions,
    NonEvasions,
}

/// All possible Types of Pieces on a chessboard.
///
/// For a representation of pieces considering color as well, see [`Piece`].
#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum PieceType {
    None = 0,
    P = 1,
    N = 2,
    B = 3,
    R = 4,
    Q = 5,
    K = 6,
    All = 7,
}

impl PieceType {
    /// Returns if the piece is `PieceType::None`
    #[inline(always)]
    pub fn is_none(self) -> bool {
        self == PieceType::None
    }

    /// Returns if the piece is not `PieceType::None`
    #[inline(always)]
    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    /// Checks if the piece is actually real, as in the Piece is not `None` or `All`.
    #[inline(always)]
    pub fn is_real(self) -> bool {
        self != PieceType::None && self != PieceType::All
    }

    /// Index of a real piece type, pawn = 0 through king = 5.
    #[inline(always)]
    pub fn idx(self) -> usize {
        debug_assert!(self.is_real());
        self as usize - 1
    }

    /// Return the lowercase character of a `PieceType`.
    #[inline]
    pub fn char_lower(self) -> char {
        match self {
            PieceType::P => 'p',
            PieceType::N => 'n',
            PieceType::B => 'b',
            PieceType::R => 'r',
            PieceType::Q => 'q',
            PieceType::K => 'k',
            _ => '-',
        }
    }

    /// Parses a lowercase or uppercase piece letter.
    pub fn from_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::P),
            'n' => Some(PieceType::N),
            'b' => Some(PieceType::B),
            'r' => Some(PieceType::R),
            'q' => Some(PieceType::Q),
            'k' => Some(PieceType::K),
            _ => None,
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            PieceType::P => "Pawn",
            PieceType::N => "Knight",
            PieceType::B => "Bishop",
            PieceType::R => "Rook",
            PieceType::Q => "Queen",
            PieceType::K => "King",
            PieceType::All => "All",
            PieceType::None => "",
        };
        f.pad(s)
    }
}

/// All possible pieces on a chessboard, for both colors, densely packed from 0 to 11.
///
/// For a representation of Only Pieces (with no color attached), see [`PieceType`].
#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub enum Piece {
    WhitePawn = 0,
    WhiteKnight = 1,
    WhiteBishop = 2,
    WhiteRook = 3,
    WhiteQueen = 4,
    WhiteKing = 5,
    BlackPawn = 6,
    BlackKnight = 7,
    BlackBishop = 8,
    BlackRook = 9,
    BlackQueen = 10,
    BlackKing = 11,
    None = 12,
}

impl Piece {
    /// Creates a `Piece` from a player and a real piece type. Returns `Piece::None` for
    /// the `None` and `All` piece types.
    ///
    /// ```
    /// use kestrel::{Piece, Player, PieceType};
    ///
    /// assert_eq!(Piece::make(Player::Black, PieceType::N), Piece::BlackKnight);
    /// assert_eq!(Piece::make(Player::White, PieceType::None), Piece::None);
    /// ```
    #[inline(always)]
    pub fn make(player: Player, piece_type: PieceType) -> Piece {
        if piece_type.is_real() {
            ALL_PIECES[player as usize * 6 + piece_type.idx()]
        } else {
            Piece::None
        }
    }

    /// Returns the `Player` of a piece, if any.
    #[inline(always)]
    pub fn player(self) -> Option<Player> {
        if self == Piece::None {
            None
        } else {
            Some(self.player_lossy())
        }
    }

    /// Returns the `Player` of a `Piece`. Must only be called on a real piece.
    #[inline(always)]
    pub fn player_lossy(self) -> Player {
        debug_assert!(self != Piece::None);
        if (self as u8) < 6 {
            Player::White
        } else {
            Player::Black
        }
    }

    /// Returns the `PieceType`, `PieceType::None` for `Piece::None`.
    #[inline(always)]
    pub fn type_of(self) -> PieceType {
        if self == Piece::None {
            PieceType::None
        } else {
            ALL_PIECE_TYPES[self as usize % 6]
        }
    }

    /// Returns if this is `Piece::None`.
    #[inline(always)]
    pub fn is_none(self) -> bool {
        self == Piece::None
    }

    /// Returns the FEN character of the piece: uppercase for white, lowercase for black.
    pub fn character(self) -> Option<char> {
        let lower = self.type_of().char_lower();
        match self.player()? {
            Player::White => Some(lower.to_ascii_uppercase()),
            Player::Black => Some(lower),
        }
    }

    /// Parses a FEN piece character.
    pub fn from_char(c: char) -> Option<Piece> {
        let pt = PieceType::from_char(c)?;
        let player = if c.is_ascii_uppercase() {
            Player::White
        } else {
            Player::Black
        };
        Some(Piece::make(player, pt))
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.character() {
            Some(c) => write!(f, "{}", c),
            None => write!(f, "-"),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Enum for the Files of a Chessboard.
#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    /// Returns the `BitBoard` of the file.
    #[inline(always)]
    pub fn bb(self) -> u64 {
        FILE_BB[self as usize]
    }

    /// Lowercase character of the file.
    #[inline]
    pub fn to_char(self) -> char {
        (b'a' + self as u8) as char
    }
}

/// Enum for the Ranks of a Chessboard.
#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Rank {
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,
    R6 = 5,
    R7 = 6,
    R8 = 7,
}

impl Rank {
    /// Returns the `BitBoard` of the rank.
    #[inline(always)]
    pub fn bb(self) -> u64 {
        RANK_BB[self as usize]
    }

    /// Character of the rank.
    #[inline]
    pub fn to_char(self) -> char {
        (b'1' + self as u8) as char
    }
}

/// Types of Castling available to a player.
#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CastleType {
    KingSide = 0,
    QueenSide = 1,
}
