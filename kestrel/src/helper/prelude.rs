//! Raw access functions to the statically initialized tables.

use super::boards::BOARDS;
use super::magic;
use super::zobrist::ZOBRIST;

use crate::{BitBoard, Piece, Player, SQ};

/// Builds every table.
#[cold]
pub fn init_statics() {
    magic::init_magics();
    lazy_static::initialize(&BOARDS);
    lazy_static::initialize(&ZOBRIST);
}

// MAGIC FUNCTIONS

#[inline(always)]
pub fn bishop_moves(occupied: BitBoard, sq: SQ) -> BitBoard {
    debug_assert!(sq.is_okay());
    BitBoard(magic::bishop_attacks(occupied.0, sq.0))
}

#[inline(always)]
pub fn rook_moves(occupied: BitBoard, sq: SQ) -> BitBoard {
    debug_assert!(sq.is_okay());
    BitBoard(magic::rook_attacks(occupied.0, sq.0))
}

#[inline(always)]
pub fn queen_moves(occupied: BitBoard, sq: SQ) -> BitBoard {
    debug_assert!(sq.is_okay());
    BitBoard(magic::rook_attacks(occupied.0, sq.0) | magic::bishop_attacks(occupied.0, sq.0))
}

// BOARD FUNCTIONS

#[inline(always)]
pub fn knight_moves(sq: SQ) -> BitBoard {
    BitBoard(BOARDS.knight[sq.0 as usize])
}

#[inline(always)]
pub fn king_moves(sq: SQ) -> BitBoard {
    BitBoard(BOARDS.king[sq.0 as usize])
}

/// Pawn attacks `BitBoard` from a given square, per player.
/// Basically, given square x, returns the BitBoard of squares a pawn on x attacks.
#[inline(always)]
pub fn pawn_attacks_from(sq: SQ, player: Player) -> BitBoard {
    BitBoard(BOARDS.pawn_attacks[player as usize][sq.0 as usize])
}

/// Get the distance of two squares.
#[inline(always)]
pub fn distance_of_sqs(sq_one: SQ, sq_two: SQ) -> u8 {
    BOARDS.distance[sq_one.0 as usize][sq_two.0 as usize]
}

/// Get the line (diagonal / file / rank) `BitBoard` that two squares both exist on, if it exists.
#[inline(always)]
pub fn line_bb(sq_one: SQ, sq_two: SQ) -> BitBoard {
    BitBoard(BOARDS.line[sq_one.0 as usize][sq_two.0 as usize])
}

/// Get the line (diagonal / file / rank) `BitBoard` between two squares, not including the squares, if it exists.
#[inline(always)]
pub fn between_bb(sq_one: SQ, sq_two: SQ) -> BitBoard {
    BitBoard(BOARDS.between[sq_one.0 as usize][sq_two.0 as usize])
}

/// Returns if three Squares are in the same diagonal, file, or rank.
#[inline(always)]
pub fn aligned(s1: SQ, s2: SQ, s3: SQ) -> bool {
    line_bb(s1, s2).contains(s3)
}

// ZOBRIST FUNCTIONS

#[inline(always)]
pub fn z_square(sq: SQ, piece: Piece) -> u64 {
    debug_assert!(sq.is_okay() && piece != Piece::None);
    ZOBRIST.psq[piece as usize][sq.0 as usize]
}

#[inline(always)]
pub fn z_ep(sq: SQ) -> u64 {
    debug_assert!(sq.is_okay());
    ZOBRIST.enpassant[sq.file() as usize]
}

#[inline(always)]
pub fn z_castle(castle: u8) -> u64 {
    ZOBRIST.castle[castle as usize & 0xF]
}

#[inline(always)]
pub fn z_side() -> u64 {
    ZOBRIST.side
}

#[inline(always)]
pub fn z_no_pawns() -> u64 {
    ZOBRIST.no_pawns
}
