//! Primitives for determining the value / score of a position.
//!
//! A `Value` stores a single `i32` to represent a score in centipawn-like internal units,
//! always from the perspective of the side to move.

/// Type for `i32` to determine the `Value` of an evaluation.
pub type Value = i32;

pub const ZERO: Value = 0;
pub const DRAW: Value = 0;
pub const MATE: Value = 32000;
pub const INFINITE: Value = 32001;
pub const NEG_INFINITE: Value = -32001;
/// Marks the absence of a value, e.g. an evaluation that was never computed.
pub const NONE: Value = 32002;

/// The deepest ply any search can reach.
pub const MAX_PLY: i32 = 246;

pub const MATE_IN_MAX_PLY: Value = MATE - MAX_PLY;
pub const MATED_IN_MAX_PLY: Value = -MATE_IN_MAX_PLY;

/// Tablebase scores are reserved between the evaluation range and the mate range.
pub const TB_WIN: Value = MATE_IN_MAX_PLY - 1;
pub const TB_WIN_IN_MAX_PLY: Value = TB_WIN - MAX_PLY;
pub const TB_LOSS_IN_MAX_PLY: Value = -TB_WIN_IN_MAX_PLY;

/// Static evaluations are clamped to this bound.
pub const EVAL_MAX: Value = 29000;

pub const PAWN: Value = 208;
pub const KNIGHT: Value = 781;
pub const BISHOP: Value = 825;
pub const ROOK: Value = 1276;
pub const QUEEN: Value = 2538;

/// Piece values indexed by `PieceType`, used by static exchange evaluation.
pub const PIECE_VALUES: [Value; 8] = [0, PAWN, KNIGHT, BISHOP, ROOK, QUEEN, 0, 0];

/// Score for delivering mate in `ply` plies from the root.
#[inline(always)]
pub const fn mate_in(ply: i32) -> Value {
    MATE - ply
}

/// Score for being mated in `ply` plies from the root.
#[inline(always)]
pub const fn mated_in(ply: i32) -> Value {
    -MATE + ply
}

/// Returns if a value is a mate (or mated) score.
#[inline(always)]
pub fn is_mate(v: Value) -> bool {
    v.abs() >= MATE_IN_MAX_PLY && v.abs() <= MATE
}

/// Returns if a value is a decisive (mate or tablebase) score.
#[inline(always)]
pub fn is_decisive(v: Value) -> bool {
    v.abs() >= TB_WIN_IN_MAX_PLY && v != NONE
}
