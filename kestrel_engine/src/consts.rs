//! Constant values and node-type markers shared by the search.

use kestrel::core::score;

/// The deepest ply the search will ever reach.
pub const MAX_PLY: usize = score::MAX_PLY as usize;
/// Frames before ply zero, read by continuation-history lookups.
pub const STACK_OFFSET: usize = 7;
/// Total frames held by a searcher's stack.
pub const THREAD_STACK_SIZE: usize = MAX_PLY + STACK_OFFSET + 3;
pub const MAX_THREADS: usize = 256;

/// Default hash size in megabytes.
pub const DEFAULT_TT_SIZE: usize = 16;
pub const MAX_TT_SIZE: usize = 33_554_432;

/// Default time in milliseconds reserved for communication with the GUI.
pub const DEFAULT_MOVE_OVERHEAD: i64 = 10;

/// Stack size given to each search thread.
pub const SEARCH_THREAD_STACK: usize = 32 * 1024 * 1024;

/// Internal score units per displayed centipawn pawn. The built-in network already
/// evaluates in centipawns.
pub const NORMALIZE_TO_PAWN_VALUE: i32 = 100;

/// Converts an internal score into centipawns for display.
#[inline]
pub fn to_centipawns(v: i32) -> i32 {
    v * 100 / NORMALIZE_TO_PAWN_VALUE
}

/// Marker for the kind of node being searched, resolved at compile time.
pub trait PVNode {
    fn is_pv() -> bool;
    fn is_root() -> bool {
        false
    }
}

pub struct Root {}
pub struct PV {}
pub struct NonPV {}

impl PVNode for Root {
    fn is_pv() -> bool {
        true
    }

    fn is_root() -> bool {
        true
    }
}

impl PVNode for PV {
    fn is_pv() -> bool {
        true
    }
}

impl PVNode for NonPV {
    fn is_pv() -> bool {
        false
    }
}
