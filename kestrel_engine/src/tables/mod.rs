//! Statistics tables used for move ordering and evaluation correction.
//!
//! Every table is owned by a single search thread. They are large, so they are always
//! allocated directly on the heap.

pub mod butterfly;
pub mod capture_piece_history;
pub mod continuation;
pub mod correction;
pub mod counter_move;

use std::alloc::{alloc_zeroed, handle_alloc_error, Layout};
use std::mem;
use std::slice;

use self::prelude::*;

pub mod prelude {
    // easier exporting :)
    pub use super::butterfly::ButterflyHistory;
    pub use super::capture_piece_history::CapturePieceToHistory;
    pub use super::continuation::{ContKey, ContinuationHistory, PieceToHistory};
    pub use super::correction::{CorrectionHistory, CorrectionWeights};
    pub use super::counter_move::CounterMoveHistory;
    pub use super::{Histories, NumStatBoard, StatBoard};
}

/// A flat table of `T` entries. Implementors must be plain arrays of `T`, for which the
/// all-zero bit pattern is a valid value.
pub trait StatBoard<T>: Sized
where
    T: Copy + Clone + Sized,
{
    const FILL: T;

    /// Allocates a zeroed table directly on the heap.
    fn new_boxed() -> Box<Self> {
        let layout = Layout::new::<Self>();
        unsafe {
            let ptr = alloc_zeroed(layout) as *mut Self;
            if ptr.is_null() {
                handle_alloc_error(layout);
            }
            Box::from_raw(ptr)
        }
    }

    fn clear(&mut self) {
        self.fill(Self::FILL);
    }

    fn fill(&mut self, val: T) {
        let num: usize = mem::size_of::<Self>() / mem::size_of::<T>();
        let entries = unsafe { slice::from_raw_parts_mut(self as *mut Self as *mut T, num) };
        for e in entries.iter_mut() {
            *e = val;
        }
    }
}

/// A table of history scores, updated with the "gravity" formula
/// `h += bonus - h * |bonus| / D`, which keeps every entry within `[-D, D]`.
pub trait NumStatBoard: StatBoard<i16> {
    const D: i32;

    #[inline(always)]
    fn update(entry: &mut i16, bonus: i32) {
        let bonus = bonus.clamp(-Self::D, Self::D);
        let e = *entry as i32;
        let next = e + bonus - e * bonus.abs() / Self::D;
        debug_assert!(next.abs() <= Self::D);
        *entry = next as i16;
    }
}

/// Every statistics table of one search thread.
pub struct Histories {
    pub main: Box<ButterflyHistory>,
    pub capture: Box<CapturePieceToHistory>,
    pub continuation: Box<ContinuationHistory>,
    pub counter_moves: Box<CounterMoveHistory>,
    pub correction: Box<CorrectionHistory>,
}

impl Default for Histories {
    fn default() -> Self {
        Histories::new()
    }
}

impl Histories {
    pub fn new() -> Histories {
        let mut h = Histories {
            main: ButterflyHistory::new_boxed(),
            capture: CapturePieceToHistory::new_boxed(),
            continuation: ContinuationHistory::new_boxed(),
            counter_moves: CounterMoveHistory::new_boxed(),
            correction: CorrectionHistory::new_boxed(),
        };
        h.clear();
        h
    }

    /// Resets every table to its starting state.
    pub fn clear(&mut self) {
        self.main.clear();
        self.capture.clear();
        self.continuation.reset();
        self.counter_moves.clear();
        self.correction.clear();
    }
}

#[cfg(test)]
mod test {
    use super::prelude::*;
    use kestrel::{BitMove, Piece, Player, SQ};

    #[test]
    fn gravity_stays_bounded() {
        let mut hist = ButterflyHistory::new_boxed();
        let mv = BitMove::make(SQ::E2, SQ::E4);
        for _ in 0..1000 {
            hist.update(Player::White, mv, 2500);
        }
        let v = hist[(Player::White, mv)] as i32;
        assert!(v > 0 && v <= ButterflyHistory::D);
        for _ in 0..1000 {
            hist.update(Player::White, mv, -2500);
        }
        let v = hist[(Player::White, mv)] as i32;
        assert!(v < 0 && v >= -ButterflyHistory::D);
        hist.clear();
        assert_eq!(hist[(Player::White, mv)], 0);
    }

    #[test]
    fn fill_touches_every_entry() {
        let mut cm = CounterMoveHistory::new_boxed();
        let mv = BitMove::make(SQ::A2, SQ::A3);
        cm.fill(mv);
        assert_eq!(cm[(Piece::BlackQueen, SQ::H8)], mv);
        cm.clear();
        assert!(cm[(Piece::BlackQueen, SQ::H8)].is_null());
    }

    #[test]
    fn histories_clear() {
        let mut h = Histories::new();
        let mv = BitMove::make(SQ::G1, SQ::F3);
        h.main.update(Player::White, mv, 500);
        h.counter_moves[(Piece::BlackPawn, SQ::E5)] = mv;
        h.clear();
        assert_eq!(h.main[(Player::White, mv)], 0);
        assert!(h.counter_moves[(Piece::BlackPawn, SQ::E5)].is_null());
    }
}
