//! This module contains the basic RootMove structures, allowing for storage of the moves from a specific position
//! alongside information about each of the moves.

pub mod root_moves_list;

use std::cmp::Ordering as CmpOrder;

use kestrel::core::score::*;
use kestrel::BitMove;

pub use self::root_moves_list::RootMoveList;

/// Keeps track of information of a move for the position to be searched.
#[derive(Clone, Debug)]
pub struct RootMove {
    pub score: i32,
    pub previous_score: i32,
    /// Running average of the scores, used to center aspiration windows.
    pub average_score: i32,
    /// Score shown in the info lines, may be a bound.
    pub uci_score: i32,
    pub score_lowerbound: bool,
    pub score_upperbound: bool,
    pub sel_depth: i32,
    /// Tablebase rank, always zero without tablebases.
    pub tb_rank: i32,
    /// Nodes spent in the subtree of this move.
    pub effort: u64,
    /// The principal variation, starting with the move itself.
    pub pv: Vec<BitMove>,
}

impl RootMove {
    /// Creates a new `RootMove`.
    #[inline]
    pub fn new(bit_move: BitMove) -> Self {
        RootMove {
            score: NEG_INFINITE,
            previous_score: NEG_INFINITE,
            average_score: NEG_INFINITE,
            uci_score: NEG_INFINITE,
            score_lowerbound: false,
            score_upperbound: false,
            sel_depth: 0,
            tb_rank: 0,
            effort: 0,
            pv: vec![bit_move],
        }
    }

    /// The move itself.
    #[inline(always)]
    pub fn bit_move(&self) -> BitMove {
        self.pv[0]
    }

    /// Records a new score, keeping the running average.
    #[inline]
    pub fn insert_score(&mut self, score: i32) {
        self.average_score = if self.average_score == NEG_INFINITE {
            score
        } else {
            (2 * score + self.average_score) / 3
        };
        self.score = score;
        self.uci_score = score;
    }

    /// Replaces the PV after the move itself.
    pub fn set_pv(&mut self, child_pv: &[BitMove]) {
        self.pv.truncate(1);
        self.pv.extend(child_pv.iter().take_while(|m| !m.is_null()));
    }

    /// Places the current score in the previous score.
    #[inline]
    pub fn rollback(&mut self) {
        self.previous_score = self.score;
    }
}

// Moves with higher score for a higher depth are less
impl Ord for RootMove {
    #[inline]
    fn cmp(&self, other: &RootMove) -> CmpOrder {
        other
            .score
            .cmp(&self.score)
            .then_with(|| other.previous_score.cmp(&self.previous_score))
    }
}

impl PartialOrd for RootMove {
    fn partial_cmp(&self, other: &RootMove) -> Option<CmpOrder> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RootMove {
    fn eq(&self, other: &RootMove) -> bool {
        self.score == other.score && self.previous_score == other.previous_score
    }
}

impl Eq for RootMove {}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel::SQ;

    #[test]
    fn higher_scores_sort_first() {
        let mut a = RootMove::new(BitMove::make(SQ::E2, SQ::E4));
        let mut b = RootMove::new(BitMove::make(SQ::D2, SQ::D4));
        a.insert_score(10);
        b.insert_score(30);
        let mut v = vec![a, b];
        v.sort();
        assert_eq!(v[0].bit_move(), BitMove::make(SQ::D2, SQ::D4));
    }

    #[test]
    fn average_and_pv() {
        let mut rm = RootMove::new(BitMove::make(SQ::E2, SQ::E4));
        rm.insert_score(90);
        assert_eq!(rm.average_score, 90);
        rm.insert_score(0);
        assert_eq!(rm.average_score, 30);
        rm.set_pv(&[BitMove::make(SQ::E7, SQ::E5), BitMove::null(), BitMove::make(SQ::A2, SQ::A3)]);
        assert_eq!(rm.pv.len(), 2);
        rm.set_pv(&[]);
        assert_eq!(rm.pv, vec![BitMove::make(SQ::E2, SQ::E4)]);
    }
}
