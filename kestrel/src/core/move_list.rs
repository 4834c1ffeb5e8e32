//! Contains the `MoveList` & `ScoringMoveList` structures, akin to a `Vec<BitMove>` but faster for
//! our purposes.
//!
//! A [`MoveList`] holds a maximum of 256 moves inline, with no heap allocation. No legal
//! chess position has been found to contain more than 218 moves.
//!
//! The [`ScoringMoveList`] is practically the same as the [`MoveList`], but it allows for each move to
//! have a score attached to it as well, and is the list used by the search's move ordering.
//!
//! [`MoveList`]: struct.MoveList.html
//! [`ScoringMoveList`]: struct.ScoringMoveList.html

use super::piece_move::{BitMove, ScoringMove};

use std::ops::{Deref, DerefMut};

/// The maximum number of moves a list can hold.
pub const MAX_MOVES: usize = 256;

/// Lists that the move generator can push into.
pub trait MVPushable {
    /// Adds a `BitMove` to the end of the list. Does nothing when at capacity.
    fn push_mv(&mut self, mv: BitMove);

    /// Returns the current length.
    fn len(&self) -> usize;

    /// Returns if the list holds no moves.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// This is the list of possible moves for a current position. Think of it alike a faster
/// version of `Vec<BitMove>`, as all the data is stored in the Stack rather than the Heap.
#[derive(Clone)]
pub struct MoveList {
    inner: [BitMove; MAX_MOVES],
    len: usize,
}

impl Default for MoveList {
    #[inline]
    fn default() -> Self {
        MoveList {
            inner: [BitMove::null(); MAX_MOVES],
            len: 0,
        }
    }
}

impl From<Vec<BitMove>> for MoveList {
    fn from(vec: Vec<BitMove>) -> Self {
        let mut list = MoveList::default();
        vec.iter().for_each(|m| list.push(*m));
        list
    }
}

impl MoveList {
    /// Adds a `BitMove` to the end of the list.
    #[inline(always)]
    pub fn push(&mut self, mv: BitMove) {
        self.push_mv(mv);
    }

    /// Creates a `Vec<BitMove>` from this `MoveList`.
    pub fn vec(&self) -> Vec<BitMove> {
        self.as_slice().to_vec()
    }

    /// Returns the moves as a slice.
    #[inline(always)]
    pub fn as_slice(&self) -> &[BitMove] {
        &self.inner[..self.len]
    }

    /// Returns if the list contains the move.
    #[inline]
    pub fn contains(&self, mv: BitMove) -> bool {
        self.as_slice().contains(&mv)
    }

    /// Removes every move.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl MVPushable for MoveList {
    #[inline(always)]
    fn push_mv(&mut self, mv: BitMove) {
        if self.len < MAX_MOVES {
            self.inner[self.len] = mv;
            self.len += 1;
        }
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.len
    }
}

impl Deref for MoveList {
    type Target = [BitMove];

    #[inline(always)]
    fn deref(&self) -> &[BitMove] {
        &self.inner[..self.len]
    }
}

impl DerefMut for MoveList {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut [BitMove] {
        &mut self.inner[..self.len]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a BitMove;
    type IntoIter = std::slice::Iter<'a, BitMove>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

/// A list of moves with scores attached, stored inline.
#[derive(Clone)]
pub struct ScoringMoveList {
    inner: [ScoringMove; MAX_MOVES],
    len: usize,
}

impl Default for ScoringMoveList {
    #[inline]
    fn default() -> Self {
        ScoringMoveList {
            inner: [ScoringMove::default(); MAX_MOVES],
            len: 0,
        }
    }
}

impl ScoringMoveList {
    /// Adds a `ScoringMove` to the end of the list.
    #[inline(always)]
    pub fn push_score(&mut self, mv: ScoringMove) {
        if self.len < MAX_MOVES {
            self.inner[self.len] = mv;
            self.len += 1;
        }
    }

    /// Removes every move.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Shortens the list.
    #[inline(always)]
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }
}

impl MVPushable for ScoringMoveList {
    #[inline(always)]
    fn push_mv(&mut self, mv: BitMove) {
        self.push_score(ScoringMove::new(mv));
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.len
    }
}

impl Deref for ScoringMoveList {
    type Target = [ScoringMove];

    #[inline(always)]
    fn deref(&self) -> &[ScoringMove] {
        &self.inner[..self.len]
    }
}

impl DerefMut for ScoringMoveList {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut [ScoringMove] {
        &mut self.inner[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SQ;

    #[test]
    fn push_and_cap() {
        let mut list = MoveList::default();
        assert!(list.is_empty());
        let m = BitMove::make(SQ::E2, SQ::E4);
        for _ in 0..300 {
            list.push(m);
        }
        assert_eq!(list.len(), MAX_MOVES);
        assert!(list.contains(m));
        list.clear();
        assert!(list.is_empty());
    }
}
