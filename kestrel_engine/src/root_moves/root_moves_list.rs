use std::ops::{Deref, DerefMut};

use kestrel::{BitMove, Board, MoveList};

use super::RootMove;

/// The moves searched at the root of a search, best first once sorted.
#[derive(Clone, Debug, Default)]
pub struct RootMoveList {
    moves: Vec<RootMove>,
}

impl RootMoveList {
    /// Creates an empty `RootMoveList`.
    #[inline]
    pub fn new() -> Self {
        RootMoveList { moves: Vec::new() }
    }

    /// The legal moves of `board`, restricted to `search_moves` when that is non-empty.
    pub fn from_board(board: &Board, search_moves: &[BitMove]) -> Self {
        let legal = board.generate_moves();
        let moves = legal
            .iter()
            .filter(|m| search_moves.is_empty() || search_moves.contains(m))
            .map(|m| RootMove::new(*m))
            .collect();
        RootMoveList { moves }
    }

    /// Replaces the current `RootMoveList` with the moves inside a `MoveList`.
    pub fn replace(&mut self, moves: &MoveList) {
        self.moves.clear();
        self.moves.extend(moves.iter().map(|m| RootMove::new(*m)));
    }

    /// Applies `RootMove::rollback()` to each `RootMove` inside.
    #[inline]
    pub fn rollback(&mut self) {
        self.moves.iter_mut().for_each(|b| b.rollback());
    }

    /// Returns the index of the `RootMove` for a given move.
    pub fn find(&self, mov: BitMove) -> Option<usize> {
        self.moves.iter().position(|rm| rm.bit_move() == mov)
    }

    /// Stable sort of the moves in `[start, end)`, best first.
    pub fn sort_range(&mut self, start: usize, end: usize) {
        self.moves[start..end].sort();
    }

    /// Stable sort of the whole list, best first.
    pub fn sort(&mut self) {
        self.moves.sort();
    }

    /// Converts to a `MoveList`.
    pub fn to_list(&self) -> MoveList {
        let mut list = MoveList::default();
        self.moves.iter().for_each(|m| list.push(m.bit_move()));
        list
    }

    /// Returns the previous best score.
    #[inline]
    pub fn prev_best_score(&self) -> i32 {
        self.moves[0].previous_score
    }
}

impl Deref for RootMoveList {
    type Target = [RootMove];

    #[inline]
    fn deref(&self) -> &[RootMove] {
        &self.moves
    }
}

impl DerefMut for RootMoveList {
    #[inline]
    fn deref_mut(&mut self) -> &mut [RootMove] {
        &mut self.moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel::SQ;

    #[test]
    fn search_moves_filter() {
        let board = Board::start_pos();
        let all = RootMoveList::from_board(&board, &[]);
        assert_eq!(all.len(), 20);

        let e4 = BitMove::make(SQ::E2, SQ::E4);
        let only = RootMoveList::from_board(&board, &[e4]);
        assert_eq!(only.len(), 1);
        assert_eq!(only.find(e4), Some(0));
        assert_eq!(all.to_list().len(), 20);
    }

    #[test]
    fn sort_keeps_ties_stable() {
        let board = Board::start_pos();
        let mut list = RootMoveList::from_board(&board, &[]);
        let first = list[0].bit_move();
        let last = list[19].bit_move();
        list[19].insert_score(50);
        list.sort_range(1, 20);
        assert_eq!(list[0].bit_move(), first);
        assert_eq!(list[1].bit_move(), last);
        list.rollback();
        assert_eq!(list[1].previous_score, 50);
    }
}
