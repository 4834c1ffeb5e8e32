//! perft, or Performance Test, Move Path Enumeration, tests the correctness of move-generation.
//!
//! Use these functions on a [`Board`] to test that the correct amount of leaf nodes are created.
//!
//! [`Board`]: ../struct.Board.html

use super::Board;
use crate::core::piece_move::BitMove;

/// Holds all information about the number of nodes counted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PerftNodes {
    /// Total number of nodes counted.
    pub nodes: u64,
    /// Number of capturing moves, including en-passant moves.
    pub captures: u64,
    /// Number of En-Passant moves.
    pub en_passant: u64,
    /// Number of Castles.
    pub castles: u64,
    /// The number of promotions
    pub promotions: u64,
    /// The number of checking moves.
    pub checks: u64,
    /// The number of moves resulting in a checkmate.
    pub checkmates: u64,
}

/// Returns the number of leaf nodes from generating moves to a certain depth.
pub fn perft(board: &Board, depth: u16) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut pos = board.clone();
    inner_perft(&mut pos, depth)
}

/// Returns the leaf count below each legal root move, in generation order.
///
/// ```
/// use kestrel::Board;
/// use kestrel::board::perft::{divide, perft};
///
/// let board = Board::start_pos();
/// let split = divide(&board, 2);
/// assert_eq!(split.len(), 20);
/// assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), perft(&board, 2));
/// ```
pub fn divide(board: &Board, depth: u16) -> Vec<(BitMove, u64)> {
    let mut pos = board.clone();
    let moves = pos.generate_moves();
    let mut split = Vec::with_capacity(moves.len());
    for mv in moves.iter() {
        pos.apply_move(*mv);
        let nodes = if depth <= 1 {
            1
        } else {
            inner_perft(&mut pos, depth - 1)
        };
        pos.undo_move();
        split.push((*mv, nodes));
    }
    split
}

/// Returns the count of all move types for the leaf nodes up to a certain depth.
pub fn perft_all(board: &Board, depth: u16) -> PerftNodes {
    let mut pos = board.clone();
    let mut perft = PerftNodes::default();
    inner_perft_all(&mut pos, depth, &mut perft);
    perft
}

fn inner_perft(board: &mut Board, depth: u16) -> u64 {
    let moves = board.generate_moves();

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut count: u64 = 0;
    for mv in moves.iter() {
        board.apply_move(*mv);
        count += inner_perft(board, depth - 1);
        board.undo_move();
    }
    count
}

fn inner_perft_all(board: &mut Board, depth: u16, perft: &mut PerftNodes) {
    if depth == 0 {
        perft.nodes += 1;
        return;
    }
    let moves = board.generate_moves();
    for mv in moves.iter() {
        let leaf = depth == 1;
        if leaf {
            if board.is_capture(*mv) {
                perft.captures += 1;
            }
            if mv.is_en_passant() {
                perft.en_passant += 1;
            }
            if mv.is_castle() {
                perft.castles += 1;
            }
            if mv.is_promo() {
                perft.promotions += 1;
            }
        }
        let gives_check = board.apply_move(*mv);
        if leaf && gives_check {
            perft.checks += 1;
            if board.generate_moves().is_empty() {
                perft.checkmates += 1;
            }
        }
        inner_perft_all(board, depth - 1, perft);
        board.undo_move();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(
        nodes: u64,
        captures: u64,
        en_passant: u64,
        castles: u64,
        promotions: u64,
        checks: u64,
        checkmates: u64,
    ) -> PerftNodes {
        PerftNodes {
            nodes,
            captures,
            en_passant,
            castles,
            promotions,
            checks,
            checkmates,
        }
    }

    #[test]
    fn start_pos_perft() {
        let b: Board = Board::start_pos();
        assert_eq!(1, perft(&b, 0));
        assert_eq!(20, perft(&b, 1));
        assert_eq!(400, perft(&b, 2));
        assert_eq!(8902, perft(&b, 3));
    }

    #[test]
    fn start_pos_perft_all() {
        let b: Board = Board::start_pos();
        assert_eq!(perft_all(&b, 3), nodes(8902, 34, 0, 0, 0, 12, 0));
        assert_eq!(perft_all(&b, 4), nodes(197_281, 1576, 0, 0, 0, 469, 8));
    }

    #[test]
    fn kiwipete_perft_all() {
        let b: Board =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -", false)
                .unwrap();
        assert_eq!(perft_all(&b, 1), nodes(48, 8, 0, 2, 0, 0, 0));
        assert_eq!(perft_all(&b, 2), nodes(2039, 351, 1, 91, 0, 3, 0));
        assert_eq!(perft_all(&b, 3), nodes(97862, 17102, 45, 3162, 0, 993, 1));
    }

    #[test]
    fn divide_sums_to_perft() {
        let b: Board = Board::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -", false).unwrap();
        let split = divide(&b, 3);
        assert_eq!(split.len(), 14);
        assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), 2812);
    }
}
