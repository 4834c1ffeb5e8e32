//! Module for generating moves from a `Board`. Allow for generating Legal and Pseudo-Legal moves
//! of various types.
//!
//! # Generation Types
//!
//! The Types of moves that can be generated from a [`Board`] are:
//!
//! `All`, `Captures`, `Quiets`, `Evasions`, `NonEvasions`
//!
//! There are all derived from the [`GenTypes`] enum.
//!
//! Generating all moves is legal to do no matter the position. However, `Captures`, `Quiets`
//! and `NonEvasions` can only be done if the board is in NOT in check. Likewise,
//! `Evasions` can only be done when the board is currently in check.
//!
//! `Captures` holds captures and queen promotions. `Quiets` holds the non-captures and every
//! under-promotion, capturing ones included, so the two together are exactly `NonEvasions`.
//!
//! # `Legal` vs. `PseudoLegal` Moves
//!
//! For the generation type, moves can either be generated to be Legal, Or Pseudo-Legal. A Legal
//! move is, for as the name implies, a legal move for the current side to play for a given position.
//! A Pseudo-Legal move is a move that is "likely" to be legal for the current position, but cannot
//! be guaranteed. The search generates pseudo-legal moves and tests legality lazily, as
//! most moves are never reached.
//!
//! [`GenTypes`]: ../../core/enum.GenTypes.html
//! [`Board`]: ../struct.Board.html

use super::Board;

use crate::core::mono_traits::*;
use crate::core::move_list::MVPushable;
use crate::core::piece_move::{BitMove, MoveType};
use crate::core::sq::{NO_SQ, SQ};
use crate::core::*;
use crate::helper::prelude::*;
use crate::BitBoard;

/// Determines the if the moves generated are `PseudoLegal` or `Legal` moves.
/// PseudoLegal moves require that a move's legality is determined before applying
/// to a `Board`.
pub trait Legality {
    /// Returns if the only legal moves should be generated.
    fn gen_legal() -> bool;
}

/// Dummy Struct to represent the generation of `Legal` Moves.
pub struct Legal {}

/// Dummy Struct to represent the generation of `PseudoLegal` Moves.
pub struct PseudoLegal {}

impl Legality for Legal {
    #[inline(always)]
    fn gen_legal() -> bool {
        true
    }
}

impl Legality for PseudoLegal {
    #[inline(always)]
    fn gen_legal() -> bool {
        false
    }
}

/// Public move generator.
pub struct MoveGen {}

impl MoveGen {
    /// Appends all moves of a certain Legality and generation type to the list.
    /// `GenTypes::All` must be resolved to `Evasions` or `NonEvasions` by the caller.
    #[inline]
    pub fn extend<L: Legality, MP: MVPushable>(board: &Board, gen_type: GenTypes, list: &mut MP) {
        match board.turn() {
            Player::White => MoveGen::extend_player::<L, WhiteType, MP>(board, gen_type, list),
            Player::Black => MoveGen::extend_player::<L, BlackType, MP>(board, gen_type, list),
        }
    }

    #[inline(always)]
    fn extend_player<L: Legality, P: PlayerTrait, MP: MVPushable>(
        board: &Board,
        gen_type: GenTypes,
        list: &mut MP,
    ) {
        let mut movegen = InnerMoveGen::<MP>::new(board, list);
        match gen_type {
            GenTypes::Captures => movegen.generate::<L, CapturesGenType, P>(),
            GenTypes::Quiets => movegen.generate::<L, QuietsGenType, P>(),
            GenTypes::Evasions => movegen.generate::<L, EvasionsGenType, P>(),
            _ => movegen.generate::<L, NonEvasionsGenType, P>(),
        }
    }
}

/// Structure to generate moves from. Stores the current state of the board, and other
/// references to help generating all possible moves.
struct InnerMoveGen<'a, MP: MVPushable> {
    list: &'a mut MP,
    board: &'a Board,
    // Squares occupied by all
    occ: BitBoard,
    // Squares occupied by the player to move
    us_occ: BitBoard,
    // Squares occupied by the opposing player
    them_occ: BitBoard,
    // Pieces of the player to move pinned to their king
    pinned: BitBoard,
    ksq: SQ,
}

impl<'a, MP: MVPushable> InnerMoveGen<'a, MP> {
    fn new(board: &'a Board, list: &'a mut MP) -> Self {
        InnerMoveGen {
            list,
            board,
            occ: board.occupied(),
            us_occ: board.get_occupied_player(board.turn()),
            them_occ: board.get_occupied_player(!board.turn()),
            pinned: board.pinned_pieces(board.turn()),
            ksq: board.king_sq(board.turn()),
        }
    }

    /// Directly generates the moves.
    fn generate<L: Legality, G: GenTypeTrait, P: PlayerTrait>(&mut self) {
        let ksq: SQ = self.ksq;
        let checkers = self.board.checkers();
        let evasions = G::gen_type() == GenTypes::Evasions;

        // With two checkers only the king can move.
        if !evasions || !checkers.more_than_one() {
            let target: BitBoard = match G::gen_type() {
                GenTypes::Evasions => between_bb(ksq, checkers.bit_scan_forward()) | checkers,
                GenTypes::Captures => self.them_occ,
                GenTypes::Quiets => !self.occ,
                _ => !self.us_occ,
            };
            self.generate_pawn_moves::<L, G, P>(target);
            self.moves_per_piece::<L, P>(PieceType::N, target);
            self.moves_per_piece::<L, P>(PieceType::B, target);
            self.moves_per_piece::<L, P>(PieceType::R, target);
            self.moves_per_piece::<L, P>(PieceType::Q, target);
        }

        let king_target: BitBoard = match G::gen_type() {
            GenTypes::Evasions => !self.us_occ,
            GenTypes::Captures => self.them_occ,
            GenTypes::Quiets => !self.occ,
            _ => !self.us_occ,
        };
        let king_moves_bb = king_moves(ksq) & king_target;
        self.move_append_from_bb::<L>(king_moves_bb, ksq);

        if (G::gen_type() == GenTypes::Quiets || G::gen_type() == GenTypes::NonEvasions)
            && self.board.castling_rights().player_can_castle(P::player())
        {
            self.castling_side::<L, P>(CastleType::KingSide);
            self.castling_side::<L, P>(CastleType::QueenSide);
        }
    }

    // Generates castling for a single side
    fn castling_side<L: Legality, P: PlayerTrait>(&mut self, side: CastleType) {
        if !self.board.can_castle(P::player(), side) || self.board.castle_impeded(side) {
            return;
        }
        let r_from = self.board.castling_rook_square(side);
        if r_from == NO_SQ {
            return;
        }
        let mv = BitMove::make_special(self.ksq, r_from, MoveType::Castle);
        self.check_and_add::<L>(mv);
    }

    // Generates moves for a single piece type, from a target.
    fn moves_per_piece<L: Legality, P: PlayerTrait>(&mut self, piece: PieceType, target: BitBoard) {
        let pieces: BitBoard = self.board.piece_bb(P::player(), piece);
        for from in pieces {
            let moves_bb: BitBoard = self.moves_bb(piece, from) & target;
            self.move_append_from_bb::<L>(moves_bb, from);
        }
    }

    // Generate pawn moves
    fn generate_pawn_moves<L: Legality, G: GenTypeTrait, P: PlayerTrait>(&mut self, target: BitBoard) {
        let gen_type = G::gen_type();
        let evasions = gen_type == GenTypes::Evasions;

        let rank_7: BitBoard = P::rank_7();
        let rank_3: BitBoard = P::rank_3();

        let pawns: BitBoard = self.board.piece_bb(P::player(), PieceType::P);
        let pawns_rank_7: BitBoard = pawns & rank_7;
        let pawns_not_rank_7: BitBoard = pawns & !rank_7;

        let enemies: BitBoard = if evasions {
            self.them_occ & target
        } else {
            self.them_occ
        };
        let empty_squares: BitBoard = !self.occ;

        // Single and double pushes, no promotions
        if gen_type != GenTypes::Captures {
            let mut push_one: BitBoard = pawns_not_rank_7.shift(P::up()) & empty_squares;
            let mut push_two: BitBoard = (push_one & rank_3).shift(P::up()) & empty_squares;

            if evasions {
                push_one &= target;
                push_two &= target;
            }

            for dst in push_one {
                self.check_and_add::<L>(BitMove::make(dst.offset(-P::up()), dst));
            }
            for dst in push_two {
                self.check_and_add::<L>(BitMove::make(dst.offset(-2 * P::up()), dst));
            }
        }

        // Promotions
        if pawns_rank_7.is_not_empty() {
            let no_cap_promo: BitBoard = pawns_rank_7.shift(P::up())
                & empty_squares
                & if evasions { target } else { BitBoard::ALL };
            let right_cap_promo: BitBoard = pawns_rank_7.shift(P::up_right()) & enemies;
            let left_cap_promo: BitBoard = pawns_rank_7.shift(P::up_left()) & enemies;

            self.create_all_promotions::<L, G>(no_cap_promo, P::up());
            self.create_all_promotions::<L, G>(right_cap_promo, P::up_right());
            self.create_all_promotions::<L, G>(left_cap_promo, P::up_left());
        }

        // Captures and en-passant
        if gen_type != GenTypes::Quiets {
            let right_cap: BitBoard = pawns_not_rank_7.shift(P::up_right()) & enemies;
            let left_cap: BitBoard = pawns_not_rank_7.shift(P::up_left()) & enemies;

            for dst in right_cap {
                self.check_and_add::<L>(BitMove::make(dst.offset(-P::up_right()), dst));
            }
            for dst in left_cap {
                self.check_and_add::<L>(BitMove::make(dst.offset(-P::up_left()), dst));
            }

            let ep_square: SQ = self.board.ep_square();
            if ep_square != NO_SQ {
                let captured_sq = ep_square.offset(-P::up());
                // In check, the capture must take the checker or block its line.
                if evasions && !target.contains(captured_sq) && !target.contains(ep_square) {
                    return;
                }
                let ep_capturers: BitBoard =
                    pawns_not_rank_7 & pawn_attacks_from(ep_square, P::opp_player());
                for from in ep_capturers {
                    self.check_and_add::<L>(BitMove::make_special(from, ep_square, MoveType::EnPassant));
                }
            }
        }
    }

    // Pushes the promotions landing on each square of the BitBoard. Queen promotions count
    // as noisy moves, the under-promotions as quiet ones.
    fn create_all_promotions<L: Legality, G: GenTypeTrait>(&mut self, dsts: BitBoard, direction: i8) {
        let gen_type = G::gen_type();
        for dst in dsts {
            let src = dst.offset(-direction);
            if gen_type != GenTypes::Quiets {
                self.check_and_add::<L>(BitMove::make_promotion(src, dst, PieceType::Q));
            }
            if gen_type != GenTypes::Captures {
                self.check_and_add::<L>(BitMove::make_promotion(src, dst, PieceType::R));
                self.check_and_add::<L>(BitMove::make_promotion(src, dst, PieceType::B));
                self.check_and_add::<L>(BitMove::make_promotion(src, dst, PieceType::N));
            }
        }
    }

    // Return the moves Bitboard
    #[inline]
    fn moves_bb(&self, piece: PieceType, square: SQ) -> BitBoard {
        match piece {
            PieceType::N => knight_moves(square),
            PieceType::B => bishop_moves(self.occ, square),
            PieceType::R => rook_moves(self.occ, square),
            PieceType::Q => queen_moves(self.occ, square),
            PieceType::K => king_moves(square),
            _ => BitBoard(0),
        }
    }

    #[inline]
    fn move_append_from_bb<L: Legality>(&mut self, bits: BitBoard, src: SQ) {
        for dst in bits {
            self.check_and_add::<L>(BitMove::make(src, dst));
        }
    }

    /// Checks if the move is legal, and if so adds to the move list. Only moves of the king,
    /// pinned pieces, en-passant captures and castles can be illegal once pseudo-legal.
    #[inline]
    fn check_and_add<L: Legality>(&mut self, b_move: BitMove) {
        if L::gen_legal() {
            let src = b_move.get_src();
            let risky = src == self.ksq
                || self.pinned.contains(src)
                || b_move.is_en_passant()
                || b_move.is_castle();
            if risky && !self.board.legal_move(b_move) {
                return;
            }
        }
        self.list.push_mv(b_move);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::move_list::MoveList;

    fn pseudo(board: &Board, gen: GenTypes) -> MoveList {
        let mut list = MoveList::default();
        board.generate_pseudolegal_into(gen, &mut list);
        list
    }

    #[test]
    fn captures_and_quiets_partition_non_evasions() {
        let board = Board::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            false,
        )
        .unwrap();
        let all = pseudo(&board, GenTypes::NonEvasions);
        let caps = pseudo(&board, GenTypes::Captures);
        let quiets = pseudo(&board, GenTypes::Quiets);
        assert_eq!(caps.len() + quiets.len(), all.len());
        for mv in caps.iter() {
            assert!(board.is_noisy(*mv));
            assert!(all.contains(*mv));
        }
        for mv in quiets.iter() {
            assert!(!board.is_noisy(*mv));
        }
    }

    #[test]
    fn under_promotions_are_quiet() {
        let board = Board::from_fen("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1", false).unwrap();
        let caps = pseudo(&board, GenTypes::Captures);
        assert_eq!(caps.len(), 1);
        assert_eq!(caps[0].promo_piece(), PieceType::Q);
        let quiets = board.generate_moves_of_type(GenTypes::Quiets);
        assert_eq!(quiets.iter().filter(|m| m.is_promo()).count(), 3);
    }

    #[test]
    fn double_check_only_king_moves() {
        // Rook on e-file and knight on f3 both check the king on e1.
        let board = Board::from_fen("4r1k1/8/8/8/8/5n2/8/R3K3 w - - 0 1", false).unwrap();
        assert_eq!(board.checkers().count_bits(), 2);
        for mv in board.generate_moves().iter() {
            assert_eq!(mv.get_src(), SQ::E1);
        }
    }

    #[test]
    fn horizontal_en_passant_pin() {
        // Capturing en-passant would expose the king on a5 to the rook on h5.
        let board = Board::from_fen("8/8/8/KPp4r/8/8/8/7k w - c6 0 1", false).unwrap();
        assert_eq!(board.ep_square(), SQ::C6);
        assert!(!board
            .generate_moves()
            .iter()
            .any(|m| m.is_en_passant()));
        assert!(board
            .generate_pseudolegal_moves()
            .iter()
            .any(|m| m.is_en_passant()));
    }

    #[test]
    fn castling_through_attack_rejected() {
        // Black bishop on c4 covers f1.
        let board = Board::from_fen("4k3/8/8/8/2b5/8/8/4K2R w K - 0 1", false).unwrap();
        assert!(!board.generate_moves().iter().any(|m| m.is_castle()));
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1", false).unwrap();
        assert!(board.generate_moves().iter().any(|m| m.is_castle()));
    }
}
