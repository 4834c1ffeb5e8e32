//! This module contains [`Board`], the object representing the current state of a chessboard.
//! All modifications to the current state of the board is done through this object, as well as
//! gathering information about the current state of the board.
//!
//! This module also contains structures used by the board, such as [`Castling`] for
//! determining castling rights throughout a game, and [`DirtyPiece`], the record of the
//! pieces a move displaced, which incremental evaluators consume.
//!
//! [`Board`]: struct.Board.html
//! [`Castling`]: castle_rights/struct.Castling.html
//! [`DirtyPiece`]: board_state/struct.DirtyPiece.html

pub mod board_state;
pub mod castle_rights;
pub mod fen;
pub mod movegen;
pub mod perft;

use crate::core::masks::*;
use crate::core::move_list::{MVPushable, MoveList};
use crate::core::piece_move::{BitMove, MoveType};
use crate::core::score::{Value, PIECE_VALUES};
use crate::core::sq::{NO_SQ, SQ};
use crate::core::*;
use crate::helper::prelude::*;
use crate::BitBoard;

use self::board_state::{BoardState, DirtyPiece};
use self::castle_rights::{castle_destinations, Castling, CastlingInfo};
use self::movegen::{Legal, MoveGen, PseudoLegal};

pub use self::fen::FenBuildError;

use std::cmp::min;
use std::fmt;

/// Represents a Chessboard through a `Board`.
///
/// Board contains everything that needs to be known about the current state of the Game. It is used
/// by both the search and the UCI front-end alike. Each search thread owns its own copy.
///
/// # Examples
///
/// ```
/// use kestrel::Board;
///
/// let mut chessboard = Board::start_pos();
///
/// let moves = chessboard.generate_moves();
/// chessboard.apply_move(moves[0]);
///
/// let b2 = chessboard.clone();
/// assert_eq!(chessboard.moves_played(), b2.moves_played());
/// ```
///
/// # `BitBoard` Representation
///
/// For the majority of the struct, the board utilizes [BitBoard]s, which is a u64 where each bit
/// represents an occupied location, and each bit index represents a certain square (as in bit 0 is
/// Square A1, bit 1 is B1, etc.). Alongside the bitboards sits a mailbox of all 64 squares,
/// so the piece on a square can be found without scanning.
#[derive(Clone)]
pub struct Board {
    turn: Player,
    board: [Piece; SQ_CNT],
    // Occupancy per piece type, both players. Index `PieceType::All` is all pieces.
    type_bbs: [BitBoard; PIECE_TYPE_CNT],
    // Occupancy per player
    occ: [BitBoard; PLAYER_CNT],
    piece_counts: [u8; PIECE_CNT],
    castling: CastlingInfo,
    chess960: bool,
    // Plies played since the start of the game
    half_moves: u16,
    // One state per move played, the last entry is the current state.
    states: Vec<BoardState>,
}

/// The hash keys of a position, as recomputed from scratch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PositionKeys {
    pub zobrist: u64,
    pub pawn: u64,
    pub non_pawn: [u64; PLAYER_CNT],
    pub material: u64,
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty_string())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.fen())
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Board) -> bool {
        self.turn == other.turn
            && self.board == other.board
            && self.type_bbs == other.type_bbs
            && self.occ == other.occ
            && self.state().castling == other.state().castling
            && self.state().ep_square == other.state().ep_square
            && self.state().zobrist == other.state().zobrist
            && self.state().pawn_key == other.state().pawn_key
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::start_pos()
    }
}

impl Board {
    /// Constructs a board from the starting position.
    ///
    /// ```
    /// use kestrel::{Board, Player};
    ///
    /// let chessboard = Board::start_pos();
    /// assert_eq!(chessboard.count_all_pieces(), 32);
    /// assert_eq!(chessboard.turn(), Player::White);
    /// ```
    pub fn start_pos() -> Board {
        match Board::from_fen(START_FEN, false) {
            Ok(board) => board,
            Err(e) => unreachable!("start position must parse: {}", e),
        }
    }

    /// An empty board, used as the base when building from a fen.
    fn blank(chess960: bool) -> Board {
        init_statics();
        Board {
            turn: Player::White,
            board: [Piece::None; SQ_CNT],
            type_bbs: [BitBoard(0); PIECE_TYPE_CNT],
            occ: [BitBoard(0); PLAYER_CNT],
            piece_counts: [0; PIECE_CNT],
            castling: CastlingInfo::default(),
            chess960,
            half_moves: 0,
            states: Vec::with_capacity(256),
        }
    }

    /// Returns the current state.
    #[inline(always)]
    pub(crate) fn state(&self) -> &BoardState {
        // A board always holds its root state.
        &self.states[self.states.len() - 1]
    }

    /// Applies a move to the Board, returning if the move gives check.
    ///
    /// # Safety
    ///
    /// The passed in [BitMove] must be a legal move for the current position. Moves
    /// from outside the move generator must pass `pseudo_legal_move` and `legal_move` first.
    ///
    /// # Examples
    ///
    /// ```
    /// use kestrel::Board;
    ///
    /// let mut chessboard = Board::start_pos();
    /// let moves = chessboard.generate_moves();
    /// let gives_check = chessboard.apply_move(moves[0]);
    /// assert!(!gives_check);
    /// assert_eq!(chessboard.moves_played(), 1);
    /// ```
    pub fn apply_move(&mut self, bit_move: BitMove) -> bool {
        debug_assert!(bit_move.is_okay());

        let us = self.turn;
        let them = !us;
        let from: SQ = bit_move.get_src();
        let to: SQ = bit_move.get_dest();
        let piece: Piece = self.piece_at_sq(from);
        debug_assert_eq!(piece.player(), Some(us));

        let captured: Piece = match bit_move.move_type() {
            MoveType::EnPassant => Piece::make(them, PieceType::P),
            MoveType::Castle => Piece::None,
            _ => self.piece_at_sq(to),
        };

        let mut st: BoardState = self.state().partial_clone();
        st.rule_50 += 1;
        st.plies_from_null += 1;
        st.prev_move = bit_move;
        self.half_moves += 1;

        let mut zob: u64 = st.zobrist ^ z_side();

        if bit_move.is_castle() {
            let (k_to, r_to) = self.do_castling(us, from, to);
            let rook = Piece::make(us, PieceType::R);
            let castle_key = z_square(from, piece)
                ^ z_square(k_to, piece)
                ^ z_square(to, rook)
                ^ z_square(r_to, rook);
            zob ^= castle_key;
            st.non_pawn_key[us as usize] ^= castle_key;
            st.dirty.push(piece, from, k_to);
            st.dirty.push(rook, to, r_to);
        } else {
            st.dirty.push(piece, from, to);
            if captured != Piece::None {
                let cap_sq = if bit_move.is_en_passant() {
                    to.offset(-us.pawn_push())
                } else {
                    to
                };
                if captured.type_of() == PieceType::P {
                    st.pawn_key ^= z_square(cap_sq, captured);
                } else {
                    st.non_pawn_key[them as usize] ^= z_square(cap_sq, captured);
                    st.non_pawn_material[them as usize] -= PIECE_VALUES[captured.type_of() as usize];
                }
                self.remove_piece(captured, cap_sq);
                st.material_key ^= z_material(captured, self.piece_counts[captured as usize]);
                zob ^= z_square(cap_sq, captured);
                st.rule_50 = 0;
                st.dirty.push(captured, cap_sq, NO_SQ);
            }
            zob ^= z_square(from, piece) ^ z_square(to, piece);
            self.move_piece(piece, from, to);
        }

        // Reset en-passant
        if st.ep_square != NO_SQ {
            zob ^= z_ep(st.ep_square);
            st.ep_square = NO_SQ;
        }

        // Update castling rights
        let lost: Castling = self.castling.mask(from) | self.castling.mask(to);
        if st.castling.intersects(lost) {
            zob ^= z_castle(st.castling.bits());
            st.castling.remove(lost);
            zob ^= z_castle(st.castling.bits());
        }

        if piece.type_of() == PieceType::P {
            if (to.0 as i8 - from.0 as i8).abs() == 16 {
                let ep = to.offset(-us.pawn_push());
                if (pawn_attacks_from(ep, us) & self.piece_bb(them, PieceType::P)).is_not_empty() {
                    st.ep_square = ep;
                    zob ^= z_ep(ep);
                }
            } else if bit_move.is_promo() {
                let promo = Piece::make(us, bit_move.promo_piece());
                self.remove_piece(piece, to);
                st.material_key ^= z_material(piece, self.piece_counts[piece as usize]);
                self.put_piece(promo, to);
                st.material_key ^= z_material(promo, self.piece_counts[promo as usize] - 1);

                zob ^= z_square(to, piece) ^ z_square(to, promo);
                st.pawn_key ^= z_square(to, piece);
                st.non_pawn_key[us as usize] ^= z_square(to, promo);
                st.non_pawn_material[us as usize] += PIECE_VALUES[promo.type_of() as usize];

                st.dirty.to[0] = NO_SQ;
                st.dirty.push(promo, NO_SQ, to);
            }
            st.pawn_key ^= z_square(from, piece) ^ z_square(to, piece);
            st.rule_50 = 0;
        } else if !bit_move.is_castle() {
            st.non_pawn_key[us as usize] ^= z_square(from, piece) ^ z_square(to, piece);
        }

        st.captured_piece = captured;
        st.zobrist = zob;
        self.turn = them;

        st.checkers = self.attackers_to(self.king_sq(them), self.occupied()) & self.occ[us as usize];
        self.set_check_info(&mut st);
        self.set_repetition(&mut st);

        let gives_check = st.checkers.is_not_empty();
        self.states.push(st);

        debug_assert!(self.is_ok_quick());
        debug_assert_eq!(self.keys_from_scratch(), self.keys());
        gives_check
    }

    /// Applies a UCI move to the board. If the move is a valid string representing a legal
    /// move, then true will be returned & the move will be applied. Otherwise, false is
    /// returned and the board isn't changed.
    ///
    /// Castling is accepted both as king-to-destination (`e1g1`) and king-takes-rook
    /// (`e1h1`), whatever the Chess960 setting.
    ///
    /// # Examples
    ///
    /// ```
    /// use kestrel::Board;
    ///
    /// let mut board = Board::start_pos();
    /// let success = board.apply_uci_move("e2e4");
    ///
    /// assert!(success);
    /// assert!(!board.apply_uci_move("e2e4"));
    /// ```
    pub fn apply_uci_move(&mut self, uci_move: &str) -> bool {
        match self.parse_uci_move(uci_move) {
            Some(mv) => {
                self.apply_move(mv);
                true
            }
            None => false,
        }
    }

    /// Finds the legal move matching a string in long algebraic notation.
    pub fn parse_uci_move(&self, uci_move: &str) -> Option<BitMove> {
        self.generate_moves()
            .iter()
            .find(|m| m.stringify(self.chess960) == uci_move || m.stringify(!self.chess960) == uci_move)
            .copied()
    }

    /// Un-does the previously applied move, allowing the Board to return to it's most
    /// recently held state.
    ///
    /// # Panics
    ///
    /// Panics if there is no move to undo, or if the last move was a null move.
    pub fn undo_move(&mut self) {
        assert!(self.states.len() > 1, "no move to undo");
        assert!(self.state().prev_move.is_okay(), "last move was a null move");
        let st = match self.states.pop() {
            Some(st) => st,
            None => return,
        };
        let undo_move: BitMove = st.prev_move;

        self.turn = !self.turn;
        let us = self.turn;
        let from: SQ = undo_move.get_src();
        let to: SQ = undo_move.get_dest();

        if undo_move.is_castle() {
            self.undo_castling(us, from, to);
        } else {
            let mut piece_on: Piece = self.piece_at_sq(to);
            if undo_move.is_promo() {
                self.remove_piece(piece_on, to);
                piece_on = Piece::make(us, PieceType::P);
                self.put_piece(piece_on, to);
            }
            self.move_piece(piece_on, to, from);
            if st.captured_piece != Piece::None {
                let cap_sq = if undo_move.is_en_passant() {
                    to.offset(-us.pawn_push())
                } else {
                    to
                };
                self.put_piece(st.captured_piece, cap_sq);
            }
        }
        self.half_moves -= 1;

        debug_assert!(self.is_ok_quick());
    }

    /// Apply a "Null Move" to the board, essentially swapping the current turn of
    /// the board without moving any pieces.
    ///
    /// Only used by the search. The side to move must not be in check.
    ///
    /// ```rust
    /// use kestrel::Board;
    ///
    /// let mut chessboard = Board::start_pos();
    /// let key = chessboard.zobrist();
    ///
    /// chessboard.apply_null_move();
    /// assert_ne!(chessboard.zobrist(), key);
    ///
    /// chessboard.undo_null_move();
    /// assert_eq!(chessboard.zobrist(), key);
    /// ```
    pub fn apply_null_move(&mut self) {
        debug_assert!(self.checkers().is_empty());

        let mut st = self.state().partial_clone();
        st.zobrist ^= z_side();
        if st.ep_square != NO_SQ {
            st.zobrist ^= z_ep(st.ep_square);
            st.ep_square = NO_SQ;
        }
        st.rule_50 += 1;
        st.plies_from_null = 0;
        st.prev_move = BitMove::NONE_NULL;

        self.turn = !self.turn;
        self.set_check_info(&mut st);
        self.states.push(st);
    }

    /// Undo a "Null Move" to the Board, returning to the previous state.
    ///
    /// # Panics
    ///
    /// Panics if the last move played was not a null move.
    pub fn undo_null_move(&mut self) {
        assert_eq!(self.state().prev_move, BitMove::NONE_NULL);
        self.states.pop();
        self.turn = !self.turn;
    }

    /// Get a List of legal `BitMove`s for the player whose turn it is to move.
    ///
    /// This method already takes into account if the Board is currently in check, and will return
    /// legal moves only.
    ///
    /// # Examples
    ///
    /// ```
    /// use kestrel::Board;
    ///
    /// let chessboard = Board::start_pos();
    /// let moves = chessboard.generate_moves();
    ///
    /// assert_eq!(moves.len(), 20);
    /// ```
    pub fn generate_moves(&self) -> MoveList {
        self.generate_moves_of_type(GenTypes::All)
    }

    /// Get a List of all PseudoLegal `BitMove`s for the player whose turn it is to move.
    /// Works exactly the same as `Board::generate_moves()`, but doesn't guarantee that all
    /// the moves are legal for the current position. Moves need to be checked with a
    /// `Board::legal_move(move)` in order to be certain of a legal move.
    pub fn generate_pseudolegal_moves(&self) -> MoveList {
        let mut list = MoveList::default();
        MoveGen::extend::<PseudoLegal, MoveList>(self, self.resolve_gen_type(GenTypes::All), &mut list);
        list
    }

    /// Get a List of legal `BitMove`s of a certain type.
    ///
    /// # Panics
    ///
    /// `GenTypes::Captures`, `GenTypes::Quiets` and `GenTypes::NonEvasions` panic if the
    /// board is in check, `GenTypes::Evasions` panics if it is not.
    ///
    /// ```
    /// use kestrel::{Board, GenTypes};
    ///
    /// let board = Board::start_pos();
    /// assert!(board.generate_moves_of_type(GenTypes::Captures).is_empty());
    /// assert_eq!(board.generate_moves_of_type(GenTypes::Quiets).len(), 20);
    /// ```
    pub fn generate_moves_of_type(&self, gen_type: GenTypes) -> MoveList {
        let mut list = MoveList::default();
        MoveGen::extend::<Legal, MoveList>(self, self.resolve_gen_type(gen_type), &mut list);
        list
    }

    /// Appends the pseudo-legal moves of a certain type to a list.
    ///
    /// Same preconditions as `Board::generate_moves_of_type`.
    pub fn generate_pseudolegal_into<MP: MVPushable>(&self, gen_type: GenTypes, list: &mut MP) {
        MoveGen::extend::<PseudoLegal, MP>(self, self.resolve_gen_type(gen_type), list);
    }

    fn resolve_gen_type(&self, gen_type: GenTypes) -> GenTypes {
        match gen_type {
            GenTypes::All if self.in_check() => GenTypes::Evasions,
            GenTypes::All => GenTypes::NonEvasions,
            GenTypes::Evasions => {
                assert!(self.in_check());
                gen_type
            }
            _ => {
                assert!(!self.in_check());
                gen_type
            }
        }
    }

    /// Moves the king and rook of a castle, returning their destination squares.
    fn do_castling(&mut self, us: Player, k_from: SQ, r_from: SQ) -> (SQ, SQ) {
        let side = if r_from > k_from {
            CastleType::KingSide
        } else {
            CastleType::QueenSide
        };
        let (k_to, r_to) = castle_destinations(us, side);
        let king = Piece::make(us, PieceType::K);
        let rook = Piece::make(us, PieceType::R);
        // In Chess960 the king and rook may land on each other's squares.
        self.remove_piece(king, k_from);
        self.remove_piece(rook, r_from);
        self.put_piece(king, k_to);
        self.put_piece(rook, r_to);
        (k_to, r_to)
    }

    fn undo_castling(&mut self, us: Player, k_from: SQ, r_from: SQ) {
        let side = if r_from > k_from {
            CastleType::KingSide
        } else {
            CastleType::QueenSide
        };
        let (k_to, r_to) = castle_destinations(us, side);
        let king = Piece::make(us, PieceType::K);
        let rook = Piece::make(us, PieceType::R);
        self.remove_piece(king, k_to);
        self.remove_piece(rook, r_to);
        self.put_piece(king, k_from);
        self.put_piece(rook, r_from);
    }

    fn put_piece(&mut self, piece: Piece, square: SQ) {
        debug_assert!(self.board[square.0 as usize].is_none());
        let bb = square.to_bb();
        self.board[square.0 as usize] = piece;
        self.type_bbs[piece.type_of() as usize] |= bb;
        self.type_bbs[PieceType::All as usize] |= bb;
        self.occ[piece.player_lossy() as usize] |= bb;
        self.piece_counts[piece as usize] += 1;
    }

    fn remove_piece(&mut self, piece: Piece, square: SQ) {
        debug_assert_eq!(self.board[square.0 as usize], piece);
        let bb = square.to_bb();
        self.board[square.0 as usize] = Piece::None;
        self.type_bbs[piece.type_of() as usize] ^= bb;
        self.type_bbs[PieceType::All as usize] ^= bb;
        self.occ[piece.player_lossy() as usize] ^= bb;
        self.piece_counts[piece as usize] -= 1;
    }

    fn move_piece(&mut self, piece: Piece, from: SQ, to: SQ) {
        debug_assert_eq!(self.board[from.0 as usize], piece);
        let comb_bb = from.to_bb() | to.to_bb();
        self.board[from.0 as usize] = Piece::None;
        self.board[to.0 as usize] = piece;
        self.type_bbs[piece.type_of() as usize] ^= comb_bb;
        self.type_bbs[PieceType::All as usize] ^= comb_bb;
        self.occ[piece.player_lossy() as usize] ^= comb_bb;
    }

    /// Sets the pins, blockers and checking squares of a state. The pieces and turn must
    /// already reflect the state.
    fn set_check_info(&self, st: &mut BoardState) {
        let (white_blockers, black_pinners) =
            self.slider_blockers(self.occ[Player::Black as usize], self.king_sq(Player::White));
        let (black_blockers, white_pinners) =
            self.slider_blockers(self.occ[Player::White as usize], self.king_sq(Player::Black));
        st.blockers_king = [white_blockers, black_blockers];
        st.pinners = [white_pinners, black_pinners];

        let them = !self.turn;
        let ksq: SQ = self.king_sq(them);
        let occupied = self.occupied();

        st.check_sqs[PieceType::P as usize] = pawn_attacks_from(ksq, them);
        st.check_sqs[PieceType::N as usize] = knight_moves(ksq);
        st.check_sqs[PieceType::B as usize] = bishop_moves(occupied, ksq);
        st.check_sqs[PieceType::R as usize] = rook_moves(occupied, ksq);
        st.check_sqs[PieceType::Q as usize] =
            st.check_sqs[PieceType::B as usize] | st.check_sqs[PieceType::R as usize];
        st.check_sqs[PieceType::K as usize] = BitBoard(0);
    }

    /// Finds the distance to a previous occurrence of the state's position, looking back
    /// no further than the last irreversible move or null move.
    fn set_repetition(&self, st: &mut BoardState) {
        st.repetition = 0;
        let end = min(st.rule_50, st.plies_from_null) as usize;
        // `self.states` does not hold `st` yet, so `i` plies back is at `len - i`.
        let len = self.states.len();
        let mut i = 4;
        while i <= end && i <= len {
            let prev = &self.states[len - i];
            if prev.zobrist == st.zobrist {
                st.repetition = if prev.repetition != 0 {
                    -(i as i16)
                } else {
                    i as i16
                };
                return;
            }
            i += 2;
        }
    }

    /// Returns the pieces blocking sliders from reaching `s`, and the sliders pinning a
    /// piece of the same color as the piece on `s`.
    fn slider_blockers(&self, sliders: BitBoard, s: SQ) -> (BitBoard, BitBoard) {
        let mut blockers = BitBoard(0);
        let mut pinners = BitBoard(0);

        let snipers: BitBoard = ((rook_moves(BitBoard(0), s)
            & self.piece_two_bb_both_players(PieceType::R, PieceType::Q))
            | (bishop_moves(BitBoard(0), s)
                & self.piece_two_bb_both_players(PieceType::B, PieceType::Q)))
            & sliders;
        let occupancy = self.occupied() ^ snipers;
        let own = match self.piece_at_sq(s).player() {
            Some(player) => self.occ[player as usize],
            None => BitBoard(0),
        };

        for sniper_sq in snipers {
            let b: BitBoard = between_bb(s, sniper_sq) & occupancy;
            if b.is_not_empty() && !b.more_than_one() {
                blockers |= b;
                if (b & own).is_not_empty() {
                    pinners |= sniper_sq.to_bb();
                }
            }
        }
        (blockers, pinners)
    }

    /// Recomputes every key of the position.
    pub fn keys_from_scratch(&self) -> PositionKeys {
        let st = self.state();
        let mut keys = PositionKeys {
            zobrist: 0,
            pawn: z_no_pawns(),
            non_pawn: [0; PLAYER_CNT],
            material: 0,
        };
        for sq in self.occupied() {
            let piece = self.piece_at_sq(sq);
            let key = z_square(sq, piece);
            keys.zobrist ^= key;
            if piece.type_of() == PieceType::P {
                keys.pawn ^= key;
            } else {
                keys.non_pawn[piece.player_lossy() as usize] ^= key;
            }
        }
        for piece in ALL_PIECES.iter() {
            for idx in 0..self.piece_counts[*piece as usize] {
                keys.material ^= z_material(*piece, idx);
            }
        }
        if st.ep_square != NO_SQ {
            keys.zobrist ^= z_ep(st.ep_square);
        }
        if self.turn == Player::Black {
            keys.zobrist ^= z_side();
        }
        keys.zobrist ^= z_castle(st.castling.bits());
        keys
    }

    /// The incrementally maintained keys.
    fn keys(&self) -> PositionKeys {
        let st = self.state();
        PositionKeys {
            zobrist: st.zobrist,
            pawn: st.pawn_key,
            non_pawn: st.non_pawn_key,
            material: st.material_key,
        }
    }

    /// Recomputes the full Zobrist key of the position.
    #[inline]
    pub fn zobrist_from_scratch(&self) -> u64 {
        self.keys_from_scratch().zobrist
    }
}

/// Material key component of the `idx`-th piece of a kind.
#[inline(always)]
fn z_material(piece: Piece, idx: u8) -> u64 {
    z_square(SQ(idx), piece)
}

// ------- Accessing Board Information ------- //

impl Board {
    /// Get the Player whose turn it is to move.
    ///
    /// ```rust
    /// use kestrel::{Board, Player};
    ///
    /// let chessboard = Board::start_pos();
    /// assert_eq!(chessboard.turn(), Player::White);
    /// ```
    #[inline(always)]
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// Return the Zobrist Hash of the board.
    #[inline(always)]
    pub fn zobrist(&self) -> u64 {
        self.state().zobrist
    }

    /// Get the hash key of the pawn structure.
    #[inline(always)]
    pub fn pawn_key(&self) -> u64 {
        self.state().pawn_key
    }

    /// Get the hash key of a player's non-pawn pieces.
    #[inline(always)]
    pub fn non_pawn_key(&self, player: Player) -> u64 {
        self.state().non_pawn_key[player as usize]
    }

    /// Get the hash key of the material configuration.
    #[inline(always)]
    pub fn material_key(&self) -> u64 {
        self.state().material_key
    }

    /// Summed value of a player's knights, bishops, rooks and queens.
    #[inline(always)]
    pub fn non_pawn_material(&self, player: Player) -> Value {
        self.state().non_pawn_material[player as usize]
    }

    /// Summed non-pawn material of both players.
    #[inline(always)]
    pub fn non_pawn_material_all(&self) -> Value {
        self.non_pawn_material(Player::White) + self.non_pawn_material(Player::Black)
    }

    /// Get the total number of plies played since the game started.
    #[inline(always)]
    pub fn moves_played(&self) -> u16 {
        self.half_moves
    }

    /// Get the number of plies since the last capture or pawn move.
    #[inline(always)]
    pub fn rule_50(&self) -> i16 {
        self.state().rule_50
    }

    /// Get the number of moves applied since the board was set up.
    #[inline(always)]
    pub fn depth(&self) -> usize {
        self.states.len() - 1
    }

    /// Returns the en-passant square, or `NO_SQ`.
    #[inline(always)]
    pub fn ep_square(&self) -> SQ {
        self.state().ep_square
    }

    /// Returns if the board was set up for Chess960.
    #[inline(always)]
    pub fn is_chess960(&self) -> bool {
        self.chess960
    }

    /// Get the BitBoard of all pieces.
    #[inline(always)]
    pub fn occupied(&self) -> BitBoard {
        self.type_bbs[PieceType::All as usize]
    }

    /// Get the BitBoard of the squares occupied by the given player.
    #[inline(always)]
    pub fn get_occupied_player(&self, player: Player) -> BitBoard {
        self.occ[player as usize]
    }

    /// Returns the BitBoard of a player's pieces of a type.
    #[inline(always)]
    pub fn piece_bb(&self, player: Player, piece: PieceType) -> BitBoard {
        self.type_bbs[piece as usize] & self.occ[player as usize]
    }

    /// Returns the BitBoard of both players' pieces of a type.
    #[inline(always)]
    pub fn piece_bb_both_players(&self, piece: PieceType) -> BitBoard {
        self.type_bbs[piece as usize]
    }

    /// Returns the combined BitBoard of both players for two pieces.
    #[inline(always)]
    pub fn piece_two_bb_both_players(&self, piece: PieceType, piece2: PieceType) -> BitBoard {
        self.type_bbs[piece as usize] | self.type_bbs[piece2 as usize]
    }

    /// Returns a player's combined BitBoard of two pieces.
    #[inline(always)]
    pub fn piece_two_bb(&self, piece: PieceType, piece2: PieceType, player: Player) -> BitBoard {
        self.piece_two_bb_both_players(piece, piece2) & self.occ[player as usize]
    }

    /// Get the total number of pieces of a given piece.
    #[inline(always)]
    pub fn count_piece(&self, player: Player, piece: PieceType) -> u8 {
        self.piece_counts[Piece::make(player, piece) as usize]
    }

    /// Get the total number of pieces on the board.
    #[inline(always)]
    pub fn count_all_pieces(&self) -> u8 {
        self.occupied().count_bits()
    }

    /// Returns the Piece, if any, at the square.
    #[inline(always)]
    pub fn piece_at_sq(&self, sq: SQ) -> Piece {
        debug_assert!(sq.is_okay());
        self.board[sq.0 as usize]
    }

    /// Returns the square of the King for a given player.
    #[inline(always)]
    pub fn king_sq(&self, player: Player) -> SQ {
        self.piece_bb(player, PieceType::K).to_sq()
    }

    /// Returns the pinned pieces of the given player, pieces which cannot move without
    /// exposing their own king.
    #[inline(always)]
    pub fn pinned_pieces(&self, player: Player) -> BitBoard {
        self.state().blockers_king[player as usize] & self.occ[player as usize]
    }

    /// Returns the pieces, of both players, standing between a player's king and an enemy slider.
    #[inline(always)]
    pub fn blockers_for_king(&self, player: Player) -> BitBoard {
        self.state().blockers_king[player as usize]
    }

    /// Returns a player's sliders pinning a piece to the enemy king.
    #[inline(always)]
    pub fn pinners(&self, player: Player) -> BitBoard {
        self.state().pinners[player as usize]
    }

    /// Squares from which a piece of the side to move would give check.
    #[inline(always)]
    pub fn check_squares(&self, piece: PieceType) -> BitBoard {
        self.state().check_sqs[piece as usize]
    }

    /// Returns the current castling rights.
    #[inline(always)]
    pub fn castling_rights(&self) -> Castling {
        self.state().castling
    }

    /// Check if the castle path is impeded for the current player.
    #[inline(always)]
    pub fn castle_impeded(&self, castle_type: CastleType) -> bool {
        (self.castling.path(self.turn, castle_type) & self.occupied()).is_not_empty()
    }

    /// Returns if a player can castle on a side, ignoring attacks and obstructions.
    #[inline(always)]
    pub fn can_castle(&self, player: Player, castle_type: CastleType) -> bool {
        self.state().castling.castle_rights(player, castle_type)
    }

    /// Square of the rook that is used to castle for the current player.
    #[inline(always)]
    pub fn castling_rook_square(&self, castle_type: CastleType) -> SQ {
        self.castling.rook_square(self.turn, castle_type)
    }

    /// Return the last move played, if any.
    #[inline(always)]
    pub fn last_move(&self) -> Option<BitMove> {
        let mv = self.state().prev_move;
        if mv.is_okay() {
            Some(mv)
        } else {
            None
        }
    }

    /// Returns the piece captured by the last move, `Piece::None` if none was.
    #[inline(always)]
    pub fn piece_captured_last_turn(&self) -> Piece {
        self.state().captured_piece
    }

    /// The pieces displaced by the last move.
    #[inline(always)]
    pub fn dirty_piece(&self) -> &DirtyPiece {
        &self.state().dirty
    }

    /// Returns if current side to move is in check.
    #[inline(always)]
    pub fn in_check(&self) -> bool {
        self.state().checkers.is_not_empty()
    }

    /// Return if the current side to move is in check mate.
    pub fn checkmate(&self) -> bool {
        self.in_check() && self.generate_moves().is_empty()
    }

    /// Return if the current side to move is in stalemate.
    pub fn stalemate(&self) -> bool {
        !self.in_check() && self.generate_moves().is_empty()
    }

    /// Return the BitBoard of the pieces checking the side to move.
    #[inline(always)]
    pub fn checkers(&self) -> BitBoard {
        self.state().checkers
    }

    /// Returns a BitBoard of possible attacks / defends to a square with a given occupancy.
    /// Includes pieces from both players.
    pub fn attackers_to(&self, sq: SQ, occupied: BitBoard) -> BitBoard {
        (pawn_attacks_from(sq, Player::Black) & self.piece_bb(Player::White, PieceType::P))
            | (pawn_attacks_from(sq, Player::White) & self.piece_bb(Player::Black, PieceType::P))
            | (knight_moves(sq) & self.piece_bb_both_players(PieceType::N))
            | (rook_moves(occupied, sq) & self.piece_two_bb_both_players(PieceType::R, PieceType::Q))
            | (bishop_moves(occupied, sq) & self.piece_two_bb_both_players(PieceType::B, PieceType::Q))
            | (king_moves(sq) & self.piece_bb_both_players(PieceType::K))
    }

    /// Returns the squares a piece of a type attacks from a square.
    #[inline]
    pub fn attacks_from(&self, piece: PieceType, sq: SQ, player: Player) -> BitBoard {
        match piece {
            PieceType::P => pawn_attacks_from(sq, player),
            PieceType::N => knight_moves(sq),
            PieceType::B => bishop_moves(self.occupied(), sq),
            PieceType::R => rook_moves(self.occupied(), sq),
            PieceType::Q => queen_moves(self.occupied(), sq),
            PieceType::K => king_moves(sq),
            _ => BitBoard(0),
        }
    }

    /// Returns the piece that was moved from a given BitMove.
    #[inline(always)]
    pub fn moved_piece(&self, m: BitMove) -> Piece {
        self.piece_at_sq(m.get_src())
    }

    /// Returns the piece that a move captures, `Piece::None` for non-captures.
    #[inline]
    pub fn captured_piece(&self, m: BitMove) -> Piece {
        match m.move_type() {
            MoveType::EnPassant => Piece::make(!self.turn, PieceType::P),
            MoveType::Castle => Piece::None,
            _ => self.piece_at_sq(m.get_dest()),
        }
    }

    /// Returns if a move captures a piece.
    #[inline]
    pub fn is_capture(&self, m: BitMove) -> bool {
        self.captured_piece(m) != Piece::None
    }

    /// Returns if a move is a capture or a queen promotion, the moves the quiescence search
    /// and the capture stages of move ordering deal with.
    #[inline]
    pub fn is_noisy(&self, m: BitMove) -> bool {
        self.is_capture(m) || (m.is_promo() && m.promo_piece() == PieceType::Q)
    }

    /// Returns if a move is a capture or any promotion.
    #[inline]
    pub fn is_capture_or_promotion(&self, m: BitMove) -> bool {
        self.is_capture(m) || m.is_promo()
    }

    /// The Zobrist key after a move, exact for normal moves and captures. Used to prefetch
    /// the transposition table before the move is applied.
    pub fn key_after(&self, m: BitMove) -> u64 {
        let from = m.get_src();
        let to = m.get_dest();
        let piece = self.piece_at_sq(from);
        let mut k = self.zobrist() ^ z_side();
        if m.is_castle() {
            return k;
        }
        let captured = self.piece_at_sq(to);
        if captured != Piece::None {
            k ^= z_square(to, captured);
        }
        k ^ z_square(to, piece) ^ z_square(from, piece)
    }
}

// ------- Move Testing ------- //

impl Board {
    /// Tests if a pseudo-legal move is legal.
    pub fn legal_move(&self, m: BitMove) -> bool {
        if m.is_null() {
            return false;
        }
        let us = self.turn;
        let them = !us;
        let from = m.get_src();
        let to = m.get_dest();
        let ksq = self.king_sq(us);

        debug_assert_eq!(self.piece_at_sq(from).player(), Some(us));

        match m.move_type() {
            MoveType::EnPassant => {
                // Both pawns leave the fifth rank at once, so look for sliders seeing the king.
                let cap_sq = to.offset(-us.pawn_push());
                let occupied = (self.occupied() ^ from.to_bb() ^ cap_sq.to_bb()) | to.to_bb();
                (rook_moves(occupied, ksq) & self.piece_two_bb(PieceType::Q, PieceType::R, them))
                    .is_empty()
                    && (bishop_moves(occupied, ksq)
                        & self.piece_two_bb(PieceType::Q, PieceType::B, them))
                    .is_empty()
            }
            MoveType::Castle => {
                let king_side = to > from;
                let (k_to, _) = castle_destinations(
                    us,
                    if king_side {
                        CastleType::KingSide
                    } else {
                        CastleType::QueenSide
                    },
                );
                let step: i8 = if k_to > from { WEST } else { EAST };
                let mut s = k_to;
                while s != from {
                    if (self.attackers_to(s, self.occupied()) & self.occ[them as usize]).is_not_empty() {
                        return false;
                    }
                    s = s.offset(step);
                }
                // A Chess960 castling rook may be shielding the king.
                !self.chess960 || !self.blockers_for_king(us).contains(to)
            }
            _ => {
                if from == ksq {
                    (self.attackers_to(to, self.occupied() ^ from.to_bb()) & self.occ[them as usize])
                        .is_empty()
                } else {
                    !self.blockers_for_king(us).contains(from) || aligned(from, to, ksq)
                }
            }
        }
    }

    /// Tests if a move is pseudo-legal for the position. Moves coming from the
    /// transposition table or the killer tables need to pass this before they are tried.
    pub fn pseudo_legal_move(&self, m: BitMove) -> bool {
        if !m.is_okay() {
            return false;
        }
        let us = self.turn;
        let from = m.get_src();
        let to = m.get_dest();
        let piece = self.piece_at_sq(from);

        if piece.player() != Some(us) {
            return false;
        }

        if m.move_type() != MoveType::Normal {
            let mut list = MoveList::default();
            let gen = if self.in_check() {
                GenTypes::Evasions
            } else {
                GenTypes::NonEvasions
            };
            MoveGen::extend::<PseudoLegal, MoveList>(self, gen, &mut list);
            return list.contains(m);
        }

        // A normal move carries no promotion bits.
        if m.get_raw() >> 12 != 0 {
            return false;
        }

        if self.occ[us as usize].contains(to) {
            return false;
        }

        if piece.type_of() == PieceType::P {
            if (BitBoard::RANK_1 | BitBoard::RANK_8).contains(to) {
                return false;
            }
            let push = us.pawn_push();
            let capture = (pawn_attacks_from(from, us) & self.occ[!us as usize]).contains(to);
            let single = from.offset(push) == to && self.piece_at_sq(to).is_none();
            let double = from.offset(2 * push) == to
                && us.relative_rank_of_sq(from) == Rank::R2
                && self.piece_at_sq(to).is_none()
                && self.piece_at_sq(from.offset(push)).is_none();
            if !capture && !single && !double {
                return false;
            }
        } else if !self.attacks_from(piece.type_of(), from, us).contains(to) {
            return false;
        }

        let checkers = self.checkers();
        if checkers.is_not_empty() {
            if piece.type_of() != PieceType::K {
                if checkers.more_than_one() {
                    return false;
                }
                let checker = checkers.to_sq();
                if !(between_bb(self.king_sq(us), checker) | checkers).contains(to) {
                    return false;
                }
            } else if (self.attackers_to(to, self.occupied() ^ from.to_bb()) & self.occ[!us as usize])
                .is_not_empty()
            {
                return false;
            }
        }
        true
    }

    /// Returns if a pseudo-legal move gives check to the opposing player.
    pub fn gives_check(&self, m: BitMove) -> bool {
        let us = self.turn;
        let them = !us;
        let from = m.get_src();
        let to = m.get_dest();
        let their_ksq = self.king_sq(them);
        let piece_type = self.piece_at_sq(from).type_of();

        // Direct check
        if self.check_squares(piece_type).contains(to) {
            return true;
        }

        // Discovered check
        if self.blockers_for_king(them).contains(from) {
            return !aligned(from, to, their_ksq) || m.is_castle();
        }

        match m.move_type() {
            MoveType::Normal => false,
            MoveType::Promotion => {
                let occupied = self.occupied() ^ from.to_bb();
                let attacks = match m.promo_piece() {
                    PieceType::N => knight_moves(to),
                    PieceType::B => bishop_moves(occupied, to),
                    PieceType::R => rook_moves(occupied, to),
                    _ => queen_moves(occupied, to),
                };
                attacks.contains(their_ksq)
            }
            MoveType::EnPassant => {
                let cap_sq = SQ::make(to.file(), from.rank());
                let b = (self.occupied() ^ from.to_bb() ^ cap_sq.to_bb()) | to.to_bb();
                (rook_moves(b, their_ksq) & self.piece_two_bb(PieceType::Q, PieceType::R, us))
                    .is_not_empty()
                    || (bishop_moves(b, their_ksq) & self.piece_two_bb(PieceType::Q, PieceType::B, us))
                        .is_not_empty()
            }
            MoveType::Castle => {
                let side = if to > from {
                    CastleType::KingSide
                } else {
                    CastleType::QueenSide
                };
                let (_, r_to) = castle_destinations(us, side);
                self.check_squares(PieceType::R).contains(r_to)
            }
        }
    }

    /// Static exchange evaluation: tests if the exchange sequence started by a move on its
    /// destination square wins at least `threshold`, both sides always recapturing with
    /// their least valuable attacker.
    ///
    /// ```
    /// use kestrel::{Board, BitMove, SQ};
    ///
    /// // A pawn defended by a pawn, attacked by a knight.
    /// let board = Board::from_fen("4k3/8/3p4/4p3/8/5N2/8/4K3 w - - 0 1", false).unwrap();
    /// let nxe5 = BitMove::make(SQ::F3, SQ::E5);
    /// assert!(!board.see_ge(nxe5, 0));
    /// assert!(board.see_ge(nxe5, -600));
    /// ```
    pub fn see_ge(&self, m: BitMove, threshold: Value) -> bool {
        if m.move_type() != MoveType::Normal {
            return 0 >= threshold;
        }

        let from = m.get_src();
        let to = m.get_dest();

        let mut swap: Value = PIECE_VALUES[self.piece_at_sq(to).type_of() as usize] - threshold;
        if swap < 0 {
            return false;
        }

        swap = PIECE_VALUES[self.piece_at_sq(from).type_of() as usize] - swap;
        if swap <= 0 {
            return true;
        }

        let mut occupied: BitBoard = self.occupied() ^ from.to_bb() ^ to.to_bb();
        let mut stm: Player = self.turn;
        let mut attackers: BitBoard = self.attackers_to(to, occupied);
        let mut res: i32 = 1;

        let bishops = self.piece_two_bb_both_players(PieceType::B, PieceType::Q);
        let rooks = self.piece_two_bb_both_players(PieceType::R, PieceType::Q);

        loop {
            stm = !stm;
            attackers &= occupied;

            let mut stm_attackers: BitBoard = attackers & self.occ[stm as usize];
            if stm_attackers.is_empty() {
                break;
            }

            // Pinned pieces may only join while their pinner is still on the board.
            if (self.pinners(!stm) & occupied).is_not_empty() {
                stm_attackers &= !self.blockers_for_king(stm);
                if stm_attackers.is_empty() {
                    break;
                }
            }

            res ^= 1;

            let pawns = stm_attackers & self.piece_bb_both_players(PieceType::P);
            let knights = stm_attackers & self.piece_bb_both_players(PieceType::N);
            let bishops_only = stm_attackers & self.piece_bb_both_players(PieceType::B);
            let rooks_only = stm_attackers & self.piece_bb_both_players(PieceType::R);
            let queens = stm_attackers & self.piece_bb_both_players(PieceType::Q);

            if pawns.is_not_empty() {
                swap = PIECE_VALUES[PieceType::P as usize] - swap;
                if swap < res {
                    break;
                }
                occupied ^= pawns.lsb();
                attackers |= bishop_moves(occupied, to) & bishops;
            } else if knights.is_not_empty() {
                swap = PIECE_VALUES[PieceType::N as usize] - swap;
                if swap < res {
                    break;
                }
                occupied ^= knights.lsb();
            } else if bishops_only.is_not_empty() {
                swap = PIECE_VALUES[PieceType::B as usize] - swap;
                if swap < res {
                    break;
                }
                occupied ^= bishops_only.lsb();
                attackers |= bishop_moves(occupied, to) & bishops;
            } else if rooks_only.is_not_empty() {
                swap = PIECE_VALUES[PieceType::R as usize] - swap;
                if swap < res {
                    break;
                }
                occupied ^= rooks_only.lsb();
                attackers |= rook_moves(occupied, to) & rooks;
            } else if queens.is_not_empty() {
                swap = PIECE_VALUES[PieceType::Q as usize] - swap;
                if swap < res {
                    break;
                }
                occupied ^= queens.lsb();
                attackers |= (bishop_moves(occupied, to) & bishops) | (rook_moves(occupied, to) & rooks);
            } else {
                // King: the capture only stands if the opponent has no attacker left.
                return if (attackers & !self.occ[stm as usize]).is_not_empty() {
                    res ^ 1 != 0
                } else {
                    res != 0
                };
            }
        }
        res != 0
    }

    /// Tests for a draw by the fifty-move rule or by repetition, `ply` being the distance
    /// from the search root.
    ///
    /// A position repeated strictly inside the searched tree is a draw on its first
    /// recurrence. One that only recurs across the root needs to have occurred three times.
    pub fn is_draw(&self, ply: i32) -> bool {
        let st = self.state();
        if st.rule_50 > 99 && (st.checkers.is_empty() || !self.generate_moves().is_empty()) {
            return true;
        }
        st.repetition != 0 && (st.repetition as i32) < ply
    }
}

// ------- Debugging ------- //

impl Board {
    /// Returns a prettified String of the current `Board`, for easy command line displaying,
    /// along with its fen, key and checkers.
    pub fn pretty_string(&self) -> String {
        let mut s = String::with_capacity(SQ_CNT * 4 + 256);
        s.push_str("\n +---+---+---+---+---+---+---+---+\n");
        for rank in (0..8u8).rev() {
            for file in 0..8u8 {
                let piece = self.piece_at_sq(SQ(rank * 8 + file));
                s.push_str(" | ");
                s.push(piece.character().unwrap_or(' '));
            }
            s.push_str(" | ");
            s.push((b'1' + rank) as char);
            s.push_str("\n +---+---+---+---+---+---+---+---+\n");
        }
        s.push_str("   a   b   c   d   e   f   g   h\n\n");
        s.push_str(&format!("Fen: {}\n", self.fen()));
        s.push_str(&format!("Key: {:016X}\n", self.zobrist()));
        s.push_str("Checkers: ");
        for sq in self.checkers() {
            s.push_str(&format!("{} ", sq));
        }
        s
    }

    /// Checks the basic invariants: one king per side, and agreeing bitboards and mailbox.
    pub fn is_ok_quick(&self) -> bool {
        self.piece_bb(Player::White, PieceType::K).count_bits() == 1
            && self.piece_bb(Player::Black, PieceType::K).count_bits() == 1
            && (self.occ[0] & self.occ[1]).is_empty()
            && (self.occ[0] | self.occ[1]) == self.occupied()
            && self.occupied().all(|sq| !self.board[sq.0 as usize].is_none())
            && self.count_all_pieces() as usize
                == self.board.iter().filter(|p| !p.is_none()).count()
    }
}
