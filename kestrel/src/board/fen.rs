//! Reading and writing positions in Forsyth–Edwards Notation.
//!
//! The castling field accepts the standard `KQkq` letters, X-FEN (where `K` / `Q` name the
//! outermost rook of that side) and Shredder-FEN (the rook's file letter). Positions written
//! back in Chess960 mode use Shredder-FEN.

use super::board_state::BoardState;
use super::castle_rights::Castling;
use super::Board;

use crate::core::score::PIECE_VALUES;
use crate::core::sq::{NO_SQ, SQ};
use crate::core::*;
use crate::helper::prelude::*;
use crate::BitBoard;

use std::num;
use thiserror::Error;

/// A spread of middlegame and endgame positions, used for benchmarking and for testing
/// code that should hold for any position.
pub const BENCH_FENS: [&str; 18] = [
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 10",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 11",
    "4rrk1/pp1n3p/3q2pQ/2p1pb2/2PP4/2P3N1/P2B2PP/4RRK1 b - - 7 19",
    "rq3rk1/ppp2ppp/1bnpb3/3N2B1/3NP3/7P/PPPQ1PP1/2KR3R w - - 7 14",
    "r1bq1r1k/1pp1n1pp/1p1p4/4p2Q/4Pp2/1BNP4/PPP2PPP/3R1RK1 w - - 2 14",
    "r3r1k1/2p2ppp/p1p1bn2/8/1q2P3/2NPQN2/PPP3PP/R4RK1 b - - 2 15",
    "r1bbk1nr/pp3p1p/2n5/1N4p1/2Np1B2/8/PPP2PPP/2KR1B1R w kq - 0 13",
    "r1bq1rk1/ppp1nppp/4n3/3p3Q/3P4/1BP1B3/PP1N2PP/R4RK1 w - - 1 16",
    "4r1k1/r1q2ppp/ppp2n2/4P3/5Rb1/1N1BQ3/PPP3PP/R5K1 w - - 1 17",
    "2rqkb1r/ppp2p2/2npb1p1/1N1Nn2p/2P1PP2/8/PP2B1PP/R1BQK2R b KQ - 0 11",
    "r1bq1r1k/b1p1npp1/p2p3p/1p6/3PP3/1B2NN2/PP3PPP/R2Q1RK1 w - - 1 16",
    "3r1rk1/p5pp/bpp1pp2/8/q1PP1P2/b3P3/P2NQRPP/1R2B1K1 b - - 6 22",
    "r1q2rk1/2p1bppp/2Pp4/p6b/Q1PNp3/4B3/PP1R1PPP/2K4R w - - 2 18",
    "4k2r/1pb2ppp/1p2p3/1R1p4/3P4/2r1PN2/P4PPP/1R4K1 b - - 3 22",
    "3q2k1/pb3p1p/4pbp1/2r5/PpN2N2/1P2P2P/5PP1/Q2R2K1 b - - 4 26",
    "6k1/6p1/6Pp/ppp5/3pn2P/1P3K2/1PP2P2/8 b - - 0 1",
    "8/8/8/8/5kp1/P7/8/1K1N4 w - - 0 1",
    "1r3k2/4q3/2Pp3b/3Bp3/2Q2p2/1p1P2P1/1P2KP2/3N4 w - - 0 1",
];

/// Represents possible Errors encountered while building a `Board` from a fen string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenBuildError {
    #[error("invalid number of fen sections: {sections}, expected at least 4")]
    NotEnoughSections { sections: usize },
    #[error("invalid number of ranks: {ranks}, expected 8")]
    IncorrectRankAmounts { ranks: usize },
    #[error("invalid turn: {turn}, expected 'w' or 'b'")]
    UnrecognizedTurn { turn: String },
    #[error("unreadable En-passant square: {ep}")]
    EPSquareUnreadable { ep: String },
    #[error("square number too large for rank, rank: {rank} square: {square}")]
    SquareLargerRank { rank: usize, square: String },
    #[error("unrecognized piece: {piece}")]
    UnrecognizedPiece { piece: char },
    #[error("unreadable move counter: {0}")]
    UnreadableMoves(#[from] num::ParseIntError),
    #[error("invalid castling field: {castle}")]
    BadCastling { castle: String },
    #[error("player {player} needs exactly one king, found {num}")]
    KingCount { player: Player, num: u8 },
    #[error("too many checking pieces: {num}")]
    IllegalNumCheckingPieces { num: u8 },
    #[error("the side not to move is in check")]
    OpponentInCheck,
    #[error("too many pawns for player: player: {player}, # pawns {num}")]
    TooManyPawns { player: Player, num: u8 },
    #[error("pawn on first or last row")]
    PawnOnLastRow,
}

impl Board {
    /// Constructs a board from a fen string. `chess960` selects how castling moves are
    /// written and whether castling rooks may shield the king.
    ///
    /// The half-move and full-move counters may be omitted.
    ///
    /// # Examples
    ///
    /// ```
    /// use kestrel::Board;
    ///
    /// let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
    /// let board = Board::from_fen(fen, false).unwrap();
    /// assert_eq!(board.fen(), fen);
    ///
    /// assert!(Board::from_fen("8/8/8 w - - 0 1", false).is_err());
    /// ```
    pub fn from_fen(fen: &str, chess960: bool) -> Result<Board, FenBuildError> {
        let det_split: Vec<&str> = fen.split_whitespace().collect();
        if det_split.len() < 4 {
            return Err(FenBuildError::NotEnoughSections {
                sections: det_split.len(),
            });
        }

        let mut board = Board::blank(chess960);

        // Pieces, from rank 8 down to rank 1
        let ranks: Vec<&str> = det_split[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenBuildError::IncorrectRankAmounts { ranks: ranks.len() });
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file: usize = 0;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else {
                    let piece = Piece::from_char(c).ok_or(FenBuildError::UnrecognizedPiece { piece: c })?;
                    if file > 7 {
                        return Err(FenBuildError::SquareLargerRank {
                            rank,
                            square: rank_str.to_string(),
                        });
                    }
                    board.put_piece(piece, SQ((rank * 8 + file) as u8));
                    file += 1;
                }
            }
            if file > 8 {
                return Err(FenBuildError::SquareLargerRank {
                    rank,
                    square: rank_str.to_string(),
                });
            }
        }

        for player in ALL_PLAYERS.iter() {
            let num = board.count_piece(*player, PieceType::K);
            if num != 1 {
                return Err(FenBuildError::KingCount { player: *player, num });
            }
        }

        board.turn = match det_split[1] {
            "w" => Player::White,
            "b" => Player::Black,
            other => {
                return Err(FenBuildError::UnrecognizedTurn {
                    turn: other.to_string(),
                })
            }
        };

        let castling = board.parse_castling(det_split[2])?;

        let ep_square = match det_split[3] {
            "-" => NO_SQ,
            ep => SQ::from_str_algebraic(ep).ok_or_else(|| FenBuildError::EPSquareUnreadable {
                ep: ep.to_string(),
            })?,
        };

        let rule_50: i16 = det_split.get(4).map(|s| s.parse::<i16>()).transpose()?.unwrap_or(0);
        let full_moves: u16 = det_split.get(5).map(|s| s.parse::<u16>()).transpose()?.unwrap_or(1);
        board.half_moves = 2 * full_moves.max(1).saturating_sub(1) + board.turn as u16;

        board.setup_state(castling, ep_square, rule_50);
        board.validate()?;
        Ok(board)
    }

    /// Reads the castling field, registering the castling rooks.
    fn parse_castling(&mut self, field: &str) -> Result<Castling, FenBuildError> {
        let mut castling = Castling::empty();
        if field == "-" {
            return Ok(castling);
        }
        let bad = || FenBuildError::BadCastling {
            castle: field.to_string(),
        };
        for c in field.chars() {
            let player = if c.is_ascii_uppercase() {
                Player::White
            } else {
                Player::Black
            };
            let ksq = self.king_sq(player);
            if ksq.rank() != player.relative_rank(Rank::R1) {
                return Err(bad());
            }
            let rook = Piece::make(player, PieceType::R);
            let back_rank: Vec<SQ> = (0..8u8)
                .map(|f| player.relative_square(SQ(f)))
                .collect();
            let rook_sq: SQ = match c.to_ascii_lowercase() {
                'k' => back_rank
                    .iter()
                    .rev()
                    .find(|sq| **sq > ksq && self.piece_at_sq(**sq) == rook)
                    .copied()
                    .ok_or_else(bad)?,
                'q' => back_rank
                    .iter()
                    .find(|sq| **sq < ksq && self.piece_at_sq(**sq) == rook)
                    .copied()
                    .ok_or_else(bad)?,
                f @ 'a'..='h' => {
                    let sq = back_rank[(f as u8 - b'a') as usize];
                    if self.piece_at_sq(sq) != rook {
                        return Err(bad());
                    }
                    sq
                }
                _ => return Err(bad()),
            };
            let side = if rook_sq > ksq {
                CastleType::KingSide
            } else {
                CastleType::QueenSide
            };
            castling |= Castling::right(player, side);
            self.castling.add_right(player, ksq, rook_sq);
        }
        Ok(castling)
    }

    /// Builds the root state from the pieces.
    fn setup_state(&mut self, castling: Castling, ep_square: SQ, rule_50: i16) {
        let us = self.turn;
        let them = !us;

        // Only keep an en-passant square a pawn could actually capture on.
        let ep_valid = ep_square != NO_SQ
            && us.relative_rank_of_sq(ep_square) == Rank::R6
            && (pawn_attacks_from(ep_square, them) & self.piece_bb(us, PieceType::P)).is_not_empty()
            && self.piece_at_sq(ep_square.offset(-us.pawn_push())) == Piece::make(them, PieceType::P)
            && self.piece_at_sq(ep_square).is_none()
            && self.piece_at_sq(ep_square.offset(us.pawn_push())).is_none();

        let mut st = BoardState {
            castling,
            rule_50,
            ep_square: if ep_valid { ep_square } else { NO_SQ },
            ..BoardState::default()
        };
        for player in ALL_PLAYERS.iter() {
            st.non_pawn_material[*player as usize] = [PieceType::N, PieceType::B, PieceType::R, PieceType::Q]
                .iter()
                .map(|pt| self.count_piece(*player, *pt) as i32 * PIECE_VALUES[*pt as usize])
                .sum();
        }
        st.checkers = self.attackers_to(self.king_sq(us), self.occupied()) & self.get_occupied_player(them);
        self.set_check_info(&mut st);

        self.states.clear();
        self.states.push(st);

        let keys = self.keys_from_scratch();
        let st = &mut self.states[0];
        st.zobrist = keys.zobrist;
        st.pawn_key = keys.pawn;
        st.non_pawn_key = keys.non_pawn;
        st.material_key = keys.material;
    }

    /// Rejects positions the move generator cannot handle.
    fn validate(&self) -> Result<(), FenBuildError> {
        let them = !self.turn;
        let checks = self.checkers().count_bits();
        if checks > 2 {
            return Err(FenBuildError::IllegalNumCheckingPieces { num: checks });
        }
        if (self.attackers_to(self.king_sq(them), self.occupied()) & self.get_occupied_player(self.turn))
            .is_not_empty()
        {
            return Err(FenBuildError::OpponentInCheck);
        }
        if (self.piece_bb_both_players(PieceType::P) & (BitBoard::RANK_1 | BitBoard::RANK_8)).is_not_empty() {
            return Err(FenBuildError::PawnOnLastRow);
        }
        for player in ALL_PLAYERS.iter() {
            let num = self.count_piece(*player, PieceType::P);
            if num > 8 {
                return Err(FenBuildError::TooManyPawns { player: *player, num });
            }
        }
        Ok(())
    }

    /// Creates a FEN String of the Given Board.
    ///
    /// FEN stands for Forsyth-Edwards Notation, and is a way of representing a board through a
    /// string of characters. More information can be found on the [ChessWiki](https://chessprogramming.wikispaces.com/Forsyth-Edwards+Notation).
    ///
    /// # Examples
    ///
    /// ```
    /// use kestrel::Board;
    ///
    /// let board = Board::start_pos();
    /// assert_eq!(board.fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    /// ```
    pub fn fen(&self) -> String {
        let mut s = String::with_capacity(90);
        for rank in (0..8u8).rev() {
            let mut blanks = 0;
            for file in 0..8u8 {
                match self.piece_at_sq(SQ(rank * 8 + file)).character() {
                    Some(c) => {
                        if blanks != 0 {
                            s.push(char::from(b'0' + blanks));
                            blanks = 0;
                        }
                        s.push(c);
                    }
                    None => blanks += 1,
                }
            }
            if blanks != 0 {
                s.push(char::from(b'0' + blanks));
            }
            if rank != 0 {
                s.push('/');
            }
        }

        s.push(' ');
        s.push(match self.turn {
            Player::White => 'w',
            Player::Black => 'b',
        });
        s.push(' ');
        s.push_str(&self.castling_string());
        s.push(' ');
        match self.ep_square() {
            NO_SQ => s.push('-'),
            ep => s.push_str(&ep.to_string()),
        }
        s.push_str(&format!(" {} {}", self.rule_50(), self.half_moves / 2 + 1));
        s
    }

    fn castling_string(&self) -> String {
        let rights = self.castling_rights();
        if !self.chess960 {
            return rights.pretty_string();
        }
        if rights.is_empty() {
            return "-".to_owned();
        }
        let mut s = String::with_capacity(4);
        for player in ALL_PLAYERS.iter() {
            for side in [CastleType::KingSide, CastleType::QueenSide] {
                if rights.castle_rights(*player, side) {
                    let file = self.castling.rook_square(*player, side).file().to_char();
                    s.push(match player {
                        Player::White => file.to_ascii_uppercase(),
                        Player::Black => file,
                    });
                }
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let fens = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        ];
        for fen in fens.iter() {
            let board = Board::from_fen(fen, false).unwrap();
            assert_eq!(&board.fen(), fen);
        }
    }

    #[test]
    fn uncapturable_ep_is_dropped() {
        let board =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1", false).unwrap();
        assert_eq!(board.ep_square(), NO_SQ);
        assert!(board.fen().contains(" - 0 1"));
    }

    #[test]
    fn shredder_and_xfen_castling() {
        let fen = "bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w HFhf - 2 9";
        let board = Board::from_fen(fen, true).unwrap();
        assert_eq!(board.fen(), fen);
        assert_eq!(board.castling_rook_square(CastleType::KingSide), SQ::H1);
        assert_eq!(board.castling_rook_square(CastleType::QueenSide), SQ::F1);

        let xfen = Board::from_fen("bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w KQkq - 2 9", true)
            .unwrap();
        assert_eq!(xfen.fen(), fen);
    }

    #[test]
    fn errors_name_the_field() {
        assert_eq!(
            Board::from_fen("8/8/8/8/8/8/8/8 w - - 0 1", false).unwrap_err(),
            FenBuildError::KingCount {
                player: Player::White,
                num: 0
            }
        );
        assert!(matches!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1", false),
            Err(FenBuildError::UnrecognizedTurn { .. })
        ));
        assert!(matches!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K3 w Z - 0 1", false),
            Err(FenBuildError::BadCastling { .. })
        ));
        assert!(matches!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - x 1", false),
            Err(FenBuildError::UnreadableMoves(_))
        ));
        assert!(matches!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K2P w - - 0 1", false),
            Err(FenBuildError::PawnOnLastRow)
        ));
        assert!(matches!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K2r w - - 0 1", false),
            Ok(_)
        ));
        assert!(matches!(
            Board::from_fen("4k2R/8/8/8/8/8/8/4K3 w - - 0 1", false),
            Err(FenBuildError::OpponentInCheck)
        ));
    }
}
