//! A bitboard chess library.
//!
//! This package is separated into two parts. Firstly, the board representation & associated
//! functions (the current crate, `kestrel`), and secondly, the searching engine
//! `kestrel_engine`.
//!
//! # Usage
//!
//! Add `kestrel` to the dependencies in your project's `Cargo.toml`.
//!
//! # Safety
//!
//! While generally a safe library, kestrel was built with a focus of speed in mind. Methods
//! taking moves trust the move to be legal for the position, so moves from outside the move
//! generator must be validated first with [`Board::pseudo_legal_move`] and
//! [`Board::legal_move`].
//!
//! # Examples
//!
//! You can create a [`Board`] with the starting position like so:
//!
//! ```
//! use kestrel::Board;
//! let board = Board::start_pos();
//! ```
//!
//! Generating a list of moves (Contained inside a [`MoveList`]) can be done with:
//!
//! ```
//! # use kestrel::Board;
//! # let board = Board::start_pos();
//! let list = board.generate_moves();
//! assert_eq!(list.len(), 20);
//! ```
//!
//! Applying and undoing moves is simple:
//!
//! ```
//! use kestrel::Board;
//!
//! let mut board = Board::start_pos();
//! let list = board.generate_moves();
//!
//! for mov in list.iter() {
//!     board.apply_move(*mov);
//!     println!("{}", board.fen());
//!     board.undo_move();
//! }
//! ```
//!
//! Using fen strings is also supported:
//!
//! ```
//! use kestrel::Board;
//!
//! let start_position = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
//! let board = Board::from_fen(start_position, false).unwrap();
//! assert_eq!(board, Board::start_pos());
//! ```
//!
//! [`MoveList`]: core/move_list/struct.MoveList.html
//! [`Board`]: board/struct.Board.html

#[macro_use]
extern crate lazy_static;

pub mod board;
pub mod core;
pub mod helper;

#[doc(no_inline)]
pub use crate::board::{Board, FenBuildError};
#[doc(no_inline)]
pub use crate::core::bitboard::BitBoard;
#[doc(no_inline)]
pub use crate::core::move_list::{MoveList, ScoringMoveList};
#[doc(no_inline)]
pub use crate::core::piece_move::{BitMove, ScoringMove};
#[doc(no_inline)]
pub use crate::core::sq::SQ;
#[doc(no_inline)]
pub use crate::core::{CastleType, File, GenTypes, Piece, PieceType, Player, Rank};
