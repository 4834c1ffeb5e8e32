//! The UCI protocol: options and parsing of the commands' arguments.

pub mod options;
pub mod parse;

use kestrel::FenBuildError;
use thiserror::Error;

/// Errors from a line of UCI input. None of them is fatal, they are reported back to the GUI
/// and the command is ignored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UciError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("no such option: {0}")]
    UnknownOption(String),
    #[error("invalid value '{value}' for option {name}")]
    BadOptionValue { name: String, value: String },
    #[error("malformed setoption command, expected: setoption name <id> [value <x>]")]
    MalformedSetOption,
    #[error("malformed position command, expected: position [startpos | fen <fen>] [moves ..]")]
    MalformedPosition,
    #[error("invalid fen: {0}")]
    BadFen(#[from] FenBuildError),
    #[error("illegal move in position command: {0}")]
    IllegalMove(String),
    #[error("missing or invalid argument for {0}")]
    BadArgument(String),
}
