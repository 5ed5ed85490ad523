use thiserror::Error;

use crate::board::Colour;

/// Errors raised by the engine core and its text layers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// Zero or several kings of one colour where exactly one is required.
    #[error("malformed position: expected one {colour:?} king, found {found}")]
    MalformedPosition { colour: Colour, found: usize },

    /// `apply_move` was handed a move that does not fit the board.
    #[error("invalid move {mv}: {reason}")]
    InvalidMove { mv: String, reason: String },

    #[error("it is {expected:?}'s turn, got a move for {found:?}")]
    WrongSide { expected: Colour, found: Colour },

    #[error("no move to undo")]
    EmptyHistory,

    /// Well-formed move text that is not legal in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("unrecognised move notation: {0}")]
    BadNotation(String),

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),
}

pub type ChessResult<T> = std::result::Result<T, ChessError>;
