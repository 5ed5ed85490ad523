pub mod board;
pub mod candidates;
pub mod error;
pub mod evaluation;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod moves;
pub mod notation;
pub mod rules;
pub mod search;
pub mod uci;

pub use board::{Board, Colour, Coords, Piece, PieceKind};
pub use error::{ChessError, ChessResult};
pub use game::{CastlingRights, Game, GameState};
pub use moves::{CastleSide, Move};
pub use rules::{GameStatus, RulesEngine};
pub use search::{Search, SearchOutcome, MATE_SCORE};
