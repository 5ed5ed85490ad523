//! Legality on top of the pseudo-legal generator.
//!
//! Check detection is recomputed from scratch on every query by walking every
//! enemy piece's rays, so `legal_moves` costs roughly O(moves × pieces × rays).
//! There is no incremental attack map.

use crate::board::{Board, Colour, Coords, PieceKind};
use crate::error::ChessResult;
use crate::game::Game;
use crate::movegen::MoveGenerator;
use crate::moves::{CastleMove, Move};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate { winner: Colour },
    Stalemate,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RulesEngine {
    generator: MoveGenerator,
}

impl RulesEngine {
    pub fn new() -> Self {
        Self {
            generator: MoveGenerator::new(),
        }
    }

    pub fn generator(&self) -> &MoveGenerator {
        &self.generator
    }

    pub fn is_square_attacked(&self, board: &Board, square: Coords, by: Colour) -> bool {
        self.generator.attacks_square(board, square, by)
    }

    pub fn is_in_check(&self, board: &Board, colour: Colour) -> ChessResult<bool> {
        let king = board.find_king(colour)?;
        Ok(self.is_square_attacked(board, king, colour.opposite()))
    }

    /// Pseudo-legal moves of the side to move that keep its own king safe.
    ///
    /// Each candidate is applied to `game`, tested, and undone, so the game is
    /// left exactly as it was found.
    pub fn legal_moves(&self, game: &mut Game) -> ChessResult<Vec<Move>> {
        let colour = game.side_to_move();
        let pseudo_legal = self
            .generator
            .generate_moves(game.board(), colour, game.state().en_passant);

        let mut legal = Vec::with_capacity(pseudo_legal.len());
        for mv in pseudo_legal {
            if let Move::Castle(castle) = &mv {
                if !self.castle_allowed(game, castle) {
                    continue;
                }
            }

            game.apply_move(mv)?;
            let exposed = self.is_in_check(game.board(), colour);
            game.undo_last_move()?;

            if !exposed? {
                legal.push(mv);
            }
        }
        Ok(legal)
    }

    /// Castling preconditions, judged on the board before the king moves.
    pub fn castle_allowed(&self, game: &Game, castle: &CastleMove) -> bool {
        let board = game.board();
        if !game.state().castling_rights.allows(castle.colour, castle.side) {
            return false;
        }

        let rook_ready = board
            .get(castle.rook_from)
            .is_some_and(|rook| rook.is(PieceKind::Rook, castle.colour) && !rook.has_moved);
        if !rook_ready {
            return false;
        }

        if castle.between().any(|at| !board.is_empty(at)) {
            return false;
        }

        // No castling out of, through or into check.
        let enemy = castle.colour.opposite();
        !castle
            .king_path()
            .iter()
            .any(|&at| self.is_square_attacked(board, at, enemy))
    }

    pub fn is_checkmate(&self, game: &mut Game) -> ChessResult<bool> {
        let in_check = self.is_in_check(game.board(), game.side_to_move())?;
        Ok(in_check && self.legal_moves(game)?.is_empty())
    }

    pub fn is_stalemate(&self, game: &mut Game) -> ChessResult<bool> {
        let in_check = self.is_in_check(game.board(), game.side_to_move())?;
        Ok(!in_check && self.legal_moves(game)?.is_empty())
    }

    pub fn status(&self, game: &mut Game) -> ChessResult<GameStatus> {
        if !self.legal_moves(game)?.is_empty() {
            return Ok(GameStatus::Ongoing);
        }
        let side = game.side_to_move();
        if self.is_in_check(game.board(), side)? {
            Ok(GameStatus::Checkmate {
                winner: side.opposite(),
            })
        } else {
            Ok(GameStatus::Stalemate)
        }
    }

    /// Number of legal move sequences of length `depth` from the current position.
    pub fn perft(&self, game: &mut Game, depth: u32) -> ChessResult<u64> {
        if depth == 0 {
            return Ok(1);
        }

        let moves = self.legal_moves(game)?;
        if depth == 1 {
            return Ok(moves.len() as u64);
        }

        let mut nodes = 0;
        for mv in moves {
            game.apply_move(mv)?;
            let count = self.perft(game, depth - 1);
            game.undo_last_move()?;
            nodes += count?;
        }
        Ok(nodes)
    }
}
