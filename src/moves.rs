use std::fmt;

use crate::board::{Board, Colour, Coords, Piece, PieceKind};
use crate::error::{ChessError, ChessResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    fn king_file_delta(self) -> i8 {
        match self {
            CastleSide::Kingside => 2,
            CastleSide::Queenside => -2,
        }
    }

    fn rook_files(self) -> (u8, u8) {
        match self {
            CastleSide::Kingside => (7, 5),  // h to f
            CastleSide::Queenside => (0, 3), // a to d
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalMove {
    pub colour: Colour,
    pub piece: PieceKind,
    pub from: Coords,
    pub to: Coords,
    pub capture: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastleMove {
    pub colour: Colour,
    pub side: CastleSide,
    pub king_from: Coords,
    pub king_to: Coords,
    pub rook_from: Coords,
    pub rook_to: Coords,
}

impl CastleMove {
    /// Castling for `colour` from the fixed starting squares.
    pub fn new(colour: Colour, side: CastleSide) -> Self {
        let rank = colour.home_rank();
        let (rook_from, rook_to) = side.rook_files();
        let square = |file: u8| {
            Coords::new(rank, file)
                .unwrap_or_else(|| unreachable!("castling squares are on the board"))
        };
        let king_from = square(4);
        Self {
            colour,
            side,
            king_from,
            king_to: square((4 + side.king_file_delta()) as u8),
            rook_from: square(rook_from),
            rook_to: square(rook_to),
        }
    }

    /// Squares strictly between the king and the rook.
    pub fn between(&self) -> impl Iterator<Item = Coords> {
        let rank = self.king_from.rank();
        let (low, high) = match self.side {
            CastleSide::Kingside => (self.king_from.file() + 1, self.rook_from.file()),
            CastleSide::Queenside => (self.rook_from.file() + 1, self.king_from.file()),
        };
        (low..high).filter_map(move |file| Coords::new(rank, file))
    }

    /// Squares the king stands on or crosses: start, intermediate and end.
    pub fn king_path(&self) -> [Coords; 3] {
        let step = self.side.king_file_delta().signum();
        let middle = self
            .king_from
            .offset(0, step)
            .unwrap_or_else(|| unreachable!("the king's castling path is on the board"));
        [self.king_from, middle, self.king_to]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnPassantMove {
    pub colour: Colour,
    pub from: Coords,
    pub to: Coords,
}

impl EnPassantMove {
    /// The captured pawn sits beside the mover, on the destination's file.
    pub fn captured_square(&self) -> Coords {
        Coords::new(self.from.rank(), self.to.file())
            .unwrap_or_else(|| unreachable!("rank and file both come from board squares"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionMove {
    pub colour: Colour,
    pub from: Coords,
    pub to: Coords,
    pub promote_to: PieceKind,
    pub capture: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Normal(NormalMove),
    Castle(CastleMove),
    EnPassant(EnPassantMove),
    Promotion(PromotionMove),
}

impl Move {
    pub fn colour(&self) -> Colour {
        match self {
            Move::Normal(mv) => mv.colour,
            Move::Castle(mv) => mv.colour,
            Move::EnPassant(mv) => mv.colour,
            Move::Promotion(mv) => mv.colour,
        }
    }

    pub fn from(&self) -> Coords {
        match self {
            Move::Normal(mv) => mv.from,
            Move::Castle(mv) => mv.king_from,
            Move::EnPassant(mv) => mv.from,
            Move::Promotion(mv) => mv.from,
        }
    }

    pub fn to(&self) -> Coords {
        match self {
            Move::Normal(mv) => mv.to,
            Move::Castle(mv) => mv.king_to,
            Move::EnPassant(mv) => mv.to,
            Move::Promotion(mv) => mv.to,
        }
    }

    /// Kind of the piece standing on the start square.
    pub fn piece(&self) -> PieceKind {
        match self {
            Move::Normal(mv) => mv.piece,
            Move::Castle(_) => PieceKind::King,
            Move::EnPassant(_) | Move::Promotion(_) => PieceKind::Pawn,
        }
    }

    pub fn is_capture(&self) -> bool {
        match self {
            Move::Normal(mv) => mv.capture,
            Move::Castle(_) => false,
            Move::EnPassant(_) => true,
            Move::Promotion(mv) => mv.capture,
        }
    }

    pub fn promotion(&self) -> Option<PieceKind> {
        match self {
            Move::Promotion(mv) => Some(mv.promote_to),
            _ => None,
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> ChessError {
        ChessError::InvalidMove {
            mv: self.to_string(),
            reason: reason.into(),
        }
    }

    fn expect_piece(
        &self,
        board: &Board,
        at: Coords,
        kind: PieceKind,
        colour: Colour,
    ) -> ChessResult<Piece> {
        match board.get(at) {
            Some(piece) if piece.is(kind, colour) => Ok(piece),
            Some(piece) => Err(self.invalid(format!(
                "expected {:?} {:?} on {}, found {:?}",
                colour, kind, at, piece
            ))),
            None => Err(self.invalid(format!(
                "expected {:?} {:?} on {}, square is empty",
                colour, kind, at
            ))),
        }
    }

    /// Destination must be empty for a quiet move and hold an enemy piece for a capture.
    fn check_destination(&self, board: &Board, to: Coords, capture: bool) -> ChessResult<()> {
        match (board.get(to), capture) {
            (None, false) => Ok(()),
            (Some(piece), true) if piece.colour != self.colour() => Ok(()),
            (Some(piece), _) => Err(self.invalid(format!("cannot land on {:?} at {}", piece, to))),
            (None, true) => Err(self.invalid(format!("nothing to capture on {}", to))),
        }
    }

    /// Checks every precondition of the move against `board` without touching it.
    fn validate(&self, board: &Board) -> ChessResult<()> {
        let colour = self.colour();
        match self {
            Move::Normal(mv) => {
                self.expect_piece(board, mv.from, mv.piece, colour)?;
                self.check_destination(board, mv.to, mv.capture)
            }
            Move::Castle(mv) => {
                self.expect_piece(board, mv.king_from, PieceKind::King, colour)?;
                self.expect_piece(board, mv.rook_from, PieceKind::Rook, colour)?;
                if mv.between().any(|at| !board.is_empty(at)) {
                    return Err(self.invalid("squares between king and rook are occupied"));
                }
                Ok(())
            }
            Move::EnPassant(mv) => {
                self.expect_piece(board, mv.from, PieceKind::Pawn, colour)?;
                self.expect_piece(board, mv.captured_square(), PieceKind::Pawn, colour.opposite())?;
                self.check_destination(board, mv.to, false)
            }
            Move::Promotion(mv) => {
                self.expect_piece(board, mv.from, PieceKind::Pawn, colour)?;
                if !PieceKind::PROMOTIONS.contains(&mv.promote_to) {
                    return Err(self.invalid(format!("cannot promote to {:?}", mv.promote_to)));
                }
                self.check_destination(board, mv.to, mv.capture)
            }
        }
    }

    /// Moves the pieces on `board`. Either the move is fully applied or the board is untouched.
    pub(crate) fn apply_to(&self, board: &mut Board) -> ChessResult<BoardChange> {
        self.validate(board)?;

        let mut change = BoardChange::default();
        match self {
            Move::Normal(mv) => {
                change.captured = relocate(board, mv.from, mv.to, &mut change.mover_had_moved);
            }
            Move::Castle(mv) => {
                relocate(board, mv.king_from, mv.king_to, &mut change.mover_had_moved);
                relocate(board, mv.rook_from, mv.rook_to, &mut change.rook_had_moved);
            }
            Move::EnPassant(mv) => {
                relocate(board, mv.from, mv.to, &mut change.mover_had_moved);
                change.captured = board.take(mv.captured_square());
            }
            Move::Promotion(mv) => {
                if let Some(pawn) = board.take(mv.from) {
                    change.mover_had_moved = pawn.has_moved;
                }
                let mut promoted = Piece::new(mv.promote_to, mv.colour);
                promoted.has_moved = true;
                change.captured = board.set(mv.to, Some(promoted));
            }
        }
        Ok(change)
    }

    /// Reverses [`Move::apply_to`] using the record it produced.
    pub(crate) fn undo_on(&self, board: &mut Board, change: &BoardChange) {
        match self {
            Move::Normal(mv) => {
                restore(board, mv.to, mv.from, change.mover_had_moved);
                board.set(mv.to, change.captured);
            }
            Move::Castle(mv) => {
                restore(board, mv.rook_to, mv.rook_from, change.rook_had_moved);
                restore(board, mv.king_to, mv.king_from, change.mover_had_moved);
            }
            Move::EnPassant(mv) => {
                restore(board, mv.to, mv.from, change.mover_had_moved);
                board.set(mv.captured_square(), change.captured);
            }
            Move::Promotion(mv) => {
                let mut pawn = Piece::new(PieceKind::Pawn, mv.colour);
                pawn.has_moved = change.mover_had_moved;
                board.set(mv.from, Some(pawn));
                board.set(mv.to, change.captured);
            }
        }
    }
}

/// What a move displaced on the board, kept so the move can be taken back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardChange {
    pub captured: Option<Piece>,
    pub mover_had_moved: bool,
    pub rook_had_moved: bool,
}

// Transfers the piece on `from` to `to`, marking it moved. Returns the piece it displaced.
fn relocate(board: &mut Board, from: Coords, to: Coords, had_moved: &mut bool) -> Option<Piece> {
    let mut piece = board.take(from);
    if let Some(piece) = piece.as_mut() {
        *had_moved = piece.has_moved;
        piece.has_moved = true;
    }
    board.set(to, piece)
}

fn restore(board: &mut Board, from: Coords, to: Coords, had_moved: bool) {
    let mut piece = board.take(from);
    if let Some(piece) = piece.as_mut() {
        piece.has_moved = had_moved;
    }
    board.set(to, piece);
}

/// Long algebraic notation, e.g. `e2e4`, `e1g1`, `e7e8q`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(kind) = self.promotion() {
            write!(f, "{}", kind.letter().to_ascii_lowercase())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Coords {
        s.parse().unwrap()
    }

    #[test]
    fn test_castle_geometry() {
        let short = CastleMove::new(Colour::White, CastleSide::Kingside);
        assert_eq!((short.king_to, short.rook_from, short.rook_to), (sq("g1"), sq("h1"), sq("f1")));
        assert_eq!(short.between().collect::<Vec<_>>(), vec![sq("f1"), sq("g1")]);
        assert_eq!(short.king_path(), [sq("e1"), sq("f1"), sq("g1")]);

        let long = CastleMove::new(Colour::Black, CastleSide::Queenside);
        assert_eq!((long.king_to, long.rook_from, long.rook_to), (sq("c8"), sq("a8"), sq("d8")));
        assert_eq!(long.between().collect::<Vec<_>>(), vec![sq("b8"), sq("c8"), sq("d8")]);
        assert_eq!(long.king_path(), [sq("e8"), sq("d8"), sq("c8")]);
    }

    #[test]
    fn test_en_passant_captured_square() {
        let mv = EnPassantMove {
            colour: Colour::White,
            from: sq("e5"),
            to: sq("d6"),
        };
        assert_eq!(mv.captured_square(), sq("d5"));
    }

    #[test]
    fn test_apply_rejects_wrong_piece_without_mutation() {
        let mut board = Board::starting_position();
        let before = board.clone();
        let mv = Move::Normal(NormalMove {
            colour: Colour::White,
            piece: PieceKind::Rook,
            from: sq("e2"),
            to: sq("e4"),
            capture: false,
        });
        assert!(matches!(mv.apply_to(&mut board), Err(ChessError::InvalidMove { .. })));
        assert_eq!(board, before);
    }

    #[test]
    fn test_special_moves_reject_bad_boards_without_mutation() {
        let mut board = Board::empty();
        board.set(sq("e1"), Some(Piece::new(PieceKind::King, Colour::White)));
        board.set(sq("e5"), Some(Piece::new(PieceKind::Pawn, Colour::White)));
        board.set(sq("b7"), Some(Piece::new(PieceKind::Knight, Colour::White)));
        let before = board.clone();

        let rejected = [
            // No rook on h1.
            Move::Castle(CastleMove::new(Colour::White, CastleSide::Kingside)),
            // Nothing on d5 to take.
            Move::EnPassant(EnPassantMove {
                colour: Colour::White,
                from: sq("e5"),
                to: sq("d6"),
            }),
            // A knight cannot promote.
            Move::Promotion(PromotionMove {
                colour: Colour::White,
                from: sq("b7"),
                to: sq("b8"),
                promote_to: PieceKind::Queen,
                capture: false,
            }),
        ];
        for mv in rejected {
            assert!(
                matches!(mv.apply_to(&mut board), Err(ChessError::InvalidMove { .. })),
                "{}",
                mv
            );
            assert_eq!(board, before, "{} touched the board", mv);
        }
    }

    #[test]
    fn test_promotion_capture_round_trip() {
        let mut board = Board::empty();
        let mut pawn = Piece::new(PieceKind::Pawn, Colour::White);
        pawn.has_moved = true;
        board.set(sq("b7"), Some(pawn));
        board.set(sq("a8"), Some(Piece::new(PieceKind::Rook, Colour::Black)));
        let before = board.clone();

        let mv = Move::Promotion(PromotionMove {
            colour: Colour::White,
            from: sq("b7"),
            to: sq("a8"),
            promote_to: PieceKind::Knight,
            capture: true,
        });
        let change = mv.apply_to(&mut board).unwrap();
        assert_eq!(board.get(sq("a8")).map(|p| p.kind), Some(PieceKind::Knight));
        assert!(board.is_empty(sq("b7")));

        mv.undo_on(&mut board, &change);
        assert_eq!(board, before);
    }

    #[test]
    fn test_display_is_long_algebraic() {
        let promo = Move::Promotion(PromotionMove {
            colour: Colour::Black,
            from: sq("e2"),
            to: sq("e1"),
            promote_to: PieceKind::Queen,
            capture: false,
        });
        assert_eq!(promo.to_string(), "e2e1q");
        let castle = Move::Castle(CastleMove::new(Colour::White, CastleSide::Queenside));
        assert_eq!(castle.to_string(), "e1c1");
    }
}
