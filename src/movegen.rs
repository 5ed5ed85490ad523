use crate::board::{Board, Colour, Coords, Piece, PieceKind};
use crate::candidates::{candidates, MoveCandidate};
use crate::moves::{CastleMove, CastleSide, EnPassantMove, Move, NormalMove, PromotionMove};

/// Expands movement templates into pseudo-legal moves.
///
/// Nothing here knows about check: a move returned by the generator may leave
/// the mover's own king attacked. [`crate::rules::RulesEngine`] filters those out.
#[derive(Debug, Default, Clone, Copy)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        MoveGenerator
    }

    /// Pseudo-legal moves for every `colour` piece on the board.
    pub fn generate_moves(
        &self,
        board: &Board,
        colour: Colour,
        en_passant: Option<Coords>,
    ) -> Vec<Move> {
        let mut moves = Vec::new();
        for (from, piece) in board.pieces_of(colour) {
            self.piece_moves(board, from, &piece, en_passant, &mut moves);
        }
        moves
    }

    pub fn piece_moves(
        &self,
        board: &Board,
        from: Coords,
        piece: &Piece,
        en_passant: Option<Coords>,
        moves: &mut Vec<Move>,
    ) {
        for candidate in candidates(piece, from) {
            if candidate.is_castling() {
                self.castling_move(board, from, piece, &candidate, moves);
                continue;
            }

            for to in candidate.ray(from) {
                match board.get(to) {
                    None => {
                        if candidate.capture_forced {
                            // Pawns may still take en passant onto an empty square
                            if piece.kind == PieceKind::Pawn && Some(to) == en_passant {
                                self.en_passant_move(board, from, to, piece, moves);
                            }
                            break;
                        }
                        self.push_move(from, to, piece, false, moves);
                    }
                    Some(occupant) => {
                        if candidate.capture_allowed && occupant.colour != piece.colour {
                            self.push_move(from, to, piece, true, moves);
                        }
                        break;
                    }
                }
            }
        }
    }

    fn push_move(
        &self,
        from: Coords,
        to: Coords,
        piece: &Piece,
        capture: bool,
        moves: &mut Vec<Move>,
    ) {
        if piece.kind == PieceKind::Pawn && to.rank() == piece.colour.last_rank() {
            for promote_to in PieceKind::PROMOTIONS {
                moves.push(Move::Promotion(PromotionMove {
                    colour: piece.colour,
                    from,
                    to,
                    promote_to,
                    capture,
                }));
            }
            return;
        }
        moves.push(Move::Normal(NormalMove {
            colour: piece.colour,
            piece: piece.kind,
            from,
            to,
            capture,
        }));
    }

    fn en_passant_move(
        &self,
        board: &Board,
        from: Coords,
        to: Coords,
        piece: &Piece,
        moves: &mut Vec<Move>,
    ) {
        let mv = EnPassantMove {
            colour: piece.colour,
            from,
            to,
        };
        let victim = board.get(mv.captured_square());
        if victim.is_some_and(|victim| victim.is(PieceKind::Pawn, piece.colour.opposite())) {
            moves.push(Move::EnPassant(mv));
        }
    }

    // The king's two-step template: the first square only has to be free,
    // the one-step template already produces that king move.
    fn castling_move(
        &self,
        board: &Board,
        from: Coords,
        piece: &Piece,
        candidate: &MoveCandidate,
        moves: &mut Vec<Move>,
    ) {
        let mut steps = 0;
        for to in candidate.ray(from) {
            if !board.is_empty(to) {
                return;
            }
            steps += 1;
            if steps == 2 {
                let side = if candidate.file_delta > 0 {
                    CastleSide::Kingside
                } else {
                    CastleSide::Queenside
                };
                moves.push(Move::Castle(CastleMove::new(piece.colour, side)));
            }
        }
    }

    /// True if a `by` piece could capture on `target` were an enemy standing there.
    pub fn attacks_square(&self, board: &Board, target: Coords, by: Colour) -> bool {
        board.pieces_of(by).any(|(from, piece)| {
            candidates(&piece, from)
                .iter()
                .filter(|candidate| candidate.capture_allowed)
                .any(|candidate| {
                    for at in candidate.ray(from) {
                        if at == target {
                            return true;
                        }
                        if !board.is_empty(at) {
                            return false;
                        }
                    }
                    false
                })
        })
    }
}
