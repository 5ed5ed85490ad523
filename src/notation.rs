//! Text moves resolved against the legal moves of a position.
//!
//! Accepts long algebraic (`e2e4`, `e7e8q`), a SAN-like form that always names
//! the start square (`Nb1-c3`, `Nb1xc3`, `e2-e4`, `e7xd8=Q`) and castling
//! (`O-O`, `O-O-O`, or with zeros). Trailing `+` or `#` is ignored.

use crate::board::{Coords, PieceKind};
use crate::error::{ChessError, ChessResult};
use crate::game::Game;
use crate::moves::{CastleSide, Move};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Castle(CastleSide),
    Squares {
        piece: Option<PieceKind>,
        from: Coords,
        to: Coords,
        capture: Option<bool>,
        promotion: Option<PieceKind>,
    },
}

impl Pattern {
    fn matches(&self, mv: &Move) -> bool {
        match (self, mv) {
            (Pattern::Castle(side), Move::Castle(castle)) => castle.side == *side,
            (Pattern::Castle(_), _) => false,
            (
                Pattern::Squares {
                    piece,
                    from,
                    to,
                    capture,
                    promotion,
                },
                mv,
            ) => {
                mv.from() == *from
                    && mv.to() == *to
                    && mv.promotion() == *promotion
                    && piece.map_or(true, |kind| kind == mv.piece())
                    && capture.map_or(true, |capture| capture == mv.is_capture())
            }
        }
    }
}

/// Finds the legal move written as `text`. The game is left as it was.
pub fn parse_move(game: &mut Game, text: &str) -> ChessResult<Move> {
    let pattern = parse_pattern(text)?;
    game.legal_moves()?
        .into_iter()
        .find(|mv| pattern.matches(mv))
        .ok_or_else(|| ChessError::IllegalMove(text.trim().to_string()))
}

fn parse_pattern(text: &str) -> ChessResult<Pattern> {
    let bad = || ChessError::BadNotation(text.to_string());

    let body = text.trim().trim_end_matches(['+', '#']);
    if !body.is_ascii() || body.is_empty() {
        return Err(bad());
    }

    match body {
        "O-O" | "0-0" => return Ok(Pattern::Castle(CastleSide::Kingside)),
        "O-O-O" | "0-0-0" => return Ok(Pattern::Castle(CastleSide::Queenside)),
        _ => {}
    }

    let mut rest = body;

    // Piece letters are upper-case so `b` stays a file.
    let mut piece = None;
    if let Some(first) = rest.chars().next().filter(|c| c.is_ascii_uppercase()) {
        piece = Some(PieceKind::from_letter(first).ok_or_else(bad)?);
        rest = &rest[1..];
    }

    let from: Coords = rest.get(..2).ok_or_else(bad)?.parse().map_err(|_| bad())?;
    rest = &rest[2..];

    let capture = match rest.chars().next() {
        Some('x') => Some(true),
        Some('-') => Some(false),
        _ => None,
    };
    if capture.is_some() {
        rest = &rest[1..];
    }

    let to: Coords = rest.get(..2).ok_or_else(bad)?.parse().map_err(|_| bad())?;
    rest = &rest[2..];

    let promotion = match rest.strip_prefix('=').unwrap_or(rest) {
        "" if rest.is_empty() => None,
        letter if letter.len() == 1 => {
            let kind = letter.chars().next().and_then(PieceKind::from_letter).ok_or_else(bad)?;
            if !PieceKind::PROMOTIONS.contains(&kind) {
                return Err(bad());
            }
            Some(kind)
        }
        _ => return Err(bad()),
    };

    Ok(Pattern::Squares {
        piece,
        from,
        to,
        capture,
        promotion,
    })
}
