//! Per-piece movement templates.
//!
//! A [`MoveCandidate`] is a direction plus a step budget and capture policy.
//! The move generator walks its [`Ray`] and decides, square by square, what
//! the occupancy allows.

use crate::board::{Colour, Coords, Piece, PieceKind};

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCandidate {
    pub rank_delta: i8,
    pub file_delta: i8,
    pub max_steps: u8,
    pub capture_allowed: bool,
    pub capture_forced: bool,
}

impl MoveCandidate {
    fn slide(rank_delta: i8, file_delta: i8) -> Self {
        Self {
            rank_delta,
            file_delta,
            max_steps: 8,
            capture_allowed: true,
            capture_forced: false,
        }
    }

    fn step(rank_delta: i8, file_delta: i8) -> Self {
        Self {
            max_steps: 1,
            ..Self::slide(rank_delta, file_delta)
        }
    }

    fn castle(file_delta: i8) -> Self {
        Self {
            rank_delta: 0,
            file_delta,
            max_steps: 2,
            capture_allowed: false,
            capture_forced: false,
        }
    }

    fn pawn_push(forward: i8, max_steps: u8) -> Self {
        Self {
            rank_delta: forward,
            file_delta: 0,
            max_steps,
            capture_allowed: false,
            capture_forced: false,
        }
    }

    fn pawn_capture(forward: i8, file_delta: i8) -> Self {
        Self {
            rank_delta: forward,
            file_delta,
            max_steps: 1,
            capture_allowed: true,
            capture_forced: true,
        }
    }

    /// The king's two-step, non-capturing template only exists to signal castling.
    pub fn is_castling(&self) -> bool {
        self.max_steps == 2 && self.rank_delta == 0 && !self.capture_allowed
    }

    pub fn ray(&self, from: Coords) -> Ray {
        Ray {
            rank_delta: self.rank_delta,
            file_delta: self.file_delta,
            remaining: self.max_steps,
            current: from,
        }
    }
}

/// Successive squares along a candidate, stopping at the edge or the step budget.
#[derive(Debug, Clone)]
pub struct Ray {
    rank_delta: i8,
    file_delta: i8,
    remaining: u8,
    current: Coords,
}

impl Iterator for Ray {
    type Item = Coords;

    fn next(&mut self) -> Option<Coords> {
        if self.remaining == 0 {
            return None;
        }
        let next = self.current.offset(self.rank_delta, self.file_delta)?;
        self.remaining -= 1;
        self.current = next;
        Some(next)
    }
}

fn on_home_square(colour: Colour, at: Coords) -> bool {
    at.rank() == colour.home_rank() && at.file() == 4
}

pub fn candidates(piece: &Piece, from: Coords) -> Vec<MoveCandidate> {
    match piece.kind {
        PieceKind::Rook => ORTHOGONAL
            .iter()
            .map(|&(dr, df)| MoveCandidate::slide(dr, df))
            .collect(),
        PieceKind::Bishop => DIAGONAL
            .iter()
            .map(|&(dr, df)| MoveCandidate::slide(dr, df))
            .collect(),
        PieceKind::Queen => ORTHOGONAL
            .iter()
            .chain(DIAGONAL.iter())
            .map(|&(dr, df)| MoveCandidate::slide(dr, df))
            .collect(),
        PieceKind::Knight => KNIGHT_JUMPS
            .iter()
            .map(|&(dr, df)| MoveCandidate::step(dr, df))
            .collect(),
        PieceKind::King => {
            let mut moves: Vec<MoveCandidate> = ORTHOGONAL
                .iter()
                .chain(DIAGONAL.iter())
                .map(|&(dr, df)| MoveCandidate::step(dr, df))
                .collect();
            if on_home_square(piece.colour, from) {
                moves.push(MoveCandidate::castle(1));
                moves.push(MoveCandidate::castle(-1));
            }
            moves
        }
        PieceKind::Pawn => {
            let forward = piece.colour.forward();
            let push = if piece.has_moved { 1 } else { 2 };
            vec![
                MoveCandidate::pawn_push(forward, push),
                MoveCandidate::pawn_capture(forward, -1),
                MoveCandidate::pawn_capture(forward, 1),
            ]
        }
    }
}
