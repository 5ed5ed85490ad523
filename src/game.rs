use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::board::{Board, Colour, Coords, PieceKind};
use crate::error::{ChessError, ChessResult};
use crate::moves::{BoardChange, CastleSide, Move};
use crate::rules::RulesEngine;

/// Four independent castling flags, stored as KQkq bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;

    pub fn all() -> Self {
        CastlingRights(0b1111)
    }

    pub fn none() -> Self {
        CastlingRights(0)
    }

    fn bit(colour: Colour, side: CastleSide) -> u8 {
        match (colour, side) {
            (Colour::White, CastleSide::Kingside) => Self::WHITE_KINGSIDE,
            (Colour::White, CastleSide::Queenside) => Self::WHITE_QUEENSIDE,
            (Colour::Black, CastleSide::Kingside) => Self::BLACK_KINGSIDE,
            (Colour::Black, CastleSide::Queenside) => Self::BLACK_QUEENSIDE,
        }
    }

    pub fn allows(&self, colour: Colour, side: CastleSide) -> bool {
        self.0 & Self::bit(colour, side) != 0
    }

    pub fn grant(&mut self, colour: Colour, side: CastleSide) {
        self.0 |= Self::bit(colour, side);
    }

    pub fn revoke(&mut self, colour: Colour, side: CastleSide) {
        self.0 &= !Self::bit(colour, side);
    }

    pub fn revoke_all(&mut self, colour: Colour) {
        self.revoke(colour, CastleSide::Kingside);
        self.revoke(colour, CastleSide::Queenside);
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Drops the right tied to a rook's home corner once anything leaves or lands on it.
    fn touch_corner(&mut self, at: Coords) {
        for colour in [Colour::White, Colour::Black] {
            if at.rank() != colour.home_rank() {
                continue;
            }
            match at.file() {
                0 => self.revoke(colour, CastleSide::Queenside),
                7 => self.revoke(colour, CastleSide::Kingside),
                _ => {}
            }
        }
    }
}

impl FromStr for CastlingRights {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rights = CastlingRights::none();
        if s == "-" {
            return Ok(rights);
        }
        if s.is_empty() {
            return Err(ChessError::InvalidCastlingRights(s.to_string()));
        }
        for c in s.chars() {
            let (colour, side) = match c {
                'K' => (Colour::White, CastleSide::Kingside),
                'Q' => (Colour::White, CastleSide::Queenside),
                'k' => (Colour::Black, CastleSide::Kingside),
                'q' => (Colour::Black, CastleSide::Queenside),
                _ => return Err(ChessError::InvalidCastlingRights(s.to_string())),
            };
            if rights.allows(colour, side) {
                return Err(ChessError::InvalidCastlingRights(s.to_string()));
            }
            rights.grant(colour, side);
        }
        Ok(rights)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for (c, colour, side) in [
            ('K', Colour::White, CastleSide::Kingside),
            ('Q', Colour::White, CastleSide::Queenside),
            ('k', Colour::Black, CastleSide::Kingside),
            ('q', Colour::Black, CastleSide::Queenside),
        ] {
            if self.allows(colour, side) {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    pub side_to_move: Colour,
    pub castling_rights: CastlingRights,
    pub en_passant: Option<Coords>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            side_to_move: Colour::White,
            castling_rights: CastlingRights::all(),
            en_passant: None,
        }
    }
}

impl GameState {
    fn advance(&mut self, mv: &Move) {
        match mv.piece() {
            PieceKind::King => self.castling_rights.revoke_all(mv.colour()),
            PieceKind::Rook => self.castling_rights.touch_corner(mv.from()),
            _ => {}
        }
        if mv.is_capture() {
            self.castling_rights.touch_corner(mv.to());
        }

        // Only a fresh double pawn push leaves an en passant target behind.
        self.en_passant = match mv {
            Move::Normal(normal)
                if normal.piece == PieceKind::Pawn
                    && normal.from.rank().abs_diff(normal.to.rank()) == 2 =>
            {
                normal.from.offset(mv.colour().forward(), 0)
            }
            _ => None,
        };

        self.side_to_move = self.side_to_move.opposite();
    }
}

/// One entry of the move history: the move plus everything needed to take it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    pub mv: Move,
    pub change: BoardChange,
    pub prior_state: GameState,
}

/// Board, game state and move history of one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    state: GameState,
    history: Vec<AppliedMove>,
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self {
            board: Board::starting_position(),
            state: GameState::default(),
            history: Vec::new(),
        }
    }

    /// Replaces the position wholesale and clears the history.
    pub fn set_position(
        &mut self,
        board: Board,
        side_to_move: Colour,
        castling_rights: CastlingRights,
        en_passant: Option<Coords>,
    ) -> ChessResult<()> {
        for colour in [Colour::White, Colour::Black] {
            let found = board.count_kings(colour);
            if found > 1 {
                return Err(ChessError::MalformedPosition { colour, found });
            }
        }
        self.board = board;
        self.state = GameState {
            side_to_move,
            castling_rights,
            en_passant,
        };
        self.history.clear();
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn side_to_move(&self) -> Colour {
        self.state.side_to_move
    }

    pub fn history(&self) -> &[AppliedMove] {
        &self.history
    }

    pub fn apply_move(&mut self, mv: Move) -> ChessResult<()> {
        if mv.colour() != self.state.side_to_move {
            return Err(ChessError::WrongSide {
                expected: self.state.side_to_move,
                found: mv.colour(),
            });
        }
        let change = mv.apply_to(&mut self.board)?;
        let prior_state = self.state;
        self.state.advance(&mv);
        self.history.push(AppliedMove {
            mv,
            change,
            prior_state,
        });
        trace!(%mv, depth = self.history.len(), "applied");
        Ok(())
    }

    pub fn undo_last_move(&mut self) -> ChessResult<Move> {
        let applied = self.history.pop().ok_or(ChessError::EmptyHistory)?;
        applied.mv.undo_on(&mut self.board, &applied.change);
        self.state = applied.prior_state;
        trace!(mv = %applied.mv, depth = self.history.len(), "undone");
        Ok(applied.mv)
    }

    pub fn legal_moves(&mut self) -> ChessResult<Vec<Move>> {
        RulesEngine::new().legal_moves(self)
    }

    pub fn is_in_check(&self, colour: Colour) -> ChessResult<bool> {
        RulesEngine::new().is_in_check(&self.board, colour)
    }

    pub fn is_checkmate(&mut self) -> ChessResult<bool> {
        RulesEngine::new().is_checkmate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{CastleMove, NormalMove};

    fn sq(s: &str) -> Coords {
        s.parse().unwrap()
    }

    fn pawn_push(colour: Colour, from: &str, to: &str) -> Move {
        Move::Normal(NormalMove {
            colour,
            piece: PieceKind::Pawn,
            from: sq(from),
            to: sq(to),
            capture: false,
        })
    }

    #[test]
    fn test_castling_rights_text() {
        assert_eq!("KQkq".parse::<CastlingRights>(), Ok(CastlingRights::all()));
        assert_eq!("-".parse::<CastlingRights>(), Ok(CastlingRights::none()));
        assert_eq!("Kq".parse::<CastlingRights>().unwrap().to_string(), "Kq");
        assert!("KK".parse::<CastlingRights>().is_err());
        assert!("X".parse::<CastlingRights>().is_err());
        assert!("".parse::<CastlingRights>().is_err());
    }

    #[test]
    fn test_double_push_sets_en_passant_target() {
        let mut game = Game::new();
        game.apply_move(pawn_push(Colour::White, "e2", "e4")).unwrap();
        assert_eq!(game.state().en_passant, Some(sq("e3")));
        assert_eq!(game.side_to_move(), Colour::Black);

        game.apply_move(pawn_push(Colour::Black, "a7", "a6")).unwrap();
        assert_eq!(game.state().en_passant, None);

        game.undo_last_move().unwrap();
        assert_eq!(game.state().en_passant, Some(sq("e3")));
    }

    #[test]
    fn test_wrong_side_is_rejected() {
        let mut game = Game::new();
        let before = game.clone();
        assert_eq!(
            game.apply_move(pawn_push(Colour::Black, "e7", "e5")),
            Err(ChessError::WrongSide {
                expected: Colour::White,
                found: Colour::Black,
            })
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_undo_on_empty_history_is_an_error() {
        let mut game = Game::new();
        assert_eq!(game.undo_last_move(), Err(ChessError::EmptyHistory));
    }

    #[test]
    fn test_king_and_rook_moves_revoke_rights() {
        let mut board = Board::empty();
        for (at, symbol) in [("e1", 'K'), ("a1", 'R'), ("h1", 'R'), ("e8", 'k'), ("h8", 'r')] {
            board.set(sq(at), crate::board::Piece::from_symbol(symbol));
        }
        let mut game = Game::new();
        game.set_position(board, Colour::White, CastlingRights::all(), None).unwrap();

        // Rook takes rook in the corner: White loses kingside, Black loses kingside.
        game.apply_move(Move::Normal(NormalMove {
            colour: Colour::White,
            piece: PieceKind::Rook,
            from: sq("h1"),
            to: sq("h8"),
            capture: true,
        }))
        .unwrap();
        let rights = game.state().castling_rights;
        assert!(!rights.allows(Colour::White, CastleSide::Kingside));
        assert!(rights.allows(Colour::White, CastleSide::Queenside));
        assert!(!rights.allows(Colour::Black, CastleSide::Kingside));
        assert!(rights.allows(Colour::Black, CastleSide::Queenside));

        game.undo_last_move().unwrap();
        assert_eq!(game.state().castling_rights, CastlingRights::all());
    }

    #[test]
    fn test_castle_moves_both_pieces_and_undoes() {
        let mut board = Board::empty();
        for (at, symbol) in [("e1", 'K'), ("a1", 'R'), ("e8", 'k')] {
            board.set(sq(at), crate::board::Piece::from_symbol(symbol));
        }
        let mut game = Game::new();
        game.set_position(board, Colour::White, "Q".parse().unwrap(), None).unwrap();
        let before = game.clone();

        game.apply_move(Move::Castle(CastleMove::new(Colour::White, CastleSide::Queenside)))
            .unwrap();
        assert_eq!(game.board().get(sq("c1")).map(|p| p.kind), Some(PieceKind::King));
        assert_eq!(game.board().get(sq("d1")).map(|p| p.kind), Some(PieceKind::Rook));
        assert!(game.state().castling_rights.is_empty());

        game.undo_last_move().unwrap();
        assert_eq!(game, before);
    }

    #[test]
    fn test_set_position_rejects_duplicate_kings() {
        let mut board = Board::empty();
        board.set(sq("e1"), crate::board::Piece::from_symbol('K'));
        board.set(sq("e2"), crate::board::Piece::from_symbol('K'));
        let mut game = Game::new();
        assert_eq!(
            game.set_position(board, Colour::White, CastlingRights::none(), None),
            Err(ChessError::MalformedPosition {
                colour: Colour::White,
                found: 2,
            })
        );
        assert_eq!(game, Game::new());
    }
}
