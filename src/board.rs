use std::fmt;
use std::str::FromStr;

use crate::error::{ChessError, ChessResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Kinds a pawn may promote to, strongest first.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    /// Upper-case letter used by FEN and SAN.
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub fn from_letter(c: char) -> Option<PieceKind> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colour {
    White,
    Black,
}

impl Colour {
    pub fn opposite(&self) -> Colour {
        match self {
            Colour::White => Colour::Black,
            Colour::Black => Colour::White,
        }
    }

    /// Rank holding this side's king and rooks at the start of a game.
    pub fn home_rank(&self) -> u8 {
        match self {
            Colour::White => 1,
            Colour::Black => 8,
        }
    }

    pub fn pawn_start_rank(&self) -> u8 {
        match self {
            Colour::White => 2,
            Colour::Black => 7,
        }
    }

    /// Rank on which this side's pawns promote.
    pub fn last_rank(&self) -> u8 {
        match self {
            Colour::White => 8,
            Colour::Black => 1,
        }
    }

    /// Rank step of a pawn advance.
    pub fn forward(&self) -> i8 {
        match self {
            Colour::White => 1,
            Colour::Black => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub colour: Colour,
    pub has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, colour: Colour) -> Self {
        Self {
            kind,
            colour,
            has_moved: false,
        }
    }

    /// FEN letter: upper-case for White, lower-case for Black.
    pub fn symbol(&self) -> char {
        match self.colour {
            Colour::White => self.kind.letter(),
            Colour::Black => self.kind.letter().to_ascii_lowercase(),
        }
    }

    pub fn from_symbol(c: char) -> Option<Piece> {
        let kind = PieceKind::from_letter(c)?;
        let colour = if c.is_ascii_uppercase() {
            Colour::White
        } else {
            Colour::Black
        };
        Some(Piece::new(kind, colour))
    }

    pub fn is(&self, kind: PieceKind, colour: Colour) -> bool {
        self.kind == kind && self.colour == colour
    }
}

/// A square, rank 1..=8 and file 0..=7 (a..h).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coords {
    rank: u8,
    file: u8,
}

impl Coords {
    pub fn new(rank: u8, file: u8) -> Option<Coords> {
        if (1..=8).contains(&rank) && file < 8 {
            Some(Coords { rank, file })
        } else {
            None
        }
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn file(&self) -> u8 {
        self.file
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.file) as char
    }

    /// Square displaced by the given deltas, or `None` off the board.
    pub fn offset(&self, rank_delta: i8, file_delta: i8) -> Option<Coords> {
        let rank = self.rank as i8 + rank_delta;
        let file = self.file as i8 + file_delta;
        if !(1..=8).contains(&rank) || !(0..8).contains(&file) {
            return None;
        }
        Some(Coords {
            rank: rank as u8,
            file: file as u8,
        })
    }

    pub fn all() -> impl Iterator<Item = Coords> {
        (1..=8u8).flat_map(|rank| (0..8u8).map(move |file| Coords { rank, file }))
    }
}

impl FromStr for Coords {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'0');
        Coords::new(rank, file).ok_or_else(|| ChessError::InvalidSquare(s.to_string()))
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8], // [rank - 1][file]
}

impl Default for Board {
    fn default() -> Self {
        Board::empty()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    pub fn starting_position() -> Self {
        let mut board = Board::empty();
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for colour in [Colour::White, Colour::Black] {
            for (file, kind) in back_rank.iter().enumerate() {
                board.squares[colour.home_rank() as usize - 1][file] =
                    Some(Piece::new(*kind, colour));
                board.squares[colour.pawn_start_rank() as usize - 1][file] =
                    Some(Piece::new(PieceKind::Pawn, colour));
            }
        }
        board
    }

    pub fn get(&self, at: Coords) -> Option<Piece> {
        self.squares[at.rank as usize - 1][at.file as usize]
    }

    /// Puts `piece` on `at`, handing back whatever stood there.
    pub fn set(&mut self, at: Coords, piece: Option<Piece>) -> Option<Piece> {
        std::mem::replace(&mut self.squares[at.rank as usize - 1][at.file as usize], piece)
    }

    pub fn take(&mut self, at: Coords) -> Option<Piece> {
        self.set(at, None)
    }

    pub fn is_empty(&self, at: Coords) -> bool {
        self.get(at).is_none()
    }

    /// Every occupied square, rank 1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Coords, Piece)> + '_ {
        Coords::all().filter_map(move |at| self.get(at).map(|piece| (at, piece)))
    }

    pub fn pieces_of(&self, colour: Colour) -> impl Iterator<Item = (Coords, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.colour == colour)
    }

    pub fn count_kings(&self, colour: Colour) -> usize {
        self.pieces_of(colour)
            .filter(|(_, piece)| piece.kind == PieceKind::King)
            .count()
    }

    /// Square of the one `colour` king. Zero or several kings is malformed.
    pub fn find_king(&self, colour: Colour) -> ChessResult<Coords> {
        let mut kings = self
            .pieces_of(colour)
            .filter(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(at, _)| at);
        match (kings.next(), kings.next()) {
            (Some(at), None) => Ok(at),
            (None, _) => Err(ChessError::MalformedPosition { colour, found: 0 }),
            (Some(_), Some(_)) => Err(ChessError::MalformedPosition {
                colour,
                found: self.count_kings(colour),
            }),
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = String::new();
        for rank in (1..=8u8).rev() {
            result.push((b'0' + rank) as char);
            result.push(' ');
            for file in 0..8u8 {
                let at = Coords { rank, file };
                result.push(self.get(at).map_or('.', |piece| piece.symbol()));
                if file < 7 {
                    result.push(' ');
                }
            }
            result.push('\n');
        }
        result.push_str("  a b c d e f g h\n");
        write!(f, "{}", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_stays_on_board() {
        let a1: Coords = "a1".parse().unwrap();
        assert_eq!(a1.offset(1, 1), Some("b2".parse().unwrap()));
        assert_eq!(a1.offset(-1, 0), None);
        assert_eq!(a1.offset(0, -1), None);

        let h8: Coords = "h8".parse().unwrap();
        assert_eq!(h8.offset(0, 1), None);
        assert_eq!(h8.offset(-7, -7), Some(a1));
    }

    #[test]
    fn test_square_parsing() {
        assert!("i1".parse::<Coords>().is_err());
        assert!("a9".parse::<Coords>().is_err());
        assert!("a0".parse::<Coords>().is_err());
        assert!("e44".parse::<Coords>().is_err());
        assert_eq!("e4".parse::<Coords>().unwrap().to_string(), "e4");
    }

    #[test]
    fn test_starting_position_layout() {
        let board = Board::starting_position();
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.find_king(Colour::White), Ok("e1".parse().unwrap()));
        assert_eq!(board.find_king(Colour::Black), Ok("e8".parse().unwrap()));
        assert_eq!(
            board.get("d8".parse().unwrap()),
            Some(Piece::new(PieceKind::Queen, Colour::Black))
        );
    }

    #[test]
    fn test_find_king_reports_malformed_boards() {
        let mut board = Board::empty();
        assert_eq!(
            board.find_king(Colour::White),
            Err(ChessError::MalformedPosition {
                colour: Colour::White,
                found: 0,
            })
        );

        board.set("a1".parse().unwrap(), Some(Piece::new(PieceKind::King, Colour::White)));
        board.set("h1".parse().unwrap(), Some(Piece::new(PieceKind::King, Colour::White)));
        assert_eq!(
            board.find_king(Colour::White),
            Err(ChessError::MalformedPosition {
                colour: Colour::White,
                found: 2,
            })
        );
    }

    #[test]
    fn test_set_returns_previous_occupant() {
        let mut board = Board::starting_position();
        let e2 = "e2".parse().unwrap();
        let pawn = board.take(e2);
        assert_eq!(pawn, Some(Piece::new(PieceKind::Pawn, Colour::White)));
        assert!(board.is_empty(e2));
        assert_eq!(board.set(e2, pawn), None);
    }

    #[test]
    fn test_display() {
        let text = Board::starting_position().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8 r n b q k b n r");
        assert_eq!(lines[4], "4 . . . . . . . .");
        assert_eq!(lines[7], "1 R N B Q K B N R");
    }
}
