//! Forsyth-Edwards Notation in and out of a [`Game`].
//!
//! The half-move and full-move counters are accepted but not tracked; `to_fen`
//! always writes `0 1`.

use crate::board::{Board, Colour, Coords, Piece, PieceKind};
use crate::error::{ChessError, ChessResult};
use crate::game::{CastlingRights, Game};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub fn parse_fen(fen: &str) -> ChessResult<Game> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if !(4..=6).contains(&fields.len()) {
        return Err(ChessError::InvalidFen(format!(
            "expected 4 to 6 fields, found {}",
            fields.len()
        )));
    }

    let board = parse_placement(fields[0])?;

    let side_to_move = match fields[1] {
        "w" => Colour::White,
        "b" => Colour::Black,
        other => return Err(ChessError::InvalidFen(format!("bad side to move '{}'", other))),
    };

    let castling_rights: CastlingRights = fields[2].parse()?;

    let en_passant = match fields[3] {
        "-" => None,
        square => Some(square.parse::<Coords>()?),
    };

    for counter in &fields[4..] {
        if counter.parse::<u32>().is_err() {
            return Err(ChessError::InvalidFen(format!("bad move counter '{}'", counter)));
        }
    }

    let mut game = Game::new();
    game.set_position(board, side_to_move, castling_rights, en_passant)?;
    Ok(game)
}

fn parse_placement(placement: &str) -> ChessResult<Board> {
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(ChessError::InvalidFen(format!("expected 8 ranks, found {}", rows.len())));
    }

    let mut board = Board::empty();
    for (row, text) in rows.iter().enumerate() {
        let rank = 8 - row as u8;
        let mut file: u8 = 0;
        for c in text.chars() {
            if let Some(skip) = c.to_digit(10) {
                if !(1..=8).contains(&skip) {
                    return Err(ChessError::InvalidFen(format!("bad empty-square count '{}'", c)));
                }
                if file + skip as u8 > 8 {
                    return Err(too_long(rank));
                }
                file += skip as u8;
                continue;
            }

            let mut piece = Piece::from_symbol(c)
                .ok_or_else(|| ChessError::InvalidFen(format!("unknown piece '{}'", c)))?;
            let at = Coords::new(rank, file).ok_or_else(|| too_long(rank))?;
            piece.has_moved = !on_start_square(&piece, at);
            board.set(at, Some(piece));
            file += 1;
        }
        if file != 8 {
            return Err(ChessError::InvalidFen(format!(
                "rank {} covers {} squares, expected 8",
                rank, file
            )));
        }
    }
    Ok(board)
}

fn too_long(rank: u8) -> ChessError {
    ChessError::InvalidFen(format!("rank {} is longer than 8 squares", rank))
}

// Only pieces whose first move matters get a has_moved guess.
fn on_start_square(piece: &Piece, at: Coords) -> bool {
    let colour = piece.colour;
    match piece.kind {
        PieceKind::Pawn => at.rank() == colour.pawn_start_rank(),
        PieceKind::King => at.rank() == colour.home_rank() && at.file() == 4,
        PieceKind::Rook => at.rank() == colour.home_rank() && (at.file() == 0 || at.file() == 7),
        _ => true,
    }
}

pub fn to_fen(game: &Game) -> String {
    let board = game.board();
    let state = game.state();

    let mut placement = String::new();
    for rank in (1..=8u8).rev() {
        let mut empty = 0;
        for at in (0..8u8).filter_map(|file| Coords::new(rank, file)) {
            match board.get(at) {
                None => empty += 1,
                Some(piece) => {
                    if empty > 0 {
                        placement.push_str(&empty.to_string());
                        empty = 0;
                    }
                    placement.push(piece.symbol());
                }
            }
        }
        if empty > 0 {
            placement.push_str(&empty.to_string());
        }
        if rank > 1 {
            placement.push('/');
        }
    }

    let side = match state.side_to_move {
        Colour::White => "w",
        Colour::Black => "b",
    };
    let en_passant = state.en_passant.map_or_else(|| "-".to_string(), |at| at.to_string());

    format!("{} {} {} {} 0 1", placement, side, state.castling_rights, en_passant)
}
