use crate::error::{ChessError, ChessResult};
use crate::fen::{parse_fen, to_fen, START_FEN};
use crate::game::Game;
use crate::notation::parse_move;
use crate::rules::RulesEngine;
use crate::search::{Search, SearchOutcome};
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

const DEFAULT_DEPTH: u32 = 3;
const MAX_DEPTH: u32 = 8;

pub struct UciHandler {
    game: Game,
    search: Search,
    depth: u32,
}

impl Default for UciHandler {
    fn default() -> Self {
        UciHandler::new()
    }
}

impl UciHandler {
    pub fn new() -> Self {
        Self::with_search(Search::new())
    }

    pub fn with_search(search: Search) -> Self {
        UciHandler {
            game: Game::new(),
            search,
            depth: DEFAULT_DEPTH,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        self.run_with(stdin.lock(), io::stdout())
    }

    /// Reads commands line by line until `quit` or end of input.
    pub fn run_with<R: BufRead, W: Write>(&mut self, mut reader: R, mut out: W) -> Result<()> {
        let mut line = String::new();

        while reader.read_line(&mut line).context("reading command")? > 0 {
            let command = line.trim();
            if command == "quit" {
                break;
            }

            let response = match self.handle_command(command) {
                Ok(response) => response,
                Err(err) => {
                    warn!(command, "command failed: {:#}", err);
                    format!("info string error: {:#}\n", err)
                }
            };
            out.write_all(response.as_bytes())?;
            out.flush()?;
            line.clear();
        }
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok("".to_string());
        }

        match parts[0] {
            "uci" => Ok(self.handle_uci()),
            "isready" => Ok("readyok\n".to_string()),
            "ucinewgame" => Ok(self.handle_ucinewgame()),
            "position" => Ok(self.handle_position(&parts[1..])),
            "go" => self.handle_go(&parts[1..]),
            "setoption" => Ok(self.handle_setoption(&parts[1..])),
            "d" => Ok(format!("{}Fen: {}\n", self.game.board(), to_fen(&self.game))),
            // Searches run to completion before the next command is read.
            "stop" | "quit" => Ok("".to_string()),
            other => {
                debug!(command = other, "ignoring unknown command");
                Ok("".to_string())
            }
        }
    }

    fn handle_uci(&self) -> String {
        format!(
            "id name fairy-penguin {}\n\
             id author the fairy-penguin authors\n\
             option name Depth type spin default {} min 1 max {}\n\
             option name Shuffle type check default true\n\
             uciok\n",
            env!("CARGO_PKG_VERSION"),
            DEFAULT_DEPTH,
            MAX_DEPTH
        )
    }

    fn handle_ucinewgame(&mut self) -> String {
        self.game = Game::new();
        "".to_string()
    }

    fn handle_position(&mut self, parts: &[&str]) -> String {
        match Self::build_position(parts) {
            Ok(game) => {
                self.game = game;
                "".to_string()
            }
            Err(err) => {
                warn!("rejected position: {}", err);
                format!("info string {}\n", err)
            }
        }
    }

    // Built on a fresh game so a bad move list leaves the current position alone.
    fn build_position(parts: &[&str]) -> ChessResult<Game> {
        let moves_at = parts.iter().position(|&part| part == "moves").unwrap_or(parts.len());
        let mut game = match parts.first() {
            Some(&"fen") => parse_fen(&parts[1..moves_at].join(" "))?,
            Some(&"startpos") | None => parse_fen(START_FEN)?,
            Some(other) => return Err(ChessError::InvalidFen(other.to_string())),
        };

        for text in parts.iter().skip(moves_at + 1) {
            let mv = parse_move(&mut game, text)?;
            game.apply_move(mv)?;
        }
        Ok(game)
    }

    fn handle_go(&mut self, parts: &[&str]) -> Result<String> {
        let mut depth = self.depth;
        let mut perft = None;

        for i in 0..parts.len() {
            match parts[i] {
                "depth" => {
                    if let Some(d) = parts.get(i + 1).and_then(|s| s.parse::<u32>().ok()) {
                        depth = d.clamp(1, MAX_DEPTH);
                    }
                }
                "perft" => {
                    perft = parts.get(i + 1).and_then(|s| s.parse::<u32>().ok());
                }
                _ => {}
            }
        }

        if let Some(perft_depth) = perft {
            let nodes = RulesEngine::new()
                .perft(&mut self.game, perft_depth)
                .context("perft failed")?;
            return Ok(format!("info string perft {} nodes {}\n", perft_depth, nodes));
        }

        self.search.set_max_depth(depth);
        let outcome = self.search.find_best_move(&mut self.game).context("search failed")?;
        let response = match outcome {
            SearchOutcome::BestMove { mv, score } => format!(
                "info depth {} score cp {} nodes {}\nbestmove {}\n",
                depth,
                score,
                self.search.get_nodes_searched(),
                mv
            ),
            SearchOutcome::Checkmate => "info string checkmate\nbestmove (none)\n".to_string(),
            SearchOutcome::Stalemate => "info string stalemate\nbestmove (none)\n".to_string(),
        };
        Ok(response)
    }

    // setoption name <id> [value <x>]
    fn handle_setoption(&mut self, parts: &[&str]) -> String {
        let value_at = parts.iter().position(|&part| part == "value").unwrap_or(parts.len());
        let name = parts.get(1..value_at).map(|words| words.join(" ")).unwrap_or_default();
        let value = parts.get(value_at + 1..).map(|words| words.join(" ")).unwrap_or_default();

        match name.to_ascii_lowercase().as_str() {
            "depth" => match value.parse::<u32>() {
                Ok(depth) if (1..=MAX_DEPTH).contains(&depth) => {
                    self.depth = depth;
                    "".to_string()
                }
                _ => format!("info string invalid Depth value '{}'\n", value),
            },
            "shuffle" => match value.as_str() {
                "true" => {
                    self.search.set_shuffle(true);
                    "".to_string()
                }
                "false" => {
                    self.search.set_shuffle(false);
                    "".to_string()
                }
                _ => format!("info string invalid Shuffle value '{}'\n", value),
            },
            _ => format!("info string unknown option '{}'\n", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn handler() -> UciHandler {
        UciHandler::with_search(Search::with_seed(11))
    }

    #[test]
    fn test_handshake() {
        let mut uci = handler();
        let response = uci.handle_command("uci").unwrap();
        assert!(response.starts_with("id name fairy-penguin"));
        assert!(response.contains("option name Depth type spin default 3"));
        assert!(response.ends_with("uciok\n"));
        assert_eq!(uci.handle_command("isready").unwrap(), "readyok\n");
        assert_eq!(uci.handle_command("").unwrap(), "");
        assert_eq!(uci.handle_command("stop").unwrap(), "");
        assert_eq!(uci.handle_command("xyzzy").unwrap(), "");
    }

    #[test]
    fn test_position_with_moves() {
        let mut uci = handler();
        uci.handle_command("position startpos moves e2e4 e7e5").unwrap();
        assert_eq!(
            to_fen(uci.game()),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 1"
        );
        assert_eq!(uci.game().history().len(), 2);

        uci.handle_command("position fen 4k3/8/8/8/8/8/8/R3K3 w Q - 0 1 moves O-O-O")
            .unwrap();
        assert_eq!(to_fen(uci.game()), "4k3/8/8/8/8/8/8/2KR4 b - - 0 1");

        uci.handle_command("ucinewgame").unwrap();
        assert_eq!(to_fen(uci.game()), START_FEN);
    }

    #[test]
    fn test_bad_position_keeps_the_previous_one() {
        let mut uci = handler();
        uci.handle_command("position startpos moves d2d4").unwrap();
        let before = uci.game().clone();

        let response = uci.handle_command("position startpos moves e2e4 e2e4").unwrap();
        assert!(response.starts_with("info string illegal move"));
        assert_eq!(uci.game(), &before);

        let response = uci.handle_command("position fen not/a/fen w - -").unwrap();
        assert!(response.starts_with("info string invalid FEN"));
        assert_eq!(uci.game(), &before);
    }

    #[test]
    fn test_go_reports_a_legal_move() {
        let mut uci = handler();
        let response = uci.handle_command("go depth 2").unwrap();
        let lines: Vec<&str> = response.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("info depth 2 score cp "));

        let best = lines[1].strip_prefix("bestmove ").unwrap();
        let legal: Vec<String> = Game::new()
            .legal_moves()
            .unwrap()
            .iter()
            .map(|mv| mv.to_string())
            .collect();
        assert!(legal.contains(&best.to_string()));
        // go never changes the position
        assert_eq!(to_fen(uci.game()), START_FEN);
    }

    #[test]
    fn test_go_finds_mate_in_one() {
        let mut uci = handler();
        uci.handle_command("position fen 6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let response = uci.handle_command("go depth 2").unwrap();
        assert!(response.contains("score cp 40000"));
        assert!(response.ends_with("bestmove a1a8\n"));
    }

    #[test]
    fn test_go_without_moves() {
        let mut uci = handler();
        uci.handle_command("position fen R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        assert_eq!(
            uci.handle_command("go").unwrap(),
            "info string checkmate\nbestmove (none)\n"
        );

        uci.handle_command("position fen 7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(
            uci.handle_command("go depth 3").unwrap(),
            "info string stalemate\nbestmove (none)\n"
        );
    }

    #[test]
    fn test_go_perft() {
        let mut uci = handler();
        assert_eq!(uci.handle_command("go perft 2").unwrap(), "info string perft 2 nodes 400\n");
    }

    #[test]
    fn test_search_needs_a_king() {
        let mut uci = handler();
        uci.handle_command("position fen 8/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert!(uci.handle_command("go depth 1").is_err());
    }

    #[test]
    fn test_setoption() {
        let mut uci = handler();
        assert_eq!(uci.handle_command("setoption name Depth value 2").unwrap(), "");
        assert_eq!(uci.depth, 2);
        assert_eq!(uci.handle_command("setoption name Shuffle value false").unwrap(), "");
        assert!(uci
            .handle_command("setoption name Depth value 0")
            .unwrap()
            .starts_with("info string invalid Depth"));
        assert!(uci
            .handle_command("setoption name Hash value 16")
            .unwrap()
            .starts_with("info string unknown option"));
        assert_eq!(uci.depth, 2);

        let response = uci.handle_command("go").unwrap();
        assert!(response.starts_with("info depth 2 "));
    }

    #[test]
    fn test_display_command() {
        let mut uci = handler();
        let response = uci.handle_command("d").unwrap();
        assert!(response.starts_with("8 r n b q k b n r\n"));
        assert!(response.ends_with(&format!("Fen: {}\n", START_FEN)));
    }

    #[test]
    fn test_run_stops_at_quit() {
        let mut uci = handler();
        let input = Cursor::new(
            "uci\nisready\nposition fen 8/8/8/8/8/8/8/4K3 b - - 0 1\ngo\nquit\nisready\n",
        );
        let mut output = Vec::new();
        uci.run_with(input, &mut output).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("uciok\n"));
        assert_eq!(output.matches("readyok").count(), 1);
        assert!(output.contains("info string error: search failed"));
    }
}
