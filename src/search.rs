use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::board::Colour;
use crate::error::ChessResult;
use crate::evaluation::Evaluator;
use crate::game::Game;
use crate::moves::Move;
use crate::rules::RulesEngine;

/// Score of a checkmate, from White's side. Dominates any material balance.
pub const MATE_SCORE: i32 = 40_000;

/// Result of a root search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    BestMove { mv: Move, score: i32 },
    /// The side to move has been mated; there is nothing to play.
    Checkmate,
    Stalemate,
}

pub struct Search {
    evaluator: Evaluator,
    rules: RulesEngine,
    max_depth: u32,
    shuffle: bool,
    rng: StdRng,
    nodes_searched: u64,
}

impl Default for Search {
    fn default() -> Self {
        Search::new()
    }
}

impl Search {
    pub fn new() -> Self {
        Self {
            evaluator: Evaluator::new(),
            rules: RulesEngine::new(),
            max_depth: 3,
            shuffle: true,
            rng: StdRng::from_entropy(),
            nodes_searched: 0,
        }
    }

    /// Same as [`Search::new`] with a reproducible root shuffle.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new()
        }
    }

    /// Picks a move for the side to move by searching `max_depth` plies.
    pub fn find_best_move(&mut self, game: &mut Game) -> ChessResult<SearchOutcome> {
        self.nodes_searched = 0;
        let side = game.side_to_move();

        let mut moves = self.rules.legal_moves(game)?;
        // Shuffle so equally scored moves don't always resolve the same way
        if self.shuffle {
            moves.shuffle(&mut self.rng);
        }

        let Some((&first, rest)) = moves.split_first() else {
            return if self.rules.is_in_check(game.board(), side)? {
                Ok(SearchOutcome::Checkmate)
            } else {
                Ok(SearchOutcome::Stalemate)
            };
        };

        let (mut best_move, mut best_score) = (first, self.score_root_move(game, first)?);
        for &mv in rest {
            let score = self.score_root_move(game, mv)?;
            let improves = match side {
                Colour::White => score > best_score,
                Colour::Black => score < best_score,
            };
            if improves {
                best_move = mv;
                best_score = score;
            }
        }

        info!(
            mv = %best_move,
            score = best_score,
            nodes = self.nodes_searched,
            depth = self.max_depth,
            "search finished"
        );
        Ok(SearchOutcome::BestMove {
            mv: best_move,
            score: best_score,
        })
    }

    // Full-window score of one root move.
    fn score_root_move(&mut self, game: &mut Game, mv: Move) -> ChessResult<i32> {
        let child_depth = self.max_depth.saturating_sub(1);
        game.apply_move(mv)?;
        let score = self.minimax(game, child_depth, -MATE_SCORE - 1, MATE_SCORE + 1);
        game.undo_last_move()?;
        let score = score?;
        debug!(%mv, score, "root move scored");
        Ok(score)
    }

    /// Minimax with alpha-beta pruning. White maximises, Black minimises.
    ///
    /// Every move is applied to `game` and undone before the next one, so the
    /// game comes back unchanged.
    pub fn minimax(
        &mut self,
        game: &mut Game,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
    ) -> ChessResult<i32> {
        self.nodes_searched += 1;
        let side = game.side_to_move();

        let moves = self.rules.legal_moves(game)?;
        if moves.is_empty() {
            if self.rules.is_in_check(game.board(), side)? {
                return Ok(match side {
                    Colour::White => -MATE_SCORE,
                    Colour::Black => MATE_SCORE,
                });
            }
            return Ok(0);
        }

        if depth == 0 {
            return Ok(self.evaluator.evaluate(game.board()));
        }

        match side {
            Colour::White => {
                let mut value = -MATE_SCORE;
                for mv in moves {
                    game.apply_move(mv)?;
                    let score = self.minimax(game, depth - 1, alpha, beta);
                    game.undo_last_move()?;
                    value = value.max(score?);

                    if value >= beta {
                        break;
                    }
                    alpha = alpha.max(value);
                }
                Ok(value)
            }
            Colour::Black => {
                let mut value = MATE_SCORE;
                for mv in moves {
                    game.apply_move(mv)?;
                    let score = self.minimax(game, depth - 1, alpha, beta);
                    game.undo_last_move()?;
                    value = value.min(score?);

                    if value <= alpha {
                        break;
                    }
                    beta = beta.min(value);
                }
                Ok(value)
            }
        }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn set_max_depth(&mut self, depth: u32) {
        self.max_depth = depth.max(1);
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
    }

    pub fn get_nodes_searched(&self) -> u64 {
        self.nodes_searched
    }
}
