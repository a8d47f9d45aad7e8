// Fixed-depth minimax with alpha-beta pruning over a borrowed position
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chess_core::{Color, Move};
use log::{debug, warn};

use crate::error::SearchError;
use crate::evaluation::{evaluate, Score, MATE_SCORE};
use crate::rules::{MoveGuard, Rules};

/// Depth used when nothing else is configured. Three plies answers in well
/// under a second from typical middlegame positions.
pub const DEFAULT_DEPTH: u8 = 3;

/// Bound for the alpha-beta window. Strictly beyond any mate score so a
/// mated line still replaces the initial running best.
pub const SCORE_INFINITY: Score = MATE_SCORE * 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Plies searched below the root. Must be at least 1.
    pub depth: u8,
    /// Cut off branches once `beta <= alpha`. Disabling it gives plain
    /// minimax with the same answer and a larger node count.
    pub pruning: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            pruning: true,
        }
    }
}

impl SearchConfig {
    pub fn with_depth(depth: u8) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub leaves: u64,
    pub cutoffs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// `None` when the root game is already over: checkmate, stalemate, or a
    /// draw the rules report (fifty-move, repetition, insufficient material)
    /// even if legal moves remain.
    pub best_move: Option<Move>,
    /// Score of `best_move`'s subtree, White-positive.
    pub score: Option<Score>,
    pub stats: SearchStats,
    /// False if a stop request ended the search before every root move was scored.
    pub completed: bool,
}

impl SearchOutcome {
    fn no_move() -> Self {
        Self {
            best_move: None,
            score: None,
            stats: SearchStats::default(),
            completed: true,
        }
    }
}

pub struct Searcher {
    config: SearchConfig,
    stop: Option<Arc<AtomicBool>>,
    stats: SearchStats,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            stop: None,
            stats: SearchStats::default(),
        }
    }

    /// Shares a flag that, once set, ends the search before the next root move.
    /// The root move in progress is always finished.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Picks the move whose subtree scores best for the side to move.
    ///
    /// The position is borrowed for the whole call and handed back exactly as
    /// it came in. Ties go to the move enumerated first.
    pub fn search<R: Rules + ?Sized>(&mut self, rules: &mut R) -> Result<SearchOutcome, SearchError> {
        if self.config.depth == 0 {
            return Err(SearchError::InvalidDepth);
        }
        self.stats = SearchStats::default();

        if rules.is_game_over() {
            debug!("root position is already decided, nothing to search");
            return Ok(SearchOutcome::no_move());
        }

        // White maximizes, Black minimizes
        let maximizing = rules.side_to_move() == Color::White;
        let mut best: Option<(Move, Score)> = None;
        let mut completed = true;

        for mv in rules.legal_moves() {
            // Stop is only honoured once a move has been scored
            if best.is_some() && self.stop_requested() {
                warn!("search stopped early at depth {}", self.config.depth);
                completed = false;
                break;
            }

            // Each root move gets the full window
            let score = {
                let mut child = MoveGuard::apply(&mut *rules, mv)?;
                let child_maximizing = child.side_to_move() == Color::White;
                self.minimax(
                    &mut *child,
                    self.config.depth - 1,
                    -SCORE_INFINITY,
                    SCORE_INFINITY,
                    child_maximizing,
                )?
            };
            debug!("root move {} scored {}", mv, score);

            // Strict comparison, so the first of equal moves is kept
            let improves = match best {
                None => true,
                Some((_, best_score)) if maximizing => score > best_score,
                Some((_, best_score)) => score < best_score,
            };
            if improves {
                best = Some((mv, score));
            }
        }

        debug!(
            "depth {} search visited {} nodes ({} leaves, {} cutoffs)",
            self.config.depth, self.stats.nodes, self.stats.leaves, self.stats.cutoffs
        );

        Ok(SearchOutcome {
            best_move: best.map(|(mv, _)| mv),
            score: best.map(|(_, score)| score),
            stats: self.stats,
            completed,
        })
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|stop| stop.load(Ordering::SeqCst))
    }

    fn minimax<R: Rules + ?Sized>(
        &mut self,
        rules: &mut R,
        depth: u8,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
    ) -> Result<Score, SearchError> {
        self.stats.nodes += 1;

        // Horizon or terminal position
        if depth == 0 || rules.is_game_over() {
            self.stats.leaves += 1;
            return Ok(evaluate(rules));
        }

        let moves = rules.legal_moves();

        if maximizing {
            let mut best = -SCORE_INFINITY;
            for mv in moves {
                let score = {
                    let mut child = MoveGuard::apply(&mut *rules, mv)?;
                    self.minimax(&mut *child, depth - 1, alpha, beta, false)?
                };
                best = best.max(score);
                alpha = alpha.max(score);
                // The minimizing parent will never allow this line
                if self.config.pruning && beta <= alpha {
                    self.stats.cutoffs += 1;
                    break;
                }
            }
            Ok(best)
        } else {
            let mut best = SCORE_INFINITY;
            for mv in moves {
                let score = {
                    let mut child = MoveGuard::apply(&mut *rules, mv)?;
                    self.minimax(&mut *child, depth - 1, alpha, beta, true)?
                };
                best = best.min(score);
                beta = beta.min(score);
                // The maximizing parent will never allow this line
                if self.config.pruning && beta <= alpha {
                    self.stats.cutoffs += 1;
                    break;
                }
            }
            Ok(best)
        }
    }
}

/// Best move for the side to move at `depth` plies.
///
/// `Ok(None)` when the rules already report the game over, whether or not
/// legal moves remain (a drawn root is not searched). Depth 0 is rejected.
pub fn find_best_move<R: Rules + ?Sized>(rules: &mut R, depth: u8) -> Result<Option<Move>, SearchError> {
    let outcome = Searcher::new(SearchConfig::with_depth(depth)).search(rules)?;
    Ok(outcome.best_move)
}

/// Alpha-beta minimax score of the position, White-positive.
/// At depth 0 or in a finished game this is exactly `evaluate`.
pub fn minimax<R: Rules + ?Sized>(
    rules: &mut R,
    depth: u8,
    alpha: Score,
    beta: Score,
    maximizing: bool,
) -> Result<Score, SearchError> {
    Searcher::new(SearchConfig::with_depth(depth)).minimax(rules, depth, alpha, beta, maximizing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{Board, Game, Piece, PieceType, Square};

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn zero_depth_is_rejected() {
        let mut game = Game::new();
        assert_eq!(find_best_move(&mut game, 0), Err(SearchError::InvalidDepth));
    }

    #[test]
    fn minimax_at_depth_zero_is_static_evaluation() {
        let mut game = Game::new();
        game.make_move(chess_core::Move::new(sq("e2"), sq("e4"))).unwrap();
        let expected = evaluate(&game);
        assert_eq!(minimax(&mut game, 0, -SCORE_INFINITY, SCORE_INFINITY, false), Ok(expected));
        assert_eq!(minimax(&mut game, 0, 0, 0, true), Ok(expected));
    }

    #[test]
    fn finished_game_has_no_move() {
        let mut stalemate = Game::from_board(
            Board::empty(Color::Black)
                .place(sq("a8"), Piece::new(PieceType::King, Color::Black))
                .place(sq("b6"), Piece::new(PieceType::King, Color::White))
                .place(sq("c7"), Piece::new(PieceType::Queen, Color::White)),
        );
        let outcome = Searcher::new(SearchConfig::with_depth(2)).search(&mut stalemate).unwrap();
        assert_eq!(outcome.best_move, None);
        assert_eq!(outcome.score, None);
        assert!(outcome.completed);
    }

    #[test]
    fn pruning_visits_fewer_nodes() {
        let mut game = Game::new();
        let pruned = Searcher::new(SearchConfig { depth: 3, pruning: true })
            .search(&mut game)
            .unwrap();
        let full = Searcher::new(SearchConfig { depth: 3, pruning: false })
            .search(&mut game)
            .unwrap();

        assert_eq!(pruned.best_move, full.best_move);
        assert_eq!(pruned.score, full.score);
        assert!(pruned.stats.nodes < full.stats.nodes);
        assert!(pruned.stats.cutoffs > 0);
        assert_eq!(full.stats.cutoffs, 0);
    }

    #[test]
    fn stop_flag_keeps_first_root_move() {
        let mut game = Game::new();
        let stop = Arc::new(AtomicBool::new(true));
        let outcome = Searcher::new(SearchConfig::with_depth(2))
            .with_stop_flag(stop)
            .search(&mut game)
            .unwrap();

        assert!(!outcome.completed);
        assert_eq!(outcome.best_move, game.legal_moves().first().copied());
        assert_eq!(game.history_len(), 0);
    }
}
