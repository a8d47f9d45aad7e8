use std::fmt;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use chess_core::{Color, Game, Move};
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{SearchError, UnknownDifficulty};
use crate::evaluation::{evaluate, Score};
use crate::rules::{MoveGuard, Rules};
use crate::search::{SearchConfig, SearchOutcome, Searcher, DEFAULT_DEPTH};

const MIN_DEPTH: u8 = 1;
const MAX_DEPTH: u8 = 6; // deeper searches take seconds per move
const CHECK_BONUS: Score = 5; // half a pawn, greedy level only

/// How the computer opponent picks its move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    /// Any legal move, uniformly.
    Random,
    /// A random capture when one exists, otherwise any legal move.
    Aggressive,
    /// The move with the best static evaluation one ply ahead.
    Greedy,
    /// Full alpha-beta search at the configured depth.
    #[default]
    Minimax,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Random => "random",
            Difficulty::Aggressive => "aggressive",
            Difficulty::Greedy => "greedy",
            Difficulty::Minimax => "minimax",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(Difficulty::Random),
            "aggressive" => Ok(Difficulty::Aggressive),
            "greedy" => Ok(Difficulty::Greedy),
            "minimax" => Ok(Difficulty::Minimax),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChessAI {
    difficulty: Difficulty,
    max_depth: u8,
    stop: Option<Arc<AtomicBool>>,
    last_search: Option<SearchOutcome>,
}

impl Default for ChessAI {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

impl ChessAI {
    /// A minimax opponent searching `depth` plies, clamped to a playable range.
    pub fn new(depth: u8) -> Self {
        ChessAI {
            difficulty: Difficulty::Minimax,
            max_depth: depth.clamp(MIN_DEPTH, MAX_DEPTH),
            stop: None,
            last_search: None,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Lets another thread cut a minimax search short between root moves.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn depth(&self) -> u8 {
        self.max_depth
    }

    /// Outcome of the most recent minimax search, including whether a stop
    /// request cut it short. `None` until the minimax level has moved.
    pub fn last_search(&self) -> Option<&SearchOutcome> {
        self.last_search.as_ref()
    }

    /// Chooses a move for the side to move, or `None` when there is none.
    /// All randomness comes from `rng`; the position is returned unchanged.
    pub fn choose_move<R, G>(&mut self, rules: &mut R, rng: &mut G) -> Result<Option<Move>, SearchError>
    where
        R: Rules + ?Sized,
        G: Rng + ?Sized,
    {
        let chosen = match self.difficulty {
            Difficulty::Random => rules.legal_moves().choose(rng).copied(),
            Difficulty::Aggressive => {
                let moves = rules.legal_moves();
                let captures: Vec<Move> = moves.iter().copied().filter(Move::is_capture).collect();
                if captures.is_empty() {
                    moves.choose(rng).copied()
                } else {
                    captures.choose(rng).copied()
                }
            }
            Difficulty::Greedy => greedy_move(rules)?,
            Difficulty::Minimax => {
                let mut searcher = Searcher::new(SearchConfig::with_depth(self.max_depth));
                if let Some(stop) = &self.stop {
                    searcher = searcher.with_stop_flag(Arc::clone(stop));
                }
                let outcome = searcher.search(rules)?;
                let best = outcome.best_move;
                self.last_search = Some(outcome);
                best
            }
        };

        match chosen {
            Some(mv) => info!("{} opponent plays {}", self.difficulty, mv),
            None => info!("{} opponent has no move", self.difficulty),
        }
        Ok(chosen)
    }
}

// One-ply lookahead scored for the mover, with a small bonus for giving
// check; first move wins ties
fn greedy_move<R: Rules + ?Sized>(rules: &mut R) -> Result<Option<Move>, SearchError> {
    let mover = rules.side_to_move();
    let mut best: Option<(Move, Score)> = None;

    for mv in rules.legal_moves() {
        let score = {
            let child = MoveGuard::apply(&mut *rules, mv)?;
            let white_score = evaluate(&*child);
            let for_mover = match mover {
                Color::White => white_score,
                Color::Black => -white_score,
            };
            if child.is_check() {
                for_mover + CHECK_BONUS
            } else {
                for_mover
            }
        };
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((mv, score));
        }
    }

    Ok(best.map(|(mv, _)| mv))
}

/// Runs `ai` on a snapshot of `game` on the rayon pool.
///
/// The whole choice is one unit of work; the receiver yields exactly one
/// result. Use a stop flag on `ai` to cut a minimax search short.
pub fn spawn_search(mut game: Game, mut ai: ChessAI, seed: u64) -> Receiver<Result<Option<Move>, SearchError>> {
    let (tx, rx) = mpsc::channel();
    rayon::spawn(move || {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = ai.choose_move(&mut game, &mut rng);
        // The caller may have dropped the receiver, nothing to report then
        let _ = tx.send(result);
    });
    rx
}
