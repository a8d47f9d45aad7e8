pub mod ai;
pub mod error;
pub mod evaluation;
pub mod rules;
pub mod search;

pub use ai::{spawn_search, ChessAI, Difficulty};
pub use error::{SearchError, UnknownDifficulty};
pub use evaluation::{evaluate, material_balance, Score, MATE_SCORE};
pub use rules::{MoveGuard, Rules};
pub use search::{find_best_move, minimax, SearchConfig, SearchOutcome, SearchStats, Searcher, SCORE_INFINITY};
