use chess_core::MoveError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search depth must be at least 1")]
    InvalidDepth,
    #[error("rules engine rejected a generated move: {0}")]
    Rules(#[from] MoveError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty `{0}`, expected random, aggressive, greedy or minimax")]
pub struct UnknownDifficulty(pub String);
