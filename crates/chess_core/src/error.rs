use thiserror::Error;

use crate::{Color, Square};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("no piece on {0}")]
    NoPiece(Square),
    #[error("it is {0:?}'s turn")]
    WrongTurn(Color),
    #[error("{0} is not a legal move in this position")]
    Illegal(String),
}
