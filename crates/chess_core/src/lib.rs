// Chess rules: board representation, move generation and game state
pub mod board;
pub mod error;
pub mod game;
pub mod moves;
pub mod piece;
pub mod square;

// Re-export main types for convenience
pub use board::{Board, CastlingRights};
pub use error::MoveError;
pub use game::Game;
pub use moves::{Move, MoveType};
pub use piece::{Color, Piece, PieceType};
pub use square::Square;
