use std::ops::{Deref, DerefMut};

use chess_core::{Color, Game, Move, MoveError, Piece, Square};

/// The rules capability the evaluator and search consume.
///
/// Implementors own the position; the engine only ever borrows it mutably for
/// the length of one search and hands it back unchanged.
pub trait Rules {
    /// All legal moves for the side to move.
    fn legal_moves(&self) -> Vec<Move>;

    fn apply_move(&mut self, mv: Move) -> Result<(), MoveError>;

    /// Reverts the most recent `apply_move`. `None` if there is nothing to revert.
    fn undo_move(&mut self) -> Option<Move>;

    fn is_game_over(&self) -> bool;
    /// The side to move is in check.
    fn is_check(&self) -> bool;
    fn is_checkmate(&self) -> bool;
    fn is_draw(&self) -> bool;
    fn side_to_move(&self) -> Color;
    fn piece_at(&self, square: Square) -> Option<Piece>;
}

impl Rules for Game {
    fn legal_moves(&self) -> Vec<Move> {
        Game::legal_moves(self)
    }

    fn apply_move(&mut self, mv: Move) -> Result<(), MoveError> {
        self.make_move(mv)
    }

    fn undo_move(&mut self) -> Option<Move> {
        Game::undo_move(self)
    }

    fn is_game_over(&self) -> bool {
        Game::is_game_over(self)
    }

    fn is_check(&self) -> bool {
        Game::is_check(self)
    }

    fn is_checkmate(&self) -> bool {
        Game::is_checkmate(self)
    }

    fn is_draw(&self) -> bool {
        Game::is_draw(self)
    }

    fn side_to_move(&self) -> Color {
        Game::side_to_move(self)
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        Game::piece_at(self, square)
    }
}

/// A move applied to a borrowed position for as long as the guard lives.
///
/// Dropping the guard undoes the move, so pruning `break`s and `?` exits
/// still leave the position as it was found.
pub struct MoveGuard<'a, R: Rules + ?Sized> {
    rules: &'a mut R,
    mv: Move,
}

impl<'a, R: Rules + ?Sized> MoveGuard<'a, R> {
    pub fn apply(rules: &'a mut R, mv: Move) -> Result<Self, MoveError> {
        rules.apply_move(mv)?;
        Ok(Self { rules, mv })
    }
}

impl<R: Rules + ?Sized> Deref for MoveGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.rules
    }
}

impl<R: Rules + ?Sized> DerefMut for MoveGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.rules
    }
}

impl<R: Rules + ?Sized> Drop for MoveGuard<'_, R> {
    fn drop(&mut self) {
        let undone = self.rules.undo_move();
        // A missing undo entry means the handle and the search have desynced
        assert!(undone.is_some(), "no applied move left to undo for {}", self.mv);
    }
}
