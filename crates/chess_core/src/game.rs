use log::debug;

use crate::{Board, Color, Move, MoveError, Piece, Square};

const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// A game in progress: the current board plus everything needed to take moves back.
///
/// Every `make_move` pushes exactly one undo entry and every `undo_move` pops
/// exactly one, so the handle can be walked down a search tree and restored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    history: Vec<(Board, Move)>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::from_board(Board::new())
    }

    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            history: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.board.current_turn()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.piece_at(square)
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.board.legal_moves()
    }

    /// Number of moves that can currently be taken back.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Moves played so far, oldest first, as the generator produced them.
    pub fn moves_played(&self) -> impl Iterator<Item = Move> + '_ {
        self.history.iter().map(|(_, mv)| *mv)
    }

    /// Plays `chess_move` if it is legal here. The generator flags on the
    /// argument are ignored; the move is matched by squares and promotion.
    pub fn make_move(&mut self, chess_move: Move) -> Result<(), MoveError> {
        let piece = self
            .board
            .piece_at(chess_move.from)
            .ok_or(MoveError::NoPiece(chess_move.from))?;

        if piece.color != self.board.current_turn() {
            return Err(MoveError::WrongTurn(self.board.current_turn()));
        }

        let legal = self
            .board
            .legal_moves()
            .into_iter()
            .find(|m| m.matches(chess_move.from, chess_move.to, chess_move.promotion))
            .ok_or_else(|| {
                debug!("rejected {} on move {}", chess_move, self.board.fullmove_number());
                MoveError::Illegal(chess_move.to_string())
            })?;

        self.history.push((self.board, legal));
        self.board.apply(legal);
        Ok(())
    }

    /// Takes back the most recent move, returning it. `None` if nothing was played.
    pub fn undo_move(&mut self) -> Option<Move> {
        let (previous, mv) = self.history.pop()?;
        self.board = previous;
        Some(mv)
    }

    pub fn is_check(&self) -> bool {
        self.board.is_in_check(self.board.current_turn())
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_check() && !self.board.has_legal_move()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && !self.board.has_legal_move()
    }

    pub fn is_insufficient_material(&self) -> bool {
        self.board.has_insufficient_material()
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.board.halfmove_clock() >= FIFTY_MOVE_HALFMOVES
    }

    /// The current position has occurred at least twice before.
    pub fn is_threefold_repetition(&self) -> bool {
        // Positions before an irreversible move can never recur
        let reversible = self.board.halfmove_clock() as usize;
        let earlier = self
            .history
            .iter()
            .rev()
            .take(reversible)
            .filter(|(board, _)| board.same_position(&self.board))
            .count();
        earlier >= 2
    }

    pub fn is_draw(&self) -> bool {
        self.is_fifty_move_draw()
            || self.is_insufficient_material()
            || self.is_threefold_repetition()
            || self.is_stalemate()
    }

    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PieceType;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn play(game: &mut Game, from: &str, to: &str) {
        game.make_move(Move::new(sq(from), sq(to))).unwrap();
    }

    #[test]
    fn make_and_undo_restore_the_board() {
        let mut game = Game::new();
        let start = game.clone();
        play(&mut game, "e2", "e4");
        play(&mut game, "d7", "d5");
        play(&mut game, "e4", "d5");
        assert_eq!(game.history_len(), 3);

        let last = game.undo_move().unwrap();
        assert!(last.is_capture());
        game.undo_move();
        game.undo_move();
        assert_eq!(game, start);
        assert_eq!(game.undo_move(), None);
    }

    #[test]
    fn moves_played_keep_generator_flags() {
        let mut game = Game::new();
        play(&mut game, "e2", "e4");
        play(&mut game, "d7", "d5");
        play(&mut game, "e4", "d5");

        let played: Vec<Move> = game.moves_played().collect();
        assert_eq!(
            played,
            vec![
                Move::double_push(sq("e2"), sq("e4")),
                Move::double_push(sq("d7"), sq("d5")),
                Move::capture(sq("e4"), sq("d5")),
            ]
        );
        game.undo_move();
        assert_eq!(game.moves_played().count(), 2);
    }

    #[test]
    fn illegal_moves_are_rejected() {
        let mut game = Game::new();
        assert_eq!(
            game.make_move(Move::new(sq("e4"), sq("e5"))),
            Err(MoveError::NoPiece(sq("e4")))
        );
        assert_eq!(
            game.make_move(Move::new(sq("e7"), sq("e5"))),
            Err(MoveError::WrongTurn(Color::White))
        );
        assert!(matches!(
            game.make_move(Move::new(sq("e2"), sq("e5"))),
            Err(MoveError::Illegal(_))
        ));
        assert_eq!(game.history_len(), 0);
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut game = Game::new();
        play(&mut game, "f2", "f3");
        play(&mut game, "e7", "e5");
        play(&mut game, "g2", "g4");
        play(&mut game, "d8", "h4");
        assert!(game.is_checkmate());
        assert!(game.is_game_over());
        assert!(!game.is_draw());
        assert!(game.legal_moves().is_empty());
    }

    #[test]
    fn stalemate_is_a_draw() {
        let game = Game::from_board(
            Board::empty(Color::Black)
                .place(sq("a8"), Piece::new(PieceType::King, Color::Black))
                .place(sq("b6"), Piece::new(PieceType::King, Color::White))
                .place(sq("c7"), Piece::new(PieceType::Queen, Color::White)),
        );
        assert!(game.is_stalemate());
        assert!(game.is_draw());
        assert!(!game.is_checkmate());
    }

    #[test]
    fn knight_shuffle_repeats_three_times() {
        let mut game = Game::new();
        for _ in 0..2 {
            play(&mut game, "g1", "f3");
            play(&mut game, "g8", "f6");
            play(&mut game, "f3", "g1");
            play(&mut game, "f6", "g8");
        }
        assert!(game.is_threefold_repetition());
        assert!(game.is_draw());

        game.undo_move();
        assert!(!game.is_threefold_repetition());
    }

    #[test]
    fn fifty_move_rule() {
        let board = Board::empty(Color::White)
            .place(sq("e1"), Piece::new(PieceType::King, Color::White))
            .place(sq("a1"), Piece::new(PieceType::Rook, Color::White))
            .place(sq("e8"), Piece::new(PieceType::King, Color::Black))
            .with_halfmove_clock(99);
        let mut game = Game::from_board(board);
        assert!(!game.is_draw());
        play(&mut game, "a1", "a2");
        assert!(game.is_fifty_move_draw());
        assert!(game.is_game_over());
    }
}
