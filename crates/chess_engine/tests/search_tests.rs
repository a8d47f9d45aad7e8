use chess_core::{Board, Color, Game, Move, MoveError, Piece, PieceType, Square};
use chess_engine::{
    evaluate, find_best_move, Rules, SearchConfig, SearchError, Searcher, MATE_SCORE,
};

fn sq(name: &str) -> Square {
    Square::from_algebraic(name).unwrap()
}

fn piece(piece_type: PieceType, color: Color) -> Piece {
    Piece::new(piece_type, color)
}

/// White mates with Ra8; the black king is boxed in by its own pawns.
fn white_back_rank_mate() -> Game {
    Game::from_board(
        Board::empty(Color::White)
            .place(sq("g1"), piece(PieceType::King, Color::White))
            .place(sq("a1"), piece(PieceType::Rook, Color::White))
            .place(sq("g8"), piece(PieceType::King, Color::Black))
            .place(sq("f7"), piece(PieceType::Pawn, Color::Black))
            .place(sq("g7"), piece(PieceType::Pawn, Color::Black))
            .place(sq("h7"), piece(PieceType::Pawn, Color::Black)),
    )
}

/// Black mates with Ra1 against the same structure.
fn black_back_rank_mate() -> Game {
    Game::from_board(
        Board::empty(Color::Black)
            .place(sq("g1"), piece(PieceType::King, Color::White))
            .place(sq("f2"), piece(PieceType::Pawn, Color::White))
            .place(sq("g2"), piece(PieceType::Pawn, Color::White))
            .place(sq("h2"), piece(PieceType::Pawn, Color::White))
            .place(sq("e6"), piece(PieceType::King, Color::Black))
            .place(sq("a8"), piece(PieceType::Rook, Color::Black)),
    )
}

/// Black to move; the white queen on d4 hangs to the knight on c6.
fn hanging_queen() -> Game {
    Game::from_board(
        Board::empty(Color::Black)
            .place(sq("h1"), piece(PieceType::King, Color::White))
            .place(sq("d4"), piece(PieceType::Queen, Color::White))
            .place(sq("g2"), piece(PieceType::Pawn, Color::White))
            .place(sq("h2"), piece(PieceType::Pawn, Color::White))
            .place(sq("a8"), piece(PieceType::King, Color::Black))
            .place(sq("c6"), piece(PieceType::Knight, Color::Black))
            .place(sq("b7"), piece(PieceType::Pawn, Color::Black)),
    )
}

/// White is in check and can only take the queen, leaving bare kings.
fn forced_draw() -> Game {
    Game::from_board(
        Board::empty(Color::White)
            .place(sq("a1"), piece(PieceType::King, Color::White))
            .place(sq("b2"), piece(PieceType::Queen, Color::Black))
            .place(sq("h8"), piece(PieceType::King, Color::Black)),
    )
}

fn search(game: &mut Game, depth: u8, pruning: bool) -> chess_engine::SearchOutcome {
    Searcher::new(SearchConfig { depth, pruning })
        .search(game)
        .unwrap()
}

#[test]
fn start_position_yields_a_legal_move() {
    let mut game = Game::new();
    let mv = find_best_move(&mut game, 2).unwrap().expect("a move from the start position");
    assert!(game.legal_moves().contains(&mv));
    assert_eq!(evaluate(&game), 0);
}

#[test]
fn depth_one_score_is_the_static_evaluation_after_the_move() {
    let mut game = Game::new();
    let outcome = search(&mut game, 1, true);
    let mv = outcome.best_move.unwrap();

    let mut after = game.clone();
    after.make_move(mv).unwrap();
    assert_eq!(outcome.score, Some(evaluate(&after)));
}

#[test]
fn repeated_searches_agree() {
    for mut game in [Game::new(), hanging_queen(), white_back_rank_mate()] {
        let first = find_best_move(&mut game, 2).unwrap();
        let second = find_best_move(&mut game, 2).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn knight_takes_the_hanging_queen() {
    for depth in 1..=3 {
        let mut game = hanging_queen();
        let mv = find_best_move(&mut game, depth).unwrap().unwrap();
        assert_eq!((mv.from, mv.to), (sq("c6"), sq("d4")), "depth {depth}");
        assert!(mv.is_capture());
    }
}

#[test]
fn mate_in_one_is_preferred_at_every_depth() {
    for depth in 1..=2 {
        let mut game = white_back_rank_mate();
        let outcome = search(&mut game, depth, true);
        let mv = outcome.best_move.unwrap();
        assert_eq!((mv.from, mv.to), (sq("a1"), sq("a8")), "depth {depth}");
        assert_eq!(outcome.score, Some(MATE_SCORE));

        let mut game = black_back_rank_mate();
        let outcome = search(&mut game, depth, true);
        let mv = outcome.best_move.unwrap();
        assert_eq!((mv.from, mv.to), (sq("a8"), sq("a1")), "depth {depth}");
        assert_eq!(outcome.score, Some(-MATE_SCORE));
    }

    let mut game = white_back_rank_mate();
    let outcome = search(&mut game, 3, true);
    assert!(outcome.score.unwrap() >= MATE_SCORE);
}

#[test]
fn forced_draw_scores_zero() {
    for depth in 1..=3 {
        let mut game = forced_draw();
        let outcome = search(&mut game, depth, true);
        let mv = outcome.best_move.unwrap();
        assert_eq!((mv.from, mv.to), (sq("a1"), sq("b2")));
        assert_eq!(outcome.score, Some(0));
    }
}

#[test]
fn no_legal_moves_returns_none() {
    let mut mated = Game::new();
    for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
        mated.make_move(Move::new(sq(from), sq(to))).unwrap();
    }
    assert_eq!(find_best_move(&mut mated, 3), Ok(None));
    assert_eq!(mated.history_len(), 4);
}

#[test]
fn fifty_move_draw_returns_none_with_moves_left() {
    let mut game = Game::from_board(
        Board::empty(Color::White)
            .place(sq("e1"), piece(PieceType::King, Color::White))
            .place(sq("a1"), piece(PieceType::Rook, Color::White))
            .place(sq("e8"), piece(PieceType::King, Color::Black))
            .with_halfmove_clock(100),
    );
    assert!(!game.legal_moves().is_empty());
    assert!(game.is_draw());
    assert_eq!(find_best_move(&mut game, 2), Ok(None));

    // One half-move short of the rule, the rook is still searched
    let mut game = Game::from_board(game.board().with_halfmove_clock(99));
    assert!(find_best_move(&mut game, 2).unwrap().is_some());
}

#[test]
fn threefold_repetition_returns_none_with_moves_left() {
    let mut game = Game::new();
    for _ in 0..2 {
        for (from, to) in [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")] {
            game.make_move(Move::new(sq(from), sq(to))).unwrap();
        }
    }
    assert!(game.is_threefold_repetition());
    assert_eq!(game.legal_moves().len(), 20);
    assert_eq!(find_best_move(&mut game, 3), Ok(None));
    assert_eq!(game.history_len(), 8);
}

#[test]
fn insufficient_material_returns_none_with_moves_left() {
    let mut game = Game::from_board(
        Board::empty(Color::White)
            .place(sq("e1"), piece(PieceType::King, Color::White))
            .place(sq("c3"), piece(PieceType::Knight, Color::White))
            .place(sq("e8"), piece(PieceType::King, Color::Black)),
    );
    assert!(!game.legal_moves().is_empty());
    assert_eq!(find_best_move(&mut game, 2), Ok(None));
}

#[test]
fn searching_leaves_the_position_untouched() {
    for depth in 1..=3 {
        for mut game in [Game::new(), hanging_queen(), white_back_rank_mate(), forced_draw()] {
            let before = game.clone();
            find_best_move(&mut game, depth).unwrap();
            assert_eq!(game, before);
        }
    }
}

#[test]
fn pruning_never_changes_the_choice() {
    for depth in 1..=3 {
        for mut game in [Game::new(), hanging_queen(), white_back_rank_mate(), black_back_rank_mate()] {
            let pruned = search(&mut game, depth, true);
            let full = search(&mut game, depth, false);
            assert_eq!(pruned.best_move, full.best_move, "depth {depth}");
            assert_eq!(pruned.score, full.score, "depth {depth}");
            assert!(pruned.stats.nodes <= full.stats.nodes);
        }
    }
}

/// Wraps a game, tracking how many moves are applied but not yet undone,
/// and optionally rejecting the n-th application.
struct Tracked {
    game: Game,
    outstanding: usize,
    deepest: usize,
    applies: usize,
    fail_on: Option<usize>,
}

impl Tracked {
    fn new(game: Game) -> Self {
        Self {
            game,
            outstanding: 0,
            deepest: 0,
            applies: 0,
            fail_on: None,
        }
    }
}

impl Rules for Tracked {
    fn legal_moves(&self) -> Vec<Move> {
        self.game.legal_moves()
    }

    fn apply_move(&mut self, mv: Move) -> Result<(), MoveError> {
        self.applies += 1;
        if self.fail_on == Some(self.applies) {
            return Err(MoveError::Illegal(mv.to_string()));
        }
        self.game.make_move(mv)?;
        self.outstanding += 1;
        self.deepest = self.deepest.max(self.outstanding);
        Ok(())
    }

    fn undo_move(&mut self) -> Option<Move> {
        let mv = self.game.undo_move()?;
        self.outstanding -= 1;
        Some(mv)
    }

    fn is_game_over(&self) -> bool {
        self.game.is_game_over()
    }

    fn is_check(&self) -> bool {
        self.game.is_check()
    }

    fn is_checkmate(&self) -> bool {
        self.game.is_checkmate()
    }

    fn is_draw(&self) -> bool {
        self.game.is_draw()
    }

    fn side_to_move(&self) -> Color {
        self.game.side_to_move()
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.game.piece_at(square)
    }
}

#[test]
fn applied_moves_never_exceed_the_depth() {
    for depth in 1..=3 {
        let mut tracked = Tracked::new(Game::new());
        find_best_move(&mut tracked, depth).unwrap();
        assert_eq!(tracked.deepest, depth as usize);
        assert_eq!(tracked.outstanding, 0);
        assert_eq!(tracked.game, Game::new());
    }
}

#[test]
fn rules_failure_unwinds_every_applied_move() {
    let mut tracked = Tracked::new(Game::new());
    // Fails deep inside the tree, three plies down
    tracked.fail_on = Some(3);

    let result = find_best_move(&mut tracked, 3);
    assert!(matches!(result, Err(SearchError::Rules(MoveError::Illegal(_)))));
    assert_eq!(tracked.outstanding, 0);
    assert_eq!(tracked.game, Game::new());
}

#[test]
fn search_works_through_a_trait_object() {
    let mut game = hanging_queen();
    let rules: &mut dyn Rules = &mut game;
    let mv = find_best_move(rules, 1).unwrap().unwrap();
    assert_eq!(mv.to, sq("d4"));
}
