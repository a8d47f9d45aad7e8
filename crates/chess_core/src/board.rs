use once_cell::sync::Lazy;

use crate::{Color, Move, MoveType, Piece, PieceType, Square};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2), (2, 1), (2, -1), (1, -2),
    (-1, -2), (-2, -1), (-2, 1), (-1, 2),
];
const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1), (1, 1), (1, 0), (1, -1),
    (0, -1), (-1, -1), (-1, 0), (-1, 1),
];
const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)]; // bishop, queen
const STRAIGHTS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)]; // rook, queen

// Jump targets per square, indexed by Square::index
static KNIGHT_TARGETS: Lazy<Vec<Vec<Square>>> = Lazy::new(|| jump_table(&KNIGHT_OFFSETS));
static KING_TARGETS: Lazy<Vec<Vec<Square>>> = Lazy::new(|| jump_table(&KING_OFFSETS));

fn jump_table(offsets: &[(i8, i8)]) -> Vec<Vec<Square>> {
    Square::all()
        .map(|from| {
            offsets
                .iter()
                .filter_map(|&(df, dr)| from.offset(df, dr))
                .collect()
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }
}

impl CastlingRights {
    pub fn none() -> Self {
        Self {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    fn revoke(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    // A rook leaving or being captured on its home corner loses that side's right.
    fn revoke_corner(&mut self, square: Square) {
        match (square.file, square.rank) {
            (1, 1) => self.white_queenside = false,
            (8, 1) => self.white_kingside = false,
            (1, 8) => self.black_queenside = false,
            (8, 8) => self.black_kingside = false,
            _ => {}
        }
    }
}

/// Full board state. `Copy`, so trying a move on a scratch board is cheap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [Option<Piece>; 64],
    current_turn: Color,
    castling_rights: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        let mut board = Self::empty(Color::White);
        board.castling_rights = CastlingRights::default();
        board.setup_initial_position();
        board
    }

    /// A board with no pieces and no castling rights, `side` to move.
    pub fn empty(side: Color) -> Self {
        Self {
            squares: [None; 64],
            current_turn: side,
            castling_rights: CastlingRights::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    fn setup_initial_position(&mut self) {
        let piece_order = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        for (file, &piece_type) in (1..=8).zip(piece_order.iter()) {
            self.set(Square { file, rank: 1 }, Some(Piece::new(piece_type, Color::White)));
            self.set(Square { file, rank: 2 }, Some(Piece::new(PieceType::Pawn, Color::White)));
            self.set(Square { file, rank: 7 }, Some(Piece::new(PieceType::Pawn, Color::Black)));
            self.set(Square { file, rank: 8 }, Some(Piece::new(piece_type, Color::Black)));
        }
    }

    /// Builder-style placement used to set up arbitrary positions.
    pub fn place(mut self, square: Square, piece: Piece) -> Self {
        self.set(square, Some(piece));
        self
    }

    pub fn with_castling_rights(mut self, rights: CastlingRights) -> Self {
        self.castling_rights = rights;
        self
    }

    pub fn with_en_passant(mut self, target: Option<Square>) -> Self {
        self.en_passant = target;
        self
    }

    pub fn with_halfmove_clock(mut self, clock: u32) -> Self {
        self.halfmove_clock = clock;
        self
    }

    fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.index()] = piece;
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    pub fn current_turn(&self) -> Color {
        self.current_turn
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Every occupied square, a1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.piece_type == PieceType::King && p.color == color)
            .map(|(sq, _)| sq)
    }

    /// Same placement, side to move, castling rights and en passant target.
    /// Move clocks are ignored, as repetition detection requires.
    pub fn same_position(&self, other: &Board) -> bool {
        self.squares == other.squares
            && self.current_turn == other.current_turn
            && self.castling_rights == other.castling_rights
            && self.en_passant == other.en_passant
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        // A side without a king (test setups) can never be in check
        match self.king_square(color) {
            Some(king) => self.is_square_attacked(king, color.opposite()),
            None => false,
        }
    }

    pub fn is_square_attacked(&self, square: Square, by: Color) -> bool {
        // Pawns attack diagonally forward, so look one rank "behind" the square
        let pawn_rank = -by.forward();
        for df in [-1, 1] {
            if let Some(from) = square.offset(df, pawn_rank) {
                if self.piece_at(from) == Some(Piece::new(PieceType::Pawn, by)) {
                    return true;
                }
            }
        }

        let knight = Some(Piece::new(PieceType::Knight, by));
        if KNIGHT_TARGETS[square.index()].iter().any(|&from| self.piece_at(from) == knight) {
            return true;
        }

        let king = Some(Piece::new(PieceType::King, by));
        if KING_TARGETS[square.index()].iter().any(|&from| self.piece_at(from) == king) {
            return true;
        }

        self.slider_attacks(square, by, &DIAGONALS, PieceType::Bishop)
            || self.slider_attacks(square, by, &STRAIGHTS, PieceType::Rook)
    }

    fn slider_attacks(&self, square: Square, by: Color, directions: &[(i8, i8)], slider: PieceType) -> bool {
        for &(df, dr) in directions {
            let mut current = square.offset(df, dr);
            while let Some(sq) = current {
                if let Some(piece) = self.piece_at(sq) {
                    if piece.color == by && (piece.piece_type == slider || piece.piece_type == PieceType::Queen) {
                        return true;
                    }
                    break;
                }
                current = sq.offset(df, dr);
            }
        }
        false
    }

    /// Moves that follow piece movement rules but may leave the mover's king in check.
    pub fn pseudo_legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(48);
        let us = self.current_turn;

        for (from, piece) in self.pieces().filter(|(_, p)| p.color == us) {
            match piece.piece_type {
                PieceType::Pawn => self.pawn_moves(from, us, &mut moves),
                PieceType::Knight => self.jump_moves(from, us, &KNIGHT_TARGETS[from.index()], &mut moves),
                PieceType::Bishop => self.slide_moves(from, us, &DIAGONALS, &mut moves),
                PieceType::Rook => self.slide_moves(from, us, &STRAIGHTS, &mut moves),
                PieceType::Queen => {
                    self.slide_moves(from, us, &DIAGONALS, &mut moves);
                    self.slide_moves(from, us, &STRAIGHTS, &mut moves);
                }
                PieceType::King => {
                    self.jump_moves(from, us, &KING_TARGETS[from.index()], &mut moves);
                    self.castling_moves(from, us, &mut moves);
                }
            }
        }

        moves
    }

    /// Fully legal moves for the side to move, in generation order.
    pub fn legal_moves(&self) -> Vec<Move> {
        let us = self.current_turn;
        self.pseudo_legal_moves()
            .into_iter()
            .filter(|&mv| {
                // Play it on a copy and reject it if our king is left attacked
                let mut scratch = *self;
                scratch.apply(mv);
                !scratch.is_in_check(us)
            })
            .collect()
    }

    /// Cheaper than `legal_moves().is_empty()`: stops at the first legal move.
    pub fn has_legal_move(&self) -> bool {
        let us = self.current_turn;
        self.pseudo_legal_moves().into_iter().any(|mv| {
            let mut scratch = *self;
            scratch.apply(mv);
            !scratch.is_in_check(us)
        })
    }

    fn pawn_moves(&self, from: Square, us: Color, moves: &mut Vec<Move>) {
        let dir = us.forward();
        let promotion_rank = us.opposite().back_rank();
        let start_rank = if us == Color::White { 2 } else { 7 };

        let push = |moves: &mut Vec<Move>, to: Square, capture: bool| {
            if to.rank == promotion_rank {
                for promotion in PieceType::PROMOTIONS {
                    moves.push(Move::with_promotion(from, to, promotion, capture));
                }
            } else if capture {
                moves.push(Move::capture(from, to));
            } else {
                moves.push(Move::new(from, to));
            }
        };

        // Pushes: one square, or two from the start rank through an empty square
        if let Some(one) = from.offset(0, dir) {
            if self.piece_at(one).is_none() {
                push(moves, one, false);
                if from.rank == start_rank {
                    if let Some(two) = from.offset(0, 2 * dir) {
                        if self.piece_at(two).is_none() {
                            moves.push(Move::double_push(from, two));
                        }
                    }
                }
            }
        }

        // Diagonal captures, en passant onto the empty target square
        for df in [-1, 1] {
            let Some(to) = from.offset(df, dir) else { continue };
            match self.piece_at(to) {
                Some(target) if target.color != us => push(moves, to, true),
                None if self.en_passant == Some(to) => moves.push(Move::en_passant(from, to)),
                _ => {}
            }
        }
    }

    fn jump_moves(&self, from: Square, us: Color, targets: &[Square], moves: &mut Vec<Move>) {
        for &to in targets {
            match self.piece_at(to) {
                None => moves.push(Move::new(from, to)),
                Some(target) if target.color != us => moves.push(Move::capture(from, to)),
                _ => {}
            }
        }
    }

    fn slide_moves(&self, from: Square, us: Color, directions: &[(i8, i8)], moves: &mut Vec<Move>) {
        for &(df, dr) in directions {
            let mut current = from.offset(df, dr);
            while let Some(to) = current {
                match self.piece_at(to) {
                    None => moves.push(Move::new(from, to)),
                    Some(target) => {
                        if target.color != us {
                            moves.push(Move::capture(from, to));
                        }
                        break;
                    }
                }
                current = to.offset(df, dr);
            }
        }
    }

    fn castling_moves(&self, from: Square, us: Color, moves: &mut Vec<Move>) {
        let rank = us.back_rank();
        // No castling out of check or from off the home square
        if from != (Square { file: 5, rank }) || self.is_square_attacked(from, us.opposite()) {
            return;
        }

        let rook = Some(Piece::new(PieceType::Rook, us));
        let is_empty = |files: &[u8]| files.iter().all(|&file| self.piece_at(Square { file, rank }).is_none());
        let is_safe = |files: &[u8]| {
            files
                .iter()
                .all(|&file| !self.is_square_attacked(Square { file, rank }, us.opposite()))
        };

        // f and g must be empty and unattacked
        if self.castling_rights.kingside(us)
            && self.piece_at(Square { file: 8, rank }) == rook
            && is_empty(&[6, 7])
            && is_safe(&[6, 7])
        {
            moves.push(Move::castle(from, Square { file: 7, rank }));
        }

        // b, c and d must be empty; only c and d need to be safe
        if self.castling_rights.queenside(us)
            && self.piece_at(Square { file: 1, rank }) == rook
            && is_empty(&[2, 3, 4])
            && is_safe(&[3, 4])
        {
            moves.push(Move::castle(from, Square { file: 3, rank }));
        }
    }

    /// Applies a generated move without checking legality.
    /// Callers must only pass moves produced for this exact board.
    pub fn apply(&mut self, mv: Move) {
        let Some(piece) = self.piece_at(mv.from) else {
            return;
        };
        let us = piece.color;
        let captured = self.piece_at(mv.to);

        self.set(mv.from, None);

        match mv.move_type {
            MoveType::EnPassant => {
                // The captured pawn sits beside the mover, on the origin rank
                self.set(Square { file: mv.to.file, rank: mv.from.rank }, None);
            }
            MoveType::Castle => {
                let rank = mv.from.rank;
                let (rook_from, rook_to) = if mv.to.file == 7 { (8, 6) } else { (1, 4) };
                let rook = self.piece_at(Square { file: rook_from, rank });
                self.set(Square { file: rook_from, rank }, None);
                self.set(Square { file: rook_to, rank }, rook);
            }
            MoveType::Normal | MoveType::DoublePawnPush => {}
        }

        let placed = match mv.promotion {
            Some(promotion) => Piece::new(promotion, us),
            None => piece,
        };
        self.set(mv.to, Some(placed));

        // Castling rights
        if piece.piece_type == PieceType::King {
            self.castling_rights.revoke(us);
        }
        self.castling_rights.revoke_corner(mv.from);
        self.castling_rights.revoke_corner(mv.to);

        // Only a double push leaves an en passant target, the skipped square
        self.en_passant = match mv.move_type {
            MoveType::DoublePawnPush => mv.from.offset(0, us.forward()),
            _ => None,
        };

        // Fifty-move clock resets on any pawn move or capture
        if piece.piece_type == PieceType::Pawn || captured.is_some() || mv.move_type == MoveType::EnPassant {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.current_turn = us.opposite();
    }

    /// Neither side can ever deliver mate: bare kings, a single minor piece,
    /// or only bishops, all on squares of one colour.
    pub fn has_insufficient_material(&self) -> bool {
        let mut minors = 0;
        let mut knights = 0;
        let mut bishop_shades = (false, false);

        for (square, piece) in self.pieces() {
            match piece.piece_type {
                PieceType::King => {}
                PieceType::Knight => {
                    minors += 1;
                    knights += 1;
                }
                PieceType::Bishop => {
                    minors += 1;
                    if square.is_light() {
                        bishop_shades.0 = true;
                    } else {
                        bishop_shades.1 = true;
                    }
                }
                PieceType::Pawn | PieceType::Rook | PieceType::Queen => return false,
            }
        }

        match minors {
            0 | 1 => true,
            // Owner doesn't matter, only that every bishop shares a shade
            _ => knights == 0 && !(bishop_shades.0 && bishop_shades.1),
        }
    }
}
