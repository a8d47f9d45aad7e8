use chess_core::{Color, PieceType, Square};

use crate::rules::Rules;

/// Position score. Positive favors White regardless of who is to move.
pub type Score = i32;

// Material values on a x10 scale (1 pawn = 10)
const PAWN_VALUE: Score = 10;
const KNIGHT_VALUE: Score = 30;
const BISHOP_VALUE: Score = 30;
const ROOK_VALUE: Score = 50;
const QUEEN_VALUE: Score = 90;
const KING_VALUE: Score = 0; // never captured, so it carries no material

/// Score of a position in which the side to move has been checkmated.
/// Far outside any reachable material plus positional sum.
pub const MATE_SCORE: Score = 10_000;

// Centralization bonus, identical for every piece type and both colors.
// Zero on the border, peaking on d4, e4, d5 and e5.
const POSITION_BONUS: [[Score; 8]; 8] = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 1, 1, 0],
    [0, 1, 2, 2, 2, 2, 1, 0],
    [0, 1, 2, 3, 3, 2, 1, 0],
    [0, 1, 2, 3, 3, 2, 1, 0],
    [0, 1, 2, 2, 2, 2, 1, 0],
    [0, 1, 1, 1, 1, 1, 1, 0],
    [0, 0, 0, 0, 0, 0, 0, 0],
];

/// Static evaluation from White's perspective.
///
/// Checkmate scores `MATE_SCORE` for the side that delivered it, any draw
/// scores exactly 0, everything else is material plus centralization.
pub fn evaluate<R: Rules + ?Sized>(rules: &R) -> Score {
    if rules.is_checkmate() {
        // The side to move is the one that has been mated
        return match rules.side_to_move() {
            Color::White => -MATE_SCORE,
            Color::Black => MATE_SCORE,
        };
    }

    if rules.is_draw() {
        return 0;
    }

    let mut score = 0;
    for square in Square::all() {
        if let Some(piece) = rules.piece_at(square) {
            let value = piece_value(piece.piece_type) + position_bonus(piece.piece_type, square);
            score += signed(value, piece.color);
        }
    }
    score
}

/// Material only, from White's perspective. Ignores game state and placement.
pub fn material_balance<R: Rules + ?Sized>(rules: &R) -> Score {
    Square::all()
        .filter_map(|square| rules.piece_at(square))
        .map(|piece| signed(piece_value(piece.piece_type), piece.color))
        .sum()
}

pub fn piece_value(piece_type: PieceType) -> Score {
    match piece_type {
        PieceType::Pawn => PAWN_VALUE,
        PieceType::Knight => KNIGHT_VALUE,
        PieceType::Bishop => BISHOP_VALUE,
        PieceType::Rook => ROOK_VALUE,
        PieceType::Queen => QUEEN_VALUE,
        PieceType::King => KING_VALUE,
    }
}

/// Centralization bonus for a piece on `square`. Kings get none.
fn position_bonus(piece_type: PieceType, square: Square) -> Score {
    if piece_type == PieceType::King {
        return 0;
    }
    // Row 0 of the table is the 8th rank; the table is symmetric either way
    let row = 8 - square.rank as usize;
    let col = square.file as usize - 1;
    POSITION_BONUS[row][col]
}

fn signed(value: Score, color: Color) -> Score {
    match color {
        Color::White => value,
        Color::Black => -value,
    }
}
