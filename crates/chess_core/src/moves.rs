use std::fmt;

use crate::{PieceType, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveType {
    Normal,
    DoublePawnPush,
    EnPassant,
    Castle,
}

/// A move as produced by the legal move generator. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
    pub capture: bool,
    pub move_type: MoveType,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
            capture: false,
            move_type: MoveType::Normal,
        }
    }

    pub fn capture(from: Square, to: Square) -> Self {
        Self {
            capture: true,
            ..Self::new(from, to)
        }
    }

    pub fn with_promotion(from: Square, to: Square, promotion: PieceType, capture: bool) -> Self {
        Self {
            promotion: Some(promotion),
            capture,
            ..Self::new(from, to)
        }
    }

    pub fn double_push(from: Square, to: Square) -> Self {
        Self {
            move_type: MoveType::DoublePawnPush,
            ..Self::new(from, to)
        }
    }

    pub fn en_passant(from: Square, to: Square) -> Self {
        Self {
            capture: true,
            move_type: MoveType::EnPassant,
            ..Self::new(from, to)
        }
    }

    pub fn castle(from: Square, to: Square) -> Self {
        Self {
            move_type: MoveType::Castle,
            ..Self::new(from, to)
        }
    }

    pub fn is_capture(&self) -> bool {
        self.capture
    }

    /// Same squares and promotion, ignoring the generator-supplied flags.
    pub fn matches(&self, from: Square, to: Square, promotion: Option<PieceType>) -> bool {
        self.from == from && self.to == to && self.promotion == promotion
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.symbol())?;
        }
        Ok(())
    }
}
