use thiserror::Error;

use crate::board::square_name;

/// Errors raised when a caller breaks the engine's input contract.
///
/// None of these are gameplay messages: a well-behaved front end only offers
/// legal destinations, so seeing one of these means the caller is out of sync.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("Invalid square index: {0}")]
    InvalidSquare(u8),

    #[error("Illegal move: {} to {}", square_name(*.from), square_name(*.to))]
    IllegalMove { from: u8, to: u8 },

    #[error("It is not that side's turn")]
    NotYourTurn,

    #[error("The game is over")]
    GameOver,

    #[error("A promotion choice is pending")]
    PromotionPending,

    #[error("No promotion is pending")]
    NoPendingPromotion,

    #[error("Cannot promote to {0}")]
    InvalidPromotion(String),

    #[error("Invalid FEN string: {0}")]
    InvalidFen(String),
}

pub type Result<T> = std::result::Result<T, ChessError>;
