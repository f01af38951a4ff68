//! Error taxonomy for the game core.

use super::position::Position;

/// Why a placement was refused.
///
/// Every variant is recoverable: the board is unchanged and the caller is
/// expected to ignore the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// Index outside 0-8.
    #[display("Position {} is out of bounds (must be 0-8)", _0)]
    OutOfBounds(usize),

    /// The cell already holds a mark.
    #[display("Square {} is already occupied", _0)]
    SquareOccupied(Position),

    /// The game already reached a terminal outcome.
    #[display("Game is already over")]
    GameOver,

    /// The player clicked while the opponent is to move.
    #[display("It's not the player's turn")]
    NotPlayersTurn,

    /// The opponent was asked to move out of turn.
    #[display("It's not the opponent's turn")]
    NotOpponentsTurn,
}

impl std::error::Error for MoveError {}

/// Errors raised by the game core.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum GameError {
    /// Illegal index, occupied cell or post-terminal input.
    #[display("Invalid move: {}", _0)]
    InvalidMove(MoveError),

    /// A caller broke a sequencing contract. This is a programming defect.
    #[display("Precondition violated: {}", _0)]
    PreconditionViolated(&'static str),
}

impl std::error::Error for GameError {}
