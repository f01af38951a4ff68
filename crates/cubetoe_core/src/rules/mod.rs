//! Game rules for tic-tac-toe.
//!
//! Pure functions over a board snapshot. Nothing here stores an outcome;
//! callers recompute it from the cells whenever they need it.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, Line, winner, winning_line};

use super::types::{Board, GameOutcome};
use tracing::instrument;

/// Evaluates a board.
///
/// A completed line wins; otherwise a full board is a draw; otherwise the
/// game is still in progress.
#[instrument(skip(board))]
pub fn evaluate(board: &Board) -> GameOutcome {
    if let Some(mark) = winner(board) {
        return GameOutcome::won_by(mark);
    }
    if is_full(board) {
        return GameOutcome::Draw;
    }
    GameOutcome::InProgress
}
