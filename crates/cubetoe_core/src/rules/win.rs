//! Win detection logic for tic-tac-toe.

use super::super::{Board, Cell, Mark, Position};
use tracing::instrument;

/// Three positions that win when they hold the same mark.
pub type Line = [Position; 3];

/// The eight winning lines: rows, then columns, then diagonals.
///
/// The order is fixed; [`winning_line`] reports the first match.
pub const LINES: [Line; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [Position::MiddleLeft, Position::Center, Position::MiddleRight],
    [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
    // Columns
    [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft],
    [Position::TopCenter, Position::Center, Position::BottomCenter],
    [Position::TopRight, Position::MiddleRight, Position::BottomRight],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Returns the first completed line, if any.
#[instrument(skip(board))]
pub fn winning_line(board: &Board) -> Option<Line> {
    LINES.iter().copied().find(|[a, b, c]| {
        let cell = board.get(*a);
        cell != Cell::Empty && cell == board.get(*b) && cell == board.get(*c)
    })
}

/// Returns the mark that owns a completed line.
#[instrument(skip(board))]
pub fn winner(board: &Board) -> Option<Mark> {
    match board.get(winning_line(board)?[0]) {
        Cell::Occupied(mark) => Some(mark),
        Cell::Empty => None,
    }
}
