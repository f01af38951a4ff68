//! Core domain types for tic-tac-toe.

use super::error::{GameError, MoveError};
use super::position::Position;
use super::rules;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A mark placed on the board.
///
/// `X` always belongs to the human player and moves first; `O` belongs to
/// the computer opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// The human player's mark.
    X,
    /// The opponent's mark.
    O,
}

impl Mark {
    /// Returns the other mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Single-character symbol for this mark.
    pub fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

/// A cell on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Nothing placed yet.
    Empty,
    /// Cell holds a mark.
    Occupied(Mark),
}

/// 3x3 tic-tac-toe board.
///
/// Cells are stored row-major, `index = row * 3 + col`. Marks are never
/// overwritten; the only way to clear a cell is [`Board::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; 9],
        }
    }

    /// Gets the cell at the given position.
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.to_index()]
    }

    /// Gets the cell at a raw index, `None` when out of range.
    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Checks if the cell at a position is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Cell::Empty
    }

    /// Returns all cells in row-major order.
    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// Empty positions in index order.
    pub fn empty_positions(&self) -> Vec<Position> {
        Position::valid_moves(self)
    }

    /// Places a mark at `index` (0-8).
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidMove`] when the index is out of range,
    /// the cell is occupied, or the board already has a terminal outcome.
    /// The board is left untouched on error.
    #[instrument(skip(self))]
    pub fn place(&mut self, index: usize, mark: Mark) -> Result<(), GameError> {
        let pos = Position::from_index(index).ok_or(MoveError::OutOfBounds(index))?;

        if rules::evaluate(self).is_terminal() {
            return Err(MoveError::GameOver.into());
        }

        if !self.is_empty(pos) {
            return Err(MoveError::SquareOccupied(pos).into());
        }

        self.cells[index] = Cell::Occupied(mark);
        Ok(())
    }

    /// Clears all nine cells.
    pub fn reset(&mut self) {
        self.cells = [Cell::Empty; 9];
    }

    /// Writes a cell without any rule checks.
    ///
    /// Used for speculative placement on board copies and for building
    /// fixtures.
    pub(crate) fn set(&mut self, pos: Position, cell: Cell) {
        self.cells[pos.to_index()] = cell;
    }

    /// Builds a board from a 9-character pattern of `X`, `O` and `.`.
    ///
    /// Any other character is treated as empty. Characters beyond the ninth
    /// are ignored.
    pub fn from_pattern(pattern: &str) -> Self {
        let mut board = Self::new();
        for (pos, ch) in Position::ALL.iter().zip(pattern.chars()) {
            let cell = match ch {
                'X' | 'x' => Cell::Occupied(Mark::X),
                'O' | 'o' => Cell::Occupied(Mark::O),
                _ => Cell::Empty,
            };
            board.set(*pos, cell);
        }
        board
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let symbol = match self.cells[pos] {
                    Cell::Empty => (pos + 1).to_string(),
                    Cell::Occupied(mark) => mark.symbol().to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a board, always derived from the cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Moves remain and nobody has a line.
    InProgress,
    /// X completed a line.
    PlayerWin,
    /// O completed a line.
    OpponentWin,
    /// Board full, no line.
    Draw,
}

impl GameOutcome {
    /// Outcome for a winning mark.
    pub fn won_by(mark: Mark) -> Self {
        match mark {
            Mark::X => GameOutcome::PlayerWin,
            Mark::O => GameOutcome::OpponentWin,
        }
    }

    /// Returns true once the game can no longer continue.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameOutcome::InProgress)
    }
}

impl std::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameOutcome::InProgress => write!(f, "In progress"),
            GameOutcome::PlayerWin => write!(f, "Player wins"),
            GameOutcome::OpponentWin => write!(f, "Opponent wins"),
            GameOutcome::Draw => write!(f, "Draw"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_out_of_bounds_leaves_board() {
        let mut board = Board::new();
        let err = board.place(9, Mark::X).unwrap_err();
        assert_eq!(err, GameError::InvalidMove(MoveError::OutOfBounds(9)));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_place_occupied_leaves_board() {
        let mut board = Board::new();
        board.place(4, Mark::X).unwrap();
        let before = board;
        let err = board.place(4, Mark::O).unwrap_err();
        assert_eq!(
            err,
            GameError::InvalidMove(MoveError::SquareOccupied(Position::Center))
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_place_after_win_rejected() {
        let mut board = Board::from_pattern("XXXOO....");
        let err = board.place(8, Mark::O).unwrap_err();
        assert_eq!(err, GameError::InvalidMove(MoveError::GameOver));
        assert!(board.is_empty(Position::BottomRight));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut board = Board::from_pattern("XOXOXOOXO");
        board.reset();
        assert!(board.cells().iter().all(|c| *c == Cell::Empty));
    }

    #[test]
    fn test_display_numbers_empty_cells() {
        let board = Board::from_pattern("X...O....");
        assert_eq!(board.display(), "X|2|3\n-+-+-\n4|O|6\n-+-+-\n7|8|9");
    }
}
