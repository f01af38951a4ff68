//! Named board positions.

use super::types::Board;
use serde::{Deserialize, Serialize};

/// A position on the tic-tac-toe board (0-8).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
)]
pub enum Position {
    /// Top-left (position 0)
    #[strum(to_string = "Top-left")]
    TopLeft,
    /// Top-center (position 1)
    #[strum(to_string = "Top-center")]
    TopCenter,
    /// Top-right (position 2)
    #[strum(to_string = "Top-right")]
    TopRight,
    /// Middle-left (position 3)
    #[strum(to_string = "Middle-left")]
    MiddleLeft,
    /// Center (position 4)
    #[strum(to_string = "Center")]
    Center,
    /// Middle-right (position 5)
    #[strum(to_string = "Middle-right")]
    MiddleRight,
    /// Bottom-left (position 6)
    #[strum(to_string = "Bottom-left")]
    BottomLeft,
    /// Bottom-center (position 7)
    #[strum(to_string = "Bottom-center")]
    BottomCenter,
    /// Bottom-right (position 8)
    #[strum(to_string = "Bottom-right")]
    BottomRight,
}

impl Position {
    /// All 9 positions in index order.
    pub const ALL: [Position; 9] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    /// Converts position to board index (0-8).
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// Row of this position (0-2).
    pub fn row(self) -> usize {
        self.to_index() / 3
    }

    /// Column of this position (0-2).
    pub fn col(self) -> usize {
        self.to_index() % 3
    }

    /// Creates position from board index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns only the empty positions, in index order.
    pub fn valid_moves(board: &Board) -> Vec<Position> {
        Self::ALL
            .iter()
            .copied()
            .filter(|pos| board.is_empty(*pos))
            .collect()
    }
}
