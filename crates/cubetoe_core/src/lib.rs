//! Cubetoe core - pure tic-tac-toe game logic.
//!
//! This crate holds everything that decides the game and nothing that draws
//! it or talks to the network.
//!
//! # Architecture
//!
//! - **Board**: nine cells in row-major order, win detection in [`rules`]
//! - **Policy**: the deliberately beatable opponent ([`choose_move`])
//! - **Controller**: turn order and the one-shot terminal effect
//!   ([`GameController`])
//!
//! # Example
//!
//! ```
//! use cubetoe_core::{GameController, Phase, Position};
//!
//! let mut game = GameController::seeded(7);
//! let phase = game.player_move(Position::Center.to_index()).unwrap();
//! assert_eq!(phase, Phase::AwaitingOpponentMove);
//! game.opponent_move().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod controller;
mod error;
mod policy;
mod position;
mod promo;
mod random;
pub mod rules;
mod types;

pub use controller::{GameController, Phase, TerminalEffect};
pub use error::{GameError, MoveError};
pub use policy::{DUMB_MOVE_CHANCE, SABOTAGE_WIN_CHANCE, SKIP_BLOCK_CHANCE, choose_move};
pub use position::Position;
pub use promo::PromoCode;
pub use random::{RandomSource, ScriptedRandom};
pub use rules::{LINES, Line, evaluate, winning_line};
pub use types::{Board, Cell, GameOutcome, Mark};
