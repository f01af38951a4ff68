//! Opponent move selection.
//!
//! The opponent is meant to lose a fair share of games. Three independent
//! gates, checked in this order, weaken it:
//!
//! 1. a "dumb move" that ignores the board entirely,
//! 2. sabotaging its own immediate win,
//! 3. skipping the block of the player's immediate win.
//!
//! With no gate in play it wins when it can, blocks when it must, and
//! otherwise plays a random empty cell.

use super::error::GameError;
use super::position::Position;
use super::random::RandomSource;
use super::rules::winner;
use super::types::{Board, Cell, Mark};
use tracing::{debug, instrument};

/// Probability of ignoring the board and playing any empty cell.
pub const DUMB_MOVE_CHANCE: f64 = 0.30;

/// Probability of discarding an available winning move.
pub const SABOTAGE_WIN_CHANCE: f64 = 0.40;

/// Probability of discarding a needed blocking move.
pub const SKIP_BLOCK_CHANCE: f64 = 0.50;

/// Chooses the opponent's next cell.
///
/// # Errors
///
/// Returns [`GameError::PreconditionViolated`] when the board has no empty
/// cell. The controller never calls this on a full board.
#[instrument(skip(board, rng), fields(board = %board.display()))]
pub fn choose_move<R: RandomSource + ?Sized>(
    board: &Board,
    rng: &mut R,
) -> Result<Position, GameError> {
    let empties = board.empty_positions();
    if empties.is_empty() {
        return Err(GameError::PreconditionViolated(
            "opponent asked to move on a full board",
        ));
    }

    if rng.chance(DUMB_MOVE_CHANCE) {
        let pos = rng.pick(&empties);
        debug!(position = %pos, "Dumb move");
        return Ok(pos);
    }

    if let Some(win) = completing_cell(board, &empties, Mark::O) {
        if rng.chance(SABOTAGE_WIN_CHANCE)
            && let Some(pos) = pick_other(rng, &empties, win)
        {
            debug!(skipped = %win, position = %pos, "Sabotaged own win");
            return Ok(pos);
        }
        debug!(position = %win, "Taking the win");
        return Ok(win);
    }

    if let Some(block) = completing_cell(board, &empties, Mark::X) {
        if rng.chance(SKIP_BLOCK_CHANCE)
            && let Some(pos) = pick_other(rng, &empties, block)
        {
            debug!(skipped = %block, position = %pos, "Skipped block");
            return Ok(pos);
        }
        debug!(position = %block, "Blocking");
        return Ok(block);
    }

    let pos = rng.pick(&empties);
    debug!(position = %pos, "Random move");
    Ok(pos)
}

/// First empty cell, in index order, that completes a line for `mark`.
///
/// Each candidate is tried on a copy of the board.
fn completing_cell(board: &Board, empties: &[Position], mark: Mark) -> Option<Position> {
    empties.iter().copied().find(|&pos| {
        let mut probe = *board;
        probe.set(pos, Cell::Occupied(mark));
        winner(&probe) == Some(mark)
    })
}

/// Uniform pick among the empties other than `excluded`.
fn pick_other<R: RandomSource + ?Sized>(
    rng: &mut R,
    empties: &[Position],
    excluded: Position,
) -> Option<Position> {
    let others: Vec<Position> = empties.iter().copied().filter(|p| *p != excluded).collect();
    if others.is_empty() {
        None
    } else {
        Some(rng.pick(&others))
    }
}
