//! Turn order and terminal side effects.
//!
//! The controller owns the board and the random source, and nothing that
//! belongs to the presentation layer. It moves through
//!
//! ```text
//! AwaitingPlayerMove -> AwaitingOpponentMove -> AwaitingPlayerMove | Terminal
//! ```
//!
//! and queues exactly one [`TerminalEffect`] per game, which the caller
//! drains with [`GameController::take_effect`].

use super::error::{GameError, MoveError};
use super::policy::choose_move;
use super::promo::PromoCode;
use super::random::RandomSource;
use super::rules::{self, Line};
use super::types::{Board, GameOutcome, Mark};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Where the game currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the human to click a cell.
    AwaitingPlayerMove,
    /// The opponent moves next.
    AwaitingOpponentMove,
    /// The game is over.
    Terminal(GameOutcome),
}

impl Phase {
    /// Returns true once the game is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Terminal(_))
    }
}

/// The side effect a finished game asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalEffect {
    /// Deliver the win message with this code.
    PlayerWin {
        /// Code issued for this win.
        promo: PromoCode,
    },
    /// Deliver the consolation message.
    OpponentWin,
    /// Nothing to deliver.
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EffectSlot {
    Idle,
    Pending(TerminalEffect),
    Fired,
}

/// Tic-tac-toe game controller.
#[derive(Debug, Clone)]
pub struct GameController<R = StdRng> {
    board: Board,
    phase: Phase,
    generation: u64,
    promo: Option<PromoCode>,
    effect: EffectSlot,
    rng: R,
}

impl GameController<StdRng> {
    /// Creates a controller with a deterministic seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Creates a controller seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: RandomSource> GameController<R> {
    /// Creates a new game, waiting for the player.
    #[instrument(skip(rng))]
    pub fn new(rng: R) -> Self {
        Self {
            board: Board::new(),
            phase: Phase::AwaitingPlayerMove,
            generation: 0,
            promo: None,
            effect: EffectSlot::Idle,
            rng,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Outcome recomputed from the board.
    pub fn outcome(&self) -> GameOutcome {
        rules::evaluate(&self.board)
    }

    /// Winning line for display, if any.
    pub fn winning_line(&self) -> Option<Line> {
        rules::winning_line(&self.board)
    }

    /// Promo code issued for this game, if the player won.
    pub fn promo(&self) -> Option<&PromoCode> {
        self.promo.as_ref()
    }

    /// Counts resets. Anything scheduled under an older generation is stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The player places X at `index`.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidMove`] for an out-of-range index, an occupied
    /// cell, a click during the opponent's turn or after the game ended.
    /// Callers treat these as no-ops.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn player_move(&mut self, index: usize) -> Result<Phase, GameError> {
        match self.phase {
            Phase::AwaitingPlayerMove => {}
            Phase::AwaitingOpponentMove => return Err(MoveError::NotPlayersTurn.into()),
            Phase::Terminal(_) => return Err(MoveError::GameOver.into()),
        }

        self.board.place(index, Mark::X)?;
        debug!(index, "Player placed X");
        Ok(self.settle(Phase::AwaitingOpponentMove))
    }

    /// The opponent chooses and places O.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidMove`] when it is not the opponent's turn.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn opponent_move(&mut self) -> Result<Phase, GameError> {
        match self.phase {
            Phase::AwaitingOpponentMove => {}
            Phase::AwaitingPlayerMove => return Err(MoveError::NotOpponentsTurn.into()),
            Phase::Terminal(_) => return Err(MoveError::GameOver.into()),
        }

        let pos = choose_move(&self.board, &mut self.rng)?;
        self.board.place(pos.to_index(), Mark::O)?;
        debug!(position = %pos, "Opponent placed O");
        Ok(self.settle(Phase::AwaitingPlayerMove))
    }

    /// Takes the pending terminal effect.
    ///
    /// Returns `Some` exactly once per finished game; every later call, and
    /// every call before the game ends, returns `None`.
    pub fn take_effect(&mut self) -> Option<TerminalEffect> {
        match std::mem::replace(&mut self.effect, EffectSlot::Idle) {
            EffectSlot::Pending(effect) => {
                self.effect = EffectSlot::Fired;
                Some(effect)
            }
            other => {
                self.effect = other;
                None
            }
        }
    }

    /// Clears the board and starts a new game from any phase.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.board.reset();
        self.phase = Phase::AwaitingPlayerMove;
        self.promo = None;
        self.effect = EffectSlot::Idle;
        self.generation += 1;
        info!(generation = self.generation, "Game reset");
    }

    /// Evaluates the board after a placement and moves to the next phase.
    fn settle(&mut self, next: Phase) -> Phase {
        let outcome = rules::evaluate(&self.board);
        self.phase = if outcome.is_terminal() {
            self.finish(outcome);
            Phase::Terminal(outcome)
        } else {
            next
        };
        self.phase
    }

    fn finish(&mut self, outcome: GameOutcome) {
        let effect = match outcome {
            GameOutcome::PlayerWin => {
                let promo = PromoCode::generate(&mut self.rng);
                self.promo = Some(promo.clone());
                TerminalEffect::PlayerWin { promo }
            }
            GameOutcome::OpponentWin => TerminalEffect::OpponentWin,
            GameOutcome::Draw => TerminalEffect::Draw,
            GameOutcome::InProgress => return,
        };
        info!(%outcome, generation = self.generation, "Game finished");
        if self.effect == EffectSlot::Idle {
            self.effect = EffectSlot::Pending(effect);
        }
    }
}
