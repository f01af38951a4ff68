//! Application state and event handling.
//!
//! Everything here runs on the UI thread. Deferred work goes through the
//! [`Scheduler`]; network calls run as Tokio tasks and report back over a
//! channel, tagged with the generation they were started under.

use super::cube::ease_out_cubic;
use super::input::{digit_cell, move_cursor};
use super::link::{LinkAction, LinkScreen};
use super::session::{FLIP_STEPS, FrameLayout, SHAKE_AMPLITUDE, SHAKE_STEPS, SessionContext};
use crate::config::AppConfig;
use crate::effects::EffectDispatcher;
use crate::scheduler::{Scheduler, Tagged};
use crate::telegram::{DestinationId, DestinationResolver, Resolution};
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use cubetoe_core::{GameController, GameOutcome, Phase, TerminalEffect};
use ratatui::layout::Position as TermPosition;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

const FLIP_FRAME: Duration = Duration::from_millis(16);
const SHAKE_FRAME: Duration = Duration::from_millis(30);
const DOTS_FRAME: Duration = Duration::from_millis(400);

/// Deferred work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// The opponent's delayed move.
    OpponentMove,
    /// Reset flip frame.
    Flip(u32),
    /// Victory shake frame.
    Shake(u32),
    /// Next destination poll.
    Poll,
    /// Waiting indicator frame.
    Dots,
}

/// Results coming back from background tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Background {
    /// A resolution attempt finished.
    Resolved(Result<Resolution, String>),
}

/// External collaborators, absent when playing offline.
#[derive(Clone)]
pub struct Services {
    dispatcher: EffectDispatcher,
    resolver: Arc<dyn DestinationResolver>,
}

impl Services {
    /// Bundles a dispatcher and a resolver.
    pub fn new(dispatcher: EffectDispatcher, resolver: Arc<dyn DestinationResolver>) -> Self {
        Self {
            dispatcher,
            resolver,
        }
    }
}

/// Delays the UI waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Pause before the opponent moves.
    pub opponent_delay: Duration,
    /// Pause between destination polls.
    pub poll_interval: Duration,
}

impl From<&AppConfig> for Timings {
    fn from(config: &AppConfig) -> Self {
        Self {
            opponent_delay: config.opponent_delay(),
            poll_interval: config.poll_interval(),
        }
    }
}

/// Which screen is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Linking a Telegram handle.
    Link(LinkScreen),
    /// The board.
    Game,
}

/// Main application state.
pub struct App {
    controller: GameController,
    session: SessionContext,
    screen: Screen,
    scheduler: Scheduler<Task>,
    services: Option<Services>,
    timings: Timings,
    destination: Option<DestinationId>,
    linked_as: Option<String>,
    deliveries: Vec<JoinHandle<()>>,
    clipboard: Option<String>,
    promo_copied: bool,
    poll_in_flight: bool,
    bg_tx: mpsc::UnboundedSender<Tagged<Background>>,
    bg_rx: mpsc::UnboundedReceiver<Tagged<Background>>,
    should_quit: bool,
}

impl App {
    /// Creates the app. With services it opens on the link screen.
    pub fn new(
        controller: GameController,
        timings: Timings,
        services: Option<Services>,
        bot_username: &str,
    ) -> Self {
        let screen = if services.is_some() {
            Screen::Link(LinkScreen::new(bot_username))
        } else {
            Screen::Game
        };
        let (bg_tx, bg_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            session: SessionContext::default(),
            screen,
            scheduler: Scheduler::new(),
            services,
            timings,
            destination: None,
            linked_as: None,
            deliveries: Vec::new(),
            clipboard: None,
            promo_copied: false,
            poll_in_flight: false,
            bg_tx,
            bg_rx,
            should_quit: false,
        }
    }

    /// The game.
    pub fn controller(&self) -> &GameController {
        &self.controller
    }

    /// Transient UI state.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Current screen.
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Linked chat, if any.
    pub fn destination(&self) -> Option<DestinationId> {
        self.destination
    }

    /// True once the player asked to leave.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Earliest moment something is scheduled.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Generation of the scheduler; bumps on reset and screen changes.
    pub fn generation(&self) -> u64 {
        self.scheduler.generation()
    }

    /// True if a task matching `predicate` is queued.
    pub fn is_scheduled(&self, predicate: impl Fn(&Task) -> bool) -> bool {
        self.scheduler.contains(predicate)
    }

    /// Records where the last frame put things.
    pub fn set_layout(&mut self, layout: Option<FrameLayout>) {
        self.session.set_layout(layout);
    }

    /// Hands over notification tasks started so far.
    pub fn take_deliveries(&mut self) -> Vec<JoinHandle<()>> {
        std::mem::take(&mut self.deliveries)
    }

    /// Text waiting to be put on the terminal clipboard.
    pub fn take_clipboard(&mut self) -> Option<String> {
        self.clipboard.take()
    }

    /// True once this round's promo code was copied.
    pub fn promo_copied(&self) -> bool {
        self.promo_copied
    }

    /// Queues the promo code for the clipboard.
    ///
    /// Only a won game has a code; returns false otherwise.
    #[instrument(skip(self))]
    pub fn copy_promo(&mut self) -> bool {
        if self.controller.phase() != Phase::Terminal(GameOutcome::PlayerWin) {
            return false;
        }
        let Some(code) = self.controller.promo() else {
            return false;
        };
        info!("Promo code copied");
        self.clipboard = Some(code.to_string());
        self.promo_copied = true;
        true
    }

    /// One-line status for the board screen.
    pub fn status_line(&self) -> String {
        match self.controller.phase() {
            Phase::AwaitingPlayerMove if self.session.is_flipping() => "New game...".to_string(),
            Phase::AwaitingPlayerMove => {
                "Your move: click a cell, arrows + Enter, or 1-9".to_string()
            }
            Phase::AwaitingOpponentMove => "Opponent is thinking...".to_string(),
            Phase::Terminal(GameOutcome::PlayerWin) => {
                let code = self
                    .controller
                    .promo()
                    .map(|p| p.to_string())
                    .unwrap_or_default();
                if self.promo_copied {
                    format!("✨ Promo code {} copied! Press r for a new game", code)
                } else if self.destination.is_some() {
                    format!("🎉 Promo code {} sent to Telegram (c to copy)", code)
                } else {
                    format!("🎉 You win! Promo code: {} (c to copy)", code)
                }
            }
            Phase::Terminal(GameOutcome::OpponentWin) => {
                "😔 No luck this time. Play again?".to_string()
            }
            Phase::Terminal(_) => "Draw. One more?".to_string(),
        }
    }

    /// Label of the restart control.
    pub fn restart_label(&self) -> &'static str {
        if self.offers_copy() {
            "Copy promo code (c)"
        } else if self.controller.phase().is_terminal() {
            "Play again (r)"
        } else {
            "Start over (r)"
        }
    }

    fn offers_copy(&self) -> bool {
        self.controller.phase() == Phase::Terminal(GameOutcome::PlayerWin) && !self.promo_copied
    }

    /// Who the game is linked to, for the title bar.
    pub fn linked_as(&self) -> Option<&str> {
        self.linked_as.as_deref()
    }

    /// Handles a key press.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if let Screen::Link(link) = &mut self.screen {
            let action = link.handle_key(key.code);
            self.on_link_action(action, now);
        } else {
            self.handle_game_key(key.code, now);
        }
    }

    fn handle_game_key(&mut self, code: KeyCode, now: Instant) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                info!("User quit");
                self.should_quit = true;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.reset(now),
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.copy_promo();
            }
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                let cursor = move_cursor(self.session.cursor(), code);
                self.session.set_cursor(cursor);
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.play_cell(self.session.cursor().to_index(), now);
            }
            KeyCode::Char(c) => {
                if let Some(index) = digit_cell(c) {
                    self.play_cell(index, now);
                }
            }
            _ => {}
        }
    }

    /// Handles a mouse event against the last frame's layout.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if self.screen != Screen::Game {
            return;
        }
        let Some(layout) = self.session.layout() else {
            return;
        };
        let transform = self.session.transform();
        let (column, row) = (mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if layout.restart.contains(TermPosition::new(column, row)) {
                    if self.offers_copy() {
                        self.copy_promo();
                    } else {
                        self.reset(now);
                    }
                } else if let Some(index) = layout.viewport.cell_at(column, row, &transform) {
                    self.play_cell(index, now);
                }
            }
            MouseEventKind::Moved => {
                let hover = layout.viewport.cell_at(column, row, &transform);
                self.session.set_hover(hover);
            }
            _ => {}
        }
    }

    /// The player picks `index`. Illegal picks are ignored.
    ///
    /// Returns true if the move was made.
    #[instrument(skip(self, now))]
    pub fn play_cell(&mut self, index: usize, now: Instant) -> bool {
        if self.screen != Screen::Game || self.session.is_flipping() {
            return false;
        }
        match self.controller.player_move(index) {
            Ok(phase) => {
                self.after_move(phase, now);
                true
            }
            Err(e) => {
                debug!(error = %e, "Ignoring click");
                false
            }
        }
    }

    /// Starts a new game with the flip animation.
    #[instrument(skip(self, now))]
    pub fn reset(&mut self, now: Instant) {
        self.controller.reset();
        self.promo_copied = false;
        self.scheduler.advance_generation();
        self.poll_in_flight = false;
        self.session.clear_round();
        self.session.start_flip();
        self.scheduler.schedule(now, FLIP_FRAME, Task::Flip(1));
    }

    /// Runs everything that is due and drains background results.
    pub fn tick(&mut self, now: Instant) {
        while let Ok(message) = self.bg_rx.try_recv() {
            self.on_background(message, now);
        }
        for task in self.scheduler.due(now) {
            self.run_task(task, now);
        }
    }

    fn after_move(&mut self, phase: Phase, now: Instant) {
        match phase {
            Phase::AwaitingOpponentMove => {
                self.scheduler
                    .schedule(now, self.timings.opponent_delay, Task::OpponentMove);
            }
            Phase::AwaitingPlayerMove => {}
            Phase::Terminal(_) => self.finish(now),
        }
    }

    fn finish(&mut self, now: Instant) {
        let Some(effect) = self.controller.take_effect() else {
            return;
        };
        if matches!(effect, TerminalEffect::PlayerWin { .. }) {
            self.session.set_shake((0.0, 0.0));
            self.scheduler.schedule(now, Duration::ZERO, Task::Shake(0));
        }
        if let Some(services) = &self.services
            && let Some(handle) = services.dispatcher.dispatch(&effect, self.destination)
        {
            self.deliveries.retain(|pending| !pending.is_finished());
            self.deliveries.push(handle);
        }
    }

    fn run_task(&mut self, task: Task, now: Instant) {
        match task {
            Task::OpponentMove => {
                if self.controller.phase() != Phase::AwaitingOpponentMove {
                    return;
                }
                match self.controller.opponent_move() {
                    Ok(phase) => self.after_move(phase, now),
                    Err(e) => error!(error = %e, "Opponent could not move"),
                }
            }
            Task::Flip(step) => {
                if step > FLIP_STEPS {
                    self.session.end_flip();
                } else {
                    let t = f64::from(step) / f64::from(FLIP_STEPS);
                    self.session.set_flip_progress(ease_out_cubic(t));
                    self.scheduler.schedule(now, FLIP_FRAME, Task::Flip(step + 1));
                }
            }
            Task::Shake(step) => {
                if step >= SHAKE_STEPS {
                    self.session.end_shake();
                } else {
                    let decay = 1.0 - f64::from(step) / f64::from(SHAKE_STEPS);
                    let amplitude = SHAKE_AMPLITUDE * decay;
                    self.session.set_shake((
                        rand::random_range(-amplitude..=amplitude),
                        rand::random_range(-amplitude..=amplitude),
                    ));
                    self.scheduler.schedule(now, SHAKE_FRAME, Task::Shake(step + 1));
                }
            }
            Task::Poll => self.start_poll(),
            Task::Dots => {
                if let Screen::Link(link) = &mut self.screen
                    && link.is_waiting()
                {
                    link.tick_dots();
                    self.scheduler.schedule(now, DOTS_FRAME, Task::Dots);
                }
            }
        }
    }

    fn on_link_action(&mut self, action: LinkAction, now: Instant) {
        match action {
            LinkAction::None => {}
            LinkAction::Submit(handle) => {
                info!(%handle, "Linking handle");
                self.scheduler.advance_generation();
                self.poll_in_flight = false;
                self.scheduler.schedule(now, Duration::ZERO, Task::Poll);
                self.scheduler.schedule(now, DOTS_FRAME, Task::Dots);
            }
            LinkAction::Cancel => {
                debug!("Handle edited, polling stopped");
                self.scheduler.advance_generation();
                self.poll_in_flight = false;
            }
            LinkAction::Skip => {
                info!("Playing without a linked chat");
                self.enter_game();
            }
        }
    }

    fn enter_game(&mut self) {
        self.scheduler.advance_generation();
        self.poll_in_flight = false;
        self.screen = Screen::Game;
    }

    fn start_poll(&mut self) {
        if self.poll_in_flight {
            return;
        }
        let Screen::Link(link) = &self.screen else {
            return;
        };
        let Some(handle) = link.waiting_for().cloned() else {
            return;
        };
        let Some(services) = &self.services else {
            return;
        };

        let resolver = Arc::clone(&services.resolver);
        let tx = self.bg_tx.clone();
        let generation = self.scheduler.generation();
        self.poll_in_flight = true;
        tokio::spawn(async move {
            let result = resolver.resolve(&handle).await.map_err(|e| e.to_string());
            let _ = tx.send(Tagged {
                generation,
                value: Background::Resolved(result),
            });
        });
    }

    fn on_background(&mut self, message: Tagged<Background>, now: Instant) {
        if !self.scheduler.is_current(message.generation) {
            debug!(generation = message.generation, "Discarding stale result");
            return;
        }
        let Background::Resolved(result) = message.value;
        self.poll_in_flight = false;

        match result {
            Ok(Resolution::Found(destination)) => {
                let handle = match &self.screen {
                    Screen::Link(link) => link.waiting_for().map(|h| h.to_string()),
                    Screen::Game => None,
                };
                info!(%destination, "Chat linked");
                self.destination = Some(destination);
                self.linked_as = handle;
                self.enter_game();
            }
            Ok(Resolution::NotYetFound) => {
                self.scheduler
                    .schedule(now, self.timings.poll_interval, Task::Poll);
            }
            Ok(Resolution::HandleMismatch { expected, actual }) => {
                warn!(%expected, %actual, "Handle rejected");
                if let Screen::Link(link) = &mut self.screen {
                    link.reject(expected, actual);
                }
                self.scheduler.advance_generation();
            }
            Err(e) => {
                warn!(error = %e, "Resolution failed, retrying");
                self.scheduler
                    .schedule(now, self.timings.poll_interval, Task::Poll);
            }
        }
    }
}
