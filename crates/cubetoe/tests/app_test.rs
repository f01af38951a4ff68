//! End-to-end tests of the terminal app without a terminal.

mod common;

use common::{RecordingNotifier, ScriptedResolver};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use cubetoe::tui::{
    App, CubeTransform, FLIP_STEPS, LinkStatus, Screen, Services, Task, Timings, cell_center, draw,
};
use cubetoe::{DestinationId, EffectDispatcher, Resolution};
use cubetoe_core::{Cell, GameController, GameOutcome, Mark, Phase, Position, evaluate};
use ratatui::{Terminal, backend::TestBackend};
use std::sync::Arc;
use std::time::{Duration, Instant};

const OPPONENT_DELAY: Duration = Duration::from_millis(450);

fn timings() -> Timings {
    Timings {
        opponent_delay: OPPONENT_DELAY,
        poll_interval: Duration::from_millis(10),
    }
}

fn offline_app(seed: u64) -> App {
    App::new(GameController::seeded(seed), timings(), None, "promo_for_user_bot")
}

fn linked_app(
    seed: u64,
    notifier: Arc<RecordingNotifier>,
    resolver: Arc<ScriptedResolver>,
) -> App {
    let services = Services::new(
        EffectDispatcher::new(notifier, Duration::from_secs(5)),
        resolver,
    );
    App::new(
        GameController::seeded(seed),
        timings(),
        Some(services),
        "promo_for_user_bot",
    )
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn click(column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

/// Draws one frame, stores its layout and returns the screen text.
fn render(app: &mut App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
    let mut layout = None;
    terminal.draw(|frame| layout = draw(frame, app)).unwrap();
    app.set_layout(layout);
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

fn count(app: &App, mark: Mark) -> usize {
    app.controller()
        .board()
        .cells()
        .iter()
        .filter(|c| **c == Cell::Occupied(mark))
        .count()
}

/// Plays the first empty cell whenever it is the player's turn.
fn drive_to_end(app: &mut App, now: &mut Instant) -> GameOutcome {
    loop {
        match app.controller().phase() {
            Phase::AwaitingPlayerMove => {
                let next = app.controller().board().empty_positions()[0];
                assert!(app.play_cell(next.to_index(), *now));
            }
            Phase::AwaitingOpponentMove => {
                *now += OPPONENT_DELAY;
                app.tick(*now);
            }
            Phase::Terminal(outcome) => return outcome,
        }
    }
}

async fn type_and_submit(app: &mut App, handle: &str) {
    let now = Instant::now();
    for c in handle.chars() {
        app.handle_key(key(KeyCode::Char(c)), now);
    }
    app.handle_key(key(KeyCode::Enter), now);
}

async fn settle(app: &mut App, done: impl Fn(&App) -> bool) {
    for _ in 0..400 {
        app.tick(Instant::now());
        if done(app) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("app did not settle");
}

#[test]
fn test_offline_opens_on_board() {
    let app = offline_app(1);
    assert_eq!(app.screen(), &Screen::Game);
    assert_eq!(app.destination(), None);
    assert_eq!(app.controller().phase(), Phase::AwaitingPlayerMove);
}

#[test]
fn test_opponent_waits_for_delay() {
    let mut app = offline_app(2);
    let t0 = Instant::now();

    assert!(app.play_cell(4, t0));
    assert_eq!(app.controller().phase(), Phase::AwaitingOpponentMove);
    assert!(app.is_scheduled(|t| *t == Task::OpponentMove));

    app.tick(t0 + OPPONENT_DELAY - Duration::from_millis(1));
    assert_eq!(count(&app, Mark::O), 0);

    app.tick(t0 + OPPONENT_DELAY);
    assert_eq!(count(&app, Mark::O), 1);
    assert_ne!(app.controller().phase(), Phase::AwaitingOpponentMove);
}

#[test]
fn test_illegal_clicks_are_ignored() {
    let mut app = offline_app(3);
    let t0 = Instant::now();
    app.play_cell(4, t0);

    // Opponent's turn.
    assert!(!app.play_cell(0, t0));
    app.tick(t0 + OPPONENT_DELAY);

    // Occupied and out of range.
    assert!(!app.play_cell(4, t0));
    assert!(!app.play_cell(9, t0));
    assert_eq!(count(&app, Mark::X), 1);
}

#[test]
fn test_reset_cancels_pending_move_and_flips() {
    let mut app = offline_app(4);
    let t0 = Instant::now();
    app.play_cell(4, t0);
    let generation = app.generation();

    app.reset(t0 + Duration::from_millis(100));
    assert_eq!(app.generation(), generation + 1);
    assert!(app.session().is_flipping());

    let mut now = t0 + Duration::from_secs(1);
    app.tick(now);
    assert!(
        app.controller().board().cells().iter().all(|c| *c == Cell::Empty),
        "stale opponent move must not run"
    );
    assert_eq!(app.controller().phase(), Phase::AwaitingPlayerMove);

    // Clicks are ignored while the cube spins.
    assert!(!app.play_cell(0, now));

    for _ in 0..=FLIP_STEPS {
        now += Duration::from_millis(16);
        app.tick(now);
    }
    assert!(!app.session().is_flipping());
    assert_eq!(app.session().transform(), CubeTransform::resting());
    assert!(app.play_cell(0, now));
}

#[test]
fn test_flip_direction_alternates_between_games() {
    let mut app = offline_app(5);
    let now = Instant::now();
    app.reset(now);
    app.tick(now + Duration::from_millis(16));
    assert!(app.session().transform().flip_degrees > 0.0);

    app.reset(now + Duration::from_millis(20));
    app.tick(now + Duration::from_millis(36));
    assert!(app.session().transform().flip_degrees < 0.0);
}

#[test]
fn test_keyboard_play() {
    let now = Instant::now();

    let mut app = offline_app(6);
    app.handle_key(key(KeyCode::Char('1')), now);
    assert_eq!(app.controller().board().get(Position::TopLeft), Cell::Occupied(Mark::X));

    let mut app = offline_app(6);
    app.handle_key(key(KeyCode::Right), now);
    app.handle_key(key(KeyCode::Enter), now);
    assert_eq!(
        app.controller().board().get(Position::MiddleRight),
        Cell::Occupied(Mark::X)
    );

    app.handle_key(key(KeyCode::Char('q')), now);
    assert!(app.should_quit());
}

#[test]
fn test_mouse_click_plays_cell_and_restart() {
    let mut app = offline_app(7);
    let now = Instant::now();
    render(&mut app);
    let layout = app.session().layout().expect("board layout");

    let target = CubeTransform::resting().project(cell_center(8));
    let (column, row) = layout.viewport.to_terminal(target).unwrap();

    app.handle_mouse(
        MouseEvent {
            kind: MouseEventKind::Moved,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        },
        now,
    );
    assert_eq!(app.session().hover(), Some(8));

    app.handle_mouse(click(column, row), now);
    assert_eq!(
        app.controller().board().get(Position::BottomRight),
        Cell::Occupied(Mark::X)
    );

    let generation = app.generation();
    let restart = layout.restart;
    app.handle_mouse(click(restart.x + restart.width / 2, restart.y + 1), now);
    assert_eq!(app.generation(), generation + 1);
    assert!(app.controller().board().cells().iter().all(|c| *c == Cell::Empty));
}

#[test]
fn test_status_line_after_game() {
    let mut app = offline_app(8);
    let mut now = Instant::now();
    app.play_cell(4, now);
    let outcome = drive_to_end(&mut app, &mut now);
    let text = render(&mut app);

    match outcome {
        GameOutcome::PlayerWin => {
            let code = app.controller().promo().unwrap().to_string();
            assert!(text.contains(&code));
            assert!(text.contains("Copy promo code"));
        }
        GameOutcome::OpponentWin => {
            assert!(text.contains("No luck"));
            assert!(text.contains("Play again"));
        }
        _ => {
            assert!(text.contains("Draw"));
            assert!(text.contains("Play again"));
        }
    }
}

/// Plays offline games from successive seeds until one ends with `wanted`.
fn finished_game(wanted: impl Fn(GameOutcome) -> bool) -> (App, Instant) {
    for seed in 0..500 {
        let mut app = offline_app(seed);
        let mut now = Instant::now();
        if wanted(drive_to_end(&mut app, &mut now)) {
            return (app, now);
        }
    }
    panic!("no seed produced the wanted outcome");
}

#[test]
fn test_copy_key_exposes_promo_code() {
    let mut fresh = offline_app(13);
    fresh.handle_key(key(KeyCode::Char('c')), Instant::now());
    assert_eq!(fresh.take_clipboard(), None);

    let (mut app, now) = finished_game(|o| o == GameOutcome::PlayerWin);
    let code = app.controller().promo().unwrap().to_string();
    assert_eq!(app.restart_label(), "Copy promo code (c)");

    app.handle_key(key(KeyCode::Char('c')), now);
    assert_eq!(app.take_clipboard(), Some(code.clone()));
    assert_eq!(app.take_clipboard(), None);
    assert!(app.promo_copied());
    assert!(app.status_line().contains("copied"));
    assert!(app.status_line().contains(&code));
    assert_eq!(app.restart_label(), "Play again (r)");
}

#[test]
fn test_win_button_copies_then_restarts() {
    let (mut app, now) = finished_game(|o| o == GameOutcome::PlayerWin);
    let code = app.controller().promo().unwrap().to_string();
    render(&mut app);
    let restart = app.session().layout().unwrap().restart;
    let generation = app.generation();

    app.handle_mouse(click(restart.x + restart.width / 2, restart.y + 1), now);
    assert_eq!(app.take_clipboard(), Some(code));
    assert_eq!(app.generation(), generation);

    render(&mut app);
    let restart = app.session().layout().unwrap().restart;
    app.handle_mouse(click(restart.x + restart.width / 2, restart.y + 1), now);
    assert_eq!(app.generation(), generation + 1);
    assert!(!app.promo_copied());
    assert_eq!(app.restart_label(), "Start over (r)");
}

#[test]
fn test_copy_does_nothing_without_a_win() {
    let (mut app, now) = finished_game(|o| o != GameOutcome::PlayerWin);
    assert!(!app.copy_promo());
    app.handle_key(key(KeyCode::Char('c')), now);
    assert_eq!(app.take_clipboard(), None);
    assert!(!app.promo_copied());
}

#[tokio::test]
async fn test_linked_games_notify_exactly_once() {
    for seed in 0..25 {
        let notifier = Arc::new(RecordingNotifier::default());
        let resolver = Arc::new(ScriptedResolver::new([Ok(Resolution::Found(DestinationId(99)))]));
        let mut app = linked_app(seed, notifier.clone(), resolver);

        type_and_submit(&mut app, "alice").await;
        settle(&mut app, |app| *app.screen() == Screen::Game).await;
        assert_eq!(app.destination(), Some(DestinationId(99)));
        assert_eq!(app.linked_as(), Some("alice"));

        let mut now = Instant::now();
        app.play_cell(Position::Center.to_index(), now);
        let outcome = drive_to_end(&mut app, &mut now);
        assert_eq!(outcome, evaluate(app.controller().board()));

        // Redraws and further ticks must not fire the effect again.
        for _ in 0..20 {
            render(&mut app);
            now += Duration::from_millis(100);
            app.tick(now);
        }
        for delivery in app.take_deliveries() {
            delivery.await.unwrap();
        }

        let sent = notifier.sent();
        match outcome {
            GameOutcome::Draw => assert!(sent.is_empty(), "seed {seed}"),
            GameOutcome::PlayerWin => {
                assert_eq!(sent.len(), 1, "seed {seed}");
                let code = app.controller().promo().unwrap().to_string();
                assert!(sent[0].0.contains(&code));
                assert_eq!(sent[0].1, DestinationId(99));
            }
            _ => assert_eq!(sent.len(), 1, "seed {seed}"),
        }
    }
}

#[tokio::test]
async fn test_polls_until_found_one_at_a_time() {
    let resolver = Arc::new(ScriptedResolver::new([
        Ok(Resolution::NotYetFound),
        Err("timeout".to_string()),
        Ok(Resolution::Found(DestinationId(12))),
    ]));
    let mut app = linked_app(9, Default::default(), resolver.clone());

    let text = render(&mut app);
    assert!(text.contains("Username"));

    type_and_submit(&mut app, "@bob").await;
    let text = render(&mut app);
    assert!(text.contains("https://t.me/promo_for_user_bot?start=bob"));

    settle(&mut app, |app| *app.screen() == Screen::Game).await;
    assert_eq!(resolver.calls(), 3);
    assert_eq!(app.destination(), Some(DestinationId(12)));
}

#[tokio::test]
async fn test_mismatch_is_shown_and_stops_polling() {
    let resolver = Arc::new(ScriptedResolver::new([Ok(Resolution::HandleMismatch {
        expected: "carol".to_string(),
        actual: "mallory".to_string(),
    })]));
    let mut app = linked_app(10, Default::default(), resolver.clone());

    type_and_submit(&mut app, "carol").await;
    settle(&mut app, |app| {
        matches!(app.screen(), Screen::Link(link) if matches!(link.status(), LinkStatus::Mismatch { .. }))
    })
    .await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    app.tick(Instant::now());
    assert_eq!(resolver.calls(), 1);
    assert_eq!(app.destination(), None);
    assert!(render(&mut app).contains("@mallory"));
}

#[tokio::test]
async fn test_stale_resolution_is_discarded() {
    let resolver = Arc::new(ScriptedResolver::new([Ok(Resolution::Found(DestinationId(5)))]));
    let mut app = linked_app(11, Default::default(), resolver.clone());

    type_and_submit(&mut app, "dave").await;
    app.tick(Instant::now()); // poll starts
    app.handle_key(key(KeyCode::Backspace), Instant::now()); // edit cancels it

    tokio::time::sleep(Duration::from_millis(30)).await;
    app.tick(Instant::now());

    assert_eq!(resolver.calls(), 1);
    assert_eq!(app.destination(), None);
    assert!(matches!(app.screen(), Screen::Link(_)));
}

#[tokio::test]
async fn test_escape_plays_unlinked() {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut app = linked_app(12, notifier.clone(), Default::default());
    app.handle_key(key(KeyCode::Esc), Instant::now());
    assert_eq!(app.screen(), &Screen::Game);

    let mut now = Instant::now();
    app.play_cell(4, now);
    drive_to_end(&mut app, &mut now);
    assert!(app.take_deliveries().is_empty());
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_finished_deliveries_are_pruned() {
    let notifier = Arc::new(RecordingNotifier::default());
    let resolver = Arc::new(ScriptedResolver::new([Ok(Resolution::Found(DestinationId(7)))]));
    let mut app = linked_app(14, notifier.clone(), resolver);

    type_and_submit(&mut app, "erin").await;
    settle(&mut app, |app| *app.screen() == Screen::Game).await;

    let mut now = Instant::now();
    let mut expected = 0;
    for _ in 0..40 {
        if drive_to_end(&mut app, &mut now) != GameOutcome::Draw {
            expected += 1;
        }
        for _ in 0..200 {
            if notifier.sent().len() == expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        assert_eq!(notifier.sent().len(), expected);
        tokio::time::sleep(Duration::from_millis(5)).await;
        if expected == 3 {
            break;
        }

        app.reset(now);
        for _ in 0..=FLIP_STEPS {
            now += Duration::from_millis(16);
            app.tick(now);
        }
    }

    assert_eq!(expected, 3);
    // Earlier handles were finished when the next game ended.
    assert_eq!(app.take_deliveries().len(), 1);
}
