//! Terminal UI for cubetoe.

mod app;
mod cube;
mod input;
mod link;
mod session;
mod ui;

pub use app::{App, Background, Screen, Services, Task, Timings};
pub use cube::{
    CUBE_SIZE, CubeTransform, FaceKind, Point2, ProjectedFace, SCALE, TILT_X_DEGREES,
    TILT_Y_DEGREES, Vec3, Viewport, cell_at, cell_center, cell_quad, ease_out_cubic,
    point_in_polygon, visible_faces,
};
pub use input::{digit_cell, move_cursor};
pub use link::{LinkAction, LinkScreen, LinkStatus};
pub use session::{FLIP_STEPS, FrameLayout, SHAKE_AMPLITUDE, SHAKE_STEPS, SessionContext};
pub use ui::draw;

use crate::config::AppConfig;
use crate::effects::EffectDispatcher;
use crate::relay::RelayClient;
use crate::telegram::{DestinationResolver, Notifier, TelegramClient};
use anyhow::Result;
use crossterm::{
    clipboard::CopyToClipboard,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use cubetoe_core::GameController;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

/// Longest the loop sleeps waiting for input.
const MAX_IDLE: Duration = Duration::from_millis(50);

/// Builds the collaborators the config points at.
///
/// A relay wins over a direct token. Returns `None` when neither is set.
pub fn build_services(config: &AppConfig) -> Result<Option<Services>> {
    let timeout = config.request_timeout();
    let (notifier, resolver): (Arc<dyn Notifier>, Arc<dyn DestinationResolver>) =
        if let Some(url) = config.relay_url() {
            info!(%url, "Using relay");
            let client = Arc::new(RelayClient::new(url.clone(), timeout)?);
            (client.clone(), client)
        } else if let Some(token) = config.bot_token() {
            info!("Using Bot API directly");
            let client = Arc::new(TelegramClient::new(config.api_base(), token, timeout)?);
            (client.clone(), client)
        } else {
            return Ok(None);
        };
    Ok(Some(Services::new(
        EffectDispatcher::new(notifier, timeout),
        resolver,
    )))
}

/// Runs the game until the player quits.
#[instrument(skip(config))]
pub async fn run_tui(config: AppConfig, seed: Option<u64>, offline: bool) -> Result<()> {
    // Log to a file so output does not tear the screen.
    let log_file = std::fs::File::create(config.log_file())?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!(?seed, offline, "Starting cubetoe");

    let config = if offline { config.offline() } else { config };
    if !config.has_collaborators() {
        warn!("No bot token or relay configured, notifications disabled");
    }
    let services = build_services(&config)?;
    let controller = match seed {
        Some(seed) => GameController::seeded(seed),
        None => GameController::from_os_rng(),
    };
    let mut app = App::new(
        controller,
        Timings::from(&config),
        services,
        config.bot_username(),
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Give in-flight notifications a chance to land before exiting.
    for delivery in app.take_deliveries() {
        if let Err(e) = delivery.await {
            warn!(error = %e, "Notification task failed");
        }
    }

    if let Err(err) = res {
        error!(error = ?err, "Game loop error");
        eprintln!("Error: {:?}", err);
    }

    info!("Goodbye");
    Ok(())
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        let mut layout = None;
        terminal.draw(|frame| layout = draw(frame, app))?;
        app.set_layout(layout);

        let now = Instant::now();
        let wait = app
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
            .unwrap_or(MAX_IDLE)
            .min(MAX_IDLE);

        if event::poll(wait)? {
            let now = Instant::now();
            match event::read()? {
                Event::Key(key) => app.handle_key(key, now),
                Event::Mouse(mouse) => app.handle_mouse(mouse, now),
                _ => {}
            }
        }

        if let Some(text) = app.take_clipboard()
            && let Err(e) = execute!(
                terminal.backend_mut(),
                CopyToClipboard::to_clipboard_from(text)
            )
        {
            warn!(error = %e, "Clipboard write failed");
        }

        app.tick(Instant::now());
        if app.should_quit() {
            return Ok(());
        }

        // Let background tasks run on a current-thread runtime.
        tokio::task::yield_now().await;
    }
}
