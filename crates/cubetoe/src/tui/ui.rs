//! Stateless rendering.

use super::app::{App, Screen};
use super::cube::{
    FaceKind, Point2, Viewport, cell_quad, line_stroke, o_outline, visible_faces, x_strokes,
};
use super::link::{LinkScreen, LinkStatus};
use super::session::FrameLayout;
use cubetoe_core::{Cell, Mark, Phase, Position};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Wrap,
        canvas::{Canvas, Context, Line as Stroke},
    },
};

const TITLE: &str = "Cubetoe - Tic Tac Toe on a Cube";
const PINK: Color = Color::Rgb(0xE8, 0x8B, 0xC4);

/// Draws the current screen and returns where the interactive parts landed.
///
/// The link screen has no clickable parts and yields `None`.
pub fn draw(frame: &mut Frame, app: &App) -> Option<FrameLayout> {
    match app.screen() {
        Screen::Link(link) => {
            draw_link(frame, link);
            None
        }
        Screen::Game => Some(draw_game(frame, app)),
    }
}

fn draw_title(frame: &mut Frame, area: Rect, subtitle: Option<&str>) {
    let mut spans = vec![Span::styled(
        TITLE,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    if let Some(subtitle) = subtitle {
        spans.push(Span::styled(
            format!("  {}", subtitle),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let title = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(title, area);
}

fn draw_link(frame: &mut Frame, link: &LinkScreen) {
    let area = center_rect(frame.area(), 64, 16);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // Prompt
            Constraint::Length(3), // Input
            Constraint::Min(4),    // Status
            Constraint::Length(1), // Help
        ])
        .split(area);

    draw_title(frame, chunks[0], None);

    let prompt = Paragraph::new(format!(
        "Win and get a promo code in Telegram.\nEnter your Telegram username to link @{}.",
        link.bot_username()
    ))
    .alignment(Alignment::Center);
    frame.render_widget(prompt, chunks[1]);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("@", Style::default().fg(Color::DarkGray)),
        Span::raw(link.input()),
        Span::styled("_", Style::default().fg(PINK)),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" Username "));
    frame.render_widget(input, chunks[2]);

    let (text, style) = match link.status() {
        LinkStatus::Editing => (
            "Press Enter to continue.".to_string(),
            Style::default().fg(Color::Gray),
        ),
        LinkStatus::Invalid(reason) => (reason.clone(), Style::default().fg(Color::Red)),
        LinkStatus::Waiting { link: url, .. } => (
            format!(
                "Open this link and press Start:\n{}\n\nWaiting for the bot{}",
                url,
                ".".repeat(link.dots())
            ),
            Style::default().fg(Color::Yellow),
        ),
        LinkStatus::Mismatch { expected, actual } => (
            format!(
                "That /start came from @{} but you entered @{}.\nFix the username and press Enter.",
                if actual.is_empty() { "(no username)" } else { actual },
                expected
            ),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    };
    let status = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    frame.render_widget(status, chunks[3]);

    let help = Paragraph::new("Enter: link   Esc: play without Telegram   Ctrl-C: quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[4]);
}

fn draw_game(frame: &mut Frame, app: &App) -> FrameLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Min(10),   // Cube
            Constraint::Length(3), // Status
            Constraint::Length(3), // Restart
        ])
        .split(frame.area());

    let subtitle = app.linked_as().map(|h| format!("linked as @{}", h));
    draw_title(frame, chunks[0], subtitle.as_deref());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);

    let viewport = Viewport::new(inner);
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds(viewport.x_bounds())
        .y_bounds(viewport.y_bounds())
        .paint(|ctx| paint_cube(ctx, app));
    frame.render_widget(canvas, inner);

    let status = Paragraph::new(app.status_line())
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, chunks[2]);

    let label = app.restart_label();
    let restart = center_rect(chunks[3], label.len() as u16 + 6, 3);
    let button = Paragraph::new(label)
        .style(Style::default().fg(PINK).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(PINK)),
        );
    frame.render_widget(button, restart);

    FrameLayout { viewport, restart }
}

fn face_colors(kind: FaceKind) -> (Color, Color) {
    match kind {
        FaceKind::Front | FaceKind::Back => (Color::Rgb(0x6A, 0x7A, 0xC8), Color::Rgb(0x8A, 0x94, 0xB8)),
        FaceKind::Top => (Color::Rgb(0x2A, 0x35, 0x55), Color::Rgb(0x3A, 0x45, 0x75)),
        FaceKind::Bottom => (Color::Rgb(0x22, 0x27, 0x40), Color::Rgb(0x2A, 0x30, 0x50)),
        FaceKind::Right => (Color::Rgb(0x25, 0x2A, 0x45), Color::Rgb(0x2A, 0x30, 0x55)),
        FaceKind::Left => (Color::Rgb(0x28, 0x2D, 0x48), Color::Rgb(0x30, 0x35, 0x60)),
    }
}

fn stroke(ctx: &mut Context, (a, b): (Point2, Point2), color: Color) {
    ctx.draw(&Stroke::new(a.0, a.1, b.0, b.1, color));
}

fn outline(ctx: &mut Context, points: &[Point2], color: Color) {
    for (i, &a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        stroke(ctx, (a, b), color);
    }
}

fn paint_cube(ctx: &mut Context, app: &App) {
    let transform = app.session().transform();
    let controller = app.controller();

    for face in visible_faces(&transform) {
        let (edge, grid) = face_colors(face.kind);
        outline(ctx, &face.corners, edge);
        for line in face.grid() {
            stroke(ctx, line, grid);
        }
        if face.kind != FaceKind::Front {
            continue;
        }

        for pos in Position::ALL {
            let index = pos.to_index();
            match controller.board().get(pos) {
                Cell::Occupied(Mark::X) => {
                    for line in x_strokes(index, &transform) {
                        stroke(ctx, line, Color::Blue);
                    }
                }
                Cell::Occupied(Mark::O) => {
                    outline(ctx, &o_outline(index, 24, &transform), Color::Red);
                }
                Cell::Empty => {}
            }
        }

        let accepting = controller.phase() == Phase::AwaitingPlayerMove
            && !app.session().is_flipping();
        if accepting {
            if let Some(hover) = app.session().hover()
                && controller.board().cell(hover) == Some(Cell::Empty)
            {
                outline(ctx, &cell_quad(hover, 0.12, &transform), PINK);
            }
            let cursor = app.session().cursor().to_index();
            outline(ctx, &cell_quad(cursor, 0.05, &transform), Color::Yellow);
        }

        if let Some(line) = controller.winning_line() {
            let ends = line_stroke(line[0].to_index(), line[2].to_index(), &transform);
            stroke(ctx, ends, Color::LightYellow);
        }
    }
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
