//! Presentation state that belongs to the terminal session, not the game.

use super::cube::{CubeTransform, Point2, Viewport};
use cubetoe_core::Position;
use ratatui::layout::Rect;

/// Steps in the reset flip.
pub const FLIP_STEPS: u32 = 30;
/// Steps in the victory shake.
pub const SHAKE_STEPS: u32 = 20;
/// Largest shake displacement, in world units.
pub const SHAKE_AMPLITUDE: f64 = 12.0;

/// Where things ended up on screen in the last frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLayout {
    /// Canvas the cube is drawn on.
    pub viewport: Viewport,
    /// Restart control.
    pub restart: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Flip {
    direction: f64,
    degrees: f64,
}

/// Transient UI state: cursor, hover, animations, last layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    cursor: Position,
    hover: Option<usize>,
    flip: Option<Flip>,
    shake_offset: Option<Point2>,
    games_started: u64,
    layout: Option<FrameLayout>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            cursor: Position::Center,
            hover: None,
            flip: None,
            shake_offset: None,
            games_started: 0,
            layout: None,
        }
    }
}

impl SessionContext {
    /// Keyboard cursor.
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Moves the keyboard cursor.
    pub fn set_cursor(&mut self, cursor: Position) {
        self.cursor = cursor;
    }

    /// Cell under the mouse pointer.
    pub fn hover(&self) -> Option<usize> {
        self.hover
    }

    /// Records the cell under the mouse pointer.
    pub fn set_hover(&mut self, hover: Option<usize>) {
        self.hover = hover;
    }

    /// Pose of the cube for the next frame.
    pub fn transform(&self) -> CubeTransform {
        CubeTransform::with(
            self.flip.map_or(0.0, |f| f.degrees),
            self.shake_offset.unwrap_or((0.0, 0.0)),
        )
    }

    /// True while the reset flip is running; clicks are ignored meanwhile.
    pub fn is_flipping(&self) -> bool {
        self.flip.is_some()
    }

    /// True while the victory shake is running.
    pub fn is_shaking(&self) -> bool {
        self.shake_offset.is_some()
    }

    /// Starts a flip, alternating direction with every new game.
    pub fn start_flip(&mut self) {
        self.games_started += 1;
        let direction = if self.games_started % 2 == 1 { 1.0 } else { -1.0 };
        self.flip = Some(Flip {
            direction,
            degrees: 0.0,
        });
    }

    /// Sets the flip to `eased` (0 to 1) of a full turn.
    pub fn set_flip_progress(&mut self, eased: f64) {
        if let Some(flip) = &mut self.flip {
            flip.degrees = eased * 360.0 * flip.direction;
        }
    }

    /// Direction of the running flip, if any.
    pub fn flip_direction(&self) -> Option<f64> {
        self.flip.map(|f| f.direction)
    }

    /// Ends the flip and returns the cube to rest.
    pub fn end_flip(&mut self) {
        self.flip = None;
    }

    /// Sets the shake displacement.
    pub fn set_shake(&mut self, offset: Point2) {
        self.shake_offset = Some(offset);
    }

    /// Ends the shake.
    pub fn end_shake(&mut self) {
        self.shake_offset = None;
    }

    /// Layout of the last frame.
    pub fn layout(&self) -> Option<FrameLayout> {
        self.layout
    }

    /// Stores the layout of the frame just drawn.
    pub fn set_layout(&mut self, layout: Option<FrameLayout>) {
        self.layout = layout;
    }

    /// Clears per-game state on reset.
    pub fn clear_round(&mut self) {
        self.hover = None;
        self.shake_offset = None;
        self.flip = None;
    }
}
