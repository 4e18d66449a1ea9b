//! # Input Module
//!
//! Reads the keyboard and mouse and turns them into a [`TickIntent`]. The
//! simulation only ever sees the intent.

pub mod commands;

pub use commands::*;

use macroquad::prelude::*;

/// Keyboard and mouse reader.
///
/// The player is always drawn at the screen center, so the aim angle is the
/// direction from the center to the cursor.
pub struct InputHandler {
    /// Accept arrow keys as well as WASD
    pub arrow_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use carotid::InputHandler;
    ///
    /// let input_handler = InputHandler::new();
    /// assert!(input_handler.arrow_keys_enabled);
    /// ```
    pub fn new() -> Self {
        Self {
            arrow_keys_enabled: true,
        }
    }

    /// Builds the intent for the current frame.
    pub fn read_intent(&self) -> TickIntent {
        let left = is_key_down(KeyCode::A) || (self.arrow_keys_enabled && is_key_down(KeyCode::Left));
        let right =
            is_key_down(KeyCode::D) || (self.arrow_keys_enabled && is_key_down(KeyCode::Right));
        let up = is_key_down(KeyCode::W) || (self.arrow_keys_enabled && is_key_down(KeyCode::Up));
        let down =
            is_key_down(KeyCode::S) || (self.arrow_keys_enabled && is_key_down(KeyCode::Down));

        let (cursor_x, cursor_y) = mouse_position();
        let center = (screen_width() / 2.0, screen_height() / 2.0);

        TickIntent {
            move_x: axis(left, right),
            move_y: axis(up, down),
            angle: aim_angle((cursor_x, cursor_y), center),
            fire: is_mouse_button_down(MouseButton::Left) || is_key_down(KeyCode::Space),
            toggles: DebugToggles {
                god: is_key_pressed(KeyCode::G),
                noclip: is_key_pressed(KeyCode::N),
                fullbright: is_key_pressed(KeyCode::F),
                debug: is_key_pressed(KeyCode::V),
            },
        }
    }

    pub fn restart_requested(&self) -> bool {
        is_key_pressed(KeyCode::Enter)
    }

    pub fn quit_requested(&self) -> bool {
        is_key_pressed(KeyCode::Escape)
    }
}

/// Collapses a pair of opposing keys into -1, 0 or 1.
pub fn axis(negative: bool, positive: bool) -> f64 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

/// Angle in radians from `center` to `cursor`, in screen coordinates.
pub fn aim_angle(cursor: (f32, f32), center: (f32, f32)) -> f64 {
    let dy = (cursor.1 - center.1) as f64;
    let dx = (cursor.0 - center.0) as f64;
    dy.atan2(dx)
}
