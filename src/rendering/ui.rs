//! # User Interface Elements
//!
//! Heads-up display, ending screens and the debug overlay.

use crate::game::{GamePhase, GameState, GameStatistics};
use macroquad::prelude::*;

/// Text overlay drawn on top of the level.
#[derive(Debug, Clone)]
pub struct Hud {
    pub font_size: f32,
    pub line_height: f32,
    /// Messages shown at the bottom of the screen
    pub visible_messages: usize,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Hud {
    pub fn new() -> Self {
        Self {
            font_size: 20.0,
            line_height: 22.0,
            visible_messages: 3,
        }
    }

    /// Draws the status panel and recent messages.
    pub fn render(&self, state: &GameState, messages: &[String]) {
        let mut y = self.line_height;
        for line in status_lines(state) {
            draw_text(&line, 10.0, y, self.font_size, WHITE);
            y += self.line_height;
        }

        let start = messages.len().saturating_sub(self.visible_messages);
        let bottom = screen_height() - self.line_height * self.visible_messages as f32;
        for (i, message) in messages[start..].iter().enumerate() {
            let y = bottom + i as f32 * self.line_height;
            draw_text(message, 10.0, y, self.font_size * 0.9, LIGHTGRAY);
        }

        if state.phase != GamePhase::Playing {
            self.render_ending_screen(state);
        }
    }

    /// Centered ending text for game over and the win screen.
    pub fn render_ending_screen(&self, state: &GameState) {
        if state.phase == GamePhase::Won && state.active_sequences() > 0 {
            return;
        }
        let lines = ending_lines(state.phase, &state.statistics, state.player.score);
        if state.phase == GamePhase::GameOver {
            draw_rectangle(0.0, 0.0, screen_width(), screen_height(), Color::new(0.0, 0.0, 0.0, 0.6));
        }

        let mut y = screen_height() / 2.0 - self.line_height * lines.len() as f32 / 2.0;
        for line in &lines {
            let size = measure_text(line, None, self.font_size as u16, 1.0);
            draw_text(line, (screen_width() - size.width) / 2.0, y, self.font_size, WHITE);
            y += self.line_height;
        }
    }

    pub fn render_debug_overlay(&self, state: &GameState) {
        let x = screen_width() - 260.0;
        let mut y = self.line_height;
        for line in debug_lines(state) {
            draw_text(&line, x, y, self.font_size * 0.8, YELLOW);
            y += self.line_height * 0.8;
        }
    }
}

/// Health, score and progress for the status panel.
pub fn status_lines(state: &GameState) -> Vec<String> {
    let player = &state.player;
    let mut lines = vec![
        format!("Health: {}/{}", player.health.max(0), player.max_health),
        format!("Score: {}", player.score),
    ];

    if state.phase == GamePhase::Playing {
        let level = &state.level;
        lines.push(format!("Level: {}/{}", level.number, state.settings.level_count()));
        if level.exit_open {
            lines.push("Exit: open".to_string());
        } else {
            lines.push(format!(
                "Souls: {}/{}",
                level.souls_cleared.min(level.required_souls),
                level.required_souls
            ));
        }
    }

    if player.status.is_repelled(state.tick) {
        lines.push("Garlic".to_string());
    }
    let flags = state.flags;
    if flags.god || flags.noclip {
        let mut modes = Vec::new();
        if flags.god {
            modes.push("god");
        }
        if flags.noclip {
            modes.push("noclip");
        }
        lines.push(format!("[{}]", modes.join(" ")));
    }
    lines
}

/// Text for the end of a run.
pub fn ending_lines(phase: GamePhase, statistics: &GameStatistics, score: u64) -> Vec<String> {
    let title = match phase {
        GamePhase::Playing => return Vec::new(),
        GamePhase::GameOver => "GAME OVER",
        GamePhase::Won => "YOU ESCAPED",
    };
    vec![
        title.to_string(),
        format!("Score: {}", score),
        format!(
            "Creeps slain: {}  Souls freed: {}",
            statistics.creeps_killed, statistics.souls_rescued
        ),
        format!("Deepest level: {}", statistics.max_depth_reached),
        "Press Enter to play again".to_string(),
    ]
}

fn debug_lines(state: &GameState) -> Vec<String> {
    let level = &state.level;
    vec![
        format!("tick {}", state.tick),
        format!("pos {:.2}, {:.2}", state.player.x, state.player.y),
        format!("creeps {} torches {}", level.mobile_creep_count(), level.torch_count()),
        format!("items {} shots {}", level.live_item_count(), state.projectiles.len()),
        format!("sequences {}", state.active_sequences()),
        format!("fps {}", get_fps()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetRegistry;
    use crate::game::{GameSettings, Grid, Level};

    fn state() -> GameState {
        let level = Level::new(1, Grid::new(8, 8));
        GameState::with_level(GameSettings::for_testing(1), AssetRegistry::new(), level)
    }

    #[test]
    fn test_status_lines_track_progress() {
        let mut state = state();
        state.level.souls_cleared = 2;
        state.flags.god = true;

        let lines = status_lines(&state);
        assert!(lines.contains(&"Health: 3/3".to_string()));
        assert!(lines.contains(&"Level: 1/2".to_string()));
        assert!(lines.contains(&"Souls: 2/3".to_string()));
        assert!(lines.contains(&"[god]".to_string()));

        state.level.exit_open = true;
        assert!(status_lines(&state).contains(&"Exit: open".to_string()));
    }

    #[test]
    fn test_ending_lines() {
        let statistics = GameStatistics::new();
        assert!(ending_lines(GamePhase::Playing, &statistics, 0).is_empty());
        let lines = ending_lines(GamePhase::GameOver, &statistics, 425);
        assert_eq!(lines[0], "GAME OVER");
        assert_eq!(lines[1], "Score: 425");
    }
}
