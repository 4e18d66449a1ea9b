//! # Scene Management System
//!
//! Drives the simulation from macroquad frames. Frames arrive at whatever
//! rate the display runs; the simulation always advances in fixed ticks.

use crate::audio::AudioSink;
use crate::game::{GameEvent, GamePhase, GameState};
use crate::input::{DebugToggles, InputHandler};
use crate::rendering::MacroquadDisplay;
use crate::{config, CarotidResult};
use log::{info, warn};
use macroquad::prelude::*;

/// Converts variable frame times into a whole number of fixed ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep {
    /// Seconds per tick
    pub step: f64,
    pub accumulator: f64,
    /// Upper bound on ticks per frame; excess time is dropped
    pub max_steps: u32,
}

impl FixedStep {
    pub fn new(ticks_per_second: u64, max_steps: u32) -> Self {
        Self {
            step: 1.0 / ticks_per_second as f64,
            accumulator: 0.0,
            max_steps,
        }
    }

    /// Adds a frame's elapsed time and returns how many ticks to run.
    ///
    /// # Examples
    ///
    /// ```
    /// use carotid::scenes::FixedStep;
    ///
    /// let mut step = FixedStep::new(100, 10);
    /// assert_eq!(step.advance(0.025), 2);
    /// assert_eq!(step.advance(0.005), 1);
    /// assert_eq!(step.advance(5.0), 10);
    /// ```
    pub fn advance(&mut self, dt: f64) -> u32 {
        self.accumulator += dt.max(0.0);
        let ticks = ((self.accumulator + 1e-9) / self.step).floor();
        let ticks = ticks.min(self.max_steps as f64) as u32;
        if ticks == self.max_steps {
            self.accumulator = 0.0;
        } else {
            self.accumulator = (self.accumulator - ticks as f64 * self.step).max(0.0);
        }
        ticks
    }
}

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneType {
    Playing,
    GameOver,
    Won,
}

impl From<GamePhase> for SceneType {
    fn from(phase: GamePhase) -> Self {
        match phase {
            GamePhase::Playing => SceneType::Playing,
            GamePhase::GameOver => SceneType::GameOver,
            GamePhase::Won => SceneType::Won,
        }
    }
}

/// The main scene manager that coordinates all game scenes.
pub struct SceneManager {
    current_scene: SceneType,
    game_state: GameState,
    display: MacroquadDisplay,
    input_handler: InputHandler,
    audio: Box<dyn AudioSink>,
    clock: FixedStep,
}

impl SceneManager {
    pub fn new(game_state: GameState, input_handler: InputHandler, audio: Box<dyn AudioSink>) -> Self {
        let mut display = MacroquadDisplay::new();
        display.add_message(format!(
            "Free {} souls to open the exit",
            game_state.level.required_souls
        ));
        display.add_message("WASD to move, mouse to aim and fire".to_string());

        Self {
            current_scene: SceneType::from(game_state.phase),
            game_state,
            display,
            input_handler,
            audio,
            clock: FixedStep::new(config::TICKS_PER_SECOND, config::TICKS_PER_SECOND as u32 / 4),
        }
    }

    /// Runs the main scene loop until the player quits.
    pub async fn run(&mut self) -> CarotidResult<()> {
        loop {
            if self.input_handler.quit_requested() {
                info!("quit requested");
                break;
            }

            match self.current_scene {
                SceneType::Playing | SceneType::Won => self.update_simulation()?,
                SceneType::GameOver => {}
            }
            if self.current_scene != SceneType::Playing && self.input_handler.restart_requested() {
                self.restart()?;
            }

            self.display.render_game(&self.game_state);
            next_frame().await;
        }
        Ok(())
    }

    fn update_simulation(&mut self) -> CarotidResult<()> {
        let ticks = self.clock.advance(get_frame_time() as f64);
        let mut intent = self.input_handler.read_intent();

        for _ in 0..ticks {
            let events = self.game_state.tick(&intent)?;
            self.dispatch(&events);
            // Toggles are edge-triggered; apply them once per frame
            intent.toggles = DebugToggles::default();
        }

        let scene = SceneType::from(self.game_state.phase);
        if scene != self.current_scene {
            info!("scene {:?} -> {:?}", self.current_scene, scene);
            self.current_scene = scene;
        }
        Ok(())
    }

    fn dispatch(&mut self, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::Sound(request) = event {
                self.audio.play(*request);
            }
        }
        self.display.record_events(events);
    }

    fn restart(&mut self) -> CarotidResult<()> {
        info!("restarting with seed {}", self.game_state.settings.seed);
        if let Err(err) = self.game_state.restart() {
            warn!("restart failed: {}", err);
            return Err(err);
        }
        self.current_scene = SceneType::Playing;
        self.clock.accumulator = 0.0;
        self.display.add_message("A new crypt".to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step_carries_remainder() {
        let mut clock = FixedStep::new(144, 36);
        let frame = 1.0 / 60.0;
        let total: u32 = (0..60).map(|_| clock.advance(frame)).sum();
        assert!((143..=145).contains(&total));
    }

    #[test]
    fn test_fixed_step_caps_long_frames() {
        let mut clock = FixedStep::new(144, 36);
        assert_eq!(clock.advance(10.0), 36);
        assert_eq!(clock.accumulator, 0.0);
        assert_eq!(clock.advance(-1.0), 0);
    }

    #[test]
    fn test_scene_follows_phase() {
        assert_eq!(SceneType::from(GamePhase::GameOver), SceneType::GameOver);
        assert_eq!(SceneType::from(GamePhase::Won), SceneType::Won);
    }
}
