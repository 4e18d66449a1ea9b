//! # Rendering Module
//!
//! Shape-based macroquad rendering of the simulation. Nothing here mutates
//! the game state.

pub mod display;
pub mod ui;

pub use display::*;
pub use ui::*;
