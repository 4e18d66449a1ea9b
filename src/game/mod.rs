//! # Game Module
//!
//! Core simulation state and the systems that advance it each tick.
//!
//! This module contains the fundamental building blocks of Carotid:
//! - The tile grid and level representation
//! - Creeps, items, projectiles and the player
//! - Light baking, movement resolution and the creep behavior engine
//! - Scripted sequences and the per-tick `GameState`

pub mod creep;
pub mod entities;
pub mod lighting;
pub mod movement;
pub mod sequence;
pub mod settings;
pub mod state;
pub mod world;

pub use creep::*;
pub use entities::*;
pub use lighting::*;
pub use movement::*;
pub use sequence::*;
pub use settings::*;
pub use state::*;
pub use world::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an integer tile coordinate on the level grid.
///
/// # Examples
///
/// ```
/// use carotid::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let adjacent = pos.adjacent_positions();
/// assert_eq!(adjacent.len(), 8); // All 8 surrounding positions
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Returns the tile containing a world-space point.
    ///
    /// Entities are centered on their tile, so a point belongs to the tile
    /// whose center is nearest.
    ///
    /// # Examples
    ///
    /// ```
    /// use carotid::Position;
    ///
    /// assert_eq!(Position::from_world(2.4, 2.6), Position::new(2, 3));
    /// assert_eq!(Position::from_world(-0.4, 0.0), Position::new(0, 0));
    /// ```
    pub fn from_world(x: f64, y: f64) -> Self {
        Self::new((x + 0.5).floor() as i32, (y + 0.5).floor() as i32)
    }

    /// Returns the world-space center of this tile.
    pub fn to_world(self) -> (f64, f64) {
        (self.x as f64, self.y as f64)
    }

    /// Returns all 8 adjacent positions, clockwise from the top-left.
    pub fn adjacent_positions(self) -> [Position; 8] {
        [
            Position::new(self.x - 1, self.y - 1), // NW
            Position::new(self.x, self.y - 1),     // N
            Position::new(self.x + 1, self.y - 1), // NE
            Position::new(self.x + 1, self.y),     // E
            Position::new(self.x + 1, self.y + 1), // SE
            Position::new(self.x, self.y + 1),     // S
            Position::new(self.x - 1, self.y + 1), // SW
            Position::new(self.x - 1, self.y),     // W
        ]
    }

    /// Returns only the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1), // N
            Position::new(self.x - 1, self.y), // W
            Position::new(self.x + 1, self.y), // E
            Position::new(self.x, self.y + 1), // S
        ]
    }
}

/// Unique identifier for creeps and items.
pub type EntityId = Uuid;

/// Creates a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}
