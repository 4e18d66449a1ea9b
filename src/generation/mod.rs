//! # Generation Module
//!
//! Procedural content generation for levels, creeps and items.
//!
//! Levels are built in stages: rooms and corridors are carved into a coarse
//! occupancy grid, which is upsampled to the fine tile grid. Walls are then
//! classified from local floor patterns, the entrance and exit are picked
//! from the wall candidates, and the initial lightmap is baked. Creeps and
//! items are placed with a shared rejection-sampling policy.

pub mod doors;
pub mod dungeon;
pub mod encounters;
pub mod items;
pub mod spawn;
pub mod walls;

pub use doors::*;
pub use dungeon::*;
pub use encounters::*;
pub use items::*;
pub use spawn::*;
pub use walls::*;

use crate::config::DUNGEON_SCALE;
use crate::game::Position;
use crate::{CarotidError, CarotidResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// Controls level dimensions, room placement and door selection. Every
/// rejection loop driven by these values is bounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Fine tiles per side; must be divisible by the dungeon scale
    pub level_size: u32,
    /// Rooms attempted on the coarse grid
    pub room_count: u32,
    /// Minimum room side in coarse cells
    pub min_room_size: u32,
    /// Maximum room side in coarse cells
    pub max_room_size: u32,
    /// Attempts per room placement and per door pair draw
    pub max_placement_attempts: u32,
    /// Whole-pipeline retries before giving up
    pub max_generation_attempts: u32,
    /// Entrance and exit must be further apart than this on some axis
    pub min_door_separation: u32,
    /// One in N floor tiles get the variant sprite
    pub floor_variant_chance: u32,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use carotid::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert!(config.validate().is_ok());
    /// assert!(config.max_room_size >= config.min_room_size);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self::for_level(seed, 1)
    }

    /// Configuration for a numbered level.
    ///
    /// The first level is 336 tiles square with 33 rooms; every later level
    /// doubles both.
    pub fn for_level(seed: u64, level_number: u32) -> Self {
        let multiplier = level_number.clamp(1, 2);
        Self {
            seed,
            level_size: 336 * multiplier,
            room_count: 33 * multiplier,
            min_room_size: 3,
            max_room_size: 8,
            max_placement_attempts: 1000,
            max_generation_attempts: 10,
            min_door_separation: 32,
            floor_variant_chance: 13,
        }
    }

    /// Creates a configuration for testing with smaller, simpler levels.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            level_size: 64,
            room_count: 6,
            min_room_size: 3,
            max_room_size: 5,
            max_placement_attempts: 200,
            max_generation_attempts: 25,
            min_door_separation: 8,
            floor_variant_chance: 13,
        }
    }

    /// Side length of the coarse occupancy grid.
    pub fn coarse_size(&self) -> u32 {
        self.level_size / DUNGEON_SCALE
    }

    /// Checks that the values describe a buildable level.
    pub fn validate(&self) -> CarotidResult<()> {
        if self.level_size == 0 || self.level_size % DUNGEON_SCALE != 0 {
            return Err(CarotidError::InvalidConfig(format!(
                "level size {} is not a positive multiple of {}",
                self.level_size, DUNGEON_SCALE
            )));
        }
        if self.min_room_size == 0 || self.min_room_size > self.max_room_size {
            return Err(CarotidError::InvalidConfig(format!(
                "room size range {}..={} is empty",
                self.min_room_size, self.max_room_size
            )));
        }
        if self.max_room_size + 2 >= self.coarse_size() {
            return Err(CarotidError::InvalidConfig(format!(
                "rooms of size {} do not fit a {}x{} coarse grid",
                self.max_room_size,
                self.coarse_size(),
                self.coarse_size()
            )));
        }
        if self.room_count == 0 || self.max_placement_attempts == 0 || self.max_generation_attempts == 0 {
            return Err(CarotidError::InvalidConfig(
                "room count and attempt limits must be positive".to_string(),
            ));
        }
        if self.floor_variant_chance == 0 {
            return Err(CarotidError::InvalidConfig(
                "floor variant chance must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// A rectangular room on the coarse occupancy grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique identifier for this room
    pub id: u32,
    /// Top-left corner of the room
    pub top_left: Position,
    pub width: u32,
    pub height: u32,
}

impl Room {
    /// Creates a new room with the given parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use carotid::{Position, Room};
    ///
    /// let room = Room::new(1, Position::new(5, 5), 10, 8);
    /// assert_eq!(room.id, 1);
    /// assert_eq!(room.width, 10);
    /// assert_eq!(room.height, 8);
    /// ```
    pub fn new(id: u32, top_left: Position, width: u32, height: u32) -> Self {
        Self {
            id,
            top_left,
            width,
            height,
        }
    }

    /// Gets the center position of the room.
    pub fn center(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 / 2,
            self.top_left.y + self.height as i32 / 2,
        )
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    /// Checks if this room, grown by `margin` cells on every side, overlaps another room.
    pub fn overlaps(&self, other: &Room, margin: i32) -> bool {
        !(self.top_left.x - margin >= other.top_left.x + other.width as i32
            || other.top_left.x >= self.top_left.x + self.width as i32 + margin
            || self.top_left.y - margin >= other.top_left.y + other.height as i32
            || other.top_left.y >= self.top_left.y + self.height as i32 + margin)
    }

    /// Every cell covered by the room.
    pub fn cells(&self) -> Vec<Position> {
        let mut positions = Vec::with_capacity(self.area() as usize);
        for y in self.top_left.y..(self.top_left.y + self.height as i32) {
            for x in self.top_left.x..(self.top_left.x + self.width as i32) {
                positions.push(Position::new(x, y));
            }
        }
        positions
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> CarotidResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> CarotidResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }
}
