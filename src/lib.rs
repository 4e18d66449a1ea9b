//! # Carotid
//!
//! A top-down dungeon survival game: procedurally generated crypts, baked
//! torchlight, and creeps that wander, hunt and flee on a fixed-rate tick.
//!
//! ## Architecture Overview
//!
//! The crate is split into the simulation core and thin adapters around it:
//!
//! - **Generation**: coarse room placement, upsampling, wall classification
//!   and entrance/exit selection, plus the spawn placement policy
//! - **Game**: the tile grid, light baker, creep behavior engine, movement
//!   resolver, scripted sequences and the per-tick `GameState`
//! - **Adapters**: input intent, audio requests, macroquad rendering and the
//!   scene/frame driver
//!
//! The core never touches devices. Each tick consumes a [`TickIntent`] and
//! produces a list of [`GameEvent`]s for the adapters to act on.

pub mod assets;
pub mod audio;
pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod scenes;
pub mod utils;

pub use assets::*;
pub use audio::*;
pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;
pub use utils::*;

/// Core error type for the Carotid engine.
#[derive(thiserror::Error, Debug)]
pub enum CarotidError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Configuration values cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// No valid spawn location was found
    #[error("No spawn location found after {attempts} attempts")]
    SpawnFailed { attempts: u32 },
}

/// Result type used throughout the Carotid codebase.
pub type CarotidResult<T> = Result<T, CarotidError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Simulation ticks per second
    pub const TICKS_PER_SECOND: u64 = 144;

    /// Fine tiles per coarse occupancy cell
    pub const DUNGEON_SCALE: u32 = 4;

    /// Pixel size of one tile in world space
    pub const TILE_SIZE: u32 = 32;

    /// Half-width of the window recomputed by a partial light bake.
    /// A single light contributes less than 1/255 past this distance.
    pub const LIGHT_BAKE_RADIUS: i32 = 40;

    /// Ticks between sweeps of inert creeps and consumed items
    pub const SWEEP_INTERVAL: u64 = 144;

    /// Default player starting health
    pub const DEFAULT_PLAYER_HEALTH: i32 = 3;

    /// Upper bound for rejection-sampling searches
    pub const MAX_SPAWN_ATTEMPTS: u32 = 10_000;
}
