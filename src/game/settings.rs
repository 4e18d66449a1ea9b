//! # Game Settings
//!
//! Tunable gameplay values, loadable from a JSON file. Anything missing
//! from the file keeps its default.

use crate::config;
use crate::generation::GenerationConfig;
use crate::{CarotidError, CarotidResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Periodic creep and item injection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Creeps spawned when a level is entered
    pub initial_creeps: u32,
    /// Items spawned when a level is entered
    pub initial_items: u32,
    /// Ticks between creep spawn checks
    pub creep_spawn_interval: u64,
    /// No spawns while this many mobile creeps are alive
    pub max_live_creeps: u32,
    /// Ticks between item spawn checks
    pub item_spawn_interval: u64,
    pub max_live_items: u32,
    pub player_safe_space: f64,
    pub item_safe_space: f64,
    pub max_attempts: u32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            initial_creeps: 120,
            initial_items: 20,
            creep_spawn_interval: config::TICKS_PER_SECOND / 2,
            max_live_creeps: 400,
            item_spawn_interval: config::TICKS_PER_SECOND * 5,
            max_live_items: 40,
            player_safe_space: 18.0,
            item_safe_space: 2.0,
            max_attempts: config::MAX_SPAWN_ATTEMPTS,
        }
    }
}

/// Top-level gameplay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub seed: u64,
    /// Clears needed to open the exit, per level; its length is the number of levels
    pub required_souls: Vec<u32>,
    pub player_max_health: i32,
    /// Ticks between shots
    pub weapon_cooldown: u64,
    /// Ticks garlic keeps hostiles away
    pub repel_duration: u64,
    /// Ticks of invulnerability after a bite
    pub invulnerability: u64,
    /// Overrides the level side length, mainly for small test levels
    pub level_size: Option<u32>,
    /// Overrides the room count
    pub room_count: Option<u32>,
    pub spawn: SpawnSettings,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            required_souls: vec![66, 666, 6666],
            player_max_health: config::DEFAULT_PLAYER_HEALTH,
            weapon_cooldown: 15,
            repel_duration: 7 * config::TICKS_PER_SECOND,
            invulnerability: config::TICKS_PER_SECOND,
            level_size: None,
            room_count: None,
            spawn: SpawnSettings::default(),
        }
    }
}

impl GameSettings {
    /// Settings for fast, small games used by tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            required_souls: vec![3, 5],
            level_size: Some(64),
            room_count: Some(6),
            spawn: SpawnSettings {
                initial_creeps: 4,
                initial_items: 2,
                max_live_creeps: 8,
                max_live_items: 3,
                player_safe_space: 6.0,
                ..SpawnSettings::default()
            },
            ..Self::default()
        }
    }

    /// Parses settings from JSON text and validates them.
    ///
    /// # Examples
    ///
    /// ```
    /// use carotid::GameSettings;
    ///
    /// let settings = GameSettings::from_json_str(r#"{ "seed": 7, "required_souls": [1, 2] }"#).unwrap();
    /// assert_eq!(settings.seed, 7);
    /// assert_eq!(settings.level_count(), 2);
    /// assert_eq!(settings.player_max_health, 3);
    /// ```
    pub fn from_json_str(json: &str) -> CarotidResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> CarotidResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Number of dungeon levels before the way out.
    pub fn level_count(&self) -> u32 {
        self.required_souls.len() as u32
    }

    /// Clears needed on a 1-based level; levels past the list reuse the last entry.
    pub fn required_souls_for(&self, level_number: u32) -> u32 {
        let index = (level_number.max(1) - 1) as usize;
        self.required_souls
            .get(index)
            .or_else(|| self.required_souls.last())
            .copied()
            .unwrap_or(0)
    }

    /// Generation parameters for a level, seeded per level.
    pub fn generation_config(&self, level_number: u32) -> GenerationConfig {
        let seed = self.seed.wrapping_add(level_number as u64);
        let mut config = GenerationConfig::for_level(seed, level_number);
        if let Some(level_size) = self.level_size {
            config = GenerationConfig {
                level_size,
                ..GenerationConfig::for_testing(seed)
            };
        }
        if let Some(room_count) = self.room_count {
            config.room_count = room_count;
        }
        config
    }

    pub fn validate(&self) -> CarotidResult<()> {
        if self.required_souls.is_empty() {
            return Err(CarotidError::InvalidConfig(
                "at least one level is required".to_string(),
            ));
        }
        if self.player_max_health <= 0 {
            return Err(CarotidError::InvalidConfig(format!(
                "player max health must be positive, got {}",
                self.player_max_health
            )));
        }
        if self.spawn.creep_spawn_interval == 0 || self.spawn.item_spawn_interval == 0 {
            return Err(CarotidError::InvalidConfig(
                "spawn intervals must be positive".to_string(),
            ));
        }
        self.generation_config(1).validate()
    }
}
