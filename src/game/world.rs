//! # World Representation
//!
//! The tile grid and the level that owns it, along with the creeps and
//! items living on it.

use crate::assets::{AssetRegistry, SpriteId};
use crate::config;
use crate::game::{
    bake, bake_partial, Creep, CreepKind, EntityId, Item, LightSource, Position,
};
use crate::utils::within_square;
use serde::{Deserialize, Serialize};

/// Structural role assigned to a boundary cell by the wall classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallRole {
    /// Free-standing wall top; carries a torch
    Pillar,
    /// Wall above a floor run
    Top,
    /// Wall below a floor run
    Bottom,
    Left,
    Right,
    BottomLeft,
    BottomRight,
    /// Boundary cell whose pattern matches no decorative rule
    Solid,
}

/// A single cell of the level grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub floor: bool,
    pub wall: bool,
    pub role: Option<WallRole>,
    /// Baked illumination in `[0, 1]`
    pub light: f64,
    /// Authored light that replaces the baked value
    pub forced_light: Option<f64>,
    /// Visual layers, bottom first
    pub layers: Vec<SpriteId>,
}

impl Tile {
    /// Creates a walkable floor tile.
    pub fn floor() -> Self {
        Self {
            floor: true,
            ..Self::default()
        }
    }

    /// Returns true if the tile is neither floor nor wall.
    pub fn is_void(&self) -> bool {
        !self.floor && !self.wall
    }

    pub fn add_layer(&mut self, sprite: SpriteId) {
        self.layers.push(sprite);
    }

    /// Stores a baked light value, clamped to `[0, 1]`.
    ///
    /// A forced light always wins over the computed value.
    pub fn set_light(&mut self, value: f64) {
        let value = self.forced_light.unwrap_or(value);
        self.light = value.clamp(0.0, 1.0);
    }
}

/// Bounds-checked 2D board of tiles, indexed `[y][x]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub width: u32,
    pub height: u32,
    /// World pixels per tile
    pub tile_size: u32,
    pub tiles: Vec<Vec<Tile>>,
}

impl Grid {
    /// Creates a grid of void tiles.
    ///
    /// # Examples
    ///
    /// ```
    /// use carotid::{Grid, Position};
    ///
    /// let grid = Grid::new(8, 4);
    /// assert!(grid.get_tile(Position::new(7, 3)).is_some());
    /// assert!(grid.get_tile(Position::new(8, 0)).is_none());
    /// assert!(grid.get_tile(Position::new(-1, 0)).is_none());
    /// ```
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tile_size: config::TILE_SIZE,
            tiles: vec![vec![Tile::default(); width as usize]; height as usize],
        }
    }

    /// Checks if a position lies inside the grid.
    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Returns the tile at `pos`, or `None` when off the grid.
    pub fn get_tile(&self, pos: Position) -> Option<&Tile> {
        if !self.is_valid_position(pos) {
            return None;
        }
        self.tiles
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
    }

    /// Mutable variant of [`Grid::get_tile`].
    pub fn get_tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        if !self.is_valid_position(pos) {
            return None;
        }
        self.tiles
            .get_mut(pos.y as usize)
            .and_then(|row| row.get_mut(pos.x as usize))
    }

    /// Returns true if the cell exists and is floor.
    pub fn is_floor_cell(&self, pos: Position) -> bool {
        self.get_tile(pos).map(|tile| tile.floor).unwrap_or(false)
    }

    /// Returns true if the tile under a world-space point is floor.
    pub fn is_floor(&self, x: f64, y: f64) -> bool {
        self.is_floor_cell(Position::from_world(x, y))
    }

    /// Iterates every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height as i32).flat_map(move |y| (0..self.width as i32).map(move |x| Position::new(x, y)))
    }

    pub fn floor_count(&self) -> usize {
        self.tiles
            .iter()
            .flat_map(|row| row.iter())
            .filter(|tile| tile.floor)
            .count()
    }

    /// Clamps a world-space point to the grid extents.
    pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        let max_x = (self.width as f64 - 1.0).max(0.0);
        let max_y = (self.height as f64 - 1.0).max(0.0);
        (x.clamp(0.0, max_x), y.clamp(0.0, max_y))
    }
}

/// A generated level: the grid plus everything living on it.
///
/// The level never holds the player. Queries that need the player's
/// position take it as an argument.
#[derive(Debug, Clone)]
pub struct Level {
    /// 1-based level number
    pub number: u32,
    pub grid: Grid,
    pub creeps: Vec<Creep>,
    pub items: Vec<Item>,
    pub entrance: Position,
    pub exit: Position,
    /// Clears needed before the exit opens
    pub required_souls: u32,
    pub souls_cleared: u32,
    pub exit_open: bool,
}

impl Level {
    /// Creates a level around an existing grid.
    pub fn new(number: u32, grid: Grid) -> Self {
        Self {
            number,
            grid,
            creeps: Vec::new(),
            items: Vec::new(),
            entrance: Position::origin(),
            exit: Position::origin(),
            required_souls: 0,
            souls_cleared: 0,
            exit_open: false,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn width(&self) -> u32 {
        self.grid.width
    }

    pub fn height(&self) -> u32 {
        self.grid.height
    }

    /// Returns the tile at `pos`, or `None` when off the grid.
    pub fn get_tile(&self, pos: Position) -> Option<&Tile> {
        self.grid.get_tile(pos)
    }

    /// Where the player appears: just inside the entrance door.
    pub fn player_spawn(&self) -> (f64, f64) {
        (self.entrance.x as f64, (self.entrance.y - 1) as f64)
    }

    /// Active light sources: every live torch.
    pub fn light_sources(&self) -> Vec<LightSource> {
        self.creeps
            .iter()
            .filter(|creep| creep.is_alive() && creep.kind.emits_light())
            .map(|creep| LightSource::new(creep.x, creep.y))
            .collect()
    }

    /// Recomputes light for every tile.
    pub fn bake_lightmap(&mut self) {
        let lights = self.light_sources();
        bake(&mut self.grid, &lights);
    }

    /// Recomputes light in the window around a changed light source.
    pub fn bake_partial_lightmap(&mut self, center: Position) {
        let lights = self.light_sources();
        bake_partial(&mut self.grid, &lights, center, config::LIGHT_BAKE_RADIUS);
    }

    /// Adds a creep and returns its id.
    pub fn add_creep(&mut self, creep: Creep) -> EntityId {
        let id = creep.id;
        self.creeps.push(creep);
        id
    }

    /// Adds an item and returns its id.
    pub fn add_item(&mut self, item: Item) -> EntityId {
        let id = item.id;
        self.items.push(item);
        id
    }

    pub fn creep(&self, id: EntityId) -> Option<&Creep> {
        self.creeps.iter().find(|creep| creep.id == id)
    }

    pub fn creep_mut(&mut self, id: EntityId) -> Option<&mut Creep> {
        self.creeps.iter_mut().find(|creep| creep.id == id)
    }

    /// Live creeps that move on their own.
    pub fn mobile_creep_count(&self) -> usize {
        self.creeps
            .iter()
            .filter(|creep| creep.is_alive() && creep.kind.is_mobile())
            .count()
    }

    pub fn live_item_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_available()).count()
    }

    pub fn torch_count(&self) -> usize {
        self.creeps
            .iter()
            .filter(|creep| creep.is_alive() && creep.kind == CreepKind::Torch)
            .count()
    }

    /// Removes inert creeps and consumed items.
    ///
    /// Returns how many creeps and items were removed.
    pub fn sweep(&mut self) -> (usize, usize) {
        let creeps_before = self.creeps.len();
        let items_before = self.items.len();
        self.creeps.retain(|creep| creep.is_alive());
        self.items.retain(|item| item.is_available());
        (
            creeps_before - self.creeps.len(),
            items_before - self.items.len(),
        )
    }

    /// Opens the exit door.
    pub fn open_exit(&mut self, assets: &AssetRegistry) {
        self.exit_open = true;
        if let Some(tile) = self.grid.get_tile_mut(self.exit) {
            for layer in tile.layers.iter_mut() {
                if *layer == assets.door_closed {
                    *layer = assets.door_open;
                }
            }
        }
    }

    /// Returns true if a world-space point stands in the exit doorway.
    pub fn is_at_exit(&self, x: f64, y: f64) -> bool {
        let (ex, ey) = self.exit.to_world();
        within_square(x, y, ex, ey, 1.0)
    }
}
