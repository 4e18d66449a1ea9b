//! # Dungeon Generation
//!
//! Room-and-corridor layout on a coarse occupancy grid, upsampled into the
//! fine tile grid and finished into a playable [`Level`].
//!
//! The coarse grid keeps room placement cheap; every coarse cell becomes a
//! `DUNGEON_SCALE` x `DUNGEON_SCALE` block of tiles, which leaves corridors
//! wide enough for the wall classifier to decorate.

use crate::assets::AssetRegistry;
use crate::config::DUNGEON_SCALE;
use crate::game::{Creep, CreepKind, Grid, Level, Position};
use crate::generation::{
    classify_walls, doors_separated, install_doors, select_doors, GenerationConfig, Generator,
    Room,
};
use crate::{CarotidError, CarotidResult};
use log::{debug, info, warn};
use pathfinding::prelude::bfs_reach;
use rand::{rngs::StdRng, Rng};

/// Square boolean floor map at coarse resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    pub size: u32,
    cells: Vec<Vec<bool>>,
}

impl OccupancyGrid {
    /// Creates an all-solid grid.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            cells: vec![vec![false; size as usize]; size as usize],
        }
    }

    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.size && (pos.y as u32) < self.size
    }

    /// Returns true if the cell exists and is floor.
    pub fn is_floor(&self, pos: Position) -> bool {
        self.is_valid_position(pos) && self.cells[pos.y as usize][pos.x as usize]
    }

    /// Marks a cell as floor; positions off the grid are ignored.
    pub fn set_floor(&mut self, pos: Position) {
        if self.is_valid_position(pos) {
            self.cells[pos.y as usize][pos.x as usize] = true;
        }
    }

    pub fn floor_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&floor| floor).count()
    }

    /// Returns true if every floor cell is reachable from every other
    /// through edge-adjacent floor.
    pub fn is_connected(&self) -> bool {
        let start = (0..self.size as i32)
            .flat_map(|y| (0..self.size as i32).map(move |x| Position::new(x, y)))
            .find(|&pos| self.is_floor(pos));
        let Some(start) = start else {
            return false;
        };

        let reached = bfs_reach(start, |&pos| {
            pos.cardinal_adjacent_positions()
                .into_iter()
                .filter(|&next| self.is_floor(next))
                .collect::<Vec<_>>()
        })
        .count();
        reached == self.floor_count()
    }
}

/// Places rooms on the coarse grid and joins them with L-shaped corridors.
///
/// This generator:
/// 1. Places up to `room_count` rooms with collision detection and a margin
/// 2. Connects consecutive rooms with corridors
/// 3. Validates that the floor forms one connected region
#[derive(Debug, Clone)]
pub struct RoomCorridorGenerator {
    /// Empty cells kept between rooms
    pub room_margin: i32,
}

impl RoomCorridorGenerator {
    /// Creates a new dungeon generator with default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use carotid::generation::utils;
    /// use carotid::{GenerationConfig, Generator, RoomCorridorGenerator};
    ///
    /// let config = GenerationConfig::for_testing(3);
    /// let mut rng = utils::create_rng(&config);
    /// let occupancy = RoomCorridorGenerator::new().generate(&config, &mut rng).unwrap();
    /// assert!(occupancy.is_connected());
    /// ```
    pub fn new() -> Self {
        Self {
            room_margin: 1,
        }
    }

    /// Places rooms until `room_count` is reached or placements run out.
    fn place_rooms(
        &self,
        grid: &mut OccupancyGrid,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> CarotidResult<Vec<Room>> {
        let mut rooms: Vec<Room> = Vec::new();

        for room_id in 0..config.room_count {
            if let Some(room) = self.try_place_room(grid, config, rng, room_id, &rooms) {
                self.carve_room(grid, &room);
                rooms.push(room);
            }
        }

        if rooms.is_empty() {
            return Err(CarotidError::GenerationFailed(
                "Failed to place any rooms".to_string(),
            ));
        }

        debug!(
            "placed {} of {} rooms on a {}x{} coarse grid",
            rooms.len(),
            config.room_count,
            grid.size,
            grid.size
        );
        Ok(rooms)
    }

    /// Attempts to place a single room.
    fn try_place_room(
        &self,
        grid: &OccupancyGrid,
        config: &GenerationConfig,
        rng: &mut StdRng,
        room_id: u32,
        existing_rooms: &[Room],
    ) -> Option<Room> {
        for _ in 0..config.max_placement_attempts {
            let width = rng.gen_range(config.min_room_size..=config.max_room_size);
            let height = rng.gen_range(config.min_room_size..=config.max_room_size);
            let x = rng.gen_range(1..(grid.size as i32 - width as i32 - 1));
            let y = rng.gen_range(1..(grid.size as i32 - height as i32 - 1));
            let room = Room::new(room_id, Position::new(x, y), width, height);

            if !self.room_fits(grid, &room) {
                continue;
            }

            if existing_rooms
                .iter()
                .any(|existing| room.overlaps(existing, self.room_margin))
            {
                continue;
            }

            return Some(room);
        }

        None
    }

    /// Checks if a room leaves the outer ring of the grid solid.
    fn room_fits(&self, grid: &OccupancyGrid, room: &Room) -> bool {
        room.top_left.x >= 1
            && room.top_left.y >= 1
            && room.top_left.x + (room.width as i32) < grid.size as i32 - 1
            && room.top_left.y + (room.height as i32) < grid.size as i32 - 1
    }

    fn carve_room(&self, grid: &mut OccupancyGrid, room: &Room) {
        for pos in room.cells() {
            grid.set_floor(pos);
        }
    }

    /// Connects each room to the next one.
    fn connect_with_l_corridors(&self, grid: &mut OccupancyGrid, rooms: &[Room]) {
        for pair in rooms.windows(2) {
            self.carve_l_corridor(grid, pair[0].center(), pair[1].center());
        }
    }

    /// Carves an L-shaped corridor between two points.
    fn carve_l_corridor(&self, grid: &mut OccupancyGrid, start: Position, end: Position) {
        let (min_x, max_x) = (start.x.min(end.x), start.x.max(end.x));
        let (min_y, max_y) = (start.y.min(end.y), start.y.max(end.y));

        if start.x != end.x {
            // Horizontal first, then vertical along the end column
            for x in min_x..=max_x {
                grid.set_floor(Position::new(x, start.y));
            }
            for y in min_y..=max_y {
                grid.set_floor(Position::new(end.x, y));
            }
        } else {
            for y in min_y..=max_y {
                grid.set_floor(Position::new(start.x, y));
            }
            for x in min_x..=max_x {
                grid.set_floor(Position::new(x, end.y));
            }
        }
    }
}

impl Generator<OccupancyGrid> for RoomCorridorGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> CarotidResult<OccupancyGrid> {
        config.validate()?;
        let mut grid = OccupancyGrid::new(config.coarse_size());

        let rooms = self.place_rooms(&mut grid, config, rng)?;
        self.connect_with_l_corridors(&mut grid, &rooms);
        self.validate(&grid, config)?;

        Ok(grid)
    }

    fn validate(&self, grid: &OccupancyGrid, _config: &GenerationConfig) -> CarotidResult<()> {
        if grid.floor_count() == 0 {
            return Err(CarotidError::GenerationFailed(
                "Occupancy grid has no floor".to_string(),
            ));
        }
        if !grid.is_connected() {
            return Err(CarotidError::GenerationFailed(
                "Occupancy grid floor is not connected".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "RoomCorridorGenerator"
    }
}

impl Default for RoomCorridorGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Expands a coarse grid into fine tiles.
///
/// Fine cell `(x, y)` is floor when its coarse cell is floor, except on the
/// last row, which is always left solid so bottom walls have room.
pub fn upsample(
    occupancy: &OccupancyGrid,
    config: &GenerationConfig,
    assets: &AssetRegistry,
    rng: &mut StdRng,
) -> Grid {
    let size = config.level_size;
    let mut grid = Grid::new(size, size);

    for (y, row) in grid.tiles.iter_mut().enumerate() {
        for (x, tile) in row.iter_mut().enumerate() {
            let coarse = Position::new(
                (x as u32 / DUNGEON_SCALE) as i32,
                (y as u32 / DUNGEON_SCALE) as i32,
            );
            if (y as u32) < size - 1 && occupancy.is_floor(coarse) {
                tile.floor = true;
                let sprite = if rng.gen_range(0..config.floor_variant_chance) == 0 {
                    assets.floor_c
                } else {
                    assets.floor_a
                };
                tile.add_layer(sprite);
            }
        }
    }

    grid
}

/// Builds complete levels: layout, walls, doors, torches and light.
#[derive(Debug, Clone)]
pub struct LevelGenerator<'a> {
    pub assets: &'a AssetRegistry,
    pub level_number: u32,
    pub layout: RoomCorridorGenerator,
}

impl<'a> LevelGenerator<'a> {
    pub fn new(assets: &'a AssetRegistry, level_number: u32) -> Self {
        Self {
            assets,
            level_number,
            layout: RoomCorridorGenerator::new(),
        }
    }

    /// Runs the pipeline once.
    fn try_generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> CarotidResult<Level> {
        let occupancy = self.layout.generate(config, rng).map_err(|error| match error {
            CarotidError::GenerationFailed(reason) => CarotidError::GenerationFailed(format!(
                "{}: {}",
                self.layout.generator_type(),
                reason
            )),
            other => other,
        })?;
        let mut grid = upsample(&occupancy, config, self.assets, rng);
        let walls = classify_walls(&mut grid, self.assets);
        let doors = select_doors(
            &walls.entrance_candidates,
            &walls.exit_candidates,
            config.min_door_separation,
            config.max_placement_attempts,
            rng,
        )?;

        let mut level = Level::new(self.level_number, grid);
        for torch in &walls.torches {
            let creep = Creep::new(CreepKind::Torch, torch.x as f64, torch.y as f64)
                .with_random_frame(rng);
            level.add_creep(creep);
        }
        install_doors(&mut level, &doors, self.assets);
        level.bake_lightmap();

        self.validate(&level, config)?;
        debug!(
            "level {}: {} walls, {} torches, {} exit and {} entrance candidates",
            self.level_number,
            walls.wall_count,
            walls.torches.len(),
            walls.exit_candidates.len(),
            walls.entrance_candidates.len()
        );
        Ok(level)
    }
}

impl Generator<Level> for LevelGenerator<'_> {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> CarotidResult<Level> {
        config.validate()?;

        for attempt in 1..=config.max_generation_attempts {
            match self.try_generate(config, rng) {
                Ok(level) => {
                    info!(
                        "Generated level {} ({}x{}) on attempt {}",
                        self.level_number,
                        level.width(),
                        level.height(),
                        attempt
                    );
                    return Ok(level);
                }
                Err(CarotidError::GenerationFailed(reason)) => {
                    warn!(
                        "{} attempt {} for level {} failed: {}",
                        self.generator_type(),
                        attempt,
                        self.level_number,
                        reason
                    );
                }
                Err(other) => return Err(other),
            }
        }

        Err(CarotidError::GenerationFailed(format!(
            "level {} could not be generated in {} attempts",
            self.level_number, config.max_generation_attempts
        )))
    }

    fn validate(&self, level: &Level, config: &GenerationConfig) -> CarotidResult<()> {
        if level.grid.floor_count() == 0 {
            return Err(CarotidError::GenerationFailed(
                "Level has no floor tiles".to_string(),
            ));
        }
        if level.entrance == level.exit
            || !doors_separated(level.entrance, level.exit, config.min_door_separation)
        {
            return Err(CarotidError::GenerationFailed(format!(
                "entrance {:?} and exit {:?} are too close",
                level.entrance, level.exit
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "LevelGenerator"
    }
}
