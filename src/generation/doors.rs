//! # Entrance and Exit Selection
//!
//! Picks the door pair from the wall candidates found during
//! classification, dresses the door tiles, and lights the entrance
//! hallway on levels past the first.

use crate::assets::AssetRegistry;
use crate::game::{Level, Position};
use crate::{CarotidError, CarotidResult};
use log::debug;
use rand::Rng;

/// Forced light for the entrance door cell and the two cells inward from it.
pub const ENTRANCE_HALLWAY_LIGHT: [f64; 3] = [0.3, 0.2, 0.1];

/// The chosen door cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorSelection {
    pub entrance: Position,
    pub exit: Position,
}

/// Returns true if two cells are further apart than `min_separation` on at least one axis.
pub fn doors_separated(a: Position, b: Position, min_separation: u32) -> bool {
    let min = min_separation as i32;
    (a.x - b.x).abs() > min || (a.y - b.y).abs() > min
}

/// Draws door pairs uniformly until one is far enough apart.
///
/// # Errors
///
/// Fails with `GenerationFailed` when either list is empty or no
/// separated pair turns up within `max_attempts` draws.
pub fn select_doors<R: Rng + ?Sized>(
    entrances: &[Position],
    exits: &[Position],
    min_separation: u32,
    max_attempts: u32,
    rng: &mut R,
) -> CarotidResult<DoorSelection> {
    if entrances.is_empty() || exits.is_empty() {
        return Err(CarotidError::GenerationFailed(format!(
            "no door candidates ({} entrances, {} exits)",
            entrances.len(),
            exits.len()
        )));
    }

    for attempt in 1..=max_attempts {
        let entrance = entrances[rng.gen_range(0..entrances.len())];
        let exit = exits[rng.gen_range(0..exits.len())];
        if entrance != exit && doors_separated(entrance, exit, min_separation) {
            debug!(
                "doors at {:?} and {:?} after {} draws",
                entrance, exit, attempt
            );
            return Ok(DoorSelection { entrance, exit });
        }
    }

    Err(CarotidError::GenerationFailed(format!(
        "no door pair separated by more than {} in {} draws",
        min_separation, max_attempts
    )))
}

/// Records the doors on the level and swaps in the door sprites.
///
/// The first level is entered from nowhere, so only later levels get a
/// visible entrance door and its lit hallway.
pub fn install_doors(level: &mut Level, doors: &DoorSelection, assets: &AssetRegistry) {
    level.entrance = doors.entrance;
    level.exit = doors.exit;

    let door_layers = vec![assets.floor_a, assets.door_closed];
    if let Some(tile) = level.grid.get_tile_mut(doors.exit) {
        tile.layers = door_layers.clone();
    }

    if level.number > 1 {
        if let Some(tile) = level.grid.get_tile_mut(doors.entrance) {
            tile.layers = door_layers;
        }
        for (step, light) in ENTRANCE_HALLWAY_LIGHT.iter().enumerate() {
            let pos = Position::new(doors.entrance.x, doors.entrance.y - step as i32);
            if let Some(tile) = level.grid.get_tile_mut(pos) {
                tile.forced_light = Some(*light);
                tile.light = *light;
            }
        }
    }
}
