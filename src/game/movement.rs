//! # Movement Resolution
//!
//! Axis-independent collision against floor tiles. A move is tried as a
//! whole, then along x only, then along y only, so entities slide along
//! walls instead of sticking to them.

use crate::game::Grid;

/// How an entity's footprint is tested against the floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FloorProbe {
    /// The tile under the entity's center
    Center,
    /// The four corners of a box with the given half extent
    Corners(f64),
}

/// Which part of a requested displacement was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveAxis {
    Both,
    XOnly,
    YOnly,
}

/// Result of [`resolve_move`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    Moved { x: f64, y: f64, axis: MoveAxis },
    Blocked,
}

impl MoveOutcome {
    /// Returns the resulting position, or `None` when blocked.
    pub fn position(self) -> Option<(f64, f64)> {
        match self {
            MoveOutcome::Moved { x, y, .. } => Some((x, y)),
            MoveOutcome::Blocked => None,
        }
    }
}

/// Checks whether an entity can stand at a world-space point.
pub fn is_walkable(grid: &Grid, x: f64, y: f64, probe: FloorProbe) -> bool {
    match probe {
        FloorProbe::Center => grid.is_floor(x, y),
        FloorProbe::Corners(half) => {
            grid.is_floor(x - half, y - half)
                && grid.is_floor(x + half, y - half)
                && grid.is_floor(x - half, y + half)
                && grid.is_floor(x + half, y + half)
        }
    }
}

/// Resolves a displacement against the grid.
///
/// # Examples
///
/// ```
/// use carotid::{resolve_move, FloorProbe, Grid, MoveAxis, MoveOutcome, Position, Tile};
///
/// let mut grid = Grid::new(4, 4);
/// for x in 0..4 {
///     *grid.get_tile_mut(Position::new(x, 1)).unwrap() = Tile::floor();
/// }
///
/// // Moving diagonally into a wall slides along the corridor
/// let outcome = resolve_move(&grid, 1.0, 1.0, 0.5, 0.5, FloorProbe::Center, false);
/// assert_eq!(outcome, MoveOutcome::Moved { x: 1.5, y: 1.0, axis: MoveAxis::XOnly });
/// ```
pub fn resolve_move(
    grid: &Grid,
    x: f64,
    y: f64,
    dx: f64,
    dy: f64,
    probe: FloorProbe,
    noclip: bool,
) -> MoveOutcome {
    if noclip || is_walkable(grid, x + dx, y + dy, probe) {
        return MoveOutcome::Moved {
            x: x + dx,
            y: y + dy,
            axis: MoveAxis::Both,
        };
    }
    if dx != 0.0 && is_walkable(grid, x + dx, y, probe) {
        return MoveOutcome::Moved {
            x: x + dx,
            y,
            axis: MoveAxis::XOnly,
        };
    }
    if dy != 0.0 && is_walkable(grid, x, y + dy, probe) {
        return MoveOutcome::Moved {
            x,
            y: y + dy,
            axis: MoveAxis::YOnly,
        };
    }
    MoveOutcome::Blocked
}
