//! # Light Baking
//!
//! Per-tile illumination from point lights with a blocky, axis-dependent
//! falloff. Values are baked into tiles and only recomputed when a light
//! source changes, either for the whole grid or for a window around the
//! change.

use crate::game::{Grid, Position};
use crate::utils::delta_xy;

/// Distance at which a light starts to fall off.
const FALLOFF_START: f64 = 7.0;

/// Per-axis distance beyond which an extra dampening factor applies.
const DAMPEN_START: f64 = 4.0;

/// A point light in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    pub x: f64,
    pub y: f64,
}

impl LightSource {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Contribution of a light at `(lx, ly)` to the cell at `(x, y)`.
///
/// # Examples
///
/// ```
/// use carotid::light_contribution;
///
/// assert_eq!(light_contribution(3.0, 3.0, 3.0, 3.0), 1.0);
/// assert!(light_contribution(3.0, 3.0, 23.0, 3.0) < 0.1);
/// ```
pub fn light_contribution(x: f64, y: f64, lx: f64, ly: f64) -> f64 {
    let (dx, dy) = delta_xy(x, y, lx, ly);
    let distance = dx + dy;
    let strength = if distance > 0.0 {
        (FALLOFF_START / distance).min(1.0)
    } else {
        1.0
    };

    let mut dampened = strength;
    if dx > DAMPEN_START {
        dampened *= 0.6 / (dx / DAMPEN_START);
    }
    if dy > DAMPEN_START {
        dampened *= 0.6 / (dy / DAMPEN_START);
    }

    (strength * 2.0 * dampened).clamp(0.0, 1.0)
}

/// Total light at a cell from every source, clamped to `[0, 1]`.
pub fn light_at(x: i32, y: i32, lights: &[LightSource]) -> f64 {
    lights
        .iter()
        .map(|light| light_contribution(x as f64, y as f64, light.x, light.y))
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

/// Recomputes light for every tile.
pub fn bake(grid: &mut Grid, lights: &[LightSource]) {
    for (y, row) in grid.tiles.iter_mut().enumerate() {
        for (x, tile) in row.iter_mut().enumerate() {
            tile.set_light(light_at(x as i32, y as i32, lights));
        }
    }
}

/// Recomputes light for cells with `x` in `cx-r..=cx+r` and `y` in `cy-r..=cy+r`.
///
/// Cells outside the grid are skipped. Within the window the result is
/// identical to a full [`bake`].
pub fn bake_partial(grid: &mut Grid, lights: &[LightSource], center: Position, radius: i32) {
    for y in (center.y - radius)..=(center.y + radius) {
        for x in (center.x - radius)..=(center.x + radius) {
            if let Some(tile) = grid.get_tile_mut(Position::new(x, y)) {
                tile.set_light(light_at(x, y, lights));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::game::Tile;

    fn open_grid(size: u32) -> Grid {
        let mut grid = Grid::new(size, size);
        for row in grid.tiles.iter_mut() {
            for tile in row.iter_mut() {
                *tile = Tile::floor();
            }
        }
        grid
    }

    #[test]
    fn test_contribution_saturates_at_source() {
        assert_eq!(light_contribution(5.0, 5.0, 5.0, 5.0), 1.0);
        assert_eq!(light_contribution(5.0, 6.0, 5.0, 5.0), 1.0);
    }

    #[test]
    fn test_contribution_decreases_with_distance() {
        let near = light_contribution(0.0, 0.0, 3.0, 3.0);
        let far = light_contribution(0.0, 0.0, 10.0, 10.0);
        let farther = light_contribution(0.0, 0.0, 20.0, 0.0);
        assert!(near > far);
        assert!(far >= farther);
        assert!(farther >= 0.0);
    }

    #[test]
    fn test_contribution_known_values() {
        // dx = 7: s = 1, d = 0.6 / 1.75
        let expected = 2.0 * (0.6 / 1.75);
        assert!((light_contribution(7.0, 0.0, 0.0, 0.0) - expected).abs() < 1e-12);

        // dx = 14: s = 0.5, d = 0.5 * 0.6 / 3.5
        let expected = 0.5 * 2.0 * (0.5 * 0.6 / 3.5);
        assert!((light_contribution(14.0, 0.0, 0.0, 0.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_light_sum_is_clamped() {
        let lights = vec![LightSource::new(2.0, 2.0); 5];
        assert_eq!(light_at(3, 3, &lights), 1.0);
        assert_eq!(light_at(3, 3, &[]), 0.0);
    }

    #[test]
    fn test_forced_light_overrides_bake() {
        let mut grid = open_grid(8);
        grid.get_tile_mut(Position::new(1, 1)).unwrap().forced_light = Some(0.3);
        bake(&mut grid, &[LightSource::new(1.0, 1.0)]);
        assert_eq!(grid.get_tile(Position::new(1, 1)).unwrap().light, 0.3);
        assert_eq!(grid.get_tile(Position::new(2, 1)).unwrap().light, 1.0);
    }

    #[test]
    fn test_partial_bake_matches_full_bake_in_window() {
        let lights = vec![LightSource::new(10.0, 12.0), LightSource::new(30.0, 5.0)];
        let mut full = open_grid(48);
        bake(&mut full, &lights);

        let mut partial = open_grid(48);
        let center = Position::new(20, 20);
        bake_partial(&mut partial, &lights, center, 16);

        for y in 4..36 {
            for x in 4..36 {
                let pos = Position::new(x, y);
                assert_eq!(
                    full.get_tile(pos).unwrap().light,
                    partial.get_tile(pos).unwrap().light
                );
            }
        }
        // Outside the window nothing was touched
        assert_eq!(partial.get_tile(Position::new(40, 40)).unwrap().light, 0.0);
    }

    #[test]
    fn test_light_is_negligible_past_bake_radius() {
        let edge = (config::LIGHT_BAKE_RADIUS + 1) as f64;
        for offset in [0.0, 0.5, 3.0, edge] {
            assert!(light_contribution(edge - 0.5, offset, 0.0, 0.0) < 1.0 / 255.0);
            assert!(light_contribution(offset, edge - 0.5, 0.0, 0.0) < 1.0 / 255.0);
        }
    }

    #[test]
    fn test_partial_bake_includes_far_edge() {
        let mut grid = open_grid(40);
        bake_partial(&mut grid, &[LightSource::new(10.0, 10.0)], Position::new(10, 10), 16);
        assert!(grid.get_tile(Position::new(26, 10)).unwrap().light > 0.0);
        assert!(grid.get_tile(Position::new(10, 26)).unwrap().light > 0.0);
        assert_eq!(grid.get_tile(Position::new(27, 10)).unwrap().light, 0.0);
    }

    #[test]
    fn test_partial_bake_near_edge_skips_missing_tiles() {
        let mut grid = open_grid(8);
        bake_partial(&mut grid, &[LightSource::new(0.0, 0.0)], Position::new(0, 0), 16);
        assert_eq!(grid.get_tile(Position::new(0, 0)).unwrap().light, 1.0);
    }
}
