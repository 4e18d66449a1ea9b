//! # Wall Classification
//!
//! Every non-floor cell touching floor becomes a wall, and its structural
//! role is read from its own eight neighbors. The role decides which
//! sprite layers the tile carries, where torches hang, and which walls can
//! hold the entrance and exit doors.

use crate::assets::{AssetRegistry, SpriteId};
use crate::game::{Grid, Position, WallRole};

/// Which of a cell's eight neighbors are floor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeighborPattern {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
    pub top_left: bool,
    pub top_right: bool,
    pub bottom_left: bool,
    pub bottom_right: bool,
}

/// Role plus layering decided for one wall cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub role: WallRole,
    /// Side walls over a floor run get a bottom layer beneath them
    pub stacked_bottom: bool,
}

impl NeighborPattern {
    /// Samples the floor pattern around `pos`; off-grid neighbors count as solid.
    pub fn sample(grid: &Grid, pos: Position) -> Self {
        let floor = |dx: i32, dy: i32| grid.is_floor_cell(Position::new(pos.x + dx, pos.y + dy));
        Self {
            top: floor(0, -1),
            bottom: floor(0, 1),
            left: floor(-1, 0),
            right: floor(1, 0),
            top_left: floor(-1, -1),
            top_right: floor(1, -1),
            bottom_left: floor(-1, 1),
            bottom_right: floor(1, 1),
        }
    }

    /// Decides the role for a wall with this pattern. The first matching rule wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use carotid::{NeighborPattern, WallRole};
    ///
    /// // Floor directly below and along both lower diagonals: a plain top wall
    /// let pattern = NeighborPattern {
    ///     bottom: true,
    ///     bottom_left: true,
    ///     bottom_right: true,
    ///     ..NeighborPattern::default()
    /// };
    /// assert_eq!(pattern.classify().role, WallRole::Top);
    /// ```
    pub fn classify(&self) -> Classification {
        let is_top = !self.top && self.bottom;
        let is_left = (self.left || self.bottom_left) && !self.right && !self.bottom_right && !self.bottom;
        let is_right = (self.right || self.bottom_right) && !self.left && !self.bottom_left && !self.bottom;
        let is_bottom_right = !self.top_left
            && !self.top
            && self.top_right
            && !self.bottom_left
            && !self.bottom
            && !self.bottom_right;
        let is_bottom_left = self.top_left
            && !self.top
            && !self.top_right
            && !self.bottom_left
            && !self.bottom
            && !self.bottom_right;
        let is_bottom = self.top && !self.bottom;

        let plain = |role| Classification {
            role,
            stacked_bottom: false,
        };

        if is_top {
            if !self.bottom_left || !self.bottom_right || self.left || self.right {
                plain(WallRole::Pillar)
            } else {
                plain(WallRole::Top)
            }
        } else if is_left {
            Classification {
                role: WallRole::Left,
                stacked_bottom: is_bottom,
            }
        } else if is_right {
            Classification {
                role: WallRole::Right,
                stacked_bottom: is_bottom,
            }
        } else if is_bottom_right {
            plain(WallRole::BottomRight)
        } else if is_bottom_left {
            plain(WallRole::BottomLeft)
        } else if is_bottom {
            plain(WallRole::Bottom)
        } else {
            plain(WallRole::Solid)
        }
    }
}

/// Output of a classification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WallClassification {
    /// Pillar cells, each of which carries a torch
    pub torches: Vec<Position>,
    /// Top walls with a two-wide opening below
    pub exit_candidates: Vec<Position>,
    /// Bottom walls with a two-wide opening above
    pub entrance_candidates: Vec<Position>,
    pub wall_count: usize,
}

/// Marks and classifies every wall cell of the grid.
///
/// Floor is read-only here, so the role of a cell depends only on the floor
/// layout and never on the order cells are visited.
pub fn classify_walls(grid: &mut Grid, assets: &AssetRegistry) -> WallClassification {
    let mut result = WallClassification::default();

    for x in 0..grid.width as i32 {
        for y in 0..grid.height as i32 {
            let pos = Position::new(x, y);
            if !grid.is_floor_cell(pos) {
                continue;
            }

            for neighbor in pos.adjacent_positions() {
                let is_unclaimed = grid
                    .get_tile(neighbor)
                    .map(|tile| !tile.floor && !tile.wall)
                    .unwrap_or(false);
                if !is_unclaimed {
                    continue;
                }

                let classification = NeighborPattern::sample(grid, neighbor).classify();
                match classification.role {
                    WallRole::Pillar => result.torches.push(neighbor),
                    WallRole::Top if has_opening(grid, neighbor, 1) => {
                        result.exit_candidates.push(neighbor)
                    }
                    WallRole::Bottom if has_opening(grid, neighbor, -1) => {
                        result.entrance_candidates.push(neighbor)
                    }
                    _ => {}
                }

                if let Some(tile) = grid.get_tile_mut(neighbor) {
                    tile.wall = true;
                    tile.role = Some(classification.role);
                    tile.layers = wall_layers(classification, assets);
                }
                result.wall_count += 1;
            }
        }
    }

    result
}

/// Sprite layers for a classified wall, bottom first.
pub fn wall_layers(classification: Classification, assets: &AssetRegistry) -> Vec<SpriteId> {
    let mut layers = Vec::with_capacity(2);
    if classification.stacked_bottom {
        layers.push(assets.wall_bottom);
    }
    match classification.role {
        WallRole::Pillar => layers.push(assets.wall_pillar),
        WallRole::Top => layers.push(assets.wall_top),
        WallRole::Left => layers.push(assets.wall_left),
        WallRole::Right => layers.push(assets.wall_right),
        WallRole::BottomLeft => layers.push(assets.wall_bottom_left),
        WallRole::BottomRight => layers.push(assets.wall_bottom_right),
        WallRole::Bottom => layers.push(assets.wall_bottom),
        WallRole::Solid => {}
    }
    layers
}

/// Checks the 2x2 block of floor next to a wall, below it for `direction`
/// 1 and above it for -1.
fn has_opening(grid: &Grid, wall: Position, direction: i32) -> bool {
    [(0, 1), (0, 2), (1, 1), (1, 2)]
        .iter()
        .all(|&(dx, steps)| {
            grid.is_floor_cell(Position::new(wall.x + dx, wall.y + steps * direction))
        })
}
