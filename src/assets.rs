//! # Asset Registry
//!
//! Opaque sprite handles shared between the asset loader, the generator and
//! the renderer. The core stores these handles on tiles and creeps but never
//! interprets them.

use serde::{Deserialize, Serialize};

/// Opaque handle to a sprite owned by whatever loaded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteId(pub u32);

/// Environment sprites used while building levels.
///
/// Constructed once at startup and passed by reference to the generator,
/// so there is no global atlas to initialise before a level can be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRegistry {
    pub floor_a: SpriteId,
    pub floor_c: SpriteId,
    pub wall_top: SpriteId,
    pub wall_bottom: SpriteId,
    pub wall_bottom_left: SpriteId,
    pub wall_bottom_right: SpriteId,
    pub wall_left: SpriteId,
    pub wall_right: SpriteId,
    pub wall_pillar: SpriteId,
    pub door_closed: SpriteId,
    pub door_open: SpriteId,
    pub grass: SpriteId,
    pub crypt_wall: SpriteId,
    /// Layered onto the tile where a creep dies
    pub blood_splatter: SpriteId,
}

impl AssetRegistry {
    /// Creates a registry with sequential handles.
    ///
    /// # Examples
    ///
    /// ```
    /// use carotid::AssetRegistry;
    ///
    /// let assets = AssetRegistry::new();
    /// assert_ne!(assets.floor_a, assets.floor_c);
    /// ```
    pub fn new() -> Self {
        let mut next = 0;
        let mut id = || {
            next += 1;
            SpriteId(next)
        };

        Self {
            floor_a: id(),
            floor_c: id(),
            wall_top: id(),
            wall_bottom: id(),
            wall_bottom_left: id(),
            wall_bottom_right: id(),
            wall_left: id(),
            wall_right: id(),
            wall_pillar: id(),
            door_closed: id(),
            door_open: id(),
            grass: id(),
            crypt_wall: id(),
            blood_splatter: id(),
        }
    }

    /// Returns true if the sprite is one of the door variants.
    pub fn is_door(&self, sprite: SpriteId) -> bool {
        sprite == self.door_closed || sprite == self.door_open
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new()
    }
}
