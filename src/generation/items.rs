//! # Item Generation
//!
//! Pickups scattered through the level while it is played.

use crate::game::{EntityId, Item, ItemKind, Level};
use crate::generation::{find_spawn_location, SpawnPolicy};
use crate::CarotidResult;
use log::debug;
use rand::Rng;

/// Garlic or holy water with equal chance.
pub fn roll_item_kind<R: Rng + ?Sized>(rng: &mut R) -> ItemKind {
    if rng.gen_bool(0.5) {
        ItemKind::Garlic
    } else {
        ItemKind::HolyWater
    }
}

/// Places a random item on the level.
pub fn spawn_item<R: Rng + ?Sized>(
    level: &mut Level,
    player: (f64, f64),
    policy: &SpawnPolicy,
    rng: &mut R,
) -> CarotidResult<EntityId> {
    let (x, y) = find_spawn_location(&level.grid, player, &level.items, policy, rng)?;
    let kind = roll_item_kind(rng);
    debug!("spawned {:?} at ({}, {})", kind, x, y);
    Ok(level.add_item(Item::new(kind, x, y)))
}
