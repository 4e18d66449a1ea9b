//! # Encounter Generation
//!
//! Creep rosters and placement. Deeper levels unlock tougher kinds; a share
//! of every wave are souls waiting to be rescued.

use crate::game::{Creep, CreepKind, EntityId, Level};
use crate::generation::{find_spawn_location, SpawnPolicy};
use crate::CarotidResult;
use log::debug;
use rand::Rng;

/// One in N spawns is a soul.
pub const SOUL_CHANCE: u32 = 10;

/// Rolls the kind of a newly spawned creep for a level.
///
/// Bats join from level 2 and ghosts from level 3.
pub fn roll_creep_kind<R: Rng + ?Sized>(level_number: u32, rng: &mut R) -> CreepKind {
    if rng.gen_range(0..SOUL_CHANCE) == 0 {
        return CreepKind::Soul;
    }

    let mut pool = vec![CreepKind::Vampire];
    if level_number >= 2 {
        pool.push(CreepKind::Bat);
    }
    if level_number >= 3 {
        pool.push(CreepKind::Ghost);
    }
    pool[rng.gen_range(0..pool.len())]
}

/// Places a creep of the given kind on the level.
pub fn spawn_creep<R: Rng + ?Sized>(
    level: &mut Level,
    kind: CreepKind,
    player: (f64, f64),
    policy: &SpawnPolicy,
    rng: &mut R,
) -> CarotidResult<EntityId> {
    let (x, y) = find_spawn_location(&level.grid, player, &level.items, policy, rng)?;
    let mut creep = Creep::new(kind, x, y).with_random_frame(rng);
    creep.queue_next_action(rng);
    debug!("spawned {:?} at ({}, {})", kind, x, y);
    Ok(level.add_creep(creep))
}
