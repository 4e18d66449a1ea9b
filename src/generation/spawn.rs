//! # Spawn Placement
//!
//! Rejection sampling for spawn points that are on floor, out of the
//! player's immediate reach, and clear of items.

use crate::config;
use crate::game::{Grid, Item, SpawnSettings};
use crate::utils::within_square;
use crate::{CarotidError, CarotidResult};
use rand::Rng;

/// Distance rules for one kind of spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPolicy {
    /// Rejected when within this distance of the player on both axes
    pub player_safe_space: f64,
    /// Rejected when within this distance of a live item on both axes
    pub item_safe_space: Option<f64>,
    pub max_attempts: u32,
}

impl SpawnPolicy {
    /// Policy shared by creep and item spawns.
    ///
    /// Both keep clear of the player and of live items, so new items never
    /// stack on old ones and creeps never appear on top of a pickup.
    pub fn from_settings(settings: &SpawnSettings) -> Self {
        Self {
            player_safe_space: settings.player_safe_space,
            item_safe_space: Some(settings.item_safe_space),
            max_attempts: settings.max_attempts,
        }
    }
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self {
            player_safe_space: 18.0,
            item_safe_space: Some(2.0),
            max_attempts: config::MAX_SPAWN_ATTEMPTS,
        }
    }
}

/// Finds a random floor point that satisfies the policy.
///
/// Candidates are drawn from the grid interior, one cell in from every edge.
///
/// # Errors
///
/// Returns `SpawnFailed` when `max_attempts` draws produce nothing usable.
pub fn find_spawn_location<R: Rng + ?Sized>(
    grid: &Grid,
    player: (f64, f64),
    items: &[Item],
    policy: &SpawnPolicy,
    rng: &mut R,
) -> CarotidResult<(f64, f64)> {
    let failed = CarotidError::SpawnFailed {
        attempts: policy.max_attempts,
    };
    if grid.width < 3 || grid.height < 3 {
        return Err(failed);
    }

    for _ in 0..policy.max_attempts {
        let x = (1 + rng.gen_range(0..grid.width - 2)) as f64;
        let y = (1 + rng.gen_range(0..grid.height - 2)) as f64;

        if !grid.is_floor(x, y) {
            continue;
        }
        if within_square(x, y, player.0, player.1, policy.player_safe_space) {
            continue;
        }
        if let Some(safe_space) = policy.item_safe_space {
            let crowded = items
                .iter()
                .any(|item| item.is_available() && within_square(x, y, item.x, item.y, safe_space));
            if crowded {
                continue;
            }
        }

        return Ok((x, y));
    }

    Err(failed)
}
