//! # Creep Behavior
//!
//! The per-creep state machine. Each tick a creep either keeps its current
//! velocity or picks a new action (wander or pursue), moves through the
//! collision resolver, and flees when something it fears is close.

use crate::game::{
    resolve_move, Creep, CreepKind, FloorProbe, Grid, Item, MoveOutcome, Player, SpeedEnvelope,
};
use crate::utils::{angle_between, delta_xy, normalize_angle, within_square};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Hostiles closer than this on both axes pursue every tick.
pub const SEEK_DISTANCE: f64 = 2.0;

/// A repelled player scares off hostiles within this distance.
pub const REPEL_DISTANCE: f64 = 3.0;

/// Hostiles keep this far from items.
pub const ITEM_REPEL_DISTANCE: f64 = 2.0;

/// Action cooldown set after choosing to pursue.
pub const SEEK_HOLD_TICKS: u32 = 1440;

const SEEK_GROWTH: f64 = 1.1;
const SEEK_SHRINK: f64 = 0.9;
const WANDER_SPREAD: f64 = 12.0;
const FLEE_SPREAD: f64 = 8.0;
const FLEE_MIN_SPEED: f64 = 0.001;

/// Distance from the grid edge at which wandering stops pushing outward.
const BOUNDARY_MARGIN: f64 = 2.0;

/// What a creep did on its last update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    Wander,
    Pursue,
    Flee,
    Disabled,
}

/// Snapshot of the player taken at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub repelled: bool,
}

impl PlayerView {
    pub fn from_player(player: &Player, now: u64) -> Self {
        Self {
            x: player.x,
            y: player.y,
            angle: player.angle,
            repelled: player.status.is_repelled(now),
        }
    }
}

/// Everything a creep reads during its update.
#[derive(Debug, Clone, Copy)]
pub struct CreepContext<'a> {
    pub grid: &'a Grid,
    pub items: &'a [Item],
    pub player: PlayerView,
}

/// Scales a direction until its magnitude lies inside the envelope.
///
/// Grows by 10% while too slow, then shrinks by 10% while too fast. A zero
/// or non-finite vector comes back as zero.
///
/// # Examples
///
/// ```
/// use carotid::{clamp_seek_velocity, CreepKind};
///
/// let envelope = CreepKind::Vampire.speed_envelope();
/// let (x, y) = clamp_seek_velocity(1.0, 0.0, envelope);
/// assert!(envelope.contains(x.hypot(y)));
/// assert_eq!(clamp_seek_velocity(0.0, 0.0, envelope), (0.0, 0.0));
/// ```
pub fn clamp_seek_velocity(x: f64, y: f64, envelope: SpeedEnvelope) -> (f64, f64) {
    let (mut x, mut y) = (x, y);
    let magnitude = |x: f64, y: f64| x.hypot(y);
    if !x.is_finite() || !y.is_finite() || magnitude(x, y) == 0.0 || envelope.max <= 0.0 {
        return (0.0, 0.0);
    }
    while magnitude(x, y) < envelope.min {
        x *= SEEK_GROWTH;
        y *= SEEK_GROWTH;
    }
    while magnitude(x, y) > envelope.max {
        x *= SEEK_SHRINK;
        y *= SEEK_SHRINK;
    }
    (x, y)
}

impl Creep {
    /// Advances the creep one tick and reports the behavior in effect.
    pub fn update<R: Rng + ?Sized>(&mut self, ctx: &CreepContext<'_>, rng: &mut R) -> Behavior {
        if !self.is_alive() || !self.kind.is_mobile() {
            return Behavior::Disabled;
        }
        self.tick += 1;

        let player = ctx.player;
        if self.kind == CreepKind::Ghost && self.is_watched(&player) {
            self.behavior = Behavior::Disabled;
            return self.behavior;
        }

        let hostile = self.kind.is_hostile();
        let (dx, dy) = delta_xy(self.x, self.y, player.x, player.y);
        if hostile && !player.repelled && dx < SEEK_DISTANCE && dy < SEEK_DISTANCE {
            self.seek(player.x, player.y);
        } else if self.tick >= self.next_action {
            self.choose_action(ctx, rng);
            self.tick = 0;
        }

        match resolve_move(
            ctx.grid,
            self.x,
            self.y,
            self.move_x,
            self.move_y,
            FloorProbe::Center,
            false,
        ) {
            MoveOutcome::Moved { x, y, .. } => {
                self.x = x;
                self.y = y;
            }
            MoveOutcome::Blocked => {
                self.next_action = 0;
                return self.behavior;
            }
        }

        if hostile && self.is_threatened(ctx) {
            self.run_away(player.x, player.y, rng);
        }
        self.behavior
    }

    /// Rolls the cooldown before the next action choice.
    pub fn queue_next_action<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (base, spread) = self.kind.action_cooldown();
        self.next_action = base + rng.gen_range(0..spread);
    }

    /// Points the creep at the player inside its speed envelope.
    pub fn seek(&mut self, player_x: f64, player_y: f64) {
        let (vx, vy) = if self.x == player_x && self.y == player_y {
            (0.0, 0.0)
        } else {
            let angle = angle_between(self.x, self.y, player_x, player_y);
            (-angle.cos(), -angle.sin())
        };
        let (vx, vy) = clamp_seek_velocity(vx, vy, self.kind.speed_envelope());
        self.move_x = vx;
        self.move_y = vy;
        self.next_action = SEEK_HOLD_TICKS;
        self.behavior = Behavior::Pursue;
    }

    /// Sends the creep directly away from the player at a random small speed.
    pub fn run_away<R: Rng + ?Sized>(&mut self, player_x: f64, player_y: f64, rng: &mut R) {
        self.queue_next_action(rng);
        let speed_x = ((rng.gen::<f64>() - 0.5) / FLEE_SPREAD).abs().max(FLEE_MIN_SPEED);
        let speed_y = ((rng.gen::<f64>() - 0.5) / FLEE_SPREAD).abs().max(FLEE_MIN_SPEED);
        self.move_x = if self.x - player_x < 0.0 { -speed_x } else { speed_x };
        self.move_y = if self.y - player_y < 0.0 { -speed_y } else { speed_y };
        self.behavior = Behavior::Flee;
    }

    /// Returns true while a ghost is inside the player's field of view.
    pub fn is_watched(&self, player: &PlayerView) -> bool {
        let toward_creep = angle_between(self.x, self.y, player.x, player.y);
        normalize_angle(toward_creep - player.angle).abs() < FRAC_PI_2
    }

    /// Returns true if the sprite should be mirrored to face the player.
    pub fn facing_left(&self, player_x: f64) -> bool {
        player_x < self.x
    }

    fn choose_action<R: Rng + ?Sized>(&mut self, ctx: &CreepContext<'_>, rng: &mut R) {
        self.queue_next_action(rng);
        let wander_x = (rng.gen::<f64>() - 0.5) / WANDER_SPREAD;
        let wander_y = (rng.gen::<f64>() - 0.5) / WANDER_SPREAD;

        let pursue = self.kind.is_hostile()
            && !ctx.player.repelled
            && self
                .kind
                .seek_chance()
                .map(|chance| rng.gen_range(0..chance) == 0)
                .unwrap_or(false);

        if pursue {
            self.seek(ctx.player.x, ctx.player.y);
        } else {
            self.move_x = wander_x;
            self.move_y = wander_y;
            self.keep_off_boundary(ctx.grid);
            self.behavior = Behavior::Wander;
        }
    }

    fn keep_off_boundary(&mut self, grid: &Grid) {
        let far_x = grid.width as f64 - 1.0 - BOUNDARY_MARGIN;
        let far_y = grid.height as f64 - 1.0 - BOUNDARY_MARGIN;
        if (self.x <= BOUNDARY_MARGIN && self.move_x < 0.0) || (self.x >= far_x && self.move_x > 0.0)
        {
            self.move_x = 0.0;
        }
        if (self.y <= BOUNDARY_MARGIN && self.move_y < 0.0) || (self.y >= far_y && self.move_y > 0.0)
        {
            self.move_y = 0.0;
        }
    }

    fn is_threatened(&self, ctx: &CreepContext<'_>) -> bool {
        let player = ctx.player;
        if player.repelled && within_square(self.x, self.y, player.x, player.y, REPEL_DISTANCE) {
            return true;
        }
        ctx.items.iter().any(|item| {
            item.is_available() && within_square(self.x, self.y, item.x, item.y, ITEM_REPEL_DISTANCE)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ItemKind, Position, Tile};
    use rand::{rngs::StdRng, SeedableRng};

    fn open_grid(size: u32) -> Grid {
        let mut grid = Grid::new(size, size);
        for y in 1..size as i32 - 1 {
            for x in 1..size as i32 - 1 {
                *grid.get_tile_mut(Position::new(x, y)).unwrap() = Tile::floor();
            }
        }
        grid
    }

    fn view(x: f64, y: f64) -> PlayerView {
        PlayerView {
            x,
            y,
            angle: 0.0,
            repelled: false,
        }
    }

    #[test]
    fn test_seek_velocity_within_envelope() {
        for kind in CreepKind::MOBILE {
            let mut creep = Creep::new(kind, 10.0, 10.0);
            creep.seek(13.0, 7.0);
            let speed = creep.move_x.hypot(creep.move_y);
            assert!(kind.speed_envelope().contains(speed), "{:?} {}", kind, speed);
            assert!(creep.move_x > 0.0);
            assert!(creep.move_y < 0.0);
            assert_eq!(creep.next_action, SEEK_HOLD_TICKS);
            assert_eq!(creep.behavior, Behavior::Pursue);
        }
    }

    #[test]
    fn test_close_pursuit_holds_without_rolling() {
        let grid = open_grid(20);
        let ctx = CreepContext {
            grid: &grid,
            items: &[],
            player: view(11.0, 10.5),
        };
        let mut creep = Creep::new(CreepKind::Vampire, 10.0, 10.0);
        let mut rng = StdRng::seed_from_u64(12);
        let mut untouched = rng.clone();

        assert_eq!(creep.update(&ctx, &mut rng), Behavior::Pursue);
        assert_eq!(creep.next_action, SEEK_HOLD_TICKS);
        assert_eq!(rng.gen::<u64>(), untouched.gen::<u64>());
    }

    #[test]
    fn test_seek_on_top_of_player_is_still() {
        let mut creep = Creep::new(CreepKind::Vampire, 4.0, 4.0);
        creep.seek(4.0, 4.0);
        assert_eq!((creep.move_x, creep.move_y), (0.0, 0.0));
    }

    #[test]
    fn test_run_away_moves_away_on_both_axes() {
        let mut rng = StdRng::seed_from_u64(11);
        for (px, py) in [(0.0, 0.0), (20.0, 20.0), (0.0, 20.0), (20.0, 0.0)] {
            let mut creep = Creep::new(CreepKind::Vampire, 10.0, 10.0);
            creep.run_away(px, py, &mut rng);
            assert_eq!(creep.move_x.signum(), (10.0 - px).signum());
            assert_eq!(creep.move_y.signum(), (10.0 - py).signum());
            assert!(creep.move_x.abs() <= 1.0 / 16.0);
            assert_eq!(creep.behavior, Behavior::Flee);
        }
    }

    #[test]
    fn test_inert_and_immobile_creeps_are_disabled() {
        let grid = open_grid(16);
        let ctx = CreepContext {
            grid: &grid,
            items: &[],
            player: view(8.0, 8.0),
        };
        let mut rng = StdRng::seed_from_u64(1);

        let mut torch = Creep::new(CreepKind::Torch, 5.0, 5.0);
        assert_eq!(torch.update(&ctx, &mut rng), Behavior::Disabled);
        assert_eq!(torch.tick, 0);

        let mut dead = Creep::new(CreepKind::Vampire, 5.0, 5.0);
        dead.health = 0;
        assert_eq!(dead.update(&ctx, &mut rng), Behavior::Disabled);
        assert_eq!((dead.x, dead.y), (5.0, 5.0));
    }

    #[test]
    fn test_close_hostile_pursues() {
        let grid = open_grid(16);
        let ctx = CreepContext {
            grid: &grid,
            items: &[],
            player: view(8.0, 8.0),
        };
        let mut rng = StdRng::seed_from_u64(2);
        let mut creep = Creep::new(CreepKind::Vampire, 7.0, 7.0);
        creep.next_action = 500;

        assert_eq!(creep.update(&ctx, &mut rng), Behavior::Pursue);
        assert!(creep.x > 7.0 && creep.y > 7.0);
    }

    #[test]
    fn test_repelled_player_is_not_pursued() {
        let grid = open_grid(16);
        let mut player = view(8.0, 8.0);
        player.repelled = true;
        let ctx = CreepContext {
            grid: &grid,
            items: &[],
            player,
        };
        let mut rng = StdRng::seed_from_u64(2);
        let mut creep = Creep::new(CreepKind::Vampire, 7.0, 7.0);
        creep.next_action = 500;

        assert_eq!(creep.update(&ctx, &mut rng), Behavior::Flee);
        assert!(creep.move_x < 0.0 && creep.move_y < 0.0);
    }

    #[test]
    fn test_watched_ghost_freezes() {
        let grid = open_grid(16);
        let mut rng = StdRng::seed_from_u64(4);
        let mut ghost = Creep::new(CreepKind::Ghost, 10.0, 8.0);
        ghost.move_x = 0.05;

        // Facing east, ghost is east of the player
        let ctx = CreepContext {
            grid: &grid,
            items: &[],
            player: view(6.0, 8.0),
        };
        assert_eq!(ghost.update(&ctx, &mut rng), Behavior::Disabled);
        assert_eq!(ghost.x, 10.0);

        // Facing west, ghost is free to move
        let mut player = view(6.0, 8.0);
        player.angle = std::f64::consts::PI;
        let ctx = CreepContext {
            grid: &grid,
            items: &[],
            player,
        };
        assert_ne!(ghost.update(&ctx, &mut rng), Behavior::Disabled);
        assert!(ghost.facing_left(6.0));
    }

    #[test]
    fn test_blocked_creep_chooses_again_next_tick() {
        let grid = open_grid(8);
        let ctx = CreepContext {
            grid: &grid,
            items: &[],
            player: view(1.0, 1.0),
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut creep = Creep::new(CreepKind::Soul, 6.0, 6.0);
        creep.move_x = 1.0;
        creep.move_y = 1.0;
        creep.next_action = 400;

        creep.update(&ctx, &mut rng);
        assert_eq!((creep.x, creep.y), (6.0, 6.0));
        assert_eq!(creep.next_action, 0);
    }

    #[test]
    fn test_wander_does_not_push_into_boundary() {
        let grid = open_grid(16);
        let ctx = CreepContext {
            grid: &grid,
            items: &[],
            player: view(12.0, 12.0),
        };
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..200 {
            let mut soul = Creep::new(CreepKind::Soul, 2.0, 2.0);
            soul.choose_action(&ctx, &mut rng);
            assert!(soul.move_x >= 0.0);
            assert!(soul.move_y >= 0.0);
            assert_eq!(soul.behavior, Behavior::Wander);
        }
    }

    #[test]
    fn test_hostile_flees_from_items() {
        let grid = open_grid(24);
        let items = vec![crate::game::Item::new(ItemKind::Garlic, 5.0, 5.0)];
        let ctx = CreepContext {
            grid: &grid,
            items: &items,
            player: view(20.0, 20.0),
        };
        let mut rng = StdRng::seed_from_u64(7);
        let mut creep = Creep::new(CreepKind::Bat, 6.0, 6.0);
        creep.next_action = 500;

        assert_eq!(creep.update(&ctx, &mut rng), Behavior::Flee);
    }

    #[test]
    fn test_queue_next_action_ranges() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut bat = Creep::new(CreepKind::Bat, 0.0, 0.0);
        let mut soul = Creep::new(CreepKind::Soul, 0.0, 0.0);
        for _ in 0..100 {
            bat.queue_next_action(&mut rng);
            soul.queue_next_action(&mut rng);
            assert!((288..576).contains(&bat.next_action));
            assert!((288..720).contains(&soul.next_action));
        }
    }
}
