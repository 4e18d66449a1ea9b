//! # Scripted Sequences
//!
//! Cinematics expressed as state machines that the tick loop steps once per
//! tick. Pauses are counted in ticks, so a sequence never outlives the
//! level it was started on and needs no locking.

use crate::assets::AssetRegistry;
use crate::game::{Creep, CreepKind, EntityId, Grid, Level, Player, Position, Tile, WallRole};
use log::debug;
use std::f64::consts::PI;
use std::fmt;

/// Mutable view handed to a sequence for one step.
pub struct SequenceScene<'a> {
    pub player: &'a mut Player,
    pub level: &'a mut Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStatus {
    Running,
    Finished,
}

/// A scripted sequence advanced one tick at a time.
pub trait Sequence: fmt::Debug {
    /// Applies one tick of the script.
    fn step(&mut self, scene: &mut SequenceScene<'_>) -> SequenceStatus;

    fn name(&self) -> &'static str;
}

/// Side length of the outdoor level shown after the last dungeon level.
pub const WIN_LEVEL_SIZE: u32 = 256;

/// Where the crypt door opens onto the ground.
const WIN_DOOR: (i32, i32) = (108, 108);
const GROUND_ROWS: i32 = 9;
const FACADE_SIZE: i32 = 64;

const WALK_SPEED: f64 = 0.05;
const WALK_OUT_TICKS: u32 = 36;
const SLOW_DOWN_TICKS: u32 = 288;
const TURN_AROUND_TICKS: u32 = 252;
const TORCH_DELAY_TICKS: u32 = 72;
const LEAVE_DELAY_TICKS: u32 = 144;
const SPEED_UP_TICKS: u32 = 144;
const WALK_AWAY_TICKS: u32 = 144 * 15;
const WEAPON_FLIGHT_TICKS: u32 = 288;
const TORCH_FLIGHT_TICKS: u32 = 432;

/// Builds the outdoor level: a strip of daylit ground in front of the crypt wall.
pub fn win_level(number: u32, assets: &AssetRegistry) -> Level {
    let mut grid = Grid::new(WIN_LEVEL_SIZE, WIN_LEVEL_SIZE);
    let (door_x, door_y) = WIN_DOOR;

    for y in door_y..door_y + GROUND_ROWS {
        for x in 0..WIN_LEVEL_SIZE as i32 {
            if let Some(tile) = grid.get_tile_mut(Position::new(x, y)) {
                *tile = Tile::floor();
                tile.forced_light = Some(1.0);
                tile.add_layer(assets.grass);
            }
        }
    }

    for y in (door_y - FACADE_SIZE)..door_y {
        for x in (door_x - FACADE_SIZE)..door_x {
            if let Some(tile) = grid.get_tile_mut(Position::new(x, y)) {
                tile.wall = true;
                tile.role = Some(WallRole::Solid);
                tile.add_layer(assets.crypt_wall);
            }
        }
    }

    let door = Position::new(door_x - 1, door_y - 1);
    if let Some(tile) = grid.get_tile_mut(door) {
        tile.add_layer(assets.door_open);
    }

    let mut level = Level::new(number, grid);
    level.entrance = door;
    level.exit = door;
    level.bake_lightmap();
    level
}

/// Player spawn point on the outdoor level, just outside the door.
pub fn win_level_spawn() -> (f64, f64) {
    (WIN_DOOR.0 as f64 - 0.4, WIN_DOOR.1 as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkAwayPhase {
    WalkOut(u32),
    SlowDown(u32),
    TurnAround(u32),
    ThrowWeapon,
    TorchDelay(u32),
    ThrowTorch,
    LeaveDelay(u32),
    SpeedUp(u32),
    WalkAway(u32),
    Done,
}

/// Something tossed back through the door.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Thrown {
    id: EntityId,
    step: u32,
    steps: u32,
}

/// The ending: walk out of the crypt, throw the weapon and torch back
/// through the door, and walk away.
#[derive(Debug, Clone)]
pub struct WalkAwaySequence {
    phase: WalkAwayPhase,
    door_x: f64,
    thrown: Vec<Thrown>,
}

impl WalkAwaySequence {
    pub fn new(door_x: f64) -> Self {
        Self {
            phase: WalkAwayPhase::WalkOut(0),
            door_x,
            thrown: Vec::new(),
        }
    }

    /// Returns true once the player has walked off.
    pub fn is_done(&self) -> bool {
        self.phase == WalkAwayPhase::Done && self.thrown.is_empty()
    }

    fn advance_phase(&mut self, scene: &mut SequenceScene<'_>) {
        use WalkAwayPhase::*;

        let player = &mut *scene.player;
        self.phase = match self.phase {
            WalkOut(step) => {
                player.x += WALK_SPEED;
                countdown(step, WALK_OUT_TICKS, WalkOut, SlowDown(0))
            }
            SlowDown(step) => {
                let remaining = (SLOW_DOWN_TICKS - step) as f64 / SLOW_DOWN_TICKS as f64;
                player.x += WALK_SPEED * remaining;
                countdown(step, SLOW_DOWN_TICKS, SlowDown, TurnAround(0))
            }
            TurnAround(step) => {
                player.angle = PI;
                countdown(step, TURN_AROUND_TICKS, TurnAround, ThrowWeapon)
            }
            ThrowWeapon => {
                player.weapon = None;
                let prop = Creep::new(CreepKind::Prop, player.x, player.y - 0.25);
                self.throw(scene.level, prop, WEAPON_FLIGHT_TICKS);
                TorchDelay(0)
            }
            TorchDelay(step) => countdown(step, TORCH_DELAY_TICKS, TorchDelay, ThrowTorch),
            ThrowTorch => {
                player.has_torch = false;
                let torch = Creep::new(CreepKind::Torch, player.x, player.y - 0.25);
                let at = Position::from_world(torch.x, torch.y);
                self.throw(scene.level, torch, TORCH_FLIGHT_TICKS);
                scene.level.bake_partial_lightmap(at);
                LeaveDelay(0)
            }
            LeaveDelay(step) => countdown(step, LEAVE_DELAY_TICKS, LeaveDelay, SpeedUp(0)),
            SpeedUp(step) => {
                player.angle = 0.0;
                player.x += WALK_SPEED * (step as f64 / SPEED_UP_TICKS as f64);
                countdown(step, SPEED_UP_TICKS, SpeedUp, WalkAway(0))
            }
            WalkAway(step) => {
                player.x += WALK_SPEED;
                if player.x > scene.level.width() as f64 {
                    Done
                } else {
                    countdown(step, WALK_AWAY_TICKS, WalkAway, Done)
                }
            }
            Done => Done,
        };
    }

    fn throw(&mut self, level: &mut Level, creep: Creep, steps: u32) {
        debug!("throwing {:?} from ({:.2}, {:.2})", creep.kind, creep.x, creep.y);
        let id = level.add_creep(creep);
        self.thrown.push(Thrown { id, step: 0, steps });
    }

    /// Moves every thrown object along its arc, dropping those that land or
    /// pass back through the door.
    fn advance_thrown(&mut self, level: &mut Level) {
        let door_x = self.door_x;
        let mut relight = Vec::new();

        self.thrown.retain_mut(|thrown| {
            let Some(creep) = level.creep_mut(thrown.id) else {
                return false;
            };
            if !creep.is_alive() || thrown.step >= thrown.steps {
                return false;
            }

            let before = Position::from_world(creep.x, creep.y);
            let emits_light = creep.kind.emits_light();
            if creep.x < door_x {
                creep.health = 0;
                if emits_light {
                    relight.push(before);
                }
                return false;
            }

            let i = thrown.step as f64;
            creep.x -= WALK_SPEED;
            if thrown.step < 100 {
                creep.y -= 0.005 * ((144.0 - i) / 144.0);
            } else {
                creep.y += 0.01 * ((288.0 - i) / 288.0);
            }
            creep.angle -= 0.1;
            thrown.step += 1;

            if emits_light {
                relight.push(before);
                relight.push(Position::from_world(creep.x, creep.y));
            }
            true
        });

        relight.dedup();
        for center in relight {
            level.bake_partial_lightmap(center);
        }
    }
}

fn countdown(
    step: u32,
    total: u32,
    running: fn(u32) -> WalkAwayPhase,
    next: WalkAwayPhase,
) -> WalkAwayPhase {
    if step + 1 >= total {
        next
    } else {
        running(step + 1)
    }
}

impl Sequence for WalkAwaySequence {
    fn step(&mut self, scene: &mut SequenceScene<'_>) -> SequenceStatus {
        self.advance_thrown(scene.level);
        self.advance_phase(scene);
        if self.is_done() {
            SequenceStatus::Finished
        } else {
            SequenceStatus::Running
        }
    }

    fn name(&self) -> &'static str {
        "WalkAwaySequence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Level, Player, WalkAwaySequence) {
        let assets = AssetRegistry::new();
        let level = win_level(4, &assets);
        let (x, y) = win_level_spawn();
        let player = Player::new(x, y, 3, 15);
        (level, player, WalkAwaySequence::new(x))
    }

    fn run_ticks(
        sequence: &mut WalkAwaySequence,
        level: &mut Level,
        player: &mut Player,
        ticks: u32,
    ) -> SequenceStatus {
        let mut status = SequenceStatus::Running;
        for _ in 0..ticks {
            let mut scene = SequenceScene {
                player: &mut *player,
                level: &mut *level,
            };
            status = sequence.step(&mut scene);
            if status == SequenceStatus::Finished {
                break;
            }
        }
        status
    }

    #[test]
    fn test_win_level_layout() {
        let (level, _, _) = setup();
        let (x, y) = win_level_spawn();
        assert!(level.grid.is_floor(x, y));
        assert_eq!(level.get_tile(Position::new(50, 110)).unwrap().light, 1.0);
        assert_eq!(level.get_tile(Position::new(100, 100)).unwrap().light, 0.0);
        assert_eq!(
            level.get_tile(Position::new(100, 100)).unwrap().role,
            Some(WallRole::Solid)
        );
    }

    #[test]
    fn test_player_walks_out_then_turns() {
        let (mut level, mut player, mut sequence) = setup();
        let start_x = player.x;

        run_ticks(&mut sequence, &mut level, &mut player, WALK_OUT_TICKS + SLOW_DOWN_TICKS);
        assert!(player.x > start_x + 1.0);
        assert_eq!(player.angle, 0.0);

        run_ticks(&mut sequence, &mut level, &mut player, 1);
        assert_eq!(player.angle, PI);
        assert!(player.weapon.is_some());
    }

    #[test]
    fn test_weapon_and_torch_are_thrown_back() {
        let (mut level, mut player, mut sequence) = setup();
        let until_weapon = WALK_OUT_TICKS + SLOW_DOWN_TICKS + TURN_AROUND_TICKS + 1;

        run_ticks(&mut sequence, &mut level, &mut player, until_weapon);
        assert!(player.weapon.is_none());
        assert!(player.has_torch);
        assert_eq!(level.creeps.len(), 1);
        assert_eq!(level.creeps[0].kind, CreepKind::Prop);

        run_ticks(&mut sequence, &mut level, &mut player, TORCH_DELAY_TICKS + 2);
        assert!(!player.has_torch);
        assert_eq!(level.torch_count(), 1);

        // The thrown torch lights the wall it flies past
        let torch = level
            .creeps
            .iter()
            .find(|creep| creep.kind == CreepKind::Torch)
            .unwrap();
        let lit = Position::from_world(torch.x, torch.y);
        assert!(level.get_tile(lit).unwrap().light > 0.5);
    }

    #[test]
    fn test_sequence_finishes() {
        let (mut level, mut player, mut sequence) = setup();
        let status = run_ticks(&mut sequence, &mut level, &mut player, 10_000);

        assert_eq!(status, SequenceStatus::Finished);
        assert!(sequence.is_done());
        assert_eq!(player.angle, 0.0);
        assert_eq!(level.torch_count(), 0);
        assert!(player.x > win_level_spawn().0 + 50.0);
    }
}
