//! # Entities
//!
//! Creeps, items, projectiles and the player, plus the per-kind tuning
//! tables that drive the behavior engine and scoring.

use crate::config;
use crate::game::{new_entity_id, Behavior, EntityId};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Creep categories.
///
/// Torches are immobile light emitters that can be shot out. Props are
/// scenery moved only by sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreepKind {
    Vampire,
    Bat,
    Ghost,
    Torch,
    Soul,
    Prop,
}

/// Inclusive velocity magnitude band for pursuit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedEnvelope {
    pub min: f64,
    pub max: f64,
}

impl SpeedEnvelope {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, speed: f64) -> bool {
        speed >= self.min && speed <= self.max
    }
}

impl CreepKind {
    /// Kinds rolled by the periodic spawner.
    pub const MOBILE: [CreepKind; 4] = [
        CreepKind::Vampire,
        CreepKind::Bat,
        CreepKind::Ghost,
        CreepKind::Soul,
    ];

    /// Starting health.
    pub fn health(self) -> i32 {
        match self {
            CreepKind::Bat => 2,
            _ => 1,
        }
    }

    /// Returns true for kinds that bite and pursue the player.
    pub fn is_hostile(self) -> bool {
        matches!(self, CreepKind::Vampire | CreepKind::Bat | CreepKind::Ghost)
    }

    /// Returns true for kinds driven by the behavior engine.
    pub fn is_mobile(self) -> bool {
        self.is_hostile() || self == CreepKind::Soul
    }

    /// Returns true for kinds a projectile can hit.
    pub fn is_shootable(self) -> bool {
        self.is_hostile() || self == CreepKind::Torch
    }

    pub fn emits_light(self) -> bool {
        self == CreepKind::Torch
    }

    /// Pursuit speed band.
    pub fn speed_envelope(self) -> SpeedEnvelope {
        match self {
            CreepKind::Vampire => SpeedEnvelope::new(0.1 / 9.0, 0.5 / 9.0),
            CreepKind::Bat => SpeedEnvelope::new(0.15 / 9.0, 0.7 / 9.0),
            CreepKind::Ghost => SpeedEnvelope::new(0.1 / 9.0, 0.4 / 9.0),
            CreepKind::Soul => SpeedEnvelope::new(0.05 / 9.0, 0.2 / 9.0),
            CreepKind::Torch | CreepKind::Prop => SpeedEnvelope::new(0.0, 0.0),
        }
    }

    /// One-in-N chance of choosing pursuit when a new action is due.
    pub fn seek_chance(self) -> Option<u32> {
        match self {
            CreepKind::Vampire | CreepKind::Ghost => Some(13),
            CreepKind::Bat => Some(7),
            _ => None,
        }
    }

    /// Base and random spread of the action cooldown, in ticks.
    pub fn action_cooldown(self) -> (u32, u32) {
        match self {
            CreepKind::Bat => (288, 288),
            _ => (288, 432),
        }
    }

    /// Score for destroying a creep of this kind.
    pub fn kill_score(self) -> u64 {
        match self {
            CreepKind::Vampire => 50,
            CreepKind::Bat => 125,
            CreepKind::Ghost => 150,
            _ => 0,
        }
    }

    /// Number of animation frames.
    pub fn frame_count(self) -> usize {
        match self {
            CreepKind::Vampire | CreepKind::Soul => 4,
            CreepKind::Bat => 7,
            CreepKind::Torch => 8,
            CreepKind::Ghost | CreepKind::Prop => 1,
        }
    }
}

/// A creature or object on the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creep {
    pub id: EntityId,
    pub kind: CreepKind,
    pub x: f64,
    pub y: f64,
    pub move_x: f64,
    pub move_y: f64,
    /// Ticks since the last action choice
    pub tick: u32,
    /// Tick count at which the next action is chosen
    pub next_action: u32,
    /// Zero means inert, pending sweep
    pub health: i32,
    pub frame: usize,
    /// Render rotation, used by thrown props
    pub angle: f64,
    /// Last behavior the engine selected
    pub behavior: Behavior,
}

impl Creep {
    /// Creates a creep with its kind's starting health.
    pub fn new(kind: CreepKind, x: f64, y: f64) -> Self {
        Self {
            id: new_entity_id(),
            kind,
            x,
            y,
            move_x: 0.0,
            move_y: 0.0,
            tick: 0,
            next_action: 0,
            health: kind.health(),
            frame: 0,
            angle: 0.0,
            behavior: Behavior::Wander,
        }
    }

    /// Randomizes the starting animation frame so spawns don't animate in lockstep.
    pub fn with_random_frame<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.frame = rng.gen_range(0..self.kind.frame_count());
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Applies one point of damage; returns true if this destroyed the creep.
    pub fn take_hit(&mut self) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health -= 1;
        !self.is_alive()
    }
}

/// Pickup categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Garlic,
    HolyWater,
}

impl ItemKind {
    /// Score for collecting the item.
    pub fn score(self) -> u64 {
        match self {
            ItemKind::Garlic => 275,
            ItemKind::HolyWater => 150,
        }
    }
}

/// A pickup on the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: EntityId,
    pub kind: ItemKind,
    pub x: f64,
    pub y: f64,
    pub health: i32,
}

impl Item {
    pub fn new(kind: ItemKind, x: f64, y: f64) -> Self {
        Self {
            id: new_entity_id(),
            kind,
            x,
            y,
            health: 1,
        }
    }

    /// Returns true until the item is consumed.
    pub fn is_available(&self) -> bool {
        self.health > 0
    }
}

/// Timed status effects on the player, stored as expiry ticks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    pub repel_until: Option<u64>,
    pub invulnerable_until: Option<u64>,
}

impl StatusEffects {
    pub fn is_repelled(&self, now: u64) -> bool {
        self.repel_until.map(|until| now < until).unwrap_or(false)
    }

    pub fn is_invulnerable(&self, now: u64) -> bool {
        self.invulnerable_until
            .map(|until| now < until)
            .unwrap_or(false)
    }

    /// Drops effects whose expiry has passed.
    pub fn expire(&mut self, now: u64) {
        if !self.is_repelled(now) {
            self.repel_until = None;
        }
        if !self.is_invulnerable(now) {
            self.invulnerable_until = None;
        }
    }
}

/// The player's firearm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    /// Minimum ticks between shots
    pub cooldown: u64,
    pub last_fired: Option<u64>,
    pub projectile_speed: f64,
}

impl Weapon {
    pub fn new(cooldown: u64) -> Self {
        Self {
            cooldown,
            last_fired: None,
            projectile_speed: 0.35,
        }
    }

    pub fn can_fire(&self, now: u64) -> bool {
        match self.last_fired {
            Some(last) => now.saturating_sub(last) >= self.cooldown,
            None => true,
        }
    }

    /// Fires if the cooldown allows, returning the projectile.
    pub fn fire(&mut self, now: u64, x: f64, y: f64, angle: f64) -> Option<Projectile> {
        if !self.can_fire(now) {
            return None;
        }
        self.last_fired = Some(now);
        Some(Projectile::new(x, y, angle, self.projectile_speed))
    }
}

/// A bullet in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub speed: f64,
    /// Ticks in flight
    pub age: u64,
}

impl Projectile {
    /// Ticks a projectile survives without hitting anything.
    pub const LIFETIME: u64 = 2 * config::TICKS_PER_SECOND;

    pub fn new(x: f64, y: f64, angle: f64, speed: f64) -> Self {
        Self {
            x,
            y,
            angle,
            speed,
            age: 0,
        }
    }

    pub fn advance(&mut self) {
        self.x += self.angle.cos() * self.speed;
        self.y += self.angle.sin() * self.speed;
        self.age += 1;
    }

    pub fn is_expired(&self) -> bool {
        self.age > Self::LIFETIME
    }
}

/// The controlled entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    /// Facing angle in radians
    pub angle: f64,
    pub health: i32,
    pub max_health: i32,
    pub score: u64,
    pub status: StatusEffects,
    /// `None` once the weapon has been thrown away
    pub weapon: Option<Weapon>,
    pub has_torch: bool,
}

impl Player {
    pub fn new(x: f64, y: f64, max_health: i32, weapon_cooldown: u64) -> Self {
        Self {
            x,
            y,
            angle: 0.0,
            health: max_health,
            max_health,
            score: 0,
            status: StatusEffects::default(),
            weapon: Some(Weapon::new(weapon_cooldown)),
            has_torch: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Restores health up to the maximum.
    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Returns true if the bite hurt.
    pub fn bite(&mut self, now: u64, invulnerability: u64) -> bool {
        if self.status.is_invulnerable(now) {
            return false;
        }
        self.health -= 1;
        self.status.invulnerable_until = Some(now + invulnerability);
        true
    }
}
