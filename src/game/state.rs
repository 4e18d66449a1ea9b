//! # Game State Module
//!
//! Central game state and the fixed-order tick that advances it.
//!
//! `GameState` owns the current level, the player, projectiles, the random
//! number generator and the tick clock. Every mutation in a tick happens
//! through `&mut GameState`, so each system sees the results of the ones
//! before it. The adapters feed in a [`TickIntent`] and act on the returned
//! [`GameEvent`]s.

use crate::assets::AssetRegistry;
use crate::audio::{SoundKind, SoundRequest};
use crate::game::{
    resolve_move, win_level, win_level_spawn, CreepContext, CreepKind, EntityId, FloorProbe,
    GameSettings, ItemKind, Level, MoveOutcome, Player, PlayerView, Position, Projectile,
    Sequence, SequenceScene, SequenceStatus, WalkAwaySequence,
};
use crate::generation::{
    roll_creep_kind, spawn_creep, spawn_item, utils, Generator, LevelGenerator, SpawnPolicy,
};
use crate::input::{DebugFlags, TickIntent};
use crate::utils::within_square;
use crate::{config, CarotidError, CarotidResult};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Tiles the player moves per tick at full input.
pub const PLAYER_SPEED: f64 = 0.05;

/// Half the player's collision box.
pub const PLAYER_EXTENT: f64 = 0.25;

/// A projectile within this distance on both axes hits.
pub const HIT_DISTANCE: f64 = 0.5;

/// A hostile within this distance on both axes bites.
pub const BITE_DISTANCE: f64 = 0.75;

pub const PICKUP_DISTANCE: f64 = 0.75;

/// Ticks between animation frames.
const FRAME_TICKS: u64 = 18;

/// Where the game is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// The player died; the state is frozen until restarted
    GameOver,
    /// The last level was cleared and the ending is playing
    Won,
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundRequest),
    CreepKilled {
        id: EntityId,
        kind: CreepKind,
        score: u64,
    },
    SoulRescued {
        id: EntityId,
    },
    TorchExtinguished {
        position: Position,
    },
    ItemPickedUp {
        id: EntityId,
        kind: ItemKind,
    },
    PlayerHurt {
        health: i32,
    },
    PlayerDied,
    ExitOpened,
    LevelCompleted {
        level: u32,
    },
    LevelEntered {
        level: u32,
    },
    GameWon,
}

impl GameEvent {
    fn sound(kind: SoundKind, volume: f64) -> Self {
        GameEvent::Sound(SoundRequest::new(kind, volume))
    }
}

/// Running totals for the HUD and the end screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    pub creeps_killed: u32,
    pub souls_rescued: u32,
    pub torches_extinguished: u32,
    pub items_collected: u32,
    pub shots_fired: u32,
    pub damage_taken: u32,
    pub levels_completed: u32,
    /// Deepest level reached
    pub max_depth_reached: u32,
}

impl GameStatistics {
    pub fn new() -> Self {
        Self {
            max_depth_reached: 1,
            ..Self::default()
        }
    }

    /// Updates statistics based on a game event.
    pub fn update_from_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Sound(request) if request.kind == SoundKind::Gunshot => {
                self.shots_fired += 1;
            }
            GameEvent::CreepKilled { .. } => {
                self.creeps_killed += 1;
            }
            GameEvent::SoulRescued { .. } => {
                self.souls_rescued += 1;
            }
            GameEvent::TorchExtinguished { .. } => {
                self.torches_extinguished += 1;
            }
            GameEvent::ItemPickedUp { .. } => {
                self.items_collected += 1;
            }
            GameEvent::PlayerHurt { .. } => {
                self.damage_taken += 1;
            }
            GameEvent::LevelCompleted { .. } => {
                self.levels_completed += 1;
            }
            GameEvent::LevelEntered { level } => {
                self.max_depth_reached = self.max_depth_reached.max(*level);
            }
            _ => {}
        }
    }
}

/// Central game state containing all simulation data.
#[derive(Debug)]
pub struct GameState {
    pub settings: GameSettings,
    pub assets: AssetRegistry,
    pub level: Level,
    pub player: Player,
    pub projectiles: Vec<Projectile>,
    pub flags: DebugFlags,
    /// Ticks simulated so far
    pub tick: u64,
    pub phase: GamePhase,
    pub statistics: GameStatistics,
    rng: StdRng,
    sequences: Vec<Box<dyn Sequence>>,
    /// Alternates the two creep death sounds
    die_variant: bool,
}

/// Generates a dungeon level from the settings.
pub fn generate_level(
    settings: &GameSettings,
    assets: &AssetRegistry,
    level_number: u32,
) -> CarotidResult<Level> {
    let config = settings.generation_config(level_number);
    let mut rng = utils::create_rng(&config);
    let mut level = LevelGenerator::new(assets, level_number).generate(&config, &mut rng)?;
    level.required_souls = settings.required_souls_for(level_number);
    Ok(level)
}

impl GameState {
    /// Starts a new game on a freshly generated first level.
    ///
    /// # Examples
    ///
    /// ```
    /// use carotid::{AssetRegistry, GamePhase, GameSettings, GameState};
    ///
    /// let state = GameState::new(GameSettings::for_testing(3), AssetRegistry::new()).unwrap();
    /// assert_eq!(state.level.number, 1);
    /// assert_eq!(state.phase, GamePhase::Playing);
    /// assert!(state.level.grid.is_floor(state.player.x, state.player.y));
    /// ```
    pub fn new(settings: GameSettings, assets: AssetRegistry) -> CarotidResult<Self> {
        settings.validate()?;
        let level = generate_level(&settings, &assets, 1)?;
        let mut state = Self::with_level(settings, assets, level);
        state.populate();
        info!(
            "New game: seed {}, {} levels",
            state.settings.seed,
            state.settings.level_count()
        );
        Ok(state)
    }

    /// Wraps an already built level, placing the player at its spawn point.
    ///
    /// Nothing is spawned; callers populate the level themselves.
    pub fn with_level(settings: GameSettings, assets: AssetRegistry, mut level: Level) -> Self {
        level.required_souls = settings.required_souls_for(level.number);
        let (x, y) = level.player_spawn();
        let player = Player::new(x, y, settings.player_max_health, settings.weapon_cooldown);

        Self {
            rng: StdRng::seed_from_u64(settings.seed),
            settings,
            assets,
            level,
            player,
            projectiles: Vec::new(),
            flags: DebugFlags::default(),
            tick: 0,
            phase: GamePhase::Playing,
            statistics: GameStatistics::new(),
            sequences: Vec::new(),
            die_variant: false,
        }
    }

    /// Starts over with the same settings, keeping the debug flags.
    pub fn restart(&mut self) -> CarotidResult<()> {
        let flags = self.flags;
        *self = Self::new(self.settings.clone(), self.assets.clone())?;
        self.flags = flags;
        Ok(())
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Number of scripted sequences still running.
    pub fn active_sequences(&self) -> usize {
        self.sequences.len()
    }

    /// Adds a scripted sequence; it is dropped when the level changes.
    pub fn start_sequence(&mut self, sequence: Box<dyn Sequence>) {
        debug!("starting sequence {}", sequence.name());
        self.sequences.push(sequence);
    }

    /// Advances the simulation by one tick.
    ///
    /// # Errors
    ///
    /// Fails only when the next level cannot be generated.
    pub fn tick(&mut self, intent: &TickIntent) -> CarotidResult<Vec<GameEvent>> {
        let mut events = Vec::new();
        self.flags.apply(intent.toggles);

        match self.phase {
            GamePhase::GameOver => return Ok(events),
            GamePhase::Won => {
                self.step_sequences();
                self.tick += 1;
                return Ok(events);
            }
            GamePhase::Playing => {}
        }

        let now = self.tick;
        self.move_player(intent);
        self.fire(intent, &mut events);
        self.update_projectiles(&mut events);
        self.update_creeps();
        self.resolve_contacts(&mut events);
        if self.phase == GamePhase::Playing {
            self.collect_items(&mut events);
            self.check_exit(&mut events)?;
        }
        if self.phase == GamePhase::Playing {
            self.spawn_periodic();
        }
        if now % config::SWEEP_INTERVAL == 0 {
            let (creeps, items) = self.level.sweep();
            if creeps + items > 0 {
                debug!("swept {} creeps and {} items", creeps, items);
            }
        }
        self.step_sequences();
        self.player.status.expire(now);
        self.tick += 1;

        for event in &events {
            self.statistics.update_from_event(event);
        }
        Ok(events)
    }

    fn move_player(&mut self, intent: &TickIntent) {
        self.player.angle = intent.angle;

        let dx = intent.move_x.clamp(-1.0, 1.0) * PLAYER_SPEED;
        let dy = intent.move_y.clamp(-1.0, 1.0) * PLAYER_SPEED;
        if dx == 0.0 && dy == 0.0 {
            return;
        }

        let outcome = resolve_move(
            &self.level.grid,
            self.player.x,
            self.player.y,
            dx,
            dy,
            FloorProbe::Corners(PLAYER_EXTENT),
            self.flags.noclip,
        );
        if let MoveOutcome::Moved { x, y, .. } = outcome {
            let (x, y) = self.level.grid.clamp(x, y);
            self.player.x = x;
            self.player.y = y;
        }
    }

    fn fire(&mut self, intent: &TickIntent, events: &mut Vec<GameEvent>) {
        if !intent.fire {
            return;
        }
        let Some(weapon) = self.player.weapon.as_mut() else {
            return;
        };
        if let Some(projectile) = weapon.fire(self.tick, self.player.x, self.player.y, self.player.angle) {
            self.projectiles.push(projectile);
            events.push(GameEvent::sound(SoundKind::Gunshot, 0.4));
        }
    }

    fn update_projectiles(&mut self, events: &mut Vec<GameEvent>) {
        let mut projectiles = std::mem::take(&mut self.projectiles);
        projectiles.retain_mut(|projectile| {
            projectile.advance();
            if projectile.is_expired() {
                return false;
            }
            !self.hit_creep(projectile.x, projectile.y, events)
        });
        self.projectiles = projectiles;
    }

    /// Damages the first shootable creep at the point; returns true on a hit.
    fn hit_creep(&mut self, x: f64, y: f64, events: &mut Vec<GameEvent>) -> bool {
        let Some(creep) = self.level.creeps.iter_mut().find(|creep| {
            creep.is_alive()
                && creep.kind.is_shootable()
                && within_square(x, y, creep.x, creep.y, HIT_DISTANCE)
        }) else {
            return false;
        };

        if !creep.take_hit() {
            events.push(GameEvent::sound(SoundKind::Bat, 0.3));
            return true;
        }

        let (id, kind) = (creep.id, creep.kind);
        let position = Position::from_world(creep.x, creep.y);
        if kind == CreepKind::Torch {
            info!("torch at {:?} extinguished", position);
            self.level.bake_partial_lightmap(position);
            events.push(GameEvent::TorchExtinguished { position });
            events.push(GameEvent::sound(SoundKind::Gib, 0.2));
            return true;
        }

        let score = kind.kill_score();
        self.player.score += score;
        self.level.souls_cleared += 1;
        if let Some(tile) = self.level.grid.get_tile_mut(position) {
            tile.add_layer(self.assets.blood_splatter);
        }

        let die_sound = if self.die_variant {
            SoundKind::VampireDie2
        } else {
            SoundKind::VampireDie1
        };
        self.die_variant = !self.die_variant;

        debug!("{:?} killed at {:?} for {} points", kind, position, score);
        events.push(GameEvent::CreepKilled { id, kind, score });
        events.push(GameEvent::sound(die_sound, 0.25));
        true
    }

    fn update_creeps(&mut self) {
        let view = PlayerView::from_player(&self.player, self.tick);
        let ctx = CreepContext {
            grid: &self.level.grid,
            items: &self.level.items,
            player: view,
        };
        let animate = self.tick % FRAME_TICKS == 0;

        for creep in self.level.creeps.iter_mut() {
            creep.update(&ctx, &mut self.rng);
            if animate && creep.is_alive() {
                creep.frame = (creep.frame + 1) % creep.kind.frame_count();
            }
        }
    }

    fn resolve_contacts(&mut self, events: &mut Vec<GameEvent>) {
        let now = self.tick;
        let (px, py) = (self.player.x, self.player.y);

        for creep in self.level.creeps.iter_mut() {
            if !creep.is_alive() || !within_square(creep.x, creep.y, px, py, BITE_DISTANCE) {
                continue;
            }

            if creep.kind == CreepKind::Soul {
                creep.health = 0;
                self.level.souls_cleared += 1;
                events.push(GameEvent::SoulRescued { id: creep.id });
                events.push(GameEvent::sound(SoundKind::Rescue, 0.5));
                continue;
            }
            if !creep.kind.is_hostile() {
                continue;
            }

            creep.run_away(px, py, &mut self.rng);
            if self.flags.god || !self.player.bite(now, self.settings.invulnerability) {
                continue;
            }

            events.push(GameEvent::PlayerHurt {
                health: self.player.health,
            });
            if self.player.is_alive() {
                events.push(GameEvent::sound(SoundKind::PlayerHurt, 0.5));
            } else {
                info!("player killed by {:?} on level {}", creep.kind, self.level.number);
                events.push(GameEvent::PlayerDied);
                events.push(GameEvent::sound(SoundKind::PlayerDie, 1.6));
                self.phase = GamePhase::GameOver;
                return;
            }
        }
    }

    fn collect_items(&mut self, events: &mut Vec<GameEvent>) {
        let now = self.tick;
        let (px, py) = (self.player.x, self.player.y);

        for item in self.level.items.iter_mut() {
            if !item.is_available() || !within_square(item.x, item.y, px, py, PICKUP_DISTANCE) {
                continue;
            }
            item.health = 0;
            self.player.score += item.kind.score();
            match item.kind {
                ItemKind::Garlic => {
                    self.player.status.repel_until = Some(now + self.settings.repel_duration);
                }
                ItemKind::HolyWater => self.player.heal(1),
            }
            events.push(GameEvent::ItemPickedUp {
                id: item.id,
                kind: item.kind,
            });
            events.push(GameEvent::sound(SoundKind::Pickup, 0.5));
        }
    }

    fn check_exit(&mut self, events: &mut Vec<GameEvent>) -> CarotidResult<()> {
        if !self.level.exit_open && self.level.souls_cleared >= self.level.required_souls {
            info!(
                "exit open on level {} after {} clears",
                self.level.number, self.level.souls_cleared
            );
            self.level.open_exit(&self.assets);
            events.push(GameEvent::ExitOpened);
            events.push(GameEvent::sound(SoundKind::ExitOpen, 0.6));
        }

        if self.level.exit_open && self.level.is_at_exit(self.player.x, self.player.y) {
            self.advance_level(events)?;
        }
        Ok(())
    }

    /// Moves on to the next level, or to the ending after the last one.
    fn advance_level(&mut self, events: &mut Vec<GameEvent>) -> CarotidResult<()> {
        let finished = self.level.number;
        events.push(GameEvent::LevelCompleted { level: finished });
        self.projectiles.clear();
        self.sequences.clear();

        if finished >= self.settings.level_count() {
            info!("level {} was the last, playing the ending", finished);
            self.level = win_level(finished + 1, &self.assets);
            let (x, y) = win_level_spawn();
            self.place_player(x, y);
            self.start_sequence(Box::new(WalkAwaySequence::new(x)));
            self.phase = GamePhase::Won;
            events.push(GameEvent::GameWon);
            return Ok(());
        }

        let next = finished + 1;
        self.level = generate_level(&self.settings, &self.assets, next)?;
        let (x, y) = self.level.player_spawn();
        self.place_player(x, y);
        self.populate();
        info!("entered level {}", next);
        events.push(GameEvent::LevelEntered { level: next });
        Ok(())
    }

    fn place_player(&mut self, x: f64, y: f64) {
        self.player.x = x;
        self.player.y = y;
        self.player.angle = 0.0;
    }

    /// Spawns the starting creeps and items for the current level.
    pub fn populate(&mut self) {
        let spawn = self.settings.spawn.clone();
        for _ in 0..spawn.initial_creeps {
            self.spawn_creep();
        }
        for _ in 0..spawn.initial_items {
            self.spawn_item();
        }
        debug!(
            "level {} populated with {} creeps and {} items",
            self.level.number,
            self.level.mobile_creep_count(),
            self.level.live_item_count()
        );
    }

    fn spawn_periodic(&mut self) {
        let now = self.tick;
        if now == 0 {
            return;
        }
        let spawn = &self.settings.spawn;
        let creep_due = now % spawn.creep_spawn_interval == 0
            && self.level.mobile_creep_count() < spawn.max_live_creeps as usize;
        let item_due = now % spawn.item_spawn_interval == 0
            && self.level.live_item_count() < spawn.max_live_items as usize;

        if creep_due {
            self.spawn_creep();
        }
        if item_due {
            self.spawn_item();
        }
    }

    fn spawn_creep(&mut self) {
        let kind = roll_creep_kind(self.level.number, &mut self.rng);
        let policy = SpawnPolicy::from_settings(&self.settings.spawn);
        let player = (self.player.x, self.player.y);
        if let Err(err) = spawn_creep(&mut self.level, kind, player, &policy, &mut self.rng) {
            warn_spawn_failure("creep", &err);
        }
    }

    fn spawn_item(&mut self) {
        let policy = SpawnPolicy::from_settings(&self.settings.spawn);
        let player = (self.player.x, self.player.y);
        if let Err(err) = spawn_item(&mut self.level, player, &policy, &mut self.rng) {
            warn_spawn_failure("item", &err);
        }
    }

    fn step_sequences(&mut self) {
        let mut scene = SequenceScene {
            player: &mut self.player,
            level: &mut self.level,
        };
        self.sequences.retain_mut(|sequence| {
            let status = sequence.step(&mut scene);
            if status == SequenceStatus::Finished {
                info!("sequence {} finished", sequence.name());
            }
            status == SequenceStatus::Running
        });
    }
}

fn warn_spawn_failure(what: &str, err: &CarotidError) {
    warn!("skipping {} spawn: {}", what, err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Creep, Grid, Item, Tile};

    /// A 32x32 room with the exit in the right wall.
    fn open_state() -> GameState {
        let mut grid = Grid::new(32, 32);
        for y in 1..31 {
            for x in 1..31 {
                *grid.get_tile_mut(Position::new(x, y)).unwrap() = Tile::floor();
            }
        }
        let mut level = Level::new(1, grid);
        level.entrance = Position::new(5, 31);
        level.exit = Position::new(31, 20);

        let mut settings = GameSettings::for_testing(11);
        settings.spawn.creep_spawn_interval = 100_000;
        settings.spawn.item_spawn_interval = 100_000;
        let mut state = GameState::with_level(settings, AssetRegistry::new(), level);
        state.player.x = 10.0;
        state.player.y = 10.0;
        state
    }

    /// A creep that stays put until something scares it.
    fn still_creep(kind: CreepKind, x: f64, y: f64) -> Creep {
        let mut creep = Creep::new(kind, x, y);
        creep.next_action = u32::MAX;
        creep
    }

    fn run_until<F>(state: &mut GameState, intent: TickIntent, ticks: usize, mut done: F) -> Vec<GameEvent>
    where
        F: FnMut(&GameEvent) -> bool,
    {
        let mut all = Vec::new();
        for _ in 0..ticks {
            let events = state.tick(&intent).unwrap();
            let finished = events.iter().any(&mut done);
            all.extend(events);
            if finished {
                break;
            }
        }
        all
    }

    #[test]
    fn test_player_moves_and_stops_at_walls() {
        let mut state = open_state();
        state.tick(&TickIntent::walk(1.0, 0.0)).unwrap();
        assert!((state.player.x - 10.05).abs() < 1e-9);
        assert_eq!(state.tick, 1);

        state.player.x = 29.0;
        for _ in 0..40 {
            state.tick(&TickIntent::walk(1.0, 0.0)).unwrap();
        }
        assert!(state.player.x > 30.1 && state.player.x < 30.3);
    }

    #[test]
    fn test_shooting_kills_vampire() {
        let mut state = open_state();
        let id = state.level.add_creep(still_creep(CreepKind::Vampire, 13.0, 10.0));

        let events = run_until(
            &mut state,
            TickIntent::idle(0.0).with_fire(0.0),
            30,
            |event| matches!(event, GameEvent::CreepKilled { .. }),
        );

        assert!(events.contains(&GameEvent::CreepKilled {
            id,
            kind: CreepKind::Vampire,
            score: 50,
        }));
        assert!(events
            .iter()
            .any(|event| matches!(event, GameEvent::Sound(r) if r.kind == SoundKind::VampireDie1)));
        assert_eq!(state.player.score, 50);
        assert_eq!(state.level.souls_cleared, 1);
        assert_eq!(state.statistics.creeps_killed, 1);
        assert!(state.statistics.shots_fired >= 1);
        let tile = state.level.get_tile(Position::new(13, 10)).unwrap();
        assert!(tile.layers.contains(&state.assets.blood_splatter));
    }

    #[test]
    fn test_bat_takes_two_hits() {
        let mut state = open_state();
        state.level.add_creep(still_creep(CreepKind::Bat, 14.0, 10.0));

        let events = run_until(
            &mut state,
            TickIntent::idle(0.0).with_fire(0.0),
            200,
            |event| matches!(event, GameEvent::CreepKilled { .. }),
        );

        assert!(events
            .iter()
            .any(|event| matches!(event, GameEvent::Sound(r) if r.kind == SoundKind::Bat)));
        assert_eq!(state.player.score, 125);
    }

    #[test]
    fn test_shooting_torch_darkens_level() {
        let mut state = open_state();
        state.level.add_creep(Creep::new(CreepKind::Torch, 14.0, 10.0));
        state.level.bake_lightmap();
        assert_eq!(state.level.get_tile(Position::new(14, 10)).unwrap().light, 1.0);

        let events = run_until(
            &mut state,
            TickIntent::idle(0.0).with_fire(0.0),
            30,
            |event| matches!(event, GameEvent::TorchExtinguished { .. }),
        );

        assert!(events.contains(&GameEvent::TorchExtinguished {
            position: Position::new(14, 10)
        }));
        assert_eq!(state.level.get_tile(Position::new(14, 10)).unwrap().light, 0.0);
        assert_eq!(state.player.score, 0);
        assert_eq!(state.level.souls_cleared, 0);
    }

    #[test]
    fn test_bite_hurts_then_grants_invulnerability() {
        let mut state = open_state();
        state.level.add_creep(still_creep(CreepKind::Vampire, 10.5, 10.0));

        let events = state.tick(&TickIntent::default()).unwrap();
        assert!(events.contains(&GameEvent::PlayerHurt { health: 2 }));
        assert!(state.player.status.is_invulnerable(state.tick));

        let events = state.tick(&TickIntent::default()).unwrap();
        assert!(!events
            .iter()
            .any(|event| matches!(event, GameEvent::PlayerHurt { .. })));
        assert_eq!(state.player.health, 2);
    }

    #[test]
    fn test_god_mode_ignores_bites() {
        let mut state = open_state();
        state.level.add_creep(still_creep(CreepKind::Vampire, 10.5, 10.0));
        let mut intent = TickIntent::default();
        intent.toggles.god = true;

        state.tick(&intent).unwrap();
        assert!(state.flags.god);
        assert_eq!(state.player.health, 3);
    }

    #[test]
    fn test_death_freezes_game() {
        let mut state = open_state();
        state.player.health = 1;
        state.level.add_creep(still_creep(CreepKind::Vampire, 10.5, 10.0));

        let events = state.tick(&TickIntent::default()).unwrap();
        assert!(events.contains(&GameEvent::PlayerDied));
        assert!(state.is_over());

        let tick = state.tick;
        let events = state.tick(&TickIntent::walk(1.0, 0.0)).unwrap();
        assert!(events.is_empty());
        assert_eq!(state.tick, tick);
    }

    #[test]
    fn test_touching_soul_rescues_it() {
        let mut state = open_state();
        let id = state.level.add_creep(still_creep(CreepKind::Soul, 10.2, 10.2));

        let events = state.tick(&TickIntent::default()).unwrap();
        assert!(events.contains(&GameEvent::SoulRescued { id }));
        assert_eq!(state.level.souls_cleared, 1);
        assert_eq!(state.player.health, 3);
    }

    #[test]
    fn test_item_pickups() {
        let mut state = open_state();
        state.player.health = 2;
        state.level.add_item(Item::new(ItemKind::HolyWater, 10.0, 10.0));
        state.level.add_item(Item::new(ItemKind::Garlic, 10.5, 10.0));

        let events = state.tick(&TickIntent::default()).unwrap();
        let picked = events
            .iter()
            .filter(|event| matches!(event, GameEvent::ItemPickedUp { .. }))
            .count();
        assert_eq!(picked, 2);
        assert_eq!(state.player.health, 3);
        assert_eq!(state.player.score, 425);
        assert!(state.player.status.is_repelled(1));
        assert!(!state.player.status.is_repelled(2000));
        assert_eq!(state.level.live_item_count(), 0);
    }

    #[test]
    fn test_exit_opens_and_leads_to_next_level() {
        let mut state = open_state();
        state.level.souls_cleared = 3;

        let events = state.tick(&TickIntent::default()).unwrap();
        assert!(events.contains(&GameEvent::ExitOpened));
        assert!(state.level.exit_open);

        state.player.x = 30.0;
        state.player.y = 20.0;
        let events = state.tick(&TickIntent::default()).unwrap();
        assert!(events.contains(&GameEvent::LevelCompleted { level: 1 }));
        assert!(events.contains(&GameEvent::LevelEntered { level: 2 }));
        assert_eq!(state.level.number, 2);
        assert_eq!(state.level.required_souls, 5);
        assert_eq!(state.statistics.max_depth_reached, 2);
        assert!(state.level.grid.is_floor(state.player.x, state.player.y));
    }

    #[test]
    fn test_clearing_last_level_plays_ending() {
        let mut state = open_state();
        state.settings.required_souls = vec![0];
        state.level.required_souls = 0;
        state.player.x = 30.0;
        state.player.y = 20.0;

        let events = state.tick(&TickIntent::default()).unwrap();
        assert!(events.contains(&GameEvent::GameWon));
        assert_eq!(state.phase, GamePhase::Won);
        assert_eq!(state.active_sequences(), 1);

        for _ in 0..5000 {
            state.tick(&TickIntent::walk(-1.0, 0.0)).unwrap();
            if state.active_sequences() == 0 {
                break;
            }
        }
        assert_eq!(state.active_sequences(), 0);
        assert!(state.player.weapon.is_none());
        assert!(!state.player.has_torch);
    }

    #[test]
    fn test_periodic_spawns_respect_caps() {
        let mut state = open_state();
        state.flags.god = true;
        state.settings.spawn.creep_spawn_interval = 5;
        state.settings.spawn.max_live_creeps = 3;
        state.settings.spawn.item_spawn_interval = 7;
        state.settings.spawn.max_live_items = 2;

        for _ in 0..60 {
            state.tick(&TickIntent::default()).unwrap();
        }
        assert_eq!(state.level.mobile_creep_count(), 3);
        assert_eq!(state.level.live_item_count(), 2);
    }

    #[test]
    fn test_sweep_removes_inert_creeps() {
        let mut state = open_state();
        let mut dead = still_creep(CreepKind::Vampire, 20.0, 20.0);
        dead.health = 0;
        state.level.add_creep(dead);

        state.tick(&TickIntent::default()).unwrap();
        assert!(state.level.creeps.is_empty());
    }
}
