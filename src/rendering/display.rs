//! # Display Management
//!
//! Draws the level, creeps, items and player with macroquad shapes, tinted
//! by the baked lightmap. Rendering only reads the game state.

use crate::assets::AssetRegistry;
use crate::config;
use crate::game::{CreepKind, GameEvent, GameState, Grid, ItemKind, Position, Tile, WallRole};
use crate::rendering::Hud;
use macroquad::prelude::*;

/// Maps world coordinates to screen pixels around a followed point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World point drawn at the screen center
    pub center_x: f64,
    pub center_y: f64,
    /// Pixels per tile
    pub tile_px: f32,
    pub screen_width: f32,
    pub screen_height: f32,
}

impl Camera {
    pub fn new(screen_width: f32, screen_height: f32) -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            tile_px: config::TILE_SIZE as f32,
            screen_width,
            screen_height,
        }
    }

    pub fn follow(&mut self, x: f64, y: f64) {
        self.center_x = x;
        self.center_y = y;
    }

    /// Screen position of a world point.
    ///
    /// # Examples
    ///
    /// ```
    /// use carotid::Camera;
    ///
    /// let mut camera = Camera::new(800.0, 600.0);
    /// camera.follow(10.0, 10.0);
    /// assert_eq!(camera.world_to_screen(10.0, 10.0), (400.0, 300.0));
    /// assert_eq!(camera.world_to_screen(11.0, 10.0), (432.0, 300.0));
    /// ```
    pub fn world_to_screen(&self, x: f64, y: f64) -> (f32, f32) {
        let sx = (x - self.center_x) as f32 * self.tile_px + self.screen_width / 2.0;
        let sy = (y - self.center_y) as f32 * self.tile_px + self.screen_height / 2.0;
        (sx, sy)
    }

    /// Inclusive tile range on screen, clipped to the grid.
    pub fn visible_tiles(&self, grid: &Grid) -> (Position, Position) {
        let half_w = (self.screen_width / self.tile_px / 2.0).ceil() as i32 + 1;
        let half_h = (self.screen_height / self.tile_px / 2.0).ceil() as i32 + 1;
        let center = Position::from_world(self.center_x, self.center_y);

        let min = Position::new((center.x - half_w).max(0), (center.y - half_h).max(0));
        let max = Position::new(
            (center.x + half_w).min(grid.width as i32 - 1),
            (center.y + half_h).min(grid.height as i32 - 1),
        );
        (min, max)
    }
}

/// Darkens a color by a light level, unless fullbright.
pub fn shade(color: Color, light: f64, fullbright: bool) -> Color {
    if fullbright {
        return color;
    }
    let light = light.clamp(0.0, 1.0) as f32;
    Color::new(color.r * light, color.g * light, color.b * light, color.a)
}

/// Base color for a tile, or `None` for void.
pub fn tile_color(tile: &Tile, assets: &AssetRegistry) -> Option<Color> {
    if tile.is_void() {
        return None;
    }

    let top = tile.layers.last().copied();
    if top == Some(assets.door_open) {
        return Some(Color::from_rgba(150, 110, 60, 255));
    }
    if top == Some(assets.door_closed) {
        return Some(Color::from_rgba(90, 60, 30, 255));
    }
    if top == Some(assets.blood_splatter) {
        return Some(Color::from_rgba(120, 30, 30, 255));
    }

    if tile.floor {
        return Some(if tile.layers.contains(&assets.grass) {
            Color::from_rgba(60, 130, 50, 255)
        } else if tile.layers.contains(&assets.floor_c) {
            Color::from_rgba(95, 90, 85, 255)
        } else {
            Color::from_rgba(80, 78, 74, 255)
        });
    }

    let color = match tile.role {
        Some(WallRole::Pillar) => Color::from_rgba(170, 165, 160, 255),
        Some(WallRole::Top) => Color::from_rgba(150, 145, 140, 255),
        Some(WallRole::Bottom) | Some(WallRole::BottomLeft) | Some(WallRole::BottomRight) => {
            Color::from_rgba(120, 115, 110, 255)
        }
        Some(WallRole::Left) | Some(WallRole::Right) => Color::from_rgba(135, 130, 125, 255),
        Some(WallRole::Solid) | None => Color::from_rgba(60, 58, 56, 255),
    };
    Some(color)
}

pub fn creep_color(kind: CreepKind) -> Color {
    match kind {
        CreepKind::Vampire => Color::from_rgba(180, 20, 40, 255),
        CreepKind::Bat => Color::from_rgba(110, 60, 140, 255),
        CreepKind::Ghost => Color::from_rgba(210, 220, 255, 200),
        CreepKind::Torch => ORANGE,
        CreepKind::Soul => Color::from_rgba(120, 220, 255, 220),
        CreepKind::Prop => LIGHTGRAY,
    }
}

pub fn item_color(kind: ItemKind) -> Color {
    match kind {
        ItemKind::Garlic => Color::from_rgba(240, 235, 210, 255),
        ItemKind::HolyWater => Color::from_rgba(80, 140, 255, 255),
    }
}

/// HUD line for an event worth telling the player about.
pub fn describe_event(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::CreepKilled { kind, score, .. } => Some(format!("{:?} slain (+{})", kind, score)),
        GameEvent::SoulRescued { .. } => Some("A soul is set free".to_string()),
        GameEvent::TorchExtinguished { .. } => Some("A torch goes out".to_string()),
        GameEvent::ItemPickedUp { kind, .. } => Some(match kind {
            ItemKind::Garlic => "Garlic! The creeps keep their distance".to_string(),
            ItemKind::HolyWater => "Holy water restores you".to_string(),
        }),
        GameEvent::PlayerHurt { health } => Some(format!("Bitten! {} health left", health)),
        GameEvent::PlayerDied => Some("You have died".to_string()),
        GameEvent::ExitOpened => Some("The exit door grinds open".to_string()),
        GameEvent::LevelEntered { level } => Some(format!("Level {}", level)),
        GameEvent::GameWon => Some("Daylight".to_string()),
        GameEvent::Sound(_) | GameEvent::LevelCompleted { .. } => None,
    }
}

/// Macroquad display manager for the game.
pub struct MacroquadDisplay {
    pub camera: Camera,
    /// Message history
    pub messages: Vec<String>,
    pub max_messages: usize,
    pub hud: Hud,
}

impl Default for MacroquadDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroquadDisplay {
    /// Creates a display sized to the current window.
    pub fn new() -> Self {
        Self {
            camera: Camera::new(screen_width(), screen_height()),
            messages: Vec::new(),
            max_messages: 100,
            hud: Hud::new(),
        }
    }

    /// Adds a message to the message history.
    pub fn add_message(&mut self, message: String) {
        self.messages.push(message);
        if self.messages.len() > self.max_messages {
            self.messages.remove(0);
        }
    }

    /// Turns a tick's events into HUD messages.
    pub fn record_events(&mut self, events: &[GameEvent]) {
        for message in events.iter().filter_map(describe_event) {
            self.add_message(message);
        }
    }

    /// Renders the complete game screen.
    pub fn render_game(&mut self, state: &GameState) {
        self.camera.screen_width = screen_width();
        self.camera.screen_height = screen_height();
        self.camera.follow(state.player.x, state.player.y);

        clear_background(BLACK);
        self.render_map(state);
        self.render_items(state);
        self.render_creeps(state);
        self.render_projectiles(state);
        self.render_player(state);

        self.hud.render(state, &self.messages);
        if state.flags.debug {
            self.hud.render_debug_overlay(state);
        }
    }

    fn light_under(&self, state: &GameState, x: f64, y: f64) -> f64 {
        state
            .level
            .get_tile(Position::from_world(x, y))
            .map(|tile| tile.light)
            .unwrap_or(0.0)
    }

    fn render_map(&self, state: &GameState) {
        let grid = state.level.grid();
        let (min, max) = self.camera.visible_tiles(grid);
        let size = self.camera.tile_px;

        for y in min.y..=max.y {
            for x in min.x..=max.x {
                let Some(tile) = grid.get_tile(Position::new(x, y)) else {
                    continue;
                };
                let Some(color) = tile_color(tile, &state.assets) else {
                    continue;
                };
                let (sx, sy) = self.camera.world_to_screen(x as f64 - 0.5, y as f64 - 0.5);
                draw_rectangle(sx, sy, size, size, shade(color, tile.light, state.flags.fullbright));
            }
        }
    }

    fn render_items(&self, state: &GameState) {
        for item in state.level.items.iter().filter(|item| item.is_available()) {
            let (sx, sy) = self.camera.world_to_screen(item.x, item.y);
            let light = self.light_under(state, item.x, item.y);
            let color = shade(item_color(item.kind), light, state.flags.fullbright);
            draw_circle(sx, sy, self.camera.tile_px * 0.2, color);
        }
    }

    fn render_creeps(&self, state: &GameState) {
        let size = self.camera.tile_px;
        for creep in state.level.creeps.iter().filter(|creep| creep.is_alive()) {
            let (sx, sy) = self.camera.world_to_screen(creep.x, creep.y);
            let light = self.light_under(state, creep.x, creep.y);

            match creep.kind {
                CreepKind::Torch => {
                    let flicker = 0.2 + 0.05 * (creep.frame % 2) as f32;
                    draw_circle(sx, sy, size * flicker, creep_color(creep.kind));
                }
                CreepKind::Prop => {
                    let (dx, dy) = (creep.angle.cos() as f32, creep.angle.sin() as f32);
                    let half = size * 0.3;
                    let color = shade(creep_color(creep.kind), light, state.flags.fullbright);
                    draw_line(sx - dx * half, sy - dy * half, sx + dx * half, sy + dy * half, 3.0, color);
                }
                kind => {
                    let color = shade(creep_color(kind), light, state.flags.fullbright);
                    draw_circle(sx, sy, size * 0.3, color);
                    let eye = if creep.facing_left(state.player.x) { -0.12 } else { 0.12 };
                    draw_circle(sx + size * eye, sy - size * 0.08, size * 0.05, BLACK);
                }
            }
        }
    }

    fn render_projectiles(&self, state: &GameState) {
        for projectile in &state.projectiles {
            let (sx, sy) = self.camera.world_to_screen(projectile.x, projectile.y);
            draw_circle(sx, sy, 2.5, YELLOW);
        }
    }

    fn render_player(&self, state: &GameState) {
        let player = &state.player;
        let size = self.camera.tile_px;
        let (sx, sy) = self.camera.world_to_screen(player.x, player.y);
        let invulnerable = player.status.is_invulnerable(state.tick);
        let color = if invulnerable && (state.tick / 9) % 2 == 0 {
            Color::from_rgba(255, 255, 255, 120)
        } else {
            Color::from_rgba(230, 200, 150, 255)
        };
        draw_circle(sx, sy, size * 0.25, color);

        if player.weapon.is_some() {
            let (dx, dy) = (player.angle.cos() as f32, player.angle.sin() as f32);
            draw_line(sx, sy, sx + dx * size * 0.45, sy + dy * size * 0.45, 2.0, DARKGRAY);
        }
        if player.has_torch {
            draw_circle(sx - size * 0.2, sy - size * 0.2, size * 0.08, ORANGE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shade_scales_by_light() {
        let color = Color::new(1.0, 0.5, 0.25, 1.0);
        let dark = shade(color, 0.5, false);
        assert_eq!(dark.r, 0.5);
        assert_eq!(dark.g, 0.25);
        assert_eq!(dark.a, 1.0);
        assert_eq!(shade(color, 0.0, true), color);
        assert_eq!(shade(color, 2.0, false).r, 1.0);
    }

    #[test]
    fn test_tile_colors() {
        let assets = AssetRegistry::new();
        assert!(tile_color(&Tile::default(), &assets).is_none());

        let floor = tile_color(&Tile::floor(), &assets).unwrap();
        let mut door = Tile {
            wall: true,
            role: Some(WallRole::Top),
            ..Tile::default()
        };
        let wall = tile_color(&door, &assets).unwrap();
        door.add_layer(assets.door_closed);
        let closed = tile_color(&door, &assets).unwrap();

        assert_ne!(floor, wall);
        assert_ne!(wall, closed);
    }

    #[test]
    fn test_visible_tiles_clip_to_grid() {
        let grid = Grid::new(20, 10);
        let mut camera = Camera::new(320.0, 320.0);
        camera.follow(1.0, 1.0);

        let (min, max) = camera.visible_tiles(&grid);
        assert_eq!(min, Position::new(0, 0));
        assert_eq!(max, Position::new(7, 7));

        camera.follow(19.0, 9.0);
        let (_, max) = camera.visible_tiles(&grid);
        assert_eq!(max, Position::new(19, 9));
    }

    #[test]
    fn test_describe_event() {
        assert_eq!(
            describe_event(&GameEvent::LevelEntered { level: 2 }),
            Some("Level 2".to_string())
        );
        assert!(describe_event(&GameEvent::LevelCompleted { level: 1 }).is_none());
    }
}
