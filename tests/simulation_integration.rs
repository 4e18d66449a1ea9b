//! Integration tests for the per-tick simulation: lighting, creep behavior
//! and whole-game loops driven through `GameState::tick`.

use carotid::{
    AssetRegistry, Behavior, CarotidResult, Creep, CreepContext, CreepKind, FloorProbe,
    GameEvent, GamePhase, GameSettings, GameState, Grid, Level, PlayerView, Position,
    TickIntent, Tile,
};
use rand::{rngs::StdRng, SeedableRng};
use std::io::Write;

/// A single rectangular room of floor with a one-cell void border.
fn room(width: u32, height: u32) -> Grid {
    let mut grid = Grid::new(width, height);
    for y in 1..height as i32 - 1 {
        for x in 1..width as i32 - 1 {
            if let Some(tile) = grid.get_tile_mut(Position::new(x, y)) {
                *tile = Tile::floor();
            }
        }
    }
    grid
}

fn light(level: &Level, x: i32, y: i32) -> f64 {
    level
        .get_tile(Position::new(x, y))
        .map(|tile| tile.light)
        .unwrap_or(-1.0)
}

#[test]
fn test_single_torch_room_lighting() -> CarotidResult<()> {
    let mut level = Level::new(1, room(24, 12));
    level.add_creep(Creep::new(CreepKind::Torch, 5.0, 5.0));
    level.bake_lightmap();

    assert_eq!(light(&level, 5, 5), 1.0);
    let adjacent = light(&level, 6, 5);
    let far = light(&level, 15, 5);
    assert!(far < adjacent, "far {} adjacent {}", far, adjacent);
    assert!(far > 0.0);

    // Putting the torch out and re-baking its window leaves the room dark
    if let Some(torch) = level.creeps.first_mut() {
        torch.health = 0;
    }
    level.bake_partial_lightmap(Position::new(5, 5));
    assert_eq!(light(&level, 5, 5), 0.0);
    assert_eq!(light(&level, 15, 5), 0.0);
    Ok(())
}

#[test]
fn test_extinguished_torch_leaves_no_stale_light() -> CarotidResult<()> {
    let mut level = Level::new(1, room(96, 12));
    level.add_creep(Creep::new(CreepKind::Torch, 10.0, 5.0));
    level.bake_lightmap();
    assert!(light(&level, 26, 5) > 0.05);

    if let Some(torch) = level.creeps.first_mut() {
        torch.health = 0;
    }
    level.bake_partial_lightmap(Position::new(10, 5));

    let mut fresh = level.clone();
    fresh.bake_lightmap();
    for x in [26, 27, 30, 50] {
        assert_eq!(light(&level, x, 5), light(&fresh, x, 5), "x = {}", x);
    }
    for pos in level.grid.positions() {
        let stale = light(&level, pos.x, pos.y) - light(&fresh, pos.x, pos.y);
        assert!(stale.abs() < 1.0 / 255.0, "stale {} at {:?}", stale, pos);
    }
    Ok(())
}

#[test]
fn test_threatened_creep_flees_from_player() -> CarotidResult<()> {
    let grid = room(20, 20);
    let mut rng = StdRng::seed_from_u64(9);

    for (player_x, player_y) in [(11.0, 11.0), (9.0, 12.0), (10.5, 8.0)] {
        let mut creep = Creep::new(CreepKind::Vampire, 10.0, 10.0);
        creep.next_action = u32::MAX;
        let ctx = CreepContext {
            grid: &grid,
            items: &[],
            player: PlayerView {
                x: player_x,
                y: player_y,
                angle: 0.0,
                repelled: true,
            },
        };

        let behavior = creep.update(&ctx, &mut rng);
        assert_eq!(behavior, Behavior::Flee);

        let toward_x = player_x - creep.x;
        let toward_y = player_y - creep.y;
        assert!(creep.move_x * toward_x < 0.0, "x velocity {} toward {}", creep.move_x, toward_x);
        assert!(creep.move_y * toward_y < 0.0, "y velocity {} toward {}", creep.move_y, toward_y);
    }
    Ok(())
}

#[test]
fn test_hostile_pursues_nearby_player() -> CarotidResult<()> {
    let grid = room(20, 20);
    let mut rng = StdRng::seed_from_u64(4);
    let mut creep = Creep::new(CreepKind::Bat, 10.0, 10.0);
    let ctx = CreepContext {
        grid: &grid,
        items: &[],
        player: PlayerView {
            x: 11.5,
            y: 10.0,
            angle: 0.0,
            repelled: false,
        },
    };

    assert_eq!(creep.update(&ctx, &mut rng), Behavior::Pursue);
    assert!(creep.x > 10.0);
    assert!(CreepKind::Bat.speed_envelope().contains(creep.move_x.hypot(creep.move_y)));
    Ok(())
}

#[test]
fn test_generated_game_runs_without_leaving_the_floor() -> CarotidResult<()> {
    let mut state = GameState::new(GameSettings::for_testing(21), AssetRegistry::new())?;
    state.flags.god = true;

    let mut events = Vec::new();
    for tick in 0..1200u64 {
        let angle = (tick as f64 / 90.0).sin() * std::f64::consts::PI;
        let intent = if tick % 40 == 0 {
            TickIntent::default().with_fire(angle)
        } else {
            TickIntent::idle(angle)
        };
        events.extend(state.tick(&intent)?);
    }

    assert_eq!(state.tick, 1200);
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.player.health, state.player.max_health);
    assert!(state.statistics.shots_fired > 0);
    assert!(events.iter().any(|event| matches!(event, GameEvent::Sound(_))));

    for creep in state.level.creeps.iter().filter(|c| c.is_alive() && c.kind.is_mobile()) {
        assert!(
            carotid::is_walkable(&state.level.grid, creep.x, creep.y, FloorProbe::Center),
            "{:?} left the floor at ({}, {})",
            creep.kind,
            creep.x,
            creep.y
        );
    }
    for pos in state.level.grid.positions() {
        let value = light(&state.level, pos.x, pos.y);
        assert!((0.0..=1.0).contains(&value));
    }
    Ok(())
}

#[test]
fn test_same_seed_same_game() -> CarotidResult<()> {
    let settings = GameSettings::for_testing(33);
    let mut first = GameState::new(settings.clone(), AssetRegistry::new())?;
    let mut second = GameState::new(settings, AssetRegistry::new())?;

    let intent = TickIntent::walk(1.0, 0.0);
    for _ in 0..300 {
        first.tick(&intent)?;
        second.tick(&intent)?;
    }

    assert_eq!(first.level.grid, second.level.grid);
    assert_eq!((first.player.x, first.player.y), (second.player.x, second.player.y));
    let positions = |state: &GameState| -> Vec<(f64, f64)> {
        state.level.creeps.iter().map(|creep| (creep.x, creep.y)).collect()
    };
    assert_eq!(positions(&first), positions(&second));
    Ok(())
}

#[test]
fn test_settings_file_starts_a_game() -> CarotidResult<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(
        file,
        r#"{{ "seed": 5, "required_souls": [2], "level_size": 64, "room_count": 6 }}"#
    )?;

    let settings = GameSettings::from_json_file(file.path())?;
    assert_eq!(settings.level_count(), 1);

    let state = GameState::new(settings, AssetRegistry::new())?;
    assert_eq!(state.level.required_souls, 2);
    assert_eq!(state.level.grid.width, 64);
    Ok(())
}

#[test]
fn test_invalid_settings_file_is_rejected() -> CarotidResult<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, r#"{{ "required_souls": [] }}"#)?;
    assert!(GameSettings::from_json_file(file.path()).is_err());

    let mut garbage = tempfile::NamedTempFile::new()?;
    write!(garbage, "not json")?;
    assert!(matches!(
        GameSettings::from_json_file(garbage.path()),
        Err(carotid::CarotidError::Serde(_))
    ));
    Ok(())
}
