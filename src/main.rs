//! Dungeon Sweep entry point
//!
//! Builds a small demo dungeon, drives it with scripted input at the fixed
//! timestep and logs what happens. Pass a tuning JSON path to override the
//! default balance.

use glam::Vec2;

use dungeon_sweep::Tuning;
use dungeon_sweep::consts::{SIM_DT, TILE_SIZE};
use dungeon_sweep::sim::{GameEvent, GamePhase, GameState, TickInput, TileGrid, tick};

/// Ten seconds of simulation
const DEMO_TICKS: u64 = 600;

fn load_tuning() -> Tuning {
    let Some(path) = std::env::args().nth(1) else {
        return Tuning::default();
    };
    match Tuning::load(&path) {
        Ok(tuning) => tuning,
        Err(e) => {
            log::warn!("Falling back to default tuning: {e}");
            Tuning::default()
        }
    }
}

fn build_dungeon() -> TileGrid {
    let mut grid = TileGrid::bordered(20, 14, TILE_SIZE);
    // A pillar block and a partial dividing wall
    let walls = [(6, 4), (7, 4), (6, 5), (7, 5), (12, 1), (12, 2), (12, 3), (12, 4), (12, 5)];
    for (col, row) in walls {
        if let Err(e) = grid.set_collidable(col, row, true) {
            log::error!("Bad demo wall: {e}");
        }
    }
    grid
}

/// Scripted input: walk right, then down, then back left swinging
fn scripted_input(tick: u64) -> TickInput {
    let movement = match tick {
        0..=119 => Vec2::X,
        120..=239 => Vec2::Y,
        240..=419 => Vec2::NEG_X,
        _ => Vec2::new(0.7, -0.7),
    };
    TickInput {
        movement,
        attack: tick % 15 == 0,
    }
}

fn main() {
    env_logger::init();
    log::info!("Dungeon Sweep (native) starting...");

    let tuning = load_tuning();
    let seed = 0x5EED;
    let mut state = GameState::new(seed, build_dungeon(), tuning);

    let spawns = [(2, 2), (9, 8), (15, 10), (16, 3)];
    for (i, &(col, row)) in spawns.iter().enumerate() {
        let spawned = if i == 0 {
            state.spawn_player(col, row)
        } else {
            state.spawn_enemy(col, row)
        };
        if let Err(e) = spawned {
            log::error!("Spawn at ({col}, {row}) failed: {e}");
        }
    }
    log::info!(
        "Game initialized with seed: {seed}, {} enemies",
        state.enemies.len()
    );

    let mut bumps = 0usize;
    for t in 0..DEMO_TICKS {
        tick(&mut state, &scripted_input(t), SIM_DT);
        for event in state.drain_events() {
            match event {
                GameEvent::Bump { .. } => bumps += 1,
                GameEvent::AttackSwing { .. } => log::trace!("Tick {t}: {event:?}"),
                _ => log::debug!("Tick {t}: {event:?}"),
            }
        }
        if state.phase != GamePhase::Playing {
            break;
        }
    }

    if let Some(player) = &state.player {
        log::info!(
            "Player at ({}, {}) with {} health",
            player.pos.x,
            player.pos.y,
            player.health
        );
    }
    log::info!(
        "Finished after {} ticks: {:?}, {bumps} bumps, {} enemies left",
        state.time_ticks,
        state.phase,
        state.enemies.len()
    );
}
