//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. `dt` is
//! sampled once by the caller and used for every sweep in the tick.

use glam::Vec2;
use rand::Rng;

use super::entity::Entity;
use super::geometry::Rect;
use super::resolve::{MAX_RESOLVE_PASSES, Resolution, resolve_until_stable};
use super::state::{GameEvent, GamePhase, GameState, ObstacleSource};
use super::tiles::swept_bounds;
use crate::error::CollisionError;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement, length 0..=1 (longer vectors are clamped)
    pub movement: Vec2,
    /// Swing the weapon this tick
    pub attack: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;
    state.normalize_order();

    if let Some(player) = state.player.as_mut() {
        player.tick_timers();
        if player.is_alive() {
            player.steer(input.movement);
        }
    }
    for enemy in &mut state.enemies {
        enemy.tick_timers();
    }
    steer_enemies(state);

    // Player first, then enemies by id
    let movers: Vec<u32> = state
        .player
        .iter()
        .chain(state.enemies.iter())
        .filter(|e| e.is_alive())
        .map(|e| e.id)
        .collect();
    for id in movers {
        move_entity(state, id, dt);
    }

    if input.attack {
        player_attack(state);
    }

    settle(state);
}

/// Pick this tick's direction for every enemy
///
/// Enemies chase a living player inside `aggro_radius`, otherwise they
/// wander: every `wander_interval_ticks` (offset by id) they pick a
/// cardinal direction or stand still.
fn steer_enemies(state: &mut GameState) {
    let GameState {
        rng_state,
        time_ticks,
        tuning,
        player,
        enemies,
        ..
    } = state;

    let target = player
        .as_ref()
        .filter(|p| p.is_alive())
        .map(|p| p.center());
    let interval = u64::from(tuning.wander_interval_ticks.max(1));

    for enemy in enemies.iter_mut() {
        let to_player = target.map(|t| t - enemy.center());
        match to_player {
            Some(offset) if offset.length() <= tuning.aggro_radius => {
                enemy.steer(offset.normalize_or_zero());
            }
            _ => {
                if (*time_ticks + u64::from(enemy.id)) % interval == 0 {
                    let mut rng = rng_state.to_rng(*time_ticks, enemy.id);
                    let direction = match rng.random_range(0..5) {
                        0 => Vec2::ZERO,
                        1 => Vec2::NEG_Y,
                        2 => Vec2::Y,
                        3 => Vec2::NEG_X,
                        _ => Vec2::X,
                    };
                    enemy.steer(direction);
                }
            }
        }
    }
}

/// Gather the obstacles near `mover`'s path and resolve its displacement
///
/// Returns the resolution plus, for each obstacle index, what it was.
fn plan_move(
    state: &GameState,
    mover: &Entity,
    displacement: Vec2,
) -> Result<(Resolution, Vec<ObstacleSource>), CollisionError> {
    if displacement == Vec2::ZERO {
        return Ok((Resolution::unobstructed(displacement), Vec::new()));
    }

    let rect = mover.rect();
    let area = swept_bounds(&rect, displacement);

    let mut obstacles: Vec<Rect> = Vec::new();
    let mut sources = Vec::new();
    for (coord, tile_rect) in state.grid.solid_tiles_in(&area) {
        obstacles.push(tile_rect);
        sources.push(ObstacleSource::Tile(coord));
    }

    // One pixel of slack so movers already touching still count
    let near = area.expanded(Vec2::ONE);
    for other in state.player.iter().chain(state.enemies.iter()) {
        if other.id == mover.id || !other.is_alive() {
            continue;
        }
        let other_rect = other.rect();
        if near.overlaps(&other_rect) {
            obstacles.push(other_rect);
            sources.push(ObstacleSource::Entity(other.id));
        }
    }

    let resolution = resolve_until_stable(&rect, displacement, &obstacles, MAX_RESOLVE_PASSES)?;
    Ok((resolution, sources))
}

fn move_entity(state: &mut GameState, id: u32, dt: f32) {
    let Some(mover) = state.entity(id) else {
        return;
    };
    let displacement = mover.planned_displacement(dt);

    let (resolution, sources) = match plan_move(state, mover, displacement) {
        Ok(planned) => planned,
        Err(err) => {
            log::warn!("Skipping movement for entity {id} this tick: {err}");
            return;
        }
    };

    for impact in &resolution.impacts {
        let Some(&source) = sources.get(impact.obstacle) else {
            continue;
        };
        state.events.push(GameEvent::Bump {
            entity: id,
            obstacle: source,
            normal: impact.normal,
        });
        if let ObstacleSource::Entity(other) = source {
            contact(state, id, other);
        }
    }

    if let Some(mover) = state.entity_mut(id) {
        mover.apply_displacement(resolution.displacement);
    }
}

/// Enemy and player bumped into each other: the player takes contact damage
fn contact(state: &mut GameState, a: u32, b: u32) {
    let Some(player_id) = state.player.as_ref().map(|p| p.id) else {
        return;
    };
    let enemy_id = if a == player_id {
        b
    } else if b == player_id {
        a
    } else {
        return;
    };

    let amount = state.tuning.contact_damage;
    let invulnerable = state.tuning.invulnerable_ticks;
    if let Some(player) = state.player.as_mut() {
        if player.take_damage(amount, invulnerable) {
            log::debug!("Player hit by enemy {enemy_id}, health {}", player.health);
            state.events.push(GameEvent::Damaged {
                entity: player.id,
                by: enemy_id,
                amount,
                health_left: player.health,
            });
        }
    }
}

/// Swing in the facing direction, hitting every enemy in reach
fn player_attack(state: &mut GameState) {
    let Some(player) = state.player.as_mut() else {
        return;
    };
    if !player.is_alive() || player.attack_cooldown > 0 {
        return;
    }
    player.attack_cooldown = state.tuning.attack_cooldown_ticks;
    let player_id = player.id;
    let area = player.attack_rect(state.tuning.attack_reach);
    state.events.push(GameEvent::AttackSwing { entity: player_id });

    let amount = state.tuning.attack_damage;
    for enemy in &mut state.enemies {
        if !enemy.is_alive() || !area.overlaps(&enemy.rect()) {
            continue;
        }
        if enemy.take_damage(amount, 0) {
            state.events.push(GameEvent::Damaged {
                entity: enemy.id,
                by: player_id,
                amount,
                health_left: enemy.health,
            });
        }
    }
}

/// Remove the dead and update the phase
fn settle(state: &mut GameState) {
    let mut killed = 0;
    for enemy in state.enemies.iter().filter(|e| !e.is_alive()) {
        state.events.push(GameEvent::Died { entity: enemy.id });
        killed += 1;
    }
    state.enemies.retain(|e| e.is_alive());

    if let Some(player) = state.player.as_ref().filter(|p| !p.is_alive()) {
        state.events.push(GameEvent::Died { entity: player.id });
        state.phase = GamePhase::GameOver;
        log::info!("Player died on tick {}", state.time_ticks);
    } else if killed > 0 && state.enemies.is_empty() {
        state.phase = GamePhase::Cleared;
        log::info!("Level cleared on tick {}", state.time_ticks);
    }
}
