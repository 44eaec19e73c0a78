//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives here, so two states built from
//! the same seed and fed the same inputs stay identical.

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind};
use super::geometry::Rect;
use super::tiles::{TileCoord, TileGrid};
use crate::error::GridError;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Every enemy is dead
    Cleared,
    /// Player died
    GameOver,
}

/// What an obstacle index handed to the resolver refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleSource {
    Tile(TileCoord),
    Entity(u32),
}

/// Things that happened during a tick, drained by the caller for
/// sound/animation hooks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A mover's displacement was cut short by an obstacle
    Bump {
        entity: u32,
        obstacle: ObstacleSource,
        normal: Vec2,
    },
    /// The player swung their weapon
    AttackSwing { entity: u32 },
    Damaged {
        entity: u32,
        by: u32,
        amount: i32,
        health_left: i32,
    },
    Died { entity: u32 },
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Stream for one entity on one tick
    ///
    /// Derived rather than stored so iteration order cannot shift draws
    /// between entities.
    pub fn to_rng(&self, tick: u64, salt: u32) -> Pcg32 {
        let mixed = self
            .seed
            .wrapping_mul(0x9E37_79B9_7F4A_7C15)
            .wrapping_add(tick.rotate_left(17))
            ^ u64::from(salt).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        Pcg32::seed_from_u64(mixed)
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Static level geometry
    pub grid: TileGrid,
    pub tuning: Tuning,
    /// The player, if spawned
    pub player: Option<Entity>,
    /// Live enemies (sorted by id for determinism)
    pub enemies: Vec<Entity>,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, grid: TileGrid, tuning: Tuning) -> Self {
        Self {
            seed,
            rng_state: RngState::new(seed),
            time_ticks: 0,
            phase: GamePhase::Playing,
            grid,
            tuning,
            player: None,
            enemies: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place the player with its top-left on tile (`col`, `row`)
    pub fn spawn_player(&mut self, col: i32, row: i32) -> Result<u32, GridError> {
        let size = Vec2::from(self.tuning.player_size);
        let pos = self.spawn_position(col, row, size)?;
        let id = self.next_entity_id();
        self.player = Some(Entity::new(
            id,
            EntityKind::Player,
            pos,
            size,
            self.tuning.player_speed,
            self.tuning.player_health,
        ));
        Ok(id)
    }

    /// Place an enemy with its top-left on tile (`col`, `row`)
    pub fn spawn_enemy(&mut self, col: i32, row: i32) -> Result<u32, GridError> {
        let size = Vec2::from(self.tuning.enemy_size);
        let pos = self.spawn_position(col, row, size)?;
        let id = self.next_entity_id();
        self.enemies.push(Entity::new(
            id,
            EntityKind::Enemy,
            pos,
            size,
            self.tuning.enemy_speed,
            self.tuning.enemy_health,
        ));
        Ok(id)
    }

    /// Top-left pixel for a hitbox of `size` placed on tile (`col`, `row`)
    ///
    /// The whole hitbox must sit inside the level and clear of walls: sweeps
    /// ignore obstacles a mover starts inside, so a spawn overlapping a wall
    /// could walk straight through it.
    fn spawn_position(&self, col: i32, row: i32, size: Vec2) -> Result<IVec2, GridError> {
        // Validates the coordinates
        self.grid.tile(col, row)?;
        let origin = self.grid.tile_origin(col as u32, row as u32);
        let footprint = Rect::from_pos_size(origin, size);

        let bounds = self.grid.bounds();
        let max = footprint.max();
        let inside = max.x <= bounds.width && max.y <= bounds.height;
        let blocked = self
            .grid
            .solid_tiles_in(&footprint)
            .iter()
            .any(|(_, tile)| tile.overlaps(&footprint));
        if !inside || blocked {
            return Err(GridError::SpawnBlocked {
                col,
                row,
                width: size.x,
                height: size.y,
            });
        }
        Ok(origin.as_ivec2())
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.player
            .iter()
            .chain(self.enemies.iter())
            .find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: u32) -> Option<&mut Entity> {
        self.player
            .iter_mut()
            .chain(self.enemies.iter_mut())
            .find(|e| e.id == id)
    }

    /// Take all events produced so far
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure enemies are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
    }
}
