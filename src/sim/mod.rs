//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod candidates;
pub mod collision;
pub mod entity;
pub mod geometry;
pub mod resolve;
pub mod state;
pub mod tick;
pub mod tiles;

pub use candidates::{CandidateHit, CandidateList};
pub use collision::{CollisionResult, hitbox_collision, ray_rect_collision};
pub use entity::{Entity, EntityKind, Facing};
pub use geometry::{Ray, Rect};
pub use resolve::{
    Impact, MAX_RESOLVE_PASSES, Resolution, apply_candidates, integrate, resolve,
    resolve_until_stable,
};
pub use state::{GameEvent, GamePhase, GameState, ObstacleSource, RngState};
pub use tick::{TickInput, tick};
pub use tiles::{Tile, TileCoord, TileGrid, swept_bounds};
