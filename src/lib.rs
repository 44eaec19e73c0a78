//! Dungeon Sweep - A top-down tile dungeon with swept hitbox collision
//!
//! Core modules:
//! - `sim`: Deterministic simulation (sweeps, resolution, entities, game state)
//! - `tuning`: Data-driven game balance
//! - `error`: Error types shared across the simulation

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::{CollisionError, GridError, TuningError};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Edge length of one square tile, in pixels
    pub const TILE_SIZE: f32 = 16.0;

    /// Player hitbox (pixels)
    pub const PLAYER_WIDTH: f32 = 16.0;
    pub const PLAYER_HEIGHT: f32 = 32.0;

    /// Enemy hitbox (pixels)
    pub const ENEMY_WIDTH: f32 = 16.0;
    pub const ENEMY_HEIGHT: f32 = 16.0;
}

/// Values this close to a whole pixel are treated as that pixel
pub const PIXEL_SNAP_EPSILON: f32 = 1e-3;

/// Round a per-axis displacement to whole pixels, biased toward zero.
///
/// Negative values use `ceil`, positive values use `floor`, so a mover never
/// travels further than its resolved displacement in either direction.
/// Unlike a plain `ceil`/`floor`, a value within [`PIXEL_SNAP_EPSILON`] of a
/// whole pixel snaps to it first. A contact distance that lands a hair under
/// a whole pixel (1.9999998) would otherwise leave movers one pixel short of
/// walls. The snap can move at most `PIXEL_SNAP_EPSILON` past the resolved
/// value, which never crosses a wall on the integer pixel grid.
#[inline]
pub fn round_toward_zero(v: f32) -> i32 {
    let nearest = v.round();
    if (v - nearest).abs() < PIXEL_SNAP_EPSILON {
        return nearest as i32;
    }
    if v < 0.0 { v.ceil() as i32 } else { v.floor() as i32 }
}
