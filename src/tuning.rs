//! Data-driven game balance
//!
//! Loaded from JSON; any field left out falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;

/// Gameplay constants that designers are expected to tweak
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    /// Player movement speed (pixels/s)
    pub player_speed: f32,
    /// Player hitbox width/height (pixels)
    pub player_size: (f32, f32),
    pub player_health: i32,
    /// Damage dealt by one sword swing
    pub attack_damage: i32,
    /// How far the swing reaches past the player's hitbox (pixels)
    pub attack_reach: f32,
    /// Ticks between swings
    pub attack_cooldown_ticks: u32,
    /// Ticks of invulnerability after taking damage
    pub invulnerable_ticks: u32,

    // === Enemies ===
    pub enemy_speed: f32,
    pub enemy_size: (f32, f32),
    pub enemy_health: i32,
    /// Damage dealt to the player when an enemy walks into them
    pub contact_damage: i32,
    /// Enemies chase the player inside this distance (pixels, center to center)
    pub aggro_radius: f32,
    /// Ticks between wander direction changes
    pub wander_interval_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 300.0,
            player_size: (PLAYER_WIDTH, PLAYER_HEIGHT),
            player_health: 6,
            attack_damage: 2,
            attack_reach: 12.0,
            attack_cooldown_ticks: 20,
            invulnerable_ticks: 45,

            enemy_speed: 90.0,
            enemy_size: (ENEMY_WIDTH, ENEMY_HEIGHT),
            enemy_health: 3,
            contact_damage: 1,
            aggro_radius: 96.0,
            wander_interval_ticks: 60,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from a JSON string
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), TuningError> {
        let invalid = |field: &'static str, reason: &'static str| -> Result<(), TuningError> {
            Err(TuningError::Invalid { field, reason })
        };

        if !(self.player_speed.is_finite() && self.player_speed >= 0.0) {
            return invalid("player_speed", "must be finite and non-negative");
        }
        if !(self.enemy_speed.is_finite() && self.enemy_speed >= 0.0) {
            return invalid("enemy_speed", "must be finite and non-negative");
        }
        if !valid_size(self.player_size) {
            return invalid("player_size", "must be finite and non-negative");
        }
        if !valid_size(self.enemy_size) {
            return invalid("enemy_size", "must be finite and non-negative");
        }
        if self.player_health <= 0 {
            return invalid("player_health", "must be positive");
        }
        if self.enemy_health <= 0 {
            return invalid("enemy_health", "must be positive");
        }
        if self.wander_interval_ticks == 0 {
            return invalid("wander_interval_ticks", "must be at least 1");
        }
        Ok(())
    }
}

fn valid_size((w, h): (f32, f32)) -> bool {
    w.is_finite() && h.is_finite() && w >= 0.0 && h >= 0.0
}
