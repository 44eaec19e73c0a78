//! Movers: the player and enemies
//!
//! Positions are whole pixels. The collision core only reads `rect()` and
//! hands back a corrected displacement; everything else here is gameplay.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::resolve::integrate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy,
}

/// Which way an entity is looking (drives the attack box and sprites)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    /// Dominant axis of `direction`; `None` for a zero vector
    ///
    /// Horizontal wins exact diagonals.
    pub fn from_direction(direction: Vec2) -> Option<Self> {
        if direction == Vec2::ZERO {
            return None;
        }
        Some(if direction.x.abs() >= direction.y.abs() {
            if direction.x < 0.0 { Facing::Left } else { Facing::Right }
        } else if direction.y < 0.0 {
            Facing::Up
        } else {
            Facing::Down
        })
    }

    pub fn unit(self) -> Vec2 {
        match self {
            Facing::Up => Vec2::NEG_Y,
            Facing::Down => Vec2::Y,
            Facing::Left => Vec2::NEG_X,
            Facing::Right => Vec2::X,
        }
    }
}

/// A moving, damageable entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// Top-left corner of the hitbox (pixels)
    pub pos: IVec2,
    /// Hitbox size (pixels)
    pub size: Vec2,
    /// Movement intent for this tick, length 0..=1
    pub direction: Vec2,
    /// Pixels per second at full intent
    pub speed: f32,
    pub health: i32,
    pub max_health: i32,
    pub facing: Facing,
    /// Ticks until the next attack is allowed
    #[serde(default)]
    pub attack_cooldown: u32,
    /// Ticks of damage immunity left
    #[serde(default)]
    pub invulnerable_ticks: u32,
    /// Fraction of a pixel carried over from the last integration
    #[serde(default)]
    pub subpixel: Vec2,
    /// Displacement left after collision resolution on the last move
    #[serde(default)]
    pub last_displacement: Vec2,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, pos: IVec2, size: Vec2, speed: f32, health: i32) -> Self {
        Self {
            id,
            kind,
            pos,
            size,
            direction: Vec2::ZERO,
            speed,
            health,
            max_health: health,
            facing: Facing::default(),
            attack_cooldown: 0,
            invulnerable_ticks: 0,
            subpixel: Vec2::ZERO,
            last_displacement: Vec2::ZERO,
        }
    }

    /// Current hitbox
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos.as_vec2(), self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    /// Movement over one tick of length `dt`
    #[inline]
    pub fn displacement(&self, dt: f32) -> Vec2 {
        self.direction * self.speed * dt
    }

    /// Displacement to resolve this tick, including carried sub-pixel motion
    pub fn planned_displacement(&self, dt: f32) -> Vec2 {
        self.displacement(dt) + self.subpixel
    }

    /// Integrate a resolved displacement into the pixel position
    ///
    /// Whole pixels move the entity; the remainder is carried to the next
    /// tick so slow movers are not stuck by rounding.
    pub fn apply_displacement(&mut self, resolved: Vec2) {
        self.last_displacement = resolved;
        let next = integrate(self.pos, resolved);
        self.subpixel = resolved - (next - self.pos).as_vec2();
        self.pos = next;
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        self.kind == EntityKind::Player
    }

    /// Set the movement intent, turning to face it when non-zero
    pub fn steer(&mut self, direction: Vec2) {
        self.direction = direction.clamp_length_max(1.0);
        match Facing::from_direction(self.direction) {
            Some(facing) => self.facing = facing,
            None => self.subpixel = Vec2::ZERO,
        }
    }

    /// Apply damage unless invulnerable; returns whether it landed
    pub fn take_damage(&mut self, amount: i32, invulnerable_ticks: u32) -> bool {
        if amount <= 0 || self.invulnerable_ticks > 0 || !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount).max(0);
        self.invulnerable_ticks = invulnerable_ticks;
        true
    }

    /// Box swept by a melee swing, `reach` pixels deep on the facing side
    pub fn attack_rect(&self, reach: f32) -> Rect {
        let r = self.rect();
        match self.facing {
            Facing::Up => Rect::new(r.x, r.y - reach, r.width, reach),
            Facing::Down => Rect::new(r.x, r.y + r.height, r.width, reach),
            Facing::Left => Rect::new(r.x - reach, r.y, reach, r.height),
            Facing::Right => Rect::new(r.x + r.width, r.y, reach, r.height),
        }
    }

    /// Count down per-tick timers
    pub fn tick_timers(&mut self) {
        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);
        self.invulnerable_ticks = self.invulnerable_ticks.saturating_sub(1);
    }
}
