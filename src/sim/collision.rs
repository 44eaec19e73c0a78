//! Continuous collision detection for axis-aligned boxes
//!
//! The tricky part of the dungeon: a mover can cover several pixels in one
//! tick, so overlap tests at the end position tunnel through thin walls.
//! Instead the mover's box is swept along its displacement and the time of
//! impact is computed with the slab method.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Ray, Rect};

/// Result of a sweep test
///
/// `time_hit` is parametric along the ray: 0 is the origin, 1 is the end of
/// this tick's displacement. Negative values mean the target lies behind the
/// origin *or* the sweep started overlapping it; the two cases are not
/// distinguished. A `hit` only matters this tick when `time_hit` is in
/// `[0, 1]`, see [`CollisionResult::is_within_step`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionResult {
    /// Whether the ray intersects the target
    pub hit: bool,
    /// Parametric entry time (`f32::INFINITY` for a miss)
    pub time_hit: f32,
    /// Point where the ray enters the target
    pub contact_point: Vec2,
    /// Unit axis normal of the entered face, pointing back at the ray
    pub normal: Vec2,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            time_hit: f32::INFINITY,
            contact_point: Vec2::ZERO,
            normal: Vec2::ZERO,
        }
    }

    /// Hit that lands inside this tick's movement window
    #[inline]
    pub fn is_within_step(&self) -> bool {
        self.hit && (0.0..=1.0).contains(&self.time_hit)
    }
}

/// Intersect a ray with an axis-aligned rectangle (slab method)
///
/// A zero-length ray or a zero-size rectangle never hits. An axis whose
/// slab test divides 0 by 0 (ray parallel to and lying on an edge) counts as
/// a miss; infinities from a zero direction component are kept so the other
/// axis decides.
pub fn ray_rect_collision(ray: &Ray, rect: &Rect) -> CollisionResult {
    if ray.direction == Vec2::ZERO || rect.is_degenerate() {
        return CollisionResult::miss();
    }

    let mut near = (rect.pos() - ray.origin) / ray.direction;
    let mut far = (rect.max() - ray.origin) / ray.direction;

    if near.x.is_nan() || near.y.is_nan() || far.x.is_nan() || far.y.is_nan() {
        return CollisionResult::miss();
    }

    if near.x > far.x {
        std::mem::swap(&mut near.x, &mut far.x);
    }
    if near.y > far.y {
        std::mem::swap(&mut near.y, &mut far.y);
    }

    if near.x > far.y || near.y > far.x {
        return CollisionResult::miss();
    }

    let t_enter = near.x.max(near.y);
    let t_exit = far.x.min(far.y);

    // Whole rectangle is behind the origin
    if t_exit < 0.0 {
        return CollisionResult::miss();
    }

    // Exact corner entries resolve on x
    let normal = if near.x >= near.y {
        if ray.direction.x < 0.0 {
            Vec2::X
        } else {
            Vec2::NEG_X
        }
    } else if ray.direction.y < 0.0 {
        Vec2::Y
    } else {
        Vec2::NEG_Y
    };

    CollisionResult {
        hit: true,
        time_hit: t_enter,
        contact_point: ray.at(t_enter),
        normal,
    }
}

/// Sweep `moving` along `displacement` against a stationary `target`
///
/// `displacement` is this tick's movement (velocity already scaled by the
/// frame delta). The target is inflated by the mover's half extents and a
/// ray is cast from the mover's center. Impacts past the end of the step
/// (`time_hit > 1`) are reported as misses, as is a zero-size target.
pub fn hitbox_collision(moving: &Rect, displacement: Vec2, target: &Rect) -> CollisionResult {
    if displacement == Vec2::ZERO || target.is_degenerate() {
        return CollisionResult::miss();
    }

    let expanded = target.expanded(moving.size() / 2.0);
    let ray = Ray::new(moving.center(), displacement);

    let mut result = ray_rect_collision(&ray, &expanded);
    if result.time_hit > 1.0 {
        result.hit = false;
    }
    result
}
