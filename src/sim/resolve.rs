//! Collision resolution for one mover over one tick
//!
//! 1. Sweep the mover against every obstacle, keep hits inside the step
//! 2. Sort them by time of impact
//! 3. Walk the sorted list, re-sweeping each obstacle with the displacement
//!    corrected so far, and cancel the part of the motion that would carry
//!    the mover past the contact point
//!
//! Motion along the contact face is preserved, so movers slide along walls.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::candidates::CandidateList;
use super::collision::hitbox_collision;
use super::geometry::Rect;
use crate::error::CollisionError;
use crate::round_toward_zero;

/// One contact applied during resolution, in the order it was applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    /// Index into the obstacle slice passed to [`resolve`]
    pub obstacle: usize,
    pub time_hit: f32,
    pub normal: Vec2,
    /// Mover center at the moment of contact
    pub contact_point: Vec2,
}

/// Output of [`resolve`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resolution {
    /// Corrected displacement, safe to integrate this tick
    pub displacement: Vec2,
    /// Contacts in time order (for sound/animation hooks)
    pub impacts: Vec<Impact>,
}

impl Resolution {
    pub fn unobstructed(displacement: Vec2) -> Self {
        Self {
            displacement,
            impacts: Vec::new(),
        }
    }

    #[inline]
    pub fn blocked(&self) -> bool {
        !self.impacts.is_empty()
    }
}

/// Correct `displacement` so `mover` does not pass through any obstacle
///
/// Obstacles the mover already overlaps are ignored (their impact time is
/// negative). An empty obstacle slice returns the displacement untouched.
pub fn resolve(
    mover: &Rect,
    displacement: Vec2,
    obstacles: &[Rect],
) -> Result<Resolution, CollisionError> {
    if obstacles.is_empty() || displacement == Vec2::ZERO {
        return Ok(Resolution::unobstructed(displacement));
    }

    let mut candidates = CandidateList::collect(mover, displacement, obstacles)?;
    if candidates.is_empty() {
        return Ok(Resolution::unobstructed(displacement));
    }
    candidates.sort();

    apply_candidates(mover, displacement, obstacles, &candidates)
}

/// Apply an already sorted candidate list to `displacement`
///
/// Every candidate index must refer to `obstacles`; a stale or foreign list
/// is rejected before any correction is applied.
pub fn apply_candidates(
    mover: &Rect,
    displacement: Vec2,
    obstacles: &[Rect],
    candidates: &CandidateList,
) -> Result<Resolution, CollisionError> {
    candidates.validate(obstacles.len())?;

    let mut displacement = displacement;
    let mut impacts = Vec::new();
    impacts.try_reserve(candidates.len())?;

    for candidate in candidates {
        let obstacle = &obstacles[candidate.obstacle];
        // Earlier contacts may have changed the path
        let result = hitbox_collision(mover, displacement, obstacle);
        if !(result.hit && result.time_hit >= 0.0) {
            continue;
        }

        displacement += result.normal * displacement.abs() * (1.0 - result.time_hit);
        log::trace!(
            "impact obstacle={} t={:.3} normal={:?} -> {:?}",
            candidate.obstacle,
            result.time_hit,
            result.normal,
            displacement
        );

        impacts.push(Impact {
            obstacle: candidate.obstacle,
            time_hit: result.time_hit,
            normal: result.normal,
            contact_point: result.contact_point,
        });
    }

    Ok(Resolution {
        displacement,
        impacts,
    })
}

/// Upper bound on passes made by [`resolve_until_stable`]
pub const MAX_RESOLVE_PASSES: usize = 4;

/// Displacements closer than this are the same pass result
const SETTLE_EPSILON: f32 = 1e-4;

/// Re-run [`resolve`] on its own output until the displacement stops changing
///
/// A single pass only re-checks obstacles that were candidates for the
/// original path. Once a correction bends the path (pushed off a wall, now
/// moving straight down) it can reach an obstacle the original path missed.
/// Repeating the pass catches that. If the result still moves after
/// `max_passes`, the mover holds position for this tick.
pub fn resolve_until_stable(
    mover: &Rect,
    displacement: Vec2,
    obstacles: &[Rect],
    max_passes: usize,
) -> Result<Resolution, CollisionError> {
    let mut total = Resolution::unobstructed(displacement);

    for _ in 0..max_passes {
        let pass = resolve(mover, total.displacement, obstacles)?;
        let settled = (pass.displacement - total.displacement)
            .abs()
            .max_element()
            < SETTLE_EPSILON;

        total.impacts.try_reserve(pass.impacts.len())?;
        for impact in pass.impacts {
            // A settled pass repeats contacts that are already recorded
            if settled && total.impacts.iter().any(|i| i.obstacle == impact.obstacle) {
                continue;
            }
            total.impacts.push(impact);
        }
        total.displacement = pass.displacement;

        if settled {
            return Ok(total);
        }
    }

    log::debug!("Resolution did not settle after {max_passes} passes, holding position");
    total.displacement = Vec2::ZERO;
    Ok(total)
}

/// Move a pixel position by a resolved displacement
///
/// Each axis is rounded toward zero, so the mover never ends up further
/// along than the resolved (collision-free) displacement allows.
pub fn integrate(position: IVec2, displacement: Vec2) -> IVec2 {
    position
        + IVec2::new(
            round_toward_zero(displacement.x),
            round_toward_zero(displacement.y),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::candidates::CandidateHit;
    use proptest::prelude::*;

    fn unit_box(x: f32, y: f32) -> Rect {
        Rect::new(x, y, 10.0, 10.0)
    }

    #[test]
    fn test_empty_obstacles_is_noop() {
        let d = Vec2::new(3.5, -2.25);
        let resolution = resolve(&unit_box(0.0, 0.0), d, &[]).unwrap();
        assert_eq!(resolution.displacement, d);
        assert!(!resolution.blocked());
    }

    #[test]
    fn test_head_on_stops_at_contact() {
        let resolution = resolve(
            &unit_box(0.0, 0.0),
            Vec2::new(20.0, 0.0),
            &[unit_box(20.0, 0.0)],
        )
        .unwrap();
        assert!((resolution.displacement.x - 10.0).abs() < 1e-5);
        assert_eq!(resolution.displacement.y, 0.0);
        assert_eq!(resolution.impacts.len(), 1);
        assert_eq!(resolution.impacts[0].normal, Vec2::NEG_X);
    }

    #[test]
    fn test_slides_along_wall() {
        let wall = Rect::new(15.0, -50.0, 10.0, 200.0);
        let resolution = resolve(&unit_box(0.0, 0.0), Vec2::new(10.0, 10.0), &[wall]).unwrap();
        assert!((resolution.displacement.x - 5.0).abs() < 1e-5);
        assert_eq!(resolution.displacement.y, 10.0);
    }

    #[test]
    fn test_slides_along_wall_moving_left_and_up() {
        let wall = Rect::new(-15.0, -100.0, 10.0, 200.0);
        let resolution = resolve(&unit_box(0.0, 0.0), Vec2::new(-10.0, -10.0), &[wall]).unwrap();
        assert!((resolution.displacement.x + 5.0).abs() < 1e-5);
        assert_eq!(resolution.displacement.y, -10.0);
        assert_eq!(resolution.impacts[0].normal, Vec2::X);
    }

    #[test]
    fn test_nearest_obstacle_resolved_first() {
        // Farthest listed first; only the nearest should end up touched
        let obstacles = [unit_box(35.0, 0.0), unit_box(25.0, 0.0), unit_box(15.0, 0.0)];
        let resolution = resolve(&unit_box(0.0, 0.0), Vec2::new(30.0, 0.0), &obstacles).unwrap();
        assert_eq!(resolution.impacts.len(), 1);
        assert_eq!(resolution.impacts[0].obstacle, 2);
        assert!((resolution.displacement.x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_seam_between_floor_tiles_does_not_snag() {
        // Landing diagonally across two adjacent tiles: both hit at t=0.5
        let floor = [unit_box(0.0, 15.0), unit_box(10.0, 15.0)];
        let resolution = resolve(&unit_box(0.0, 0.0), Vec2::new(5.0, 10.0), &floor).unwrap();
        assert_eq!(resolution.displacement.x, 5.0);
        assert!((resolution.displacement.y - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_corner_of_two_walls_stops_both_axes() {
        let walls = [
            Rect::new(15.0, -50.0, 10.0, 100.0), // right
            Rect::new(-50.0, 15.0, 100.0, 10.0), // below
        ];
        let resolution = resolve(&unit_box(0.0, 0.0), Vec2::new(10.0, 10.0), &walls).unwrap();
        assert!((resolution.displacement.x - 5.0).abs() < 1e-5);
        assert!((resolution.displacement.y - 5.0).abs() < 1e-5);
        assert_eq!(resolution.impacts.len(), 2);
    }

    #[test]
    fn test_overlapping_obstacle_is_ignored() {
        let d = Vec2::new(4.0, 0.0);
        let resolution = resolve(&unit_box(0.0, 0.0), d, &[unit_box(5.0, 0.0)]).unwrap();
        assert_eq!(resolution.displacement, d);
    }

    #[test]
    fn test_player_against_tile() {
        // 16x32 player running at 300 px/s into a 16x16 tile two pixels away
        let player = Rect::new(0.0, 0.0, 16.0, 32.0);
        let tile = Rect::new(18.0, 0.0, 16.0, 16.0);
        assert!((300.0 * SIM_DT - 5.0).abs() < 1e-5);
        let displacement = Vec2::new(5.0, 0.0);

        let mut candidates = CandidateList::collect(&player, displacement, &[tile]).unwrap();
        candidates.sort();
        assert_eq!(candidates.len(), 1);
        assert!((0.0..=1.0).contains(&candidates.as_slice()[0].time_hit));

        let resolution = apply_candidates(&player, displacement, &[tile], &candidates).unwrap();
        assert!(resolution.displacement.x < displacement.x);
        assert!(resolution.displacement.x >= 0.0);
        assert_eq!(resolution.displacement.y, 0.0);

        let pos = integrate(IVec2::ZERO, resolution.displacement);
        assert!((1..=2).contains(&pos.x));
        assert_eq!(pos.y, 0);
        let moved = Rect::from_pos_size(pos.as_vec2(), player.size());
        assert!(!moved.overlaps(&tile));
    }

    #[test]
    fn test_player_already_inside_tile_is_not_a_candidate() {
        let player = Rect::new(0.0, 0.0, 16.0, 32.0);
        let tile = Rect::new(10.0, 0.0, 16.0, 16.0);
        let list = CandidateList::collect(&player, Vec2::new(5.0, 0.0), &[tile]).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_foreign_candidate_index_rejected() {
        let mut list = CandidateList::new();
        list.push(CandidateHit {
            obstacle: 7,
            time_hit: 0.5,
        })
        .unwrap();
        let err = apply_candidates(
            &unit_box(0.0, 0.0),
            Vec2::new(20.0, 0.0),
            &[unit_box(20.0, 0.0)],
            &list,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CollisionError::ObstacleIndexOutOfRange { index: 7, len: 1 }
        ));
    }

    /// Pressed against a wall on the right, with a box below-left that the
    /// diagonal path clears but the straight-down corrected path does not
    fn bent_path_setup() -> (Rect, Vec2, [Rect; 2]) {
        let mover = Rect::new(0.0, 0.0, 16.0, 16.0);
        let wall = Rect::new(16.0, -50.0, 16.0, 200.0);
        let below_left = Rect::new(-13.0, 20.0, 16.0, 16.0);
        (mover, Vec2::new(5.0, 5.0), [wall, below_left])
    }

    #[test]
    fn test_single_pass_misses_obstacle_on_bent_path() {
        let (mover, d, obstacles) = bent_path_setup();
        let resolution = resolve(&mover, d, &obstacles).unwrap();
        assert_eq!(resolution.displacement, Vec2::new(0.0, 5.0));
        assert!(mover.translated(resolution.displacement).overlaps(&obstacles[1]));
    }

    #[test]
    fn test_repeated_passes_catch_bent_path() {
        let (mover, d, obstacles) = bent_path_setup();
        let resolution = resolve_until_stable(&mover, d, &obstacles, MAX_RESOLVE_PASSES).unwrap();
        assert_eq!(resolution.displacement.x, 0.0);
        assert!((resolution.displacement.y - 4.0).abs() < 1e-5);
        assert!(!mover.translated(resolution.displacement).overlaps(&obstacles[1]));

        let touched: Vec<usize> = resolution.impacts.iter().map(|i| i.obstacle).collect();
        assert_eq!(touched, vec![0, 1]);
    }

    #[test]
    fn test_repeated_passes_unobstructed_is_single_pass() {
        let d = Vec2::new(3.0, -1.0);
        let resolution =
            resolve_until_stable(&unit_box(0.0, 0.0), d, &[unit_box(50.0, 50.0)], 1).unwrap();
        assert_eq!(resolution.displacement, d);
        assert!(resolution.impacts.is_empty());
    }

    #[test]
    fn test_unsettled_resolution_holds_position() {
        let (mover, d, obstacles) = bent_path_setup();
        // One pass is not enough to settle this path
        let resolution = resolve_until_stable(&mover, d, &obstacles, 1).unwrap();
        assert_eq!(resolution.displacement, Vec2::ZERO);
    }

    #[test]
    fn test_integrate_rounds_toward_zero() {
        let start = IVec2::new(10, 10);
        assert_eq!(integrate(start, Vec2::new(2.9, -2.9)), IVec2::new(12, 8));
        assert_eq!(integrate(start, Vec2::new(-0.5, 0.5)), start);
    }

    fn arb_box() -> impl Strategy<Value = Rect> {
        (-100i32..100, -100i32..100, 1i32..40, 1i32..40)
            .prop_map(|(x, y, w, h)| Rect::new(x as f32, y as f32, w as f32, h as f32))
    }

    fn arb_displacement() -> impl Strategy<Value = Vec2> {
        (-30.0f32..30.0, -30.0f32..30.0).prop_map(|(x, y)| Vec2::new(x, y))
    }

    proptest! {
        #[test]
        fn prop_empty_obstacles_conserve(mover in arb_box(), d in arb_displacement()) {
            let resolution = resolve(&mover, d, &[]).unwrap();
            prop_assert_eq!(resolution.displacement, d);
        }

        #[test]
        fn prop_resolution_only_shortens(
            mover in arb_box(),
            d in arb_displacement(),
            obstacles in proptest::collection::vec(arb_box(), 0..8),
        ) {
            let out = resolve(&mover, d, &obstacles).unwrap().displacement;
            prop_assert!(out.x.abs() <= d.x.abs() + 1e-4);
            prop_assert!(out.y.abs() <= d.y.abs() + 1e-4);
            prop_assert!(out.x * d.x >= 0.0);
            prop_assert!(out.y * d.y >= 0.0);
        }

        #[test]
        fn prop_impacts_in_time_order(
            mover in arb_box(),
            d in arb_displacement(),
            obstacles in proptest::collection::vec(arb_box(), 0..8),
        ) {
            let resolution = resolve(&mover, d, &obstacles).unwrap();
            for impact in &resolution.impacts {
                prop_assert!(impact.obstacle < obstacles.len());
                prop_assert!((0.0..=1.0).contains(&impact.time_hit));
            }
        }

        #[test]
        fn prop_single_obstacle_never_tunneled(
            mover in arb_box(),
            d in arb_displacement(),
            obstacle in arb_box(),
        ) {
            prop_assume!(!mover.overlaps(&obstacle));
            let out = resolve(&mover, d, &[obstacle]).unwrap().displacement;
            let moved = mover.translated(out);
            // Shrink slightly so float error at a touching face is not an overlap
            let core = Rect::new(
                obstacle.x + 0.01,
                obstacle.y + 0.01,
                obstacle.width - 0.02,
                obstacle.height - 0.02,
            );
            prop_assert!(!moved.overlaps(&core));
        }

        #[test]
        fn prop_repeated_passes_never_tunnel(
            mover in arb_box(),
            d in arb_displacement(),
            obstacles in proptest::collection::vec(arb_box(), 0..8),
        ) {
            prop_assume!(obstacles.iter().all(|o| !mover.overlaps(o)));
            let out = resolve_until_stable(&mover, d, &obstacles, MAX_RESOLVE_PASSES)
                .unwrap()
                .displacement;
            let moved = mover.translated(out);
            for o in &obstacles {
                let core = Rect::new(o.x + 0.01, o.y + 0.01, o.width - 0.02, o.height - 0.02);
                prop_assert!(!moved.overlaps(&core));
            }
        }
    }
}
