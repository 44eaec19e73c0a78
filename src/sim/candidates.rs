//! Per-tick candidate list
//!
//! One entry per obstacle the mover would run into during this tick. The
//! list is built, sorted by time of impact and consumed inside a single
//! resolution pass; it never survives into the next tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::hitbox_collision;
use super::geometry::Rect;
use crate::error::CollisionError;

/// An obstacle the mover would hit, and when
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateHit {
    /// Index into the obstacle slice the list was built from
    pub obstacle: usize,
    /// Time of impact along this tick's displacement
    pub time_hit: f32,
}

/// Ordered collection of [`CandidateHit`]s
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateList {
    hits: Vec<CandidateHit>,
}

impl CandidateList {
    pub fn new() -> Self {
        Self { hits: Vec::new() }
    }

    /// Sweep `mover` against every obstacle and keep in-window hits
    ///
    /// Only hits with `0 <= time_hit <= 1` are kept; boxes the mover already
    /// overlaps (negative time) are skipped. The list comes back unsorted, in
    /// obstacle order.
    pub fn collect(
        mover: &Rect,
        displacement: Vec2,
        obstacles: &[Rect],
    ) -> Result<Self, CollisionError> {
        let mut list = Self::new();
        if displacement == Vec2::ZERO {
            return Ok(list);
        }

        for (index, obstacle) in obstacles.iter().enumerate() {
            let result = hitbox_collision(mover, displacement, obstacle);
            if result.is_within_step() {
                list.push(CandidateHit {
                    obstacle: index,
                    time_hit: result.time_hit,
                })?;
            }
        }
        Ok(list)
    }

    /// Append a candidate
    ///
    /// Storage is reserved fallibly so an allocation failure reaches the
    /// caller as an error instead of aborting the process.
    pub fn push(&mut self, hit: CandidateHit) -> Result<(), CollisionError> {
        self.hits.try_reserve(1)?;
        self.hits.push(hit);
        Ok(())
    }

    /// Sort ascending by time of impact
    ///
    /// Stable: candidates with equal times keep their insertion order.
    pub fn sort(&mut self) {
        self.hits.sort_by(|a, b| a.time_hit.total_cmp(&b.time_hit));
    }

    /// Check every index against an obstacle count
    pub fn validate(&self, obstacle_count: usize) -> Result<(), CollisionError> {
        match self.hits.iter().find(|h| h.obstacle >= obstacle_count) {
            Some(bad) => Err(CollisionError::ObstacleIndexOutOfRange {
                index: bad.obstacle,
                len: obstacle_count,
            }),
            None => Ok(()),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateHit> {
        self.hits.iter()
    }

    pub fn as_slice(&self) -> &[CandidateHit] {
        &self.hits
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a CandidateHit;
    type IntoIter = std::slice::Iter<'a, CandidateHit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}
