//! Error types
//!
//! Degenerate geometry is never an error: a zero-length sweep or a NaN slab
//! is simply a miss. These enums cover contract violations and resource
//! failures only.

use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while building or applying a candidate list
#[derive(Debug, Error)]
pub enum CollisionError {
    #[error("failed to reserve candidate list storage: {0}")]
    CandidateAlloc(#[from] TryReserveError),

    #[error("obstacle index {index} out of range ({len} obstacles)")]
    ObstacleIndexOutOfRange { index: usize, len: usize },
}

/// Tile grid contract violations
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("tile ({col}, {row}) outside {cols}x{rows} grid")]
    OutOfBounds {
        col: i32,
        row: i32,
        cols: u32,
        rows: u32,
    },

    #[error("{width}x{height} hitbox at tile ({col}, {row}) leaves the level or overlaps a wall")]
    SpawnBlocked {
        col: i32,
        row: i32,
        width: f32,
        height: f32,
    },
}

/// Failures loading gameplay tuning
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
