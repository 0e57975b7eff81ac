//! Error types
//!
//! Simulation errors are fatal to a run: the session turns them into
//! `SessionPhase::Ended` rather than bubbling them to the caller.

use std::path::PathBuf;

use crate::sim::piece::PieceKind;

/// Fatal simulation conditions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// A freshly spawned piece overlaps locked cells
    #[error("spawn blocked for {kind:?} piece")]
    SpawnBlocked { kind: PieceKind },
    /// Locking a piece onto a cell that is already merged
    #[error("merge overlap at ({x}, {y})")]
    MergeOverlap { x: i32, y: i32 },
    /// Locking a piece cell outside the tetris band
    #[error("merge out of bounds at ({x}, {y})")]
    MergeOutOfBounds { x: i32, y: i32 },
}

/// Failures while loading or validating [`crate::Tuning`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Leaderboard failures (never affect the simulation)
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("leaderboard storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("leaderboard data error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("initials are required")]
    InvalidInitials,
    #[error("score {0} does not qualify for the leaderboard")]
    NotHighScore(u64),
}
