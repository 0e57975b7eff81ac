//! TetroPong - falling blocks above, paddle and ball below, one shared playfield
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (grid, falling piece, ball/paddle physics, scoring)
//! - `tuning`: Data-driven game balance
//! - `leaderboard`: High score collaborator used after a run ends
//! - `error`: Error types for the simulation, config loading and leaderboard

pub mod error;
pub mod leaderboard;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, LeaderboardError, SimError};
pub use leaderboard::{Leaderboard, LocalLeaderboard};
pub use tuning::{DifficultyPreset, Tuning};

/// Game configuration constants (defaults for [`crate::Tuning`])
pub mod consts {
    /// Playfield width in cells
    pub const GRID_WIDTH: usize = 10;
    /// Rows where pieces fall, lock and clear
    pub const TETRIS_HEIGHT: usize = 20;
    /// Tetris band plus the pong band below it
    pub const TOTAL_HEIGHT: usize = 30;

    /// Ball/physics tick (20 Hz)
    pub const PHYSICS_TICK_MS: u32 = 50;
    /// Paddle tick, finer than physics so movement feels responsive
    pub const PADDLE_TICK_MS: u32 = 25;

    /// Gravity at score 0
    pub const INITIAL_DROP_MS: u32 = 800;
    /// Gravity never gets faster than this
    pub const DROP_FLOOR_MS: u32 = 100;

    /// Paddle defaults (grid units)
    pub const PADDLE_WIDTH: f32 = 3.0;
    pub const PADDLE_HEIGHT: f32 = 0.5;
    /// Cells per paddle tick at multiplier 1.0
    pub const PADDLE_SPEED: f32 = 0.2;

    /// Ball defaults (grid units)
    pub const BALL_RADIUS: f32 = 0.4;
    /// Cells per physics tick, per unit of direction
    pub const BALL_SPEED: f32 = 0.15;

    /// Horizontal direction at the paddle edge
    pub const PADDLE_ANGLE_FACTOR: f32 = 1.5;
    /// Minimum bounce angle off vertical; tan(11.31°) ≈ 0.2
    pub const MIN_BOUNCE_ANGLE_DEG: f32 = 11.31;

    /// Difficulty curve: SPEED_BASE ^ floor(score / LEVEL_THRESHOLD)
    pub const SPEED_BASE: f32 = 1.05;
    pub const LEVEL_THRESHOLD: u64 = 50;

    /// Points by lines cleared at once (index 0 unused)
    pub const LINE_POINTS: [u64; 5] = [0, 40, 100, 300, 1200];
    /// Points per broken piece brick
    pub const BRICK_POINTS: u64 = 5;

    /// Key repeat (delay before first repeat, then interval)
    pub const REPEAT_DELAY_MS: u32 = 150;
    pub const REPEAT_INTERVAL_MS: u32 = 50;
    pub const SOFT_DROP_DELAY_MS: u32 = 50;
    pub const SOFT_DROP_INTERVAL_MS: u32 = 50;
}
