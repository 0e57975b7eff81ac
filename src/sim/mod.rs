//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Logical time only, advanced by [`tick`]
//! - Seeded RNG only
//! - One handler mutates state at a time
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod grid;
pub mod input;
pub mod physics;
pub mod piece;
pub mod scoring;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use clock::{SimClock, Timer};
pub use collision::{Aabb, CollisionResult, ball_aabb_collision};
pub use grid::{Cell, CellState, CellSymbol, Grid, check_collision};
pub use input::{Action, InputRouter, Key, KeyPhase};
pub use physics::{BallOutcome, step_ball, step_paddle};
pub use piece::{Piece, PieceKind, Shape};
pub use scoring::{Difficulty, speed_multiplier};
pub use snapshot::Snapshot;
pub use state::{
    Ball, EndReason, GameEvent, GameState, MAX_PENDING_EVENTS, Paddle, SessionPhase,
};
pub use tick::tick;
