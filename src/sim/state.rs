//! Game state and core simulation types
//!
//! One `GameState` owns everything a run mutates. It is rebuilt wholesale on
//! restart and only ever touched by one handler at a time.

use glam::Vec2;
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::SimClock;
use super::collision::Aabb;
use super::grid::Grid;
use super::input::InputRouter;
use super::piece::{Piece, PieceKind};
use super::scoring::Difficulty;
use crate::error::SimError;
use crate::tuning::Tuning;

/// Undrained events kept before the oldest are dropped
pub const MAX_PENDING_EVENTS: usize = 256;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Created but never started
    Idle,
    /// Active gameplay
    Running,
    /// Logical time frozen
    Paused,
    /// Run over; state frozen for final-score reporting
    Ended,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Ball fell past the paddle
    BallMissed,
    /// New piece could not be placed
    SpawnBlocked,
    /// Piece lock hit an occupied cell (collision bug upstream)
    MergeOverlap,
}

impl From<&SimError> for EndReason {
    fn from(err: &SimError) -> Self {
        match err {
            SimError::SpawnBlocked { .. } => EndReason::SpawnBlocked,
            SimError::MergeOverlap { .. } | SimError::MergeOutOfBounds { .. } => {
                EndReason::MergeOverlap
            }
        }
    }
}

/// Notifications for the caller, drained with [`GameState::drain_events`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started { seed: u64 },
    Paused,
    Resumed,
    PieceLocked { kind: PieceKind },
    LinesCleared { count: usize, points: u64 },
    BrickBroken { x: i32, y: i32, points: u64 },
    GameOver { reason: EndReason, final_score: u64 },
}

/// The ball
///
/// `dir` is a bounce direction, not a velocity: its sign and ratio matter and
/// it is scaled by ball speed times the speed multiplier every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub dir: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn new(pos: Vec2, dir: Vec2, radius: f32) -> Self {
        Self { pos, dir, radius }
    }

    /// Serve position: middle of the playfield, heading down, random side
    pub fn serve<R: Rng>(tuning: &Tuning, rng: &mut R) -> Self {
        let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        Self::new(
            Vec2::new(tuning.width as f32 / 2.0, tuning.total_height as f32 / 2.0),
            Vec2::new(sign, 1.0),
            tuning.ball_radius,
        )
    }

    /// Displacement for one physics tick
    #[inline]
    pub fn velocity(&self, speed: f32, multiplier: f32) -> Vec2 {
        self.dir * speed * multiplier
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::around(self.pos, self.radius)
    }
}

/// The player's paddle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Paddle {
    /// Centered at the bottom of the court
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            x: (tuning.width as f32 - tuning.paddle_width) / 2.0,
            y: tuning.paddle_y(),
            width: tuning.paddle_width,
            height: tuning.paddle_height,
        }
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.width, self.y + self.height),
        )
    }

    /// Slide by `delta`, clamped to `[0, court_width - width]`
    pub fn slide(&mut self, delta: f32, court_width: f32) {
        self.x = (self.x + delta).clamp(0.0, (court_width - self.width).max(0.0));
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed of the current run
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    pub difficulty: Difficulty,
    pub phase: SessionPhase,
    pub grid: Grid,
    /// Active falling piece (None between lock and spawn, or after a blocked spawn)
    pub piece: Option<Piece>,
    pub ball: Ball,
    pub paddle: Paddle,
    pub score: u64,
    pub input: InputRouter,
    pub clock: SimClock,
    /// Logical milliseconds simulated while running
    pub time_ms: u64,
    /// Physics ticks simulated
    pub time_ticks: u64,
    pub end_reason: Option<EndReason>,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create an idle session with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let ball = Ball::serve(&tuning, &mut rng);
        Self {
            seed,
            rng,
            difficulty: Difficulty::from_tuning(&tuning),
            phase: SessionPhase::Idle,
            grid: Grid::new(tuning.width, tuning.tetris_height, tuning.total_height),
            piece: None,
            ball,
            paddle: Paddle::new(&tuning),
            score: 0,
            input: InputRouter::new(&tuning),
            clock: SimClock::new(&tuning),
            time_ms: 0,
            time_ticks: 0,
            end_reason: None,
            events: Vec::new(),
            tuning,
        }
    }

    /// Begin a run
    ///
    /// An idle session starts with its own seed; any later call discards the
    /// whole state and rebuilds it from a seed drawn from the previous run.
    pub fn start(&mut self) {
        if self.phase != SessionPhase::Idle {
            let seed = self.rng.next_u64();
            *self = Self::new(seed, self.tuning.clone());
        }

        if self.tuning.obstacle_rows > 0 {
            self.grid.seed_obstacles(
                &mut self.rng,
                self.tuning.obstacle_rows,
                self.tuning.obstacle_density,
            );
        }

        self.phase = SessionPhase::Running;
        self.clock.physics.arm();
        self.clock.paddle.arm();
        log::info!("Run started (seed {})", self.seed);
        self.push_event(GameEvent::Started { seed: self.seed });
        self.spawn_next();
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    /// True once a run has begun (pause is honored from then on)
    #[inline]
    pub fn has_started(&self) -> bool {
        self.phase != SessionPhase::Idle
    }

    /// Current speed multiplier (pure function of score)
    #[inline]
    pub fn speed_multiplier(&self) -> f32 {
        self.difficulty.speed_multiplier(self.score)
    }

    /// Flip between running and paused; no-op otherwise
    pub fn toggle_pause(&mut self) {
        match self.phase {
            SessionPhase::Running => {
                self.phase = SessionPhase::Paused;
                self.input.cancel_repeats();
                log::info!("Paused at {} ms", self.time_ms);
                self.push_event(GameEvent::Paused);
            }
            SessionPhase::Paused => {
                self.phase = SessionPhase::Running;
                log::info!("Resumed");
                self.push_event(GameEvent::Resumed);
            }
            SessionPhase::Idle | SessionPhase::Ended => {}
        }
    }

    /// Take all pending events
    ///
    /// Callers should drain once per frame. At most [`MAX_PENDING_EVENTS`]
    /// are kept; older ones are dropped first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    /// Award points and retune gravity for the new multiplier
    pub(crate) fn add_score(&mut self, points: u64) {
        if points == 0 {
            return;
        }
        self.score = self.score.saturating_add(points);
        if self.piece.is_some_and(|p| !p.collided) {
            let interval = self.difficulty.drop_interval_ms(self.score);
            self.clock.gravity.set_interval(interval);
        }
    }

    /// Spawn a random piece, ending the run if the spawn is blocked
    pub(crate) fn spawn_next(&mut self) {
        let kind = PieceKind::random(&mut self.rng);
        match Piece::spawn(kind, &self.grid) {
            Ok(piece) => {
                self.piece = Some(piece);
                self.clock.gravity.set_interval(self.difficulty.drop_interval_ms(self.score));
                self.clock.gravity.restart();
            }
            Err(err) => {
                log::info!("{}", err);
                self.end(EndReason::from(&err));
            }
        }
    }

    /// Lock the collided piece, score cleared lines and spawn the next one
    pub(crate) fn lock_piece(&mut self) {
        let Some(piece) = self.piece.take() else {
            return;
        };
        self.clock.gravity.disarm();

        match self.grid.merge_piece(&piece) {
            Ok(lines) => {
                self.push_event(GameEvent::PieceLocked { kind: piece.kind });
                if lines > 0 {
                    let points = self.difficulty.line_clear_points(lines);
                    log::debug!("Cleared {} line(s) for {} points", lines, points);
                    self.add_score(points);
                    self.push_event(GameEvent::LinesCleared {
                        count: lines,
                        points,
                    });
                }
                self.spawn_next();
            }
            Err(err) => {
                log::error!("Failed to lock {:?} piece: {}", piece.kind, err);
                self.piece = Some(piece);
                self.end(EndReason::from(&err));
            }
        }
    }

    /// Stop everything and freeze for final-score reporting
    pub(crate) fn end(&mut self, reason: EndReason) {
        if self.phase == SessionPhase::Ended {
            return;
        }
        self.phase = SessionPhase::Ended;
        self.clock.cancel_all();
        self.input.cancel_repeats();
        self.end_reason = Some(reason);
        log::info!("Game over ({:?}) with score {}", reason, self.score);
        self.push_event(GameEvent::GameOver {
            reason,
            final_score: self.score,
        });
    }
}
