//! Data-driven game balance
//!
//! Loaded from JSON when present; every field falls back to the defaults in
//! [`crate::consts`], so a partial file only overrides what it names.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    Casual,
    #[default]
    Standard,
    Arcade,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Casual => "Casual",
            DifficultyPreset::Standard => "Standard",
            DifficultyPreset::Arcade => "Arcade",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "casual" | "easy" => Some(DifficultyPreset::Casual),
            "standard" | "normal" => Some(DifficultyPreset::Standard),
            "arcade" | "hard" => Some(DifficultyPreset::Arcade),
            _ => None,
        }
    }

    /// Gravity at score 0
    pub fn initial_drop_ms(&self) -> u32 {
        match self {
            DifficultyPreset::Casual => 1000,
            DifficultyPreset::Standard => INITIAL_DROP_MS,
            DifficultyPreset::Arcade => 600,
        }
    }

    /// Multiplier growth per level
    pub fn speed_base(&self) -> f32 {
        match self {
            DifficultyPreset::Casual => 1.03,
            DifficultyPreset::Standard => SPEED_BASE,
            DifficultyPreset::Arcade => 1.08,
        }
    }

    /// Grey obstacle rows seeded at the bottom of the tetris band
    pub fn obstacle_rows(&self) -> usize {
        match self {
            DifficultyPreset::Casual => 0,
            DifficultyPreset::Standard => 0,
            DifficultyPreset::Arcade => 3,
        }
    }
}

/// Game balance and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub preset: DifficultyPreset,

    // === Playfield ===
    pub width: usize,
    pub tetris_height: usize,
    pub total_height: usize,

    // === Clock ===
    pub physics_tick_ms: u32,
    pub paddle_tick_ms: u32,
    pub initial_drop_ms: u32,
    pub drop_floor_ms: u32,

    // === Paddle & ball ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_speed: f32,
    pub ball_radius: f32,
    pub ball_speed: f32,
    pub paddle_angle_factor: f32,
    pub min_bounce_angle_deg: f32,

    // === Scoring & difficulty ===
    pub speed_base: f32,
    pub level_threshold: u64,
    pub line_points: Vec<u64>,
    pub brick_points: u64,

    // === Input repeat ===
    pub repeat_delay_ms: u32,
    pub repeat_interval_ms: u32,
    pub soft_drop_delay_ms: u32,
    pub soft_drop_interval_ms: u32,

    // === Obstacles ===
    pub obstacle_rows: usize,
    pub obstacle_density: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            preset: DifficultyPreset::Standard,

            width: GRID_WIDTH,
            tetris_height: TETRIS_HEIGHT,
            total_height: TOTAL_HEIGHT,

            physics_tick_ms: PHYSICS_TICK_MS,
            paddle_tick_ms: PADDLE_TICK_MS,
            initial_drop_ms: INITIAL_DROP_MS,
            drop_floor_ms: DROP_FLOOR_MS,

            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_speed: PADDLE_SPEED,
            ball_radius: BALL_RADIUS,
            ball_speed: BALL_SPEED,
            paddle_angle_factor: PADDLE_ANGLE_FACTOR,
            min_bounce_angle_deg: MIN_BOUNCE_ANGLE_DEG,

            speed_base: SPEED_BASE,
            level_threshold: LEVEL_THRESHOLD,
            line_points: LINE_POINTS.to_vec(),
            brick_points: BRICK_POINTS,

            repeat_delay_ms: REPEAT_DELAY_MS,
            repeat_interval_ms: REPEAT_INTERVAL_MS,
            soft_drop_delay_ms: SOFT_DROP_DELAY_MS,
            soft_drop_interval_ms: SOFT_DROP_INTERVAL_MS,

            obstacle_rows: 0,
            obstacle_density: 0.3,
        }
    }
}

impl Tuning {
    /// Create tuning from a difficulty preset (applies preset defaults)
    pub fn from_preset(preset: DifficultyPreset) -> Self {
        let mut tuning = Self::default();
        tuning.apply_preset(preset);
        tuning
    }

    /// Apply a difficulty preset (updates preset-dependent fields)
    pub fn apply_preset(&mut self, preset: DifficultyPreset) {
        self.preset = preset;
        self.initial_drop_ms = preset.initial_drop_ms();
        self.speed_base = preset.speed_base();
        self.obstacle_rows = preset.obstacle_rows();
    }

    /// Top edge of the paddle; one row of air is left below it
    pub fn paddle_y(&self) -> f32 {
        self.total_height as f32 - self.paddle_height - 1.0
    }

    /// Smallest |dx| allowed after a paddle bounce (dy is always unit)
    pub fn min_horizontal_ratio(&self) -> f32 {
        self.min_bounce_angle_deg.to_radians().tan()
    }

    /// Parse and validate tuning from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {} ({})", path.display(), tuning.preset.as_str());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.width < 4 {
            return fail("width must be at least 4 cells");
        }
        if self.tetris_height < 4 || self.tetris_height >= self.total_height {
            return fail("tetris_height must be at least 4 and below total_height");
        }
        if self.paddle_y() <= self.tetris_height as f32 {
            return fail("pong band is too short for the paddle");
        }
        if !(self.paddle_width > 0.0 && self.paddle_width <= self.width as f32) {
            return fail("paddle_width must fit inside the court");
        }
        if self.paddle_height <= 0.0 || self.ball_radius <= 0.0 || self.ball_radius >= 0.5 {
            return fail("paddle_height must be positive and ball_radius in (0, 0.5)");
        }
        if self.ball_speed <= 0.0 || self.paddle_speed <= 0.0 {
            return fail("ball_speed and paddle_speed must be positive");
        }
        if !(0.0..45.0).contains(&self.min_bounce_angle_deg) {
            return fail("min_bounce_angle_deg must be in [0, 45)");
        }
        if self.speed_base < 1.0 {
            return fail("speed_base must be >= 1.0");
        }
        if self.level_threshold == 0 {
            return fail("level_threshold must be positive");
        }
        if self.physics_tick_ms == 0 || self.paddle_tick_ms == 0 || self.drop_floor_ms == 0 {
            return fail("tick periods must be positive");
        }
        if self.initial_drop_ms < self.drop_floor_ms {
            return fail("initial_drop_ms must be >= drop_floor_ms");
        }
        if self.repeat_delay_ms == 0
            || self.repeat_interval_ms == 0
            || self.soft_drop_delay_ms == 0
            || self.soft_drop_interval_ms == 0
        {
            return fail("repeat delays and intervals must be positive");
        }
        if self.line_points.len() < 5 {
            return fail("line_points needs entries for 0..=4 lines");
        }
        if self.obstacle_rows >= self.tetris_height
            || !(0.0..=1.0).contains(&self.obstacle_density)
        {
            return fail("obstacle_rows must be below tetris_height and density in [0, 1]");
        }
        Ok(())
    }
}
