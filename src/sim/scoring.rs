//! Scoring and the difficulty curve
//!
//! Speed is a pure function of score: every `level_threshold` points the
//! multiplier grows by another factor of `speed_base`. Nothing else feeds it.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// `base ^ floor(score / threshold)`; exactly 1.0 below the first threshold
pub fn speed_multiplier(score: u64, base: f32, threshold: u64) -> f32 {
    let level = score / threshold.max(1);
    base.powi(level.min(i32::MAX as u64) as i32)
}

/// Score-derived pacing for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub speed_base: f32,
    pub level_threshold: u64,
    pub initial_drop_ms: u32,
    pub drop_floor_ms: u32,
    pub line_points: Vec<u64>,
    pub brick_points: u64,
}

impl Difficulty {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            speed_base: tuning.speed_base,
            level_threshold: tuning.level_threshold,
            initial_drop_ms: tuning.initial_drop_ms,
            drop_floor_ms: tuning.drop_floor_ms,
            line_points: tuning.line_points.clone(),
            brick_points: tuning.brick_points,
        }
    }

    #[inline]
    pub fn speed_multiplier(&self, score: u64) -> f32 {
        speed_multiplier(score, self.speed_base, self.level_threshold)
    }

    /// Number of thresholds crossed
    #[inline]
    pub fn level(&self, score: u64) -> u64 {
        score / self.level_threshold.max(1)
    }

    /// Gravity interval: the initial interval divided by the multiplier,
    /// never below the floor
    pub fn drop_interval_ms(&self, score: u64) -> u32 {
        let scaled = (self.initial_drop_ms as f32 / self.speed_multiplier(score)).round();
        (scaled as u32).max(self.drop_floor_ms)
    }

    /// Points for clearing `lines` rows with one lock
    ///
    /// Counts beyond the table use its last entry.
    pub fn line_clear_points(&self, lines: usize) -> u64 {
        if lines == 0 {
            return 0;
        }
        self.line_points
            .get(lines)
            .or_else(|| self.line_points.last())
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_starts_at_one() {
        let difficulty = Difficulty::from_tuning(&Tuning::default());
        assert_eq!(difficulty.speed_multiplier(0), 1.0);
        assert_eq!(difficulty.speed_multiplier(49), 1.0);
        assert_eq!(difficulty.speed_multiplier(50), 1.05);
        assert_eq!(difficulty.speed_multiplier(100), 1.05f32.powi(2));
        assert_eq!(difficulty.level(149), 2);
    }

    #[test]
    fn test_multiplier_is_monotonic() {
        let difficulty = Difficulty::from_tuning(&Tuning::default());
        let mut last = 0.0;
        for score in (0..2000).step_by(7) {
            let m = difficulty.speed_multiplier(score);
            assert!(m >= last);
            last = m;
        }
    }

    #[test]
    fn test_drop_interval_floor() {
        let difficulty = Difficulty::from_tuning(&Tuning::default());
        assert_eq!(difficulty.drop_interval_ms(0), 800);
        assert_eq!(difficulty.drop_interval_ms(50), 762);
        assert_eq!(difficulty.drop_interval_ms(1_000_000), 100);
    }

    #[test]
    fn test_line_points_table() {
        let difficulty = Difficulty::from_tuning(&Tuning::default());
        assert_eq!(difficulty.line_clear_points(0), 0);
        assert_eq!(difficulty.line_clear_points(1), 40);
        assert_eq!(difficulty.line_clear_points(2), 100);
        assert_eq!(difficulty.line_clear_points(3), 300);
        assert_eq!(difficulty.line_clear_points(4), 1200);
        assert_eq!(difficulty.line_clear_points(6), 1200);
    }
}
