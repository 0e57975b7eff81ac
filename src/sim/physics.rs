//! Ball and paddle integration
//!
//! One physics tick integrates the ball and then resolves at most one
//! correction, checked in order: side walls, ceiling, paddle, brick. The first
//! match wins. Reaching the floor is checked last and is never a bounce.

use glam::Vec2;
use rand::Rng;

use super::collision::{Aabb, ball_aabb_collision, covered_cells, flush_position};
use super::grid::{CellSymbol, Grid};
use super::state::{Ball, Paddle};
use crate::tuning::Tuning;

/// What happened to the ball during one physics tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallOutcome {
    /// Moved without touching anything
    Free,
    Wall,
    Ceiling,
    Paddle,
    /// Broke the merged cell at (x, y)
    Brick { x: i32, y: i32, symbol: CellSymbol },
    /// Fell past the paddle; the ball keeps its last valid state
    FloorMiss,
}

/// Advance the ball one physics tick
pub fn step_ball<R: Rng>(
    ball: &mut Ball,
    paddle: &Paddle,
    grid: &mut Grid,
    tuning: &Tuning,
    multiplier: f32,
    rng: &mut R,
) -> BallOutcome {
    let previous = *ball;
    ball.pos += ball.velocity(tuning.ball_speed, multiplier);

    let outcome = if bounce_walls(ball, grid.width() as f32) {
        BallOutcome::Wall
    } else if bounce_ceiling(ball) {
        BallOutcome::Ceiling
    } else if bounce_paddle(ball, paddle, tuning, rng) {
        BallOutcome::Paddle
    } else if let Some((x, y, symbol)) = break_brick(ball, grid) {
        BallOutcome::Brick { x, y, symbol }
    } else {
        BallOutcome::Free
    };

    if ball.pos.y + ball.radius >= grid.total_height() as f32 {
        *ball = previous;
        return BallOutcome::FloorMiss;
    }
    outcome
}

/// Move the paddle by `direction * distance`, clamped to the court
pub fn step_paddle(paddle: &mut Paddle, direction: i32, distance: f32, court_width: f32) {
    if direction != 0 {
        paddle.slide(direction.signum() as f32 * distance, court_width);
    }
}

fn bounce_walls(ball: &mut Ball, width: f32) -> bool {
    if ball.dir.x < 0.0 && ball.pos.x - ball.radius <= 0.0 {
        ball.pos.x = ball.radius;
        ball.dir.x = -ball.dir.x;
        true
    } else if ball.dir.x > 0.0 && ball.pos.x + ball.radius >= width {
        ball.pos.x = width - ball.radius;
        ball.dir.x = -ball.dir.x;
        true
    } else {
        false
    }
}

fn bounce_ceiling(ball: &mut Ball) -> bool {
    if ball.dir.y < 0.0 && ball.pos.y - ball.radius <= 0.0 {
        ball.pos.y = ball.radius;
        ball.dir.y = -ball.dir.y;
        true
    } else {
        false
    }
}

fn bounce_paddle<R: Rng>(ball: &mut Ball, paddle: &Paddle, tuning: &Tuning, rng: &mut R) -> bool {
    if ball.dir.y <= 0.0 || !ball.bounds().overlaps(&paddle.bounds()) {
        return false;
    }

    ball.pos.y = paddle.y - ball.radius;
    ball.dir.y = -ball.dir.y.abs();

    let aim = bounce_direction(ball.pos.x, paddle, tuning);
    ball.dir.x = shape_bounce(aim.x, ball.dir.y.abs(), tuning, rng);
    true
}

/// Enforce the minimum bounce angle off vertical
fn shape_bounce<R: Rng>(dx: f32, dy: f32, tuning: &Tuning, rng: &mut R) -> f32 {
    let min_dx = tuning.min_horizontal_ratio() * dy;
    if dx.abs() >= min_dx {
        return dx;
    }
    let sign = if dx > 0.0 {
        1.0
    } else if dx < 0.0 {
        -1.0
    } else if rng.random_bool(0.5) {
        1.0
    } else {
        -1.0
    };
    sign * min_dx
}

/// Resolve the first merged cell the ball touches, scanning rows then columns
fn break_brick(ball: &mut Ball, grid: &mut Grid) -> Option<(i32, i32, CellSymbol)> {
    let ((x0, x1), (y0, y1)) =
        covered_cells(ball.pos, ball.radius, grid.width(), grid.tetris_height())?;

    for y in y0..=y1 {
        for x in x0..=x1 {
            if !grid.is_merged(x, y) {
                continue;
            }
            let cell = Aabb::cell(x, y);
            let hit = ball_aabb_collision(ball.pos, ball.radius, ball.dir, &cell);
            if !hit.hit {
                continue;
            }

            if hit.normal.x != 0.0 {
                ball.dir.x = hit.normal.x * ball.dir.x.abs();
            } else {
                ball.dir.y = hit.normal.y * ball.dir.y.abs();
            }
            ball.pos = flush_position(ball.pos, ball.radius, hit.normal, &cell);
            let symbol = grid.clear_cell(x, y)?;
            return Some((x, y, symbol));
        }
    }
    None
}

/// Raw bounce direction for a paddle hit at `hit_x`, before the minimum angle is applied
pub fn bounce_direction(hit_x: f32, paddle: &Paddle, tuning: &Tuning) -> Vec2 {
    let offset = ((hit_x - paddle.center_x()) / (paddle.width / 2.0)).clamp(-1.0, 1.0);
    Vec2::new(offset * tuning.paddle_angle_factor, -1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Cell;
    use crate::sim::piece::PieceKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup() -> (Tuning, Grid, Paddle, Pcg32) {
        let tuning = Tuning::default();
        let grid = Grid::new(tuning.width, tuning.tetris_height, tuning.total_height);
        let paddle = Paddle::new(&tuning);
        (tuning, grid, paddle, Pcg32::seed_from_u64(7))
    }

    #[test]
    fn test_free_flight() {
        let (tuning, mut grid, paddle, mut rng) = setup();
        let mut ball = Ball::new(Vec2::new(5.0, 22.0), Vec2::new(1.0, 1.0), 0.4);
        let outcome = step_ball(&mut ball, &paddle, &mut grid, &tuning, 1.0, &mut rng);
        assert_eq!(outcome, BallOutcome::Free);
        assert!((ball.pos.x - 5.15).abs() < 1e-5);
        assert!((ball.pos.y - 22.15).abs() < 1e-5);
    }

    #[test]
    fn test_multiplier_scales_velocity() {
        let (tuning, mut grid, paddle, mut rng) = setup();
        let mut ball = Ball::new(Vec2::new(5.0, 22.0), Vec2::new(0.0, 1.0), 0.4);
        step_ball(&mut ball, &paddle, &mut grid, &tuning, 2.0, &mut rng);
        assert!((ball.pos.y - 22.3).abs() < 1e-5);
    }

    #[test]
    fn test_wall_bounce_clamps() {
        let (tuning, mut grid, paddle, mut rng) = setup();
        let mut ball = Ball::new(Vec2::new(9.5, 22.0), Vec2::new(1.0, 1.0), 0.4);
        let outcome = step_ball(&mut ball, &paddle, &mut grid, &tuning, 1.0, &mut rng);
        assert_eq!(outcome, BallOutcome::Wall);
        assert!((ball.pos.x - 9.6).abs() < 1e-5);
        assert_eq!(ball.dir.x, -1.0);

        let mut ball = Ball::new(Vec2::new(0.45, 22.0), Vec2::new(-1.0, 1.0), 0.4);
        let outcome = step_ball(&mut ball, &paddle, &mut grid, &tuning, 1.0, &mut rng);
        assert_eq!(outcome, BallOutcome::Wall);
        assert_eq!(ball.pos.x, 0.4);
        assert_eq!(ball.dir.x, 1.0);
    }

    #[test]
    fn test_wall_ignored_when_moving_away() {
        let (tuning, mut grid, paddle, mut rng) = setup();
        let mut ball = Ball::new(Vec2::new(0.3, 22.0), Vec2::new(1.0, 1.0), 0.4);
        let outcome = step_ball(&mut ball, &paddle, &mut grid, &tuning, 1.0, &mut rng);
        assert_eq!(outcome, BallOutcome::Free);
        assert_eq!(ball.dir.x, 1.0);
    }

    #[test]
    fn test_ceiling_bounce() {
        let (tuning, mut grid, paddle, mut rng) = setup();
        let mut ball = Ball::new(Vec2::new(5.0, 0.5), Vec2::new(0.5, -1.0), 0.4);
        let outcome = step_ball(&mut ball, &paddle, &mut grid, &tuning, 1.0, &mut rng);
        assert_eq!(outcome, BallOutcome::Ceiling);
        assert_eq!(ball.pos.y, 0.4);
        assert_eq!(ball.dir.y, 1.0);
    }

    #[test]
    fn test_paddle_bounce_repositions_flush() {
        let (tuning, mut grid, _, mut rng) = setup();
        let paddle = Paddle {
            x: 4.0,
            ..Paddle::new(&tuning)
        };
        let mut ball = Ball::new(Vec2::new(5.0, 28.0), Vec2::new(1.0, 1.0), 0.4);
        let outcome = step_ball(&mut ball, &paddle, &mut grid, &tuning, 1.0, &mut rng);
        assert_eq!(outcome, BallOutcome::Paddle);
        assert!((ball.pos.y - 28.1).abs() < 1e-5);
        assert_eq!(ball.dir.y, -1.0);
        // Hit left of center at 5.15 on a paddle centered at 5.5
        assert!((ball.dir.x - (-0.35)).abs() < 1e-4);
    }

    #[test]
    fn test_paddle_ignored_when_rising() {
        let (tuning, mut grid, _, mut rng) = setup();
        let paddle = Paddle {
            x: 4.0,
            ..Paddle::new(&tuning)
        };
        let mut ball = Ball::new(Vec2::new(5.0, 28.7), Vec2::new(1.0, -1.0), 0.4);
        let outcome = step_ball(&mut ball, &paddle, &mut grid, &tuning, 1.0, &mut rng);
        assert_eq!(outcome, BallOutcome::Free);
        assert_eq!(ball.dir.y, -1.0);
    }

    #[test]
    fn test_center_hit_enforces_min_angle() {
        let (tuning, mut grid, _, mut rng) = setup();
        let paddle = Paddle {
            x: 4.0,
            ..Paddle::new(&tuning)
        };
        // Lands exactly on the paddle center
        let mut ball = Ball::new(Vec2::new(5.5, 28.0), Vec2::new(0.0, 1.0), 0.4);
        let outcome = step_ball(&mut ball, &paddle, &mut grid, &tuning, 1.0, &mut rng);
        assert_eq!(outcome, BallOutcome::Paddle);
        assert!((ball.dir.x.abs() - tuning.min_horizontal_ratio()).abs() < 1e-5);
    }

    #[test]
    fn test_brick_break_from_below() {
        let (tuning, mut grid, paddle, mut rng) = setup();
        grid.set(5, 10, Cell::merged(CellSymbol::Piece(PieceKind::T)));
        // Rising into the bottom face of cell (5, 10)
        let mut ball = Ball::new(Vec2::new(5.5, 11.5), Vec2::new(0.0, -1.0), 0.4);
        let outcome = step_ball(&mut ball, &paddle, &mut grid, &tuning, 1.0, &mut rng);
        assert_eq!(
            outcome,
            BallOutcome::Brick {
                x: 5,
                y: 10,
                symbol: CellSymbol::Piece(PieceKind::T)
            }
        );
        assert_eq!(ball.dir.y, 1.0);
        assert!((ball.pos.y - 11.4).abs() < 1e-5);
        assert!(!grid.is_merged(5, 10));
    }

    #[test]
    fn test_one_brick_per_tick() {
        let (tuning, mut grid, paddle, mut rng) = setup();
        grid.set(5, 10, Cell::merged(CellSymbol::Obstacle));
        grid.set(6, 10, Cell::merged(CellSymbol::Obstacle));
        let mut ball = Ball::new(Vec2::new(6.0, 11.5), Vec2::new(0.0, -1.0), 0.4);
        let outcome = step_ball(&mut ball, &paddle, &mut grid, &tuning, 1.0, &mut rng);
        assert!(matches!(outcome, BallOutcome::Brick { x: 5, y: 10, .. }));
        assert!(grid.is_merged(6, 10));
    }

    #[test]
    fn test_floor_freezes_last_valid_state() {
        let (tuning, mut grid, _, mut rng) = setup();
        let paddle = Paddle {
            x: 0.0,
            ..Paddle::new(&tuning)
        };
        let start = Ball::new(Vec2::new(8.0, 29.5), Vec2::new(0.5, 1.0), 0.4);
        let mut ball = start;
        let outcome = step_ball(&mut ball, &paddle, &mut grid, &tuning, 1.0, &mut rng);
        assert_eq!(outcome, BallOutcome::FloorMiss);
        assert_eq!(ball, start);
    }

    #[test]
    fn test_paddle_step_clamped() {
        let (tuning, _, mut paddle, _) = setup();
        step_paddle(&mut paddle, -1, 0.2, 10.0);
        assert!((paddle.x - 3.3).abs() < 1e-5);
        step_paddle(&mut paddle, 0, 0.2, 10.0);
        assert!((paddle.x - 3.3).abs() < 1e-5);
        for _ in 0..100 {
            step_paddle(&mut paddle, 1, tuning.paddle_speed, 10.0);
        }
        assert_eq!(paddle.x, 7.0);
    }

    #[test]
    fn test_bounce_direction_edges() {
        let (tuning, _, paddle, _) = setup();
        assert_eq!(bounce_direction(paddle.x, &paddle, &tuning).x, -1.5);
        assert_eq!(bounce_direction(paddle.x + 10.0, &paddle, &tuning).x, 1.5);
    }
}
