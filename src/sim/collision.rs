//! Collision detection for a round ball against the axis-aligned playfield
//!
//! Bricks are unit squares and the paddle is a rectangle, so everything here is
//! circle-vs-AABB: find the closest point on the box, compare against the
//! radius, and pick the axis of least penetration as the surface normal.

use glam::Vec2;

/// Axis-aligned box in grid units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// The unit square covering grid cell (x, y)
    pub fn cell(x: i32, y: i32) -> Self {
        let min = Vec2::new(x as f32, y as f32);
        Self::new(min, min + Vec2::ONE)
    }

    /// Square of side `2 * radius` around a center
    pub fn around(center: Vec2, radius: f32) -> Self {
        Self::new(center - Vec2::splat(radius), center + Vec2::splat(radius))
    }

    /// Strict overlap (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the box to the ball center
    pub point: Vec2,
    /// Unit axis normal pointing from the box toward the ball
    pub normal: Vec2,
    /// Overlap along the normal axis (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a ball against a box
///
/// The normal is the axis with the smaller penetration. When the center sits
/// inside the box on an axis, the normal on that axis opposes the ball's
/// direction of travel.
pub fn ball_aabb_collision(center: Vec2, radius: f32, dir: Vec2, aabb: &Aabb) -> CollisionResult {
    let point = aabb.closest_point(center);
    let dist = center - point;
    if dist.length_squared() >= radius * radius {
        return CollisionResult::miss();
    }

    let overlap_x = radius - dist.x.abs();
    let overlap_y = radius - dist.y.abs();
    let away = |d: f32, v: f32| if d != 0.0 { d.signum() } else { -v.signum() };

    let (normal, penetration) = if overlap_y < overlap_x {
        (Vec2::new(0.0, away(dist.y, dir.y)), overlap_y)
    } else {
        (Vec2::new(away(dist.x, dir.x), 0.0), overlap_x)
    };

    CollisionResult {
        hit: true,
        point,
        normal,
        penetration,
    }
}

/// Center position that puts the ball flush against the box face named by `normal`
pub fn flush_position(center: Vec2, radius: f32, normal: Vec2, aabb: &Aabb) -> Vec2 {
    let mut pos = center;
    if normal.x > 0.0 {
        pos.x = aabb.max.x + radius;
    } else if normal.x < 0.0 {
        pos.x = aabb.min.x - radius;
    }
    if normal.y > 0.0 {
        pos.y = aabb.max.y + radius;
    } else if normal.y < 0.0 {
        pos.y = aabb.min.y - radius;
    }
    pos
}

/// Inclusive cell range covered by the ball's bounding square, clamped to the
/// given column and row counts; `None` when nothing is covered
pub fn covered_cells(
    center: Vec2,
    radius: f32,
    columns: usize,
    rows: usize,
) -> Option<((i32, i32), (i32, i32))> {
    let x0 = ((center.x - radius).floor() as i32).max(0);
    let x1 = ((center.x + radius).floor() as i32).min(columns as i32 - 1);
    let y0 = ((center.y - radius).floor() as i32).max(0);
    let y1 = ((center.y + radius).floor() as i32).min(rows as i32 - 1);
    (x0 <= x1 && y0 <= y1).then_some(((x0, x1), (y0, y1)))
}
