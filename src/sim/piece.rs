//! Tetromino shapes and the falling-piece controller
//!
//! A piece moves with check-then-commit: every move is collision-checked
//! against the grid first and only applied when clear. Once a downward step is
//! blocked the piece is flagged `collided` and waits for the session to lock it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::{Grid, check_collision};
use crate::error::SimError;

/// The seven tetromino kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Uniform pick from the seven kinds
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn as_char(&self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::Z => 'Z',
        }
    }

    /// Spawn orientation
    pub fn shape(&self) -> Shape {
        match self {
            PieceKind::I => Shape::from_rows(&[
                [false, true, false, false],
                [false, true, false, false],
                [false, true, false, false],
                [false, true, false, false],
            ]),
            PieceKind::J => Shape::from_rows(&[
                [false, true, false],
                [false, true, false],
                [true, true, false],
            ]),
            PieceKind::L => Shape::from_rows(&[
                [false, true, false],
                [false, true, false],
                [false, true, true],
            ]),
            PieceKind::O => Shape::from_rows(&[[true, true], [true, true]]),
            PieceKind::S => Shape::from_rows(&[
                [false, true, true],
                [true, true, false],
                [false, false, false],
            ]),
            PieceKind::T => Shape::from_rows(&[
                [false, false, false],
                [true, true, true],
                [false, true, false],
            ]),
            PieceKind::Z => Shape::from_rows(&[
                [true, true, false],
                [false, true, true],
                [false, false, false],
            ]),
        }
    }
}

/// Square occupancy matrix (2x2 up to 4x4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    size: usize,
    cells: [[bool; 4]; 4],
}

impl Shape {
    fn from_rows<const N: usize>(rows: &[[bool; N]; N]) -> Self {
        let mut cells = [[false; 4]; 4];
        for (y, row) in rows.iter().enumerate() {
            cells[y][..N].copy_from_slice(row);
        }
        Self { size: N, cells }
    }

    /// Bounding dimension
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.cells[y][x]
    }

    /// Occupied (x, y) offsets within the bounding box
    pub fn filled(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.size).flat_map(move |y| {
            (0..self.size).filter_map(move |x| self.cells[y][x].then_some((x, y)))
        })
    }

    /// 90° clockwise: transpose, then reverse each row
    pub fn rotated_cw(&self) -> Self {
        let n = self.size;
        let mut cells = [[false; 4]; 4];
        for (y, row) in cells.iter_mut().enumerate().take(n) {
            for (x, cell) in row.iter_mut().enumerate().take(n) {
                *cell = self.cells[n - 1 - x][y];
            }
        }
        Self { size: n, cells }
    }
}

/// The falling actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
    /// Column of the bounding box's left edge
    pub x: i32,
    /// Row of the bounding box's top edge
    pub y: i32,
    /// Locked this tick, pending merge
    pub collided: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            x,
            y,
            collided: false,
        }
    }

    /// Place a piece at the top-center of the grid
    ///
    /// A blocked spawn position is a game over, reported as an error.
    pub fn spawn(kind: PieceKind, grid: &Grid) -> Result<Self, SimError> {
        let shape = kind.shape();
        let x = grid.width() as i32 / 2 - shape.size() as i32 / 2;
        let piece = Self::new(kind, x, 0);
        if check_collision(&piece, grid, (0, 0)) {
            return Err(SimError::SpawnBlocked { kind });
        }
        Ok(piece)
    }

    /// Absolute grid coordinates of the occupied cells
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .filled()
            .map(move |(x, y)| (self.x + x as i32, self.y + y as i32))
    }

    /// Shift one column left (-1) or right (+1) if clear
    pub fn move_horizontal(&mut self, grid: &Grid, dir: i32) -> bool {
        if self.collided || check_collision(self, grid, (dir, 0)) {
            return false;
        }
        self.x += dir;
        true
    }

    /// Rotate clockwise with a bounded wall kick
    ///
    /// Kick offsets alternate `+1, -2, +3, -4, ...` from the last tried column
    /// until one fits or the offset grows past the bounding dimension plus one.
    /// Candidates whose bounding box leaves `[0, width)` are skipped. On failure
    /// the piece is left exactly as it was.
    pub fn rotate(&mut self, grid: &Grid) -> bool {
        if self.collided || self.kind == PieceKind::O {
            return false;
        }

        let mut candidate = *self;
        candidate.shape = self.shape.rotated_cw();
        if !check_collision(&candidate, grid, (0, 0)) {
            *self = candidate;
            return true;
        }

        let limit = candidate.shape.size() as i32 + 1;
        let width = grid.width() as i32;
        let mut offset: i32 = 1;
        while offset.abs() <= limit {
            candidate.x += offset;
            offset = -(offset + offset.signum());
            if candidate.x < 0 || candidate.x >= width {
                continue;
            }
            if !check_collision(&candidate, grid, (0, 0)) {
                *self = candidate;
                return true;
            }
        }
        false
    }

    /// One gravity step; flags `collided` when the row below is blocked
    ///
    /// Returns true when the piece moved.
    pub fn drop_one(&mut self, grid: &Grid) -> bool {
        if self.collided {
            return false;
        }
        if check_collision(self, grid, (0, 1)) {
            self.collided = true;
            return false;
        }
        self.y += 1;
        true
    }

    /// Jump straight to the lowest clear row and lock; returns rows dropped
    pub fn hard_drop(&mut self, grid: &Grid) -> u32 {
        if self.collided {
            return 0;
        }
        let mut rows = 0;
        while !check_collision(self, grid, (0, rows + 1)) {
            rows += 1;
        }
        self.y += rows;
        self.collided = true;
        rows as u32
    }
}
