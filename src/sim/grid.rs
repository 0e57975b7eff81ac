//! Shared cell matrix
//!
//! The grid spans the whole playfield. Rows `0..tetris_height` form the tetris
//! band where pieces lock and lines clear; the rows below are the pong band,
//! which only the ball and paddle ever traverse.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::piece::{Piece, PieceKind};
use crate::error::SimError;

/// What occupies a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellSymbol {
    #[default]
    Empty,
    Piece(PieceKind),
    /// Grey brick seeded at game start, never part of a tetromino
    Obstacle,
}

/// Occupancy state of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Clear,
    /// Locked into the grid (collidable, breakable by the ball)
    Merged,
    /// Overlay of the falling piece (snapshots only, never stored in the grid)
    Player,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub symbol: CellSymbol,
    pub state: CellState,
}

impl Cell {
    pub const CLEAR: Cell = Cell {
        symbol: CellSymbol::Empty,
        state: CellState::Clear,
    };

    pub fn merged(symbol: CellSymbol) -> Self {
        Self {
            symbol,
            state: CellState::Merged,
        }
    }

    #[inline]
    pub fn is_merged(&self) -> bool {
        self.state == CellState::Merged
    }
}

/// Row-major playfield
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    tetris_height: usize,
    total_height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-clear grid
    pub fn new(width: usize, tetris_height: usize, total_height: usize) -> Self {
        debug_assert!(tetris_height <= total_height);
        Self {
            width,
            tetris_height,
            total_height,
            cells: vec![Cell::CLEAR; width * total_height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn tetris_height(&self) -> usize {
        self.tetris_height
    }

    #[inline]
    pub fn total_height(&self) -> usize {
        self.total_height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.total_height
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x as usize, y as usize)])
        } else {
            None
        }
    }

    /// Write a cell; merged cells are only accepted inside the tetris band
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x >= self.width || y >= self.total_height {
            return;
        }
        if cell.is_merged() && (y >= self.tetris_height || cell.symbol == CellSymbol::Empty) {
            log::warn!("Refusing to merge {:?} at ({}, {})", cell.symbol, x, y);
            return;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
    }

    /// True iff (x, y) is a merged cell inside the tetris band
    pub fn is_merged(&self, x: i32, y: i32) -> bool {
        y < self.tetris_height as i32 && self.get(x, y).is_some_and(Cell::is_merged)
    }

    /// Iterate rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    pub fn row(&self, y: usize) -> &[Cell] {
        let start = y * self.width;
        &self.cells[start..start + self.width]
    }

    fn row_is_full(&self, y: usize) -> bool {
        self.row(y).iter().all(Cell::is_merged)
    }

    /// Lock a collided piece into the grid and sweep full rows
    ///
    /// Every target cell is validated before anything is written, so a failed
    /// merge leaves the grid untouched. Returns the number of cleared rows.
    pub fn merge_piece(&mut self, piece: &Piece) -> Result<usize, SimError> {
        for (x, y) in piece.cells() {
            if x < 0 || y < 0 || x >= self.width as i32 || y >= self.tetris_height as i32 {
                return Err(SimError::MergeOutOfBounds { x, y });
            }
            if self.is_merged(x, y) {
                return Err(SimError::MergeOverlap { x, y });
            }
        }

        let cell = Cell::merged(CellSymbol::Piece(piece.kind));
        for (x, y) in piece.cells() {
            let idx = self.index(x as usize, y as usize);
            self.cells[idx] = cell;
        }

        Ok(self.sweep_lines())
    }

    /// Remove full tetris-band rows and prepend clear rows at the top
    ///
    /// Pong-band rows are never inspected or moved.
    pub fn sweep_lines(&mut self) -> usize {
        let band = self.tetris_height;
        let kept: Vec<Cell> = (0..band)
            .filter(|&y| !self.row_is_full(y))
            .flat_map(|y| self.row(y).to_vec())
            .collect();

        let cleared = band - kept.len() / self.width;
        if cleared == 0 {
            return 0;
        }

        let split = cleared * self.width;
        self.cells[..split].fill(Cell::CLEAR);
        self.cells[split..band * self.width].copy_from_slice(&kept);
        cleared
    }

    /// Break a merged brick, returning what it was
    pub fn clear_cell(&mut self, x: i32, y: i32) -> Option<CellSymbol> {
        if !self.is_merged(x, y) {
            return None;
        }
        let idx = self.index(x as usize, y as usize);
        let symbol = self.cells[idx].symbol;
        self.cells[idx] = Cell::CLEAR;
        Some(symbol)
    }

    /// Seed grey obstacles into the bottom `rows` of the tetris band
    ///
    /// At least one gap is left per row so no seeded row is ever full.
    pub fn seed_obstacles<R: Rng>(&mut self, rng: &mut R, rows: usize, density: f32) {
        let rows = rows.min(self.tetris_height);
        for y in self.tetris_height - rows..self.tetris_height {
            let gap = rng.random_range(0..self.width);
            for x in 0..self.width {
                if x != gap && rng.random_bool(density as f64) {
                    let idx = self.index(x, y);
                    self.cells[idx] = Cell::merged(CellSymbol::Obstacle);
                }
            }
        }
    }

    /// Copy of the grid as rows, with the active piece drawn as `Player` cells
    pub fn overlay(&self, piece: Option<&Piece>) -> Vec<Vec<Cell>> {
        let mut rows: Vec<Vec<Cell>> = self.rows().map(<[Cell]>::to_vec).collect();
        if let Some(piece) = piece.filter(|p| !p.collided) {
            for (x, y) in piece.cells() {
                if !self.in_bounds(x, y) {
                    continue;
                }
                let cell = &mut rows[y as usize][x as usize];
                if !cell.is_merged() {
                    *cell = Cell {
                        symbol: CellSymbol::Piece(piece.kind),
                        state: CellState::Player,
                    };
                }
            }
        }
        rows
    }

    /// Grid invariants: pong band clear, merged cells carry a symbol, no stored overlays
    pub fn invariants_hold(&self) -> bool {
        let pong_clear = self.cells[self.tetris_height * self.width..]
            .iter()
            .all(|c| *c == Cell::CLEAR);
        let cells_ok = self.cells.iter().all(|c| match c.state {
            CellState::Merged => c.symbol != CellSymbol::Empty,
            CellState::Clear => c.symbol == CellSymbol::Empty,
            CellState::Player => false,
        });
        pong_clear && cells_ok
    }
}

/// True iff the piece, shifted by `delta`, leaves `[0, width)`, reaches the
/// pong band, or overlaps a merged cell
///
/// Cells above row 0 are only bounds-checked horizontally.
pub fn check_collision(piece: &Piece, grid: &Grid, delta: (i32, i32)) -> bool {
    let (dx, dy) = delta;
    piece.cells().any(|(x, y)| {
        let (x, y) = (x + dx, y + dy);
        x < 0
            || x >= grid.width() as i32
            || y >= grid.tetris_height() as i32
            || (y >= 0 && grid.is_merged(x, y))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(grid: &mut Grid, y: usize, symbol: CellSymbol) {
        for x in 0..grid.width() {
            grid.set(x, y, Cell::merged(symbol));
        }
    }

    #[test]
    fn test_new_grid_is_clear() {
        let grid = Grid::new(10, 20, 30);
        assert!(grid.rows().all(|row| row.iter().all(|c| *c == Cell::CLEAR)));
        assert_eq!(grid.rows().count(), 30);
        assert!(grid.invariants_hold());
    }

    #[test]
    fn test_collision_bounds() {
        let grid = Grid::new(10, 20, 30);
        let mut piece = Piece::new(PieceKind::O, 0, 0);
        assert!(!check_collision(&piece, &grid, (0, 0)));
        assert!(check_collision(&piece, &grid, (-1, 0)));

        piece.x = 8;
        assert!(!check_collision(&piece, &grid, (0, 0)));
        assert!(check_collision(&piece, &grid, (1, 0)));

        // O occupies rows y, y+1: resting on the band floor at y = 18
        piece.y = 18;
        assert!(!check_collision(&piece, &grid, (0, 0)));
        assert!(check_collision(&piece, &grid, (0, 1)));
    }

    #[test]
    fn test_collision_ignores_grid_above_row_zero() {
        let mut grid = Grid::new(10, 20, 30);
        grid.set(4, 0, Cell::merged(CellSymbol::Obstacle));
        let piece = Piece::new(PieceKind::O, 4, -2);
        // Cells at rows -2 and -1 are above the grid
        assert!(!check_collision(&piece, &grid, (0, 0)));
        assert!(check_collision(&piece, &grid, (0, 1)));
        // Horizontal bounds still apply above the grid
        assert!(check_collision(&piece, &grid, (-5, 0)));
    }

    #[test]
    fn test_merge_and_clear_two_rows() {
        let mut grid = Grid::new(10, 20, 30);
        fill_row(&mut grid, 2, CellSymbol::Obstacle);
        fill_row(&mut grid, 5, CellSymbol::Obstacle);
        grid.set(3, 4, Cell::merged(CellSymbol::Piece(PieceKind::T)));
        grid.set(7, 10, Cell::merged(CellSymbol::Piece(PieceKind::L)));

        assert_eq!(grid.sweep_lines(), 2);

        // Two fresh rows at the top, survivors keep their relative order
        assert!(grid.row(0).iter().all(|c| *c == Cell::CLEAR));
        assert!(grid.row(1).iter().all(|c| *c == Cell::CLEAR));
        // Row 4 sat below one cleared row: shifts down by one
        assert!(grid.is_merged(3, 5));
        // Row 10 sat below both cleared rows: it keeps its index
        assert!(grid.is_merged(7, 10));
        assert_eq!(
            (0..20).filter(|&y| grid.row(y).iter().any(Cell::is_merged)).count(),
            2
        );
        assert!(grid.invariants_hold());
    }

    #[test]
    fn test_merge_overlap_is_error_and_grid_untouched() {
        let mut grid = Grid::new(10, 20, 30);
        grid.set(5, 1, Cell::merged(CellSymbol::Obstacle));
        let before = grid.clone();

        let piece = Piece::new(PieceKind::O, 4, 0);
        assert_eq!(
            grid.merge_piece(&piece),
            Err(SimError::MergeOverlap { x: 5, y: 1 })
        );
        assert_eq!(grid, before);
    }

    #[test]
    fn test_merge_out_of_band_is_error() {
        let mut grid = Grid::new(10, 20, 30);
        let piece = Piece::new(PieceKind::O, 4, 19);
        assert!(matches!(
            grid.merge_piece(&piece),
            Err(SimError::MergeOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_merge_completes_line() {
        let mut grid = Grid::new(10, 20, 30);
        for x in 0..8 {
            grid.set(x, 19, Cell::merged(CellSymbol::Obstacle));
            grid.set(x, 18, Cell::merged(CellSymbol::Obstacle));
        }
        let piece = Piece::new(PieceKind::O, 8, 18);
        assert_eq!(grid.merge_piece(&piece), Ok(2));
        assert!((0..20).all(|y| grid.row(y).iter().all(|c| *c == Cell::CLEAR)));
    }

    #[test]
    fn test_set_refuses_merged_in_pong_band() {
        let mut grid = Grid::new(10, 20, 30);
        grid.set(0, 25, Cell::merged(CellSymbol::Obstacle));
        grid.set(0, 3, Cell::merged(CellSymbol::Empty));
        assert!(grid.invariants_hold());
        assert_eq!(grid.get(0, 25), Some(&Cell::CLEAR));
    }

    #[test]
    fn test_clear_cell_only_breaks_merged() {
        let mut grid = Grid::new(10, 20, 30);
        grid.set(2, 3, Cell::merged(CellSymbol::Piece(PieceKind::S)));
        assert_eq!(grid.clear_cell(2, 3), Some(CellSymbol::Piece(PieceKind::S)));
        assert_eq!(grid.clear_cell(2, 3), None);
        assert_eq!(grid.clear_cell(-1, 3), None);
    }

    #[test]
    fn test_seed_obstacles_never_fills_a_row() {
        use rand::SeedableRng;
        let mut rng = rand_pcg::Pcg32::seed_from_u64(7);
        let mut grid = Grid::new(10, 20, 30);
        grid.seed_obstacles(&mut rng, 4, 1.0);
        for y in 16..20 {
            let count = grid.row(y).iter().filter(|c| c.is_merged()).count();
            assert_eq!(count, 9);
        }
        assert!((0..16).all(|y| !grid.row(y).iter().any(Cell::is_merged)));
        assert!(grid.invariants_hold());
    }

    #[test]
    fn test_overlay_marks_player_cells() {
        let grid = Grid::new(10, 20, 30);
        let piece = Piece::new(PieceKind::O, 4, 0);
        let rows = grid.overlay(Some(&piece));
        assert_eq!(rows[0][4].state, CellState::Player);
        assert_eq!(rows[1][5].symbol, CellSymbol::Piece(PieceKind::O));
        assert_eq!(rows[2][4], Cell::CLEAR);
        // The grid itself never stores overlays
        assert!(grid.invariants_hold());
    }
}
