//! Read-only view of the session for renderers

use serde::{Deserialize, Serialize};

use super::grid::{Cell, CellState, CellSymbol};
use super::state::{Ball, GameState, Paddle, SessionPhase};

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Rows top to bottom, active piece drawn as `Player` cells
    pub grid: Vec<Vec<Cell>>,
    pub ball: Ball,
    pub paddle: Paddle,
    pub score: u64,
    pub phase: SessionPhase,
    pub speed_multiplier: f32,
    pub grid_width: usize,
    pub grid_height: usize,
    pub tetris_height: usize,
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub ball_radius: f32,
    pub paddle_y: f32,
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid.overlay(self.piece.as_ref()),
            ball: self.ball,
            paddle: self.paddle,
            score: self.score,
            phase: self.phase,
            speed_multiplier: self.speed_multiplier(),
            grid_width: self.grid.width(),
            grid_height: self.grid.total_height(),
            tetris_height: self.grid.tetris_height(),
            paddle_width: self.paddle.width,
            paddle_height: self.paddle.height,
            ball_radius: self.ball.radius,
            paddle_y: self.paddle.y,
        }
    }
}

impl Snapshot {
    /// Plain-text frame: pieces by letter, obstacles `#`, ball `o`, paddle `=`
    pub fn render_text(&self) -> String {
        let ball = (self.ball.pos.x.floor() as i64, self.ball.pos.y.floor() as i64);
        let paddle_row = self.paddle_y.floor() as i64;
        let paddle_span = self.paddle.x..self.paddle.x + self.paddle_width;

        let mut out = String::with_capacity((self.grid_width + 3) * (self.grid_height + 1));
        for (y, row) in self.grid.iter().enumerate() {
            out.push('|');
            for (x, cell) in row.iter().enumerate() {
                let (xi, yi) = (x as i64, y as i64);
                let ch = if (xi, yi) == ball {
                    'o'
                } else if yi == paddle_row && paddle_span.contains(&(x as f32 + 0.5)) {
                    '='
                } else {
                    cell_char(cell)
                };
                out.push(ch);
            }
            out.push('|');
            if y + 1 == self.tetris_height {
                out.push_str(" <");
            }
            out.push('\n');
        }
        out.push('+');
        out.push_str(&"-".repeat(self.grid_width));
        out.push('+');
        out
    }
}

fn cell_char(cell: &Cell) -> char {
    match (cell.state, cell.symbol) {
        (CellState::Clear, _) | (_, CellSymbol::Empty) => ' ',
        (CellState::Merged, CellSymbol::Obstacle) => '#',
        (CellState::Merged, CellSymbol::Piece(kind)) => kind.as_char(),
        (CellState::Player, CellSymbol::Piece(kind)) => kind.as_char().to_ascii_lowercase(),
        (CellState::Player, CellSymbol::Obstacle) => '#',
    }
}
