//! Event-ordered simulation tick
//!
//! The caller feeds in elapsed wall time; the tick splits it at every timer
//! deadline so handlers run one at a time, in a fixed order, on logical time.
//! Each handler re-checks the session phase at entry: a handler that ends the
//! run stops everything scheduled after it.

use super::grid::CellSymbol;
use super::input::{Action, Key};
use super::physics::{BallOutcome, step_ball, step_paddle};
use super::state::{EndReason, GameEvent, GameState};

impl GameState {
    /// Funnel a key press
    ///
    /// The pause key is honored once a run has started and toggles only on
    /// the press edge; everything else is ignored unless the session is running.
    pub fn handle_key_down(&mut self, key: Key) {
        if key == Key::Pause {
            if self.has_started() && self.input.press(Key::Pause) {
                self.toggle_pause();
            }
            return;
        }
        if !self.is_running() {
            return;
        }
        if let Some(action) = self.input.key_down(key) {
            apply_action(self, action);
        }
    }

    /// Funnel a key release; always clears the held state
    pub fn handle_key_up(&mut self, key: Key) {
        self.input.key_up(key);
    }
}

/// Advance the session by `elapsed_ms` of wall time
///
/// Does nothing unless the session is running.
pub fn tick(state: &mut GameState, elapsed_ms: u32) {
    let mut remaining = elapsed_ms;
    while remaining > 0 && state.is_running() {
        let due = state
            .clock
            .next_due(state.input.next_due_ms())
            .unwrap_or(remaining);
        let step = due.min(remaining);
        remaining -= step;

        state.clock.advance(step);
        state.time_ms += step as u64;

        for action in state.input.update(step) {
            apply_action(state, action);
        }
        while state.is_running() && state.clock.paddle.fire() {
            paddle_tick(state);
        }
        while state.is_running() && state.clock.physics.fire() {
            physics_tick(state);
        }
        while state.is_running() && state.clock.gravity.fire() {
            gravity_tick(state);
        }
    }
}

/// Apply one discrete piece action
fn apply_action(state: &mut GameState, action: Action) {
    if !state.is_running() {
        return;
    }
    let Some(piece) = state.piece.as_mut().filter(|p| !p.collided) else {
        return;
    };
    let grid = &state.grid;

    let lock = match action {
        Action::MoveLeft => {
            piece.move_horizontal(grid, -1);
            false
        }
        Action::MoveRight => {
            piece.move_horizontal(grid, 1);
            false
        }
        Action::Rotate => {
            piece.rotate(grid);
            false
        }
        Action::SoftDrop => {
            piece.drop_one(grid);
            piece.collided
        }
        Action::HardDrop => {
            piece.hard_drop(grid);
            true
        }
    };

    if lock {
        state.lock_piece();
    }
}

fn paddle_tick(state: &mut GameState) {
    if !state.is_running() {
        return;
    }
    let distance = state.tuning.paddle_speed * state.speed_multiplier();
    let direction = state.input.paddle_direction();
    step_paddle(
        &mut state.paddle,
        direction,
        distance,
        state.tuning.width as f32,
    );
}

fn physics_tick(state: &mut GameState) {
    if !state.is_running() {
        return;
    }
    state.time_ticks += 1;
    let multiplier = state.speed_multiplier();
    let outcome = step_ball(
        &mut state.ball,
        &state.paddle,
        &mut state.grid,
        &state.tuning,
        multiplier,
        &mut state.rng,
    );

    match outcome {
        BallOutcome::Brick { x, y, symbol } => {
            let points = match symbol {
                CellSymbol::Obstacle => 0,
                _ => state.difficulty.brick_points,
            };
            log::debug!("Ball broke {:?} at ({}, {}) for {} points", symbol, x, y, points);
            state.add_score(points);
            state.push_event(GameEvent::BrickBroken { x, y, points });
        }
        BallOutcome::FloorMiss => state.end(EndReason::BallMissed),
        BallOutcome::Free | BallOutcome::Wall | BallOutcome::Ceiling | BallOutcome::Paddle => {}
    }
}

fn gravity_tick(state: &mut GameState) {
    if !state.is_running() {
        return;
    }
    let Some(piece) = state.piece.as_mut().filter(|p| !p.collided) else {
        state.clock.gravity.disarm();
        return;
    };
    if !piece.drop_one(&state.grid) {
        state.lock_piece();
    }
}
