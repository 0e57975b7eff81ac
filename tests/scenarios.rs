//! End-to-end scenarios driven through the public session API

use glam::Vec2;
use tetropong::leaderboard::{EntryId, LeaderboardEntry, record_final_score};
use tetropong::sim::{
    Cell, CellSymbol, Difficulty, EndReason, GameEvent, GameState, Grid, Key, Piece, PieceKind,
    SessionPhase, check_collision, tick,
};
use tetropong::{Leaderboard, LeaderboardError, LocalLeaderboard, Tuning};

fn running(seed: u64) -> GameState {
    let mut state = GameState::new(seed, Tuning::default());
    state.start();
    state.drain_events();
    state
}

fn obstacle() -> Cell {
    Cell::merged(CellSymbol::Obstacle)
}

#[test]
fn clearing_rows_two_and_five_scores_and_preserves_order() {
    let mut state = running(31);
    for x in 1..10 {
        state.grid.set(x, 2, obstacle());
        state.grid.set(x, 5, obstacle());
    }
    state.grid.set(4, 3, Cell::merged(CellSymbol::Piece(PieceKind::T)));
    state.grid.set(7, 4, Cell::merged(CellSymbol::Piece(PieceKind::S)));
    state.grid.set(0, 6, obstacle());
    state.grid.set(1, 10, obstacle());

    // Vertical I in column 0, stopped by (0, 6) so it fills rows 2..=5
    state.piece = Some(Piece::new(PieceKind::I, -1, 0));
    state.handle_key_down(Key::HardDrop);

    assert_eq!(state.score, 100);
    assert!(state.drain_events().contains(&GameEvent::LinesCleared {
        count: 2,
        points: 100
    }));

    // Two fresh rows on top
    assert!(state.grid.row(0).iter().all(|c| !c.is_merged()));
    assert!(state.grid.row(1).iter().all(|c| !c.is_merged()));
    // Rows 3 and 4 sat between the cleared rows: down by one
    assert_eq!(
        state.grid.get(4, 4).map(|c| c.symbol),
        Some(CellSymbol::Piece(PieceKind::T))
    );
    assert_eq!(
        state.grid.get(7, 5).map(|c| c.symbol),
        Some(CellSymbol::Piece(PieceKind::S))
    );
    assert!(state.grid.is_merged(0, 4));
    assert!(state.grid.is_merged(0, 5));
    // Below both cleared rows: unchanged
    assert!(state.grid.is_merged(0, 6));
    assert!(state.grid.is_merged(1, 10));
    assert!(!state.grid.is_merged(1, 5));
    assert!(state.grid.invariants_hold());
}

#[test]
fn rotation_against_left_wall_kicks_or_reverts() {
    let tuning = Tuning::default();
    let grid = Grid::new(tuning.width, tuning.tetris_height, tuning.total_height);

    // Vertical I hugging the left wall; horizontal form would start at x = -1
    let mut piece = Piece::new(PieceKind::I, -1, 5);
    assert!(piece.rotate(&grid));
    assert!(piece.cells().all(|(x, _)| x >= 0));
    assert!(!check_collision(&piece, &grid, (0, 0)));

    // Block every kick candidate through column 2
    let mut grid = grid;
    grid.set(2, 6, obstacle());
    let before = Piece::new(PieceKind::I, -1, 5);
    let mut piece = before;
    assert!(!piece.rotate(&grid));
    assert_eq!(piece, before);
}

#[test]
fn square_piece_rotation_is_identity() {
    let tuning = Tuning::default();
    let grid = Grid::new(tuning.width, tuning.tetris_height, tuning.total_height);
    let before = Piece::spawn(PieceKind::O, &grid).unwrap();
    assert_eq!(before.x, 4);
    assert_eq!(before.y, 0);

    let mut piece = before;
    piece.rotate(&grid);
    assert_eq!(piece, before);
}

#[test]
fn ball_bounces_flush_off_paddle() {
    let mut state = running(17);
    state.paddle.x = 4.0;
    state.ball.pos = Vec2::new(5.0, 28.0);
    state.ball.dir = Vec2::new(1.0, 1.0);

    tick(&mut state, 50);
    assert!(state.ball.dir.y < 0.0);
    assert!((state.ball.pos.y - (state.paddle.y - state.ball.radius)).abs() < 1e-5);
    assert_eq!(state.phase, SessionPhase::Running);
}

#[test]
fn speed_multiplier_levels() {
    let tuning = Tuning::default();
    let difficulty = Difficulty::from_tuning(&tuning);
    assert_eq!(difficulty.speed_multiplier(0), 1.0);
    assert_eq!(
        difficulty.speed_multiplier(2 * tuning.level_threshold),
        tuning.speed_base.powi(2)
    );
}

#[test]
fn higher_score_speeds_up_ball() {
    let mut slow = running(3);
    let mut fast = running(3);
    fast.score = 500;
    for state in [&mut slow, &mut fast] {
        state.ball.pos = Vec2::new(5.0, 22.0);
        state.ball.dir = Vec2::new(0.0, 1.0);
        tick(state, 50);
    }
    assert!(fast.ball.pos.y > slow.ball.pos.y);
}

#[test]
fn blocked_spawn_ends_run() {
    let mut state = running(41);
    for y in 0..4 {
        for x in 3..7 {
            state.grid.set(x, y, obstacle());
        }
    }
    state.piece = Some(Piece::new(PieceKind::O, 0, 10));
    state.score = 12;
    state.handle_key_down(Key::HardDrop);

    assert_eq!(state.phase, SessionPhase::Ended);
    assert_eq!(state.end_reason, Some(EndReason::SpawnBlocked));
    assert!(state.piece.is_none());
    assert_eq!(
        state.drain_events(),
        vec![
            GameEvent::PieceLocked {
                kind: PieceKind::O
            },
            GameEvent::GameOver {
                reason: EndReason::SpawnBlocked,
                final_score: 12
            },
        ]
    );
}

#[test]
fn restart_after_game_over_gives_fresh_run() {
    let mut state = running(5);
    state.paddle.x = 0.0;
    state.ball.pos = Vec2::new(8.0, 29.0);
    state.ball.dir = Vec2::new(0.0, 1.0);
    tick(&mut state, 1000);
    assert_eq!(state.phase, SessionPhase::Ended);

    state.start();
    assert_eq!(state.phase, SessionPhase::Running);
    assert_eq!(state.score, 0);
    assert!(state.piece.is_some());
    assert!(state.grid.invariants_hold());
}

struct BrokenBoard;

impl Leaderboard for BrokenBoard {
    fn fetch_top_scores(&self, _count: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Err(std::io::Error::other("offline").into())
    }

    fn is_high_score(&self, _score: u64) -> Result<bool, LeaderboardError> {
        Ok(true)
    }

    fn submit_score(&mut self, _initials: &str, _score: u64) -> Result<EntryId, LeaderboardError> {
        Err(std::io::Error::other("offline").into())
    }
}

#[test]
fn leaderboard_failure_never_touches_simulation() {
    let mut state = running(8);
    state.score = 300;
    state.paddle.x = 0.0;
    state.ball.pos = Vec2::new(8.0, 29.0);
    state.ball.dir = Vec2::new(0.0, 1.0);
    tick(&mut state, 1000);
    assert_eq!(state.phase, SessionPhase::Ended);

    let before = state.snapshot();
    assert_eq!(record_final_score(&state, &mut BrokenBoard, "abc"), None);
    assert_eq!(state.snapshot(), before);

    let mut board = LocalLeaderboard::new();
    assert!(record_final_score(&state, &mut board, "abc").is_some());
    assert_eq!(board.top_score(), Some(300));
}
