//! TetroPong headless demo
//!
//! Runs one session with an autopilot at a fixed frame step, prints the final
//! board and records the score to a local leaderboard.
//!
//! Usage: `tetropong [TUNING_JSON] [SEED]`

use std::time::{SystemTime, UNIX_EPOCH};

use tetropong::leaderboard::{Leaderboard, LocalLeaderboard, record_final_score};
use tetropong::sim::{GameEvent, GameState, Key, tick};
use tetropong::tuning::Tuning;

/// Frame step fed to the simulation
const FRAME_MS: u32 = 16;
/// Give up after this many frames (~16 minutes of play)
const MAX_FRAMES: u32 = 60_000;
/// Autopilot hard-drops a piece this often
const DROP_EVERY_FRAMES: u32 = 90;

fn main() {
    env_logger::init();
    log::info!("TetroPong (headless) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => match Tuning::load(&path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::error!("{}", err);
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(clock_seed);

    let mut state = GameState::new(seed, tuning);
    state.start();

    let mut frames = 0;
    let mut lines = 0;
    let mut bricks = 0;
    while frames < MAX_FRAMES {
        autopilot(&mut state, frames);
        tick(&mut state, FRAME_MS);
        frames += 1;

        for event in state.drain_events() {
            match event {
                GameEvent::LinesCleared { count, .. } => lines += count,
                GameEvent::BrickBroken { .. } => bricks += 1,
                GameEvent::GameOver { reason, final_score } => {
                    log::info!(
                        "Game over after {} frames: {:?}, score {}",
                        frames, reason, final_score
                    );
                }
                _ => {}
            }
        }
        if !state.is_running() {
            break;
        }
    }

    let snapshot = state.snapshot();
    println!("{}", snapshot.render_text());
    println!(
        "seed {}  score {}  lines {}  bricks {}  speed x{:.2}  {:?}",
        seed, snapshot.score, lines, bricks, snapshot.speed_multiplier, snapshot.phase
    );

    let path = std::env::temp_dir().join("tetropong_scores.json");
    let mut board = match LocalLeaderboard::open(&path) {
        Ok(board) => board,
        Err(err) => {
            log::warn!("Could not open {}: {}", path.display(), err);
            LocalLeaderboard::new()
        }
    };
    if record_final_score(&state, &mut board, "cpu").is_some() {
        if let Ok(top) = board.fetch_top_scores(5) {
            for (rank, entry) in top.iter().enumerate() {
                println!("{:>2}. {:<3} {:>8}", rank + 1, entry.initials, entry.score);
            }
        }
    }
}

/// Paddle chases the ball; pieces are hard-dropped on a cadence
fn autopilot(state: &mut GameState, frame: u32) {
    let target = state.ball.pos.x;
    let center = state.paddle.center_x();
    let (press, release) = if target < center - 0.3 {
        (Some(Key::PaddleLeft), Key::PaddleRight)
    } else if target > center + 0.3 {
        (Some(Key::PaddleRight), Key::PaddleLeft)
    } else {
        (None, Key::PaddleLeft)
    };
    state.handle_key_up(release);
    match press {
        Some(key) => state.handle_key_down(key),
        None => state.handle_key_up(Key::PaddleRight),
    }

    if frame % DROP_EVERY_FRAMES == DROP_EVERY_FRAMES - 1 {
        state.handle_key_down(Key::HardDrop);
        state.handle_key_up(Key::HardDrop);
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}
