//! High score leaderboard
//!
//! The simulation only hands over a final score once a run has ended. Storage
//! lives behind the [`Leaderboard`] trait; [`LocalLeaderboard`] keeps the top
//! scores in memory with optional JSON file persistence.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::LeaderboardError;
use crate::sim::{GameState, SessionPhase};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Initials are stored upper-cased, at most this many characters
pub const INITIALS_LEN: usize = 3;

pub type EntryId = u64;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: EntryId,
    pub initials: String,
    pub score: u64,
    /// Unix timestamp (ms) when submitted
    pub timestamp: u64,
}

/// High score storage
pub trait Leaderboard {
    /// Best `count` entries, highest first
    fn fetch_top_scores(&self, count: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;

    /// Whether `score` would make the board
    fn is_high_score(&self, score: u64) -> Result<bool, LeaderboardError>;

    fn submit_score(&mut self, initials: &str, score: u64) -> Result<EntryId, LeaderboardError>;
}

/// Upper-case and truncate initials; `None` when nothing usable is left
pub fn sanitize_initials(initials: &str) -> Option<String> {
    let cleaned: String = initials
        .trim()
        .chars()
        .flat_map(char::to_uppercase)
        .take(INITIALS_LEN)
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredBoard {
    next_id: EntryId,
    entries: Vec<LeaderboardEntry>,
}

/// In-memory top-N board, optionally persisted to a JSON file
#[derive(Debug, Clone, Default)]
pub struct LocalLeaderboard {
    board: StoredBoard,
    path: Option<PathBuf>,
}

impl LocalLeaderboard {
    /// Create an empty, unpersisted board
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`, starting fresh when the file does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LeaderboardError> {
        let path = path.as_ref().to_path_buf();
        let board = match std::fs::read_to_string(&path) {
            Ok(json) => {
                let board: StoredBoard = serde_json::from_str(&json)?;
                log::info!("Loaded {} high scores", board.entries.len());
                board
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                StoredBoard::default()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            board,
            path: Some(path),
        })
    }

    /// Write the board to its file, if it has one
    pub fn save(&self) -> Result<(), LeaderboardError> {
        self.write(&self.board)
    }

    fn write(&self, board: &StoredBoard) -> Result<(), LeaderboardError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(board)?;
        std::fs::write(path, json)?;
        log::info!("High scores saved ({} entries)", board.entries.len());
        Ok(())
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.board.entries
    }

    pub fn is_empty(&self) -> bool {
        self.board.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.board.entries.first().map(|e| e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.board.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.board.entries.len()) + 1)
    }

    fn qualifies(&self, score: u64) -> bool {
        if self.board.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.board.entries.last().is_none_or(|e| score > e.score)
    }
}

impl Leaderboard for LocalLeaderboard {
    fn fetch_top_scores(&self, count: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Ok(self.board.entries.iter().take(count).cloned().collect())
    }

    fn is_high_score(&self, score: u64) -> Result<bool, LeaderboardError> {
        Ok(self.qualifies(score))
    }

    fn submit_score(&mut self, initials: &str, score: u64) -> Result<EntryId, LeaderboardError> {
        let initials = sanitize_initials(initials).ok_or(LeaderboardError::InvalidInitials)?;
        if !self.qualifies(score) {
            return Err(LeaderboardError::NotHighScore(score));
        }

        // Only swapped in once the file write succeeds
        let mut board = self.board.clone();
        let id = board.next_id;
        board.next_id += 1;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let entry = LeaderboardEntry {
            id,
            initials,
            score,
            timestamp,
        };

        // Sorted descending; ties keep submission order
        let pos = board
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(board.entries.len());
        board.entries.insert(pos, entry);
        board.entries.truncate(MAX_HIGH_SCORES);

        self.write(&board)?;
        self.board = board;
        Ok(id)
    }
}

/// Hand an ended run's final score to the leaderboard
///
/// Returns the new entry id when the score was recorded. Failures are logged
/// and never reach the simulation.
pub fn record_final_score<L: Leaderboard + ?Sized>(
    state: &GameState,
    board: &mut L,
    initials: &str,
) -> Option<EntryId> {
    if state.phase != SessionPhase::Ended {
        log::debug!("Run still in progress; not recording score");
        return None;
    }

    match board.is_high_score(state.score) {
        Ok(true) => {}
        Ok(false) => {
            log::info!("Score {} did not make the leaderboard", state.score);
            return None;
        }
        Err(err) => {
            log::warn!("Leaderboard check failed: {}", err);
            return None;
        }
    }

    match board.submit_score(initials, state.score) {
        Ok(id) => {
            log::info!("Recorded score {} as entry {}", state.score, id);
            Some(id)
        }
        Err(err) => {
            log::warn!("Failed to record score {}: {}", state.score, err);
            None
        }
    }
}
