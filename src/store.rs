//! Best-score and leaderboard persistence
//!
//! Games never touch browser storage directly; they go through
//! `ScoreStore`, which every `KeyValueStore` provides.

use std::collections::BTreeMap;

use crate::highscores::{HighScoreEntry, Leaderboard};

/// Storage failures
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("storage is not available")]
    Unavailable,

    #[error("storage write rejected for key {key}: {reason}")]
    WriteRejected { key: String, reason: String },

    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Minimal string key-value port (LocalStorage on the web)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store for tests and the native build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage key of a game's best score
pub fn best_key(game_id: &str) -> String {
    format!("{}_highScore", game_id)
}

/// Storage key of a game's leaderboard
pub fn leaderboard_key(game_id: &str) -> String {
    format!("{}_leaderboard", game_id)
}

/// Score persistence used by the engine and the surrounding page
pub trait ScoreStore {
    /// Stored best score (0 when missing or unreadable)
    fn read_best(&self, game_id: &str) -> u64;

    /// Store `max(score, current best)`; returns the stored value
    fn write_best(&mut self, game_id: &str, score: u64) -> Result<u64, StoreError>;

    fn leaderboard(&self, game_id: &str) -> Leaderboard;

    /// Insert an entry into the top-10 list; returns its 1-based rank
    fn append_leaderboard(
        &mut self,
        game_id: &str,
        entry: HighScoreEntry,
    ) -> Result<Option<usize>, StoreError>;
}

impl<T: KeyValueStore + ?Sized> ScoreStore for T {
    fn read_best(&self, game_id: &str) -> u64 {
        self.get(&best_key(game_id))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    fn write_best(&mut self, game_id: &str, score: u64) -> Result<u64, StoreError> {
        let best = self.read_best(game_id).max(score);
        self.set(&best_key(game_id), &best.to_string())?;
        Ok(best)
    }

    fn leaderboard(&self, game_id: &str) -> Leaderboard {
        match self.get(&leaderboard_key(game_id)) {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Discarding unreadable {} leaderboard: {}", game_id, e);
                Leaderboard::new()
            }),
            None => Leaderboard::new(),
        }
    }

    fn append_leaderboard(
        &mut self,
        game_id: &str,
        entry: HighScoreEntry,
    ) -> Result<Option<usize>, StoreError> {
        let mut board = self.leaderboard(game_id);
        let rank = board.add(entry);
        if rank.is_some() {
            let json = serde_json::to_string(&board)?;
            self.set(&leaderboard_key(game_id), &json)?;
            log::info!("{} leaderboard saved ({} entries)", game_id, board.entries.len());
        }
        Ok(rank)
    }
}
