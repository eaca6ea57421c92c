//! High score leaderboard
//!
//! One top-10 list per game, persisted through `ScoreStore`.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Longest player name kept on the board
pub const MAX_NAME_LEN: usize = 20;

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
    /// `YYYY-MM-DD`
    pub date: String,
}

impl HighScoreEntry {
    /// Trims the name and cuts it to `MAX_NAME_LEN` characters
    pub fn new(name: &str, score: u64, date: impl Into<String>) -> Self {
        Self {
            name: clean_name(name),
            score,
            date: date.into(),
        }
    }
}

/// Trim and cut a player name, falling back to "Guest"
pub fn clean_name(name: &str) -> String {
    let name: String = name.trim().chars().take(MAX_NAME_LEN).collect();
    let name = name.trim_end().to_string();
    if name.is_empty() {
        "Guest".to_string()
    } else {
        name
    }
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<HighScoreEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry, keeping the list sorted descending and bounded
    ///
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    /// Ties keep the earlier entry ahead.
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let rank = self.potential_rank(entry.score)?;
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Format a unix timestamp (ms) as `YYYY-MM-DD` in UTC
pub fn format_date(timestamp_ms: f64) -> String {
    let nanos = (timestamp_ms as i128) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&DATE_FORMAT).ok())
        .unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u64) -> HighScoreEntry {
        HighScoreEntry::new(name, score, "2026-06-20")
    }

    #[test]
    fn test_sorted_descending_and_bounded() {
        let mut board = Leaderboard::new();
        for score in [30, 10, 50, 20, 40, 60, 70, 80, 90, 100, 110] {
            board.add(entry("p", score));
        }
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.top_score(), Some(110));
        assert_eq!(board.entries.last().map(|e| e.score), Some(20));
        assert!(board.entries.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_low_score_does_not_qualify_when_full() {
        let mut board = Leaderboard::new();
        for score in 1..=10 {
            board.add(entry("p", score * 10));
        }
        assert_eq!(board.add(entry("late", 5)), None);
        assert_eq!(board.add(entry("late", 0)), None);
        assert_eq!(board.add(entry("good", 55)), Some(6));
    }

    #[test]
    fn test_ties_rank_behind_existing() {
        let mut board = Leaderboard::new();
        board.add(entry("first", 100));
        assert_eq!(board.add(entry("second", 100)), Some(2));
        assert_eq!(board.entries[0].name, "first");
    }

    #[test]
    fn test_names_are_trimmed_and_cut() {
        assert_eq!(entry("  Aunt Margaret  ", 1).name, "Aunt Margaret");
        assert_eq!(
            entry("Bartholomew Fitzwilliam III", 1).name,
            "Bartholomew Fitzwill"
        );
        assert_eq!(entry("   ", 1).name, "Guest");
    }

    #[test]
    fn test_format_date() {
        // 2026-06-20T12:00:00Z
        assert_eq!(format_date(1_781_956_800_000.0), "2026-06-20");
    }
}
