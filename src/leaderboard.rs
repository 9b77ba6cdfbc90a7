//! Session leaderboard
//!
//! Ranks completed levels by score. Persisted to LocalStorage on the web,
//! kept in memory natively. Receives runs through `ScoreSink`.

use serde::{Deserialize, Serialize};

use crate::platform;
use crate::services::{RunRecord, ScoreSink};

/// Maximum number of entries to keep
pub const MAX_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub thumbnail: Option<String>,
    pub score: u64,
    pub level: u32,
    /// Unix timestamp (ms) when recorded
    pub timestamp: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionLeaderboard {
    /// Sorted by score, highest first
    pub entries: Vec<LeaderboardEntry>,
}

impl SessionLeaderboard {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "powder_run_leaderboard";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Whether a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Insert a run; returns its 1-based rank, or None if it didn't qualify
    pub fn add(&mut self, record: RunRecord, timestamp: f64) -> Option<usize> {
        if !self.qualifies(record.score) {
            return None;
        }

        let entry = LeaderboardEntry {
            name: record.name,
            thumbnail: record.thumbnail,
            score: record.score,
            level: record.level,
            timestamp,
        };

        // Ties go below existing entries
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_ENTRIES);
        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<SessionLeaderboard>(&json) {
                    Ok(board) => {
                        log::info!("Loaded {} leaderboard entries", board.entries.len());
                        return board;
                    }
                    Err(e) => log::warn!("Stored leaderboard unreadable, starting fresh: {}", e),
                }
            }
        }

        log::info!("No leaderboard found, starting fresh");
        Self::new()
    }

    /// Save to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Leaderboard saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

impl ScoreSink for SessionLeaderboard {
    fn record(&mut self, record: RunRecord) {
        let (name, level, score) = (record.name.clone(), record.level, record.score);
        match self.add(record, platform::epoch_ms()) {
            Some(rank) => {
                log::info!("{} ranked #{} with {} on level {}", name, rank, score, level);
                self.save();
            }
            None => log::debug!("{} on level {} did not make the board", score, level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(score: u64, level: u32) -> RunRecord {
        RunRecord {
            name: "Test".to_string(),
            thumbnail: None,
            score,
            level,
        }
    }

    #[test]
    fn test_ranks_descending() {
        let mut board = SessionLeaderboard::new();
        assert_eq!(board.add(run(500, 1), 0.0), Some(1));
        assert_eq!(board.add(run(900, 2), 0.0), Some(1));
        assert_eq!(board.add(run(700, 3), 0.0), Some(2));
        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![900, 700, 500]);
        assert_eq!(board.top_score(), Some(900));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut board = SessionLeaderboard::new();
        assert_eq!(board.add(run(0, 1), 0.0), None);
        assert!(board.is_empty());
    }

    #[test]
    fn test_keeps_top_entries_only() {
        let mut board = SessionLeaderboard::new();
        for i in 1..=MAX_ENTRIES as u64 {
            board.add(run(i * 100, 1), 0.0);
        }
        assert!(!board.qualifies(50));
        assert_eq!(board.add(run(50, 1), 0.0), None);
        assert_eq!(board.add(run(10_000, 4), 0.0), Some(1));
        assert_eq!(board.entries.len(), MAX_ENTRIES);
        assert_eq!(board.entries.last().map(|e| e.score), Some(200));
    }

    #[test]
    fn test_record_through_sink() {
        let mut board = SessionLeaderboard::new();
        let sink: &mut dyn ScoreSink = &mut board;
        sink.record(RunRecord {
            name: "Ada".to_string(),
            thumbnail: Some("data:image/png;base64,AAAA".to_string()),
            score: 1200,
            level: 3,
        });
        assert_eq!(board.entries.len(), 1);
        assert_eq!(board.entries[0].name, "Ada");
        assert_eq!(board.entries[0].level, 3);
        assert!(board.entries[0].thumbnail.is_some());
    }
}
