//! High score leaderboard system
//!
//! Tracks the top 10 runs by survival time, persisted as a JSON file.
//! Missing or malformed data degrades to an empty list; writes are
//! best-effort and never retried.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Seconds survived
    pub survival_time: f32,
    /// Level reached
    pub level: u32,
    /// Enemies destroyed
    pub kills: u32,
}

/// High score leaderboard (sorted descending by survival time)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a run qualifies for the leaderboard
    pub fn qualifies(&self, survival_time: f32) -> bool {
        if survival_time <= 0.0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries
            .last()
            .map(|e| survival_time > e.survival_time)
            .unwrap_or(true)
    }

    /// Get the rank a run would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, survival_time: f32) -> Option<usize> {
        if !self.qualifies(survival_time) {
            return None;
        }
        let rank = self
            .entries
            .iter()
            .position(|e| survival_time > e.survival_time);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a finished run (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_run(&mut self, survival_time: f32, level: u32, kills: u32) -> Option<usize> {
        if !self.qualifies(survival_time) {
            return None;
        }

        let entry = HighScoreEntry {
            survival_time,
            level,
            kills,
        };

        // Find insertion point (sorted descending by survival time)
        let pos = self
            .entries
            .iter()
            .position(|e| survival_time > e.survival_time);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the best survival time (if any)
    pub fn top_time(&self) -> Option<f32> {
        self.entries.first().map(|e| e.survival_time)
    }

    /// Load high scores from disk. Any failure means a fresh leaderboard.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<HighScores>(&json) {
                Ok(scores) => {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    scores
                }
                Err(err) => {
                    log::warn!("High score data is malformed ({err}), starting fresh");
                    Self::new()
                }
            },
            Err(_) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
        }
    }

    /// Save high scores to disk (best-effort)
    pub fn save(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(err) = fs::write(path, json) {
                    log::warn!("Failed to save high scores: {err}");
                } else {
                    log::info!("High scores saved ({} entries)", self.entries.len());
                }
            }
            Err(err) => log::warn!("Failed to serialize high scores: {err}"),
        }
    }
}

/// Format seconds as "MM:SS" for HUD and summaries
pub fn format_time(seconds: f32) -> String {
    let total = seconds.max(0.0) as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sorts_descending_and_ranks() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_run(120.0, 5, 40), Some(1));
        assert_eq!(scores.add_run(300.0, 9, 120), Some(1));
        assert_eq!(scores.add_run(200.0, 7, 80), Some(2));

        let times: Vec<f32> = scores.entries.iter().map(|e| e.survival_time).collect();
        assert_eq!(times, vec![300.0, 200.0, 120.0]);
    }

    #[test]
    fn test_truncates_to_cap() {
        let mut scores = HighScores::new();
        for i in 0..15 {
            scores.add_run(100.0 + i as f32, 1, 0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_time(), Some(114.0));
    }

    #[test]
    fn test_zero_time_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0.0));
        assert_eq!(scores.potential_rank(0.0), None);
    }

    #[test]
    fn test_worse_than_full_board_is_rejected() {
        let mut scores = HighScores::new();
        for i in 0..MAX_HIGH_SCORES {
            scores.add_run(100.0 + i as f32, 1, 0);
        }
        assert_eq!(scores.add_run(50.0, 1, 0), None);
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let scores = HighScores::load(Path::new("/nonexistent/highscores.json"));
        assert!(scores.is_empty());
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let path = std::env::temp_dir().join("void_swarm_malformed_scores.json");
        std::fs::write(&path, "not json at all{{{").ok();

        let scores = HighScores::load(&path);
        assert!(scores.is_empty());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_save_load_roundtrip() {
        let path = std::env::temp_dir().join("void_swarm_scores_roundtrip.json");

        let mut scores = HighScores::new();
        scores.add_run(321.5, 12, 250);
        scores.save(&path);

        let loaded = HighScores::load(&path);
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.entries[0].level, 12);
        assert_eq!(loaded.entries[0].kills, 250);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(75.4), "01:15");
        assert_eq!(format_time(600.0), "10:00");
    }
}
