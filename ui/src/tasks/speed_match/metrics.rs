//! Metric definitions for Speed Match summaries.

use serde::{Deserialize, Serialize};

use super::engine::SpeedMatchStats;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SpeedMatchMetrics {
    pub score: i32,
    pub matches: u32,
    pub errors: u32,
    pub accuracy: u32,
    pub sets_shown: usize,
    pub duration_secs: u32,
    pub answers_per_minute: f64,
}

impl SpeedMatchMetrics {
    pub fn from_stats(stats: SpeedMatchStats, sets_shown: usize, duration_secs: u32) -> Self {
        let answers = (stats.matches + stats.errors) as f64;
        let answers_per_minute = if duration_secs == 0 {
            0.0
        } else {
            answers * 60.0 / duration_secs as f64
        };

        Self {
            score: stats.score,
            matches: stats.matches,
            errors: stats.errors,
            accuracy: stats.accuracy,
            sets_shown,
            duration_secs,
            answers_per_minute,
        }
    }
}
