use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::MAX_GUESSES;

/// Aggregate play statistics for one installation.
///
/// Counters only move forward; the single exception is an explicit
/// user reset back to `Statistics::default()`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Statistics {
    pub played: u32,
    pub wins: u32,
    pub current_streak: u32,
    pub max_streak: u32,
    pub guess_distribution: [u32; MAX_GUESSES],
    pub ai_words: u32,
    pub list_words: u32,
}

impl Statistics {
    /// Win percentage rounded down, 0 before the first game.
    pub fn win_percentage(&self) -> u32 {
        if self.played == 0 {
            0
        } else {
            (u64::from(self.wins) * 100 / u64::from(self.played)) as u32
        }
    }
}
