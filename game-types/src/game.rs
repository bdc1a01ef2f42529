use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum LetterStatus {
    Correct, // Green - correct letter in correct position
    Present, // Yellow - correct letter in wrong position
    Absent,  // Gray - letter not in word, or budget already used
}

impl LetterStatus {
    /// Ordering used by the keyboard: a key never downgrades once revealed.
    pub fn rank(self) -> u8 {
        match self {
            LetterStatus::Correct => 2,
            LetterStatus::Present => 1,
            LetterStatus::Absent => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LetterResult {
    pub letter: char,
    pub status: LetterStatus,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuessRow {
    pub word: String,
    pub letters: Vec<LetterResult>,
}

impl GuessRow {
    pub fn is_solved(&self) -> bool {
        !self.letters.is_empty()
            && self
                .letters
                .iter()
                .all(|l| l.status == LetterStatus::Correct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum GameOutcome {
    Won,
    Lost,
}
