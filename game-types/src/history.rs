use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// `result` value recorded for a lost round.
pub const LOSS_RESULT: i8 = -1;

/// Where the secret word came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum WordSource {
    Ai,
    #[default]
    List,
}

/// One finished round.
///
/// `id` and `timestamp` are optional only so that entries written before
/// they existed still deserialize; every entry produced by this crate, and
/// every entry that has passed through a history store or a merge, has both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HistoryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub word: String,
    /// 1..=6 guesses to win, or `LOSS_RESULT`.
    pub result: i8,
    #[serde(default)]
    pub source: WordSource,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub understanding: Option<u8>,
}

impl HistoryEntry {
    pub fn is_win(&self) -> bool {
        self.result > 0
    }

    pub fn is_legacy(&self) -> bool {
        self.id.is_none() || self.timestamp.is_none()
    }
}
