use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{HistoryEntry, Settings, Statistics};

/// Everything a device exports for synchronisation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Snapshot {
    #[serde(default)]
    pub stats: Statistics,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub used_words: BTreeSet<String>,
    #[serde(default)]
    pub settings: Settings,
}

impl Snapshot {
    /// Timestamp of the most recent game that carries one.
    pub fn last_played_at(&self) -> Option<i64> {
        self.history.iter().filter_map(|entry| entry.timestamp).max()
    }
}

/// The record the remote store keeps per sync code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SyncRecord {
    pub data: Snapshot,
    pub version: u64,
    #[serde(rename = "lastSync")]
    pub last_synced_at: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GenerateRequest {
    pub data: Snapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GenerateResponse {
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WriteRequest {
    pub data: Snapshot,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WriteResponse {
    pub success: bool,
    pub version: u64,
}

/// Body of a `409` from `PUT /sync/{code}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConflictResponse {
    pub error: String,
    pub current_version: u64,
    pub current_data: Snapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}
