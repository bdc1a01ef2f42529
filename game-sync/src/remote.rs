use async_trait::async_trait;
use game_types::{Snapshot, SyncCode, SyncRecord};

use crate::SyncError;

/// Result of a versioned write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written {
        version: u64,
    },
    /// Another device wrote first; this is what it left behind.
    Conflict {
        current_version: u64,
        current_data: Snapshot,
    },
}

/// The remote versioned blob store, addressed by sync code.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Mint a new code holding `data` at version 1.
    async fn generate(&self, data: &Snapshot) -> Result<SyncCode, SyncError>;

    async fn fetch(&self, code: &SyncCode) -> Result<SyncRecord, SyncError>;

    /// Store `data` as `version`, accepted only if `version` is newer than
    /// what the store holds.
    async fn write(
        &self,
        code: &SyncCode,
        data: &Snapshot,
        version: u64,
    ) -> Result<WriteOutcome, SyncError>;
}
