use game_types::SyncCodeError;
use thiserror::Error;

/// Everything that can go wrong during a sync cycle.
///
/// None of these ever reach gameplay: local state is recorded before any
/// sync starts, so the worst outcome is a stale remote copy.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Code failed the `XXXX-YYYY` shape check; no request was sent.
    #[error("invalid sync code: {0}")]
    InvalidFormat(#[from] SyncCodeError),

    #[error("sync code {0} not found")]
    NotFound(String),

    /// The write lost a race twice in one cycle.
    #[error("remote kept changing (now at version {current_version}), try again")]
    Conflict { current_version: u64 },

    #[error("network error: {0}")]
    Network(String),

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("sync is not enabled on this device")]
    NotConfigured,
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SyncError::Decode(e.to_string())
        } else {
            SyncError::Network(e.to_string())
        }
    }
}

impl SyncError {
    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SyncError::Network(_) | SyncError::Conflict { .. } | SyncError::Server { .. }
        )
    }
}
