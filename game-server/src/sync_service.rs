use std::sync::Arc;

use game_persistence::repositories::RecordWrite;
use game_types::{CODE_ALPHABET, CODE_HALF_LENGTH, Snapshot, SyncCode, SyncRecord};
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

use crate::store::RecordStore;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("could not find a free sync code after {attempts} attempts")]
    CodesExhausted { attempts: usize },

    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

/// A random code drawn from the unambiguous alphabet.
pub fn random_code<R: Rng + ?Sized>(rng: &mut R) -> SyncCode {
    let mut indices = [0usize; CODE_HALF_LENGTH * 2];
    for index in indices.iter_mut() {
        *index = rng.random_range(0..CODE_ALPHABET.len());
    }
    SyncCode::from_indices(indices)
}

/// Versioned record rules on top of a [`RecordStore`].
pub struct SyncService {
    store: Arc<dyn RecordStore>,
    code_attempts: usize,
}

impl SyncService {
    pub fn new(store: Arc<dyn RecordStore>, code_attempts: usize) -> Self {
        Self {
            store,
            code_attempts: code_attempts.max(1),
        }
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    /// Mint a fresh code holding `data` at version 1, retrying on collisions.
    pub async fn generate(&self, data: &Snapshot) -> Result<SyncCode, ServiceError> {
        for attempt in 1..=self.code_attempts {
            let code = random_code(&mut rand::rng());
            if self.store.insert_if_absent(&code, data, Self::now()).await? {
                info!("Minted sync code {} (attempt {})", code, attempt);
                return Ok(code);
            }
            warn!("Sync code {} already taken, retrying", code);
        }

        Err(ServiceError::CodesExhausted {
            attempts: self.code_attempts,
        })
    }

    pub async fn fetch(&self, code: &SyncCode) -> Result<Option<SyncRecord>, ServiceError> {
        Ok(self.store.get(code).await?)
    }

    /// Accept `data` only when `version` is newer than what is stored.
    pub async fn write(
        &self,
        code: &SyncCode,
        data: &Snapshot,
        version: u64,
    ) -> Result<RecordWrite, ServiceError> {
        let outcome = self
            .store
            .write_if_newer(code, data, version, Self::now())
            .await?;

        if let RecordWrite::Conflict(current) = &outcome {
            info!(
                "Rejected write to {} at version {} (stored version {})",
                code, version, current.version
            );
        }
        Ok(outcome)
    }
}
