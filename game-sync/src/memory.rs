use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use game_types::{CODE_ALPHABET, CODE_HALF_LENGTH, Snapshot, SyncCode, SyncRecord};

use crate::{RemoteStore, SyncError, WriteOutcome};

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<SyncCode, SyncRecord>,
    minted: usize,
    now: i64,
    requests: usize,
    writes: usize,
    competing_writes: VecDeque<Snapshot>,
    fail_next: Option<String>,
}

/// In-process `RemoteStore` with the same version rules as the server.
///
/// Clones share state, so two clients holding clones behave like two
/// devices talking to one server. Competing writes and network failures
/// can be scripted for tests and offline play.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemoteStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves the map consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Timestamp stamped on records from now on.
    pub fn set_now(&self, now: i64) {
        self.lock().now = now;
    }

    pub fn insert(&self, code: SyncCode, record: SyncRecord) {
        self.lock().records.insert(code, record);
    }

    pub fn record(&self, code: &SyncCode) -> Option<SyncRecord> {
        self.lock().records.get(code).cloned()
    }

    /// Before the next write is handled, another device stores `data` at
    /// the following version.
    pub fn queue_competing_write(&self, data: Snapshot) {
        self.lock().competing_writes.push_back(data);
    }

    /// The next request fails as if the network were down.
    pub fn fail_next_request(&self, message: impl Into<String>) {
        self.lock().fail_next = Some(message.into());
    }

    /// Requests received, including failed ones.
    pub fn request_count(&self) -> usize {
        self.lock().requests
    }

    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn begin(&self) -> Result<MutexGuard<'_, Inner>, SyncError> {
        let mut inner = self.lock();
        inner.requests += 1;
        match inner.fail_next.take() {
            Some(message) => Err(SyncError::Network(message)),
            None => Ok(inner),
        }
    }
}

fn mint_code(mut n: usize) -> SyncCode {
    let mut indices = [0usize; CODE_HALF_LENGTH * 2];
    for slot in indices.iter_mut().rev() {
        *slot = n % CODE_ALPHABET.len();
        n /= CODE_ALPHABET.len();
    }
    SyncCode::from_indices(indices)
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn generate(&self, data: &Snapshot) -> Result<SyncCode, SyncError> {
        let mut inner = self.begin()?;
        let code = loop {
            let candidate = mint_code(inner.minted);
            inner.minted += 1;
            if !inner.records.contains_key(&candidate) {
                break candidate;
            }
        };
        let now = inner.now;
        inner.records.insert(
            code.clone(),
            SyncRecord {
                data: data.clone(),
                version: 1,
                last_synced_at: now,
                created_at: now,
            },
        );
        Ok(code)
    }

    async fn fetch(&self, code: &SyncCode) -> Result<SyncRecord, SyncError> {
        let inner = self.begin()?;
        inner
            .records
            .get(code)
            .cloned()
            .ok_or_else(|| SyncError::NotFound(code.to_string()))
    }

    async fn write(
        &self,
        code: &SyncCode,
        data: &Snapshot,
        version: u64,
    ) -> Result<WriteOutcome, SyncError> {
        let mut inner = self.begin()?;
        inner.writes += 1;
        let now = inner.now;
        let competing = inner.competing_writes.pop_front();

        let record = inner
            .records
            .get_mut(code)
            .ok_or_else(|| SyncError::NotFound(code.to_string()))?;

        if let Some(other) = competing {
            record.data = other;
            record.version += 1;
            record.last_synced_at = now;
        }

        if version <= record.version {
            return Ok(WriteOutcome::Conflict {
                current_version: record.version,
                current_data: record.data.clone(),
            });
        }

        record.data = data.clone();
        record.version = version;
        record.last_synced_at = now;
        Ok(WriteOutcome::Written { version })
    }
}
