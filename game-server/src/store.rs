use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use game_persistence::repositories::{RecordWrite, SyncRecordRepository};
use game_types::{Snapshot, SyncCode, SyncRecord};

/// Where the server keeps sync records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, code: &SyncCode) -> Result<Option<SyncRecord>>;

    /// Create a version 1 record; `false` if the code already exists.
    async fn insert_if_absent(&self, code: &SyncCode, data: &Snapshot, now: i64) -> Result<bool>;

    /// Atomically store `data` as `version` if the stored version is older.
    async fn write_if_newer(
        &self,
        code: &SyncCode,
        data: &Snapshot,
        version: u64,
        now: i64,
    ) -> Result<RecordWrite>;
}

#[async_trait]
impl RecordStore for SyncRecordRepository {
    async fn get(&self, code: &SyncCode) -> Result<Option<SyncRecord>> {
        self.find_by_code(code).await
    }

    async fn insert_if_absent(&self, code: &SyncCode, data: &Snapshot, now: i64) -> Result<bool> {
        SyncRecordRepository::insert_if_absent(self, code, data, now).await
    }

    async fn write_if_newer(
        &self,
        code: &SyncCode,
        data: &Snapshot,
        version: u64,
        now: i64,
    ) -> Result<RecordWrite> {
        SyncRecordRepository::write_if_newer(self, code, data, version, now).await
    }
}

/// Records held in a concurrent map; used in dev mode and tests.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: DashMap<SyncCode, SyncRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, code: &SyncCode) -> Result<Option<SyncRecord>> {
        Ok(self.records.get(code).map(|record| record.value().clone()))
    }

    async fn insert_if_absent(&self, code: &SyncCode, data: &Snapshot, now: i64) -> Result<bool> {
        match self.records.entry(code.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(SyncRecord {
                    data: data.clone(),
                    version: 1,
                    last_synced_at: now,
                    created_at: now,
                });
                Ok(true)
            }
        }
    }

    async fn write_if_newer(
        &self,
        code: &SyncCode,
        data: &Snapshot,
        version: u64,
        now: i64,
    ) -> Result<RecordWrite> {
        let Some(mut record) = self.records.get_mut(code) else {
            return Ok(RecordWrite::Missing);
        };

        if version <= record.version {
            return Ok(RecordWrite::Conflict(record.value().clone()));
        }

        record.data = data.clone();
        record.version = version;
        record.last_synced_at = now;
        Ok(RecordWrite::Written { version })
    }
}
