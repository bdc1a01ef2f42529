use anyhow::Result;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::debug;

use crate::entities::{prelude::*, sync_records};
use game_types::{Snapshot, SyncCode, SyncRecord};

/// Outcome of a conditional write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordWrite {
    Written { version: u64 },
    /// The stored version was not older than the submitted one.
    Conflict(SyncRecord),
    Missing,
}

pub struct SyncRecordRepository {
    db: DatabaseConnection,
}

impl SyncRecordRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_record(model: sync_records::Model) -> Result<SyncRecord> {
        Ok(SyncRecord {
            data: serde_json::from_str(&model.data)?,
            version: u64::try_from(model.version)?,
            last_synced_at: model.last_sync,
            created_at: model.created_at,
        })
    }

    pub async fn find_by_code(&self, code: &SyncCode) -> Result<Option<SyncRecord>> {
        let model = SyncRecords::find_by_id(code.as_str().to_string())
            .one(&self.db)
            .await?;

        model.map(Self::model_to_record).transpose()
    }

    /// Create a record at version 1. Returns `false` if the code is taken.
    pub async fn insert_if_absent(&self, code: &SyncCode, data: &Snapshot, now: i64) -> Result<bool> {
        let model = sync_records::ActiveModel {
            code: ActiveValue::Set(code.as_str().to_string()),
            data: ActiveValue::Set(serde_json::to_string(data)?),
            version: ActiveValue::Set(1),
            last_sync: ActiveValue::Set(now),
            created_at: ActiveValue::Set(now),
        };

        let inserted = SyncRecords::insert(model)
            .on_conflict(
                OnConflict::column(sync_records::Column::Code)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(inserted == 1)
    }

    /// Store `data` as `version` only if the stored version is older.
    ///
    /// The version check and the update are one statement, so two writers
    /// racing for the same version cannot both succeed.
    pub async fn write_if_newer(
        &self,
        code: &SyncCode,
        data: &Snapshot,
        version: u64,
        now: i64,
    ) -> Result<RecordWrite> {
        let version_column = i64::try_from(version)?;

        let result = SyncRecords::update_many()
            .col_expr(sync_records::Column::Data, Expr::value(serde_json::to_string(data)?))
            .col_expr(sync_records::Column::Version, Expr::value(version_column))
            .col_expr(sync_records::Column::LastSync, Expr::value(now))
            .filter(sync_records::Column::Code.eq(code.as_str()))
            .filter(sync_records::Column::Version.lt(version_column))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 1 {
            debug!("Stored {} at version {}", code, version);
            return Ok(RecordWrite::Written { version });
        }

        Ok(match self.find_by_code(code).await? {
            Some(current) => RecordWrite::Conflict(current),
            None => RecordWrite::Missing,
        })
    }
}
