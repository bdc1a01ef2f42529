pub mod sync_record_repository;

pub use sync_record_repository::{RecordWrite, SyncRecordRepository};
