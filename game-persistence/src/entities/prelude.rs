pub use super::sync_records::Entity as SyncRecords;
