pub mod prelude;
pub mod sync_records;
