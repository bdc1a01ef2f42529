//! Cross-device synchronisation against a versioned remote store.
//!
//! A sync cycle reads the remote record, merges it with the local
//! snapshot, applies the merge locally and writes it back at the next
//! version. A write that loses a race is merged once more and retried
//! once; a second lost race is reported as [`SyncError::Conflict`].

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod remote;
pub mod suggest;

pub use client::{MAX_WRITE_ATTEMPTS, SyncClient, SyncOutcome, SyncReport, SyncStatus};
pub use config::SyncConfig;
pub use error::SyncError;
pub use http::HttpRemoteStore;
pub use memory::MemoryRemoteStore;
pub use remote::{RemoteStore, WriteOutcome};
pub use suggest::HttpWordSuggester;
