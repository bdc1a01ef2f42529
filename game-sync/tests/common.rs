#![allow(dead_code)]

use std::sync::Arc;

use game_core::{Clock, LocalData, ManualClock, MemoryStore};
use game_server::create_routes;
use game_server::store::{MemoryRecordStore, RecordStore};
use game_server::sync_service::SyncService;
use game_sync::{HttpRemoteStore, SyncClient, SyncConfig};
use std::time::Duration;

/// Serves the sync API on an ephemeral port and returns its base URL
pub async fn spawn_server() -> String {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let routes = create_routes(Arc::new(SyncService::new(store, 10)));
    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    format!("http://{}", addr)
}

pub fn http_store(base_url: &str) -> HttpRemoteStore {
    HttpRemoteStore::new(&SyncConfig::default().with_server_url(base_url)).unwrap()
}

/// One simulated installation: its own storage, clock and client
pub struct Device {
    pub local: LocalData<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub client: SyncClient<HttpRemoteStore>,
}

impl Device {
    pub fn new(base_url: &str, start_millis: i64) -> Self {
        let clock = Arc::new(ManualClock::new(start_millis));
        let shared: Arc<dyn Clock> = clock.clone();
        Self {
            local: LocalData::load(MemoryStore::new(), shared.clone()),
            client: SyncClient::new(http_store(base_url), shared).with_status_linger(Duration::ZERO),
            clock,
        }
    }
}
