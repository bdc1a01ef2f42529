use std::sync::Arc;
use tokio::signal;
use tracing::info;

use game_persistence::{connection::connect_and_migrate, repositories::SyncRecordRepository};
use game_server::{
    config::Config,
    create_routes,
    store::{MemoryRecordStore, RecordStore},
    sync_service::SyncService,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting word sync server...");

    let config = Config::new();

    let store: Arc<dyn RecordStore> = if config.dev_mode {
        info!("Starting in development mode - records are kept in memory only");
        Arc::new(MemoryRecordStore::new())
    } else {
        // Initialize database connection and run migrations
        match connect_and_migrate().await {
            Ok(db) => Arc::new(SyncRecordRepository::new(db)),
            Err(e) => {
                tracing::error!("Failed to connect to database and run migrations: {}", e);
                std::process::exit(1);
            }
        }
    };

    let sync_service = Arc::new(SyncService::new(store, config.code_generation_attempts));
    let routes = create_routes(sync_service);

    info!("Server starting on {}:{}", config.host, config.port);

    let ip = match config.host.parse::<std::net::IpAddr>() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::error!("Invalid HOST '{}': {}", config.host, e);
            std::process::exit(1);
        }
    };

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown((ip, config.port), async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).unwrap();
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
