use game_persistence::repositories::RecordWrite;
use game_types::{ConflictResponse, GenerateResponse, Snapshot, SyncCode, WriteResponse};
use serde::Deserialize;
use std::sync::Arc;
use warp::Filter;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;

use crate::sync_service::{ServiceError, SyncService};

pub mod config;
pub mod store;
pub mod sync_service;

/// Snapshots are small; anything past this is not a client of ours.
const MAX_BODY_BYTES: u64 = 256 * 1024;

#[derive(Deserialize)]
struct GenerateBody {
    data: Option<Snapshot>,
}

#[derive(Deserialize)]
struct WriteBody {
    data: Option<Snapshot>,
    version: Option<u64>,
}

pub fn create_routes(
    sync_service: Arc<SyncService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let sync_service_filter = warp::any().map({
        let sync_service = sync_service.clone();
        move || sync_service.clone()
    });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let generate = warp::path!("sync" / "generate")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(sync_service_filter.clone())
        .and_then(handle_generate_request);

    let fetch = warp::path!("sync" / String)
        .and(warp::get())
        .and(sync_service_filter.clone())
        .and_then(handle_fetch_request);

    let write = warp::path!("sync" / String)
        .and(warp::put())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(sync_service_filter.clone())
        .and_then(handle_write_request);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST", "PUT"]);

    health
        .or(generate)
        .or(fetch)
        .or(write)
        .with(cors)
        .with(warp::log("word_sync"))
}

fn error_reply(message: &str, status: StatusCode) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": message })),
        status,
    )
}

fn service_error_reply(err: ServiceError) -> warp::reply::WithStatus<warp::reply::Json> {
    tracing::error!("Sync request failed: {}", err);
    match err {
        ServiceError::CodesExhausted { .. } => error_reply(
            "Failed to generate a unique sync code",
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        ServiceError::Storage(_) => {
            error_reply("Failed to access sync storage", StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn handle_generate_request(
    body: Bytes,
    sync_service: Arc<SyncService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let data = match serde_json::from_slice::<GenerateBody>(&body) {
        Ok(GenerateBody { data: Some(data) }) => data,
        _ => return Ok(error_reply("Missing data", StatusCode::BAD_REQUEST)),
    };

    match sync_service.generate(&data).await {
        Ok(code) => Ok(warp::reply::with_status(
            warp::reply::json(&GenerateResponse {
                code: code.to_string(),
            }),
            StatusCode::OK,
        )),
        Err(err) => Ok(service_error_reply(err)),
    }
}

async fn handle_fetch_request(
    raw_code: String,
    sync_service: Arc<SyncService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let Ok(code) = SyncCode::parse(&raw_code) else {
        return Ok(error_reply("Invalid sync code format", StatusCode::BAD_REQUEST));
    };

    match sync_service.fetch(&code).await {
        Ok(Some(record)) => Ok(warp::reply::with_status(
            warp::reply::json(&record),
            StatusCode::OK,
        )),
        Ok(None) => Ok(error_reply("Sync code not found", StatusCode::NOT_FOUND)),
        Err(err) => Ok(service_error_reply(err)),
    }
}

async fn handle_write_request(
    raw_code: String,
    body: Bytes,
    sync_service: Arc<SyncService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let Ok(code) = SyncCode::parse(&raw_code) else {
        return Ok(error_reply("Invalid sync code format", StatusCode::BAD_REQUEST));
    };

    let (data, version) = match serde_json::from_slice::<WriteBody>(&body) {
        Ok(WriteBody {
            data: Some(data),
            version: Some(version),
        }) => (data, version),
        _ => return Ok(error_reply("Missing data or version", StatusCode::BAD_REQUEST)),
    };

    match sync_service.write(&code, &data, version).await {
        Ok(RecordWrite::Written { version }) => Ok(warp::reply::with_status(
            warp::reply::json(&WriteResponse {
                success: true,
                version,
            }),
            StatusCode::OK,
        )),
        Ok(RecordWrite::Conflict(current)) => Ok(warp::reply::with_status(
            warp::reply::json(&ConflictResponse {
                error: "Version conflict".to_string(),
                current_version: current.version,
                current_data: current.data,
            }),
            StatusCode::CONFLICT,
        )),
        Ok(RecordWrite::Missing) => Ok(error_reply("Sync code not found", StatusCode::NOT_FOUND)),
        Err(err) => Ok(service_error_reply(err)),
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::store::{MemoryRecordStore, RecordStore};
    use game_persistence::repositories::SyncRecordRepository;
    use game_types::SyncRecord;
    use migration::{Migrator, MigratorTrait};

    fn create_test_app() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone
    {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        create_routes(Arc::new(SyncService::new(store, 10)))
    }

    async fn create_db_test_app()
    -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        // Create in-memory database for tests
        let db = game_persistence::connection::connect_to_memory_database()
            .await
            .unwrap();
        Migrator::up(&db, None).await.unwrap();
        let store: Arc<dyn RecordStore> = Arc::new(SyncRecordRepository::new(db));
        create_routes(Arc::new(SyncService::new(store, 10)))
    }

    async fn generate_code<F>(app: &F, data: serde_json::Value) -> String
    where
        F: Filter + 'static,
        F::Extract: warp::Reply + Send,
    {
        let response = warp::test::request()
            .method("POST")
            .path("/sync/generate")
            .json(&serde_json::json!({ "data": data }))
            .reply(app)
            .await;
        assert_eq!(response.status(), 200);

        let body: GenerateResponse = serde_json::from_slice(response.body()).unwrap();
        body.code
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), "OK");
    }

    #[tokio::test]
    async fn test_generate_then_fetch() {
        let app = create_test_app();
        let code = generate_code(
            &app,
            serde_json::json!({ "stats": { "played": 3, "wins": 2 }, "usedWords": ["CRANE"] }),
        )
        .await;

        assert!(SyncCode::parse(&code).is_ok());

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/sync/{}", code))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);

        let value: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["data"]["stats"]["played"], 3);
        assert_eq!(value["lastSync"], value["createdAt"]);
    }

    #[tokio::test]
    async fn test_generate_requires_data() {
        let app = create_test_app();

        let response = warp::test::request()
            .method("POST")
            .path("/sync/generate")
            .json(&serde_json::json!({}))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_fetch_invalid_code_format() {
        let app = create_test_app();

        let response = warp::test::request()
            .method("GET")
            .path("/sync/ABC")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 400);
        let value: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(value["error"], "Invalid sync code format");
    }

    #[tokio::test]
    async fn test_fetch_unknown_code() {
        let app = create_test_app();

        let response = warp::test::request()
            .method("GET")
            .path("/sync/ABCD-EFGH")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_put_newer_version_then_conflict() {
        let app = create_test_app();
        let code = generate_code(&app, serde_json::json!({})).await;
        let path = format!("/sync/{}", code);

        let response = warp::test::request()
            .method("PUT")
            .path(&path)
            .json(&serde_json::json!({ "data": { "usedWords": ["PLANT"] }, "version": 2 }))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let written: WriteResponse = serde_json::from_slice(response.body()).unwrap();
        assert!(written.success);
        assert_eq!(written.version, 2);

        let response = warp::test::request()
            .method("PUT")
            .path(&path)
            .json(&serde_json::json!({ "data": { "usedWords": ["HOUSE"] }, "version": 2 }))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 409);

        let conflict: ConflictResponse = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(conflict.current_version, 2);
        assert!(conflict.current_data.used_words.contains("PLANT"));
    }

    #[tokio::test]
    async fn test_put_skipping_versions_is_accepted() {
        let app = create_test_app();
        let code = generate_code(&app, serde_json::json!({})).await;

        let response = warp::test::request()
            .method("PUT")
            .path(&format!("/sync/{}", code))
            .json(&serde_json::json!({ "data": {}, "version": 9 }))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/sync/{}", code))
            .reply(&app)
            .await;
        let record: SyncRecord = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(record.version, 9);
    }

    #[tokio::test]
    async fn test_put_missing_fields() {
        let app = create_test_app();
        let code = generate_code(&app, serde_json::json!({})).await;

        let response = warp::test::request()
            .method("PUT")
            .path(&format!("/sync/{}", code))
            .json(&serde_json::json!({ "data": {} }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_put_unknown_code() {
        let app = create_test_app();

        let response = warp::test::request()
            .method("PUT")
            .path("/sync/ABCD-EFGH")
            .json(&serde_json::json!({ "data": {}, "version": 2 }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_database_backed_round_trip() {
        let app = create_db_test_app().await;
        let code = generate_code(&app, serde_json::json!({ "stats": { "played": 1 } })).await;
        let path = format!("/sync/{}", code.to_lowercase());

        let response = warp::test::request()
            .method("PUT")
            .path(&path)
            .json(&serde_json::json!({ "data": { "stats": { "played": 2 } }, "version": 2 }))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);

        let response = warp::test::request()
            .method("GET")
            .path(&path)
            .reply(&app)
            .await;
        let record: SyncRecord = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(record.version, 2);
        assert_eq!(record.data.stats.played, 2);
    }
}
