use async_trait::async_trait;
use game_types::{
    ConflictResponse, ErrorResponse, GenerateResponse, Snapshot, SyncCode, SyncCodeError,
    SyncRecord, WriteResponse,
};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::{RemoteStore, SyncConfig, SyncError, WriteOutcome};

#[derive(Serialize)]
struct GenerateBody<'a> {
    data: &'a Snapshot,
}

#[derive(Serialize)]
struct WriteBody<'a> {
    data: &'a Snapshot,
    version: u64,
}

/// `RemoteStore` backed by the sync server's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
}

impl HttpRemoteStore {
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn record_url(&self, code: &SyncCode) -> String {
        format!("{}/sync/{}", self.base_url, code)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn generate(&self, data: &Snapshot) -> Result<SyncCode, SyncError> {
        let url = format!("{}/sync/generate", self.base_url);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&GenerateBody { data })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(server_error(response).await);
        }

        let body: GenerateResponse = response.json().await?;
        SyncCode::parse(&body.code)
            .map_err(|e| SyncError::Decode(format!("server minted a malformed code: {}", e)))
    }

    async fn fetch(&self, code: &SyncCode) -> Result<SyncRecord, SyncError> {
        let url = self.record_url(code);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(SyncError::NotFound(code.to_string())),
            StatusCode::BAD_REQUEST => Err(SyncCodeError::InvalidFormat {
                code: code.to_string(),
            }
            .into()),
            _ => Err(server_error(response).await),
        }
    }

    async fn write(
        &self,
        code: &SyncCode,
        data: &Snapshot,
        version: u64,
    ) -> Result<WriteOutcome, SyncError> {
        let url = self.record_url(code);
        debug!("PUT {} (version {})", url, version);

        let response = self
            .client
            .put(&url)
            .json(&WriteBody { data, version })
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body: WriteResponse = response.json().await?;
                Ok(WriteOutcome::Written {
                    version: body.version,
                })
            }
            StatusCode::CONFLICT => {
                let body: ConflictResponse = response.json().await?;
                Ok(WriteOutcome::Conflict {
                    current_version: body.current_version,
                    current_data: body.current_data,
                })
            }
            StatusCode::NOT_FOUND => Err(SyncError::NotFound(code.to_string())),
            StatusCode::BAD_REQUEST => Err(SyncCodeError::InvalidFormat {
                code: code.to_string(),
            }
            .into()),
            _ => Err(server_error(response).await),
        }
    }
}

async fn server_error(response: Response) -> SyncError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    SyncError::Server { status, message }
}
