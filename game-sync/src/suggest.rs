use async_trait::async_trait;
use game_core::{SuggestionRequest, WordSuggester, WordSuggestion};
use reqwest::Client;
use tracing::debug;

use crate::{SyncConfig, SyncError};

/// Asks an AI proxy for the next secret word.
///
/// The proxy owns prompting; this side only sends the player's recent words
/// and reads back `{ "word": ..., "reasoning": ... }`.
#[derive(Debug, Clone)]
pub struct HttpWordSuggester {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpWordSuggester {
    pub fn new(
        config: &SyncConfig,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, SyncError> {
        Ok(Self {
            client: Client::builder().timeout(config.timeout).build()?,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl WordSuggester for HttpWordSuggester {
    async fn suggest(&self, request: &SuggestionRequest) -> anyhow::Result<WordSuggestion> {
        debug!("Requesting word suggestion from {}", self.endpoint);
        let suggestion = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<WordSuggestion>()
            .await?;
        Ok(suggestion)
    }
}
