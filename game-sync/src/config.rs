use std::time::Duration;

use tracing::warn;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_STATUS_LINGER_MS: u64 = 3000;

/// Client-side sync settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub server_url: String,
    pub timeout: Duration,
    /// How long `Success`/`Error` stay visible before the status drops back to `Idle`.
    pub status_linger: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            status_linger: Duration::from_millis(DEFAULT_STATUS_LINGER_MS),
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Self {
        let server_url = std::env::var("SYNC_SERVER_URL")
            .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            server_url,
            timeout: Duration::from_secs(env_u64("SYNC_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECONDS)),
            status_linger: Duration::from_millis(env_u64(
                "SYNC_STATUS_LINGER_MS",
                DEFAULT_STATUS_LINGER_MS,
            )),
        }
    }

    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into().trim_end_matches('/').to_string();
        self
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring {}={:?}, expected an integer", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.server_url, "http://127.0.0.1:8080");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.status_linger, Duration::from_millis(3000));
    }

    #[test]
    fn test_server_url_trailing_slash_trimmed() {
        let config = SyncConfig::default().with_server_url("https://sync.example.com/");
        assert_eq!(config.server_url, "https://sync.example.com");
    }
}
