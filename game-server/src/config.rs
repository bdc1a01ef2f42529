use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Keep records in memory instead of the database.
    pub dev_mode: bool,
    /// Random codes tried before `POST /sync/generate` gives up.
    pub code_generation_attempts: usize,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            dev_mode: env::var("SYNC_DEV_MODE").unwrap_or_else(|_| "false".to_string()) == "true",
            code_generation_attempts: env::var("CODE_GENERATION_ATTEMPTS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("Invalid CODE_GENERATION_ATTEMPTS"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
