use serde::Deserialize;
use std::time::Duration;

fn default_bind_address() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30u64
}

fn default_cache_capacity() -> usize {
    100usize
}

fn default_search_limit() -> usize {
    15usize
}

fn default_suggest_timeout_ms() -> u64 {
    3_000u64
}

fn default_resolve_timeout_secs() -> u64 {
    30u64
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Config {
    #[serde(default = "default_bind_address")]
    pub(crate) bind_address: String,
    #[serde(default = "default_shutdown_timeout")]
    pub(crate) shutdown_timeout: u64,
    /// Entries kept per logical cache (suggestions and search each get their own).
    #[serde(default = "default_cache_capacity")]
    pub(crate) cache_capacity: usize,
    #[serde(default = "default_search_limit")]
    pub(crate) search_limit: usize,
    #[serde(default = "default_suggest_timeout_ms")]
    pub(crate) suggest_timeout_ms: u64,
    #[serde(default = "default_resolve_timeout_secs")]
    pub(crate) resolve_timeout_secs: u64,
    #[serde(default = "default_ytdlp_path")]
    pub(crate) ytdlp_path: String,
}

impl Config {
    pub(crate) fn from_env() -> Self {
        match envy::from_env::<Self>() {
            Ok(config) => config,
            Err(error) => panic!("Invalid environment configuration: {:#?}", error),
        }
    }

    pub(crate) fn suggest_timeout(&self) -> Duration {
        Duration::from_millis(self.suggest_timeout_ms)
    }

    pub(crate) fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }
}
