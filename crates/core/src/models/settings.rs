use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::CoreError;

/// Default storage slot holding the serialized trade list.
pub const DEFAULT_STORAGE_KEY: &str = "forex-trades";

/// Default slot mirroring the bearer token.
pub const DEFAULT_TOKEN_KEY: &str = "bearer_token";

/// Runtime configuration for the journal core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Base URL of the auth API (no trailing slash), e.g. "http://localhost:8080"
    pub api_base_url: String,

    /// Key-value slot for the trade list.
    pub storage_key: String,

    /// Key-value slot for the access token mirror.
    pub token_key: String,

    /// Directory used by file-backed stores.
    pub data_dir: PathBuf,

    /// HTTP timeout for auth calls, in seconds.
    pub http_timeout_secs: u64,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            data_dir: PathBuf::from(".trade-journal"),
            http_timeout_secs: 30,
        }
    }
}

impl JournalConfig {
    /// Defaults overridden by `JOURNAL_*` environment variables.
    /// A `.env` file in the working directory is loaded first, if present.
    pub fn from_env() -> Result<Self, CoreError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("JOURNAL_API_BASE_URL") {
            config.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(key) = lookup("JOURNAL_STORAGE_KEY") {
            config.storage_key = key;
        }
        if let Some(key) = lookup("JOURNAL_TOKEN_KEY") {
            config.token_key = key;
        }
        if let Some(dir) = lookup("JOURNAL_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup("JOURNAL_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = secs.trim().parse().map_err(|_| {
                CoreError::Config(format!(
                    "JOURNAL_HTTP_TIMEOUT_SECS must be a whole number of seconds, got '{secs}'"
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(CoreError::Config(format!(
                "api_base_url must start with http:// or https://, got '{}'",
                self.api_base_url
            )));
        }
        if self.storage_key.trim().is_empty() || self.token_key.trim().is_empty() {
            return Err(CoreError::Config("storage keys must not be empty".into()));
        }
        if self.storage_key == self.token_key {
            return Err(CoreError::Config(
                "storage_key and token_key must name different slots".into(),
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(CoreError::Config("http_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }
}
