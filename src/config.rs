//! [`Config`] read from the environment.

use std::{path::PathBuf, time::Duration};

use crate::{key, Client, Key, Model, StyleExample};

/// Variable holding the API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Variable overriding the base URL.
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
/// Variable overriding the model for every form.
pub const MODEL_VAR: &str = "PRESSROOM_MODEL";
/// Variable setting the request timeout in seconds.
pub const TIMEOUT_VAR: &str = "PRESSROOM_TIMEOUT_SECS";
/// Variable naming the style example file.
pub const STYLE_FILE_VAR: &str = "PRESSROOM_STYLE_FILE";

/// Configuration problems. All of them stop the current command.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The API key variable is unset or empty.
    #[error("❌ 환경 변수 OPENAI_API_KEY가 설정되지 않았습니다!")]
    MissingApiKey,
    /// The API key is set but unusable.
    #[error("❌ 환경 변수 OPENAI_API_KEY 값이 올바르지 않습니다: {0}")]
    InvalidApiKey(#[from] key::InvalidKey),
    /// The timeout isn't a positive whole number of seconds.
    #[error("❌ 환경 변수 PRESSROOM_TIMEOUT_SECS 값이 올바르지 않습니다: `{0}`")]
    InvalidTimeout(String),
    /// The HTTP client could not be built.
    #[error("❌ HTTP 클라이언트를 만들 수 없습니다: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Everything needed to talk to the provider.
#[derive(Debug)]
pub struct Config {
    /// API key.
    pub key: Key,
    /// Base URL, if not the default.
    pub base_url: Option<String>,
    /// Model override for every form.
    pub model: Option<Model>,
    /// Request timeout.
    pub timeout: Duration,
    /// Style example file.
    pub style_file: PathBuf,
}

impl Config {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let key = match non_empty(API_KEY_VAR) {
            Some(key) => Key::try_from(key)?,
            None => return Err(ConfigError::MissingApiKey),
        };

        let timeout = match non_empty(TIMEOUT_VAR) {
            Some(secs) => match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(secs)),
            },
            None => Client::DEFAULT_TIMEOUT,
        };

        let model = non_empty(MODEL_VAR).map(|m| match m.parse::<Model>() {
            Ok(model) => model,
            Err(never) => match never {},
        });

        Ok(Self {
            key,
            base_url: non_empty(BASE_URL_VAR),
            model,
            timeout,
            style_file: non_empty(STYLE_FILE_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(StyleExample::DEFAULT_PATH)),
        })
    }

    /// Build a [`Client`]. The config's key is moved into it.
    pub fn client(self) -> Result<Client, ConfigError> {
        let mut client = Client::from_key(self.key)?.with_timeout(self.timeout);
        if let Some(base_url) = self.base_url {
            client = client.with_base_url(base_url);
        }
        Ok(client)
    }
}
