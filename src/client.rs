//! [`Client`] for OpenAI-compatible APIs and related types.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{key, request::ChatRequest, response::ChatCompletion, Generation, Key};

/// Result type for the client. See also [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Client for the chat-completion and usage endpoints.
///
/// See [`Self::new`] for creating a new client and [`Self::generate`] to get
/// started. Usage queries live in [`crate::usage`].
#[derive(Clone)]
pub struct Client {
    /// Inner [`reqwest::Client`]. It is **not necessary** to set the API key
    /// on a custom client.
    ///
    /// ## Note:
    /// - The API [`Key`] is **set automatically on requests**. Set
    ///   [`Self::key`] to change the [`Key`].
    /// - **Do not use** `client.inner.get` directly. Use [`Self::get`] instead
    ///   to safely set the API [`Key`] as sensitive.
    pub inner: reqwest::Client,
    /// API [`Key`]. It can be set to a new [`Key`] to change the key used for
    /// requests.
    pub key: Arc<Key>,
    /// Base URL, without a trailing slash. Endpoint paths are appended to it.
    pub base_url: String,
    /// Timeout for each request, from connect to the end of the body.
    pub timeout: Duration,
}

impl Client {
    /// Our user agent.
    pub const USER_AGENT: &'static str =
        concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));
    /// Default base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
    /// Path of the chat-completion endpoint.
    pub const CHAT_PATH: &'static str = "chat/completions";

    /// Create a new client from any type that can be converted into a [`Key`].
    ///
    /// ## Note:
    /// - It's safest to use a [`String`]. It will be zeroized.
    pub fn new<K>(key: K) -> std::result::Result<Self, BuildError>
    where
        K: TryInto<Key, Error = key::InvalidKey>,
    {
        Ok(Self::from_key(key.try_into()?)?)
    }

    /// Create a new client with the given key. Fails only if the HTTP client
    /// can't be built, for example when the TLS backend can't initialize.
    pub fn from_key(key: Key) -> reqwest::Result<Self> {
        #[cfg(feature = "log")]
        {
            log::info!(concat!("Creating ", env!("CARGO_PKG_NAME"), " client..."));
            log::debug!(concat!("Crate version: ", env!("CARGO_PKG_VERSION")));
        }

        // Headers for all requests.
        let mut headers = reqwest::header::HeaderMap::new();

        // Content type needs to be set to JSON.
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(Self::USER_AGENT)
            .build()?;

        Ok(Self {
            inner,
            key: Arc::new(key),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    /// Use a different OpenAI-compatible base URL. This is useful for testing,
    /// proxies, or self-hosted endpoints.
    pub fn with_base_url<U>(mut self, base_url: U) -> Self
    where
        U: Into<String>,
    {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for an endpoint `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Create a [`reqwest::RequestBuilder`] for `path` with the API key set as
    /// a sensitive bearer header and the request timeout applied.
    pub fn request_raw(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> reqwest::RequestBuilder {
        let url = self.url(path);

        #[cfg(feature = "log")]
        {
            log::debug!("{} request to {}", method, url);
        }

        self.inner
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, self.key.bearer())
            .timeout(self.timeout)
    }

    /// Send a GET request with query parameters.
    pub async fn get<Q>(
        &self,
        path: &str,
        query: &Q,
    ) -> reqwest::Result<reqwest::Response>
    where
        Q: Serialize + ?Sized,
    {
        self.request_raw(reqwest::Method::GET, path)
            .query(query)
            .send()
            .await
    }

    /// Send a POST request with a JSON body.
    pub async fn post<B>(
        &self,
        path: &str,
        body: &B,
    ) -> reqwest::Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let req = self.request_raw(reqwest::Method::POST, path);

        #[cfg(feature = "log")]
        {
            if let Ok(json) = serde_json::to_string_pretty(&body) {
                log::debug!("Sending body:\n{}", json);
            } else {
                log::warn!("Could not serialize body. Request will fail.");
            }
        }

        req.json(body).send().await
    }

    /// Post a [`ChatRequest`] to the chat-completion endpoint. Exactly one
    /// request is made; nothing is retried.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let response = self.post(Self::CHAT_PATH, request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::from_body(status, body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Make a [`chat`] request and classify the outcome. This never fails;
    /// errors come back as [`Generation::Failure`].
    ///
    /// Dropping the returned future cancels the request.
    ///
    /// [`chat`]: Self::chat
    pub async fn generate(&self, request: &ChatRequest) -> Generation {
        #[cfg(feature = "log")]
        log::info!(
            "Generating with {} (temperature {}, max_tokens {})",
            request.model,
            request.temperature.temperature(),
            request.max_tokens
        );

        let generation = Generation::from_result(self.chat(request).await);

        #[cfg(feature = "log")]
        {
            match &generation {
                Generation::Success(text) => {
                    log::debug!("Generated {} bytes", text.len())
                }
                Generation::Warning(warning) => log::warn!("{}", warning),
                Generation::Failure { kind, detail } => {
                    log::error!("Generation failed ({}): {}", kind, detail)
                }
            }
        }

        generation
    }
}

/// Error creating a [`Client`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The key was rejected.
    #[error(transparent)]
    Key(#[from] key::InvalidKey),
    /// The HTTP client could not be built.
    #[error("Could not build HTTP client: {0}")]
    HTTP(#[from] reqwest::Error),
}

/// [`Client`] error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP error: connect, TLS, timeout or body transfer.
    #[error("HTTP error: {0}")]
    HTTP(#[from] reqwest::Error),
    /// Data could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// The API answered with a structured error body.
    #[error("API error ({status}): {error}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Decoded error body.
        error: ApiError,
    },
    /// Non-2xx status whose body is not a structured error. The raw body
    /// text is kept.
    #[error("HTTP status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
}

impl Error {
    /// Build an error from a non-2xx `status` and its `body`.
    pub fn from_body(status: reqwest::StatusCode, body: String) -> Self {
        match serde_json::from_str::<ApiErrorWrapper>(&body) {
            Ok(wrapper) => Self::Api {
                status: status.as_u16(),
                error: wrapper.error,
            },
            Err(_) => Self::Status {
                status: status.as_u16(),
                body,
            },
        }
    }

    /// HTTP status of the response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HTTP(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) => None,
            Self::Api { status, .. } | Self::Status { status, .. } => {
                Some(*status)
            }
        }
    }

    /// Raw or decoded error text reported by the service. For
    /// [`Error::Status`] this is the untouched body.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            Self::Api { error, .. } => Some(&error.message),
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Error body returned by the API.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[error("{message}")]
pub struct ApiError {
    /// Human readable description.
    pub message: String,
    /// Error category, for example `invalid_request_error`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Offending parameter, if any.
    #[serde(default)]
    pub param: Option<String>,
    /// Machine readable code, for example `invalid_api_key`.
    #[serde(default)]
    pub code: Option<String>,
}

// The API nests the error under an `error` key.
#[derive(Deserialize)]
pub(crate) struct ApiErrorWrapper {
    pub(crate) error: ApiError,
}
