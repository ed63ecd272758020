//! Remote stats service client.
//!
//! A lookup is three strictly sequential GET calls:
//! 1. `/player-id/{name}` resolves the name to an id
//! 2. `/player-update/{id}` asks the service to recompute its cached profile
//! 3. `/player/{id}` fetches the full profile
//!
//! No retries. Every call has a timeout, and transport failures are mapped
//! into the stage's own failure kind.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::error::{RefreshStage, StatsError};
use crate::models::{PlayerIdResponse, RawProfile, ResolvedPlayer, UpdateResponse};

/// Errors building the client itself (not lookup failures).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

/// The three-stage remote protocol.
#[async_trait]
pub trait StatsApi: Send + Sync {
    /// Resolve a user-supplied name to the service's player id.
    async fn resolve_id(&self, name: &str) -> Result<ResolvedPlayer, StatsError>;

    /// Ask the service to recompute the player's cached profile.
    async fn trigger_refresh(&self, remote_id: &str) -> Result<(), StatsError>;

    /// Fetch the full profile document. `None` means the service had no document.
    async fn fetch_profile(&self, remote_id: &str) -> Result<Option<RawProfile>, StatsError>;
}

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://mrapi.org/api`
    pub base_url: Url,

    /// Per-request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(15),
            user_agent: format!("rivals-stats/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

pub const DEFAULT_BASE_URL: &str = "https://mrapi.org/api";

/// reqwest-backed implementation of [`StatsApi`].
pub struct StatsClient {
    client: Client,
    config: ClientConfig,
}

impl StatsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("rivals-stats")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a client with default configuration.
    pub fn with_defaults() -> Result<Self, ClientError> {
        Self::new(ClientConfig::default())
    }

    /// Build `{base}/{endpoint}/{arg}`, percent-encoding `arg`.
    fn endpoint(&self, endpoint: &str, arg: &str) -> Url {
        let mut url = self.config.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(endpoint).push(arg);
        }
        url
    }

    async fn get(&self, url: &Url) -> Result<Response, reqwest::Error> {
        debug!("GET {}", url);
        self.client.get(url.as_str()).send().await
    }
}

/// Render a transport error, calling out timeouts explicitly.
fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    }
}

#[async_trait]
impl StatsApi for StatsClient {
    async fn resolve_id(&self, name: &str) -> Result<ResolvedPlayer, StatsError> {
        info!("Resolving player {}", name);
        let url = self.endpoint("player-id", name);

        let response = self
            .get(&url)
            .await
            .map_err(|e| StatsError::not_found(name, describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::not_found(name, format!("HTTP {}", status.as_u16())));
        }

        let body: PlayerIdResponse = response
            .json()
            .await
            .map_err(|e| StatsError::not_found(name, describe(&e)))?;

        ResolvedPlayer::from_lookup(name, body.name.as_deref(), body.id_string())
    }

    async fn trigger_refresh(&self, remote_id: &str) -> Result<(), StatsError> {
        info!("Requesting profile update for {}", remote_id);
        let url = self.endpoint("player-update", remote_id);

        let response = self
            .get(&url)
            .await
            .map_err(|e| StatsError::refresh_failed(RefreshStage::Update, describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::refresh_failed(
                RefreshStage::Update,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let body: UpdateResponse = response
            .json()
            .await
            .map_err(|e| StatsError::refresh_failed(RefreshStage::Update, describe(&e)))?;

        if !body.success {
            return Err(StatsError::refresh_failed(
                RefreshStage::Update,
                body.message
                    .unwrap_or_else(|| "service reported success=false".to_string()),
            ));
        }

        Ok(())
    }

    async fn fetch_profile(&self, remote_id: &str) -> Result<Option<RawProfile>, StatsError> {
        info!("Fetching profile {}", remote_id);
        let url = self.endpoint("player", remote_id);

        let response = self
            .get(&url)
            .await
            .map_err(|e| StatsError::refresh_failed(RefreshStage::Fetch, describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::refresh_failed(
                RefreshStage::Fetch,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let content = response
            .bytes()
            .await
            .map_err(|e| StatsError::refresh_failed(RefreshStage::Fetch, describe(&e)))?;

        serde_json::from_slice::<Option<RawProfile>>(&content)
            .map_err(|e| StatsError::ParseError(e.to_string()))
    }
}
