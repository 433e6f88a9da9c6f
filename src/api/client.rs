use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::credentials::{bearer_header, SecureString};
use super::error::{ApiError, Result};
use super::types::Envelope;
use crate::config::ApiConfig;

/// Shared HTTP plumbing for the backend API.
///
/// Holds the connection pool, the normalized base URL and the current bearer
/// token. Clones share the token.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: Arc<RwLock<Option<SecureString>>>,
}

impl ApiClient {
    /// Create a client from configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = normalize_base_url(&config.base_url)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .connect_timeout(Duration::from_secs(u64::from(config.connect_timeout_seconds)))
            .user_agent(format!("device-inventory/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::from_transport)?;

        Ok(Self {
            http,
            base_url,
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn set_token(&self, token: SecureString) {
        *self.token.write() = Some(token);
    }

    pub fn clear_token(&self) {
        *self.token.write() = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.read().as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Resolve `path` against the base URL.
    pub fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Start a request, attaching the bearer token when one is set.
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(method = %method, url = %url, "Sending request");
        let mut builder = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some((name, value)) = self.token.read().as_ref().and_then(bearer_header) {
            builder = builder.header(name, value);
        }
        builder
    }

    /// Send and unwrap a `{success, message, data}` response.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        resource: &str,
    ) -> Result<T> {
        let response = builder.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status, &body, resource);
            debug!(status = status.as_u16(), error_type = err.error_type(), "Request failed");
            return Err(err);
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        envelope.into_data()
    }

    /// Send a request whose success body is irrelevant.
    pub(crate) async fn send_empty(&self, builder: RequestBuilder, resource: &str) -> Result<()> {
        let response = builder.send().await.map_err(ApiError::from_transport)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body, resource));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.has_token())
            .finish()
    }
}

/// Parse the base URL and make sure it ends with `/` so `join` appends.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidUrl("URL cannot be empty".into()));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(ApiError::InvalidUrl(
            "URL must start with http:// or https://".into(),
        ));
    }

    let with_slash = format!("{}/", trimmed.trim_end_matches('/'));
    Url::parse(&with_slash).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))
}
