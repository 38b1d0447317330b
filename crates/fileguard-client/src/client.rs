//! Main HTTP client implementation.

use crate::api::{ChecksumsApi, ContentApi};
use fileguard_core::{ChecksumAlgorithm, GuardError, Result};
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// WordPress core checksum API
pub const DEFAULT_CHECKSUMS_URL: &str = "https://api.wordpress.org/core/checksums/1.0/";

/// Versioned mirror of the WordPress source tree
pub const DEFAULT_CONTENT_URL: &str = "https://raw.githubusercontent.com/WordPress/WordPress/";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for manifests and authoritative content
#[derive(Clone)]
pub struct GuardClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    checksums_url: Url,
    content_url: Url,
    algorithm: ChecksumAlgorithm,
    timeout: Duration,
}

impl GuardClient {
    /// Create a new client using the public WordPress endpoints
    pub fn new() -> Result<Self> {
        GuardClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> GuardClientBuilder {
        GuardClientBuilder::new()
    }

    /// Access the checksum manifest endpoint
    #[must_use]
    pub fn checksums(&self) -> ChecksumsApi<'_> {
        ChecksumsApi::new(self)
    }

    /// Access the file content endpoint
    #[must_use]
    pub fn content(&self) -> ContentApi<'_> {
        ContentApi::new(self)
    }

    pub(crate) fn checksums_url(&self) -> &Url {
        &self.inner.checksums_url
    }

    pub(crate) fn content_url(&self) -> &Url {
        &self.inner.content_url
    }

    pub(crate) fn algorithm(&self) -> ChecksumAlgorithm {
        self.inner.algorithm
    }

    /// Perform a GET request and return the raw body.
    ///
    /// Non-success statuses become `GuardError::Http`, expired deadlines
    /// become `GuardError::Timeout`.
    pub(crate) async fn get_bytes(&self, url: Url) -> Result<Vec<u8>> {
        debug!(url = %url, "GET request");

        let response = self
            .inner
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GuardError::Http(format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&e))?;
        Ok(body.to_vec())
    }

    fn transport_error(&self, error: &reqwest::Error) -> GuardError {
        if error.is_timeout() {
            GuardError::Timeout(self.inner.timeout.as_secs())
        } else {
            GuardError::Http(error.to_string())
        }
    }
}

/// Builder for configuring a [`GuardClient`]
pub struct GuardClientBuilder {
    checksums_url: String,
    content_url: String,
    timeout: Duration,
    user_agent: String,
    algorithm: ChecksumAlgorithm,
}

impl Default for GuardClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardClientBuilder {
    /// Create a new builder with the public WordPress endpoints
    #[must_use]
    pub fn new() -> Self {
        Self {
            checksums_url: DEFAULT_CHECKSUMS_URL.to_string(),
            content_url: DEFAULT_CONTENT_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("fileguard/{}", env!("CARGO_PKG_VERSION")),
            algorithm: ChecksumAlgorithm::Md5,
        }
    }

    /// Set the checksum API URL (useful for testing)
    #[must_use]
    pub fn checksums_url(mut self, url: impl Into<String>) -> Self {
        self.checksums_url = url.into();
        self
    }

    /// Set the content mirror base URL (useful for testing)
    #[must_use]
    pub fn content_url(mut self, url: impl Into<String>) -> Self {
        self.content_url = url.into();
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set the algorithm manifest checksums are expected in
    #[must_use]
    pub const fn algorithm(mut self, algorithm: ChecksumAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<GuardClient> {
        let checksums_url = parse_url(&self.checksums_url)?;
        let content_url = parse_url(&self.content_url)?;
        if content_url.cannot_be_a_base() {
            return Err(GuardError::InvalidUrl(self.content_url));
        }

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| GuardError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(GuardClient {
            inner: Arc::new(ClientInner {
                http,
                checksums_url,
                content_url,
                algorithm: self.algorithm,
                timeout: self.timeout,
            }),
        })
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| GuardError::InvalidUrl(format!("{raw}: {e}")))
}
