//! Metadata resolver: validation, cache, provider call with retry, transform
//!
//! # Example
//!
//! ```no_run
//! use smlresolver::MetadataResolver;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = MetadataResolver::builder().build()?;
//!     let metadata = resolver
//!         .fetch("https://open.spotify.com/track/4iV5W9uYEdYUVa79Axb7Rh", "US")
//!         .await?;
//!     println!("{} - {}", metadata.artist.name, metadata.track_title);
//!     Ok(())
//! }
//! ```

use crate::cache::{self, MetadataCache};
use crate::error::{ResolveError, Result};
use crate::provider::ProviderResponse;
use crate::retry::{self, RetryPolicy};
use crate::validator::{self, ValidatedUrl};
use chrono::Utc;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use smlcore::TrackMetadata;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Default resolution provider endpoint
pub const DEFAULT_PROVIDER_URL: &str = "https://api.song.link/v1-alpha.1/links";

/// Default timeout for one provider request (10 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "SmartLink/0.1 (smlresolver)";

/// Metadata resolved for one source URL, with the validated URL itself
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub metadata: TrackMetadata,
    pub source: ValidatedUrl,
}

impl Resolution {
    /// Non-fatal warning raised while validating the source URL
    pub fn warning(&self) -> Option<String> {
        self.source.warning()
    }
}

/// Failure of a single provider request
#[derive(Debug)]
enum FetchError {
    Transport(reqwest::Error),
    Status(StatusCode),
    Decode(serde_json::Error),
}

impl FetchError {
    fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Status(_))
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(e) if e.is_timeout() => write!(f, "request timed out: {e}"),
            FetchError::Transport(e) => write!(f, "transport error: {e}"),
            FetchError::Status(status) => write!(f, "provider returned status {status}"),
            FetchError::Decode(e) => write!(f, "invalid JSON payload: {e}"),
        }
    }
}

/// Resolves source URLs into [`TrackMetadata`]
///
/// Constructed once and shared by reference; it owns its cache. Concurrent
/// fetches of the same key that both miss the cache each call the provider.
#[derive(Debug)]
pub struct MetadataResolver {
    client: Client,
    provider_url: String,
    timeout: Duration,
    retry: RetryPolicy,
    cache: MetadataCache,
}

impl MetadataResolver {
    /// Create a builder for configuring the resolver
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }

    pub fn provider_url(&self) -> &str {
        &self.provider_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Resolves `source_url` for `country_code`.
    ///
    /// 1. validates the URL (invalid input never reaches the network);
    /// 2. returns the cached value for `source_url:country_code` if fresh;
    /// 3. otherwise calls the provider with bounded retries, transforms the
    ///    payload and caches the result.
    pub async fn fetch(&self, source_url: &str, country_code: &str) -> Result<TrackMetadata> {
        self.resolve(source_url, country_code)
            .await
            .map(|resolution| resolution.metadata)
    }

    /// Same as [`fetch`](Self::fetch), but also hands back the validated
    /// source URL so callers can surface the unknown-domain warning.
    pub async fn resolve(&self, source_url: &str, country_code: &str) -> Result<Resolution> {
        let source_url = source_url.trim();
        let source = validator::validate(source_url)?;

        let country_code = country_code.trim();
        if country_code.is_empty() {
            return Err(ResolveError::invalid_input("country code is empty"));
        }

        let key = MetadataCache::key(source_url, country_code);
        if let Some(metadata) = self.cache.get(&key).await {
            debug!(key = %key, "Metadata found in cache");
            return Ok(Resolution { metadata, source });
        }

        debug!(key = %key, "Cache miss, querying resolution provider");
        let response = self.request_with_retry(source_url, country_code).await?;
        let metadata = response.into_metadata(source_url, Utc::now())?;

        self.cache.put(key, metadata.clone()).await;
        Ok(Resolution { metadata, source })
    }

    async fn request_with_retry(&self, source_url: &str, country_code: &str) -> Result<ProviderResponse> {
        self.retry
            .run(
                |attempt| self.request_once(source_url, country_code, attempt),
                FetchError::is_retryable,
            )
            .await
            .map_err(|failure| match failure.error {
                FetchError::Decode(e) => ResolveError::malformed(format!("invalid JSON payload: {e}")),
                error => ResolveError::UpstreamUnavailable {
                    attempts: failure.attempts,
                    reason: error.to_string(),
                },
            })
    }

    async fn request_once(
        &self,
        source_url: &str,
        country_code: &str,
        attempt: u32,
    ) -> std::result::Result<ProviderResponse, FetchError> {
        debug!(provider = %self.provider_url, attempt, "GET resolution provider");

        let response = self
            .client
            .get(&self.provider_url)
            .query(&[("url", source_url), ("userCountry", country_code)])
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await.map_err(FetchError::Transport)?;
        serde_json::from_slice(&body).map_err(FetchError::Decode)
    }
}

/// Builder for configuring a [`MetadataResolver`]
#[derive(Debug, Clone)]
pub struct ResolverBuilder {
    client: Option<Client>,
    pub(crate) provider_url: String,
    pub(crate) timeout: Duration,
    pub(crate) user_agent: String,
    pub(crate) max_attempts: u32,
    pub(crate) base_delay: Duration,
    pub(crate) cache_ttl: Duration,
    pub(crate) cache_capacity: usize,
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self {
            client: None,
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_attempts: retry::DEFAULT_MAX_ATTEMPTS,
            base_delay: retry::DEFAULT_BASE_DELAY,
            cache_ttl: cache::DEFAULT_TTL,
            cache_capacity: cache::DEFAULT_CAPACITY,
        }
    }
}

impl ResolverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom reqwest client (user agent and default headers are then
    /// the caller's responsibility)
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn provider_url(mut self, url: impl Into<String>) -> Self {
        self.provider_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Build the resolver
    pub fn build(self) -> Result<MetadataResolver> {
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut headers = HeaderMap::new();
                headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
                Client::builder()
                    .user_agent(self.user_agent)
                    .default_headers(headers)
                    .timeout(self.timeout)
                    .build()?
            }
        };

        Ok(MetadataResolver {
            client,
            provider_url: self.provider_url,
            timeout: self.timeout,
            retry: RetryPolicy::new(self.max_attempts, self.base_delay),
            cache: MetadataCache::new(self.cache_ttl, self.cache_capacity),
        })
    }
}
