//! SerpApi metrics client
//!
//! Looks up search metrics for a keyword and folds every failure into the
//! returned `MetricsResult`, so callers never handle errors. Results are
//! cached per (keyword, credential).
//!
//! The API key is sent as a query parameter; it is never logged and request
//! URLs are stripped from transport errors before they become error text.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

use super::{ApiCredential, MetricValue, MetricsResult};
use crate::cache::TtlCache;

/// Default metrics endpoint
pub const DEFAULT_ENDPOINT: &str = "https://serpapi.com/search.json";

/// Hard timeout for a single lookup
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// How long a lookup result stays cached
const CACHE_TTL_SECS: u64 = 3600;

/// Number of search results requested per lookup
const RESULTS_PER_QUERY: u32 = 5;

/// Errors that can occur during a metrics lookup
#[derive(Debug, Error)]
pub enum MetricsError {
    /// HTTP request failed
    #[error("HTTP request failed: {}", describe_chain(.0))]
    RequestFailed(reqwest::Error),

    /// The request did not complete in time
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The API answered with a non-success status
    #[error("API returned status {status}{}", status_detail(.message))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The response was JSON but not an object
    #[error("Unexpected response body: expected a JSON object")]
    UnexpectedBody,
}

/// Error body returned by SerpApi alongside non-success statuses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
}

/// Settings for `MetricsFetcher`
#[derive(Debug, Clone, PartialEq)]
pub struct FetcherConfig {
    /// URL queried for each keyword
    pub endpoint: String,
    /// Timeout for a single lookup
    pub timeout: Duration,
    /// Value of the `num` query parameter
    pub results_per_query: u32,
    /// How long successful lookups stay cached
    pub success_ttl: Duration,
    /// How long failed lookups stay cached, `None` to use `success_ttl`
    pub failure_ttl: Option<Duration>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            results_per_query: RESULTS_PER_QUERY,
            success_ttl: Duration::from_secs(CACHE_TTL_SECS),
            failure_ttl: None,
        }
    }
}

impl FetcherConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_success_ttl(mut self, ttl: Duration) -> Self {
        self.success_ttl = ttl;
        self
    }

    pub fn with_failure_ttl(mut self, ttl: Duration) -> Self {
        self.failure_ttl = Some(ttl);
        self
    }
}

/// Cache key for a lookup; the credential is part of the key but redacted in `Debug`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey {
    keyword: String,
    credential: ApiCredential,
}

/// Fetches and caches keyword metrics
pub struct MetricsFetcher {
    http_client: Client,
    config: FetcherConfig,
    cache: Mutex<TtlCache<LookupKey, MetricsResult>>,
}

impl Default for MetricsFetcher {
    fn default() -> Self {
        Self::new(FetcherConfig::default())
    }
}

impl MetricsFetcher {
    /// Creates a fetcher with a fresh cache using `config.success_ttl`
    pub fn new(config: FetcherConfig) -> Self {
        let cache = TtlCache::with_ttl(config.success_ttl);
        Self::with_cache(config, cache)
    }

    /// Creates a fetcher using the given cache; its default TTL applies to successes
    pub fn with_cache(config: FetcherConfig, cache: TtlCache<LookupKey, MetricsResult>) -> Self {
        Self {
            http_client: Client::new(),
            config,
            cache: Mutex::new(cache),
        }
    }

    /// Looks up metrics for `keyword`
    ///
    /// Never fails: transport errors, timeouts, non-success statuses and
    /// unparseable bodies all come back as a failure result. Cached results,
    /// failures included, are returned unchanged until they expire.
    pub async fn fetch(&self, keyword: &str, credential: &ApiCredential) -> MetricsResult {
        let key = LookupKey {
            keyword: keyword.to_string(),
            credential: credential.clone(),
        };

        let cached = self.cache().get(&key);
        if let Some(cached) = cached {
            log::debug!(
                "Metrics cache hit for '{}' (cached at {})",
                keyword,
                cached.cached_at
            );
            return cached.data;
        }

        log::debug!("Metrics cache miss for '{}', querying API", keyword);
        let result = match self.query(keyword, credential).await {
            Ok(body) => extract_metrics(keyword, &body)
                .unwrap_or_else(|e| MetricsResult::failure(keyword, e.to_string())),
            Err(e) => MetricsResult::failure(keyword, e.to_string()),
        };

        if let Some(error) = result.error() {
            log::warn!("Metrics lookup failed for '{}': {}", keyword, error);
        }

        self.store(key, result.clone());
        result
    }

    /// Drops every cached lookup
    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    /// Number of cached lookups
    pub fn cached_len(&self) -> usize {
        self.cache().len()
    }

    fn store(&self, key: LookupKey, result: MetricsResult) {
        let mut cache = self.cache();
        match self.config.failure_ttl {
            Some(ttl) if !result.is_success() => cache.insert_with_ttl(key, result, ttl),
            _ => cache.insert(key, result),
        }
    }

    /// Performs the HTTP request and returns the parsed body
    async fn query(
        &self,
        keyword: &str,
        credential: &ApiCredential,
    ) -> Result<Value, MetricsError> {
        let num = self.config.results_per_query.to_string();
        let timeout = self.config.timeout;

        let response = self
            .http_client
            .get(&self.config.endpoint)
            .query(&[
                ("q", keyword),
                ("api_key", credential.expose()),
                ("num", num.as_str()),
            ])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| request_error(e, timeout))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| request_error(e, timeout))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|body| body.error);
            return Err(MetricsError::Status { status, message });
        }

        Ok(serde_json::from_str(&text)?)
    }

    fn cache(&self) -> MutexGuard<'_, TtlCache<LookupKey, MetricsResult>> {
        // The cache holds plain data, so a poisoned lock is still usable
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Maps a reqwest error, dropping the URL since it carries the API key
fn request_error(e: reqwest::Error, timeout: Duration) -> MetricsError {
    if e.is_timeout() {
        MetricsError::Timeout(timeout.as_secs())
    } else {
        MetricsError::RequestFailed(e.without_url())
    }
}

/// Renders an error followed by each underlying cause, separated by `: `
///
/// reqwest keeps the useful detail (refused connection, DNS failure) in the
/// source chain. Causes already contained in the message are not repeated.
fn describe_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

fn status_detail(message: &Option<String>) -> String {
    message
        .as_ref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

/// Reads the metrics out of a successful response body
///
/// `search_volume` comes from `search_metadata.total_results` and
/// `keyword_difficulty` from the top level; missing fields become `"N/A"`.
fn extract_metrics(keyword: &str, body: &Value) -> Result<MetricsResult, MetricsError> {
    let object = body.as_object().ok_or(MetricsError::UnexpectedBody)?;

    let search_volume = MetricValue::from_json(
        object
            .get("search_metadata")
            .and_then(|metadata| metadata.get("total_results")),
    );
    let keyword_difficulty = MetricValue::from_json(object.get("keyword_difficulty"));

    Ok(MetricsResult::success(
        keyword,
        search_volume,
        keyword_difficulty,
    ))
}
