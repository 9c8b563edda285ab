//! HTTP client for the `YouTube` Data API v3.
//!
//! Wraps `reqwest` with typed error handling, API key management, and
//! bounded retry. Non-2xx responses carry a JSON error envelope; quota
//! exhaustion is surfaced as its own variant because it is terminal for a
//! whole collection batch, not just one request.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use ytcdb_core::registry::FieldSet;
use ytcdb_core::snapshot::{RawSnapshot, StaticData};

use crate::error::YoutubeError;
use crate::normalize::map_channel_item;
use crate::retry::retry_with_backoff;
use crate::types::ChannelListResponse;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Videos per page on the list endpoints (API maximum).
pub(crate) const PAGE_SIZE: usize = 50;

const DEFAULT_SHORTS_SCAN_LIMIT: usize = 1000;

/// One channel fetch, split into the registry's two output buckets.
#[derive(Debug, Default)]
pub struct ChannelParts {
    pub static_data: StaticData,
    pub snapshot: RawSnapshot,
}

/// Client for the `YouTube` Data API v3.
///
/// Use [`YoutubeClient::new`] for production or
/// [`YoutubeClient::with_base_url`] to point at a mock server in tests.
/// Transient errors (network failures, 5xx) are retried with exponential
/// back-off up to `max_retries` additional attempts.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
    pub(crate) shorts_scan_limit: usize,
}

impl YoutubeClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, YoutubeError> {
        Self::with_base_url(api_key, timeout_secs, max_retries, backoff_base_ms, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`YoutubeError::ApiError`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("ytcdb/0.1 (channel-statistics)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // joining an endpoint name appends a path segment rather than
        // replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| YoutubeError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries,
            backoff_base_ms,
            shorts_scan_limit: DEFAULT_SHORTS_SCAN_LIMIT,
        })
    }

    /// Cap the uploads-playlist prefix the shorts scan walks (default 1000).
    #[must_use]
    pub fn with_shorts_scan_limit(mut self, limit: usize) -> Self {
        self.shorts_scan_limit = limit;
        self
    }

    /// Fetches one channel's static fields and statistics snapshot.
    ///
    /// Only the API `part`s the requested field set needs are asked for. An
    /// empty field set short-circuits to an empty result without a request.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::NotFound`] if the channel does not exist.
    /// - [`YoutubeError::QuotaExceeded`] when the daily quota is exhausted.
    /// - [`YoutubeError::ApiError`] on any other API-level error.
    /// - [`YoutubeError::Http`] on network failure after all retries.
    /// - [`YoutubeError::Deserialize`] if the response shape is unexpected.
    pub async fn fetch_channel(
        &self,
        channel_id: &str,
        fields: &FieldSet,
    ) -> Result<ChannelParts, YoutubeError> {
        let parts: Vec<&str> = fields
            .parts()
            .into_iter()
            .map(ytcdb_core::registry::ApiPart::wire_name)
            .collect();
        if parts.is_empty() {
            return Ok(ChannelParts::default());
        }

        let part_param = parts.join(",");
        let url = self.build_url("channels", &[("part", &part_param), ("id", channel_id)])?;
        let context = format!("channels(id={channel_id})");
        let body = self.get_json(url, &context).await?;
        let response: ChannelListResponse = parse_value(body, &context)?;

        let Some(item) = response.items.first() else {
            return Err(YoutubeError::NotFound {
                context: format!("channel {channel_id}"),
            });
        };

        let (static_data, snapshot) = map_channel_item(item, fields);
        Ok(ChannelParts {
            static_data,
            snapshot,
        })
    }

    /// Builds the full request URL with the API key and percent-encoded
    /// query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::ApiError`] if `endpoint` cannot be joined to
    /// the base URL; endpoints are static names so this does not happen in
    /// practice.
    pub(crate) fn build_url(
        &self,
        endpoint: &str,
        extra: &[(&str, &str)],
    ) -> Result<Url, YoutubeError> {
        let mut url = self.base_url.join(endpoint).map_err(|e| {
            YoutubeError::ApiError(format!("invalid endpoint '{endpoint}': {e}"))
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request with retry on transient failures and parses the
    /// response body as JSON.
    pub(crate) async fn get_json(
        &self,
        url: Url,
        context: &str,
    ) -> Result<serde_json::Value, YoutubeError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move { self.request_json(&url, context).await }
        })
        .await
    }

    async fn request_json(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<serde_json::Value, YoutubeError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status.is_server_error() {
            // Keep 5xx on the reqwest error path so the retry layer sees it
            // as transient.
            return match response.error_for_status() {
                Err(e) => Err(YoutubeError::Http(e)),
                Ok(_) => Err(YoutubeError::ApiError(format!(
                    "unexpected status {status} for {context}"
                ))),
            };
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

/// Map a non-2xx JSON error body to the error taxonomy, pulling out quota
/// exhaustion by its documented reason codes.
fn error_from_body(status: StatusCode, body: &str) -> YoutubeError {
    match serde_json::from_str::<crate::types::ErrorEnvelope>(body) {
        Ok(envelope) => {
            let message = envelope
                .error
                .message
                .unwrap_or_else(|| format!("HTTP {status}"));
            let quota = envelope.error.errors.iter().any(|e| {
                matches!(
                    e.reason.as_deref(),
                    Some("quotaExceeded" | "dailyLimitExceeded")
                )
            });
            if quota || message.to_lowercase().contains("quota") {
                YoutubeError::QuotaExceeded(message)
            } else {
                YoutubeError::ApiError(message)
            }
        }
        Err(_) => YoutubeError::ApiError(format!("HTTP {status}")),
    }
}

pub(crate) fn parse_value<T: DeserializeOwned>(
    value: serde_json::Value,
    context: &str,
) -> Result<T, YoutubeError> {
    serde_json::from_value(value).map_err(|e| YoutubeError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}
