//! HTTP client for the ANFR open-data record API.
//!
//! Wraps `reqwest` with the search URL builder, a [`RetryPolicy`], and
//! envelope decoding. [`AnfrClient::fetch`] never returns an error: once every
//! attempt has failed the outcome is a [`FetchResult::Failure`] that the
//! counters turn into an unavailable count.

use std::time::Duration;

use reqwest::Client;

use crate::error::AnfrError;
use crate::query::{build_search_url, SearchQuery};
use crate::retry::RetryPolicy;
use crate::types::{FetchResult, RecordEnvelope};

pub const DEFAULT_BASE_URL: &str = "https://data.anfr.fr/d4c/api/records/1.0/search/";
pub const DEFAULT_DATASET: &str = "observatoire_2g_3g_4g";

/// Client for the ANFR `records/1.0/search` endpoint.
///
/// Use [`AnfrClient::new`] for production or [`AnfrClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct AnfrClient {
    client: Client,
    base_url: String,
    dataset: String,
    retry: RetryPolicy,
}

impl AnfrClient {
    /// Creates a client pointed at the production ANFR API.
    ///
    /// # Errors
    ///
    /// Returns [`AnfrError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str, retry: RetryPolicy) -> Result<Self, AnfrError> {
        Self::with_base_url(
            DEFAULT_BASE_URL,
            DEFAULT_DATASET,
            timeout_secs,
            user_agent,
            retry,
        )
    }

    /// Creates a client with a custom endpoint and dataset.
    ///
    /// `timeout_secs` bounds each attempt, not the whole retried fetch.
    ///
    /// # Errors
    ///
    /// Returns [`AnfrError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        base_url: &str,
        dataset: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, AnfrError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_owned(),
            dataset: dataset.to_owned(),
            retry,
        })
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// The URL this client would request for `query`.
    #[must_use]
    pub fn search_url(&self, query: &SearchQuery<'_>) -> String {
        build_search_url(&self.base_url, &self.dataset, query)
    }

    /// Builds the URL for `query` and fetches it.
    pub async fn search(&self, query: &SearchQuery<'_>) -> FetchResult {
        self.fetch(&self.search_url(query)).await
    }

    /// Fetches `url`, retrying per the client's [`RetryPolicy`].
    ///
    /// Returns [`FetchResult::Success`] on the first attempt that yields a
    /// well-formed envelope, and [`FetchResult::Failure`] once every attempt
    /// has failed.
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let outcome = self
            .retry
            .run(|attempt| async move {
                tracing::debug!(attempt, url, "requesting ANFR records");
                self.request_envelope(url).await
            })
            .await;

        match outcome {
            Ok(envelope) => {
                tracing::debug!(
                    url,
                    nhits = envelope.nhits,
                    records = envelope.records.len(),
                    "ANFR response received"
                );
                envelope.into()
            }
            Err(err) => {
                tracing::error!(
                    url,
                    attempts = self.retry.max_attempts.max(1),
                    error = %err,
                    "ANFR request failed on every attempt"
                );
                FetchResult::Failure {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Sends one GET, asserts a 2xx status, and decodes the record envelope.
    async fn request_envelope(&self, url: &str) -> Result<RecordEnvelope, AnfrError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AnfrError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AnfrError::Deserialize {
            context: url.to_owned(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
