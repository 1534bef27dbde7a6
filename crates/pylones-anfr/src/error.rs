use thiserror::Error;

/// Errors raised by a single attempt against the ANFR record API.
///
/// None of these escape [`AnfrClient::fetch`](crate::AnfrClient::fetch):
/// they are retried and finally folded into a
/// [`FetchResult::Failure`](crate::FetchResult::Failure).
#[derive(Debug, Error)]
pub enum AnfrError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The body is not the expected `{nhits, records}` envelope.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
