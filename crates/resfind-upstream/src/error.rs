use thiserror::Error;

/// Failures talking to the upstream resource-search API.
///
/// Every variant means "upstream unavailable" to the ranking layer, which
/// degrades to an empty result set instead of failing the request.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request did not complete within the configured timeout.
    #[error("upstream request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body was not JSON.
    #[error("malformed JSON from {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body was JSON but neither an object nor an array.
    #[error("unexpected response shape from {context}")]
    UnexpectedShape { context: String },

    #[error("invalid upstream base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid API key header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },
}
