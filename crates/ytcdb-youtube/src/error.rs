use thiserror::Error;

/// Errors returned by the `YouTube` Data API client.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Network or TLS failure from the underlying HTTP client, or a 5xx
    /// response. Retriable.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error body. Not retriable.
    #[error("YouTube API error: {0}")]
    ApiError(String),

    /// The requested channel/playlist does not exist.
    #[error("not found: {context}")]
    NotFound { context: String },

    /// The API quota is exhausted. Terminal for the whole batch; the caller
    /// must checkpoint and stop rather than burn further requests.
    #[error("YouTube API quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
