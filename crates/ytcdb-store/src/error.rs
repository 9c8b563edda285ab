use thiserror::Error;

/// Errors from the persisted-document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure reading or writing a document.
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A document could not be serialized for writing.
    #[error("failed to serialize {context}: {source}")]
    Serialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Persisted content could not be parsed back into a document.
    #[error("failed to parse {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
