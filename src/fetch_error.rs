#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Resource not found (404): {0}")]
    NotFound(String),
    #[error("Unexpected HTTP status {status} for {resource}")]
    Status { status: u16, resource: String },
    #[error("Invalid resource URL: {0}")]
    InvalidUrl(String),
}
