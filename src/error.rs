use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Transport-level failure while talking to a source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest_middleware::Error,
    },

    #[error("{url} responded with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not read the response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Reasons a whole adapter invocation contributes nothing to a run.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed payload: {0}")]
    Parse(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Record-level rejection. The record is dropped, its siblings are not.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record has no title")]
    MissingTitle,

    #[error("unparsable date '{0}'")]
    UnparsableDate(String),

    #[error("unparsable start time '{0}'")]
    UnparsableStartTime(String),

    #[error("record has no categories")]
    MissingCategories,

    #[error("category '{0}' appears more than once")]
    DuplicateCategory(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid source '{name}': {reason}")]
    InvalidSource { name: String, reason: String },

    #[error("could not build the HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
