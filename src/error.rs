//! Error types for registry fetches

use thiserror::Error;

/// Why a single package's download count could not be fetched.
///
/// The aggregator treats every variant as zero downloads; the distinction only
/// shows up in logs and in the failed-package list of a report.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure: DNS, connect, timeout, broken body stream.
    #[error("network error: {0}")]
    Network(String),

    /// The registry does not know the package.
    #[error("package not found: {0}")]
    NotFound(String),

    /// Any other non-success HTTP status.
    #[error("registry returned HTTP {0}")]
    Status(u16),

    /// The body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Malformed(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Malformed(e.to_string())
    }
}
