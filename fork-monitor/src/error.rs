//! Error types for the fork fetch and format pipeline.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure while talking to the GitHub REST API.
///
/// Every variant is fatal: the fetcher never retries and never returns the
/// pages it collected before the failure.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Owner or repository name was empty.
    #[error("owner and repository must both be non-empty")]
    InvalidTarget,

    /// The API answered `404 Not Found`.
    #[error("HTTP 404 - repository {owner}/{repo} not found. Check owner and repo name.")]
    NotFound {
        /// Requested owner.
        owner: String,
        /// Requested repository.
        repo: String,
    },

    /// The API answered `403 Forbidden`.
    #[error("HTTP 403 - rate limit exceeded. Use a GitHub token to increase limits.")]
    RateLimited,

    /// Any other non-2xx status.
    #[error("HTTP {}", .status)]
    Http {
        /// Status returned by the API.
        status: StatusCode,
    },

    /// Connection, TLS or body decoding failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    /// Map a non-success status to its error, keeping the 404/403
    /// interpretations.
    pub(crate) fn from_status(status: StatusCode, owner: &str, repo: &str) -> Self {
        match status {
            StatusCode::NOT_FOUND => Self::NotFound {
                owner: owner.to_owned(),
                repo: repo.to_owned(),
            },
            StatusCode::FORBIDDEN => Self::RateLimited,
            _ => Self::Http { status },
        }
    }
}

/// A raw fork object was missing a field or carried the wrong type.
#[derive(Debug, Error)]
#[error("malformed fork record at index {index}: {source}")]
pub struct FormatError {
    /// Position of the offending record in the fetched sequence.
    pub index: usize,
    /// Underlying deserialization error, naming the field.
    #[source]
    pub source: serde_json::Error,
}

/// Any failure of the fetch-then-format pipeline.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Fetching from the API failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A fetched record could not be formatted.
    #[error(transparent)]
    Format(#[from] FormatError),
}
