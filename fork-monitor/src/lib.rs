//! Fork monitoring for license-compliance tracking.
//!
//! Enumerates every fork of a GitHub repository through the REST API and
//! renders the result as a table, JSON or CSV.

pub mod client;
pub mod error;
pub mod record;
pub mod render;

pub use client::GitHubClient;
pub use error::{FetchError, FormatError, MonitorError};
pub use record::{ForkRecord, RepoSummary};
pub use render::{OutputFormat, render};

/// Fetch every fork of `owner/repo` and format it into [`ForkRecord`]s.
///
/// # Errors
///
/// Fails on the first HTTP error or malformed record; no partial result is
/// returned.
pub async fn list_forks(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
) -> Result<Vec<ForkRecord>, MonitorError> {
    let raw = client.fetch_forks(owner, repo).await?;
    Ok(record::format_forks(&raw)?)
}
