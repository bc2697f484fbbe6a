//! Fork records and the raw-to-record formatter.
//!
//! The fetcher hands back the API's JSON objects untouched; [`format_forks`]
//! turns them into flat [`ForkRecord`]s, failing on the first record that
//! lacks a required field.

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// One fork of the monitored repository, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkRecord {
    /// Login of the account owning the fork.
    pub owner: String,

    /// Repository name of the fork.
    pub repo_name: String,

    /// `owner/name` of the fork.
    pub full_name: String,

    /// Web URL of the fork.
    pub url: String,

    /// Creation timestamp, ISO-8601.
    pub created_at: String,

    /// Last update timestamp, ISO-8601.
    pub updated_at: String,

    /// Stargazer count.
    pub stars: u64,

    /// Watcher count.
    pub watchers: u64,

    /// Number of forks of this fork.
    pub forks: u64,

    /// Open issue count.
    pub open_issues: u64,

    /// Default branch name.
    pub default_branch: String,

    /// Whether the fork is private.
    pub private: bool,

    /// Free-form description, if the owner set one.
    pub description: Option<String>,
}

/// Account object nested in a GitHub repository payload.
#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
}

/// The subset of a GitHub repository payload that a [`ForkRecord`] needs.
#[derive(Debug, Deserialize)]
struct RawFork {
    owner: RawOwner,
    name: String,
    full_name: String,
    html_url: String,
    created_at: String,
    updated_at: String,
    stargazers_count: u64,
    watchers_count: u64,
    forks_count: u64,
    open_issues_count: u64,
    default_branch: String,
    private: bool,
    #[serde(default)]
    description: Option<String>,
}

impl From<RawFork> for ForkRecord {
    fn from(raw: RawFork) -> Self {
        Self {
            owner: raw.owner.login,
            repo_name: raw.name,
            full_name: raw.full_name,
            url: raw.html_url,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            stars: raw.stargazers_count,
            watchers: raw.watchers_count,
            forks: raw.forks_count,
            open_issues: raw.open_issues_count,
            default_branch: raw.default_branch,
            private: raw.private,
            description: raw.description,
        }
    }
}

/// Summary of the monitored repository itself.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSummary {
    /// `owner/name`.
    pub full_name: String,

    /// Repository description.
    #[serde(default)]
    pub description: Option<String>,

    /// Total fork count as reported by GitHub.
    #[serde(rename = "forks_count")]
    pub forks: u64,

    /// Stargazer count.
    #[serde(rename = "stargazers_count")]
    pub stars: u64,

    /// Watcher count.
    #[serde(rename = "watchers_count")]
    pub watchers: u64,

    /// Creation timestamp, ISO-8601.
    pub created_at: String,

    /// Last update timestamp, ISO-8601.
    pub updated_at: String,
}

/// Convert raw API fork objects into [`ForkRecord`]s, preserving order.
///
/// # Errors
///
/// Returns [`FormatError`] for the first record missing a required field.
/// Only `description` may be absent or `null`.
pub fn format_forks(raw: &[serde_json::Value]) -> Result<Vec<ForkRecord>, FormatError> {
    raw.iter()
        .enumerate()
        .map(|(index, value)| {
            RawFork::deserialize(value)
                .map(ForkRecord::from)
                .map_err(|source| FormatError { index, source })
        })
        .collect()
}

/// Date part (`YYYY-MM-DD`) of an ISO-8601 timestamp.
#[must_use]
pub fn date_part(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}
