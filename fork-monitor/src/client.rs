//! GitHub REST client and the paginated fork fetch loop.
//!
//! Pages are requested one at a time, newest forks first, until the API
//! returns an empty or short page or the reported request quota runs low.
//! Errors are never retried.

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use crate::error::FetchError;
use crate::record::RepoSummary;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Forks requested per page (the API maximum).
pub const PAGE_SIZE: usize = 100;

/// Stop paginating once fewer requests than this remain in the window.
pub const RATE_LIMIT_FLOOR: u64 = 5;

const API_VERSION: &str = "2022-11-28";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const CLIENT_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Thin GitHub REST client bound to one API endpoint and credential.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client for the public API.
    ///
    /// An empty token is treated as no token.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be built.
    pub fn new(token: Option<String>) -> Result<Self, FetchError> {
        let http = Client::builder().user_agent(CLIENT_AGENT).build()?;
        Ok(Self {
            http,
            api_url: DEFAULT_API_URL.to_owned(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// Point the client at another API root (GitHub Enterprise, tests).
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Whether requests carry a bearer credential.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self
            .http
            .get(format!("{}{path}", self.api_url))
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    /// Fetch the monitored repository's own metadata.
    ///
    /// # Errors
    ///
    /// See [`FetchError`]; 404 and 403 map to their dedicated variants.
    pub async fn repo_summary(&self, owner: &str, repo: &str) -> Result<RepoSummary, FetchError> {
        validate_target(owner, repo)?;
        let response = self.get(&format!("/repos/{owner}/{repo}")).send().await?;
        let response = check_status(response, owner, repo)?;
        Ok(response.json().await?)
    }

    /// Fetch every fork of `owner/repo`, newest first, as raw API objects.
    ///
    /// The result is silently truncated when the API reports fewer than
    /// [`RATE_LIMIT_FLOOR`] remaining requests; a warning is logged.
    ///
    /// # Errors
    ///
    /// Any non-2xx page aborts the whole fetch; pages already collected are
    /// dropped.
    pub async fn fetch_forks(&self, owner: &str, repo: &str) -> Result<Vec<Value>, FetchError> {
        validate_target(owner, repo)?;

        let path = format!("/repos/{owner}/{repo}/forks");
        let per_page = PAGE_SIZE.to_string();
        let mut forks = Vec::new();
        let mut page = 1u32;

        loop {
            let page_number = page.to_string();
            let response = self
                .get(&path)
                .query(&[
                    ("per_page", per_page.as_str()),
                    ("page", page_number.as_str()),
                    ("sort", "newest"),
                ])
                .send()
                .await?;
            let response = check_status(response, owner, repo)?;
            let remaining = rate_limit_remaining(response.headers());
            let items: Vec<Value> = response.json().await?;

            tracing::debug!(page, items = items.len(), ?remaining, "fetched fork page");

            let end = page_end(items.len(), remaining);
            forks.extend(items);

            match end {
                None => page += 1,
                Some(PageEnd::Exhausted) => break,
                Some(PageEnd::QuotaLow(remaining)) => {
                    tracing::warn!(
                        remaining,
                        fetched = forks.len(),
                        "GitHub API rate limit approaching, stopping early"
                    );
                    break;
                }
            }
        }

        Ok(forks)
    }
}

/// Why pagination stops after a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageEnd {
    /// Empty or short page: nothing left to fetch.
    Exhausted,
    /// Full page, but the quota fell below [`RATE_LIMIT_FLOOR`].
    QuotaLow(u64),
}

/// Decide whether a page of `len` items ends the listing. A short page wins
/// over a low quota since nothing was left behind.
fn page_end(len: usize, remaining: Option<u64>) -> Option<PageEnd> {
    if len < PAGE_SIZE {
        return Some(PageEnd::Exhausted);
    }
    remaining
        .filter(|r| *r < RATE_LIMIT_FLOOR)
        .map(PageEnd::QuotaLow)
}

fn validate_target(owner: &str, repo: &str) -> Result<(), FetchError> {
    if owner.is_empty() || repo.is_empty() {
        return Err(FetchError::InvalidTarget);
    }
    Ok(())
}

fn check_status(response: Response, owner: &str, repo: &str) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::from_status(status, owner, repo))
    }
}

/// Remaining request quota, if the response reports one.
fn rate_limit_remaining(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RATE_LIMIT_REMAINING)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
