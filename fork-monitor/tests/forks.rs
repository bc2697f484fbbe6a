//! End-to-end fork listing against a mocked GitHub API.

use fork_monitor::client::PAGE_SIZE;
use fork_monitor::{FetchError, GitHubClient, MonitorError, OutputFormat, list_forks, render};
use httpmock::prelude::*;
use serde_json::{Value, json};

const FORKS_PATH: &str = "/repos/acme/widgets/forks";

fn fork_json(i: usize) -> Value {
    json!({
        "owner": { "login": format!("user{i}") },
        "name": "widgets",
        "full_name": format!("user{i}/widgets"),
        "html_url": format!("https://github.com/user{i}/widgets"),
        "created_at": "2024-05-01T08:00:00Z",
        "updated_at": "2024-05-02T08:00:00Z",
        "stargazers_count": i,
        "watchers_count": i,
        "forks_count": 0,
        "open_issues_count": 1,
        "default_branch": "main",
        "private": false,
        "description": null,
    })
}

fn page(range: std::ops::Range<usize>) -> Value {
    Value::Array(range.map(fork_json).collect())
}

fn client(server: &MockServer) -> GitHubClient {
    GitHubClient::new(None).unwrap().with_api_url(server.base_url())
}

#[tokio::test]
async fn single_short_page_yields_its_records() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET)
            .path(FORKS_PATH)
            .query_param("page", "1")
            .query_param("per_page", "100")
            .query_param("sort", "newest")
            .header("accept", "application/vnd.github+json")
            .header("x-github-api-version", "2022-11-28");
        then.status(200)
            .header("content-type", "application/json")
            .header("x-ratelimit-remaining", "4999")
            .json_body(page(0..2));
    });

    let forks = list_forks(&client(&server), "acme", "widgets").await.unwrap();

    first.assert_hits(1);
    assert_eq!(forks.len(), 2);
    assert_eq!(forks[0].owner, "user0");
    assert_eq!(forks[1].owner, "user1");

    let table = render(OutputFormat::Table, &forks).unwrap();
    if !cfg!(feature = "pretty") {
        assert!(table.contains("Owner"));
        return;
    }
    let rows: Vec<_> = table.lines().filter(|l| l.starts_with('|')).collect();
    assert_eq!(rows.len(), 3, "header plus two forks:\n{table}");
    let header: Vec<_> = rows[0]
        .split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();
    assert_eq!(header, ["Owner", "Repo Name", "Stars", "Forks", "Created", "URL"]);
}

#[tokio::test]
async fn one_more_than_a_page_takes_two_requests() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET).path(FORKS_PATH).query_param("page", "1");
        then.status(200).json_body(page(0..PAGE_SIZE));
    });
    let second = server.mock(|when, then| {
        when.method(GET).path(FORKS_PATH).query_param("page", "2");
        then.status(200).json_body(page(PAGE_SIZE..PAGE_SIZE + 1));
    });
    let third = server.mock(|when, then| {
        when.method(GET).path(FORKS_PATH).query_param("page", "3");
        then.status(200).json_body(json!([]));
    });

    let forks = list_forks(&client(&server), "acme", "widgets").await.unwrap();

    assert_eq!(forks.len(), PAGE_SIZE + 1);
    first.assert_hits(1);
    second.assert_hits(1);
    third.assert_hits(0);
}

#[tokio::test]
async fn full_page_then_empty_page_terminates() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET).path(FORKS_PATH).query_param("page", "1");
        then.status(200).json_body(page(0..PAGE_SIZE));
    });
    let second = server.mock(|when, then| {
        when.method(GET).path(FORKS_PATH).query_param("page", "2");
        then.status(200).json_body(json!([]));
    });

    let forks = list_forks(&client(&server), "acme", "widgets").await.unwrap();

    assert_eq!(forks.len(), PAGE_SIZE);
    first.assert_hits(1);
    second.assert_hits(1);
}

#[tokio::test]
async fn empty_repository_renders_boundary_output() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(FORKS_PATH);
        then.status(200).json_body(json!([]));
    });

    let forks = list_forks(&client(&server), "acme", "widgets").await.unwrap();

    assert!(forks.is_empty());
    assert_eq!(render(OutputFormat::Table, &forks).unwrap(), "No forks found.");
    assert_eq!(render(OutputFormat::Csv, &forks).unwrap(), "No forks found.");
    assert_eq!(render(OutputFormat::Json, &forks).unwrap(), "[]");
}

#[tokio::test]
async fn low_quota_truncates_silently() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET).path(FORKS_PATH).query_param("page", "1");
        then.status(200)
            .header("x-ratelimit-remaining", "4")
            .json_body(page(0..PAGE_SIZE));
    });
    let second = server.mock(|when, then| {
        when.method(GET).path(FORKS_PATH).query_param("page", "2");
        then.status(200).json_body(page(PAGE_SIZE..PAGE_SIZE + 10));
    });

    let forks = list_forks(&client(&server), "acme", "widgets").await.unwrap();

    assert_eq!(forks.len(), PAGE_SIZE);
    first.assert_hits(1);
    second.assert_hits(0);
}

#[tokio::test]
async fn bearer_token_is_attached() {
    let server = MockServer::start();
    let authed = server.mock(|when, then| {
        when.method(GET)
            .path(FORKS_PATH)
            .header("authorization", "Bearer s3cret");
        then.status(200).json_body(page(0..1));
    });

    let client = GitHubClient::new(Some("s3cret".into()))
        .unwrap()
        .with_api_url(server.base_url());
    let forks = list_forks(&client, "acme", "widgets").await.unwrap();

    authed.assert_hits(1);
    assert_eq!(forks.len(), 1);
}

#[tokio::test]
async fn not_found_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(FORKS_PATH);
        then.status(404).json_body(json!({ "message": "Not Found" }));
    });

    let err = list_forks(&client(&server), "acme", "widgets")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MonitorError::Fetch(FetchError::NotFound { ref owner, ref repo })
            if owner == "acme" && repo == "widgets"
    ));
}

#[tokio::test]
async fn forbidden_is_rate_limited() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/widgets");
        then.status(403);
    });

    let err = client(&server)
        .repo_summary("acme", "widgets")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::RateLimited));
}

#[tokio::test]
async fn error_mid_pagination_discards_earlier_pages() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(FORKS_PATH).query_param("page", "1");
        then.status(200).json_body(page(0..PAGE_SIZE));
    });
    let failing = server.mock(|when, then| {
        when.method(GET).path(FORKS_PATH).query_param("page", "2");
        then.status(502);
    });

    let err = list_forks(&client(&server), "acme", "widgets")
        .await
        .unwrap_err();

    failing.assert_hits(1);
    assert!(matches!(
        err,
        MonitorError::Fetch(FetchError::Http { status }) if status.as_u16() == 502
    ));
}

#[tokio::test]
async fn malformed_record_fails_the_run() {
    let server = MockServer::start();
    let mut broken = fork_json(1);
    broken.as_object_mut().unwrap().remove("html_url");
    server.mock(|when, then| {
        when.method(GET).path(FORKS_PATH);
        then.status(200).json_body(json!([fork_json(0), broken]));
    });

    let err = list_forks(&client(&server), "acme", "widgets")
        .await
        .unwrap_err();
    assert!(matches!(err, MonitorError::Format(ref e) if e.index == 1));
}

#[tokio::test]
async fn repo_summary_reads_counts() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/widgets");
        then.status(200).json_body(json!({
            "full_name": "acme/widgets",
            "description": "Widget engine",
            "forks_count": 12,
            "stargazers_count": 40,
            "watchers_count": 40,
            "created_at": "2023-01-01T00:00:00Z",
            "updated_at": "2024-06-01T00:00:00Z",
        }));
    });

    let summary = client(&server)
        .repo_summary("acme", "widgets")
        .await
        .unwrap();
    assert_eq!(summary.full_name, "acme/widgets");
    assert_eq!(summary.description.as_deref(), Some("Widget engine"));
    assert_eq!(summary.forks, 12);
    assert_eq!(summary.stars, 40);
}
