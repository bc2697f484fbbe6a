//! Fork monitor CLI.
//!
//! Lists every fork of a GitHub repository for license-compliance
//! monitoring. Progress and the repository summary are logged to stderr;
//! stdout carries only the rendered fork list.
//!
//! # Usage
//!
//! ```bash
//! # Table of all forks of the default repository
//! fork-monitor
//!
//! # JSON for another repository, authenticated
//! GITHUB_TOKEN=ghp_... fork-monitor --owner acme --repo widgets --output json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use fork_monitor::client::DEFAULT_API_URL;
use fork_monitor::record::date_part;
use fork_monitor::{GitHubClient, OutputFormat, list_forks, render};

/// Forks beyond which an anonymous run suggests using a token.
const TOKEN_TIP_THRESHOLD: usize = 50;

/// List the forks of a GitHub repository.
#[derive(Debug, Parser)]
#[command(name = "fork-monitor", version, about)]
struct Cli {
    /// GitHub personal access token (raises the API rate limit).
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Repository owner.
    #[arg(long, default_value = "JuicyD-web")]
    owner: String,

    /// Repository name.
    #[arg(long, default_value = "Ekubo-DAO-Ekubo-EVM")]
    repo: String,

    /// GitHub API root, for GitHub Enterprise installations.
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cmd_monitor(cli).await
}

/// Fetch, format and print the fork list.
#[allow(clippy::print_stdout, reason = "stdout is the report channel")]
async fn cmd_monitor(cli: Cli) -> Result<()> {
    let client = GitHubClient::new(cli.token)
        .context("building HTTP client")?
        .with_api_url(cli.api_url);
    let target = format!("{}/{}", cli.owner, cli.repo);

    tracing::info!(repo = %target, "fetching repository information");
    let summary = client.repo_summary(&cli.owner, &cli.repo).await?;
    tracing::info!(
        repo = %summary.full_name,
        description = summary.description.as_deref().unwrap_or("N/A"),
        forks = summary.forks,
        stars = summary.stars,
        watchers = summary.watchers,
        created = date_part(&summary.created_at),
        updated = date_part(&summary.updated_at),
        "repository"
    );

    tracing::info!(repo = %target, "fetching forks");
    let forks = list_forks(&client, &cli.owner, &cli.repo).await?;
    tracing::info!(count = forks.len(), "found forks");

    println!("{}", render(cli.output, &forks).context("rendering forks")?);
    if cli.output != OutputFormat::Json {
        println!("\nTotal forks displayed: {}", forks.len());
    }

    if !client.is_authenticated() && forks.len() > TOKEN_TIP_THRESHOLD {
        tracing::info!("set GITHUB_TOKEN or pass --token to increase rate limits");
    }

    Ok(())
}
