//! Output rendering for fork records: table, JSON or CSV.
//!
//! Rendering is pure; the caller decides where the string goes.

use clap::ValueEnum;

use crate::record::{ForkRecord, date_part};

/// Line printed by the table and CSV renderers for an empty fork list.
pub const NO_FORKS: &str = "No forks found.";

const TABLE_HEADERS: [&str; 6] = ["Owner", "Repo Name", "Stars", "Forks", "Created", "URL"];

const CSV_HEADERS: [&str; 12] = [
    "owner",
    "repo_name",
    "full_name",
    "url",
    "created_at",
    "updated_at",
    "stars",
    "watchers",
    "forks",
    "open_issues",
    "private",
    "description",
];

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// Pretty-printed JSON array.
    Json,
    /// Comma-separated values with a header line.
    Csv,
}

/// Render `forks` in the requested format.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn render(format: OutputFormat, forks: &[ForkRecord]) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table => Ok(render_table(forks)),
        OutputFormat::Json => serde_json::to_string_pretty(forks),
        OutputFormat::Csv => Ok(render_csv(forks)),
    }
}

fn table_rows(forks: &[ForkRecord]) -> impl Iterator<Item = [String; 6]> + '_ {
    forks.iter().map(|fork| {
        [
            fork.owner.clone(),
            fork.repo_name.clone(),
            fork.stars.to_string(),
            fork.forks.to_string(),
            date_part(&fork.created_at).to_owned(),
            fork.url.clone(),
        ]
    })
}

fn render_table(forks: &[ForkRecord]) -> String {
    if forks.is_empty() {
        return NO_FORKS.to_owned();
    }
    #[cfg(feature = "pretty")]
    {
        grid_table(forks)
    }
    #[cfg(not(feature = "pretty"))]
    {
        plain_table(forks)
    }
}

#[cfg(feature = "pretty")]
fn grid_table(forks: &[ForkRecord]) -> String {
    use tabled::builder::Builder;
    use tabled::settings::Style;

    let mut builder = Builder::default();
    builder.push_record(TABLE_HEADERS);
    for row in table_rows(forks) {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::ascii());
    table.to_string()
}

/// Fixed-width layout used when the grid renderer is compiled out.
#[cfg_attr(feature = "pretty", allow(dead_code, reason = "fallback for builds without `pretty`"))]
fn plain_table(forks: &[ForkRecord]) -> String {
    let rule = "=".repeat(120);
    let line = |[owner, name, stars, count, created, url]: [&str; 6]| {
        format!("{owner:<20} {name:<30} {stars:<8} {count:<8} {created:<12} {url}")
    };

    let mut lines = vec![rule.clone(), line(TABLE_HEADERS), rule.clone()];
    for [owner, name, stars, count, created, url] in table_rows(forks) {
        lines.push(line([
            owner.as_str(),
            name.as_str(),
            stars.as_str(),
            count.as_str(),
            created.as_str(),
            url.as_str(),
        ]));
    }
    lines.push(rule);
    lines.join("\n")
}

fn render_csv(forks: &[ForkRecord]) -> String {
    if forks.is_empty() {
        return NO_FORKS.to_owned();
    }
    let mut lines = Vec::with_capacity(forks.len() + 1);
    lines.push(CSV_HEADERS.join(","));
    for fork in forks {
        let description = fork.description.as_deref().unwrap_or_default();
        lines.push(format!(
            "{},{},{},{},{},{},{},{},{},{},{},\"{}\"",
            fork.owner,
            fork.repo_name,
            fork.full_name,
            fork.url,
            fork.created_at,
            fork.updated_at,
            fork.stars,
            fork.watchers,
            fork.forks,
            fork.open_issues,
            fork.private,
            description.replace('"', "\"\""),
        ));
    }
    lines.join("\n")
}
