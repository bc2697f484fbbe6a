//! Protocol revenue tracking.
//!
//! Scans an Ethereum node for `FeeCollected` logs emitted by the core
//! contract, sums the collected fees and computes the DAO's share.

pub mod config;
pub mod error;
pub mod event;
pub mod fetcher;
pub mod report;

#[cfg(test)]
mod test_utils;

pub use error::RevenueError;
pub use fetcher::{BlockRange, FeeQuery, LogSource, RpcSource};
pub use report::RevenueReport;

/// Fetch, decode and aggregate every fee event matching `query`.
///
/// # Errors
///
/// Fails on the first RPC, decode or arithmetic error.
pub async fn track_revenue<S: LogSource + Sync>(
    source: &S,
    query: &FeeQuery,
    share_bps: u16,
) -> Result<RevenueReport, RevenueError> {
    tracing::info!(
        contract = %query.contract,
        from = query.range.from(),
        to = query.range.to(),
        chunk_size = query.chunk_size.get(),
        "fetching fee logs"
    );
    let logs = fetcher::fetch_fee_logs(source, query).await?;
    let events = event::decode_all(&logs)?;
    tracing::info!(events = events.len(), "decoded fee events");
    RevenueReport::from_events(query.range, &events, share_bps)
}
