//! Chunked `eth_getLogs` fetching.
//!
//! The requested block range is split into fixed windows that are queried
//! one after another in ascending order. A failing window aborts the whole
//! fetch; logs gathered so far are dropped.

use std::future::Future;
use std::num::NonZeroU64;
use std::time::Duration;

use alloy::primitives::{Address, B256};
use alloy::providers::Provider;
use alloy::rpc::types::{Filter, Log};

use crate::error::RevenueError;

/// Default window size for a single `eth_getLogs` call.
pub const DEFAULT_CHUNK_SIZE: NonZeroU64 = NonZeroU64::new(2_000).expect("non-zero");

/// Default per-request timeout for RPC calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Progress is logged every N windows.
const PROGRESS_INTERVAL: usize = 50;

/// Closed block interval `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    from: u64,
    to: u64,
}

impl BlockRange {
    /// Build a range, rejecting `from > to`.
    ///
    /// # Errors
    ///
    /// Returns [`RevenueError::InvalidRange`] if `from > to`.
    pub fn new(from: u64, to: u64) -> Result<Self, RevenueError> {
        if from > to {
            return Err(RevenueError::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// The `lookback` blocks before `latest`, plus `latest` itself.
    #[must_use]
    pub const fn trailing(latest: u64, lookback: u64) -> Self {
        Self {
            from: latest.saturating_sub(lookback),
            to: latest,
        }
    }

    /// First block, inclusive.
    #[must_use]
    pub const fn from(&self) -> u64 {
        self.from
    }

    /// Last block, inclusive.
    #[must_use]
    pub const fn to(&self) -> u64 {
        self.to
    }

    /// Consecutive windows of at most `size` blocks covering the range.
    #[must_use]
    pub const fn chunks(self, size: NonZeroU64) -> Chunks {
        Chunks {
            next: Some(self.from),
            to: self.to,
            size,
        }
    }
}

/// Iterator returned by [`BlockRange::chunks`].
#[derive(Debug, Clone)]
pub struct Chunks {
    next: Option<u64>,
    to: u64,
    size: NonZeroU64,
}

impl Iterator for Chunks {
    type Item = BlockRange;

    fn next(&mut self) -> Option<BlockRange> {
        let from = self.next?;
        let end = from.saturating_add(self.size.get() - 1).min(self.to);
        self.next = if end == self.to { None } else { Some(end + 1) };
        Some(BlockRange { from, to: end })
    }
}

/// Everything needed to query fee logs, resolved once per run.
#[derive(Debug, Clone, Copy)]
pub struct FeeQuery {
    /// Contract emitting the fee event.
    pub contract: Address,
    /// Topic-0 of the fee event.
    pub topic: B256,
    /// Blocks to scan.
    pub range: BlockRange,
    /// Window size per `eth_getLogs` call.
    pub chunk_size: NonZeroU64,
}

impl FeeQuery {
    fn filter(&self, window: BlockRange) -> Filter {
        Filter::new()
            .address(self.contract)
            .event_signature(self.topic)
            .from_block(window.from)
            .to_block(window.to)
    }
}

/// Source of chain data for the revenue pipeline.
pub trait LogSource {
    /// Current chain head.
    fn latest_block(&self) -> impl Future<Output = Result<u64, RevenueError>> + Send;

    /// Logs matching `filter`.
    fn logs(&self, filter: &Filter) -> impl Future<Output = Result<Vec<Log>, RevenueError>> + Send;
}

/// [`LogSource`] backed by an alloy provider, with a per-request timeout.
#[derive(Debug, Clone)]
pub struct RpcSource<P> {
    provider: P,
    timeout: Duration,
}

impl<P: Provider> RpcSource<P> {
    /// Wrap `provider`, bounding each call by `timeout`.
    pub const fn new(provider: P, timeout: Duration) -> Self {
        Self { provider, timeout }
    }
}

impl<P: Provider> LogSource for RpcSource<P> {
    async fn latest_block(&self) -> Result<u64, RevenueError> {
        let call = "eth_blockNumber".to_owned();
        tokio::time::timeout(self.timeout, self.provider.get_block_number())
            .await
            .map_err(|_| RevenueError::Timeout { call: call.clone() })?
            .map_err(|e| RevenueError::Rpc {
                call,
                message: e.to_string(),
            })
    }

    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>, RevenueError> {
        let call = format!(
            "eth_getLogs [{}, {}]",
            filter.get_from_block().unwrap_or_default(),
            filter.get_to_block().unwrap_or_default()
        );
        tokio::time::timeout(self.timeout, self.provider.get_logs(filter))
            .await
            .map_err(|_| RevenueError::Timeout { call: call.clone() })?
            .map_err(|e| RevenueError::Rpc {
                call,
                message: e.to_string(),
            })
    }
}

/// Fetch every fee log in `query.range`, one window at a time.
///
/// # Errors
///
/// Returns the first window's error; no partial result is kept.
pub async fn fetch_fee_logs<S: LogSource + Sync>(
    source: &S,
    query: &FeeQuery,
) -> Result<Vec<Log>, RevenueError> {
    let mut logs = Vec::new();

    for (count, window) in query.range.chunks(query.chunk_size).enumerate() {
        let batch = source.logs(&query.filter(window)).await?;
        tracing::debug!(from = window.from, to = window.to, logs = batch.len(), "fetched window");
        logs.extend(batch);

        if (count + 1) % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                windows = count + 1,
                block = window.to,
                progress = %progress(window.to, query.range),
                "fetching"
            );
        }
    }

    Ok(logs)
}

/// Whole percent of `range` covered once the window ending at `done` is in.
fn progress(done: u64, range: BlockRange) -> String {
    let covered = u128::from(done.saturating_sub(range.from)) + 1;
    let total = u128::from(range.to - range.from) + 1;
    format!("{}%", covered * 100 / total)
}
