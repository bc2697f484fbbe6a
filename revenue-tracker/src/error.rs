//! Error type for the revenue pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Failure anywhere between the node and the revenue report.
///
/// Nothing is retried; the first error ends the run.
#[derive(Debug, Error)]
pub enum RevenueError {
    /// `from` lies after `to`.
    #[error("invalid block range: from {from} is after to {to}")]
    InvalidRange {
        /// First block requested.
        from: u64,
        /// Last block requested.
        to: u64,
    },

    /// An RPC call failed.
    #[error("{call} failed: {message}")]
    Rpc {
        /// Call and block window, e.g. `eth_getLogs [100, 2099]`.
        call: String,
        /// Error reported by the transport or node.
        message: String,
    },

    /// An RPC call exceeded the request timeout.
    #[error("{call} timed out")]
    Timeout {
        /// Call and block window.
        call: String,
    },

    /// A log came back without a block number (pending log).
    #[error("log from {address} has no block number")]
    MissingBlockNumber {
        /// Emitting contract.
        address: alloy::primitives::Address,
    },

    /// A log's data payload is too short to hold a `uint256`.
    #[error("log in block {block} carries {len} data bytes, expected at least 32")]
    ShortPayload {
        /// Block of the offending log.
        block: u64,
        /// Payload length.
        len: usize,
    },

    /// The revenue sum does not fit in 256 bits.
    #[error("revenue total overflowed 256 bits")]
    Overflow,

    /// Share above 100%.
    #[error("share of {bps} bps exceeds 10000 bps")]
    ShareOutOfRange {
        /// Configured share.
        bps: u16,
    },

    /// The ABI file could not be read.
    #[error("reading ABI {}: {source}", .path.display())]
    AbiRead {
        /// ABI location.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The ABI file is not a JSON ABI or artifact.
    #[error("parsing ABI {}: {source}", .path.display())]
    AbiParse {
        /// ABI location.
        path: PathBuf,
        /// JSON failure.
        #[source]
        source: serde_json::Error,
    },

    /// The ABI does not declare the fee event.
    #[error("ABI {} has no `{event}` event", .path.display())]
    EventNotInAbi {
        /// ABI location.
        path: PathBuf,
        /// Event name looked up.
        event: &'static str,
    },
}
