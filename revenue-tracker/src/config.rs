//! Runtime configuration loaded from an optional TOML file.
//!
//! Every key can also be given on the command line or through the
//! environment; those win over the file. When no file is present the
//! built-in defaults apply and only the RPC URL and contract address must
//! be supplied.

use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result, bail};
use reqwest::Url;
use serde::Deserialize;

use crate::event::AbiSource;
use crate::fetcher::{BlockRange, DEFAULT_CHUNK_SIZE, DEFAULT_REQUEST_TIMEOUT};
use crate::report::{BPS_DENOMINATOR, DEFAULT_SHARE_BPS};

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "revenue.toml";

/// Blocks scanned behind the chain head when no range is given.
pub const DEFAULT_LOOKBACK: u64 = 10_000;

/// Configuration keys, all optional. Used both for the TOML file and for
/// command-line overrides.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// JSON-RPC endpoint of the Ethereum node.
    pub rpc_url: Option<String>,
    /// Core contract emitting `FeeCollected`.
    pub contract: Option<Address>,
    /// Contract ABI (bare array or compiler artifact).
    pub abi_path: Option<PathBuf>,
    /// First block to scan.
    pub from_block: Option<u64>,
    /// Last block to scan.
    pub to_block: Option<u64>,
    /// Blocks behind `to_block` to scan when `from_block` is unset.
    pub lookback_blocks: Option<u64>,
    /// Blocks per `eth_getLogs` call.
    pub chunk_size: Option<u64>,
    /// DAO share in basis points.
    pub share_bps: Option<u16>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load the configuration file.
    ///
    /// With no `path`, [`DEFAULT_CONFIG_PATH`] is read if present and the
    /// defaults apply otherwise. An explicit `path` must exist.
    ///
    /// # Errors
    ///
    /// Fails if an explicit file is missing, or if any file present cannot
    /// be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => {
                if !path.exists() {
                    bail!("config file {} not found", path.display());
                }
                path
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if !path.exists() {
                    tracing::debug!(path = DEFAULT_CONFIG_PATH, "no config file, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };
        Self::parse_file(path)
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Layer `overrides` on top of `self`; set keys in `overrides` win.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            rpc_url: overrides.rpc_url.or(self.rpc_url),
            contract: overrides.contract.or(self.contract),
            abi_path: overrides.abi_path.or(self.abi_path),
            from_block: overrides.from_block.or(self.from_block),
            to_block: overrides.to_block.or(self.to_block),
            lookback_blocks: overrides.lookback_blocks.or(self.lookback_blocks),
            chunk_size: overrides.chunk_size.or(self.chunk_size),
            share_bps: overrides.share_bps.or(self.share_bps),
            request_timeout_secs: overrides.request_timeout_secs.or(self.request_timeout_secs),
        }
    }

    /// Validate and fill in defaults.
    ///
    /// # Errors
    ///
    /// Fails if the RPC URL is missing or malformed, the contract is missing,
    /// the chunk size is zero, or the share exceeds 100%.
    pub fn resolve(self) -> Result<Settings> {
        let Some(rpc_url) = self.rpc_url.filter(|u| !u.is_empty()) else {
            bail!("no RPC endpoint configured (set ETH_RPC_URL or --rpc-url)");
        };
        let rpc_url: Url = rpc_url.parse().context("invalid RPC URL")?;
        let Some(contract) = self.contract else {
            bail!("no contract address configured (set CORE_CONTRACT_ADDRESS or --contract)");
        };
        let chunk_size = match self.chunk_size {
            Some(size) => NonZeroU64::new(size).context("chunk size must be positive")?,
            None => DEFAULT_CHUNK_SIZE,
        };
        let share_bps = self.share_bps.unwrap_or(DEFAULT_SHARE_BPS);
        if share_bps > BPS_DENOMINATOR {
            bail!("share of {share_bps} bps exceeds {BPS_DENOMINATOR} bps");
        }

        Ok(Settings {
            rpc_url,
            contract,
            abi: self.abi_path.map_or_else(AbiSource::default, AbiSource::Explicit),
            range: RangeRequest {
                from_block: self.from_block,
                to_block: self.to_block,
                lookback: self.lookback_blocks.unwrap_or(DEFAULT_LOOKBACK),
            },
            chunk_size,
            share_bps,
            request_timeout: self
                .request_timeout_secs
                .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs),
        })
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Core contract address.
    pub contract: Address,
    /// ABI used to resolve the event topic.
    pub abi: AbiSource,
    /// Requested block range, resolved against the chain head.
    pub range: RangeRequest,
    /// Blocks per `eth_getLogs` call.
    pub chunk_size: NonZeroU64,
    /// DAO share in basis points.
    pub share_bps: u16,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Settings {
    /// Host of the RPC endpoint. Safe to log, unlike the full URL whose path
    /// or query may hold an API key.
    #[must_use]
    pub fn rpc_host(&self) -> &str {
        self.rpc_url.host_str().unwrap_or_default()
    }
}

/// Block range as configured, before the chain head is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    /// Explicit first block.
    pub from_block: Option<u64>,
    /// Explicit last block; defaults to the chain head.
    pub to_block: Option<u64>,
    /// Blocks behind the last block when `from_block` is unset.
    pub lookback: u64,
}

impl RangeRequest {
    /// Whether the range can be built without asking the node for its head.
    #[must_use]
    pub const fn needs_head(&self) -> bool {
        self.to_block.is_none()
    }

    /// Build the concrete range given the current chain head.
    ///
    /// # Errors
    ///
    /// Fails if the resulting `from` lies after `to`.
    pub fn resolve(&self, latest: u64) -> Result<BlockRange, crate::RevenueError> {
        let to = self.to_block.unwrap_or(latest);
        match self.from_block {
            Some(from) => BlockRange::new(from, to),
            None => Ok(BlockRange::trailing(to, self.lookback)),
        }
    }
}
