//! Protocol revenue tracker CLI.
//!
//! Sums the `FeeCollected` events emitted by the core contract over a block
//! range and prints the total revenue and the DAO's share.
//!
//! # Usage
//!
//! ```bash
//! # Last 10 000 blocks, 50% share
//! ETH_RPC_URL=https://eth.llamarpc.com \
//! CORE_CONTRACT_ADDRESS=0x... \
//! revenue-tracker
//!
//! # Explicit range, smaller windows, ABI from a Foundry artifact
//! revenue-tracker --from-block 19000000 --to-block 19100000 \
//!     --chunk-size 500 --abi out/Core.sol/Core.json
//! ```

use std::path::PathBuf;

use alloy::primitives::Address;
use alloy::providers::ProviderBuilder;
use anyhow::Result;
use clap::Parser;
use revenue_tracker::config::{Config, Settings};
use revenue_tracker::{FeeQuery, LogSource, RpcSource, event, track_revenue};

/// Compute protocol revenue and the DAO share from on-chain fee events.
#[derive(Debug, Parser)]
#[command(name = "revenue-tracker", version, about)]
struct Cli {
    /// TOML configuration file (defaults to `revenue.toml` when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ethereum JSON-RPC endpoint.
    #[arg(long, env = "ETH_RPC_URL", hide_env_values = true)]
    rpc_url: Option<String>,

    /// Core contract emitting `FeeCollected`.
    #[arg(long, env = "CORE_CONTRACT_ADDRESS")]
    contract: Option<Address>,

    /// Contract ABI (defaults to `abis/Core.json` when present).
    #[arg(long)]
    abi: Option<PathBuf>,

    /// First block to scan (defaults to `--to-block` minus the lookback).
    #[arg(long)]
    from_block: Option<u64>,

    /// Last block to scan (defaults to the chain head).
    #[arg(long)]
    to_block: Option<u64>,

    /// Blocks to scan behind the last block when `--from-block` is unset.
    #[arg(long)]
    lookback: Option<u64>,

    /// Blocks per `eth_getLogs` request.
    #[arg(long)]
    chunk_size: Option<u64>,

    /// DAO share in basis points (5000 = 50%).
    #[arg(long)]
    share_bps: Option<u16>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,
}

impl Cli {
    /// Command-line and environment values as a config layer.
    fn overrides(&self) -> Config {
        Config {
            rpc_url: self.rpc_url.clone(),
            contract: self.contract,
            abi_path: self.abi.clone(),
            from_block: self.from_block,
            to_block: self.to_block,
            lookback_blocks: self.lookback,
            chunk_size: self.chunk_size,
            share_bps: self.share_bps,
            request_timeout_secs: self.timeout,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Config::load(cli.config.as_deref())?
        .merge(cli.overrides())
        .resolve()?;

    cmd_track(settings).await
}

/// Execute one revenue run.
#[allow(clippy::print_stdout, reason = "stdout is the report channel")]
async fn cmd_track(settings: Settings) -> Result<()> {
    let topic = event::resolve_topic(&settings.abi)?;

    tracing::info!(host = settings.rpc_host(), "connecting");
    let provider = ProviderBuilder::new().connect_http(settings.rpc_url.clone());
    let source = RpcSource::new(provider, settings.request_timeout);

    let latest = if settings.range.needs_head() {
        source.latest_block().await?
    } else {
        0
    };
    let range = settings.range.resolve(latest)?;

    let query = FeeQuery {
        contract: settings.contract,
        topic,
        range,
        chunk_size: settings.chunk_size,
    };
    let report = track_revenue(&source, &query, settings.share_bps).await?;

    println!("{report}");
    Ok(())
}
