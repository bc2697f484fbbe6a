//! The `FeeCollected` event: topic resolution and payload decoding.

use std::path::{Path, PathBuf};

use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::rpc::types::Log;
use alloy::sol;
use alloy::sol_types::SolEvent;
use serde::Deserialize;

use crate::error::RevenueError;

/// Name of the fee event in the core contract's ABI.
pub const FEE_EVENT: &str = "FeeCollected";

/// ABI location used when none is configured.
pub const DEFAULT_ABI_PATH: &str = "abis/Core.json";

sol! {
    /// Emitted by the core contract when protocol fees are collected.
    event FeeCollected(address indexed token, uint256 amount);
}

/// Topic-0 of `FeeCollected(address,uint256)`.
#[must_use]
pub const fn default_topic() -> B256 {
    FeeCollected::SIGNATURE_HASH
}

/// Where the contract ABI comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiSource {
    /// Path given by the operator; it must exist.
    Explicit(PathBuf),
    /// Conventional location; falls back to the built-in signature when absent.
    Default(PathBuf),
}

impl Default for AbiSource {
    fn default() -> Self {
        Self::Default(PathBuf::from(DEFAULT_ABI_PATH))
    }
}

/// Resolve the fee event topic from the configured ABI.
///
/// # Errors
///
/// Fails if an explicit ABI is missing, if any ABI is unreadable or
/// malformed, or if it does not declare [`FEE_EVENT`].
pub fn resolve_topic(source: &AbiSource) -> Result<B256, RevenueError> {
    match source {
        AbiSource::Explicit(path) => topic_from_abi(path),
        AbiSource::Default(path) if path.exists() => topic_from_abi(path),
        AbiSource::Default(path) => {
            tracing::warn!(
                path = %path.display(),
                signature = FeeCollected::SIGNATURE,
                "ABI not found, using built-in event signature"
            );
            Ok(default_topic())
        }
    }
}

/// Read `path` and return the selector of its [`FEE_EVENT`] event.
///
/// Accepts a bare ABI array or a compiler artifact with an `abi` field.
///
/// # Errors
///
/// See [`resolve_topic`].
pub fn topic_from_abi(path: &Path) -> Result<B256, RevenueError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AbiFile {
        Bare(JsonAbi),
        Artifact { abi: JsonAbi },
    }

    let text = std::fs::read_to_string(path).map_err(|source| RevenueError::AbiRead {
        path: path.to_owned(),
        source,
    })?;
    let abi = match serde_json::from_str(&text).map_err(|source| RevenueError::AbiParse {
        path: path.to_owned(),
        source,
    })? {
        AbiFile::Bare(abi) | AbiFile::Artifact { abi } => abi,
    };

    let event = abi
        .event(FEE_EVENT)
        .and_then(|overloads| overloads.first())
        .ok_or_else(|| RevenueError::EventNotInAbi {
            path: path.to_owned(),
            event: FEE_EVENT,
        })?;
    tracing::debug!(path = %path.display(), signature = %event.signature(), "resolved fee event");
    Ok(event.selector())
}

/// A decoded `FeeCollected` log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeEvent {
    /// Emitting contract.
    pub contract: Address,
    /// Block the log was included in.
    pub block_number: u64,
    /// Raw data payload.
    pub data: Bytes,
    /// Fee amount in base units (first ABI word of the payload).
    pub amount: U256,
}

impl FeeEvent {
    /// Decode a log's payload as a single `uint256`.
    ///
    /// Only the topic filter applied by the node vouches for the log's shape;
    /// trailing words beyond the first are ignored.
    ///
    /// # Errors
    ///
    /// Fails for pending logs and payloads shorter than 32 bytes.
    pub fn from_log(log: &Log) -> Result<Self, RevenueError> {
        let contract = log.address();
        let block_number = log
            .block_number
            .ok_or(RevenueError::MissingBlockNumber { address: contract })?;
        let data = log.data().data.clone();
        let word = data.get(..32).ok_or(RevenueError::ShortPayload {
            block: block_number,
            len: data.len(),
        })?;
        let amount = U256::from_be_slice(word);

        Ok(Self {
            contract,
            block_number,
            data,
            amount,
        })
    }
}

/// Decode every log, failing on the first malformed one.
///
/// # Errors
///
/// See [`FeeEvent::from_log`].
pub fn decode_all(logs: &[Log]) -> Result<Vec<FeeEvent>, RevenueError> {
    logs.iter().map(FeeEvent::from_log).collect()
}
