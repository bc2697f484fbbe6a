#![cfg(test)]

use std::sync::Mutex;

use alloy::primitives::{Address, LogData, U256, address};
use alloy::rpc::types::{Filter, Log};

use crate::error::RevenueError;
use crate::event::default_topic;
use crate::fetcher::LogSource;

pub(crate) const CONTRACT: Address = address!("5e4e3b0c2f1a9d8e7f6a5b4c3d2e1f0a9b8c7d6e");

/// A `FeeCollected` log from [`CONTRACT`] carrying `amount`.
pub(crate) fn fee_log(block: u64, amount: u64) -> Log {
    Log {
        inner: alloy::primitives::Log {
            address: CONTRACT,
            data: LogData::new_unchecked(
                vec![default_topic()],
                U256::from(amount).to_be_bytes::<32>().to_vec().into(),
            ),
        },
        block_number: Some(block),
        ..Log::default()
    }
}

/// In-memory node serving a fixed set of logs.
pub(crate) struct FakeNode {
    head: u64,
    logs: Vec<Log>,
    fail_from: Option<u64>,
    requested: Mutex<Vec<(u64, u64)>>,
    last_filter: Mutex<Option<Filter>>,
}

impl FakeNode {
    pub(crate) fn new(head: u64, logs: Vec<Log>) -> Self {
        Self {
            head,
            logs,
            fail_from: None,
            requested: Mutex::new(Vec::new()),
            last_filter: Mutex::new(None),
        }
    }

    /// Fail any `eth_getLogs` window starting at `block`.
    pub(crate) fn failing_at(mut self, block: u64) -> Self {
        self.fail_from = Some(block);
        self
    }

    /// Windows requested so far, in order.
    pub(crate) fn requested(&self) -> Vec<(u64, u64)> {
        self.requested.lock().unwrap().clone()
    }

    pub(crate) fn last_filter(&self) -> Option<Filter> {
        self.last_filter.lock().unwrap().clone()
    }
}

impl LogSource for FakeNode {
    async fn latest_block(&self) -> Result<u64, RevenueError> {
        Ok(self.head)
    }

    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>, RevenueError> {
        let from = filter.get_from_block().unwrap_or_default();
        let to = filter.get_to_block().unwrap_or(self.head);
        self.requested.lock().unwrap().push((from, to));
        *self.last_filter.lock().unwrap() = Some(filter.clone());

        if self.fail_from == Some(from) {
            return Err(RevenueError::Rpc {
                call: format!("eth_getLogs [{from}, {to}]"),
                message: "upstream unavailable".into(),
            });
        }
        Ok(self
            .logs
            .iter()
            .filter(|log| log.block_number.is_some_and(|b| (from..=to).contains(&b)))
            .cloned()
            .collect())
    }
}
