//! Revenue aggregation and the DAO share split.
//!
//! All arithmetic stays in `U256`: the sum is overflow-checked and the share
//! is an exact floor of `total * bps / 10_000`.

use std::fmt;

use alloy::primitives::U256;
use alloy::primitives::utils::format_ether;

use crate::error::RevenueError;
use crate::event::FeeEvent;
use crate::fetcher::BlockRange;

/// Basis points in 100%.
pub const BPS_DENOMINATOR: u16 = 10_000;

/// DAO share when none is configured (50%).
pub const DEFAULT_SHARE_BPS: u16 = 5_000;

/// Sum the fee amounts of `events`.
///
/// # Errors
///
/// Returns [`RevenueError::Overflow`] if the sum exceeds `U256::MAX`.
pub fn total_revenue(events: &[FeeEvent]) -> Result<U256, RevenueError> {
    events.iter().try_fold(U256::ZERO, |total, event| {
        total.checked_add(event.amount).ok_or(RevenueError::Overflow)
    })
}

/// `total * share_bps / 10_000`, rounded down, without intermediate overflow.
///
/// # Errors
///
/// Returns [`RevenueError::ShareOutOfRange`] if `share_bps` exceeds 10 000.
pub fn dao_share(total: U256, share_bps: u16) -> Result<U256, RevenueError> {
    if share_bps > BPS_DENOMINATOR {
        return Err(RevenueError::ShareOutOfRange { bps: share_bps });
    }
    let denominator = U256::from(BPS_DENOMINATOR);
    let bps = U256::from(share_bps);
    Ok(total / denominator * bps + total % denominator * bps / denominator)
}

/// Human-readable percentage for a basis-point share, e.g. `50%`, `12.5%`.
#[must_use]
pub fn percent_label(share_bps: u16) -> String {
    let whole = share_bps / 100;
    match share_bps % 100 {
        0 => format!("{whole}%"),
        frac if frac % 10 == 0 => format!("{whole}.{}%", frac / 10),
        frac => format!("{whole}.{frac:02}%"),
    }
}

/// Outcome of one revenue run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevenueReport {
    /// Blocks scanned.
    pub range: BlockRange,
    /// Number of fee events decoded.
    pub events: usize,
    /// Sum of all fee amounts, in wei.
    pub total_revenue: U256,
    /// Share in basis points.
    pub share_bps: u16,
    /// DAO portion of `total_revenue`, in wei.
    pub dao_share: U256,
}

impl RevenueReport {
    /// Aggregate `events` into a report.
    ///
    /// # Errors
    ///
    /// Fails on sum overflow or an out-of-range share.
    pub fn from_events(
        range: BlockRange,
        events: &[FeeEvent],
        share_bps: u16,
    ) -> Result<Self, RevenueError> {
        let total_revenue = total_revenue(events)?;
        Ok(Self {
            range,
            events: events.len(),
            total_revenue,
            share_bps,
            dao_share: dao_share(total_revenue, share_bps)?,
        })
    }
}

impl fmt::Display for RevenueReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total protocol revenue (wei): {}", self.total_revenue)?;
        writeln!(
            f,
            "DAO share ({}): {} wei",
            percent_label(self.share_bps),
            self.dao_share
        )?;
        write!(f, "DAO share (ETH): {} ETH", format_ether(self.dao_share))
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, Bytes};

    use super::*;

    fn events(amounts: &[U256]) -> Vec<FeeEvent> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| FeeEvent {
                contract: Address::ZERO,
                block_number: i as u64,
                data: Bytes::new(),
                amount: *amount,
            })
            .collect()
    }

    #[test]
    fn sums_amounts_and_halves() {
        let range = BlockRange::new(1, 3).unwrap();
        let report = RevenueReport::from_events(
            range,
            &events(&[U256::from(100), U256::from(200), U256::from(300)]),
            DEFAULT_SHARE_BPS,
        )
        .unwrap();
        assert_eq!(report.total_revenue, U256::from(600));
        assert_eq!(report.dao_share, U256::from(300));
        assert_eq!(report.events, 3);
    }

    #[test]
    fn no_events_is_zero_revenue() {
        let report =
            RevenueReport::from_events(BlockRange::new(0, 0).unwrap(), &[], DEFAULT_SHARE_BPS)
                .unwrap();
        assert_eq!(report.total_revenue, U256::ZERO);
        assert_eq!(report.dao_share, U256::ZERO);
    }

    #[test]
    fn sum_overflow_is_reported() {
        assert!(matches!(
            total_revenue(&events(&[U256::MAX, U256::from(1)])),
            Err(RevenueError::Overflow)
        ));
    }

    #[test]
    fn share_is_exact_for_huge_totals() {
        assert_eq!(
            dao_share(U256::MAX, DEFAULT_SHARE_BPS).unwrap(),
            U256::MAX / U256::from(2)
        );
        assert_eq!(dao_share(U256::MAX, BPS_DENOMINATOR).unwrap(), U256::MAX);
        // 10^30 wei is far beyond f64's exact integer range.
        let total = U256::from(10u64).pow(U256::from(30)) + U256::from(1);
        assert_eq!(
            dao_share(total, 2_500).unwrap(),
            U256::from(10u64).pow(U256::from(30)) / U256::from(4)
        );
    }

    #[test]
    fn share_rounds_down() {
        assert_eq!(dao_share(U256::from(3), DEFAULT_SHARE_BPS).unwrap(), U256::from(1));
        assert_eq!(dao_share(U256::from(9_999), 1).unwrap(), U256::ZERO);
    }

    #[test]
    fn share_above_full_is_rejected() {
        assert!(matches!(
            dao_share(U256::from(1), 10_001),
            Err(RevenueError::ShareOutOfRange { bps: 10_001 })
        ));
    }

    #[test]
    fn percent_labels() {
        assert_eq!(percent_label(5_000), "50%");
        assert_eq!(percent_label(1_250), "12.5%");
        assert_eq!(percent_label(3_333), "33.33%");
        assert_eq!(percent_label(5), "0.05%");
        assert_eq!(percent_label(10_000), "100%");
    }

    #[test]
    fn prints_three_lines() {
        let report = RevenueReport {
            range: BlockRange::new(0, 10).unwrap(),
            events: 2,
            total_revenue: U256::from(3_000_000_000_000_000_000u128),
            share_bps: DEFAULT_SHARE_BPS,
            dao_share: U256::from(1_500_000_000_000_000_000u128),
        };
        let text = report.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "Total protocol revenue (wei): 3000000000000000000",
                "DAO share (50%): 1500000000000000000 wei",
                "DAO share (ETH): 1.500000000000000000 ETH",
            ]
        );
    }
}
