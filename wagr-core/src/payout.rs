//! Proportional payout calculation.
//!
//! Winners split the total pool (winning and losing stakes) in proportion to their
//! share of the winning pool. Every payout is floored, so the sum over all winners
//! never exceeds the total pool. What remains after all claims is the rounding
//! residual and stays in escrow.

use crate::{error::Result, Market, MarketError};
use serde::{Deserialize, Serialize};

/// Payout for a winning stake: `floor(stake * total_pool / winning_pool)`.
///
/// Computed in 128-bit arithmetic. Returns 0 when the winning pool is empty.
pub fn calculate_payout(stake: u64, total_pool: u64, winning_pool: u64) -> Result<u64> {
    if winning_pool == 0 {
        return Ok(0);
    }
    if stake > winning_pool {
        return Err(MarketError::InvalidAmount(format!(
            "stake {stake} exceeds winning pool {winning_pool}"
        )));
    }

    let payout = (stake as u128 * total_pool as u128) / winning_pool as u128;
    u64::try_from(payout).map_err(|_| MarketError::ArithmeticOverflow)
}

/// Accounting view of a settled market.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SettlementSummary {
    pub total_pool: u64,
    pub winning_pool: u64,
    /// Already paid to claimants
    pub paid_out: u64,
    /// Still owed to winners who have not claimed
    pub outstanding: u64,
    /// Left in escrow once every winner has claimed
    pub rounding_residual: u64,
}

impl SettlementSummary {
    /// Build the summary from a settled market and the stakes on its winning option.
    pub fn from_stakes<I>(market: &Market, winning_stakes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u64, bool)>,
    {
        let total_pool = market.total_pool()?;
        let winning_pool = market
            .winning_pool()
            .ok_or(MarketError::MarketNotSettled(market.id))?;

        let mut owed_total = 0u64;
        let mut outstanding = 0u64;
        for (stake, claimed) in winning_stakes {
            let payout = calculate_payout(stake, total_pool, winning_pool)?;
            owed_total = owed_total
                .checked_add(payout)
                .ok_or(MarketError::ArithmeticOverflow)?;
            if !claimed {
                outstanding = outstanding
                    .checked_add(payout)
                    .ok_or(MarketError::ArithmeticOverflow)?;
            }
        }

        Ok(Self {
            total_pool,
            winning_pool,
            paid_out: market.paid_out,
            outstanding,
            rounding_residual: total_pool.saturating_sub(owed_total),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_winners_one_loser() {
        // 100 and 300 on the winner, 200 on the loser
        assert_eq!(calculate_payout(100, 600, 400), Ok(150));
        assert_eq!(calculate_payout(300, 600, 400), Ok(450));
    }

    #[test]
    fn test_floor_rounding_non_divisible() {
        // Three equal winners splitting 100
        let payouts: Vec<u64> = (0..3)
            .map(|_| calculate_payout(1, 100, 3).unwrap())
            .collect();
        assert_eq!(payouts, vec![33, 33, 33]);
        assert!(payouts.iter().sum::<u64>() <= 100);
    }

    #[test]
    fn test_uneven_stakes_never_overpay() {
        let stakes = [7u64, 11, 13];
        let winning_pool: u64 = stakes.iter().sum();
        let total_pool = winning_pool + 1_000;
        let paid: u64 = stakes
            .iter()
            .map(|s| calculate_payout(*s, total_pool, winning_pool).unwrap())
            .sum();
        assert!(paid <= total_pool);
        // floor loses at most one unit per winner
        assert!(total_pool - paid < stakes.len() as u64);
    }

    #[test]
    fn test_sole_winner_takes_everything() {
        assert_eq!(calculate_payout(50, 1_000, 50), Ok(1_000));
    }

    #[test]
    fn test_no_losers_returns_stake() {
        assert_eq!(calculate_payout(250, 1_000, 1_000), Ok(250));
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        let half = u64::MAX / 2;
        assert_eq!(calculate_payout(half, u64::MAX, half * 2), Ok(half));
    }

    #[test]
    fn test_empty_winning_pool() {
        assert_eq!(calculate_payout(0, 500, 0), Ok(0));
    }

    #[test]
    fn test_stake_larger_than_pool_rejected() {
        assert!(matches!(
            calculate_payout(10, 100, 5),
            Err(MarketError::InvalidAmount(_))
        ));
    }
}
