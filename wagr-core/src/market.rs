//! # Market and Bet Records
//!
//! A market holds a fixed list of mutually exclusive options and one stake pool per
//! option. Bets accumulate per `(market, bettor, option)`.

use crate::{error::Result, Address, MarketError};
use serde::{Deserialize, Serialize};

/// Sequential market identifier, starting at 0
pub type MarketId = u64;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarketStatus {
    /// Accepting bets until expiration
    Open,
    /// Winning option recorded. Terminal.
    Settled,
}

/// A prediction market with one stake pool per option.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Market {
    pub id: MarketId,

    /// Address that created the market
    pub creator: Address,

    /// Market question/description
    pub description: String,

    /// Outcome labels, indexed by option
    pub options: Vec<String>,

    /// Unix timestamp after which no bets are accepted
    pub expiration: u64,

    pub created_at: u64,

    pub status: MarketStatus,

    /// Winning option index (if settled)
    pub winning_option: Option<usize>,

    /// Oracle that settled the market
    pub settled_by: Option<Address>,

    pub settled_at: Option<u64>,

    /// Accumulated stake per option
    pub pools: Vec<u64>,

    /// Sum of all claim payouts so far
    pub paid_out: u64,
}

impl Market {
    pub(crate) fn new(
        id: MarketId,
        creator: Address,
        description: String,
        options: Vec<String>,
        expiration: u64,
        created_at: u64,
    ) -> Self {
        let pools = vec![0; options.len()];
        Self {
            id,
            creator,
            description,
            options,
            expiration,
            created_at,
            status: MarketStatus::Open,
            winning_option: None,
            settled_by: None,
            settled_at: None,
            pools,
            paid_out: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == MarketStatus::Open
    }

    pub fn is_settled(&self) -> bool {
        self.status == MarketStatus::Settled
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expiration
    }

    pub fn ensure_option(&self, option: usize) -> Result<()> {
        if option >= self.options.len() {
            return Err(MarketError::InvalidOption {
                option,
                count: self.options.len(),
            });
        }
        Ok(())
    }

    /// Stake accumulated on `option` (0 for an unknown index)
    pub fn pool(&self, option: usize) -> u64 {
        self.pools.get(option).copied().unwrap_or(0)
    }

    /// Sum of all option pools
    pub fn total_pool(&self) -> Result<u64> {
        self.pools
            .iter()
            .try_fold(0u64, |acc, pool| acc.checked_add(*pool))
            .ok_or(MarketError::ArithmeticOverflow)
    }

    /// Stake on the winning option, if settled
    pub fn winning_pool(&self) -> Option<u64> {
        self.winning_option.map(|option| self.pool(option))
    }

    /// Decimal odds for `option`: total pool over the option's pool.
    ///
    /// Returns 1.0 while the option has no stake.
    pub fn odds(&self, option: usize) -> f64 {
        let pool = self.pool(option) as f64;
        if pool == 0.0 {
            return 1.0;
        }
        let total: f64 = self.pools.iter().map(|p| *p as f64).sum();
        total / pool
    }

    /// Check the record's internal invariants.
    pub fn check_integrity(&self) -> Result<()> {
        let corrupt = |detail: String| -> Result<()> {
            Err(MarketError::CorruptState(format!("market {}: {detail}", self.id)))
        };

        if self.pools.len() != self.options.len() {
            return corrupt(format!(
                "{} pools for {} options",
                self.pools.len(),
                self.options.len()
            ));
        }
        match (self.status, self.winning_option) {
            (MarketStatus::Open, Some(_)) => {
                return corrupt("open market has a winning option".to_string());
            }
            (MarketStatus::Settled, None) => {
                return corrupt("settled market has no winning option".to_string());
            }
            (MarketStatus::Settled, Some(option)) if option >= self.options.len() => {
                return corrupt(format!("winning option {option} out of range"));
            }
            _ => {}
        }
        let total_pool = self.total_pool()?;
        if self.paid_out > total_pool {
            return corrupt(format!(
                "paid out {} exceeds pool {total_pool}",
                self.paid_out
            ));
        }
        Ok(())
    }

    /// Get market status summary
    pub fn status_line(&self, now: u64) -> String {
        match (self.status, self.winning_option) {
            (MarketStatus::Settled, Some(option)) => format!(
                "Settled - \"{}\" won",
                self.options.get(option).map(String::as_str).unwrap_or("?")
            ),
            (MarketStatus::Settled, None) => "Settled - No outcome set".to_string(),
            (MarketStatus::Open, _) if self.is_expired(now) => {
                "Awaiting oracle settlement".to_string()
            }
            (MarketStatus::Open, _) => "Active - Accepting bets".to_string(),
        }
    }
}

/// Lookup key for a bet record
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BetKey {
    pub market_id: MarketId,
    pub bettor: Address,
    pub option: usize,
}

/// Accumulated stake of one bettor on one option.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Bet {
    pub market_id: MarketId,
    pub bettor: Address,
    pub option: usize,

    /// Total staked on this option
    pub amount: u64,

    pub claimed: bool,

    /// Amount paid out when claimed
    pub payout: Option<u64>,
}

impl Bet {
    pub(crate) fn new(key: BetKey) -> Self {
        Self {
            market_id: key.market_id,
            bettor: key.bettor,
            option: key.option,
            amount: 0,
            claimed: false,
            payout: None,
        }
    }

    pub fn key(&self) -> BetKey {
        BetKey {
            market_id: self.market_id,
            bettor: self.bettor,
            option: self.option,
        }
    }
}

/// An oracle's recorded statement of a market result.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Attestation {
    pub oracle: Address,
    pub market_id: MarketId,
    pub result: usize,
    pub recorded_at: u64,
}
