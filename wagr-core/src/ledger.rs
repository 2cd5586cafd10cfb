//! # Escrow Ledger
//!
//! Value transfer between participants and the engine-held escrow. The host
//! environment provides the real implementation; [`InMemoryLedger`] backs tests and
//! local simulations.

use crate::{error::Result, Address, MarketError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Atomic balance transfers into and out of escrow.
///
/// Both methods either move the full amount or fail without effect.
pub trait Ledger {
    /// Move `amount` from `from` into escrow.
    fn escrow(&mut self, from: &Address, amount: u64) -> Result<()>;

    /// Move `amount` out of escrow to `to`.
    fn release(&mut self, to: &Address, amount: u64) -> Result<()>;
}

/// Balance book held in memory.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct InMemoryLedger {
    balances: BTreeMap<Address, u64>,
    escrowed: u64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint funds to `address`. Simulation only.
    pub fn credit(&mut self, address: Address, amount: u64) -> Result<u64> {
        let balance = self.balances.entry(address).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(*balance)
    }

    pub fn balance_of(&self, address: &Address) -> u64 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Total currently held in escrow
    pub fn escrowed(&self) -> u64 {
        self.escrowed
    }
}

impl Ledger for InMemoryLedger {
    fn escrow(&mut self, from: &Address, amount: u64) -> Result<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(MarketError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        let escrowed = self
            .escrowed
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;

        self.balances.insert(*from, available - amount);
        self.escrowed = escrowed;
        debug!(from = %from, amount, escrowed, "Funds escrowed");
        Ok(())
    }

    fn release(&mut self, to: &Address, amount: u64) -> Result<()> {
        if self.escrowed < amount {
            return Err(MarketError::EscrowShortfall {
                requested: amount,
                escrowed: self.escrowed,
            });
        }
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;

        self.escrowed -= amount;
        self.balances.insert(*to, balance);
        debug!(to = %to, amount, escrowed = self.escrowed, "Funds released");
        Ok(())
    }
}
