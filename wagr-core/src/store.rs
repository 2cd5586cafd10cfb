//! Persistent market state: the market table, the bet table and oracle attestations.

use crate::{
    error::Result,
    market::{Attestation, Bet, BetKey, Market, MarketId},
    Address, MarketError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bet table keyed by `(market, bettor, option)`.
///
/// Serialized as a flat list because struct keys are not valid JSON object keys.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(from = "Vec<Bet>", into = "Vec<Bet>")]
pub struct BetBook {
    bets: BTreeMap<BetKey, Bet>,
}

impl From<Vec<Bet>> for BetBook {
    fn from(bets: Vec<Bet>) -> Self {
        Self {
            bets: bets.into_iter().map(|bet| (bet.key(), bet)).collect(),
        }
    }
}

impl From<BetBook> for Vec<Bet> {
    fn from(book: BetBook) -> Self {
        book.bets.into_values().collect()
    }
}

impl BetBook {
    pub fn get(&self, key: &BetKey) -> Option<&Bet> {
        self.bets.get(key)
    }

    pub(crate) fn insert(&mut self, bet: Bet) {
        self.bets.insert(bet.key(), bet);
    }

    /// All bets placed on a market
    pub fn for_market(&self, market_id: MarketId) -> impl Iterator<Item = &Bet> {
        self.bets
            .values()
            .filter(move |bet| bet.market_id == market_id)
    }

    /// Bets of one bettor on one market, ordered by option
    pub fn of(&self, market_id: MarketId, bettor: Address) -> impl Iterator<Item = &Bet> {
        self.for_market(market_id)
            .filter(move |bet| bet.bettor == bettor)
    }

    pub fn len(&self) -> usize {
        self.bets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }
}

/// Everything the engine persists apart from the oracle set and balances.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct MarketBook {
    next_market_id: MarketId,
    markets: BTreeMap<MarketId, Market>,
    bets: BetBook,
    #[serde(default)]
    attestations: Vec<Attestation>,
}

impl MarketBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next created market will receive
    pub fn next_market_id(&self) -> MarketId {
        self.next_market_id
    }

    pub(crate) fn allocate_id(&mut self) -> Result<MarketId> {
        let id = self.next_market_id;
        self.next_market_id = id.checked_add(1).ok_or(MarketError::ArithmeticOverflow)?;
        Ok(id)
    }

    pub fn market(&self, id: MarketId) -> Result<&Market> {
        self.markets.get(&id).ok_or(MarketError::MarketNotFound(id))
    }

    pub(crate) fn market_mut(&mut self, id: MarketId) -> Result<&mut Market> {
        self.markets
            .get_mut(&id)
            .ok_or(MarketError::MarketNotFound(id))
    }

    pub(crate) fn insert_market(&mut self, market: Market) {
        self.markets.insert(market.id, market);
    }

    pub fn markets(&self) -> impl Iterator<Item = &Market> {
        self.markets.values()
    }

    pub fn bets(&self) -> &BetBook {
        &self.bets
    }

    pub(crate) fn bets_mut(&mut self) -> &mut BetBook {
        &mut self.bets
    }

    pub fn attestations(&self, market_id: MarketId) -> impl Iterator<Item = &Attestation> {
        self.attestations
            .iter()
            .filter(move |a| a.market_id == market_id)
    }

    pub(crate) fn record_attestation(&mut self, attestation: Attestation) {
        self.attestations.push(attestation);
    }

    /// Check cross-record invariants of a restored book.
    pub fn validate(&self) -> Result<()> {
        for (id, market) in &self.markets {
            if market.id != *id {
                return Err(MarketError::CorruptState(format!(
                    "market {} stored under id {id}",
                    market.id
                )));
            }
            if *id >= self.next_market_id {
                return Err(MarketError::CorruptState(format!(
                    "market {id} not below next id {}",
                    self.next_market_id
                )));
            }
            market.check_integrity()?;
        }

        for bet in self.bets.bets.values() {
            let market = self.markets.get(&bet.market_id).ok_or_else(|| {
                MarketError::CorruptState(format!("bet on unknown market {}", bet.market_id))
            })?;
            if bet.option >= market.options.len() {
                return Err(MarketError::CorruptState(format!(
                    "bet on option {} of market {}",
                    bet.option, bet.market_id
                )));
            }
        }
        Ok(())
    }
}
