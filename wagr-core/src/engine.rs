//! # Market Engine
//!
//! Market lifecycle and payout protocol:
//!
//! ```text
//! create-market ──> Open ──settle-market (oracle)──> Settled
//!                    │                                  │
//!                place-bet                       claim-winnings
//! ```
//!
//! Each operation validates every precondition before touching the ledger, and touches
//! the ledger before mutating any record. A failed call therefore leaves no trace.

use crate::{
    clock::Clock,
    config::EngineConfig,
    error::Result,
    ledger::Ledger,
    market::{Attestation, Bet, BetKey, Market, MarketId, MarketStatus},
    payout::{calculate_payout, SettlementSummary},
    registry::OracleRegistry,
    store::MarketBook,
    Address, MarketError,
};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Settlement engine over an oracle registry, an escrow ledger and a clock.
pub struct MarketEngine<R, L, C> {
    config: EngineConfig,
    book: MarketBook,
    registry: R,
    ledger: L,
    clock: C,
}

impl<R, L, C> MarketEngine<R, L, C>
where
    R: OracleRegistry,
    L: Ledger,
    C: Clock,
{
    /// Creates an engine with an empty market book.
    pub fn new(config: EngineConfig, registry: R, ledger: L, clock: C) -> Result<Self> {
        Self::from_parts(config, MarketBook::new(), registry, ledger, clock)
    }

    /// Restores an engine from previously persisted state.
    ///
    /// Fails with `CorruptState` when the book breaks a record invariant.
    pub fn from_parts(
        config: EngineConfig,
        book: MarketBook,
        registry: R,
        ledger: L,
        clock: C,
    ) -> Result<Self> {
        config.validate()?;
        book.validate()?;
        Ok(Self {
            config,
            book,
            registry,
            ledger,
            clock,
        })
    }

    /// Hands back the persistable state.
    pub fn into_parts(self) -> (EngineConfig, MarketBook, R, L) {
        (self.config, self.book, self.registry, self.ledger)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fixed owner identity
    pub fn owner(&self) -> &Address {
        &self.config.owner
    }

    pub fn book(&self) -> &MarketBook {
        &self.book
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // -- Oracle registry ------------------------------------------------

    /// Authorize `oracle`. Owner only, idempotent.
    pub fn register_oracle(&mut self, caller: &Address, oracle: Address) -> Result<bool> {
        self.ensure_owner(caller)?;
        self.registry.register(oracle)
    }

    /// Revoke `oracle`. Owner only; revoking a non-member succeeds.
    pub fn remove_oracle(&mut self, caller: &Address, oracle: &Address) -> Result<bool> {
        self.ensure_owner(caller)?;
        self.registry.remove(oracle)
    }

    fn ensure_owner(&self, caller: &Address) -> Result<()> {
        if caller != &self.config.owner {
            warn!(caller = %caller, "Registry mutation rejected: not owner");
            return Err(MarketError::NotOwner);
        }
        Ok(())
    }

    pub fn is_oracle(&self, address: &Address) -> bool {
        self.registry.is_oracle(address)
    }

    /// Record an oracle's statement of a market result.
    ///
    /// Does not settle the market and does not require it to exist yet.
    pub fn verify_result(
        &mut self,
        caller: &Address,
        market_id: MarketId,
        result: usize,
    ) -> Result<bool> {
        if !self.registry.is_oracle(caller) {
            warn!(caller = %caller, market_id, "Result attestation rejected: not an oracle");
            return Err(MarketError::NotOracle);
        }

        let recorded_at = self.clock.now();
        self.book.record_attestation(Attestation {
            oracle: *caller,
            market_id,
            result,
            recorded_at,
        });
        info!(oracle = %caller, market_id, result, "Result attested");
        Ok(true)
    }

    // -- Creation -------------------------------------------------------

    /// Creates a market and returns its id.
    ///
    /// # Arguments
    /// * `caller` - Creator, recorded on the market
    /// * `description` - The market question
    /// * `options` - At least two distinct outcome labels
    /// * `expiration` - Unix timestamp, strictly in the future
    pub fn create_market(
        &mut self,
        caller: &Address,
        description: String,
        options: Vec<String>,
        expiration: u64,
    ) -> Result<MarketId> {
        self.validate_description(&description)?;
        self.validate_options(&options)?;

        let now = self.clock.now();
        if expiration <= now {
            return Err(MarketError::InvalidExpiration { expiration, now });
        }

        let id = self.book.allocate_id()?;
        let option_count = options.len();
        self.book.insert_market(Market::new(
            id,
            *caller,
            description,
            options,
            expiration,
            now,
        ));

        info!(
            market_id = id,
            creator = %caller,
            options = option_count,
            expiration,
            "Market created"
        );
        Ok(id)
    }

    fn validate_description(&self, description: &str) -> Result<()> {
        if description.trim().is_empty() {
            return Err(MarketError::InvalidDescription(
                "description cannot be empty".to_string(),
            ));
        }
        let len = description.chars().count();
        if len > self.config.max_description_len {
            return Err(MarketError::InvalidDescription(format!(
                "{len} characters exceeds limit of {}",
                self.config.max_description_len
            )));
        }
        Ok(())
    }

    fn validate_options(&self, options: &[String]) -> Result<()> {
        if options.len() < 2 {
            return Err(MarketError::InvalidOptions(format!(
                "at least 2 options required, got {}",
                options.len()
            )));
        }
        if options.len() > self.config.max_options {
            return Err(MarketError::InvalidOptions(format!(
                "{} options exceeds limit of {}",
                options.len(),
                self.config.max_options
            )));
        }

        let mut seen = BTreeSet::new();
        for option in options {
            let label = option.trim();
            if label.is_empty() {
                return Err(MarketError::InvalidOptions(
                    "option labels cannot be empty".to_string(),
                ));
            }
            if option.chars().count() > self.config.max_option_len {
                return Err(MarketError::InvalidOptions(format!(
                    "option \"{label}\" exceeds {} characters",
                    self.config.max_option_len
                )));
            }
            if !seen.insert(label) {
                return Err(MarketError::InvalidOptions(format!(
                    "duplicate option \"{label}\""
                )));
            }
        }
        Ok(())
    }

    // -- Betting --------------------------------------------------------

    /// Stakes `amount` from `caller` on `option`.
    ///
    /// Repeated bets on the same option accumulate. Bets on different options of the
    /// same market are tracked separately.
    pub fn place_bet(
        &mut self,
        caller: &Address,
        market_id: MarketId,
        option: usize,
        amount: u64,
    ) -> Result<bool> {
        let now = self.clock.now();
        let market = self.book.market(market_id)?;

        if !market.is_open() {
            return Err(MarketError::MarketClosed(market_id));
        }
        if market.is_expired(now) {
            return Err(MarketError::MarketExpired(market_id));
        }
        market.ensure_option(option)?;
        if amount == 0 {
            return Err(MarketError::InvalidAmount(
                "amount must be greater than 0".to_string(),
            ));
        }
        if amount < self.config.min_bet {
            return Err(MarketError::InvalidAmount(format!(
                "amount {amount} below minimum bet {}",
                self.config.min_bet
            )));
        }

        let key = BetKey {
            market_id,
            bettor: *caller,
            option,
        };
        let new_pool = market
            .pools
            .get(option)
            .ok_or_else(|| missing_pool(market_id, option))?
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        market
            .total_pool()?
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        let mut bet = self
            .book
            .bets()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Bet::new(key));
        bet.amount = bet
            .amount
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;

        self.ledger.escrow(caller, amount)?;

        let stake = bet.amount;
        let pool = self
            .book
            .market_mut(market_id)?
            .pools
            .get_mut(option)
            .ok_or_else(|| missing_pool(market_id, option))?;
        *pool = new_pool;
        self.book.bets_mut().insert(bet);

        info!(
            market_id,
            bettor = %caller,
            option,
            amount,
            stake,
            pool = new_pool,
            "Bet placed"
        );
        Ok(true)
    }

    // -- Settlement -----------------------------------------------------

    /// Records the winning option. Oracle only, exactly once per market.
    pub fn settle_market(
        &mut self,
        caller: &Address,
        market_id: MarketId,
        winning_option: usize,
    ) -> Result<bool> {
        let now = self.clock.now();
        let market = self.book.market(market_id)?;

        if market.is_settled() {
            return Err(MarketError::AlreadySettled(market_id));
        }
        if !self.registry.is_oracle(caller) {
            warn!(caller = %caller, market_id, "Settlement rejected: not an oracle");
            return Err(MarketError::NotOracle);
        }
        market.ensure_option(winning_option)?;
        if !self.config.allow_early_settlement && !market.is_expired(now) {
            return Err(MarketError::MarketNotExpired(market_id));
        }

        let market = self.book.market_mut(market_id)?;
        market.status = MarketStatus::Settled;
        market.winning_option = Some(winning_option);
        market.settled_by = Some(*caller);
        market.settled_at = Some(now);

        info!(
            market_id,
            oracle = %caller,
            winning_option,
            winning_pool = market.pool(winning_option),
            "Market settled"
        );
        Ok(true)
    }

    // -- Claims ---------------------------------------------------------

    /// Pays the caller's share of the pool for their stake on the winning option.
    pub fn claim_winnings(&mut self, caller: &Address, market_id: MarketId) -> Result<u64> {
        let market = self.book.market(market_id)?;
        let winning_option = match (market.status, market.winning_option) {
            (MarketStatus::Settled, Some(option)) => option,
            _ => return Err(MarketError::MarketNotSettled(market_id)),
        };

        let key = BetKey {
            market_id,
            bettor: *caller,
            option: winning_option,
        };
        let bet = self
            .book
            .bets()
            .get(&key)
            .ok_or(MarketError::NoWinningBet(market_id))?;
        if bet.claimed {
            return Err(MarketError::AlreadyClaimed(market_id));
        }

        let total_pool = market.total_pool()?;
        let payout = calculate_payout(bet.amount, total_pool, market.pool(winning_option))?;
        let paid_out = market
            .paid_out
            .checked_add(payout)
            .filter(|paid| *paid <= total_pool)
            .ok_or(MarketError::ConservationViolation {
                market_id,
                payout,
                paid_out: market.paid_out,
                total_pool,
            })?;

        self.ledger.release(caller, payout)?;

        let mut bet = bet.clone();
        bet.claimed = true;
        bet.payout = Some(payout);
        self.book.bets_mut().insert(bet);
        self.book.market_mut(market_id)?.paid_out = paid_out;

        info!(
            market_id,
            bettor = %caller,
            payout,
            paid_out,
            total_pool,
            "Winnings claimed"
        );
        Ok(payout)
    }

    // -- Reads ----------------------------------------------------------

    pub fn market(&self, market_id: MarketId) -> Result<&Market> {
        self.book.market(market_id)
    }

    pub fn markets(&self) -> impl Iterator<Item = &Market> {
        self.book.markets()
    }

    pub fn bet(&self, market_id: MarketId, bettor: &Address, option: usize) -> Option<&Bet> {
        self.book.bets().get(&BetKey {
            market_id,
            bettor: *bettor,
            option,
        })
    }

    pub fn bets_of(&self, market_id: MarketId, bettor: &Address) -> impl Iterator<Item = &Bet> {
        self.book.bets().of(market_id, *bettor)
    }

    pub fn attestations(&self, market_id: MarketId) -> impl Iterator<Item = &Attestation> {
        self.book.attestations(market_id)
    }

    /// Amount a claim by `bettor` would pay right now. 0 when nothing is owed.
    pub fn claimable(&self, market_id: MarketId, bettor: &Address) -> Result<u64> {
        let market = self.book.market(market_id)?;
        let Some(winning_option) = market.winning_option else {
            return Ok(0);
        };
        match self.bet(market_id, bettor, winning_option) {
            Some(bet) if !bet.claimed => {
                calculate_payout(bet.amount, market.total_pool()?, market.pool(winning_option))
            }
            _ => Ok(0),
        }
    }

    /// Pool accounting of a settled market.
    pub fn settlement_summary(&self, market_id: MarketId) -> Result<SettlementSummary> {
        let market = self.book.market(market_id)?;
        let winning_option = market
            .winning_option
            .ok_or(MarketError::MarketNotSettled(market_id))?;

        let stakes = self
            .book
            .bets()
            .for_market(market_id)
            .filter(|bet| bet.option == winning_option)
            .map(|bet| (bet.amount, bet.claimed));
        let summary = SettlementSummary::from_stakes(market, stakes)?;
        debug!(market_id, ?summary, "Settlement summary");
        Ok(summary)
    }
}

fn missing_pool(market_id: MarketId, option: usize) -> MarketError {
    MarketError::CorruptState(format!("market {market_id} has no pool for option {option}"))
}
