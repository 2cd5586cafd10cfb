//! # Wagr Core
//!
//! Core Rust library for oracle-settled parimutuel prediction markets.
//!
//! This library provides the settlement engine behind markets where:
//! - Anyone can create a market with two or more mutually exclusive options
//! - Bettors stake funds on options; stakes are held in escrow
//! - A registered oracle records the winning option exactly once
//! - Winners claim a floor-rounded, proportional share of the whole pool
//!
//! ## Features
//!
//! - **Oracle Registry**: Owner-gated set of addresses allowed to settle markets
//! - **Betting System**: Accumulated per-option stakes with atomic escrow transfers
//! - **Settlement**: One-way `Open -> Settled` transition, oracle only
//! - **Payout Distribution**: Proportional payouts that never exceed the pool
//!
//! ## Examples
//!
//! ```rust
//! use wagr_core::{Address, EngineConfig, InMemoryLedger, ManualClock, MarketEngine, OracleSet};
//!
//! let owner = Address::from_label("owner");
//! let oracle = Address::from_label("oracle");
//! let alice = Address::from_label("alice");
//!
//! let mut ledger = InMemoryLedger::new();
//! ledger.credit(alice, 1_000)?;
//!
//! let mut engine = MarketEngine::new(
//!     EngineConfig::new(owner),
//!     OracleSet::new(),
//!     ledger,
//!     ManualClock::new(1_700_000_000),
//! )?;
//!
//! let id = engine.create_market(
//!     &alice,
//!     "Team A vs Team B".to_string(),
//!     vec!["Team A".to_string(), "Team B".to_string()],
//!     1_700_086_400,
//! )?;
//! engine.place_bet(&alice, id, 1, 100)?;
//!
//! engine.register_oracle(&owner, oracle)?;
//! engine.settle_market(&oracle, id, 1)?;
//! assert_eq!(engine.claim_winnings(&alice, id)?, 100);
//! Ok::<(), wagr_core::MarketError>(())
//! ```

pub mod address;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod market;
pub mod payout;
pub mod registry;
pub mod store;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

pub use address::Address;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use engine::MarketEngine;
pub use error::{ErrorKind, MarketError, Result};
pub use ledger::{InMemoryLedger, Ledger};
pub use market::{Attestation, Bet, BetKey, Market, MarketId, MarketStatus};
pub use payout::{calculate_payout, SettlementSummary};
pub use registry::{OracleRegistry, OracleSet};
pub use store::{BetBook, MarketBook};
pub use utils::*;
