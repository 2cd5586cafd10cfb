//! Common test utilities for wagr-core tests.
//!
//! Shared identities, timestamps and engine setups used across module tests.

use crate::{
    clock::ManualClock, engine::MarketEngine, ledger::InMemoryLedger, registry::OracleSet,
    Address, EngineConfig, MarketId,
};

/// Standard "current time" for tests (Nov 14, 2023)
pub const NOW: u64 = 1_700_000_000;

/// Standard market expiration, one day after [`NOW`]
pub const FUTURE: u64 = NOW + 86_400;

/// Balance every test user starts with
pub const STARTING_BALANCE: u64 = 10_000;

pub type TestEngine = MarketEngine<OracleSet, InMemoryLedger, ManualClock>;

pub fn owner() -> Address {
    Address::from_label("owner")
}

pub fn oracle() -> Address {
    Address::from_label("oracle")
}

pub fn user1() -> Address {
    Address::from_label("user1")
}

pub fn user2() -> Address {
    Address::from_label("user2")
}

pub fn user3() -> Address {
    Address::from_label("user3")
}

/// Map a small index to one of the test users.
pub fn user(index: u8) -> Address {
    match index {
        1 => user1(),
        2 => user2(),
        3 => user3(),
        n => Address::from_label(&format!("user{n}")),
    }
}

/// Engine at [`NOW`] with users 1-3 funded and no oracles.
pub fn create_engine() -> TestEngine {
    let mut ledger = InMemoryLedger::new();
    for index in 1..=3 {
        ledger.credit(user(index), STARTING_BALANCE).unwrap();
    }
    MarketEngine::new(
        EngineConfig::new(owner()),
        OracleSet::new(),
        ledger,
        ManualClock::new(NOW),
    )
    .unwrap()
}

/// Engine with a single open "Team A vs Team B" market expiring at [`FUTURE`].
pub fn create_engine_with_market() -> (TestEngine, MarketId) {
    let mut engine = create_engine();
    let id = engine
        .create_market(
            &user1(),
            "Team A vs Team B".to_string(),
            vec!["Team A".to_string(), "Team B".to_string()],
            FUTURE,
        )
        .unwrap();
    (engine, id)
}

/// Engine with a market that received `bets` as `(user, option, amount)` and was then
/// settled on `winning_option` by the registered [`oracle`].
pub fn settled_engine(bets: &[(u8, usize, u64)], winning_option: usize) -> (TestEngine, MarketId) {
    let (mut engine, id) = create_engine_with_market();
    for (bettor, option, amount) in bets {
        engine.place_bet(&user(*bettor), id, *option, *amount).unwrap();
    }
    engine.register_oracle(&owner(), oracle()).unwrap();
    engine.settle_market(&oracle(), id, winning_option).unwrap();
    (engine, id)
}
