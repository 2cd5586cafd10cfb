//! End-to-end market scenarios through the public API.

use wagr_core::{
    Address, EngineConfig, InMemoryLedger, ManualClock, MarketEngine, MarketError, MarketStatus,
    OracleSet,
};

const NOW: u64 = 1_700_000_000;
const FUTURE: u64 = 1_700_100_000;

type Engine = MarketEngine<OracleSet, InMemoryLedger, ManualClock>;

fn engine_with_funded(users: &[&str]) -> Engine {
    let owner = Address::from_label("owner");
    let mut ledger = InMemoryLedger::new();
    for user in users {
        ledger.credit(Address::from_label(user), 1_000).unwrap();
    }
    MarketEngine::new(
        EngineConfig::new(owner),
        OracleSet::new(),
        ledger,
        ManualClock::new(NOW),
    )
    .unwrap()
}

fn team_market(engine: &mut Engine, creator: &Address) -> u64 {
    engine
        .create_market(
            creator,
            "Team A vs Team B".to_string(),
            vec!["Team A".to_string(), "Team B".to_string()],
            FUTURE,
        )
        .unwrap()
}

#[test]
fn full_market_lifecycle() {
    let owner = Address::from_label("owner");
    let oracle = Address::from_label("oracle");
    let user1 = Address::from_label("user1");
    let user2 = Address::from_label("user2");
    let user3 = Address::from_label("user3");
    let mut engine = engine_with_funded(&["user1", "user2", "user3"]);

    let id = team_market(&mut engine, &user1);
    assert_eq!(id, 0);

    assert_eq!(engine.place_bet(&user2, 0, 0, 100), Ok(true));
    assert_eq!(engine.place_bet(&user3, 0, 1, 200), Ok(true));

    let err = engine.settle_market(&user1, 0, 1).unwrap_err();
    assert_eq!(err.code(), 401);

    assert_eq!(engine.register_oracle(&owner, oracle), Ok(true));
    assert!(engine.is_oracle(&oracle));
    assert_eq!(engine.settle_market(&oracle, 0, 1), Ok(true));
    assert_eq!(engine.market(0).unwrap().status, MarketStatus::Settled);

    let err = engine.claim_winnings(&user2, 0).unwrap_err();
    assert_eq!(err.code(), 401);

    assert_eq!(engine.claim_winnings(&user3, 0), Ok(300));
    assert_eq!(engine.ledger().balance_of(&user3), 1_100);
    assert_eq!(engine.ledger().balance_of(&user2), 900);
    assert_eq!(engine.ledger().escrowed(), 0);
}

#[test]
fn payouts_conserve_the_pool() {
    let owner = Address::from_label("owner");
    let oracle = Address::from_label("oracle");
    let alice = Address::from_label("alice");
    let bob = Address::from_label("bob");
    let carol = Address::from_label("carol");
    let mut engine = engine_with_funded(&["alice", "bob", "carol"]);
    engine.register_oracle(&owner, oracle).unwrap();

    let id = team_market(&mut engine, &alice);
    engine.place_bet(&alice, id, 0, 100).unwrap();
    engine.place_bet(&bob, id, 0, 300).unwrap();
    engine.place_bet(&carol, id, 1, 200).unwrap();
    engine.settle_market(&oracle, id, 0).unwrap();

    let alice_payout = engine.claim_winnings(&alice, id).unwrap();
    let bob_payout = engine.claim_winnings(&bob, id).unwrap();
    assert_eq!((alice_payout, bob_payout), (150, 450));
    assert_eq!(alice_payout + bob_payout, 600);

    let summary = engine.settlement_summary(id).unwrap();
    assert_eq!(summary.total_pool, 600);
    assert_eq!(summary.paid_out, 600);
    assert_eq!(summary.rounding_residual, 0);

    assert_eq!(
        engine.claim_winnings(&carol, id),
        Err(MarketError::NoWinningBet(id))
    );
    assert_eq!(
        engine.claim_winnings(&alice, id),
        Err(MarketError::AlreadyClaimed(id))
    );
}

#[test]
fn rounding_residual_stays_in_escrow() {
    let owner = Address::from_label("owner");
    let oracle = Address::from_label("oracle");
    let names = ["w1", "w2", "w3", "loser"];
    let mut engine = engine_with_funded(&names);
    engine.register_oracle(&owner, oracle).unwrap();

    let id = team_market(&mut engine, &owner);
    for name in &names[..3] {
        engine
            .place_bet(&Address::from_label(name), id, 0, 1)
            .unwrap();
    }
    engine
        .place_bet(&Address::from_label("loser"), id, 1, 98)
        .unwrap();
    engine.settle_market(&oracle, id, 0).unwrap();

    let paid: u64 = names[..3]
        .iter()
        .map(|name| engine.claim_winnings(&Address::from_label(name), id).unwrap())
        .sum();

    // 101 split three ways: 33 each
    assert_eq!(paid, 99);
    assert!(paid <= 101);
    assert_eq!(engine.settlement_summary(id).unwrap().rounding_residual, 2);
    assert_eq!(engine.ledger().escrowed(), 2);
}

#[test]
fn late_bets_and_resettlement_rejected() {
    let owner = Address::from_label("owner");
    let oracle = Address::from_label("oracle");
    let user1 = Address::from_label("user1");
    let mut engine = engine_with_funded(&["user1"]);
    engine.register_oracle(&owner, oracle).unwrap();

    let id = team_market(&mut engine, &user1);
    engine.clock().set(FUTURE);
    assert_eq!(
        engine.place_bet(&user1, id, 0, 10),
        Err(MarketError::MarketExpired(id))
    );

    engine.settle_market(&oracle, id, 0).unwrap();
    assert_eq!(
        engine.settle_market(&oracle, id, 1),
        Err(MarketError::AlreadySettled(id))
    );
}

#[test]
fn only_owner_manages_oracles() {
    let owner = Address::from_label("owner");
    let oracle = Address::from_label("oracle");
    let user = Address::from_label("user");
    let mut engine = engine_with_funded(&[]);

    assert_eq!(
        engine.register_oracle(&user, oracle),
        Err(MarketError::NotOwner)
    );
    assert_eq!(
        engine.remove_oracle(&user, &oracle),
        Err(MarketError::NotOwner)
    );

    engine.register_oracle(&owner, oracle).unwrap();
    engine.register_oracle(&owner, oracle).unwrap();
    assert!(engine.is_oracle(&oracle));
    assert!(!engine.is_oracle(&user));

    engine.remove_oracle(&owner, &oracle).unwrap();
    engine.remove_oracle(&owner, &oracle).unwrap();
    assert!(!engine.is_oracle(&oracle));
}
