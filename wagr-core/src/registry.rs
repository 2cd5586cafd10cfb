//! # Oracle Registry
//!
//! The set of addresses trusted to report market outcomes. Membership changes are
//! gated on the engine owner by [`MarketEngine`](crate::MarketEngine); the registry
//! itself only stores the set.

use crate::{error::Result, Address};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Authorization source consulted by the market engine.
#[cfg_attr(test, mockall::automock)]
pub trait OracleRegistry {
    /// Whether `address` may settle markets. Never fails.
    fn is_oracle(&self, address: &Address) -> bool;

    /// Add `oracle` to the set. Idempotent.
    fn register(&mut self, oracle: Address) -> Result<bool>;

    /// Remove `oracle` from the set. Removing a non-member succeeds.
    fn remove(&mut self, oracle: &Address) -> Result<bool>;
}

/// In-memory oracle set.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct OracleSet {
    authorized: BTreeSet<Address>,
}

impl OracleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.authorized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authorized.is_empty()
    }
}

impl OracleRegistry for OracleSet {
    fn is_oracle(&self, address: &Address) -> bool {
        self.authorized.contains(address)
    }

    fn register(&mut self, oracle: Address) -> Result<bool> {
        let added = self.authorized.insert(oracle);
        info!(oracle = %oracle, added, "Oracle registered");
        Ok(true)
    }

    fn remove(&mut self, oracle: &Address) -> Result<bool> {
        let removed = self.authorized.remove(oracle);
        info!(oracle = %oracle, removed, "Oracle removed");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{oracle, user1};

    #[test]
    fn test_register_and_query() {
        let mut registry = OracleSet::new();
        assert!(!registry.is_oracle(&oracle()));

        assert_eq!(registry.register(oracle()), Ok(true));
        assert!(registry.is_oracle(&oracle()));
        assert!(!registry.is_oracle(&user1()));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = OracleSet::new();
        assert_eq!(registry.register(oracle()), Ok(true));
        assert_eq!(registry.register(oracle()), Ok(true));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut registry = OracleSet::new();
        registry.register(oracle()).unwrap();

        assert_eq!(registry.remove(&oracle()), Ok(true));
        assert!(!registry.is_oracle(&oracle()));

        // Removing a non-member still succeeds
        assert_eq!(registry.remove(&oracle()), Ok(true));
        assert!(registry.is_empty());
    }
}
