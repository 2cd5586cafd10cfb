//! Engine configuration.
//!
//! Fixed at deployment. The owner identity in particular never changes after the
//! engine is constructed.

use crate::{error::Result, Address, MarketError};
use serde::{Deserialize, Serialize};

/// Default maximum description length (characters)
pub const DEFAULT_MAX_DESCRIPTION_LEN: usize = 256;
/// Default maximum number of options per market
pub const DEFAULT_MAX_OPTIONS: usize = 16;
/// Default maximum option label length (characters)
pub const DEFAULT_MAX_OPTION_LEN: usize = 64;
/// Default minimum stake per bet
pub const DEFAULT_MIN_BET: u64 = 1;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Identity allowed to register and remove oracles
    pub owner: Address,

    #[serde(default = "default_max_description_len")]
    pub max_description_len: usize,

    #[serde(default = "default_max_options")]
    pub max_options: usize,

    #[serde(default = "default_max_option_len")]
    pub max_option_len: usize,

    /// Smallest accepted stake
    #[serde(default = "default_min_bet")]
    pub min_bet: u64,

    /// Whether an oracle may settle before the market's expiration
    #[serde(default = "default_allow_early_settlement")]
    pub allow_early_settlement: bool,
}

fn default_max_description_len() -> usize {
    DEFAULT_MAX_DESCRIPTION_LEN
}

fn default_max_options() -> usize {
    DEFAULT_MAX_OPTIONS
}

fn default_max_option_len() -> usize {
    DEFAULT_MAX_OPTION_LEN
}

fn default_min_bet() -> u64 {
    DEFAULT_MIN_BET
}

fn default_allow_early_settlement() -> bool {
    true
}

impl EngineConfig {
    /// Configuration with default limits for the given owner.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            max_description_len: DEFAULT_MAX_DESCRIPTION_LEN,
            max_options: DEFAULT_MAX_OPTIONS,
            max_option_len: DEFAULT_MAX_OPTION_LEN,
            min_bet: DEFAULT_MIN_BET,
            allow_early_settlement: true,
        }
    }

    pub fn with_min_bet(mut self, min_bet: u64) -> Self {
        self.min_bet = min_bet;
        self
    }

    pub fn with_early_settlement(mut self, allow: bool) -> Self {
        self.allow_early_settlement = allow;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_options < 2 {
            return Err(MarketError::InvalidConfig(format!(
                "max_options must be at least 2, got {}",
                self.max_options
            )));
        }
        if self.min_bet == 0 {
            return Err(MarketError::InvalidConfig(
                "min_bet must be greater than 0".to_string(),
            ));
        }
        if self.max_description_len == 0 || self.max_option_len == 0 {
            return Err(MarketError::InvalidConfig(
                "length limits must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::new(Address::from_label("owner"));
        assert!(config.validate().is_ok());
        assert!(config.allow_early_settlement);
        assert_eq!(config.min_bet, 1);
    }

    #[test]
    fn test_rejects_bad_limits() {
        let mut config = EngineConfig::new(Address::from_label("owner"));
        config.max_options = 1;
        assert!(matches!(
            config.validate(),
            Err(MarketError::InvalidConfig(_))
        ));

        let config = EngineConfig::new(Address::from_label("owner")).with_min_bet(0);
        assert!(matches!(
            config.validate(),
            Err(MarketError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let owner = Address::from_label("owner");
        let json = format!("{{\"owner\":\"{owner}\"}}");
        let config: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, EngineConfig::new(owner));
    }
}
