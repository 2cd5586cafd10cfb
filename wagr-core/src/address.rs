//! # Participant Addresses
//!
//! Opaque 20-byte identifiers supplied by the host's identity layer.

use crate::{error::Result, MarketError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length of an address in bytes
pub const ADDRESS_LEN: usize = 20;

/// Fixed-width participant identifier.
///
/// Rendered as 40 lowercase hex characters. Parsing accepts an optional `0x` prefix.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive a deterministic address from a human-readable label.
    ///
    /// Uses the first 20 bytes of `sha256(label)`. Intended for simulations and tests
    /// where no real identity layer exists.
    pub fn from_label(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(label.as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&hash[..ADDRESS_LEN]);
        Self(bytes)
    }

    /// Shortened form for listings, e.g. `3f2a..91c0`
    pub fn short(&self) -> String {
        let full = hex::encode(self.0);
        format!("{}..{}", &full[..4], &full[full.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        if stripped.len() != ADDRESS_LEN * 2 {
            return Err(MarketError::InvalidAddress(format!(
                "expected {} hex characters, got {}",
                ADDRESS_LEN * 2,
                stripped.len()
            )));
        }

        let decoded = hex::decode(stripped)
            .map_err(|e| MarketError::InvalidAddress(format!("{s}: {e}")))?;
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

// Serialized as a hex string so addresses can key JSON objects.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_is_deterministic() {
        assert_eq!(Address::from_label("alice"), Address::from_label("alice"));
        assert_ne!(Address::from_label("alice"), Address::from_label("bob"));
    }

    #[test]
    fn test_parse_display() {
        let addr = Address::from_label("oracle");
        let rendered = addr.to_string();
        assert_eq!(rendered.len(), 40);
        assert_eq!(rendered.parse::<Address>().unwrap(), addr);
        assert_eq!(format!("0x{rendered}").parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            "abcd".parse::<Address>(),
            Err(MarketError::InvalidAddress(_))
        ));
        let not_hex = "zz".repeat(ADDRESS_LEN);
        assert!(matches!(
            not_hex.parse::<Address>(),
            Err(MarketError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let addr = Address::new([0xab; ADDRESS_LEN]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(ADDRESS_LEN)));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_short() {
        let addr = Address::new([0x11; ADDRESS_LEN]);
        assert_eq!(addr.short(), "1111..1111");
    }
}
