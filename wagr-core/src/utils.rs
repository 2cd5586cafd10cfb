//! # Utility Functions
//!
//! Timestamp formatting and parsing helpers.

use crate::{error::Result, MarketError};
use chrono::DateTime;

/// Format timestamp as human-readable string
pub fn format_timestamp(timestamp: u64) -> String {
    let dt = DateTime::from_timestamp(timestamp as i64, 0).unwrap_or_default();
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Parse a timestamp given as unix seconds or RFC 3339 (`2025-01-01T00:00:00Z`).
pub fn parse_timestamp(timestamp_str: &str) -> Result<u64> {
    if let Ok(secs) = timestamp_str.parse::<u64>() {
        return Ok(secs);
    }

    DateTime::parse_from_rfc3339(timestamp_str)
        .ok()
        .and_then(|dt| u64::try_from(dt.timestamp()).ok())
        .ok_or_else(|| MarketError::InvalidTimestamp(timestamp_str.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(1735689600), "2025-01-01 00:00:00 UTC");
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("1735689600"), Ok(1735689600));
        assert_eq!(parse_timestamp("2025-01-01T00:00:00Z"), Ok(1735689600));
        assert!(parse_timestamp("tomorrow").is_err());
        assert!(parse_timestamp("1969-12-31T23:59:59Z").is_err());
    }
}
