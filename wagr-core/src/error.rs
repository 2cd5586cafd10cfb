//! Error types for wagr-core

use crate::MarketId;
use thiserror::Error;

/// Result type alias for wagr operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// Broad category of a [`MarketError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller lacks the role the operation requires
    Authorization,
    /// The referenced record does not exist
    NotFound,
    /// An argument is malformed or out of range
    Validation,
    /// The operation is not allowed in the record's current state
    State,
    /// Fund movement or accounting failure
    Ledger,
}

/// Error types for market operations.
///
/// Every failing operation leaves the engine state exactly as it was before the call.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MarketError {
    /// Registry mutation attempted by someone other than the owner
    #[error("Caller is not the contract owner")]
    NotOwner,

    /// Settlement or attestation attempted by a non-oracle
    #[error("Caller is not a registered oracle")]
    NotOracle,

    /// Claim attempted without a stake on the winning option
    #[error("No winning bet on market {0}")]
    NoWinningBet(MarketId),

    /// Market expiration not strictly after the current time
    #[error("Expiration {expiration} is not after current time {now}")]
    InvalidExpiration { expiration: u64, now: u64 },

    /// Option list too short, too long, blank or duplicated
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Option index outside the market's option list
    #[error("Option {option} out of range for market with {count} options")]
    InvalidOption { option: usize, count: usize },

    /// Zero, below-minimum or otherwise unusable amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Empty or over-long market description
    #[error("Invalid description: {0}")]
    InvalidDescription(String),

    /// Malformed address string
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Engine configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Neither unix seconds nor RFC 3339
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// No market with this id
    #[error("Market {0} not found")]
    MarketNotFound(MarketId),

    /// Bet on a market that is no longer open
    #[error("Market {0} is closed to new bets")]
    MarketClosed(MarketId),

    /// Bet at or after the market's expiration
    #[error("Market {0} has expired")]
    MarketExpired(MarketId),

    /// Settlement of a market that already has a winner
    #[error("Market {0} is already settled")]
    AlreadySettled(MarketId),

    /// Claim or summary before settlement
    #[error("Market {0} is not settled yet")]
    MarketNotSettled(MarketId),

    /// Early settlement while it is disabled
    #[error("Market {0} has not expired yet")]
    MarketNotExpired(MarketId),

    /// Second claim on the same winning bet
    #[error("Winnings on market {0} already claimed")]
    AlreadyClaimed(MarketId),

    /// Bettor balance below the stake
    #[error("Insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    /// Release larger than what is held in escrow
    #[error("Escrow shortfall: requested {requested}, escrowed {escrowed}")]
    EscrowShortfall { requested: u64, escrowed: u64 },

    /// Pool or balance arithmetic overflowed u64
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    /// Payout would exceed the market's pool. Indicates corrupted accounting.
    #[error("Payout {payout} on market {market_id} exceeds pool {total_pool} (paid {paid_out})")]
    ConservationViolation {
        market_id: MarketId,
        payout: u64,
        paid_out: u64,
        total_pool: u64,
    },

    /// Restored state breaks a market book invariant
    #[error("Corrupt state: {0}")]
    CorruptState(String),
}

impl MarketError {
    /// Category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOwner | Self::NotOracle => ErrorKind::Authorization,
            Self::MarketNotFound(_) => ErrorKind::NotFound,
            Self::InvalidExpiration { .. }
            | Self::InvalidOptions(_)
            | Self::InvalidOption { .. }
            | Self::InvalidAmount(_)
            | Self::InvalidDescription(_)
            | Self::InvalidAddress(_)
            | Self::InvalidConfig(_)
            | Self::InvalidTimestamp(_) => ErrorKind::Validation,
            Self::NoWinningBet(_)
            | Self::MarketClosed(_)
            | Self::MarketExpired(_)
            | Self::AlreadySettled(_)
            | Self::MarketNotSettled(_)
            | Self::MarketNotExpired(_)
            | Self::AlreadyClaimed(_) => ErrorKind::State,
            Self::InsufficientFunds { .. }
            | Self::EscrowShortfall { .. }
            | Self::ArithmeticOverflow
            | Self::ConservationViolation { .. }
            | Self::CorruptState(_) => ErrorKind::Ledger,
        }
    }

    /// Numeric code reported to callers.
    ///
    /// `NotOracle` and `NoWinningBet` share 401 so existing callers keep working.
    pub fn code(&self) -> u32 {
        match self {
            Self::NotOwner => 100,
            Self::InvalidExpiration { .. } => 400,
            Self::NotOracle | Self::NoWinningBet(_) => 401,
            Self::InvalidOptions(_) => 402,
            Self::InvalidOption { .. } => 403,
            Self::MarketNotFound(_) => 404,
            Self::InvalidAmount(_) => 405,
            Self::InvalidDescription(_) => 406,
            Self::InvalidAddress(_) => 407,
            Self::InvalidConfig(_) => 408,
            Self::InvalidTimestamp(_) => 415,
            Self::MarketClosed(_) => 409,
            Self::MarketExpired(_) => 410,
            Self::AlreadySettled(_) => 411,
            Self::MarketNotSettled(_) => 412,
            Self::MarketNotExpired(_) => 413,
            Self::AlreadyClaimed(_) => 414,
            Self::InsufficientFunds { .. } => 500,
            Self::EscrowShortfall { .. } => 501,
            Self::ArithmeticOverflow => 502,
            Self::ConservationViolation { .. } => 503,
            Self::CorruptState(_) => 504,
        }
    }
}
