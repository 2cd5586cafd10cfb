//! State file persistence.
//!
//! The whole engine state is one pretty-printed JSON document. A missing file means the
//! deployment has not been initialised yet.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};
use wagr_core::{Clock, EngineConfig, InMemoryLedger, MarketBook, MarketEngine, OracleSet};

/// Default state file path.
pub const DEFAULT_STATE_FILE: &str = "wagr_state.json";

/// Everything needed to rebuild an engine between invocations.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub config: EngineConfig,
    pub oracles: OracleSet,
    pub ledger: InMemoryLedger,
    pub book: MarketBook,
}

impl Snapshot {
    /// Fresh deployment for `config`.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            oracles: OracleSet::new(),
            ledger: InMemoryLedger::new(),
            book: MarketBook::new(),
        }
    }

    pub fn into_engine<C: Clock>(
        self,
        clock: C,
    ) -> Result<MarketEngine<OracleSet, InMemoryLedger, C>> {
        MarketEngine::from_parts(self.config, self.book, self.oracles, self.ledger, clock)
            .context("Invalid engine state")
    }

    pub fn from_engine<C: Clock>(engine: MarketEngine<OracleSet, InMemoryLedger, C>) -> Self {
        let (config, book, oracles, ledger) = engine.into_parts();
        Self {
            config,
            oracles,
            ledger,
            book,
        }
    }
}

/// Save the snapshot to a JSON file.
pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).context("Failed to serialise state")?;

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write state to {}", path.display()))?;

    debug!(path = %path.display(), markets = snapshot.book.next_market_id(), "State saved");
    Ok(())
}

/// Load the snapshot from a JSON file.
/// Returns None if the file doesn't exist.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>> {
    if !path.exists() {
        info!(path = %path.display(), "No saved state found");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read state from {}", path.display()))?;

    let snapshot: Snapshot = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse state from {}", path.display()))?;

    debug!(
        path = %path.display(),
        markets = snapshot.book.next_market_id(),
        oracles = snapshot.oracles.len(),
        "State loaded"
    );
    Ok(Some(snapshot))
}
