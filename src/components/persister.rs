use log::debug;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

use crate::config::PersistConfig;
use crate::db::quotes::{QuoteDbError, QuoteStore};
use crate::models::quotes::Quote;

/// How the persist budget is enforced.
///
/// Gating policies check the clock once, right before the write. The write
/// itself is never cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistPolicy {
    GateThenWrite,
    Unenforced,
    /// Gate with a budget no real write can meet. Opt-in, for tests.
    FaultInjection,
}

impl FromStr for PersistPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gate-then-write" => Ok(PersistPolicy::GateThenWrite),
            "unenforced" => Ok(PersistPolicy::Unenforced),
            "fault-injection" => Ok(PersistPolicy::FaultInjection),
            other => Err(format!(
                "unknown policy {}, expected gate-then-write, unenforced or fault-injection",
                other
            )),
        }
    }
}

impl fmt::Display for PersistPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PersistPolicy::GateThenWrite => "gate-then-write",
            PersistPolicy::Unenforced => "unenforced",
            PersistPolicy::FaultInjection => "fault-injection",
        };

        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("persist budget of {0:?} elapsed before write")]
    Timeout(Duration),
    #[error("storage error: {0}")]
    Storage(#[from] QuoteDbError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub id: u64,
}

pub struct QuotePersister {
    store: Arc<QuoteStore>,
    config: PersistConfig,
}

impl QuotePersister {
    pub fn new(store: Arc<QuoteStore>, config: PersistConfig) -> Self {
        QuotePersister { store, config }
    }

    pub fn store(&self) -> &QuoteStore {
        &self.store
    }

    /// Writes one record for `quote`, exactly one attempt.
    ///
    /// The budget clock starts once the store handle is available, so a
    /// slow first open does not count against it. Time spent before this
    /// call never does.
    pub async fn persist(&self, quote: &Quote) -> Result<Ack, PersistError> {
        self.store.open().await?;

        let started = Instant::now();
        let prepared = self.store.prepare(quote).await?;

        if let Some(budget) = self.config.effective_budget() {
            if started.elapsed() >= budget {
                return Err(PersistError::Timeout(budget));
            }
        }

        let id = self.store.write(prepared).await?;

        debug!("persisted quote record {} under {}", id, self.config.policy);

        Ok(Ack { id })
    }
}
