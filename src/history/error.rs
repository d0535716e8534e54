//! History engine error types

use crate::ledger::LedgerError;
use crate::store::StoreError;
use thiserror::Error;

/// Replay and deduplication errors
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The worker task is no longer running (the core was shut down)
    #[error("history worker is no longer running")]
    WorkerStopped,
}
