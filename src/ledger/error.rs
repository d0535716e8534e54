//! Ledger-specific error types

use crate::store::Partition;
use thiserror::Error;

/// Change ledger and checkpoint errors
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The change log of a partition could not be read. The replay batch is
    /// aborted and the checkpoint stays untouched, so a later signal retries
    /// from the same position.
    #[error("failed to read the {partition} change log: {source}")]
    Fetch {
        partition: Partition,
        #[source]
        source: sea_orm::DbErr,
    },

    /// The checkpoint file could not be read or written
    #[error("checkpoint persistence failed: {0}")]
    Checkpoint(#[from] std::io::Error),

    /// The checkpoint file exists but does not parse
    #[error("invalid checkpoint file: {0}")]
    Decode(#[from] serde_json::Error),
}
