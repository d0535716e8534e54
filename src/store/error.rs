//! Store-specific error types

use thiserror::Error;

/// Partition store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// The underlying partition database rejected a read or write. The batch
    /// rolled back as a whole; retrying is up to the caller.
    #[error("storage failure: {0}")]
    Storage(#[from] sea_orm::DbErr),

    /// The partitions directory could not be prepared
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
