//! Sharing-specific error types

use crate::history::HistoryError;
use crate::remote::RemoteError;
use crate::store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Share lifecycle errors
#[derive(Error, Debug)]
pub enum ShareError {
    /// Identity lookup found nobody for the key; the share was not touched
    #[error("no participant matches the lookup key: {0}")]
    ParticipantNotFound(String),

    /// The backend refused to allocate another zone. Route the content into
    /// an existing share instead of creating a new one.
    #[error("the remote backend has no capacity for another zone")]
    ZoneLimitExceeded,

    #[error("share not found: {0}")]
    ShareNotFound(Uuid),

    #[error("photo not found in either partition: {0}")]
    PhotoNotFound(Uuid),

    /// Participant mutation attempted by an account that does not own the zone
    #[error("share {0} is not owned by the local account")]
    NotShareOwner(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("remote backend failure: {0}")]
    Remote(#[from] RemoteError),
}
