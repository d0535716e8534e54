//! Convenience operations layered on the partition store
//!
//! The create/update/delete requests a presentation layer issues; each one
//! becomes a single write batch in the store.

pub mod photos;
pub mod ratings;
pub mod tags;

use crate::infrastructure::database::entities::photo;
use crate::store::{Partition, PartitionStore, StoreError};
use thiserror::Error;
use uuid::Uuid;

/// Errors from the convenience operations
#[derive(Error, Debug)]
pub enum OpsError {
    #[error("rating value {0} is out of range (1-5)")]
    RatingOutOfRange(i16),

    #[error("photo not found in either partition: {0}")]
    PhotoNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Locate a photo wherever it currently lives, owned partition first
pub(crate) async fn locate_photo(
    store: &PartitionStore,
    identity: Uuid,
) -> Result<(Partition, photo::Model), OpsError> {
    for partition in Partition::ALL {
        if let Some(photo) = store.find_photo(partition, identity).await? {
            return Ok((partition, photo));
        }
    }
    Err(OpsError::PhotoNotFound(identity))
}
