//! Convenient methods for managing ratings

use crate::store::{EntityKind, EntityWrite, Partition, PartitionStore};
use uuid::Uuid;

use super::{locate_photo, OpsError};

/// Attach a rating to a photo. Ratings live next to their photo, in whatever
/// partition and zone it currently occupies.
pub async fn add_rating(
    store: &PartitionStore,
    value: i16,
    photo_identity: Uuid,
) -> Result<Uuid, OpsError> {
    if !(1..=5).contains(&value) {
        return Err(OpsError::RatingOutOfRange(value));
    }

    let (partition, photo) = locate_photo(store, photo_identity).await?;
    let rating_uuid = Uuid::new_v4();
    store
        .write(
            partition,
            vec![EntityWrite::PutRating {
                uuid: rating_uuid,
                photo: photo.uuid,
                value,
            }],
        )
        .await?;
    Ok(rating_uuid)
}

/// Delete a rating wherever it lives; deleting one that is already gone is a
/// quiet no-op
pub async fn delete_rating(store: &PartitionStore, rating_identity: Uuid) -> Result<(), OpsError> {
    for partition in Partition::ALL {
        if store.find_rating(partition, rating_identity).await?.is_some() {
            store
                .write(
                    partition,
                    vec![EntityWrite::Delete {
                        kind: EntityKind::Rating,
                        uuid: rating_identity,
                    }],
                )
                .await?;
            return Ok(());
        }
    }
    Ok(())
}
