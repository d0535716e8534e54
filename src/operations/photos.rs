//! Convenient methods for managing photos

use crate::ledger::ChangeRecord;
use crate::store::{EntityKind, EntityWrite, Partition, PartitionStore};
use tracing::debug;
use uuid::Uuid;

use super::{locate_photo, OpsError};

/// Add a photo with its thumbnail, full-resolution payload, and tags.
///
/// New photos always start in the owned partition's private zone. Tag names
/// that already exist there are reused instead of duplicated.
pub async fn add_photo(
    store: &PartitionStore,
    photo_data: Vec<u8>,
    thumbnail_data: Vec<u8>,
    tag_names: &[&str],
) -> Result<Uuid, OpsError> {
    let photo_uuid = Uuid::new_v4();
    let mut writes = vec![
        EntityWrite::PutPhoto {
            uuid: photo_uuid,
            unique_name: photo_uuid.to_string(),
            zone_id: None,
        },
        EntityWrite::PutThumbnail {
            uuid: Uuid::new_v4(),
            photo: photo_uuid,
            data: thumbnail_data,
        },
        EntityWrite::PutPhotoData {
            uuid: Uuid::new_v4(),
            photo: photo_uuid,
            data: photo_data,
        },
    ];

    for name in tag_names {
        let tag_uuid = match store.find_tag_by_name(Partition::Owned, name, None).await? {
            Some(existing) => existing.uuid,
            None => Uuid::new_v4(),
        };
        writes.push(EntityWrite::PutTag {
            uuid: tag_uuid,
            name: (*name).to_string(),
            zone_id: None,
        });
        writes.push(EntityWrite::LinkTag {
            photo: photo_uuid,
            tag: tag_uuid,
        });
    }

    store.write(Partition::Owned, writes).await?;
    Ok(photo_uuid)
}

/// Delete a photo and its owned children wherever it lives
pub async fn delete_photo(store: &PartitionStore, photo_identity: Uuid) -> Result<(), OpsError> {
    match locate_photo(store, photo_identity).await {
        Ok((partition, photo)) => {
            store
                .write(
                    partition,
                    vec![EntityWrite::Delete {
                        kind: EntityKind::Photo,
                        uuid: photo.uuid,
                    }],
                )
                .await?;
            Ok(())
        }
        Err(OpsError::PhotoNotFound(_)) => {
            // already gone; a concurrent peer got there first
            debug!(%photo_identity, "skipping delete of a photo that is already gone");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Filter a change batch down to the records that affect photos.
///
/// Presentation code reacting to a store-changed event usually only cares
/// whether any photo changed; this mirrors that question.
pub fn photo_records(records: &[ChangeRecord]) -> Vec<ChangeRecord> {
    records
        .iter()
        .filter(|r| r.entity_kind == EntityKind::Photo)
        .cloned()
        .collect()
}
