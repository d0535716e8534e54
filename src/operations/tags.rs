//! Convenient methods for managing tags

use crate::store::{EntityKind, EntityWrite, Partition, PartitionStore};
use uuid::Uuid;

use super::{locate_photo, OpsError};

/// Tag a photo, reusing an existing tag with the same name in the photo's
/// partition and zone when there is one
pub async fn tag_photo(
    store: &PartitionStore,
    photo_identity: Uuid,
    name: &str,
) -> Result<Uuid, OpsError> {
    let (partition, photo) = locate_photo(store, photo_identity).await?;

    let tag_uuid = match store.find_tag_by_name(partition, name, photo.zone_id).await? {
        Some(existing) => existing.uuid,
        None => Uuid::new_v4(),
    };

    store
        .write(
            partition,
            vec![
                EntityWrite::PutTag {
                    uuid: tag_uuid,
                    name: name.to_string(),
                    zone_id: photo.zone_id,
                },
                EntityWrite::LinkTag {
                    photo: photo.uuid,
                    tag: tag_uuid,
                },
            ],
        )
        .await?;
    Ok(tag_uuid)
}

/// Remove the relation between a photo and a tag; the tag itself survives
pub async fn untag_photo(
    store: &PartitionStore,
    photo_identity: Uuid,
    tag_identity: Uuid,
) -> Result<(), OpsError> {
    let (partition, photo) = locate_photo(store, photo_identity).await?;
    store
        .write(
            partition,
            vec![EntityWrite::UnlinkTag {
                photo: photo.uuid,
                tag: tag_identity,
            }],
        )
        .await?;
    Ok(())
}

/// Toggle a tag on a photo by name: link it when absent, unlink it when
/// present
pub async fn toggle_tag(
    store: &PartitionStore,
    photo_identity: Uuid,
    name: &str,
) -> Result<(), OpsError> {
    let (partition, _) = locate_photo(store, photo_identity).await?;
    let linked = store
        .tags_of_photo(partition, photo_identity)
        .await?
        .into_iter()
        .find(|t| t.name == name);

    match linked {
        Some(tag) => untag_photo(store, photo_identity, tag.uuid).await,
        None => tag_photo(store, photo_identity, name).await.map(|_| ()),
    }
}

/// Delete a tag wherever it lives, unlinking it from every photo first
pub async fn delete_tag(store: &PartitionStore, tag_identity: Uuid) -> Result<(), OpsError> {
    for partition in Partition::ALL {
        if store.find_tag(partition, tag_identity).await?.is_some() {
            store
                .write(
                    partition,
                    vec![EntityWrite::Delete {
                        kind: EntityKind::Tag,
                        uuid: tag_identity,
                    }],
                )
                .await?;
            return Ok(());
        }
    }
    Ok(())
}
