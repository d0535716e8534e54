//! Share lifecycle behavior

mod helpers;

use helpers::*;
use pretty_assertions::assert_eq;
use snapvault_core::infrastructure::events::Event;
use snapvault_core::operations::photos;
use snapvault_core::sharing::ShareError;
use snapvault_core::store::{
    AcceptanceStatus, EntityWrite, ParticipantPermission, ParticipantRole, Partition,
    PublicPermission,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[tokio::test]
async fn sharing_a_photo_moves_its_subgraph_into_a_fresh_zone() {
    let remote = Arc::new(ScriptedRemote::new());
    let (core, _dir) = core_with_remote(remote.clone()).await;

    let photo = photos::add_photo(&core.store, vec![1, 2, 3], vec![4], &["vacation"])
        .await
        .unwrap();
    assert_eq!(
        core.store.resolve_partition(photo).await.unwrap(),
        Some(Partition::Owned)
    );

    let share = core.sharing.create_share(photo).await.unwrap();

    // the photo and its children now resolve to the shared partition
    assert_eq!(
        core.store.resolve_partition(photo).await.unwrap(),
        Some(Partition::Shared)
    );
    let moved = core
        .store
        .find_photo(Partition::Shared, photo)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.zone_id, Some(share.zone_id));
    assert!(core
        .store
        .thumbnail_of(Partition::Shared, photo)
        .await
        .unwrap()
        .is_some());
    assert!(core
        .store
        .photo_data_of(Partition::Shared, photo)
        .await
        .unwrap()
        .is_some());
    assert!(core.store.find_photo(Partition::Owned, photo).await.unwrap().is_none());

    // the descriptor exists, is discoverable through the photo, and carries
    // the local account as its accepted owner
    let found = core.sharing.existing_share(photo).await.unwrap().unwrap();
    assert_eq!(found.uuid, share.uuid);
    assert_eq!(found.public_permission, PublicPermission::None);

    let members = core
        .store
        .participants(Partition::Shared, share.uuid)
        .await
        .unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].role, ParticipantRole::Owner);
    assert_eq!(members[0].identity, core.config().identity);
    assert_eq!(members[0].acceptance_status, AcceptanceStatus::Accepted);

    // the zone came from the backend
    assert!(remote.zones.lock().unwrap().contains(&share.zone_id));

    assert!(core
        .sharing
        .share_titles()
        .await
        .unwrap()
        .contains(&share.title));
}

#[tokio::test]
async fn purging_a_share_removes_the_zone_everywhere() {
    let remote = Arc::new(ScriptedRemote::new());
    let (core, _dir) = core_with_remote(remote.clone()).await;

    let photo = photos::add_photo(&core.store, vec![1], vec![2], &["trip"])
        .await
        .unwrap();
    let share = core.sharing.create_share(photo).await.unwrap();

    core.sharing.purge(share.uuid).await.unwrap();

    assert_eq!(core.store.resolve_partition(photo).await.unwrap(), None);
    assert_eq!(core.store.locate_by_identity(photo).await.unwrap(), None);
    assert!(core
        .store
        .find_share(Partition::Shared, share.uuid)
        .await
        .unwrap()
        .is_none());
    assert!(remote.deleted_zones.lock().unwrap().contains(&share.zone_id));
}

#[tokio::test]
async fn purge_notifies_observers_with_an_empty_batch() {
    let (core, _dir) = test_core().await;

    let photo = photos::add_photo(&core.store, vec![1], vec![2], &[])
        .await
        .unwrap();
    let share = core.sharing.create_share(photo).await.unwrap();

    let mut events = core.events.subscribe();
    core.sharing.purge(share.uuid).await.unwrap();

    // the purge writes are self-authored, so the structural notification
    // replays to zero records; observers must re-derive, not ignore
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("no store-changed event arrived")
            .unwrap();
        if let Event::StoreChanged { partition, records } = event {
            assert_eq!(partition, Partition::Shared);
            assert!(records.is_empty());
            break;
        }
    }
}

#[tokio::test]
async fn adding_a_participant_requires_a_resolvable_identity() {
    let (core, _dir) = test_core().await;

    let photo = photos::add_photo(&core.store, vec![1], vec![2], &[])
        .await
        .unwrap();
    let share = core.sharing.create_share(photo).await.unwrap();

    let result = core
        .sharing
        .add_participant("a@example.com", ParticipantPermission::ReadWrite, share.uuid)
        .await;
    assert!(matches!(result, Err(ShareError::ParticipantNotFound(_))));

    // the participant list is untouched
    let members = core
        .store
        .participants(Partition::Shared, share.uuid)
        .await
        .unwrap();
    assert_eq!(members.len(), 1);
}

#[tokio::test]
async fn a_resolved_participant_is_added_as_pending() {
    let remote = Arc::new(ScriptedRemote::new().with_identity("a@example.com", "user-a"));
    let (core, _dir) = core_with_remote(remote).await;

    let photo = photos::add_photo(&core.store, vec![1], vec![2], &[])
        .await
        .unwrap();
    let share = core.sharing.create_share(photo).await.unwrap();

    let added = core
        .sharing
        .add_participant("a@example.com", ParticipantPermission::ReadOnly, share.uuid)
        .await
        .unwrap();
    assert_eq!(added.identity, "user-a");
    assert_eq!(added.role, ParticipantRole::PrivateUser);
    assert_eq!(added.permission, ParticipantPermission::ReadOnly);
    assert_eq!(added.acceptance_status, AcceptanceStatus::Pending);

    let members = core
        .store
        .participants(Partition::Shared, share.uuid)
        .await
        .unwrap();
    assert_eq!(members.len(), 2);

    core.sharing
        .remove_participants(&[added.uuid], share.uuid)
        .await
        .unwrap();
    let members = core
        .store
        .participants(Partition::Shared, share.uuid)
        .await
        .unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].role, ParticipantRole::Owner);
}

#[tokio::test]
async fn the_zone_limit_routes_sharing_into_an_existing_zone() {
    let remote = Arc::new(ScriptedRemote::new().with_zone_limit(1));
    let (core, _dir) = core_with_remote(remote).await;

    let first = photos::add_photo(&core.store, vec![1], vec![2], &[]).await.unwrap();
    let second = photos::add_photo(&core.store, vec![3], vec![4], &[]).await.unwrap();

    let share = core.sharing.create_share(first).await.unwrap();

    let result = core.sharing.create_share(second).await;
    assert!(matches!(result, Err(ShareError::ZoneLimitExceeded)));
    // the failed attempt must not have moved anything
    assert_eq!(
        core.store.resolve_partition(second).await.unwrap(),
        Some(Partition::Owned)
    );

    core.sharing
        .add_to_existing_share(second, share.uuid)
        .await
        .unwrap();
    let moved = core
        .store
        .find_photo(Partition::Shared, second)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.zone_id, Some(share.zone_id));
}

#[tokio::test]
async fn merging_graphs_into_one_zone_deduplicates_carried_tags() {
    let (core, _dir) = test_core().await;

    let first = photos::add_photo(&core.store, vec![1], vec![2], &["trip"]).await.unwrap();
    let share = core.sharing.create_share(first).await.unwrap();

    // the second photo grows its own private "trip" tag, then joins the zone
    let second = photos::add_photo(&core.store, vec![3], vec![4], &["trip"]).await.unwrap();
    core.sharing
        .add_to_existing_share(second, share.uuid)
        .await
        .unwrap();

    let zone_tags = core
        .store
        .tags_in_zone(Partition::Shared, share.zone_id)
        .await
        .unwrap();
    assert_eq!(zone_tags.len(), 1, "duplicate zone tags survived the merge");

    let mut linked: Vec<Uuid> = core
        .store
        .photos_of_tag(Partition::Shared, zone_tags[0].uuid)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.uuid)
        .collect();
    linked.sort();
    let mut expected = vec![first, second];
    expected.sort();
    assert_eq!(linked, expected);
}

#[tokio::test]
async fn a_shared_tag_is_copied_rather_than_stolen() {
    let (core, _dir) = test_core().await;

    // two private photos share one "family" tag; sharing the first must not
    // strip the tag off the second
    let shared_photo = photos::add_photo(&core.store, vec![1], vec![2], &["family"])
        .await
        .unwrap();
    let staying_photo = photos::add_photo(&core.store, vec![3], vec![4], &["family"])
        .await
        .unwrap();

    let share = core.sharing.create_share(shared_photo).await.unwrap();

    let private_tag = core
        .store
        .find_tag_by_name(Partition::Owned, "family", None)
        .await
        .unwrap()
        .expect("the private tag survived");
    let still_linked = core
        .store
        .photos_of_tag(Partition::Owned, private_tag.uuid)
        .await
        .unwrap();
    assert_eq!(still_linked.len(), 1);
    assert_eq!(still_linked[0].uuid, staying_photo);

    // the zone got its own copy under a fresh identity
    let zone_tags = core
        .store
        .tags_in_zone(Partition::Shared, share.zone_id)
        .await
        .unwrap();
    assert_eq!(zone_tags.len(), 1);
    assert_ne!(zone_tags[0].uuid, private_tag.uuid);
}

#[tokio::test]
async fn a_participant_purge_removes_only_their_local_copy() {
    let remote = Arc::new(ScriptedRemote::new());
    let (core, _dir) = core_with_remote(remote.clone()).await;

    // a share owned by someone else arrives through sync
    let zone_id = Uuid::new_v4();
    let share_uuid = Uuid::new_v4();
    let photo_uuid = Uuid::new_v4();
    import_from_peer(
        &core,
        Partition::Shared,
        vec![
            EntityWrite::PutShare {
                uuid: share_uuid,
                title: "Share-1/1/25, 09:00".to_string(),
                zone_id,
                public_permission: PublicPermission::None,
            },
            EntityWrite::PutParticipant {
                uuid: Uuid::new_v4(),
                share: share_uuid,
                identity: "someone-else".to_string(),
                role: ParticipantRole::Owner,
                permission: ParticipantPermission::ReadWrite,
                acceptance_status: AcceptanceStatus::Accepted,
            },
            EntityWrite::PutParticipant {
                uuid: Uuid::new_v4(),
                share: share_uuid,
                identity: core.config().identity.clone(),
                role: ParticipantRole::PrivateUser,
                permission: ParticipantPermission::ReadWrite,
                acceptance_status: AcceptanceStatus::Accepted,
            },
            EntityWrite::PutPhoto {
                uuid: photo_uuid,
                unique_name: photo_uuid.to_string(),
                zone_id: Some(zone_id),
            },
        ],
    )
    .await;

    // participants may not mutate the member list
    let result = core
        .sharing
        .add_participant("a@example.com", ParticipantPermission::ReadOnly, share_uuid)
        .await;
    assert!(matches!(result, Err(ShareError::NotShareOwner(_))));

    core.sharing.purge(share_uuid).await.unwrap();

    // the local copy is gone, but the remote zone was not touched: leaving a
    // share is not the owner's teardown
    assert_eq!(core.store.resolve_partition(photo_uuid).await.unwrap(), None);
    assert!(core
        .store
        .find_share(Partition::Shared, share_uuid)
        .await
        .unwrap()
        .is_none());
    assert!(remote.deleted_zones.lock().unwrap().is_empty());
}
