//! History replay engine behavior

mod helpers;

use helpers::*;
use pretty_assertions::assert_eq;
use snapvault_core::infrastructure::events::Event;
use snapvault_core::operations::photos;
use snapvault_core::store::{ChangeKind, EntityKind, EntityWrite, Partition};
use snapvault_core::Core;
use std::time::Duration;
use uuid::Uuid;

#[tokio::test]
async fn empty_replay_still_notifies_observers() {
    let (core, _dir) = test_core().await;
    let mut events = core.events.subscribe();

    let records = core.process_remote_change(Partition::Shared).await.unwrap();
    assert!(records.is_empty());

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("no store-changed event arrived")
        .unwrap();
    match event {
        Event::StoreChanged { partition, records } => {
            assert_eq!(partition, Partition::Shared);
            assert!(records.is_empty());
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn replay_excludes_self_authored_changes() {
    let (core, _dir) = test_core().await;

    photos::add_photo(&core.store, vec![1], vec![2], &["vacation"])
        .await
        .unwrap();

    let records = core.process_remote_change(Partition::Owned).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn replay_returns_each_remote_batch_exactly_once() {
    let (core, _dir) = test_core().await;

    let photo_uuid = Uuid::new_v4();
    import_from_peer(
        &core,
        Partition::Owned,
        vec![EntityWrite::PutPhoto {
            uuid: photo_uuid,
            unique_name: photo_uuid.to_string(),
            zone_id: None,
        }],
    )
    .await;

    let records = core.process_remote_change(Partition::Owned).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].entity_uuid, photo_uuid);
    assert_eq!(records[0].entity_kind, EntityKind::Photo);
    assert_eq!(records[0].change_kind, ChangeKind::Insert);
    assert_eq!(records[0].author, PEER_AUTHOR);
    assert_eq!(photos::photo_records(&records).len(), 1);

    // checkpoint advanced; the same batch does not come back
    let again = core.process_remote_change(Partition::Owned).await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn checkpoints_survive_restart() {
    let remote = std::sync::Arc::new(ScriptedRemote::new());
    let dir = tempfile::TempDir::new().unwrap();

    {
        let core = Core::new_with_config(dir.path().to_path_buf(), remote.clone())
            .await
            .unwrap();
        import_from_peer(
            &core,
            Partition::Owned,
            vec![EntityWrite::PutPhoto {
                uuid: Uuid::new_v4(),
                unique_name: "p".to_string(),
                zone_id: None,
            }],
        )
        .await;
        assert_eq!(core.process_remote_change(Partition::Owned).await.unwrap().len(), 1);
        core.shutdown().await;
    }

    let core = Core::new_with_config(dir.path().to_path_buf(), remote)
        .await
        .unwrap();
    let records = core.process_remote_change(Partition::Owned).await.unwrap();
    assert!(records.is_empty(), "replay restarted from the beginning");
}

#[tokio::test]
async fn replaying_a_repeated_batch_leaves_identical_state() {
    let (core, _dir) = test_core().await;
    let photo_uuid = Uuid::new_v4();
    let batch = vec![
        EntityWrite::PutPhoto {
            uuid: photo_uuid,
            unique_name: "p".to_string(),
            zone_id: None,
        },
        EntityWrite::PutRating {
            uuid: Uuid::from_u128(7),
            photo: photo_uuid,
            value: 4,
        },
    ];

    // at-least-once delivery: the same batch lands twice
    import_from_peer(&core, Partition::Owned, batch.clone()).await;
    import_from_peer(&core, Partition::Owned, batch).await;

    core.process_remote_change(Partition::Owned).await.unwrap();

    let photo = core
        .store
        .find_photo(Partition::Owned, photo_uuid)
        .await
        .unwrap()
        .expect("photo exists once");
    assert_eq!(photo.uuid, photo_uuid);

    let ratings = core.store.ratings_of(Partition::Owned, photo_uuid).await.unwrap();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].value, 4);
}

#[tokio::test]
async fn replay_hands_inserted_tags_to_deduplication() {
    let (core, _dir) = test_core().await;

    // the local device already has a "vacation" tag on a photo
    let local_photo = photos::add_photo(&core.store, vec![1], vec![2], &["vacation"])
        .await
        .unwrap();
    let local_tag = core
        .store
        .find_tag_by_name(Partition::Owned, "vacation", None)
        .await
        .unwrap()
        .unwrap();

    // a peer raced us and created its own "vacation" tag on its own photo
    let peer_tag = Uuid::new_v4();
    let peer_photo = Uuid::new_v4();
    import_from_peer(
        &core,
        Partition::Owned,
        vec![
            EntityWrite::PutPhoto {
                uuid: peer_photo,
                unique_name: peer_photo.to_string(),
                zone_id: None,
            },
            EntityWrite::PutTag {
                uuid: peer_tag,
                name: "vacation".to_string(),
                zone_id: None,
            },
            EntityWrite::LinkTag {
                photo: peer_photo,
                tag: peer_tag,
            },
        ],
    )
    .await;

    core.process_remote_change(Partition::Owned).await.unwrap();

    // exactly one "vacation" tag survives, and it is the lower uuid
    let expected_winner = local_tag.uuid.min(peer_tag);
    let survivor = core
        .store
        .find_tag_by_name(Partition::Owned, "vacation", None)
        .await
        .unwrap()
        .expect("one tag survives");
    assert_eq!(survivor.uuid, expected_winner);

    let loser = if expected_winner == local_tag.uuid { peer_tag } else { local_tag.uuid };
    assert_eq!(core.store.resolve_partition(loser).await.unwrap(), None);

    // both photos point at the winner now
    let mut linked: Vec<Uuid> = core
        .store
        .photos_of_tag(Partition::Owned, survivor.uuid)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.uuid)
        .collect();
    linked.sort();
    let mut expected = vec![local_photo, peer_photo];
    expected.sort();
    assert_eq!(linked, expected);
}
