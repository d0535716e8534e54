//! Dual-partition store behavior

mod helpers;

use helpers::*;
use pretty_assertions::assert_eq;
use sea_orm::EntityTrait;
use snapvault_core::infrastructure::database::entities;
use snapvault_core::operations::photos;
use snapvault_core::store::{ChangeKind, EntityKind, EntityWrite, Partition};
use uuid::Uuid;

#[tokio::test]
async fn every_write_appends_matching_ledger_records() {
    let (core, _dir) = test_core().await;

    photos::add_photo(&core.store, vec![1, 2, 3], vec![4, 5], &["vacation"])
        .await
        .unwrap();

    // photo, thumbnail, full data, and tag inserts plus the link update
    let rows = entities::ChangeLog::find()
        .all(core.store.conn(Partition::Owned))
        .await
        .unwrap();
    assert_eq!(rows.len(), 5);

    let inserts = rows
        .iter()
        .filter(|r| r.change_kind == ChangeKind::Insert)
        .count();
    assert_eq!(inserts, 4);
    assert!(rows.iter().all(|r| r.author == "app"));
}

#[tokio::test]
async fn resolve_partition_is_exclusive() {
    let (core, _dir) = test_core().await;

    let photo = photos::add_photo(&core.store, vec![1], vec![2], &[])
        .await
        .unwrap();

    assert_eq!(
        core.store.resolve_partition(photo).await.unwrap(),
        Some(Partition::Owned)
    );
    assert!(core.store.find_photo(Partition::Shared, photo).await.unwrap().is_none());

    // an identity nobody ever wrote resolves nowhere
    assert_eq!(core.store.resolve_partition(Uuid::new_v4()).await.unwrap(), None);
}

#[tokio::test]
async fn locate_by_identity_reports_the_entity_kind() {
    let (core, _dir) = test_core().await;

    let photo = photos::add_photo(&core.store, vec![1], vec![2], &["trip"])
        .await
        .unwrap();
    let tag = core
        .store
        .find_tag_by_name(Partition::Owned, "trip", None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        core.store.locate_by_identity(photo).await.unwrap(),
        Some((Partition::Owned, EntityKind::Photo))
    );
    assert_eq!(
        core.store.locate_by_identity(tag.uuid).await.unwrap(),
        Some((Partition::Owned, EntityKind::Tag))
    );
    assert_eq!(core.store.locate_by_identity(Uuid::new_v4()).await.unwrap(), None);
}

#[tokio::test]
async fn puts_are_upserts_by_identity() {
    let (core, _dir) = test_core().await;
    let tag_uuid = Uuid::new_v4();

    let first = import_from_peer(
        &core,
        Partition::Owned,
        vec![EntityWrite::PutTag {
            uuid: tag_uuid,
            name: "vacation".to_string(),
            zone_id: None,
        }],
    )
    .await;
    assert_eq!(first[0].change_kind, ChangeKind::Insert);

    // at-least-once delivery hands the same mutation over again
    let second = import_from_peer(
        &core,
        Partition::Owned,
        vec![EntityWrite::PutTag {
            uuid: tag_uuid,
            name: "vacation".to_string(),
            zone_id: None,
        }],
    )
    .await;
    assert_eq!(second[0].change_kind, ChangeKind::Update);

    let tags = entities::Tag::find()
        .all(core.store.conn(Partition::Owned))
        .await
        .unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].uuid, tag_uuid);
}

#[tokio::test]
async fn deleting_a_missing_entity_is_benign() {
    let (core, _dir) = test_core().await;

    let records = core
        .store
        .write(
            Partition::Owned,
            vec![EntityWrite::Delete {
                kind: EntityKind::Photo,
                uuid: Uuid::new_v4(),
            }],
        )
        .await
        .unwrap();

    // nothing happened, so nothing was logged
    assert!(records.is_empty());
}

#[tokio::test]
async fn deleting_a_photo_tombstones_its_children() {
    let (core, _dir) = test_core().await;

    let photo = photos::add_photo(&core.store, vec![1, 2], vec![3], &["trip"])
        .await
        .unwrap();
    photos::delete_photo(&core.store, photo).await.unwrap();

    assert_eq!(core.store.resolve_partition(photo).await.unwrap(), None);
    assert!(core.store.thumbnail_of(Partition::Owned, photo).await.unwrap().is_none());
    assert!(core.store.photo_data_of(Partition::Owned, photo).await.unwrap().is_none());

    // the tag itself survives its photo
    assert!(core
        .store
        .find_tag_by_name(Partition::Owned, "trip", None)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn local_writes_are_pushed_and_imports_are_not() {
    let remote = std::sync::Arc::new(ScriptedRemote::new());
    let (core, _dir) = core_with_remote(remote.clone()).await;

    photos::add_photo(&core.store, vec![1], vec![2], &[])
        .await
        .unwrap();
    let pushed_after_local = remote.pushed.lock().unwrap().len();
    assert!(pushed_after_local > 0);

    import_from_peer(
        &core,
        Partition::Owned,
        vec![EntityWrite::PutTag {
            uuid: Uuid::new_v4(),
            name: "beach".to_string(),
            zone_id: None,
        }],
    )
    .await;

    // imported changes never echo back to the backend
    assert_eq!(remote.pushed.lock().unwrap().len(), pushed_after_local);
}
