//! The dual-partition store
//!
//! Owns both partition databases and routes every read and write to the right
//! one. Writes are typed batches applied atomically to exactly one partition;
//! every effective mutation appends a change log row in the same transaction,
//! so there is no committed write without a ledger entry.

use crate::infrastructure::database::entities::{
    self, change_log, participant, photo, photo_data, photo_tag, rating, share, tag, thumbnail,
};
use crate::infrastructure::database::Database;
use crate::ledger::ChangeRecord;
use crate::remote::RemoteSync;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::StoreResult;
use super::types::{ChangeKind, EntityKind, EntityWrite, Partition};

/// Entity store spanning the owned and the shared partition
pub struct PartitionStore {
    owned: Database,
    shared: Database,
    author: String,
    remote: Arc<dyn RemoteSync>,
}

impl PartitionStore {
    /// Open (or create) both partition databases under `dir` and bring their
    /// schemas up to date. Failing here means the local partitions are
    /// unusable, which is fatal for the embedding process.
    pub async fn open(
        dir: &Path,
        author: impl Into<String>,
        remote: Arc<dyn RemoteSync>,
    ) -> StoreResult<Self> {
        std::fs::create_dir_all(dir)?;

        let owned = Database::open(&dir.join(Partition::Owned.file_name())).await?;
        owned.migrate().await?;

        let shared = Database::open(&dir.join(Partition::Shared.file_name())).await?;
        shared.migrate().await?;

        Ok(Self {
            owned,
            shared,
            author: author.into(),
            remote,
        })
    }

    /// Connection for one partition
    pub fn conn(&self, partition: Partition) -> &DatabaseConnection {
        match partition {
            Partition::Owned => self.owned.conn(),
            Partition::Shared => self.shared.conn(),
        }
    }

    /// Author tag recorded on locally committed change log rows
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Apply a batch of writes as the local author
    pub async fn write(
        &self,
        partition: Partition,
        writes: Vec<EntityWrite>,
    ) -> StoreResult<Vec<ChangeRecord>> {
        let author = self.author.clone();
        self.write_as(partition, &author, writes).await
    }

    /// Apply a batch of writes under an explicit author tag.
    ///
    /// The remote collaborator imports inbound mutations through this entry
    /// point with the originating writer's tag, which is what lets replay
    /// tell remote-origin rows apart from self-authored ones.
    pub async fn write_as(
        &self,
        partition: Partition,
        author: &str,
        writes: Vec<EntityWrite>,
    ) -> StoreResult<Vec<ChangeRecord>> {
        let txn = self.conn(partition).begin().await?;
        let records = self.apply_writes(&txn, author, &writes).await?;
        txn.commit().await?;

        // Only local mutations go back out; re-pushing an imported change
        // would echo it around the mesh forever.
        if author == self.author {
            self.push_records(partition, &records).await;
        }
        Ok(records)
    }

    /// Best-effort push of committed records to the remote backend
    pub(crate) async fn push_records(&self, partition: Partition, records: &[ChangeRecord]) {
        for record in records {
            if let Err(err) = self.remote.push_change(record, partition).await {
                warn!(
                    %partition,
                    sequence = record.sequence,
                    "failed to push a local change to the remote backend: {err}"
                );
            }
        }
    }

    /// Which partition holds the entity with this identity, if any.
    /// The owned partition is searched first.
    pub async fn resolve_partition(&self, identity: Uuid) -> StoreResult<Option<Partition>> {
        Ok(self.locate_by_identity(identity).await?.map(|(p, _)| p))
    }

    /// Locate an entity of any kind by its identity across both partitions
    pub async fn locate_by_identity(
        &self,
        identity: Uuid,
    ) -> StoreResult<Option<(Partition, EntityKind)>> {
        for partition in Partition::ALL {
            if let Some(kind) = self.kind_of(partition, identity).await? {
                return Ok(Some((partition, kind)));
            }
        }
        Ok(None)
    }

    async fn kind_of(&self, partition: Partition, identity: Uuid) -> StoreResult<Option<EntityKind>> {
        let conn = self.conn(partition);
        if photo_by_uuid(conn, identity).await?.is_some() {
            return Ok(Some(EntityKind::Photo));
        }
        if tag_by_uuid(conn, identity).await?.is_some() {
            return Ok(Some(EntityKind::Tag));
        }
        if entities::Thumbnail::find()
            .filter(thumbnail::Column::Uuid.eq(identity))
            .one(conn)
            .await?
            .is_some()
        {
            return Ok(Some(EntityKind::Thumbnail));
        }
        if entities::PhotoData::find()
            .filter(photo_data::Column::Uuid.eq(identity))
            .one(conn)
            .await?
            .is_some()
        {
            return Ok(Some(EntityKind::PhotoData));
        }
        if entities::Rating::find()
            .filter(rating::Column::Uuid.eq(identity))
            .one(conn)
            .await?
            .is_some()
        {
            return Ok(Some(EntityKind::Rating));
        }
        if share_by_uuid(conn, identity).await?.is_some() {
            return Ok(Some(EntityKind::Share));
        }
        if entities::Participant::find()
            .filter(participant::Column::Uuid.eq(identity))
            .one(conn)
            .await?
            .is_some()
        {
            return Ok(Some(EntityKind::Participant));
        }
        Ok(None)
    }

    pub async fn find_photo(
        &self,
        partition: Partition,
        identity: Uuid,
    ) -> StoreResult<Option<photo::Model>> {
        Ok(photo_by_uuid(self.conn(partition), identity).await?)
    }

    pub async fn find_tag(
        &self,
        partition: Partition,
        identity: Uuid,
    ) -> StoreResult<Option<tag::Model>> {
        Ok(tag_by_uuid(self.conn(partition), identity).await?)
    }

    pub async fn find_rating(
        &self,
        partition: Partition,
        identity: Uuid,
    ) -> StoreResult<Option<rating::Model>> {
        Ok(entities::Rating::find()
            .filter(rating::Column::Uuid.eq(identity))
            .one(self.conn(partition))
            .await?)
    }

    pub async fn find_share(
        &self,
        partition: Partition,
        identity: Uuid,
    ) -> StoreResult<Option<share::Model>> {
        Ok(share_by_uuid(self.conn(partition), identity).await?)
    }

    pub async fn find_share_by_zone(
        &self,
        partition: Partition,
        zone_id: Uuid,
    ) -> StoreResult<Option<share::Model>> {
        Ok(entities::Share::find()
            .filter(share::Column::ZoneId.eq(zone_id))
            .one(self.conn(partition))
            .await?)
    }

    pub async fn find_participant(
        &self,
        partition: Partition,
        identity: Uuid,
    ) -> StoreResult<Option<participant::Model>> {
        Ok(entities::Participant::find()
            .filter(participant::Column::Uuid.eq(identity))
            .one(self.conn(partition))
            .await?)
    }

    /// All share descriptors in a partition
    pub async fn shares(&self, partition: Partition) -> StoreResult<Vec<share::Model>> {
        Ok(entities::Share::find()
            .order_by_asc(share::Column::Id)
            .all(self.conn(partition))
            .await?)
    }

    /// Participants of a share, addressed by the share's identity
    pub async fn participants(
        &self,
        partition: Partition,
        share_identity: Uuid,
    ) -> StoreResult<Vec<participant::Model>> {
        let conn = self.conn(partition);
        let Some(share) = share_by_uuid(conn, share_identity).await? else {
            return Ok(Vec::new());
        };
        Ok(share.find_related(entities::Participant).all(conn).await?)
    }

    /// Find a tag by name within one partition and zone
    pub async fn find_tag_by_name(
        &self,
        partition: Partition,
        name: &str,
        zone_id: Option<Uuid>,
    ) -> StoreResult<Option<tag::Model>> {
        let tags = entities::Tag::find()
            .filter(tag::Column::Name.eq(name))
            .order_by_asc(tag::Column::Uuid)
            .all(self.conn(partition))
            .await?;
        Ok(tags.into_iter().find(|t| t.zone_id == zone_id))
    }

    pub async fn tags_of_photo(
        &self,
        partition: Partition,
        photo_identity: Uuid,
    ) -> StoreResult<Vec<tag::Model>> {
        let conn = self.conn(partition);
        let Some(photo) = photo_by_uuid(conn, photo_identity).await? else {
            return Ok(Vec::new());
        };
        Ok(photo.find_related(entities::Tag).all(conn).await?)
    }

    pub async fn photos_of_tag(
        &self,
        partition: Partition,
        tag_identity: Uuid,
    ) -> StoreResult<Vec<photo::Model>> {
        let conn = self.conn(partition);
        let Some(tag) = tag_by_uuid(conn, tag_identity).await? else {
            return Ok(Vec::new());
        };
        Ok(tag.find_related(entities::Photo).all(conn).await?)
    }

    pub async fn thumbnail_of(
        &self,
        partition: Partition,
        photo_identity: Uuid,
    ) -> StoreResult<Option<thumbnail::Model>> {
        let conn = self.conn(partition);
        let Some(photo) = photo_by_uuid(conn, photo_identity).await? else {
            return Ok(None);
        };
        Ok(photo.find_related(entities::Thumbnail).one(conn).await?)
    }

    pub async fn photo_data_of(
        &self,
        partition: Partition,
        photo_identity: Uuid,
    ) -> StoreResult<Option<photo_data::Model>> {
        let conn = self.conn(partition);
        let Some(photo) = photo_by_uuid(conn, photo_identity).await? else {
            return Ok(None);
        };
        Ok(photo.find_related(entities::PhotoData).one(conn).await?)
    }

    pub async fn ratings_of(
        &self,
        partition: Partition,
        photo_identity: Uuid,
    ) -> StoreResult<Vec<rating::Model>> {
        let conn = self.conn(partition);
        let Some(photo) = photo_by_uuid(conn, photo_identity).await? else {
            return Ok(Vec::new());
        };
        Ok(photo.find_related(entities::Rating).all(conn).await?)
    }

    /// Number of photos other than `photo_identity` linked to the tag
    pub async fn tag_link_count_excluding(
        &self,
        partition: Partition,
        tag_identity: Uuid,
        photo_identity: Uuid,
    ) -> StoreResult<usize> {
        let conn = self.conn(partition);
        let Some(tag) = tag_by_uuid(conn, tag_identity).await? else {
            return Ok(0);
        };
        let excluded = photo_by_uuid(conn, photo_identity).await?.map(|p| p.id);
        let links = entities::PhotoTag::find()
            .filter(photo_tag::Column::TagId.eq(tag.id))
            .all(conn)
            .await?;
        Ok(links
            .iter()
            .filter(|link| Some(link.photo_id) != excluded)
            .count())
    }

    pub async fn photos_in_zone(
        &self,
        partition: Partition,
        zone_id: Uuid,
    ) -> StoreResult<Vec<photo::Model>> {
        Ok(entities::Photo::find()
            .filter(photo::Column::ZoneId.eq(zone_id))
            .all(self.conn(partition))
            .await?)
    }

    pub async fn tags_in_zone(
        &self,
        partition: Partition,
        zone_id: Uuid,
    ) -> StoreResult<Vec<tag::Model>> {
        Ok(entities::Tag::find()
            .filter(tag::Column::ZoneId.eq(zone_id))
            .all(self.conn(partition))
            .await?)
    }

    /// Apply a batch inside an already-open transaction, appending one change
    /// log row per effective mutation. Writes that address rows which no
    /// longer exist are skipped quietly: concurrent deletion by another peer
    /// is an expected race, not a failure.
    pub(crate) async fn apply_writes<C: ConnectionTrait>(
        &self,
        txn: &C,
        author: &str,
        writes: &[EntityWrite],
    ) -> StoreResult<Vec<ChangeRecord>> {
        let mut records = Vec::new();

        for write in writes {
            match write {
                EntityWrite::PutPhoto {
                    uuid,
                    unique_name,
                    zone_id,
                } => match photo_by_uuid(txn, *uuid).await? {
                    Some(existing) => {
                        let mut active: photo::ActiveModel = existing.into();
                        active.unique_name = Set(unique_name.clone());
                        active.zone_id = Set(*zone_id);
                        active.update(txn).await?;
                        records
                            .push(append_record(txn, author, EntityKind::Photo, *uuid, ChangeKind::Update).await?);
                    }
                    None => {
                        photo::ActiveModel {
                            uuid: Set(*uuid),
                            unique_name: Set(unique_name.clone()),
                            zone_id: Set(*zone_id),
                            created_at: Set(Utc::now()),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await?;
                        records
                            .push(append_record(txn, author, EntityKind::Photo, *uuid, ChangeKind::Insert).await?);
                    }
                },

                EntityWrite::PutThumbnail { uuid, photo, data } => {
                    let Some(parent) = photo_by_uuid(txn, *photo).await? else {
                        debug!(%photo, "skipping thumbnail write; its photo is gone");
                        continue;
                    };
                    match entities::Thumbnail::find()
                        .filter(thumbnail::Column::Uuid.eq(*uuid))
                        .one(txn)
                        .await?
                    {
                        Some(existing) => {
                            let mut active: thumbnail::ActiveModel = existing.into();
                            active.photo_id = Set(parent.id);
                            active.data = Set(data.clone());
                            active.update(txn).await?;
                            records.push(
                                append_record(txn, author, EntityKind::Thumbnail, *uuid, ChangeKind::Update).await?,
                            );
                        }
                        None => {
                            thumbnail::ActiveModel {
                                uuid: Set(*uuid),
                                photo_id: Set(parent.id),
                                data: Set(data.clone()),
                                ..Default::default()
                            }
                            .insert(txn)
                            .await?;
                            records.push(
                                append_record(txn, author, EntityKind::Thumbnail, *uuid, ChangeKind::Insert).await?,
                            );
                        }
                    }
                }

                EntityWrite::PutPhotoData { uuid, photo, data } => {
                    let Some(parent) = photo_by_uuid(txn, *photo).await? else {
                        debug!(%photo, "skipping photo data write; its photo is gone");
                        continue;
                    };
                    match entities::PhotoData::find()
                        .filter(photo_data::Column::Uuid.eq(*uuid))
                        .one(txn)
                        .await?
                    {
                        Some(existing) => {
                            let mut active: photo_data::ActiveModel = existing.into();
                            active.photo_id = Set(parent.id);
                            active.data = Set(data.clone());
                            active.update(txn).await?;
                            records.push(
                                append_record(txn, author, EntityKind::PhotoData, *uuid, ChangeKind::Update).await?,
                            );
                        }
                        None => {
                            photo_data::ActiveModel {
                                uuid: Set(*uuid),
                                photo_id: Set(parent.id),
                                data: Set(data.clone()),
                                ..Default::default()
                            }
                            .insert(txn)
                            .await?;
                            records.push(
                                append_record(txn, author, EntityKind::PhotoData, *uuid, ChangeKind::Insert).await?,
                            );
                        }
                    }
                }

                EntityWrite::PutTag { uuid, name, zone_id } => match tag_by_uuid(txn, *uuid).await? {
                    Some(existing) => {
                        let mut active: tag::ActiveModel = existing.into();
                        active.name = Set(name.clone());
                        active.zone_id = Set(*zone_id);
                        active.update(txn).await?;
                        records.push(append_record(txn, author, EntityKind::Tag, *uuid, ChangeKind::Update).await?);
                    }
                    None => {
                        tag::ActiveModel {
                            uuid: Set(*uuid),
                            name: Set(name.clone()),
                            zone_id: Set(*zone_id),
                            created_at: Set(Utc::now()),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await?;
                        records.push(append_record(txn, author, EntityKind::Tag, *uuid, ChangeKind::Insert).await?);
                    }
                },

                EntityWrite::PutRating { uuid, photo, value } => {
                    let Some(parent) = photo_by_uuid(txn, *photo).await? else {
                        debug!(%photo, "skipping rating write; its photo is gone");
                        continue;
                    };
                    match entities::Rating::find()
                        .filter(rating::Column::Uuid.eq(*uuid))
                        .one(txn)
                        .await?
                    {
                        Some(existing) => {
                            let mut active: rating::ActiveModel = existing.into();
                            active.photo_id = Set(parent.id);
                            active.value = Set(*value);
                            active.update(txn).await?;
                            records
                                .push(append_record(txn, author, EntityKind::Rating, *uuid, ChangeKind::Update).await?);
                        }
                        None => {
                            rating::ActiveModel {
                                uuid: Set(*uuid),
                                photo_id: Set(parent.id),
                                value: Set(*value),
                                created_at: Set(Utc::now()),
                                ..Default::default()
                            }
                            .insert(txn)
                            .await?;
                            records
                                .push(append_record(txn, author, EntityKind::Rating, *uuid, ChangeKind::Insert).await?);
                        }
                    }
                }

                EntityWrite::PutShare {
                    uuid,
                    title,
                    zone_id,
                    public_permission,
                } => match share_by_uuid(txn, *uuid).await? {
                    Some(existing) => {
                        let mut active: share::ActiveModel = existing.into();
                        active.title = Set(title.clone());
                        active.zone_id = Set(*zone_id);
                        active.public_permission = Set(*public_permission);
                        active.update(txn).await?;
                        records.push(append_record(txn, author, EntityKind::Share, *uuid, ChangeKind::Update).await?);
                    }
                    None => {
                        share::ActiveModel {
                            uuid: Set(*uuid),
                            title: Set(title.clone()),
                            zone_id: Set(*zone_id),
                            public_permission: Set(*public_permission),
                            created_at: Set(Utc::now()),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await?;
                        records.push(append_record(txn, author, EntityKind::Share, *uuid, ChangeKind::Insert).await?);
                    }
                },

                EntityWrite::PutParticipant {
                    uuid,
                    share: share_identity,
                    identity,
                    role,
                    permission,
                    acceptance_status,
                } => {
                    let Some(parent) = share_by_uuid(txn, *share_identity).await? else {
                        debug!(share = %share_identity, "skipping participant write; its share is gone");
                        continue;
                    };
                    match entities::Participant::find()
                        .filter(participant::Column::Uuid.eq(*uuid))
                        .one(txn)
                        .await?
                    {
                        Some(existing) => {
                            let mut active: participant::ActiveModel = existing.into();
                            active.share_id = Set(parent.id);
                            active.identity = Set(identity.clone());
                            active.role = Set(*role);
                            active.permission = Set(*permission);
                            active.acceptance_status = Set(*acceptance_status);
                            active.update(txn).await?;
                            records.push(
                                append_record(txn, author, EntityKind::Participant, *uuid, ChangeKind::Update)
                                    .await?,
                            );
                        }
                        None => {
                            participant::ActiveModel {
                                uuid: Set(*uuid),
                                share_id: Set(parent.id),
                                identity: Set(identity.clone()),
                                role: Set(*role),
                                permission: Set(*permission),
                                acceptance_status: Set(*acceptance_status),
                                ..Default::default()
                            }
                            .insert(txn)
                            .await?;
                            records.push(
                                append_record(txn, author, EntityKind::Participant, *uuid, ChangeKind::Insert)
                                    .await?,
                            );
                        }
                    }
                }

                EntityWrite::LinkTag { photo, tag } => {
                    let Some(p) = photo_by_uuid(txn, *photo).await? else {
                        debug!(%photo, "skipping link; the photo is gone");
                        continue;
                    };
                    let Some(t) = tag_by_uuid(txn, *tag).await? else {
                        debug!(%tag, "skipping link; the tag is gone");
                        continue;
                    };
                    let exists = entities::PhotoTag::find_by_id((p.id, t.id))
                        .one(txn)
                        .await?
                        .is_some();
                    if !exists {
                        photo_tag::ActiveModel {
                            photo_id: Set(p.id),
                            tag_id: Set(t.id),
                        }
                        .insert(txn)
                        .await?;
                        // relationship changes surface as an update of the photo
                        records
                            .push(append_record(txn, author, EntityKind::Photo, *photo, ChangeKind::Update).await?);
                    }
                }

                EntityWrite::UnlinkTag { photo, tag } => {
                    let Some(p) = photo_by_uuid(txn, *photo).await? else {
                        continue;
                    };
                    let Some(t) = tag_by_uuid(txn, *tag).await? else {
                        continue;
                    };
                    let result = entities::PhotoTag::delete_by_id((p.id, t.id)).exec(txn).await?;
                    if result.rows_affected > 0 {
                        records
                            .push(append_record(txn, author, EntityKind::Photo, *photo, ChangeKind::Update).await?);
                    }
                }

                EntityWrite::Delete { kind, uuid } => {
                    self.delete_entity(txn, author, *kind, *uuid, &mut records).await?;
                }
            }
        }

        Ok(records)
    }

    async fn delete_entity<C: ConnectionTrait>(
        &self,
        txn: &C,
        author: &str,
        kind: EntityKind,
        uuid: Uuid,
        records: &mut Vec<ChangeRecord>,
    ) -> StoreResult<()> {
        match kind {
            EntityKind::Photo => {
                let Some(photo) = photo_by_uuid(txn, uuid).await? else {
                    debug!(%uuid, "skipping delete of a photo that is already gone");
                    return Ok(());
                };
                // owned children are tombstoned with the photo
                if let Some(th) = entities::Thumbnail::find()
                    .filter(thumbnail::Column::PhotoId.eq(photo.id))
                    .one(txn)
                    .await?
                {
                    entities::Thumbnail::delete_by_id(th.id).exec(txn).await?;
                    records.push(
                        append_record(txn, author, EntityKind::Thumbnail, th.uuid, ChangeKind::Delete).await?,
                    );
                }
                if let Some(data) = entities::PhotoData::find()
                    .filter(photo_data::Column::PhotoId.eq(photo.id))
                    .one(txn)
                    .await?
                {
                    entities::PhotoData::delete_by_id(data.id).exec(txn).await?;
                    records.push(
                        append_record(txn, author, EntityKind::PhotoData, data.uuid, ChangeKind::Delete).await?,
                    );
                }
                for r in entities::Rating::find()
                    .filter(rating::Column::PhotoId.eq(photo.id))
                    .all(txn)
                    .await?
                {
                    entities::Rating::delete_by_id(r.id).exec(txn).await?;
                    records
                        .push(append_record(txn, author, EntityKind::Rating, r.uuid, ChangeKind::Delete).await?);
                }
                entities::PhotoTag::delete_many()
                    .filter(photo_tag::Column::PhotoId.eq(photo.id))
                    .exec(txn)
                    .await?;
                entities::Photo::delete_by_id(photo.id).exec(txn).await?;
                records.push(append_record(txn, author, EntityKind::Photo, uuid, ChangeKind::Delete).await?);
            }
            EntityKind::Thumbnail => {
                if let Some(th) = entities::Thumbnail::find()
                    .filter(thumbnail::Column::Uuid.eq(uuid))
                    .one(txn)
                    .await?
                {
                    entities::Thumbnail::delete_by_id(th.id).exec(txn).await?;
                    records
                        .push(append_record(txn, author, EntityKind::Thumbnail, uuid, ChangeKind::Delete).await?);
                }
            }
            EntityKind::PhotoData => {
                if let Some(data) = entities::PhotoData::find()
                    .filter(photo_data::Column::Uuid.eq(uuid))
                    .one(txn)
                    .await?
                {
                    entities::PhotoData::delete_by_id(data.id).exec(txn).await?;
                    records
                        .push(append_record(txn, author, EntityKind::PhotoData, uuid, ChangeKind::Delete).await?);
                }
            }
            EntityKind::Tag => {
                let Some(tag) = tag_by_uuid(txn, uuid).await? else {
                    debug!(%uuid, "skipping delete of a tag that is already gone");
                    return Ok(());
                };
                entities::PhotoTag::delete_many()
                    .filter(photo_tag::Column::TagId.eq(tag.id))
                    .exec(txn)
                    .await?;
                entities::Tag::delete_by_id(tag.id).exec(txn).await?;
                records.push(append_record(txn, author, EntityKind::Tag, uuid, ChangeKind::Delete).await?);
            }
            EntityKind::Rating => {
                if let Some(r) = entities::Rating::find()
                    .filter(rating::Column::Uuid.eq(uuid))
                    .one(txn)
                    .await?
                {
                    entities::Rating::delete_by_id(r.id).exec(txn).await?;
                    records.push(append_record(txn, author, EntityKind::Rating, uuid, ChangeKind::Delete).await?);
                }
            }
            EntityKind::Share => {
                let Some(share) = share_by_uuid(txn, uuid).await? else {
                    debug!(%uuid, "skipping delete of a share that is already gone");
                    return Ok(());
                };
                for p in entities::Participant::find()
                    .filter(participant::Column::ShareId.eq(share.id))
                    .all(txn)
                    .await?
                {
                    entities::Participant::delete_by_id(p.id).exec(txn).await?;
                    records.push(
                        append_record(txn, author, EntityKind::Participant, p.uuid, ChangeKind::Delete).await?,
                    );
                }
                entities::Share::delete_by_id(share.id).exec(txn).await?;
                records.push(append_record(txn, author, EntityKind::Share, uuid, ChangeKind::Delete).await?);
            }
            EntityKind::Participant => {
                if let Some(p) = entities::Participant::find()
                    .filter(participant::Column::Uuid.eq(uuid))
                    .one(txn)
                    .await?
                {
                    entities::Participant::delete_by_id(p.id).exec(txn).await?;
                    records
                        .push(append_record(txn, author, EntityKind::Participant, uuid, ChangeKind::Delete).await?);
                }
            }
        }
        Ok(())
    }
}

async fn photo_by_uuid<C: ConnectionTrait>(
    conn: &C,
    uuid: Uuid,
) -> Result<Option<photo::Model>, sea_orm::DbErr> {
    entities::Photo::find()
        .filter(photo::Column::Uuid.eq(uuid))
        .one(conn)
        .await
}

async fn tag_by_uuid<C: ConnectionTrait>(
    conn: &C,
    uuid: Uuid,
) -> Result<Option<tag::Model>, sea_orm::DbErr> {
    entities::Tag::find()
        .filter(tag::Column::Uuid.eq(uuid))
        .one(conn)
        .await
}

async fn share_by_uuid<C: ConnectionTrait>(
    conn: &C,
    uuid: Uuid,
) -> Result<Option<share::Model>, sea_orm::DbErr> {
    entities::Share::find()
        .filter(share::Column::Uuid.eq(uuid))
        .one(conn)
        .await
}

async fn append_record<C: ConnectionTrait>(
    txn: &C,
    author: &str,
    entity_kind: EntityKind,
    entity_uuid: Uuid,
    change_kind: ChangeKind,
) -> Result<ChangeRecord, sea_orm::DbErr> {
    let row = change_log::ActiveModel {
        author: Set(author.to_string()),
        entity_kind: Set(entity_kind),
        entity_uuid: Set(entity_uuid),
        change_kind: Set(change_kind),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let result = entities::ChangeLog::insert(row).exec(txn).await?;
    Ok(ChangeRecord {
        sequence: result.last_insert_id,
        author: author.to_string(),
        entity_kind,
        entity_uuid,
        change_kind,
    })
}
